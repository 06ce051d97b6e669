//! Runtime registry of interchangeable shading algorithms.
//!
//! A shader program exposes one or more *slots* per stage. Each slot can be
//! bound at draw time to any of several precompiled implementations
//! (*variants*). [`ShaderVariantSet::discover`] walks every slot of a stage
//! through a [`ShadingBackend`], records the variant names in backend order
//! and caches the handle needed to activate each one, so switching variants
//! at runtime is a lookup and never a recompilation.

use std::fmt;

use log::{debug, error, info};
use thiserror::Error;

/// Programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantError {
    #[error("variant index {index} out of range ({count} variants)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("no subroutines compatible with any {stage} slot")]
    NoCompatibleSubroutines { stage: ShaderStage },

    #[error("program has no {stage} stage")]
    UnknownStage { stage: ShaderStage },
}

/// Opaque token that activates one variant on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariantHandle {
    /// Slot the variant belongs to.
    pub slot: u32,
    /// Backend subroutine index.
    pub index: u32,
}

/// Introspection a shader program must offer for variant discovery.
pub trait ShadingBackend {
    /// Number of active slots in `stage`.
    fn subroutine_uniform_count(&self, stage: ShaderStage) -> Result<u32, VariantError>;

    fn subroutine_uniform_name(&self, stage: ShaderStage, slot: u32) -> Option<String>;

    /// Subroutine indices that can be bound to `slot`, in backend order.
    fn compatible_subroutines(&self, stage: ShaderStage, slot: u32) -> Vec<u32>;

    fn subroutine_name(&self, stage: ShaderStage, index: u32) -> Option<String>;
}

/// The variants discovered for one stage and the currently active one.
///
/// `active` always indexes into `names`.
#[derive(Debug, Clone)]
pub struct ShaderVariantSet {
    stage: ShaderStage,
    names: Vec<String>,
    handles: Vec<VariantHandle>,
    active: usize,
}

impl ShaderVariantSet {
    /// Enumerates every variant compatible with any slot of `stage`.
    ///
    /// The first discovered variant starts active. Fails when the backend
    /// reports no compatible variant at all.
    pub fn discover(program: &impl ShadingBackend, stage: ShaderStage) -> Result<Self, VariantError> {
        let slot_count = program.subroutine_uniform_count(stage)?;
        info!("{slot_count} subroutine slot(s) in {stage} stage");

        let mut names = Vec::new();
        let mut handles = Vec::new();
        for slot in 0..slot_count {
            let slot_name = program
                .subroutine_uniform_name(stage, slot)
                .unwrap_or_else(|| format!("slot{slot}"));
            let compatible = program.compatible_subroutines(stage, slot);
            info!("Slot '{slot_name}' has {} compatible subroutine(s)", compatible.len());

            for index in compatible {
                let Some(name) = program.subroutine_name(stage, index) else {
                    debug!("Subroutine {index} has no name, skipped");
                    continue;
                };
                info!("    {name}");
                names.push(name);
                handles.push(VariantHandle { slot, index });
            }
        }

        if names.is_empty() {
            let err = VariantError::NoCompatibleSubroutines { stage };
            error!("{err}");
            return Err(err);
        }

        Ok(Self {
            stage,
            names,
            handles,
            active: 0,
        })
    }

    /// Makes `names[index]` the active variant. Out-of-range indices leave
    /// the selection unchanged.
    pub fn select_by_index(&mut self, index: usize) -> Result<(), VariantError> {
        if index >= self.names.len() {
            return Err(VariantError::IndexOutOfRange {
                index,
                count: self.names.len(),
            });
        }
        self.active = index;
        Ok(())
    }

    /// The handle that activates the current variant.
    pub fn resolve_active_binding(&self) -> VariantHandle {
        self.handles[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_name(&self) -> &str {
        &self.names[self.active]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// `(name, handle)` for every variant in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, VariantHandle)> {
        self.names.iter().map(String::as_str).zip(self.handles.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend with fixed slot tables: `(slot name, [(index, name)])`.
    struct MockBackend {
        stage: ShaderStage,
        slots: Vec<(&'static str, Vec<(u32, &'static str)>)>,
    }

    impl ShadingBackend for MockBackend {
        fn subroutine_uniform_count(&self, stage: ShaderStage) -> Result<u32, VariantError> {
            if stage != self.stage {
                return Err(VariantError::UnknownStage { stage });
            }
            Ok(self.slots.len() as u32)
        }

        fn subroutine_uniform_name(&self, _stage: ShaderStage, slot: u32) -> Option<String> {
            self.slots.get(slot as usize).map(|(name, _)| name.to_string())
        }

        fn compatible_subroutines(&self, _stage: ShaderStage, slot: u32) -> Vec<u32> {
            self.slots
                .get(slot as usize)
                .map(|(_, subs)| subs.iter().map(|(i, _)| *i).collect())
                .unwrap_or_default()
        }

        fn subroutine_name(&self, _stage: ShaderStage, index: u32) -> Option<String> {
            self.slots
                .iter()
                .flat_map(|(_, subs)| subs.iter())
                .find(|(i, _)| *i == index)
                .map(|(_, name)| name.to_string())
        }
    }

    fn illumination_backend() -> MockBackend {
        MockBackend {
            stage: ShaderStage::Fragment,
            slots: vec![(
                "Illumination",
                vec![(4, "Lambert"), (2, "Phong"), (7, "BlinnPhong"), (0, "GGX")],
            )],
        }
    }

    #[test]
    fn test_discover_keeps_backend_order() {
        let set = ShaderVariantSet::discover(&illumination_backend(), ShaderStage::Fragment).unwrap();
        assert_eq!(set.names(), ["Lambert", "Phong", "BlinnPhong", "GGX"]);
        assert_eq!(set.active_index(), 0);
        assert_eq!(set.active_name(), "Lambert");
        assert_eq!(set.stage(), ShaderStage::Fragment);
    }

    #[test]
    fn test_select_in_range_resolves_matching_handle() {
        let mut set = ShaderVariantSet::discover(&illumination_backend(), ShaderStage::Fragment).unwrap();
        set.select_by_index(2).unwrap();
        assert_eq!(set.active_name(), "BlinnPhong");
        assert_eq!(set.resolve_active_binding(), VariantHandle { slot: 0, index: 7 });
    }

    #[test]
    fn test_select_out_of_range_is_rejected() {
        let mut set = ShaderVariantSet::discover(&illumination_backend(), ShaderStage::Fragment).unwrap();
        set.select_by_index(1).unwrap();
        let err = set.select_by_index(4).unwrap_err();
        assert_eq!(err, VariantError::IndexOutOfRange { index: 4, count: 4 });
        assert_eq!(set.active_index(), 1);
        assert_eq!(set.active_name(), "Phong");
    }

    #[test]
    fn test_every_handle_matches_its_name() {
        let backend = illumination_backend();
        let mut set = ShaderVariantSet::discover(&backend, ShaderStage::Fragment).unwrap();
        for i in 0..set.len() {
            set.select_by_index(i).unwrap();
            let handle = set.resolve_active_binding();
            assert_eq!(
                backend.subroutine_name(ShaderStage::Fragment, handle.index).as_deref(),
                Some(set.active_name())
            );
        }
    }

    #[test]
    fn test_multiple_slots_are_concatenated() {
        let backend = MockBackend {
            stage: ShaderStage::Fragment,
            slots: vec![
                ("Diffuse", vec![(0, "Lambert"), (1, "OrenNayar")]),
                ("Specular", vec![(2, "Phong")]),
            ],
        };
        let set = ShaderVariantSet::discover(&backend, ShaderStage::Fragment).unwrap();
        assert_eq!(set.names(), ["Lambert", "OrenNayar", "Phong"]);
        let handles: Vec<_> = set.iter().map(|(_, h)| h.slot).collect();
        assert_eq!(handles, [0, 0, 1]);
    }

    #[test]
    fn test_no_compatible_subroutines() {
        let backend = MockBackend {
            stage: ShaderStage::Fragment,
            slots: vec![("Illumination", vec![])],
        };
        let err = ShaderVariantSet::discover(&backend, ShaderStage::Fragment).unwrap_err();
        assert_eq!(err, VariantError::NoCompatibleSubroutines { stage: ShaderStage::Fragment });
    }

    #[test]
    fn test_unknown_stage_propagates() {
        let err = ShaderVariantSet::discover(&illumination_backend(), ShaderStage::Vertex).unwrap_err();
        assert_eq!(err, VariantError::UnknownStage { stage: ShaderStage::Vertex });
    }
}
