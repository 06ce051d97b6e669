//! WGSL implementation of [`ShadingBackend`].
//!
//! WGSL has no subroutines, so entry points play their role: every entry
//! point of a stage is one subroutine, and the text before the first `_` in
//! its name is the slot it belongs to. `illumination_phong` and
//! `illumination_ggx` are two variants of the `illumination` slot. Slots are
//! numbered by first appearance and a subroutine's index is its position in
//! the module's entry point list.

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::shader::ShaderError;
use crate::variant::{ShaderStage, ShadingBackend, VariantError};

#[derive(Debug, Clone)]
struct EntryPoint {
    stage: ShaderStage,
    name: String,
}

/// A parsed and validated WGSL module, reduced to its entry points.
#[derive(Debug, Clone)]
pub struct WgslProgram {
    label: String,
    entry_points: Vec<Option<EntryPoint>>,
}

impl WgslProgram {
    /// Parses and validates `source`.
    pub fn parse(label: &str, source: &str) -> Result<Self, ShaderError> {
        let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::CompilationFailed {
            name: label.to_string(),
            message: e.emit_to_string(source),
        })?;
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .map_err(|e| ShaderError::CompilationFailed {
                name: label.to_string(),
                message: e.emit_to_string(source),
            })?;

        // Compute and mesh-pipeline entry points keep their index but never
        // match a stage.
        let entry_points = module
            .entry_points
            .iter()
            .map(|ep| {
                let stage = match ep.stage {
                    naga::ShaderStage::Vertex => ShaderStage::Vertex,
                    naga::ShaderStage::Fragment => ShaderStage::Fragment,
                    _ => return None,
                };
                Some(EntryPoint {
                    stage,
                    name: ep.name.clone(),
                })
            })
            .collect();

        Ok(Self {
            label: label.to_string(),
            entry_points,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Fails unless `stage` has an entry point called `name`.
    pub fn require_entry_point(&self, stage: ShaderStage, name: &str) -> Result<(), ShaderError> {
        if self.entry_points(stage).any(|ep| ep == name) {
            return Ok(());
        }
        Err(ShaderError::CompilationFailed {
            name: self.label.clone(),
            message: format!("missing {stage} entry point '{name}'"),
        })
    }

    /// Names of all entry points in `stage`, in module order.
    pub fn entry_points(&self, stage: ShaderStage) -> impl Iterator<Item = &str> {
        self.stage_entries(stage).map(|(_, ep)| ep.name.as_str())
    }

    fn stage_entries(&self, stage: ShaderStage) -> impl Iterator<Item = (u32, &EntryPoint)> {
        self.entry_points
            .iter()
            .enumerate()
            .filter_map(move |(i, ep)| match ep {
                Some(ep) if ep.stage == stage => Some((i as u32, ep)),
                _ => None,
            })
    }

    /// Distinct slot names of `stage` in order of first appearance.
    fn slots(&self, stage: ShaderStage) -> Vec<&str> {
        let mut slots: Vec<&str> = Vec::new();
        for (_, ep) in self.stage_entries(stage) {
            let slot = slot_of(&ep.name);
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }
        slots
    }
}

/// The slot an entry point belongs to.
pub fn slot_of(entry_point: &str) -> &str {
    entry_point
        .split_once('_')
        .map_or(entry_point, |(slot, _)| slot)
}

impl ShadingBackend for WgslProgram {
    fn subroutine_uniform_count(&self, stage: ShaderStage) -> Result<u32, VariantError> {
        Ok(self.slots(stage).len() as u32)
    }

    fn subroutine_uniform_name(&self, stage: ShaderStage, slot: u32) -> Option<String> {
        self.slots(stage).get(slot as usize).map(|s| s.to_string())
    }

    fn compatible_subroutines(&self, stage: ShaderStage, slot: u32) -> Vec<u32> {
        let slots = self.slots(stage);
        let Some(&slot_name) = slots.get(slot as usize) else {
            return Vec::new();
        };
        self.stage_entries(stage)
            .filter(|(_, ep)| slot_of(&ep.name) == slot_name)
            .map(|(i, _)| i)
            .collect()
    }

    fn subroutine_name(&self, stage: ShaderStage, index: u32) -> Option<String> {
        match self.entry_points.get(index as usize)? {
            Some(ep) if ep.stage == stage => Some(ep.name.clone()),
            _ => None,
        }
    }
}
