//! Unit sphere geometry for the orrery bodies.
//!
//! Bodies are spheres scaled per body, so a single icosphere is shared by
//! every draw call.

use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::buffer::VertexPositionNormalUv;

/// CPU-side sphere ready for upload.
pub struct SphereMesh {
    pub vertices: Vec<VertexPositionNormalUv>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Icosphere of radius 1 with equirectangular texture coordinates.
///
/// Each subdivision splits every triangle in four: level 0 has 20 triangles,
/// level 4 has 5120. Triangles wind counter-clockwise seen from outside.
/// Vertices on the texture seam and at the poles are duplicated, so u may
/// exceed 1 (the body sampler repeats).
pub fn generate_sphere(subdivisions: u32) -> SphereMesh {
    let (positions, mut indices) = icosphere(subdivisions);
    let mut vertices: Vec<VertexPositionNormalUv> = positions
        .iter()
        .map(|&p| VertexPositionNormalUv {
            position: p.to_array(),
            normal: p.to_array(),
            uv: equirectangular_uv(p),
        })
        .collect();
    split_seam(&mut vertices, &mut indices);
    SphereMesh { vertices, indices }
}

fn icosphere(subdivisions: u32) -> (Vec<Vec3>, Vec<u32>) {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let mut positions: Vec<Vec3> = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
    .into_iter()
    .map(Vec3::normalize)
    .collect();

    let mut indices: Vec<u32> = vec![
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, 1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7,
        1, 8, 3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, 4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9,
        8, 1,
    ];

    for _ in 0..subdivisions {
        indices = subdivide(&mut positions, &indices);
    }
    (positions, indices)
}

/// Longitude to u, latitude to v (v = 0 at the north pole).
fn equirectangular_uv(p: Vec3) -> [f32; 2] {
    let u = 0.5 + p.z.atan2(p.x) / TAU;
    let v = (0.5 - p.y.clamp(-1.0, 1.0).asin() / PI).clamp(0.0, 1.0);
    [u, v]
}

fn is_pole(vertex: &VertexPositionNormalUv) -> bool {
    vertex.position[0].abs() < 1e-6 && vertex.position[2].abs() < 1e-6
}

/// Re-indexes triangles that straddle the u = 0/1 seam onto copies shifted
/// to `u + 1`, and gives every pole corner its own copy whose u is the mean
/// of the triangle's other two corners.
fn split_seam(vertices: &mut Vec<VertexPositionNormalUv>, indices: &mut [u32]) {
    let mut shifted: HashMap<u32, u32> = HashMap::new();
    for tri in indices.chunks_exact_mut(3) {
        let poles = [0, 1, 2].map(|k| is_pole(&vertices[tri[k] as usize]));
        let (lo, hi) = (0..3)
            .filter(|&k| !poles[k])
            .map(|k| vertices[tri[k] as usize].uv[0])
            .fold((f32::MAX, f32::MIN), |(lo, hi), u| (lo.min(u), hi.max(u)));

        if hi - lo > 0.5 {
            for k in (0..3).filter(|&k| !poles[k]) {
                let original = tri[k];
                if vertices[original as usize].uv[0] < 0.5 {
                    tri[k] = *shifted.entry(original).or_insert_with(|| {
                        let mut copy = vertices[original as usize];
                        copy.uv[0] += 1.0;
                        vertices.push(copy);
                        (vertices.len() - 1) as u32
                    });
                }
            }
        }

        for k in (0..3).filter(|&k| poles[k]) {
            let u = (0..3)
                .filter(|&j| j != k)
                .map(|j| vertices[tri[j] as usize].uv[0])
                .sum::<f32>()
                / 2.0;
            let mut copy = vertices[tri[k] as usize];
            copy.uv[0] = u;
            vertices.push(copy);
            tri[k] = (vertices.len() - 1) as u32;
        }
    }
}

/// Splits each triangle at its edge midpoints, sharing midpoints between
/// neighbouring triangles.
fn subdivide(positions: &mut Vec<Vec3>, indices: &[u32]) -> Vec<u32> {
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vec3>| -> u32 {
        let key = (a.min(b), a.max(b));
        *midpoints.entry(key).or_insert_with(|| {
            positions.push((positions[a as usize] + positions[b as usize]).normalize());
            (positions.len() - 1) as u32
        })
    };

    let mut out = Vec::with_capacity(indices.len() * 4);
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let ab = midpoint(a, b, positions);
        let bc = midpoint(b, c, positions);
        let ca = midpoint(c, a, positions);
        out.extend_from_slice(&[a, ab, ca, b, bc, ab, c, ca, bc, ab, bc, ca]);
    }
    out
}
