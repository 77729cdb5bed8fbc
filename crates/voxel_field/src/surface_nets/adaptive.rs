//! Adaptive simplification by planar vertex clustering.
//!
//! Vertices are grouped by 2×2×2 blocks of cells. A group whose normals all
//! lie within `adaptivity × 45°` of their mean is considered planar and is
//! collapsed into one vertex at the group centroid. Triangles that become
//! degenerate are dropped and unused vertices are compacted away.

use std::collections::BTreeMap;

use glam::{IVec3, Vec3A};
use smallvec::SmallVec;

use super::gradient::normalize_or_fallback;
use crate::types::{MeshOutput, MinMaxAABB};

/// Widest normal deviation (radians) accepted at full adaptivity.
const MAX_PLANAR_ANGLE: f32 = std::f32::consts::FRAC_PI_4;

/// Collapse planar vertex groups in place. `adaptivity <= 0` is a no-op.
pub fn simplify(output: &mut MeshOutput, adaptivity: f32) {
  if adaptivity <= 0.0 || output.is_empty() {
    return;
  }
  let cos_limit = (adaptivity.min(1.0) * MAX_PLANAR_ANGLE).cos();

  let mut groups: BTreeMap<[i32; 3], SmallVec<[u32; 8]>> = BTreeMap::new();
  for (i, vertex) in output.vertices.iter().enumerate() {
    let key: IVec3 = IVec3::from_array(vertex.cell_position) >> 1i32;
    groups.entry(key.to_array()).or_default().push(i as u32);
  }

  let mut remap: Vec<u32> = (0..output.vertices.len() as u32).collect();
  for members in groups.values().filter(|m| m.len() > 1) {
    let normals: SmallVec<[Vec3A; 8]> = members
      .iter()
      .map(|&i| Vec3A::from_array(output.vertices[i as usize].normal))
      .collect();
    let mean = Vec3A::from_array(normalize_or_fallback(normals.iter().copied().sum()));
    if normals.iter().any(|n| n.dot(mean) < cos_limit) {
      continue;
    }

    let centroid = members
      .iter()
      .map(|&i| Vec3A::from_array(output.vertices[i as usize].position))
      .sum::<Vec3A>()
      / members.len() as f32;
    let representative = members[0];
    let vertex = &mut output.vertices[representative as usize];
    vertex.position = centroid.to_array();
    vertex.normal = mean.to_array();
    for &i in members.iter() {
      remap[i as usize] = representative;
    }
  }

  let mut indices = Vec::with_capacity(output.indices.len());
  for tri in output.indices.chunks_exact(3) {
    let [a, b, c] = [remap[tri[0] as usize], remap[tri[1] as usize], remap[tri[2] as usize]];
    if a != b && b != c && a != c {
      indices.extend_from_slice(&[a, b, c]);
    }
  }

  // Compact to the vertices still referenced
  let mut new_index = vec![u32::MAX; output.vertices.len()];
  for &i in &indices {
    new_index[i as usize] = 0;
  }
  let mut vertices = Vec::new();
  let mut bounds = MinMaxAABB::empty();
  for (i, vertex) in output.vertices.iter().enumerate() {
    if new_index[i] != u32::MAX {
      new_index[i] = vertices.len() as u32;
      bounds.encapsulate(vertex.position);
      vertices.push(*vertex);
    }
  }
  for i in &mut indices {
    *i = new_index[*i as usize];
  }

  output.vertices = vertices;
  output.indices = indices;
  output.bounds = bounds;
}

#[cfg(test)]
#[path = "adaptive_test.rs"]
mod adaptive_test;
