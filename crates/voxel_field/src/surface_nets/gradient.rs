//! Vertex normals: field gradient or triangle geometry.

use glam::Vec3A;

use crate::types::MeshOutput;

const FALLBACK_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

/// Unit gradient of a cell from its 8 corner samples.
///
/// Each component is the difference between the sums of the two opposing
/// faces of the cell. Degenerate cells fall back to +Y.
#[inline]
pub fn compute(samples: &[f32; 8]) -> [f32; 3] {
  let gx = (samples[1] + samples[3] + samples[5] + samples[7])
    - (samples[0] + samples[2] + samples[4] + samples[6]);
  let gy = (samples[2] + samples[3] + samples[6] + samples[7])
    - (samples[0] + samples[1] + samples[4] + samples[5]);
  let gz = (samples[4] + samples[5] + samples[6] + samples[7])
    - (samples[0] + samples[1] + samples[2] + samples[3]);

  normalize_or_fallback(Vec3A::new(gx, gy, gz))
}

#[inline]
pub(crate) fn normalize_or_fallback(v: Vec3A) -> [f32; 3] {
  let len_sq = v.length_squared();
  if len_sq < 1e-12 {
    return FALLBACK_NORMAL;
  }
  (v * len_sq.sqrt().recip()).to_array()
}

/// Recalculate normals from triangle geometry, weighting each face by its
/// interior angle at the vertex.
pub fn recalculate_from_geometry(output: &mut MeshOutput) {
  let mut sums = vec![Vec3A::ZERO; output.vertices.len()];

  for tri in output.indices.chunks_exact(3) {
    let ids = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
    let p = ids.map(|i| Vec3A::from_array(output.vertices[i].position));

    let face = (p[1] - p[0]).cross(p[2] - p[0]);
    let face_len_sq = face.length_squared();
    if face_len_sq < 1e-12 {
      continue;
    }
    let face_unit = face * face_len_sq.sqrt().recip();

    for k in 0..3 {
      let e1 = p[(k + 1) % 3] - p[k];
      let e2 = p[(k + 2) % 3] - p[k];
      sums[ids[k]] += face_unit * vertex_angle(e1, e2);
    }
  }

  for (vertex, sum) in output.vertices.iter_mut().zip(sums) {
    vertex.normal = normalize_or_fallback(sum);
  }
}

/// Angle between two edge vectors, zero for degenerate edges.
#[inline]
fn vertex_angle(e1: Vec3A, e2: Vec3A) -> f32 {
  let len1_sq = e1.length_squared();
  let len2_sq = e2.length_squared();
  if len1_sq < 1e-12 || len2_sq < 1e-12 {
    return 0.0;
  }
  let cos_angle = e1.dot(e2) / (len1_sq.sqrt() * len2_sq.sqrt());
  cos_angle.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
#[path = "gradient_test.rs"]
mod gradient_test;
