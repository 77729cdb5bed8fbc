//! Vertex placement inside a sign-changing cell.

use glam::Vec3A;

/// Position of cell corner `index` (bit 0 = x, bit 1 = y, bit 2 = z).
#[inline]
pub fn corner_position(index: usize) -> Vec3A {
  Vec3A::new(
    (index & 1) as f32,
    ((index >> 1) & 1) as f32,
    ((index >> 2) & 1) as f32,
  )
}

/// The 12 cell edges as `(corner, corner + axis)` pairs.
pub fn cell_edges() -> impl Iterator<Item = (usize, usize)> {
  (0..8usize).flat_map(|corner| {
    (0..3)
      .filter(move |axis| corner & (1 << axis) == 0)
      .map(move |axis| (corner, corner | (1 << axis)))
  })
}

/// Cell-local vertex at the mean of the linearly interpolated edge
/// crossings, or the cell center when no edge crosses.
///
/// `samples` are corner values with the iso value already subtracted.
#[inline]
pub fn cell_vertex(samples: &[f32; 8]) -> Vec3A {
  let (sum, count) = cell_edges()
    .filter(|&(a, b)| (samples[a] < 0.0) != (samples[b] < 0.0))
    .fold((Vec3A::ZERO, 0u32), |(sum, count), (a, b)| {
      let t = samples[a] / (samples[a] - samples[b]);
      (sum + corner_position(a).lerp(corner_position(b), t), count + 1)
    });

  match count {
    0 => Vec3A::splat(0.5),
    n => sum / n as f32,
  }
}

#[cfg(test)]
#[path = "vertex_calc_test.rs"]
mod vertex_calc_test;
