//! Smoothing filters for narrow-band level sets.
//!
//! Every filter updates active voxels only. Neighbours are read from the
//! unmodified field (inactive neighbours at their stored, saturated value),
//! the new values are computed in parallel and written back in one pass.
//! Results are clamped to `±background`.

use glam::IVec3;
use rayon::prelude::*;

use crate::constants::FACE_NEIGHBORS;
use crate::field::VolumetricField;

/// Time step of the explicit Laplacian and curvature updates (voxel units).
const DT: f32 = 1.0 / 6.0;

/// Number of box passes approximating one Gaussian pass.
const GAUSSIAN_BOX_PASSES: usize = 4;

/// In-place smoothing of a level set.
pub struct LevelSetFilter<'a> {
  field: &'a mut VolumetricField,
}

impl<'a> LevelSetFilter<'a> {
  pub fn new(field: &'a mut VolumetricField) -> Self {
    Self { field }
  }

  /// One step of Laplacian flow: each value moves to its 6-neighbour mean.
  pub fn laplacian(&mut self) {
    #[cfg(feature = "tracing")]
    let _span = tracing::trace_span!("laplacian").entered();

    self.apply(|field, coord, value| {
      let sum: f32 = FACE_NEIGHBORS.iter().map(|&o| field.value(coord + o)).sum();
      value + DT * (sum - 6.0 * value)
    });
  }

  /// Gaussian smoothing approximated by repeated box filtering.
  pub fn gaussian(&mut self, width: usize) {
    #[cfg(feature = "tracing")]
    let _span = tracing::trace_span!("gaussian", width).entered();

    for _ in 0..GAUSSIAN_BOX_PASSES {
      self.mean(width);
    }
  }

  /// Box filter over the `(2 * width + 1)³` neighbourhood.
  pub fn mean(&mut self, width: usize) {
    #[cfg(feature = "tracing")]
    let _span = tracing::trace_span!("mean", width).entered();

    let w = width as i32;
    let n = ((2 * w + 1) * (2 * w + 1) * (2 * w + 1)) as f32;
    self.apply(|field, coord, _| {
      let mut sum = 0.0;
      for dx in -w..=w {
        for dy in -w..=w {
          for dz in -w..=w {
            sum += field.value(coord + IVec3::new(dx, dy, dz));
          }
        }
      }
      sum / n
    });
  }

  /// Median over the `(2 * width + 1)³` neighbourhood.
  pub fn median(&mut self, width: usize) {
    #[cfg(feature = "tracing")]
    let _span = tracing::trace_span!("median", width).entered();

    let w = width as i32;
    self.apply(|field, coord, _| {
      let mut samples = Vec::with_capacity(((2 * w + 1) * (2 * w + 1) * (2 * w + 1)) as usize);
      for dx in -w..=w {
        for dy in -w..=w {
          for dz in -w..=w {
            samples.push(field.value(coord + IVec3::new(dx, dy, dz)));
          }
        }
      }
      let mid = samples.len() / 2;
      let (_, median, _) = samples.select_nth_unstable_by(mid, f32::total_cmp);
      *median
    });
  }

  /// One step of mean-curvature flow using central differences.
  pub fn mean_curvature(&mut self) {
    #[cfg(feature = "tracing")]
    let _span = tracing::trace_span!("mean_curvature").entered();

    self.apply(|field, coord, value| value + DT * curvature_speed(field, coord, value));
  }

  fn apply<F>(&mut self, kernel: F)
  where
    F: Fn(&VolumetricField, IVec3, f32) -> f32 + Sync,
  {
    let limit = self.field.background().abs();
    let active: Vec<(IVec3, f32)> = self.field.iter_active().collect();
    let field: &VolumetricField = &*self.field;
    let updated: Vec<f32> = active
      .par_iter()
      .map(|&(coord, value)| kernel(field, coord, value).clamp(-limit, limit))
      .collect();

    for ((coord, _), value) in active.into_iter().zip(updated) {
      self.field.set_value_only(coord, value);
    }
  }
}

/// `κ |∇φ|` at `coord`, zero where the gradient vanishes.
fn curvature_speed(field: &VolumetricField, coord: IVec3, center: f32) -> f32 {
  let at = |x: i32, y: i32, z: i32| field.value(coord + IVec3::new(x, y, z));

  let (xp, xm) = (at(1, 0, 0), at(-1, 0, 0));
  let (yp, ym) = (at(0, 1, 0), at(0, -1, 0));
  let (zp, zm) = (at(0, 0, 1), at(0, 0, -1));

  let dx = 0.5 * (xp - xm);
  let dy = 0.5 * (yp - ym);
  let dz = 0.5 * (zp - zm);
  let grad_sq = dx * dx + dy * dy + dz * dz;
  if grad_sq < 1e-12 {
    return 0.0;
  }

  let dxx = xp - 2.0 * center + xm;
  let dyy = yp - 2.0 * center + ym;
  let dzz = zp - 2.0 * center + zm;
  let dxy = 0.25 * (at(1, 1, 0) - at(1, -1, 0) - at(-1, 1, 0) + at(-1, -1, 0));
  let dxz = 0.25 * (at(1, 0, 1) - at(1, 0, -1) - at(-1, 0, 1) + at(-1, 0, -1));
  let dyz = 0.25 * (at(0, 1, 1) - at(0, 1, -1) - at(0, -1, 1) + at(0, -1, -1));

  let numerator = dx * dx * (dyy + dzz) + dy * dy * (dxx + dzz) + dz * dz * (dxx + dyy)
    - 2.0 * (dx * dy * dxy + dx * dz * dxz + dy * dz * dyz);
  numerator / grad_sq
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod filter_test;
