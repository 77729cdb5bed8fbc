//! Affine resampling of one field into another.

use glam::{DAffine3, DVec3, IVec3};
use rayon::prelude::*;

use crate::bounds::CoordBBox;
use crate::error::FieldError;
use crate::field::VolumetricField;

/// Smallest determinant accepted for a resampling map.
const MIN_DETERMINANT: f64 = 1e-12;

/// Trilinear ("box") sample of `field` at a fractional index position.
///
/// Returns the interpolated value and the active state of the nearest voxel.
pub fn sample_box(field: &VolumetricField, p: DVec3) -> (f32, bool) {
  let base = p.floor();
  let t = (p - base).as_vec3();
  let b = base.as_ivec3();

  let c000 = field.value(b);
  let c100 = field.value(b + IVec3::X);
  let c010 = field.value(b + IVec3::Y);
  let c110 = field.value(b + IVec3::new(1, 1, 0));
  let c001 = field.value(b + IVec3::Z);
  let c101 = field.value(b + IVec3::new(1, 0, 1));
  let c011 = field.value(b + IVec3::new(0, 1, 1));
  let c111 = field.value(b + IVec3::ONE);

  let x00 = c000 + (c100 - c000) * t.x;
  let x10 = c010 + (c110 - c010) * t.x;
  let x01 = c001 + (c101 - c001) * t.x;
  let x11 = c011 + (c111 - c011) * t.x;
  let y0 = x00 + (x10 - x00) * t.y;
  let y1 = x01 + (x11 - x01) * t.y;
  let value = y0 + (y1 - y0) * t.z;

  (value, field.is_active(p.round().as_ivec3()))
}

/// Destination-space box covering the image of `bbox` under `map`.
pub fn transformed_bbox(bbox: &CoordBBox, map: &DAffine3) -> CoordBBox {
  let lo = bbox.min.as_dvec3();
  let hi = bbox.max.as_dvec3();
  let mut min = DVec3::splat(f64::INFINITY);
  let mut max = DVec3::splat(f64::NEG_INFINITY);
  for corner in 0..8 {
    let p = DVec3::new(
      if corner & 1 == 0 { lo.x } else { hi.x },
      if corner & 2 == 0 { lo.y } else { hi.y },
      if corner & 4 == 0 { lo.z } else { hi.z },
    );
    let q = map.transform_point3(p);
    min = min.min(q);
    max = max.max(q);
  }
  CoordBBox::new(min.floor().as_ivec3(), max.ceil().as_ivec3())
}

/// Resample `src` into `dst` under `map` (source index space to destination
/// index space) using trilinear interpolation.
///
/// A destination voxel is active when the nearest source voxel is active.
/// Inactive values equal to the destination background are not stored. Any
/// value already present in `dst` at a written coordinate is overwritten.
pub fn resample_into(
  src: &VolumetricField,
  dst: &mut VolumetricField,
  map: &DAffine3,
) -> Result<(), FieldError> {
  #[cfg(feature = "tracing")]
  let _span = tracing::debug_span!("resample_into").entered();

  let determinant = map.matrix3.determinant();
  if !determinant.is_finite() || determinant.abs() < MIN_DETERMINANT {
    return Err(FieldError::InvalidTransform { determinant });
  }
  let Some(src_box) = src.allocated_bounding_box() else {
    return Ok(());
  };

  let inverse = map.inverse();
  let dst_box = transformed_bbox(&src_box, map);
  let background = dst.background();

  // One slice per X column, collected in order so insertion is deterministic.
  let slices: Vec<Vec<(IVec3, f32, bool)>> = (dst_box.min.x..=dst_box.max.x)
    .into_par_iter()
    .map(|x| {
      let mut out = Vec::new();
      for y in dst_box.min.y..=dst_box.max.y {
        for z in dst_box.min.z..=dst_box.max.z {
          let coord = IVec3::new(x, y, z);
          let p = inverse.transform_point3(coord.as_dvec3());
          if !src_box.dilated(1).contains(p.floor().as_ivec3()) {
            continue;
          }
          let (value, active) = sample_box(src, p);
          if active || (value - background).abs() > f32::EPSILON {
            out.push((coord, value, active));
          }
        }
      }
      out
    })
    .collect();

  for (coord, value, active) in slices.into_iter().flatten() {
    if active {
      dst.set_value_on(coord, value);
    } else {
      dst.set_value_off(coord, value);
    }
  }
  Ok(())
}

#[cfg(test)]
#[path = "resample_test.rs"]
mod resample_test;
