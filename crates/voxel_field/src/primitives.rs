//! Analytic narrow-band level sets.

use glam::{DAffine3, DVec3, IVec3};

use crate::bounds::CoordBBox;
use crate::field::VolumetricField;

/// Narrow-band level set of a sphere.
///
/// `radius` and `center` are in world units. Values within `half_width`
/// voxels of the surface are active signed distances; deeper interior voxels
/// are stored inactive at `-background`.
pub fn level_set_sphere(
  radius: f64,
  center: DVec3,
  voxel_size: f64,
  half_width: f64,
) -> VolumetricField {
  let center_index = center / voxel_size;
  let extent = (radius / voxel_size + half_width).ceil() as i32 + 1;
  let bbox = CoordBBox::new(
    center_index.floor().as_ivec3() - IVec3::splat(extent),
    center_index.ceil().as_ivec3() + IVec3::splat(extent),
  );
  build(bbox, voxel_size, half_width, |p| p.distance(center) - radius)
}

/// Narrow-band level set of an axis-aligned box given by world-space corners.
pub fn level_set_box(min: DVec3, max: DVec3, voxel_size: f64, half_width: f64) -> VolumetricField {
  let pad = half_width.ceil() as i32 + 1;
  let bbox = CoordBBox::new(
    (min / voxel_size).floor().as_ivec3() - IVec3::splat(pad),
    (max / voxel_size).ceil().as_ivec3() + IVec3::splat(pad),
  );
  let center = (min + max) * 0.5;
  let half = (max - min) * 0.5;
  build(bbox, voxel_size, half_width, |p| {
    let q = (p - center).abs() - half;
    q.max(DVec3::ZERO).length() + q.max_element().min(0.0)
  })
}

fn build(
  bbox: CoordBBox,
  voxel_size: f64,
  half_width: f64,
  sdf: impl Fn(DVec3) -> f64,
) -> VolumetricField {
  let background = (half_width * voxel_size) as f32;
  let mut field = VolumetricField::new(background)
    .with_transform(DAffine3::from_scale(DVec3::splat(voxel_size)));

  for coord in bbox.iter() {
    let distance = sdf(coord.as_dvec3() * voxel_size) as f32;
    if distance.abs() < background {
      field.set_value_on(coord, distance);
    } else if distance < 0.0 {
      field.set_value_off(coord, -background);
    }
  }
  field.prune(0.0);
  field
}
