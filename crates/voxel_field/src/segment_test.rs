use glam::DVec3;

use super::*;
use crate::primitives::level_set_sphere;
use crate::csg::csg_union;

fn two_spheres(big: f64, small: f64) -> VolumetricField {
  let mut field = level_set_sphere(big, DVec3::new(-10.0, 0.0, 0.0), 1.0, 2.0);
  let other = level_set_sphere(small, DVec3::new(10.0, 0.0, 0.0), 1.0, 2.0);
  csg_union(&mut field, &other);
  field
}

#[test]
fn test_single_sphere_is_one_segment() {
  let sphere = level_set_sphere(4.0, DVec3::ZERO, 1.0, 2.0);
  let segments = segment_sdf(&sphere);

  assert_eq!(segments.len(), 1);
  assert_eq!(segments[0].active_voxel_count(), sphere.active_voxel_count());
  assert!(segments[0].value(IVec3::ZERO) < 0.0);
}

#[test]
fn test_disjoint_spheres_split() {
  let field = two_spheres(5.0, 3.0);
  let segments = segment_sdf(&field);

  assert_eq!(segments.len(), 2);
  let total: u64 = segments.iter().map(|s| s.active_voxel_count()).sum();
  assert_eq!(total, field.active_voxel_count());

  // Left sphere is discovered first
  assert!(segments[0].value(IVec3::new(-10, 0, 0)) < 0.0);
  assert!(segments[0].value(IVec3::new(10, 0, 0)) >= 0.0);
  assert!(segments[1].value(IVec3::new(10, 0, 0)) < 0.0);
  assert!(segments[1].value(IVec3::new(-10, 0, 0)) >= 0.0);
  assert!(segments[0].active_voxel_count() > segments[1].active_voxel_count());
}

#[test]
fn test_segments_keep_metadata() {
  let field = two_spheres(3.0, 3.0).with_name("skull");
  for segment in segment_sdf(&field) {
    assert_eq!(segment.name(), "skull");
    assert_eq!(segment.background(), field.background());
    assert_eq!(segment.transform(), field.transform());
  }
}

#[test]
fn test_no_interior_yields_empty_field() {
  let mut field = VolumetricField::new(2.0).with_name("noise");
  field.set_value_on(IVec3::ZERO, 1.0);

  let segments = segment_sdf(&field);

  assert_eq!(segments.len(), 1);
  assert!(segments[0].is_empty());
  assert_eq!(segments[0].name(), "noise");
}

#[test]
fn test_empty_field() {
  let segments = segment_sdf(&VolumetricField::new(3.0));
  assert_eq!(segments.len(), 1);
  assert_eq!(segments[0].active_voxel_count(), 0);
}
