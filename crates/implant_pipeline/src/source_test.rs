use super::*;

use glam::DVec3;
use voxel_field::{level_set_sphere, write_json};

#[test]
fn test_from_parts_applies_scale_then_rotation_then_translation() {
  let sample = AlignedSample::from_parts(
    "a",
    DVec3::splat(2.0),
    DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2),
    DVec3::new(0.0, 0.0, 5.0),
  );
  let p = sample.transform.transform_point3(DVec3::X);
  assert!((p - DVec3::new(0.0, 2.0, 5.0)).length() < 1e-12);
}

#[test]
fn test_in_memory_store_returns_copies() {
  let store = InMemoryStore::new().with_field("sphere", level_set_sphere(2.0, DVec3::ZERO, 0.5, 2.0));
  let a = store.load_field("sphere").unwrap();
  let b = store.load_field("sphere").unwrap();
  assert_eq!(a, b);
  assert_eq!(store.len(), 1);
}

#[test]
fn test_in_memory_store_missing_id() {
  let store = InMemoryStore::new();
  assert!(matches!(store.load_field("nope"), Err(FieldError::NotFound(id)) if id == "nope"));
}

#[test]
fn test_directory_store_reads_json() {
  let dir = tempfile::tempdir().unwrap();
  let field = level_set_sphere(2.0, DVec3::ZERO, 0.5, 2.0).with_name("skull_01");
  write_json(&field, dir.path().join("skull_01.json")).unwrap();

  let store = DirectoryStore::new(dir.path());
  let loaded = store.load_field("skull_01").unwrap();
  assert_eq!(loaded, field);
  assert!(matches!(store.load_field("skull_02"), Err(FieldError::Io { .. })));
}
