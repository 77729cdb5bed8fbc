use super::*;

#[test]
fn test_unallocated_reads_background() {
  let field = VolumetricField::new(3.0);
  assert_eq!(field.probe(IVec3::new(100, -5, 7)), (3.0, false));
  assert!(field.is_empty());
  assert_eq!(field.active_voxel_count(), 0);
  assert!(field.active_bounding_box().is_none());
}

#[test]
fn test_set_value_on_and_off() {
  let mut field = VolumetricField::new(3.0);
  field.set_value_on(IVec3::new(-1, 2, 9), -0.5);
  field.set_value_off(IVec3::new(0, 0, 0), 1.5);

  assert_eq!(field.probe(IVec3::new(-1, 2, 9)), (-0.5, true));
  assert_eq!(field.probe(IVec3::ZERO), (1.5, false));
  // Neighbour in the same leaf keeps the background
  assert_eq!(field.probe(IVec3::new(-2, 2, 9)), (3.0, false));
  assert_eq!(field.active_voxel_count(), 1);
  assert_eq!(field.leaf_count(), 2);
}

#[test]
fn test_set_value_only_keeps_state() {
  let mut field = VolumetricField::new(1.0);
  field.set_value_on(IVec3::ONE, 0.25);
  field.set_value_only(IVec3::ONE, 0.75);
  field.set_value_only(IVec3::ZERO, 0.5);

  assert_eq!(field.probe(IVec3::ONE), (0.75, true));
  assert_eq!(field.probe(IVec3::ZERO), (0.5, false));

  field.set_active_state(IVec3::ONE, false);
  assert!(!field.is_active(IVec3::ONE));
}

#[test]
fn test_fill_full_block_makes_tile() {
  let mut field = VolumetricField::new(3.0);
  field.fill(CoordBBox::new(IVec3::ZERO, IVec3::splat(7)), -3.0, false);

  assert_eq!(field.tile_count(), 1);
  assert_eq!(field.leaf_count(), 0);
  assert_eq!(field.probe(IVec3::new(4, 4, 4)), (-3.0, false));
}

#[test]
fn test_fill_partial_region() {
  let mut field = VolumetricField::new(3.0);
  let bbox = CoordBBox::new(IVec3::new(-2, 0, 0), IVec3::new(9, 7, 7));
  field.fill(bbox, 0.5, true);

  assert_eq!(field.active_voxel_count(), bbox.volume());
  // Block [0,8) is covered, blocks at x=-8 and x=8 are partial
  assert_eq!(field.tile_count(), 1);
  assert_eq!(field.leaf_count(), 2);
  assert_eq!(field.active_bounding_box(), Some(bbox));
}

#[test]
fn test_set_value_inside_tile_densifies() {
  let mut field = VolumetricField::new(3.0);
  field.fill(CoordBBox::from_block(IVec3::ZERO), 1.0, true);
  field.set_value_off(IVec3::new(1, 2, 3), 2.0);

  assert_eq!(field.leaf_count(), 1);
  assert_eq!(field.probe(IVec3::new(1, 2, 3)), (2.0, false));
  assert_eq!(field.probe(IVec3::new(3, 2, 1)), (1.0, true));
  assert_eq!(field.active_voxel_count(), 511);
}

#[test]
fn test_iter_active_expands_tiles() {
  let mut field = VolumetricField::new(3.0);
  field.fill(CoordBBox::from_block(IVec3::splat(8)), 0.0, true);
  field.fill(CoordBBox::from_block(IVec3::ZERO), -3.0, false);
  field.set_value_on(IVec3::new(-1, -1, -1), -1.0);

  let active: Vec<_> = field.iter_active().collect();
  assert_eq!(active.len(), 513);
  assert!(active.iter().all(|(c, _)| field.is_active(*c)));
  // Block keys iterate in ascending order
  assert_eq!(active[0], (IVec3::new(-1, -1, -1), -1.0));
}

#[test]
fn test_iter_all_visits_inactive_regions() {
  let mut field = VolumetricField::new(3.0);
  field.fill(CoordBBox::from_block(IVec3::ZERO), -3.0, false);
  field.set_value_on(IVec3::new(8, 0, 0), -0.5);

  let regions: Vec<_> = field.iter_all().collect();
  // One tile plus one full leaf
  assert_eq!(regions.len(), 1 + BLOCK_VOXELS);

  let tiles: Vec<_> = regions
    .iter()
    .filter(|r| matches!(r, ValueRegion::Tile { .. }))
    .collect();
  assert_eq!(tiles.len(), 1);
  assert_eq!(tiles[0].value(), -3.0);
  assert!(!tiles[0].is_active());

  let active_voxels = regions.iter().filter(|r| r.is_active()).count();
  assert_eq!(active_voxels, 1);
}

#[test]
fn test_prune_collapses_uniform_leaves() {
  let mut field = VolumetricField::new(3.0);
  for coord in CoordBBox::from_block(IVec3::ZERO).iter() {
    field.set_value_on(coord, 0.5);
  }
  // Inactive leaf at the background value disappears entirely
  field.set_value_off(IVec3::new(20, 0, 0), 3.0);
  // Mixed leaf survives
  field.set_value_on(IVec3::new(-3, 0, 0), 0.5);
  assert_eq!(field.leaf_count(), 3);

  let before = field.clone();
  field.prune(0.0);

  assert_eq!(field.tile_count(), 1);
  assert_eq!(field.leaf_count(), 1);
  assert_eq!(field.active_voxel_count(), before.active_voxel_count());
  for (coord, value) in before.iter_active() {
    assert_eq!(field.probe(coord), (value, true));
  }
}

#[test]
fn test_prune_respects_tolerance() {
  let mut field = VolumetricField::new(3.0);
  field.fill(CoordBBox::from_block(IVec3::ZERO), 1.0, false);
  field.set_value_off(IVec3::ONE, 1.05);

  let mut strict = field.clone();
  strict.prune(0.0);
  assert_eq!(strict.leaf_count(), 1);

  field.prune(0.1);
  assert_eq!(field.leaf_count(), 0);
  assert_eq!(field.tile_count(), 1);
}

#[test]
fn test_map_active_only_touches_active() {
  let mut field = VolumetricField::new(3.0);
  field.set_value_on(IVec3::ZERO, 2.0);
  field.set_value_off(IVec3::ONE, 2.0);
  field.fill(CoordBBox::from_block(IVec3::splat(8)), 4.0, true);

  field.map_active(|_, v| v / 2.0);

  assert_eq!(field.value(IVec3::ZERO), 1.0);
  assert_eq!(field.value(IVec3::ONE), 2.0);
  assert_eq!(field.value(IVec3::splat(9)), 2.0);
}

#[test]
fn test_transform_roundtrip() {
  let transform = DAffine3::from_scale_rotation_translation(
    DVec3::splat(0.5),
    glam::DQuat::from_rotation_y(0.3),
    DVec3::new(1.0, 2.0, 3.0),
  );
  let field = VolumetricField::new(1.0).with_transform(transform);

  let world = field.index_to_world(DVec3::new(4.0, 5.0, 6.0));
  let back = field.world_to_index(world).unwrap();
  assert!((back - DVec3::new(4.0, 5.0, 6.0)).length() < 1e-9);
  assert!((field.voxel_size() - 0.5).abs() < 1e-12);

  let singular = VolumetricField::new(1.0).with_transform(DAffine3::from_scale(DVec3::ZERO));
  assert!(singular.world_to_index(DVec3::ONE).is_none());
}

#[test]
fn test_clone_is_deep() {
  let mut field = VolumetricField::new(3.0).with_name("a");
  field.set_value_on(IVec3::ZERO, -1.0);
  let copy = field.clone();
  field.set_value_on(IVec3::ZERO, 1.0);

  assert_eq!(copy.value(IVec3::ZERO), -1.0);
  assert_eq!(copy.name(), "a");
  assert_ne!(copy, field);
}
