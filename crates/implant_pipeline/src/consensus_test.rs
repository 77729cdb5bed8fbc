use super::*;

use glam::IVec3;
use voxel_field::CoordBBox;

use crate::test_utils::*;

fn three_cubes() -> Vec<VolumetricField> {
  vec![
    cube(IVec3::new(0, 0, 0), IVec3::new(3, 3, 3)),
    cube(IVec3::new(2, 0, 0), IVec3::new(5, 3, 3)),
    cube(IVec3::new(4, 0, 0), IVec3::new(7, 3, 3)),
  ]
}

#[test]
fn test_probability_is_vote_fraction() {
  let fields = three_cubes();
  let probability = combine(&fields);

  let expect = |x: i32| probability.value(IVec3::new(x, 1, 2));
  assert_eq!(expect(0), 1.0 / 3.0);
  assert_eq!(expect(2), 2.0 / 3.0);
  assert_eq!(expect(3), 2.0 / 3.0);
  assert_eq!(expect(4), 2.0 / 3.0);
  assert_eq!(expect(6), 1.0 / 3.0);
  assert!(!probability.is_active(IVec3::new(8, 1, 2)));
  assert_eq!(probability.value(IVec3::new(8, 1, 2)), 0.0);
}

#[test]
fn test_every_active_voxel_matches_its_votes() {
  let fields = three_cubes();
  let interiors: Vec<_> = fields.iter().map(interior).collect();
  let probability = combine(&fields);

  let mut checked = 0;
  for (coord, value) in probability.iter_active() {
    let votes = interiors.iter().filter(|set| set.contains(&coord.to_array())).count();
    assert!(votes > 0, "voxel {coord} is active without votes");
    assert_eq!(value, votes as f32 / 3.0, "voxel {coord}");
    checked += 1;
  }
  let union: std::collections::BTreeSet<_> = interiors.iter().flatten().copied().collect();
  assert_eq!(checked, union.len());
}

#[test]
fn test_result_is_independent_of_sample_order() {
  let fields = three_cubes();
  let reversed: Vec<_> = fields.iter().rev().cloned().collect();
  assert_eq!(combine(&fields), combine(&reversed));
}

#[test]
fn test_inactive_inside_tile_votes_for_every_voxel() {
  let mut field = VolumetricField::new(1.0);
  field.fill(CoordBBox::from_block(IVec3::ZERO), -1.0, false);
  field.fill(CoordBBox::from_block(IVec3::new(8, 0, 0)), 2.0, false);

  let mut accumulator = ConsensusAccumulator::new();
  accumulator.add(&field);
  assert_eq!(accumulator.counts().active_voxel_count(), 512);
  assert_eq!(accumulator.sample_count(), 1);

  let probability = accumulator.finish();
  assert_eq!(probability.active_voxel_count(), 512);
  assert_eq!(probability.value(IVec3::new(7, 7, 7)), 1.0);
  assert!(!probability.is_active(IVec3::new(8, 0, 0)));
}

#[test]
fn test_zero_counts_as_inside() {
  let mut field = VolumetricField::new(1.0);
  field.set_value_on(IVec3::new(1, 2, 3), 0.0);
  field.set_value_off(IVec3::new(1, 2, 4), 0.0);
  field.set_value_on(IVec3::new(1, 2, 5), 1e-6);

  let probability = combine(&[field, VolumetricField::new(1.0)]);
  assert_eq!(probability.value(IVec3::new(1, 2, 3)), 0.5);
  assert_eq!(probability.value(IVec3::new(1, 2, 4)), 0.5);
  assert!(!probability.is_active(IVec3::new(1, 2, 5)));
}

#[test]
fn test_empty_input() {
  let probability = combine(&[]);
  assert!(probability.is_empty());
  assert_eq!(probability.name(), PROBABILITY_FIELD_NAME);
}
