use super::*;

use glam::DVec3;

use crate::test_utils::*;

#[test]
fn test_stage_kinds() {
  let names: Vec<_> = StageKind::ALL.iter().map(|k| k.name()).collect();
  assert_eq!(names, ["Segment SDF", "Filter Grids", "Level Set Filter"]);

  for kind in StageKind::ALL {
    let stage = kind.create();
    assert_eq!(stage.kind(), kind);
    assert!(stage.is_enabled());
    assert!(!stage.has_data());
  }
}

#[test]
fn test_kind_parsing() {
  assert_eq!("segment".parse::<StageKind>().unwrap(), StageKind::Segment);
  assert_eq!("level_set_filter".parse::<StageKind>().unwrap(), StageKind::LevelSetFilter);
  assert!(matches!(
    "border".parse::<StageKind>(),
    Err(PipelineError::UnsupportedOperator(kind)) if kind == "border"
  ));
}

#[test]
fn test_execute_replaces_outputs() {
  let mut stage = GridOperator::new(FilterOperator::take(1, 0));
  stage.bind(shared(vec![sphere(2.0, DVec3::ZERO), sphere(3.0, DVec3::ZERO)]));
  stage.execute();
  assert!(stage.has_data());
  assert_eq!(stage.in_count(), 2);
  assert_eq!(stage.out_count(), 1);

  stage.bind(Vec::new());
  stage.execute();
  assert_eq!(stage.out_count(), 0);
}

#[test]
fn test_parameters_are_editable() {
  let mut stage = StageKind::Filter.create();
  if let Operator::Filter(filter) = stage.operator_mut() {
    filter.take_count = 3;
  }
  assert!(matches!(stage.operator(), Operator::Filter(f) if f.take_count == 3));
}

#[test]
fn test_empty_inputs_are_counted() {
  let mut stage = GridOperator::new(SegmentOperator);
  stage.bind(shared(vec![sphere(2.0, DVec3::ZERO), empty_sample(), empty_sample()]));
  assert_eq!(stage.empty_input_count(), 2);

  // Each empty field segments into one empty field, sorted last
  stage.execute();
  assert_eq!(stage.out_count(), 3);
  assert!(stage.out_grids()[0].active_voxel_count() > 0);
  assert!(stage.out_grids()[1..].iter().all(|f| f.active_voxel_count() == 0));

  stage.bind(Vec::new());
  assert_eq!(stage.empty_input_count(), 0);
}
