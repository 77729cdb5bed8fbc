use super::*;

use glam::DVec3;
use voxel_field::csg_union;

use crate::operators::{Operator, StageKind};
use crate::test_utils::*;

fn kinds(pipeline: &Pipeline) -> Vec<StageKind> {
  pipeline.stages().iter().map(GridOperator::kind).collect()
}

#[test]
fn test_default_stages() {
  let pipeline = Pipeline::default_stages();
  assert_eq!(
    kinds(&pipeline),
    [
      StageKind::Segment,
      StageKind::Filter,
      StageKind::LevelSetFilter,
      StageKind::Segment,
      StageKind::Filter,
    ]
  );
  assert!(matches!(
    pipeline.stage(2).map(GridOperator::operator),
    Some(Operator::LevelSetFilter(op)) if op.iterations == 4
  ));
  assert_eq!(pipeline.wiring_mode(), WiringMode::Bypass);
}

#[test]
fn test_editing() {
  let mut pipeline = Pipeline::new();
  assert!(pipeline.is_empty());
  pipeline.push(StageKind::Segment.create());
  pipeline.push(StageKind::Filter.create());
  pipeline.insert(10, StageKind::LevelSetFilter.create());
  assert_eq!(kinds(&pipeline), [StageKind::Segment, StageKind::Filter, StageKind::LevelSetFilter]);

  assert!(pipeline.move_up(2));
  assert_eq!(kinds(&pipeline), [StageKind::Segment, StageKind::LevelSetFilter, StageKind::Filter]);
  assert!(!pipeline.move_up(0));
  assert!(pipeline.move_down(0));
  assert_eq!(kinds(&pipeline), [StageKind::LevelSetFilter, StageKind::Segment, StageKind::Filter]);
  assert!(!pipeline.move_down(2));

  assert!(pipeline.set_enabled(1, false));
  assert!(!pipeline.set_enabled(7, false));
  assert!(!pipeline.stages()[1].is_enabled());

  let removed = pipeline.remove(0).map(|s| s.kind());
  assert_eq!(removed, Some(StageKind::LevelSetFilter));
  assert!(pipeline.remove(5).is_none());
  assert_eq!(pipeline.len(), 2);
}

#[test]
fn test_empty_pipeline_passes_input_through() {
  let input = shared(vec![sphere(3.0, DVec3::ZERO)]);
  let result = Pipeline::new().execute(&input);
  assert_eq!(result.len(), 1);
  assert!(std::sync::Arc::ptr_eq(&result[0], &input[0]));
}

#[test]
fn test_default_stages_keep_largest_island() {
  let mut field = sphere(6.0, DVec3::ZERO);
  csg_union(&mut field, &sphere(2.0, DVec3::new(25.0, 0.0, 0.0)));

  let mut pipeline = Pipeline::default_stages();
  let result = pipeline.execute(&shared(vec![field]));

  assert_eq!(result.len(), 1);
  assert!(result[0].value(glam::IVec3::ZERO) < 0.0);
  assert!(result[0].value(glam::IVec3::new(25, 0, 0)) > 0.0);
  assert_eq!(pipeline.stages()[0].out_count(), 2);
  assert!(pipeline.stages().iter().all(GridOperator::has_data));
}

#[test]
fn test_segment_then_filter_orders_islands() {
  let mut field = sphere(2.0, DVec3::new(-20.0, 0.0, 0.0));
  csg_union(&mut field, &sphere(5.0, DVec3::ZERO));
  csg_union(&mut field, &sphere(3.5, DVec3::new(20.0, 0.0, 0.0)));

  let mut pipeline = Pipeline::new()
    .with_stage(StageKind::Segment.create())
    .with_stage(GridOperator::new(crate::operators::FilterOperator::take(2, 0)));
  let result = pipeline.execute(&shared(vec![field]));

  assert_eq!(result.len(), 2);
  assert!(result[0].active_voxel_count() >= result[1].active_voxel_count());
  assert!(result[0].value(glam::IVec3::ZERO) < 0.0);
  assert!(result[1].value(glam::IVec3::new(20, 0, 0)) < 0.0);
}
