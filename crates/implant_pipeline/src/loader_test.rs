use super::*;

use glam::IVec3;

use crate::source::InMemoryStore;
use crate::test_utils::*;

#[test]
fn test_partition_covers_range() {
  assert_eq!(partition(10, 4), vec![0..3, 3..6, 6..9, 9..10]);
  assert_eq!(partition(8, 8), (0..8).map(|i| i..i + 1).collect::<Vec<_>>());
  assert_eq!(partition(3, 8), vec![0..1, 1..2, 2..3]);
  assert_eq!(partition(5, 1), vec![0..5]);
  assert!(partition(0, 8).is_empty());
  // Zero workers behaves like one
  assert_eq!(partition(4, 0), vec![0..4]);
}

#[test]
fn test_identity_alignment_keeps_index_space() {
  let store = store_of(vec![sphere(4.0, DVec3::ZERO)]);
  let loader = SampleLoader::new(&store, 10.0);
  let sample = AlignedSample::identity(sample_id(0));

  let source = store.load_field(&sample.id).unwrap();
  let map = loader.alignment_map(&sample, &source);
  assert!(map.abs_diff_eq(DAffine3::IDENTITY, 1e-12));

  let field = loader.load(&sample).unwrap();
  assert_eq!(field.name(), "sample_0");
  assert_eq!(*field.transform(), DAffine3::IDENTITY);
  assert_eq!(interior(&field), interior(&source));
}

#[test]
fn test_translation_is_scaled_to_millimeters() {
  let store = store_of(vec![sphere(3.0, DVec3::ZERO)]);
  let loader = SampleLoader::new(&store, 10.0);
  // 0.5 world units = 5 voxels after the millimeter rescale
  let sample = AlignedSample::new(sample_id(0), DAffine3::from_translation(DVec3::new(0.5, 0.0, 0.0)));

  let field = loader.load(&sample).unwrap();
  assert!(field.value(IVec3::new(5, 0, 0)) < 0.0);
  assert!(field.value(IVec3::ZERO) > 0.0);
}

#[test]
fn test_batch_preserves_order() {
  let centers = [0.0, 20.0, 40.0, 60.0, 80.0];
  let fields = centers.iter().map(|&x| sphere(3.0, DVec3::new(x, 0.0, 0.0))).collect();
  let store = store_of(fields);
  let samples: Vec<_> = (0..centers.len()).map(|i| AlignedSample::identity(sample_id(i))).collect();

  let (loaded, stats) = ParallelBatchLoader::new(2, 10.0).load_all(&store, &samples).unwrap();

  assert_eq!(stats.sample_count, 5);
  assert_eq!(stats.chunk_count, 2);
  for (i, field) in loaded.iter().enumerate() {
    assert_eq!(field.name(), sample_id(i));
    assert!(field.value(IVec3::new(centers[i] as i32, 0, 0)) < 0.0);
  }
}

#[test]
fn test_batch_reports_failing_slot() {
  let store = store_of(vec![sphere(3.0, DVec3::ZERO)]);
  let samples = vec![
    AlignedSample::identity(sample_id(0)),
    AlignedSample::identity("missing"),
  ];

  let err = ParallelBatchLoader::new(4, 10.0).load_all(&store, &samples).unwrap_err();
  match err {
    PipelineError::SourceLoad { index, source_id, source } => {
      assert_eq!(index, 1);
      assert_eq!(source_id, "missing");
      assert!(matches!(source, FieldError::NotFound(_)));
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn test_batch_rejects_singular_alignment() {
  let store = store_of(vec![sphere(3.0, DVec3::ZERO)]);
  let samples = vec![AlignedSample::new(sample_id(0), DAffine3::from_scale(DVec3::new(1.0, 0.0, 1.0)))];

  let err = ParallelBatchLoader::new(1, 10.0).load_all(&store, &samples).unwrap_err();
  assert!(matches!(
    err,
    PipelineError::SourceLoad {
      source: FieldError::InvalidTransform { .. },
      ..
    }
  ));
}

#[test]
fn test_empty_batch() {
  let store = InMemoryStore::new();
  let (loaded, stats) = ParallelBatchLoader::new(8, 10.0).load_all(&store, &[]).unwrap();
  assert!(loaded.is_empty());
  assert_eq!(stats.chunk_count, 0);
}
