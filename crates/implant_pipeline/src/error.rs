//! Pipeline error types.

use thiserror::Error;
use voxel_field::FieldError;

/// Failure of one reconstruction run.
///
/// Every variant is fatal to the run that raised it; no partial result is
/// returned and the state of earlier runs is left untouched.
#[derive(Debug, Error)]
pub enum PipelineError {
  /// A source field could not be loaded or resampled.
  #[error("failed to load source #{index} ({source_id})")]
  SourceLoad {
    index: usize,
    source_id: String,
    #[source]
    source: FieldError,
  },

  /// Target subtraction was requested but no target is configured.
  #[error("target subtraction requested without a target")]
  MissingTarget,

  /// The target field could not be loaded or resampled.
  #[error("failed to load target ({source_id})")]
  TargetLoad {
    source_id: String,
    #[source]
    source: FieldError,
  },

  #[error("unsupported operator type `{0}`")]
  UnsupportedOperator(String),

  #[error("unsupported level set filter kernel `{0}`")]
  UnsupportedKernel(String),

  #[error("unsupported filter mode `{0}`")]
  UnsupportedFilterMode(String),

  #[error("no input sources given")]
  NoSources,

  /// The loader's worker pool could not be created.
  #[error("failed to build worker pool: {0}")]
  WorkerPool(String),
}
