//! Error type for field persistence and transform handling.

use std::path::PathBuf;

/// Failure while loading, storing or transforming a field.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
  #[error("i/o error on {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("field `{0}` not found")]
  NotFound(String),

  #[error("malformed field data: {0}")]
  Format(#[from] serde_json::Error),

  #[error("field data is inconsistent: {0}")]
  Corrupt(String),

  #[error("transform is not invertible (determinant {determinant})")]
  InvalidTransform { determinant: f64 },
}

impl FieldError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    FieldError::Io {
      path: path.into(),
      source,
    }
  }
}
