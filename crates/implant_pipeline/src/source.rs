//! Sample sources: aligned placements and the stores their fields come from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::{DAffine3, DQuat, DVec3};
use voxel_field::{read_json, FieldError, VolumetricField};

/// One source object together with its resolved placement in the common
/// frame.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedSample {
  /// Identifier the field is loaded by.
  pub id: String,

  /// Rigid (optionally scaled) placement in the common frame.
  pub transform: DAffine3,
}

impl AlignedSample {
  pub fn new(id: impl Into<String>, transform: DAffine3) -> Self {
    Self {
      id: id.into(),
      transform,
    }
  }

  /// Sample placed with the identity transform.
  pub fn identity(id: impl Into<String>) -> Self {
    Self::new(id, DAffine3::IDENTITY)
  }

  /// Compose scale, then rotation, then translation.
  pub fn from_parts(
    id: impl Into<String>,
    scale: DVec3,
    rotation: DQuat,
    translation: DVec3,
  ) -> Self {
    Self::new(
      id,
      DAffine3::from_scale_rotation_translation(scale, rotation, translation),
    )
  }
}

/// Persistent storage of raw source fields.
///
/// Implementations are shared by every loader worker.
pub trait FieldStore: Send + Sync {
  /// Load the native field of source `id`.
  fn load_field(&self, id: &str) -> Result<VolumetricField, FieldError>;
}

impl<T: FieldStore + ?Sized> FieldStore for &T {
  fn load_field(&self, id: &str) -> Result<VolumetricField, FieldError> {
    (**self).load_field(id)
  }
}

/// Fields stored as `<root>/<id>.json`.
#[derive(Clone, Debug)]
pub struct DirectoryStore {
  root: PathBuf,
}

impl DirectoryStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// File a source id is read from.
  pub fn path_of(&self, id: &str) -> PathBuf {
    self.root.join(format!("{id}.json"))
  }
}

impl FieldStore for DirectoryStore {
  fn load_field(&self, id: &str) -> Result<VolumetricField, FieldError> {
    read_json(self.path_of(id))
  }
}

/// Fields held in memory, keyed by id.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
  fields: HashMap<String, VolumetricField>,
}

impl InMemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, id: impl Into<String>, field: VolumetricField) {
    self.fields.insert(id.into(), field);
  }

  pub fn with_field(mut self, id: impl Into<String>, field: VolumetricField) -> Self {
    self.insert(id, field);
    self
  }

  pub fn len(&self) -> usize {
    self.fields.len()
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }
}

impl FieldStore for InMemoryStore {
  fn load_field(&self, id: &str) -> Result<VolumetricField, FieldError> {
    self
      .fields
      .get(id)
      .cloned()
      .ok_or_else(|| FieldError::NotFound(id.to_string()))
  }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod source_test;
