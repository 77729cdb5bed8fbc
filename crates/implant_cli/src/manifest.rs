//! Run manifest parsing.
//!
//! A manifest names the aligned sources, the optional target, the
//! reconstruction parameters and the stage list of one reconstruction.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::{DQuat, DVec3, EulerRot};
use implant_pipeline::{
  build_stages, AlignedSample, DirectoryStore, FieldStore, Pipeline, ReconstructionConfig, StageConfig,
  WiringMode,
};
use serde::Deserialize;
use voxel_field::{read_json, FieldError, VolumetricField};

/// Root of a run manifest.
#[derive(Debug, Deserialize)]
pub struct RunManifest {
  /// Directory holding `<id>.json` fields, relative to the manifest.
  #[serde(default = "default_field_dir")]
  pub field_dir: PathBuf,
  /// Directory meshes are written to, relative to the manifest.
  #[serde(default = "default_output_dir")]
  pub output_dir: PathBuf,
  /// Stage wiring mode.
  #[serde(default)]
  pub wiring: WiringMode,
  #[serde(default)]
  pub reconstruction: ReconstructionConfig,
  pub sources: Vec<SourceEntry>,
  pub target: Option<SourceEntry>,
  /// Stage list; the default stage list when absent.
  pub stages: Option<Vec<StageConfig>>,
}

/// One source object and its placement.
#[derive(Debug, Deserialize)]
pub struct SourceEntry {
  pub id: String,
  /// Explicit field file, overriding `<field_dir>/<id>.json`.
  pub path: Option<PathBuf>,
  #[serde(default)]
  pub translation: [f64; 3],
  /// Rotation quaternion `[x, y, z, w]`.
  pub rotation: Option<[f64; 4]>,
  /// Rotation as XYZ euler angles in degrees.
  pub euler_degrees: Option<[f64; 3]>,
  #[serde(default)]
  pub scale: Scale,
}

/// Uniform or per-axis scale.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scale {
  Uniform(f64),
  Axes([f64; 3]),
}

impl Default for Scale {
  fn default() -> Self {
    Scale::Uniform(1.0)
  }
}

impl Scale {
  pub fn to_vec(self) -> DVec3 {
    match self {
      Scale::Uniform(s) => DVec3::splat(s),
      Scale::Axes(axes) => DVec3::from_array(axes),
    }
  }
}

fn default_field_dir() -> PathBuf {
  PathBuf::from("fields")
}

fn default_output_dir() -> PathBuf {
  PathBuf::from("output")
}

impl SourceEntry {
  /// Resolve the placement of this source.
  pub fn to_sample(&self) -> Result<AlignedSample> {
    let rotation = match (self.rotation, self.euler_degrees) {
      (Some(_), Some(_)) => {
        anyhow::bail!("source `{}` sets both rotation and euler_degrees", self.id)
      }
      (Some([x, y, z, w]), None) => {
        let q = DQuat::from_xyzw(x, y, z, w);
        if !q.is_finite() || q.length_squared() == 0.0 {
          anyhow::bail!("source `{}` has a degenerate rotation quaternion", self.id);
        }
        q.normalize()
      }
      (None, Some([x, y, z])) => {
        DQuat::from_euler(EulerRot::XYZ, x.to_radians(), y.to_radians(), z.to_radians())
      }
      (None, None) => DQuat::IDENTITY,
    };

    Ok(AlignedSample::from_parts(
      self.id.clone(),
      self.scale.to_vec(),
      rotation,
      DVec3::from_array(self.translation),
    ))
  }
}

impl RunManifest {
  /// Load a manifest from a TOML file.
  pub fn load(path: &Path) -> Result<Self> {
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    Self::parse(&content)
  }

  pub fn parse(content: &str) -> Result<Self> {
    let manifest: RunManifest = toml::from_str(content).context("Failed to parse manifest TOML")?;
    if manifest.sources.is_empty() {
      anyhow::bail!("Manifest must list at least one source");
    }
    Ok(manifest)
  }

  pub fn samples(&self) -> Result<Vec<AlignedSample>> {
    self.sources.iter().map(SourceEntry::to_sample).collect()
  }

  pub fn target_sample(&self) -> Result<Option<AlignedSample>> {
    self.target.as_ref().map(SourceEntry::to_sample).transpose()
  }

  /// Build the stage list with the configured wiring mode.
  pub fn pipeline(&self) -> Result<Pipeline> {
    let mut pipeline = match &self.stages {
      Some(stages) => {
        let mut pipeline = Pipeline::new();
        for stage in build_stages(stages).context("Invalid stage list")? {
          pipeline.push(stage);
        }
        pipeline
      }
      None => Pipeline::default_stages(),
    };
    pipeline.set_wiring_mode(self.wiring);
    Ok(pipeline)
  }

  /// Field store resolving paths against `base_dir`.
  pub fn store(&self, base_dir: &Path) -> ManifestStore {
    let overrides = self
      .sources
      .iter()
      .chain(self.target.as_ref())
      .filter_map(|entry| {
        let path = entry.path.as_ref()?;
        Some((entry.id.clone(), base_dir.join(path)))
      })
      .collect();

    ManifestStore {
      directory: DirectoryStore::new(base_dir.join(&self.field_dir)),
      overrides,
    }
  }
}

/// Directory store with per-source file overrides.
#[derive(Debug)]
pub struct ManifestStore {
  directory: DirectoryStore,
  overrides: HashMap<String, PathBuf>,
}

impl ManifestStore {
  pub fn path_of(&self, id: &str) -> PathBuf {
    match self.overrides.get(id) {
      Some(path) => path.clone(),
      None => self.directory.path_of(id),
    }
  }
}

impl FieldStore for ManifestStore {
  fn load_field(&self, id: &str) -> Result<VolumetricField, FieldError> {
    match self.overrides.get(id) {
      Some(path) => read_json(path),
      None => self.directory.load_field(id),
    }
  }
}

#[cfg(test)]
#[path = "manifest_test.rs"]
mod manifest_test;
