//! Run configuration.
//!
//! Every field has a default, so partial configuration files only need to
//! name what they change.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::operators::{
  FilterMode, FilterOperator, GridOperator, LevelSetFilterOperator, Operator, SegmentOperator,
  SmoothingKernel, StageKind,
};

/// Parameters of one reconstruction run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
  /// Minimum occupancy probability kept by the post-processor.
  pub threshold: f32,

  /// Remove voxels lying inside the target shape.
  pub subtract_target: bool,

  /// Outward offset of the target surface before subtraction, in the
  /// target's distance units. Keeps a gap between implant and target; the
  /// reach is bounded by the target's narrow band.
  pub target_offset: f32,

  /// Narrow-band half width of the rebuilt level set, in voxels.
  pub half_width: u32,
  pub closing_steps: u32,
  pub dilation_steps: u32,
  pub smoothing_steps: u32,

  /// Size of the loader's worker pool.
  pub worker_count: usize,

  /// Scale from sample world units into the common index space.
  pub to_millimeter_scale: f64,

  /// Voxel size of the rebuilt level set in output units.
  pub meshing_scale: f64,

  /// Mesh simplification strength in `[0, 1]`.
  pub adaptivity: f32,
}

impl Default for ReconstructionConfig {
  fn default() -> Self {
    Self {
      threshold: 0.8,
      subtract_target: false,
      target_offset: 0.0,
      half_width: 3,
      closing_steps: 1,
      dilation_steps: 0,
      smoothing_steps: 0,
      worker_count: 8,
      to_millimeter_scale: 10.0,
      meshing_scale: 0.1,
      adaptivity: 0.5,
    }
  }
}

impl ReconstructionConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_threshold(mut self, threshold: f32) -> Self {
    self.threshold = threshold;
    self
  }

  pub fn with_subtract_target(mut self, subtract_target: bool) -> Self {
    self.subtract_target = subtract_target;
    self
  }

  pub fn with_target_offset(mut self, offset: f32) -> Self {
    self.target_offset = offset;
    self
  }

  /// Band half width and closing, dilation and smoothing step counts.
  pub fn with_morphology(mut self, half_width: u32, closing: u32, dilation: u32, smoothing: u32) -> Self {
    self.half_width = half_width;
    self.closing_steps = closing;
    self.dilation_steps = dilation;
    self.smoothing_steps = smoothing;
    self
  }

  pub fn with_worker_count(mut self, worker_count: usize) -> Self {
    self.worker_count = worker_count;
    self
  }

  pub fn with_to_millimeter_scale(mut self, scale: f64) -> Self {
    self.to_millimeter_scale = scale;
    self
  }

  pub fn with_meshing_scale(mut self, scale: f64) -> Self {
    self.meshing_scale = scale;
    self
  }

  pub fn with_adaptivity(mut self, adaptivity: f32) -> Self {
    self.adaptivity = adaptivity.clamp(0.0, 1.0);
    self
  }
}

/// Textual description of one stage, as found in configuration files.
///
/// Selectors stay strings so unknown values surface as
/// [`PipelineError::UnsupportedOperator`] / [`PipelineError::UnsupportedKernel`]
/// instead of a generic parse failure. Unset parameters keep the stage
/// defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
  pub kind: String,
  pub enabled: bool,

  // Filter
  pub mode: Option<String>,
  pub count: Option<usize>,
  pub offset: Option<usize>,
  pub threshold: Option<u64>,

  // Level set filter
  pub kernel: Option<String>,
  pub iterations: Option<u32>,
  pub width: Option<usize>,
}

impl Default for StageConfig {
  fn default() -> Self {
    Self {
      kind: String::new(),
      enabled: true,
      mode: None,
      count: None,
      offset: None,
      threshold: None,
      kernel: None,
      iterations: None,
      width: None,
    }
  }
}

impl StageConfig {
  pub fn of_kind(kind: impl Into<String>) -> Self {
    Self {
      kind: kind.into(),
      ..Self::default()
    }
  }

  /// Build the stage described by this entry.
  pub fn build(&self) -> Result<GridOperator, PipelineError> {
    let operator = match self.kind.parse::<StageKind>()? {
      StageKind::Segment => Operator::Segment(SegmentOperator),
      StageKind::Filter => {
        let mut filter = FilterOperator::default();
        if let Some(mode) = &self.mode {
          filter.mode = mode.parse::<FilterMode>()?;
        }
        if let Some(count) = self.count {
          filter.take_count = count;
        }
        if let Some(offset) = self.offset {
          filter.take_offset = offset;
        }
        if let Some(threshold) = self.threshold {
          filter.active_voxel_threshold = threshold;
        }
        Operator::Filter(filter)
      }
      StageKind::LevelSetFilter => {
        let mut filter = LevelSetFilterOperator::default();
        if let Some(kernel) = &self.kernel {
          filter.kernel = kernel.parse::<SmoothingKernel>()?;
        }
        if let Some(iterations) = self.iterations {
          filter.iterations = iterations;
        }
        if let Some(width) = self.width {
          filter.width = width;
        }
        Operator::LevelSetFilter(filter)
      }
    };
    Ok(GridOperator::new(operator).with_enabled(self.enabled))
  }
}

/// Build a stage list from configuration entries, failing on the first
/// unsupported entry.
pub fn build_stages(configs: &[StageConfig]) -> Result<Vec<GridOperator>, PipelineError> {
  configs.iter().map(StageConfig::build).collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
