//! Level-set smoothing stage.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use voxel_field::LevelSetFilter;

use super::SharedField;
use crate::error::PipelineError;

/// Smoothing kernel of a [`LevelSetFilterOperator`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingKernel {
  #[default]
  Laplacian,
  Gaussian,
  Median,
  Mean,
  MeanCurvature,
}

impl SmoothingKernel {
  pub const ALL: [SmoothingKernel; 5] = [
    SmoothingKernel::Laplacian,
    SmoothingKernel::Gaussian,
    SmoothingKernel::Median,
    SmoothingKernel::Mean,
    SmoothingKernel::MeanCurvature,
  ];

  pub fn name(self) -> &'static str {
    match self {
      SmoothingKernel::Laplacian => "Laplacian",
      SmoothingKernel::Gaussian => "Gaussian",
      SmoothingKernel::Median => "Median",
      SmoothingKernel::Mean => "Mean",
      SmoothingKernel::MeanCurvature => "Mean Curvature",
    }
  }

  /// Whether the kernel reads the `width` parameter.
  pub fn uses_width(self) -> bool {
    matches!(
      self,
      SmoothingKernel::Gaussian | SmoothingKernel::Median | SmoothingKernel::Mean
    )
  }
}

impl fmt::Display for SmoothingKernel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for SmoothingKernel {
  type Err = PipelineError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "laplacian" => Ok(SmoothingKernel::Laplacian),
      "gaussian" => Ok(SmoothingKernel::Gaussian),
      "median" => Ok(SmoothingKernel::Median),
      "mean" => Ok(SmoothingKernel::Mean),
      "mean_curvature" => Ok(SmoothingKernel::MeanCurvature),
      other => Err(PipelineError::UnsupportedKernel(other.to_string())),
    }
  }
}

/// Smooths every input independently into a new field.
///
/// Laplacian and Gaussian run `iterations` passes. Median, Mean and
/// MeanCurvature run a single pass.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelSetFilterOperator {
  pub kernel: SmoothingKernel,
  pub iterations: u32,
  pub width: usize,
}

impl Default for LevelSetFilterOperator {
  fn default() -> Self {
    Self {
      kernel: SmoothingKernel::Laplacian,
      iterations: 1,
      width: 1,
    }
  }
}

impl LevelSetFilterOperator {
  pub fn new(kernel: SmoothingKernel) -> Self {
    Self {
      kernel,
      ..Self::default()
    }
  }

  pub fn with_iterations(mut self, iterations: u32) -> Self {
    self.iterations = iterations;
    self
  }

  pub fn with_width(mut self, width: usize) -> Self {
    self.width = width;
    self
  }

  pub fn apply(&self, input: &[SharedField]) -> Vec<SharedField> {
    input
      .iter()
      .map(|field| {
        let mut out = (**field).clone();
        let mut filter = LevelSetFilter::new(&mut out);
        match self.kernel {
          SmoothingKernel::Laplacian => {
            for _ in 0..self.iterations {
              filter.laplacian();
            }
          }
          SmoothingKernel::Gaussian => {
            for _ in 0..self.iterations {
              filter.gaussian(self.width);
            }
          }
          SmoothingKernel::Median => filter.median(self.width),
          SmoothingKernel::Mean => filter.mean(self.width),
          SmoothingKernel::MeanCurvature => filter.mean_curvature(),
        }
        Arc::new(out)
      })
      .collect()
  }
}

#[cfg(test)]
#[path = "level_set_filter_test.rs"]
mod level_set_filter_test;
