//! Filter stage: reduce a list of fields by position or by size.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::SharedField;
use crate::error::PipelineError;

/// Predicate a [`FilterOperator`] selects fields with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
  /// Keep `take_count` fields starting at `take_offset`.
  #[default]
  TakeCount,
  /// Keep fields with at least `active_voxel_threshold` active voxels.
  MinActiveVoxels,
  /// Keep fields with at most `active_voxel_threshold` active voxels.
  MaxActiveVoxels,
}

impl FilterMode {
  pub const ALL: [FilterMode; 3] = [
    FilterMode::MaxActiveVoxels,
    FilterMode::MinActiveVoxels,
    FilterMode::TakeCount,
  ];

  pub fn name(self) -> &'static str {
    match self {
      FilterMode::TakeCount => "Take Count",
      FilterMode::MinActiveVoxels => "Active Voxel Count Greater Than",
      FilterMode::MaxActiveVoxels => "Active Voxel Count Less Than",
    }
  }
}

impl fmt::Display for FilterMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for FilterMode {
  type Err = PipelineError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "take_count" => Ok(FilterMode::TakeCount),
      "min_active_voxels" => Ok(FilterMode::MinActiveVoxels),
      "max_active_voxels" => Ok(FilterMode::MaxActiveVoxels),
      other => Err(PipelineError::UnsupportedFilterMode(other.to_string())),
    }
  }
}

/// Selects a subset of its input without copying fields.
///
/// Every parameter is kept regardless of the active mode so switching modes
/// between runs does not lose settings.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterOperator {
  pub mode: FilterMode,
  pub take_count: usize,
  pub take_offset: usize,
  pub active_voxel_threshold: u64,
}

impl Default for FilterOperator {
  fn default() -> Self {
    Self {
      mode: FilterMode::TakeCount,
      take_count: 1,
      take_offset: 0,
      active_voxel_threshold: 1000,
    }
  }
}

impl FilterOperator {
  /// Keep `count` fields starting at `offset`.
  pub fn take(count: usize, offset: usize) -> Self {
    Self {
      mode: FilterMode::TakeCount,
      take_count: count,
      take_offset: offset,
      ..Self::default()
    }
  }

  /// Keep fields with at least `threshold` active voxels.
  pub fn min_active_voxels(threshold: u64) -> Self {
    Self {
      mode: FilterMode::MinActiveVoxels,
      active_voxel_threshold: threshold,
      ..Self::default()
    }
  }

  /// Keep fields with at most `threshold` active voxels.
  pub fn max_active_voxels(threshold: u64) -> Self {
    Self {
      mode: FilterMode::MaxActiveVoxels,
      active_voxel_threshold: threshold,
      ..Self::default()
    }
  }

  pub fn apply(&self, input: &[SharedField]) -> Vec<SharedField> {
    match self.mode {
      FilterMode::TakeCount => input
        .iter()
        .skip(self.take_offset)
        .take(self.take_count)
        .cloned()
        .collect(),
      FilterMode::MinActiveVoxels => input
        .iter()
        .filter(|field| field.active_voxel_count() >= self.active_voxel_threshold)
        .cloned()
        .collect(),
      FilterMode::MaxActiveVoxels => input
        .iter()
        .filter(|field| field.active_voxel_count() <= self.active_voxel_threshold)
        .cloned()
        .collect(),
    }
  }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod filter_test;
