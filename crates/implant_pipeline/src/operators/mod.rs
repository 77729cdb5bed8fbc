//! Grid operator pipeline.
//!
//! An ordered, user-editable list of stages. Every stage maps a list of
//! fields to a list of fields; the executor wires each enabled stage to the
//! output of the previous enabled stage.
//!
//! ```text
//!              ┌─────────┐     ┌────────┐     ┌───────────────┐
//!  input ─────►│ Segment ├────►│ Filter ├────►│ LevelSetFilter├────► result
//!              └─────────┘     └────────┘     └───────────────┘
//!                                   ▲
//!                     disabled stages are bypassed
//! ```
//!
//! Fields travel between stages as [`SharedField`]s. A stage never mutates
//! its input: it either forwards the same fields or produces new ones, so
//! the outputs of every stage stay valid for inspection after a run.

pub mod executor;
pub mod filter;
pub mod level_set_filter;
pub mod pipeline;
pub mod segment;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use voxel_field::VolumetricField;

use crate::error::PipelineError;

pub use executor::{execute_all, wire_frontier, FrontierWiring, InputBinding, WiringMode};
pub use filter::{FilterMode, FilterOperator};
pub use level_set_filter::{LevelSetFilterOperator, SmoothingKernel};
pub use pipeline::Pipeline;
pub use segment::SegmentOperator;

/// Immutable field shared between stage outputs.
pub type SharedField = Arc<VolumetricField>;

/// Discriminator of the selectable stage kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
  Segment,
  Filter,
  LevelSetFilter,
}

impl StageKind {
  /// Every kind offered when adding a stage, in menu order.
  pub const ALL: [StageKind; 3] = [StageKind::Segment, StageKind::Filter, StageKind::LevelSetFilter];

  /// Display name.
  pub fn name(self) -> &'static str {
    match self {
      StageKind::Segment => "Segment SDF",
      StageKind::Filter => "Filter Grids",
      StageKind::LevelSetFilter => "Level Set Filter",
    }
  }

  /// Stage of this kind with default parameters.
  pub fn create(self) -> GridOperator {
    GridOperator::new(match self {
      StageKind::Segment => Operator::Segment(SegmentOperator),
      StageKind::Filter => Operator::Filter(FilterOperator::default()),
      StageKind::LevelSetFilter => Operator::LevelSetFilter(LevelSetFilterOperator::default()),
    })
  }
}

impl fmt::Display for StageKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for StageKind {
  type Err = PipelineError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "segment" | "segment_sdf" => Ok(StageKind::Segment),
      "filter" => Ok(StageKind::Filter),
      "level_set_filter" => Ok(StageKind::LevelSetFilter),
      other => Err(PipelineError::UnsupportedOperator(other.to_string())),
    }
  }
}

/// Parameters of one stage.
#[derive(Clone, Debug, PartialEq)]
pub enum Operator {
  Segment(SegmentOperator),
  Filter(FilterOperator),
  LevelSetFilter(LevelSetFilterOperator),
}

impl Operator {
  pub fn kind(&self) -> StageKind {
    match self {
      Operator::Segment(_) => StageKind::Segment,
      Operator::Filter(_) => StageKind::Filter,
      Operator::LevelSetFilter(_) => StageKind::LevelSetFilter,
    }
  }

  /// Map `input` to a new output list.
  pub fn apply(&self, input: &[SharedField]) -> Vec<SharedField> {
    match self {
      Operator::Segment(op) => op.apply(input),
      Operator::Filter(op) => op.apply(input),
      Operator::LevelSetFilter(op) => op.apply(input),
    }
  }
}

impl From<SegmentOperator> for Operator {
  fn from(op: SegmentOperator) -> Self {
    Operator::Segment(op)
  }
}

impl From<FilterOperator> for Operator {
  fn from(op: FilterOperator) -> Self {
    Operator::Filter(op)
  }
}

impl From<LevelSetFilterOperator> for Operator {
  fn from(op: LevelSetFilterOperator) -> Self {
    Operator::LevelSetFilter(op)
  }
}

/// A pipeline stage: its parameters plus the state of its last execution.
///
/// Parameters and the enabled flag persist across runs; the input binding
/// and outputs are replaced whenever the stage runs.
#[derive(Clone, Debug)]
pub struct GridOperator {
  operator: Operator,
  enabled: bool,
  has_data: bool,
  in_grids: Vec<SharedField>,
  out_grids: Vec<SharedField>,
}

impl GridOperator {
  pub fn new(operator: impl Into<Operator>) -> Self {
    Self {
      operator: operator.into(),
      enabled: true,
      has_data: false,
      in_grids: Vec::new(),
      out_grids: Vec::new(),
    }
  }

  pub fn with_enabled(mut self, enabled: bool) -> Self {
    self.enabled = enabled;
    self
  }

  pub fn kind(&self) -> StageKind {
    self.operator.kind()
  }

  pub fn operator(&self) -> &Operator {
    &self.operator
  }

  /// Parameters, editable between runs.
  pub fn operator_mut(&mut self) -> &mut Operator {
    &mut self.operator
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  pub fn set_enabled(&mut self, enabled: bool) {
    self.enabled = enabled;
  }

  /// True once the stage has executed at least once.
  pub fn has_data(&self) -> bool {
    self.has_data
  }

  /// Fields the stage was last wired to.
  pub fn in_grids(&self) -> &[SharedField] {
    &self.in_grids
  }

  pub fn in_count(&self) -> usize {
    self.in_grids.len()
  }

  /// Result of the last execution.
  pub fn out_grids(&self) -> &[SharedField] {
    &self.out_grids
  }

  pub fn out_count(&self) -> usize {
    self.out_grids.len()
  }

  /// Number of bound input fields without any active voxel.
  pub fn empty_input_count(&self) -> usize {
    self
      .in_grids
      .iter()
      .filter(|field| field.active_voxel_count() == 0)
      .count()
  }

  pub(crate) fn bind(&mut self, input: Vec<SharedField>) {
    self.in_grids = input;
  }

  /// Replace the outputs with the result of applying the stage to its
  /// current input.
  pub fn execute(&mut self) {
    let _span = tracing::debug_span!("stage", kind = %self.kind()).entered();
    if self.in_grids.is_empty() {
      tracing::warn!(kind = %self.kind(), "stage executed without input fields");
    }
    let empty = self.empty_input_count();
    if empty > 0 {
      tracing::warn!(kind = %self.kind(), empty, "input fields without active voxels");
    }
    self.out_grids = self.operator.apply(&self.in_grids);
    self.has_data = true;
    tracing::debug!(
      kind = %self.kind(),
      inputs = self.in_grids.len(),
      outputs = self.out_grids.len(),
      "stage executed"
    );
  }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
