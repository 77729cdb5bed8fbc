//! Editable stage list.

use super::executor::{execute_all, WiringMode};
use super::{FilterOperator, GridOperator, LevelSetFilterOperator, SegmentOperator, SharedField};

/// Ordered list of stages owned by the caller and reused across runs.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
  stages: Vec<GridOperator>,
  wiring: WiringMode,
}

impl Pipeline {
  /// Empty pipeline; its result is its input.
  pub fn new() -> Self {
    Self::default()
  }

  /// Segment, keep the largest island, smooth it, then segment and keep the
  /// largest island again.
  pub fn default_stages() -> Self {
    Self::new()
      .with_stage(GridOperator::new(SegmentOperator))
      .with_stage(GridOperator::new(FilterOperator::take(1, 0)))
      .with_stage(GridOperator::new(LevelSetFilterOperator::default().with_iterations(4)))
      .with_stage(GridOperator::new(SegmentOperator))
      .with_stage(GridOperator::new(FilterOperator::take(1, 0)))
  }

  pub fn with_stage(mut self, stage: GridOperator) -> Self {
    self.stages.push(stage);
    self
  }

  pub fn with_wiring_mode(mut self, wiring: WiringMode) -> Self {
    self.wiring = wiring;
    self
  }

  pub fn wiring_mode(&self) -> WiringMode {
    self.wiring
  }

  pub fn set_wiring_mode(&mut self, wiring: WiringMode) {
    self.wiring = wiring;
  }

  pub fn stages(&self) -> &[GridOperator] {
    &self.stages
  }

  pub fn stage(&self, index: usize) -> Option<&GridOperator> {
    self.stages.get(index)
  }

  pub fn stage_mut(&mut self, index: usize) -> Option<&mut GridOperator> {
    self.stages.get_mut(index)
  }

  pub fn len(&self) -> usize {
    self.stages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.stages.is_empty()
  }

  pub fn push(&mut self, stage: GridOperator) {
    self.stages.push(stage);
  }

  /// Insert at `index`, clamped to the end of the list.
  pub fn insert(&mut self, index: usize, stage: GridOperator) {
    let index = index.min(self.stages.len());
    self.stages.insert(index, stage);
  }

  pub fn remove(&mut self, index: usize) -> Option<GridOperator> {
    (index < self.stages.len()).then(|| self.stages.remove(index))
  }

  /// Swap the stage with its predecessor. Returns false at the top.
  pub fn move_up(&mut self, index: usize) -> bool {
    if index == 0 || index >= self.stages.len() {
      return false;
    }
    self.stages.swap(index - 1, index);
    true
  }

  /// Swap the stage with its successor. Returns false at the bottom.
  pub fn move_down(&mut self, index: usize) -> bool {
    if index + 1 >= self.stages.len() {
      return false;
    }
    self.stages.swap(index, index + 1);
    true
  }

  /// Returns false when `index` is out of range.
  pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
    match self.stages.get_mut(index) {
      Some(stage) => {
        stage.set_enabled(enabled);
        true
      }
      None => false,
    }
  }

  /// Run every stage on `input` and return the result.
  pub fn execute(&mut self, input: &[SharedField]) -> Vec<SharedField> {
    execute_all(&mut self.stages, input, self.wiring)
  }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;
