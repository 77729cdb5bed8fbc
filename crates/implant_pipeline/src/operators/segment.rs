//! Segment stage: split level sets into disjoint islands.

use std::cmp::Reverse;
use std::sync::Arc;

use voxel_field::segment_sdf;

use super::SharedField;

/// Splits every input into its connected components and orders all islands
/// by active voxel count, largest first.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SegmentOperator;

impl SegmentOperator {
  pub fn apply(&self, input: &[SharedField]) -> Vec<SharedField> {
    let mut islands: Vec<SharedField> = input
      .iter()
      .flat_map(|field| segment_sdf(field))
      .map(Arc::new)
      .collect();
    // Stable: equal sizes keep discovery order
    islands.sort_by_cached_key(|field| Reverse(field.active_voxel_count()));
    islands
  }
}

#[cfg(test)]
#[path = "segment_test.rs"]
mod segment_test;
