//! Occupancy voting across aligned samples.
//!
//! Every sample casts one vote for each voxel it considers inside (value
//! `<= 0`). Stored voxels are visited whether active or not, and every voxel
//! covered by an inside tile receives a vote, so deep interiors represented
//! by coarse tiles count the same as narrow-band voxels.
//!
//! Votes accumulate as integral counts in an `f32` field; a final pass
//! divides every active count by the number of samples.

use voxel_field::{ValueRegion, VolumetricField};

/// Name given to the probability field.
pub const PROBABILITY_FIELD_NAME: &str = "probability";

/// Folds sample fields into an occupancy-probability field.
#[derive(Clone, Debug)]
pub struct ConsensusAccumulator {
  counts: VolumetricField,
  sample_count: usize,
}

impl Default for ConsensusAccumulator {
  fn default() -> Self {
    Self::new()
  }
}

impl ConsensusAccumulator {
  pub fn new() -> Self {
    Self {
      counts: VolumetricField::new(0.0).with_name(PROBABILITY_FIELD_NAME),
      sample_count: 0,
    }
  }

  /// Number of samples folded so far.
  pub fn sample_count(&self) -> usize {
    self.sample_count
  }

  /// Raw vote counts.
  pub fn counts(&self) -> &VolumetricField {
    &self.counts
  }

  /// Cast the votes of one sample.
  pub fn add(&mut self, field: &VolumetricField) {
    for region in field.iter_all() {
      if region.value() > 0.0 {
        continue;
      }
      match region {
        ValueRegion::Voxel { coord, .. } => self.vote(coord),
        ValueRegion::Tile { bbox, .. } => {
          for coord in bbox.iter() {
            self.vote(coord);
          }
        }
      }
    }
    self.sample_count += 1;
  }

  #[inline]
  fn vote(&mut self, coord: glam::IVec3) {
    // An inactive voxel has no votes yet, whatever its stored value
    let (count, active) = self.counts.probe(coord);
    let current = if active { count } else { 0.0 };
    self.counts.set_value_on(coord, current + 1.0);
  }

  /// Normalize the counts into probabilities and compact the field.
  pub fn finish(self) -> VolumetricField {
    let mut probability = self.counts;
    if self.sample_count > 0 {
      let n = self.sample_count as f32;
      probability.map_active(|_, count| count / n);
    }
    probability.prune(0.0);
    probability
  }
}

/// Combine `fields` into one probability field.
#[tracing::instrument(skip_all, level = "debug", fields(samples = fields.len()))]
pub fn combine(fields: &[VolumetricField]) -> VolumetricField {
  let mut accumulator = ConsensusAccumulator::new();
  for field in fields {
    accumulator.add(field);
  }
  accumulator.finish()
}

#[cfg(test)]
#[path = "consensus_test.rs"]
mod consensus_test;
