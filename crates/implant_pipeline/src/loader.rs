//! Sample loading: per-sample resampling into the common frame and the
//! parallel batch fan-out over a fixed worker pool.
//!
//! ```text
//!  samples[0..N)          workers (T)                 slots[0..N)
//! ┌──────────────┐   ┌──────────────────────┐   ┌──────────────────┐
//! │ 0 1 2 │ 3 4 5│──►│ worker 0: 0, 1, 2    │──►│ 0 1 2            │
//! │ 6 7   │      │   │ worker 1: 3, 4, 5    │   │       3 4 5      │
//! └──────────────┘   │ worker 2: 6, 7       │   │             6 7  │
//!                    └──────────────────────┘   └──────────────────┘
//! ```
//!
//! Every worker owns a disjoint chunk of the pre-allocated output slots, so
//! slot `i` always holds sample `i` regardless of scheduling.

use std::ops::Range;

use glam::{DAffine3, DVec3};
use voxel_field::{resample_into, FieldError, VolumetricField};
use web_time::Instant;

use crate::error::PipelineError;
use crate::source::{AlignedSample, FieldStore};

/// Loads one source and resamples it into the common frame.
pub struct SampleLoader<'a, S: FieldStore + ?Sized> {
  store: &'a S,
  to_millimeter_scale: f64,
}

impl<'a, S: FieldStore + ?Sized> SampleLoader<'a, S> {
  pub fn new(store: &'a S, to_millimeter_scale: f64) -> Self {
    Self {
      store,
      to_millimeter_scale,
    }
  }

  /// Map from the index space of `source` to the common index space.
  pub fn alignment_map(&self, sample: &AlignedSample, source: &VolumetricField) -> DAffine3 {
    DAffine3::from_scale(DVec3::splat(self.to_millimeter_scale)) * sample.transform * *source.transform()
  }

  /// Load `sample`, resample it with trilinear interpolation and prune the
  /// result.
  pub fn load(&self, sample: &AlignedSample) -> Result<VolumetricField, FieldError> {
    let source = self.store.load_field(&sample.id)?;
    let map = self.alignment_map(sample, &source);

    let mut field = VolumetricField::new(source.background()).with_name(sample.id.as_str());
    resample_into(&source, &mut field, &map)?;
    field.prune(0.0);
    Ok(field)
  }
}

/// Split `[0, len)` into contiguous chunks of `ceil(len / workers)`.
///
/// The last chunk is clipped to `len`; fewer than `workers` chunks are
/// returned when there is not enough work.
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
  if len == 0 {
    return Vec::new();
  }
  let chunk = len.div_ceil(workers.max(1));
  (0..len)
    .step_by(chunk)
    .map(|start| start..(start + chunk).min(len))
    .collect()
}

/// Statistics from one batch load.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadStats {
  /// Number of samples loaded.
  pub sample_count: usize,
  /// Number of worker chunks the samples were split into.
  pub chunk_count: usize,
  /// Total load time in microseconds.
  pub total_us: u64,
}

/// Loads a list of samples on a fixed-size worker pool.
#[derive(Clone, Debug)]
pub struct ParallelBatchLoader {
  worker_count: usize,
  to_millimeter_scale: f64,
}

impl ParallelBatchLoader {
  pub fn new(worker_count: usize, to_millimeter_scale: f64) -> Self {
    Self {
      worker_count: worker_count.max(1),
      to_millimeter_scale,
    }
  }

  pub fn worker_count(&self) -> usize {
    self.worker_count
  }

  /// Load every sample, returning the fields in input order.
  ///
  /// Blocks until all workers have finished. The first failing slot (by
  /// index) is reported as [`PipelineError::SourceLoad`].
  pub fn load_all<S: FieldStore + ?Sized>(
    &self,
    store: &S,
    samples: &[AlignedSample],
  ) -> Result<(Vec<VolumetricField>, LoadStats), PipelineError> {
    let start = Instant::now();
    let ranges = partition(samples.len(), self.worker_count);
    let Some(chunk) = ranges.first().map(|r| r.len()) else {
      return Ok((Vec::new(), LoadStats::default()));
    };

    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(ranges.len())
      .thread_name(|i| format!("sample-loader-{i}"))
      .build()
      .map_err(|e| PipelineError::WorkerPool(e.to_string()))?;

    let loader = SampleLoader::new(store, self.to_millimeter_scale);
    let mut slots: Vec<Option<Result<VolumetricField, FieldError>>> =
      (0..samples.len()).map(|_| None).collect();

    pool.scope(|scope| {
      for (range, chunk_slots) in ranges.iter().cloned().zip(slots.chunks_mut(chunk)) {
        let loader = &loader;
        let chunk_samples = &samples[range.clone()];
        scope.spawn(move |_| {
          tracing::debug!(first = range.start, last = range.end - 1, "loading chunk");
          for (sample, slot) in chunk_samples.iter().zip(chunk_slots) {
            *slot = Some(loader.load(sample));
          }
        });
      }
    });

    let mut fields = Vec::with_capacity(samples.len());
    for (index, (slot, sample)) in slots.into_iter().zip(samples).enumerate() {
      match slot {
        Some(Ok(field)) => {
          tracing::debug!(
            index,
            id = %sample.id,
            active_voxels = field.active_voxel_count(),
            "sample loaded"
          );
          fields.push(field);
        }
        Some(Err(source)) => {
          return Err(PipelineError::SourceLoad {
            index,
            source_id: sample.id.clone(),
            source,
          });
        }
        None => {
          return Err(PipelineError::WorkerPool(format!("slot {index} was never filled")));
        }
      }
    }

    let stats = LoadStats {
      sample_count: fields.len(),
      chunk_count: ranges.len(),
      total_us: start.elapsed().as_micros() as u64,
    };
    Ok((fields, stats))
  }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;
