//! End-to-end reconstruction: load, combine, post-process, operators, mesh.
//!
//! ```text
//! ┌──────┐    ┌─────────┐    ┌──────────────┐    ┌───────────┐    ┌──────┐
//! │ Load ├───►│ Combine ├───►│ Post-process ├───►│ Operators ├───►│ Mesh │
//! └──────┘    └─────────┘    └──────────────┘    └───────────┘    └──────┘
//!  N fields   probability     implant level set   final fields     meshes
//! ```
//!
//! [`Reconstructor`] keeps the result of every phase so a run can restart
//! from a later phase after only its parameters changed. Failing runs leave
//! the kept state untouched.

use std::sync::Arc;

use voxel_field::VolumetricField;
use web_time::Instant;

use crate::config::ReconstructionConfig;
use crate::consensus::combine;
use crate::error::PipelineError;
use crate::loader::{ParallelBatchLoader, SampleLoader};
use crate::mesh::{Mesh, MeshExtractor};
use crate::operators::{Pipeline, SharedField};
use crate::postprocess::PostProcessor;
use crate::source::{AlignedSample, FieldStore};

/// First phase of a run. Later phases reuse the kept results of the earlier
/// ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
  Load,
  Combine,
  PostProcess,
}

/// Per-phase timing and sizes of one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStats {
  pub sample_count: usize,
  pub probability_voxels: u64,
  pub implant_voxels: u64,
  pub mesh_count: usize,
  /// Phase times in microseconds; zero for skipped phases.
  pub load_us: u64,
  pub combine_us: u64,
  pub post_process_us: u64,
  pub operators_us: u64,
  pub mesh_us: u64,
  pub total_us: u64,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutput {
  pub meshes: Vec<Mesh>,
  /// Fields returned by the operator pipeline, one per mesh.
  pub fields: Vec<SharedField>,
  pub stats: PipelineStats,
}

/// Intermediate results kept between runs.
#[derive(Debug, Clone, Default)]
pub struct ReconstructionState {
  loaded: Option<Vec<VolumetricField>>,
  probability: Option<VolumetricField>,
  implant: Option<SharedField>,
  target: Option<CachedTarget>,
}

/// Resampled target together with the placement and scale it was loaded
/// with.
#[derive(Debug, Clone)]
struct CachedTarget {
  sample: AlignedSample,
  to_millimeter_scale: f64,
  field: VolumetricField,
}

impl CachedTarget {
  fn matches(&self, sample: &AlignedSample, to_millimeter_scale: f64) -> bool {
    self.sample == *sample && self.to_millimeter_scale == to_millimeter_scale
  }
}

impl ReconstructionState {
  /// Samples resampled into the common frame.
  pub fn loaded(&self) -> Option<&[VolumetricField]> {
    self.loaded.as_deref()
  }

  pub fn probability(&self) -> Option<&VolumetricField> {
    self.probability.as_ref()
  }

  /// Post-processed level set handed to the operator pipeline.
  pub fn implant(&self) -> Option<&SharedField> {
    self.implant.as_ref()
  }

  /// Resampled target field, cached after its first use.
  pub fn target(&self) -> Option<&VolumetricField> {
    self.target.as_ref().map(|cached| &cached.field)
  }

  /// Earliest phase whose inputs are missing, if it is before `phase`.
  fn resume_phase(&self, phase: Phase) -> Phase {
    if self.loaded.is_none() {
      Phase::Load
    } else if self.probability.is_none() {
      phase.min(Phase::Combine)
    } else {
      phase
    }
  }
}

/// Owns the sources, configuration, stage list and kept state of a
/// reconstruction.
pub struct Reconstructor<S: FieldStore> {
  store: S,
  samples: Vec<AlignedSample>,
  target: Option<AlignedSample>,
  config: ReconstructionConfig,
  pipeline: Pipeline,
  state: ReconstructionState,
}

impl<S: FieldStore> Reconstructor<S> {
  pub fn new(store: S) -> Self {
    Self {
      store,
      samples: Vec::new(),
      target: None,
      config: ReconstructionConfig::default(),
      pipeline: Pipeline::default(),
      state: ReconstructionState::default(),
    }
  }

  pub fn with_samples(mut self, samples: Vec<AlignedSample>) -> Self {
    self.set_samples(samples);
    self
  }

  pub fn with_target(mut self, target: Option<AlignedSample>) -> Self {
    self.set_target(target);
    self
  }

  pub fn with_config(mut self, config: ReconstructionConfig) -> Self {
    self.config = config;
    self
  }

  pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
    self.pipeline = pipeline;
    self
  }

  pub fn samples(&self) -> &[AlignedSample] {
    &self.samples
  }

  /// Replace the samples, dropping every kept result derived from them.
  pub fn set_samples(&mut self, samples: Vec<AlignedSample>) {
    self.samples = samples;
    self.state.loaded = None;
    self.state.probability = None;
    self.state.implant = None;
  }

  pub fn target(&self) -> Option<&AlignedSample> {
    self.target.as_ref()
  }

  pub fn set_target(&mut self, target: Option<AlignedSample>) {
    self.target = target;
  }

  pub fn config(&self) -> &ReconstructionConfig {
    &self.config
  }

  /// Configuration, editable between runs.
  pub fn config_mut(&mut self) -> &mut ReconstructionConfig {
    &mut self.config
  }

  pub fn pipeline(&self) -> &Pipeline {
    &self.pipeline
  }

  /// Stage list, editable between runs.
  pub fn pipeline_mut(&mut self) -> &mut Pipeline {
    &mut self.pipeline
  }

  pub fn into_pipeline(self) -> Pipeline {
    self.pipeline
  }

  pub fn state(&self) -> &ReconstructionState {
    &self.state
  }

  /// Full run.
  pub fn run(&mut self) -> Result<RunOutput, PipelineError> {
    self.run_from(Phase::Load)
  }

  /// Run starting at `phase`, or earlier if a kept result is missing.
  pub fn run_from(&mut self, phase: Phase) -> Result<RunOutput, PipelineError> {
    let start = Instant::now();
    let phase = self.state.resume_phase(phase);
    let mut stats = PipelineStats::default();
    tracing::info!(?phase, samples = self.samples.len(), "reconstruction started");

    // Everything fallible runs before any kept state is replaced.
    let loaded = if phase == Phase::Load {
      let _span = tracing::info_span!("pipeline::load").entered();
      if self.samples.is_empty() {
        return Err(PipelineError::NoSources);
      }
      let loader = ParallelBatchLoader::new(self.config.worker_count, self.config.to_millimeter_scale);
      let (fields, load_stats) = loader.load_all(&self.store, &self.samples)?;
      stats.load_us = load_stats.total_us;
      tracing::info!(
        samples = load_stats.sample_count,
        chunks = load_stats.chunk_count,
        elapsed_us = stats.load_us,
        "samples loaded"
      );
      Some(fields)
    } else {
      None
    };
    let target = self.resolve_target()?;

    if let Some(fields) = loaded {
      self.state.loaded = Some(fields);
    }
    if let Some(target) = target {
      self.state.target = Some(target);
    }
    let loaded = self.state.loaded.as_deref().unwrap_or_default();
    stats.sample_count = loaded.len();

    if phase <= Phase::Combine {
      let _span = tracing::info_span!("pipeline::combine").entered();
      let phase_start = Instant::now();
      let probability = combine(loaded);
      stats.combine_us = phase_start.elapsed().as_micros() as u64;
      tracing::info!(
        active_voxels = probability.active_voxel_count(),
        elapsed_us = stats.combine_us,
        "samples combined"
      );
      self.state.probability = Some(probability);
    }

    let implant = {
      let _span = tracing::info_span!("pipeline::post_process").entered();
      let phase_start = Instant::now();
      let probability = match self.state.probability.as_ref() {
        Some(probability) => probability,
        None => return Err(PipelineError::NoSources),
      };
      stats.probability_voxels = probability.active_voxel_count();
      let target = if self.config.subtract_target {
        self.state.target.as_ref().map(|cached| &cached.field)
      } else {
        None
      };
      let implant = Arc::new(PostProcessor::from_config(&self.config).run(probability, target));
      stats.post_process_us = phase_start.elapsed().as_micros() as u64;
      stats.implant_voxels = implant.active_voxel_count();
      tracing::info!(
        active_voxels = stats.implant_voxels,
        elapsed_us = stats.post_process_us,
        "probability post-processed"
      );
      implant
    };
    self.state.implant = Some(implant.clone());

    let fields = {
      let _span = tracing::info_span!("pipeline::operators", stages = self.pipeline.len()).entered();
      let phase_start = Instant::now();
      let fields = self.pipeline.execute(&[implant]);
      stats.operators_us = phase_start.elapsed().as_micros() as u64;
      if fields.is_empty() {
        tracing::warn!("operator pipeline returned no fields");
      }
      tracing::info!(fields = fields.len(), elapsed_us = stats.operators_us, "operators executed");
      fields
    };

    let meshes = {
      let _span = tracing::info_span!("pipeline::mesh").entered();
      let phase_start = Instant::now();
      let meshes = MeshExtractor::new(self.config.adaptivity).extract_all(&fields, self.config.threshold);
      stats.mesh_us = phase_start.elapsed().as_micros() as u64;
      tracing::info!(meshes = meshes.len(), elapsed_us = stats.mesh_us, "meshes extracted");
      meshes
    };

    stats.mesh_count = meshes.len();
    stats.total_us = start.elapsed().as_micros() as u64;
    tracing::info!(elapsed_us = stats.total_us, "reconstruction finished");

    Ok(RunOutput {
      meshes,
      fields,
      stats,
    })
  }

  /// Load the target when subtraction needs it and the cache does not hold
  /// it at the current placement and scale. `Ok(None)` means nothing new was
  /// loaded.
  fn resolve_target(&self) -> Result<Option<CachedTarget>, PipelineError> {
    if !self.config.subtract_target {
      return Ok(None);
    }
    let Some(sample) = &self.target else {
      return Err(PipelineError::MissingTarget);
    };
    let scale = self.config.to_millimeter_scale;
    if self.state.target.as_ref().is_some_and(|cached| cached.matches(sample, scale)) {
      return Ok(None);
    }

    let loader = SampleLoader::new(&self.store, scale);
    let field = loader.load(sample).map_err(|source| PipelineError::TargetLoad {
      source_id: sample.id.clone(),
      source,
    })?;
    tracing::info!(id = %sample.id, "target loaded");
    Ok(Some(CachedTarget {
      sample: sample.clone(),
      to_millimeter_scale: scale,
      field,
    }))
  }
}

/// Run a complete reconstruction with a fresh state.
///
/// `pipeline` is executed in place, so its stages expose their inputs and
/// outputs afterwards and keep their parameters for the next call.
pub fn run_pipeline<S: FieldStore + ?Sized>(
  store: &S,
  samples: &[AlignedSample],
  target: Option<&AlignedSample>,
  config: &ReconstructionConfig,
  pipeline: &mut Pipeline,
) -> Result<RunOutput, PipelineError> {
  let mut reconstructor = Reconstructor::new(store)
    .with_samples(samples.to_vec())
    .with_target(target.cloned())
    .with_config(config.clone())
    .with_pipeline(std::mem::take(pipeline));
  let result = reconstructor.run();
  *pipeline = reconstructor.into_pipeline();
  result
}

#[cfg(test)]
#[path = "reconstruction_test.rs"]
mod reconstruction_test;
