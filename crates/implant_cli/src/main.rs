//! Consensus implant reconstruction driver.
//!
//! Reads a run manifest, fuses the listed aligned sources into an implant
//! and writes one PLY mesh per output field.

mod manifest;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use implant_pipeline::{run_pipeline, WiringMode};
use tracing::info;
use tracing_subscriber::EnvFilter;

use manifest::RunManifest;

/// Consensus implant reconstruction from aligned volumetric samples.
#[derive(Parser, Debug)]
#[command(name = "reconstruct")]
#[command(about = "Fuses aligned volumetric samples into an implant mesh")]
struct Args {
  /// Path to the run manifest TOML file.
  manifest: PathBuf,

  /// Output directory (default: from the manifest).
  #[arg(short, long)]
  output_dir: Option<PathBuf>,

  /// Override the occupancy probability threshold.
  #[arg(short, long)]
  threshold: Option<f32>,

  /// Override the loader worker count.
  #[arg(short, long)]
  workers: Option<usize>,

  /// Subtract the manifest target from the implant.
  #[arg(long)]
  subtract_target: bool,

  /// Override the outward offset of the target before subtraction.
  #[arg(long)]
  target_offset: Option<f32>,

  /// Use the legacy stage wiring.
  #[arg(long)]
  legacy_wiring: bool,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();
  let base_dir = args
    .manifest
    .parent()
    .unwrap_or(Path::new("."))
    .to_path_buf();

  let manifest = RunManifest::load(&args.manifest)?;

  let mut config = manifest.reconstruction.clone();
  if let Some(threshold) = args.threshold {
    config.threshold = threshold;
  }
  if let Some(workers) = args.workers {
    config.worker_count = workers;
  }
  config.subtract_target |= args.subtract_target;
  if let Some(offset) = args.target_offset {
    config.target_offset = offset;
  }

  let samples = manifest.samples()?;
  let target = manifest.target_sample()?;
  let mut pipeline = manifest.pipeline()?;
  if args.legacy_wiring {
    pipeline.set_wiring_mode(WiringMode::Legacy);
  }

  let store = manifest.store(&base_dir);
  for sample in &samples {
    tracing::debug!(id = %sample.id, path = %store.path_of(&sample.id).display(), "source");
  }
  info!(
    sources = samples.len(),
    stages = pipeline.len(),
    threshold = config.threshold,
    "reconstructing"
  );

  let output = run_pipeline(&store, &samples, target.as_ref(), &config, &mut pipeline)
    .context("Reconstruction failed")?;

  let output_dir = args
    .output_dir
    .unwrap_or_else(|| base_dir.join(&manifest.output_dir));
  std::fs::create_dir_all(&output_dir)
    .with_context(|| format!("Failed to create output dir: {}", output_dir.display()))?;

  for mesh in &output.meshes {
    let path = output_dir.join(format!("{}.ply", mesh.name));
    mesh
      .write_ply(&path)
      .with_context(|| format!("Failed to write mesh: {}", path.display()))?;
    info!(
      path = %path.display(),
      triangles = mesh.triangle_count(),
      "mesh written"
    );
  }

  let stats = &output.stats;
  info!(
    meshes = stats.mesh_count,
    probability_voxels = stats.probability_voxels,
    implant_voxels = stats.implant_voxels,
    total_ms = stats.total_us / 1000,
    "done"
  );

  Ok(())
}
