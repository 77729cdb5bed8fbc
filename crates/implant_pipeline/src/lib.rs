//! implant_pipeline - Volumetric consensus reconstruction of cranial implants
//!
//! Many aligned volumetric samples of a shape are fused into one occupancy
//! probability field; the voxels most samples agree on are rebuilt into a
//! level set, refined by a user-editable chain of grid operators and meshed.
//!
//! ```text
//! ┌────────────────────┐    ┌───────────────────────┐    ┌───────────────┐
//! │ ParallelBatchLoader├───►│ ConsensusAccumulator  ├───►│ PostProcessor │
//! │  (N samples, T     │    │  votes / N            │    │  threshold +  │
//! │   workers)         │    │                       │    │  rebuild      │
//! └────────────────────┘    └───────────────────────┘    └───────┬───────┘
//!                                                                │
//!                    ┌───────────────┐    ┌─────────────────┐    │
//!                    │ MeshExtractor │◄───┤ Pipeline        │◄───┘
//!                    │  one mesh per │    │  Segment/Filter/│
//!                    │  field        │    │  LevelSetFilter │
//!                    └───────────────┘    └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use implant_pipeline::{run_pipeline, AlignedSample, DirectoryStore, Pipeline, ReconstructionConfig};
//!
//! let store = DirectoryStore::new("fields");
//! let samples = vec![AlignedSample::identity("skull_01"), AlignedSample::identity("skull_02")];
//! let mut pipeline = Pipeline::default_stages();
//!
//! let output = run_pipeline(&store, &samples, None, &ReconstructionConfig::default(), &mut pipeline)?;
//! for mesh in &output.meshes {
//!     mesh.write_ply(format!("{}.ply", mesh.name))?;
//! }
//! ```

pub mod config;
pub mod consensus;
pub mod error;
pub mod loader;
pub mod mesh;
pub mod operators;
pub mod postprocess;
pub mod reconstruction;
pub mod source;

// Test utilities
#[cfg(test)]
pub mod test_utils;

pub use config::{build_stages, ReconstructionConfig, StageConfig};
pub use consensus::{combine, ConsensusAccumulator};
pub use error::PipelineError;
pub use loader::{ParallelBatchLoader, SampleLoader};
pub use mesh::{Mesh, MeshExtractor};
pub use operators::{
  FilterMode, FilterOperator, GridOperator, LevelSetFilterOperator, Operator, Pipeline,
  SegmentOperator, SharedField, SmoothingKernel, StageKind, WiringMode,
};
pub use postprocess::PostProcessor;
pub use reconstruction::{run_pipeline, Phase, PipelineStats, ReconstructionState, Reconstructor, RunOutput};
pub use source::{AlignedSample, DirectoryStore, FieldStore, InMemoryStore};
