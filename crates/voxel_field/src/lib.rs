//! voxel_field - Sparse block-based level-set fields
//!
//! This crate provides the volumetric field capability used by the implant
//! reconstruction pipeline: a sparse scalar field stored as 8³ blocks with an
//! index-to-world affine transform, plus the level-set tools that operate on
//! it.
//!
//! # Features
//!
//! - **Sparse storage**: dense leaf blocks near the surface, single-value
//!   tiles for uniform regions, nothing at all for background
//! - **Resampling**: trilinear transfer between index spaces under an affine
//!   map
//! - **Level-set tools**: CSG union, connected-component segmentation,
//!   narrow-band rebuild from an occupancy mask, smoothing filters
//! - **Surface Nets**: sparse iso-surface extraction with optional adaptivity
//!
//! # Example
//!
//! ```ignore
//! use voxel_field::{level_set_sphere, surface_nets, MeshConfig};
//!
//! let sphere = level_set_sphere(5.0, glam::DVec3::ZERO, 0.1, 3.0);
//! let output = surface_nets::generate(&sphere, &MeshConfig::default());
//!
//! println!("Generated {} vertices, {} triangles",
//!     output.vertices.len(), output.triangle_count());
//! ```

pub mod bounds;
pub mod constants;
pub mod csg;
pub mod error;
pub mod field;
pub mod filter;
pub mod io;
pub mod level_set;
pub mod primitives;
pub mod resample;
pub mod segment;
pub mod surface_nets;
pub mod types;

pub use bounds::CoordBBox;
pub use csg::csg_union;
pub use error::FieldError;
pub use field::{Block, LeafBlock, ValueRegion, VolumetricField};
pub use filter::LevelSetFilter;
pub use io::{read_json, write_json, FieldFile};
pub use level_set::topology_to_level_set;
pub use primitives::{level_set_box, level_set_sphere};
pub use resample::resample_into;
pub use segment::segment_sdf;
pub use types::{MeshConfig, MeshOutput, MinMaxAABB, NormalMode, Vertex};
