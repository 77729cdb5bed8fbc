//! Block layout constants for sparse 8³ voxel blocks.
//!
//! A field is stored as a map of blocks keyed by their origin. Every block
//! covers 8 voxels per axis and is either a dense leaf or a single tile value.
//!
//! # Memory Layout
//!
//! ```text
//! Leaf memory layout (row-major, Z innermost):
//!
//! Address:  0      1      2   ...  7      8     ...  63     64    ...
//! Content: [0,0,0][0,0,1]...[0,0,7][0,1,0]...[0,7,7][1,0,0]...
//!          └────── Z ──────┘└────── Z ──────┘
//! ```
//!
//! # 3D Indexing
//!
//! ```text
//! index = x << 6 | y << 3 | z
//!       = x * 64 + y * 8 + z
//! ```
//!
//! # Coordinate System
//!
//! ```text
//!         +Y
//!          │
//!          │
//!          └───────── +X
//!         /
//!       +Z
//!
//! Cell corner indices (binary: ZYX):
//!   0 = (0,0,0)    4 = (0,0,1)
//!   1 = (1,0,0)    5 = (1,0,1)
//!   2 = (0,1,0)    6 = (0,1,1)
//!   3 = (1,1,0)    7 = (1,1,1)
//! ```

use glam::IVec3;

/// Log2 of the block edge length.
pub const LOG2_BLOCK_DIM: i32 = 3;

/// Voxels per block axis (8).
pub const BLOCK_DIM: i32 = 1 << LOG2_BLOCK_DIM;

/// Voxels per block (8³ = 512).
pub const BLOCK_VOXELS: usize = (BLOCK_DIM * BLOCK_DIM * BLOCK_DIM) as usize;

/// Mask for extracting the in-block offset of a coordinate (0x7).
pub const BLOCK_MASK: i32 = BLOCK_DIM - 1;

/// Bit shift for Y coordinate indexing.
pub const Y_SHIFT: i32 = LOG2_BLOCK_DIM;

/// Bit shift for X coordinate indexing.
pub const X_SHIFT: i32 = 2 * LOG2_BLOCK_DIM;

/// Origin of the block containing `coord`.
///
/// Masking rounds towards negative infinity, so negative coordinates map to
/// the block below them.
#[inline(always)]
pub const fn block_origin(coord: IVec3) -> IVec3 {
  IVec3::new(
    coord.x & !BLOCK_MASK,
    coord.y & !BLOCK_MASK,
    coord.z & !BLOCK_MASK,
  )
}

/// Linear in-block index of `coord`.
#[inline(always)]
pub const fn local_index(coord: IVec3) -> usize {
  (((coord.x & BLOCK_MASK) << X_SHIFT) | ((coord.y & BLOCK_MASK) << Y_SHIFT) | (coord.z & BLOCK_MASK))
    as usize
}

/// In-block offset of a linear index.
#[inline(always)]
pub const fn local_offset(index: usize) -> IVec3 {
  let index = index as i32;
  IVec3::new(
    index >> X_SHIFT,
    (index >> Y_SHIFT) & BLOCK_MASK,
    index & BLOCK_MASK,
  )
}

/// Offsets of the 8 cube corners relative to the cell origin.
pub const CORNER_OFFSETS: [IVec3; 8] = [
  IVec3::new(0, 0, 0),
  IVec3::new(1, 0, 0),
  IVec3::new(0, 1, 0),
  IVec3::new(1, 1, 0),
  IVec3::new(0, 0, 1),
  IVec3::new(1, 0, 1),
  IVec3::new(0, 1, 1),
  IVec3::new(1, 1, 1),
];

/// 6-connected face neighbours.
pub const FACE_NEIGHBORS: [IVec3; 6] = [
  IVec3::new(-1, 0, 0),
  IVec3::new(1, 0, 0),
  IVec3::new(0, -1, 0),
  IVec3::new(0, 1, 0),
  IVec3::new(0, 0, -1),
  IVec3::new(0, 0, 1),
];

/// Unit step along each axis.
pub const AXES: [IVec3; 3] = [IVec3::X, IVec3::Y, IVec3::Z];

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
