//! Sparse Naive Surface Nets over a [`VolumetricField`].
//!
//! Surface Nets is a dual method: it places ONE vertex in every cell whose
//! corners straddle the iso value, at the centroid of the edge crossings, and
//! connects the vertices of the four cells around every crossing edge with a
//! quad.
//!
//! # Processing Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PHASE 1: Candidate Cells                     │
//! │  Leaf blocks: every cell touching the block (origin - 1 ..)     │
//! │  Tile blocks: only the shell of cells leaving the tile          │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PHASE 2: Cell Processing                     │
//! │    Load 8 corner samples, build corner mask                     │
//! │    Early-out if homogeneous (mask == 0 or mask == 255)          │
//! │    Vertex position: centroid of edge crossings                  │
//! │    Normal: gradient of the 8 samples                            │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PHASE 3: Triangulation                       │
//! │  For the 3 edges leaving corner 0 of every vertex cell:         │
//! │    Skip edges without a sign change                             │
//! │    Look up the 4 cells sharing the edge                         │
//! │    Split quad along shorter diagonal                            │
//! │    Emit 2 triangles with outward winding                        │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PHASE 4: Adaptivity + Normals                │
//! │  Optional planar clustering, geometry normals if requested,     │
//! │  index space to world space                                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cell corner indices use the layout of [`CORNER_OFFSETS`]
//! (bit 0 = X, bit 1 = Y, bit 2 = Z).

mod adaptive;
mod corner_mask;
mod gradient;
mod vertex_calc;

use std::collections::{HashMap, HashSet};

use glam::{DVec3, IVec3, Vec3A};

use crate::bounds::CoordBBox;
use crate::constants::{AXES, BLOCK_MASK, CORNER_OFFSETS};
use crate::field::{Block, VolumetricField};
use crate::types::*;

pub use adaptive::simplify;
pub use gradient::recalculate_from_geometry;

/// Vertex index of every cell that produced a vertex.
type CellIndex = HashMap<IVec3, u32>;

/// Extract the iso-surface of `field` as a triangle mesh in world space.
///
/// Triangles wind counter-clockwise when seen from outside (the side with
/// values above the iso value).
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "surface_nets"))]
pub fn generate(field: &VolumetricField, config: &MeshConfig) -> MeshOutput {
  let mut output = MeshOutput::new();
  let mut cells = CellIndex::new();
  let iso = config.iso_value;

  // =========================================================================
  // Pass 1: Geometry
  // =========================================================================
  for cell in candidate_cells(field) {
    process_cell_geometry(field, cell, iso, &mut cells, &mut output);
  }
  for i in 0..output.vertices.len() {
    let cell = IVec3::from_array(output.vertices[i].cell_position);
    emit_triangles(field, cell, iso, &cells, &mut output);
  }

  // =========================================================================
  // Pass 2: Simplification
  // =========================================================================
  simplify(&mut output, config.adaptivity);

  // =========================================================================
  // Pass 3: World space + normals
  // =========================================================================
  let normal_matrix = field.transform().matrix3.inverse().transpose().as_mat3();
  output.bounds = MinMaxAABB::empty();
  for vertex in &mut output.vertices {
    let world = field.index_to_world(DVec3::from_array(vertex.position.map(f64::from)));
    vertex.position = world.as_vec3().to_array();
    vertex.normal = gradient::normalize_or_fallback(
      Vec3A::from(normal_matrix * glam::Vec3::from_array(vertex.normal)),
    );
    output.bounds.encapsulate(vertex.position);
  }
  if config.normal_mode == NormalMode::Geometry {
    recalculate_from_geometry(&mut output);
  }

  output
}

/// Cells that may contain a crossing, in deterministic block order.
fn candidate_cells(field: &VolumetricField) -> Vec<IVec3> {
  let mut seen = HashSet::new();
  let mut cells = Vec::new();
  for (origin, block) in field.blocks() {
    let is_tile = matches!(block, Block::Tile { .. });
    let region = CoordBBox::new(origin - IVec3::ONE, origin + IVec3::splat(BLOCK_MASK));
    for cell in region.iter() {
      // Cells fully inside a tile are homogeneous
      let local = cell - origin;
      if is_tile && local.cmpge(IVec3::ZERO).all() && local.cmplt(IVec3::splat(BLOCK_MASK)).all() {
        continue;
      }
      if seen.insert(cell) {
        cells.push(cell);
      }
    }
  }
  cells
}

#[inline]
fn corner_samples(field: &VolumetricField, cell: IVec3) -> [f32; 8] {
  std::array::from_fn(|i| field.value(cell + CORNER_OFFSETS[i]))
}

/// Process a single cell: emit its vertex if the surface crosses it.
fn process_cell_geometry(
  field: &VolumetricField,
  cell: IVec3,
  iso: f32,
  cells: &mut CellIndex,
  output: &mut MeshOutput,
) {
  let raw = corner_samples(field, cell);
  let corner_mask = corner_mask::build(&raw, iso);
  if corner_mask::is_homogeneous(corner_mask) {
    return;
  }

  let samples: [f32; 8] = std::array::from_fn(|i| raw[i] - iso);
  let position = cell.as_vec3a() + vertex_calc::cell_vertex(&samples);
  let position = position.to_array();

  cells.insert(cell, output.vertices.len() as u32);
  output.vertices.push(Vertex {
    position,
    normal: gradient::compute(&samples),
    cell_position: cell.to_array(),
  });
  output.bounds.encapsulate(position);
}

/// Emit the quads of the three edges leaving corner 0 of `cell`.
///
/// Uses shorter diagonal optimization: splits quads along the shorter diagonal
/// to produce better quality triangles.
fn emit_triangles(
  field: &VolumetricField,
  cell: IVec3,
  iso: f32,
  cells: &CellIndex,
  output: &mut MeshOutput,
) {
  let inside0 = field.value(cell) < iso;
  // Flip if corner 0 is outside
  let flip = !inside0;

  for axis in 0..3 {
    if (field.value(cell + AXES[axis]) < iso) == inside0 {
      continue;
    }
    let u = AXES[(axis + 1) % 3];
    let v = AXES[(axis + 2) % 3];

    let quad = [cell, cell - u - v, cell - u, cell - v].map(|c| cells.get(&c).copied());
    let [Some(v_a), Some(v_b), Some(v_c), Some(v_d)] = quad else {
      continue;
    };

    let p = |i: u32| output.vertices[i as usize].position;
    let diag_ab = dist_sq(p(v_a), p(v_b));
    let diag_cd = dist_sq(p(v_c), p(v_d));

    let tris = match (diag_ab < diag_cd, flip) {
      (true, true) => [v_a, v_d, v_b, v_a, v_b, v_c],
      (true, false) => [v_a, v_b, v_d, v_a, v_c, v_b],
      (false, true) => [v_c, v_d, v_b, v_c, v_a, v_d],
      (false, false) => [v_c, v_b, v_d, v_c, v_d, v_a],
    };
    output.indices.extend_from_slice(&tris);
  }
}

/// Squared distance between two points.
#[inline(always)]
fn dist_sq(a: [f32; 3], b: [f32; 3]) -> f32 {
  let dx = a[0] - b[0];
  let dy = a[1] - b[1];
  let dz = a[2] - b[2];
  dx * dx + dy * dy + dz * dz
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
