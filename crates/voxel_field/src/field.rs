//! Sparse block-based scalar field.
//!
//! Space is divided into 8³ blocks keyed by their origin. A block is either a
//! dense [`LeafBlock`] (512 values plus an active bitmask) or a tile holding a
//! single value and active flag for the whole block. Space without a block
//! reads as the background value and is inactive.
//!
//! Level-set convention: negative values are inside, the zero crossing is the
//! surface, `±background` is the saturated narrow-band value.
//!
//! Blocks live in a `BTreeMap`, so every traversal runs in a fixed order
//! (X, then Y, then Z of the block origin).

use std::collections::BTreeMap;

use glam::{DAffine3, DVec3, IVec3};

use crate::bounds::CoordBBox;
use crate::constants::*;

/// Dense 8³ block of values with per-voxel active flags.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafBlock {
  values: Box<[f32; BLOCK_VOXELS]>,
  active: [u64; BLOCK_VOXELS / 64],
}

impl LeafBlock {
  /// Leaf with every voxel set to `value` and the given active state.
  pub fn filled(value: f32, active: bool) -> Self {
    Self {
      values: Box::new([value; BLOCK_VOXELS]),
      active: [if active { u64::MAX } else { 0 }; BLOCK_VOXELS / 64],
    }
  }

  pub(crate) fn from_parts(values: Box<[f32; BLOCK_VOXELS]>, active: [u64; BLOCK_VOXELS / 64]) -> Self {
    Self { values, active }
  }

  pub(crate) fn values(&self) -> &[f32; BLOCK_VOXELS] {
    &self.values
  }

  pub(crate) fn active_words(&self) -> &[u64; BLOCK_VOXELS / 64] {
    &self.active
  }

  #[inline]
  pub fn value(&self, index: usize) -> f32 {
    self.values[index]
  }

  #[inline]
  pub fn is_on(&self, index: usize) -> bool {
    self.active[index >> 6] & (1u64 << (index & 63)) != 0
  }

  #[inline]
  pub fn set(&mut self, index: usize, value: f32, on: bool) {
    self.values[index] = value;
    self.set_active(index, on);
  }

  #[inline]
  pub fn set_value(&mut self, index: usize, value: f32) {
    self.values[index] = value;
  }

  #[inline]
  pub fn set_active(&mut self, index: usize, on: bool) {
    let bit = 1u64 << (index & 63);
    if on {
      self.active[index >> 6] |= bit;
    } else {
      self.active[index >> 6] &= !bit;
    }
  }

  /// Number of active voxels.
  #[inline]
  pub fn active_count(&self) -> u64 {
    self.active.iter().map(|w| w.count_ones() as u64).sum()
  }

  /// The uniform `(value, active)` pair if every voxel matches the first
  /// within `tolerance`.
  fn uniform(&self, tolerance: f32) -> Option<(f32, bool)> {
    let all_on = self.active.iter().all(|&w| w == u64::MAX);
    let all_off = self.active.iter().all(|&w| w == 0);
    if !all_on && !all_off {
      return None;
    }
    let first = self.values[0];
    self
      .values
      .iter()
      .all(|&v| (v - first).abs() <= tolerance)
      .then_some((first, all_on))
  }
}

/// One 8³ region of a field.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
  Leaf(LeafBlock),
  Tile { value: f32, active: bool },
}

/// A region visited by [`VolumetricField::iter_all`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValueRegion {
  /// One stored voxel of a leaf block.
  Voxel {
    coord: IVec3,
    value: f32,
    active: bool,
  },
  /// A whole block represented by a single value.
  Tile {
    bbox: CoordBBox,
    value: f32,
    active: bool,
  },
}

impl ValueRegion {
  #[inline]
  pub fn value(&self) -> f32 {
    match *self {
      ValueRegion::Voxel { value, .. } | ValueRegion::Tile { value, .. } => value,
    }
  }

  #[inline]
  pub fn is_active(&self) -> bool {
    match *self {
      ValueRegion::Voxel { active, .. } | ValueRegion::Tile { active, .. } => active,
    }
  }
}

/// Sparse scalar field with an index-to-world affine transform.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumetricField {
  name: String,
  background: f32,
  transform: DAffine3,
  blocks: BTreeMap<[i32; 3], Block>,
}

#[inline]
fn key(origin: IVec3) -> [i32; 3] {
  origin.to_array()
}

impl VolumetricField {
  /// Empty field with the given background value and identity transform.
  pub fn new(background: f32) -> Self {
    Self {
      name: String::new(),
      background,
      transform: DAffine3::IDENTITY,
      blocks: BTreeMap::new(),
    }
  }

  /// Empty field sharing this field's background, transform and name.
  pub fn empty_like(&self) -> Self {
    Self {
      name: self.name.clone(),
      background: self.background,
      transform: self.transform,
      blocks: BTreeMap::new(),
    }
  }

  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  pub fn with_transform(mut self, transform: DAffine3) -> Self {
    self.transform = transform;
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn set_name(&mut self, name: impl Into<String>) {
    self.name = name.into();
  }

  #[inline]
  pub fn background(&self) -> f32 {
    self.background
  }

  /// Index-to-world transform.
  #[inline]
  pub fn transform(&self) -> &DAffine3 {
    &self.transform
  }

  pub fn set_transform(&mut self, transform: DAffine3) {
    self.transform = transform;
  }

  /// Edge length of one voxel in world units (mean of the axis scales).
  pub fn voxel_size(&self) -> f64 {
    let m = self.transform.matrix3;
    (m.x_axis.length() + m.y_axis.length() + m.z_axis.length()) / 3.0
  }

  #[inline]
  pub fn index_to_world(&self, index: DVec3) -> DVec3 {
    self.transform.transform_point3(index)
  }

  /// Inverse mapping of [`index_to_world`](Self::index_to_world).
  ///
  /// Returns `None` when the transform is singular.
  pub fn world_to_index(&self, world: DVec3) -> Option<DVec3> {
    let det = self.transform.matrix3.determinant();
    if det.abs() < f64::EPSILON {
      return None;
    }
    Some(self.transform.inverse().transform_point3(world))
  }

  // ---------------------------------------------------------------------------
  // Voxel access
  // ---------------------------------------------------------------------------

  /// Value and active state at `coord`.
  #[inline]
  pub fn probe(&self, coord: IVec3) -> (f32, bool) {
    match self.blocks.get(&key(block_origin(coord))) {
      Some(Block::Leaf(leaf)) => {
        let i = local_index(coord);
        (leaf.value(i), leaf.is_on(i))
      }
      Some(Block::Tile { value, active }) => (*value, *active),
      None => (self.background, false),
    }
  }

  #[inline]
  pub fn value(&self, coord: IVec3) -> f32 {
    self.probe(coord).0
  }

  #[inline]
  pub fn is_active(&self, coord: IVec3) -> bool {
    self.probe(coord).1
  }

  /// Leaf containing `coord`, densifying a tile or allocating a background
  /// leaf when needed.
  fn leaf_mut(&mut self, coord: IVec3) -> &mut LeafBlock {
    let background = self.background;
    let block = self
      .blocks
      .entry(key(block_origin(coord)))
      .or_insert_with(|| Block::Leaf(LeafBlock::filled(background, false)));
    if let Block::Tile { value, active } = *block {
      *block = Block::Leaf(LeafBlock::filled(value, active));
    }
    match block {
      Block::Leaf(leaf) => leaf,
      Block::Tile { .. } => unreachable!("tile was densified above"),
    }
  }

  /// Set a value and mark the voxel active.
  pub fn set_value_on(&mut self, coord: IVec3, value: f32) {
    self.leaf_mut(coord).set(local_index(coord), value, true);
  }

  /// Set a value and mark the voxel inactive.
  pub fn set_value_off(&mut self, coord: IVec3, value: f32) {
    self.leaf_mut(coord).set(local_index(coord), value, false);
  }

  /// Set a value keeping the voxel's active state.
  pub fn set_value_only(&mut self, coord: IVec3, value: f32) {
    self.leaf_mut(coord).set_value(local_index(coord), value);
  }

  pub fn set_active_state(&mut self, coord: IVec3, on: bool) {
    if !on && !self.is_active(coord) {
      return;
    }
    self.leaf_mut(coord).set_active(local_index(coord), on);
  }

  /// Fill a region with a constant value and active state.
  ///
  /// Blocks fully covered by `bbox` become tiles; partially covered blocks
  /// are written voxel by voxel.
  pub fn fill(&mut self, bbox: CoordBBox, value: f32, active: bool) {
    let first = block_origin(bbox.min);
    let last = block_origin(bbox.max);
    let mut origin = first;
    while origin.x <= last.x {
      origin.y = first.y;
      while origin.y <= last.y {
        origin.z = first.z;
        while origin.z <= last.z {
          let block_box = CoordBBox::from_block(origin);
          if bbox.contains_box(&block_box) {
            self.blocks.insert(key(origin), Block::Tile { value, active });
          } else {
            let clipped = CoordBBox::new(bbox.min.max(block_box.min), bbox.max.min(block_box.max));
            for coord in clipped.iter() {
              self.leaf_mut(coord).set(local_index(coord), value, active);
            }
          }
          origin.z += BLOCK_DIM;
        }
        origin.y += BLOCK_DIM;
      }
      origin.x += BLOCK_DIM;
    }
  }

  // ---------------------------------------------------------------------------
  // Statistics
  // ---------------------------------------------------------------------------

  pub fn active_voxel_count(&self) -> u64 {
    self
      .blocks
      .values()
      .map(|block| match block {
        Block::Leaf(leaf) => leaf.active_count(),
        Block::Tile { active: true, .. } => BLOCK_VOXELS as u64,
        Block::Tile { active: false, .. } => 0,
      })
      .sum()
  }

  /// Bounding box of all active voxels, `None` when nothing is active.
  pub fn active_bounding_box(&self) -> Option<CoordBBox> {
    let mut bbox: Option<CoordBBox> = None;
    for (coord, _) in self.iter_active() {
      match bbox.as_mut() {
        Some(b) => b.expand(coord),
        None => bbox = Some(CoordBBox::from_coord(coord)),
      }
    }
    bbox
  }

  /// Bounding box of all allocated blocks, `None` for an empty field.
  pub fn allocated_bounding_box(&self) -> Option<CoordBBox> {
    self
      .blocks
      .keys()
      .map(|k| CoordBBox::from_block(IVec3::from_array(*k)))
      .reduce(|a, b| a.union(&b))
  }

  /// True when no block is allocated.
  pub fn is_empty(&self) -> bool {
    self.blocks.is_empty()
  }

  pub fn leaf_count(&self) -> usize {
    self
      .blocks
      .values()
      .filter(|b| matches!(b, Block::Leaf(_)))
      .count()
  }

  pub fn tile_count(&self) -> usize {
    self.blocks.len() - self.leaf_count()
  }

  /// Drop every block.
  pub fn clear(&mut self) {
    self.blocks.clear();
  }

  // ---------------------------------------------------------------------------
  // Iteration
  // ---------------------------------------------------------------------------

  /// Every active voxel as `(coord, value)`. Active tiles are expanded.
  pub fn iter_active(&self) -> impl Iterator<Item = (IVec3, f32)> + '_ {
    self.blocks.iter().flat_map(|(k, block)| {
      let origin = IVec3::from_array(*k);
      (0..BLOCK_VOXELS).filter_map(move |i| match block {
        Block::Leaf(leaf) => leaf.is_on(i).then(|| (origin + local_offset(i), leaf.value(i))),
        Block::Tile { value, active } => active.then(|| (origin + local_offset(i), *value)),
      })
    })
  }

  /// Every stored leaf voxel (active or not) and every tile.
  pub fn iter_all(&self) -> impl Iterator<Item = ValueRegion> + '_ {
    self.blocks.iter().flat_map(|(k, block)| {
      let origin = IVec3::from_array(*k);
      let count = match block {
        Block::Leaf(_) => BLOCK_VOXELS,
        Block::Tile { .. } => 1,
      };
      (0..count).map(move |i| match block {
        Block::Leaf(leaf) => ValueRegion::Voxel {
          coord: origin + local_offset(i),
          value: leaf.value(i),
          active: leaf.is_on(i),
        },
        Block::Tile { value, active } => ValueRegion::Tile {
          bbox: CoordBBox::from_block(origin),
          value: *value,
          active: *active,
        },
      })
    })
  }

  /// Allocated blocks keyed by origin.
  pub fn blocks(&self) -> impl Iterator<Item = (IVec3, &Block)> + '_ {
    self.blocks.iter().map(|(k, b)| (IVec3::from_array(*k), b))
  }

  /// Replace the block at `origin`, which must be block aligned.
  pub(crate) fn insert_block(&mut self, origin: IVec3, block: Block) {
    debug_assert_eq!(origin, block_origin(origin));
    self.blocks.insert(key(origin), block);
  }

  /// Block with the given origin, if allocated.
  #[inline]
  pub fn block(&self, origin: IVec3) -> Option<&Block> {
    self.blocks.get(&key(origin))
  }

  /// Modify every active value in place.
  pub fn map_active(&mut self, mut f: impl FnMut(IVec3, f32) -> f32) {
    for (k, block) in self.blocks.iter_mut() {
      let origin = IVec3::from_array(*k);
      match block {
        Block::Leaf(leaf) => {
          for i in 0..BLOCK_VOXELS {
            if leaf.is_on(i) {
              let v = f(origin + local_offset(i), leaf.value(i));
              leaf.set_value(i, v);
            }
          }
        }
        Block::Tile { value, active: true } => {
          let value = *value;
          let mut leaf = LeafBlock::filled(value, true);
          for i in 0..BLOCK_VOXELS {
            leaf.set_value(i, f(origin + local_offset(i), value));
          }
          *block = Block::Leaf(leaf);
        }
        Block::Tile { active: false, .. } => {}
      }
    }
  }

  // ---------------------------------------------------------------------------
  // Compaction
  // ---------------------------------------------------------------------------

  /// Collapse uniform leaves into tiles and drop inactive background tiles.
  ///
  /// A leaf collapses when its active mask is all-on or all-off and every
  /// value lies within `tolerance` of its first value.
  pub fn prune(&mut self, tolerance: f32) {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("field_prune").entered();

    let background = self.background;
    self.blocks.retain(|_, block| {
      if let Block::Leaf(leaf) = block {
        if let Some((value, active)) = leaf.uniform(tolerance) {
          *block = Block::Tile { value, active };
        }
      }
      !matches!(*block, Block::Tile { value, active: false } if (value - background).abs() <= tolerance)
    });
  }
}

#[cfg(test)]
#[path = "field_test.rs"]
mod field_test;
