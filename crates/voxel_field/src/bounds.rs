//! Integer axis-aligned bounding box in index space.

use glam::IVec3;

use crate::constants::BLOCK_MASK;

/// Inclusive integer bounding box.
///
/// Used for tile regions, active extents and resampling domains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CoordBBox {
  /// Minimum corner (inclusive).
  pub min: IVec3,
  /// Maximum corner (inclusive).
  pub max: IVec3,
}

impl CoordBBox {
  /// Create a new box from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: IVec3, max: IVec3) -> Self {
    debug_assert!(
      min.cmple(max).all(),
      "CoordBBox min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Box covering a single voxel.
  pub fn from_coord(coord: IVec3) -> Self {
    Self {
      min: coord,
      max: coord,
    }
  }

  /// Box covering the 8³ block starting at `origin`.
  pub fn from_block(origin: IVec3) -> Self {
    Self {
      min: origin,
      max: origin + IVec3::splat(BLOCK_MASK),
    }
  }

  /// Grow to include a coordinate.
  #[inline]
  pub fn expand(&mut self, coord: IVec3) {
    self.min = self.min.min(coord);
    self.max = self.max.max(coord);
  }

  /// Smallest box containing both boxes.
  pub fn union(&self, other: &CoordBBox) -> CoordBBox {
    CoordBBox {
      min: self.min.min(other.min),
      max: self.max.max(other.max),
    }
  }

  /// Box grown by `amount` voxels on every side.
  pub fn dilated(&self, amount: i32) -> CoordBBox {
    CoordBBox {
      min: self.min - IVec3::splat(amount),
      max: self.max + IVec3::splat(amount),
    }
  }

  /// Check if the box contains a coordinate.
  #[inline]
  pub fn contains(&self, coord: IVec3) -> bool {
    coord.cmpge(self.min).all() && coord.cmple(self.max).all()
  }

  /// Check if `other` lies entirely inside this box.
  #[inline]
  pub fn contains_box(&self, other: &CoordBBox) -> bool {
    self.contains(other.min) && self.contains(other.max)
  }

  /// Check if this box overlaps another.
  #[inline]
  pub fn overlaps(&self, other: &CoordBBox) -> bool {
    self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
  }

  /// Voxel count along each axis.
  #[inline]
  pub fn dim(&self) -> IVec3 {
    self.max - self.min + IVec3::ONE
  }

  /// Number of voxels covered.
  pub fn volume(&self) -> u64 {
    let dim = self.dim();
    dim.x as u64 * dim.y as u64 * dim.z as u64
  }

  /// Iterate all coordinates, X slowest and Z fastest.
  pub fn iter(&self) -> impl Iterator<Item = IVec3> {
    let CoordBBox { min, max } = *self;
    (min.x..=max.x)
      .flat_map(move |x| (min.y..=max.y).flat_map(move |y| (min.z..=max.z).map(move |z| IVec3::new(x, y, z))))
  }
}
