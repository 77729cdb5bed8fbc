//! Test utilities for pipeline tests.
//!
//! Provides level-set fixtures, voxel-set helpers and mesh checks shared by
//! the unit tests of every pipeline stage.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use glam::{DVec3, IVec3};
use voxel_field::{level_set_box, level_set_sphere, FieldError, VolumetricField};

use crate::mesh::Mesh;
use crate::operators::SharedField;
use crate::source::{FieldStore, InMemoryStore};

// =============================================================================
// Field fixtures
// =============================================================================

/// Voxel size of every fixture; with a to-millimeter scale of 10 the loader
/// maps fixture index space onto the common index space unchanged.
pub const FIXTURE_VOXEL_SIZE: f64 = 0.1;

/// Sphere of `radius` voxels around the index-space point `center`.
pub fn sphere(radius: f64, center: DVec3) -> VolumetricField {
  level_set_sphere(
    radius * FIXTURE_VOXEL_SIZE,
    center * FIXTURE_VOXEL_SIZE,
    FIXTURE_VOXEL_SIZE,
    3.0,
  )
}

/// Box covering the index-space corners `min..=max`, surface half a voxel
/// outside them.
pub fn cube(min: IVec3, max: IVec3) -> VolumetricField {
  level_set_box(
    (min.as_dvec3() - 0.5) * FIXTURE_VOXEL_SIZE,
    (max.as_dvec3() + 0.5) * FIXTURE_VOXEL_SIZE,
    FIXTURE_VOXEL_SIZE,
    3.0,
  )
}

/// Field with no stored voxels at all.
pub fn empty_sample() -> VolumetricField {
  VolumetricField::new((3.0 * FIXTURE_VOXEL_SIZE) as f32)
    .with_transform(glam::DAffine3::from_scale(DVec3::splat(FIXTURE_VOXEL_SIZE)))
}

/// Store holding `fields` under ids `sample_0`, `sample_1`, ...
pub fn store_of(fields: Vec<VolumetricField>) -> InMemoryStore {
  let mut store = InMemoryStore::new();
  for (i, field) in fields.into_iter().enumerate() {
    store.insert(sample_id(i), field);
  }
  store
}

/// Store wrapper counting how many fields were loaded.
pub struct CountingStore {
  pub inner: InMemoryStore,
  loads: AtomicUsize,
}

impl CountingStore {
  pub fn new(inner: InMemoryStore) -> Self {
    Self {
      inner,
      loads: AtomicUsize::new(0),
    }
  }

  pub fn loads(&self) -> usize {
    self.loads.load(Ordering::SeqCst)
  }
}

impl FieldStore for CountingStore {
  fn load_field(&self, id: &str) -> Result<VolumetricField, FieldError> {
    self.loads.fetch_add(1, Ordering::SeqCst);
    self.inner.load_field(id)
  }
}

pub fn sample_id(index: usize) -> String {
  format!("sample_{index}")
}

pub fn shared(fields: Vec<VolumetricField>) -> Vec<SharedField> {
  fields.into_iter().map(Arc::new).collect()
}

/// Coordinates of every voxel with a value `<= 0`, active or not.
pub fn interior(field: &VolumetricField) -> BTreeSet<[i32; 3]> {
  let mut set = BTreeSet::new();
  for region in field.iter_all() {
    if region.value() > 0.0 {
      continue;
    }
    match region {
      voxel_field::ValueRegion::Voxel { coord, .. } => {
        set.insert(coord.to_array());
      }
      voxel_field::ValueRegion::Tile { bbox, .. } => {
        set.extend(bbox.iter().map(|c| c.to_array()));
      }
    }
  }
  set
}

/// Active coordinates of `field`.
pub fn active_set(field: &VolumetricField) -> BTreeSet<[i32; 3]> {
  field.iter_active().map(|(c, _)| c.to_array()).collect()
}

// =============================================================================
// Mesh checks
// =============================================================================

/// Every directed edge is matched by exactly one opposite edge.
pub fn is_closed(mesh: &Mesh) -> bool {
  let mut edges: HashMap<(u32, u32), i32> = HashMap::new();
  for tri in &mesh.triangles {
    for k in 0..3 {
      let (a, b) = (tri[k], tri[(k + 1) % 3]);
      *edges.entry((a, b)).or_default() += 1;
    }
  }
  !edges.is_empty()
    && edges
      .iter()
      .all(|(&(a, b), &n)| n == 1 && edges.get(&(b, a)) == Some(&1))
}

/// Signed volume enclosed by the mesh (positive for outward winding).
pub fn signed_volume(mesh: &Mesh) -> f64 {
  mesh
    .triangles
    .iter()
    .map(|tri| {
      let [a, b, c] = tri.map(|i| glam::Vec3::from_array(mesh.vertices[i as usize]).as_dvec3());
      a.dot(b.cross(c)) / 6.0
    })
    .sum()
}
