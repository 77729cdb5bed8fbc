//! Mesh output types for iso-surface extraction.

/// Normal computation mode for mesh generation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum NormalMode {
  /// Gradient of the field at the vertex cell (8 corner samples).
  #[default]
  Gradient,

  /// Angle-weighted average of adjacent triangle normals.
  Geometry,
}

/// Output vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
  /// World-space position.
  pub position: [f32; 3],

  /// Surface normal (unit vector).
  pub normal: [f32; 3],

  /// Index-space cell the vertex was generated in.
  pub cell_position: [i32; 3],
}

impl Default for Vertex {
  fn default() -> Self {
    Self {
      position: [0.0; 3],
      normal: [0.0, 1.0, 0.0],
      cell_position: [0; 3],
    }
  }
}

/// Axis-aligned bounding box.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: [f32; 3],
  pub max: [f32; 3],
}

impl MinMaxAABB {
  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; 3],
      max: [f32::NEG_INFINITY; 3],
    }
  }

  pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
    Self { min, max }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: [f32; 3]) {
    for i in 0..3 {
      self.min[i] = self.min[i].min(point[i]);
      self.max[i] = self.max[i].max(point[i]);
    }
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min[0] <= self.max[0] && self.min[1] <= self.max[1] && self.min[2] <= self.max[2]
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Mesh generation result.
#[derive(Clone, Debug, Default)]
pub struct MeshOutput {
  pub vertices: Vec<Vertex>,

  /// Triangle indices (3 indices per triangle).
  pub indices: Vec<u32>,

  /// Bounding box encompassing all vertices.
  pub bounds: MinMaxAABB,
}

impl MeshOutput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Clear all buffers, preserving capacity.
  pub fn clear(&mut self) {
    self.vertices.clear();
    self.indices.clear();
    self.bounds = MinMaxAABB::empty();
  }

  /// Returns true if no geometry was generated.
  pub fn is_empty(&self) -> bool {
    self.vertices.is_empty()
  }

  /// Number of triangles in the mesh.
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }
}

/// Configuration for mesh generation.
#[derive(Clone, Debug)]
pub struct MeshConfig {
  /// Iso value of the extracted surface.
  pub iso_value: f32,

  /// Planar simplification strength in `[0, 1]`; `0.0` keeps every vertex.
  pub adaptivity: f32,

  /// Normal computation mode.
  pub normal_mode: NormalMode,
}

impl Default for MeshConfig {
  fn default() -> Self {
    Self {
      iso_value: 0.0,
      adaptivity: 0.0,
      normal_mode: NormalMode::default(),
    }
  }
}

impl MeshConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_iso_value(mut self, iso_value: f32) -> Self {
    self.iso_value = iso_value;
    self
  }

  pub fn with_adaptivity(mut self, adaptivity: f32) -> Self {
    self.adaptivity = adaptivity.clamp(0.0, 1.0);
    self
  }

  pub fn with_normal_mode(mut self, mode: NormalMode) -> Self {
    self.normal_mode = mode;
    self
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
