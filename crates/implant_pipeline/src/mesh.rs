//! Mesh extraction and PLY export.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use voxel_field::{surface_nets, MeshConfig, MeshOutput, VolumetricField};

use crate::operators::SharedField;

/// Triangle mesh of one output field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
  pub name: String,
  pub vertices: Vec<[f32; 3]>,
  pub normals: Vec<[f32; 3]>,
  pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
  pub fn from_output(name: impl Into<String>, output: MeshOutput) -> Self {
    Self {
      name: name.into(),
      vertices: output.vertices.iter().map(|v| v.position).collect(),
      normals: output.vertices.iter().map(|v| v.normal).collect(),
      triangles: output
        .indices
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.triangles.is_empty()
  }

  pub fn triangle_count(&self) -> usize {
    self.triangles.len()
  }

  /// Write the mesh as ASCII PLY.
  pub fn write_ply_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment {}", self.name)?;
    writeln!(writer, "element vertex {}", self.vertices.len())?;
    for property in ["x", "y", "z", "nx", "ny", "nz"] {
      writeln!(writer, "property float {property}")?;
    }
    writeln!(writer, "element face {}", self.triangles.len())?;
    writeln!(writer, "property list uchar uint vertex_indices")?;
    writeln!(writer, "end_header")?;

    for (p, n) in self.vertices.iter().zip(&self.normals) {
      writeln!(writer, "{} {} {} {} {} {}", p[0], p[1], p[2], n[0], n[1], n[2])?;
    }
    for [a, b, c] in &self.triangles {
      writeln!(writer, "3 {a} {b} {c}")?;
    }
    writer.flush()
  }

  /// Write the mesh as ASCII PLY to `path`, replacing any existing file.
  pub fn write_ply(&self, path: impl AsRef<Path>) -> io::Result<()> {
    let file = fs::File::create(path)?;
    self.write_ply_to(BufWriter::new(file))
  }
}

/// Converts fields into meshes at the zero level.
#[derive(Clone, Debug)]
pub struct MeshExtractor {
  config: MeshConfig,
}

impl MeshExtractor {
  pub fn new(adaptivity: f32) -> Self {
    Self {
      config: MeshConfig::new().with_adaptivity(adaptivity),
    }
  }

  pub fn config(&self) -> &MeshConfig {
    &self.config
  }

  pub fn extract(&self, field: &VolumetricField, name: impl Into<String>) -> Mesh {
    Mesh::from_output(name, surface_nets::generate(field, &self.config))
  }

  /// One independent mesh per field, named `implant_<threshold>` with an
  /// index suffix from the second mesh on.
  pub fn extract_all(&self, fields: &[SharedField], threshold: f32) -> Vec<Mesh> {
    fields
      .iter()
      .enumerate()
      .map(|(i, field)| {
        let name = mesh_name(threshold, i);
        let mesh = self.extract(field, name);
        if mesh.is_empty() {
          tracing::warn!(mesh = %mesh.name, "field produced an empty mesh");
        }
        mesh
      })
      .collect()
  }
}

/// Name of the `index`-th implant mesh.
pub fn mesh_name(threshold: f32, index: usize) -> String {
  if index == 0 {
    format!("implant_{threshold}")
  } else {
    format!("implant_{threshold}_{index}")
  }
}

#[cfg(test)]
#[path = "mesh_test.rs"]
mod mesh_test;
