use std::collections::HashMap;

use glam::{DAffine3, DVec3, Vec3};

use super::*;
use crate::primitives::{level_set_box, level_set_sphere};

fn signed_volume(output: &MeshOutput) -> f32 {
  output
    .indices
    .chunks_exact(3)
    .map(|t| {
      let p = |i: u32| Vec3::from_array(output.vertices[i as usize].position);
      p(t[0]).dot(p(t[1]).cross(p(t[2]))) / 6.0
    })
    .sum()
}

/// Every directed edge appears once and its reverse appears once.
fn is_closed(output: &MeshOutput) -> bool {
  let mut edges: HashMap<(u32, u32), u32> = HashMap::new();
  for t in output.indices.chunks_exact(3) {
    for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
      *edges.entry((a, b)).or_default() += 1;
    }
  }
  edges
    .iter()
    .all(|(&(a, b), &n)| n == 1 && edges.get(&(b, a)) == Some(&1))
}

#[test]
fn test_empty_field_produces_no_mesh() {
  let output = generate(&VolumetricField::new(3.0), &MeshConfig::default());
  assert!(output.is_empty());
  assert_eq!(output.triangle_count(), 0);
}

#[test]
fn test_band_without_crossing_produces_no_mesh() {
  let mut field = VolumetricField::new(3.0);
  field.fill(CoordBBox::new(IVec3::ZERO, IVec3::splat(9)), 1.0, true);
  let output = generate(&field, &MeshConfig::default());
  assert!(output.is_empty());
}

#[test]
fn test_sphere_produces_closed_mesh() {
  let radius = 6.0;
  let sphere = level_set_sphere(radius, DVec3::ZERO, 1.0, 3.0);
  let output = generate(&sphere, &MeshConfig::default());

  assert!(!output.is_empty());
  assert!(output.triangle_count() > 100);
  assert!(is_closed(&output));

  for vertex in &output.vertices {
    let r = Vec3::from_array(vertex.position).length();
    assert!((r - radius as f32).abs() < 0.5, "vertex at radius {r}");
  }
  assert!(output.bounds.is_valid());
}

#[test]
fn test_winding_is_outward() {
  let sphere = level_set_sphere(5.0, DVec3::ZERO, 1.0, 3.0);
  let output = generate(&sphere, &MeshConfig::default());

  let volume = signed_volume(&output);
  let expected = 4.0 / 3.0 * std::f32::consts::PI * 125.0;
  assert!(volume > 0.0);
  assert!((volume - expected).abs() / expected < 0.1, "volume {volume}");

  // Gradient normals point away from the centre
  for vertex in &output.vertices {
    let p = Vec3::from_array(vertex.position);
    assert!(p.dot(Vec3::from_array(vertex.normal)) > 0.0);
  }
}

#[test]
fn test_world_transform_is_applied() {
  let sphere = level_set_sphere(0.5, DVec3::ZERO, 0.1, 3.0);
  let shifted = sphere
    .clone()
    .with_transform(DAffine3::from_translation(DVec3::new(10.0, 0.0, 0.0)) * *sphere.transform());

  let a = generate(&sphere, &MeshConfig::default());
  let b = generate(&shifted, &MeshConfig::default());

  assert_eq!(a.vertices.len(), b.vertices.len());
  for (va, vb) in a.vertices.iter().zip(&b.vertices) {
    assert!((vb.position[0] - va.position[0] - 10.0).abs() < 1e-4);
    assert!((va.position[1] - vb.position[1]).abs() < 1e-5);
  }
  assert!(a.bounds.max[0] < 0.6 && a.bounds.min[0] > -0.6);
}

#[test]
fn test_solid_tile_meshes_its_shell() {
  let mut field = VolumetricField::new(1.0);
  field.fill(CoordBBox::from_block(IVec3::ZERO), -1.0, false);

  let output = generate(&field, &MeshConfig::default());

  assert!(!output.is_empty());
  assert!(is_closed(&output));
  assert!(signed_volume(&output) > 0.0);
}

#[test]
fn test_adaptivity_reduces_planar_geometry() {
  let cube = level_set_box(DVec3::splat(-6.0), DVec3::splat(6.0), 1.0, 3.0);
  let full = generate(&cube, &MeshConfig::default());
  let adaptive = generate(&cube, &MeshConfig::default().with_adaptivity(1.0));

  assert!(adaptive.vertices.len() < full.vertices.len());
  assert!(adaptive.triangle_count() < full.triangle_count());
  assert!(signed_volume(&adaptive) > 0.0);
  for &i in &adaptive.indices {
    assert!((i as usize) < adaptive.vertices.len());
  }
}

#[test]
fn test_geometry_normals_point_outward() {
  let sphere = level_set_sphere(5.0, DVec3::ZERO, 1.0, 3.0);
  let config = MeshConfig::default().with_normal_mode(NormalMode::Geometry);
  let output = generate(&sphere, &config);

  for vertex in &output.vertices {
    let p = Vec3::from_array(vertex.position);
    assert!(p.dot(Vec3::from_array(vertex.normal)) > 0.0);
  }
}

#[test]
fn test_iso_value_shifts_surface() {
  let sphere = level_set_sphere(5.0, DVec3::ZERO, 1.0, 3.0);
  let inner = generate(&sphere, &MeshConfig::default().with_iso_value(-1.0));
  for vertex in &inner.vertices {
    let r = Vec3::from_array(vertex.position).length();
    assert!((r - 4.0).abs() < 0.5);
  }
}
