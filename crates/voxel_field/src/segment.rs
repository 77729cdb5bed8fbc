//! Connected-component segmentation of level sets.
//!
//! The interior (every voxel with a negative value, active or not) is split
//! into 6-connected components. Each exterior narrow-band voxel is then
//! handed to the component whose interior reaches it first in a breadth-first
//! flood through the active band, so every output field is a complete level
//! set around one island.

use std::collections::{HashMap, VecDeque};

use glam::IVec3;
use smallvec::SmallVec;

use crate::constants::FACE_NEIGHBORS;
use crate::field::{ValueRegion, VolumetricField};

/// Split a level set into one field per disjoint interior component.
///
/// Components are returned in discovery order (ascending block order of their
/// first voxel). A field without interior voxels yields a single empty field
/// carrying the input background, transform and name.
pub fn segment_sdf(field: &VolumetricField) -> Vec<VolumetricField> {
  #[cfg(feature = "tracing")]
  let _span = tracing::debug_span!("segment_sdf").entered();

  // Interior voxels in traversal order, with their stored state
  let mut interior: Vec<IVec3> = Vec::new();
  for region in field.iter_all() {
    match region {
      ValueRegion::Voxel { coord, value, .. } if value < 0.0 => interior.push(coord),
      ValueRegion::Tile { bbox, value, .. } if value < 0.0 => interior.extend(bbox.iter()),
      _ => {}
    }
  }

  if interior.is_empty() {
    return vec![field.empty_like()];
  }

  let mut labels: HashMap<IVec3, u32> = interior.iter().map(|&c| (c, u32::MAX)).collect();
  let mut component_count = 0u32;
  let mut queue = VecDeque::new();

  for &seed in &interior {
    if labels[&seed] != u32::MAX {
      continue;
    }
    let label = component_count;
    component_count += 1;
    labels.insert(seed, label);
    queue.push_back(seed);
    while let Some(coord) = queue.pop_front() {
      for offset in FACE_NEIGHBORS {
        let next = coord + offset;
        if let Some(slot) = labels.get_mut(&next) {
          if *slot == u32::MAX {
            *slot = label;
            queue.push_back(next);
          }
        }
      }
    }
  }

  // Multi-source flood from all interior voxels into the active exterior band.
  let mut band: HashMap<IVec3, u32> = HashMap::new();
  queue.extend(interior.iter().copied());
  while let Some(coord) = queue.pop_front() {
    let label = labels
      .get(&coord)
      .or_else(|| band.get(&coord))
      .copied()
      .unwrap_or(u32::MAX);
    let reached: SmallVec<[IVec3; 6]> = FACE_NEIGHBORS
      .iter()
      .map(|&offset| coord + offset)
      .filter(|next| {
        !labels.contains_key(next) && !band.contains_key(next) && {
          let (value, active) = field.probe(*next);
          active && value >= 0.0
        }
      })
      .collect();
    for next in reached {
      band.insert(next, label);
      queue.push_back(next);
    }
  }

  let mut segments: Vec<VolumetricField> = (0..component_count)
    .map(|_| field.empty_like())
    .collect();
  for (coord, label) in labels.iter().chain(band.iter()) {
    let (value, active) = field.probe(*coord);
    let segment = &mut segments[*label as usize];
    if active {
      segment.set_value_on(*coord, value);
    } else {
      segment.set_value_off(*coord, value);
    }
  }
  for segment in &mut segments {
    segment.prune(0.0);
  }
  segments
}

#[cfg(test)]
#[path = "segment_test.rs"]
mod segment_test;
