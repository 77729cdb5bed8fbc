//! Narrow-band level set reconstruction from an occupancy mask.

use std::collections::{HashMap, HashSet, VecDeque};

use glam::IVec3;

use crate::constants::FACE_NEIGHBORS;
use crate::field::VolumetricField;
use crate::filter::LevelSetFilter;

/// 26-connected neighbourhood used to propagate nearest seeds.
fn neighbors26() -> impl Iterator<Item = IVec3> {
  (-1..=1).flat_map(|x| {
    (-1..=1).flat_map(move |y| (-1..=1).map(move |z| IVec3::new(x, y, z)))
  })
  .filter(|o| *o != IVec3::ZERO)
}

/// Grow the mask by one voxel across every face.
pub fn dilate(mask: &HashSet<IVec3>) -> HashSet<IVec3> {
  let mut out = mask.clone();
  for &coord in mask {
    for offset in FACE_NEIGHBORS {
      out.insert(coord + offset);
    }
  }
  out
}

/// Remove every voxel with a face neighbour outside the mask.
pub fn erode(mask: &HashSet<IVec3>) -> HashSet<IVec3> {
  mask
    .iter()
    .copied()
    .filter(|&coord| FACE_NEIGHBORS.iter().all(|&o| mask.contains(&(coord + o))))
    .collect()
}

/// Euclidean distance (in voxels) from every voxel of `region` to the nearest
/// seed, limited to `max_distance`. Seeds are expanded through `region` only.
fn nearest_seed_distances(
  seeds: impl IntoIterator<Item = IVec3>,
  region: impl Fn(IVec3) -> bool,
  max_distance: f32,
) -> HashMap<IVec3, f32> {
  let mut nearest: HashMap<IVec3, (IVec3, f32)> = HashMap::new();
  let mut queue: VecDeque<IVec3> = VecDeque::new();
  for seed in seeds {
    nearest.insert(seed, (seed, 0.0));
    queue.push_back(seed);
  }

  while let Some(coord) = queue.pop_front() {
    let (seed, _) = nearest[&coord];
    for offset in neighbors26() {
      let next = coord + offset;
      if !region(next) {
        continue;
      }
      let distance = (next - seed).as_vec3().length();
      if distance > max_distance {
        continue;
      }
      let improves = nearest.get(&next).map_or(true, |&(_, d)| distance < d);
      if improves {
        nearest.insert(next, (seed, distance));
        queue.push_back(next);
      }
    }
  }

  nearest.into_iter().map(|(c, (_, d))| (c, d)).collect()
}

/// Rebuild a signed narrow-band level set from the active topology of `mask`.
///
/// Morphology runs first: the mask is dilated `closing + dilation` times and
/// then eroded `closing` times. The surface lies halfway between occupied and
/// free voxels, so an occupied voxel next to a free one reads `-0.5` voxels.
/// Values are scaled by the voxel size of `mask`; the band spans
/// `half_width` voxels to each side and deeper interior voxels are stored
/// inactive at `-background`. Finally `smoothing` mean passes are applied.
pub fn topology_to_level_set(
  mask: &VolumetricField,
  half_width: u32,
  closing: u32,
  dilation: u32,
  smoothing: u32,
) -> VolumetricField {
  #[cfg(feature = "tracing")]
  let _span = tracing::debug_span!("topology_to_level_set", half_width, closing, dilation, smoothing).entered();

  let voxel_size = mask.voxel_size() as f32;
  let half_width = half_width.max(1) as f32;
  let background = half_width * voxel_size;

  let mut result = VolumetricField::new(background)
    .with_name(mask.name())
    .with_transform(*mask.transform());

  let mut occupied: HashSet<IVec3> = mask.iter_active().map(|(c, _)| c).collect();
  if occupied.is_empty() {
    return result;
  }
  for _ in 0..(closing + dilation) {
    occupied = dilate(&occupied);
  }
  for _ in 0..closing {
    occupied = erode(&occupied);
  }

  // Boundary voxels on both sides of the surface
  let mut inner_boundary = Vec::new();
  let mut outer_boundary = HashSet::new();
  for &coord in &occupied {
    let mut on_boundary = false;
    for offset in FACE_NEIGHBORS {
      let next = coord + offset;
      if !occupied.contains(&next) {
        on_boundary = true;
        outer_boundary.insert(next);
      }
    }
    if on_boundary {
      inner_boundary.push(coord);
    }
  }

  let max_distance = half_width + 0.5;
  let outside = nearest_seed_distances(
    inner_boundary.iter().copied(),
    |c| !occupied.contains(&c),
    max_distance,
  );
  let inside = nearest_seed_distances(
    outer_boundary.iter().copied(),
    |c| occupied.contains(&c),
    max_distance,
  );

  for (coord, distance) in outside {
    if occupied.contains(&coord) {
      continue;
    }
    let value = (distance - 0.5) * voxel_size;
    if value < background {
      result.set_value_on(coord, value);
    }
  }
  for &coord in &occupied {
    match inside.get(&coord) {
      Some(&distance) if (distance - 0.5) * voxel_size < background => {
        result.set_value_on(coord, -(distance - 0.5) * voxel_size);
      }
      _ => result.set_value_off(coord, -background),
    }
  }

  if smoothing > 0 {
    let mut filter = LevelSetFilter::new(&mut result);
    for _ in 0..smoothing {
      filter.mean(1);
    }
  }
  result.prune(0.0);
  result
}

#[cfg(test)]
#[path = "level_set_test.rs"]
mod level_set_test;
