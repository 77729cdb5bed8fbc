//! Boolean operations on level sets.

use crate::field::{ValueRegion, VolumetricField};

/// In-place union of two level sets: per-voxel minimum over every region
/// stored in either field. A voxel is active when it is active in either.
///
/// Both fields are expected to share one index space.
pub fn csg_union(target: &mut VolumetricField, other: &VolumetricField) {
  #[cfg(feature = "tracing")]
  let _span = tracing::debug_span!("csg_union").entered();

  for region in other.iter_all() {
    match region {
      ValueRegion::Voxel {
        coord,
        value,
        active,
      } => {
        let (current, current_active) = target.probe(coord);
        let merged = current.min(value);
        if active || current_active {
          target.set_value_on(coord, merged);
        } else if merged != current {
          target.set_value_off(coord, merged);
        }
      }
      ValueRegion::Tile {
        bbox,
        value,
        active,
      } => {
        if target.block(bbox.min).is_none() {
          target.fill(bbox, target.background().min(value), active);
          continue;
        }
        for coord in bbox.iter() {
          let (current, current_active) = target.probe(coord);
          let merged = current.min(value);
          if active || current_active {
            target.set_value_on(coord, merged);
          } else if merged != current {
            target.set_value_off(coord, merged);
          }
        }
      }
    }
  }
}
