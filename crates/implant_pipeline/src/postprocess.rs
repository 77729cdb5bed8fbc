//! Thresholding, target subtraction and level-set rebuild of the probability
//! field.

use glam::{DAffine3, DVec3};
use voxel_field::{topology_to_level_set, VolumetricField};

use crate::config::ReconstructionConfig;

/// Name given to the rebuilt level set.
pub const IMPLANT_FIELD_NAME: &str = "implant";

/// Turns a probability field into the narrow-band level set handed to the
/// operator pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct PostProcessor {
  pub threshold: f32,
  /// Distance by which the target is grown before subtraction.
  pub target_offset: f32,
  pub half_width: u32,
  pub closing_steps: u32,
  pub dilation_steps: u32,
  pub smoothing_steps: u32,
  pub meshing_scale: f64,
}

impl PostProcessor {
  pub fn from_config(config: &ReconstructionConfig) -> Self {
    Self {
      threshold: config.threshold,
      target_offset: config.target_offset,
      half_width: config.half_width,
      closing_steps: config.closing_steps,
      dilation_steps: config.dilation_steps,
      smoothing_steps: config.smoothing_steps,
      meshing_scale: config.meshing_scale,
    }
  }

  /// Active voxels with `probability >= threshold`, restricted to voxels
  /// outside `target` grown by `target_offset` (value `>= target_offset`)
  /// when a target is given.
  pub fn mask(&self, probability: &VolumetricField, target: Option<&VolumetricField>) -> VolumetricField {
    let mut mask = VolumetricField::new(1.0).with_transform(*probability.transform());
    for (coord, value) in probability.iter_active() {
      if value < self.threshold {
        continue;
      }
      if target.is_some_and(|target| target.value(coord) < self.target_offset) {
        continue;
      }
      mask.set_value_on(coord, value);
    }
    mask
  }

  /// Mask, rebuild and rescale to meshing units.
  pub fn run(&self, probability: &VolumetricField, target: Option<&VolumetricField>) -> VolumetricField {
    let mask = self.mask(probability, target);
    tracing::debug!(
      threshold = self.threshold,
      subtract_target = target.is_some(),
      target_offset = self.target_offset,
      mask_voxels = mask.active_voxel_count(),
      "probability thresholded"
    );

    let mut field = topology_to_level_set(
      &mask,
      self.half_width,
      self.closing_steps,
      self.dilation_steps,
      self.smoothing_steps,
    );
    field.set_transform(DAffine3::from_scale(DVec3::splat(self.meshing_scale)));
    field.set_name(IMPLANT_FIELD_NAME);
    field
  }
}

#[cfg(test)]
#[path = "postprocess_test.rs"]
mod postprocess_test;
