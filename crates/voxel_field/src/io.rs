//! JSON persistence of fields.
//!
//! A field is stored as its metadata plus one record per allocated block.
//! The transform is written as the 12 column-major entries of the affine map
//! (three basis columns, then the translation).

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use glam::{DAffine3, IVec3};
use serde::{Deserialize, Serialize};

use crate::constants::{block_origin, BLOCK_VOXELS};
use crate::error::FieldError;
use crate::field::{Block, LeafBlock, VolumetricField};

/// Dense block record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeafRecord {
  pub origin: [i32; 3],
  pub values: Vec<f32>,
  pub active: [u64; BLOCK_VOXELS / 64],
}

/// Uniform block record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
  pub origin: [i32; 3],
  pub value: f32,
  pub active: bool,
}

/// Serializable form of a [`VolumetricField`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldFile {
  #[serde(default)]
  pub name: String,
  pub background: f32,
  pub transform: [f64; 12],
  #[serde(default)]
  pub leaves: Vec<LeafRecord>,
  #[serde(default)]
  pub tiles: Vec<TileRecord>,
}

impl FieldFile {
  pub fn from_field(field: &VolumetricField) -> Self {
    let mut leaves = Vec::new();
    let mut tiles = Vec::new();
    for (origin, block) in field.blocks() {
      match block {
        Block::Leaf(leaf) => leaves.push(LeafRecord {
          origin: origin.to_array(),
          values: leaf.values().to_vec(),
          active: *leaf.active_words(),
        }),
        Block::Tile { value, active } => tiles.push(TileRecord {
          origin: origin.to_array(),
          value: *value,
          active: *active,
        }),
      }
    }
    Self {
      name: field.name().to_string(),
      background: field.background(),
      transform: field.transform().to_cols_array(),
      leaves,
      tiles,
    }
  }

  /// Rebuild the field, validating block alignment and leaf sizes.
  pub fn into_field(self) -> Result<VolumetricField, FieldError> {
    let transform = DAffine3::from_cols_array(&self.transform);
    let determinant = transform.matrix3.determinant();
    if !determinant.is_finite() || determinant == 0.0 {
      return Err(FieldError::InvalidTransform { determinant });
    }

    let mut field = VolumetricField::new(self.background)
      .with_name(self.name)
      .with_transform(transform);

    for tile in self.tiles {
      let origin = unique_origin(&field, tile.origin)?;
      field.insert_block(
        origin,
        Block::Tile {
          value: tile.value,
          active: tile.active,
        },
      );
    }
    for leaf in self.leaves {
      let origin = unique_origin(&field, leaf.origin)?;
      let values: Box<[f32; BLOCK_VOXELS]> = leaf
        .values
        .into_boxed_slice()
        .try_into()
        .map_err(|values: Box<[f32]>| {
          FieldError::Corrupt(format!(
            "leaf at {origin} has {} values, expected {BLOCK_VOXELS}",
            values.len()
          ))
        })?;
      field.insert_block(origin, Block::Leaf(LeafBlock::from_parts(values, leaf.active)));
    }
    Ok(field)
  }
}

/// Block-aligned origin not yet taken by another record.
fn unique_origin(field: &VolumetricField, origin: [i32; 3]) -> Result<IVec3, FieldError> {
  let origin = IVec3::from_array(origin);
  if block_origin(origin) != origin {
    return Err(FieldError::Corrupt(format!("block origin {origin} is not block aligned")));
  }
  if field.block(origin).is_some() {
    return Err(FieldError::Corrupt(format!("duplicate block at {origin}")));
  }
  Ok(origin)
}

/// Read a field from a JSON file.
pub fn read_json(path: impl AsRef<Path>) -> Result<VolumetricField, FieldError> {
  let path = path.as_ref();
  let file = fs::File::open(path).map_err(|e| FieldError::io(path, e))?;
  let record: FieldFile = serde_json::from_reader(BufReader::new(file))?;
  record.into_field()
}

/// Write a field to a JSON file, replacing any existing file.
pub fn write_json(field: &VolumetricField, path: impl AsRef<Path>) -> Result<(), FieldError> {
  let path = path.as_ref();
  let file = fs::File::create(path).map_err(|e| FieldError::io(path, e))?;
  let mut writer = BufWriter::new(file);
  serde_json::to_writer(&mut writer, &FieldFile::from_field(field))?;
  writer.flush().map_err(|e| FieldError::io(path, e))
}

#[cfg(test)]
#[path = "io_test.rs"]
mod io_test;
