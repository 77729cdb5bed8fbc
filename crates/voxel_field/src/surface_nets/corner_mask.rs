//! Corner mask computation.
//!
//! The corner mask is an 8-bit value where each bit indicates whether a corner
//! of the 2x2x2 cell is inside the surface (value below the iso value).

/// Build corner mask from 8 corner samples.
///
/// Each bit in the result corresponds to one corner:
/// - Bit 0: corner (0,0,0)
/// - Bit 1: corner (1,0,0)
/// - Bit 2: corner (0,1,0)
/// - Bit 3: corner (1,1,0)
/// - Bit 4: corner (0,0,1)
/// - Bit 5: corner (1,0,1)
/// - Bit 6: corner (0,1,1)
/// - Bit 7: corner (1,1,1)
#[inline]
pub fn build(samples: &[f32; 8], iso: f32) -> u8 {
  samples
    .iter()
    .enumerate()
    .fold(0u8, |mask, (i, &s)| if s < iso { mask | (1 << i) } else { mask })
}

/// True when the cell contains no surface crossing.
#[inline]
pub fn is_homogeneous(mask: u8) -> bool {
  mask == 0 || mask == u8::MAX
}

#[cfg(test)]
#[path = "corner_mask_test.rs"]
mod corner_mask_test;
