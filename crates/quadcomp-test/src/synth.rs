//! Synthetic rasters for regression tests

use quadcomp_core::{Raster, Result};

/// The 4×4 reference raster used across the tree tests
///
/// Under uniform-region compression it decomposes into a 2×2 block of 0
/// (top-left), eight single cells, and a 2×2 block of 1 (bottom-right).
pub fn scenario_4x4() -> Result<Raster<u8>> {
    Raster::from_rows(&[[0u8, 0, 1, 2], [0, 0, 3, 4], [1, 2, 1, 1], [3, 4, 1, 1]])
}

/// Smooth diagonal ramp from 0 at the top-left to 255 at the bottom-right
///
/// Each extra channel is offset by 64 (mod 256).
pub fn gradient(width: u32, height: u32, channels: u32) -> Result<Raster<u8>> {
    let span = (width + height).saturating_sub(2).max(1);
    Raster::from_fn(width, height, channels, |x, y, c| {
        (((x + y) * 255 / span + c * 64) % 256) as u8
    })
}

/// Single-channel checkerboard of `block × block` squares
pub fn checkerboard(width: u32, height: u32, block: u32, lo: u8, hi: u8) -> Result<Raster<u8>> {
    let block = block.max(1);
    Raster::from_fn(width, height, 1, |x, y, _| {
        if (x / block + y / block) % 2 == 0 { lo } else { hi }
    })
}

/// Piecewise-constant raster of `block × block` tiles
///
/// Tile values are a fixed scramble of the tile coordinates, so adjacent
/// tiles almost always differ.
pub fn blocks(width: u32, height: u32, block: u32, channels: u32) -> Result<Raster<u8>> {
    let block = block.max(1);
    Raster::from_fn(width, height, channels, |x, y, c| {
        let (bx, by) = (x / block, y / block);
        ((bx * 37 + by * 91 + c * 53 + 11) % 256) as u8
    })
}
