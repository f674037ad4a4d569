//! Generator configuration
//!
//! Map dimensions are given in pixels and converted to tile counts once, at
//! validation time. Region size limits are already in tiles.

use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;

/// Iteration budget used when none is configured
pub const DEFAULT_ITERATIONS: u32 = 1000;

/// Configuration for a partition tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Map width in pixels, a multiple of `tile_size_px`
    pub map_width_px: u32,
    /// Map height in pixels, a multiple of `tile_size_px`
    pub map_height_px: u32,
    /// Edge length of one tile in pixels
    pub tile_size_px: u32,
    /// Smallest extent a split may leave on either side (tiles)
    pub min_node_size_tiles: u32,
    /// Regions wider or taller than this get split (tiles)
    pub max_node_size_tiles: u32,
    /// Width/height threshold that forces a vertical split
    pub width_height_ratio: f32,
    /// Height/width threshold that forces a horizontal split
    pub height_width_ratio: f32,
    /// Number of node visits the subdivision pass may spend.
    /// `None` means [`DEFAULT_ITERATIONS`].
    pub iterations: Option<u32>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            map_width_px: 800,
            map_height_px: 600,
            tile_size_px: 8,
            min_node_size_tiles: 10,
            max_node_size_tiles: 20,
            width_height_ratio: 0.5,
            height_width_ratio: 0.5,
            iterations: None,
        }
    }
}

impl TreeConfig {
    /// Check the pixel dimensions against the tile size.
    /// A valid config always yields at least one tile on each axis.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.tile_size_px == 0 {
            return Err(GeneratorError::ZeroTileSize);
        }
        if self.map_width_px == 0 || self.map_height_px == 0 {
            return Err(GeneratorError::ZeroMapSize {
                width: self.map_width_px,
                height: self.map_height_px,
            });
        }
        if self.map_width_px % self.tile_size_px != 0 {
            return Err(GeneratorError::WidthNotDivisible {
                width: self.map_width_px,
                tile_size: self.tile_size_px,
            });
        }
        if self.map_height_px % self.tile_size_px != 0 {
            return Err(GeneratorError::HeightNotDivisible {
                height: self.map_height_px,
                tile_size: self.tile_size_px,
            });
        }
        Ok(())
    }

    /// Map width in tiles. Only meaningful on a validated config.
    pub fn tiles_wide(&self) -> usize {
        (self.map_width_px / self.tile_size_px.max(1)) as usize
    }

    /// Map height in tiles. Only meaningful on a validated config.
    pub fn tiles_high(&self) -> usize {
        (self.map_height_px / self.tile_size_px.max(1)) as usize
    }

    pub fn iteration_budget(&self) -> u32 {
        self.iterations.unwrap_or(DEFAULT_ITERATIONS)
    }
}
