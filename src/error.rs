//! Errors raised while building a partition tree.

/// Configuration errors. All of them are detected before any region exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// Tile size of zero pixels
    ZeroTileSize,
    /// Map with no width or no height
    ZeroMapSize { width: u32, height: u32 },
    /// Map width in pixels is not a multiple of the tile size
    WidthNotDivisible { width: u32, tile_size: u32 },
    /// Map height in pixels is not a multiple of the tile size
    HeightNotDivisible { height: u32, tile_size: u32 },
}

impl std::fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorError::ZeroTileSize => write!(f, "Tile size must be greater than zero"),
            GeneratorError::ZeroMapSize { width, height } => {
                write!(f, "The map ({}x{}px) must be at least one tile in each direction", width, height)
            }
            GeneratorError::WidthNotDivisible { width, tile_size } => {
                write!(
                    f,
                    "The width ({}px) must be divisible by the tile size ({}px)",
                    width, tile_size
                )
            }
            GeneratorError::HeightNotDivisible { height, tile_size } => {
                write!(
                    f,
                    "The height ({}px) must be divisible by the tile size ({}px)",
                    height, tile_size
                )
            }
        }
    }
}

impl std::error::Error for GeneratorError {}
