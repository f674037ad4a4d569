//! Dungeon generation library
//!
//! Partitions a tile map into a binary tree of regions, carves a room in
//! every leaf and rasterizes the rooms into a grid of tile codes.
//!
//! ```no_run
//! use dungeon_generator::{PartitionTree, TreeConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let mut tree = PartitionTree::new(TreeConfig::default(), &mut rng)?;
//! let codes = tree.rasterize(&mut rng);
//! assert_eq!(codes.width, 100);
//! # Ok::<(), dungeon_generator::GeneratorError>(())
//! ```

pub mod ascii;
pub mod config;
pub mod error;
pub mod export;
pub mod partition;
pub mod region;
pub mod tiles;
pub mod tilemap;

pub use config::TreeConfig;
pub use error::GeneratorError;
pub use partition::{PartitionTree, SplitAxis};
pub use region::{NodeId, RegionNode, RegionType, Room};
pub use tiles::TileCategory;
pub use tilemap::Tilemap;
