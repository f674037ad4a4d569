//! Region nodes of the partition tree
//!
//! Nodes live in an arena owned by [`crate::partition::PartitionTree`] and
//! refer to each other through [`NodeId`] indices, so parent links never own
//! anything.

use serde::{Deserialize, Serialize};

/// Role of a region in the tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionType {
    /// The full-map region. Keeps this tag even after it has been split.
    Root,
    /// A region that holds (or will hold) a room
    Leaf,
    /// A split region whose two children are the active regions
    Sibling,
}

impl RegionType {
    pub fn name(&self) -> &'static str {
        match self {
            RegionType::Root => "Root",
            RegionType::Leaf => "Leaf",
            RegionType::Sibling => "Sibling",
        }
    }
}

/// Index of a node in the tree's arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A carved room, in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Room {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Room bounds in tile units as `(x, y, width, height)`.
    pub fn tile_bounds(&self, tile_size: u32) -> (usize, usize, usize, usize) {
        let ts = tile_size.max(1);
        (
            (self.x / ts) as usize,
            (self.y / ts) as usize,
            (self.width / ts) as usize,
            (self.height / ts) as usize,
        )
    }

    /// Center pixel, rounded towards the top-left
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// One rectangular region of the map. Position and extents are in tiles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionNode {
    pub x: usize,
    pub y: usize,
    pub width_tiles: usize,
    pub height_tiles: usize,
    region_type: RegionType,
    parent: Option<NodeId>,
    /// Left/top child after split
    left: Option<NodeId>,
    /// Right/bottom child after split
    right: Option<NodeId>,
    room: Option<Room>,
}

impl RegionNode {
    /// Extents are not checked here; the tree decides what is a legal region.
    pub fn new(
        parent: Option<NodeId>,
        region_type: RegionType,
        x: usize,
        y: usize,
        width_tiles: usize,
        height_tiles: usize,
    ) -> Self {
        Self {
            x,
            y,
            width_tiles,
            height_tiles,
            region_type,
            parent,
            left: None,
            right: None,
            room: None,
        }
    }

    pub fn region_type(&self) -> RegionType {
        self.region_type
    }

    pub fn set_region_type(&mut self, region_type: RegionType) {
        self.region_type = region_type;
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn left_child(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right_child(&self) -> Option<NodeId> {
        self.right
    }

    pub fn set_left_child(&mut self, child: NodeId) {
        debug_assert!(self.left.is_none(), "left child assigned twice");
        self.left = Some(child);
    }

    pub fn set_right_child(&mut self, child: NodeId) {
        debug_assert!(self.right.is_none(), "right child assigned twice");
        self.right = Some(child);
    }

    /// Both children, once the node has been split
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match (self.left, self.right) {
            (Some(left), Some(right)) => Some((left, right)),
            _ => None,
        }
    }

    pub fn has_children(&self) -> bool {
        self.left.is_some() || self.right.is_some()
    }

    pub fn room(&self) -> Option<&Room> {
        self.room.as_ref()
    }

    pub fn set_room(&mut self, room: Room) {
        debug_assert!(self.room.is_none(), "room carved twice");
        debug_assert_eq!(self.region_type, RegionType::Leaf, "room carved outside a leaf");
        self.room = Some(room);
    }

    /// Tile area covered by this region
    pub fn area(&self) -> usize {
        self.width_tiles * self.height_tiles
    }

    /// Region bounds in pixels as `(x, y, width, height)`.
    pub fn pixel_bounds(&self, tile_size: u32) -> (u32, u32, u32, u32) {
        (
            self.x as u32 * tile_size,
            self.y as u32 * tile_size,
            self.width_tiles as u32 * tile_size,
            self.height_tiles as u32 * tile_size,
        )
    }
}
