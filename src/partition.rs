//! Binary space partitioning of a tile map
//!
//! The tree starts from a single region covering the map and keeps splitting
//! regions larger than the configured maximum until nothing changes or the
//! iteration budget runs out. Every region that ends up a leaf gets one room,
//! and the rooms are rasterized into a grid of tile codes on request.
//!
//! All random draws come from the generator handed in by the caller, in a
//! fixed order: orientation and split offset per split, then room size and
//! offset per leaf, then one code per rasterized cell. The same seed and
//! config always give the same tree and grid.

use std::collections::VecDeque;

use rand::Rng;
use tracing::{debug, info, trace, warn};

use crate::config::TreeConfig;
use crate::error::GeneratorError;
use crate::region::{NodeId, RegionNode, RegionType, Room};
use crate::tiles::TileCategory;
use crate::tilemap::Tilemap;

/// Tiles kept free around a room, per side
pub const ROOM_MARGIN: usize = 2;

/// Direction of a split
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitAxis {
    /// Top/bottom children; the height is divided
    Horizontal,
    /// Left/right children; the width is divided
    Vertical,
}

/// A fully subdivided map with one room per leaf.
#[derive(Clone, Debug)]
pub struct PartitionTree {
    config: TreeConfig,
    tiles_wide: usize,
    tiles_high: usize,
    /// Every node ever created, root first, children appended as pairs
    nodes: Vec<RegionNode>,
    root: NodeId,
    iterations: u32,
    tile_codes: Tilemap<u8>,
}

impl PartitionTree {
    /// Validate the config, subdivide the map and carve the rooms.
    ///
    /// Fails before any node exists if the map is empty or not a whole number
    /// of tiles.
    pub fn new(config: TreeConfig, rng: &mut impl Rng) -> Result<Self, GeneratorError> {
        config.validate()?;

        let tiles_wide = config.tiles_wide();
        let tiles_high = config.tiles_high();
        let iterations = config.iteration_budget();

        let mut tree = Self {
            config,
            tiles_wide,
            tiles_high,
            nodes: Vec::new(),
            root: NodeId(0),
            iterations,
            tile_codes: Tilemap::new(tiles_wide, tiles_high),
        };

        tree.generate_nodes(rng);
        tree.carve_rooms(rng);

        Ok(tree)
    }

    fn push_node(&mut self, node: RegionNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Subdivide until a full pass splits nothing or the budget is spent.
    ///
    /// Each pass visits the childless nodes in creation order, and children
    /// created during a pass are visited later in that same pass. Every visit
    /// costs one iteration whether or not the node splits, so nodes that stay
    /// childless are paid for again on every following pass.
    fn generate_nodes(&mut self, rng: &mut impl Rng) {
        let root = self.push_node(RegionNode::new(
            None,
            RegionType::Root,
            0,
            0,
            self.tiles_wide,
            self.tiles_high,
        ));
        self.root = root;

        let max = self.config.max_node_size_tiles as usize;
        let mut pending: VecDeque<NodeId> = VecDeque::from([root]);
        let mut has_divided = true;
        let mut passes = 0;

        while has_divided && self.iterations > 0 {
            has_divided = false;
            passes += 1;
            let mut unsplit = Vec::with_capacity(pending.len());

            while let Some(id) = pending.pop_front() {
                if self.iterations == 0 {
                    break;
                }
                self.iterations -= 1;

                let node = &self.nodes[id.index()];
                if node.width_tiles > max || node.height_tiles > max {
                    if let Some((left, right)) = self.do_split(id, rng) {
                        pending.push_back(left);
                        pending.push_back(right);
                        has_divided = true;
                        continue;
                    }
                }
                // too small, or no legal split this time
                unsplit.push(id);
            }

            pending = unsplit.into();
        }

        let leaves = self.leaves().count();
        info!(
            nodes = self.nodes.len(),
            leaves,
            passes,
            remaining_iterations = self.iterations,
            "Subdivision complete"
        );

        if self.iterations == 0 {
            let oversized = self
                .nodes
                .iter()
                .filter(|n| !n.has_children() && (n.width_tiles > max || n.height_tiles > max))
                .count();
            if oversized > 0 {
                warn!(oversized, "Iteration budget exhausted with oversized regions left unsplit");
            }
        }
    }

    /// Pick the split direction for a `width` x `height` region.
    ///
    /// The coin is always flipped, even when the aspect ratio overrides it.
    pub fn choose_axis(&self, width: usize, height: usize, rng: &mut impl Rng) -> SplitAxis {
        let mut axis = if rng.gen_bool(0.5) {
            SplitAxis::Horizontal
        } else {
            SplitAxis::Vertical
        };

        let w = width as f32;
        let h = height as f32;
        if width > height && w / h >= self.config.width_height_ratio {
            axis = SplitAxis::Vertical;
        } else if height > width && h / w >= self.config.height_width_ratio {
            axis = SplitAxis::Horizontal;
        }

        axis
    }

    /// Try to split a node in two. Returns the new children on success.
    ///
    /// The split is abandoned when the chosen extent minus the minimum size
    /// does not exceed the minimum size, which is what stops subdivision.
    pub fn do_split(&mut self, id: NodeId, rng: &mut impl Rng) -> Option<(NodeId, NodeId)> {
        let (x, y, width, height, region_type) = {
            let node = &self.nodes[id.index()];
            if node.has_children() {
                return None;
            }
            (node.x, node.y, node.width_tiles, node.height_tiles, node.region_type())
        };

        let axis = self.choose_axis(width, height, rng);
        let extent = match axis {
            SplitAxis::Horizontal => height,
            SplitAxis::Vertical => width,
        };

        let min = self.config.min_node_size_tiles as usize;
        let max = match extent.checked_sub(min) {
            Some(max) if max > min => max,
            _ => return None,
        };

        // both children keep at least one tile even with a zero minimum
        let low = min.max(1);
        let high = max.min(extent - 1);
        if low > high {
            return None;
        }
        let split = rng.gen_range(low..=high);

        let (first, second) = match axis {
            SplitAxis::Horizontal => (
                RegionNode::new(Some(id), RegionType::Leaf, x, y, width, split),
                RegionNode::new(Some(id), RegionType::Leaf, x, y + split, width, height - split),
            ),
            SplitAxis::Vertical => (
                RegionNode::new(Some(id), RegionType::Leaf, x, y, split, height),
                RegionNode::new(Some(id), RegionType::Leaf, x + split, y, width - split, height),
            ),
        };

        let left = self.push_node(first);
        let right = self.push_node(second);

        let node = &mut self.nodes[id.index()];
        node.set_left_child(left);
        node.set_right_child(right);
        if region_type != RegionType::Root {
            node.set_region_type(RegionType::Sibling);
        }

        debug!(node = id.index(), ?axis, split, width, height, "Split region");
        Some((left, right))
    }

    /// Give every leaf a room.
    fn carve_rooms(&mut self, rng: &mut impl Rng) {
        for idx in 0..self.nodes.len() {
            if self.nodes[idx].region_type() != RegionType::Leaf {
                continue;
            }
            let room = self.create_room(NodeId(idx), rng);
            debug!(node = idx, ?room, "Carved room");
            self.nodes[idx].set_room(room);
        }
    }

    /// Sample a room inside a node, in pixels.
    pub fn create_room(&self, id: NodeId, rng: &mut impl Rng) -> Room {
        let node = &self.nodes[id.index()];
        let min = self.config.min_node_size_tiles as usize;

        let (w_low, w_high) = room_extent_range(node.width_tiles, min);
        let (h_low, h_high) = room_extent_range(node.height_tiles, min);
        if w_high + ROOM_MARGIN * 2 > node.width_tiles || h_high + ROOM_MARGIN * 2 > node.height_tiles {
            trace!(
                node = id.index(),
                width = node.width_tiles,
                height = node.height_tiles,
                "Leaf too small for room margin, range clamped"
            );
        }

        let room_width = rng.gen_range(w_low..=w_high);
        let room_height = rng.gen_range(h_low..=h_high);

        let offset_x = rng.gen_range(0..=node.width_tiles - room_width);
        let offset_y = rng.gen_range(0..=node.height_tiles - room_height);

        let ts = self.config.tile_size_px;
        Room::new(
            (node.x + offset_x) as u32 * ts,
            (node.y + offset_y) as u32 * ts,
            room_width as u32 * ts,
            room_height as u32 * ts,
        )
    }

    /// Write fresh tile codes for every room into the grid and return it.
    ///
    /// Cells outside rooms stay 0. Calling this again redraws the codes; the
    /// category of every cell stays the same.
    pub fn rasterize(&mut self, rng: &mut impl Rng) -> &Tilemap<u8> {
        let ts = self.config.tile_size_px;
        self.tile_codes.fill(0);

        for node in &self.nodes {
            let Some(room) = node.room() else {
                continue;
            };
            let (rx, ry, rw, rh) = room.tile_bounds(ts);

            for dy in 0..rh {
                for dx in 0..rw {
                    let category = TileCategory::for_room_cell(dx, dy, rw, rh);
                    self.tile_codes.set(rx + dx, ry + dy, category.sample(rng));
                }
            }
        }

        &self.tile_codes
    }

    /// The tile-code grid as last rasterized (all zeros before the first call)
    pub fn tile_codes(&self) -> &Tilemap<u8> {
        &self.tile_codes
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn tile_size(&self) -> u32 {
        self.config.tile_size_px
    }

    pub fn tiles_wide(&self) -> usize {
        self.tiles_wide
    }

    pub fn tiles_high(&self) -> usize {
        self.tiles_high
    }

    /// Iterations left after subdivision
    pub fn remaining_iterations(&self) -> u32 {
        self.iterations
    }

    /// All nodes in creation order
    pub fn nodes(&self) -> &[RegionNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&RegionNode> {
        self.nodes.get(id.index())
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root(&self) -> &RegionNode {
        &self.nodes[self.root.index()]
    }

    pub fn children(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        self.node(id).and_then(|n| n.children())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent())
    }

    /// Number of ancestors between a node and the root
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// Leaf-typed nodes with their ids
    pub fn leaves(&self) -> impl Iterator<Item = (NodeId, &RegionNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.region_type() == RegionType::Leaf)
            .map(|(idx, n)| (NodeId(idx), n))
    }

    /// Carved rooms in node order
    pub fn rooms(&self) -> Vec<Room> {
        self.nodes.iter().filter_map(|n| n.room().copied()).collect()
    }
}

/// Inclusive room-extent range for a leaf extent.
///
/// Nominally `[min, extent - 4]`, leaving two tiles on each side. When the
/// leaf is too small for that, the upper bound is floored at `min` and then
/// capped at the leaf extent, and the lower bound is pulled down to match, so
/// the range is never inverted or empty and the room always fits the leaf.
/// Rooms are at least one tile.
pub fn room_extent_range(extent: usize, min: usize) -> (usize, usize) {
    let extent = extent.max(1);
    let high = extent.saturating_sub(ROOM_MARGIN * 2).max(min).clamp(1, extent);
    let low = min.clamp(1, high);
    (low, high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_config() -> TreeConfig {
        TreeConfig {
            map_width_px: 64,
            map_height_px: 64,
            tile_size_px: 8,
            min_node_size_tiles: 4,
            max_node_size_tiles: 8,
            width_height_ratio: 0.5,
            height_width_ratio: 0.5,
            iterations: Some(100),
        }
    }

    fn build(config: TreeConfig, seed: u64) -> PartitionTree {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        PartitionTree::new(config, &mut rng).unwrap()
    }

    #[test]
    fn test_root_spans_map() {
        let tree = build(small_config(), 1);
        let root = tree.root();
        assert_eq!((root.x, root.y), (0, 0));
        assert_eq!((root.width_tiles, root.height_tiles), (8, 8));
        assert_eq!(root.region_type(), RegionType::Root);
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_small_map_scenario() {
        // 8x8 tiles never exceeds the max of 8, so the root is the only node
        let tree = build(small_config(), 2);
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.remaining_iterations(), 99);
        for (_, leaf) in tree.leaves() {
            assert!(leaf.width_tiles <= 8 && leaf.height_tiles <= 8);
            let room = leaf.room().unwrap();
            let (_, _, rw, rh) = room.tile_bounds(8);
            assert!(rw + 4 <= leaf.width_tiles && rh + 4 <= leaf.height_tiles);
        }
    }

    #[test]
    fn test_indivisible_width_fails() {
        let config = TreeConfig {
            map_width_px: 65,
            ..small_config()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let err = PartitionTree::new(config, &mut rng).unwrap_err();
        assert_eq!(err, GeneratorError::WidthNotDivisible { width: 65, tile_size: 8 });
    }

    #[test]
    fn test_zero_iterations_leaves_only_root() {
        let config = TreeConfig {
            iterations: Some(0),
            ..TreeConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut tree = PartitionTree::new(config, &mut rng).unwrap();
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.root().region_type(), RegionType::Root);
        assert!(tree.rooms().is_empty());
        let grid = tree.rasterize(&mut rng);
        assert!(grid.iter().all(|(_, _, &code)| code == 0));
    }

    #[test]
    fn test_single_iteration_splits_root_once() {
        let config = TreeConfig {
            iterations: Some(1),
            ..TreeConfig::default()
        };
        let tree = build(config, 5);
        assert_eq!(tree.nodes().len(), 3);
        assert_eq!(tree.remaining_iterations(), 0);
        assert_eq!(tree.root().region_type(), RegionType::Root);
        // 100x75 tiles is wide enough to force a vertical split
        let (left, right) = tree.children(tree.root_id()).unwrap();
        let (l, r) = (tree.node(left).unwrap(), tree.node(right).unwrap());
        assert_eq!(l.width_tiles + r.width_tiles, 100);
        assert_eq!(l.height_tiles, 75);
        assert_eq!(tree.rooms().len(), 2);
    }

    #[test]
    fn test_every_visit_costs_an_iteration() {
        // root splits, then both children are visited and too small to split
        let config = TreeConfig {
            map_width_px: 160,
            map_height_px: 80,
            tile_size_px: 8,
            min_node_size_tiles: 4,
            max_node_size_tiles: 12,
            iterations: Some(50),
            ..TreeConfig::default()
        };
        let tree = build(config, 6);
        let visits = 50 - tree.remaining_iterations() as usize;
        let childless = tree.nodes().iter().filter(|n| !n.has_children()).count();
        let split = tree.nodes().len() - childless;
        // one visit per split node, plus at least one visit per final leaf
        assert!(visits >= split + childless);
    }

    fn strip_config(iterations: u32) -> TreeConfig {
        // 25x1 tiles: the root always splits into two children of 10..=15
        // tiles, and neither can split again (15 - 10 does not exceed 10)
        TreeConfig {
            map_width_px: 200,
            map_height_px: 8,
            tile_size_px: 8,
            min_node_size_tiles: 10,
            max_node_size_tiles: 12,
            iterations: Some(iterations),
            ..TreeConfig::default()
        }
    }

    #[test]
    fn test_unsplit_children_are_paid_for_again_next_pass() {
        for seed in 0..16 {
            let tree = build(strip_config(50), seed);
            assert_eq!(tree.nodes().len(), 3);
            // pass 1: root + both children, pass 2: both children again
            assert_eq!(tree.remaining_iterations(), 45, "seed {}", seed);
        }
    }

    #[test]
    fn test_budget_runs_out_mid_pass() {
        let tree = build(strip_config(4), 9);
        assert_eq!(tree.nodes().len(), 3);
        assert_eq!(tree.remaining_iterations(), 0);

        let tree = build(strip_config(1), 9);
        assert_eq!(tree.nodes().len(), 3);
        assert_eq!(tree.remaining_iterations(), 0);
    }

    #[test]
    fn test_zero_height_map_is_an_error() {
        let config = TreeConfig {
            map_height_px: 0,
            ..TreeConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let err = PartitionTree::new(config, &mut rng).unwrap_err();
        assert_eq!(err, GeneratorError::ZeroMapSize { width: 800, height: 0 });
    }

    #[test]
    fn test_children_tile_parent() {
        let tree = build(TreeConfig::default(), 7);
        assert!(tree.nodes().len() > 1);
        for (idx, node) in tree.nodes().iter().enumerate() {
            let Some((left, right)) = node.children() else {
                continue;
            };
            let l = tree.node(left).unwrap();
            let r = tree.node(right).unwrap();
            assert_eq!(l.parent(), Some(NodeId(idx)));
            assert_eq!((l.x, l.y), (node.x, node.y));
            if l.width_tiles == node.width_tiles {
                assert_eq!(l.height_tiles + r.height_tiles, node.height_tiles);
                assert_eq!((r.x, r.y), (node.x, node.y + l.height_tiles));
                assert_eq!(r.width_tiles, node.width_tiles);
            } else {
                assert_eq!(l.width_tiles + r.width_tiles, node.width_tiles);
                assert_eq!((r.x, r.y), (node.x + l.width_tiles, node.y));
                assert_eq!((l.height_tiles, r.height_tiles), (node.height_tiles, node.height_tiles));
            }
        }
    }

    #[test]
    fn test_split_nodes_become_siblings() {
        let tree = build(TreeConfig::default(), 8);
        for (idx, node) in tree.nodes().iter().enumerate() {
            let expected = if idx == 0 {
                RegionType::Root
            } else if node.has_children() {
                RegionType::Sibling
            } else {
                RegionType::Leaf
            };
            assert_eq!(node.region_type(), expected);
        }
    }

    #[test]
    fn test_only_leaves_get_rooms() {
        let tree = build(TreeConfig::default(), 9);
        for node in tree.nodes() {
            assert_eq!(node.room().is_some(), node.region_type() == RegionType::Leaf);
        }
    }

    #[test]
    fn test_rooms_inside_leaves() {
        let tree = build(TreeConfig::default(), 10);
        let ts = tree.tile_size();
        for (_, leaf) in tree.leaves() {
            let (lx, ly, lw, lh) = leaf.pixel_bounds(ts);
            let room = leaf.room().unwrap();
            assert!(room.x >= lx && room.x + room.width <= lx + lw);
            assert!(room.y >= ly && room.y + room.height <= ly + lh);
            assert!(room.width > 0 && room.height > 0);
        }
    }

    #[test]
    fn test_default_leaves_respect_size_limits() {
        let tree = build(TreeConfig::default(), 11);
        assert!(tree.remaining_iterations() > 0);
        for (_, leaf) in tree.leaves() {
            assert!(leaf.width_tiles <= 20 && leaf.height_tiles <= 20);
            assert!(leaf.width_tiles >= 10 && leaf.height_tiles >= 10);
        }
    }

    #[test]
    fn test_terminates_with_max_size_one() {
        let config = TreeConfig {
            min_node_size_tiles: 1,
            max_node_size_tiles: 1,
            iterations: Some(500),
            ..TreeConfig::default()
        };
        let tree = build(config, 12);
        assert!(tree.nodes().len() <= 2 * 500 + 1);
    }

    #[test]
    fn test_zero_min_size_never_makes_empty_regions() {
        let config = TreeConfig {
            min_node_size_tiles: 0,
            max_node_size_tiles: 1,
            iterations: Some(2000),
            ..TreeConfig::default()
        };
        let tree = build(config, 13);
        for node in tree.nodes() {
            assert!(node.width_tiles > 0 && node.height_tiles > 0);
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let mut rng_a = ChaCha8Rng::seed_from_u64(99);
        let mut rng_b = ChaCha8Rng::seed_from_u64(99);
        let mut a = PartitionTree::new(TreeConfig::default(), &mut rng_a).unwrap();
        let mut b = PartitionTree::new(TreeConfig::default(), &mut rng_b).unwrap();
        assert_eq!(a.nodes(), b.nodes());
        assert_eq!(a.rasterize(&mut rng_a), b.rasterize(&mut rng_b));
    }

    #[test]
    fn test_rasterized_categories_follow_room_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(14);
        let mut tree = PartitionTree::new(TreeConfig::default(), &mut rng).unwrap();
        let grid = tree.rasterize(&mut rng).clone();
        let ts = tree.tile_size();

        let mut covered = 0;
        for room in tree.rooms() {
            let (rx, ry, rw, rh) = room.tile_bounds(ts);
            for dy in 0..rh {
                for dx in 0..rw {
                    let code = *grid.get(rx + dx, ry + dy);
                    let expected = TileCategory::for_room_cell(dx, dy, rw, rh);
                    assert_eq!(TileCategory::of(code), Some(expected));
                    covered += 1;
                }
            }
        }
        let non_void = grid.count_where(|&c| c != 0);
        assert_eq!(non_void, covered);
    }

    #[test]
    fn test_rasterize_twice_keeps_categories() {
        let mut rng = ChaCha8Rng::seed_from_u64(15);
        let mut tree = PartitionTree::new(TreeConfig::default(), &mut rng).unwrap();
        let first = tree.rasterize(&mut rng).clone();
        let second = tree.rasterize(&mut rng);
        for (x, y, &code) in first.iter() {
            assert_eq!(TileCategory::of(code), TileCategory::of(*second.get(x, y)));
        }
    }

    #[test]
    fn test_choose_axis_ratio_override() {
        let tree = build(small_config(), 16);
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..50 {
            assert_eq!(tree.choose_axis(30, 10, &mut rng), SplitAxis::Vertical);
            assert_eq!(tree.choose_axis(10, 30, &mut rng), SplitAxis::Horizontal);
        }
    }

    #[test]
    fn test_choose_axis_square_is_random() {
        let tree = build(small_config(), 18);
        let mut rng = ChaCha8Rng::seed_from_u64(19);
        let horizontal = (0..200)
            .filter(|_| tree.choose_axis(10, 10, &mut rng) == SplitAxis::Horizontal)
            .count();
        assert!(horizontal > 50 && horizontal < 150);
    }

    #[test]
    fn test_split_refused_below_minimum() {
        let mut tree = build(small_config(), 20);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        // 8 - 4 = 4 does not exceed the minimum of 4 on either axis
        assert!(tree.do_split(tree.root_id(), &mut rng).is_none());
        assert!(!tree.root().has_children());
    }

    #[test]
    fn test_depth_counts_ancestors() {
        let tree = build(TreeConfig::default(), 22);
        assert_eq!(tree.depth(tree.root_id()), 0);
        let (left, _) = tree.children(tree.root_id()).unwrap();
        assert_eq!(tree.depth(left), 1);
        for (id, _) in tree.leaves() {
            assert!(tree.depth(id) >= 1);
        }
    }

    #[test]
    fn test_room_extent_range_clamps() {
        assert_eq!(room_extent_range(20, 10), (10, 16));
        assert_eq!(room_extent_range(14, 10), (10, 10));
        // leaf narrower than min + margin: floored at min
        assert_eq!(room_extent_range(12, 10), (10, 10));
        // leaf narrower than min: capped at the leaf
        assert_eq!(room_extent_range(3, 10), (3, 3));
        assert_eq!(room_extent_range(6, 0), (1, 2));
        assert_eq!(room_extent_range(1, 0), (1, 1));
    }
}
