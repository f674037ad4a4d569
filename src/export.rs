//! Image and JSON export of generated dungeons

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;

use image::{ImageBuffer, Rgb, RgbImage};
use serde::Serialize;

use crate::config::TreeConfig;
use crate::partition::PartitionTree;
use crate::region::{NodeId, RegionType, Room};
use crate::tiles::{is_solid_code, TileCategory};

/// Canvas colour behind the region overlay
const BACKGROUND: [u8; 3] = [208, 196, 173];
/// Room fill for the region overlay, blended at `ROOM_ALPHA`
const ROOM_FILL: [u8; 3] = [255, 0, 0];
const ROOM_ALPHA: f32 = 0.2;

/// Outline colour per region type
fn region_outline_color(region_type: RegionType) -> [u8; 3] {
    match region_type {
        RegionType::Root => [255, 255, 255],
        RegionType::Sibling => [40, 90, 200],
        RegionType::Leaf => [0, 255, 0],
    }
}

fn blend(base: [u8; 3], over: [u8; 3], alpha: f32) -> [u8; 3] {
    [
        (base[0] as f32 * (1.0 - alpha) + over[0] as f32 * alpha) as u8,
        (base[1] as f32 * (1.0 - alpha) + over[1] as f32 * alpha) as u8,
        (base[2] as f32 * (1.0 - alpha) + over[2] as f32 * alpha) as u8,
    ]
}

/// Render the tile grid, one `scale` x `scale` block per tile
pub fn render_tile_image(tree: &PartitionTree, scale: u32) -> RgbImage {
    let scale = scale.max(1);
    let grid = tree.tile_codes();
    let mut img: RgbImage = ImageBuffer::new(grid.width as u32 * scale, grid.height as u32 * scale);

    for (x, y, &code) in grid.iter() {
        let (r, g, b) = TileCategory::of(code).unwrap_or(TileCategory::Void).color();
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(x as u32 * scale + dx, y as u32 * scale + dy, Rgb([r, g, b]));
            }
        }
    }

    img
}

/// Render region boundaries and rooms at map pixel size.
/// Every node is outlined, so split regions show up under their children.
pub fn render_region_image(tree: &PartitionTree) -> RgbImage {
    let config = tree.config();
    let width = config.map_width_px;
    let height = config.map_height_px;
    let mut img: RgbImage = ImageBuffer::from_pixel(width, height, Rgb(BACKGROUND));
    let ts = tree.tile_size();

    for node in tree.nodes() {
        if let Some(room) = node.room() {
            fill_room(&mut img, room);
        }
    }

    for node in tree.nodes() {
        let (x, y, w, h) = node.pixel_bounds(ts);
        stroke_rect(&mut img, x, y, w, h, region_outline_color(node.region_type()));
    }

    img
}

fn fill_room(img: &mut RgbImage, room: &Room) {
    let right = (room.x + room.width).min(img.width());
    let bottom = (room.y + room.height).min(img.height());
    for py in room.y..bottom {
        for px in room.x..right {
            let base = img.get_pixel(px, py).0;
            img.put_pixel(px, py, Rgb(blend(base, ROOM_FILL, ROOM_ALPHA)));
        }
    }
}

fn stroke_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
    if w == 0 || h == 0 || x >= img.width() || y >= img.height() {
        return;
    }
    let right = (x + w - 1).min(img.width() - 1);
    let bottom = (y + h - 1).min(img.height() - 1);
    for px in x..=right {
        img.put_pixel(px, y, Rgb(color));
        img.put_pixel(px, bottom, Rgb(color));
    }
    for py in y..=bottom {
        img.put_pixel(x, py, Rgb(color));
        img.put_pixel(right, py, Rgb(color));
    }
}

/// Export the tile grid as a PNG
pub fn export_tile_png(tree: &PartitionTree, scale: u32, path: &str) -> Result<(), image::ImageError> {
    render_tile_image(tree, scale).save(path)
}

/// Export the region overlay as a PNG
pub fn export_region_png(tree: &PartitionTree, path: &str) -> Result<(), image::ImageError> {
    render_region_image(tree).save(path)
}

/// One region as written to JSON
#[derive(Debug, Serialize)]
pub struct RegionExport {
    pub id: usize,
    pub region_type: RegionType,
    pub x: usize,
    pub y: usize,
    pub width_tiles: usize,
    pub height_tiles: usize,
    pub depth: usize,
    pub parent: Option<usize>,
    pub children: Option<[usize; 2]>,
    /// In pixels
    pub room: Option<Room>,
    /// Room center in pixels, a spawn point for the game layer
    pub room_center: Option<(u32, u32)>,
}

/// Everything a game layer needs to build its tilemap
#[derive(Debug, Serialize)]
pub struct DungeonExport<'a> {
    pub seed: u64,
    pub config: &'a TreeConfig,
    pub tiles_wide: usize,
    pub tiles_high: usize,
    pub remaining_iterations: u32,
    pub regions: Vec<RegionExport>,
    /// `tile_codes[y][x]`
    pub tile_codes: Vec<Vec<u8>>,
    /// `collision[y][x]`, true on wall codes
    pub collision: Vec<Vec<bool>>,
}

impl<'a> DungeonExport<'a> {
    pub fn from_tree(tree: &'a PartitionTree, seed: u64) -> Self {
        let regions = tree
            .nodes()
            .iter()
            .enumerate()
            .map(|(idx, node)| RegionExport {
                id: idx,
                region_type: node.region_type(),
                x: node.x,
                y: node.y,
                width_tiles: node.width_tiles,
                height_tiles: node.height_tiles,
                depth: tree.depth(NodeId(idx)),
                parent: node.parent().map(NodeId::index),
                children: node.children().map(|(l, r)| [l.index(), r.index()]),
                room: node.room().copied(),
                room_center: node.room().map(Room::center),
            })
            .collect();

        Self {
            seed,
            config: tree.config(),
            tiles_wide: tree.tiles_wide(),
            tiles_high: tree.tiles_high(),
            remaining_iterations: tree.remaining_iterations(),
            regions,
            tile_codes: tree.tile_codes().to_rows(),
            collision: tree
                .tile_codes()
                .rows()
                .map(|row| row.iter().map(|&code| is_solid_code(code)).collect())
                .collect(),
        }
    }
}

/// Serialize a dungeon to pretty-printed JSON
pub fn dungeon_to_json(tree: &PartitionTree, seed: u64) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&DungeonExport::from_tree(tree, seed))
}

/// Export a dungeon as JSON
pub fn export_json(
    tree: &PartitionTree,
    seed: u64,
    path: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &DungeonExport::from_tree(tree, seed))?;
    Ok(())
}
