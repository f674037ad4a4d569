//! ASCII rendering and export for generated dungeons
//!
//! Provides functions to render a partition tree as text and write it to a file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};

use chrono::Local;

use crate::partition::PartitionTree;
use crate::tiles::TileCategory;
use crate::tilemap::Tilemap;

/// ASCII rendering modes
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AsciiMode {
    /// One character per tile category
    Tiles,
    /// Region outlines with rooms filled in
    Regions,
}

impl AsciiMode {
    pub fn name(&self) -> &'static str {
        match self {
            AsciiMode::Tiles => "Tiles",
            AsciiMode::Regions => "Regions",
        }
    }

    pub fn all() -> &'static [AsciiMode] {
        &[AsciiMode::Tiles, AsciiMode::Regions]
    }
}

/// Get ASCII character for a tile code. Codes outside every category show as `?`.
pub fn code_char(code: u8) -> char {
    TileCategory::of(code).map_or('?', |c| c.ascii_char())
}

/// Region view: `+` on the border of every unsplit region, `#` inside rooms.
fn region_chars(tree: &PartitionTree) -> Tilemap<char> {
    let mut chars = Tilemap::new_with(tree.tiles_wide(), tree.tiles_high(), ' ');
    let ts = tree.tile_size();

    for node in tree.nodes().iter().filter(|n| !n.has_children() && n.area() > 0) {
        if let Some(room) = node.room() {
            let (rx, ry, rw, rh) = room.tile_bounds(ts);
            for y in ry..ry + rh {
                for x in rx..rx + rw {
                    chars.set(x, y, '#');
                }
            }
        }

        let right = node.x + node.width_tiles - 1;
        let bottom = node.y + node.height_tiles - 1;
        for x in node.x..=right {
            chars.set(x, node.y, '+');
            chars.set(x, bottom, '+');
        }
        for y in node.y..=bottom {
            chars.set(node.x, y, '+');
            chars.set(right, y, '+');
        }
    }

    chars
}

/// Render a dungeon to an ASCII string
pub fn render_ascii_map(tree: &PartitionTree, mode: AsciiMode) -> String {
    let width = tree.tiles_wide();
    let height = tree.tiles_high();
    let mut result = String::with_capacity((width + 1) * height);

    match mode {
        AsciiMode::Tiles => {
            for row in tree.tile_codes().rows() {
                result.extend(row.iter().map(|&code| code_char(code)));
                result.push('\n');
            }
        }
        AsciiMode::Regions => {
            for row in region_chars(tree).rows() {
                result.extend(row.iter());
                result.push('\n');
            }
        }
    }

    result
}

/// Generate legend for tile characters
pub fn tile_legend() -> String {
    let mut legend = String::from("Legend:\n");
    for category in TileCategory::all() {
        let (low, high) = category.range();
        legend.push_str(&format!(
            "  '{}' {} ({}-{})\n",
            category.ascii_char(),
            category.name(),
            low,
            high
        ));
    }
    legend
}

/// Count cells per category
pub fn calculate_category_stats(tile_codes: &Tilemap<u8>) -> HashMap<TileCategory, usize> {
    let mut stats = HashMap::new();
    for (_, _, &code) in tile_codes.iter() {
        if let Some(category) = TileCategory::of(code) {
            *stats.entry(category).or_insert(0) += 1;
        }
    }
    stats
}

/// Export a dungeon to an ASCII file
pub fn export_dungeon_file(tree: &PartitionTree, seed: u64, path: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    let width = tree.tiles_wide();
    let height = tree.tiles_high();
    let total = (width * height).max(1);
    let config = tree.config();

    // Header
    writeln!(file, "=== DUNGEON GENERATOR MAP FILE ===")?;
    writeln!(file, "Seed: {}", seed)?;
    writeln!(
        file,
        "Size: {}x{} tiles ({}x{} px, tile {} px)",
        width, height, config.map_width_px, config.map_height_px, config.tile_size_px
    )?;
    writeln!(
        file,
        "Region size: {}-{} tiles, iterations left: {}",
        config.min_node_size_tiles,
        config.max_node_size_tiles,
        tree.remaining_iterations()
    )?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file)?;

    writeln!(file, "=== MAP (Tile View) ===")?;
    write!(file, "{}", render_ascii_map(tree, AsciiMode::Tiles))?;
    writeln!(file)?;
    write!(file, "{}", tile_legend())?;
    writeln!(file)?;

    writeln!(file, "=== MAP (Region View) ===")?;
    write!(file, "{}", render_ascii_map(tree, AsciiMode::Regions))?;
    writeln!(file)?;

    // Statistics
    writeln!(file, "=== TILE STATISTICS ===")?;
    let stats = calculate_category_stats(tree.tile_codes());
    for category in TileCategory::all() {
        let count = stats.get(category).copied().unwrap_or(0);
        writeln!(
            file,
            "  {:<12} {:>7} ({:>5.1}%)",
            category.name(),
            count,
            100.0 * count as f64 / total as f64
        )?;
    }
    writeln!(file)?;

    writeln!(file, "=== REGIONS ===")?;
    for (idx, node) in tree.nodes().iter().enumerate() {
        write!(
            file,
            "  #{:<4} {:<8} at ({:>3}, {:>3}) size {:>3}x{:<3}",
            idx,
            node.region_type().name(),
            node.x,
            node.y,
            node.width_tiles,
            node.height_tiles
        )?;
        if let Some(room) = node.room() {
            write!(
                file,
                " room ({}, {}) {}x{} px",
                room.x, room.y, room.width, room.height
            )?;
        }
        writeln!(file)?;
    }

    Ok(())
}

/// Print ASCII map to stdout
pub fn print_ascii_map(tree: &PartitionTree, mode: AsciiMode) {
    print!("{}", render_ascii_map(tree, mode));
}

// ============================================================================
// COLORIZED ASCII RENDERING
// ============================================================================

/// Format a single character with ANSI true color (24-bit) - foreground and background
pub fn ansi_colored_char(ch: char, fg: (u8, u8, u8), bg: (u8, u8, u8)) -> String {
    format!(
        "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m{}\x1b[0m",
        fg.0, fg.1, fg.2,
        bg.0, bg.1, bg.2,
        ch
    )
}

/// Render the tile view with category colours as ANSI escapes
pub fn render_colored_ascii_map(tree: &PartitionTree) -> String {
    let mut result = String::new();
    for row in tree.tile_codes().rows() {
        for &code in row {
            let category = TileCategory::of(code).unwrap_or(TileCategory::Void);
            let bg = category.color();
            // darker glyph on the same hue
            let fg = (bg.0 / 2, bg.1 / 2, bg.2 / 2);
            result.push_str(&ansi_colored_char(category.ascii_char(), fg, bg));
        }
        result.push('\n');
    }
    result
}

/// Print colored ASCII map to stdout
pub fn print_colored_ascii_map(tree: &PartitionTree) {
    print!("{}", render_colored_ascii_map(tree));
}
