//! Debug tool for comparing partitions across seeds
//! Generates a grid of region overlays, one cell per seed. Each cell is
//! labelled with its seed (white) and its room count (red).

use image::{imageops, Rgb, RgbImage};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use dungeon_generator::export::render_region_image;
use dungeon_generator::{GeneratorError, PartitionTree, TreeConfig};

const BASE_SEED: u64 = 42;
const COLS: u32 = 3;
const ROWS: u32 = 3;
const OUTPUT: &str = "partition_comparison.png";

const LABEL_HEIGHT: u32 = 20;
const GLYPH_SCALE: u32 = 2;
const SEED_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const ROOMS_COLOR: Rgb<u8> = Rgb([255, 90, 90]);

struct Cell {
    seed: u64,
    rooms: usize,
    image: RgbImage,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dungeon_generator=warn,debug_partitions=info")),
        )
        .init();

    tracing::info!("Generating partition comparison grid...");

    let config = TreeConfig::default();
    let seeds: Vec<u64> = (0..u64::from(COLS * ROWS)).map(|i| BASE_SEED + i).collect();

    // one generator per cell, so the output does not depend on thread scheduling
    let cells = seeds
        .par_iter()
        .map(|&seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let tree = PartitionTree::new(config.clone(), &mut rng)?;
            Ok(Cell {
                seed,
                rooms: tree.rooms().len(),
                image: render_region_image(&tree),
            })
        })
        .collect::<Result<Vec<Cell>, GeneratorError>>()?;

    for (idx, cell) in cells.iter().enumerate() {
        tracing::info!(
            cell = idx,
            seed = cell.seed,
            rooms = cell.rooms,
            "  Processed"
        );
    }

    compose_grid(&cells, config.map_width_px, config.map_height_px).save(OUTPUT)?;
    tracing::info!("Saved {}", OUTPUT);

    Ok(())
}

/// Lay the cells out row by row, each under a label strip.
fn compose_grid(cells: &[Cell], cell_width: u32, cell_height: u32) -> RgbImage {
    let row_height = cell_height + LABEL_HEIGHT;
    let mut grid = RgbImage::from_pixel(cell_width * COLS, row_height * ROWS, Rgb([40, 40, 40]));

    for (idx, cell) in cells.iter().enumerate().take((COLS * ROWS) as usize) {
        let x = (idx as u32 % COLS) * cell_width;
        let y = (idx as u32 / COLS) * row_height;

        imageops::overlay(&mut grid, &cell.image, i64::from(x), i64::from(y + LABEL_HEIGHT));

        let label_y = y + (LABEL_HEIGHT - 5 * GLYPH_SCALE) / 2;
        let end = draw_number(&mut grid, x + 5, label_y, cell.seed, SEED_COLOR);
        draw_number(&mut grid, end + 4 * GLYPH_SCALE, label_y, cell.rooms as u64, ROOMS_COLOR);
    }

    grid
}

// 3x5 digits, one row of three bits per entry
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Draw `value` in decimal at `(x, y)`. Returns the x just past the last digit.
fn draw_number(img: &mut RgbImage, x: u32, y: u32, value: u64, color: Rgb<u8>) -> u32 {
    let mut cx = x;
    for digit in value.to_string().bytes().map(|b| (b - b'0') as usize) {
        for (row, bits) in DIGITS[digit].iter().enumerate() {
            for col in 0..3u32 {
                if bits & (0b100 >> col) == 0 {
                    continue;
                }
                let px = cx + col * GLYPH_SCALE;
                let py = y + row as u32 * GLYPH_SCALE;
                for dy in 0..GLYPH_SCALE {
                    for dx in 0..GLYPH_SCALE {
                        if px + dx < img.width() && py + dy < img.height() {
                            img.put_pixel(px + dx, py + dy, color);
                        }
                    }
                }
            }
        }
        cx += 4 * GLYPH_SCALE;
    }
    cx
}
