use anyhow::Context;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use dungeon_generator::ascii::{self, AsciiMode};
use dungeon_generator::export;
use dungeon_generator::{PartitionTree, TreeConfig};

#[derive(Parser, Debug)]
#[command(name = "dungeon_generator")]
#[command(about = "Generate BSP dungeon layouts as tile-code grids")]
struct Args {
    /// Load a JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<String>,

    /// Width of the map in pixels
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Height of the map in pixels
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Tile size in pixels
    #[arg(short, long)]
    tile_size: Option<u32>,

    /// Minimum region size in tiles
    #[arg(long)]
    min_size: Option<u32>,

    /// Maximum region size in tiles
    #[arg(long)]
    max_size: Option<u32>,

    /// Width/height ratio that forces a vertical split
    #[arg(long)]
    width_height_ratio: Option<f32>,

    /// Height/width ratio that forces a horizontal split
    #[arg(long)]
    height_width_ratio: Option<f32>,

    /// Iteration budget for subdivision (default 1000)
    #[arg(short, long)]
    iterations: Option<u32>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// ASCII view to print: tiles, regions or none
    #[arg(long, default_value = "tiles")]
    view: String,

    /// Print the tile view with ANSI colours
    #[arg(long)]
    color: bool,

    /// Export the generation result as JSON
    #[arg(long)]
    export_json: Option<String>,

    /// Export the tile grid as a PNG
    #[arg(long)]
    export_png: Option<String>,

    /// Pixels per tile in the tile PNG
    #[arg(long, default_value = "4")]
    png_scale: u32,

    /// Export the region/room overlay as a PNG
    #[arg(long)]
    export_regions: Option<String>,

    /// Export an ASCII map file with statistics
    #[arg(long)]
    export_ascii: Option<String>,
}

impl Args {
    fn tree_config(&self) -> anyhow::Result<TreeConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse config file {}", path))?
            }
            None => TreeConfig::default(),
        };

        if let Some(v) = self.width {
            config.map_width_px = v;
        }
        if let Some(v) = self.height {
            config.map_height_px = v;
        }
        if let Some(v) = self.tile_size {
            config.tile_size_px = v;
        }
        if let Some(v) = self.min_size {
            config.min_node_size_tiles = v;
        }
        if let Some(v) = self.max_size {
            config.max_node_size_tiles = v;
        }
        if let Some(v) = self.width_height_ratio {
            config.width_height_ratio = v;
        }
        if let Some(v) = self.height_width_ratio {
            config.height_width_ratio = v;
        }
        if self.iterations.is_some() {
            config.iterations = self.iterations;
        }

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dungeon_generator=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.tree_config()?;

    // Initialize RNG
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    tracing::info!(
        seed,
        width = config.map_width_px,
        height = config.map_height_px,
        tile_size = config.tile_size_px,
        "Generating dungeon"
    );

    let mut tree = PartitionTree::new(config, &mut rng)?;
    tree.rasterize(&mut rng);

    tracing::info!(
        regions = tree.nodes().len(),
        rooms = tree.rooms().len(),
        "Dungeon ready ({}x{} tiles)",
        tree.tiles_wide(),
        tree.tiles_high()
    );

    if args.color {
        ascii::print_colored_ascii_map(&tree);
    } else {
        match args.view.as_str() {
            "tiles" => ascii::print_ascii_map(&tree, AsciiMode::Tiles),
            "regions" => ascii::print_ascii_map(&tree, AsciiMode::Regions),
            "none" => {}
            other => anyhow::bail!("Unknown view '{}' (expected tiles, regions or none)", other),
        }
    }

    if let Some(ref path) = args.export_json {
        export::export_json(&tree, seed, path)
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("Failed to export JSON to {}", path))?;
        tracing::info!("Exported JSON to: {}", path);
    }

    if let Some(ref path) = args.export_png {
        export::export_tile_png(&tree, args.png_scale, path)
            .with_context(|| format!("Failed to export tile PNG to {}", path))?;
        tracing::info!("Exported tile grid to: {}", path);
    }

    if let Some(ref path) = args.export_regions {
        export::export_region_png(&tree, path)
            .with_context(|| format!("Failed to export region PNG to {}", path))?;
        tracing::info!("Exported region overlay to: {}", path);
    }

    if let Some(ref path) = args.export_ascii {
        ascii::export_dungeon_file(&tree, seed, path)
            .with_context(|| format!("Failed to export ASCII map to {}", path))?;
        tracing::info!("Exported ASCII map to: {}", path);
    }

    Ok(())
}
