mod app;
mod dataset;
mod headless;
mod layout;
mod plan;
mod util;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dataset::{DatasetPaths, load_dataset};
use layout::{DEFAULT_MAX_STEPS, LayoutConfig};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding item.json, tag.json and recipe.json
    #[arg(default_value = ".")]
    data_dir: PathBuf,

    /// Override the item list location
    #[arg(long)]
    items: Option<PathBuf>,

    /// Override the tag list location
    #[arg(long)]
    tags: Option<PathBuf>,

    /// Override the recipe list location
    #[arg(long)]
    recipes: Option<PathBuf>,

    /// Seed for initial positions and repulsion sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Give up converging after this many steps
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Run to completion without a window and print the final layout as JSON
    #[arg(long)]
    headless: bool,

    /// Write the headless layout here instead of stdout
    #[arg(long, requires = "headless")]
    output: Option<PathBuf>,
}

impl Args {
    fn dataset_paths(&self) -> DatasetPaths {
        let defaults = DatasetPaths::in_dir(&self.data_dir);
        DatasetPaths {
            items: self.items.clone().unwrap_or(defaults.items),
            tags: self.tags.clone().unwrap_or(defaults.tags),
            recipes: self.recipes.clone().unwrap_or(defaults.recipes),
        }
    }

    fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            max_steps: self.max_steps.max(1),
            ..LayoutConfig::default()
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let paths = args.dataset_paths();
    let config = args.layout_config();

    if args.headless {
        let seed = args.seed.unwrap_or_else(rand::random);
        let dataset = load_dataset(&paths)?;
        return headless::run(&dataset, config, seed, args.output.as_deref());
    }

    info!(data_dir = %args.data_dir.display(), "opening viewer");
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 900.0]),
        ..Default::default()
    };

    eframe::run_native(
        "recipe-orbs",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::RecipeOrbsApp::new(
                cc, paths, config, args.seed,
            )))
        }),
    )
    .map_err(|error| anyhow!("{error}"))
    .context("viewer exited with an error")
}
