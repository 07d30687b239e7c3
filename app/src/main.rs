mod app;
mod backend;
mod ui;

use app::VisualizerApp;
use clap::Parser;
use point_scene::SceneConfig;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "embedviz-app", version, about = "Interactive 3D view of a synthetic embedding")]
struct Cli {
    /// JSON scene config; missing fields fall back to defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the dataset and the projection
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SceneConfig::from_path(path)?,
        None => SceneConfig::default(),
    };
    if cli.seed.is_some() {
        config.embedding.seed = cli.seed;
    }

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Neural Point Cloud",
        native_options,
        Box::new(move |_cc| Ok(Box::new(VisualizerApp::new(config)))),
    )?;
    Ok(())
}
