// Runs the embedding pipeline headlessly and writes the result as JSON.
use clap::Parser;
use embedviz::{VizConfig, run};
use log::info;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "embedviz",
    version,
    about = "Project a synthetic labeled dataset onto its top principal axes"
)]
struct Cli {
    /// JSON config file; missing fields fall back to defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of points
    #[arg(long)]
    points: Option<usize>,

    /// Override the feature dimensionality
    #[arg(long)]
    dims: Option<usize>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => VizConfig::from_path(path)?,
        None => VizConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(points) = cli.points {
        config.dataset.n_points = points;
    }
    if let Some(dims) = cli.dims {
        config.dataset.n_features = dims;
    }

    let embedding = run(&config)?;
    for (k, (pair, ratio)) in embedding
        .model
        .components()
        .iter()
        .zip(embedding.model.explained_variance_ratio())
        .enumerate()
    {
        info!("component {}: eigenvalue {:.4} ({:.1}% of variance)", k, pair.value, ratio * 100.0);
    }

    let report = embedding.report();
    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    if cli.pretty {
        serde_json::to_writer_pretty(&mut out, &report)?;
    } else {
        serde_json::to_writer(&mut out, &report)?;
    }
    writeln!(out)?;
    out.flush()?;

    if let Some(path) = &cli.output {
        info!("wrote {} points to {}", report.points.len(), path.display());
    }
    Ok(())
}
