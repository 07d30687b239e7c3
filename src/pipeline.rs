use blobs::{BlobsError, Dataset};
use embedviz_helpers::seeded_rng;
use log::{debug, info};
use ndarray::{Array2, ArrayView1};
use power_pca::{AxisRange, PcaError, PcaModel, PowerPca, axis_ranges, normalize_axes};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, VizConfig};

/// Errors raised by [`run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("dataset generation failed: {0}")]
    Dataset(#[from] BlobsError),
    #[error("projection failed: {0}")]
    Projection(#[from] PcaError),
}

/// Dataset, fitted projector and normalized positions of one run.
#[derive(Debug, Clone)]
pub struct Embedding {
    pub dataset: Dataset<f64>,
    pub model: PcaModel<f64>,
    /// Per-axis extent of the projection before normalization.
    pub raw_ranges: Vec<AxisRange<f64>>,
    /// Normalized positions, `N x n_components`, each axis in the target range.
    pub positions: Array2<f64>,
}

impl Embedding {
    pub fn len(&self) -> usize {
        self.positions.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.nrows() == 0
    }

    pub fn position(&self, i: usize) -> ArrayView1<'_, f64> {
        self.positions.row(i)
    }

    pub fn label(&self, i: usize) -> Option<String> {
        self.dataset.display_label(i)
    }

    pub fn report(&self) -> EmbeddingReport {
        let ratios = self.model.explained_variance_ratio();
        let components = self
            .model
            .components()
            .iter()
            .zip(ratios)
            .map(|(pair, ratio)| ComponentReport {
                eigenvalue: pair.value,
                explained_variance: ratio,
                vector: pair.vector.to_vec(),
            })
            .collect();
        let points = self
            .dataset
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| PointReport {
                label: format!("{}_{}", p.label, i),
                category: p.label.clone(),
                position: self.positions.row(i).to_vec(),
            })
            .collect();
        EmbeddingReport { components, points }
    }
}

/// Serializable summary written by the command line tool.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingReport {
    pub components: Vec<ComponentReport>,
    pub points: Vec<PointReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentReport {
    pub eigenvalue: f64,
    pub explained_variance: f64,
    pub vector: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointReport {
    pub label: String,
    pub category: String,
    pub position: Vec<f64>,
}

/// Runs generation, projection and normalization with the configured seed.
pub fn run(config: &VizConfig) -> Result<Embedding, PipelineError> {
    let mut rng = seeded_rng(config.seed);
    run_with_rng(config, &mut rng)
}

/// Runs the pipeline drawing every random number from `rng`.
///
/// The dataset is drawn first, then the initial vectors of the power
/// iteration, so a seeded generator reproduces the whole run.
pub fn run_with_rng<R: Rng + ?Sized>(config: &VizConfig, rng: &mut R) -> Result<Embedding, PipelineError> {
    config.validate()?;

    let dataset: Dataset<f64> = blobs::generate(&config.dataset, rng)?;
    let pca = PowerPca::new(config.projection.n_components, config.projection.iterations);
    let model = pca.fit(dataset.to_matrix().view(), rng)?;

    let raw_ranges = axis_ranges(model.projection());
    let positions = normalize_axes(
        model.projection(),
        config.projection.target_min,
        config.projection.target_max,
    );
    debug!("raw axis ranges: {:?}", raw_ranges);
    info!(
        "embedded {} points from {} to {} dimensions",
        dataset.len(),
        dataset.n_features(),
        positions.ncols()
    );

    Ok(Embedding {
        dataset,
        model,
        raw_ranges,
        positions,
    })
}
