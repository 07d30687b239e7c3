//! Synthetic embedding pipeline: a clustered labeled dataset is generated,
//! reduced to its top principal axes by power iteration, and normalized into a
//! fixed cube ready for rendering as a point cloud.

pub mod config;
pub mod pipeline;

pub use blobs::{BlobConfig, BlobsError, Dataset};
pub use config::{ConfigError, ProjectionConfig, VizConfig};
pub use embedviz_helpers::{DataPoint, Float};
pub use pipeline::{Embedding, EmbeddingReport, PipelineError, run, run_with_rng};
pub use power_pca::{Eigenpair, PcaError, PcaModel, PowerPca};
