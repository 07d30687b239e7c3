use blobs::{BlobConfig, BlobsError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating a [`VizConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("target range [{min}, {max}] is empty")]
    InvalidTargetRange { min: f64, max: f64 },
    #[error(transparent)]
    Dataset(#[from] BlobsError),
}

/// How the dataset is reduced and where the result is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub n_components: usize,
    pub iterations: usize,
    pub target_min: f64,
    pub target_max: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            n_components: 3,
            iterations: 200,
            target_min: -15.0,
            target_max: 15.0,
        }
    }
}

/// Everything needed to go from a random seed to a normalized embedding.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub dataset: BlobConfig,
    pub projection: ProjectionConfig,
    /// Fixed seed for reproducible runs; `None` draws a fresh one.
    pub seed: Option<u64>,
}

impl VizConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: VizConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dataset.validate()?;
        let (min, max) = (self.projection.target_min, self.projection.target_max);
        if min.is_nan() || max.is_nan() || min >= max {
            return Err(ConfigError::InvalidTargetRange { min, max });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = VizConfig::from_json_str("{}").unwrap();
        assert_eq!(config, VizConfig::default());
        assert_eq!(config.dataset.n_points, 240);
        assert_eq!(config.projection.n_components, 3);
    }

    #[test]
    fn test_partial_override() {
        let config = VizConfig::from_json_str(
            r#"{ "seed": 7, "dataset": { "n_points": 12 }, "projection": { "iterations": 150 } }"#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.dataset.n_points, 12);
        assert_eq!(config.dataset.n_features, 8);
        assert_eq!(config.projection.iterations, 150);
        assert_eq!(config.projection.target_max, 15.0);
    }

    #[test]
    fn test_invalid_range() {
        let err = VizConfig::from_json_str(r#"{ "projection": { "target_min": 1.0, "target_max": 1.0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTargetRange { .. }));
    }

    #[test]
    fn test_invalid_dataset() {
        let err = VizConfig::from_json_str(r#"{ "dataset": { "categories": [] } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Dataset(BlobsError::NoCategories)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(VizConfig::from_json_str("{ nope"), Err(ConfigError::Parse(_))));
    }
}
