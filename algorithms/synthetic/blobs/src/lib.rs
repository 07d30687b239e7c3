use embedviz_helpers::{DataPoint, Float, seeded_rng, stack_features, standard_normal};
use log::debug;
use ndarray::{Array1, Array2, ArrayView2};
use rand::Rng;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Errors that can occur when generating a synthetic dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobsError {
    /// The dataset must contain at least one point
    #[error("point count must be greater than zero")]
    ZeroPoints,
    /// Feature vectors need at least one coordinate
    #[error("dimensionality must be greater than zero")]
    ZeroDimensions,
    /// At least one category name is required
    #[error("at least one category is required")]
    NoCategories,
}

/// Category names used when none are configured.
pub const DEFAULT_CATEGORIES: [&str; 4] = ["animals", "tech", "food", "sports"];

/// Parameters of the clustered Gaussian dataset.
///
/// Category `k` is centered at `(k - midpoint) * center_spacing` on every
/// coordinate, where `midpoint = (categories - 1) / 2`, plus a small jitter of
/// `center_jitter` standard deviations. Each point adds `noise_scale`
/// standard-normal noise per coordinate to its category center.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", default)
)]
#[derive(Debug, Clone, PartialEq)]
pub struct BlobConfig {
    pub n_points: usize,
    pub n_features: usize,
    pub categories: Vec<String>,
    pub center_spacing: f64,
    pub center_jitter: f64,
    pub noise_scale: f64,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            n_points: 240,
            n_features: 8,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            center_spacing: 3.0,
            center_jitter: 0.2,
            noise_scale: 0.9,
        }
    }
}

impl BlobConfig {
    pub fn validate(&self) -> Result<(), BlobsError> {
        if self.n_points == 0 {
            return Err(BlobsError::ZeroPoints);
        }
        if self.n_features == 0 {
            return Err(BlobsError::ZeroDimensions);
        }
        if self.categories.is_empty() {
            return Err(BlobsError::NoCategories);
        }
        Ok(())
    }
}

/// Category of point `i` out of `n` when `n_categories` share the index range
/// in contiguous blocks: `floor(i / n * n_categories)`.
///
/// Integer arithmetic keeps the block boundaries exact.
pub fn category_index(i: usize, n: usize, n_categories: usize) -> usize {
    if n == 0 {
        return 0;
    }
    (i * n_categories) / n
}

/// Number of points falling in each category block. Empty without categories.
pub fn block_sizes(n: usize, n_categories: usize) -> Vec<usize> {
    let mut sizes = vec![0; n_categories];
    if n_categories == 0 {
        return sizes;
    }
    for i in 0..n {
        sizes[category_index(i, n, n_categories)] += 1;
    }
    sizes
}

/// A generated, immutable set of labeled feature vectors.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<F: Float> {
    points: Vec<DataPoint<String, F>>,
    categories: Vec<String>,
    centers: Array2<F>,
}

impl<F: Float> Dataset<F> {
    pub fn points(&self) -> &[DataPoint<String, F>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.centers.ncols()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Category centers, one row per category.
    pub fn centers(&self) -> ArrayView2<'_, F> {
        self.centers.view()
    }

    /// Index of the category block point `i` belongs to.
    pub fn category_of(&self, i: usize) -> usize {
        category_index(i, self.len(), self.categories.len())
    }

    /// Hover label of point `i`, e.g. `tech_75`.
    pub fn display_label(&self, i: usize) -> Option<String> {
        self.points.get(i).map(|p| format!("{}_{}", p.label, i))
    }

    /// The feature vectors as an `N x D` matrix, in point order.
    pub fn to_matrix(&self) -> Array2<F> {
        // Every point is built with `n_features` coordinates.
        stack_features(&self.points).unwrap_or_else(|| Array2::zeros((0, self.n_features())))
    }
}

/// Generates a clustered dataset from `config`, drawing from `rng`.
pub fn generate<F, R>(config: &BlobConfig, rng: &mut R) -> Result<Dataset<F>, BlobsError>
where
    F: Float,
    R: Rng + ?Sized,
{
    config.validate()?;

    let n = config.n_points;
    let d = config.n_features;
    let n_categories = config.categories.len();
    let midpoint = (n_categories as f64 - 1.0) / 2.0;
    let spacing = F::cst(config.center_spacing);
    let jitter = F::cst(config.center_jitter);
    let noise = F::cst(config.noise_scale);

    let centers = Array2::from_shape_fn((n_categories, d), |(k, _)| {
        F::cst(k as f64 - midpoint) * spacing + standard_normal::<F, R>(&mut *rng) * jitter
    });

    let mut points = Vec::with_capacity(n);
    for i in 0..n {
        let c = category_index(i, n, n_categories);
        let offset: Array1<F> = Array1::from_shape_fn(d, |_| standard_normal::<F, R>(&mut *rng) * noise);
        let features = &centers.row(c) + &offset;
        points.push(DataPoint::new(features, config.categories[c].clone()));
    }

    debug!(
        "generated {} points in {} dimensions across {} categories",
        n, d, n_categories
    );

    Ok(Dataset {
        points,
        categories: config.categories.clone(),
        centers,
    })
}

/// Generates a dataset with a reproducible generator seeded from `seed`.
pub fn generate_with_seed<F: Float>(config: &BlobConfig, seed: u64) -> Result<Dataset<F>, BlobsError> {
    let mut rng = seeded_rng(Some(seed));
    generate(config, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn two_cluster_config() -> BlobConfig {
        BlobConfig {
            n_points: 4,
            n_features: 2,
            categories: vec!["left".to_string(), "right".to_string()],
            center_spacing: 6.0,
            center_jitter: 0.0,
            noise_scale: 0.0,
        }
    }

    #[test]
    fn test_default_dataset_shape() {
        let data: Dataset<f64> = generate_with_seed(&BlobConfig::default(), 42).unwrap();
        assert_eq!(data.len(), 240);
        assert_eq!(data.n_features(), 8);
        assert!(data.points().iter().all(|p| p.features.len() == 8));
        assert_eq!(data.to_matrix().dim(), (240, 8));
    }

    #[test]
    fn test_block_sizes_cover_every_index_once() {
        for &(n, c) in &[(240, 4), (10, 3), (7, 7), (5, 8), (1, 4), (241, 4)] {
            let sizes = block_sizes(n, c);
            assert_eq!(sizes.iter().sum::<usize>(), n);
            for (k, &size) in sizes.iter().enumerate() {
                // Block k holds the indices i with k*n <= i*c < (k+1)*n.
                let expected = (0..n).filter(|&i| k * n <= i * c && i * c < (k + 1) * n).count();
                assert_eq!(size, expected, "n={} c={} k={}", n, c, k);
            }
        }
        assert_eq!(block_sizes(240, 4), vec![60, 60, 60, 60]);
        assert!(block_sizes(240, 0).is_empty());
        assert!(block_sizes(0, 0).is_empty());
    }

    #[test]
    fn test_labels_are_contiguous() {
        let data: Dataset<f64> = generate_with_seed(&BlobConfig::default(), 1).unwrap();
        for (i, p) in data.points().iter().enumerate() {
            assert_eq!(p.label, data.categories()[i / 60]);
            assert_eq!(data.category_of(i), i / 60);
        }
    }

    #[test]
    fn test_display_label() {
        let data: Dataset<f32> = generate_with_seed(&BlobConfig::default(), 5).unwrap();
        assert_eq!(data.display_label(0).as_deref(), Some("animals_0"));
        assert_eq!(data.display_label(75).as_deref(), Some("tech_75"));
        assert_eq!(data.display_label(239).as_deref(), Some("sports_239"));
        assert_eq!(data.display_label(240), None);
    }

    #[test]
    fn test_zero_noise_sits_on_centers() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let data: Dataset<f64> = generate(&two_cluster_config(), &mut rng).unwrap();
        let m = data.to_matrix();
        for i in 0..2 {
            assert_abs_diff_eq!(m[[i, 0]], -3.0);
            assert_abs_diff_eq!(m[[i, 1]], -3.0);
        }
        for i in 2..4 {
            assert_abs_diff_eq!(m[[i, 0]], 3.0);
            assert_abs_diff_eq!(m[[i, 1]], 3.0);
        }
    }

    #[test]
    fn test_centers_are_spread_by_category() {
        let data: Dataset<f64> = generate_with_seed(&BlobConfig::default(), 11).unwrap();
        let centers = data.centers();
        for (k, row) in centers.rows().into_iter().enumerate() {
            let expected = (k as f64 - 1.5) * 3.0;
            for &v in row {
                // Jitter is 0.2 standard deviations; five sigma is plenty.
                assert!((v - expected).abs() < 1.0, "center {} coordinate {}", k, v);
            }
        }
    }

    #[test]
    fn test_reproducibility_with_seed() {
        let a: Dataset<f64> = generate_with_seed(&BlobConfig::default(), 42).unwrap();
        let b: Dataset<f64> = generate_with_seed(&BlobConfig::default(), 42).unwrap();
        let c: Dataset<f64> = generate_with_seed(&BlobConfig::default(), 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.to_matrix(), c.to_matrix());
    }

    #[test]
    fn test_errors() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let mut cfg = BlobConfig::default();
        cfg.n_points = 0;
        assert_eq!(generate::<f64, _>(&cfg, &mut rng).unwrap_err(), BlobsError::ZeroPoints);
        let mut cfg = BlobConfig::default();
        cfg.n_features = 0;
        assert_eq!(generate::<f64, _>(&cfg, &mut rng).unwrap_err(), BlobsError::ZeroDimensions);
        let mut cfg = BlobConfig::default();
        cfg.categories.clear();
        assert_eq!(generate::<f64, _>(&cfg, &mut rng).unwrap_err(), BlobsError::NoCategories);
    }
}
