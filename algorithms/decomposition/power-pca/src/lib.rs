use embedviz_helpers::{Float, seeded_rng, uniform_vector};
use log::debug;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

mod normalize;

pub use normalize::{AxisRange, axis_ranges, normalize_axes};

/// Errors that can occur while fitting the projector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PcaError {
    #[error("cannot fit on an empty dataset")]
    EmptyDataSet,
    #[error("at least one component is required")]
    ZeroComponents,
    #[error("iteration count must be greater than zero")]
    ZeroIterations,
    #[error("requested {requested} components but the data has {available} dimensions")]
    TooManyComponents { requested: usize, available: usize },
    #[error("expected {expected} initial vectors, got {got}")]
    InitCount { expected: usize, got: usize },
    #[error("vector has {got} coordinates, expected {expected}")]
    MismatchedDimensions { expected: usize, got: usize },
}

/// An approximate eigenvector of unit length and its Rayleigh-quotient eigenvalue.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Eigenpair<F: Float> {
    pub vector: Array1<F>,
    pub value: F,
}

/// Subtracts the per-coordinate mean from every row.
///
/// Returns the centered matrix and the mean that was removed.
pub fn center<F: Float>(data: ArrayView2<F>) -> (Array2<F>, Array1<F>) {
    let mean = data
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(data.ncols()));
    let centered = &data - &mean;
    (centered, mean)
}

/// Sample covariance `YᵗY / (n - 1)` of an already centered matrix.
///
/// Only the upper triangle is accumulated; the lower triangle is mirrored so
/// the result is exactly symmetric. A single row divides by 1.
pub fn covariance<F: Float>(centered: ArrayView2<F>) -> Array2<F> {
    let (n, d) = centered.dim();
    let mut c = Array2::<F>::zeros((d, d));
    for row in centered.rows() {
        for a in 0..d {
            for b in a..d {
                c[[a, b]] += row[a] * row[b];
            }
        }
    }
    let divisor = if n > 1 { F::from_count(n - 1) } else { F::one() };
    for a in 0..d {
        for b in a..d {
            c[[a, b]] /= divisor;
            c[[b, a]] = c[[a, b]];
        }
    }
    c
}

/// `vᵗMv / vᵗv`, with a zero-length `v` treated as unit length.
pub fn rayleigh_quotient<F: Float>(matrix: ArrayView2<F>, v: ArrayView1<F>) -> F {
    let vv = v.dot(&v);
    let denom = if vv == F::zero() { F::one() } else { vv };
    v.dot(&matrix.dot(&v)) / denom
}

/// Runs `iterations` steps of `v ← Mv / ‖Mv‖` starting from `init`.
///
/// A zero-norm product is divided by 1 instead of 0. Convergence is not
/// checked; the residual `‖Mv − λv‖` is only logged.
pub fn power_iteration<F: Float>(
    matrix: ArrayView2<F>,
    init: Array1<F>,
    iterations: usize,
) -> Eigenpair<F> {
    let mut v = init;
    for _ in 0..iterations {
        let mv = matrix.dot(&v);
        let norm = mv.dot(&mv).sqrt();
        let norm = if norm == F::zero() { F::one() } else { norm };
        v = mv / norm;
    }
    let value = rayleigh_quotient(matrix, v.view());

    let residual = &matrix.dot(&v) - &(&v * value);
    debug!(
        "power iteration: eigenvalue {:?}, residual {:?}",
        value,
        residual.dot(&residual).sqrt()
    );

    Eigenpair { vector: v, value }
}

/// Removes the rank-1 contribution `λvvᵗ` of `pair` from `matrix`.
///
/// Symmetric input stays exactly symmetric.
pub fn deflate<F: Float>(matrix: &mut Array2<F>, pair: &Eigenpair<F>) {
    let v = &pair.vector;
    let d = v.len();
    for a in 0..d {
        for b in a..d {
            let s = pair.value * v[a] * v[b];
            matrix[[a, b]] -= s;
            if a != b {
                matrix[[b, a]] -= s;
            }
        }
    }
}

/// Principal-axis projector based on power iteration with deflation.
///
/// Components are extracted greedily in decreasing-eigenvalue order. There is
/// no re-orthogonalization against earlier components: with near-degenerate
/// eigenvalues or incomplete convergence the components are only
/// approximately orthogonal.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerPca {
    pub n_components: usize,
    pub iterations: usize,
}

impl Default for PowerPca {
    fn default() -> Self {
        Self { n_components: 3, iterations: 200 }
    }
}

impl PowerPca {
    pub fn new(n_components: usize, iterations: usize) -> Self {
        Self { n_components, iterations }
    }

    /// Fits the projector, drawing each initial vector uniformly from `[-0.5, 0.5)`.
    pub fn fit<F, R>(&self, data: ArrayView2<F>, rng: &mut R) -> Result<PcaModel<F>, PcaError>
    where
        F: Float,
        R: Rng + ?Sized,
    {
        let inits: Vec<Array1<F>> = (0..self.n_components)
            .map(|_| uniform_vector(&mut *rng, data.ncols()))
            .collect();
        self.fit_with_init(data, &inits)
    }

    /// Fits the projector with a reproducible generator seeded from `seed`.
    pub fn fit_with_seed<F: Float>(&self, data: ArrayView2<F>, seed: u64) -> Result<PcaModel<F>, PcaError> {
        let mut rng = seeded_rng(Some(seed));
        self.fit(data, &mut rng)
    }

    /// Fits the projector from explicit initial vectors, one per component.
    ///
    /// The result is a pure function of `data` and `inits`.
    pub fn fit_with_init<F: Float>(
        &self,
        data: ArrayView2<F>,
        inits: &[Array1<F>],
    ) -> Result<PcaModel<F>, PcaError> {
        let (n, d) = data.dim();
        if n == 0 || d == 0 {
            return Err(PcaError::EmptyDataSet);
        }
        if self.n_components == 0 {
            return Err(PcaError::ZeroComponents);
        }
        if self.iterations == 0 {
            return Err(PcaError::ZeroIterations);
        }
        if self.n_components > d {
            return Err(PcaError::TooManyComponents { requested: self.n_components, available: d });
        }
        if inits.len() != self.n_components {
            return Err(PcaError::InitCount { expected: self.n_components, got: inits.len() });
        }
        if let Some(bad) = inits.iter().find(|v| v.len() != d) {
            return Err(PcaError::MismatchedDimensions { expected: d, got: bad.len() });
        }

        let (centered, mean) = center(data);
        let cov = covariance(centered.view());
        let total_variance = cov.diag().sum();

        let mut deflated = cov;
        let mut components = Vec::with_capacity(self.n_components);
        for init in inits {
            let pair = power_iteration(deflated.view(), init.clone(), self.iterations);
            deflate(&mut deflated, &pair);
            components.push(pair);
        }
        debug!(
            "extracted eigenvalues {:?} (total variance {:?})",
            components.iter().map(|c| c.value).collect::<Vec<_>>(),
            total_variance
        );

        let mut model = PcaModel {
            mean,
            components,
            projection: Array2::zeros((0, 0)),
            total_variance,
        };
        model.projection = model.project_centered(centered.view());
        Ok(model)
    }
}

/// A fitted projector together with the projection of its training data.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct PcaModel<F: Float> {
    mean: Array1<F>,
    components: Vec<Eigenpair<F>>,
    projection: Array2<F>,
    total_variance: F,
}

impl<F: Float> PcaModel<F> {
    pub fn components(&self) -> &[Eigenpair<F>] {
        &self.components
    }

    pub fn mean(&self) -> ArrayView1<'_, F> {
        self.mean.view()
    }

    /// Projection of the training rows, `N x n_components`, in input order.
    pub fn projection(&self) -> ArrayView2<'_, F> {
        self.projection.view()
    }

    /// Components stacked as rows, `n_components x D`.
    pub fn component_matrix(&self) -> Array2<F> {
        let d = self.mean.len();
        let mut w = Array2::zeros((self.components.len(), d));
        for (mut row, pair) in w.rows_mut().into_iter().zip(&self.components) {
            row.assign(&pair.vector);
        }
        w
    }

    /// Projects new rows using the training mean and components.
    pub fn transform(&self, data: ArrayView2<F>) -> Result<Array2<F>, PcaError> {
        if data.ncols() != self.mean.len() {
            return Err(PcaError::MismatchedDimensions { expected: self.mean.len(), got: data.ncols() });
        }
        let centered = &data - &self.mean;
        Ok(self.project_centered(centered.view()))
    }

    /// Share of the total variance carried by each component's eigenvalue.
    pub fn explained_variance_ratio(&self) -> Vec<F> {
        let total = if self.total_variance == F::zero() { F::one() } else { self.total_variance };
        self.components.iter().map(|c| c.value / total).collect()
    }

    fn project_centered(&self, centered: ArrayView2<F>) -> Array2<F> {
        centered.dot(&self.component_matrix().t())
    }
}
