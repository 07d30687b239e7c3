use ndarray::{Array1, Array2};
use crate::Float;
use std::fmt::Debug;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Represents a single feature vector together with its category label.
///
/// L: The type of the label (e.g., String, usize, enum).
/// F: The float type for the features (e.g., f32, f64).
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint<L, F>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    pub features: Array1<F>,
    pub label: L,
}

impl<L, F> DataPoint<L, F>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    pub fn new(features: Array1<F>, label: L) -> Self {
        DataPoint { features, label }
    }

    pub fn dim(&self) -> usize {
        self.features.len()
    }
}

/// Stacks the feature vectors of `points` into an `N x D` matrix.
///
/// Returns `None` when the points do not all share the same dimensionality.
/// An empty slice yields a `0 x 0` matrix.
pub fn stack_features<L, F>(points: &[DataPoint<L, F>]) -> Option<Array2<F>>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    let d = points.first().map_or(0, DataPoint::dim);
    let mut matrix = Array2::zeros((points.len(), d));
    for (mut row, dp) in matrix.rows_mut().into_iter().zip(points) {
        if dp.dim() != d {
            return None;
        }
        row.assign(&dp.features);
    }
    Some(matrix)
}
