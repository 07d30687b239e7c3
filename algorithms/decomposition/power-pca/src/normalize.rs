use embedviz_helpers::Float;
use log::warn;
use ndarray::{Array2, ArrayView2};
use ndarray_stats::QuantileExt;

/// Observed extent of one projected axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange<F: Float> {
    pub min: F,
    pub max: F,
}

impl<F: Float> AxisRange<F> {
    /// Width of the range; a zero width counts as 1 so it can be divided by.
    pub fn span(&self) -> F {
        let span = self.max - self.min;
        if span == F::zero() { F::one() } else { span }
    }
}

/// Global min and max of every column of `projection`.
pub fn axis_ranges<F: Float>(projection: ArrayView2<F>) -> Vec<AxisRange<F>> {
    projection
        .columns()
        .into_iter()
        .enumerate()
        .map(|(axis, column)| match (column.min(), column.max()) {
            (Ok(&min), Ok(&max)) => AxisRange { min, max },
            (Err(e), _) | (_, Err(e)) => {
                warn!("axis {} has no usable range ({}), collapsing it", axis, e);
                AxisRange { min: F::zero(), max: F::zero() }
            }
        })
        .collect()
}

/// Maps every column independently onto `[lo, hi]`.
///
/// The column minimum lands on `lo` and the maximum on `hi`. A column whose
/// values are all equal maps entirely to `lo`.
pub fn normalize_axes<F: Float>(projection: ArrayView2<F>, lo: F, hi: F) -> Array2<F> {
    let ranges = axis_ranges(projection);
    let mut out = projection.to_owned();
    for (mut column, range) in out.columns_mut().into_iter().zip(&ranges) {
        let span = range.span();
        column.mapv_inplace(|x| lo + (x - range.min) / span * (hi - lo));
    }
    out
}
