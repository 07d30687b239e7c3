use ndarray::{NdFloat, ScalarOperand};

use num_traits::{AsPrimitive, FromPrimitive, Signed};
use rand::distr::uniform::SampleUniform;

use std::iter::Sum;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

// Include submodules
mod common;
mod sampling;

// Re-export types from submodules
pub use common::{stack_features, DataPoint};
pub use sampling::{seeded_rng, standard_normal, uniform_vector};

pub trait Float:
    NdFloat
    + FromPrimitive
    + Default
    + Signed
    + Sum
    + AsPrimitive<usize>
    + for<'a> AddAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> DivAssign<&'a Self>
    + num_traits::MulAdd<Output = Self>
    + SampleUniform
    + ScalarOperand
    + std::marker::Unpin
{
    /// Converts an `f64` constant into this float type.
    fn cst(x: f64) -> Self;

    /// Converts a count (number of points, dimensions, ...) into this float type.
    fn from_count(n: usize) -> Self {
        Self::cst(n as f64)
    }
}

impl Float for f32 {
    fn cst(x: f64) -> Self {
        x as f32
    }
}

impl Float for f64 {
    fn cst(x: f64) -> Self {
        x
    }
}
