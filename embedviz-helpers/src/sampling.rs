use ndarray::Array1;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::f64::consts::PI;

use crate::Float;

/// Draws one standard-normal sample with the Box–Muller transform.
///
/// Both uniform draws are re-drawn while they are exactly zero so the
/// logarithm is always finite.
pub fn standard_normal<F: Float, R: Rng + ?Sized>(rng: &mut R) -> F {
    let mut u = 0.0_f64;
    while u == 0.0 {
        u = rng.random::<f64>();
    }
    let mut v = 0.0_f64;
    while v == 0.0 {
        v = rng.random::<f64>();
    }
    F::cst((-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos())
}

/// A vector of `len` values drawn uniformly from `[-0.5, 0.5)`.
pub fn uniform_vector<F: Float, R: Rng + ?Sized>(rng: &mut R, len: usize) -> Array1<F> {
    Array1::from_shape_fn(len, |_| F::cst(rng.random::<f64>() - 0.5))
}

/// Builds the generator used across the workspace.
///
/// A fixed seed gives reproducible datasets and projections; `None` seeds
/// from the thread-local generator so every run differs.
pub fn seeded_rng(seed: Option<u64>) -> Xoshiro256PlusPlus {
    match seed {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_rng(&mut rand::rng()),
    }
}
