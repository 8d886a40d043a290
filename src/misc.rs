// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Miscellaneous things.

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};

/// Make the pseudo-random number generator that is threaded through every
/// sampling call. With a seed, the results are reproducible; without one, the
/// generator is seeded from the operating system's entropy.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Draw a Poisson-distributed count with mean `lambda`. Non-positive (or
/// non-finite) means always yield 0.
pub(crate) fn poisson_count<R: Rng + ?Sized>(lambda: f64, rng: &mut R) -> usize {
    if !(lambda.is_finite() && lambda > 0.0) {
        return 0;
    }
    match Poisson::new(lambda) {
        Ok(dist) => {
            let count: f64 = dist.sample(rng);
            count as usize
        }
        // Only reachable for absurdly large means; fall back to the mean.
        Err(_) => lambda.round() as usize,
    }
}

/// Linearly interpolate `y(x)` at `x_new`. `x` must be increasing. Values
/// outside of the range of `x` are 0.
pub(crate) fn interpolate_zero_outside(x: &[f64], y: &[f64], x_new: f64) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    if x.is_empty() || x_new < x[0] || x_new > x[x.len() - 1] {
        return 0.0;
    }
    let i = x.partition_point(|&v| v <= x_new);
    if i == 0 {
        return y[0];
    }
    if i == x.len() {
        return y[x.len() - 1];
    }
    let (x0, x1) = (x[i - 1], x[i]);
    let (y0, y1) = (y[i - 1], y[i]);
    if x1 == x0 {
        return y0;
    }
    y0 + (y1 - y0) * (x_new - x0) / (x1 - x0)
}
