//! Gaussian smoothing of traces.

use super::{Trace, TraceError};

/// Kernel radius in multiples of sigma
const TRUNCATE: f64 = 4.0;

/// Kernels spanning more reflection periods than this are treated as flat
const MAX_FOLDS: f64 = 1024.0;

impl Trace {
    /// Gaussian-smoothed copy of this trace.
    ///
    /// The kernel extends `round(4 * sigma)` points on each side and is normalised to
    /// sum to one. Samples past either end are mirrored about the edge
    /// (`d c b a | a b c d | d c b a`), so a constant trace stays constant. Times are
    /// left untouched.
    ///
    /// Mirroring repeats the trace with period `2n`, so a kernel wider than that is
    /// folded onto one period first. Very wide kernels become flat and every point
    /// tends to the trace mean.
    ///
    /// # Errors
    /// Returns [`TraceError::InvalidSigma`] when `sigma` is not strictly positive.
    pub fn smoothed(&self, sigma: f64) -> Result<Trace, TraceError> {
        if !(sigma > 0.0) || !sigma.is_finite() {
            return Err(TraceError::InvalidSigma(sigma));
        }

        let n = self.intensities.len();
        let period = 2 * n;
        let radius = (TRUNCATE * sigma + 0.5).floor();
        // Offsets are relative to `i - origin`
        let (kernel, origin) = if radius < period as f64 {
            let radius = radius as isize;
            (gaussian_kernel(sigma, radius), radius)
        } else {
            (folded_kernel(sigma, radius, period), 0)
        };

        let intensities = (0..n as isize)
            .map(|i| {
                kernel
                    .iter()
                    .enumerate()
                    .map(|(k, w)| w * self.intensities[reflect(i + k as isize - origin, n)])
                    .sum::<f64>()
            })
            .collect();

        Ok(Trace {
            times: self.times.clone(),
            intensities,
        })
    }
}

fn gaussian_weight(x: f64, sigma: f64) -> f64 {
    (-0.5 * x * x / (sigma * sigma)).exp()
}

fn normalise(weights: Vec<f64>) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

fn gaussian_kernel(sigma: f64, radius: isize) -> Vec<f64> {
    normalise(
        (-radius..=radius)
            .map(|x| gaussian_weight(x as f64, sigma))
            .collect(),
    )
}

/// Kernel of `radius >= period` wrapped onto offsets `0..period`
fn folded_kernel(sigma: f64, radius: f64, period: usize) -> Vec<f64> {
    if period == 0 {
        return Vec::new();
    }
    if radius > MAX_FOLDS * period as f64 {
        return vec![1.0 / period as f64; period];
    }

    let radius = radius as i64;
    let period = period as i64;
    let mut weights = vec![0.0; period as usize];
    for x in -radius..=radius {
        weights[x.rem_euclid(period) as usize] += gaussian_weight(x as f64, sigma);
    }
    normalise(weights)
}

/// Map an out-of-range index back into `0..n` by half-sample reflection
fn reflect(index: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let folded = index.rem_euclid(period);
    if folded < n {
        folded as usize
    } else {
        (period - 1 - folded) as usize
    }
}
