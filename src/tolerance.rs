//! Parts-per-million mass tolerance windows.
//!
//! All tolerance matching in the crate goes through [`MassWindow`]: a target mass and
//! a ppm tolerance give an inclusive `[low, high]` interval symmetric around the target.

use serde::{Deserialize, Serialize};

/// One million, the ppm scale factor
const PPM_SCALE: f64 = 1e6;

/// Errors raised when building a tolerance window
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ToleranceError {
    /// The ppm tolerance is negative or not a number
    #[error("invalid ppm tolerance {0}: must be a non-negative number")]
    Negative(f64),
}

/// Inclusive mass interval derived from a target mass and a ppm tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassWindow {
    /// Lower bound (inclusive)
    pub low: f64,
    /// Upper bound (inclusive)
    pub high: f64,
}

impl MassWindow {
    /// Compute the window `mass ∓ mass * ppm / 1e6`.
    ///
    /// # Errors
    /// Returns [`ToleranceError::Negative`] when `ppm` is negative or NaN.
    ///
    /// # Example
    /// ```
    /// use mzxtract::tolerance::MassWindow;
    ///
    /// let window = MassWindow::new(500.0, 10.0)?;
    /// assert!((window.low - 499.995).abs() < 1e-9);
    /// assert!((window.high - 500.005).abs() < 1e-9);
    /// # Ok::<(), mzxtract::tolerance::ToleranceError>(())
    /// ```
    pub fn new(mass: f64, ppm: f64) -> Result<Self, ToleranceError> {
        // Written so that NaN fails as well
        if !(ppm >= 0.0) {
            return Err(ToleranceError::Negative(ppm));
        }
        let delta = mass * ppm / PPM_SCALE;
        Ok(Self {
            low: mass - delta,
            high: mass + delta,
        })
    }

    /// Whether `candidate` lies inside the window (both ends inclusive)
    #[inline]
    pub fn contains(&self, candidate: f64) -> bool {
        in_window(candidate, self.low, self.high)
    }

    /// Width of the window in mass units
    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// Shorthand for [`MassWindow::new`] returning the bounds as a tuple.
pub fn window(mass: f64, ppm: f64) -> Result<(f64, f64), ToleranceError> {
    let w = MassWindow::new(mass, ppm)?;
    Ok((w.low, w.high))
}

/// Signed mass error in ppm, positive when `reference` is above `observed`.
///
/// `((reference - observed) / reference) * 1e6`
#[inline]
pub fn ppm_error(observed: f64, reference: f64) -> f64 {
    (reference - observed) / reference * PPM_SCALE
}

/// Inclusive range test `low <= candidate <= high`
#[inline]
pub fn in_window(candidate: f64, low: f64, high: f64) -> bool {
    low <= candidate && candidate <= high
}
