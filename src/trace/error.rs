use crate::tolerance::ToleranceError;

/// Errors that can occur while extracting traces
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TraceError {
    /// The requested tolerance was invalid
    #[error(transparent)]
    Tolerance(#[from] ToleranceError),

    /// No MS2 row has a precursor inside the requested window
    #[error("no precursor mass {precursor_mz} found in dataset (tolerance {ppm} ppm)")]
    NoPrecursorMatch {
        /// Requested precursor m/z
        precursor_mz: f64,
        /// Precursor tolerance in ppm
        ppm: f64,
    },

    /// Gaussian smoothing width must be positive
    #[error("invalid smoothing sigma {0}: must be greater than zero")]
    InvalidSigma(f64),
}
