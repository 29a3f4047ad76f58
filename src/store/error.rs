/// Errors that can occur while building a [`ScanStore`](super::ScanStore)
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A scan record is missing a required field or has inconsistent arrays
    #[error("malformed scan at index {index}: {reason}")]
    MalformedScan {
        /// Stream position of the offending scan
        index: usize,
        /// What was wrong with it
        reason: MalformedReason,
    },

    /// The scan source failed while streaming
    #[error("scan source error: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Why a scan record was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReason {
    /// A required field is absent
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// m/z and intensity arrays differ in length
    #[error("m/z array has {mz_len} values but intensity array has {intensity_len}")]
    ArrayLengthMismatch {
        /// Length of the m/z array
        mz_len: usize,
        /// Length of the intensity array
        intensity_len: usize,
    },
}

impl StoreError {
    pub(super) fn missing(index: usize, field: &'static str) -> Self {
        Self::MalformedScan {
            index,
            reason: MalformedReason::MissingField(field),
        }
    }
}
