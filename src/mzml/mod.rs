//! # mzML Reader
//!
//! Streaming parser for the spectrum list of mzML files, the XML-based community
//! standard for mass spectrometry data defined by HUPO-PSI.
//!
//! ## mzML Structure
//!
//! ```text
//! indexedmzML (optional wrapper)
//! └── mzML
//!     ├── cvList, fileDescription, softwareList, ...   (skipped)
//!     └── run
//!         └── spectrumList
//!             └── spectrum* (many)
//!                 ├── cvParam*            (ms level)
//!                 ├── scanList            (scan start time)
//!                 ├── precursorList       (selected ion m/z, charge, intensity)
//!                 └── binaryDataArrayList
//!                     └── binaryDataArray*
//!                         ├── cvParam*    (precision, compression, array kind)
//!                         └── binary      (base64 data)
//! ```

mod cv_params;
mod models;
mod streamer;

#[cfg(test)]
mod tests;

pub use cv_params::{normalize_retention_time, CvParam, MS_CV_ACCESSIONS};
pub use models::{MzMLSpectrum, Precursor};
pub use streamer::{MzMLError, MzMLStreamer, SpectrumIterator};
