//! # mzXML Reader
//!
//! Streaming parser for mzXML files, the ISB/SPC XML format in which MS2 scans are
//! usually nested inside the MS1 survey scan they were triggered from.
//!
//! ## mzXML Structure
//!
//! ```text
//! mzXML
//! ├── msRun (scanCount)
//! │   ├── parentFile, msInstrument, dataProcessing   (skipped)
//! │   └── scan* (num, msLevel, peaksCount, retentionTime="PT12.3S")
//! │       ├── precursorMz (precursorIntensity, precursorCharge)   text = m/z
//! │       ├── peaks (precision, byteOrder, compressionType, pairOrder)
//! │       │                                        text = base64 m/z-int pairs
//! │       └── scan* (nested MS2 scans)
//! └── index, sha1                                   (skipped)
//! ```
//!
//! Peaks are stored as interleaved `m/z, intensity` pairs in network byte order
//! unless `byteOrder` says otherwise.

mod duration;
mod error;
mod streamer;

#[cfg(test)]
mod tests;

pub use duration::parse_duration;
pub use error::MzXMLError;
pub use streamer::{MzXMLStreamer, ScanIterator};
