//! Scan records as produced by the mzXML / mzML readers.
//!
//! A [`RawScan`] is the transient, reader-agnostic form of a single scan. Fields the
//! ingester requires are kept optional here so that a reader can hand over whatever
//! it found and let [`ScanStore`](crate::store::ScanStore) decide whether the record
//! is well formed.

use serde::{Deserialize, Serialize};

/// One precursor descriptor of an MS2 scan.
///
/// Multiplexed scans carry several of these; each one becomes its own row of the
/// MS2 table.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PrecursorEntry {
    /// Precursor m/z
    pub mz: f64,
    /// Precursor charge state, if the source reports one
    pub charge: Option<i16>,
    /// Precursor intensity, if the source reports one
    pub intensity: Option<f64>,
}

impl PrecursorEntry {
    /// Create a precursor entry without charge or intensity
    pub fn new(mz: f64) -> Self {
        Self {
            mz,
            charge: None,
            intensity: None,
        }
    }

    /// Set the charge state
    pub fn with_charge(mut self, charge: i16) -> Self {
        self.charge = Some(charge);
        self
    }

    /// Set the precursor intensity
    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = Some(intensity);
        self
    }
}

/// A single scan record from the source stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawScan {
    /// Native scan number, if known
    pub scan_number: Option<i64>,
    /// MS level (only 1 and 2 are ingested)
    pub ms_level: u8,
    /// Retention time in seconds
    pub retention_time: Option<f64>,
    /// Observed m/z values
    pub mz_array: Option<Vec<f64>>,
    /// Observed intensities, parallel to `mz_array`
    pub intensity_array: Option<Vec<f64>>,
    /// Precursor descriptors (MS2 only)
    pub precursors: Vec<PrecursorEntry>,
}

impl RawScan {
    /// Build a complete MS1 scan
    pub fn ms1(retention_time: f64, mz: Vec<f64>, intensity: Vec<f64>) -> Self {
        Self {
            scan_number: None,
            ms_level: 1,
            retention_time: Some(retention_time),
            mz_array: Some(mz),
            intensity_array: Some(intensity),
            precursors: Vec::new(),
        }
    }

    /// Build a complete MS2 scan with the given precursor descriptors
    pub fn ms2(
        retention_time: f64,
        precursors: Vec<PrecursorEntry>,
        mz: Vec<f64>,
        intensity: Vec<f64>,
    ) -> Self {
        Self {
            scan_number: None,
            ms_level: 2,
            retention_time: Some(retention_time),
            mz_array: Some(mz),
            intensity_array: Some(intensity),
            precursors,
        }
    }

    /// Set the native scan number
    pub fn with_scan_number(mut self, scan_number: i64) -> Self {
        self.scan_number = Some(scan_number);
        self
    }

    /// Number of peaks, or 0 when the m/z array is missing
    pub fn peak_count(&self) -> usize {
        self.mz_array.as_ref().map_or(0, Vec::len)
    }
}
