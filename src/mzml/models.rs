//! Data models for parsed mzML spectra

use crate::scan::{PrecursorEntry, RawScan};

/// A spectrum read from an mzML file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MzMLSpectrum {
    /// Spectrum index (0-based)
    pub index: i64,

    /// Native spectrum ID from the file
    pub id: String,

    /// Default array length (number of peaks)
    pub default_array_length: usize,

    /// MS level, if declared
    pub ms_level: Option<u8>,

    /// Retention time in seconds
    pub retention_time: Option<f64>,

    /// Precursor information (for MS2+ spectra)
    pub precursors: Vec<Precursor>,

    /// m/z array, `None` when the spectrum has no m/z binary array
    pub mz_array: Option<Vec<f64>>,

    /// Intensity array, `None` when the spectrum has no intensity binary array
    pub intensity_array: Option<Vec<f64>>,
}

impl MzMLSpectrum {
    /// Extract the native scan number from the spectrum ID
    pub fn scan_number(&self) -> Option<i64> {
        // "scan=12345", "controllerType=0 controllerNumber=1 scan=12345", "S12345"
        if let Some(pos) = self.id.find("scan=") {
            let start = pos + 5;
            let end = self.id[start..]
                .find(|c: char| !c.is_ascii_digit())
                .map(|i| start + i)
                .unwrap_or(self.id.len());
            self.id[start..end].parse().ok()
        } else if let Some(rest) = self.id.strip_prefix('S') {
            rest.parse().ok()
        } else {
            Some(self.index + 1)
        }
    }
}

/// Precursor of an MS2 spectrum
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Precursor {
    /// Isolation window target m/z
    pub isolation_window_target: Option<f64>,

    /// Selected ion m/z
    pub selected_ion_mz: Option<f64>,

    /// Selected ion intensity
    pub selected_ion_intensity: Option<f64>,

    /// Selected ion charge state
    pub selected_ion_charge: Option<i16>,
}

impl Precursor {
    /// Selected ion m/z, falling back to the isolation window target
    pub fn mz(&self) -> Option<f64> {
        self.selected_ion_mz.or(self.isolation_window_target)
    }
}

impl From<MzMLSpectrum> for RawScan {
    fn from(spectrum: MzMLSpectrum) -> Self {
        let scan_number = spectrum.scan_number();
        let precursors = spectrum
            .precursors
            .iter()
            .filter_map(|p| {
                p.mz().map(|mz| PrecursorEntry {
                    mz,
                    charge: p.selected_ion_charge,
                    intensity: p.selected_ion_intensity,
                })
            })
            .collect();

        RawScan {
            scan_number,
            // Level 0 is skipped and counted by ingest like any unsupported level
            ms_level: spectrum.ms_level.unwrap_or(0),
            retention_time: spectrum.retention_time,
            mz_array: spectrum.mz_array,
            intensity_array: spectrum.intensity_array,
            precursors,
        }
    }
}
