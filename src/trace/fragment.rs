//! Fragment-ion traces over every scan of the stream.

use log::debug;
use serde::{Deserialize, Serialize};

use super::{rounded_key, Trace};
use crate::store::ScanStore;

/// How MS2 peak lists are read before matching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectrumMode {
    /// Use the peak arrays as recorded
    #[default]
    Profile,
    /// Reduce each spectrum to its local maxima first
    Centroid,
}

/// Result of [`extract_fragment`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentTrace {
    /// One point per scan of the stream, MS1 scans included
    pub trace: Trace,
    /// Number of MS2 scans in the stream
    pub ms2_scan_count: usize,
}

/// Reduce a profile spectrum to its strict local maxima.
///
/// A point is kept when its intensity is greater than both neighbours; the first and
/// last points are never kept.
pub fn centroid(mz: &[f64], intensity: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = mz.len().min(intensity.len());
    let mut out_mz = Vec::new();
    let mut out_intensity = Vec::new();
    for i in 1..n.saturating_sub(1) {
        if intensity[i] > intensity[i - 1] && intensity[i] > intensity[i + 1] {
            out_mz.push(mz[i]);
            out_intensity.push(intensity[i]);
        }
    }
    (out_mz, out_intensity)
}

/// Track a fragment mass across all MS2 scans.
///
/// The output has one point per scan of the stream (MS1 and skipped scans stay at
/// `0.0`). An MS2 scan with more than one peak contributes the intensity of the peak
/// whose rounded m/z equals the rounded `fragment_mass` (maximum on ties). Rows of a
/// multiplexed scan are visited once.
pub fn extract_fragment(
    store: &ScanStore,
    fragment_mass: f64,
    decimal_places: u32,
    mode: SpectrumMode,
) -> FragmentTrace {
    let target = rounded_key(fragment_mass, decimal_places);
    let times = store.scan_times();
    let mut intensities = vec![0.0; times.len()];

    let mut last_scan = None;
    for row in store.ms2() {
        if last_scan == Some(row.scan_index) {
            continue;
        }
        last_scan = Some(row.scan_index);

        let centroided;
        let (mz, intensity) = match mode {
            SpectrumMode::Profile => (&row.mz_array[..], &row.intensity_array[..]),
            SpectrumMode::Centroid => {
                centroided = centroid(&row.mz_array, &row.intensity_array);
                (&centroided.0[..], &centroided.1[..])
            }
        };
        if mz.len() <= 1 {
            continue;
        }

        let hit = mz
            .iter()
            .zip(intensity)
            .filter(|(m, _)| target.is_some() && rounded_key(**m, decimal_places) == target)
            .map(|(_, i)| *i)
            .fold(None, |acc: Option<f64>, i| Some(acc.map_or(i, |a| a.max(i))));
        if let Some(value) = hit {
            intensities[row.scan_index] = value;
        }
    }

    let ms2_scan_count = store.stats().ms2_scans;
    debug!("fragment {fragment_mass} searched in {ms2_scan_count} MS2 scans");

    FragmentTrace {
        trace: Trace { times, intensities },
        ms2_scan_count,
    }
}
