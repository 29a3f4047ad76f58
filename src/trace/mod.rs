//! # Trace Extraction
//!
//! Builds intensity-versus-time traces (pseudo extracted-ion chromatograms) by querying
//! the [`ScanStore`](crate::store::ScanStore) tables with ppm windows or rounded masses.
//!
//! | Operation | Table | Matching | Output length |
//! |-----------|-------|----------|---------------|
//! | [`extract_single`] | MS1 | ppm window, max intensity | MS1 rows |
//! | [`extract_multi`] | MS1 | rounded equality, any target | MS1 rows |
//! | [`extract_prm`] | MS2 | precursor window, then transition windows | matching MS2 rows |
//! | [`extract_fragment`] | MS2 | rounded equality | every scan of the stream |
//! | [`base_peak`] / [`total_ion_current`] | MS1 | none | MS1 rows |
//!
//! Every call is a fresh, deterministic computation over the read-only tables.

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::store::Ms1Row;
use crate::tolerance::MassWindow;

pub use error::TraceError;
pub use fragment::{centroid, extract_fragment, FragmentTrace, SpectrumMode};
pub use prm::{extract_prm, PaddedBlock, PrmTrace};

mod error;
mod fragment;
mod prm;
mod smoothing;


/// Parallel time / intensity arrays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Retention times in seconds
    pub times: Vec<f64>,
    /// Intensity at each time point
    pub intensities: Vec<f64>,
}

impl Trace {
    /// Create an empty trace with room for `capacity` points
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            times: Vec::with_capacity(capacity),
            intensities: Vec::with_capacity(capacity),
        }
    }

    /// Append one point
    #[inline]
    pub fn push(&mut self, time: f64, intensity: f64) {
        self.times.push(time);
        self.intensities.push(intensity);
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the trace has no points
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Iterate over `(time, intensity)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.intensities.iter().copied())
    }

    /// Point with the highest intensity (first one on ties)
    pub fn apex(&self) -> Option<(f64, f64)> {
        self.iter()
            .fold(None, |best: Option<(f64, f64)>, point| match best {
                Some(b) if b.1 >= point.1 => Some(b),
                _ => Some(point),
            })
    }
}

/// Maximum intensity of the peaks inside `window`, if any
#[inline]
pub(crate) fn max_in_window(mz: &[f64], intensity: &[f64], window: &MassWindow) -> Option<f64> {
    mz.iter()
        .zip(intensity)
        .filter(|(m, _)| window.contains(**m))
        .map(|(_, i)| *i)
        .fold(None, |acc: Option<f64>, i| Some(acc.map_or(i, |a| a.max(i))))
}

/// Largest magnitude (2^63) that still fits an `i64` key after scaling
const KEY_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Integer key of a mass rounded to `decimal_places` (half to even, like numpy).
///
/// `None` when the scaled mass is not finite or does not fit an `i64`; such a mass
/// matches nothing.
#[inline]
pub(crate) fn rounded_key(mass: f64, decimal_places: u32) -> Option<i64> {
    let scale = 10f64.powi(i32::try_from(decimal_places).ok()?);
    let scaled = (mass * scale).round_ties_even();
    (scaled.is_finite() && scaled.abs() < KEY_LIMIT).then_some(scaled as i64)
}

/// Pseudo-EIC of a single target mass over the MS1 table.
///
/// Each MS1 row contributes one point: the maximum intensity among peaks inside the
/// `ppm` window around `target_mass`, or `0.0` when none match.
///
/// # Errors
/// Returns [`TraceError::Tolerance`] when `ppm` is negative.
///
/// # Example
/// ```
/// use mzxtract::scan::RawScan;
/// use mzxtract::store::ScanStore;
/// use mzxtract::trace::extract_single;
///
/// let store = ScanStore::ingest(vec![
///     RawScan::ms1(1.0, vec![499.0], vec![5.0]),
///     RawScan::ms1(2.0, vec![500.001], vec![1000.0]),
/// ])?;
/// let trace = extract_single(store.ms1(), 500.0, 10.0)?;
/// assert_eq!(trace.intensities, vec![0.0, 1000.0]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn extract_single(ms1: &[Ms1Row], target_mass: f64, ppm: f64) -> Result<Trace, TraceError> {
    let window = MassWindow::new(target_mass, ppm)?;
    debug!(
        "extracting {target_mass} over {} MS1 scans, window [{}, {}]",
        ms1.len(),
        window.low,
        window.high
    );

    let mut trace = Trace::with_capacity(ms1.len());
    for row in ms1 {
        let intensity = max_in_window(&row.mz_array, &row.intensity_array, &window).unwrap_or(0.0);
        trace.push(row.time, intensity);
    }
    Ok(trace)
}

/// [`extract_single`] for several targets, one trace per target in input order.
///
/// With the `parallel` feature the targets are processed on the rayon thread pool.
pub fn extract_many(ms1: &[Ms1Row], targets: &[f64], ppm: f64) -> Result<Vec<Trace>, TraceError> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        targets
            .par_iter()
            .map(|&target| extract_single(ms1, target, ppm))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        targets
            .iter()
            .map(|&target| extract_single(ms1, target, ppm))
            .collect()
    }
}

/// Pseudo-EIC of several masses at once using rounded equality.
///
/// Observed masses and targets are rounded to `decimal_places` before comparison, so
/// each peak costs a single hash lookup instead of one window test per target. The
/// point at each MS1 row is the maximum intensity among peaks whose rounded mass
/// equals any rounded target, or `0.0`. Masses too large to round at that precision
/// match nothing.
pub fn extract_multi(ms1: &[Ms1Row], targets: &[f64], decimal_places: u32) -> Trace {
    let keys: HashSet<i64> = targets
        .iter()
        .filter_map(|&t| rounded_key(t, decimal_places))
        .collect();

    let mut trace = Trace::with_capacity(ms1.len());
    for row in ms1 {
        let intensity = row
            .mz_array
            .iter()
            .zip(&row.intensity_array)
            .filter(|(m, _)| rounded_key(**m, decimal_places).is_some_and(|k| keys.contains(&k)))
            .map(|(_, i)| *i)
            .fold(None, |acc: Option<f64>, i| Some(acc.map_or(i, |a| a.max(i))))
            .unwrap_or(0.0);
        trace.push(row.time, intensity);
    }
    trace
}

/// Base peak chromatogram: the most intense peak of every MS1 scan
pub fn base_peak(ms1: &[Ms1Row]) -> Trace {
    let mut trace = Trace::with_capacity(ms1.len());
    for row in ms1 {
        let max = row.intensity_array.iter().copied().fold(0.0_f64, f64::max);
        trace.push(row.time, max);
    }
    trace
}

/// Total ion current chromatogram: summed intensity of every MS1 scan
pub fn total_ion_current(ms1: &[Ms1Row]) -> Trace {
    let mut trace = Trace::with_capacity(ms1.len());
    for row in ms1 {
        trace.push(row.time, row.intensity_array.iter().sum());
    }
    trace
}
