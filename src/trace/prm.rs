//! Parallel reaction monitoring traces over the MS2 table.

use log::{debug, info};
use serde::Serialize;

use super::{Trace, TraceError};
use crate::store::Ms2Row;
use crate::tolerance::MassWindow;

/// Trace of one transition of one precursor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrmTrace {
    /// Requested precursor m/z
    pub precursor_mz: f64,
    /// Requested transition (fragment) m/z
    pub transition_mz: f64,
    /// One point per MS2 row whose precursor matched
    pub trace: Trace,
}

/// Peak arrays of several MS2 rows, right-padded with zeros to a common width.
///
/// Padding slots hold `0.0` for both m/z and intensity. A zero m/z never falls inside
/// a window around a positive mass, so padding cannot produce a match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaddedBlock {
    width: usize,
    times: Vec<f64>,
    mz: Vec<f64>,
    intensity: Vec<f64>,
}

impl PaddedBlock {
    /// Copy the given rows into a row-major block as wide as the longest row
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a Ms2Row>,
        I::IntoIter: Clone,
    {
        let rows = rows.into_iter();
        let width = rows.clone().map(|r| r.mz_array.len()).max().unwrap_or(0);
        let height = rows.clone().count();

        let mut block = Self {
            width,
            times: Vec::with_capacity(height),
            mz: vec![0.0; width * height],
            intensity: vec![0.0; width * height],
        };

        for (i, row) in rows.enumerate() {
            let start = i * width;
            let len = row.mz_array.len();
            block.mz[start..start + len].copy_from_slice(&row.mz_array);
            block.intensity[start..start + len].copy_from_slice(&row.intensity_array);
            block.times.push(row.time);
        }
        block
    }

    /// Number of columns (peaks of the longest row)
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.times.len()
    }

    /// Retention time of each row
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Padded `(mz, intensity)` slices of row `i`
    pub fn row(&self, i: usize) -> Option<(&[f64], &[f64])> {
        if i >= self.height() {
            return None;
        }
        let range = i * self.width..(i + 1) * self.width;
        Some((&self.mz[range.clone()], &self.intensity[range]))
    }

    /// Per-row maximum intensity inside `window`, `0.0` for rows without a match
    pub fn max_per_row(&self, window: &MassWindow) -> Vec<f64> {
        (0..self.height())
            .filter_map(|i| self.row(i))
            .map(|(mz, intensity)| super::max_in_window(mz, intensity, window).unwrap_or(0.0))
            .collect()
    }
}

/// Transition traces for one precursor.
///
/// MS2 rows whose precursor m/z lies within `precursor_ppm` of `precursor_mass` are
/// selected and packed into a [`PaddedBlock`]. Every transition then yields one
/// [`PrmTrace`], in input order, aligned to the selected rows' times.
///
/// # Errors
/// - [`TraceError::Tolerance`] for a negative tolerance.
/// - [`TraceError::NoPrecursorMatch`] when no row matches the precursor window.
pub fn extract_prm(
    ms2: &[Ms2Row],
    precursor_mass: f64,
    transitions: &[f64],
    precursor_ppm: f64,
    transition_ppm: f64,
) -> Result<Vec<PrmTrace>, TraceError> {
    let precursor_window = MassWindow::new(precursor_mass, precursor_ppm)?;
    let transition_windows = transitions
        .iter()
        .map(|&t| MassWindow::new(t, transition_ppm))
        .collect::<Result<Vec<_>, _>>()?;

    let selected = ms2
        .iter()
        .filter(|row| precursor_window.contains(row.precursor_mz));
    let block = PaddedBlock::from_rows(selected);

    if block.height() == 0 {
        return Err(TraceError::NoPrecursorMatch {
            precursor_mz: precursor_mass,
            ppm: precursor_ppm,
        });
    }
    info!(
        "precursor {precursor_mass}: {} matching MS2 rows, {} transitions",
        block.height(),
        transitions.len()
    );
    debug!("padded block is {} x {}", block.height(), block.width());

    Ok(transitions
        .iter()
        .zip(&transition_windows)
        .map(|(&transition_mz, window)| PrmTrace {
            precursor_mz: precursor_mass,
            transition_mz,
            trace: Trace {
                times: block.times().to_vec(),
                intensities: block.max_per_row(window),
            },
        })
        .collect())
}
