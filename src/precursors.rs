//! Precursor listings derived from the MS2 table.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::{Ms2Row, ScanStore};
use crate::trace::rounded_key;

/// A rounded precursor m/z and its reported intensity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrecursorIntensity {
    /// Precursor m/z rounded to the requested decimals
    pub mz: f64,
    /// Precursor intensity (0 when the source reported none)
    pub intensity: f64,
}

/// First precursor row of every MS2 scan that has more than one fragment peak
fn first_rows(store: &ScanStore) -> impl Iterator<Item = &Ms2Row> {
    let mut last_scan = None;
    store.ms2().iter().filter(move |row| {
        let first = last_scan != Some(row.scan_index);
        last_scan = Some(row.scan_index);
        first && row.mz_array.len() > 1
    })
}

/// Distinct precursor masses, rounded to `decimal_places` and sorted ascending.
///
/// Masses that cannot be rounded at that precision are left out.
pub fn unique_precursors(store: &ScanStore, decimal_places: u32) -> Vec<f64> {
    let scale = 10f64.powi(decimal_places as i32);
    let mut keys: Vec<i64> = first_rows(store)
        .filter_map(|row| rounded_key(row.precursor_mz, decimal_places))
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys.into_iter().map(|k| k as f64 / scale).collect()
}

/// Rounded precursor masses with their intensity, most intense first.
///
/// When a mass occurs in several scans the last scan's intensity is kept. Ties in
/// intensity are ordered by ascending mass.
pub fn precursors_by_intensity(store: &ScanStore, decimal_places: u32) -> Vec<PrecursorIntensity> {
    let scale = 10f64.powi(decimal_places as i32);
    let mut by_mass = BTreeMap::new();
    for row in first_rows(store) {
        if let Some(key) = rounded_key(row.precursor_mz, decimal_places) {
            by_mass.insert(key, row.precursor_intensity.unwrap_or(0.0));
        }
    }

    let mut list: Vec<PrecursorIntensity> = by_mass
        .into_iter()
        .map(|(key, intensity)| PrecursorIntensity {
            mz: key as f64 / scale,
            intensity,
        })
        .collect();
    list.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
    list
}
