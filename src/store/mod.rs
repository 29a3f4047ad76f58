//! # Scan Store
//!
//! Ingests a sequential stream of [`RawScan`] records and partitions it into an MS1
//! table and an MS2 table. The store is built once and is read-only afterwards, so it
//! can be shared between any number of concurrent trace queries.
//!
//! ## Partitioning rules
//!
//! - MS level 1: one [`Ms1Row`] per scan.
//! - MS level 2: one [`Ms2Row`] per precursor descriptor. Multiplexed scans expand into
//!   several rows sharing the same time and peak arrays. A scan without descriptors
//!   contributes no rows.
//! - Any other level is skipped and counted in [`IngestStats`].
//!
//! Rows keep the order of the input stream; nothing is re-sorted.

use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use crate::scan::RawScan;

pub use error::{MalformedReason, StoreError};

mod error;


/// One MS1 scan
#[derive(Debug, Clone, PartialEq)]
pub struct Ms1Row {
    /// Stream position of the scan
    pub scan_index: usize,
    /// Retention time in seconds
    pub time: f64,
    /// Observed m/z values
    pub mz_array: Vec<f64>,
    /// Observed intensities
    pub intensity_array: Vec<f64>,
}

/// One precursor descriptor of an MS2 scan
#[derive(Debug, Clone, PartialEq)]
pub struct Ms2Row {
    /// Stream position of the scan
    pub scan_index: usize,
    /// Retention time in seconds
    pub time: f64,
    /// Precursor m/z
    pub precursor_mz: f64,
    /// Precursor charge state, if known
    pub precursor_charge: Option<i16>,
    /// Precursor intensity, if known
    pub precursor_intensity: Option<f64>,
    /// Fragment m/z values (shared between rows of one multiplexed scan)
    pub mz_array: Arc<[f64]>,
    /// Fragment intensities (shared between rows of one multiplexed scan)
    pub intensity_array: Arc<[f64]>,
}

/// Per-scan bookkeeping for every record of the stream, including skipped levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScanEntry {
    /// Stream position
    pub index: usize,
    /// Native scan number, if the source reported one
    pub scan_number: Option<i64>,
    /// Retention time in seconds
    pub time: f64,
    /// MS level as reported by the source
    pub ms_level: u8,
}

/// Where the peaks of a scan ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanLocation {
    Ms1(usize),
    Ms2(usize),
    Absent,
}

/// Counters collected during ingestion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Number of records in the stream
    pub total_scans: usize,
    /// Rows in the MS1 table
    pub ms1_scans: usize,
    /// MS2 scans seen (before precursor expansion)
    pub ms2_scans: usize,
    /// Rows in the MS2 table
    pub ms2_rows: usize,
    /// Scans skipped because their MS level is neither 1 nor 2
    pub skipped_unsupported_level: usize,
    /// MS2 scans that carried no precursor descriptor
    pub ms2_without_precursor: usize,
}

/// Immutable MS1 / MS2 tables built from a scan stream
#[derive(Debug, Clone, Default)]
pub struct ScanStore {
    ms1: Vec<Ms1Row>,
    ms2: Vec<Ms2Row>,
    scans: Vec<ScanEntry>,
    locations: Vec<ScanLocation>,
    stats: IngestStats,
}

impl ScanStore {
    /// Build a store from an infallible scan stream.
    ///
    /// # Errors
    /// Returns [`StoreError::MalformedScan`] for the first record that lacks a
    /// retention time, an m/z array or an intensity array, or whose arrays differ in
    /// length. No partial store is returned.
    ///
    /// # Example
    /// ```
    /// use mzxtract::scan::{PrecursorEntry, RawScan};
    /// use mzxtract::store::ScanStore;
    ///
    /// let store = ScanStore::ingest(vec![
    ///     RawScan::ms1(1.0, vec![500.0], vec![10.0]),
    ///     RawScan::ms2(1.5, vec![PrecursorEntry::new(500.0)], vec![200.0], vec![5.0]),
    /// ])?;
    /// assert_eq!(store.ms1().len(), 1);
    /// assert_eq!(store.ms2().len(), 1);
    /// # Ok::<(), mzxtract::store::StoreError>(())
    /// ```
    pub fn ingest<I>(scans: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = RawScan>,
    {
        Self::build(scans.into_iter().map(Ok))
    }

    /// Build a store from a fallible scan stream, such as a file reader.
    ///
    /// The first source error aborts ingestion and is returned as
    /// [`StoreError::Source`].
    pub fn try_ingest<I, E>(scans: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = Result<RawScan, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::build(
            scans
                .into_iter()
                .map(|scan| scan.map_err(|e| StoreError::Source(Box::new(e)))),
        )
    }

    fn build<I>(scans: I) -> Result<Self, StoreError>
    where
        I: Iterator<Item = Result<RawScan, StoreError>>,
    {
        let mut store = Self::default();
        let mut last_time = f64::NEG_INFINITY;

        for (index, scan) in scans.enumerate() {
            let scan = scan?;
            let RawScan {
                scan_number,
                ms_level,
                retention_time,
                mz_array,
                intensity_array,
                precursors,
            } = scan;

            let time = retention_time.ok_or_else(|| StoreError::missing(index, "retentionTime"))?;
            let mz_array = mz_array.ok_or_else(|| StoreError::missing(index, "m/z array"))?;
            let intensity_array =
                intensity_array.ok_or_else(|| StoreError::missing(index, "intensity array"))?;

            if mz_array.len() != intensity_array.len() {
                return Err(StoreError::MalformedScan {
                    index,
                    reason: MalformedReason::ArrayLengthMismatch {
                        mz_len: mz_array.len(),
                        intensity_len: intensity_array.len(),
                    },
                });
            }

            if time < last_time {
                warn!(
                    "retention time decreases at scan {index} ({time} < {last_time}); order kept as read"
                );
            }
            last_time = time;

            store.scans.push(ScanEntry {
                index,
                scan_number,
                time,
                ms_level,
            });

            let location = match ms_level {
                1 => {
                    store.ms1.push(Ms1Row {
                        scan_index: index,
                        time,
                        mz_array,
                        intensity_array,
                    });
                    ScanLocation::Ms1(store.ms1.len() - 1)
                }
                2 => {
                    store.stats.ms2_scans += 1;
                    if precursors.is_empty() {
                        store.stats.ms2_without_precursor += 1;
                        ScanLocation::Absent
                    } else {
                        let first_row = store.ms2.len();
                        let mz_array: Arc<[f64]> = mz_array.into();
                        let intensity_array: Arc<[f64]> = intensity_array.into();
                        for precursor in precursors {
                            store.ms2.push(Ms2Row {
                                scan_index: index,
                                time,
                                precursor_mz: precursor.mz,
                                precursor_charge: precursor.charge,
                                precursor_intensity: precursor.intensity,
                                mz_array: Arc::clone(&mz_array),
                                intensity_array: Arc::clone(&intensity_array),
                            });
                        }
                        ScanLocation::Ms2(first_row)
                    }
                }
                other => {
                    debug!("skipping scan {index} with unsupported MS level {other}");
                    store.stats.skipped_unsupported_level += 1;
                    ScanLocation::Absent
                }
            };
            store.locations.push(location);
        }

        store.stats.total_scans = store.scans.len();
        store.stats.ms1_scans = store.ms1.len();
        store.stats.ms2_rows = store.ms2.len();

        info!(
            "{} MS1 scans and {} MS2 scans collected",
            store.stats.ms1_scans, store.stats.ms2_rows
        );
        if store.stats.skipped_unsupported_level > 0 {
            warn!(
                "{} scans with MS level other than 1 or 2 were skipped",
                store.stats.skipped_unsupported_level
            );
        }

        Ok(store)
    }

    /// MS1 table in acquisition order
    pub fn ms1(&self) -> &[Ms1Row] {
        &self.ms1
    }

    /// MS2 table in acquisition order, one row per precursor descriptor
    pub fn ms2(&self) -> &[Ms2Row] {
        &self.ms2
    }

    /// Every scan of the stream, including skipped MS levels
    pub fn scans(&self) -> &[ScanEntry] {
        &self.scans
    }

    /// Retention times of every scan of the stream
    pub fn scan_times(&self) -> Vec<f64> {
        self.scans.iter().map(|s| s.time).collect()
    }

    /// Ingestion counters
    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Total number of scans in the stream
    pub fn len(&self) -> usize {
        self.scans.len()
    }

    /// Whether the stream contained no scans at all
    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// m/z and intensity arrays of the scan at stream position `index`.
    ///
    /// Returns `None` for out-of-range positions and for scans whose peaks were not
    /// kept (unsupported MS level, MS2 without precursor).
    pub fn scan(&self, index: usize) -> Option<(&[f64], &[f64])> {
        match self.locations.get(index)? {
            ScanLocation::Ms1(row) => {
                let row = &self.ms1[*row];
                Some((row.mz_array.as_slice(), row.intensity_array.as_slice()))
            }
            ScanLocation::Ms2(row) => {
                let row = &self.ms2[*row];
                Some((&row.mz_array[..], &row.intensity_array[..]))
            }
            ScanLocation::Absent => None,
        }
    }

    /// Same as [`ScanStore::scan`], looked up by native scan number
    pub fn scan_by_number(&self, scan_number: i64) -> Option<(&[f64], &[f64])> {
        let entry = self
            .scans
            .iter()
            .find(|s| s.scan_number == Some(scan_number))?;
        self.scan(entry.index)
    }
}
