//! # mzxtract - Pseudo-chromatograms from mzXML / mzML runs
//!
//! `mzxtract` loads the MS1 and MS2 scans of an LC-MS/MS run into an in-memory
//! [`ScanStore`](store::ScanStore) and derives intensity-versus-time traces from it:
//! extracted ion chromatograms, PRM transition traces and per-scan fragment traces.
//! It also computes theoretical peptide fragment ladders and matches them against
//! observed MS2 spectra.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mzxtract::input::load_store;
//! use mzxtract::trace::{extract_prm, extract_single};
//!
//! let store = load_store("run.mzXML")?;
//!
//! // XIC of a precursor at 10 ppm
//! let xic = extract_single(store.ms1(), 445.12, 10.0)?;
//! println!("apex: {:?}", xic.apex());
//!
//! // PRM traces of two transitions of that precursor
//! let prm = extract_prm(store.ms2(), 445.12, &[520.3, 633.4], 20.0, 25.0)?;
//! for trace in &prm {
//!     println!("{} -> {} points", trace.transition_mz, trace.trace.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Fragment Matching
//!
//! ```rust
//! use mzxtract::fragments::{assign_fragments, theoretical_fragments, DiagnosticIons, IonType};
//!
//! let table = theoretical_fragments("PEPTIDE", &[IonType::B, IonType::Y], 1)?;
//! let y1 = table
//!     .of_type(IonType::Y)
//!     .find(|f| f.ordinal == 1)
//!     .map(|f| f.mz)
//!     .unwrap_or_default();
//!
//! let hits = assign_fragments(&[y1], &[1000.0], &table, &DiagnosticIons::none(), 10.0);
//! assert_eq!(hits[0].label, "y1");
//! # Ok::<(), mzxtract::fragments::FragmentError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`scan`]: reader-agnostic scan records
//! - [`store`]: MS1 / MS2 tables built once from a scan stream
//! - [`tolerance`]: ppm mass windows
//! - [`trace`]: XIC, PRM, fragment, BPC / TIC traces and smoothing
//! - [`fragments`]: theoretical a/b/c/x/y/z ladders and spectrum annotation
//! - [`precursors`]: precursor m/z lists of a run
//! - [`export`]: CSV writers for every result type
//! - [`mzxml`], [`mzml`]: streaming XML readers
//! - [`input`]: format detection and store loading
//!
//! Retention times are in seconds throughout.

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod binary;
pub mod export;
pub mod fragments;
pub mod input;
pub mod mzml;
pub mod mzxml;
pub mod precursors;
pub mod scan;
pub mod store;
pub mod tolerance;
pub mod trace;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::fragments::{
        assign_fragments, theoretical_fragments, DiagnosticIons, FragmentAssignment,
        FragmentError, FragmentTable, IonType, TheoreticalFragment,
    };
    pub use crate::input::{load_store, InputError, InputFormat};
    pub use crate::precursors::{precursors_by_intensity, unique_precursors, PrecursorIntensity};
    pub use crate::scan::{PrecursorEntry, RawScan};
    pub use crate::store::{Ms1Row, Ms2Row, ScanStore, StoreError};
    pub use crate::tolerance::{ppm_error, MassWindow, ToleranceError};
    pub use crate::trace::{
        base_peak, extract_fragment, extract_many, extract_multi, extract_prm, extract_single,
        total_ion_current, PrmTrace, SpectrumMode, Trace, TraceError,
    };
}
