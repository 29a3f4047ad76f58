use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;

use mzxtract::export::{write_assignments, write_fragment_table};
use mzxtract::fragments::{assign_fragments, theoretical_fragments, DiagnosticIons, IonType};
use mzxtract::trace::centroid;

use super::extract::open_store;
use super::OutputOptions;

/// Settings for the annotate command
pub struct AnnotateOptions {
    pub scan: i64,
    pub peptide: String,
    pub ion_types: Vec<IonType>,
    pub max_charge: u8,
    pub tolerance_ppm: f64,
    pub centroid: bool,
    pub diagnostic_ions: DiagnosticIons,
}

/// Print the theoretical fragment ladder of a peptide
pub fn ladder(
    peptide: &str,
    ion_types: &[IonType],
    max_charge: u8,
    out: &OutputOptions,
) -> Result<()> {
    let table = theoretical_fragments(peptide, ion_types, max_charge)?;
    info!("{} fragments for {}", table.len(), peptide);

    if out.json {
        out.write_json(&table)
    } else {
        out.write_csv(|w| write_fragment_table(w, &table))
    }
}

/// Match a peptide's fragments against one scan
pub fn annotate(input: PathBuf, opts: AnnotateOptions, out: &OutputOptions) -> Result<()> {
    let table = theoretical_fragments(&opts.peptide, &opts.ion_types, opts.max_charge)?;
    let store = open_store(&input)?;

    let (mz, intensity) = store
        .scan_by_number(opts.scan)
        .with_context(|| format!("Scan {} not found in {}", opts.scan, input.display()))?;

    let centroided;
    let (mz, intensity) = if opts.centroid {
        centroided = centroid(mz, intensity);
        (&centroided.0[..], &centroided.1[..])
    } else {
        (mz, intensity)
    };
    debug!("Scan {}: {} peaks", opts.scan, mz.len());

    let assignments = assign_fragments(
        mz,
        intensity,
        &table,
        &opts.diagnostic_ions,
        opts.tolerance_ppm,
    );
    info!(
        "{} of {} ions assigned within {} ppm",
        assignments.len(),
        table.len() + opts.diagnostic_ions.len(),
        opts.tolerance_ppm
    );

    if out.json {
        out.write_json(&assignments)
    } else {
        out.write_csv(|w| write_assignments(w, &assignments))
    }
}
