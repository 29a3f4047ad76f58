use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use mzxtract::export::{write_prm_traces, write_trace, write_traces};
use mzxtract::input::load_store;
use mzxtract::store::ScanStore;
use mzxtract::trace::{
    base_peak, extract_fragment, extract_many, extract_multi, extract_prm, total_ion_current,
    SpectrumMode, Trace,
};

use super::{ChromatogramKind, OutputOptions};

#[derive(Serialize)]
struct LabeledTrace<'a> {
    label: String,
    #[serde(flatten)]
    trace: &'a Trace,
}

pub(super) fn open_store(input: &Path) -> Result<ScanStore> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    load_store(input).with_context(|| format!("Failed to load {}", input.display()))
}

/// Extracted ion chromatograms, one per target or one merged trace
pub fn xic(
    input: PathBuf,
    targets: &[f64],
    ppm: f64,
    decimals: Option<u32>,
    out: &OutputOptions,
) -> Result<()> {
    let store = open_store(&input)?;

    let (labels, traces) = match decimals {
        Some(decimals) => {
            info!("Merged XIC of {} targets at {} decimals", targets.len(), decimals);
            let label = targets
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join("+");
            (vec![label], vec![extract_multi(store.ms1(), targets, decimals)])
        }
        None => {
            info!("XIC of {} targets at {} ppm", targets.len(), ppm);
            let labels = targets.iter().map(f64::to_string).collect();
            (labels, extract_many(store.ms1(), targets, ppm)?)
        }
    };

    if out.json {
        let labeled: Vec<_> = labels
            .into_iter()
            .zip(&traces)
            .map(|(label, trace)| LabeledTrace { label, trace })
            .collect();
        out.write_json(&labeled)
    } else {
        out.write_csv(|w| write_traces(w, &labels, &traces))
    }
}

/// PRM traces of every transition of one precursor
pub fn prm(
    input: PathBuf,
    precursor: f64,
    transitions: &[f64],
    precursor_ppm: f64,
    transition_ppm: f64,
    out: &OutputOptions,
) -> Result<()> {
    let store = open_store(&input)?;
    info!(
        "PRM of {} ({} ppm), {} transitions ({} ppm)",
        precursor,
        precursor_ppm,
        transitions.len(),
        transition_ppm
    );

    let traces = extract_prm(
        store.ms2(),
        precursor,
        transitions,
        precursor_ppm,
        transition_ppm,
    )?;

    if out.json {
        out.write_json(&traces)
    } else {
        out.write_csv(|w| write_prm_traces(w, &traces))
    }
}

/// Per-scan trace of one fragment m/z
pub fn fragment_trace(
    input: PathBuf,
    fragment: f64,
    decimals: u32,
    centroid: bool,
    out: &OutputOptions,
) -> Result<()> {
    let store = open_store(&input)?;
    let mode = if centroid {
        SpectrumMode::Centroid
    } else {
        SpectrumMode::Profile
    };

    let result = extract_fragment(&store, fragment, decimals, mode);
    info!(
        "Fragment {} searched in {} MS2 scans",
        fragment, result.ms2_scan_count
    );

    if out.json {
        out.write_json(&result)
    } else {
        out.write_csv(|w| write_trace(w, &result.trace))
    }
}

/// Base peak or total ion chromatogram, optionally smoothed
pub fn chromatogram(
    input: PathBuf,
    kind: ChromatogramKind,
    smooth: Option<f64>,
    out: &OutputOptions,
) -> Result<()> {
    let store = open_store(&input)?;

    let mut trace = match kind {
        ChromatogramKind::Bpc => base_peak(store.ms1()),
        ChromatogramKind::Tic => total_ion_current(store.ms1()),
    };
    if let Some(sigma) = smooth {
        trace = trace.smoothed(sigma)?;
    }

    if out.json {
        out.write_json(&trace)
    } else {
        out.write_csv(|w| write_trace(w, &trace))
    }
}
