use anyhow::Result;
use log::info;
use std::path::PathBuf;

use mzxtract::export::{write_precursor_intensities, write_precursor_list};
use mzxtract::precursors::{precursors_by_intensity, unique_precursors};

use super::extract::open_store;
use super::OutputOptions;

/// List precursor m/z values, sorted by m/z or by intensity
pub fn run(
    input: PathBuf,
    decimals: u32,
    by_intensity: bool,
    with_intensity: bool,
    max_rows: Option<usize>,
    out: &OutputOptions,
) -> Result<()> {
    let store = open_store(&input)?;
    let limit = max_rows.unwrap_or(usize::MAX);

    if by_intensity {
        let precursors = precursors_by_intensity(&store, decimals);
        info!("{} distinct precursors", precursors.len());
        if out.json {
            let rows = &precursors[..precursors.len().min(limit)];
            out.write_json(rows)
        } else {
            out.write_csv(|w| write_precursor_intensities(w, &precursors, with_intensity, max_rows))
        }
    } else {
        let masses = unique_precursors(&store, decimals);
        info!("{} distinct precursors", masses.len());
        if out.json {
            out.write_json(&masses[..masses.len().min(limit)])
        } else {
            out.write_csv(|w| write_precursor_list(w, &masses, max_rows))
        }
    }
}
