use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use mzxtract::precursors::unique_precursors;
use mzxtract::store::{IngestStats, ScanStore};

use super::extract::open_store;
use super::OutputOptions;

#[derive(Serialize)]
struct Summary {
    file: String,
    #[serde(flatten)]
    stats: IngestStats,
    first_time: Option<f64>,
    last_time: Option<f64>,
    distinct_precursors: usize,
}

impl Summary {
    fn new(input: &Path, store: &ScanStore) -> Self {
        let scans = store.scans();
        Self {
            file: input.display().to_string(),
            stats: *store.stats(),
            first_time: scans.first().map(|s| s.time),
            last_time: scans.last().map(|s| s.time),
            distinct_precursors: unique_precursors(store, 2).len(),
        }
    }

    fn lines(&self) -> Vec<(&'static str, String)> {
        let time = |t: Option<f64>| t.map_or_else(|| "-".to_string(), |t| format!("{:.2} s", t));
        vec![
            ("Scans", self.stats.total_scans.to_string()),
            ("MS1 scans", self.stats.ms1_scans.to_string()),
            ("MS2 scans", self.stats.ms2_scans.to_string()),
            ("MS2 rows", self.stats.ms2_rows.to_string()),
            (
                "MS2 without precursor",
                self.stats.ms2_without_precursor.to_string(),
            ),
            (
                "Skipped (MS level > 2)",
                self.stats.skipped_unsupported_level.to_string(),
            ),
            ("First scan time", time(self.first_time)),
            ("Last scan time", time(self.last_time)),
            (
                "Distinct precursors (2 dp)",
                self.distinct_precursors.to_string(),
            ),
        ]
    }
}

/// Display scan statistics of an mzXML / mzML file
pub fn run(input: PathBuf, out: &OutputOptions) -> Result<()> {
    let store = open_store(&input)?;
    let summary = Summary::new(&input, &store);

    if out.json {
        return out.write_json(&summary);
    }

    let mut writer = out.writer()?;

    #[cfg(feature = "colorized_output")]
    {
        use console::style;

        writeln!(writer, "{}", style("mzxtract File Information").bold().cyan())?;
        writeln!(writer, "{}", style("=========================").cyan())?;
        writeln!(writer, "{}: {}", style("File").bold(), summary.file)?;
        writeln!(writer)?;
        for (name, value) in summary.lines() {
            writeln!(writer, "  {:<28} {}", style(name).bold(), style(value).green())?;
        }
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        writeln!(writer, "mzxtract File Information")?;
        writeln!(writer, "=========================")?;
        writeln!(writer, "File: {}", summary.file)?;
        writeln!(writer)?;
        for (name, value) in summary.lines() {
            writeln!(writer, "  {:<28} {}", name, value)?;
        }
    }

    writer.flush()?;
    Ok(())
}
