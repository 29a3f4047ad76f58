//! CSV export of traces, fragment tables, assignments and precursor lists.
//!
//! All writers take any [`io::Write`] and flush it before returning.

use std::io;

use serde::Serialize;

use crate::fragments::{FragmentAssignment, FragmentTable, IonType};
use crate::precursors::PrecursorIntensity;
use crate::trace::{PrmTrace, Trace};

/// Errors that can occur while writing CSV output
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// CSV serialization error
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Traces written side by side must have the same length
    #[error("trace {index} has {found} points, expected {expected}")]
    MismatchedTraces {
        /// Position of the offending trace
        index: usize,
        /// Length of the first trace
        expected: usize,
        /// Length of the offending trace
        found: usize,
    },
}

#[derive(Serialize)]
struct TracePoint {
    time: f64,
    intensity: f64,
}

#[derive(Serialize)]
struct PrmPoint {
    precursor: f64,
    time: f64,
    transition_mz: f64,
    transition_intensity: f64,
}

#[derive(Serialize)]
struct FragmentRow<'a> {
    label: &'a str,
    ion_type: IonType,
    ordinal: usize,
    charge: u8,
    mz: f64,
}

/// Write `time,intensity` rows
pub fn write_trace<W: io::Write>(writer: W, trace: &Trace) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for (time, intensity) in trace.iter() {
        csv.serialize(TracePoint { time, intensity })?;
    }
    csv.flush()?;
    Ok(())
}

/// Write several traces side by side: a `time` column then one column per label.
///
/// Times are taken from the first trace.
pub fn write_traces<W: io::Write>(
    writer: W,
    labels: &[String],
    traces: &[Trace],
) -> Result<(), ExportError> {
    let expected = traces.first().map_or(0, Trace::len);
    if let Some((index, trace)) = traces
        .iter()
        .enumerate()
        .find(|(_, t)| t.len() != expected)
    {
        return Err(ExportError::MismatchedTraces {
            index,
            expected,
            found: trace.len(),
        });
    }

    let mut csv = csv::Writer::from_writer(writer);
    let mut header = vec!["time".to_string()];
    header.extend(labels.iter().cloned());
    csv.write_record(&header)?;

    if let Some(first) = traces.first() {
        for (row, time) in first.times.iter().enumerate() {
            let mut record = Vec::with_capacity(traces.len() + 1);
            record.push(time.to_string());
            record.extend(traces.iter().map(|t| t.intensities[row].to_string()));
            csv.write_record(&record)?;
        }
    }
    csv.flush()?;
    Ok(())
}

/// Write PRM traces in long form: `precursor,time,transition_mz,transition_intensity`
pub fn write_prm_traces<W: io::Write>(writer: W, traces: &[PrmTrace]) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for prm in traces {
        for (time, intensity) in prm.trace.iter() {
            csv.serialize(PrmPoint {
                precursor: prm.precursor_mz,
                time,
                transition_mz: prm.transition_mz,
                transition_intensity: intensity,
            })?;
        }
    }
    csv.flush()?;
    Ok(())
}

/// Write one row per fragment: `label,ion_type,ordinal,charge,mz`
pub fn write_fragment_table<W: io::Write>(
    writer: W,
    table: &FragmentTable,
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for fragment in table.fragments() {
        let label = fragment.label();
        csv.serialize(FragmentRow {
            label: &label,
            ion_type: fragment.ion_type,
            ordinal: fragment.ordinal,
            charge: fragment.charge,
            mz: fragment.mz,
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// Write matched fragments, one row per assignment
pub fn write_assignments<W: io::Write>(
    writer: W,
    assignments: &[FragmentAssignment],
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for assignment in assignments {
        csv.serialize(assignment)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write precursor masses, one per line without header, at most `max_rows` lines
pub fn write_precursor_list<W: io::Write>(
    writer: W,
    masses: &[f64],
    max_rows: Option<usize>,
) -> Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for mass in masses.iter().take(max_rows.unwrap_or(usize::MAX)) {
        csv.write_record([mass.to_string()])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write precursor masses without header, optionally with their intensity column
pub fn write_precursor_intensities<W: io::Write>(
    writer: W,
    precursors: &[PrecursorIntensity],
    with_intensity: bool,
    max_rows: Option<usize>,
) -> Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for p in precursors.iter().take(max_rows.unwrap_or(usize::MAX)) {
        if with_intensity {
            csv.write_record([p.mz.to_string(), p.intensity.to_string()])?;
        } else {
            csv.write_record([p.mz.to_string()])?;
        }
    }
    csv.flush()?;
    Ok(())
}
