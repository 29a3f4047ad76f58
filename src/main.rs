//! # mzxtract
//!
//! Command-line front end for pseudo-chromatogram extraction and fragment matching.
//!
//! ## Supported Input Formats
//!
//! - **mzXML**: nested scans, 32/64-bit peaks, zlib compression
//! - **mzML**: HUPO-PSI standard XML format (spectrum list)
//!
//! ## Usage
//!
//! ```bash
//! # Scan statistics
//! mzxtract info run.mzXML
//!
//! # XIC of two precursors at 10 ppm
//! mzxtract xic run.mzXML --mz 445.12 --mz 512.27 --ppm 10 -o xic.csv
//!
//! # PRM transitions
//! mzxtract prm run.mzML --precursor 445.12 --transition 520.3 --transition 633.4
//!
//! # Annotate scan 1234 with b/y ions and oxonium ions
//! mzxtract annotate run.mzXML --scan 1234 --peptide PEPTIDE --oxonium --json
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
