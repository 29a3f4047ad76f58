use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use mzxtract::fragments::IonType;

mod config;
mod extract;
mod fragments;
mod info;
mod output;
mod precursors;

pub use config::Config;

/// mzxtract - XICs, PRM traces and fragment matching for mzXML / mzML runs
#[derive(Parser)]
#[command(name = "mzxtract")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load tolerances and defaults from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Write results to this file instead of stdout
    #[arg(short, long, value_name = "FILE", global = true)]
    output: Option<PathBuf>,

    /// Emit JSON instead of CSV
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Summary chromatogram kind.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ChromatogramKind {
    /// Base peak chromatogram
    Bpc,
    /// Total ion current
    Tic,
}

#[derive(Subcommand)]
enum Commands {
    /// Print scan statistics of an input file
    Info {
        /// Input mzXML or mzML file
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Extracted ion chromatograms from MS1 scans
    Xic {
        /// Input mzXML or mzML file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Target m/z (repeat for several traces)
        #[arg(long = "mz", required = true, num_args = 1..)]
        targets: Vec<f64>,

        /// Tolerance in ppm
        #[arg(long)]
        ppm: Option<f64>,

        /// Merge all targets into one trace by exact match after rounding
        #[arg(long)]
        decimals: Option<u32>,
    },

    /// PRM transition traces from MS2 scans
    Prm {
        /// Input mzXML or mzML file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Precursor m/z
        #[arg(long)]
        precursor: f64,

        /// Transition m/z (repeat for several traces)
        #[arg(long = "transition", required = true, num_args = 1..)]
        transitions: Vec<f64>,

        /// Precursor tolerance in ppm
        #[arg(long)]
        precursor_ppm: Option<f64>,

        /// Transition tolerance in ppm
        #[arg(long)]
        transition_ppm: Option<f64>,
    },

    /// Per-scan intensity of one fragment m/z across all MS2 scans
    FragmentTrace {
        /// Input mzXML or mzML file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Fragment m/z
        #[arg(long = "mz")]
        fragment: f64,

        /// Decimal places used for matching
        #[arg(long)]
        decimals: Option<u32>,

        /// Centroid profile spectra before matching
        #[arg(long)]
        centroid: bool,
    },

    /// Base peak or total ion chromatogram
    Chromatogram {
        /// Input mzXML or mzML file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Chromatogram kind
        #[arg(long, value_enum, default_value = "bpc")]
        kind: ChromatogramKind,

        /// Gaussian smoothing width in scans
        #[arg(long, value_name = "SIGMA")]
        smooth: Option<f64>,
    },

    /// List the precursor m/z values of a run
    Precursors {
        /// Input mzXML or mzML file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Decimal places for rounding and de-duplication
        #[arg(long)]
        decimals: Option<u32>,

        /// Sort by precursor intensity instead of m/z
        #[arg(long)]
        by_intensity: bool,

        /// Include the intensity column (implies --by-intensity)
        #[arg(long)]
        with_intensity: bool,

        /// Write at most this many rows
        #[arg(long)]
        max_rows: Option<usize>,
    },

    /// Theoretical fragment ladder of a peptide
    Fragments {
        /// Peptide sequence in one-letter codes
        #[arg(value_name = "PEPTIDE")]
        peptide: String,

        /// Ion series, comma separated (a, b, c, x, y, z)
        #[arg(long, value_delimiter = ',')]
        ion_types: Option<Vec<IonType>>,

        /// Highest fragment charge
        #[arg(long)]
        max_charge: Option<u8>,
    },

    /// Match a peptide's fragments to one MS2 scan
    Annotate {
        /// Input mzXML or mzML file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Native scan number
        #[arg(long)]
        scan: i64,

        /// Peptide sequence in one-letter codes
        #[arg(long)]
        peptide: String,

        /// Maximum assignment error in ppm
        #[arg(long)]
        tolerance: Option<f64>,

        /// Ion series, comma separated (a, b, c, x, y, z)
        #[arg(long, value_delimiter = ',')]
        ion_types: Option<Vec<IonType>>,

        /// Highest fragment charge
        #[arg(long)]
        max_charge: Option<u8>,

        /// Centroid the spectrum before matching
        #[arg(long)]
        centroid: bool,

        /// Also match glycan oxonium ions
        #[arg(long)]
        oxonium: bool,
    },
}

/// Where and how command results are written.
pub struct OutputOptions {
    pub path: Option<PathBuf>,
    pub json: bool,
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let out = OutputOptions {
        path: cli.output,
        json: cli.json,
    };

    match cli.command {
        Commands::Info { input } => info::run(input, &out),
        Commands::Xic {
            input,
            targets,
            ppm,
            decimals,
        } => extract::xic(input, &targets, config.ms1_ppm(ppm), decimals, &out),
        Commands::Prm {
            input,
            precursor,
            transitions,
            precursor_ppm,
            transition_ppm,
        } => extract::prm(
            input,
            precursor,
            &transitions,
            config.precursor_ppm(precursor_ppm),
            config.transition_ppm(transition_ppm),
            &out,
        ),
        Commands::FragmentTrace {
            input,
            fragment,
            decimals,
            centroid,
        } => extract::fragment_trace(
            input,
            fragment,
            config.decimal_places(decimals),
            centroid,
            &out,
        ),
        Commands::Chromatogram {
            input,
            kind,
            smooth,
        } => extract::chromatogram(input, kind, smooth, &out),
        Commands::Precursors {
            input,
            decimals,
            by_intensity,
            with_intensity,
            max_rows,
        } => precursors::run(
            input,
            config.decimal_places(decimals),
            by_intensity || with_intensity,
            with_intensity,
            max_rows,
            &out,
        ),
        Commands::Fragments {
            peptide,
            ion_types,
            max_charge,
        } => fragments::ladder(
            &peptide,
            &config.ion_types(ion_types),
            config.max_charge(max_charge),
            &out,
        ),
        Commands::Annotate {
            input,
            scan,
            peptide,
            tolerance,
            ion_types,
            max_charge,
            centroid,
            oxonium,
        } => fragments::annotate(
            input,
            fragments::AnnotateOptions {
                scan,
                peptide,
                ion_types: config.ion_types(ion_types),
                max_charge: config.max_charge(max_charge),
                tolerance_ppm: config.assignment_ppm(tolerance),
                centroid,
                diagnostic_ions: config.diagnostic_ions(oxonium),
            },
            &out,
        ),
    }
}
