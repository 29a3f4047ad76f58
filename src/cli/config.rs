//! TOML configuration file support.
//!
//! Tolerances and other defaults that would otherwise be repeated on every command
//! line can live in a config file:
//!
//! ```toml
//! # mzxtract.toml
//! [tolerance]
//! ms1_ppm = 10.0
//! precursor_ppm = 20.0
//! transition_ppm = 25.0
//! assignment_ppm = 25.0
//!
//! [rounding]
//! decimal_places = 2
//!
//! [fragments]
//! ion_types = ["b", "y"]
//! max_charge = 1
//!
//! [[diagnostic_ions]]
//! name = "HexNAc"
//! mz = 204.09
//! ```
//!
//! Flags given on the command line take precedence over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use mzxtract::fragments::{DiagnosticIons, IonType};

pub const DEFAULT_MS1_PPM: f64 = 10.0;
pub const DEFAULT_PRECURSOR_PPM: f64 = 20.0;
pub const DEFAULT_TRANSITION_PPM: f64 = 25.0;
pub const DEFAULT_ASSIGNMENT_PPM: f64 = 25.0;
pub const DEFAULT_DECIMAL_PLACES: u32 = 2;
pub const DEFAULT_MAX_CHARGE: u8 = 1;

/// Root configuration structure for mzxtract.toml files.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Mass tolerances in ppm.
    #[serde(default)]
    pub tolerance: ToleranceConfig,

    /// Rounding used by exact-match operations.
    #[serde(default)]
    pub rounding: RoundingConfig,

    /// Theoretical fragment generation.
    #[serde(default)]
    pub fragments: FragmentsConfig,

    /// Named diagnostic ions in search order; replaces the built-in oxonium set
    /// when present.
    pub diagnostic_ions: Option<DiagnosticIons>,
}

/// Tolerance settings.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToleranceConfig {
    /// Window for MS1 extracted ion chromatograms.
    pub ms1_ppm: Option<f64>,

    /// Window for selecting MS2 rows by precursor m/z.
    pub precursor_ppm: Option<f64>,

    /// Window for PRM transitions.
    pub transition_ppm: Option<f64>,

    /// Maximum error for fragment assignment.
    pub assignment_ppm: Option<f64>,
}

/// Rounding settings.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoundingConfig {
    /// Decimal places for multi-target XICs, fragment traces and precursor lists.
    pub decimal_places: Option<u32>,
}

/// Fragment ladder settings.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FragmentsConfig {
    /// Ion series to generate.
    pub ion_types: Option<Vec<IonType>>,

    /// Highest fragment charge.
    pub max_charge: Option<u8>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load the file when one is given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn ms1_ppm(&self, flag: Option<f64>) -> f64 {
        flag.or(self.tolerance.ms1_ppm).unwrap_or(DEFAULT_MS1_PPM)
    }

    pub fn precursor_ppm(&self, flag: Option<f64>) -> f64 {
        flag.or(self.tolerance.precursor_ppm)
            .unwrap_or(DEFAULT_PRECURSOR_PPM)
    }

    pub fn transition_ppm(&self, flag: Option<f64>) -> f64 {
        flag.or(self.tolerance.transition_ppm)
            .unwrap_or(DEFAULT_TRANSITION_PPM)
    }

    pub fn assignment_ppm(&self, flag: Option<f64>) -> f64 {
        flag.or(self.tolerance.assignment_ppm)
            .unwrap_or(DEFAULT_ASSIGNMENT_PPM)
    }

    pub fn decimal_places(&self, flag: Option<u32>) -> u32 {
        flag.or(self.rounding.decimal_places)
            .unwrap_or(DEFAULT_DECIMAL_PLACES)
    }

    pub fn ion_types(&self, flag: Option<Vec<IonType>>) -> Vec<IonType> {
        flag.or_else(|| self.fragments.ion_types.clone())
            .unwrap_or_else(|| vec![IonType::B, IonType::Y])
    }

    pub fn max_charge(&self, flag: Option<u8>) -> u8 {
        flag.or(self.fragments.max_charge)
            .unwrap_or(DEFAULT_MAX_CHARGE)
    }

    /// Diagnostic ions to annotate: the configured set, else oxonium ions when
    /// requested, else none.
    pub fn diagnostic_ions(&self, oxonium: bool) -> DiagnosticIons {
        match &self.diagnostic_ions {
            Some(ions) => ions.clone(),
            None if oxonium => DiagnosticIons::oxonium(),
            None => DiagnosticIons::none(),
        }
    }
}
