//! # Fragment Calculation and Assignment
//!
//! Theoretical a/b/c/x/y/z ion ladders of an unmodified peptide, and assignment of
//! those ions (plus diagnostic ions such as glycan oxonium ions) to the peaks of an
//! observed MS2 spectrum.
//!
//! ```
//! use mzxtract::fragments::{theoretical_fragments, IonType};
//!
//! let table = theoretical_fragments("PEPTIDE", &[IonType::B, IonType::Y], 1)?;
//! assert_eq!(table.len(), 12);
//! assert_eq!(table.fragments()[0].label(), "b1");
//! # Ok::<(), mzxtract::fragments::FragmentError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use assign::{assign_fragments, DiagnosticIon, DiagnosticIons, FragmentAssignment};
pub use masses::{residue_mass, MASS_CO, MASS_CO2, MASS_NH3, MASS_PROTON, MASS_WATER};

mod assign;
mod masses;


/// Errors raised while computing theoretical fragments
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FragmentError {
    /// The peptide contains a character that is not a known residue
    #[error("unknown residue '{residue}' at position {position}")]
    UnknownResidue {
        /// Offending character
        residue: char,
        /// Zero-based position in the sequence
        position: usize,
    },

    /// The peptide sequence is empty
    #[error("peptide sequence is empty")]
    EmptyPeptide,

    /// The maximum charge must be at least 1
    #[error("invalid maximum charge {0}: must be at least 1")]
    InvalidCharge(u8),

    /// An ion type name could not be parsed
    #[error("unknown ion type '{0}' (expected one of a, b, c, x, y, z)")]
    UnknownIonType(String),
}

/// Backbone fragment ion series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IonType {
    /// N-terminal, b minus CO
    A,
    /// N-terminal acylium
    B,
    /// N-terminal, b plus NH3
    C,
    /// C-terminal, y plus CO minus H2
    X,
    /// C-terminal
    Y,
    /// C-terminal, y minus NH3
    Z,
}

impl IonType {
    /// All ion types in ladder order
    pub const ALL: [IonType; 6] = [
        IonType::A,
        IonType::B,
        IonType::C,
        IonType::X,
        IonType::Y,
        IonType::Z,
    ];

    /// Whether the fragment keeps the N-terminus
    pub fn is_n_terminal(self) -> bool {
        matches!(self, IonType::A | IonType::B | IonType::C)
    }

    /// Mass added to `residues + H2O` for this series
    fn offset(self) -> f64 {
        match self {
            IonType::A => -MASS_WATER - MASS_CO,
            IonType::B => -MASS_WATER,
            IonType::C => -MASS_WATER + MASS_NH3,
            IonType::X => -MASS_WATER + MASS_CO2,
            IonType::Y => 0.0,
            IonType::Z => -MASS_NH3,
        }
    }

    /// Lowercase series letter
    pub fn as_str(self) -> &'static str {
        match self {
            IonType::A => "a",
            IonType::B => "b",
            IonType::C => "c",
            IonType::X => "x",
            IonType::Y => "y",
            IonType::Z => "z",
        }
    }
}

impl fmt::Display for IonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IonType {
    type Err = FragmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(IonType::A),
            "b" => Ok(IonType::B),
            "c" => Ok(IonType::C),
            "x" => Ok(IonType::X),
            "y" => Ok(IonType::Y),
            "z" => Ok(IonType::Z),
            _ => Err(FragmentError::UnknownIonType(s.to_string())),
        }
    }
}

/// One theoretical fragment ion
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TheoreticalFragment {
    /// Ion series
    pub ion_type: IonType,
    /// Number of residues in the fragment
    pub ordinal: usize,
    /// Charge state
    pub charge: u8,
    /// Monoisotopic m/z
    pub mz: f64,
}

impl TheoreticalFragment {
    /// Conventional label, e.g. `b3` or `y7^2`
    pub fn label(&self) -> String {
        if self.charge > 1 {
            format!("{}{}^{}", self.ion_type, self.ordinal, self.charge)
        } else {
            format!("{}{}", self.ion_type, self.ordinal)
        }
    }
}

/// Theoretical fragments of one peptide
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FragmentTable {
    peptide: String,
    fragments: Vec<TheoreticalFragment>,
}

impl FragmentTable {
    /// Peptide sequence the table was computed for
    pub fn peptide(&self) -> &str {
        &self.peptide
    }

    /// All fragments, grouped by ion type in request order
    pub fn fragments(&self) -> &[TheoreticalFragment] {
        &self.fragments
    }

    /// Fragments of a single series
    pub fn of_type(&self, ion_type: IonType) -> impl Iterator<Item = &TheoreticalFragment> {
        self.fragments.iter().filter(move |f| f.ion_type == ion_type)
    }

    /// Number of fragments
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Compute the theoretical fragment ladder of an unmodified peptide.
///
/// For every requested ion type and every cleavage position `1..N` the fragment is
/// computed at each charge from 1 to `max_charge`. N-terminal series take the prefix,
/// C-terminal series the suffix:
///
/// `m/z = (sum(residues) + H2O + offset + z * proton) / z`
///
/// # Errors
/// - [`FragmentError::EmptyPeptide`] for an empty sequence.
/// - [`FragmentError::InvalidCharge`] when `max_charge` is zero.
/// - [`FragmentError::UnknownResidue`] for any character without a residue mass.
pub fn theoretical_fragments(
    peptide: &str,
    ion_types: &[IonType],
    max_charge: u8,
) -> Result<FragmentTable, FragmentError> {
    if peptide.is_empty() {
        return Err(FragmentError::EmptyPeptide);
    }
    if max_charge == 0 {
        return Err(FragmentError::InvalidCharge(max_charge));
    }

    let residues = peptide
        .chars()
        .enumerate()
        .map(|(position, residue)| {
            residue_mass(residue).ok_or(FragmentError::UnknownResidue { residue, position })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    // prefix[i] is the residue mass of peptide[..i]
    let mut prefix = Vec::with_capacity(residues.len() + 1);
    prefix.push(0.0);
    for mass in &residues {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + mass);
    }
    let n = residues.len();
    let total = prefix[n];

    let mut fragments =
        Vec::with_capacity(ion_types.len() * n.saturating_sub(1) * usize::from(max_charge));
    for &ion_type in ion_types {
        for i in 1..n {
            let (residue_sum, ordinal) = if ion_type.is_n_terminal() {
                (prefix[i], i)
            } else {
                (total - prefix[i], n - i)
            };
            let neutral = residue_sum + MASS_WATER + ion_type.offset();
            for charge in 1..=max_charge {
                fragments.push(TheoreticalFragment {
                    ion_type,
                    ordinal,
                    charge,
                    mz: masses::mz_from_mass(neutral, charge),
                });
            }
        }
    }

    Ok(FragmentTable {
        peptide: peptide.to_string(),
        fragments,
    })
}
