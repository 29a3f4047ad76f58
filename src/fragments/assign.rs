//! Assignment of theoretical and diagnostic ions to an observed spectrum.

use serde::{Deserialize, Serialize};

use super::{FragmentTable, IonType};
use crate::tolerance::ppm_error;

/// A named diagnostic ion (for example a glycan oxonium ion)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticIon {
    /// Display name, used as the assignment label
    pub name: String,
    /// Expected m/z
    pub mz: f64,
}

/// Ordered set of diagnostic ions searched alongside the fragment ladder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagnosticIons {
    ions: Vec<DiagnosticIon>,
}

impl DiagnosticIons {
    /// Build from `(name, mz)` pairs, keeping their order
    pub fn new<I, S>(ions: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            ions: ions
                .into_iter()
                .map(|(name, mz)| DiagnosticIon {
                    name: name.into(),
                    mz,
                })
                .collect(),
        }
    }

    /// No diagnostic ions
    pub fn none() -> Self {
        Self::default()
    }

    /// Common glycopeptide oxonium ions
    pub fn oxonium() -> Self {
        Self::new([
            ("Hex-36", 127.06),
            ("HexNAc-fg", 138.05),
            ("Hex", 163.06),
            ("HexNAc-36", 168.09),
            ("HexNAc-18", 186.09),
            ("HexNAc", 204.09),
            ("NeuAc-18", 274.09),
            ("NeuAc", 292.08),
            ("HexHexNAc", 366.14),
        ])
    }

    /// Iterate in configured order
    pub fn iter(&self) -> std::slice::Iter<'_, DiagnosticIon> {
        self.ions.iter()
    }

    /// Number of ions
    pub fn len(&self) -> usize {
        self.ions.len()
    }

    /// Whether no ions are configured
    pub fn is_empty(&self) -> bool {
        self.ions.is_empty()
    }
}

impl<'a> IntoIterator for &'a DiagnosticIons {
    type Item = &'a DiagnosticIon;
    type IntoIter = std::slice::Iter<'a, DiagnosticIon>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An ion matched to an observed peak
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentAssignment {
    /// `b3`, `y5^2`, or the diagnostic ion name
    pub label: String,
    /// Ion series, `None` for diagnostic ions
    pub ion_type: Option<IonType>,
    /// Residue count, `None` for diagnostic ions
    pub ordinal: Option<usize>,
    /// Charge state (1 for diagnostic ions)
    pub charge: u8,
    /// Expected m/z
    pub theoretical_mz: f64,
    /// m/z of the nearest observed peak
    pub observed_mz: f64,
    /// Intensity of that peak
    pub intensity: f64,
    /// Intensity as a percentage of the most intense assigned peak
    pub relative_abundance: f64,
    /// Error of the observed peak relative to the expected m/z
    pub ppm_error: f64,
}

/// Relative slack on the tolerance so an error of exactly `tolerance_ppm` survives
/// floating-point rounding
const BOUNDARY_SLACK: f64 = 1e-9;

/// Index of the element of `xs` closest to `target` (first one on ties)
fn nearest(xs: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, x) in xs.iter().enumerate() {
        let distance = (x - target).abs();
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((i, distance)),
        }
    }
    best.map(|(i, _)| i)
}

/// Match fragments and diagnostic ions to the peaks of one spectrum.
///
/// Each expected ion is paired with the nearest observed m/z in `xs` and kept when the
/// ppm error is within `tolerance_ppm` (inclusive). Fragments come first in table order, followed
/// by the diagnostic ions. A negative tolerance assigns nothing.
pub fn assign_fragments(
    xs: &[f64],
    ys: &[f64],
    fragments: &FragmentTable,
    diagnostic_ions: &DiagnosticIons,
    tolerance_ppm: f64,
) -> Vec<FragmentAssignment> {
    let n = xs.len().min(ys.len());
    let (xs, ys) = (&xs[..n], &ys[..n]);

    let expected = fragments
        .fragments()
        .iter()
        .map(|f| (f.label(), Some(f.ion_type), Some(f.ordinal), f.charge, f.mz))
        .chain(
            diagnostic_ions
                .iter()
                .map(|ion| (ion.name.clone(), None, None, 1, ion.mz)),
        );

    let mut assignments = Vec::new();
    for (label, ion_type, ordinal, charge, theoretical_mz) in expected {
        let Some(i) = nearest(xs, theoretical_mz) else {
            break;
        };
        let error = ppm_error(xs[i], theoretical_mz);
        if error.abs() <= tolerance_ppm * (1.0 + BOUNDARY_SLACK) {
            assignments.push(FragmentAssignment {
                label,
                ion_type,
                ordinal,
                charge,
                theoretical_mz,
                observed_mz: xs[i],
                intensity: ys[i],
                relative_abundance: 0.0,
                ppm_error: error,
            });
        }
    }

    let max = assignments
        .iter()
        .map(|a| a.intensity)
        .fold(0.0_f64, f64::max);
    if max > 0.0 {
        for assignment in &mut assignments {
            assignment.relative_abundance = assignment.intensity / max * 100.0;
        }
    }

    assignments
}
