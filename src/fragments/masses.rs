//! Monoisotopic masses used for fragment calculation.

/// Proton mass (u)
pub const MASS_PROTON: f64 = 1.007276466621;
/// Water (u)
pub const MASS_WATER: f64 = 18.0105646863;
/// Carbon monoxide (u)
pub const MASS_CO: f64 = 27.99491461956;
/// Carbon dioxide (u)
pub const MASS_CO2: f64 = 43.98982923912;
/// Ammonia (u)
pub const MASS_NH3: f64 = 17.02654910101;

/// Monoisotopic residue mass of a one-letter amino acid code
pub fn residue_mass(code: char) -> Option<f64> {
    let mass = match code {
        'A' => 71.037114,
        'R' => 156.101111,
        'N' => 114.042927,
        'D' => 115.026943,
        'C' => 103.009185,
        'E' => 129.042593,
        'Q' => 128.058578,
        'G' => 57.021464,
        'H' => 137.058912,
        'I' | 'L' => 113.084064,
        'K' => 128.094963,
        'M' => 131.040485,
        'F' => 147.068414,
        'P' => 97.052764,
        'S' => 87.032028,
        'T' => 101.047679,
        'W' => 186.079313,
        'Y' => 163.063329,
        'V' => 99.068414,
        'U' => 150.953636,
        'O' => 237.147727,
        _ => return None,
    };
    Some(mass)
}

/// m/z of an ion with neutral `mass` carrying `charge` protons
#[inline]
pub fn mz_from_mass(mass: f64, charge: u8) -> f64 {
    let z = f64::from(charge);
    (mass + z * MASS_PROTON) / z
}
