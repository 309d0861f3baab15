use phf::{Map, phf_map};

/// Per-type parameters of the universal force field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UffAtomParams {
    /// Bond radius (Å).
    pub r1: f64,
    /// Natural bond angle at this centre (degrees).
    pub theta0: f64,
    /// Van der Waals distance (Å).
    pub x1: f64,
    /// Van der Waals well depth (kcal/mol).
    pub d1: f64,
    /// Effective charge used by the bond and angle force constants.
    pub z1: f64,
    /// GMP electronegativity.
    pub chi: f64,
}

const fn uff(r1: f64, theta0: f64, x1: f64, d1: f64, z1: f64, chi: f64) -> UffAtomParams {
    UffAtomParams {
        r1,
        theta0,
        x1,
        d1,
        z1,
        chi,
    }
}

static UFF_PARAMS: Map<&'static str, UffAtomParams> = phf_map! {
    "H_" => uff(0.354, 180.0, 2.886, 0.044, 0.712, 4.528),
    "B_3" => uff(0.838, 109.47, 4.083, 0.180, 1.755, 5.110),
    "B_2" => uff(0.828, 120.0, 4.083, 0.180, 1.755, 5.110),
    "C_3" => uff(0.757, 109.47, 3.851, 0.105, 1.912, 5.343),
    "C_R" => uff(0.729, 120.0, 3.851, 0.105, 1.912, 5.343),
    "C_2" => uff(0.732, 120.0, 3.851, 0.105, 1.912, 5.343),
    "C_1" => uff(0.706, 180.0, 3.851, 0.105, 1.912, 5.343),
    "N_3" => uff(0.700, 106.7, 3.660, 0.069, 2.544, 6.899),
    "N_R" => uff(0.699, 120.0, 3.660, 0.069, 2.544, 6.899),
    "N_2" => uff(0.685, 111.2, 3.660, 0.069, 2.544, 6.899),
    "N_1" => uff(0.656, 180.0, 3.660, 0.069, 2.544, 6.899),
    "O_3" => uff(0.658, 104.51, 3.500, 0.060, 2.300, 8.741),
    "O_R" => uff(0.680, 110.0, 3.500, 0.060, 2.300, 8.741),
    "O_2" => uff(0.634, 120.0, 3.500, 0.060, 2.300, 8.741),
    "F_" => uff(0.668, 180.0, 3.364, 0.050, 1.735, 10.874),
    "Si3" => uff(1.117, 109.47, 4.295, 0.402, 2.323, 4.168),
    "P_3" => uff(1.101, 93.8, 4.147, 0.305, 2.863, 5.463),
    "S_3" => uff(1.064, 92.1, 4.035, 0.274, 2.703, 6.928),
    "S_R" => uff(1.077, 92.2, 4.035, 0.274, 2.703, 6.928),
    "S_2" => uff(0.854, 120.0, 4.035, 0.274, 2.703, 6.928),
    "Cl" => uff(1.044, 180.0, 3.947, 0.227, 2.348, 8.564),
    "Se3" => uff(1.190, 90.6, 4.205, 0.291, 2.764, 6.428),
    "Br" => uff(1.192, 180.0, 4.189, 0.251, 2.519, 7.790),
    "I_" => uff(1.382, 180.0, 4.500, 0.339, 2.650, 6.822),
};

pub fn uff_params(label: &str) -> Option<&'static UffAtomParams> {
    UFF_PARAMS.get(label)
}

/// UFF sp3 torsional barrier of a central atom (kcal/mol), by group 14-16 element.
pub fn uff_sp3_torsion_barrier(label: &str) -> f64 {
    match label {
        "C_3" => 2.119,
        "N_3" => 0.450,
        "O_3" => 0.018,
        "Si3" => 1.225,
        "P_3" => 2.400,
        "S_3" => 0.484,
        "Se3" => 0.300,
        _ => 0.0,
    }
}

/// UFF sp2 torsional constant by period of the central atom.
pub fn uff_sp2_torsion_constant(period: u8) -> f64 {
    match period {
        1 | 2 => 2.0,
        3 => 1.25,
        4 => 0.7,
        _ => 0.2,
    }
}

/// Force-field unit conversion for bond and angle constants (kcal/mol·Å per md).
pub const MMFF_STRETCH_UNIT: f64 = 143.9325;
pub const MMFF_CUBIC_STRETCH: f64 = -2.0;
pub const MMFF_BUFFER_DISTANCE: f64 = 0.05;
pub const MMFF_ONE_FOUR_ELECTROSTATIC_SCALE: f64 = 0.75;
pub const BUCKINGHAM_GAMMA: f64 = 12.0;

/// Van der Waals parameters of an MMFF-style atom class: polarizability, effective
/// electron count, and the radius and well-depth scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MmffVdwParams {
    pub alpha: f64,
    pub n_eff: f64,
    pub a: f64,
    pub g: f64,
}

impl MmffVdwParams {
    /// Minimum-energy separation of two like atoms (Å).
    pub fn r_star(&self) -> f64 {
        self.a * self.alpha.powf(0.25)
    }
}

/// Combined `(r_min, well_depth)` for an unlike pair.
pub fn mmff_vdw_pair(p: &MmffVdwParams, q: &MmffVdwParams) -> (f64, f64) {
    let (ri, rj) = (p.r_star(), q.r_star());
    let gamma = (ri - rj) / (ri + rj);
    let r_ij = 0.5 * (ri + rj) * (1.0 + 0.2 * (1.0 - (-12.0 * gamma * gamma).exp()));
    let eps = 181.16 * p.g * q.g * p.alpha * q.alpha
        / ((p.alpha / p.n_eff).sqrt() + (q.alpha / q.n_eff).sqrt())
        / r_ij.powi(6);
    (r_ij, eps)
}

/// MMFF-style covalent radius (Å) and Pauling electronegativity used for reference
/// bond lengths and bond-charge increments.
pub fn mmff_radius_and_electronegativity(symbol: &str) -> Option<(f64, f64)> {
    Some(match symbol {
        "H" => (0.33, 2.20),
        "C" => (0.77, 2.55),
        "N" => (0.73, 3.04),
        "O" => (0.72, 3.44),
        "F" => (0.74, 3.98),
        "Si" => (1.15, 1.90),
        "P" => (1.09, 2.19),
        "S" => (1.03, 2.58),
        "Cl" => (1.01, 3.16),
        "Br" => (1.15, 2.96),
        "I" => (1.33, 2.66),
        _ => return None,
    })
}

/// Partial charge transferred across a bond per unit electronegativity difference.
pub const MMFF_BOND_INCREMENT_SCALE: f64 = 0.25;
