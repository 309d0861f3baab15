use crate::core::chem::rings::{
    shortest_path_avoiding, smallest_ring_through_angle, topological_distances,
};
use crate::core::models::atom::Hybridization;
use crate::core::models::molecule::Molecule;
use crate::core::models::stereo::DoubleBondConfig;
use crate::core::models::topology::BondOrder;
use crate::core::utils::minimizer::Objective;
use thiserror::Error;

const BOND_TOLERANCE: f64 = 0.02;
const ANGLE_TOLERANCE: f64 = 0.05;
const TORSION_TOLERANCE: f64 = 0.05;
const ONE_FIVE_VDW_SCALE: f64 = 0.7;
const LONG_RANGE_VDW_SCALE: f64 = 0.8;
/// Upper bound for pairs no path constrains.
const UNCONSTRAINED_UPPER: f64 = 1000.0;
/// Extra room between disconnected fragments beyond their contact distance.
const FRAGMENT_GAP: f64 = 5.0;
/// Largest ring that cannot accommodate a linear (sp) centre.
const MAX_STRAINED_LINEAR_RING: usize = 7;
/// Smallest ring in which a double bond keeps a written cis/trans configuration.
const MIN_STEREO_RING: usize = 8;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundsError {
    #[error("Atom {atom} is a linear centre inside a {ring_size}-membered ring")]
    StrainedLinearCentre { atom: usize, ring_size: usize },
    #[error("Distance bounds between atoms {i} and {j} cannot be satisfied")]
    Inconsistent { i: usize, j: usize },
}

/// Lower and upper interatomic distance limits (Å) for every atom pair.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsMatrix {
    n: usize,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

fn bond_length(mol: &Molecule, i: usize, j: usize, order: BondOrder) -> f64 {
    let factor = match order {
        BondOrder::Single => 1.0,
        BondOrder::Aromatic => 0.93,
        BondOrder::Double => 0.87,
        BondOrder::Triple => 0.78,
    };
    let atoms = mol.atoms();
    factor * (atoms[i].element.covalent_radius() + atoms[j].element.covalent_radius())
}

fn reference_angle(mol: &Molecule, i: usize, j: usize, k: usize) -> Result<f64, BoundsError> {
    let hybridization = mol.atoms()[j].hybridization;
    let ring = smallest_ring_through_angle(mol, i, j, k);
    if hybridization == Hybridization::Sp {
        if let Some(ring_size) = ring.filter(|&size| size <= MAX_STRAINED_LINEAR_RING) {
            return Err(BoundsError::StrainedLinearCentre { atom: j, ring_size });
        }
        return Ok(180.0);
    }
    let trigonal = hybridization == Hybridization::Sp2;
    Ok(match ring {
        Some(3) => 60.0,
        Some(4) => 90.0,
        Some(5) if trigonal => 108.0,
        Some(5) => 105.0,
        _ if trigonal => 120.0,
        _ => 109.47,
    })
}

/// Third side of a triangle from two sides and the included angle (degrees).
fn law_of_cosines(a: f64, b: f64, angle: f64) -> f64 {
    (a * a + b * b - 2.0 * a * b * angle.to_radians().cos()).sqrt()
}

/// Written configuration of substituents `i` and `l` across the double bond `j=k`.
fn double_bond_config(
    mol: &Molecule,
    bond_index: usize,
    (i, j, k, l): (usize, usize, usize, usize),
) -> Option<DoubleBondConfig> {
    let stereo = mol
        .double_bond_stereo()
        .iter()
        .find(|s| (s.begin, s.end) == (j, k) || (s.begin, s.end) == (k, j))?;
    let in_small_ring = shortest_path_avoiding(mol, j, k, None, Some(bond_index))
        .is_some_and(|path| path + 1 < MIN_STEREO_RING);
    if in_small_ring {
        return None;
    }
    if stereo.begin == j {
        stereo.config_for(mol, i, l)
    } else {
        stereo.config_for(mol, l, i)
    }
}

/// 1-4 distance for bond lengths `a b c`, bond angles `t1 t2` and dihedral `phi` (degrees).
fn dihedral_distance(a: f64, b: f64, c: f64, t1: f64, t2: f64, phi: f64) -> f64 {
    let (c1, s1) = (t1.to_radians().cos(), t1.to_radians().sin());
    let (c2, s2) = (t2.to_radians().cos(), t2.to_radians().sin());
    let d2 = a * a + b * b + c * c - 2.0 * a * b * c1 - 2.0 * b * c * c2
        + 2.0 * a * c * (c1 * c2 - s1 * s2 * phi.to_radians().cos());
    d2.max(0.0).sqrt()
}

impl BoundsMatrix {
    /// Derives triangle-smoothed bounds from the graph of a hydrogen-complete molecule.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundsError`] if the topology is geometrically impossible.
    pub fn build(mol: &Molecule) -> Result<Self, BoundsError> {
        let n = mol.atom_count();
        let mut bounds = Self {
            n,
            lower: vec![0.0; n * n],
            upper: vec![UNCONSTRAINED_UPPER; n * n],
        };
        let distances = topological_distances(mol);
        let atoms = mol.atoms();

        for i in 0..n {
            for j in (i + 1)..n {
                let contact = atoms[i].element.vdw_radius() + atoms[j].element.vdw_radius();
                match distances[i][j] {
                    Some(d) if d < 4 => {}
                    Some(4) => bounds.set(i, j, ONE_FIVE_VDW_SCALE * contact, UNCONSTRAINED_UPPER),
                    Some(_) => bounds.set(i, j, LONG_RANGE_VDW_SCALE * contact, UNCONSTRAINED_UPPER),
                    None => {
                        let low = LONG_RANGE_VDW_SCALE * contact;
                        bounds.set(i, j, low, low + FRAGMENT_GAP * (n as f64).cbrt());
                    }
                }
            }
        }

        let length = |i: usize, j: usize| {
            mol.bond_between(i, j)
                .map_or(0.0, |(_, bond)| bond_length(mol, i, j, bond.order))
        };

        for bond in mol.bonds() {
            let r = bond_length(mol, bond.atom1, bond.atom2, bond.order);
            bounds.set(bond.atom1, bond.atom2, r - BOND_TOLERANCE, r + BOND_TOLERANCE);
        }

        for j in 0..n {
            let neighbors: Vec<usize> = mol.neighbor_indices(j).collect();
            for (a, &i) in neighbors.iter().enumerate() {
                for &k in &neighbors[a + 1..] {
                    if distances[i][k] != Some(2) {
                        continue;
                    }
                    let angle = reference_angle(mol, i, j, k)?;
                    let d = law_of_cosines(length(i, j), length(j, k), angle);
                    bounds.set(i, k, d - ANGLE_TOLERANCE, d + ANGLE_TOLERANCE);
                }
            }
        }

        for (bond_index, bond) in mol.bonds().iter().enumerate() {
            let (j, k) = (bond.atom1, bond.atom2);
            for i in mol.neighbor_indices(j).filter(|&i| i != k) {
                for l in mol.neighbor_indices(k).filter(|&l| l != j && l != i) {
                    if distances[i][l] != Some(3) {
                        continue;
                    }
                    let (a, b, c) = (length(i, j), length(j, k), length(k, l));
                    let t1 = reference_angle(mol, i, j, k)?;
                    let t2 = reference_angle(mol, j, k, l)?;
                    let cis = dihedral_distance(a, b, c, t1, t2, 0.0);
                    let trans = dihedral_distance(a, b, c, t1, t2, 180.0);
                    let (low, high) = match double_bond_config(mol, bond_index, (i, j, k, l)) {
                        Some(DoubleBondConfig::Cis) => (cis, cis),
                        Some(DoubleBondConfig::Trans) => (trans, trans),
                        None => (cis, trans),
                    };
                    bounds.set(i, l, low - TORSION_TOLERANCE, high + TORSION_TOLERANCE);
                }
            }
        }

        bounds.smooth()?;
        Ok(bounds)
    }

    fn set(&mut self, i: usize, j: usize, lower: f64, upper: f64) {
        let lower = lower.max(0.0);
        self.lower[i * self.n + j] = lower;
        self.lower[j * self.n + i] = lower;
        self.upper[i * self.n + j] = upper;
        self.upper[j * self.n + i] = upper;
    }

    /// Tightens bounds with the triangle inequality until every triple is consistent.
    fn smooth(&mut self) -> Result<(), BoundsError> {
        let n = self.n;
        for k in 0..n {
            for i in 0..n {
                if i == k {
                    continue;
                }
                let u_ik = self.upper[i * n + k];
                let l_ik = self.lower[i * n + k];
                for j in (i + 1)..n {
                    if j == k {
                        continue;
                    }
                    let u_kj = self.upper[k * n + j];
                    let l_kj = self.lower[k * n + j];
                    let mut upper = self.upper[i * n + j];
                    let mut lower = self.lower[i * n + j];
                    upper = upper.min(u_ik + u_kj);
                    lower = lower.max(l_ik - u_kj).max(l_kj - u_ik);
                    if lower > upper {
                        return Err(BoundsError::Inconsistent { i, j });
                    }
                    self.set(i, j, lower, upper);
                }
            }
        }
        Ok(())
    }

    pub fn atom_count(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn lower(&self, i: usize, j: usize) -> f64 {
        self.lower[i * self.n + j]
    }

    #[inline]
    pub fn upper(&self, i: usize, j: usize) -> f64 {
        self.upper[i * self.n + j]
    }

    /// Largest amount by which any pair distance of `coords` leaves its bounds (Å).
    pub fn max_violation(&self, coords: &[f64]) -> f64 {
        let mut worst: f64 = 0.0;
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                let d = pair_distance_sq(coords, i, j).sqrt();
                worst = worst
                    .max(self.lower(i, j) - d)
                    .max(d - self.upper(i, j));
            }
        }
        worst
    }
}

#[inline]
fn pair_distance_sq(coords: &[f64], i: usize, j: usize) -> f64 {
    (0..3)
        .map(|c| coords[3 * i + c] - coords[3 * j + c])
        .map(|d| d * d)
        .sum()
}

/// Squared-deviation penalty for distances that leave their bounds. Zero inside the bounds.
impl Objective for BoundsMatrix {
    fn dimension(&self) -> usize {
        3 * self.n
    }

    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        grad.iter_mut().for_each(|g| *g = 0.0);
        let mut value = 0.0;
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                let d2 = pair_distance_sq(x, i, j);
                let (u, l) = (self.upper(i, j), self.lower(i, j));
                let u2 = u * u;
                let l2 = l * l;
                let dvalue_dd2 = if d2 > u2 {
                    let excess = d2 / u2 - 1.0;
                    value += excess * excess;
                    2.0 * excess / u2
                } else if d2 < l2 {
                    let deficit = 2.0 * l2 / (l2 + d2) - 1.0;
                    value += deficit * deficit;
                    -4.0 * deficit * l2 / ((l2 + d2) * (l2 + d2))
                } else {
                    continue;
                };
                for c in 0..3 {
                    let g = 2.0 * dvalue_dd2 * (x[3 * i + c] - x[3 * j + c]);
                    grad[3 * i + c] += g;
                    grad[3 * j + c] -= g;
                }
            }
        }
        value
    }
}
