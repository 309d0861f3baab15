use super::kind::ForceFieldKind;
use super::params::{
    BUCKINGHAM_GAMMA, MMFF_BOND_INCREMENT_SCALE, MMFF_BUFFER_DISTANCE, MMFF_CUBIC_STRETCH,
    MMFF_ONE_FOUR_ELECTROSTATIC_SCALE, MMFF_STRETCH_UNIT, MmffVdwParams,
    mmff_radius_and_electronegativity,
    mmff_vdw_pair, uff_params, uff_sp2_torsion_constant, uff_sp3_torsion_barrier,
};
use super::potentials;
use super::term::EnergyTerm;
use super::typing::{MmffClass, assign_mmff_types, assign_uff_types};
use crate::core::chem::rings::{smallest_ring_through_angle, topological_distances};
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use crate::core::utils::geometry::flatten;
use crate::core::utils::minimizer::Objective;
use nalgebra::{Point3, Vector3};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForceFieldError {
    #[error("{kind} has no parameters for atom {atom} ({element})")]
    MissingParameters {
        kind: ForceFieldKind,
        atom: usize,
        element: Element,
    },
    #[error("Expected coordinates for {expected} atoms, found {found}")]
    CoordinateMismatch { expected: usize, found: usize },
    #[error("{kind} energy is not finite for this geometry")]
    NonFiniteEnergy { kind: ForceFieldKind },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stretch {
    Harmonic,
    Anharmonic { cubic: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BondTerm {
    atoms: [usize; 2],
    r0: f64,
    k: f64,
    form: Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Bend {
    /// `k / (2 sin^2 t0) (cos t - cos t0)^2`
    Cosine { cos0: f64 },
    /// `k (1 + cos t)`, minimum at 180 degrees.
    Linear,
    /// `0.5 k (t - t0)^2`
    Harmonic { theta0: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AngleTerm {
    atoms: [usize; 3],
    k: f64,
    form: Bend,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FourierTerm {
    fold: u8,
    barrier: f64,
    sign: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct TorsionTerm {
    atoms: [usize; 4],
    series: Vec<FourierTerm>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Dispersion {
    LennardJones { r_min: f64, well_depth: f64 },
    Buckingham { r_min: f64, well_depth: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PairTerm {
    atoms: [usize; 2],
    dispersion: Dispersion,
    /// Scaled charge product; zero when the model has no electrostatics.
    charge_product: f64,
}

/// A force field instantiated for one hydrogen-complete molecular graph.
///
/// Construction assigns atom types and enumerates every bonded and non-bonded term once;
/// evaluation is then a pure function of the coordinates.
#[derive(Debug, Clone)]
pub struct ForceField {
    kind: ForceFieldKind,
    atom_count: usize,
    bonds: Vec<BondTerm>,
    angles: Vec<AngleTerm>,
    torsions: Vec<TorsionTerm>,
    pairs: Vec<PairTerm>,
}

struct Topology {
    angles: Vec<[usize; 3]>,
    torsions: Vec<([usize; 4], usize)>,
    pairs: Vec<([usize; 2], bool)>,
}

impl Topology {
    fn of(mol: &Molecule) -> Self {
        let mut angles = Vec::new();
        for j in 0..mol.atom_count() {
            let neighbors: Vec<usize> = mol.neighbor_indices(j).collect();
            for (a, &i) in neighbors.iter().enumerate() {
                for &k in &neighbors[a + 1..] {
                    angles.push([i, j, k]);
                }
            }
        }

        let mut torsions = Vec::new();
        for (bond_index, bond) in mol.bonds().iter().enumerate() {
            let (j, k) = (bond.atom1, bond.atom2);
            for i in mol.neighbor_indices(j).filter(|&i| i != k) {
                for l in mol.neighbor_indices(k).filter(|&l| l != j && l != i) {
                    torsions.push(([i, j, k, l], bond_index));
                }
            }
        }

        let distances = topological_distances(mol);
        let mut pairs = Vec::new();
        for i in 0..mol.atom_count() {
            for j in (i + 1)..mol.atom_count() {
                match distances[i][j] {
                    Some(d) if d < 3 => {}
                    d => pairs.push(([i, j], d == Some(3))),
                }
            }
        }

        Self {
            angles,
            torsions,
            pairs,
        }
    }
}

/// Ring-strained reference angle for angles inside three- and four-membered rings.
fn small_ring_angle(mol: &Molecule, [i, j, k]: [usize; 3]) -> Option<f64> {
    match smallest_ring_through_angle(mol, i, j, k)? {
        3 => Some(60.0),
        4 => Some(90.0),
        _ => None,
    }
}

fn bend_for(theta0_deg: f64, harmonic: bool) -> Bend {
    if theta0_deg >= 179.0 {
        Bend::Linear
    } else if harmonic {
        Bend::Harmonic {
            theta0: theta0_deg.to_radians(),
        }
    } else {
        Bend::Cosine {
            cos0: theta0_deg.to_radians().cos(),
        }
    }
}

impl ForceField {
    /// Assigns types and parameters for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ForceFieldError::MissingParameters`] if any atom is outside the model's
    /// element coverage.
    pub fn build(mol: &Molecule, kind: ForceFieldKind) -> Result<Self, ForceFieldError> {
        let topology = Topology::of(mol);
        match kind {
            ForceFieldKind::Uff => Self::build_uff(mol, &topology),
            ForceFieldKind::Mmff94 | ForceFieldKind::Mmff94s => {
                Self::build_mmff(mol, &topology, kind)
            }
        }
    }

    fn build_uff(mol: &Molecule, topology: &Topology) -> Result<Self, ForceFieldError> {
        let labels = assign_uff_types(mol)?;
        let params = labels
            .iter()
            .enumerate()
            .map(|(atom, label)| {
                uff_params(label).ok_or(ForceFieldError::MissingParameters {
                    kind: ForceFieldKind::Uff,
                    atom,
                    element: mol.atoms()[atom].element,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rest_length = |i: usize, j: usize, order: f64| {
            let (pi, pj) = (params[i], params[j]);
            let r_bo = -0.1332 * (pi.r1 + pj.r1) * order.ln();
            let r_en = pi.r1 * pj.r1 * (pi.chi.sqrt() - pj.chi.sqrt()).powi(2)
                / (pi.chi * pi.r1 + pj.chi * pj.r1);
            pi.r1 + pj.r1 + r_bo - r_en
        };
        let bond_order = |i: usize, j: usize| {
            mol.bond_between(i, j)
                .map_or(1.0, |(_, bond)| bond.order.as_f64())
        };

        let bonds = mol
            .bonds()
            .iter()
            .map(|bond| {
                let (i, j) = (bond.atom1, bond.atom2);
                let r0 = rest_length(i, j, bond.order.as_f64());
                BondTerm {
                    atoms: [i, j],
                    r0,
                    k: 664.12 * params[i].z1 * params[j].z1 / r0.powi(3),
                    form: Stretch::Harmonic,
                }
            })
            .collect();

        let angles = topology
            .angles
            .iter()
            .map(|&[i, j, k]| {
                let theta0 = small_ring_angle(mol, [i, j, k]).unwrap_or(params[j].theta0);
                let cos0 = theta0.to_radians().cos();
                let r_ij = rest_length(i, j, bond_order(i, j));
                let r_jk = rest_length(j, k, bond_order(j, k));
                let r_ik_sq = r_ij * r_ij + r_jk * r_jk - 2.0 * r_ij * r_jk * cos0;
                let force = 664.12 * params[i].z1 * params[k].z1 / r_ik_sq.powf(2.5)
                    * (3.0 * r_ij * r_jk * (1.0 - cos0 * cos0) - r_ik_sq * cos0);
                AngleTerm {
                    atoms: [i, j, k],
                    k: force.abs(),
                    form: bend_for(theta0, false),
                }
            })
            .collect();

        let torsions = topology
            .torsions
            .iter()
            .filter_map(|&([i, j, k, l], bond_index)| {
                let order = mol.bond(bond_index)?.order;
                let shared = ((mol.degree(j) - 1) * (mol.degree(k) - 1)) as f64;
                let term = uff_torsion(labels[j], labels[k], order, mol, j, k)?;
                Some(TorsionTerm {
                    atoms: [i, j, k, l],
                    series: vec![FourierTerm {
                        barrier: term.barrier / shared,
                        ..term
                    }],
                })
            })
            .collect();

        let pairs = topology
            .pairs
            .iter()
            .map(|&([i, j], _)| PairTerm {
                atoms: [i, j],
                dispersion: Dispersion::LennardJones {
                    r_min: (params[i].x1 * params[j].x1).sqrt(),
                    well_depth: (params[i].d1 * params[j].d1).sqrt(),
                },
                charge_product: 0.0,
            })
            .collect();

        Ok(Self {
            kind: ForceFieldKind::Uff,
            atom_count: mol.atom_count(),
            bonds,
            angles,
            torsions,
            pairs,
        })
    }

    fn build_mmff(
        mol: &Molecule,
        topology: &Topology,
        kind: ForceFieldKind,
    ) -> Result<Self, ForceFieldError> {
        let classes = assign_mmff_types(mol, kind)?;
        let radius_chi = mol
            .atoms()
            .iter()
            .enumerate()
            .map(|(atom, a)| {
                mmff_radius_and_electronegativity(a.element.symbol()).ok_or(
                    ForceFieldError::MissingParameters {
                        kind,
                        atom,
                        element: a.element,
                    },
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let bonds = mol
            .bonds()
            .iter()
            .map(|bond| {
                let (i, j) = (bond.atom1, bond.atom2);
                let ((ri, chi_i), (rj, chi_j)) = (radius_chi[i], radius_chi[j]);
                let shrink = if classes[i].is_hydrogen() || classes[j].is_hydrogen() {
                    0.05
                } else {
                    0.085
                };
                let (order_shift, order_scale) = match bond.order {
                    BondOrder::Single => (0.0, 1.0),
                    BondOrder::Aromatic => (-0.15, 1.6),
                    BondOrder::Double => (-0.20, 2.1),
                    BondOrder::Triple => (-0.34, 3.4),
                };
                BondTerm {
                    atoms: [i, j],
                    r0: ri + rj - shrink * (chi_i - chi_j).abs().powf(1.4) + order_shift,
                    k: MMFF_STRETCH_UNIT * 4.5 * order_scale,
                    form: Stretch::Anharmonic {
                        cubic: MMFF_CUBIC_STRETCH,
                    },
                }
            })
            .collect();

        let angles = topology
            .angles
            .iter()
            .map(|&[i, j, k]| {
                let theta0 = small_ring_angle(mol, [i, j, k])
                    .unwrap_or_else(|| mmff_reference_angle(classes[j], mol.degree(j)));
                let ka = if classes[i].is_hydrogen() || classes[k].is_hydrogen() {
                    0.55
                } else {
                    0.75
                };
                AngleTerm {
                    atoms: [i, j, k],
                    k: MMFF_STRETCH_UNIT * ka,
                    form: bend_for(theta0, true),
                }
            })
            .collect();

        let torsions = topology
            .torsions
            .iter()
            .filter_map(|&([i, j, k, l], bond_index)| {
                let order = mol.bond(bond_index)?.order;
                let [v1, v2, v3] = mmff_torsion(classes[j], classes[k], order, kind)?;
                let series: Vec<FourierTerm> = [(1, v1, 1.0), (2, v2, -1.0), (3, v3, 1.0)]
                    .into_iter()
                    .filter(|&(_, v, _)| v != 0.0)
                    .map(|(fold, barrier, sign)| FourierTerm {
                        fold,
                        barrier,
                        sign,
                    })
                    .collect();
                (!series.is_empty()).then_some(TorsionTerm {
                    atoms: [i, j, k, l],
                    series,
                })
            })
            .collect();

        let charges = bond_increment_charges(mol, &radius_chi);
        let vdw: Vec<_> = classes.iter().map(|c| mmff_vdw_params(*c)).collect();
        let pairs = topology
            .pairs
            .iter()
            .map(|&([i, j], one_four)| {
                let (r_min, well_depth) = mmff_vdw_pair(&vdw[i], &vdw[j]);
                let scale = if one_four {
                    MMFF_ONE_FOUR_ELECTROSTATIC_SCALE
                } else {
                    1.0
                };
                PairTerm {
                    atoms: [i, j],
                    dispersion: Dispersion::Buckingham { r_min, well_depth },
                    charge_product: scale * charges[i] * charges[j],
                }
            })
            .collect();

        Ok(Self {
            kind,
            atom_count: mol.atom_count(),
            bonds,
            angles,
            torsions,
            pairs,
        })
    }

    pub fn kind(&self) -> ForceFieldKind {
        self.kind
    }

    pub fn atom_count(&self) -> usize {
        self.atom_count
    }

    /// Energy breakdown of one geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinate count does not match the molecule or the
    /// energy is not finite.
    pub fn energy(&self, positions: &[Point3<f64>]) -> Result<EnergyTerm, ForceFieldError> {
        if positions.len() != self.atom_count {
            return Err(ForceFieldError::CoordinateMismatch {
                expected: self.atom_count,
                found: positions.len(),
            });
        }
        let coords = flatten(positions);
        let mut grad = vec![0.0; coords.len()];
        let terms = self.accumulate(&coords, &mut grad);
        if terms.total().is_finite() {
            Ok(terms)
        } else {
            Err(ForceFieldError::NonFiniteEnergy { kind: self.kind })
        }
    }

    fn accumulate(&self, x: &[f64], grad: &mut [f64]) -> EnergyTerm {
        grad.iter_mut().for_each(|g| *g = 0.0);
        let mut terms = EnergyTerm::default();

        for bond in &self.bonds {
            let [i, j] = bond.atoms;
            let d = point(x, i) - point(x, j);
            let r = d.norm();
            let (e, de) = match bond.form {
                Stretch::Harmonic => (
                    potentials::harmonic(r, bond.r0, bond.k),
                    potentials::harmonic_derivative(r, bond.r0, bond.k),
                ),
                Stretch::Anharmonic { cubic } => (
                    potentials::anharmonic_stretch(r, bond.r0, bond.k, cubic),
                    potentials::anharmonic_stretch_derivative(r, bond.r0, bond.k, cubic),
                ),
            };
            terms.bond += e;
            if r > 1e-8 {
                let f = d * (de / r);
                add(grad, i, f);
                add(grad, j, -f);
            }
        }

        for angle in &self.angles {
            let [i, j, k] = angle.atoms;
            let a = point(x, i) - point(x, j);
            let b = point(x, k) - point(x, j);
            let (la, lb) = (a.norm(), b.norm());
            if la < 1e-8 || lb < 1e-8 {
                continue;
            }
            let c = (a.dot(&b) / (la * lb)).clamp(-1.0, 1.0);
            let (e, de_dc) = match angle.form {
                Bend::Cosine { cos0 } => {
                    let scale = angle.k / (2.0 * (1.0 - cos0 * cos0));
                    (scale * (c - cos0).powi(2), 2.0 * scale * (c - cos0))
                }
                Bend::Linear => (angle.k * (1.0 + c), angle.k),
                Bend::Harmonic { theta0 } => {
                    let theta = c.acos();
                    let sin = (1.0 - c * c).sqrt().max(1e-6);
                    (
                        potentials::harmonic(theta, theta0, angle.k),
                        -potentials::harmonic_derivative(theta, theta0, angle.k) / sin,
                    )
                }
            };
            terms.angle += e;
            let dc_da = b / (la * lb) - a * (c / (la * la));
            let dc_db = a / (la * lb) - b * (c / (lb * lb));
            let (gi, gk) = (dc_da * de_dc, dc_db * de_dc);
            add(grad, i, gi);
            add(grad, k, gk);
            add(grad, j, -(gi + gk));
        }

        for torsion in &self.torsions {
            let [i, j, k, l] = torsion.atoms;
            let b1 = point(x, j) - point(x, i);
            let b2 = point(x, k) - point(x, j);
            let b3 = point(x, l) - point(x, k);
            let n1 = b1.cross(&b2);
            let n2 = b2.cross(&b3);
            let (l1, l2) = (n1.norm(), n2.norm());
            if l1 < 1e-8 || l2 < 1e-8 {
                continue;
            }
            let c = (n1.dot(&n2) / (l1 * l2)).clamp(-1.0, 1.0);
            let (mut e, mut de_dc) = (0.0, 0.0);
            for term in &torsion.series {
                e += potentials::fourier_torsion(c, term.fold, term.barrier, term.sign);
                de_dc +=
                    potentials::fourier_torsion_derivative(c, term.fold, term.barrier, term.sign);
            }
            terms.torsion += e;

            let g1 = (n2 / (l1 * l2) - n1 * (c / (l1 * l1))) * de_dc;
            let g2 = (n1 / (l1 * l2) - n2 * (c / (l2 * l2))) * de_dc;
            let db1 = b2.cross(&g1);
            let db2 = g1.cross(&b1) + b3.cross(&g2);
            let db3 = g2.cross(&b2);
            add(grad, i, -db1);
            add(grad, j, db1 - db2);
            add(grad, k, db2 - db3);
            add(grad, l, db3);
        }

        for pair in &self.pairs {
            let [i, j] = pair.atoms;
            let d = point(x, i) - point(x, j);
            let r = d.norm();
            let (e_vdw, de_vdw) = match pair.dispersion {
                Dispersion::LennardJones { r_min, well_depth } => (
                    potentials::lennard_jones_12_6(r, r_min, well_depth),
                    potentials::lennard_jones_12_6_derivative(r, r_min, well_depth),
                ),
                Dispersion::Buckingham { r_min, well_depth } => (
                    potentials::buckingham_exp_6(r, r_min, well_depth, BUCKINGHAM_GAMMA),
                    potentials::buckingham_exp_6_derivative(
                        r,
                        r_min,
                        well_depth,
                        BUCKINGHAM_GAMMA,
                    ),
                ),
            };
            let (e_coul, de_coul) = if pair.charge_product != 0.0 {
                let buffered = r + MMFF_BUFFER_DISTANCE;
                (
                    potentials::coulomb(buffered, pair.charge_product, 1.0, 1.0),
                    potentials::coulomb_derivative(buffered, pair.charge_product, 1.0, 1.0),
                )
            } else {
                (0.0, 0.0)
            };
            terms.vdw += e_vdw;
            terms.coulomb += e_coul;
            if r > 1e-8 {
                let f = d * ((de_vdw + de_coul) / r);
                add(grad, i, f);
                add(grad, j, -f);
            }
        }

        terms
    }
}

impl Objective for ForceField {
    fn dimension(&self) -> usize {
        3 * self.atom_count
    }

    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        self.accumulate(x, grad).total()
    }
}

#[inline]
fn point(x: &[f64], atom: usize) -> Vector3<f64> {
    Vector3::new(x[3 * atom], x[3 * atom + 1], x[3 * atom + 2])
}

#[inline]
fn add(grad: &mut [f64], atom: usize, v: Vector3<f64>) {
    grad[3 * atom] += v.x;
    grad[3 * atom + 1] += v.y;
    grad[3 * atom + 2] += v.z;
}

fn uff_hybrid_class(label: &str) -> Option<u8> {
    match label.as_bytes().last()? {
        b'3' => Some(3),
        b'2' | b'R' => Some(2),
        _ => None,
    }
}

fn uff_torsion(
    label_j: &str,
    label_k: &str,
    order: BondOrder,
    mol: &Molecule,
    j: usize,
    k: usize,
) -> Option<FourierTerm> {
    let (hj, hk) = (uff_hybrid_class(label_j)?, uff_hybrid_class(label_k)?);
    match (hj, hk) {
        (3, 3) => Some(FourierTerm {
            fold: 3,
            barrier: (uff_sp3_torsion_barrier(label_j) * uff_sp3_torsion_barrier(label_k)).sqrt(),
            sign: 1.0,
        }),
        (2, 2) => {
            let uj = uff_sp2_torsion_constant(mol.atoms()[j].element.period());
            let uk = uff_sp2_torsion_constant(mol.atoms()[k].element.period());
            Some(FourierTerm {
                fold: 2,
                barrier: 5.0 * (uj * uk).sqrt() * (1.0 + 4.18 * order.as_f64().ln()),
                sign: -1.0,
            })
        }
        _ => Some(FourierTerm {
            fold: 6,
            barrier: 1.0,
            sign: -1.0,
        }),
    }
}

fn is_trigonal(class: MmffClass) -> bool {
    matches!(
        class,
        MmffClass::CSp2
            | MmffClass::CCarbonyl
            | MmffClass::CAromatic
            | MmffClass::NSp2
            | MmffClass::NPlanar
            | MmffClass::NAromatic
            | MmffClass::OAromatic
            | MmffClass::SAromatic
    )
}

fn is_linear(class: MmffClass) -> bool {
    matches!(class, MmffClass::CSp | MmffClass::NSp)
}

/// `[V1, V2, V3]` for a torsion about a bond between atoms of the given classes.
fn mmff_torsion(
    cj: MmffClass,
    ck: MmffClass,
    order: BondOrder,
    kind: ForceFieldKind,
) -> Option<[f64; 3]> {
    if is_linear(cj) || is_linear(ck) {
        return None;
    }
    let planar_nitrogen = cj.is_trigonal_nitrogen() || ck.is_trigonal_nitrogen();
    let stiffening = if kind == ForceFieldKind::Mmff94s && planar_nitrogen {
        1.0
    } else {
        0.0
    };
    Some(match order {
        BondOrder::Triple => return None,
        BondOrder::Double => [0.0, 12.0, 0.0],
        BondOrder::Aromatic => [0.0, 7.0, 0.0],
        BondOrder::Single => match (is_trigonal(cj), is_trigonal(ck)) {
            (true, true) => {
                let amide = matches!(
                    (cj, ck),
                    (MmffClass::NPlanar, MmffClass::CCarbonyl)
                        | (MmffClass::CCarbonyl, MmffClass::NPlanar)
                );
                [0.0, if amide { 2.5 } else { 1.8 } + stiffening, 0.0]
            }
            (true, false) | (false, true) => [0.0, stiffening, 0.15],
            (false, false) => [0.0, 0.0, 0.3],
        },
    })
}

fn mmff_reference_angle(center: MmffClass, degree: usize) -> f64 {
    match center {
        MmffClass::CSp | MmffClass::NSp => 180.0,
        MmffClass::NSp3 => 107.0,
        MmffClass::OSp3 => 106.0,
        MmffClass::OAromatic => 106.0,
        MmffClass::SAromatic => 92.0,
        MmffClass::S | MmffClass::P if degree < 4 => 97.0,
        c if is_trigonal(c) => 120.0,
        _ => 109.47,
    }
}

fn mmff_vdw_params(class: MmffClass) -> MmffVdwParams {
    use MmffClass::*;
    let (alpha, n_eff, a, g) = match class {
        CSp3 => (1.050, 2.490, 3.890, 1.282),
        CSp2 | CAromatic => (1.350, 2.490, 3.890, 1.282),
        CCarbonyl => (1.100, 2.490, 3.890, 1.282),
        CSp => (1.300, 2.490, 3.890, 1.282),
        HC => (0.250, 0.800, 4.200, 1.209),
        HO | HN => (0.150, 0.800, 4.200, 1.209),
        OSp3 => (0.700, 3.150, 3.890, 1.282),
        OCarbonyl | OAromatic => (0.650, 3.150, 3.890, 1.282),
        NSp3 => (1.150, 2.820, 3.890, 1.282),
        NSp2 => (0.900, 2.820, 3.890, 1.282),
        NPlanar | NSp => (1.000, 2.820, 3.890, 1.282),
        NAromatic => (0.850, 2.820, 3.890, 1.282),
        F => (0.350, 3.480, 3.890, 1.282),
        Cl => (2.300, 5.100, 3.320, 1.345),
        Br => (3.400, 6.000, 3.190, 1.359),
        I => (5.500, 6.950, 3.080, 1.404),
        S | SAromatic => (3.000, 4.800, 3.320, 1.345),
        Si => (4.500, 4.200, 3.320, 1.345),
        P => (3.600, 4.500, 3.320, 1.345),
    };
    MmffVdwParams { alpha, n_eff, a, g }
}

/// Formal charge plus electronegativity-driven bond increments.
fn bond_increment_charges(mol: &Molecule, radius_chi: &[(f64, f64)]) -> Vec<f64> {
    let mut charges: Vec<f64> = mol.atoms().iter().map(|a| a.formal_charge as f64).collect();
    for bond in mol.bonds() {
        let (i, j) = (bond.atom1, bond.atom2);
        let transfer = MMFF_BOND_INCREMENT_SCALE * (radius_chi[j].1 - radius_chi[i].1);
        charges[i] += transfer;
        charges[j] -= transfer;
    }
    charges
}
