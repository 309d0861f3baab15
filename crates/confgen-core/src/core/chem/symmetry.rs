use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use crate::core::utils::geometry::{AlignmentError, Superposition, superpose};
use itertools::Itertools;
use nalgebra::Point3;
use std::collections::BTreeMap;
use tracing::debug;

/// Upper limit on enumerated heavy-atom relabelings.
pub const MAX_MAPPINGS: usize = 256;
/// Largest interchangeable group whose orderings are tried exhaustively.
const MAX_GROUP_SIZE: usize = 6;
const MAX_REASSIGNMENT_ROUNDS: usize = 8;
const EXACT_MATCH: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct AtomInvariant {
    atomic_number: u8,
    degree: usize,
    hydrogens: usize,
    formal_charge: i8,
    is_aromatic: bool,
    isotope: u16,
}

fn invariant(mol: &Molecule, atom: usize) -> AtomInvariant {
    let a = &mol.atoms()[atom];
    AtomInvariant {
        atomic_number: a.element.atomic_number(),
        degree: mol.degree(atom),
        hydrogens: a.attached_hydrogens() as usize + mol.hydrogen_neighbor_count(atom),
        formal_charge: a.formal_charge,
        is_aromatic: a.is_aromatic,
        isotope: a.isotope.unwrap_or(0),
    }
}

#[inline]
fn bond_code(order: BondOrder) -> u8 {
    match order {
        BondOrder::Single => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
        BondOrder::Aromatic => 4,
    }
}

/// Dense ranks of `keys`: equal keys share a rank, ranks follow key order.
fn dense_ranks<T: Ord>(keys: &[T]) -> Vec<usize> {
    let mut distinct: Vec<&T> = keys.iter().collect();
    distinct.sort();
    distinct.dedup();
    keys.iter()
        .map(|k| distinct.binary_search(&k).unwrap_or(0))
        .collect()
}

fn class_count(classes: &[usize]) -> usize {
    classes.iter().copied().max().map_or(0, |m| m + 1)
}

/// Topological equivalence class of every atom, by iterative refinement of element,
/// degree, charge and hydrogen count over bonded neighbourhoods.
pub fn equivalence_classes(mol: &Molecule) -> Vec<usize> {
    let invariants: Vec<AtomInvariant> = (0..mol.atom_count()).map(|i| invariant(mol, i)).collect();
    let mut classes = dense_ranks(&invariants);
    loop {
        let keys: Vec<(usize, Vec<(usize, u8)>)> = (0..mol.atom_count())
            .map(|atom| {
                let mut environment: Vec<(usize, u8)> = mol
                    .neighbors(atom)
                    .iter()
                    .map(|&(nb, bond)| (classes[nb], bond_code(mol.bonds()[bond].order)))
                    .collect();
                environment.sort_unstable();
                (classes[atom], environment)
            })
            .collect();
        let refined = dense_ranks(&keys);
        if class_count(&refined) == class_count(&classes) {
            return classes;
        }
        classes = refined;
    }
}

/// A hydrogen hanging off a non-hydrogen atom. These follow their parent in every relabeling.
fn is_pendant_hydrogen(mol: &Molecule, atom: usize) -> bool {
    mol.atoms()[atom].is_hydrogen()
        && mol.degree(atom) == 1
        && mol
            .neighbor_indices(atom)
            .all(|parent| !mol.atoms()[parent].is_hydrogen())
}

/// Skeleton atoms in breadth-first order per fragment, so each atom is matched after a
/// bonded predecessor whenever it has one.
fn skeleton_order(mol: &Molecule) -> Vec<usize> {
    let mut seen = vec![false; mol.atom_count()];
    let mut order = Vec::new();
    for start in 0..mol.atom_count() {
        if seen[start] || is_pendant_hydrogen(mol, start) {
            continue;
        }
        seen[start] = true;
        let mut cursor = order.len();
        order.push(start);
        while cursor < order.len() {
            let atom = order[cursor];
            cursor += 1;
            for nb in mol.neighbor_indices(atom) {
                if !seen[nb] && !is_pendant_hydrogen(mol, nb) {
                    seen[nb] = true;
                    order.push(nb);
                }
            }
        }
    }
    order
}

struct AutomorphismSearch<'a> {
    mol: &'a Molecule,
    classes: &'a [usize],
    order: &'a [usize],
    members: BTreeMap<usize, Vec<usize>>,
    image: Vec<usize>,
    used: Vec<bool>,
    found: Vec<Vec<usize>>,
}

impl<'a> AutomorphismSearch<'a> {
    fn new(mol: &'a Molecule, classes: &'a [usize], order: &'a [usize]) -> Self {
        let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for &atom in order {
            members.entry(classes[atom]).or_default().push(atom);
        }
        Self {
            mol,
            classes,
            order,
            members,
            image: vec![usize::MAX; mol.atom_count()],
            used: vec![false; mol.atom_count()],
            found: Vec::new(),
        }
    }

    fn bond_order(&self, a: usize, b: usize) -> Option<BondOrder> {
        self.mol.bond_between(a, b).map(|(_, bond)| bond.order)
    }

    fn feasible(&self, depth: usize, candidate: usize) -> bool {
        let atom = self.order[depth];
        !self.used[candidate]
            && self.order[..depth].iter().all(|&prev| {
                self.bond_order(atom, prev) == self.bond_order(candidate, self.image[prev])
            })
    }

    fn extend(&mut self, depth: usize) {
        if self.found.len() >= MAX_MAPPINGS {
            return;
        }
        if depth == self.order.len() {
            self.found.push(self.image.clone());
            return;
        }
        let atom = self.order[depth];
        let peers = self
            .members
            .get(&self.classes[atom])
            .cloned()
            .unwrap_or_default();
        let candidates = std::iter::once(atom).chain(peers.into_iter().filter(|&p| p != atom));
        for candidate in candidates {
            if self.feasible(depth, candidate) {
                self.image[atom] = candidate;
                self.used[candidate] = true;
                self.extend(depth + 1);
                self.used[candidate] = false;
                self.image[atom] = usize::MAX;
            }
        }
    }
}

/// Atom relabelings that leave a molecular graph unchanged, used to compare structures
/// without counting swapped equivalent atoms as motion.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomSymmetry {
    /// Full relabelings, identity first. `mapping[i]` is the atom that plays the role of `i`.
    mappings: Vec<Vec<usize>>,
    /// Terminal atoms that share a parent and a class.
    interchangeable: Vec<Vec<usize>>,
}

impl AtomSymmetry {
    /// No symmetry: atoms correspond by index only.
    pub fn identity(atom_count: usize) -> Self {
        Self {
            mappings: vec![(0..atom_count).collect()],
            interchangeable: Vec::new(),
        }
    }

    pub fn perceive(mol: &Molecule) -> Self {
        let classes = equivalence_classes(mol);
        let order = skeleton_order(mol);
        let mut search = AutomorphismSearch::new(mol, &classes, &order);
        search.extend(0);
        if search.found.len() >= MAX_MAPPINGS {
            debug!(limit = MAX_MAPPINGS, "Skeleton relabelings truncated.");
        }

        let pendant: Vec<Vec<usize>> = (0..mol.atom_count())
            .map(|atom| {
                mol.neighbor_indices(atom)
                    .filter(|&nb| is_pendant_hydrogen(mol, nb))
                    .sorted()
                    .collect()
            })
            .collect();
        let mut mappings: Vec<Vec<usize>> = search
            .found
            .iter()
            .map(|image| {
                let mut mapping: Vec<usize> = (0..mol.atom_count()).collect();
                for &atom in &order {
                    mapping[atom] = image[atom];
                    for (&h, &h_image) in pendant[atom].iter().zip(&pendant[image[atom]]) {
                        mapping[h] = h_image;
                    }
                }
                mapping
            })
            .collect();
        if mappings.is_empty() {
            mappings.push((0..mol.atom_count()).collect());
        }

        let interchangeable = (0..mol.atom_count())
            .flat_map(|parent| {
                let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
                for nb in mol.neighbor_indices(parent).filter(|&nb| mol.degree(nb) == 1) {
                    groups.entry(classes[nb]).or_default().push(nb);
                }
                groups
                    .into_values()
                    .filter(|group| group.len() > 1)
                    .map(|group| group.into_iter().sorted().collect())
                    .collect::<Vec<Vec<usize>>>()
            })
            .collect();

        Self {
            mappings,
            interchangeable,
        }
    }

    pub fn mappings(&self) -> &[Vec<usize>] {
        &self.mappings
    }

    pub fn interchangeable(&self) -> &[Vec<usize>] {
        &self.interchangeable
    }

    /// Smallest best-fit RMSD over every symmetry-equivalent atom correspondence.
    pub fn best_rmsd(
        &self,
        reference: &[Point3<f64>],
        mobile: &[Point3<f64>],
    ) -> Result<f64, AlignmentError> {
        if reference.len() != mobile.len() {
            return Err(AlignmentError::LengthMismatch(reference.len(), mobile.len()));
        }
        let mut best = f64::INFINITY;
        for mapping in &self.mappings {
            if mapping.len() != reference.len() {
                return Err(AlignmentError::LengthMismatch(mapping.len(), reference.len()));
            }
            best = best.min(self.refined_rmsd(reference, mobile, mapping.clone())?);
            if best < EXACT_MATCH {
                break;
            }
        }
        Ok(best)
    }

    /// Fits under `mapping`, then reorders interchangeable groups onto their nearest
    /// reference atoms and refits until the assignment is stable.
    fn refined_rmsd(
        &self,
        reference: &[Point3<f64>],
        mobile: &[Point3<f64>],
        mut mapping: Vec<usize>,
    ) -> Result<f64, AlignmentError> {
        let mut fit = superpose(reference, &permuted(mobile, &mapping))?;
        for _ in 0..MAX_REASSIGNMENT_ROUNDS {
            let mut changed = false;
            for group in &self.interchangeable {
                changed |= reassign(group, &mut mapping, reference, mobile, &fit);
            }
            if !changed {
                break;
            }
            fit = superpose(reference, &permuted(mobile, &mapping))?;
        }
        Ok(fit.rmsd)
    }
}

fn permuted(mobile: &[Point3<f64>], mapping: &[usize]) -> Vec<Point3<f64>> {
    mapping.iter().map(|&m| mobile[m]).collect()
}

/// Reorders the images of `group` to minimize their squared distance to the reference under
/// `fit`. Returns whether the mapping changed.
fn reassign(
    group: &[usize],
    mapping: &mut [usize],
    reference: &[Point3<f64>],
    mobile: &[Point3<f64>],
    fit: &Superposition,
) -> bool {
    if group.len() > MAX_GROUP_SIZE {
        return false;
    }
    let images: Vec<usize> = group.iter().map(|&g| mapping[g]).collect();
    let cost = |order: &[usize]| -> f64 {
        group
            .iter()
            .zip(order)
            .map(|(&g, &m)| (fit.apply(&mobile[m]) - reference[g]).norm_squared())
            .sum()
    };
    let current = cost(&images);
    let Some((best_cost, best_order)) = images
        .iter()
        .copied()
        .permutations(images.len())
        .map(|order| (cost(&order), order))
        .min_by(|a, b| a.0.total_cmp(&b.0))
    else {
        return false;
    };
    if best_cost + EXACT_MATCH >= current {
        return false;
    }
    for (&g, m) in group.iter().zip(best_order) {
        mapping[g] = m;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::hydrogens::add_hydrogens;
    use crate::core::chem::sanitize::sanitize;
    use crate::core::io::smiles::parse_smiles;
    use nalgebra::{Rotation3, Vector3};

    fn prepared(smiles: &str) -> Molecule {
        add_hydrogens(&sanitize(&parse_smiles(smiles).unwrap()).molecule)
    }

    /// Staggered ethane along x with the carbons first, then three hydrogens per carbon.
    fn ethane(mol: &Molecule, twist: f64) -> Vec<Point3<f64>> {
        let mut positions = vec![Point3::origin(); mol.atom_count()];
        positions[0] = Point3::new(0.0, 0.0, 0.0);
        positions[1] = Point3::new(1.53, 0.0, 0.0);
        for (carbon, offset, direction) in [(0, 0.0, -1.0), (1, 60.0 + twist, 1.0)] {
            let hydrogens: Vec<usize> = mol
                .neighbor_indices(carbon)
                .filter(|&n| mol.atoms()[n].is_hydrogen())
                .sorted()
                .collect();
            for (k, h) in hydrogens.into_iter().enumerate() {
                let angle = (offset + 120.0 * k as f64).to_radians();
                positions[h] = positions[carbon]
                    + Vector3::new(direction * 0.36, 1.03 * angle.cos(), 1.03 * angle.sin());
            }
        }
        positions
    }

    #[test]
    fn equivalent_atoms_share_a_class() {
        let mol = prepared("CC(C)O");
        let classes = equivalence_classes(&mol);
        assert_eq!(classes[0], classes[2]);
        assert_ne!(classes[0], classes[1]);
        assert_ne!(classes[1], classes[3]);
    }

    #[test]
    fn ethane_relabelings_swap_the_carbons_with_their_hydrogens() {
        let mol = prepared("CC");
        let symmetry = AtomSymmetry::perceive(&mol);
        assert_eq!(symmetry.mappings().len(), 2);
        assert_eq!(symmetry.mappings()[0], (0..8).collect::<Vec<_>>());
        let swapped = &symmetry.mappings()[1];
        assert_eq!(&swapped[..2], &[1, 0]);
        for h in 2..8 {
            let parent = mol.neighbor_indices(h).next().unwrap();
            assert!(mol.bond_between(swapped[h], swapped[parent]).is_some());
        }
        assert_eq!(symmetry.interchangeable().len(), 2);
        assert!(symmetry.interchangeable().iter().all(|g| g.len() == 3));
    }

    #[test]
    fn rotated_methyl_hydrogens_count_as_the_same_structure() {
        let mol = prepared("CC");
        let reference = ethane(&mol, 0.0);
        let relabeled = ethane(&mol, 120.0);
        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), 1.1);
        let moved: Vec<_> = relabeled
            .iter()
            .map(|p| rotation * p + Vector3::new(3.0, -1.0, 0.5))
            .collect();

        let plain = AtomSymmetry::identity(mol.atom_count())
            .best_rmsd(&reference, &moved)
            .unwrap();
        let symmetric = AtomSymmetry::perceive(&mol)
            .best_rmsd(&reference, &moved)
            .unwrap();
        assert!(plain > 0.3, "index pairing sees motion: {plain}");
        assert!(symmetric < 1e-6, "symmetric rmsd {symmetric}");
    }

    #[test]
    fn symmetric_rmsd_never_exceeds_index_pairing() {
        let mol = prepared("CC");
        let reference = ethane(&mol, 0.0);
        let eclipsed = ethane(&mol, 60.0);
        let plain = AtomSymmetry::identity(mol.atom_count())
            .best_rmsd(&reference, &eclipsed)
            .unwrap();
        let symmetric = AtomSymmetry::perceive(&mol)
            .best_rmsd(&reference, &eclipsed)
            .unwrap();
        assert!(symmetric <= plain + 1e-12);
        assert!(symmetric > 0.1, "eclipsed ethane is a different shape");
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let symmetry = AtomSymmetry::identity(3);
        let err = symmetry
            .best_rmsd(&[Point3::origin(); 3], &[Point3::origin(); 2])
            .unwrap_err();
        assert_eq!(err, AlignmentError::LengthMismatch(3, 2));
    }
}
