use super::atom::Atom;
use super::stereo::{DoubleBondStereo, TetrahedralCenter};
use super::topology::{Bond, BondOrder};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("Atom index {index} is out of range for a molecule with {count} atoms")]
    AtomOutOfRange { index: usize, count: usize },
    #[error("An atom cannot be bonded to itself (atom {0})")]
    SelfBond(usize),
    #[error("Atoms {0} and {1} are already bonded")]
    DuplicateBond(usize, usize),
}

/// A molecular graph: atoms, bonds and an adjacency index, plus an optional display name.
///
/// Atom and bond indices are dense and stable; the adjacency list stores
/// `(neighbor_index, bond_index)` pairs in insertion order. Stereo annotations refer to
/// atoms by index and survive any transformation that only appends atoms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    adjacency: Vec<Vec<(usize, usize)>>,
    tetrahedral: Vec<TetrahedralCenter>,
    double_bonds: Vec<DoubleBondStereo>,
    pub name: Option<String>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.adjacency.push(Vec::new());
        self.atoms.len() - 1
    }

    pub fn add_bond(
        &mut self,
        atom1: usize,
        atom2: usize,
        order: BondOrder,
    ) -> Result<usize, MoleculeError> {
        let count = self.atoms.len();
        for index in [atom1, atom2] {
            if index >= count {
                return Err(MoleculeError::AtomOutOfRange { index, count });
            }
        }
        if atom1 == atom2 {
            return Err(MoleculeError::SelfBond(atom1));
        }
        if self.bond_between(atom1, atom2).is_some() {
            return Err(MoleculeError::DuplicateBond(atom1, atom2));
        }

        let bond_index = self.bonds.len();
        self.bonds.push(Bond::new(atom1, atom2, order));
        self.adjacency[atom1].push((atom2, bond_index));
        self.adjacency[atom2].push((atom1, bond_index));
        Ok(bond_index)
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn atom_mut(&mut self, index: usize) -> Option<&mut Atom> {
        self.atoms.get_mut(index)
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn bond(&self, index: usize) -> Option<&Bond> {
        self.bonds.get(index)
    }

    pub fn set_bond_order(&mut self, index: usize, order: BondOrder) {
        if let Some(bond) = self.bonds.get_mut(index) {
            bond.order = order;
        }
    }

    pub fn tetrahedral_centers(&self) -> &[TetrahedralCenter] {
        &self.tetrahedral
    }

    pub fn add_tetrahedral_center(&mut self, center: TetrahedralCenter) {
        self.tetrahedral.push(center);
    }

    pub fn double_bond_stereo(&self) -> &[DoubleBondStereo] {
        &self.double_bonds
    }

    pub fn add_double_bond_stereo(&mut self, stereo: DoubleBondStereo) {
        self.double_bonds.push(stereo);
    }

    /// `(neighbor_index, bond_index)` pairs for the given atom.
    pub fn neighbors(&self, atom: usize) -> &[(usize, usize)] {
        self.adjacency.get(atom).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn neighbor_indices(&self, atom: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors(atom).iter().map(|&(n, _)| n)
    }

    #[inline]
    pub fn degree(&self, atom: usize) -> usize {
        self.neighbors(atom).len()
    }

    pub fn bond_between(&self, atom1: usize, atom2: usize) -> Option<(usize, &Bond)> {
        self.neighbors(atom1)
            .iter()
            .find(|&&(n, _)| n == atom2)
            .map(|&(_, b)| (b, &self.bonds[b]))
    }

    /// Number of hydrogens bonded to `atom` as separate graph nodes.
    pub fn hydrogen_neighbor_count(&self, atom: usize) -> usize {
        self.neighbor_indices(atom)
            .filter(|&n| self.atoms[n].is_hydrogen())
            .count()
    }

    /// Connected components as sorted lists of atom indices.
    pub fn fragments(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.atoms.len()];
        let mut fragments = Vec::new();
        for start in 0..self.atoms.len() {
            if seen[start] {
                continue;
            }
            let mut stack = vec![start];
            let mut fragment = Vec::new();
            seen[start] = true;
            while let Some(current) = stack.pop() {
                fragment.push(current);
                for n in self.neighbor_indices(current) {
                    if !seen[n] {
                        seen[n] = true;
                        stack.push(n);
                    }
                }
            }
            fragment.sort_unstable();
            fragments.push(fragment);
        }
        fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;

    fn ethanol_heavy_atoms() -> Molecule {
        let mut mol = Molecule::new();
        let c1 = mol.add_atom(Atom::new(Element::C));
        let c2 = mol.add_atom(Atom::new(Element::C));
        let o = mol.add_atom(Atom::new(Element::O));
        mol.add_bond(c1, c2, BondOrder::Single).unwrap();
        mol.add_bond(c2, o, BondOrder::Single).unwrap();
        mol
    }

    #[test]
    fn add_bond_updates_adjacency_on_both_atoms() {
        let mol = ethanol_heavy_atoms();
        assert_eq!(mol.degree(0), 1);
        assert_eq!(mol.degree(1), 2);
        assert_eq!(mol.neighbor_indices(1).collect::<Vec<_>>(), vec![0, 2]);
        assert!(mol.bond_between(2, 1).is_some());
        assert!(mol.bond_between(0, 2).is_none());
    }

    #[test]
    fn add_bond_rejects_self_duplicate_and_out_of_range_bonds() {
        let mut mol = ethanol_heavy_atoms();
        assert_eq!(
            mol.add_bond(1, 1, BondOrder::Single),
            Err(MoleculeError::SelfBond(1))
        );
        assert_eq!(
            mol.add_bond(1, 0, BondOrder::Double),
            Err(MoleculeError::DuplicateBond(1, 0))
        );
        assert_eq!(
            mol.add_bond(0, 9, BondOrder::Single),
            Err(MoleculeError::AtomOutOfRange { index: 9, count: 3 })
        );
    }

    #[test]
    fn fragments_separates_disconnected_components() {
        let mut mol = ethanol_heavy_atoms();
        let na = mol.add_atom(Atom::new(Element::Na).with_charge(1));
        let fragments = mol.fragments();
        assert_eq!(fragments, vec![vec![0, 1, 2], vec![na]]);
    }
}
