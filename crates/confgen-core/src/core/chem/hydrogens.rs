use crate::core::models::atom::{Atom, Hybridization};
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;

/// Converts every hydrogen carried as a count into an explicit `H` atom.
///
/// New hydrogens are appended after all existing atoms, in parent order, each joined to its
/// parent by a single bond. Parents keep `explicit_hydrogens = Some(0)` so later perception
/// does not infer them again.
pub fn add_hydrogens(mol: &Molecule) -> Molecule {
    let mut result = mol.clone();
    let parents: Vec<(usize, u8)> = mol
        .atoms()
        .iter()
        .enumerate()
        .filter(|(_, a)| a.attached_hydrogens() > 0)
        .map(|(i, a)| (i, a.attached_hydrogens()))
        .collect();

    for (parent, count) in parents {
        if let Some(atom) = result.atom_mut(parent) {
            atom.explicit_hydrogens = Some(0);
            atom.implicit_hydrogens = 0;
        }
        for _ in 0..count {
            let mut hydrogen = Atom::new(Element::H);
            hydrogen.explicit_hydrogens = Some(0);
            hydrogen.hybridization = Hybridization::S;
            let index = result.add_atom(hydrogen);
            // Both atoms exist and the hydrogen is fresh, so the bond cannot be rejected.
            let _ = result.add_bond(parent, index, BondOrder::Single);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::sanitize::sanitize;
    use crate::core::io::smiles::parse_smiles;

    fn with_hydrogens(smiles: &str) -> Molecule {
        add_hydrogens(&sanitize(&parse_smiles(smiles).unwrap()).molecule)
    }

    #[test]
    fn water_gains_two_hydrogens_after_oxygen() {
        let mol = with_hydrogens("O");
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.atoms()[0].element, Element::O);
        assert!(mol.atoms()[1..].iter().all(Atom::is_hydrogen));
        assert_eq!(mol.degree(0), 2);
        assert_eq!(mol.atoms()[0].attached_hydrogens(), 0);
    }

    #[test]
    fn ethanol_has_nine_atoms_with_heavy_atoms_first() {
        let mol = with_hydrogens("CCO");
        assert_eq!(mol.atom_count(), 9);
        assert_eq!(mol.hydrogen_neighbor_count(0), 3);
        assert_eq!(mol.hydrogen_neighbor_count(1), 2);
        assert_eq!(mol.hydrogen_neighbor_count(2), 1);
        assert!(mol.atoms()[..3].iter().all(|a| !a.is_hydrogen()));
    }

    #[test]
    fn bracket_hydrogen_counts_are_materialized() {
        let mol = with_hydrogens("[NH4+]");
        assert_eq!(mol.atom_count(), 5);
        assert_eq!(mol.atoms()[0].formal_charge, 1);
    }

    #[test]
    fn adding_hydrogens_twice_is_idempotent() {
        let once = with_hydrogens("CC=O");
        let twice = add_hydrogens(&once);
        assert_eq!(once.atom_count(), twice.atom_count());
    }
}
