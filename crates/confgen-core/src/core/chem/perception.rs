use crate::core::models::atom::Hybridization;
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;

/// Coordination number including hydrogens that are not yet graph nodes.
pub fn total_degree(mol: &Molecule, atom: usize) -> usize {
    mol.degree(atom) + mol.atom(atom).map_or(0, |a| a.attached_hydrogens() as usize)
}

fn multiple_bond_counts(mol: &Molecule, atom: usize) -> (usize, usize, usize) {
    let (mut double, mut triple, mut aromatic) = (0, 0, 0);
    for &(_, bond_index) in mol.neighbors(atom) {
        match mol.bond(bond_index).map(|b| b.order) {
            Some(BondOrder::Double) => double += 1,
            Some(BondOrder::Triple) => triple += 1,
            Some(BondOrder::Aromatic) => aromatic += 1,
            _ => {}
        }
    }
    (double, triple, aromatic)
}

fn is_unsaturated(mol: &Molecule, atom: usize) -> bool {
    let (double, triple, aromatic) = multiple_bond_counts(mol, atom);
    double + triple + aromatic > 0 || mol.atom(atom).is_some_and(|a| a.is_aromatic)
}

/// Hybridization from local bonding only.
///
/// Triple bonds and cumulated double bonds on second-period atoms give `Sp`; aromatic
/// atoms, double bonds and trivalent nitrogen conjugated to a multiple bond give `Sp2`;
/// four-coordinate centres are `Sp3` and hypervalent centres are left `Unspecified`.
pub fn hybridization(mol: &Molecule, atom: usize) -> Hybridization {
    let Some(a) = mol.atom(atom) else {
        return Hybridization::Unspecified;
    };
    let degree = total_degree(mol, atom);
    if a.element == Element::H {
        return Hybridization::S;
    }
    if degree == 0 {
        return Hybridization::Unspecified;
    }
    if degree > 4 {
        return Hybridization::Unspecified;
    }
    if degree == 4 {
        return Hybridization::Sp3;
    }

    let (double, triple, aromatic) = multiple_bond_counts(mol, atom);
    if triple > 0 || (a.element.period() == 2 && double >= 2 && degree == 2) {
        return Hybridization::Sp;
    }
    if a.is_aromatic || aromatic > 0 || double > 0 {
        return Hybridization::Sp2;
    }
    if a.element == Element::N
        && degree == 3
        && mol.neighbor_indices(atom).any(|n| is_unsaturated(mol, n))
    {
        return Hybridization::Sp2;
    }
    Hybridization::Sp3
}

/// Assigns [`hybridization`] to every atom in place.
pub fn assign_hybridization(mol: &mut Molecule) {
    let assigned: Vec<_> = (0..mol.atom_count()).map(|i| hybridization(mol, i)).collect();
    for (atom, hyb) in mol.atoms_mut().iter_mut().zip(assigned) {
        atom.hybridization = hyb;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::sanitize::sanitize;
    use crate::core::io::smiles::parse_smiles;

    fn hybridizations(smiles: &str) -> Vec<Hybridization> {
        let outcome = sanitize(&parse_smiles(smiles).unwrap());
        outcome.molecule.atoms().iter().map(|a| a.hybridization).collect()
    }

    #[test]
    fn saturated_carbon_is_sp3() {
        assert_eq!(hybridizations("CC"), vec![Hybridization::Sp3; 2]);
    }

    #[test]
    fn alkene_alkyne_and_allene_centres() {
        assert_eq!(hybridizations("C=C"), vec![Hybridization::Sp2; 2]);
        assert_eq!(hybridizations("C#C"), vec![Hybridization::Sp; 2]);
        assert_eq!(hybridizations("C=C=C")[1], Hybridization::Sp);
    }

    #[test]
    fn sulfone_sulfur_is_tetrahedral() {
        assert_eq!(hybridizations("CS(=O)(=O)C")[1], Hybridization::Sp3);
    }

    #[test]
    fn amide_nitrogen_is_planar() {
        let hyb = hybridizations("CC(=O)N");
        assert_eq!(hyb[3], Hybridization::Sp2);
        assert_eq!(hybridizations("CN")[1], Hybridization::Sp3);
    }

    #[test]
    fn aromatic_atoms_are_sp2() {
        assert!(hybridizations("c1ccccc1")
            .iter()
            .all(|&h| h == Hybridization::Sp2));
    }
}
