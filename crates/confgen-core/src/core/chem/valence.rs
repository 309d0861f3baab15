use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Atom {atom} ({element}) has valence {valence}, allowed {allowed:?}")]
pub struct ValenceError {
    pub atom: usize,
    pub element: Element,
    pub valence: u8,
    pub allowed: Vec<u8>,
}

/// Valences permitted for an atom given its formal charge.
///
/// Charged atoms take the valences of the isoelectronic element in the same period
/// (N+ like C, O- like F, B- like C). An empty result exempts the atom from checks.
pub fn allowed_valences(atom: &Atom) -> &'static [u8] {
    if atom.formal_charge == 0 {
        return atom.element.default_valences();
    }
    atom.element
        .isoelectronic_shift(-atom.formal_charge)
        .map(Element::default_valences)
        .unwrap_or(&[])
}

/// Bond-derived valence of an atom, counting hydrogens that are separate graph nodes.
///
/// Returns `(valence, alternate)`. For aromatic atoms `valence` assumes the atom
/// contributes one localized pi bond to its ring and `alternate` assumes it donates a
/// lone pair instead; for other atoms `alternate` is `None`.
pub fn bond_valence(mol: &Molecule, atom: usize) -> (u8, Option<u8>) {
    let mut localized: u8 = 0;
    let mut aromatic_bonds: u8 = 0;
    let mut exocyclic_multiple = false;
    for &(_, bond_index) in mol.neighbors(atom) {
        let Some(bond) = mol.bond(bond_index) else {
            continue;
        };
        match bond.order {
            BondOrder::Aromatic => aromatic_bonds += 1,
            order => {
                if order != BondOrder::Single {
                    exocyclic_multiple = true;
                }
                localized += order.localized_valence();
            }
        }
    }

    if aromatic_bonds == 0 {
        return (localized, None);
    }
    let sigma = localized + aromatic_bonds;
    if aromatic_bonds >= 2 && !exocyclic_multiple {
        (sigma + 1, Some(sigma))
    } else {
        (sigma, None)
    }
}

/// Hydrogens needed to bring an organic-subset atom to its lowest permitted valence.
///
/// Returns `None` when the bonds alone already exceed every permitted valence.
pub fn implicit_hydrogen_count(atom: &Atom, valence: u8, alternate: Option<u8>) -> Option<u8> {
    let allowed = allowed_valences(atom);
    if allowed.is_empty() {
        return Some(0);
    }
    if atom.is_aromatic
        && (allowed.contains(&valence) || alternate.is_some_and(|v| allowed.contains(&v)))
    {
        return Some(0);
    }
    allowed
        .iter()
        .find(|&&v| v >= valence)
        .map(|&v| v - valence)
}

/// Unpaired electrons on an atom whose hydrogen count is fixed by the input.
pub fn radical_electron_count(atom: &Atom, total_valence: u8, degree: usize) -> u8 {
    if atom.is_aromatic || atom.explicit_hydrogens.is_none() {
        return 0;
    }
    let allowed = allowed_valences(atom);
    if allowed.is_empty() {
        if degree > 0 {
            return 0;
        }
        let electrons = atom.element.outer_electrons() as i16 - atom.formal_charge as i16;
        return if electrons > 0 { (electrons % 2) as u8 } else { 0 };
    }
    allowed
        .iter()
        .find(|&&v| v >= total_valence)
        .map(|&v| v - total_valence)
        .unwrap_or(0)
}

/// Strict valence check for one atom with its hydrogens already assigned.
pub fn check_atom_valence(mol: &Molecule, index: usize) -> Result<(), ValenceError> {
    let Some(atom) = mol.atom(index) else {
        return Ok(());
    };
    let allowed = allowed_valences(atom);
    if allowed.is_empty() {
        return Ok(());
    }
    let (valence, alternate) = bond_valence(mol, index);
    let hydrogens = atom.attached_hydrogens();
    let total = valence + hydrogens;
    let alternate_total = alternate.map(|v| v + hydrogens);
    if allowed.contains(&total) || alternate_total.is_some_and(|v| allowed.contains(&v)) {
        return Ok(());
    }
    Err(ValenceError {
        atom: index,
        element: atom.element,
        valence: total,
        allowed: allowed.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles::parse_smiles;

    #[test]
    fn charged_atoms_use_isoelectronic_valences() {
        assert_eq!(allowed_valences(&Atom::new(Element::N).with_charge(1)), &[4]);
        assert_eq!(allowed_valences(&Atom::new(Element::O).with_charge(-1)), &[1]);
        assert_eq!(allowed_valences(&Atom::new(Element::Na).with_charge(1)), &[0]);
        assert_eq!(allowed_valences(&Atom::new(Element::C)), &[4]);
    }

    #[test]
    fn aromatic_valence_offers_pi_and_lone_pair_alternatives() {
        let benzene = parse_smiles("c1ccccc1").unwrap();
        assert_eq!(bond_valence(&benzene, 0), (3, Some(2)));
        let naphthalene = parse_smiles("c1ccc2ccccc2c1").unwrap();
        assert_eq!(bond_valence(&naphthalene, 3), (4, Some(3)));
    }

    #[test]
    fn implicit_hydrogens_fill_to_lowest_permitted_valence() {
        let mol = parse_smiles("CC(=O)O").unwrap();
        let count = |i: usize| {
            let (v, alt) = bond_valence(&mol, i);
            implicit_hydrogen_count(&mol.atoms()[i], v, alt)
        };
        assert_eq!(count(0), Some(3));
        assert_eq!(count(1), Some(0));
        assert_eq!(count(2), Some(0));
        assert_eq!(count(3), Some(1));
    }

    #[test]
    fn aromatic_heteroatoms_take_no_hydrogens() {
        for smiles in ["c1ccncc1", "c1ccoc1", "c1ccsc1"] {
            let mol = parse_smiles(smiles).unwrap();
            let hetero = mol
                .atoms()
                .iter()
                .position(|a| a.element != Element::C)
                .unwrap();
            let (v, alt) = bond_valence(&mol, hetero);
            assert_eq!(
                implicit_hydrogen_count(&mol.atoms()[hetero], v, alt),
                Some(0),
                "{smiles}"
            );
        }
    }

    #[test]
    fn overloaded_carbon_has_no_permitted_hydrogen_count() {
        let mol = parse_smiles("C(C)(C)(C)(C)C").unwrap();
        let (v, alt) = bond_valence(&mol, 0);
        assert_eq!(implicit_hydrogen_count(&mol.atoms()[0], v, alt), None);
    }

    #[test]
    fn bracket_radicals_count_missing_valence() {
        let methyl = parse_smiles("[CH3]").unwrap();
        assert_eq!(radical_electron_count(&methyl.atoms()[0], 3, 0), 1);
        let methylene = parse_smiles("[CH2]").unwrap();
        assert_eq!(radical_electron_count(&methylene.atoms()[0], 2, 0), 2);
        let ammonium = parse_smiles("[NH4+]").unwrap();
        assert_eq!(radical_electron_count(&ammonium.atoms()[0], 4, 0), 0);
        let sodium = parse_smiles("[Na+]").unwrap();
        assert_eq!(radical_electron_count(&sodium.atoms()[0], 0, 0), 0);
    }

    #[test]
    fn organic_subset_atoms_never_carry_radicals() {
        let mol = parse_smiles("C").unwrap();
        assert_eq!(radical_electron_count(&mol.atoms()[0], 0, 0), 0);
    }
}
