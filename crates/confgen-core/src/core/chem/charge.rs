use crate::core::models::molecule::Molecule;
use serde::Serialize;

/// Net charge and spin multiplicity of a molecule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChargeSpinAssignment {
    pub charge: i32,
    pub spin_multiplicity: u32,
}

/// Charge is the sum of formal charges; multiplicity is the radical electron count plus one.
///
/// Operates on a sanitized graph, where radical counts have been perceived. Independent of
/// any geometry.
pub fn infer_charge_spin(mol: &Molecule) -> ChargeSpinAssignment {
    let charge = mol.atoms().iter().map(|a| a.formal_charge as i32).sum();
    let radicals: u32 = mol.atoms().iter().map(|a| a.radical_electrons as u32).sum();
    ChargeSpinAssignment {
        charge,
        spin_multiplicity: radicals + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::sanitize::sanitize;
    use crate::core::io::smiles::parse_smiles;

    fn assignment(smiles: &str) -> ChargeSpinAssignment {
        infer_charge_spin(&sanitize(&parse_smiles(smiles).unwrap()).molecule)
    }

    #[test]
    fn water_is_neutral_singlet() {
        assert_eq!(
            assignment("O"),
            ChargeSpinAssignment {
                charge: 0,
                spin_multiplicity: 1
            }
        );
    }

    #[test]
    fn ions_sum_formal_charges() {
        assert_eq!(assignment("[NH4+]").charge, 1);
        assert_eq!(assignment("CC(=O)[O-]").charge, -1);
        assert_eq!(assignment("[Na+].[Cl-]").charge, 0);
        assert_eq!(assignment("[O-]S(=O)(=O)[O-]").charge, -2);
    }

    #[test]
    fn radicals_raise_multiplicity() {
        assert_eq!(assignment("C[CH2]").spin_multiplicity, 2);
        assert_eq!(assignment("[CH2]").spin_multiplicity, 3);
        assert_eq!(assignment("[CH3].[CH3]").spin_multiplicity, 3);
    }

    #[test]
    fn assignment_does_not_depend_on_added_hydrogens() {
        let sanitized = sanitize(&parse_smiles("C[CH2]").unwrap()).molecule;
        let hydrogenated = crate::core::chem::hydrogens::add_hydrogens(&sanitized);
        assert_eq!(infer_charge_spin(&sanitized), infer_charge_spin(&hydrogenated));
    }
}
