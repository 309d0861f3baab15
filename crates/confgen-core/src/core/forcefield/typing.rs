use super::energy::ForceFieldError;
use super::kind::ForceFieldKind;
use crate::core::models::atom::{Atom, Hybridization};
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;

/// Atom classes of the MMFF-style model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MmffClass {
    CSp3,
    CSp2,
    CCarbonyl,
    CSp,
    CAromatic,
    HC,
    HO,
    HN,
    OSp3,
    OCarbonyl,
    OAromatic,
    NSp3,
    NSp2,
    /// Trigonal nitrogen conjugated to a neighbouring multiple bond (amides, anilines).
    NPlanar,
    NSp,
    NAromatic,
    F,
    Cl,
    Br,
    I,
    S,
    SAromatic,
    Si,
    P,
}

impl MmffClass {
    pub fn is_hydrogen(self) -> bool {
        matches!(self, Self::HC | Self::HO | Self::HN)
    }

    pub fn is_trigonal_nitrogen(self) -> bool {
        matches!(self, Self::NPlanar)
    }
}

fn missing(kind: ForceFieldKind, atom: usize, element: Element) -> ForceFieldError {
    ForceFieldError::MissingParameters {
        kind,
        atom,
        element,
    }
}

fn has_double_bond_to(mol: &Molecule, atom: usize, element: Element) -> bool {
    mol.neighbors(atom).iter().any(|&(n, b)| {
        mol.atoms()[n].element == element
            && mol.bond(b).is_some_and(|bond| bond.order == BondOrder::Double)
    })
}

/// Universal force field labels (`C_3`, `N_R`, ...) for every atom.
pub fn assign_uff_types(mol: &Molecule) -> Result<Vec<&'static str>, ForceFieldError> {
    mol.atoms()
        .iter()
        .enumerate()
        .map(|(index, atom)| {
            uff_label(atom).ok_or_else(|| missing(ForceFieldKind::Uff, index, atom.element))
        })
        .collect()
}

fn uff_label(atom: &Atom) -> Option<&'static str> {
    let hyb = atom.hybridization;
    Some(match atom.element {
        Element::H => "H_",
        Element::B if hyb == Hybridization::Sp2 => "B_2",
        Element::B => "B_3",
        Element::C if atom.is_aromatic => "C_R",
        Element::C => match hyb {
            Hybridization::Sp => "C_1",
            Hybridization::Sp2 => "C_2",
            _ => "C_3",
        },
        Element::N if atom.is_aromatic => "N_R",
        Element::N => match hyb {
            Hybridization::Sp => "N_1",
            Hybridization::Sp2 => "N_2",
            _ => "N_3",
        },
        Element::O if atom.is_aromatic => "O_R",
        Element::O if hyb == Hybridization::Sp2 => "O_2",
        Element::O => "O_3",
        Element::F => "F_",
        Element::Si => "Si3",
        Element::P => "P_3",
        Element::S if atom.is_aromatic => "S_R",
        Element::S if hyb == Hybridization::Sp2 => "S_2",
        Element::S => "S_3",
        Element::Cl => "Cl",
        Element::Se => "Se3",
        Element::Br => "Br",
        Element::I => "I_",
        _ => return None,
    })
}

/// MMFF-style classes for every atom of a hydrogen-complete graph.
pub fn assign_mmff_types(
    mol: &Molecule,
    kind: ForceFieldKind,
) -> Result<Vec<MmffClass>, ForceFieldError> {
    (0..mol.atom_count())
        .map(|index| {
            let atom = &mol.atoms()[index];
            mmff_class(mol, index).ok_or_else(|| missing(kind, index, atom.element))
        })
        .collect()
}

fn mmff_class(mol: &Molecule, index: usize) -> Option<MmffClass> {
    let atom = &mol.atoms()[index];
    let hyb = atom.hybridization;
    Some(match atom.element {
        Element::H => match mol.neighbor_indices(index).next().map(|n| mol.atoms()[n].element) {
            Some(Element::O) => MmffClass::HO,
            Some(Element::N) => MmffClass::HN,
            _ => MmffClass::HC,
        },
        Element::C if atom.is_aromatic => MmffClass::CAromatic,
        Element::C => match hyb {
            Hybridization::Sp => MmffClass::CSp,
            Hybridization::Sp2 if has_double_bond_to(mol, index, Element::O) => {
                MmffClass::CCarbonyl
            }
            Hybridization::Sp2 => MmffClass::CSp2,
            _ => MmffClass::CSp3,
        },
        Element::N if atom.is_aromatic => MmffClass::NAromatic,
        Element::N => match hyb {
            Hybridization::Sp => MmffClass::NSp,
            Hybridization::Sp2 if mol.neighbors(index).iter().all(|&(_, b)| {
                mol.bond(b).is_some_and(|bond| bond.order == BondOrder::Single)
            }) =>
            {
                MmffClass::NPlanar
            }
            Hybridization::Sp2 => MmffClass::NSp2,
            _ => MmffClass::NSp3,
        },
        Element::O if atom.is_aromatic => MmffClass::OAromatic,
        Element::O if hyb == Hybridization::Sp2 => MmffClass::OCarbonyl,
        Element::O => MmffClass::OSp3,
        Element::F => MmffClass::F,
        Element::Cl => MmffClass::Cl,
        Element::Br => MmffClass::Br,
        Element::I => MmffClass::I,
        Element::S if atom.is_aromatic => MmffClass::SAromatic,
        Element::S => MmffClass::S,
        Element::Si => MmffClass::Si,
        Element::P => MmffClass::P,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::hydrogens::add_hydrogens;
    use crate::core::chem::sanitize::sanitize;
    use crate::core::io::smiles::parse_smiles;

    fn prepared(smiles: &str) -> Molecule {
        add_hydrogens(&sanitize(&parse_smiles(smiles).unwrap()).molecule)
    }

    #[test]
    fn uff_labels_follow_hybridization_and_aromaticity() {
        let mol = prepared("C=CC#N");
        let types = assign_uff_types(&mol).unwrap();
        assert_eq!(&types[..4], &["C_2", "C_2", "C_1", "N_1"]);
        assert!(types[4..].iter().all(|&t| t == "H_"));

        let pyridine = assign_uff_types(&prepared("c1ccncc1")).unwrap();
        assert_eq!(pyridine[3], "N_R");
    }

    #[test]
    fn mmff_distinguishes_carbonyl_amide_and_polar_hydrogens() {
        let mol = prepared("CC(=O)NO");
        let types = assign_mmff_types(&mol, ForceFieldKind::Mmff94).unwrap();
        assert_eq!(types[0], MmffClass::CSp3);
        assert_eq!(types[1], MmffClass::CCarbonyl);
        assert_eq!(types[2], MmffClass::OCarbonyl);
        assert_eq!(types[3], MmffClass::NPlanar);
        assert_eq!(types[4], MmffClass::OSp3);
        assert!(types.contains(&MmffClass::HN));
        assert!(types.contains(&MmffClass::HO));
    }

    #[test]
    fn selenium_is_covered_by_uff_but_not_mmff() {
        let mol = prepared("C[Se]C");
        assert!(assign_uff_types(&mol).is_ok());
        let err = assign_mmff_types(&mol, ForceFieldKind::Mmff94).unwrap_err();
        assert!(matches!(
            err,
            ForceFieldError::MissingParameters {
                atom: 1,
                element: Element::Se,
                ..
            }
        ));
    }

    #[test]
    fn metal_ions_are_not_covered_by_either_model() {
        let mol = prepared("[Na+].[Cl-]");
        assert!(assign_uff_types(&mol).is_err());
        assert!(assign_mmff_types(&mol, ForceFieldKind::Mmff94s).is_err());
    }
}
