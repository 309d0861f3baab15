use super::element::Element;

/// Orbital hybridization assigned during chemistry perception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Hybridization {
    S,
    Sp,
    Sp2,
    Sp3,
    #[default]
    Unspecified,
}

/// A single atom of a molecular graph.
///
/// Hydrogen bookkeeping distinguishes hydrogens fixed by the input notation
/// (`explicit_hydrogens`, set for bracket atoms) from those inferred by valence
/// perception (`implicit_hydrogens`). Atoms created by hydrogen addition are ordinary
/// `Element::H` atoms with both counts at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub formal_charge: i8,
    pub is_aromatic: bool,
    pub isotope: Option<u16>,
    /// Hydrogen count written inside a bracket atom; `None` when the count is implied.
    pub explicit_hydrogens: Option<u8>,
    pub implicit_hydrogens: u8,
    pub radical_electrons: u8,
    pub hybridization: Hybridization,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            formal_charge: 0,
            is_aromatic: false,
            isotope: None,
            explicit_hydrogens: None,
            implicit_hydrogens: 0,
            radical_electrons: 0,
            hybridization: Hybridization::Unspecified,
        }
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.formal_charge = charge;
        self
    }

    pub fn aromatic(mut self, is_aromatic: bool) -> Self {
        self.is_aromatic = is_aromatic;
        self
    }

    /// Total number of hydrogens carried by this atom that are not separate graph nodes.
    #[inline]
    pub fn attached_hydrogens(&self) -> u8 {
        self.explicit_hydrogens.unwrap_or(0) + self.implicit_hydrogens
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        self.element == Element::H
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_is_neutral_and_unperceived() {
        let atom = Atom::new(Element::C);
        assert_eq!(atom.formal_charge, 0);
        assert!(!atom.is_aromatic);
        assert_eq!(atom.attached_hydrogens(), 0);
        assert_eq!(atom.hybridization, Hybridization::Unspecified);
    }

    #[test]
    fn attached_hydrogens_sums_explicit_and_implicit_counts() {
        let mut atom = Atom::new(Element::N).with_charge(1);
        atom.explicit_hydrogens = Some(1);
        atom.implicit_hydrogens = 2;
        assert_eq!(atom.attached_hydrogens(), 3);
    }
}
