use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Chemical elements recognized by the line-notation parser and the geometry engine.
///
/// Coverage spans the main-group elements of periods one to five together with the
/// first-row transition metals that commonly appear as counter-ions or in simple
/// coordination compounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Element {
    H = 1,
    He = 2,
    Li = 3,
    Be = 4,
    B = 5,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Ne = 10,
    Na = 11,
    Mg = 12,
    Al = 13,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    Ar = 18,
    K = 19,
    Ca = 20,
    Fe = 26,
    Co = 27,
    Ni = 28,
    Cu = 29,
    Zn = 30,
    Ga = 31,
    Ge = 32,
    As = 33,
    Se = 34,
    Br = 35,
    Kr = 36,
    Rb = 37,
    Sr = 38,
    In = 49,
    Sn = 50,
    Sb = 51,
    Te = 52,
    I = 53,
    Xe = 54,
}

static SYMBOL_MAP: Map<&'static str, Element> = phf_map! {
    "H" => Element::H, "He" => Element::He, "Li" => Element::Li, "Be" => Element::Be,
    "B" => Element::B, "C" => Element::C, "N" => Element::N, "O" => Element::O,
    "F" => Element::F, "Ne" => Element::Ne, "Na" => Element::Na, "Mg" => Element::Mg,
    "Al" => Element::Al, "Si" => Element::Si, "P" => Element::P, "S" => Element::S,
    "Cl" => Element::Cl, "Ar" => Element::Ar, "K" => Element::K, "Ca" => Element::Ca,
    "Fe" => Element::Fe, "Co" => Element::Co, "Ni" => Element::Ni, "Cu" => Element::Cu,
    "Zn" => Element::Zn, "Ga" => Element::Ga, "Ge" => Element::Ge, "As" => Element::As,
    "Se" => Element::Se, "Br" => Element::Br, "Kr" => Element::Kr, "Rb" => Element::Rb,
    "Sr" => Element::Sr, "In" => Element::In, "Sn" => Element::Sn, "Sb" => Element::Sb,
    "Te" => Element::Te, "I" => Element::I, "Xe" => Element::Xe,
};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown element symbol: '{0}'")]
pub struct ParseElementError(pub String);

impl Element {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        SYMBOL_MAP.get(symbol).copied()
    }

    pub fn from_atomic_number(z: u8) -> Option<Self> {
        SYMBOL_MAP.values().copied().find(|e| e.atomic_number() == z)
    }

    #[inline]
    pub fn atomic_number(self) -> u8 {
        self as u8
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::H => "H",
            Self::He => "He",
            Self::Li => "Li",
            Self::Be => "Be",
            Self::B => "B",
            Self::C => "C",
            Self::N => "N",
            Self::O => "O",
            Self::F => "F",
            Self::Ne => "Ne",
            Self::Na => "Na",
            Self::Mg => "Mg",
            Self::Al => "Al",
            Self::Si => "Si",
            Self::P => "P",
            Self::S => "S",
            Self::Cl => "Cl",
            Self::Ar => "Ar",
            Self::K => "K",
            Self::Ca => "Ca",
            Self::Fe => "Fe",
            Self::Co => "Co",
            Self::Ni => "Ni",
            Self::Cu => "Cu",
            Self::Zn => "Zn",
            Self::Ga => "Ga",
            Self::Ge => "Ge",
            Self::As => "As",
            Self::Se => "Se",
            Self::Br => "Br",
            Self::Kr => "Kr",
            Self::Rb => "Rb",
            Self::Sr => "Sr",
            Self::In => "In",
            Self::Sn => "Sn",
            Self::Sb => "Sb",
            Self::Te => "Te",
            Self::I => "I",
            Self::Xe => "Xe",
        }
    }

    /// Valence-shell electron count for main-group elements (group number modulo 10).
    pub fn outer_electrons(self) -> u8 {
        match self {
            Self::H | Self::Li | Self::Na | Self::K | Self::Rb => 1,
            Self::He => 2,
            Self::Be | Self::Mg | Self::Ca | Self::Sr => 2,
            Self::B | Self::Al | Self::Ga | Self::In => 3,
            Self::C | Self::Si | Self::Ge | Self::Sn => 4,
            Self::N | Self::P | Self::As | Self::Sb => 5,
            Self::O | Self::S | Self::Se | Self::Te => 6,
            Self::F | Self::Cl | Self::Br | Self::I => 7,
            Self::Ne | Self::Ar | Self::Kr | Self::Xe => 8,
            Self::Fe => 8,
            Self::Co => 9,
            Self::Ni => 10,
            Self::Cu => 11,
            Self::Zn => 2,
        }
    }

    /// Allowed neutral valences in ascending order. An empty slice means the element
    /// has no well-defined covalent valence and is exempt from valence checks.
    pub fn default_valences(self) -> &'static [u8] {
        match self {
            Self::H | Self::F | Self::Li | Self::Na | Self::K | Self::Rb => &[1],
            Self::He | Self::Ne | Self::Ar | Self::Kr | Self::Xe => &[0],
            Self::Be | Self::Mg | Self::Ca | Self::Sr | Self::Zn => &[2],
            Self::B | Self::Al | Self::Ga | Self::In => &[3],
            Self::C | Self::Si | Self::Ge | Self::Sn => &[4],
            Self::N => &[3],
            Self::P | Self::As | Self::Sb => &[3, 5],
            Self::O => &[2],
            Self::S | Self::Se | Self::Te => &[2, 4, 6],
            Self::Cl | Self::Br | Self::I => &[1, 3, 5, 7],
            Self::Fe | Self::Co | Self::Ni | Self::Cu => &[],
        }
    }

    /// Single-bond covalent radius in Angstroms.
    pub fn covalent_radius(self) -> f64 {
        match self {
            Self::H => 0.31,
            Self::He => 0.28,
            Self::Li => 1.28,
            Self::Be => 0.96,
            Self::B => 0.84,
            Self::C => 0.76,
            Self::N => 0.71,
            Self::O => 0.66,
            Self::F => 0.57,
            Self::Ne => 0.58,
            Self::Na => 1.66,
            Self::Mg => 1.41,
            Self::Al => 1.21,
            Self::Si => 1.11,
            Self::P => 1.07,
            Self::S => 1.05,
            Self::Cl => 1.02,
            Self::Ar => 1.06,
            Self::K => 2.03,
            Self::Ca => 1.76,
            Self::Fe => 1.32,
            Self::Co => 1.26,
            Self::Ni => 1.24,
            Self::Cu => 1.32,
            Self::Zn => 1.22,
            Self::Ga => 1.22,
            Self::Ge => 1.20,
            Self::As => 1.19,
            Self::Se => 1.20,
            Self::Br => 1.20,
            Self::Kr => 1.16,
            Self::Rb => 2.20,
            Self::Sr => 1.95,
            Self::In => 1.42,
            Self::Sn => 1.39,
            Self::Sb => 1.39,
            Self::Te => 1.38,
            Self::I => 1.39,
            Self::Xe => 1.40,
        }
    }

    /// Van der Waals radius in Angstroms.
    pub fn vdw_radius(self) -> f64 {
        match self {
            Self::H => 1.20,
            Self::He => 1.40,
            Self::Li => 1.82,
            Self::Be => 1.53,
            Self::B => 1.92,
            Self::C => 1.70,
            Self::N => 1.55,
            Self::O => 1.52,
            Self::F => 1.47,
            Self::Ne => 1.54,
            Self::Na => 2.27,
            Self::Mg => 1.73,
            Self::Al => 1.84,
            Self::Si => 2.10,
            Self::P => 1.80,
            Self::S => 1.80,
            Self::Cl => 1.75,
            Self::Ar => 1.88,
            Self::K => 2.75,
            Self::Ca => 2.31,
            Self::Fe | Self::Co | Self::Ni => 1.63,
            Self::Cu => 1.40,
            Self::Zn => 1.39,
            Self::Ga => 1.87,
            Self::Ge => 2.11,
            Self::As => 1.85,
            Self::Se => 1.90,
            Self::Br => 1.85,
            Self::Kr => 2.02,
            Self::Rb => 3.03,
            Self::Sr => 2.49,
            Self::In => 1.93,
            Self::Sn => 2.17,
            Self::Sb => 2.06,
            Self::Te => 2.06,
            Self::I => 1.98,
            Self::Xe => 2.16,
        }
    }

    /// Pauling electronegativity, used for bond-increment partial charges.
    pub fn electronegativity(self) -> f64 {
        match self {
            Self::H => 2.20,
            Self::Li => 0.98,
            Self::Be => 1.57,
            Self::B => 2.04,
            Self::C => 2.55,
            Self::N => 3.04,
            Self::O => 3.44,
            Self::F => 3.98,
            Self::Na => 0.93,
            Self::Mg => 1.31,
            Self::Al => 1.61,
            Self::Si => 1.90,
            Self::P => 2.19,
            Self::S => 2.58,
            Self::Cl => 3.16,
            Self::K => 0.82,
            Self::Ca => 1.00,
            Self::Fe => 1.83,
            Self::Co => 1.88,
            Self::Ni => 1.91,
            Self::Cu => 1.90,
            Self::Zn => 1.65,
            Self::Ga => 1.81,
            Self::Ge => 2.01,
            Self::As => 2.18,
            Self::Se => 2.55,
            Self::Br => 2.96,
            Self::Kr => 3.00,
            Self::Rb => 0.82,
            Self::Sr => 0.95,
            Self::In => 1.78,
            Self::Sn => 1.96,
            Self::Sb => 2.05,
            Self::Te => 2.10,
            Self::I => 2.66,
            Self::Xe => 2.60,
            Self::He | Self::Ne | Self::Ar => 0.0,
        }
    }

    /// The element with `offset` more protons in the same period, if it exists.
    ///
    /// Used to derive charge-adjusted valences from isoelectronic neighbours
    /// (e.g. N+ behaves like C, O- behaves like F).
    pub fn isoelectronic_shift(self, offset: i8) -> Option<Self> {
        let z = self.atomic_number() as i16 + offset as i16;
        if !(1..=u8::MAX as i16).contains(&z) {
            return None;
        }
        let shifted = Self::from_atomic_number(z as u8)?;
        (shifted.period() == self.period()).then_some(shifted)
    }

    pub fn period(self) -> u8 {
        match self.atomic_number() {
            1..=2 => 1,
            3..=10 => 2,
            11..=18 => 3,
            19..=36 => 4,
            _ => 5,
        }
    }

    /// Elements that the line-notation organic subset may write without brackets.
    pub fn is_organic_subset(self) -> bool {
        matches!(
            self,
            Self::B
                | Self::C
                | Self::N
                | Self::O
                | Self::P
                | Self::S
                | Self::F
                | Self::Cl
                | Self::Br
                | Self::I
        )
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s).ok_or_else(|| ParseElementError(s.to_string()))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_symbol_round_trips_for_every_mapped_element() {
        for (symbol, element) in SYMBOL_MAP.entries() {
            assert_eq!(element.symbol(), *symbol);
            assert_eq!(Element::from_symbol(symbol), Some(*element));
        }
    }

    #[test]
    fn from_symbol_is_case_sensitive() {
        assert_eq!(Element::from_symbol("Cl"), Some(Element::Cl));
        assert_eq!(Element::from_symbol("CL"), None);
        assert_eq!(Element::from_symbol("cl"), None);
    }

    #[test]
    fn from_atomic_number_finds_known_elements() {
        assert_eq!(Element::from_atomic_number(6), Some(Element::C));
        assert_eq!(Element::from_atomic_number(53), Some(Element::I));
        assert_eq!(Element::from_atomic_number(92), None);
    }

    #[test]
    fn isoelectronic_shift_stays_within_period() {
        assert_eq!(Element::N.isoelectronic_shift(-1), Some(Element::C));
        assert_eq!(Element::O.isoelectronic_shift(1), Some(Element::F));
        assert_eq!(Element::F.isoelectronic_shift(3), None);
        assert_eq!(Element::Li.isoelectronic_shift(-1), None);
    }

    #[test]
    fn parse_rejects_unknown_symbol() {
        let err = "Xx".parse::<Element>().unwrap_err();
        assert_eq!(err, ParseElementError("Xx".to_string()));
    }
}
