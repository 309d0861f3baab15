use super::molecule::Molecule;
use super::topology::BondOrder;

/// Sense of a tetrahedral centre: looking from the first listed neighbour towards the
/// centre, the remaining three run anticlockwise (`@`) or clockwise (`@@`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Anticlockwise,
    Clockwise,
}

impl Handedness {
    /// Sign of the signed volume spanned by the ordered neighbours.
    #[inline]
    pub fn volume_sign(self) -> f64 {
        match self {
            Self::Anticlockwise => -1.0,
            Self::Clockwise => 1.0,
        }
    }
}

/// One slot in the neighbour order of a stereocentre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StereoNeighbor {
    Atom(usize),
    /// The centre's own hydrogen, or its lone pair when it carries none.
    Implicit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TetrahedralCenter {
    pub center: usize,
    /// Neighbours in line-notation order.
    pub neighbors: Vec<StereoNeighbor>,
    pub handedness: Handedness,
}

impl TetrahedralCenter {
    /// The four reference atoms of the centre, with the centre itself standing in for a
    /// lone pair. `None` when the neighbour list does not describe a tetrahedral centre.
    ///
    /// An implicit slot resolves to the first hydrogen neighbour not listed explicitly,
    /// which is where hydrogen addition puts the hydrogen of a bracket atom.
    pub fn reference_atoms(&self, mol: &Molecule) -> Option<[usize; 4]> {
        if !(3..=4).contains(&self.neighbors.len()) {
            return None;
        }
        let listed: Vec<usize> = self
            .neighbors
            .iter()
            .filter_map(|n| match n {
                StereoNeighbor::Atom(i) => Some(*i),
                StereoNeighbor::Implicit => None,
            })
            .collect();
        let mut spare_hydrogens = mol
            .neighbor_indices(self.center)
            .filter(|&n| mol.atoms()[n].is_hydrogen() && !listed.contains(&n));

        let mut resolved: Vec<usize> = Vec::with_capacity(4);
        for slot in &self.neighbors {
            match slot {
                StereoNeighbor::Atom(i) => resolved.push(*i),
                StereoNeighbor::Implicit => {
                    resolved.push(spare_hydrogens.next().unwrap_or(self.center))
                }
            }
        }
        if resolved.len() == 3 {
            resolved.insert(0, self.center);
        }
        let unique = resolved.iter().enumerate().all(|(k, a)| !resolved[..k].contains(a));
        if !unique || resolved.iter().any(|&a| a >= mol.atom_count()) {
            return None;
        }
        resolved.try_into().ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoubleBondConfig {
    /// The two reference substituents lie on the same side.
    Cis,
    Trans,
}

impl DoubleBondConfig {
    pub fn flipped(self) -> Self {
        match self {
            Self::Cis => Self::Trans,
            Self::Trans => Self::Cis,
        }
    }
}

/// Geometry of a stereo double bond `begin=end` relative to one substituent on each end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleBondStereo {
    pub begin: usize,
    pub end: usize,
    pub begin_substituent: usize,
    pub end_substituent: usize,
    pub config: DoubleBondConfig,
}

impl DoubleBondStereo {
    /// Configuration of an arbitrary substituent pair `(i on begin, l on end)`.
    ///
    /// Returns `None` when the bond is no longer double or `i`/`l` are not substituents
    /// of the respective ends.
    pub fn config_for(&self, mol: &Molecule, i: usize, l: usize) -> Option<DoubleBondConfig> {
        let (_, bond) = mol.bond_between(self.begin, self.end)?;
        if bond.order != BondOrder::Double
            || i == self.end
            || l == self.begin
            || mol.bond_between(self.begin, i).is_none()
            || mol.bond_between(self.end, l).is_none()
        {
            return None;
        }
        let swapped = (i != self.begin_substituent) ^ (l != self.end_substituent);
        Some(if swapped {
            self.config.flipped()
        } else {
            self.config
        })
    }
}
