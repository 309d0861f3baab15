use super::element::Element;
use super::extended::ExtendedReal;
use crate::core::forcefield::kind::ForceFieldKind;
use nalgebra::Point3;

/// Whether a candidate's geometry came out of a successful force-field minimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinimizationStatus {
    /// Minimized to convergence under the recorded force field.
    Minimized(ForceFieldKind),
    /// Every configured force field failed; the embedded geometry is kept as-is.
    UnminimizedFallback,
}

impl MinimizationStatus {
    pub fn force_field(&self) -> Option<ForceFieldKind> {
        match self {
            Self::Minimized(kind) => Some(*kind),
            Self::UnminimizedFallback => None,
        }
    }

    pub fn is_minimized(&self) -> bool {
        matches!(self, Self::Minimized(_))
    }
}

/// One embedded (and possibly minimized) 3-D structure from the candidate pool.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateGeometry {
    /// Position of this candidate in the original pool.
    pub pool_index: usize,
    pub elements: Vec<Element>,
    pub positions: Vec<Point3<f64>>,
    pub energy: ExtendedReal,
    pub status: MinimizationStatus,
}

impl CandidateGeometry {
    /// A freshly embedded candidate: not yet minimized and not yet scored.
    pub fn embedded(pool_index: usize, elements: Vec<Element>, positions: Vec<Point3<f64>>) -> Self {
        Self {
            pool_index,
            elements,
            positions,
            energy: ExtendedReal::Infinite,
            status: MinimizationStatus::UnminimizedFallback,
        }
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.positions.len()
    }
}

/// The retained conformers of one molecule, in the order the pruner kept them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConformerSet {
    conformers: Vec<CandidateGeometry>,
}

impl ConformerSet {
    pub fn new(conformers: Vec<CandidateGeometry>) -> Self {
        Self { conformers }
    }

    pub fn len(&self) -> usize {
        self.conformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conformers.is_empty()
    }

    /// The first kept conformer, which is the lowest-energy one whenever energies ranked the pool.
    pub fn best(&self) -> Option<&CandidateGeometry> {
        self.conformers.first()
    }

    /// The kept conformer with the lowest energy; the earliest kept one wins ties.
    pub fn lowest_energy(&self) -> Option<&CandidateGeometry> {
        self.conformers.iter().min_by_key(|c| c.energy)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateGeometry> {
        self.conformers.iter()
    }

    pub fn into_inner(self) -> Vec<CandidateGeometry> {
        self.conformers
    }
}

impl<'a> IntoIterator for &'a ConformerSet {
    type Item = &'a CandidateGeometry;
    type IntoIter = std::slice::Iter<'a, CandidateGeometry>;

    fn into_iter(self) -> Self::IntoIter {
        self.conformers.iter()
    }
}
