use crate::core::chem::symmetry::AtomSymmetry;
use crate::core::models::conformer::CandidateGeometry;
use crate::core::models::extended::ExtendedReal;
use crate::engine::progress::{Progress, ProgressReporter};
use itertools::Itertools;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Best-fit RMSD between every pair of candidates, minimized over equivalent atom
/// relabelings. The diagonal is zero and a
/// pair that could not be compared holds [`ExtendedReal::Infinite`].
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    values: Vec<ExtendedReal>,
}

impl DistanceMatrix {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            values: vec![ExtendedReal::Finite(0.0); n * n],
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> ExtendedReal {
        self.values[i * self.n + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: ExtendedReal) {
        self.values[i * self.n + j] = value;
        self.values[j * self.n + i] = value;
    }

    pub fn failed_pairs(&self) -> usize {
        (0..self.n)
            .tuple_combinations()
            .filter(|&(i, j)| !self.get(i, j).is_finite())
            .count()
    }
}

/// Computes the pairwise distance matrix of a candidate pool. Structures that differ only by
/// a permutation of `symmetry` are at distance zero.
#[instrument(skip_all, name = "distance_matrix_task", fields(candidates = candidates.len()))]
pub fn run(
    candidates: &[CandidateGeometry],
    symmetry: &AtomSymmetry,
    reporter: &ProgressReporter,
) -> DistanceMatrix {
    let pairs: Vec<(usize, usize)> = (0..candidates.len()).tuple_combinations().collect();
    let mut matrix = DistanceMatrix::new(candidates.len());
    if pairs.is_empty() {
        return matrix;
    }

    reporter.report(Progress::TaskStart {
        total_steps: pairs.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = pairs.iter();

    #[cfg(feature = "parallel")]
    let iterator = pairs.par_iter();

    let values: Vec<ExtendedReal> = iterator
        .map(|&(i, j)| {
            let value = match symmetry.best_rmsd(&candidates[i].positions, &candidates[j].positions) {
                Ok(rmsd) => ExtendedReal::new(rmsd),
                Err(e) => {
                    debug!(i, j, error = %e, "Pair distance unavailable.");
                    ExtendedReal::Infinite
                }
            };
            reporter.report(Progress::TaskIncrement);
            value
        })
        .collect();
    reporter.report(Progress::TaskFinish);

    for (&(i, j), value) in pairs.iter().zip(values) {
        matrix.set(i, j, value);
    }
    info!(
        pairs = pairs.len(),
        failed = matrix.failed_pairs(),
        "Distance matrix computed."
    );
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles::parse_smiles;
    use crate::core::models::element::Element;
    use nalgebra::Point3;

    fn candidate(index: usize, positions: Vec<Point3<f64>>) -> CandidateGeometry {
        let elements = vec![Element::C; positions.len()];
        CandidateGeometry::embedded(index, elements, positions)
    }

    fn triangle(stretch: f64) -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.5 + stretch, 0.0, 0.0),
            Point3::new(0.0, 1.5, 0.0),
        ]
    }

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal() {
        let pool = vec![
            candidate(0, triangle(0.0)),
            candidate(1, triangle(0.3)),
            candidate(2, triangle(0.9)),
        ];
        let matrix = run(&pool, &AtomSymmetry::identity(3), &ProgressReporter::new());
        assert_eq!(matrix.len(), 3);
        for i in 0..3 {
            assert_eq!(matrix.get(i, i), ExtendedReal::Finite(0.0));
            for j in 0..3 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
        assert!(matrix.get(0, 2) > matrix.get(0, 1));
        assert_eq!(matrix.failed_pairs(), 0);
    }

    #[test]
    fn incomparable_pairs_hold_the_infinite_sentinel() {
        let mut short = triangle(0.0);
        short.pop();
        let pool = vec![
            candidate(0, triangle(0.0)),
            candidate(1, short),
            candidate(2, triangle(0.2)),
        ];
        let matrix = run(&pool, &AtomSymmetry::identity(3), &ProgressReporter::new());
        assert_eq!(matrix.get(0, 1), ExtendedReal::Infinite);
        assert_eq!(matrix.get(1, 2), ExtendedReal::Infinite);
        assert!(matrix.get(0, 2).is_finite());
        assert_eq!(matrix.failed_pairs(), 2);
    }

    #[test]
    fn relabeled_equivalent_atoms_are_at_distance_zero() {
        let mut swapped = triangle(0.9);
        swapped.swap(1, 2);
        let pool = vec![candidate(0, triangle(0.9)), candidate(1, swapped)];
        let symmetry = AtomSymmetry::perceive(&parse_smiles("C1CC1").unwrap());
        let matrix = run(&pool, &symmetry, &ProgressReporter::new());
        assert!(matrix.get(0, 1).to_f64() < 1e-6);
        let plain = run(&pool, &AtomSymmetry::identity(3), &ProgressReporter::new());
        assert!(plain.get(0, 1).to_f64() > 0.1);
    }

    #[test]
    fn single_candidate_needs_no_pairs() {
        let matrix = run(
            &[candidate(0, triangle(0.0))],
            &AtomSymmetry::identity(3),
            &ProgressReporter::new(),
        );
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.failed_pairs(), 0);
    }
}
