use super::bounds::BoundsMatrix;
use super::chirality::Restraints;
use crate::core::utils::geometry::unflatten;
use crate::core::utils::minimizer::{MinimizerSettings, minimize};
use nalgebra::{DMatrix, Point3, SymmetricEigen};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

const REFINEMENT_SETTINGS: MinimizerSettings = MinimizerSettings {
    max_iterations: 400,
    gradient_tolerance: 1e-4,
    value_tolerance: 1e-10,
    max_step: 0.5,
};

/// Side length (Å) per cube-rooted atom of the box random starting coordinates fill.
const RANDOM_BOX_SCALE: f64 = 2.5;

/// Deterministic random stream for one candidate of one run.
pub fn candidate_rng(seed: u64, candidate: usize) -> StdRng {
    let mixed = seed ^ (candidate as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(mixed)
}

/// Picks a random distance inside every pair's bounds.
fn sample_distances(bounds: &BoundsMatrix, rng: &mut impl Rng) -> DMatrix<f64> {
    let n = bounds.atom_count();
    let mut distances = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = rng.gen_range(bounds.lower(i, j)..=bounds.upper(i, j));
            distances[(i, j)] = d;
            distances[(j, i)] = d;
        }
    }
    distances
}

/// Classical metric-matrix embedding of a distance matrix into three dimensions.
fn metric_embedding(distances: &DMatrix<f64>) -> Option<Vec<f64>> {
    let n = distances.nrows();
    let squared = distances.map(|d| d * d);
    let total: f64 = squared.iter().sum::<f64>() / (2.0 * (n * n) as f64);
    let to_centroid: Vec<f64> = (0..n)
        .map(|i| squared.row(i).sum() / n as f64 - total)
        .collect();

    let metric = DMatrix::from_fn(n, n, |i, j| {
        0.5 * (to_centroid[i] + to_centroid[j] - squared[(i, j)])
    });
    let eigen = SymmetricEigen::new(metric);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));
    if eigen.eigenvalues[order[0]] <= 0.0 {
        return None;
    }

    let mut coords = vec![0.0; 3 * n];
    for (axis, &k) in order.iter().take(3).enumerate() {
        let scale = eigen.eigenvalues[k].max(0.0).sqrt();
        for i in 0..n {
            coords[3 * i + axis] = scale * eigen.eigenvectors[(i, k)];
        }
    }
    coords.iter().all(|c| c.is_finite()).then_some(coords)
}

fn refine(restraints: &Restraints, coords: &mut [f64]) -> bool {
    restraints.orient(coords);
    minimize(restraints, coords, &REFINEMENT_SETTINGS).is_ok()
}

/// One distance-geometry embedding attempt. Returns `None` if the structure fails the
/// validation gate: a bound left by more than `tolerance` (Å) or a stereocentre with the
/// wrong sense.
pub fn embed_distance_geometry(
    restraints: &Restraints,
    tolerance: f64,
    rng: &mut impl Rng,
) -> Option<Vec<Point3<f64>>> {
    if restraints.atom_count() == 1 {
        return Some(vec![Point3::origin()]);
    }
    let distances = sample_distances(&restraints.bounds, rng);
    let mut coords = metric_embedding(&distances)?;
    if !refine(restraints, &mut coords) {
        return None;
    }
    let accepted = restraints.bounds.max_violation(&coords) <= tolerance
        && restraints.stereo_satisfied(&coords);
    accepted.then(|| unflatten(&coords))
}

/// Random box coordinates refined against the restraints. Bound violations are accepted;
/// a stereocentre with the wrong sense is not.
pub fn embed_random_coordinates(
    restraints: &Restraints,
    rng: &mut impl Rng,
) -> Option<Vec<Point3<f64>>> {
    let n = restraints.atom_count();
    let half_side = 0.5 * RANDOM_BOX_SCALE * (n as f64).cbrt();
    let mut coords: Vec<f64> = (0..3 * n)
        .map(|_| rng.gen_range(-half_side..=half_side))
        .collect();
    let accepted = refine(restraints, &mut coords) && restraints.stereo_satisfied(&coords);
    accepted.then(|| unflatten(&coords))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 0.25;
    use crate::core::chem::hydrogens::add_hydrogens;
    use crate::core::chem::sanitize::sanitize;
    use crate::core::io::smiles::parse_smiles;
    use crate::core::utils::geometry::flatten;

    fn restraints_for(smiles: &str) -> Restraints {
        let mol = add_hydrogens(&sanitize(&parse_smiles(smiles).unwrap()).molecule);
        Restraints::build(&mol).unwrap()
    }

    #[test]
    fn metric_embedding_recovers_an_exact_distance_matrix() {
        let points: [[f64; 3]; 4] = [
            [0.0, 0.0, 0.0],
            [1.5, 0.0, 0.0],
            [0.0, 2.0, 0.0],
            [0.3, 0.4, 1.1],
        ];
        let distances = DMatrix::from_fn(4, 4, |i, j| {
            let d: f64 = (0..3).map(|c| (points[i][c] - points[j][c]).powi(2)).sum();
            d.sqrt()
        });
        let coords = metric_embedding(&distances).unwrap();
        let embedded = unflatten(&coords);
        for i in 0..4 {
            for j in 0..4 {
                let d = (embedded[i] - embedded[j]).norm();
                assert!((d - distances[(i, j)]).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn distance_geometry_structures_respect_bonded_bounds() {
        let restraints = restraints_for("CCO");
        let mut rng = candidate_rng(42, 0);
        let positions = (0..10)
            .find_map(|_| embed_distance_geometry(&restraints, TOLERANCE, &mut rng))
            .expect("ethanol embeds within ten attempts");
        assert_eq!(positions.len(), 9);
        let cc = (positions[0] - positions[1]).norm();
        assert!((cc - 1.52).abs() < TOLERANCE);
    }

    #[test]
    fn same_seed_and_candidate_reproduce_the_same_structure() {
        let restraints = restraints_for("CC(C)O");
        let a = embed_random_coordinates(&restraints, &mut candidate_rng(7, 3));
        let b = embed_random_coordinates(&restraints, &mut candidate_rng(7, 3));
        let c = embed_random_coordinates(&restraints, &mut candidate_rng(7, 4));
        assert!(a.is_some());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn random_coordinates_honour_the_written_chirality() {
        let restraints = restraints_for("F[C@](Cl)(Br)I");
        let embedded: Vec<_> = (0..4)
            .filter_map(|slot| {
                let mut rng = candidate_rng(42, slot);
                (0..10).find_map(|_| embed_random_coordinates(&restraints, &mut rng))
            })
            .collect();
        assert!(!embedded.is_empty());
        for positions in &embedded {
            assert!(restraints.stereo_satisfied(&flatten(positions)));
        }
    }

    #[test]
    fn single_atom_sits_at_the_origin() {
        let restraints = restraints_for("[Ar]");
        let positions =
            embed_distance_geometry(&restraints, TOLERANCE, &mut candidate_rng(42, 0)).unwrap();
        assert_eq!(positions, vec![Point3::origin()]);
    }
}
