use nalgebra::{Matrix3, Point3, Vector3};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignmentError {
    #[error("Cannot align structures of different sizes ({0} vs {1} atoms)")]
    LengthMismatch(usize, usize),
    #[error("Cannot align empty structures")]
    Empty,
    #[error("Singular value decomposition failed to produce rotation factors")]
    DecompositionFailed,
    #[error("Alignment produced a non-finite deviation")]
    NonFinite,
}

pub fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len().max(1) as f64)
}

/// Packs points into an `[x0, y0, z0, x1, ...]` vector.
pub fn flatten(points: &[Point3<f64>]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
}

/// Inverse of [`flatten`]. Trailing values that do not fill a point are ignored.
pub fn unflatten(coords: &[f64]) -> Vec<Point3<f64>> {
    coords
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect()
}

/// Optimal rigid-body fit of one structure onto another (Kabsch).
#[derive(Debug, Clone, PartialEq)]
pub struct Superposition {
    rotation: Matrix3<f64>,
    reference_center: Point3<f64>,
    mobile_center: Point3<f64>,
    pub rmsd: f64,
}

impl Superposition {
    /// Moves a point of the mobile structure into the reference frame.
    #[inline]
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.reference_center + self.rotation * (point - self.mobile_center)
    }
}

/// Superposes `mobile` onto `reference`, pairing atoms by index.
pub fn superpose(
    reference: &[Point3<f64>],
    mobile: &[Point3<f64>],
) -> Result<Superposition, AlignmentError> {
    if reference.len() != mobile.len() {
        return Err(AlignmentError::LengthMismatch(reference.len(), mobile.len()));
    }
    if reference.is_empty() {
        return Err(AlignmentError::Empty);
    }

    let ref_center = centroid(reference);
    let mob_center = centroid(mobile);
    let covariance = reference
        .iter()
        .zip(mobile)
        .fold(Matrix3::zeros(), |acc: Matrix3<f64>, (r, m)| {
            acc + (m - mob_center) * (r - ref_center).transpose()
        });

    let svd = covariance.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Err(AlignmentError::DecompositionFailed);
    };
    let mut correction = Matrix3::identity();
    if (v_t.transpose() * u.transpose()).determinant() < 0.0 {
        correction[(2, 2)] = -1.0;
    }
    let rotation = v_t.transpose() * correction * u.transpose();

    let squared: f64 = reference
        .iter()
        .zip(mobile)
        .map(|(r, m)| {
            let moved = rotation * (m - mob_center);
            (moved - (r - ref_center)).norm_squared()
        })
        .sum();
    let rmsd = (squared / reference.len() as f64).sqrt();
    if !rmsd.is_finite() {
        return Err(AlignmentError::NonFinite);
    }
    Ok(Superposition {
        rotation,
        reference_center: ref_center,
        mobile_center: mob_center,
        rmsd,
    })
}

/// Root-mean-square deviation after optimal rigid superposition, pairing atoms by index.
pub fn best_fit_rmsd(
    reference: &[Point3<f64>],
    mobile: &[Point3<f64>],
) -> Result<f64, AlignmentError> {
    superpose(reference, mobile).map(|fit| fit.rmsd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Rotation3, Unit};

    fn tetrahedron() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.1, 0.0, 0.0),
            Point3::new(-0.3, 1.0, 0.0),
            Point3::new(-0.3, -0.4, 0.9),
            Point3::new(0.2, 0.3, -1.2),
        ]
    }

    #[test]
    fn rigidly_moved_copy_has_zero_rmsd() {
        let reference = tetrahedron();
        let rotation = Rotation3::from_axis_angle(
            &Unit::new_normalize(Vector3::new(1.0, 2.0, -0.5)),
            1.1,
        );
        let shift = Vector3::new(3.0, -1.0, 7.5);
        let moved: Vec<_> = reference.iter().map(|p| rotation * p + shift).collect();
        let rmsd = best_fit_rmsd(&reference, &moved).unwrap();
        assert!(rmsd < 1e-9, "rmsd = {rmsd}");
    }

    #[test]
    fn superposition_maps_mobile_points_onto_the_reference() {
        let reference = tetrahedron();
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), 0.7);
        let moved: Vec<_> = reference
            .iter()
            .map(|p| rotation * p + Vector3::new(-2.0, 0.5, 1.0))
            .collect();
        let fit = superpose(&reference, &moved).unwrap();
        for (r, m) in reference.iter().zip(&moved) {
            assert!((fit.apply(m) - r).norm() < 1e-9);
        }
    }

    #[test]
    fn mirror_image_is_not_superimposed_by_a_reflection() {
        let reference = tetrahedron();
        let mirrored: Vec<_> = reference
            .iter()
            .map(|p| Point3::new(p.x, p.y, -p.z))
            .collect();
        let rmsd = best_fit_rmsd(&reference, &mirrored).unwrap();
        assert!(rmsd > 0.1);
    }

    #[test]
    fn rmsd_is_symmetric() {
        let a = tetrahedron();
        let mut b = tetrahedron();
        b[1].x += 0.4;
        b[4].z -= 0.2;
        let ab = best_fit_rmsd(&a, &b).unwrap();
        let ba = best_fit_rmsd(&b, &a).unwrap();
        assert!((ab - ba).abs() < 1e-9);
        assert!(ab > 0.0);
    }

    #[test]
    fn mismatched_or_empty_inputs_are_errors() {
        let a = tetrahedron();
        assert_eq!(
            best_fit_rmsd(&a, &a[..3]),
            Err(AlignmentError::LengthMismatch(5, 3))
        );
        assert_eq!(best_fit_rmsd(&[], &[]), Err(AlignmentError::Empty));
    }

    #[test]
    fn flatten_and_unflatten_are_inverse() {
        let points = tetrahedron();
        let flat = flatten(&points);
        assert_eq!(flat.len(), 15);
        assert_eq!(unflatten(&flat), points);
    }
}
