pub const COULOMB_CONSTANT: f64 = 332.0637; // In kcal·Å/(mol·e²)

// Below this reduced distance the exp-6 form turns over; a linear wall continues it.
const BUCKINGHAM_WALL_RHO: f64 = 0.35;

#[inline]
pub fn lennard_jones_12_6(dist: f64, r_min: f64, well_depth: f64) -> f64 {
    if dist < 1e-6 {
        return 1e10;
    }
    let rho = r_min / dist;
    let rho6 = rho.powi(6);
    let rho12 = rho6 * rho6;
    well_depth * (rho12 - 2.0 * rho6)
}

#[inline]
pub fn lennard_jones_12_6_derivative(dist: f64, r_min: f64, well_depth: f64) -> f64 {
    if dist < 1e-6 {
        return 0.0;
    }
    let rho = r_min / dist;
    let rho6 = rho.powi(6);
    let rho12 = rho6 * rho6;
    12.0 * well_depth * (rho6 - rho12) / dist
}

#[inline]
fn buckingham_core(rho: f64, well_depth: f64, gamma: f64) -> (f64, f64) {
    let scale = 6.0 / (gamma - 6.0);
    let factor = gamma / (gamma - 6.0);
    let repulsion = (gamma * (1.0 - rho)).exp();
    let energy = well_depth * (scale * repulsion - factor * rho.powi(-6));
    let slope = well_depth * (-scale * gamma * repulsion + 6.0 * factor * rho.powi(-7));
    (energy, slope)
}

#[inline]
pub fn buckingham_exp_6(dist: f64, r_min: f64, well_depth: f64, gamma: f64) -> f64 {
    if dist < 1e-6 {
        return 1e10;
    }
    let rho = dist / r_min;
    if rho < BUCKINGHAM_WALL_RHO {
        let (e_wall, slope) = buckingham_core(BUCKINGHAM_WALL_RHO, well_depth, gamma);
        return e_wall + slope * (rho - BUCKINGHAM_WALL_RHO);
    }
    buckingham_core(rho, well_depth, gamma).0
}

#[inline]
pub fn buckingham_exp_6_derivative(dist: f64, r_min: f64, well_depth: f64, gamma: f64) -> f64 {
    if dist < 1e-6 {
        return 0.0;
    }
    let rho = dist / r_min;
    let (_, slope) = buckingham_core(rho.max(BUCKINGHAM_WALL_RHO), well_depth, gamma);
    slope / r_min
}

#[inline]
pub fn coulomb(dist: f64, q1: f64, q2: f64, dielectric: f64) -> f64 {
    if dist < 1e-6 {
        return q1.signum() * q2.signum() * 1e10;
    }
    COULOMB_CONSTANT * q1 * q2 / (dielectric * dist)
}

#[inline]
pub fn coulomb_derivative(dist: f64, q1: f64, q2: f64, dielectric: f64) -> f64 {
    if dist < 1e-6 {
        return 0.0;
    }
    -COULOMB_CONSTANT * q1 * q2 / (dielectric * dist * dist)
}

/// `0.5 k (r - r0)^2`
#[inline]
pub fn harmonic(x: f64, x0: f64, k: f64) -> f64 {
    let dx = x - x0;
    0.5 * k * dx * dx
}

#[inline]
pub fn harmonic_derivative(x: f64, x0: f64, k: f64) -> f64 {
    k * (x - x0)
}

/// Quartic-bounded anharmonic stretch: `0.5 k dr^2 (1 + cs dr + 7/12 cs^2 dr^2)`.
#[inline]
pub fn anharmonic_stretch(r: f64, r0: f64, k: f64, cs: f64) -> f64 {
    let dr = r - r0;
    0.5 * k * dr * dr * (1.0 + cs * dr + 7.0 / 12.0 * cs * cs * dr * dr)
}

#[inline]
pub fn anharmonic_stretch_derivative(r: f64, r0: f64, k: f64, cs: f64) -> f64 {
    let dr = r - r0;
    0.5 * k * dr * (2.0 + 3.0 * cs * dr + 7.0 / 3.0 * cs * cs * dr * dr)
}

/// Chebyshev polynomials `T_n(c)` and `U_{n-1}(c)`, so that `cos(n phi) = T_n(cos phi)`
/// and `d T_n / d c = n U_{n-1}`.
#[inline]
fn chebyshev(n: u8, c: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    let (mut t_prev, mut t) = (1.0, c);
    let (mut u_prev, mut u) = (0.0, 1.0);
    for _ in 1..n {
        (t_prev, t) = (t, 2.0 * c * t - t_prev);
        (u_prev, u) = (u, 2.0 * c * u - u_prev);
    }
    (t, u)
}

/// One Fourier torsion term `0.5 V (1 + s cos(n phi))`, expressed through `cos phi`.
#[inline]
pub fn fourier_torsion(cos_phi: f64, fold: u8, barrier: f64, sign: f64) -> f64 {
    let (t, _) = chebyshev(fold, cos_phi);
    0.5 * barrier * (1.0 + sign * t)
}

/// Derivative of [`fourier_torsion`] with respect to `cos phi`.
#[inline]
pub fn fourier_torsion_derivative(cos_phi: f64, fold: u8, barrier: f64, sign: f64) -> f64 {
    let (_, u) = chebyshev(fold, cos_phi);
    0.5 * barrier * sign * fold as f64 * u
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn numeric_derivative(f: impl Fn(f64) -> f64, x: f64) -> f64 {
        let h = 1e-6;
        (f(x + h) - f(x - h)) / (2.0 * h)
    }

    #[test]
    fn lennard_jones_at_minimum_distance_returns_negative_well_depth() {
        let energy = lennard_jones_12_6(2.0, 2.0, 10.0);
        assert!(f64_approx_equal(energy, -10.0));
        assert!(f64_approx_equal(lennard_jones_12_6_derivative(2.0, 2.0, 10.0), 0.0));
    }

    #[test]
    fn lennard_jones_at_very_small_distance_returns_large_positive_energy() {
        let energy = lennard_jones_12_6(1e-7, 2.0, 10.0);
        assert!(f64_approx_equal(energy, 1e10));
    }

    #[test]
    fn buckingham_at_minimum_distance_returns_negative_well_depth() {
        let energy = buckingham_exp_6(2.0, 2.0, 10.0, 12.0);
        assert!(f64_approx_equal(energy, -10.0));
    }

    #[test]
    fn buckingham_stays_repulsive_inside_the_wall() {
        let near = buckingham_exp_6(0.4, 2.0, 0.1, 12.0);
        let nearer = buckingham_exp_6(0.2, 2.0, 0.1, 12.0);
        assert!(near > 0.0);
        assert!(nearer > near);
        assert!(buckingham_exp_6_derivative(0.2, 2.0, 0.1, 12.0) < 0.0);
    }

    #[test]
    fn coulomb_calculates_repulsive_force_correctly() {
        let energy = coulomb(1.0, 1.0, 1.0, 1.0);
        assert!(f64_approx_equal(energy, COULOMB_CONSTANT));
    }

    #[test]
    fn coulomb_calculates_attractive_force_correctly() {
        let energy = coulomb(2.0, 1.0, -1.0, 1.0);
        assert!(f64_approx_equal(energy, -COULOMB_CONSTANT / 2.0));
    }

    #[test]
    fn coulomb_at_very_small_distance_returns_large_energy_with_correct_sign() {
        assert!(f64_approx_equal(coulomb(1e-7, 1.0, 1.0, 1.0), 1e10));
        assert!(f64_approx_equal(coulomb(1e-7, -1.0, 1.0, 1.0), -1e10));
    }

    #[test]
    fn analytic_derivatives_match_finite_differences() {
        let checks: [(&dyn Fn(f64) -> f64, &dyn Fn(f64) -> f64, f64); 5] = [
            (
                &|r| lennard_jones_12_6(r, 3.8, 0.1),
                &|r| lennard_jones_12_6_derivative(r, 3.8, 0.1),
                3.3,
            ),
            (
                &|r| buckingham_exp_6(r, 3.8, 0.1, 12.0),
                &|r| buckingham_exp_6_derivative(r, 3.8, 0.1, 12.0),
                3.1,
            ),
            (
                &|r| coulomb(r, 0.3, -0.4, 1.0),
                &|r| coulomb_derivative(r, 0.3, -0.4, 1.0),
                2.5,
            ),
            (
                &|r| anharmonic_stretch(r, 1.5, 600.0, -2.0),
                &|r| anharmonic_stretch_derivative(r, 1.5, 600.0, -2.0),
                1.62,
            ),
            (
                &|c| fourier_torsion(c, 3, 2.0, 1.0),
                &|c| fourier_torsion_derivative(c, 3, 2.0, 1.0),
                0.3,
            ),
        ];
        for (energy, derivative, x) in checks {
            let numeric = numeric_derivative(energy, x);
            assert!((numeric - derivative(x)).abs() < 1e-4 * numeric.abs().max(1.0));
        }
    }

    #[test]
    fn fourier_torsion_reproduces_cosine_of_multiple_angle() {
        let phi: f64 = 0.7;
        for fold in 1..=6u8 {
            let expected = 0.5 * (1.0 - (fold as f64 * phi).cos());
            assert!(f64_approx_equal(fourier_torsion(phi.cos(), fold, 1.0, -1.0), expected));
        }
    }

    #[test]
    fn harmonic_is_zero_with_zero_slope_at_reference() {
        assert!(f64_approx_equal(harmonic(1.1, 1.1, 700.0), 0.0));
        assert!(f64_approx_equal(harmonic_derivative(1.1, 1.1, 700.0), 0.0));
        assert!(f64_approx_equal(harmonic(1.2, 1.0, 100.0), 2.0));
    }
}
