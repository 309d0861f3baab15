use super::bounds::{BoundsError, BoundsMatrix};
use crate::core::models::molecule::Molecule;
use crate::core::utils::minimizer::Objective;

/// Smallest signed volume (Å³) refinement pushes a chiral centre towards.
const VOLUME_FLOOR: f64 = 0.5;
const VOLUME_WEIGHT: f64 = 1.0;

/// Target sense of the signed volume spanned by four reference atoms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiralVolume {
    atoms: [usize; 4],
    sign: f64,
}

#[inline]
fn point(coords: &[f64], atom: usize) -> [f64; 3] {
    [coords[3 * atom], coords[3 * atom + 1], coords[3 * atom + 2]]
}

#[inline]
fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

impl ChiralVolume {
    /// One constraint per tetrahedral centre that resolves to four reference atoms.
    pub fn collect(mol: &Molecule) -> Vec<Self> {
        mol.tetrahedral_centers()
            .iter()
            .filter_map(|center| {
                center.reference_atoms(mol).map(|atoms| Self {
                    atoms,
                    sign: center.handedness.volume_sign(),
                })
            })
            .collect()
    }

    pub fn atoms(&self) -> [usize; 4] {
        self.atoms
    }

    /// `(p1 - p0) · ((p2 - p0) × (p3 - p0))` over the reference atoms.
    pub fn signed_volume(&self, coords: &[f64]) -> f64 {
        let [p0, p1, p2, p3] = self.atoms.map(|a| point(coords, a));
        dot(sub(p1, p0), cross(sub(p2, p0), sub(p3, p0)))
    }

    pub fn is_satisfied(&self, coords: &[f64]) -> bool {
        self.sign * self.signed_volume(coords) > 0.0
    }

    fn add_penalty(&self, coords: &[f64], grad: &mut [f64]) -> f64 {
        let oriented = self.sign * self.signed_volume(coords);
        if oriented >= VOLUME_FLOOR {
            return 0.0;
        }
        let deficit = VOLUME_FLOOR - oriented;
        let [p0, p1, p2, p3] = self.atoms.map(|a| point(coords, a));
        let (a, b, c) = (sub(p1, p0), sub(p2, p0), sub(p3, p0));
        let d1 = cross(b, c);
        let d2 = cross(c, a);
        let d3 = cross(a, b);
        let scale = -2.0 * VOLUME_WEIGHT * deficit * self.sign;
        for axis in 0..3 {
            let partials = [-(d1[axis] + d2[axis] + d3[axis]), d1[axis], d2[axis], d3[axis]];
            for (atom, partial) in self.atoms.iter().zip(partials) {
                grad[3 * atom + axis] += scale * partial;
            }
        }
        VOLUME_WEIGHT * deficit * deficit
    }
}

/// Distance bounds plus chiral volumes: what embedded structures are refined against and
/// validated with.
#[derive(Debug, Clone, PartialEq)]
pub struct Restraints {
    pub bounds: BoundsMatrix,
    pub chiral: Vec<ChiralVolume>,
}

impl Restraints {
    pub fn build(mol: &Molecule) -> Result<Self, BoundsError> {
        Ok(Self {
            bounds: BoundsMatrix::build(mol)?,
            chiral: ChiralVolume::collect(mol),
        })
    }

    pub fn atom_count(&self) -> usize {
        self.bounds.atom_count()
    }

    pub fn stereo_satisfied(&self, coords: &[f64]) -> bool {
        self.chiral.iter().all(|c| c.is_satisfied(coords))
    }

    /// Reflects the structure through the xy-plane when most centres have the wrong sense.
    /// Reflection keeps every distance, so only the chiral volumes change.
    pub fn orient(&self, coords: &mut [f64]) {
        let wrong = self.chiral.iter().filter(|c| !c.is_satisfied(coords)).count();
        if 2 * wrong > self.chiral.len() {
            coords.iter_mut().skip(2).step_by(3).for_each(|z| *z = -*z);
        }
    }
}

impl Objective for Restraints {
    fn dimension(&self) -> usize {
        self.bounds.dimension()
    }

    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let mut value = self.bounds.evaluate(x, grad);
        for volume in &self.chiral {
            value += volume.add_penalty(x, grad);
        }
        value
    }
}
