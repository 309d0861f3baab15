use std::ops::{Add, AddAssign};

/// Force-field energy split by interaction class (kcal/mol).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyTerm {
    pub bond: f64,
    pub angle: f64,
    pub torsion: f64,
    pub vdw: f64,
    pub coulomb: f64,
}

impl EnergyTerm {
    pub fn new(bond: f64, angle: f64, torsion: f64, vdw: f64, coulomb: f64) -> Self {
        Self {
            bond,
            angle,
            torsion,
            vdw,
            coulomb,
        }
    }

    #[inline]
    pub fn bonded(&self) -> f64 {
        self.bond + self.angle + self.torsion
    }

    #[inline]
    pub fn non_bonded(&self) -> f64 {
        self.vdw + self.coulomb
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.bonded() + self.non_bonded()
    }
}

impl Add for EnergyTerm {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            bond: self.bond + rhs.bond,
            angle: self.angle + rhs.angle,
            torsion: self.torsion + rhs.torsion,
            vdw: self.vdw + rhs.vdw,
            coulomb: self.coulomb + rhs.coulomb,
        }
    }
}

impl AddAssign for EnergyTerm {
    fn add_assign(&mut self, rhs: Self) {
        self.bond += rhs.bond;
        self.angle += rhs.angle;
        self.torsion += rhs.torsion;
        self.vdw += rhs.vdw;
        self.coulomb += rhs.coulomb;
    }
}
