//! Molecular mechanics for conformer refinement.
//!
//! Two models are provided behind one [`energy::ForceField`] type: a UFF-style
//! generic model with harmonic stretches, cosine bends and Lennard-Jones dispersion,
//! and an MMFF-style model (with the stiffened `mmff94s` variant) using anharmonic
//! stretches, buffered electrostatics from bond-increment charges and exp-6 dispersion.

pub mod energy;
pub mod kind;
pub mod params;
pub mod potentials;
pub mod term;
pub mod typing;
