//! # Core Module
//!
//! Fundamental building blocks of the conformer generator: molecular data models,
//! chemistry perception, file formats, force fields and numeric utilities.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Elements, atoms, bonds, molecules and geometries
//! - **Chemistry Perception** ([`chem`]) - Sanitization, valence, rings, hybridization, charge/spin
//! - **File I/O** ([`io`]) - Line-notation parsing, input lists, XYZ and info records
//! - **Energy Calculations** ([`forcefield`]) - Atom typing, parameters, potentials and gradients
//! - **Numerics** ([`utils`]) - Minimization and optimal superposition

pub mod chem;
pub mod forcefield;
pub mod io;
pub mod models;
pub mod utils;
