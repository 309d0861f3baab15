//! # Core Models Module
//!
//! Data structures describing molecules and their three-dimensional geometries.
//!
//! ## Key Components
//!
//! - [`element`] - Element identities and per-element constants (radii, valences)
//! - [`atom`] - Graph atoms with charge, aromaticity and hydrogen bookkeeping
//! - [`topology`] - Bond orders and bonds
//! - [`molecule`] - The molecular graph with adjacency indexing
//! - [`stereo`] - Tetrahedral and double-bond stereo annotations
//! - [`conformer`] - Candidate geometries and the retained conformer set
//! - [`extended`] - The finite-or-infinite sentinel used for energies and distances

pub mod atom;
pub mod conformer;
pub mod element;
pub mod extended;
pub mod molecule;
pub mod stereo;
pub mod topology;
