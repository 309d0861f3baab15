//! # confgen Core Library
//!
//! A library for turning a two-dimensional molecular graph into a small, representative
//! set of force-field minimized three-dimensional conformers, together with the
//! molecule's total charge and spin multiplicity.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Molecule`, `CandidateGeometry`),
//!   chemistry perception (sanitization, valence, rings), file formats, force fields and
//!   numeric utilities such as the L-BFGS minimizer and best-fit RMSD.
//!
//! - **[`engine`]: The Logic Core.** Configuration, error taxonomy, progress reporting,
//!   the distance-geometry candidate pool generator, and the per-stage tasks that minimize,
//!   score, compare and prune the pool.
//!
//! - **[`workflows`]: The Public API.** The single-molecule generation pipeline and the
//!   batch runner that owns the on-disk output contract.

pub mod core;
pub mod engine;
pub mod workflows;
