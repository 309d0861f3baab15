//! # Engine Module
//!
//! The per-molecule conformer generation machinery.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - The generator configuration record, its builder and
//!   the pool sizing policy
//! - **Error Handling** ([`error`]) - Fatal per-molecule error taxonomy
//! - **State Tracking** ([`state`]) - Processing stages and the failure terminal state
//! - **Progress Monitoring** ([`progress`]) - Optional progress callbacks for front ends
//! - **Embedding** ([`embedding`]) - Distance bounds, distance-geometry embedding and the
//!   random-coordinate fallback
//! - **Tasks** ([`tasks`]) - Minimization, energy scoring, pairwise RMSD and pruning
//!
//! ## Key Capabilities
//!
//! - **Reproducible pools** with one seeded random stream per candidate
//! - **Graceful degradation**: failed minimizations keep their embedded geometry, failed
//!   energies and distances become an infinite sentinel instead of errors
//! - **Parallel pools** through `rayon` behind the `parallel` feature

pub mod config;
pub mod embedding;
pub mod error;
pub mod progress;
pub mod state;
pub mod tasks;
