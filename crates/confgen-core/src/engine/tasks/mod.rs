//! Per-stage computations of the conformer pipeline.
//!
//! Each submodule runs one stage over the whole candidate pool: force-field minimization
//! with fallback, energy scoring with an infinite sentinel for failures, the pairwise RMSD
//! matrix, and the energy-ordered greedy diversity pruner.

pub mod distance_matrix;
pub mod energy_evaluation;
pub mod minimization;
pub mod pruning;
