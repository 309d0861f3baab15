//! # Workflows Module
//!
//! High-level entry points that orchestrate complete conformer generation runs.
//!
//! ## Overview
//!
//! Workflows tie the engine's stages together into something a caller can run on real
//! input: a single molecule in line notation, or a whole molecule list written to disk.
//!
//! ## Architecture
//!
//! - **Generation Workflow** ([`generate`]) - Sanitization, candidate pool embedding,
//!   force-field minimization, scoring and diversity pruning for one molecule, plus
//!   charge and spin inference.
//! - **Output Layout** ([`output`]) - Batch directory naming, completion checks, atomic
//!   molecule directory writes and empty-directory cleanup.
//! - **Batch Workflow** ([`batch`]) - Parallel processing of a molecule list with
//!   resumable output and a final success and failure tally.

pub mod batch;
pub mod generate;
pub mod output;
