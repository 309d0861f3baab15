//! Parser for molecular line notation (the SMILES subset used by input lists).
//!
//! Supports organic-subset and bracket atoms, all bond symbols, branches, single- and
//! two-digit ring closures, and dot-separated fragments. Tetrahedral (`@`, `@@`) and
//! double-bond (`/`, `\`) stereo is recorded on the graph.

pub mod error;
pub mod parser;
pub mod tokenizer;

pub use error::SmilesError;

use crate::core::models::molecule::Molecule;

/// Parses a line-notation string into an unsanitized molecular graph.
pub fn parse_smiles(input: &str) -> Result<Molecule, SmilesError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tokens = tokenizer::tokenize(trimmed)?;
    parser::build(&tokens)
}
