//! Chemistry perception on molecular graphs: ring detection, valence rules, hybridization,
//! sanitization with leniency fallback, hydrogen addition, charge/spin inference and
//! topological symmetry for structure comparison.

pub mod charge;
pub mod hydrogens;
pub mod perception;
pub mod rings;
pub mod sanitize;
pub mod symmetry;
pub mod valence;
