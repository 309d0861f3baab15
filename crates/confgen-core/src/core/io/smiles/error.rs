use thiserror::Error;

/// Errors produced when parsing molecular line notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    #[error("Empty line notation")]
    EmptyInput,
    #[error("Unexpected end of line notation")]
    UnexpectedEnd,
    #[error("Unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    #[error("Invalid element '{text}' at position {pos}")]
    InvalidElement { pos: usize, text: String },
    #[error("Unclosed bracket atom starting at position {pos}")]
    UnclosedBracket { pos: usize },
    #[error("Invalid charge at position {pos}")]
    InvalidCharge { pos: usize },
    #[error("Invalid number at position {pos}")]
    InvalidNumber { pos: usize },
    #[error("Unmatched parenthesis at position {pos}")]
    UnmatchedParen { pos: usize },
    #[error("Ring closure {digit} was opened but never closed")]
    UnclosedRing { digit: u16 },
    #[error("Conflicting bond orders on ring closure {digit}")]
    RingBondConflict { digit: u16 },
    #[error("Ring closure {digit} at position {pos} would bond an atom to itself or duplicate a bond")]
    InvalidRingBond { digit: u16, pos: usize },
    #[error("Bond at position {pos} has no atom to attach to")]
    DanglingBond { pos: usize },
}
