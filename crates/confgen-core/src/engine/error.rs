use super::embedding::EmbeddingError;
use super::state::MoleculeStage;
use crate::core::io::smiles::SmilesError;
use thiserror::Error;

/// Conditions that end processing of one molecule.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid molecule input: {0}")]
    InvalidInput(#[from] SmilesError),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Processing failed while {stage}: {reason}")]
    Fatal { stage: MoleculeStage, reason: String },
}

impl EngineError {
    /// The stage at which processing stopped.
    pub fn stage(&self) -> MoleculeStage {
        match self {
            Self::InvalidInput(_) => MoleculeStage::Received,
            Self::Embedding(_) => MoleculeStage::Embedded,
            Self::Fatal { stage, .. } => *stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_report_the_stage_they_stopped_at() {
        let err = EngineError::from(EmbeddingError::EmptyMolecule);
        assert_eq!(err.stage(), MoleculeStage::Embedded);
        assert!(err.to_string().starts_with("Embedding failed"));

        let err = EngineError::Fatal {
            stage: MoleculeStage::Pruned,
            reason: "empty selection".into(),
        };
        assert_eq!(err.to_string(), "Processing failed while pruned: empty selection");
    }
}
