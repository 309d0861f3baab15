use std::fmt;

/// Processing stages of one molecule, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MoleculeStage {
    Received,
    Sanitized,
    Embedded,
    Minimized,
    Pruned,
    Finalized,
}

impl MoleculeStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Sanitized => "sanitized",
            Self::Embedded => "embedded",
            Self::Minimized => "minimized",
            Self::Pruned => "pruned",
            Self::Finalized => "finalized",
        }
    }

    /// The stage that follows this one, or `None` once finalized.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Received => Some(Self::Sanitized),
            Self::Sanitized => Some(Self::Embedded),
            Self::Embedded => Some(Self::Minimized),
            Self::Minimized => Some(Self::Pruned),
            Self::Pruned => Some(Self::Finalized),
            Self::Finalized => None,
        }
    }
}

impl fmt::Display for MoleculeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tracks how far one molecule got. Stages only move forward; a failure is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoleculeState {
    Active(MoleculeStage),
    Failed { stage: MoleculeStage, reason: String },
}

impl Default for MoleculeState {
    fn default() -> Self {
        Self::Active(MoleculeStage::Received)
    }
}

impl MoleculeState {
    /// Moves to the next stage. Has no effect on a failed or finalized molecule.
    pub fn advance(&mut self) {
        if let Self::Active(stage) = self {
            if let Some(next) = stage.next() {
                *stage = next;
            }
        }
    }

    /// Records a failure at the stage currently being worked on.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if let Self::Active(stage) = *self {
            *self = Self::Failed {
                stage: stage.next().unwrap_or(stage),
                reason: reason.into(),
            };
        }
    }

    pub fn stage(&self) -> MoleculeStage {
        match self {
            Self::Active(stage) | Self::Failed { stage, .. } => *stage,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
