use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The force-field models available for minimization and energy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceFieldKind {
    Uff,
    Mmff94,
    /// MMFF94 variant with stiffer torsions around delocalized trigonal nitrogen.
    Mmff94s,
}

impl ForceFieldKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Uff => "uff",
            Self::Mmff94 => "mmff94",
            Self::Mmff94s => "mmff94s",
        }
    }

    pub fn is_mmff(self) -> bool {
        matches!(self, Self::Mmff94 | Self::Mmff94s)
    }
}

impl fmt::Display for ForceFieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown force field '{0}' (expected one of: uff, mmff94, mmff94s)")]
pub struct ParseForceFieldKindError(pub String);

impl FromStr for ForceFieldKind {
    type Err = ParseForceFieldKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uff" => Ok(Self::Uff),
            "mmff94" | "mmff" => Ok(Self::Mmff94),
            "mmff94s" => Ok(Self::Mmff94s),
            _ => Err(ParseForceFieldKindError(s.to_string())),
        }
    }
}
