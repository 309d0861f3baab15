use crate::core::forcefield::kind::ForceFieldKind;
use crate::core::utils::minimizer::MinimizerSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

fn invalid(parameter: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        parameter,
        reason: reason.into(),
    }
}

/// How the candidate pool size is derived from the requested conformer count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PoolSizingPolicy {
    /// Always `max_conformers × pool_multiplier`.
    #[default]
    Fixed,
    /// Shrinks the multiplier for medium (20-49 atoms) and large (50+ atoms) molecules,
    /// counted after hydrogen addition.
    #[serde(alias = "adaptive")]
    AtomCountTiers,
}

impl PoolSizingPolicy {
    pub fn pool_size(&self, max_conformers: usize, pool_multiplier: usize, atom_count: usize) -> usize {
        let multiplier = match self {
            Self::Fixed => pool_multiplier,
            Self::AtomCountTiers if atom_count < 20 => pool_multiplier,
            Self::AtomCountTiers if atom_count < 50 => {
                pool_multiplier.saturating_sub(1).max(2).min(pool_multiplier)
            }
            Self::AtomCountTiers => pool_multiplier.min(2),
        };
        max_conformers.saturating_mul(multiplier)
    }
}

impl fmt::Display for PoolSizingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fixed => "fixed",
            Self::AtomCountTiers => "atom-count-tiers",
        })
    }
}

/// Candidate embedding strategies, in the order they may be tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbeddingMethod {
    /// Bounds-matrix distance geometry with a validation gate.
    DistanceGeometry,
    /// Random box coordinates refined against the bounds, without validation.
    RandomCoordinates,
}

impl fmt::Display for EmbeddingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DistanceGeometry => "distance-geometry",
            Self::RandomCoordinates => "random-coordinates",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePoolSizingPolicyError(pub String);

impl fmt::Display for ParsePoolSizingPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown pool sizing policy '{}'", self.0)
    }
}

impl std::error::Error for ParsePoolSizingPolicyError {}

impl FromStr for PoolSizingPolicy {
    type Err = ParsePoolSizingPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "atom-count-tiers" | "adaptive" => Ok(Self::AtomCountTiers),
            _ => Err(ParsePoolSizingPolicyError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingConfig {
    pub random_seed: u64,
    /// Embedding attempts per candidate before it is given up.
    pub max_attempts: usize,
    /// Largest bound violation (Å) an accepted distance-geometry structure may keep.
    pub validation_tolerance: f64,
    /// Methods tried in order until one yields at least one structure.
    pub methods: Vec<EmbeddingMethod>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinimizationConfig {
    pub primary_force_field: ForceFieldKind,
    pub fallback_force_field: ForceFieldKind,
    pub settings: MinimizerSettings,
}

impl MinimizationConfig {
    /// Force fields to try, in order. The fallback is dropped when it equals the primary.
    pub fn force_field_order(&self) -> Vec<ForceFieldKind> {
        if self.fallback_force_field == self.primary_force_field {
            vec![self.primary_force_field]
        } else {
            vec![self.primary_force_field, self.fallback_force_field]
        }
    }
}

/// Every knob of the generator for one molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub max_conformers: usize,
    pub pool_multiplier: usize,
    /// Minimum best-fit RMSD (Å) between kept conformers. Negative disables diversity filtering.
    pub rmsd_threshold: f64,
    pub pool_sizing: PoolSizingPolicy,
    pub embedding: EmbeddingConfig,
    pub minimization: MinimizationConfig,
}

impl GeneratorConfig {
    pub fn pool_size(&self, atom_count: usize) -> usize {
        self.pool_sizing
            .pool_size(self.max_conformers, self.pool_multiplier, atom_count)
    }

    pub fn diversity_enabled(&self) -> bool {
        self.rmsd_threshold >= 0.0
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_conformers: 1,
            pool_multiplier: 5,
            rmsd_threshold: 0.5,
            pool_sizing: PoolSizingPolicy::Fixed,
            embedding: EmbeddingConfig {
                random_seed: 42,
                max_attempts: 10,
                validation_tolerance: 0.25,
                methods: vec![
                    EmbeddingMethod::DistanceGeometry,
                    EmbeddingMethod::RandomCoordinates,
                ],
            },
            minimization: MinimizationConfig {
                primary_force_field: ForceFieldKind::Uff,
                fallback_force_field: ForceFieldKind::Mmff94,
                settings: MinimizerSettings::default(),
            },
        }
    }
}

#[derive(Default)]
pub struct GeneratorConfigBuilder {
    max_conformers: Option<usize>,
    pool_multiplier: Option<usize>,
    rmsd_threshold: Option<f64>,
    pool_sizing: Option<PoolSizingPolicy>,
    random_seed: Option<u64>,
    max_attempts: Option<usize>,
    validation_tolerance: Option<f64>,
    embedding_methods: Option<Vec<EmbeddingMethod>>,
    primary_force_field: Option<ForceFieldKind>,
    fallback_force_field: Option<ForceFieldKind>,
    max_iterations: Option<usize>,
}

impl GeneratorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_conformers(mut self, n: usize) -> Self {
        self.max_conformers = Some(n);
        self
    }
    pub fn pool_multiplier(mut self, n: usize) -> Self {
        self.pool_multiplier = Some(n);
        self
    }
    pub fn rmsd_threshold(mut self, threshold: f64) -> Self {
        self.rmsd_threshold = Some(threshold);
        self
    }
    pub fn pool_sizing(mut self, policy: PoolSizingPolicy) -> Self {
        self.pool_sizing = Some(policy);
        self
    }
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
    pub fn validation_tolerance(mut self, tolerance: f64) -> Self {
        self.validation_tolerance = Some(tolerance);
        self
    }
    pub fn embedding_methods(mut self, methods: Vec<EmbeddingMethod>) -> Self {
        self.embedding_methods = Some(methods);
        self
    }
    pub fn primary_force_field(mut self, kind: ForceFieldKind) -> Self {
        self.primary_force_field = Some(kind);
        self
    }
    pub fn fallback_force_field(mut self, kind: ForceFieldKind) -> Self {
        self.fallback_force_field = Some(kind);
        self
    }
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    pub fn build(self) -> Result<GeneratorConfig, ConfigError> {
        let defaults = GeneratorConfig::default();

        let max_conformers = self.max_conformers.unwrap_or(defaults.max_conformers);
        if max_conformers == 0 {
            return Err(invalid("max_conformers", "must be at least 1"));
        }
        let pool_multiplier = self.pool_multiplier.unwrap_or(defaults.pool_multiplier);
        if pool_multiplier == 0 {
            return Err(invalid("pool_multiplier", "must be at least 1"));
        }
        if max_conformers.checked_mul(pool_multiplier).is_none() {
            return Err(invalid(
                "pool_multiplier",
                format!("pool of {max_conformers} × {pool_multiplier} candidates is too large"),
            ));
        }
        let rmsd_threshold = self.rmsd_threshold.unwrap_or(defaults.rmsd_threshold);
        if !rmsd_threshold.is_finite() {
            return Err(invalid("rmsd_threshold", "must be a finite number"));
        }
        let max_attempts = self.max_attempts.unwrap_or(defaults.embedding.max_attempts);
        if max_attempts == 0 {
            return Err(invalid("max_attempts", "must be at least 1"));
        }
        let validation_tolerance = self
            .validation_tolerance
            .unwrap_or(defaults.embedding.validation_tolerance);
        if !validation_tolerance.is_finite() || validation_tolerance < 0.0 {
            return Err(invalid(
                "validation_tolerance",
                "must be a non-negative number",
            ));
        }
        let methods = self.embedding_methods.unwrap_or(defaults.embedding.methods);
        if methods.is_empty() {
            return Err(invalid("embedding_methods", "at least one method is required"));
        }
        let max_iterations = self
            .max_iterations
            .unwrap_or(defaults.minimization.settings.max_iterations);
        if max_iterations == 0 {
            return Err(invalid("max_iterations", "must be at least 1"));
        }

        Ok(GeneratorConfig {
            max_conformers,
            pool_multiplier,
            rmsd_threshold,
            pool_sizing: self.pool_sizing.unwrap_or(defaults.pool_sizing),
            embedding: EmbeddingConfig {
                random_seed: self.random_seed.unwrap_or(defaults.embedding.random_seed),
                max_attempts,
                validation_tolerance,
                methods,
            },
            minimization: MinimizationConfig {
                primary_force_field: self
                    .primary_force_field
                    .unwrap_or(defaults.minimization.primary_force_field),
                fallback_force_field: self
                    .fallback_force_field
                    .unwrap_or(defaults.minimization.fallback_force_field),
                settings: MinimizerSettings {
                    max_iterations,
                    ..defaults.minimization.settings
                },
            },
        })
    }
}
