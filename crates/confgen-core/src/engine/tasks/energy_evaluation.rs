use crate::core::forcefield::energy::{ForceField, ForceFieldError};
use crate::core::forcefield::kind::ForceFieldKind;
use crate::core::models::conformer::CandidateGeometry;
use crate::core::models::extended::ExtendedReal;
use crate::core::models::molecule::Molecule;
use crate::engine::config::MinimizationConfig;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Scores every candidate with the force field that produced its geometry, or with the
/// primary force field when it was never minimized.
///
/// Any failure sets that candidate's energy to [`ExtendedReal::Infinite`]. Returns the
/// number of candidates that could not be scored.
#[instrument(skip_all, name = "energy_evaluation_task")]
pub fn run(mol: &Molecule, candidates: &mut [CandidateGeometry], config: &MinimizationConfig) -> usize {
    let mut fields: HashMap<ForceFieldKind, Result<ForceField, ForceFieldError>> = HashMap::new();
    let mut failures = 0;

    for candidate in candidates.iter_mut() {
        let kind = candidate
            .status
            .force_field()
            .unwrap_or(config.primary_force_field);
        let field = fields
            .entry(kind)
            .or_insert_with(|| ForceField::build(mol, kind));

        let energy = field
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|ff| ff.energy(&candidate.positions));
        candidate.energy = match energy {
            Ok(terms) => ExtendedReal::new(terms.total()),
            Err(e) => {
                debug!(candidate = candidate.pool_index, force_field = %kind, error = %e, "Energy evaluation failed.");
                ExtendedReal::Infinite
            }
        };
        if !candidate.energy.is_finite() {
            failures += 1;
        }
    }

    if failures > 0 {
        warn!(failures, total = candidates.len(), "Some candidates have no energy.");
    } else {
        info!(total = candidates.len(), "All candidates scored.");
    }
    failures
}
