use crate::core::forcefield::energy::{ForceField, ForceFieldError};
use crate::core::forcefield::kind::ForceFieldKind;
use crate::core::models::conformer::{CandidateGeometry, MinimizationStatus};
use crate::core::models::molecule::Molecule;
use crate::core::utils::geometry::{flatten, unflatten};
use crate::core::utils::minimizer::{MinimizerSettings, minimize};
use crate::engine::config::MinimizationConfig;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-pool tally of how each candidate's minimization ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MinimizationSummary {
    pub primary: usize,
    pub fallback: usize,
    /// Candidates that kept their embedded geometry because every force field failed.
    pub unminimized: usize,
}

type PreparedField = (ForceFieldKind, Result<ForceField, ForceFieldError>);

/// Minimizes one candidate in place with the first force field that converges.
fn minimize_candidate(
    candidate: &mut CandidateGeometry,
    fields: &[PreparedField],
    settings: &MinimizerSettings,
) {
    for (kind, field) in fields {
        let field = match field {
            Ok(field) => field,
            Err(e) => {
                debug!(candidate = candidate.pool_index, force_field = %kind, error = %e, "Force field unavailable.");
                continue;
            }
        };
        let mut coords = flatten(&candidate.positions);
        match minimize(field, &mut coords, settings) {
            Ok(report) if report.converged() => {
                candidate.positions = unflatten(&coords);
                candidate.status = MinimizationStatus::Minimized(*kind);
                return;
            }
            Ok(report) => debug!(
                candidate = candidate.pool_index,
                force_field = %kind,
                iterations = report.iterations,
                "Minimization did not converge."
            ),
            Err(e) => debug!(candidate = candidate.pool_index, force_field = %kind, error = %e, "Minimization failed."),
        }
    }
    candidate.status = MinimizationStatus::UnminimizedFallback;
}

/// Minimizes every candidate, trying the primary then the fallback force field.
///
/// Candidates for which both fail keep their embedded coordinates and are marked
/// [`MinimizationStatus::UnminimizedFallback`]; none are dropped.
#[instrument(skip_all, name = "minimization_task")]
pub fn run(
    mol: &Molecule,
    candidates: &mut [CandidateGeometry],
    config: &MinimizationConfig,
    reporter: &ProgressReporter,
) -> MinimizationSummary {
    let fields: Vec<PreparedField> = config
        .force_field_order()
        .into_iter()
        .map(|kind| (kind, ForceField::build(mol, kind)))
        .collect();
    for (kind, field) in &fields {
        if let Err(e) = field {
            warn!(force_field = %kind, error = %e, "Force field cannot be set up for this molecule.");
        }
    }

    reporter.report(Progress::TaskStart {
        total_steps: candidates.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = candidates.iter_mut();

    #[cfg(feature = "parallel")]
    let iterator = candidates.par_iter_mut();

    iterator.for_each(|candidate| {
        minimize_candidate(candidate, &fields, &config.settings);
        reporter.report(Progress::TaskIncrement);
    });
    reporter.report(Progress::TaskFinish);

    let mut summary = MinimizationSummary::default();
    for candidate in candidates.iter() {
        match candidate.status {
            MinimizationStatus::Minimized(kind) if kind == config.primary_force_field => {
                summary.primary += 1
            }
            MinimizationStatus::Minimized(_) => summary.fallback += 1,
            MinimizationStatus::UnminimizedFallback => summary.unminimized += 1,
        }
    }
    if summary.unminimized > 0 {
        warn!(
            unminimized = summary.unminimized,
            total = candidates.len(),
            "Some candidates kept their embedded geometry."
        );
    }
    info!(
        primary = summary.primary,
        fallback = summary.fallback,
        unminimized = summary.unminimized,
        "Minimization complete."
    );
    summary
}
