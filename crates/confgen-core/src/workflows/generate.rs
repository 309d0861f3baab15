use crate::core::chem::charge::{ChargeSpinAssignment, infer_charge_spin};
use crate::core::chem::hydrogens::add_hydrogens;
use crate::core::chem::sanitize::{SanitizeOps, sanitize};
use crate::core::chem::symmetry::AtomSymmetry;
use crate::core::io::smiles::parse_smiles;
use crate::core::models::conformer::ConformerSet;
use crate::core::models::molecule::Molecule;
use crate::engine::config::{EmbeddingMethod, GeneratorConfig};
use crate::engine::embedding::generate_pool;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::MoleculeState;
use crate::engine::tasks::minimization::MinimizationSummary;
use crate::engine::tasks::pruning::PruneRule;
use crate::engine::tasks::{distance_matrix, energy_evaluation, minimization, pruning};
use tracing::{info, instrument, warn};

/// Non-fatal conditions met while processing one molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    /// Every sanitization level failed and a best-effort graph was used.
    pub sanitization_degraded: bool,
    pub sanitize_ops: SanitizeOps,
    pub embedding_method: EmbeddingMethod,
    /// Pool slots the embedding method could not fill.
    pub failed_embeddings: usize,
    pub minimization: MinimizationSummary,
    /// Candidates whose energy is the infinite sentinel.
    pub energy_failures: usize,
    /// Candidate pairs whose distance is the infinite sentinel.
    pub distance_failures: usize,
    pub prune_rule: PruneRule,
    pub discarded: usize,
}

/// Everything produced for one molecule.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// The sanitized, hydrogen-complete graph the conformers belong to.
    pub molecule: Molecule,
    pub conformers: ConformerSet,
    pub charge_spin: ChargeSpinAssignment,
    pub pool_size: usize,
    pub diagnostics: Diagnostics,
}

/// Parses line notation and runs [`run`] on the resulting graph.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] for unparseable notation, otherwise as [`run`].
pub fn run_smiles(
    smiles: &str,
    config: &GeneratorConfig,
    reporter: &ProgressReporter,
) -> Result<GenerationResult, EngineError> {
    let mol = parse_smiles(smiles)?;
    run(&mol, config, reporter)
}

/// Turns one molecular graph into a pruned conformer set plus charge and spin.
///
/// Stages run strictly in sequence: sanitize, embed, minimize, score, compare, prune.
///
/// # Errors
///
/// Returns [`EngineError::Embedding`] when no structure can be embedded and
/// [`EngineError::Fatal`] for any other condition that leaves no usable conformer.
#[instrument(skip_all, name = "generation_workflow", fields(molecule = %mol.name.as_deref().unwrap_or("")))]
pub fn run(
    mol: &Molecule,
    config: &GeneratorConfig,
    reporter: &ProgressReporter,
) -> Result<GenerationResult, EngineError> {
    let mut state = MoleculeState::default();

    // === Phase 1: Sanitization ===
    reporter.report(Progress::PhaseStart {
        name: "Sanitization",
    });
    let sanitized = sanitize(mol);
    if sanitized.degraded {
        warn!(
            failures = sanitized.failures.len(),
            "Sanitization degraded; continuing with best-effort graph."
        );
    }
    let charge_spin = infer_charge_spin(&sanitized.molecule);
    let hydrogenated = add_hydrogens(&sanitized.molecule);
    let pool_size = config.pool_size(hydrogenated.atom_count());
    state.advance();
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Candidate pool ===
    reporter.report(Progress::PhaseStart { name: "Embedding" });
    let pool = generate_pool(&hydrogenated, pool_size, &config.embedding, reporter)?;
    let mut candidates = pool.candidates;
    state.advance();
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Minimization and scoring ===
    reporter.report(Progress::PhaseStart {
        name: "Minimization",
    });
    let minimization =
        minimization::run(&hydrogenated, &mut candidates, &config.minimization, reporter);
    let energy_failures =
        energy_evaluation::run(&hydrogenated, &mut candidates, &config.minimization);
    state.advance();
    reporter.report(Progress::PhaseFinish);

    // === Phase 4: Diversity pruning ===
    reporter.report(Progress::PhaseStart { name: "Pruning" });
    let distances = (config.diversity_enabled() && candidates.len() > 1).then(|| {
        let symmetry = AtomSymmetry::perceive(&hydrogenated);
        distance_matrix::run(&candidates, &symmetry, reporter)
    });
    let distance_failures = distances.as_ref().map_or(0, |d| d.failed_pairs());
    let outcome = pruning::run(
        candidates,
        distances.as_ref(),
        config.max_conformers,
        config.rmsd_threshold,
    );
    state.advance();
    reporter.report(Progress::PhaseFinish);

    if outcome.kept.is_empty() {
        state.fail("pruning kept no conformers");
        return Err(EngineError::Fatal {
            stage: state.stage(),
            reason: "pruning kept no conformers".to_string(),
        });
    }
    state.advance();

    let diagnostics = Diagnostics {
        sanitization_degraded: sanitized.degraded,
        sanitize_ops: sanitized.applied,
        embedding_method: pool.method,
        failed_embeddings: pool.failed_slots,
        minimization,
        energy_failures,
        distance_failures,
        prune_rule: outcome.rule,
        discarded: outcome.discarded.len(),
    };
    info!(
        stage = %state.stage(),
        kept = outcome.kept.len(),
        pool = pool_size,
        charge = charge_spin.charge,
        spin = charge_spin.spin_multiplicity,
        "Conformer generation complete."
    );

    Ok(GenerationResult {
        molecule: hydrogenated,
        conformers: ConformerSet::new(outcome.kept),
        charge_spin,
        pool_size,
        diagnostics,
    })
}
