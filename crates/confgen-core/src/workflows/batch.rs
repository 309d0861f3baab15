use super::generate::{self, GenerationResult};
use super::output::{self, MoleculeLayout, OutputError};
use crate::core::io::smi::{SmiEntry, SmiError, SmiFile};
use crate::core::io::traits::RecordFile;
use crate::engine::config::GeneratorConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{MoleculeOutcome, Progress, ProgressReporter};
use crate::engine::state::MoleculeStage;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Batch size must be at least 1")]
    InvalidBatchSize,
    #[error("Failed to read molecule list: {0}")]
    Input(#[from] SmiError),
    #[error("Cannot prepare output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Where and how a batch run writes its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub output_dir: PathBuf,
    /// Maximum number of molecule directories per `batch_XXXX` folder.
    pub batch_size: usize,
    /// Recompute molecules whose output is already complete.
    pub force: bool,
    /// Remove batch folders this run created if they end up empty.
    pub cleanup: bool,
}

impl BatchConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            batch_size: 1000,
            force: false,
            cleanup: true,
        }
    }
}

/// One input line resolved to its final name and output location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub index: usize,
    pub line_number: usize,
    pub name: String,
    pub smiles: String,
    pub layout: MoleculeLayout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedMolecule {
    pub index: usize,
    pub name: String,
    pub smiles: String,
    /// Last stage the molecule reached. `None` when processing panicked.
    pub stage: Option<MoleculeStage>,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Final tally of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub skipped: usize,
    /// Failures in input order.
    pub failed: Vec<FailedMolecule>,
    /// Counts keyed by batch directory name.
    pub per_batch: BTreeMap<String, BatchCounts>,
    /// Empty directories removed by the cleanup pass, limited to batch folders this run
    /// created.
    pub removed_dirs: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[derive(Debug)]
enum JobOutcome {
    Succeeded,
    Skipped,
    Failed {
        stage: Option<MoleculeStage>,
        reason: String,
    },
}

impl JobOutcome {
    fn kind(&self) -> MoleculeOutcome {
        match self {
            Self::Succeeded => MoleculeOutcome::Succeeded,
            Self::Skipped => MoleculeOutcome::Skipped,
            Self::Failed { .. } => MoleculeOutcome::Failed,
        }
    }
}

/// Resolves names and output locations for every entry.
///
/// Names are sanitized; entries without a usable name become `molecule_<line>`. A name
/// already taken gets a `_<line>` suffix, then `_<line>_<k>` with the smallest free `k`.
pub fn plan_jobs(entries: &[SmiEntry], config: &BatchConfig) -> Vec<BatchJob> {
    let mut taken = HashSet::new();
    entries
        .iter()
        .map(|entry| {
            let base = entry
                .name
                .as_deref()
                .map(output::safe_name)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("molecule_{}", entry.line_number));
            let mut name = base.clone();
            if taken.contains(&name) {
                name = format!("{base}_{}", entry.line_number);
            }
            let suffixed = name.clone();
            let mut k = 2;
            while taken.contains(&name) {
                name = format!("{suffixed}_{k}");
                k += 1;
            }
            taken.insert(name.clone());
            BatchJob {
                index: entry.index,
                line_number: entry.line_number,
                layout: MoleculeLayout::new(&config.output_dir, entry.index, config.batch_size, &name),
                name,
                smiles: entry.smiles.clone(),
            }
        })
        .collect()
}

#[derive(Debug, Error)]
enum JobError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("Failed to write output: {0}")]
    Output(#[from] OutputError),
}

impl JobError {
    fn stage(&self) -> MoleculeStage {
        match self {
            Self::Engine(e) => e.stage(),
            Self::Output(_) => MoleculeStage::Finalized,
        }
    }
}

fn generate_and_write(job: &BatchJob, generator: &GeneratorConfig) -> Result<GenerationResult, JobError> {
    let result = generate::run_smiles(&job.smiles, generator, &ProgressReporter::new())?;
    output::write_molecule(&job.layout, &job.smiles, &result)?;
    Ok(result)
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unexpected panic".to_string())
}

#[instrument(skip_all, fields(index = job.index, name = %job.name))]
fn process_job(job: &BatchJob, generator: &GeneratorConfig, force: bool) -> JobOutcome {
    if !force && job.layout.is_complete() {
        debug!("Output already complete; skipping.");
        return JobOutcome::Skipped;
    }

    let attempt = panic::catch_unwind(AssertUnwindSafe(|| generate_and_write(job, generator)));
    let (stage, reason) = match attempt {
        Ok(Ok(result)) => {
            debug!(
                kept = result.conformers.len(),
                rule = %result.diagnostics.prune_rule,
                "Molecule finished."
            );
            return JobOutcome::Succeeded;
        }
        Ok(Err(e)) => (Some(e.stage()), e.to_string()),
        Err(payload) => (None, panic_reason(payload.as_ref())),
    };

    warn!(smiles = %job.smiles, stage = ?stage, %reason, "Molecule failed.");
    if let Err(e) = output::remove_partial(&job.layout) {
        warn!(error = %e, "Could not remove partial output.");
    }
    JobOutcome::Failed { stage, reason }
}

/// Removes empty molecule folders inside `batch_dir`, then `batch_dir` itself if nothing
/// is left.
fn remove_if_empty(batch_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut removed = output::remove_empty_dirs(batch_dir, false)?;
    if std::fs::read_dir(batch_dir)?.next().is_none() {
        std::fs::remove_dir(batch_dir)?;
        removed.push(batch_dir.to_path_buf());
    }
    Ok(removed)
}

/// Runs conformer generation for every entry and writes the results under
/// [`BatchConfig::output_dir`].
///
/// A failing molecule never stops the run; it is recorded in the summary and leaves no
/// output directory behind.
///
/// # Errors
///
/// Returns [`BatchError`] only for problems that affect the whole run: an invalid batch
/// size or an output directory that cannot be created.
#[instrument(skip_all, name = "batch_workflow", fields(molecules = entries.len(), output = %config.output_dir.display()))]
pub fn run(
    entries: &[SmiEntry],
    generator: &GeneratorConfig,
    config: &BatchConfig,
    reporter: &ProgressReporter,
) -> Result<BatchSummary, BatchError> {
    if config.batch_size == 0 {
        return Err(BatchError::InvalidBatchSize);
    }
    let jobs = plan_jobs(entries, config);
    let batch_dirs: BTreeSet<&Path> = jobs.iter().map(|j| j.layout.batch_dir.as_path()).collect();
    let created: Vec<&Path> = batch_dirs.iter().copied().filter(|d| !d.exists()).collect();
    for dir in std::iter::once(config.output_dir.as_path()).chain(batch_dirs) {
        std::fs::create_dir_all(dir).map_err(|source| BatchError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    // === Phase 1: Conformer generation ===
    reporter.report(Progress::PhaseStart {
        name: "Conformer generation",
    });
    reporter.report(Progress::TaskStart {
        total_steps: jobs.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = jobs.iter();

    #[cfg(feature = "parallel")]
    let iterator = jobs.par_iter();

    let outcomes: Vec<JobOutcome> = iterator
        .map(|job| {
            let outcome = process_job(job, generator, config.force);
            reporter.report(Progress::MoleculeFinished(outcome.kind()));
            outcome
        })
        .collect();
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Tally ===
    let mut summary = BatchSummary::default();
    for (job, outcome) in jobs.iter().zip(outcomes) {
        let batch_name = output::batch_dir_name(job.index, config.batch_size);
        let counts = summary.per_batch.entry(batch_name).or_default();
        match outcome {
            JobOutcome::Succeeded => {
                counts.succeeded += 1;
                summary.succeeded += 1;
            }
            JobOutcome::Skipped => {
                counts.skipped += 1;
                summary.skipped += 1;
            }
            JobOutcome::Failed { stage, reason } => {
                counts.failed += 1;
                summary.failed.push(FailedMolecule {
                    index: job.index,
                    name: job.name.clone(),
                    smiles: job.smiles.clone(),
                    stage,
                    reason,
                });
            }
        }
    }

    // === Phase 3: Cleanup ===
    if config.cleanup && !created.is_empty() {
        reporter.report(Progress::PhaseStart { name: "Cleanup" });
        for dir in created {
            match remove_if_empty(dir) {
                Ok(removed) => summary.removed_dirs.extend(removed),
                Err(e) => warn!(dir = %dir.display(), error = %e, "Empty directory cleanup failed."),
            }
        }
        reporter.report(Progress::PhaseFinish);
    }

    info!(
        succeeded = summary.succeeded,
        failed = summary.failed.len(),
        skipped = summary.skipped,
        "Batch run complete."
    );
    reporter.report(Progress::Message(format!(
        "{} succeeded, {} failed, {} skipped",
        summary.succeeded,
        summary.failed.len(),
        summary.skipped
    )));
    Ok(summary)
}

/// Reads a molecule list and runs it through [`run`].
///
/// # Errors
///
/// Returns [`BatchError::Input`] if the list cannot be read, otherwise as [`run`].
pub fn run_file(
    input: &Path,
    generator: &GeneratorConfig,
    config: &BatchConfig,
    reporter: &ProgressReporter,
) -> Result<BatchSummary, BatchError> {
    let entries = SmiFile::read_from_path(input)?;
    info!(path = %input.display(), molecules = entries.len(), "Loaded molecule list.");
    run(&entries, generator, config, reporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::GeneratorConfigBuilder;
    use std::fs;
    use std::io::Cursor;
    use std::sync::Mutex;
    use tempfile::tempdir;

    fn entries(text: &str) -> Vec<SmiEntry> {
        SmiFile::read_from(&mut Cursor::new(text)).unwrap()
    }

    fn quick_config() -> GeneratorConfig {
        GeneratorConfigBuilder::new()
            .max_conformers(1)
            .pool_multiplier(2)
            .build()
            .unwrap()
    }

    #[test]
    fn names_are_sanitized_defaulted_and_deduplicated() {
        let config = BatchConfig::new("/out");
        let jobs = plan_jobs(&entries("O water\nCC\nCO water\nCCC ***\n"), &config);
        let names: Vec<_> = jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, ["water", "molecule_2", "water_3", "molecule_4"]);
        assert_eq!(
            jobs[2].layout.molecule_dir,
            PathBuf::from("/out/batch_0000/water_3")
        );
    }

    #[test]
    fn suffixed_names_never_collide_with_written_names() {
        let config = BatchConfig::new("/out");
        let jobs = plan_jobs(&entries("O water_3\nC water\nCC water\nCCC water\n"), &config);
        let names: Vec<_> = jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, ["water_3", "water", "water_3_2", "water_4"]);
        let dirs: HashSet<_> = jobs.iter().map(|j| &j.layout.molecule_dir).collect();
        assert_eq!(dirs.len(), jobs.len());
    }

    #[test]
    fn molecules_are_grouped_into_batches() {
        let mut config = BatchConfig::new("/out");
        config.batch_size = 2;
        let jobs = plan_jobs(&entries("C a\nC b\nC c\n"), &config);
        assert_eq!(jobs[1].layout.batch_dir, PathBuf::from("/out/batch_0000"));
        assert_eq!(jobs[2].layout.batch_dir, PathBuf::from("/out/batch_0001"));
    }

    #[test]
    fn failures_are_tallied_without_stopping_the_run() {
        let root = tempdir().unwrap();
        let config = BatchConfig::new(root.path());
        let list = entries("O water\nC1CC( broken\nC1CC#CC1 strained\nCC ethane\n");
        let summary = run(&list, &quick_config(), &config, &ProgressReporter::new()).unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed.len(), 2);
        assert_eq!(summary.failed[0].name, "broken");
        assert_eq!(summary.failed[0].index, 1);
        assert_eq!(summary.failed[1].smiles, "C1CC#CC1");
        assert!(summary.failed[1].reason.starts_with("Embedding failed"));
        assert_eq!(summary.failed[0].stage, Some(MoleculeStage::Received));
        assert_eq!(summary.failed[1].stage, Some(MoleculeStage::Embedded));
        assert!(summary.has_failures());
        assert_eq!(summary.per_batch["batch_0000"].failed, 2);

        let batch = root.path().join("batch_0000");
        assert!(batch.join("water/conformer/conformer.xyz").is_file());
        assert!(batch.join("ethane/conformer/info.txt").is_file());
        assert!(!batch.join("broken").exists());
        assert!(!batch.join("strained").exists());
    }

    #[test]
    fn completed_molecules_are_skipped_unless_forced() {
        let root = tempdir().unwrap();
        let mut config = BatchConfig::new(root.path());
        let list = entries("O water\n");

        let first = run(&list, &quick_config(), &config, &ProgressReporter::new()).unwrap();
        assert_eq!(first.succeeded, 1);

        let second = run(&list, &quick_config(), &config, &ProgressReporter::new()).unwrap();
        assert_eq!(second.skipped, 1);
        assert_eq!(second.succeeded, 0);

        config.force = true;
        let forced = run(&list, &quick_config(), &config, &ProgressReporter::new()).unwrap();
        assert_eq!(forced.succeeded, 1);
        assert_eq!(forced.total(), 1);
    }

    #[test]
    fn incomplete_output_is_recomputed() {
        let root = tempdir().unwrap();
        let config = BatchConfig::new(root.path());
        let partial = root.path().join("batch_0000/water/conformer");
        fs::create_dir_all(&partial).unwrap();
        fs::write(partial.join("conformer.xyz"), "").unwrap();

        let summary = run(&entries("O water\n"), &quick_config(), &config, &ProgressReporter::new())
            .unwrap();
        assert_eq!(summary.succeeded, 1);
        assert!(partial.join("info.txt").is_file());
    }

    #[test]
    fn cleanup_removes_batches_left_empty() {
        let root = tempdir().unwrap();
        let mut config = BatchConfig::new(root.path());
        config.batch_size = 1;
        let list = entries("O water\nC1CC( broken\n");

        let summary = run(&list, &quick_config(), &config, &ProgressReporter::new()).unwrap();
        assert!(root.path().join("batch_0000").exists());
        assert!(!root.path().join("batch_0001").exists());
        assert!(summary.removed_dirs.iter().any(|p| p.ends_with("batch_0001")));
    }

    #[test]
    fn cleanup_leaves_directories_it_did_not_create() {
        let root = tempdir().unwrap();
        let mut config = BatchConfig::new(root.path());
        config.batch_size = 1;
        let keep = root.path().join("notes");
        let old_batch = root.path().join("batch_0001");
        fs::create_dir_all(&keep).unwrap();
        fs::create_dir_all(old_batch.join("leftover")).unwrap();
        let list = entries("C1CC( broken\nC1CC( also_broken\nC1CC( still_broken\n");

        let summary = run(&list, &quick_config(), &config, &ProgressReporter::new()).unwrap();
        assert_eq!(summary.failed.len(), 3);
        assert!(keep.is_dir());
        assert!(old_batch.join("leftover").is_dir());
        assert!(!root.path().join("batch_0000").exists());
        assert!(!root.path().join("batch_0002").exists());
        assert_eq!(summary.removed_dirs.len(), 2);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let root = tempdir().unwrap();
        let mut config = BatchConfig::new(root.path());
        config.batch_size = 0;
        let err = run(&[], &quick_config(), &config, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, BatchError::InvalidBatchSize));
    }

    #[test]
    fn every_molecule_reports_its_outcome() {
        let root = tempdir().unwrap();
        let config = BatchConfig::new(root.path());
        let outcomes = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::MoleculeFinished(outcome) = event {
                outcomes.lock().unwrap().push(outcome);
            }
        }));
        run(&entries("O\nC1CC(\nN\n"), &quick_config(), &config, &reporter).unwrap();
        drop(reporter);
        let mut outcomes = outcomes.into_inner().unwrap();
        outcomes.sort_by_key(|o| *o as u8);
        assert_eq!(
            outcomes,
            [
                MoleculeOutcome::Succeeded,
                MoleculeOutcome::Succeeded,
                MoleculeOutcome::Failed
            ]
        );
    }

    #[test]
    fn molecule_list_is_read_from_disk() {
        let root = tempdir().unwrap();
        let input = root.path().join("input.smi");
        fs::write(&input, "# list\nO water\n").unwrap();
        let config = BatchConfig::new(root.path().join("out"));
        let summary = run_file(&input, &quick_config(), &config, &ProgressReporter::new()).unwrap();
        assert_eq!(summary.succeeded, 1);
    }
}
