use confgen::engine::progress::{MoleculeOutcome, Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Running per-molecule outcome counts of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl Tally {
    fn record(&mut self, outcome: MoleculeOutcome) {
        match outcome {
            MoleculeOutcome::Succeeded => self.succeeded += 1,
            MoleculeOutcome::Failed => self.failed += 1,
            MoleculeOutcome::Skipped => self.skipped += 1,
        }
    }

    fn label(&self) -> String {
        format!(
            "✓ {}  ✗ {}  ↷ {}",
            self.succeeded, self.failed, self.skipped
        )
    }
}

struct BarState {
    bar: ProgressBar,
    tally: Tally,
}

impl BarState {
    fn handle(&mut self, event: Progress) {
        match event {
            Progress::PhaseStart { name } => {
                self.bar.reset();
                self.bar.set_length(0);
                self.bar.set_style(spinner_style());
                self.bar.set_prefix(name);
                self.bar.set_message("");
                self.bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
            }
            Progress::TaskStart { total_steps } => {
                self.tally = Tally::default();
                self.bar.disable_steady_tick();
                self.bar.reset();
                self.bar.set_length(total_steps);
                self.bar.set_style(bar_style());
                self.bar.set_message(self.tally.label());
            }
            Progress::MoleculeFinished(outcome) => {
                self.tally.record(outcome);
                self.bar.inc(1);
                self.bar.set_message(self.tally.label());
            }
            Progress::TaskIncrement => self.bar.inc(1),
            Progress::TaskFinish => {
                self.bar.finish_with_message(self.tally.label());
            }
            Progress::PhaseFinish => {
                self.bar.disable_steady_tick();
                if !self.bar.is_finished() {
                    self.bar.finish_with_message("done");
                }
            }
            Progress::Message(msg) => self.bar.println(format!("  {msg}")),
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {prefix} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<22} [{bar:40.cyan/blue}] {pos}/{len} {msg} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

/// Batch progress on stderr: a spinner per batch phase, and a molecule bar whose message
/// carries the running succeeded/failed/skipped counts.
#[derive(Clone)]
pub struct BatchProgress {
    state: Arc<Mutex<BarState>>,
}

impl BatchProgress {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Tracks the batch without drawing anything.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target).with_style(spinner_style());
        Self {
            state: Arc::new(Mutex::new(BarState {
                bar,
                tally: Tally::default(),
            })),
        }
    }

    /// Counts of the current (or last) molecule task.
    #[cfg(test)]
    pub fn tally(&self) -> Tally {
        self.state.lock().map(|s| s.tally).unwrap_or_default()
    }

    pub fn callback(&self) -> ProgressCallback<'static> {
        let state = self.state.clone();
        Box::new(move |event: Progress| {
            let Ok(mut state) = state.lock() else {
                warn!("Progress state mutex was poisoned. Dropping event.");
                return;
            };
            state.handle(event);
        })
    }
}

impl Default for BatchProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn bar(progress: &BatchProgress) -> ProgressBar {
        progress.state.lock().unwrap().bar.clone()
    }

    #[test]
    fn molecule_outcomes_are_counted_in_the_bar_message() {
        let progress = BatchProgress::hidden();
        let callback = progress.callback();

        callback(Progress::PhaseStart {
            name: "Conformer generation",
        });
        assert_eq!(bar(&progress).prefix(), "Conformer generation");

        callback(Progress::TaskStart { total_steps: 4 });
        callback(Progress::MoleculeFinished(MoleculeOutcome::Succeeded));
        callback(Progress::MoleculeFinished(MoleculeOutcome::Failed));
        callback(Progress::MoleculeFinished(MoleculeOutcome::Succeeded));
        assert_eq!(bar(&progress).position(), 3);
        assert_eq!(bar(&progress).message(), "✓ 2  ✗ 1  ↷ 0");

        callback(Progress::MoleculeFinished(MoleculeOutcome::Skipped));
        callback(Progress::TaskFinish);
        callback(Progress::PhaseFinish);
        let pb = bar(&progress);
        assert!(pb.is_finished());
        assert_eq!(pb.position(), 4);
        assert_eq!(pb.message(), "✓ 2  ✗ 1  ↷ 1");
        assert_eq!(
            progress.tally(),
            Tally {
                succeeded: 2,
                failed: 1,
                skipped: 1
            }
        );
    }

    #[test]
    fn cleanup_phase_restarts_as_a_spinner() {
        let progress = BatchProgress::hidden();
        let callback = progress.callback();
        callback(Progress::TaskStart { total_steps: 1 });
        callback(Progress::MoleculeFinished(MoleculeOutcome::Failed));
        callback(Progress::TaskFinish);

        callback(Progress::PhaseStart { name: "Cleanup" });
        assert!(!bar(&progress).is_finished());
        assert_eq!(bar(&progress).prefix(), "Cleanup");
        callback(Progress::PhaseFinish);
        assert_eq!(bar(&progress).message(), "done");
        assert_eq!(progress.tally().failed, 1);
    }

    #[test]
    fn a_new_task_resets_the_counts() {
        let progress = BatchProgress::hidden();
        let callback = progress.callback();
        callback(Progress::TaskStart { total_steps: 2 });
        callback(Progress::MoleculeFinished(MoleculeOutcome::Succeeded));
        callback(Progress::TaskStart { total_steps: 2 });
        assert_eq!(progress.tally(), Tally::default());
        assert_eq!(bar(&progress).position(), 0);
    }

    #[test]
    fn concurrent_workers_are_all_counted() {
        let progress = BatchProgress::hidden();
        let callback = progress.callback();
        callback(Progress::TaskStart { total_steps: 8 });

        thread::scope(|scope| {
            for k in 0..8 {
                let callback = &callback;
                scope.spawn(move || {
                    let outcome = if k % 4 == 0 {
                        MoleculeOutcome::Failed
                    } else {
                        MoleculeOutcome::Succeeded
                    };
                    callback(Progress::MoleculeFinished(outcome));
                });
            }
        });

        assert_eq!(bar(&progress).position(), 8);
        assert_eq!(progress.tally().succeeded, 6);
        assert_eq!(progress.tally().failed, 2);
    }
}
