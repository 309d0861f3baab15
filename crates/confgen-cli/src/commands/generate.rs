use crate::cli::GenerateArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::BatchProgress;
use confgen::engine::progress::ProgressReporter;
use confgen::workflows::batch::{self, BatchSummary};
use tracing::{info, warn};

fn print_summary(summary: &BatchSummary) {
    println!(
        "Processed {} molecule(s): {} succeeded, {} failed, {} skipped.",
        summary.total(),
        summary.succeeded,
        summary.failed.len(),
        summary.skipped
    );
    for (batch, counts) in &summary.per_batch {
        println!(
            "  {}: {} succeeded, {} failed, {} skipped",
            batch, counts.succeeded, counts.failed, counts.skipped
        );
    }
    if !summary.removed_dirs.is_empty() {
        println!("Removed {} empty director(ies).", summary.removed_dirs.len());
    }
    if summary.has_failures() {
        eprintln!("Failed molecules:");
        for failure in &summary.failed {
            let stage = failure
                .stage
                .map_or_else(|| "unknown stage".to_string(), |s| format!("after {s}"));
            eprintln!(
                "  #{} {} ({}), {}: {}",
                failure.index, failure.name, failure.smiles, stage, failure.reason
            );
        }
    }
}

pub fn run(args: GenerateArgs, show_progress: bool) -> Result<()> {
    let mut partial = PartialConfig::load(args.generator.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let generator = partial.merge_generator(&args.generator)?;
    let batch_config = partial.merge_batch(&args);

    let progress = if show_progress {
        BatchProgress::new()
    } else {
        BatchProgress::hidden()
    };
    let reporter = ProgressReporter::with_callback(progress.callback());

    println!(
        "Generating up to {} conformer(s) per molecule from {} into {}",
        generator.max_conformers,
        args.input.display(),
        batch_config.output_dir.display()
    );
    let summary = batch::run_file(&args.input, &generator, &batch_config, &reporter)?;
    print_summary(&summary);

    if summary.has_failures() {
        warn!(failed = summary.failed.len(), "Some molecules failed.");
        return Err(CliError::MoleculesFailed {
            failed: summary.failed.len(),
            total: summary.total(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> GenerateArgs {
        match Cli::parse_from(args).command {
            Commands::Generate(args) => args,
            other => panic!("Expected 'generate' subcommand, got {:?}", other),
        }
    }

    #[test]
    fn successful_run_writes_batch_tree() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.smi");
        fs::write(&input, "O water\nCC ethane\n").unwrap();
        let out = dir.path().join("out");

        let args = parse(&[
            "confgen",
            "generate",
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--pool-multiplier",
            "2",
        ]);
        run(args, false).unwrap();
        assert!(out.join("batch_0000/water/conformer/conformer.xyz").is_file());
        assert!(out.join("batch_0000/ethane/conformer/info.txt").is_file());
    }

    #[test]
    fn any_failed_molecule_fails_the_command() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.smi");
        fs::write(&input, "O water\nC1CC( broken\n").unwrap();
        let out = dir.path().join("out");

        let args = parse(&[
            "confgen",
            "generate",
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--pool-multiplier",
            "1",
        ]);
        let err = run(args, false).unwrap_err();
        assert!(matches!(err, CliError::MoleculesFailed { failed: 1, total: 2 }));
        assert!(out.join("batch_0000/water/conformer/conformer.xyz").is_file());
        assert!(!out.join("batch_0000/broken").exists());
    }

    #[test]
    fn missing_input_is_reported() {
        let dir = tempdir().unwrap();
        let args = parse(&[
            "confgen",
            "generate",
            dir.path().join("absent.smi").to_str().unwrap(),
            "-o",
            dir.path().join("out").to_str().unwrap(),
        ]);
        assert!(matches!(run(args, false), Err(CliError::Batch(_))));
    }
}
