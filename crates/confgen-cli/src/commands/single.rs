use crate::cli::SingleArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use confgen::engine::progress::ProgressReporter;
use confgen::workflows::{generate, output};
use tracing::info;

pub fn run(args: SingleArgs) -> Result<()> {
    let mut partial = PartialConfig::load(args.generator.config.as_deref())?;
    let config = partial.merge_generator(&args.generator)?;
    let name = args.name.as_deref().unwrap_or(args.smiles.as_str());

    info!(molecule = name, smiles = %args.smiles, "Generating conformers for a single molecule.");
    let result = generate::run_smiles(&args.smiles, &config, &ProgressReporter::new())?;
    output::write_files(&args.output, &args.smiles, &result)?;

    let best_energy = result
        .conformers
        .lowest_energy()
        .map(|c| format!("{:.4}", c.energy))
        .unwrap_or_default();
    println!(
        "✓ {}: {} conformer(s) kept from a pool of {}, charge {}, spin multiplicity {}, lowest energy {} kcal/mol",
        name,
        result.conformers.len(),
        result.pool_size,
        result.charge_spin.charge,
        result.charge_spin.spin_multiplicity,
        best_energy
    );
    println!("  Written to: {}", args.output.display());
    Ok(())
}
