use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "confgen - Generate diverse, force-field minimized 3-D conformers from SMILES.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate conformers for every molecule in a .smi list into batch directories.
    Generate(GenerateArgs),
    /// Generate conformers for one SMILES string and write them into a directory.
    Single(SingleArgs),
    /// Remove empty directories left under an output tree.
    Clean(CleanArgs),
}

/// Generator settings shared by `generate` and `single`.
#[derive(Args, Debug, Default, Clone)]
pub struct GeneratorArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Maximum number of conformers kept per molecule.
    #[arg(short = 'n', long, value_name = "INT")]
    pub max_conformers: Option<usize>,

    /// Candidates embedded per requested conformer.
    #[arg(long, value_name = "INT")]
    pub pool_multiplier: Option<usize>,

    /// Minimum RMSD (Å) between kept conformers. A negative value keeps the whole pool.
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub rmsd_threshold: Option<f64>,

    /// Primary force field (uff, mmff94, mmff94s).
    #[arg(long = "force-field", value_name = "NAME")]
    pub force_field: Option<String>,

    /// Force field tried when the primary one cannot minimize a candidate.
    #[arg(long, value_name = "NAME")]
    pub fallback_force_field: Option<String>,

    /// Random seed for candidate embedding.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Shrink the candidate pool for larger molecules.
    #[arg(long)]
    pub adaptive_pool: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S generator.max-conformers=5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the input molecule list (one SMILES and optional name per line).
    #[arg(required = true, value_name = "INPUT")]
    pub input: PathBuf,

    /// Root directory for the batch output tree.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Maximum number of molecule directories per batch folder.
    #[arg(long, value_name = "INT")]
    pub batch_size: Option<usize>,

    /// Recompute molecules whose output is already complete.
    #[arg(long)]
    pub force: bool,

    /// Keep empty directories after the run.
    #[arg(long)]
    pub no_cleanup: bool,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

/// Arguments for the `single` subcommand.
#[derive(Args, Debug)]
pub struct SingleArgs {
    /// The molecule in SMILES notation.
    #[arg(required = true, value_name = "SMILES")]
    pub smiles: String,

    /// Directory that receives conformer.xyz and info.txt.
    #[arg(required = true, value_name = "OUTPUT_DIR")]
    pub output: PathBuf,

    /// Name used in log messages for this molecule.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

/// Arguments for the `clean` subcommand.
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Root directory to clean. The root itself is never removed.
    #[arg(required = true, value_name = "DIR")]
    pub dir: PathBuf,

    /// List the directories that would be removed without deleting them.
    #[arg(long)]
    pub dry_run: bool,
}
