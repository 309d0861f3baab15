use crate::cli::{GenerateArgs, GeneratorArgs};
use crate::error::{CliError, Result};
use confgen::core::forcefield::kind::ForceFieldKind;
use confgen::engine::config::{
    EmbeddingMethod, GeneratorConfig, GeneratorConfigBuilder, PoolSizingPolicy,
};
use confgen::workflows::batch::BatchConfig;
use serde::Deserialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const DEFAULT_OUTPUT_DIR: &str = "conformers";
const DEFAULT_BATCH_SIZE: usize = 1000;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialGeneratorSection {
    max_conformers: Option<usize>,
    pool_multiplier: Option<usize>,
    rmsd_threshold: Option<f64>,
    pool_sizing: Option<PoolSizingPolicy>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialEmbeddingSection {
    random_seed: Option<u64>,
    max_attempts: Option<usize>,
    methods: Option<Vec<EmbeddingMethod>>,
    validation_tolerance: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialMinimizationSection {
    force_field: Option<ForceFieldKind>,
    fallback_force_field: Option<ForceFieldKind>,
    max_iterations: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialOutputSection {
    directory: Option<PathBuf>,
    batch_size: Option<usize>,
    cleanup: Option<bool>,
}

/// Settings read from a TOML file, every value optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    generator: Option<PartialGeneratorSection>,
    embedding: Option<PartialEmbeddingSection>,
    minimization: Option<PartialMinimizationSection>,
    output: Option<PartialOutputSection>,
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| CliError::Config(format!("Invalid value for {}: '{}' ({})", key, value, e)))
}

fn parse_force_field(value: &str) -> Result<ForceFieldKind> {
    ForceFieldKind::from_str(value).map_err(|e| CliError::Config(e.to_string()))
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Reads the file if one was given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Merges `-S` overrides, then explicit flags, over the file values and builds the
    /// generator configuration. Values set nowhere take the library defaults.
    pub fn merge_generator(&mut self, args: &GeneratorArgs) -> Result<GeneratorConfig> {
        self.apply_set_values(&args.set_values)?;

        let generator = self.generator.take().unwrap_or_default();
        let embedding = self.embedding.take().unwrap_or_default();
        let minimization = self.minimization.take().unwrap_or_default();

        let mut builder = GeneratorConfigBuilder::new();
        if let Some(n) = args.max_conformers.or(generator.max_conformers) {
            builder = builder.max_conformers(n);
        }
        if let Some(n) = args.pool_multiplier.or(generator.pool_multiplier) {
            builder = builder.pool_multiplier(n);
        }
        if let Some(threshold) = args.rmsd_threshold.or(generator.rmsd_threshold) {
            builder = builder.rmsd_threshold(threshold);
        }
        let pool_sizing = if args.adaptive_pool {
            Some(PoolSizingPolicy::AtomCountTiers)
        } else {
            generator.pool_sizing
        };
        if let Some(policy) = pool_sizing {
            builder = builder.pool_sizing(policy);
        }

        if let Some(seed) = args.seed.or(embedding.random_seed) {
            builder = builder.random_seed(seed);
        }
        if let Some(attempts) = embedding.max_attempts {
            builder = builder.max_attempts(attempts);
        }
        if let Some(methods) = embedding.methods {
            builder = builder.embedding_methods(methods);
        }
        if let Some(tolerance) = embedding.validation_tolerance {
            builder = builder.validation_tolerance(tolerance);
        }

        let primary = match &args.force_field {
            Some(name) => Some(parse_force_field(name)?),
            None => minimization.force_field,
        };
        if let Some(kind) = primary {
            builder = builder.primary_force_field(kind);
        }
        let fallback = match &args.fallback_force_field {
            Some(name) => Some(parse_force_field(name)?),
            None => minimization.fallback_force_field,
        };
        if let Some(kind) = fallback {
            builder = builder.fallback_force_field(kind);
        }
        if let Some(iterations) = minimization.max_iterations {
            builder = builder.max_iterations(iterations);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    /// Output location and batch behaviour for the `generate` command.
    pub fn merge_batch(&mut self, args: &GenerateArgs) -> BatchConfig {
        let output = self.output.take().unwrap_or_default();
        BatchConfig {
            output_dir: args
                .output
                .clone()
                .or(output.directory)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            batch_size: args
                .batch_size
                .or(output.batch_size)
                .unwrap_or(DEFAULT_BATCH_SIZE),
            force: args.force,
            cleanup: !args.no_cleanup && output.cleanup.unwrap_or(true),
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();

            match key {
                "generator.max-conformers" => {
                    self.generator.get_or_insert_with(Default::default).max_conformers =
                        Some(parse_value(key, value)?);
                }
                "generator.pool-multiplier" => {
                    self.generator.get_or_insert_with(Default::default).pool_multiplier =
                        Some(parse_value(key, value)?);
                }
                "generator.rmsd-threshold" => {
                    self.generator.get_or_insert_with(Default::default).rmsd_threshold =
                        Some(parse_value(key, value)?);
                }
                "generator.pool-sizing" => {
                    self.generator.get_or_insert_with(Default::default).pool_sizing =
                        Some(parse_value(key, value)?);
                }
                "embedding.random-seed" => {
                    self.embedding
                        .get_or_insert_with(Default::default)
                        .random_seed = Some(parse_value(key, value)?);
                }
                "embedding.max-attempts" => {
                    self.embedding
                        .get_or_insert_with(Default::default)
                        .max_attempts = Some(parse_value(key, value)?);
                }
                "embedding.validation-tolerance" => {
                    self.embedding
                        .get_or_insert_with(Default::default)
                        .validation_tolerance = Some(parse_value(key, value)?);
                }
                "minimization.force-field" => {
                    self.minimization
                        .get_or_insert_with(Default::default)
                        .force_field = Some(parse_force_field(value)?);
                }
                "minimization.fallback-force-field" => {
                    self.minimization
                        .get_or_insert_with(Default::default)
                        .fallback_force_field = Some(parse_force_field(value)?);
                }
                "minimization.max-iterations" => {
                    self.minimization
                        .get_or_insert_with(Default::default)
                        .max_iterations = Some(parse_value(key, value)?);
                }
                "output.batch-size" => {
                    self.output.get_or_insert_with(Default::default).batch_size =
                        Some(parse_value(key, value)?);
                }
                "output.directory" => {
                    self.output.get_or_insert_with(Default::default).directory =
                        Some(PathBuf::from(value.trim()));
                }
                "output.cleanup" => {
                    self.output.get_or_insert_with(Default::default).cleanup =
                        Some(parse_value(key, value)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use once_cell::sync::Lazy;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn generate_args(extra: &[&str]) -> GenerateArgs {
        let mut args = vec!["confgen", "generate", "input.smi"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Generate(args) => args,
            other => panic!("Expected 'generate' subcommand, got {:?}", other),
        }
    }

    const FULL_CONFIG: &str = r#"
        [generator]
        max-conformers = 4
        pool-multiplier = 3
        rmsd-threshold = 0.25
        pool-sizing = "adaptive"

        [embedding]
        random-seed = 7
        max-attempts = 4
        methods = ["random-coordinates"]
        validation-tolerance = 0.4

        [minimization]
        force-field = "mmff94"
        fallback-force-field = "uff"
        max-iterations = 50

        [output]
        directory = "out"
        batch-size = 10
        cleanup = false
    "#;

    #[test]
    fn missing_file_yields_library_defaults() {
        let args = generate_args(&[]);
        let mut partial = PartialConfig::load(None).unwrap();
        let config = partial.merge_generator(&args.generator).unwrap();
        assert_eq!(config, GeneratorConfig::default());

        let batch = partial.merge_batch(&args);
        assert_eq!(batch.output_dir, PathBuf::from("conformers"));
        assert_eq!(batch.batch_size, 1000);
        assert!(batch.cleanup);
        assert!(!batch.force);
    }

    #[test]
    fn file_values_are_loaded() {
        let path = write_config_file("full.toml", FULL_CONFIG);
        let args = generate_args(&[]);
        let mut partial = PartialConfig::from_file(&path).unwrap();
        let config = partial.merge_generator(&args.generator).unwrap();

        assert_eq!(config.max_conformers, 4);
        assert_eq!(config.pool_multiplier, 3);
        assert_eq!(config.rmsd_threshold, 0.25);
        assert_eq!(config.pool_sizing, PoolSizingPolicy::AtomCountTiers);
        assert_eq!(config.embedding.random_seed, 7);
        assert_eq!(config.embedding.max_attempts, 4);
        assert_eq!(
            config.embedding.methods,
            vec![EmbeddingMethod::RandomCoordinates]
        );
        assert_eq!(config.embedding.validation_tolerance, 0.4);
        assert_eq!(config.minimization.primary_force_field, ForceFieldKind::Mmff94);
        assert_eq!(config.minimization.fallback_force_field, ForceFieldKind::Uff);
        assert_eq!(config.minimization.settings.max_iterations, 50);

        let batch = partial.merge_batch(&args);
        assert_eq!(batch.output_dir, PathBuf::from("out"));
        assert_eq!(batch.batch_size, 10);
        assert!(!batch.cleanup);
    }

    #[test]
    fn cli_flags_override_file_values() {
        let path = write_config_file("override.toml", FULL_CONFIG);
        let args = generate_args(&[
            "-o",
            "elsewhere",
            "--batch-size",
            "5",
            "--max-conformers",
            "2",
            "--rmsd-threshold",
            "-1",
            "--force-field",
            "MMFF94s",
            "--seed",
            "99",
            "--force",
        ]);
        let mut partial = PartialConfig::from_file(&path).unwrap();
        let config = partial.merge_generator(&args.generator).unwrap();
        assert_eq!(config.max_conformers, 2);
        assert_eq!(config.rmsd_threshold, -1.0);
        assert_eq!(config.minimization.primary_force_field, ForceFieldKind::Mmff94s);
        assert_eq!(config.embedding.random_seed, 99);
        assert!(!config.diversity_enabled());

        let batch = partial.merge_batch(&args);
        assert_eq!(batch.output_dir, PathBuf::from("elsewhere"));
        assert_eq!(batch.batch_size, 5);
        assert!(batch.force);
    }

    #[test]
    fn set_values_override_file_but_not_flags() {
        let path = write_config_file("set.toml", FULL_CONFIG);
        let args = generate_args(&[
            "-S",
            "generator.max-conformers=9",
            "-S",
            "minimization.max-iterations=75",
            "-S",
            "embedding.random-seed=3",
            "-S",
            "embedding.validation-tolerance=0.1",
            "--seed",
            "11",
        ]);
        let mut partial = PartialConfig::from_file(&path).unwrap();
        let config = partial.merge_generator(&args.generator).unwrap();
        assert_eq!(config.max_conformers, 9);
        assert_eq!(config.embedding.validation_tolerance, 0.1);
        assert_eq!(config.minimization.settings.max_iterations, 75);
        assert_eq!(config.embedding.random_seed, 11);
    }

    #[test]
    fn adaptive_flag_selects_tiered_pool_sizing() {
        let args = generate_args(&["--adaptive-pool"]);
        let config = PartialConfig::default()
            .merge_generator(&args.generator)
            .unwrap();
        assert_eq!(config.pool_sizing, PoolSizingPolicy::AtomCountTiers);
    }

    #[test]
    fn unknown_keys_and_bad_values_are_rejected() {
        let path = write_config_file("unknown.toml", "[generator]\nmax-confs = 3\n");
        assert!(matches!(
            PartialConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));

        let args = generate_args(&["-S", "generator.colour=blue"]);
        let err = PartialConfig::default()
            .merge_generator(&args.generator)
            .unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("Unsupported")));

        let args = generate_args(&["-S", "generator.max-conformers"]);
        assert!(PartialConfig::default().merge_generator(&args.generator).is_err());

        let args = generate_args(&["--force-field", "amber"]);
        assert!(PartialConfig::default().merge_generator(&args.generator).is_err());
    }

    #[test]
    fn invalid_values_surface_as_config_errors() {
        let args = generate_args(&["--max-conformers", "0"]);
        let err = PartialConfig::default()
            .merge_generator(&args.generator)
            .unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("max_conformers")));
    }
}
