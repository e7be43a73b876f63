use crate::config::{RunConfig, TomlConfig};
use crate::core::corruptor::DEFAULT_BUFFER_SIZE;
use crate::domain::model::{ProbabilityPolicy, RateRequest, Semantics};
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "cosmic-flip")]
#[command(about = "Bit flipper: copies a file while simulating cosmic-ray single-bit upsets")]
pub struct CliConfig {
    /// Path to the input file
    pub input_file: PathBuf,

    /// Path to the output file
    pub output_file: PathBuf,

    /// Probability of flipping
    #[arg(long = "flip_probability", visible_alias = "flip-probability")]
    pub flip_probability: Option<f64>,

    /// Predefined flux: LEO, VAN_ALLEN, MARS, EUROPA, JUPITER_BELT
    #[arg(long)]
    pub flux: Option<String>,

    /// Predefined cross section: HIGH, MEDIUM, LOW
    #[arg(long = "cross_section", visible_alias = "cross-section")]
    pub cross_section: Option<String>,

    /// Location for the annual-rate model: LEO, JUPITER
    #[arg(long)]
    pub location: Option<String>,

    /// Number of years in orbit
    #[arg(long, allow_negative_numbers = true)]
    pub years: Option<f64>,

    /// per-bit (byte chance 8p) or per-byte (byte chance p)
    #[arg(long)]
    pub semantics: Option<Semantics>,

    /// clamp, reject or passthrough for probabilities outside [0, 1]
    #[arg(long = "probability-policy")]
    pub probability_policy: Option<ProbabilityPolicy>,

    /// Seed for reproducible corruption
    #[arg(long)]
    pub seed: Option<u64>,

    /// TOML file with default settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Resolve and print the flip probability without touching any file
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Log process CPU and memory around the run
    #[arg(long)]
    pub monitor: bool,
}

impl CliConfig {
    pub fn load_file(&self) -> Result<Option<TomlConfig>> {
        self.config
            .as_ref()
            .map(TomlConfig::from_file)
            .transpose()
    }

    /// Merges command-line values over file values.
    pub fn into_run_config(self, file: Option<&TomlConfig>) -> RunConfig {
        let file_rate = file.map(TomlConfig::rate_request).unwrap_or_default();

        let rate = RateRequest {
            flip_probability: self.flip_probability.or(file_rate.flip_probability),
            flux: self.flux.or(file_rate.flux),
            cross_section: self.cross_section.or(file_rate.cross_section),
            location: self.location.or(file_rate.location),
            years: self.years.or(file_rate.years),
        };

        RunConfig {
            input_file: self.input_file,
            output_file: self.output_file,
            rate,
            semantics: self
                .semantics
                .or_else(|| file.and_then(TomlConfig::semantics))
                .unwrap_or_default(),
            policy: self
                .probability_policy
                .or_else(|| file.and_then(TomlConfig::policy))
                .unwrap_or_default(),
            seed: self.seed.or_else(|| file.and_then(TomlConfig::seed)),
            buffer_size: file
                .and_then(TomlConfig::buffer_size)
                .unwrap_or(DEFAULT_BUFFER_SIZE),
        }
    }

    pub fn verbose(&self, file: Option<&TomlConfig>) -> bool {
        self.verbose || file.is_some_and(TomlConfig::verbose)
    }

    pub fn log_json(&self, file: Option<&TomlConfig>) -> bool {
        self.log_json || file.is_some_and(TomlConfig::log_json)
    }

    pub fn monitor(&self, file: Option<&TomlConfig>) -> bool {
        self.monitor || file.is_some_and(TomlConfig::monitoring_enabled)
    }
}
