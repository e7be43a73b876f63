#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use toml_config::TomlConfig;

use crate::core::corruptor::{DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};
use crate::domain::model::{ProbabilityPolicy, RateRequest, Semantics};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_finite, validate_path, validate_range, Validate};
use std::path::{Path, PathBuf};

/// Fully merged settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub rate: RateRequest,
    pub semantics: Semantics,
    pub policy: ProbabilityPolicy,
    pub seed: Option<u64>,
    pub buffer_size: usize,
}

impl RunConfig {
    pub fn new(
        input_file: impl Into<PathBuf>,
        output_file: impl Into<PathBuf>,
        rate: RateRequest,
    ) -> Self {
        Self {
            input_file: input_file.into(),
            output_file: output_file.into(),
            rate,
            semantics: Semantics::default(),
            policy: ProbabilityPolicy::default(),
            seed: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn with_semantics(mut self, semantics: Semantics) -> Self {
        self.semantics = semantics;
        self
    }

    pub fn with_policy(mut self, policy: ProbabilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl ConfigProvider for RunConfig {
    fn input_path(&self) -> &Path {
        &self.input_file
    }

    fn output_path(&self) -> &Path {
        &self.output_file
    }

    fn rate_request(&self) -> &RateRequest {
        &self.rate
    }

    fn semantics(&self) -> Semantics {
        self.semantics
    }

    fn probability_policy(&self) -> ProbabilityPolicy {
        self.policy
    }

    fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input_file", &self.input_file.to_string_lossy())?;
        validate_path("output_file", &self.output_file.to_string_lossy())?;
        validate_finite("flip_probability", self.rate.flip_probability)?;
        validate_finite("years", self.rate.years)?;
        validate_range("buffer_size", self.buffer_size, 1, MAX_BUFFER_SIZE)?;
        Ok(())
    }
}
