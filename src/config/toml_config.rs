use crate::core::corruptor::MAX_BUFFER_SIZE;
use crate::domain::model::{ProbabilityPolicy, RateRequest, Semantics};
use crate::utils::error::Result;
use crate::utils::validation::{validate_finite, validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional run settings loaded from a TOML file. Every key is optional;
/// command-line values take precedence over file values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub rate: Option<RateSection>,
    pub corruption: Option<CorruptionSection>,
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateSection {
    pub flip_probability: Option<f64>,
    pub flux: Option<String>,
    pub cross_section: Option<String>,
    pub location: Option<String>,
    pub years: Option<f64>,
    pub policy: Option<ProbabilityPolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorruptionSection {
    pub semantics: Option<Semantics>,
    pub seed: Option<u64>,
    pub buffer_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
    pub monitor: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn rate_request(&self) -> RateRequest {
        let rate = self.rate.clone().unwrap_or_default();
        RateRequest {
            flip_probability: rate.flip_probability,
            flux: rate.flux,
            cross_section: rate.cross_section,
            location: rate.location,
            years: rate.years,
        }
    }

    pub fn policy(&self) -> Option<ProbabilityPolicy> {
        self.rate.as_ref().and_then(|r| r.policy)
    }

    pub fn semantics(&self) -> Option<Semantics> {
        self.corruption.as_ref().and_then(|c| c.semantics)
    }

    pub fn seed(&self) -> Option<u64> {
        self.corruption.as_ref().and_then(|c| c.seed)
    }

    pub fn buffer_size(&self) -> Option<usize> {
        self.corruption.as_ref().and_then(|c| c.buffer_size)
    }

    pub fn verbose(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.verbose).unwrap_or(false)
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.monitor).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(rate) = &self.rate {
            validate_finite("rate.flip_probability", rate.flip_probability)?;
            validate_finite("rate.years", rate.years)?;
        }
        if let Some(size) = self.buffer_size() {
            validate_range("corruption.buffer_size", size, 1, MAX_BUFFER_SIZE)?;
        }
        Ok(())
    }
}
