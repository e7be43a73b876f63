pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::config::{RunConfig, TomlConfig};
pub use crate::core::{
    corruptor::{corrupt_file, Corruptor},
    engine::FlipEngine,
    rate::RateModel,
};
pub use crate::domain::model::{
    CorruptionStats, CrossSection, Flux, Location, ProbabilityPolicy, RateRequest, RateSource,
    ResolvedRate, RunReport, Semantics,
};
pub use crate::utils::error::{FlipError, Result};
