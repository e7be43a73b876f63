pub mod corruptor;
pub mod engine;
pub mod rate;

pub use crate::domain::model::{CorruptionStats, ResolvedRate, RunReport};
pub use crate::domain::ports::ConfigProvider;
pub use crate::utils::error::Result;
