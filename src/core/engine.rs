use crate::core::corruptor::{corrupt_file, Corruptor};
use crate::core::rate::RateModel;
use crate::core::{ConfigProvider, ResolvedRate, RunReport};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::time::Instant;

pub struct FlipEngine<C: ConfigProvider> {
    config: C,
    monitor: SystemMonitor,
}

impl<C: ConfigProvider> FlipEngine<C> {
    pub fn new(config: C) -> Self {
        Self::new_with_monitoring(config, false)
    }

    pub fn new_with_monitoring(config: C, monitor_enabled: bool) -> Self {
        Self {
            config,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Resolves the flip probability without touching any file.
    pub fn resolve_rate(&self) -> Result<ResolvedRate> {
        RateModel::new(self.config.probability_policy()).resolve(self.config.rate_request())
    }

    pub fn run(&self) -> Result<RunReport> {
        let rate = self.resolve_rate()?;
        self.run_with_rate(rate)
    }

    /// Runs the corruption with an already resolved rate.
    pub fn run_with_rate(&self, rate: ResolvedRate) -> Result<RunReport> {
        let started_at = Utc::now();
        let timer = Instant::now();

        tracing::info!(
            "Using flip probability {} ({:?})",
            rate.probability,
            rate.source
        );

        let seed = self
            .config
            .seed()
            .unwrap_or_else(|| rand::thread_rng().gen());
        tracing::debug!("RNG seed: {}", seed);

        self.monitor.log_stats("Before corruption");

        let mut corruptor = Corruptor::new(
            ChaCha20Rng::seed_from_u64(seed),
            self.config.semantics(),
        )
        .with_buffer_size(self.config.buffer_size());

        let stats = corrupt_file(
            self.config.input_path(),
            self.config.output_path(),
            rate.probability,
            &mut corruptor,
        )?;

        tracing::info!(
            "Flipped {} of {} bytes ({:.6})",
            stats.bytes_flipped,
            stats.bytes_processed,
            stats.flipped_fraction()
        );
        self.monitor.log_final_stats();

        Ok(RunReport {
            input_file: self.config.input_path().display().to_string(),
            output_file: self.config.output_path().display().to_string(),
            rate,
            semantics: corruptor.semantics(),
            seed,
            stats,
            started_at,
            elapsed_ms: u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }
}
