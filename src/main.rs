use anyhow::Context;
use clap::Parser;
use cosmic_flip::utils::{logger, validation::Validate};
use cosmic_flip::{CliConfig, FlipEngine, FlipError, RunReport};
use std::path::Path;

fn fail(e: &FlipError) -> ! {
    tracing::error!(
        "❌ Bit flip failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn write_report(path: &Path, report: &RunReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("serializing run report")?;
    std::fs::write(path, json)
        .with_context(|| format!("writing run report to {}", path.display()))?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let file = match cli.load_file() {
        Ok(file) => file,
        Err(e) => {
            eprintln!("❌ Failed to load config file: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(e.exit_code());
        }
    };

    logger::init_cli_logger(cli.verbose(file.as_ref()), cli.log_json(file.as_ref()));
    tracing::debug!("CLI config: {:?}", cli);

    if let Some(file) = &file {
        if let Err(e) = file.validate() {
            fail(&e);
        }
    }

    let monitor_enabled = cli.monitor(file.as_ref());
    let dry_run = cli.dry_run;
    let report_path = cli.report.clone();
    let config = cli.into_run_config(file.as_ref());

    if let Err(e) = config.validate() {
        fail(&e);
    }

    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let engine = FlipEngine::new_with_monitoring(config, monitor_enabled);

    let rate = match engine.resolve_rate() {
        Ok(rate) => rate,
        Err(e) => fail(&e),
    };
    println!("Using flip probability {}", rate.probability);

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - no file will be read or written");
        return Ok(());
    }

    match engine.run_with_rate(rate) {
        Ok(report) => {
            println!(
                "Binary file from '{}' mutated and written to '{}'.",
                report.input_file, report.output_file
            );
            if let Some(path) = report_path {
                write_report(&path, &report)?;
                tracing::info!("📁 Report saved to: {}", path.display());
            }
        }
        Err(e) => fail(&e),
    }

    Ok(())
}
