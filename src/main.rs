//! selfheal - health-check and self-healing daemon
//!
//! Runs the configured checks on a schedule and repairs what breaks.

#![allow(missing_docs)]

use anyhow::Context;
use clap::Parser;
use selfheal::utils::logging::init_logging;
use selfheal::{EngineConfig, HealthEngine};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "selfheal", version, about = "Health-check and self-healing engine")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "SELFHEAL_CONFIG", default_value = "config/selfheal.yaml")]
    config: PathBuf,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, env = "SELFHEAL_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Run every check once, attempt repairs, print a report and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(Some(&cli.log_level), cli.json_logs) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = EngineConfig::from_file(&cli.config)
        .await
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let engine = HealthEngine::from_config(config).context("building engine")?;

    if cli.once {
        let report = engine.run_once().await;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(if report.is_healthy() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    engine.start();
    info!(checks = engine.registry().count(), "Monitoring; press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;

    let health = engine.monitor().get_system_health();
    engine.stop().await;
    info!(status = %health, "Final system health");
    println!("{}", health);

    Ok(ExitCode::SUCCESS)
}
