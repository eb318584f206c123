//! Launch digest binary entrypoint.
//! One pipeline run per invocation; schedule it daily (cron, CI timer).
//!
//! Exit status: 0 for a delivered or empty run, 1 when any stage failed.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use launch_digest::config::{DigestConfig, Settings};
use launch_digest::metrics::{Metrics, MetricsObserver, ENV_METRICS_PATH};
use launch_digest::pipeline::{Pipeline, RunOutcome, TracingObserver};

/// Compact logs by default; `DIGEST_LOG_FORMAT=json` for log shippers.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("launch_digest=info,pipeline=info,warn"));
    let json = std::env::var("DIGEST_LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env locally; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            error!(error = ?e, "launch digest aborted");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    // Preconditions before any network activity.
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!(stage = "config", cause = %e, "run failed");
            eprintln!("run failed at stage `config`: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    settings.log_presence();
    let cfg = DigestConfig::load_default().context("loading digest config")?;
    info!(model = %cfg.model, batch_size = cfg.batch_size, "digest config loaded");

    let metrics_path = std::env::var(ENV_METRICS_PATH).ok().map(PathBuf::from);
    let metrics = match &metrics_path {
        Some(_) => Some(Metrics::init()?),
        None => None,
    };

    let pipeline = Pipeline::production(&settings, &cfg)
        .context("building http client")?
        .with_observer(Arc::new(TracingObserver))
        .with_observer(Arc::new(MetricsObserver));

    let report = pipeline.run().await;

    if let (Some(m), Some(path)) = (&metrics, &metrics_path) {
        if let Err(e) = m.write_textfile(path) {
            warn!(error = ?e, "could not write metrics textfile");
        }
    }

    match &report.outcome {
        Ok(RunOutcome::Delivered { report: digest, .. }) => {
            println!("\nCompetitive Intelligence Digest:\n");
            println!("{digest}");
            info!("{}", report.summary());
            Ok(ExitCode::SUCCESS)
        }
        Ok(RunOutcome::NoLaunches) => {
            info!("{}", report.summary());
            println!("{}", report.summary());
            Ok(ExitCode::SUCCESS)
        }
        Err(_) => {
            error!("{}", report.summary());
            eprintln!("{}", report.summary());
            Ok(ExitCode::FAILURE)
        }
    }
}
