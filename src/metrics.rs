use std::path::Path;

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::pipeline::{RunObserver, StageEvent};

pub const ENV_METRICS_PATH: &str = "DIGEST_METRICS_PATH";

/// One-time metrics registration (so series carry help text).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "digest_stage_total",
            "Stage attempts by stage and outcome (succeeded/skipped/failed)."
        );
        describe_counter!("digest_stage_items", "Items produced by each stage.");
        describe_histogram!("digest_stage_ms", "Stage wall time in milliseconds.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder for this process.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Textfile-collector style dump: the whole exposition, written once per run.
    pub fn write_textfile(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("prom.tmp");
        std::fs::write(&tmp, self.handle.render())
            .with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, path).with_context(|| format!("renaming into {}", path.display()))?;
        Ok(())
    }
}

/// Feeds stage events into whatever `metrics` recorder is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsObserver;

impl RunObserver for MetricsObserver {
    fn on_event(&self, ev: &StageEvent) {
        ensure_metrics_described();
        let stage = ev.stage.as_str();
        counter!("digest_stage_total", "stage" => stage, "outcome" => ev.outcome.label())
            .increment(1);
        counter!("digest_stage_items", "stage" => stage).increment(ev.items as u64);
        histogram!("digest_stage_ms", "stage" => stage).record(ev.elapsed.as_secs_f64() * 1_000.0);
    }
}
