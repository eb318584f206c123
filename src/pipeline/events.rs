// src/pipeline/events.rs
//! Typed stage events and the observer seam they are delivered through.

use std::fmt;
use std::time::Duration;

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Delivery connectivity probe, run before any other work.
    Preflight,
    Auth,
    Fetch,
    Classify,
    Format,
    Deliver,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Preflight => "preflight",
            Stage::Auth => "auth",
            Stage::Fetch => "fetch",
            Stage::Classify => "classify",
            Stage::Format => "format",
            Stage::Deliver => "deliver",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Succeeded,
    Skipped { reason: String },
    Failed { kind: &'static str, cause: String },
}

impl StageOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            StageOutcome::Succeeded => "succeeded",
            StageOutcome::Skipped { .. } => "skipped",
            StageOutcome::Failed { .. } => "failed",
        }
    }
}

/// One per stage attempt (or skip).
#[derive(Debug, Clone, PartialEq)]
pub struct StageEvent {
    pub stage: Stage,
    /// Short description of what the stage was given.
    pub input: String,
    pub outcome: StageOutcome,
    /// Items the stage produced (listings, verdicts, report blocks...).
    pub items: usize,
    pub elapsed: Duration,
}

pub trait RunObserver: Send + Sync {
    fn on_event(&self, event: &StageEvent);
}

/// Structured log lines on target `pipeline`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_event(&self, ev: &StageEvent) {
        let elapsed_ms = ev.elapsed.as_millis() as u64;
        match &ev.outcome {
            StageOutcome::Succeeded => info!(
                target: "pipeline",
                stage = %ev.stage, input = %ev.input, items = ev.items, elapsed_ms,
                "stage succeeded"
            ),
            StageOutcome::Skipped { reason } => info!(
                target: "pipeline",
                stage = %ev.stage, input = %ev.input, reason = %reason,
                "stage skipped"
            ),
            StageOutcome::Failed { kind, cause } => warn!(
                target: "pipeline",
                stage = %ev.stage, input = %ev.input, kind, cause = %cause, elapsed_ms,
                "stage failed"
            ),
        }
    }
}
