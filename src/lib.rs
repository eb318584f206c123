// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod artifacts;
pub mod config;
pub mod digest;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod notify;
pub mod pipeline;

// ---- Re-exports for stable public API ----
pub use crate::digest::{format_digest, DigestReport};
pub use crate::error::{DigestError, Result};
pub use crate::pipeline::{Pipeline, RunOutcome, RunReport, RunState, Stage};

