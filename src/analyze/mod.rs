// src/analyze/mod.rs
//! Relevance classification: prompt contract, model call, verdict schema.

pub mod openai;
pub mod prompt;
pub mod verdict;

use crate::error::Result;
use crate::ingest::Listing;

pub use openai::OpenAiClassifier;
pub use verdict::{decode_verdicts, untraced, Relevance, Verdict, VERDICT_ARRAY_KEY};

/// Judges a listing batch against the business context.
///
/// Only `high`/`medium` verdicts come back; everything else is dropped by the
/// model. Replies are non-deterministic, so callers test the wrapping, not content.
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, listings: &[Listing]) -> Result<Vec<Verdict>>;
    fn model(&self) -> &str;
}
