// src/analyze/verdict.rs
//! Verdict schema and the fail-closed decode of the classifier reply.

use serde::{Deserialize, Serialize};

use crate::error::{DigestError, Result};
use crate::ingest::Listing;

/// Name of the single array the classifier must return.
pub const VERDICT_ARRAY_KEY: &str = "headlessRelevant";

/// Two-valued taxonomy. Anything else in a reply is a schema violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    High,
    Medium,
}

impl Relevance {
    pub fn as_str(self) -> &'static str {
        match self {
            Relevance::High => "high",
            Relevance::Medium => "medium",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Verdict {
    pub name: String,
    pub url: String,
    pub relevance: Relevance,
    pub overview: String,
    pub reasoning: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    #[serde(rename = "headlessRelevant")]
    items: Vec<Verdict>,
}

/// Decode the raw model content into verdicts. Any deviation fails the run.
pub fn decode_verdicts(content: &str) -> Result<Vec<Verdict>> {
    let env: Envelope = serde_json::from_str(content.trim()).map_err(|e| {
        DigestError::classification(format!(
            "reply does not match {{\"{VERDICT_ARRAY_KEY}\": [verdict]}} schema: {e}"
        ))
    })?;

    for (i, v) in env.items.iter().enumerate() {
        let blank = [
            ("name", &v.name),
            ("url", &v.url),
            ("overview", &v.overview),
            ("reasoning", &v.reasoning),
        ]
        .into_iter()
        .find(|(_, val)| val.trim().is_empty());
        if let Some((field, _)) = blank {
            return Err(DigestError::classification(format!(
                "verdict #{i} has an empty `{field}`"
            )));
        }
    }

    Ok(env.items)
}

/// Verdicts whose name and url both fail to match any listing of the run.
pub fn untraced<'a>(verdicts: &'a [Verdict], listings: &[Listing]) -> Vec<&'a Verdict> {
    verdicts
        .iter()
        .filter(|v| !listings.iter().any(|l| l.url == v.url || l.name == v.name))
        .collect()
}
