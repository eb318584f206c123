// src/analyze/prompt.rs
use crate::analyze::verdict::VERDICT_ARRAY_KEY;
use crate::error::{DigestError, Result};
use crate::ingest::Listing;

const RULE: &str = "════════════════";

/// Areas that make a launch a competitor or adjacent tool.
pub const INTEREST_AREAS: [&str; 6] = [
    "AI/LLM agent frameworks or orchestration",
    "Prompt / test / evaluation pipelines for AI features",
    "Dev-tooling or infra that speeds AI feature deployment & governance",
    "Agent-to-Agent (A2A) protocols or interoperability layers",
    "Monitoring, analytics, observability, or experimentation for AI models",
    "Role-based collaboration around AI feature development",
];

/// Full classifier prompt: persona, context, serialized batch, schema, guidelines.
pub fn build_prompt(company: &str, listings: &[Listing]) -> Result<String> {
    let batch = serde_json::to_string_pretty(listings)
        .map_err(|e| DigestError::classification(format!("serializing listings: {e}")))?;

    let areas = INTEREST_AREAS
        .iter()
        .map(|a| format!("• {a}"))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(format!(
        r#"You are LaunchScreenerGPT, a sharp, forward-thinking analyst for {company}.

{RULE} CONTEXT {RULE}
You are analyzing Product Hunt launches to identify potential competitors or relevant tools for {company}, a B2B platform that helps software teams build, test, deploy, and monitor AI agents & AI-powered features.

Key areas of interest:
{areas}

{RULE} TASK {RULE}
1. Filter for relevant launches (high or medium relevance only)
2. Score relevance as "high" (clear competitor/strong adjacency) or "medium" (partial overlap/future threat)
3. Provide product overview and actionable reasoning for each match

{RULE} INPUT DATA {RULE}
{batch}

{RULE} REQUIRED FORMAT {RULE}
Return only a single JSON object with one array named "{VERDICT_ARRAY_KEY}". Each element follows this structure, with no extra fields:
{{
  "name": "product name",
  "url": "product hunt link",
  "relevance": "high" or "medium",
  "overview": "2-3 sentence factual product description",
  "reasoning": "2-3 sentence competitive analysis"
}}
If nothing qualifies, return {{"{VERDICT_ARRAY_KEY}": []}}.

{RULE} GUIDELINES {RULE}
• Be decisive - fewer high-quality picks are better
• If unsure, drop it
• Consider future competitive threats
• Only use names and urls exactly as given in the input data
• Base reasoning only on provided product descriptions
• No narrative text, only JSON output"#
    ))
}
