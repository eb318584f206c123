//! # Digest formatter
//! Pure, deterministic rendering of verdicts into the grouped markdown report.
//! No I/O; the same input always yields byte-identical output.
//!
//! Layout: title, then the High section, then the Medium section. A section
//! with no verdicts is left out entirely; no verdicts at all renders the
//! empty-state notice instead of any section.

use std::fmt;

use crate::analyze::{Relevance, Verdict};

pub const DEFAULT_COMPANY: &str = "Headless Agents";
pub const HIGH_HEADING: &str = "## 🔥 High Relevance";
pub const MEDIUM_HEADING: &str = "## 👀 Medium Relevance";
pub const EMPTY_NOTICE: &str = "_No relevant launches found in the last 24 hours._";

/// The rendered report. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestReport {
    text: String,
    high: usize,
    medium: usize,
}

impl DigestReport {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn high_count(&self) -> usize {
        self.high
    }

    pub fn medium_count(&self) -> usize {
        self.medium
    }

    pub fn is_empty(&self) -> bool {
        self.high == 0 && self.medium == 0
    }
}

impl fmt::Display for DigestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Stable partition by relevance, preserving classifier order in each subset.
pub fn partition(verdicts: &[Verdict]) -> (Vec<&Verdict>, Vec<&Verdict>) {
    verdicts
        .iter()
        .partition(|v| v.relevance == Relevance::High)
}

pub fn digest_title(company: &str) -> String {
    format!("# {company} - Competitive Intelligence Digest")
}

pub fn format_digest(verdicts: &[Verdict]) -> DigestReport {
    format_digest_for(DEFAULT_COMPANY, verdicts)
}

/// Same as [`format_digest`] with the title naming `company`.
pub fn format_digest_for(company: &str, verdicts: &[Verdict]) -> DigestReport {
    let (high, medium) = partition(verdicts);

    let mut text = digest_title(company);
    text.push_str("\n\n");

    for (heading, items) in [(HIGH_HEADING, &high), (MEDIUM_HEADING, &medium)] {
        if items.is_empty() {
            continue;
        }
        text.push_str(heading);
        text.push_str("\n\n");
        for v in items.iter() {
            render_block(&mut text, v);
        }
    }

    if high.is_empty() && medium.is_empty() {
        text.push_str(EMPTY_NOTICE);
        text.push('\n');
    }

    DigestReport {
        text,
        high: high.len(),
        medium: medium.len(),
    }
}

fn render_block(out: &mut String, v: &Verdict) {
    out.push_str(&format!("### [{}]({})\n", v.name, v.url));
    out.push_str(&format!("**Product Overview:** {}\n\n", v.overview));
    out.push_str(&format!("**Analysis:** {}\n\n", v.reasoning));
}
