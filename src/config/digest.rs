// src/config/digest.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::digest::DEFAULT_COMPANY;

pub const ENV_CONFIG_PATH: &str = "DIGEST_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/digest.toml";

pub const DEFAULT_TOKEN_URL: &str = "https://api.producthunt.com/v2/oauth/token";
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.producthunt.com/v2/api/graphql";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";

const MAX_BATCH: u32 = 50;

/// Non-secret tuning. Every field has a default, so an absent file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Business the competitive context is written for.
    pub company: String,
    pub model: String,
    pub temperature: f32,
    pub batch_size: u32,
    /// Per-request timeout applied to every HTTP client.
    pub timeout_secs: u64,
    pub token_url: String,
    pub graphql_url: String,
    pub openai_url: String,
    pub slack_api_base: String,
    /// Directory receiving `raw_posts.json` and `competitive_digest.md`.
    pub artifact_dir: PathBuf,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            company: DEFAULT_COMPANY.to_string(),
            model: "gpt-4.1".to_string(),
            temperature: 0.7,
            batch_size: 20,
            timeout_secs: 60,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            openai_url: DEFAULT_OPENAI_URL.to_string(),
            slack_api_base: DEFAULT_SLACK_API_BASE.to_string(),
            artifact_dir: PathBuf::from("."),
        }
    }
}

impl DigestConfig {
    /// Load from an explicit path. TOML or JSON, chosen by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading digest config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: DigestConfig = match ext.as_str() {
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?,
        };
        Ok(cfg.sanitized())
    }

    /// Resolution order:
    /// 1) $DIGEST_CONFIG_PATH (must exist)
    /// 2) config/digest.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::default())
    }

    fn sanitized(mut self) -> Self {
        if !self.temperature.is_finite() {
            self.temperature = Self::default().temperature;
        }
        self.temperature = self.temperature.clamp(0.0, 2.0);
        self.batch_size = self.batch_size.clamp(1, MAX_BATCH);
        if self.timeout_secs == 0 {
            self.timeout_secs = Self::default().timeout_secs;
        }
        if self.company.trim().is_empty() {
            self.company = Self::default().company;
        }
        self.slack_api_base = self.slack_api_base.trim_end_matches('/').to_string();
        self
    }
}
