// src/config/mod.rs
//! Required secrets (environment) and optional tuning (file).

pub mod digest;

use std::fmt;

use tracing::info;

use crate::error::{DigestError, Result};

pub use digest::DigestConfig;

pub const ENV_CLIENT_ID: &str = "PRODUCT_HUNT_API_KEY";
pub const ENV_CLIENT_SECRET: &str = "PRODUCT_HUNT_CLIENT_SECRET";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_SLACK_BOT_TOKEN: &str = "SLACK_BOT_TOKEN";
pub const ENV_SLACK_CHANNEL_ID: &str = "SLACK_CHANNEL_ID";

/// Every key a run needs before it may touch the network.
pub const REQUIRED_KEYS: [&str; 5] = [
    ENV_CLIENT_ID,
    ENV_CLIENT_SECRET,
    ENV_OPENAI_API_KEY,
    ENV_SLACK_BOT_TOKEN,
    ENV_SLACK_CHANNEL_ID,
];

#[derive(Clone)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    pub openai_api_key: String,
    pub slack_bot_token: String,
    pub slack_channel_id: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Resolve all required keys through `lookup`. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut get = |key: &str| -> String {
            match lookup(key).map(|v| v.trim().to_string()) {
                Some(v) if !v.is_empty() => v,
                _ => {
                    missing.push(key.to_string());
                    String::new()
                }
            }
        };

        let settings = Self {
            client_id: get(ENV_CLIENT_ID),
            client_secret: get(ENV_CLIENT_SECRET),
            openai_api_key: get(ENV_OPENAI_API_KEY),
            slack_bot_token: get(ENV_SLACK_BOT_TOKEN),
            slack_channel_id: get(ENV_SLACK_CHANNEL_ID),
        };

        if missing.is_empty() {
            Ok(settings)
        } else {
            Err(DigestError::Config { missing })
        }
    }

    /// Safe diagnostics: key lengths and the (non-secret) channel only.
    pub fn log_presence(&self) {
        info!(
            client_id_len = self.client_id.len(),
            client_secret_len = self.client_secret.len(),
            openai_key_len = self.openai_api_key.len(),
            slack_token_len = self.slack_bot_token.len(),
            channel = %self.slack_channel_id,
            "required configuration present"
        );
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("client_id", &mask(&self.client_id))
            .field("client_secret", &mask(&self.client_secret))
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("slack_bot_token", &mask(&self.slack_bot_token))
            .field("slack_channel_id", &self.slack_channel_id)
            .finish()
    }
}

/// First four chars then an ellipsis; short values are fully hidden.
pub fn mask(secret: &str) -> String {
    if secret.chars().count() <= 8 {
        return "****".to_string();
    }
    let head: String = secret.chars().take(4).collect();
    format!("{head}...")
}
