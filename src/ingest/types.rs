// src/ingest/types.rs
use std::fmt;

use crate::error::Result;

pub const UNCATEGORIZED: &str = "Uncategorized";

/// One normalized launch record for the current run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Listing {
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub url: String,
    pub topics: Vec<String>,
    pub category: String, // first topic, or UNCATEGORIZED
}

impl Listing {
    pub fn new(
        name: impl Into<String>,
        tagline: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        topics: Vec<String>,
    ) -> Self {
        let category = topics
            .first()
            .cloned()
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        Self {
            name: name.into(),
            tagline: tagline.into(),
            description: description.into(),
            url: url.into(),
            topics,
            category,
        }
    }
}

/// Short-lived bearer token. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(len={})", self.0.len())
    }
}

#[async_trait::async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn acquire_token(&self, client_id: &str, client_secret: &str) -> Result<AccessToken>;
}

#[async_trait::async_trait]
pub trait ListingSource: Send + Sync {
    /// Most recent `batch_size` listings. An empty vec is a valid answer.
    async fn fetch_recent(&self, token: &AccessToken, batch_size: u32) -> Result<Vec<Listing>>;
    fn name(&self) -> &'static str;
}
