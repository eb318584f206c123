// src/artifacts.rs
//! Run artifacts: the normalized listing batch and the rendered digest.
//! Written as soon as each exists, whatever happens to delivery afterwards.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::digest::DigestReport;
use crate::ingest::Listing;

pub const LISTINGS_FILE: &str = "raw_posts.json";
pub const REPORT_FILE: &str = "competitive_digest.md";

#[async_trait::async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn store_listings(&self, listings: &[Listing]) -> Result<()>;
    async fn store_report(&self, report: &DigestReport) -> Result<()>;
}

/// Writes artifacts into one directory (tmp file + rename).
pub struct FileArtifacts {
    dir: PathBuf,
}

impl FileArtifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write_atomic(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.dir.join(name);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, content)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("renaming into {}", path.display()))?;
        Ok(path)
    }
}

#[async_trait::async_trait]
impl ArtifactSink for FileArtifacts {
    async fn store_listings(&self, listings: &[Listing]) -> Result<()> {
        let json = serde_json::to_string_pretty(listings).context("serializing listings")?;
        let path = self.write_atomic(LISTINGS_FILE, json.as_bytes()).await?;
        tracing::info!(path = %path.display(), count = listings.len(), "listings saved");
        Ok(())
    }

    async fn store_report(&self, report: &DigestReport) -> Result<()> {
        let path = self.write_atomic(REPORT_FILE, report.as_str().as_bytes()).await?;
        tracing::info!(path = %path.display(), "digest saved");
        Ok(())
    }
}

/// Discards everything. For callers that only want the in-memory run context.
pub struct NoArtifacts;

#[async_trait::async_trait]
impl ArtifactSink for NoArtifacts {
    async fn store_listings(&self, _listings: &[Listing]) -> Result<()> {
        Ok(())
    }

    async fn store_report(&self, _report: &DigestReport) -> Result<()> {
        Ok(())
    }
}
