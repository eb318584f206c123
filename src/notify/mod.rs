// src/notify/mod.rs
//! Digest delivery to a single messaging destination.

pub mod slack;

use crate::digest::DigestReport;
use crate::error::Result;

pub use slack::SlackPublisher;

/// Who the channel credentials authenticate as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: String,
    pub team: String,
}

/// Acknowledgment of a published message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAck {
    pub channel: String,
    pub ts: String,
}

#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    /// Cheap connectivity/credential check, run before any pipeline work.
    async fn probe(&self) -> Result<Identity>;
    /// Publish the report as one message to the configured destination.
    async fn publish(&self, report: &DigestReport) -> Result<DeliveryAck>;
    fn destination(&self) -> &str;
}
