// src/error.rs
//! Error taxonomy shared by every pipeline stage.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DigestError>;

#[derive(Debug, Error)]
pub enum DigestError {
    /// Required configuration absent or blank. Lists every missing key at once.
    #[error("missing required configuration: {}", .missing.join(", "))]
    Config { missing: Vec<String> },

    /// Credential exchange failed (transport, non-2xx, or no token in reply).
    /// The upstream body, when there is one, is part of the message.
    #[error("credential exchange failed: {message}{}", upstream(.body))]
    Auth {
        message: String,
        body: Option<String>,
    },

    /// Catalog reply did not have the expected shape.
    #[error("malformed catalog response: {0}")]
    MalformedResponse(String),

    /// Classifier call failed or its reply violated the verdict schema.
    #[error("classification failed: {0}")]
    Classification(String),

    /// Publish or connectivity probe failed.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

fn upstream(body: &Option<String>) -> String {
    match body {
        Some(b) => format!(" (upstream: {})", b.trim()),
        None => String::new(),
    }
}

impl DigestError {
    pub fn auth(message: impl Into<String>, body: Option<String>) -> Self {
        Self::Auth {
            message: message.into(),
            body: body.filter(|b| !b.trim().is_empty()),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn classification(message: impl Into<String>) -> Self {
        Self::Classification(message.into())
    }

    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery(message.into())
    }

    /// Short machine-friendly kind, used as a metrics/log label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Auth { .. } => "auth",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Classification(_) => "classification",
            Self::Delivery(_) => "delivery",
        }
    }
}
