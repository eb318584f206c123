// src/ingest/auth.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{DigestError, Result};
use crate::ingest::types::{AccessToken, CredentialProvider};

const GRANT_TYPE: &str = "client_credentials";

/// OAuth client-credentials exchange against the catalog's token endpoint.
pub struct OAuthCredentials {
    http: reqwest::Client,
    token_url: String,
}

impl OAuthCredentials {
    pub fn new(http: reqwest::Client, token_url: impl Into<String>) -> Self {
        Self {
            http,
            token_url: token_url.into(),
        }
    }
}

#[derive(Serialize)]
struct TokenReq<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
}

#[derive(Deserialize)]
struct TokenResp {
    access_token: Option<String>,
}

#[async_trait]
impl CredentialProvider for OAuthCredentials {
    async fn acquire_token(&self, client_id: &str, client_secret: &str) -> Result<AccessToken> {
        let req = TokenReq {
            client_id,
            client_secret,
            grant_type: GRANT_TYPE,
        };

        let resp = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&req)
            .send()
            .await
            .map_err(|e| DigestError::auth(format!("token request: {e}"), None))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| DigestError::auth(format!("token body: {e}"), None))?;

        if !status.is_success() {
            return Err(DigestError::auth(format!("token endpoint returned {status}"), Some(body)));
        }

        let parsed: TokenResp = serde_json::from_str(&body).map_err(|e| {
            DigestError::auth(format!("token reply is not JSON: {e}"), Some(body.clone()))
        })?;

        match parsed.access_token.filter(|t| !t.is_empty()) {
            Some(t) => {
                tracing::debug!(token_len = t.len(), "access token obtained");
                Ok(AccessToken::new(t))
            }
            None => Err(DigestError::auth("token reply has no access_token", Some(body))),
        }
    }
}
