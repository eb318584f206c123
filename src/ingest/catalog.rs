// src/ingest/catalog.rs
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{DigestError, Result};
use crate::ingest::types::{AccessToken, Listing, ListingSource};

const RECENT_POSTS_QUERY: &str = r#"
query RecentPosts($first: Int!) {
  posts(first: $first) {
    edges {
      node {
        name
        tagline
        description
        url
        topics {
          edges {
            node {
              name
            }
          }
        }
      }
    }
  }
}
"#;

/// Product Hunt v2 GraphQL catalog.
pub struct ProductHuntCatalog {
    http: reqwest::Client,
    graphql_url: String,
}

impl ProductHuntCatalog {
    pub fn new(http: reqwest::Client, graphql_url: impl Into<String>) -> Self {
        Self {
            http,
            graphql_url: graphql_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostEdge {
    node: PostNode,
}

#[derive(Debug, Deserialize)]
struct PostNode {
    name: Option<String>,
    tagline: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(default)]
    topics: Option<TopicConnection>,
}

#[derive(Debug, Deserialize)]
struct TopicConnection {
    #[serde(default)]
    edges: Vec<TopicEdge>,
}

#[derive(Debug, Deserialize)]
struct TopicEdge {
    node: TopicNode,
}

#[derive(Debug, Deserialize)]
struct TopicNode {
    name: String,
}

impl From<PostNode> for Listing {
    fn from(n: PostNode) -> Self {
        let topics = n
            .topics
            .map(|t| t.edges.into_iter().map(|e| e.node.name).collect())
            .unwrap_or_default();
        Listing::new(
            n.name.unwrap_or_default(),
            n.tagline.unwrap_or_default(),
            n.description.unwrap_or_default(),
            n.url.unwrap_or_default(),
            topics,
        )
    }
}

/// Validate a GraphQL reply and normalize it into listings.
///
/// Missing `data` or missing `data.posts.edges` are malformed; an empty
/// `edges` array is a legitimate empty batch.
pub fn parse_listings(payload: &Value) -> Result<Vec<Listing>> {
    let data = match payload.get("data") {
        Some(d) if !d.is_null() => d,
        _ => {
            let detail = payload
                .get("errors")
                .map(|e| format!(" (errors: {e})"))
                .unwrap_or_default();
            return Err(DigestError::malformed(format!(
                "response has no top-level data payload{detail}"
            )));
        }
    };

    let edges = data
        .get("posts")
        .and_then(|p| p.get("edges"))
        .filter(|e| !e.is_null())
        .ok_or_else(|| DigestError::malformed("response data has no posts.edges container"))?;

    let edges: Vec<PostEdge> = serde_json::from_value(edges.clone())
        .map_err(|e| DigestError::malformed(format!("posts.edges has unexpected shape: {e}")))?;

    Ok(edges.into_iter().map(|e| Listing::from(e.node)).collect())
}

#[async_trait]
impl ListingSource for ProductHuntCatalog {
    async fn fetch_recent(&self, token: &AccessToken, batch_size: u32) -> Result<Vec<Listing>> {
        let body = serde_json::json!({
            "query": RECENT_POSTS_QUERY,
            "variables": { "first": batch_size },
        });

        let resp = self
            .http
            .post(&self.graphql_url)
            .bearer_auth(token.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DigestError::malformed(format!("catalog request: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| DigestError::malformed(format!("catalog body: {e}")))?;
        if !status.is_success() {
            return Err(DigestError::malformed(format!(
                "catalog returned {status}: {text}"
            )));
        }

        let payload: Value = serde_json::from_str(&text)
            .map_err(|e| DigestError::malformed(format!("catalog reply is not JSON: {e}")))?;
        parse_listings(&payload)
    }

    fn name(&self) -> &'static str {
        "producthunt"
    }
}
