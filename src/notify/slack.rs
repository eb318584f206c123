use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{DeliveryAck, Identity, Publisher};
use crate::digest::DigestReport;
use crate::error::{DigestError, Result};

/// Slack Web API publisher (bot token + channel id).
pub struct SlackPublisher {
    client: Client,
    api_base: String,
    token: String,
    channel: String,
}

impl SlackPublisher {
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        token: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            token: token.into(),
            channel: channel.into(),
        }
    }

    async fn call<B: Serialize + ?Sized>(&self, method: &str, body: &B) -> Result<SlackReply> {
        let url = format!("{}/{method}", self.api_base);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| DigestError::delivery(format!("slack {method}: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| DigestError::delivery(format!("slack {method} body: {e}")))?;
        if !status.is_success() {
            return Err(DigestError::delivery(format!(
                "slack {method} returned {status}: {text}"
            )));
        }

        let reply: SlackReply = serde_json::from_str(&text)
            .map_err(|e| DigestError::delivery(format!("slack {method} reply: {e}")))?;
        if !reply.ok {
            return Err(DigestError::delivery(format!(
                "slack {method}: {}",
                reply.error.as_deref().unwrap_or("unknown error")
            )));
        }
        Ok(reply)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SlackReply {
    ok: bool,
    error: Option<String>,
    user: Option<String>,
    team: Option<String>,
    channel: Option<String>,
    ts: Option<String>,
}

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
    mrkdwn: bool,
}

/// Slack treats `&`, `<` and `>` as control characters in message text.
pub fn escape_mrkdwn(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

#[async_trait::async_trait]
impl Publisher for SlackPublisher {
    async fn probe(&self) -> Result<Identity> {
        let reply = self.call("auth.test", &serde_json::json!({})).await?;
        let identity = Identity {
            user: reply.user.unwrap_or_default(),
            team: reply.team.unwrap_or_default(),
        };
        tracing::info!(user = %identity.user, team = %identity.team, "slack connection ok");
        Ok(identity)
    }

    async fn publish(&self, report: &DigestReport) -> Result<DeliveryAck> {
        let text = escape_mrkdwn(report.as_str());
        let body = PostMessage {
            channel: &self.channel,
            text: &text,
            mrkdwn: true,
        };
        let reply = self.call("chat.postMessage", &body).await?;
        let ack = DeliveryAck {
            channel: reply.channel.unwrap_or_else(|| self.channel.clone()),
            ts: reply.ts.unwrap_or_default(),
        };
        tracing::info!(channel = %ack.channel, ts = %ack.ts, "digest posted");
        Ok(ack)
    }

    fn destination(&self) -> &str {
        &self.channel
    }
}
