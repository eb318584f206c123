// src/analyze/openai.rs
//! OpenAI chat-completions classifier (JSON response mode).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::analyze::prompt::build_prompt;
use crate::analyze::verdict::{decode_verdicts, Verdict};
use crate::analyze::Classifier;
use crate::digest::DEFAULT_COMPANY;
use crate::error::{DigestError, Result};
use crate::ingest::Listing;

pub struct OpenAiClassifier {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
    company: String,
}

impl OpenAiClassifier {
    pub fn new(http: reqwest::Client, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            api_key: api_key.into(),
            model: "gpt-4.1".to_string(),
            temperature: 0.7,
            company: DEFAULT_COMPANY.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    response_format: ResponseFormat<'a>,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: Option<String>,
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    async fn classify(&self, listings: &[Listing]) -> Result<Vec<Verdict>> {
        let prompt = build_prompt(&self.company, listings)?;
        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: &prompt,
            }],
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| DigestError::classification(format!("openai request: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| DigestError::classification(format!("openai body: {e}")))?;
        if !status.is_success() {
            return Err(DigestError::classification(format!(
                "openai returned {status}: {text}"
            )));
        }

        let body: Resp = serde_json::from_str(&text).map_err(|e| {
            DigestError::classification(format!("openai envelope is not a completion: {e}"))
        })?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DigestError::classification("completion has no message content"))?;

        decode_verdicts(&content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
