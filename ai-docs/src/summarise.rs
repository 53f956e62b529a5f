#![doc = "Summariser integration: bridges the core `Summariser` trait to an OpenAI-compatible chat-completions API."]
//
//! # Summariser client
//!
//! [`OpenAiClient`] implements [`ai_docs_core::contract::Summariser`] over HTTP.
//!
//! - Construct it from a resolved [`ToolConfig`] (`apiKey`, `endpoint`, `model`, `timeoutSecs`).
//! - Every request carries a timeout; expiry is reported as [`SummariseError::Timeout`].
//! - A missing key does not fail construction: each call then fails with
//!   [`SummariseError::MissingCredential`], so the run still completes.

use ai_docs_core::config::ToolConfig;
use ai_docs_core::contract::{SummariseError, Summariser};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// README text beyond this many characters is cut before sending.
pub const MAX_README_CHARS: usize = 12_000;
/// Error response bodies kept in [`SummariseError::Status`] are cut to this length.
pub const MAX_ERROR_BODY_CHARS: usize = 500;

const SYSTEM_PROMPT: &str = "You summarise software package documentation for an AI coding assistant. \
Answer with two or three plain sentences describing what the package does and its main entry points.";

pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        api_key: Option<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let client = OpenAiClient {
            http,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
            timeout,
        };
        tracing::info!(
            api_key_set = client.api_key.is_some(),
            endpoint = %client.endpoint,
            model = %client.model,
            timeout_secs = timeout.as_secs(),
            "Initialized summarisation client"
        );
        Ok(client)
    }

    pub fn from_config(config: &ToolConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.api_key.clone(),
            config.endpoint(),
            config.model(),
            config.timeout(),
        )
    }

    fn prompt(library: &str, readme: &str) -> String {
        if readme.trim().is_empty() {
            return format!(
                "The package `{library}` ships no README. Say briefly that no documentation is available."
            );
        }
        let readme = truncate_chars(readme, MAX_README_CHARS);
        format!("Summarise the README of the package `{library}`:\n\n{readme}")
    }
}

#[async_trait]
impl Summariser for OpenAiClient {
    async fn summarise(&self, library: &str, readme: &str) -> Result<String, SummariseError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SummariseError::MissingCredential)?;
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::prompt(library, readme),
                },
            ],
            temperature: 0.2,
        };

        tracing::info!(library, readme_len = readme.len(), "Requesting summary");
        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, library, "Summarisation request failed");
                if e.is_timeout() {
                    SummariseError::Timeout(self.timeout.as_secs())
                } else {
                    SummariseError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => truncate_chars(&body, MAX_ERROR_BODY_CHARS),
                Err(e) => {
                    tracing::warn!(error = ?e, library, "Could not read error response body");
                    String::new()
                }
            };
            tracing::error!(status = %status, library, body = %body, "Summarisation service returned an error");
            return Err(SummariseError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SummariseError::Timeout(self.timeout.as_secs())
            } else {
                SummariseError::Malformed(e.to_string())
            }
        })?;
        let summary = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| SummariseError::Malformed("response carried no summary text".to_string()))?;

        tracing::info!(library, summary_len = summary.len(), "Received summary");
        Ok(summary)
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
