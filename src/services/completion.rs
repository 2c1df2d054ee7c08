// src/services/completion.rs
//! Bridge to the upstream completion API: builds the request, calls it, and reduces the
//! response to a single reply string.

use std::time::Instant;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;

pub const SYSTEM_INSTRUCTIONS: &str = "You are Zazi, an APLGO Q&A assistant for onlinecourseformlm.com. \
Be short, clear, and practical. \
If asked medical questions: give general wellness info and recommend seeing a qualified health professional. \
Never claim to cure. If unsure, ask ONE short follow-up question.";

pub const FALLBACK_REPLY: &str = "I couldn't answer that. Please try again.";

#[derive(Debug, Error)]
pub enum CompletionError {
    /// Upstream answered with a non-success status.
    #[error("upstream status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub instructions: &'a str,
    pub input: &'a str,
}

#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: Client,
    endpoint: String,
    model: String,
}

impl CompletionClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.upstream_timeout).build()?;
        Ok(Self {
            http,
            endpoint: config.upstream_url.clone(),
            model: config.model.clone(),
        })
    }

    /// Sends one message and returns the extracted, trimmed reply (never empty).
    ///
    /// The call is owned by the caller's future: dropping it aborts the request.
    pub async fn complete(&self, api_key: &str, message: &str) -> Result<String, CompletionError> {
        let payload = CompletionRequest {
            model: &self.model,
            instructions: SYSTEM_INSTRUCTIONS,
            input: message,
        };

        let started = Instant::now();
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                message: upstream_error_message(status, &body),
            });
        }

        let body: Value = serde_json::from_slice(&body)?;
        let reply = extract_reply(&body);
        tracing::info!(
            model = %self.model,
            elapsed = ?started.elapsed(),
            reply_len = reply.len(),
            "upstream completion succeeded"
        );
        Ok(reply)
    }
}

/// Human-readable message from an upstream error envelope.
pub fn upstream_error_message(status: StatusCode, body: &[u8]) -> String {
    let from_envelope = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| match v.get("error") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(err) => err.get("message").and_then(Value::as_str).map(str::to_string),
            None => None,
        })
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    from_envelope.unwrap_or_else(|| format!("Upstream error (status {})", status.as_u16()))
}

/// The response shapes a reply can be pulled from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Top-level `output_text`.
    FlattenedText,
    /// `output[].content[]` parts of kind `output_text` or `text`.
    OutputItems,
    /// Chat-completions style `choices[].message.content`.
    ChatChoices,
}

impl ExtractionStrategy {
    pub const PRIORITY: [ExtractionStrategy; 3] = [
        ExtractionStrategy::FlattenedText,
        ExtractionStrategy::OutputItems,
        ExtractionStrategy::ChatChoices,
    ];

    pub fn extract(self, body: &Value) -> Option<String> {
        let text = match self {
            ExtractionStrategy::FlattenedText => body
                .get("output_text")
                .and_then(Value::as_str)
                .map(str::to_string),
            ExtractionStrategy::OutputItems => join_fragments(
                array(body, "output")
                    .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"))
                    .flat_map(|item| array(item, "content"))
                    .filter(|part| {
                        matches!(
                            part.get("type").and_then(Value::as_str),
                            Some("output_text" | "text")
                        )
                    })
                    .filter_map(|part| part.get("text").and_then(Value::as_str)),
            ),
            ExtractionStrategy::ChatChoices => join_fragments(
                array(body, "choices").filter_map(|choice| {
                    choice
                        .get("message")
                        .and_then(|m| m.get("content"))
                        .and_then(Value::as_str)
                }),
            ),
        }?;

        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// Applies each strategy in priority order; falls back to a canned reply.
pub fn extract_reply(body: &Value) -> String {
    ExtractionStrategy::PRIORITY
        .iter()
        .find_map(|strategy| strategy.extract(body))
        .unwrap_or_else(|| FALLBACK_REPLY.to_string())
}

fn array<'a>(value: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

// Fragments are joined in encounter order, one per line.
fn join_fragments<'a>(fragments: impl Iterator<Item = &'a str>) -> Option<String> {
    let parts: Vec<&str> = fragments.filter(|f| !f.trim().is_empty()).collect();
    (!parts.is_empty()).then(|| parts.join("\n"))
}
