// src/message.rs
use serde::{Deserialize, Serialize};

pub const USAGE_HINT: &str = "Use POST /api/chat with JSON body: { message: \"...\" }";

/// A normalized inbound chat message. `message` is trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

impl ChatReply {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}

/// Body returned to a plain `GET`, so a browser visit explains how to use the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UsageHint {
    pub ok: bool,
    pub message: String,
}

impl Default for UsageHint {
    fn default() -> Self {
        Self {
            ok: true,
            message: USAGE_HINT.to_string(),
        }
    }
}
