// src/services/normalizer.rs
use serde_json::{Map, Value};

use crate::{error::AppError, message::ChatRequest};

/// Turns a raw request body into a trimmed, non-empty message.
///
/// Never fails on malformed input: anything that does not decode is treated as an empty
/// object, which ends in `AppError::EmptyMessage`.
pub fn normalize_body(body: &[u8]) -> Result<ChatRequest, AppError> {
    normalize_value(decode_body(body))
}

pub fn normalize_value(body: Value) -> Result<ChatRequest, AppError> {
    let message = coerce_message(body.get("message"));
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(AppError::EmptyMessage);
    }
    Ok(ChatRequest {
        message: trimmed.to_string(),
    })
}

fn decode_body(body: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(body) {
        // Some clients send the JSON document as a JSON string.
        Ok(Value::String(inner)) => serde_json::from_str(&inner).unwrap_or_else(|_| empty()),
        Ok(value) => value,
        Err(_) => empty(),
    }
}

fn empty() -> Value {
    Value::Object(Map::new())
}

// Falsy values (zero, `false`, `null`) and structured values coerce to empty.
fn coerce_message(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => String::new(),
    }
}
