// src/error.rs
use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::message::ChatReply;
use crate::services::completion::CompletionError;

pub const EMPTY_MESSAGE_REPLY: &str = "Please type a message.";
pub const MISSING_CREDENTIAL_REPLY: &str = "Server missing API key.";
pub const METHOD_NOT_ALLOWED_REPLY: &str = "Method not allowed.";
pub const SERVER_ERROR_REPLY: &str = "Server error. Please try again.";

pub type AppResult<T> = Result<T, AppError>;

/// Every way a chat request can fail. Each variant renders as a `{ reply }` JSON body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("upstream API key is not configured")]
    MissingCredential,

    #[error("upstream returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::EmptyMessage => StatusCode::BAD_REQUEST,
            AppError::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The text shown to the browser. Unexpected detail stays server-side.
    pub fn reply(&self) -> String {
        match self {
            AppError::EmptyMessage => EMPTY_MESSAGE_REPLY.to_string(),
            AppError::MissingCredential => MISSING_CREDENTIAL_REPLY.to_string(),
            AppError::Upstream { message, .. } => format!("Backend error: {message}"),
            AppError::MethodNotAllowed => METHOD_NOT_ALLOWED_REPLY.to_string(),
            AppError::Unexpected(_) => SERVER_ERROR_REPLY.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::EmptyMessage => tracing::debug!("rejected empty message"),
            AppError::MethodNotAllowed => tracing::debug!("rejected unsupported method"),
            AppError::MissingCredential => tracing::error!("OPENAI_API_KEY is not set"),
            AppError::Upstream { status, message } => {
                tracing::error!(status, %message, "upstream completion failed")
            }
            AppError::Unexpected(detail) => tracing::error!(%detail, "chat request failed"),
        }
        (self.status(), Json(ChatReply::new(self.reply()))).into_response()
    }
}

impl From<CompletionError> for AppError {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::Status { status, message } => AppError::Upstream { status, message },
            other => AppError::Unexpected(other.to_string()),
        }
    }
}

/// Renders a handler panic as the generic server error. Used by `CatchPanicLayer`.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::Unexpected(format!("handler panicked: {detail}")).into_response()
}
