use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{
    error::{AppError, AppResult},
    message::{ChatReply, UsageHint},
    services::{normalizer::normalize_body, origin_gate::Dispatch},
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Response> {
    match Dispatch::for_method(&method) {
        Dispatch::Preflight => Ok(StatusCode::OK.into_response()),
        Dispatch::UsageHint => Ok(Json(UsageHint::default()).into_response()),
        Dispatch::NotAllowed => Err(AppError::MethodNotAllowed),
        Dispatch::Chat => {
            // An unreadable body is treated like an empty one.
            let body = body.unwrap_or_default();
            let reply = chat(&state, &body).await?;
            Ok(Json(reply).into_response())
        }
    }
}

async fn chat(state: &SharedState, body: &[u8]) -> AppResult<ChatReply> {
    let request = normalize_body(body)?;

    let api_key = state
        .config
        .api_key
        .as_deref()
        .ok_or(AppError::MissingCredential)?;

    let reply = state
        .completions
        .complete(api_key, &request.message)
        .await?;

    Ok(ChatReply::new(reply))
}
