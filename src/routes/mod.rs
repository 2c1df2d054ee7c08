// src/routes/mod.rs
pub mod chat;

use crate::{error::panic_response, services::origin_gate::origin_gate, state::SharedState};
use axum::{
    Router,
    middleware,
    routing::{any, get},
};
use chat::chat_handler;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", any(chat_handler))
        .route("/api/chat", any(chat_handler))
        .route("/health", get(|| async { "OK" }))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(state.clone(), origin_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
