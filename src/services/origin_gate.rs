// src/services/origin_gate.rs
//! CORS decisions and method dispatch for the chat endpoint.
//!
//! `tower_http::cors::CorsLayer` is not used: it only sends `Access-Control-Allow-Methods` on
//! preflight responses, while these headers go on every response.

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue, Method,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, VARY,
        },
    },
    middleware::Next,
    response::Response,
};

use crate::state::SharedState;

pub const ALLOWED_METHODS: &str = "POST, OPTIONS, GET";
pub const ALLOWED_HEADERS: &str = "Content-Type";

/// Which origins may read responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    /// Echo the request origin only when it is listed. Entries are normalized.
    AllowList(Vec<String>),
    /// Always advertise this one origin.
    Fixed(HeaderValue),
}

/// Trims whitespace and drops a single trailing slash.
pub fn normalize_origin(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

impl OriginPolicy {
    /// Value for `Access-Control-Allow-Origin`, or `None` to omit the header.
    pub fn allow_origin(&self, request_origin: Option<&HeaderValue>) -> Option<HeaderValue> {
        match self {
            OriginPolicy::Fixed(value) => Some(value.clone()),
            OriginPolicy::AllowList(allowed) => {
                let origin = request_origin?;
                let normalized = normalize_origin(origin.to_str().ok()?);
                allowed
                    .iter()
                    .any(|o| *o == normalized)
                    .then(|| origin.clone())
            }
        }
    }

    pub fn varies_by_origin(&self) -> bool {
        matches!(self, OriginPolicy::AllowList(_))
    }

    pub fn apply(&self, request_origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        if let Some(value) = self.allow_origin(request_origin) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        if self.varies_by_origin() {
            headers.append(VARY, HeaderValue::from_static("Origin"));
        }
    }
}

/// What the endpoint does with a request, decided by method alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Preflight,
    UsageHint,
    Chat,
    NotAllowed,
}

impl Dispatch {
    pub fn for_method(method: &Method) -> Self {
        match *method {
            Method::OPTIONS => Dispatch::Preflight,
            Method::GET => Dispatch::UsageHint,
            Method::POST => Dispatch::Chat,
            _ => Dispatch::NotAllowed,
        }
    }
}

/// Middleware that stamps CORS headers on every response, errors included.
pub async fn origin_gate(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    let origin = req.headers().get(ORIGIN).cloned();
    let mut response = next.run(req).await;
    state
        .config
        .origin_policy
        .apply(origin.as_ref(), response.headers_mut());
    response
}
