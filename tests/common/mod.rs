// Shared helpers for integration tests: an in-process stand-in for the upstream completion API.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chat_relay::{config::Config, routes::create_router, state::AppState};
use serde_json::Value;

/// What the mock upstream saw on its last call.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

struct MockState {
    status: StatusCode,
    body: String,
    delay: Duration,
    hits: AtomicUsize,
    last: Mutex<Option<RecordedRequest>>,
}

pub struct MockUpstream {
    pub url: String,
    state: Arc<MockState>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockUpstream {
    pub async fn json(status: StatusCode, body: Value) -> Self {
        Self::start(status, body.to_string(), Duration::ZERO).await
    }

    pub async fn raw(status: StatusCode, body: &str) -> Self {
        Self::start(status, body.to_string(), Duration::ZERO).await
    }

    pub async fn slow(delay: Duration, body: Value) -> Self {
        Self::start(StatusCode::OK, body.to_string(), delay).await
    }

    async fn start(status: StatusCode, body: String, delay: Duration) -> Self {
        let state = Arc::new(MockState {
            status,
            body,
            delay,
            hits: AtomicUsize::new(0),
            last: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v1/responses", post(responses_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                eprintln!("mock upstream error: {e}");
            }
        });

        Self {
            url: format!("http://{addr}/v1/responses"),
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.last.lock().unwrap().clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn responses_handler(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last.lock().unwrap() = Some(RecordedRequest {
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
        .into_response()
}

/// An address nothing listens on.
pub fn dead_upstream_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/v1/responses")
}

pub fn config(pairs: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn app(config: Config) -> Router {
    create_router(Arc::new(AppState::new(config).unwrap()))
}

/// App wired to `upstream_url` with a test key and the default fixed origin.
pub fn app_for(upstream_url: &str) -> Router {
    app(config(&[
        ("OPENAI_API_KEY", "sk-test"),
        ("OPENAI_API_URL", upstream_url),
    ]))
}
