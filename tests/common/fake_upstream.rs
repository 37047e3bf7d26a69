//! Fake ESI and zKillboard servers for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `GET /latest/killmails/{id}/` and `/latest/killmails/{id}/{hash}/` —
//!   registered killmail payloads, bearer token required
//! - `GET /latest/characters/{id}/killmails/recent/` — recent killmail refs
//! - `GET /related/{system}/{time}/` — registered public battle reports
//!
//! Every request's path, query, and `Authorization` header is recorded so
//! tests can assert on what the clients sent.
//!
//! # Example
//!
//! ```rust,no_run
//! let api = FakeUpstream::start().await.unwrap();
//! api.add_killmail(42, reference_payload()).await;
//! let esi = generator(&api.esi_base());
//! ```

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use super::builders::TEST_TOKEN;

/// One request as the fake server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct UpstreamState {
    killmails: HashMap<u64, Value>,
    recent: HashMap<u64, Value>,
    battles: HashMap<String, Value>,
    /// Forced status for every response, if set.
    fail_with: Option<StatusCode>,
    requests: Vec<RecordedRequest>,
}

type Shared = Arc<Mutex<UpstreamState>>;

/// Handle to the running fake upstream server.
pub struct FakeUpstream {
    addr: SocketAddr,
    state: Shared,
}

impl FakeUpstream {
    /// Start the fake server on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state: Shared = Arc::new(Mutex::new(UpstreamState::default()));

        let app = Router::new()
            .route("/latest/killmails/{id}/", get(killmail))
            .route("/latest/killmails/{id}/{hash}/", get(killmail_with_hash))
            .route("/latest/characters/{id}/killmails/recent/", get(recent))
            .route("/related/{system}/{time}/", get(battle))
            .layer(axum::middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// ESI base URL, as `[esi] base_url` would hold it.
    pub fn esi_base(&self) -> String {
        format!("{}/latest", self.base_url())
    }

    /// Public battle-report URL for a registered battle.
    pub fn battle_url(&self, system: &str, time: &str) -> String {
        format!("{}/related/{}/{}/", self.base_url(), system, time)
    }

    pub async fn add_killmail(&self, id: u64, payload: Value) {
        self.state.lock().await.killmails.insert(id, payload);
    }

    pub async fn add_recent(&self, character_id: u64, refs: Value) {
        self.state.lock().await.recent.insert(character_id, refs);
    }

    pub async fn add_battle(&self, system: &str, time: &str, payload: Value) {
        self.state
            .lock()
            .await
            .battles
            .insert(format!("{system}/{time}"), payload);
    }

    /// Make every subsequent request fail with `status`.
    pub async fn fail_with(&self, status: StatusCode) {
        self.state.lock().await.fail_with = Some(status);
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }
}

// ---------------------------------------------------------------------------
// Middleware and route handlers
// ---------------------------------------------------------------------------

async fn record(State(state): State<Shared>, req: Request, next: axum::middleware::Next) -> Response {
    let forced = {
        let mut state = state.lock().await;
        state.requests.push(RecordedRequest {
            path: req.uri().path().to_string(),
            query: req.uri().query().map(str::to_string),
            authorization: req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        });
        state.fail_with
    };
    match forced {
        Some(status) => status.into_response(),
        None => next.run(req).await,
    }
}

fn authorized(req_auth: Option<&str>) -> bool {
    req_auth == Some(format!("Bearer {TEST_TOKEN}").as_str())
}

async fn lookup_killmail(state: &Shared, id: u64, headers: &axum::http::HeaderMap) -> Response {
    let auth = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    if !authorized(auth) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match state.lock().await.killmails.get(&id) {
        Some(payload) => Json(payload.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn killmail(
    Path(id): Path<u64>,
    State(state): State<Shared>,
    headers: axum::http::HeaderMap,
) -> Response {
    lookup_killmail(&state, id, &headers).await
}

async fn killmail_with_hash(
    Path((id, _hash)): Path<(u64, String)>,
    State(state): State<Shared>,
    headers: axum::http::HeaderMap,
) -> Response {
    lookup_killmail(&state, id, &headers).await
}

async fn recent(
    Path(id): Path<u64>,
    State(state): State<Shared>,
    headers: axum::http::HeaderMap,
) -> Response {
    let auth = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    if !authorized(auth) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let refs = state
        .lock()
        .await
        .recent
        .get(&id)
        .cloned()
        .unwrap_or_else(|| Value::Array(vec![]));
    Json(refs).into_response()
}

async fn battle(
    Path((system, time)): Path<(String, String)>,
    State(state): State<Shared>,
) -> Response {
    match state.lock().await.battles.get(&format!("{system}/{time}")) {
        Some(payload) => Json(payload.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
