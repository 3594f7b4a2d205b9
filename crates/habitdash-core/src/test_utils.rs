//! Test utilities for habitdash-core
//!
//! Provides an in-process mock of the PostgREST-style backend so the remote
//! repository and sync service can be exercised without a network.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tokio::sync::oneshot;

#[derive(Default)]
struct MockState {
    /// Rows per table name
    tables: Mutex<HashMap<String, Vec<Value>>>,
    /// When non-zero every request fails with this status
    fail_status: AtomicU16,
}

/// Mock REST backend for testing
pub struct MockBackendServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockBackendServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route(
                "/rest/v1/:table",
                get(handle_select)
                    .post(handle_insert)
                    .patch(handle_update)
                    .delete(handle_delete),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make every subsequent request fail with `status`
    pub fn fail_with(&self, status: u16) {
        self.state.fail_status.store(status, Ordering::SeqCst);
    }

    /// Serve requests normally again
    pub fn recover(&self) {
        self.state.fail_status.store(0, Ordering::SeqCst);
    }

    /// Rows currently stored in `table`
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state
            .tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockBackendServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Shared request checks: injected failures and the API key header
fn precheck(state: &MockState, headers: &HeaderMap) -> Option<Response> {
    let status = state.fail_status.load(Ordering::SeqCst);
    if status != 0 {
        let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Some((code, r#"{"message":"injected failure"}"#).into_response());
    }

    let has_key = headers
        .get("apikey")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| !v.is_empty());
    if !has_key {
        return Some((StatusCode::UNAUTHORIZED, r#"{"message":"No API key found"}"#).into_response());
    }

    None
}

/// Apply `column=eq.value` filters from the query string
fn matches(row: &Value, params: &HashMap<String, String>) -> bool {
    params
        .iter()
        .filter(|(key, _)| key.as_str() != "order")
        .all(|(column, filter)| {
            let expected = filter.strip_prefix("eq.").unwrap_or(filter);
            row.get(column).and_then(Value::as_str) == Some(expected)
        })
}

async fn handle_select(
    State(state): State<Arc<MockState>>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = precheck(&state, &headers) {
        return rejection;
    }

    let tables = state.tables.lock().unwrap();
    let mut rows: Vec<Value> = tables
        .get(&table)
        .map(|rows| rows.iter().filter(|r| matches(r, &params)).cloned().collect())
        .unwrap_or_default();

    if params.get("order").map(String::as_str) == Some("created_at.desc") {
        // RFC 3339 UTC strings sort chronologically
        rows.sort_by(|a, b| {
            let a = a.get("created_at").and_then(Value::as_str).unwrap_or("");
            let b = b.get("created_at").and_then(Value::as_str).unwrap_or("");
            b.cmp(a)
        });
    }

    Json(rows).into_response()
}

async fn handle_insert(
    State(state): State<Arc<MockState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Vec<Value>>,
) -> Response {
    if let Some(rejection) = precheck(&state, &headers) {
        return rejection;
    }

    let mut tables = state.tables.lock().unwrap();
    tables.entry(table).or_default().extend(body.iter().cloned());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn handle_update(
    State(state): State<Arc<MockState>>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Response {
    if let Some(rejection) = precheck(&state, &headers) {
        return rejection;
    }

    let mut tables = state.tables.lock().unwrap();
    let mut updated = Vec::new();
    if let Some(rows) = tables.get_mut(&table) {
        for row in rows.iter_mut().filter(|r| matches(r, &params)) {
            if let (Some(target), Some(changes)) = (row.as_object_mut(), patch.as_object()) {
                for (key, value) in changes {
                    target.insert(key.clone(), value.clone());
                }
            }
            updated.push(row.clone());
        }
    }

    Json(updated).into_response()
}

async fn handle_delete(
    State(state): State<Arc<MockState>>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = precheck(&state, &headers) {
        return rejection;
    }

    let mut tables = state.tables.lock().unwrap();
    if let Some(rows) = tables.get_mut(&table) {
        rows.retain(|r| !matches(r, &params));
    }
    StatusCode::NO_CONTENT.into_response()
}
