//! In-memory Engine double shared by the service unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use crate::enums::approval_status::ApprovalStatus;
use crate::enums::http_method::HttpMethod;
use crate::enums::priority::Priority;
use crate::errors::{ClientError, ClientResult};
use crate::services::connection_manager::ConnectionManager;
use crate::services::scheduler::Scheduler;
use crate::structs::api_response::ApiResponse;
use crate::structs::approval_request::ApprovalRequest;
use crate::structs::change_history_entry::ChangeHistoryEntry;
use crate::structs::config::config::Config;
use crate::structs::push_connection::PushConnection;
use crate::traits::engine_api::EngineApi;
use crate::traits::push_connector::PushConnector;

type Route = (HttpMethod, String);

/// Answers by (method, full path), falling back to the path without its
/// query. Unscripted routes fail with `NotFound`.
pub struct FakeEngine {
    responses: Mutex<HashMap<Route, ClientResult<Value>>>,
    requests: Mutex<Vec<(HttpMethod, String, Option<Value>)>>,
    delays: Mutex<HashMap<Route, Duration>>,
    request_count: AtomicU32,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        let engine = Arc::new(Self {
            responses: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            delays: Mutex::new(HashMap::new()),
            request_count: AtomicU32::new(0),
        });
        engine.respond(HttpMethod::Get, "/health", json!({ "version": "1.0.0", "status": "healthy" }));
        engine
    }

    pub fn respond(&self, method: HttpMethod, path: &str, data: Value) {
        self.responses.lock().insert((method, path.to_string()), Ok(data));
    }

    pub fn fail(&self, method: HttpMethod, path: &str, error: ClientError) {
        self.responses.lock().insert((method, path.to_string()), Err(error));
    }

    /// Holds every answer on this route back for `delay`.
    pub fn delay(&self, method: HttpMethod, path: &str, delay: Duration) {
        self.delays.lock().insert((method, path.to_string()), delay);
    }

    pub fn calls(&self, method: HttpMethod, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|(m, p, _)| *m == method && strip_query(p) == path)
            .count()
    }

    pub fn requested_paths(&self) -> Vec<String> {
        self.requests.lock().iter().map(|(_, p, _)| p.clone()).collect()
    }

    pub fn last_body(&self, method: HttpMethod, path: &str) -> Option<Value> {
        self.requests
            .lock()
            .iter()
            .rev()
            .find(|(m, p, _)| *m == method && strip_query(p) == path)
            .and_then(|(_, _, body)| body.clone())
    }

    pub fn total_requests(&self) -> u32 {
        self.request_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineApi for FakeEngine {
    async fn send(&self, method: HttpMethod, path: &str, body: Option<Value>) -> ClientResult<ApiResponse<Value>> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push((method, path.to_string(), body));
        // Let concurrent callers interleave the way real I/O would.
        tokio::task::yield_now().await;

        let delay = lookup(&self.delays.lock(), method, path);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let answer = lookup(&self.responses.lock(), method, path);
        match answer {
            Some(Ok(data)) => Ok(ApiResponse::ok(data)),
            Some(Err(error)) => Err(error),
            None => Err(ClientError::not_found("route", path)),
        }
    }
}

pub struct NoPushConnector;

#[async_trait]
impl PushConnector for NoPushConnector {
    async fn connect(&self, _engine_url: &str, _api_key: &str) -> ClientResult<PushConnection> {
        Err(ClientError::connection("/ws", "push channel disabled in tests"))
    }
}

fn lookup<T: Clone>(routes: &HashMap<Route, T>, method: HttpMethod, path: &str) -> Option<T> {
    routes
        .get(&(method, path.to_string()))
        .or_else(|| routes.get(&(method, strip_query(path).to_string())))
        .cloned()
}

fn strip_query(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

/// Connected transport without a push channel.
pub async fn connected_transport(engine: Arc<FakeEngine>) -> Arc<ConnectionManager> {
    let transport = disconnected_transport(engine);
    transport.connect().await.unwrap();
    transport
}

pub fn disconnected_transport(engine: Arc<FakeEngine>) -> Arc<ConnectionManager> {
    let config = Config {
        real_time_updates: false,
        ..Config::default()
    };
    ConnectionManager::new(config, engine, Arc::new(NoPushConnector), Arc::new(Scheduler::new()))
}

pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + ChronoDuration::minutes(minutes)
}

pub fn request(id: &str, priority: Priority, created_at: DateTime<Utc>) -> ApprovalRequest {
    ApprovalRequest {
        id: id.to_string(),
        title: format!("Request {}", id),
        description: String::new(),
        priority,
        status: ApprovalStatus::Pending,
        created_at,
        expires_at: None,
        changes: Vec::new(),
        workflow_id: None,
    }
}

pub fn history_entry(id: &str, status: ApprovalStatus, completed_at: DateTime<Utc>) -> ChangeHistoryEntry {
    ChangeHistoryEntry {
        id: id.to_string(),
        request_id: format!("req-{}", id),
        title: format!("Change {}", id),
        status,
        priority: Priority::Medium,
        file_paths: vec!["src/a.ts".to_string()],
        change_count: 1,
        created_at: completed_at - ChronoDuration::minutes(5),
        completed_at: Some(completed_at),
        decided_by: None,
        reason: None,
    }
}

pub fn page<T: serde::Serialize>(items: &[T], page: u32, has_more: bool) -> Value {
    json!({
        "items": items,
        "total": items.len(),
        "page": page,
        "limit": 50,
        "hasMore": has_more,
    })
}
