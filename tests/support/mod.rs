//! Scripted Engine, push channel and prompt shared by the integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use approval_client::enums::http_method::HttpMethod;
use approval_client::errors::{ClientError, ClientResult};
use approval_client::structs::api_response::ApiResponse;
use approval_client::structs::config::config::Config;
use approval_client::structs::notification_record::NotificationRecord;
use approval_client::structs::push_connection::PushConnection;
use approval_client::structs::push_message::PushMessage;
use approval_client::traits::engine_api::EngineApi;
use approval_client::traits::push_connector::PushConnector;
use approval_client::traits::user_prompt::UserPrompt;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::mpsc;

/// Answers by (method, path without query). Health and the two list
/// endpoints answer with an empty result unless scripted otherwise.
pub struct ScriptedEngine {
    routes: Mutex<HashMap<(HttpMethod, String), Value>>,
    log: Mutex<Vec<(HttpMethod, String, Option<Value>)>>,
    delays: Mutex<HashMap<(HttpMethod, String), Duration>>,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        let engine = Arc::new(Self {
            routes: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
            delays: Mutex::new(HashMap::new()),
        });
        engine.respond(HttpMethod::Get, "/health", json!({ "version": "2.1.0", "status": "healthy" }));
        engine.respond(HttpMethod::Get, "/approvals/pending", empty_page());
        engine.respond(HttpMethod::Get, "/approvals/history", empty_page());
        engine
    }

    pub fn respond(&self, method: HttpMethod, path: &str, data: Value) {
        self.routes.lock().insert((method, path.to_string()), data);
    }

    pub fn delay(&self, method: HttpMethod, path: &str, delay: Duration) {
        self.delays.lock().insert((method, path.to_string()), delay);
    }

    pub fn calls(&self, method: HttpMethod, path: &str) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|(m, p, _)| *m == method && strip_query(p) == path)
            .count()
    }

    pub fn last_body(&self, method: HttpMethod, path: &str) -> Option<Value> {
        self.log
            .lock()
            .iter()
            .rev()
            .find(|(m, p, _)| *m == method && strip_query(p) == path)
            .and_then(|(_, _, body)| body.clone())
    }
}

#[async_trait]
impl EngineApi for ScriptedEngine {
    async fn send(&self, method: HttpMethod, path: &str, body: Option<Value>) -> ClientResult<ApiResponse<Value>> {
        self.log.lock().push((method, path.to_string(), body));
        let delay = self.delays.lock().get(&(method, strip_query(path).to_string())).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let answer = self.routes.lock().get(&(method, strip_query(path).to_string())).cloned();
        match answer {
            Some(data) => Ok(ApiResponse::ok(data)),
            None => Err(ClientError::not_found("route", path)),
        }
    }
}

/// Engine side of a push channel handed out by [`PushServer`].
pub struct ServerEnd {
    pub to_client: mpsc::UnboundedSender<PushMessage>,
    pub from_client: mpsc::UnboundedReceiver<PushMessage>,
}

/// Accepts the first `accepted` connects; every later one is refused.
pub struct PushServer {
    accepted: u32,
    attempts: AtomicU32,
    ends: Mutex<Vec<ServerEnd>>,
}

impl PushServer {
    pub fn new(accepted: u32) -> Arc<Self> {
        Arc::new(Self {
            accepted,
            attempts: AtomicU32::new(0),
            ends: Mutex::new(Vec::new()),
        })
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn take_end(&self) -> ServerEnd {
        self.ends.lock().remove(0)
    }
}

#[async_trait]
impl PushConnector for PushServer {
    async fn connect(&self, _engine_url: &str, _api_key: &str) -> ClientResult<PushConnection> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt > self.accepted {
            return Err(ClientError::connection("/ws", "connection refused"));
        }
        let (outbound, from_client) = mpsc::unbounded_channel();
        let (to_client, inbound) = mpsc::unbounded_channel();
        self.ends.lock().push(ServerEnd { to_client, from_client });
        Ok(PushConnection { outbound, inbound })
    }
}

/// Confirms everything and picks the same action title on every notification.
pub struct ScriptedPrompt {
    selection: Option<String>,
    presented: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(selection: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            selection: selection.map(ToString::to_string),
            presented: Mutex::new(Vec::new()),
        })
    }

    pub fn presented(&self) -> Vec<String> {
        self.presented.lock().clone()
    }
}

#[async_trait]
impl UserPrompt for ScriptedPrompt {
    async fn confirm(&self, _message: &str) -> bool {
        true
    }

    async fn present(&self, notification: &NotificationRecord) -> Option<String> {
        self.presented.lock().push(notification.id.clone());
        self.selection.clone()
    }
}

pub fn offline_config() -> Config {
    Config {
        auto_connect: false,
        real_time_updates: false,
        ..Config::default()
    }
}

pub fn empty_page() -> Value {
    json!({ "items": [], "total": 0, "page": 1, "limit": 50, "hasMore": false })
}

pub fn page_of(items: Value) -> Value {
    let total = items.as_array().map_or(0, Vec::len);
    json!({ "items": items, "total": total, "page": 1, "limit": 50, "hasMore": false })
}

pub fn pending_request(id: &str, title: &str, priority: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "priority": priority,
        "status": "pending",
        "createdAt": "2024-05-01T09:00:00Z",
    })
}

/// Lets the routing tasks catch up with what the test just did.
pub async fn settle() {
    for _ in 0..5 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

fn strip_query(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}
