use std::sync::{Arc, Weak};
use std::time::Duration;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::{broadcast, mpsc};
use crate::config::constants::{
    EVENT_BUS_CAPACITY, HISTORY_PAGE_SIZE, PENDING_PAGE_SIZE, TIMER_HEARTBEAT, TIMER_PUSH_READER, TIMER_RECONNECT,
};
use crate::enums::approval_status::ApprovalStatus;
use crate::enums::connection_event::ConnectionEvent;
use crate::enums::connection_status::ConnectionStatus;
use crate::enums::http_method::HttpMethod;
use crate::enums::push_message_type::PushMessageType;
use crate::errors::{ClientError, ClientResult};
use crate::services::engine_client::with_query;
use crate::services::scheduler::Scheduler;
use crate::structs::approval_request::ApprovalRequest;
use crate::structs::approval_response::ApprovalResponse;
use crate::structs::change_history_entry::ChangeHistoryEntry;
use crate::structs::config::config::Config;
use crate::structs::engine_status::EngineStatus;
use crate::structs::line_history_entry::LineHistoryEntry;
use crate::structs::mutation_analysis::MutationAnalysis;
use crate::structs::new_approval_request::NewApprovalRequest;
use crate::structs::paginated::Paginated;
use crate::structs::push_connection::PushConnection;
use crate::structs::push_message::PushMessage;
use crate::structs::validation_report::ValidationReport;
use crate::traits::engine_api::EngineApi;
use crate::traits::push_connector::PushConnector;

struct TransportState {
    status: ConnectionStatus,
    reconnect_attempts: u32,
    outbound: Option<mpsc::UnboundedSender<PushMessage>>,
    manual_disconnect: bool,
    // Bumped by every connect and disconnect; an attempt from an older epoch never commits.
    epoch: u64,
}

/// Single point of contact with the Engine.
///
/// Owns the request channel (`EngineApi`), the push channel and the
/// reconnect/heartbeat timers. Status changes go out on
/// [`ConnectionManager::subscribe_status`], push messages other than
/// heartbeats on [`ConnectionManager::subscribe_push`].
pub struct ConnectionManager {
    me: Weak<ConnectionManager>,
    config: Config,
    api: Arc<dyn EngineApi>,
    connector: Arc<dyn PushConnector>,
    scheduler: Arc<Scheduler>,
    state: Mutex<TransportState>,
    status_tx: broadcast::Sender<ConnectionEvent>,
    push_tx: broadcast::Sender<PushMessage>,
}

impl ConnectionManager {
    pub fn new(
        config: Config,
        api: Arc<dyn EngineApi>,
        connector: Arc<dyn PushConnector>,
        scheduler: Arc<Scheduler>,
    ) -> Arc<Self> {
        let (status_tx, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        let (push_tx, _) = broadcast::channel(EVENT_BUS_CAPACITY);

        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            config,
            api,
            connector,
            scheduler,
            state: Mutex::new(TransportState {
                status: ConnectionStatus::Disconnected,
                reconnect_attempts: 0,
                outbound: None,
                manual_disconnect: false,
                epoch: 0,
            }),
            status_tx,
            push_tx,
        })
    }

    pub fn subscribe_status(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.status_tx.subscribe()
    }

    pub fn subscribe_push(&self) -> broadcast::Receiver<PushMessage> {
        self.push_tx.subscribe()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state.lock().status
    }

    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.state.lock().reconnect_attempts
    }

    pub fn engine_url(&self) -> &str {
        &self.config.engine_url
    }

    /// Explicit connect. A failure here is returned to the caller; only
    /// unexpected closures later on go through the reconnect policy.
    pub async fn connect(&self) -> ClientResult<()> {
        let epoch = {
            let mut state = self.state.lock();
            state.manual_disconnect = false;
            state.reconnect_attempts = 0;
            state.epoch += 1;
            state.epoch
        };
        self.scheduler.cancel(TIMER_RECONNECT);

        match self.establish(epoch).await {
            Ok(()) => {
                log::info!("✅ Connected to Engine at {}", self.config.engine_url);
                Ok(())
            }
            Err(e) => {
                self.set_status(ConnectionStatus::Disconnected);
                Err(e)
            }
        }
    }

    /// Idempotent: emits the `Disconnected` transition once.
    pub fn disconnect(&self) {
        let outbound = {
            let mut state = self.state.lock();
            state.manual_disconnect = true;
            state.reconnect_attempts = 0;
            state.epoch += 1;
            state.outbound.take()
        };
        drop(outbound);

        self.scheduler.cancel(TIMER_RECONNECT);
        self.scheduler.cancel(TIMER_HEARTBEAT);
        self.scheduler.cancel(TIMER_PUSH_READER);

        if self.set_status(ConnectionStatus::Disconnected) {
            log::info!("🔌 Disconnected from Engine");
        }
    }

    /// Runs one attempt. If a disconnect or a newer connect lands while it
    /// awaits, the attempt ends with `Cancelled` and leaves no trace.
    async fn establish(&self, epoch: u64) -> ClientResult<()> {
        self.set_status(ConnectionStatus::Connecting);

        let health = self.health().await?;
        log::debug!("💓 Engine {} reports '{}'", health.version, health.status);
        self.ensure_current(epoch)?;

        if !self.config.real_time_updates {
            return self.commit_connected(epoch, None);
        }

        let PushConnection { outbound, inbound } = self
            .connector
            .connect(&self.config.engine_url, &self.config.api_key)
            .await?;
        self.commit_connected(epoch, Some(outbound))?;
        self.attach(inbound);

        if let Err(e) = self.ensure_current(epoch) {
            // Disconnected between the commit and the timers being registered.
            self.scheduler.cancel(TIMER_PUSH_READER);
            self.scheduler.cancel(TIMER_HEARTBEAT);
            return Err(e);
        }
        Ok(())
    }

    fn ensure_current(&self, epoch: u64) -> ClientResult<()> {
        let state = self.state.lock();
        if state.manual_disconnect || state.epoch != epoch {
            return Err(ClientError::cancelled("Connecting to the Engine"));
        }
        Ok(())
    }

    /// Checks the epoch and flips to `Connected` under one lock.
    fn commit_connected(&self, epoch: u64, outbound: Option<mpsc::UnboundedSender<PushMessage>>) -> ClientResult<()> {
        let previous = {
            let mut state = self.state.lock();
            if state.manual_disconnect || state.epoch != epoch {
                return Err(ClientError::cancelled("Connecting to the Engine"));
            }
            state.reconnect_attempts = 0;
            state.outbound = outbound;
            std::mem::replace(&mut state.status, ConnectionStatus::Connected)
        };
        if previous != ConnectionStatus::Connected {
            self.announce_status(previous, ConnectionStatus::Connected);
        }
        Ok(())
    }

    fn attach(&self, mut inbound: mpsc::UnboundedReceiver<PushMessage>) {
        let me = self.me.clone();
        self.scheduler.spawn(TIMER_PUSH_READER, async move {
            while let Some(message) = inbound.recv().await {
                let Some(manager) = me.upgrade() else { return };
                manager.handle_push_message(message);
            }
            if let Some(manager) = me.upgrade() {
                manager.on_push_closed();
            }
        });

        let me = self.me.clone();
        self.scheduler.schedule_interval(TIMER_HEARTBEAT, self.config.timers.heartbeat_interval(), move || {
            let me = me.clone();
            async move {
                if let Some(manager) = me.upgrade() {
                    manager.send_push(PushMessage::heartbeat());
                }
            }
        });
    }

    /// Heartbeats are answered here and never forwarded.
    fn handle_push_message(&self, message: PushMessage) {
        if message.message_type == PushMessageType::Heartbeat {
            if message.payload.get("pong").is_none() {
                self.send_push(PushMessage::heartbeat_reply());
            }
            return;
        }
        log::debug!("📨 Push message {:?}", message.message_type);
        let _ = self.push_tx.send(message);
    }

    fn send_push(&self, message: PushMessage) {
        let outbound = self.state.lock().outbound.clone();
        match outbound {
            Some(sender) => {
                if sender.send(message).is_err() {
                    log::debug!("📭 Push channel already closed");
                }
            }
            None => log::debug!("📭 No push channel to write to"),
        }
    }

    fn on_push_closed(&self) {
        let unexpected = {
            let mut state = self.state.lock();
            state.outbound = None;
            !state.manual_disconnect && state.status == ConnectionStatus::Connected
        };
        if !unexpected {
            return;
        }

        log::warn!("⚠️ Push channel closed unexpectedly");
        self.scheduler.cancel(TIMER_HEARTBEAT);
        self.set_status(ConnectionStatus::Disconnected);
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&self) {
        let attempt = {
            let mut state = self.state.lock();
            if state.manual_disconnect {
                return;
            }
            state.reconnect_attempts += 1;
            state.reconnect_attempts
        };

        let max_attempts = self.config.timers.max_reconnect_attempts;
        if attempt > max_attempts {
            self.state.lock().reconnect_attempts = 0;
            log::error!("❌ Giving up on the Engine after {} reconnect attempts", max_attempts);
            let _ = self.status_tx.send(ConnectionEvent::ReconnectExhausted { attempts: max_attempts });
            return;
        }

        let delay = backoff_delay(self.config.timers.reconnect_base_delay(), attempt);
        log::info!("🔄 Reconnect attempt {}/{} in {:?}", attempt, max_attempts, delay);
        let _ = self.status_tx.send(ConnectionEvent::ReconnectScheduled { attempt, delay });

        let me = self.me.clone();
        self.scheduler.schedule_once(TIMER_RECONNECT, delay, move || async move {
            let Some(manager) = me.upgrade() else { return };
            let epoch = {
                let state = manager.state.lock();
                if state.manual_disconnect {
                    return;
                }
                state.epoch
            };
            match manager.establish(epoch).await {
                Ok(()) => log::info!("✅ Reconnected to Engine"),
                Err(_) if manager.ensure_current(epoch).is_err() => {
                    log::debug!("⏭️ Reconnect attempt {} superseded", attempt);
                }
                Err(e) => {
                    log::warn!("⚠️ Reconnect attempt {} failed: {}", attempt, e);
                    manager.set_status(ConnectionStatus::Disconnected);
                    manager.schedule_reconnect();
                }
            }
        });
    }

    /// Returns whether the status actually changed.
    fn set_status(&self, status: ConnectionStatus) -> bool {
        let previous = {
            let mut state = self.state.lock();
            if state.status == status {
                return false;
            }
            std::mem::replace(&mut state.status, status)
        };
        self.announce_status(previous, status);
        true
    }

    fn announce_status(&self, previous: ConnectionStatus, current: ConnectionStatus) {
        log::debug!("🔌 Connection {} -> {}", previous, current);
        let _ = self.status_tx.send(ConnectionEvent::StatusChanged { previous, current });
    }

    pub async fn request<T: DeserializeOwned>(&self, method: HttpMethod, path: &str, body: Option<Value>) -> ClientResult<T> {
        let response = self.api.send(method, path, body).await?;
        let data = response.into_data(path)?;
        serde_json::from_value(data)
            .map_err(|e| ClientError::parse("JSON", &format!("unexpected payload from {}: {}", path, e)))
    }

    /// For endpoints whose payload is irrelevant.
    pub async fn request_ack(&self, method: HttpMethod, path: &str, body: Option<Value>) -> ClientResult<()> {
        let response = self.api.send(method, path, body).await?;
        if response.success {
            Ok(())
        } else {
            let message = response.error.or(response.message).unwrap_or_else(|| "request failed".to_string());
            Err(ClientError::engine_refused(&message))
        }
    }

    pub async fn health(&self) -> ClientResult<EngineStatus> {
        self.request(HttpMethod::Get, "/health", None).await
    }

    pub async fn pending_approvals(&self, page: u32) -> ClientResult<Paginated<ApprovalRequest>> {
        let path = with_query(
            "/approvals/pending",
            &[("page", page.to_string()), ("limit", PENDING_PAGE_SIZE.to_string())],
        );
        self.request(HttpMethod::Get, &path, None).await
    }

    pub async fn create_approval(&self, request: &NewApprovalRequest) -> ClientResult<ApprovalRequest> {
        let body = serde_json::to_value(request)?;
        self.request(HttpMethod::Post, "/approvals", Some(body))
            .await
            .map_err(|e| as_approval_error(e, "", "submit"))
    }

    pub async fn approval_status(&self, request_id: &str) -> ClientResult<ApprovalRequest> {
        self.request(HttpMethod::Get, &format!("/approvals/{}", request_id), None).await
    }

    pub async fn approve(&self, request_id: &str) -> ClientResult<ApprovalResponse> {
        self.request(HttpMethod::Post, &format!("/approvals/{}/approve", request_id), Some(json!({})))
            .await
            .map_err(|e| as_approval_error(e, request_id, "approve"))
    }

    pub async fn reject(&self, request_id: &str, reason: Option<&str>) -> ClientResult<ApprovalResponse> {
        let body = match reason {
            Some(reason) => json!({ "reason": reason }),
            None => json!({}),
        };
        self.request(HttpMethod::Post, &format!("/approvals/{}/reject", request_id), Some(body))
            .await
            .map_err(|e| as_approval_error(e, request_id, "reject"))
    }

    pub async fn cancel_approval(&self, request_id: &str) -> ClientResult<()> {
        self.request_ack(HttpMethod::Delete, &format!("/approvals/{}", request_id), None)
            .await
            .map_err(|e| as_approval_error(e, request_id, "cancel"))
    }

    pub async fn history(&self, page: u32, status: Option<ApprovalStatus>) -> ClientResult<Paginated<ChangeHistoryEntry>> {
        let mut params = vec![("page", page.to_string()), ("limit", HISTORY_PAGE_SIZE.to_string())];
        if let Some(status) = status {
            params.push(("status", status.as_str().to_string()));
        }
        self.request(HttpMethod::Get, &with_query("/approvals/history", &params), None).await
    }

    pub async fn search_history(&self, query: &str, page: u32) -> ClientResult<Paginated<ChangeHistoryEntry>> {
        let path = with_query(
            "/approvals/history/search",
            &[("q", query.to_string()), ("page", page.to_string()), ("limit", HISTORY_PAGE_SIZE.to_string())],
        );
        self.request(HttpMethod::Get, &path, None).await
    }

    pub async fn analyze_mutations(&self, file_path: &str) -> ClientResult<MutationAnalysis> {
        self.request(HttpMethod::Post, "/analyze/mutations", Some(json!({ "filePath": file_path })))
            .await
    }

    pub async fn line_history(&self, file_path: &str, line: usize) -> ClientResult<Vec<LineHistoryEntry>> {
        let path = with_query("/line-history", &[("file", file_path.to_string()), ("line", line.to_string())]);
        self.request(HttpMethod::Get, &path, None).await
    }

    pub async fn validate(&self, file_path: &str, content: Option<&str>) -> ClientResult<ValidationReport> {
        let mut body = json!({ "filePath": file_path });
        if let Some(content) = content {
            body["content"] = Value::String(content.to_string());
        }
        self.request(HttpMethod::Post, "/validate", Some(body)).await
    }
}

/// Connection errors stay connection errors so callers can tell the two apart.
fn as_approval_error(error: ClientError, request_id: &str, operation: &str) -> ClientError {
    match error {
        ClientError::Connection { .. } | ClientError::Approval { .. } => error,
        other => ClientError::approval(request_id, operation, &other.to_string()),
    }
}

/// `base × 2^(attempt − 1)` for 1-based attempts.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    base.saturating_mul(1u32 << exponent)
}
