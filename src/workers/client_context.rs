use std::sync::{Arc, Weak};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use crate::config::config_manager::ConfigManager;
use crate::config::constants::{
    CMD_APPROVE, CMD_OPEN_SETTINGS, CMD_RECONNECT, CMD_REFRESH_QUEUE, CMD_REJECT, CMD_REQUEST_APPROVAL,
    CMD_VIEW_REQUEST, TASK_CONNECTION_ROUTER, TASK_PUSH_ROUTER, TASK_WORKFLOW_ROUTER, TIMER_QUEUE_REFRESH,
    TIMER_WORKFLOW_POLL,
};
use crate::enums::approval_status::ApprovalStatus;
use crate::enums::connection_event::ConnectionEvent;
use crate::enums::connection_status::ConnectionStatus;
use crate::enums::notification_type::NotificationType;
use crate::enums::push_message_type::PushMessageType;
use crate::enums::save_outcome::SaveOutcome;
use crate::enums::workflow_event::WorkflowEvent;
use crate::errors::{ClientError, ClientResult};
use crate::services::approval_policy::ApprovalPolicy;
use crate::services::approval_queue::ApprovalQueue;
use crate::services::change_history::ChangeHistory;
use crate::services::connection_manager::ConnectionManager;
use crate::services::decoration_projector::DecorationProjector;
use crate::services::engine_client::EngineClient;
use crate::services::notification_coordinator::{
    approval_request_notice, approval_resolved_notice, connection_notice, error_notice, NotificationCoordinator,
};
use crate::services::push_channel::WebSocketConnector;
use crate::services::scheduler::Scheduler;
use crate::services::tree_snapshot::{history_tree, queue_tree};
use crate::services::workflow_manager::WorkflowManager;
use crate::structs::approval_request::ApprovalRequest;
use crate::structs::config::config::Config;
use crate::structs::content_change::ContentChange;
use crate::structs::notification_action::NotificationAction;
use crate::structs::notification_record::{NotificationRecord, PRIORITY_LOW};
use crate::structs::push_message::PushMessage;
use crate::structs::tree_node::TreeNode;
use crate::structs::validation_report::ValidationReport;
use crate::traits::command_executor::CommandExecutor;
use crate::traits::editor_surface::EditorSurface;
use crate::traits::engine_api::EngineApi;
use crate::traits::push_connector::PushConnector;
use crate::traits::user_prompt::UserPrompt;

/// Composition root: builds every component with explicit references and
/// routes events between them. All timers and routing tasks live on one
/// scheduler, torn down by [`ClientContext::dispose`].
pub struct ClientContext {
    me: Weak<ClientContext>,
    config: parking_lot::RwLock<Config>,
    scheduler: Arc<Scheduler>,
    surface: Arc<dyn EditorSurface>,
    pub transport: Arc<ConnectionManager>,
    pub workflow: Arc<WorkflowManager>,
    pub queue: Arc<ApprovalQueue>,
    pub history: Arc<ChangeHistory>,
    pub notifications: Arc<NotificationCoordinator>,
    pub decorations: Arc<DecorationProjector>,
}

impl ClientContext {
    /// Production wiring: HTTP engine client plus WebSocket push channel.
    pub fn from_config(
        config: Config,
        surface: Arc<dyn EditorSurface>,
        prompt: Arc<dyn UserPrompt>,
    ) -> ClientResult<Arc<Self>> {
        let api = Arc::new(EngineClient::new(&config.engine_url, &config.api_key)?);
        Self::new(config, api, Arc::new(WebSocketConnector), surface, prompt)
    }

    pub fn new(
        config: Config,
        api: Arc<dyn EngineApi>,
        connector: Arc<dyn PushConnector>,
        surface: Arc<dyn EditorSurface>,
        prompt: Arc<dyn UserPrompt>,
    ) -> ClientResult<Arc<Self>> {
        let policy = ApprovalPolicy::new(config.policy.clone())?;
        let scheduler = Arc::new(Scheduler::new());
        let transport = ConnectionManager::new(config.clone(), api, connector, Arc::clone(&scheduler));
        let workflow = Arc::new(WorkflowManager::new(Arc::clone(&transport), policy, config.approval_timeout));
        let queue = Arc::new(ApprovalQueue::new(Arc::clone(&transport), Arc::clone(&prompt)));
        let history = Arc::new(ChangeHistory::new(Arc::clone(&transport), Arc::clone(&prompt)));
        let notifications = NotificationCoordinator::new(
            config.notifications.clone(),
            config.approval_notifications,
            prompt,
        );
        let decorations = Arc::new(DecorationProjector::new(Arc::clone(&surface), config.show_inline_decorations));

        let context = Arc::new_cyclic(|me| Self {
            me: me.clone(),
            config: parking_lot::RwLock::new(config),
            scheduler,
            surface,
            transport,
            workflow,
            queue,
            history,
            notifications,
            decorations,
        });

        let executor: Weak<dyn CommandExecutor> = context.me.clone();
        context.notifications.set_executor(executor);
        Ok(context)
    }

    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    /// Tree view of the visible queue, one group per priority.
    pub fn queue_tree(&self) -> Vec<TreeNode> {
        queue_tree(&self.queue.group_by_priority())
    }

    pub fn history_tree(&self) -> Vec<TreeNode> {
        history_tree(&self.history.groups())
    }

    /// Wires the event routes, registers the periodic timers and, when
    /// configured, connects.
    pub async fn start(&self) {
        self.spawn_routers();

        let timers = self.config.read().timers.clone();

        let me = self.me.clone();
        self.scheduler.schedule_interval(TIMER_QUEUE_REFRESH, timers.queue_refresh_interval(), move || {
            let me = me.clone();
            async move {
                let Some(context) = me.upgrade() else { return };
                if context.transport.is_connected() {
                    if let Err(e) = context.queue.refresh().await {
                        log::warn!("⚠️ Background queue refresh failed: {}", e);
                    }
                }
            }
        });

        let me = self.me.clone();
        self.scheduler.schedule_interval(TIMER_WORKFLOW_POLL, timers.workflow_poll_interval(), move || {
            let me = me.clone();
            async move {
                let Some(context) = me.upgrade() else { return };
                if context.transport.is_connected() {
                    context.workflow.poll_status().await;
                }
            }
        });

        self.notifications.start(&self.scheduler, timers.notification_drain_interval());

        if self.config.read().auto_connect {
            // Failures are already on screen as a notification.
            let _ = self.connect().await;
        }
    }

    /// Cancels every timer and routing task, then drops the push channel.
    pub fn dispose(&self) {
        self.scheduler.cancel_all();
        self.transport.disconnect();
        log::info!("👋 Client disposed");
    }

    /// User-initiated connect; failures become an error notification.
    pub async fn connect(&self) -> ClientResult<()> {
        match self.transport.connect().await {
            Ok(()) => {
                self.load_views().await;
                Ok(())
            }
            Err(e) => {
                self.notifications
                    .enqueue(error_notice("connect-failed", "Could not connect to the Engine", &e, Some(CMD_RECONNECT)));
                Err(e)
            }
        }
    }

    pub fn disconnect(&self) {
        self.transport.disconnect();
    }

    pub async fn reconnect(&self) -> ClientResult<()> {
        self.transport.disconnect();
        self.connect().await
    }

    /// Starts tracking `file_path`, or the editor's active file.
    pub async fn start_workflow(&self, file_path: Option<&str>) -> ClientResult<String> {
        let resolved = file_path.map(ToString::to_string).or_else(|| self.surface.active_file());
        let result = self.workflow.start_workflow(resolved.as_deref()).await;
        if let Err(e) = &result {
            self.notifications
                .enqueue(error_notice("workflow-start-failed", "Could not start the workflow", e, None));
        }
        result
    }

    pub fn on_content_changed(&self, file_path: &str, changes: &[ContentChange]) -> usize {
        self.workflow.on_content_changed(file_path, changes)
    }

    /// Save hook. Submission failures are surfaced with a retry action.
    pub async fn on_save(&self, file_path: &str) -> ClientResult<SaveOutcome> {
        self.workflow.on_save(file_path).await
    }

    pub async fn on_file_deleted(&self, file_path: &str) {
        if self.workflow.on_file_deleted(file_path).await {
            self.decorations.clear(file_path);
        }
    }

    pub fn on_visible(&self, file_path: &str) {
        self.decorations.on_visible(file_path);
    }

    /// Applies a reloaded configuration to the live components.
    pub fn on_config_changed(&self, config: Config) -> ClientResult<()> {
        self.workflow.update_policy(config.policy.clone())?;
        self.notifications
            .update_config(config.notifications.clone(), config.approval_notifications);
        self.decorations.on_config_changed(config.show_inline_decorations);
        *self.config.write() = config;
        Ok(())
    }

    pub async fn validate_file(&self, file_path: &str, content: Option<&str>) -> ClientResult<ValidationReport> {
        let mut report = self.transport.validate(file_path, content).await?;
        if report.file_path.is_empty() {
            report.file_path = file_path.to_string();
        }
        self.decorations.apply_validation(&report);
        log::info!(
            "🔎 {}: {} error(s), {} warning(s)",
            file_path,
            report.error_count(),
            report.warning_count()
        );
        Ok(report)
    }

    /// Validates each file; one failure does not stop the rest.
    pub async fn validate_workspace(&self, files: &[String]) -> Vec<(String, ClientResult<ValidationReport>)> {
        let mut reports = Vec::with_capacity(files.len());
        for file in files {
            reports.push((file.clone(), self.validate_file(file, None).await));
        }
        reports
    }

    async fn load_views(&self) {
        if let Err(e) = self.queue.refresh().await {
            log::warn!("⚠️ Initial queue load failed: {}", e);
        }
        if let Err(e) = self.history.refresh().await {
            log::warn!("⚠️ Initial history load failed: {}", e);
        }
    }

    fn spawn_routers(&self) {
        let me = self.me.clone();
        let push = self.transport.subscribe_push();
        self.scheduler.spawn(TASK_PUSH_ROUTER, route(push, me, |context, message: PushMessage| async move {
            context.handle_push(message).await;
        }));

        let me = self.me.clone();
        let workflow = self.workflow.subscribe();
        self.scheduler.spawn(TASK_WORKFLOW_ROUTER, route(workflow, me, |context, event: WorkflowEvent| async move {
            context.handle_workflow_event(event).await;
        }));

        let me = self.me.clone();
        let connection = self.transport.subscribe_status();
        self.scheduler.spawn(TASK_CONNECTION_ROUTER, route(connection, me, |context, event: ConnectionEvent| async move {
            context.handle_connection_event(&event);
        }));
    }

    pub async fn handle_push(&self, message: PushMessage) {
        match message.message_type {
            PushMessageType::ApprovalRequest | PushMessageType::ApprovalUpdate => {
                let Some(request) = parse_request(&message.payload) else {
                    log::debug!("📭 Unreadable {:?} payload", message.message_type);
                    return;
                };
                if request.status.is_terminal() {
                    self.apply_resolution(&request.id, &request.title, request.status).await;
                } else {
                    let is_new = self.queue.get(&request.id).is_none();
                    self.queue.upsert(request.clone());
                    if is_new && self.queue.get(&request.id).is_some() {
                        self.notifications.enqueue(approval_request_notice(&request));
                    }
                }
            }
            PushMessageType::ApprovalCompleted => {
                let Some((request_id, status)) = parse_completion(&message.payload) else {
                    log::debug!("📭 Unreadable approval_completed payload");
                    return;
                };
                let title = self.queue.get(&request_id).map(|r| r.title).unwrap_or_else(|| request_id.clone());
                self.apply_resolution(&request_id, &title, status).await;
            }
            PushMessageType::ChangeHistoryUpdate => self.refresh_history().await,
            PushMessageType::WorkflowUpdate => {
                self.workflow.poll_status().await;
            }
            PushMessageType::EngineStatus => {
                log::info!("🩺 Engine status: {}", message.payload);
            }
            PushMessageType::Heartbeat | PushMessageType::Unknown => {
                log::debug!("📭 Ignoring push message {:?}", message.message_type);
            }
        }
    }

    async fn apply_resolution(&self, request_id: &str, title: &str, status: ApprovalStatus) {
        self.queue.mark_resolved(request_id, status);
        // Resolutions of our own sessions are reported through the workflow route.
        if self.workflow.resolve(request_id, status) {
            return;
        }
        self.notifications
            .enqueue(approval_resolved_notice(request_id, title, status));
        self.refresh_history().await;
    }

    pub async fn handle_workflow_event(&self, event: WorkflowEvent) {
        self.decorations.on_workflow_event(&event);

        match &event {
            WorkflowEvent::ApprovalRequested { request, .. } => {
                self.queue.upsert(request.clone());
                self.notifications.enqueue(approval_request_notice(request));
            }
            WorkflowEvent::ApprovalGranted { request_id, file_path, .. } => {
                self.finish_request(request_id, file_path, ApprovalStatus::Approved).await;
            }
            WorkflowEvent::ApprovalRejected { request_id, file_path, .. } => {
                self.finish_request(request_id, file_path, ApprovalStatus::Rejected).await;
            }
            WorkflowEvent::ApprovalExpired { request_id, file_path, .. } => {
                self.finish_request(request_id, file_path, ApprovalStatus::Expired).await;
            }
            WorkflowEvent::ApprovalCancelled { request_id, file_path, .. } => {
                self.finish_request(request_id, file_path, ApprovalStatus::Cancelled).await;
            }
            WorkflowEvent::AutoApproved { file_path, changes, .. } => {
                let record = NotificationRecord::new(
                    &format!("auto-approved-{}", file_path),
                    PRIORITY_LOW,
                    NotificationType::Info,
                    "✔️ Auto-approved",
                    &format!("{} low-risk change(s) in {}", changes.len(), file_path),
                );
                self.notifications.enqueue(record);
            }
            WorkflowEvent::SubmissionFailed { file_path, message, .. } => {
                let error = ClientError::approval("", "submit", message);
                let record = error_notice(
                    &format!("submit-failed-{}", file_path),
                    &format!("Could not submit changes in {}", file_path),
                    &error,
                    None,
                )
                .with_action(NotificationAction::new(
                    "Retry",
                    CMD_REQUEST_APPROVAL,
                    vec![Value::String(file_path.clone())],
                ));
                self.notifications.enqueue(record);
            }
            WorkflowEvent::SessionStarted { .. }
            | WorkflowEvent::SessionPaused { .. }
            | WorkflowEvent::SessionResumed { .. }
            | WorkflowEvent::SessionStopped { .. }
            | WorkflowEvent::SessionCompleted { .. } => {}
        }
    }

    async fn finish_request(&self, request_id: &str, file_path: &str, status: ApprovalStatus) {
        self.queue.mark_resolved(request_id, status);
        self.notifications
            .enqueue(approval_resolved_notice(request_id, file_path, status));
        self.refresh_history().await;
    }

    /// Only a real connected-to-disconnected drop is announced.
    pub fn handle_connection_event(&self, event: &ConnectionEvent) {
        match event {
            ConnectionEvent::StatusChanged { previous, current } => match (previous, current) {
                (ConnectionStatus::Connected, ConnectionStatus::Disconnected) => {
                    self.notifications
                        .enqueue(connection_notice(ConnectionStatus::Disconnected, self.transport.engine_url()));
                }
                (_, ConnectionStatus::Connected) => {
                    self.notifications.dismiss("connection-status");
                }
                _ => {}
            },
            ConnectionEvent::ReconnectScheduled { attempt, delay } => {
                log::info!("🔄 Reconnect attempt {} in {:?}", attempt, delay);
            }
            ConnectionEvent::ReconnectExhausted { attempts } => {
                let error = ClientError::connection(
                    self.transport.engine_url(),
                    &format!("gave up after {} reconnect attempts", attempts),
                );
                self.notifications
                    .enqueue(error_notice("reconnect-exhausted", "Connection lost", &error, Some(CMD_RECONNECT)));
            }
        }
    }

    async fn refresh_history(&self) {
        if let Err(e) = self.history.refresh().await {
            log::warn!("⚠️ History refresh failed: {}", e);
        }
    }

    async fn show_request(&self, request_id: &str) -> ClientResult<()> {
        let request = match self.queue.get(request_id) {
            Some(request) => request,
            None => self.transport.approval_status(request_id).await?,
        };
        let notice = NotificationRecord::new(
            &format!("view-{}", request.id),
            PRIORITY_LOW,
            NotificationType::Info,
            &format!("{} {}", request.priority.emoji(), request.title),
            &format!(
                "{} · {} line change(s) · created {}",
                request.status,
                request.line_change_count(),
                request.created_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
            ),
        );
        self.notifications.enqueue(notice);
        Ok(())
    }

    async fn run_command(&self, command: &str, args: &[Value]) -> ClientResult<()> {
        let first = || {
            args.first()
                .and_then(Value::as_str)
                .map(ToString::to_string)
                .ok_or_else(|| ClientError::validation(command, "missing string argument"))
        };
        match command {
            CMD_APPROVE => self.queue.approve(&first()?).await.map(|_| ()),
            CMD_REJECT => {
                let reason = args.get(1).and_then(Value::as_str);
                self.queue.reject(&first()?, reason).await.map(|_| ())
            }
            CMD_VIEW_REQUEST => self.show_request(&first()?).await,
            CMD_RECONNECT => self.reconnect().await,
            CMD_REFRESH_QUEUE => self.queue.refresh().await.map(|_| ()),
            CMD_REQUEST_APPROVAL => self.workflow.request_approval(&first()?).await.map(|_| ()),
            CMD_OPEN_SETTINGS => {
                log::info!("⚙️ Settings live in {}", ConfigManager::config_path().display());
                Ok(())
            }
            other => Err(ClientError::not_found("command", other)),
        }
    }
}

#[async_trait]
impl CommandExecutor for ClientContext {
    /// Failures of user-chosen actions are surfaced; reconnect failures are
    /// already reported by `connect`.
    async fn execute(&self, command: &str, args: &[Value]) -> ClientResult<()> {
        let result = self.run_command(command, args).await;
        if let Err(e) = &result {
            if command != CMD_RECONNECT {
                self.notifications.enqueue(error_notice(
                    &format!("command-failed-{}", command),
                    &format!("{} failed", command),
                    e,
                    None,
                ));
            }
        }
        result
    }
}

/// Forwards every message on `rx` to `handler` for as long as the context
/// lives. Lagged receivers skip ahead instead of stopping.
async fn route<T, F, Fut>(mut rx: Receiver<T>, me: Weak<ClientContext>, handler: F)
where
    T: Clone + Send + 'static,
    F: Fn(Arc<ClientContext>, T) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    loop {
        match rx.recv().await {
            Ok(message) => {
                let Some(context) = me.upgrade() else { return };
                handler(context, message).await;
            }
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("⚠️ Event router lagged; {} event(s) skipped", skipped);
            }
            Err(RecvError::Closed) => return,
        }
    }
}

/// Accepts either the bare request or `{ "request": { ... } }`.
fn parse_request(payload: &Value) -> Option<ApprovalRequest> {
    serde_json::from_value(payload.clone())
        .ok()
        .or_else(|| payload.get("request").and_then(|inner| serde_json::from_value(inner.clone()).ok()))
}

/// `{ "requestId" | "id", "status" }`, or a full request.
fn parse_completion(payload: &Value) -> Option<(String, ApprovalStatus)> {
    if let Some(request) = parse_request(payload) {
        return Some((request.id, request.status));
    }
    let id = payload
        .get("requestId")
        .or_else(|| payload.get("id"))
        .and_then(Value::as_str)?;
    let status = payload.get("status").and_then(Value::as_str).and_then(ApprovalStatus::parse)?;
    Some((id.to_string(), status))
}
