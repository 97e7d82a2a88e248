use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use parking_lot::{Mutex, RwLock};
use serde_json::json;
use crate::config::constants::{
    CMD_APPROVE, CMD_OPEN_SETTINGS, CMD_RECONNECT, CMD_REJECT, CMD_VIEW_REQUEST, TIMER_NOTIFICATION_DRAIN,
};
use crate::enums::approval_status::ApprovalStatus;
use crate::enums::connection_status::ConnectionStatus;
use crate::enums::notification_type::NotificationType;
use crate::enums::priority::Priority;
use crate::errors::ClientError;
use crate::helpers::in_flight::InFlightGuard;
use crate::services::scheduler::Scheduler;
use crate::structs::approval_request::ApprovalRequest;
use crate::structs::config::notification_config::NotificationConfig;
use crate::structs::notification_action::NotificationAction;
use crate::structs::notification_record::{
    NotificationRecord, PRIORITY_CRITICAL, PRIORITY_HIGH, PRIORITY_LOW, PRIORITY_NORMAL,
};
use crate::traits::command_executor::CommandExecutor;
use crate::traits::user_prompt::UserPrompt;

/// Priority queue of user-facing alerts, presented one at a time.
///
/// Records are keyed by id: enqueueing an id that is still waiting replaces
/// the waiting record. Presented records land in a bounded history.
pub struct NotificationCoordinator {
    me: Weak<NotificationCoordinator>,
    config: RwLock<NotificationConfig>,
    approval_notifications: AtomicBool,
    prompt: Arc<dyn UserPrompt>,
    executor: RwLock<Option<Weak<dyn CommandExecutor>>>,
    queue: Mutex<Vec<NotificationRecord>>,
    history: Mutex<VecDeque<NotificationRecord>>,
    presenting: AtomicBool,
}

impl NotificationCoordinator {
    pub fn new(config: NotificationConfig, approval_notifications: bool, prompt: Arc<dyn UserPrompt>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            config: RwLock::new(config),
            approval_notifications: AtomicBool::new(approval_notifications),
            prompt,
            executor: RwLock::new(None),
            queue: Mutex::new(Vec::new()),
            history: Mutex::new(VecDeque::new()),
            presenting: AtomicBool::new(false),
        })
    }

    /// Commands behind notification actions. Held weakly; the executor owns us.
    pub fn set_executor(&self, executor: Weak<dyn CommandExecutor>) {
        *self.executor.write() = Some(executor);
    }

    pub fn update_config(&self, config: NotificationConfig, approval_notifications: bool) {
        let capacity = config.history_capacity;
        *self.config.write() = config;
        self.approval_notifications.store(approval_notifications, Ordering::SeqCst);
        let mut history = self.history.lock();
        while history.len() > capacity {
            history.pop_front();
        }
    }

    /// Queues `record`; returns false when it was suppressed by configuration.
    pub fn enqueue(&self, mut record: NotificationRecord) -> bool {
        if record.notification_type == NotificationType::ApprovalRequest
            && !self.approval_notifications.load(Ordering::SeqCst)
        {
            log::debug!("🔕 Approval notification {} suppressed", record.id);
            return false;
        }

        {
            let config = self.config.read();
            if !config.auto_hide {
                record.auto_hide = false;
            }
            record.auto_hide_delay_ms = config.auto_hide_delay_ms;
        }
        // Waits for an explicit decision regardless of auto-hide settings.
        if record.notification_type == NotificationType::ApprovalRequest {
            record.auto_hide = false;
        }

        let mut queue = self.queue.lock();
        match queue.iter_mut().find(|queued| queued.id == record.id) {
            Some(queued) => *queued = record,
            None => queue.push(record),
        }
        queue.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.created_at.cmp(&b.created_at)));
        true
    }

    /// Removes a waiting record before it is shown.
    pub fn dismiss(&self, id: &str) -> bool {
        let mut queue = self.queue.lock();
        let before = queue.len();
        queue.retain(|record| record.id != id);
        queue.len() != before
    }

    pub fn queued(&self) -> Vec<NotificationRecord> {
        self.queue.lock().clone()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Presented records, oldest first.
    pub fn history(&self) -> Vec<NotificationRecord> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    /// Presents the most urgent record, if any. Nothing happens while a
    /// previous record is still on screen.
    pub async fn drain_once(&self) -> Option<NotificationRecord> {
        let _guard = InFlightGuard::try_acquire(&self.presenting)?;

        let record = {
            let mut queue = self.queue.lock();
            if queue.is_empty() {
                return None;
            }
            queue.remove(0)
        };
        self.remember(record.clone());

        let selection = self.prompt.present(&record).await;
        if let Some(title) = selection {
            self.dispatch(&record, &title).await;
        }
        Some(record)
    }

    /// Runs the command bound to the selected action. Unknown titles do nothing.
    pub async fn dispatch(&self, record: &NotificationRecord, selection: &str) -> bool {
        let Some(action) = record.find_action(selection) else {
            log::debug!("🤷 No action '{}' on notification {}", selection, record.id);
            return false;
        };
        let executor = self.executor.read().as_ref().and_then(Weak::upgrade);
        let Some(executor) = executor else {
            log::warn!("⚠️ No command executor for action '{}'", action.title);
            return false;
        };
        match executor.execute(&action.command, &action.args).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("⚠️ Command {} failed: {}", action.command, e);
                false
            }
        }
    }

    /// Registers the drain ticker on `scheduler`.
    pub fn start(&self, scheduler: &Scheduler, period: Duration) {
        let me = self.me.clone();
        scheduler.schedule_interval(TIMER_NOTIFICATION_DRAIN, period, move || {
            let me = me.clone();
            async move {
                if let Some(coordinator) = me.upgrade() {
                    coordinator.drain_once().await;
                }
            }
        });
    }

    fn remember(&self, record: NotificationRecord) {
        let capacity = self.config.read().history_capacity;
        let mut history = self.history.lock();
        history.push_back(record);
        while history.len() > capacity {
            history.pop_front();
        }
    }
}

/// New request waiting on the user. Shares its id with the resolution notice
/// so a quick decision replaces the stale prompt.
pub fn approval_request_notice(request: &ApprovalRequest) -> NotificationRecord {
    let priority = match request.priority {
        Priority::High => PRIORITY_HIGH,
        Priority::Medium | Priority::Low => PRIORITY_NORMAL,
    };
    let files = request.file_paths().join(", ");
    let message = if files.is_empty() {
        request.description.clone()
    } else {
        format!("{} ({})", request.title, files)
    };
    let id = json!(request.id);
    NotificationRecord::new(
        &approval_notice_id(&request.id),
        priority,
        NotificationType::ApprovalRequest,
        &format!("{} Approval needed: {}", request.priority.emoji(), request.title),
        &message,
    )
    .with_request(&request.id)
    .with_action(NotificationAction::new("Approve", CMD_APPROVE, vec![id.clone()]))
    .with_action(NotificationAction::new("Reject", CMD_REJECT, vec![id.clone()]))
    .with_action(NotificationAction::new("View", CMD_VIEW_REQUEST, vec![id]))
}

/// Outcome of a request. Expiry reads as a warning, not as a rejection.
pub fn approval_resolved_notice(request_id: &str, title: &str, status: ApprovalStatus) -> NotificationRecord {
    let (notification_type, priority, headline) = match status {
        ApprovalStatus::Approved => (NotificationType::ApprovalResolved, PRIORITY_NORMAL, "Approved"),
        ApprovalStatus::Rejected => (NotificationType::ApprovalResolved, PRIORITY_HIGH, "Rejected"),
        ApprovalStatus::Expired => (NotificationType::Warning, PRIORITY_HIGH, "Expired without a decision"),
        ApprovalStatus::Cancelled => (NotificationType::Info, PRIORITY_LOW, "Cancelled"),
        ApprovalStatus::Pending => (NotificationType::Info, PRIORITY_LOW, "Pending"),
    };
    NotificationRecord::new(
        &approval_notice_id(request_id),
        priority,
        notification_type,
        &format!("{} {}", status.emoji(), headline),
        title,
    )
    .with_request(request_id)
}

/// Failure of a user-initiated action, with retry and settings affordances.
pub fn error_notice(id: &str, context: &str, error: &ClientError, retry_command: Option<&str>) -> NotificationRecord {
    let mut record = NotificationRecord::new(
        id,
        PRIORITY_CRITICAL,
        NotificationType::Error,
        &format!("❌ {}", context),
        &error.user_message(),
    );
    if let Some(command) = retry_command {
        record = record.with_action(NotificationAction::new("Retry", command, Vec::new()));
    }
    if error.is_connection() || matches!(error, ClientError::Configuration { .. }) {
        record = record.with_action(NotificationAction::new("Open Settings", CMD_OPEN_SETTINGS, Vec::new()));
    }
    record
}

/// One slot for connection state; newer states replace older ones.
pub fn connection_notice(status: ConnectionStatus, engine_url: &str) -> NotificationRecord {
    let (priority, notification_type, title) = match status {
        ConnectionStatus::Connected => (PRIORITY_LOW, NotificationType::ConnectionStatus, "🔌 Connected to the Engine"),
        ConnectionStatus::Connecting => (PRIORITY_LOW, NotificationType::ConnectionStatus, "⏳ Connecting to the Engine"),
        ConnectionStatus::Disconnected => (PRIORITY_HIGH, NotificationType::ConnectionStatus, "🔌 Disconnected from the Engine"),
    };
    let mut record = NotificationRecord::new("connection-status", priority, notification_type, title, engine_url);
    if status == ConnectionStatus::Disconnected {
        record = record.with_action(NotificationAction::new("Reconnect", CMD_RECONNECT, Vec::new()));
    }
    record
}

fn approval_notice_id(request_id: &str) -> String {
    format!("approval-{}", request_id)
}
