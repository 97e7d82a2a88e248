use std::path::Path;
use std::sync::Arc;
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use uuid::Uuid;
use crate::config::constants::EVENT_BUS_CAPACITY;
use crate::enums::approval_status::ApprovalStatus;
use crate::enums::change_type::ChangeType;
use crate::enums::priority::Priority;
use crate::enums::save_outcome::SaveOutcome;
use crate::enums::session_status::SessionStatus;
use crate::enums::workflow_event::WorkflowEvent;
use crate::errors::{ClientError, ClientResult};
use crate::services::approval_policy::ApprovalPolicy;
use crate::services::connection_manager::ConnectionManager;
use crate::services::edit_translator::EditTranslator;
use crate::structs::config::policy_config::PolicyConfig;
use crate::structs::content_change::ContentChange;
use crate::structs::file_change::FileChange;
use crate::structs::line_change::LineChange;
use crate::structs::new_approval_request::NewApprovalRequest;
use crate::structs::workflow_session::WorkflowSession;

/// Snapshot taken when a buffer is handed to the Engine.
struct Submission {
    workflow_id: String,
    changes: Vec<LineChange>,
    priority: Priority,
}

/// Per-file workflow sessions: buffers line edits, gates them through the
/// approval policy on save and follows the resulting request to a terminal
/// status.
///
/// The map is keyed by file path, so there is at most one session per file.
/// Every check-then-set on a session happens under its map entry lock; no
/// lock is held across an Engine call.
pub struct WorkflowManager {
    transport: Arc<ConnectionManager>,
    policy: RwLock<ApprovalPolicy>,
    approval_timeout_secs: u64,
    sessions: DashMap<String, WorkflowSession>,
    events: broadcast::Sender<WorkflowEvent>,
}

impl WorkflowManager {
    pub fn new(transport: Arc<ConnectionManager>, policy: ApprovalPolicy, approval_timeout_secs: u64) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self {
            transport,
            policy: RwLock::new(policy),
            approval_timeout_secs,
            sessions: DashMap::new(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    pub fn update_policy(&self, config: PolicyConfig) -> ClientResult<()> {
        let policy = ApprovalPolicy::new(config)?;
        *self.policy.write() = policy;
        Ok(())
    }

    pub fn session(&self, file_path: &str) -> Option<WorkflowSession> {
        self.sessions.get(file_path).map(|entry| entry.value().clone())
    }

    pub fn sessions(&self) -> Vec<WorkflowSession> {
        let mut sessions: Vec<WorkflowSession> = self.sessions.iter().map(|entry| entry.value().clone()).collect();
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        sessions
    }

    pub fn is_tracking(&self, file_path: &str) -> bool {
        self.sessions.contains_key(file_path)
    }

    /// Starts tracking `file_path`, or returns the id of the session that
    /// already tracks it.
    pub async fn start_workflow(&self, file_path: Option<&str>) -> ClientResult<String> {
        let file_path = file_path
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ClientError::validation("file_path", "no active file to start a workflow for"))?;

        if let Some(existing) = self.sessions.get(file_path) {
            return Ok(existing.id.clone());
        }

        if !self.transport.is_connected() {
            return Err(ClientError::connection(
                "/analyze/mutations",
                "not connected to the Engine; connect before starting a workflow",
            ));
        }

        let analysis = self.transport.analyze_mutations(file_path).await.map_err(|e| {
            log::error!("❌ Mutation analysis failed for {}: {}", file_path, e);
            e
        })?;

        let candidate = WorkflowSession::new(Uuid::new_v4().to_string(), file_path.to_string(), Some(analysis));
        let candidate_id = candidate.id.clone();
        let workflow_id = self
            .sessions
            .entry(file_path.to_string())
            .or_insert(candidate)
            .id
            .clone();

        if workflow_id == candidate_id {
            log::info!("🚀 Workflow {} started for {}", workflow_id, file_path);
            self.emit(WorkflowEvent::SessionStarted {
                workflow_id: workflow_id.clone(),
                file_path: file_path.to_string(),
            });
        }
        Ok(workflow_id)
    }

    /// Appends translated edits to the session buffer. Returns how many line
    /// changes were recorded; untracked or paused files record nothing.
    pub fn on_content_changed(&self, file_path: &str, changes: &[ContentChange]) -> usize {
        self.record_changes(file_path, EditTranslator::translate_all(changes))
    }

    pub fn record_changes(&self, file_path: &str, changes: Vec<LineChange>) -> usize {
        if changes.is_empty() {
            return 0;
        }
        match self.sessions.get_mut(file_path) {
            Some(mut session) if session.status == SessionStatus::Active => {
                let count = changes.len();
                session.changes.extend(changes);
                log::debug!("✏️ {} line change(s) buffered for {}", count, file_path);
                count
            }
            _ => 0,
        }
    }

    /// Save event: auto-approves or submits the buffered changes.
    pub async fn on_save(&self, file_path: &str) -> ClientResult<SaveOutcome> {
        let submission = {
            let Some(mut session) = self.sessions.get_mut(file_path) else {
                return Ok(SaveOutcome::NotTracked);
            };
            if session.status != SessionStatus::Active {
                return Ok(SaveOutcome::Paused);
            }
            if session.changes.is_empty() {
                return Ok(SaveOutcome::NothingBuffered);
            }
            if session.pending_approval {
                return Ok(SaveOutcome::AlreadyPending {
                    request_id: session.pending_approval_id.clone(),
                });
            }

            let policy = self.policy.read();
            if !policy.requires_approval(&session.changes, session.analysis.as_ref()) {
                let changes: Vec<LineChange> = session.changes.drain(..).collect();
                let workflow_id = session.id.clone();
                drop(policy);
                drop(session);

                log::info!("✅ Auto-approved {} change(s) in {}", changes.len(), file_path);
                let change_count = changes.len();
                self.emit(WorkflowEvent::AutoApproved {
                    workflow_id,
                    file_path: file_path.to_string(),
                    changes,
                });
                return Ok(SaveOutcome::AutoApproved { change_count });
            }

            let priority = policy.priority_for(&session.changes, session.analysis.as_ref());
            Self::claim(&mut session, priority)
        };

        self.submit(file_path, submission).await
    }

    /// Submits the buffer regardless of the policy verdict.
    pub async fn request_approval(&self, file_path: &str) -> ClientResult<SaveOutcome> {
        let submission = {
            let mut session = self
                .sessions
                .get_mut(file_path)
                .ok_or_else(|| ClientError::not_found("workflow for file", file_path))?;
            if session.changes.is_empty() {
                return Ok(SaveOutcome::NothingBuffered);
            }
            if session.pending_approval {
                return Ok(SaveOutcome::AlreadyPending {
                    request_id: session.pending_approval_id.clone(),
                });
            }
            let priority = self.policy.read().priority_for(&session.changes, session.analysis.as_ref());
            Self::claim(&mut session, priority)
        };

        self.submit(file_path, submission).await
    }

    /// Sets the duplicate-submission guard and snapshots the buffer.
    fn claim(session: &mut WorkflowSession, priority: Priority) -> Submission {
        session.pending_approval = true;
        session.pending_approval_id = None;
        session.submitted_change_count = session.changes.len();
        Submission {
            workflow_id: session.id.clone(),
            changes: session.changes.clone(),
            priority,
        }
    }

    async fn submit(&self, file_path: &str, submission: Submission) -> ClientResult<SaveOutcome> {
        let Submission {
            workflow_id,
            changes,
            priority,
        } = submission;

        let body = NewApprovalRequest {
            title: format!("Approve {} change(s) in {}", changes.len(), display_name(file_path)),
            description: describe(&changes),
            priority,
            changes: vec![FileChange::modified(file_path, changes)],
            workflow_id: workflow_id.clone(),
            timeout_seconds: Some(self.approval_timeout_secs),
        };

        match self.transport.create_approval(&body).await {
            Ok(request) => {
                let request_id = request.id.clone();
                let still_tracked = match self.sessions.get_mut(file_path) {
                    Some(mut session) if session.id == workflow_id => {
                        session.pending_approval_id = Some(request_id.clone());
                        true
                    }
                    _ => false,
                };
                if !still_tracked {
                    log::warn!("⚠️ Workflow for {} ended while submitting; cancelling {}", file_path, request_id);
                    if let Err(e) = self.transport.cancel_approval(&request_id).await {
                        log::warn!("⚠️ Could not cancel orphaned request {}: {}", request_id, e);
                    }
                    return Err(ClientError::approval(&request_id, "submit", "workflow stopped during submission"));
                }

                log::info!("⏳ Approval {} requested for {} ({} priority)", request_id, file_path, priority);
                self.emit(WorkflowEvent::ApprovalRequested {
                    workflow_id,
                    file_path: file_path.to_string(),
                    priority,
                    request,
                });
                Ok(SaveOutcome::Submitted { request_id, priority })
            }
            Err(e) => {
                if let Some(mut session) = self.sessions.get_mut(file_path) {
                    if session.id == workflow_id {
                        session.clear_pending();
                    }
                }
                log::error!("❌ Approval submission failed for {}: {}", file_path, e);
                self.emit(WorkflowEvent::SubmissionFailed {
                    workflow_id,
                    file_path: file_path.to_string(),
                    message: e.user_message(),
                });
                Err(e)
            }
        }
    }

    /// One status check for every outstanding request. Failures are logged
    /// and retried on the next call. Returns how many requests resolved.
    pub async fn poll_status(&self) -> usize {
        let outstanding: Vec<String> = self
            .sessions
            .iter()
            .filter_map(|entry| entry.value().pending_approval_id.clone())
            .collect();

        let mut resolved = 0;
        for request_id in outstanding {
            match self.transport.approval_status(&request_id).await {
                Ok(request) => {
                    if self.resolve(&request_id, request.status) {
                        resolved += 1;
                    }
                }
                Err(e) => log::warn!("⚠️ Status check for {} failed: {}", request_id, e),
            }
        }
        resolved
    }

    /// Applies a terminal status reported for `request_id`.
    ///
    /// Approved and rejected flush the submitted prefix of the buffer (edits
    /// made while waiting are kept). Expired and cancelled release the guard
    /// and keep the buffer for resubmission. Unknown ids, non-terminal
    /// statuses and repeats are no-ops; returns whether anything changed.
    pub fn resolve(&self, request_id: &str, status: ApprovalStatus) -> bool {
        if !status.is_terminal() {
            return false;
        }

        let event = {
            let Some(mut session) = self
                .sessions
                .iter_mut()
                .find(|entry| entry.value().pending_approval_id.as_deref() == Some(request_id))
            else {
                return false;
            };

            let workflow_id = session.id.clone();
            let file_path = session.file_path.clone();
            let request_id = request_id.to_string();

            match status {
                ApprovalStatus::Approved | ApprovalStatus::Rejected => {
                    let count = session.submitted_change_count.min(session.changes.len());
                    let changes: Vec<LineChange> = session.changes[..count].to_vec();
                    session.flush(count);
                    session.clear_pending();
                    if status == ApprovalStatus::Approved {
                        WorkflowEvent::ApprovalGranted { workflow_id, file_path, request_id, changes }
                    } else {
                        WorkflowEvent::ApprovalRejected { workflow_id, file_path, request_id, changes }
                    }
                }
                ApprovalStatus::Expired => {
                    session.clear_pending();
                    WorkflowEvent::ApprovalExpired { workflow_id, file_path, request_id }
                }
                ApprovalStatus::Cancelled => {
                    session.clear_pending();
                    WorkflowEvent::ApprovalCancelled { workflow_id, file_path, request_id }
                }
                ApprovalStatus::Pending => return false,
            }
        };

        log::info!("{} Request {} resolved as {}", status.emoji(), request_id, status);
        self.emit(event);
        true
    }

    pub fn pause(&self, workflow_id: &str) -> ClientResult<()> {
        self.transition(workflow_id, SessionStatus::Active, SessionStatus::Paused)
    }

    pub fn resume(&self, workflow_id: &str) -> ClientResult<()> {
        self.transition(workflow_id, SessionStatus::Paused, SessionStatus::Active)
    }

    fn transition(&self, workflow_id: &str, from: SessionStatus, to: SessionStatus) -> ClientResult<()> {
        let file_path = self.path_of(workflow_id)?;
        {
            let mut session = self
                .sessions
                .get_mut(&file_path)
                .ok_or_else(|| ClientError::not_found("workflow", workflow_id))?;
            if session.status == to {
                return Ok(());
            }
            if session.status != from {
                return Err(ClientError::validation(
                    "status",
                    &format!("workflow {} is {:?}", workflow_id, session.status),
                ));
            }
            session.status = to;
        }

        let event = match to {
            SessionStatus::Paused => WorkflowEvent::SessionPaused {
                workflow_id: workflow_id.to_string(),
                file_path,
            },
            _ => WorkflowEvent::SessionResumed {
                workflow_id: workflow_id.to_string(),
                file_path,
            },
        };
        self.emit(event);
        Ok(())
    }

    /// Removes the session; an outstanding request is cancelled best-effort.
    pub async fn stop_workflow(&self, workflow_id: &str) -> ClientResult<()> {
        let file_path = self.path_of(workflow_id)?;
        let session = self.remove_session(&file_path, workflow_id)?;
        self.cancel_outstanding(&session).await;

        log::info!("🛑 Workflow {} stopped for {}", workflow_id, file_path);
        self.emit(WorkflowEvent::SessionStopped {
            workflow_id: workflow_id.to_string(),
            file_path,
        });
        Ok(())
    }

    /// Ends a workflow whose changes are all settled.
    pub fn complete_workflow(&self, workflow_id: &str) -> ClientResult<()> {
        let file_path = self.path_of(workflow_id)?;
        {
            let session = self
                .sessions
                .get(&file_path)
                .ok_or_else(|| ClientError::not_found("workflow", workflow_id))?;
            if session.pending_approval {
                return Err(ClientError::approval(
                    session.pending_approval_id.as_deref().unwrap_or_default(),
                    "complete",
                    "the workflow still has a request awaiting a decision",
                ));
            }
        }
        let mut session = self.remove_session(&file_path, workflow_id)?;
        session.status = SessionStatus::Completed;

        log::info!("🏁 Workflow {} completed for {}", workflow_id, file_path);
        self.emit(WorkflowEvent::SessionCompleted {
            workflow_id: workflow_id.to_string(),
            file_path,
        });
        Ok(())
    }

    pub async fn on_file_deleted(&self, file_path: &str) -> bool {
        let Some((_, session)) = self.sessions.remove(file_path) else {
            return false;
        };
        self.cancel_outstanding(&session).await;
        log::info!("🗑️ {} deleted; workflow {} dropped", file_path, session.id);
        self.emit(WorkflowEvent::SessionStopped {
            workflow_id: session.id,
            file_path: file_path.to_string(),
        });
        true
    }

    fn remove_session(&self, file_path: &str, workflow_id: &str) -> ClientResult<WorkflowSession> {
        self.sessions
            .remove_if(file_path, |_, session| session.id == workflow_id)
            .map(|(_, session)| session)
            .ok_or_else(|| ClientError::not_found("workflow", workflow_id))
    }

    async fn cancel_outstanding(&self, session: &WorkflowSession) {
        if let Some(request_id) = &session.pending_approval_id {
            if let Err(e) = self.transport.cancel_approval(request_id).await {
                log::warn!("⚠️ Could not cancel request {}: {}", request_id, e);
            }
        }
    }

    fn path_of(&self, workflow_id: &str) -> ClientResult<String> {
        self.sessions
            .iter()
            .find(|entry| entry.value().id == workflow_id)
            .map(|entry| entry.key().clone())
            .ok_or_else(|| ClientError::not_found("workflow", workflow_id))
    }

    fn emit(&self, event: WorkflowEvent) {
        let _ = self.events.send(event);
    }
}

fn display_name(file_path: &str) -> String {
    Path::new(file_path)
        .file_name()
        .map_or_else(|| file_path.to_string(), |name| name.to_string_lossy().to_string())
}

fn describe(changes: &[LineChange]) -> String {
    let count = |kind: ChangeType| changes.iter().filter(|c| c.change_type == kind).count();
    format!(
        "{} added, {} modified, {} deleted line(s)",
        count(ChangeType::Added),
        count(ChangeType::Modified),
        count(ChangeType::Deleted)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::enums::http_method::HttpMethod;
    use crate::services::fake_engine::{connected_transport, disconnected_transport, FakeEngine};

    const FILE: &str = "src/a.ts";

    fn low_risk() -> serde_json::Value {
        json!({ "filePath": FILE, "riskLevel": "low", "impactScore": 0.1 })
    }

    fn created(id: &str, priority: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": "t",
            "priority": priority,
            "status": "pending",
            "createdAt": "2024-05-01T09:00:00Z"
        })
    }

    fn status(id: &str, status: &str) -> serde_json::Value {
        json!({ "id": id, "title": "t", "status": status, "createdAt": "2024-05-01T09:00:00Z" })
    }

    async fn manager(engine: &Arc<FakeEngine>) -> WorkflowManager {
        engine.respond(HttpMethod::Post, "/analyze/mutations", low_risk());
        let transport = connected_transport(Arc::clone(engine)).await;
        WorkflowManager::new(transport, ApprovalPolicy::new(PolicyConfig::default()).unwrap(), 300)
    }

    fn additions(count: usize) -> Vec<LineChange> {
        (1..=count).map(|n| LineChange::added(n, &format!("let v{} = {};", n, n))).collect()
    }

    #[tokio::test]
    async fn starting_twice_returns_the_same_session() {
        let engine = FakeEngine::new();
        let workflows = manager(&engine).await;

        let first = workflows.start_workflow(Some(FILE)).await.unwrap();
        let second = workflows.start_workflow(Some(FILE)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(workflows.sessions().len(), 1);
        assert_eq!(engine.calls(HttpMethod::Post, "/analyze/mutations"), 1);
    }

    #[tokio::test]
    async fn start_requires_a_connection_and_a_file() {
        let engine = FakeEngine::new();
        let transport = disconnected_transport(Arc::clone(&engine));
        let workflows = WorkflowManager::new(transport, ApprovalPolicy::new(PolicyConfig::default()).unwrap(), 300);

        assert!(workflows.start_workflow(Some(FILE)).await.unwrap_err().is_connection());
        assert!(matches!(
            workflows.start_workflow(None).await,
            Err(ClientError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn analysis_failure_aborts_session_creation() {
        let engine = FakeEngine::new();
        let workflows = manager(&engine).await;
        engine.fail(HttpMethod::Post, "/analyze/mutations", ClientError::engine(500, "analysis offline"));

        assert!(workflows.start_workflow(Some(FILE)).await.is_err());
        assert!(!workflows.is_tracking(FILE));
    }

    #[tokio::test]
    async fn small_additions_auto_approve_without_a_request() {
        let engine = FakeEngine::new();
        let workflows = manager(&engine).await;
        let mut events = workflows.subscribe();
        workflows.start_workflow(Some(FILE)).await.unwrap();

        workflows.record_changes(FILE, additions(3));
        let outcome = workflows.on_save(FILE).await.unwrap();

        assert_eq!(outcome, SaveOutcome::AutoApproved { change_count: 3 });
        assert!(workflows.session(FILE).unwrap().changes.is_empty());
        assert_eq!(engine.calls(HttpMethod::Post, "/approvals"), 0);

        let _started = events.recv().await.unwrap();
        assert!(matches!(events.recv().await.unwrap(), WorkflowEvent::AutoApproved { changes, .. } if changes.len() == 3));
    }

    #[tokio::test]
    async fn one_deletion_requires_approval() {
        let engine = FakeEngine::new();
        engine.respond(HttpMethod::Post, "/approvals", created("req-1", "high"));
        let workflows = manager(&engine).await;
        workflows.start_workflow(Some(FILE)).await.unwrap();

        workflows.record_changes(FILE, vec![LineChange::deleted(7, "const x = 1;")]);
        let outcome = workflows.on_save(FILE).await.unwrap();

        assert_eq!(
            outcome,
            SaveOutcome::Submitted {
                request_id: "req-1".to_string(),
                priority: Priority::High
            }
        );
        let session = workflows.session(FILE).unwrap();
        assert!(session.pending_approval);
        assert_eq!(session.pending_approval_id.as_deref(), Some("req-1"));
        assert_eq!(engine.last_body(HttpMethod::Post, "/approvals").unwrap()["priority"], "high");
    }

    #[tokio::test]
    async fn concurrent_saves_create_exactly_one_request() {
        let engine = FakeEngine::new();
        engine.respond(HttpMethod::Post, "/approvals", created("req-1", "medium"));
        let workflows = manager(&engine).await;
        workflows.start_workflow(Some(FILE)).await.unwrap();
        workflows.record_changes(FILE, additions(6));

        let (first, second) = tokio::join!(workflows.on_save(FILE), workflows.on_save(FILE));

        assert_eq!(engine.calls(HttpMethod::Post, "/approvals"), 1);
        let outcomes = [first.unwrap(), second.unwrap()];
        assert_eq!(outcomes.iter().filter(|o| matches!(o, SaveOutcome::Submitted { .. })).count(), 1);
        assert_eq!(outcomes.iter().filter(|o| matches!(o, SaveOutcome::AlreadyPending { .. })).count(), 1);
    }

    #[tokio::test]
    async fn failed_submission_releases_the_guard() {
        let engine = FakeEngine::new();
        let workflows = manager(&engine).await;
        workflows.start_workflow(Some(FILE)).await.unwrap();
        workflows.record_changes(FILE, additions(6));

        engine.fail(HttpMethod::Post, "/approvals", ClientError::connection("/approvals", "timeout"));
        assert!(workflows.on_save(FILE).await.is_err());
        let session = workflows.session(FILE).unwrap();
        assert!(!session.pending_approval);
        assert_eq!(session.changes.len(), 6);

        engine.respond(HttpMethod::Post, "/approvals", created("req-2", "medium"));
        assert!(matches!(workflows.on_save(FILE).await.unwrap(), SaveOutcome::Submitted { .. }));
    }

    #[tokio::test]
    async fn approval_flushes_only_the_submitted_changes() {
        let engine = FakeEngine::new();
        engine.respond(HttpMethod::Post, "/approvals", created("req-1", "medium"));
        let workflows = manager(&engine).await;
        workflows.start_workflow(Some(FILE)).await.unwrap();
        workflows.record_changes(FILE, additions(6));
        workflows.on_save(FILE).await.unwrap();

        workflows.record_changes(FILE, vec![LineChange::added(40, "late edit")]);
        engine.respond(HttpMethod::Get, "/approvals/req-1", status("req-1", "approved"));

        assert_eq!(workflows.poll_status().await, 1);
        let session = workflows.session(FILE).unwrap();
        assert!(!session.pending_approval);
        assert_eq!(session.changes, vec![LineChange::added(40, "late edit")]);
    }

    #[tokio::test]
    async fn repeated_polls_after_resolution_are_no_ops() {
        let engine = FakeEngine::new();
        engine.respond(HttpMethod::Post, "/approvals", created("req-1", "medium"));
        let workflows = manager(&engine).await;
        workflows.start_workflow(Some(FILE)).await.unwrap();
        workflows.record_changes(FILE, additions(6));
        workflows.on_save(FILE).await.unwrap();
        engine.respond(HttpMethod::Get, "/approvals/req-1", status("req-1", "approved"));

        let mut events = workflows.subscribe();
        assert_eq!(workflows.poll_status().await, 1);
        let snapshot = workflows.session(FILE).unwrap();

        assert_eq!(workflows.poll_status().await, 0);
        assert!(!workflows.resolve("req-1", ApprovalStatus::Approved));

        assert!(matches!(events.try_recv().unwrap(), WorkflowEvent::ApprovalGranted { .. }));
        assert!(events.try_recv().is_err());
        let after = workflows.session(FILE).unwrap();
        assert_eq!(after.changes, snapshot.changes);
        assert_eq!(after.pending_approval, snapshot.pending_approval);
    }

    #[tokio::test]
    async fn expiry_keeps_the_buffer_for_resubmission() {
        let engine = FakeEngine::new();
        engine.respond(HttpMethod::Post, "/approvals", created("req-1", "medium"));
        let workflows = manager(&engine).await;
        let mut events = workflows.subscribe();
        workflows.start_workflow(Some(FILE)).await.unwrap();
        workflows.record_changes(FILE, additions(6));
        workflows.on_save(FILE).await.unwrap();

        assert!(workflows.resolve("req-1", ApprovalStatus::Expired));
        let session = workflows.session(FILE).unwrap();
        assert!(!session.pending_approval);
        assert_eq!(session.changes.len(), 6);

        let mut saw_expired = false;
        while let Ok(event) = events.try_recv() {
            saw_expired |= matches!(event, WorkflowEvent::ApprovalExpired { .. });
            assert!(!matches!(event, WorkflowEvent::ApprovalRejected { .. }));
        }
        assert!(saw_expired);
    }

    #[tokio::test]
    async fn paused_sessions_ignore_edits_and_saves() {
        let engine = FakeEngine::new();
        let workflows = manager(&engine).await;
        let id = workflows.start_workflow(Some(FILE)).await.unwrap();
        workflows.record_changes(FILE, additions(2));

        workflows.pause(&id).unwrap();
        assert_eq!(workflows.record_changes(FILE, additions(1)), 0);
        assert_eq!(workflows.on_save(FILE).await.unwrap(), SaveOutcome::Paused);

        workflows.resume(&id).unwrap();
        assert_eq!(workflows.session(FILE).unwrap().changes.len(), 2);
        assert_eq!(workflows.on_save(FILE).await.unwrap(), SaveOutcome::AutoApproved { change_count: 2 });
    }

    #[tokio::test]
    async fn edits_to_untracked_files_are_ignored() {
        let engine = FakeEngine::new();
        let workflows = manager(&engine).await;
        let recorded = workflows.on_content_changed("other.ts", &[ContentChange::new(1, &[], &["x"])]);
        assert_eq!(recorded, 0);
        assert_eq!(workflows.on_save("other.ts").await.unwrap(), SaveOutcome::NotTracked);
    }

    #[tokio::test]
    async fn stop_cancels_the_outstanding_request_best_effort() {
        let engine = FakeEngine::new();
        engine.respond(HttpMethod::Post, "/approvals", created("req-1", "medium"));
        engine.fail(HttpMethod::Delete, "/approvals/req-1", ClientError::engine(500, "down"));
        let workflows = manager(&engine).await;
        let id = workflows.start_workflow(Some(FILE)).await.unwrap();
        workflows.record_changes(FILE, additions(6));
        workflows.on_save(FILE).await.unwrap();

        workflows.stop_workflow(&id).await.unwrap();

        assert!(!workflows.is_tracking(FILE));
        assert_eq!(engine.calls(HttpMethod::Delete, "/approvals/req-1"), 1);
    }

    #[tokio::test]
    async fn completion_is_refused_while_a_request_is_pending() {
        let engine = FakeEngine::new();
        engine.respond(HttpMethod::Post, "/approvals", created("req-1", "medium"));
        let workflows = manager(&engine).await;
        let id = workflows.start_workflow(Some(FILE)).await.unwrap();
        workflows.record_changes(FILE, additions(6));
        workflows.on_save(FILE).await.unwrap();

        assert!(workflows.complete_workflow(&id).is_err());
        workflows.resolve("req-1", ApprovalStatus::Approved);
        workflows.complete_workflow(&id).unwrap();
        assert!(!workflows.is_tracking(FILE));
    }

    #[tokio::test]
    async fn deleting_the_file_drops_its_session() {
        let engine = FakeEngine::new();
        let workflows = manager(&engine).await;
        workflows.start_workflow(Some(FILE)).await.unwrap();

        assert!(workflows.on_file_deleted(FILE).await);
        assert!(!workflows.on_file_deleted(FILE).await);
        assert!(workflows.sessions().is_empty());
    }
}
