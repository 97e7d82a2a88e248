use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use crate::config::constants::{EVENT_BUS_CAPACITY, MAX_PENDING_PAGES};
use crate::enums::approval_status::ApprovalStatus;
use crate::enums::priority::Priority;
use crate::enums::queue_event::QueueEvent;
use crate::errors::{ClientError, ClientResult};
use crate::helpers::in_flight::InFlightGuard;
use crate::services::connection_manager::ConnectionManager;
use crate::structs::approval_request::ApprovalRequest;
use crate::structs::approval_response::ApprovalResponse;
use crate::structs::bulk_outcome::BulkOutcome;
use crate::structs::queue_filter::QueueFilter;
use crate::traits::user_prompt::UserPrompt;

#[derive(Default)]
struct QueueState {
    requests: HashMap<String, ApprovalRequest>,
    // Ids already seen in a terminal state; late pending pushes for them are stale.
    resolved: HashSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Approve,
    Reject,
}

/// Outstanding approval requests as the user sees them.
pub struct ApprovalQueue {
    transport: Arc<ConnectionManager>,
    prompt: Arc<dyn UserPrompt>,
    state: RwLock<QueueState>,
    filter: RwLock<QueueFilter>,
    refreshing: AtomicBool,
    events: broadcast::Sender<QueueEvent>,
}

impl ApprovalQueue {
    pub fn new(transport: Arc<ConnectionManager>, prompt: Arc<dyn UserPrompt>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self {
            transport,
            prompt,
            state: RwLock::new(QueueState::default()),
            filter: RwLock::new(QueueFilter::default()),
            refreshing: AtomicBool::new(false),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Replaces the local set with the Engine's pending list.
    ///
    /// A call made while another refresh is running is discarded and returns
    /// `Ok(false)`; the set is only swapped once every page has arrived.
    /// Requests resolved while the pages were in flight stay resolved.
    pub async fn refresh(&self) -> ClientResult<bool> {
        let Some(_guard) = InFlightGuard::try_acquire(&self.refreshing) else {
            log::debug!("⏭️ Queue refresh already in flight; skipping");
            return Ok(false);
        };
        let resolved_before = self.state.read().resolved.clone();

        let mut fetched = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.transport.pending_approvals(page).await?;
            let has_more = batch.has_more && !batch.items.is_empty();
            fetched.extend(batch.items);
            if !has_more || page >= MAX_PENDING_PAGES {
                break;
            }
            page += 1;
        }

        let pending = {
            let mut state = self.state.write();
            // Only tombstones older than this fetch are covered by its answer.
            let resolved_since: HashSet<String> = state.resolved.difference(&resolved_before).cloned().collect();
            state.requests = fetched
                .into_iter()
                .filter(|request| !request.status.is_terminal() && !resolved_since.contains(&request.id))
                .map(|request| (request.id.clone(), request))
                .collect();
            state.resolved = resolved_since;
            state.requests.len()
        };

        log::debug!("🔄 Approval queue refreshed: {} pending", pending);
        let _ = self.events.send(QueueEvent::Refreshed { pending });
        Ok(true)
    }

    /// Applies a pushed request by id. Terminal statuses remove it.
    pub fn upsert(&self, request: ApprovalRequest) {
        if request.status.is_terminal() {
            self.mark_resolved(&request.id, request.status);
            return;
        }

        let is_new = {
            let mut state = self.state.write();
            if state.resolved.contains(&request.id) {
                log::debug!("📭 Ignoring stale update for resolved request {}", request.id);
                return;
            }
            state.requests.insert(request.id.clone(), request.clone()).is_none()
        };
        let _ = self.events.send(QueueEvent::Upserted { request, is_new });
    }

    /// Drops `request_id` from the pending set after a terminal status.
    pub fn mark_resolved(&self, request_id: &str, status: ApprovalStatus) {
        let removed = {
            let mut state = self.state.write();
            state.resolved.insert(request_id.to_string());
            state.requests.remove(request_id).is_some()
        };
        if removed {
            let _ = self.events.send(QueueEvent::Resolved {
                request_id: request_id.to_string(),
                status,
            });
        }
    }

    /// Pending requests, high priority first, then oldest first.
    pub fn pending(&self) -> Vec<ApprovalRequest> {
        let mut requests: Vec<ApprovalRequest> = self.state.read().requests.values().cloned().collect();
        sort_for_queue(&mut requests);
        requests
    }

    /// `pending()` narrowed by the active view filter.
    pub fn visible(&self) -> Vec<ApprovalRequest> {
        let filter = self.filter.read().clone();
        self.pending().into_iter().filter(|r| filter.matches(r)).collect()
    }

    pub fn get(&self, request_id: &str) -> Option<ApprovalRequest> {
        self.state.read().requests.get(request_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn filter(&self) -> QueueFilter {
        self.filter.read().clone()
    }

    pub fn set_filter(&self, filter: QueueFilter) {
        *self.filter.write() = filter;
        let pending = self.len();
        let _ = self.events.send(QueueEvent::Refreshed { pending });
    }

    pub fn clear_filter(&self) {
        self.set_filter(QueueFilter::default());
    }

    pub fn group_by_priority(&self) -> Vec<(Priority, Vec<ApprovalRequest>)> {
        let visible = self.visible();
        [Priority::High, Priority::Medium, Priority::Low]
            .into_iter()
            .map(|priority| {
                let group: Vec<ApprovalRequest> = visible.iter().filter(|r| r.priority == priority).cloned().collect();
                (priority, group)
            })
            .filter(|(_, group)| !group.is_empty())
            .collect()
    }

    /// A request touching several files appears under each of them.
    pub fn group_by_file(&self) -> BTreeMap<String, Vec<ApprovalRequest>> {
        let mut groups: BTreeMap<String, Vec<ApprovalRequest>> = BTreeMap::new();
        for request in self.visible() {
            let mut paths = request.file_paths();
            paths.dedup();
            if paths.is_empty() {
                paths.push("(no files)".to_string());
            }
            for path in paths {
                groups.entry(path).or_default().push(request.clone());
            }
        }
        groups
    }

    pub async fn approve(&self, request_id: &str) -> ClientResult<ApprovalResponse> {
        let response = self.decide(request_id, Decision::Approve, None).await?;
        self.refresh_in_background().await;
        Ok(response)
    }

    pub async fn reject(&self, request_id: &str, reason: Option<&str>) -> ClientResult<ApprovalResponse> {
        let response = self.decide(request_id, Decision::Reject, reason).await?;
        self.refresh_in_background().await;
        Ok(response)
    }

    pub async fn approve_all(&self) -> ClientResult<BulkOutcome> {
        self.decide_all(Decision::Approve, None).await
    }

    pub async fn reject_all(&self, reason: Option<&str>) -> ClientResult<BulkOutcome> {
        self.decide_all(Decision::Reject, reason).await
    }

    /// Cancels every pending request after confirmation.
    pub async fn clear(&self) -> ClientResult<BulkOutcome> {
        let ids: Vec<String> = self.pending().into_iter().map(|r| r.id).collect();
        if ids.is_empty() {
            return Ok(BulkOutcome::default());
        }
        let question = format!("Cancel all {} pending approval request(s)?", ids.len());
        if !self.prompt.confirm(&question).await {
            return Err(ClientError::cancelled("Clearing the approval queue"));
        }

        let mut outcome = BulkOutcome::default();
        for id in ids {
            match self.transport.cancel_approval(&id).await {
                Ok(()) => {
                    self.mark_resolved(&id, ApprovalStatus::Cancelled);
                    outcome.succeeded.push(id);
                }
                Err(e) => outcome.failed.push((id, e)),
            }
        }

        log::info!("🧹 {}", outcome.summary("Cancelled"));
        let _ = self.events.send(QueueEvent::Cleared);
        Ok(outcome)
    }

    async fn decide(&self, request_id: &str, decision: Decision, reason: Option<&str>) -> ClientResult<ApprovalResponse> {
        let response = match decision {
            Decision::Approve => self.transport.approve(request_id).await?,
            Decision::Reject => self.transport.reject(request_id, reason).await?,
        };
        let status = match decision {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject => ApprovalStatus::Rejected,
        };
        log::info!("{} Request {} {}", status.emoji(), request_id, status);
        self.mark_resolved(request_id, status);
        Ok(response)
    }

    /// Confirmation comes before any network call; failures do not stop the run.
    async fn decide_all(&self, decision: Decision, reason: Option<&str>) -> ClientResult<BulkOutcome> {
        let ids: Vec<String> = self.visible().into_iter().map(|r| r.id).collect();
        if ids.is_empty() {
            return Ok(BulkOutcome::default());
        }

        let verb = match decision {
            Decision::Approve => "Approve",
            Decision::Reject => "Reject",
        };
        let question = format!("{} all {} pending request(s)?", verb, ids.len());
        if !self.prompt.confirm(&question).await {
            return Err(ClientError::cancelled(&format!("{} all", verb)));
        }

        let mut outcome = BulkOutcome::default();
        for id in ids {
            match self.decide(&id, decision, reason).await {
                Ok(_) => outcome.succeeded.push(id),
                Err(e) => {
                    log::warn!("⚠️ {} failed for {}: {}", verb, id, e);
                    outcome.failed.push((id, e));
                }
            }
        }

        let past = match decision {
            Decision::Approve => "Approved",
            Decision::Reject => "Rejected",
        };
        log::info!("📋 {}", outcome.summary(past));
        self.refresh_in_background().await;
        Ok(outcome)
    }

    async fn refresh_in_background(&self) {
        if let Err(e) = self.refresh().await {
            log::warn!("⚠️ Queue refresh after decision failed: {}", e);
        }
    }
}

/// Queue order: priority (high first), then creation time (oldest first),
/// then id so equal timestamps stay stable.
pub fn sort_for_queue(requests: &mut [ApprovalRequest]) {
    requests.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}
