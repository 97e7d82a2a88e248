use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use crate::config::constants::EVENT_BUS_CAPACITY;
use crate::enums::approval_status::ApprovalStatus;
use crate::enums::export_format::ExportFormat;
use crate::enums::history_event::HistoryEvent;
use crate::errors::{ClientError, ClientResult};
use crate::helpers::in_flight::InFlightGuard;
use crate::services::connection_manager::ConnectionManager;
use crate::services::history_exporter::HistoryExporter;
use crate::structs::change_history_entry::ChangeHistoryEntry;
use crate::structs::history_group::HistoryGroup;
use crate::structs::paginated::Paginated;
use crate::traits::user_prompt::UserPrompt;

#[derive(Default)]
struct HistoryState {
    entries: Vec<ChangeHistoryEntry>,
    page: u32,
    has_more: bool,
    status_filter: Option<ApprovalStatus>,
    search: Option<String>,
}

/// Paginated log of resolved approval requests.
///
/// `refresh` and `load_more` share one in-flight flag, so a page can never be
/// appended onto a set that is being replaced.
pub struct ChangeHistory {
    transport: Arc<ConnectionManager>,
    prompt: Arc<dyn UserPrompt>,
    state: RwLock<HistoryState>,
    loading: AtomicBool,
    events: broadcast::Sender<HistoryEvent>,
}

impl ChangeHistory {
    pub fn new(transport: Arc<ConnectionManager>, prompt: Arc<dyn UserPrompt>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self {
            transport,
            prompt,
            state: RwLock::new(HistoryState::default()),
            loading: AtomicBool::new(false),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HistoryEvent> {
        self.events.subscribe()
    }

    pub fn entries(&self) -> Vec<ChangeHistoryEntry> {
        self.state.read().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_more(&self) -> bool {
        self.state.read().has_more
    }

    pub fn page(&self) -> u32 {
        self.state.read().page
    }

    pub fn status_filter(&self) -> Option<ApprovalStatus> {
        self.state.read().status_filter
    }

    pub fn search_query(&self) -> Option<String> {
        self.state.read().search.clone()
    }

    /// Reloads page 1 and replaces everything loaded so far. `Ok(false)` when
    /// another load is running.
    pub async fn refresh(&self) -> ClientResult<bool> {
        let Some(_guard) = InFlightGuard::try_acquire(&self.loading) else {
            log::debug!("⏭️ History load already in flight; skipping refresh");
            return Ok(false);
        };

        let batch = self.fetch(1).await?;
        let (loaded, has_more) = {
            let mut state = self.state.write();
            state.page = batch.page.max(1);
            state.has_more = batch.has_more;
            state.entries = dedup_by_id(batch.items);
            (state.entries.len(), state.has_more)
        };

        log::debug!("📜 History refreshed: {} entries (more: {})", loaded, has_more);
        let _ = self.events.send(HistoryEvent::Refreshed { loaded, has_more });
        Ok(true)
    }

    /// Appends the next page. Returns how many new entries arrived; zero when
    /// nothing is left or another load is running.
    pub async fn load_more(&self) -> ClientResult<usize> {
        if !self.has_more() {
            return Ok(0);
        }
        let Some(_guard) = InFlightGuard::try_acquire(&self.loading) else {
            log::debug!("⏭️ History load already in flight; skipping load more");
            return Ok(0);
        };

        let next_page = self.page() + 1;
        let batch = self.fetch(next_page).await?;
        let (added, has_more) = {
            let mut state = self.state.write();
            let mut known: HashSet<String> = state.entries.iter().map(|e| e.id.clone()).collect();
            let before = state.entries.len();
            for entry in batch.items {
                if known.insert(entry.id.clone()) {
                    state.entries.push(entry);
                }
            }
            state.page = next_page;
            state.has_more = batch.has_more;
            (state.entries.len() - before, state.has_more)
        };

        let _ = self.events.send(HistoryEvent::PageAppended {
            page: next_page,
            added,
            has_more,
        });
        Ok(added)
    }

    /// Server-side status filter. Clears any active search.
    pub async fn set_status_filter(&self, status: Option<ApprovalStatus>) -> ClientResult<bool> {
        {
            let mut state = self.state.write();
            state.status_filter = status;
            state.search = None;
        }
        self.refresh().await
    }

    /// Server-side search; an empty query goes back to the plain listing.
    pub async fn search(&self, query: &str) -> ClientResult<bool> {
        let query = query.trim();
        self.state.write().search = (!query.is_empty()).then(|| query.to_string());
        self.refresh().await
    }

    /// Day groups in the local timezone.
    pub fn groups(&self) -> Vec<HistoryGroup> {
        group_by_day(&self.entries(), &Local::now())
    }

    /// Formats what is loaded right now, which may be a partial history.
    pub fn export(&self, format: ExportFormat) -> ClientResult<String> {
        HistoryExporter::export(&self.entries(), format, Utc::now())
    }

    /// Drops the local copy after confirmation. The Engine keeps its records.
    pub async fn clear(&self) -> ClientResult<()> {
        if self.is_empty() {
            return Ok(());
        }
        if !self.prompt.confirm("Clear the loaded change history?").await {
            return Err(ClientError::cancelled("Clearing history"));
        }
        {
            let mut state = self.state.write();
            state.entries.clear();
            state.page = 0;
            state.has_more = false;
        }
        log::info!("🧹 Change history cleared");
        let _ = self.events.send(HistoryEvent::Cleared);
        Ok(())
    }

    async fn fetch(&self, page: u32) -> ClientResult<Paginated<ChangeHistoryEntry>> {
        let (search, status) = {
            let state = self.state.read();
            (state.search.clone(), state.status_filter)
        };
        match search {
            Some(query) => self.transport.search_history(&query, page).await,
            None => self.transport.history(page, status).await,
        }
    }
}

fn dedup_by_id(entries: Vec<ChangeHistoryEntry>) -> Vec<ChangeHistoryEntry> {
    let mut seen = HashSet::new();
    entries.into_iter().filter(|e| seen.insert(e.id.clone())).collect()
}

/// Groups entries by calendar day of their effective time in `now`'s
/// timezone. Groups and the entries inside them run newest first.
pub fn group_by_day<Tz: TimeZone>(entries: &[ChangeHistoryEntry], now: &DateTime<Tz>) -> Vec<HistoryGroup> {
    let tz = now.timezone();
    let today = now.date_naive();
    let yesterday = today.pred_opt();

    let mut sorted: Vec<&ChangeHistoryEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.effective_time().cmp(&a.effective_time()).then_with(|| a.id.cmp(&b.id)));

    let mut groups: Vec<HistoryGroup> = Vec::new();
    for entry in sorted {
        let date = entry.effective_time().with_timezone(&tz).date_naive();
        match groups.last_mut() {
            Some(group) if group.date == date => group.entries.push(entry.clone()),
            _ => {
                let label = if date == today {
                    "Today".to_string()
                } else if Some(date) == yesterday {
                    "Yesterday".to_string()
                } else if date.year() == today.year() {
                    date.format("%b %-d").to_string()
                } else {
                    date.format("%b %-d, %Y").to_string()
                };
                groups.push(HistoryGroup {
                    label,
                    date,
                    entries: vec![entry.clone()],
                });
            }
        }
    }
    groups
}
