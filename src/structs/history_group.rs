use chrono::NaiveDate;
use serde::Serialize;
use crate::structs::change_history_entry::ChangeHistoryEntry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryGroup {
    pub label: String,
    pub date: NaiveDate,
    pub entries: Vec<ChangeHistoryEntry>,
}
