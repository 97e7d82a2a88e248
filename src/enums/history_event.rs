/// View-refresh signals from the change history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    Refreshed {
        loaded: usize,
        has_more: bool,
    },
    PageAppended {
        page: u32,
        added: usize,
        has_more: bool,
    },
    Cleared,
}
