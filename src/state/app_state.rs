use crate::state::refresher::FetchGuard;
use crate::state::store::RankingsStore;

// ---------------------------------------------------------------------------
// Notifications — only manual refreshes produce these
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub is_error: bool,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self { message: message.into(), is_error: false }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: message.into(), is_error: true }
    }
}

// ---------------------------------------------------------------------------
// Scheduler signals exposed to the presentation layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSignals {
    pub is_loading: bool,
    pub next_update_text: String,
    pub last_update_display: String,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub show_logs: bool,
    pub show_help: bool,
    pub rankings: RankingsStore,
    pub fetches: FetchGuard,
    pub next_update_text: String,
    pub notification: Option<Notification>,
}

impl AppState {
    pub fn new(rankings: RankingsStore) -> Self {
        Self { rankings, ..Self::default() }
    }
}
