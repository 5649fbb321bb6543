use crate::state::network::LoadingState;
use cfp_api::Team;
use crossterm::event::KeyEvent;

/// What started a fetch. Only manual refreshes are surfaced to the user;
/// the others are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTrigger {
    Startup,
    Scheduled,
    Manual,
}

impl FetchTrigger {
    pub fn notifies(self) -> bool {
        self == FetchTrigger::Manual
    }
}

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    FetchRankings { trigger: FetchTrigger },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    /// Full replacement of the held list; never a partial patch.
    RankingsLoaded { teams: Vec<Team>, trigger: FetchTrigger },
    FetchFailed { message: String, trigger: FetchTrigger },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    RefreshTick,
}
