use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, Notification, RefreshSignals};
use crate::state::messages::{FetchTrigger, NetworkRequest};
use crate::state::refresher::{
    DEFAULT_INTERVAL_HOURS, format_countdown, now_ms, should_fetch_on_start, time_remaining,
};
use crate::state::store::RankingsStore;
use cfp_api::Team;
use chrono::{Local, TimeZone};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new() -> Self {
        let settings = AppSettings::load();
        let rankings = RankingsStore::load(settings.state_path.clone());
        Self::with_store(settings, rankings)
    }

    pub fn with_store(settings: AppSettings, rankings: RankingsStore) -> Self {
        let mut app = Self { state: AppState::new(rankings), settings };
        app.refresh_countdown();
        app
    }

    pub fn teams(&self) -> &[Team] {
        self.state.rankings.teams()
    }

    // -----------------------------------------------------------------------
    // Fetch triggers: each returns the trigger to send, if any
    // -----------------------------------------------------------------------

    /// Silent fetch on launch when nothing is held or the list is past the
    /// warm-up threshold.
    pub fn on_startup(&mut self) -> Option<FetchTrigger> {
        let rankings = &self.state.rankings;
        if !should_fetch_on_start(rankings.teams().len(), rankings.last_update()) {
            return None;
        }
        self.state.fetches.try_begin().then_some(FetchTrigger::Startup)
    }

    /// Periodic check against the standard interval. Either starts a silent
    /// fetch or just updates the countdown.
    pub fn on_refresh_tick(&mut self) -> Option<FetchTrigger> {
        let remaining = self.refresh_countdown();
        if !remaining.is_zero() {
            return None;
        }
        self.state.fetches.try_begin().then_some(FetchTrigger::Scheduled)
    }

    /// Always fetches, regardless of staleness or anything in flight.
    pub fn request_manual_refresh(&mut self) -> FetchTrigger {
        self.state.fetches.begin_forced();
        FetchTrigger::Manual
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_rankings_loaded(&mut self, teams: Vec<Team>, trigger: FetchTrigger) {
        self.on_rankings_loaded_at(teams, trigger, now_ms());
    }

    fn on_rankings_loaded_at(&mut self, teams: Vec<Team>, trigger: FetchTrigger, at_ms: i64) {
        self.state.fetches.finish();
        let count = teams.len();
        if let Err(e) = self.state.rankings.replace(teams, at_ms) {
            warn!("rankings updated but not persisted: {e}");
        }
        info!("rankings updated: {count} teams ({trigger:?})");
        self.refresh_countdown();

        if trigger.notifies() {
            self.state.notification =
                Some(Notification::info(format!("Rankings updated: {count} teams")));
        }
    }

    /// Held teams and timestamp stay untouched; last-known-good data persists.
    pub fn on_fetch_failed(&mut self, message: String, trigger: FetchTrigger) {
        self.state.fetches.finish();
        warn!("rankings refresh failed ({trigger:?}): {message}");
        if trigger.notifies() {
            self.state.notification = Some(Notification::error(format!("Refresh failed: {message}")));
        }
    }

    // -----------------------------------------------------------------------
    // Signals
    // -----------------------------------------------------------------------

    pub fn signals(&self) -> RefreshSignals {
        RefreshSignals {
            is_loading: self.state.fetches.in_flight(),
            next_update_text: self.state.next_update_text.clone(),
            last_update_display: self.last_update_display(),
        }
    }

    pub fn last_update_display(&self) -> String {
        format_last_update(self.state.rankings.last_update())
    }

    fn refresh_countdown(&mut self) -> Duration {
        let remaining = time_remaining(self.state.rankings.last_update(), DEFAULT_INTERVAL_HOURS);
        self.state.next_update_text = if remaining.is_zero() {
            "Update due".to_string()
        } else {
            format_countdown(remaining)
        };
        remaining
    }

    // -----------------------------------------------------------------------
    // View toggles
    // -----------------------------------------------------------------------

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_help(&mut self) {
        self.state.show_help = !self.state.show_help;
    }

    pub fn dismiss_notification(&mut self) {
        self.state.notification = None;
    }
}

/// Hand a claimed fetch to the network worker. If it cannot be queued the
/// claim is released and the attempt is reported like any other failure.
pub async fn queue_fetch(
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    trigger: FetchTrigger,
) {
    if let Err(e) = network_requests
        .send(NetworkRequest::FetchRankings { trigger })
        .await
    {
        error!("Failed to queue rankings fetch: {e}");
        app.lock()
            .await
            .on_fetch_failed("could not reach the network worker".to_string(), trigger);
    }
}

fn format_last_update(last_update_ms: i64) -> String {
    if last_update_ms <= 0 {
        return "Never".to_string();
    }
    Local
        .timestamp_millis_opt(last_update_ms)
        .single()
        .map(|dt| dt.format("%b %-d, %-I:%M %p").to_string())
        .unwrap_or_else(|| "Never".to_string())
}
