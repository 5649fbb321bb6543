use crate::state::messages::UiEvent;
use chrono::Utc;
use log::warn;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;

/// Rankings are refreshed every 8 hours.
pub const DEFAULT_INTERVAL_HOURS: f64 = 8.0;

/// On startup anything older than 6 minutes is refetched.
pub const WARMUP_INTERVAL_HOURS: f64 = 0.1;

pub const TICK_PERIOD: Duration = Duration::from_secs(60);

const MS_PER_HOUR: f64 = 3_600_000.0;

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// True once `interval_hours` have passed since `last_update_ms`. A zero
/// timestamp means "never updated" and is always due.
pub fn is_due(last_update_ms: i64, interval_hours: f64) -> bool {
    is_due_at(now_ms(), last_update_ms, interval_hours)
}

pub fn is_due_at(now_ms: i64, last_update_ms: i64, interval_hours: f64) -> bool {
    if last_update_ms <= 0 {
        return true;
    }
    (now_ms - last_update_ms) as f64 >= interval_hours * MS_PER_HOUR
}

/// Time left until the next refresh is due, clamped at zero.
pub fn time_remaining(last_update_ms: i64, interval_hours: f64) -> Duration {
    time_remaining_at(now_ms(), last_update_ms, interval_hours)
}

pub fn time_remaining_at(now_ms: i64, last_update_ms: i64, interval_hours: f64) -> Duration {
    if is_due_at(now_ms, last_update_ms, interval_hours) {
        return Duration::ZERO;
    }
    let remaining = interval_hours * MS_PER_HOUR - (now_ms - last_update_ms) as f64;
    Duration::from_millis(remaining.max(0.0) as u64)
}

/// Startup check: fetch when nothing is held yet or the held list is past
/// the warm-up threshold.
pub fn should_fetch_on_start(team_count: usize, last_update_ms: i64) -> bool {
    team_count == 0 || is_due(last_update_ms, WARMUP_INTERVAL_HOURS)
}

/// "Next update in 7h 59m". Partial minutes round down.
pub fn format_countdown(remaining: Duration) -> String {
    let total_minutes = remaining.as_secs() / 60;
    format!("Next update in {}h {}m", total_minutes / 60, total_minutes % 60)
}

/// Counts outstanding fetches. Scheduler triggers only start one when nothing
/// is in flight; manual refreshes always go through and queue behind it.
#[derive(Debug, Clone, Default)]
pub struct FetchGuard(Arc<AtomicUsize>);

impl FetchGuard {
    /// Claim the slot. Returns false if a fetch is already in flight.
    pub fn try_begin(&self) -> bool {
        self.0.compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire).is_ok()
    }

    pub fn begin_forced(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    pub fn finish(&self) {
        if self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_err()
        {
            warn!("fetch finished with nothing in flight; unmatched begin/finish");
        }
    }

    pub fn in_flight(&self) -> bool {
        self.0.load(Ordering::Acquire) > 0
    }
}

/// Owns the periodic tick task. Each tick asks the event loop to re-check
/// staleness; the decision itself is made against the app's last update.
pub struct RefreshScheduler {
    ui_events: mpsc::Sender<UiEvent>,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new(ui_events: mpsc::Sender<UiEvent>) -> Self {
        Self { ui_events, period: TICK_PERIOD, task: None }
    }

    pub fn spawn(&mut self) {
        self.stop();
        let ui_events = self.ui_events.clone();
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut ticks = interval(period);
            // Skip the immediate first tick so startup loading isn't double-triggered.
            ticks.tick().await;

            loop {
                ticks.tick().await;
                if ui_events.send(UiEvent::RefreshTick).await.is_err() {
                    break;
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
