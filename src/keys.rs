use crate::app::{App, queue_fetch};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    match (key_event.code, key_event.modifiers) {
        // Quit
        (Char('q'), _) | (Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Manual refresh bypasses the staleness check
        (Char('r'), _) => {
            let trigger = guard.request_manual_refresh();
            drop(guard);
            queue_fetch(app, network_requests, trigger).await;
        }

        (Char('?'), _) => guard.toggle_help(),
        (KeyCode::Esc, _) => {
            guard.state.show_help = false;
            guard.dismiss_notification();
        }
        (Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }
}
