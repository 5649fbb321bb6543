use crate::state::store::default_state_path;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub log_level: LevelFilter,
    pub state_path: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self { log_level: LevelFilter::Info, state_path: default_state_path() }
    }
}

impl AppSettings {
    /// Defaults, with `CFPBRACKET_LOG` overriding the log level.
    pub fn load() -> Self {
        let mut settings = Self::default();
        if let Some(level) = std::env::var("CFPBRACKET_LOG")
            .ok()
            .and_then(|raw| parse_level(&raw))
        {
            settings.log_level = level;
        }
        settings
    }
}

fn parse_level(raw: &str) -> Option<LevelFilter> {
    raw.trim().parse::<LevelFilter>().ok()
}
