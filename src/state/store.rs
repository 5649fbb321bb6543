use cfp_api::Team;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

const STATE_DIR: &str = "cfpbracket";
const STATE_FILE: &str = "state.json";

/// The two durable entries, stored side by side in one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(rename = "cfp-teams", default)]
    teams: Vec<Team>,
    #[serde(rename = "cfp-last-update", default)]
    last_update: i64,
}

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error, PathBuf),
    Serialize(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e, path) => write!(f, "could not write {}: {e}", path.display()),
            StoreError::Serialize(e) => write!(f, "could not serialize state: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Owner of the persisted team list and last-update timestamp. Loaded once
/// at startup and written back after every successful refresh.
#[derive(Debug, Default)]
pub struct RankingsStore {
    path: Option<PathBuf>,
    state: StateFile,
}

impl RankingsStore {
    /// In-memory only; nothing is written.
    pub fn ephemeral() -> Self {
        Self::default()
    }

    /// Load from `path`. A missing file starts empty; an unreadable or
    /// corrupt one is logged and also starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<StateFile>(&raw).unwrap_or_else(|e| {
                warn!("ignoring corrupt state at {}: {e}", path.display());
                StateFile::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StateFile::default(),
            Err(e) => {
                warn!("could not read state at {}: {e}", path.display());
                StateFile::default()
            }
        };
        Self { path: Some(path), state }
    }

    pub fn teams(&self) -> &[Team] {
        &self.state.teams
    }

    /// Milliseconds since the epoch; 0 means never updated.
    pub fn last_update(&self) -> i64 {
        self.state.last_update
    }

    /// Swap in a freshly fetched list. In-memory state always advances; the
    /// returned error only reports that the write-back failed.
    pub fn replace(&mut self, teams: Vec<Team>, updated_at_ms: i64) -> Result<(), StoreError> {
        self.state = StateFile { teams, last_update: updated_at_ms };
        self.save()
    }

    fn save(&self) -> Result<(), StoreError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io(e, parent.to_path_buf()))?;
        }
        let payload = serde_json::to_string_pretty(&self.state).map_err(StoreError::Serialize)?;
        fs::write(path, payload).map_err(|e| StoreError::Io(e, path.to_path_buf()))
    }
}

/// `$CFPBRACKET_STATE`, else the XDG config dir, else `~/.config`, else the
/// working directory.
pub fn default_state_path() -> PathBuf {
    if let Ok(path) = std::env::var("CFPBRACKET_STATE")
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return PathBuf::from(config_dir).join(STATE_DIR).join(STATE_FILE);
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home).join(".config").join(STATE_DIR).join(STATE_FILE);
    }
    PathBuf::from("cfpbracket_state.json")
}
