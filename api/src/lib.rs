pub mod client;
pub mod espn;

use serde::{Deserialize, Serialize};

/// Number of seeded slots in the playoff bracket.
pub const PLAYOFF_FIELD_SIZE: usize = 12;

/// Seeds 1-4 skip the first round.
pub const BYE_COUNT: usize = 4;

/// Sentinel name for an entry whose team could not be resolved.
/// Never survives normalization.
pub const UNKNOWN_TEAM: &str = "Unknown Team";

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of ESPN wire format
// ---------------------------------------------------------------------------

/// A normalized poll entry. Built once per fetch and never patched; a refresh
/// replaces the whole sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub rank: u32,
    pub name: String,
    pub abbreviation: String,
    #[serde(default)]
    pub logo_url: String,
    /// Best-effort identifier. May collide when it falls back to the rank,
    /// so never index by it.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub record_summary: String,
}

impl Team {
    /// Both checks a normalized entry must pass to be kept.
    pub fn is_valid(&self) -> bool {
        self.rank > 0 && self.name != UNKNOWN_TEAM
    }

    pub fn label(&self) -> String {
        if self.record_summary.is_empty() {
            format!("#{} {}", self.rank, self.name)
        } else {
            format!("#{} {} ({})", self.rank, self.name, self.record_summary)
        }
    }
}

/// The twelve seeded teams, or fewer if the list is short.
pub fn playoff_field(teams: &[Team]) -> &[Team] {
    &teams[..teams.len().min(PLAYOFF_FIELD_SIZE)]
}

/// Teams ranked just outside the field, in poll order.
pub fn left_out(teams: &[Team]) -> &[Team] {
    teams.get(PLAYOFF_FIELD_SIZE..).unwrap_or_default()
}

/// Seeds that advance straight to the quarterfinals.
pub fn byes(teams: &[Team]) -> &[Team] {
    &teams[..teams.len().min(BYE_COUNT)]
}

/// First-round pairings: 5v12, 6v11, 7v10, 8v9. Empty until the field is full.
pub fn first_round_matchups(teams: &[Team]) -> Vec<(&Team, &Team)> {
    if teams.len() < PLAYOFF_FIELD_SIZE {
        return Vec::new();
    }
    (BYE_COUNT..BYE_COUNT + 4)
        .map(|high| (&teams[high], &teams[PLAYOFF_FIELD_SIZE + BYE_COUNT - 1 - high]))
        .collect()
}
