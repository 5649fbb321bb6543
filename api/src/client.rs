use crate::espn::{RankingList, RankingsResponse, RawRankEntry};
use crate::{PLAYOFF_FIELD_SIZE, Team, UNKNOWN_TEAM};
use chrono::Utc;
use log::debug;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const ESPN_SITE_V2: &str = "https://site.api.espn.com";
const RANKINGS_PATH: &str = "/apis/site/v2/sports/football/college-football/rankings/4";

/// Entries read from the chosen poll. Anything past the playoff field is
/// shown as "left out".
pub const MAX_RANK_ENTRIES: usize = 20;

/// College football rankings client backed by ESPN's public endpoints.
#[derive(Debug, Clone)]
pub struct CfpApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for CfpApi {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("cfpbracket/0.1 (terminal bracket viewer)")
                .build()
                .unwrap_or_default(),
            base_url: ESPN_SITE_V2.to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout, body read).
    Network(reqwest::Error, String),
    HttpStatus { code: u16, message: String, url: String },
    Parsing(serde_json::Error, String),
    NoData,
    InsufficientData { got: usize, need: usize },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::HttpStatus { code, message, url } => {
                write!(f, "Failed to fetch rankings from {url}: {code} {message}")
            }
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NoData => write!(f, "No rankings data available"),
            ApiError::InsufficientData { got, need } => {
                write!(f, "Not enough ranked teams: got {got}, need {need}")
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) => Some(e),
            ApiError::Parsing(e, _) => Some(e),
            _ => None,
        }
    }
}

impl CfpApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same client pointed at another host, e.g. a local mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            ..Self::default()
        }
    }

    /// Fetch the current poll and normalize it into at least
    /// `PLAYOFF_FIELD_SIZE` valid teams, in poll order.
    ///
    /// Poll selection:
    /// 1) a list labeled "playoff" or "cfp"
    /// 2) a list labeled "ap" or "associated press"
    /// 3) the first list in the payload
    ///
    /// No retries; the caller decides when to try again.
    pub async fn fetch_rankings(&self) -> ApiResult<Vec<Team>> {
        let url = format!("{}{RANKINGS_PATH}", self.base_url);
        let raw: RankingsResponse = self.get(&url).await?;

        let list = select_ranking_list(raw.into_lists())?;
        debug!(
            "selected poll '{}' (type {:?}) with {} entries",
            list.label(),
            list.poll_type,
            list.ranks.as_ref().map(Vec::len).unwrap_or(0)
        );

        normalize_teams(&list.ranks.unwrap_or_default())
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        // Cache-buster so intermediate caches never serve a stale poll.
        let busted = format!("{url}?_={}", Utc::now().timestamp_millis());
        let response = self
            .client
            .get(&busted)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                code: status.as_u16(),
                message: status.canonical_reason().unwrap_or_default().to_owned(),
                url: url.to_owned(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;
        serde_json::from_str(&body).map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Mapping: ESPN wire types → clean domain types
// ---------------------------------------------------------------------------

/// Pick the authoritative poll. First match wins.
pub fn select_ranking_list(mut lists: Vec<RankingList>) -> ApiResult<RankingList> {
    if lists.is_empty() {
        return Err(ApiError::NoData);
    }

    let label_matches = |list: &RankingList, needles: &[&str]| {
        let label = list.label().to_lowercase();
        needles.iter().any(|n| label.contains(n))
    };

    if let Some(idx) = lists.iter().position(|l| label_matches(l, &["playoff", "cfp"])) {
        return Ok(lists.swap_remove(idx));
    }

    if let Some(idx) = lists.iter().position(|l| label_matches(l, &["ap", "associated press"])) {
        return Ok(lists.swap_remove(idx));
    }

    Ok(lists.swap_remove(0))
}

/// Map at most `MAX_RANK_ENTRIES` raw entries, drop invalid ones and require
/// a full playoff field. Relative poll order is preserved.
pub fn normalize_teams(entries: &[RawRankEntry]) -> ApiResult<Vec<Team>> {
    let teams: Vec<Team> = entries
        .iter()
        .take(MAX_RANK_ENTRIES)
        .map(map_rank_entry)
        .filter(Team::is_valid)
        .collect();

    if teams.len() < PLAYOFF_FIELD_SIZE {
        return Err(ApiError::InsufficientData {
            got: teams.len(),
            need: PLAYOFF_FIELD_SIZE,
        });
    }
    Ok(teams)
}

/// Total mapping from a raw entry to a `Team`; never fails. Every field
/// resolves through its chain of alternatives, empty strings counting as
/// absent.
pub fn map_rank_entry(entry: &RawRankEntry) -> Team {
    let Some((fields, team)) = entry.parts() else {
        return Team {
            rank: 0,
            name: UNKNOWN_TEAM.to_owned(),
            ..Team::default()
        };
    };

    let rank = fields
        .current
        .and_then(|s| s.as_rank())
        .or_else(|| fields.rank.and_then(|s| s.as_rank()))
        .unwrap_or(0);

    let name = first_present([
        team.display_name.as_deref(),
        team.name.as_deref(),
        team.location.as_deref(),
    ])
    .unwrap_or(UNKNOWN_TEAM);

    let abbreviation =
        first_present([team.abbreviation.as_deref(), team.short_display_name.as_deref()])
            .unwrap_or_default();

    let [href, url] = team.first_logo();
    let logo_url = first_present([href, url, team.logo.as_deref()])
    .unwrap_or_default();

    let id = team
        .id
        .as_ref()
        .and_then(|s| s.as_id())
        .or_else(|| team.uid.as_ref().and_then(|s| s.as_id()))
        .or_else(|| (rank > 0).then(|| rank.to_string()))
        .unwrap_or_default();

    let record_summary = first_present([
        fields.record_summary,
        team.record.as_ref().and_then(|r| r.summary()),
    ])
    .unwrap_or_default();

    Team {
        rank,
        name: name.to_owned(),
        abbreviation: abbreviation.to_owned(),
        logo_url: logo_url.to_owned(),
        id,
        record_summary: record_summary.to_owned(),
    }
}

fn first_present<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::{Value, json};

    fn entry(value: Value) -> RawRankEntry {
        serde_json::from_value(value).expect("raw entries always deserialize")
    }

    fn ranks(count: u32) -> Vec<Value> {
        (1..=count)
            .map(|n| {
                json!({
                    "current": n,
                    "recordSummary": format!("{}-{}", 13 - n.min(12), n.min(12)),
                    "team": {
                        "id": (1000 + n).to_string(),
                        "displayName": format!("School {n}"),
                        "abbreviation": format!("S{n}"),
                        "logos": [{"href": format!("https://a.espncdn.com/{n}.png")}]
                    }
                })
            })
            .collect()
    }

    fn poll(name: &str, count: u32) -> Value {
        json!({ "name": name, "ranks": ranks(count) })
    }

    fn lists(value: Value) -> Vec<RankingList> {
        serde_json::from_value::<RankingsResponse>(value).unwrap().into_lists()
    }

    // -----------------------------------------------------------------------
    // Poll selection
    // -----------------------------------------------------------------------

    #[test]
    fn playoff_list_wins_even_when_listed_after_ap() {
        let raw = lists(json!({ "rankings": [
            poll("AP Top 25", 25),
            poll("AFCA Coaches Poll", 25),
            poll("CFP Playoff Rankings", 25),
        ]}));
        assert_eq!(select_ranking_list(raw).unwrap().label(), "CFP Playoff Rankings");
    }

    #[test]
    fn cfp_match_is_case_insensitive() {
        let raw = lists(json!({ "rankings": [poll("AP Top 25", 1), poll("cfp rankings", 1)] }));
        assert_eq!(select_ranking_list(raw).unwrap().label(), "cfp rankings");
    }

    #[test]
    fn ap_list_is_the_fallback() {
        let raw = lists(json!({ "rankings": [
            poll("Coaches Poll", 25),
            poll("The Associated Press Top 25", 25),
        ]}));
        assert_eq!(select_ranking_list(raw).unwrap().label(), "The Associated Press Top 25");
    }

    #[test]
    fn first_list_when_nothing_matches() {
        let raw = lists(json!({ "rankings": [poll("Coaches Poll", 25), poll("FCS Poll", 25)] }));
        assert_eq!(select_ranking_list(raw).unwrap().label(), "Coaches Poll");
    }

    #[test]
    fn empty_or_missing_rankings_is_no_data() {
        assert!(matches!(select_ranking_list(lists(json!({ "rankings": [] }))), Err(ApiError::NoData)));
        assert!(matches!(select_ranking_list(lists(json!({}))), Err(ApiError::NoData)));
    }

    #[test]
    fn malformed_list_does_not_hide_the_playoff_list() {
        let raw = lists(json!({ "rankings": [
            { "name": 25, "ranks": [] },
            { "name": "AP Top 25", "type": 1, "ranks": "none" },
            "not a list",
            poll("CFP Rankings", 12),
        ]}));
        assert_eq!(raw.len(), 3);
        let list = select_ranking_list(raw).unwrap();
        assert_eq!(list.label(), "CFP Rankings");
        assert_eq!(normalize_teams(&list.ranks.unwrap_or_default()).unwrap().len(), 12);
    }

    #[test]
    fn non_array_rankings_is_no_data() {
        let raw = lists(json!({ "rankings": { "name": "CFP Rankings" } }));
        assert!(matches!(select_ranking_list(raw), Err(ApiError::NoData)));
    }

    // -----------------------------------------------------------------------
    // Entry mapping
    // -----------------------------------------------------------------------

    #[test]
    fn well_formed_entry_maps_every_field() {
        let team = map_rank_entry(&entry(json!({
            "current": 2,
            "rank": 9,
            "recordSummary": "11-1",
            "team": {
                "id": 61,
                "uid": "s:20~l:23~t:61",
                "displayName": "Georgia Bulldogs",
                "name": "Bulldogs",
                "abbreviation": "UGA",
                "logos": [{"href": "https://a.espncdn.com/61.png"}],
                "logo": "https://elsewhere/61.png"
            }
        })));
        assert_eq!(
            team,
            Team {
                rank: 2,
                name: "Georgia Bulldogs".into(),
                abbreviation: "UGA".into(),
                logo_url: "https://a.espncdn.com/61.png".into(),
                id: "61".into(),
                record_summary: "11-1".into(),
            }
        );
    }

    #[test]
    fn missing_fields_fall_back_without_failing() {
        let team = map_rank_entry(&entry(json!({ "current": 5, "team": {} })));
        assert_eq!(team.rank, 5);
        assert_eq!(team.name, UNKNOWN_TEAM);
        assert_eq!(team.abbreviation, "");
        assert_eq!(team.logo_url, "");
        assert_eq!(team.id, "5");
        assert_eq!(team.record_summary, "");
    }

    #[test]
    fn name_falls_back_through_name_then_location() {
        let by_name = map_rank_entry(&entry(json!({ "current": 1, "team": { "displayName": "", "name": "Longhorns", "location": "Texas" } })));
        let by_location = map_rank_entry(&entry(json!({ "current": 1, "team": { "location": "Texas" } })));
        assert_eq!(by_name.name, "Longhorns");
        assert_eq!(by_location.name, "Texas");
    }

    #[test]
    fn rank_falls_back_to_rank_field() {
        let team = map_rank_entry(&entry(json!({ "rank": 7, "team": { "name": "Tennessee" } })));
        assert_eq!(team.rank, 7);
        let team = map_rank_entry(&entry(json!({ "team": { "name": "Tennessee" } })));
        assert_eq!(team.rank, 0);
    }

    #[test]
    fn id_falls_back_through_uid_then_rank() {
        let by_uid = map_rank_entry(&entry(json!({ "current": 3, "team": { "uid": "s:20~t:251" } })));
        let by_rank = map_rank_entry(&entry(json!({ "current": 3, "team": {} })));
        let empty = map_rank_entry(&entry(json!({ "team": {} })));
        assert_eq!(by_uid.id, "s:20~t:251");
        assert_eq!(by_rank.id, "3");
        assert_eq!(empty.id, "");
    }

    #[test]
    fn logo_and_abbreviation_alternatives() {
        let team = map_rank_entry(&entry(json!({
            "current": 4,
            "team": {
                "shortDisplayName": "Penn St",
                "logos": [{"url": "https://cdn/psu.png"}],
            }
        })));
        assert_eq!(team.abbreviation, "Penn St");
        assert_eq!(team.logo_url, "https://cdn/psu.png");

        let team = map_rank_entry(&entry(json!({ "current": 4, "team": { "logos": [], "logo": "https://cdn/single.png" } })));
        assert_eq!(team.logo_url, "https://cdn/single.png");
    }

    #[test]
    fn record_falls_back_to_team_record() {
        let team = map_rank_entry(&entry(json!({ "current": 8, "team": { "name": "Indiana", "record": { "summary": "11-1" } } })));
        assert_eq!(team.record_summary, "11-1");
        let team = map_rank_entry(&entry(json!({ "current": 8, "team": { "name": "Indiana", "record": "10-2" } })));
        assert_eq!(team.record_summary, "10-2");
    }

    #[test]
    fn flat_and_unrecognized_entries_map_totally() {
        let flat = map_rank_entry(&entry(json!({ "current": "9", "displayName": "Boise State", "id": 68 })));
        assert_eq!((flat.rank, flat.name.as_str(), flat.id.as_str()), (9, "Boise State", "68"));

        let junk = map_rank_entry(&entry(json!("not an entry")));
        assert!(!junk.is_valid());
    }

    #[test]
    fn wrongly_typed_fields_only_blank_themselves() {
        let team = map_rank_entry(&entry(json!({
            "current": 3,
            "team": { "displayName": "Texas Longhorns", "logos": ["https://x/t.png"] }
        })));
        assert_eq!((team.rank, team.name.as_str()), (3, "Texas Longhorns"));
        assert_eq!(team.logo_url, "https://x/t.png");

        let team = map_rank_entry(&entry(json!({
            "current": 3,
            "team": { "displayName": "Texas Longhorns", "abbreviation": 7, "shortDisplayName": "Texas" }
        })));
        assert_eq!((team.rank, team.name.as_str()), (3, "Texas Longhorns"));
        assert_eq!(team.abbreviation, "Texas");

        let team = map_rank_entry(&entry(json!({
            "current": 3,
            "recordSummary": 11,
            "team": { "id": 251, "displayName": "Texas Longhorns", "record": { "summary": "11-2" } }
        })));
        assert_eq!(
            (team.rank, team.name.as_str(), team.id.as_str()),
            (3, "Texas Longhorns", "251")
        );
        assert_eq!(team.record_summary, "11-2");
    }

    #[test]
    fn wrongly_typed_logo_shapes_fall_through() {
        let team = map_rank_entry(&entry(json!({
            "current": 6,
            "team": { "displayName": "Ohio State Buckeyes", "logos": [{ "href": 1, "url": "https://cdn/osu.png" }] }
        })));
        assert_eq!(team.logo_url, "https://cdn/osu.png");

        let team = map_rank_entry(&entry(json!({
            "current": 6,
            "team": { "displayName": "Ohio State Buckeyes", "logos": "oops", "logo": "https://cdn/single.png" }
        })));
        assert_eq!(team.logo_url, "https://cdn/single.png");

        let team = map_rank_entry(&entry(json!({
            "current": 6,
            "team": { "displayName": "Ohio State Buckeyes", "logos": [null], "name": false }
        })));
        assert_eq!((team.name.as_str(), team.logo_url.as_str()), ("Ohio State Buckeyes", ""));
    }

    #[test]
    fn oddly_typed_fields_do_not_shrink_the_field() {
        let mut raw = ranks(12);
        raw[0]["team"]["logos"] = json!(["https://x/1.png"]);
        raw[1]["team"]["abbreviation"] = json!(7);
        raw[2]["recordSummary"] = json!(11);
        raw[3]["team"]["location"] = json!({ "city": "Austin" });
        let entries: Vec<RawRankEntry> = raw.into_iter().map(entry).collect();
        let teams = normalize_teams(&entries).unwrap();
        assert_eq!(teams.len(), 12);
        assert_eq!(teams[1].abbreviation, "");
        assert_eq!(teams[2].record_summary, "");
    }

    // -----------------------------------------------------------------------
    // Normalization
    // -----------------------------------------------------------------------

    #[test]
    fn zero_ranks_are_dropped_before_the_length_check() {
        let mut raw = ranks(14);
        for idx in [2, 6, 10] {
            raw[idx]["current"] = json!(0);
        }
        let entries: Vec<RawRankEntry> = raw.into_iter().map(entry).collect();
        match normalize_teams(&entries) {
            Err(ApiError::InsufficientData { got, need }) => assert_eq!((got, need), (11, 12)),
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn unknown_names_are_dropped() {
        let mut raw = ranks(13);
        raw[0]["team"] = json!({ "id": "1" });
        let entries: Vec<RawRankEntry> = raw.into_iter().map(entry).collect();
        let teams = normalize_teams(&entries).unwrap();
        assert_eq!(teams.len(), 12);
        assert_eq!(teams[0].rank, 2);
    }

    #[test]
    fn at_most_twenty_entries_are_read() {
        let entries: Vec<RawRankEntry> = ranks(25).into_iter().map(entry).collect();
        let teams = normalize_teams(&entries).unwrap();
        assert_eq!(teams.len(), MAX_RANK_ENTRIES);
        assert_eq!(teams.last().unwrap().rank, 20);
    }

    // -----------------------------------------------------------------------
    // End to end against a local server
    // -----------------------------------------------------------------------

    async fn serve(server: &mut Server, status: usize, body: String) -> mockito::Mock {
        server
            .mock("GET", RANKINGS_PATH)
            .match_query(Matcher::Regex(r"^_=\d+$".into()))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn fetch_returns_fourteen_teams_in_poll_order() {
        let mut server = Server::new_async().await;
        let body = json!({ "rankings": [
            poll("AP Top 25", 25),
            poll("CFP Playoff Rankings", 14),
        ]});
        let mock = serve(&mut server, 200, body.to_string()).await;

        let teams = CfpApi::with_base_url(server.url()).fetch_rankings().await.unwrap();

        mock.assert_async().await;
        assert_eq!(teams.len(), 14);
        assert_eq!(teams.iter().map(|t| t.rank).collect::<Vec<_>>(), (1..=14u32).collect::<Vec<_>>());
        for left_out in &teams[12..] {
            assert!(teams[..12].iter().all(|t| t.id != left_out.id && t.name != left_out.name));
        }
    }

    #[tokio::test]
    async fn fetch_is_idempotent_for_identical_payloads() {
        let mut server = Server::new_async().await;
        let body = json!({ "rankings": [poll("CFP Playoff Rankings", 16)] }).to_string();
        let _mock = server
            .mock("GET", RANKINGS_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(body)
            .expect(2)
            .create_async()
            .await;

        let api = CfpApi::with_base_url(server.url());
        let first = api.fetch_rankings().await.unwrap();
        let second = api.fetch_rankings().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_code() {
        let mut server = Server::new_async().await;
        let _mock = serve(&mut server, 503, String::new()).await;

        let err = CfpApi::with_base_url(server.url()).fetch_rankings().await.unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus { code: 503, .. }), "got {err:?}");
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn invalid_body_is_a_parse_error() {
        let mut server = Server::new_async().await;
        let _mock = serve(&mut server, 200, "<html>maintenance</html>".into()).await;

        let err = CfpApi::with_base_url(server.url()).fetch_rankings().await.unwrap_err();
        assert!(matches!(err, ApiError::Parsing(..)), "got {err:?}");
    }

    #[tokio::test]
    async fn malformed_sibling_list_is_not_a_parse_error() {
        let mut server = Server::new_async().await;
        let body = json!({ "rankings": [
            { "name": 25, "ranks": [] },
            poll("CFP Rankings", 13),
        ]});
        let _mock = serve(&mut server, 200, body.to_string()).await;

        let teams = CfpApi::with_base_url(server.url()).fetch_rankings().await.unwrap();
        assert_eq!(teams.len(), 13);
    }

    #[tokio::test]
    async fn payload_without_polls_is_no_data() {
        let mut server = Server::new_async().await;
        let _mock = serve(&mut server, 200, json!({ "rankings": [] }).to_string()).await;

        let err = CfpApi::with_base_url(server.url()).fetch_rankings().await.unwrap_err();
        assert!(matches!(err, ApiError::NoData), "got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let err = CfpApi::with_base_url("http://127.0.0.1:1").fetch_rankings().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(..)), "got {err:?}");
    }
}
