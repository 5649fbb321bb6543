/// ESPN API raw wire types: serde shapes for deserializing the rankings feed.
/// The feed has no fixed schema across polls and seasons, so every field is
/// optional and a field of the wrong JSON type reads as absent instead of
/// rejecting its entry. These map to the clean `Team` type in client.rs.
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Either the expected shape or anything else.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

/// Field adapter: null, missing and wrongly-typed values all become `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<Lenient<T>>::deserialize(deserializer)? {
        Some(Lenient::Valid(value)) => Some(value),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Rankings  (site v2 API)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RankingsResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub rankings: Option<Vec<RawRankingList>>,
}

impl RankingsResponse {
    /// Every well-formed poll, in payload order.
    pub fn into_lists(self) -> Vec<RankingList> {
        self.rankings
            .unwrap_or_default()
            .into_iter()
            .filter_map(|list| match list {
                RawRankingList::List(list) => Some(list),
                RawRankingList::Unrecognized(_) => None,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum RawRankingList {
    List(RankingList),
    Unrecognized(IgnoredAny),
}

/// One labeled poll ("AP Top 25", "CFP Rankings", ...).
#[derive(Debug, Deserialize, Default, Clone)]
pub struct RankingList {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(rename = "shortName", default, deserialize_with = "lenient")]
    pub short_name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub poll_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ranks: Option<Vec<RawRankEntry>>,
}

impl RankingList {
    /// Label used for poll selection: `name`, else `shortName`, else empty.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.short_name.as_deref())
            .unwrap_or("")
    }
}

/// A single poll entry. Most entries nest team metadata under `team`; some
/// older polls inline it on the entry itself. Anything else is kept as
/// `Unrecognized` so one malformed entry never rejects the whole payload.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum RawRankEntry {
    Nested(NestedEntry),
    Flat(FlatEntry),
    Unrecognized(IgnoredAny),
}

#[derive(Debug, Deserialize, Clone)]
pub struct NestedEntry {
    pub current: Option<Scalar>,
    pub rank: Option<Scalar>,
    #[serde(rename = "recordSummary", default, deserialize_with = "lenient")]
    pub record_summary: Option<String>,
    pub team: RawTeam,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FlatEntry {
    pub current: Option<Scalar>,
    pub rank: Option<Scalar>,
    #[serde(rename = "recordSummary", default, deserialize_with = "lenient")]
    pub record_summary: Option<String>,
    #[serde(flatten)]
    pub team: RawTeam,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawTeam {
    pub id: Option<Scalar>,
    pub uid: Option<Scalar>,
    #[serde(rename = "displayName", default, deserialize_with = "lenient")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub abbreviation: Option<String>,
    #[serde(rename = "shortDisplayName", default, deserialize_with = "lenient")]
    pub short_display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub logos: Option<Vec<RawLogo>>,
    #[serde(default, deserialize_with = "lenient")]
    pub logo: Option<String>,
    pub record: Option<RawRecord>,
}

impl RawTeam {
    /// `href`, else `url`, of the first logo.
    pub fn first_logo(&self) -> [Option<&str>; 2] {
        match self.logos.as_deref().and_then(<[_]>::first) {
            Some(RawLogo::Object { href, url }) => [href.as_deref(), url.as_deref()],
            Some(RawLogo::Href(href)) => [Some(href.as_str()), None],
            Some(RawLogo::Unrecognized(_)) | None => [None, None],
        }
    }
}

/// Logo entries are usually `{ "href": ... }`; some feeds send bare URLs.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum RawLogo {
    Object {
        #[serde(default, deserialize_with = "lenient")]
        href: Option<String>,
        #[serde(default, deserialize_with = "lenient")]
        url: Option<String>,
    },
    Href(String),
    Unrecognized(IgnoredAny),
}

/// Team records arrive either as a bare summary or as `{ "summary": ... }`.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum RawRecord {
    Summary(String),
    Detailed {
        #[serde(default, deserialize_with = "lenient")]
        summary: Option<String>,
    },
    Unrecognized(IgnoredAny),
}

impl RawRecord {
    pub fn summary(&self) -> Option<&str> {
        match self {
            RawRecord::Summary(s) => Some(s.as_str()),
            RawRecord::Detailed { summary } => summary.as_deref(),
            RawRecord::Unrecognized(_) => None,
        }
    }
}

/// A JSON scalar whose type the feed does not keep stable: ids come as
/// numbers or strings, ranks occasionally as numeric strings.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl Scalar {
    /// Poll position. Negative values clamp to 0 so the entry gets filtered;
    /// fractional or non-numeric values are treated as absent.
    pub fn as_rank(&self) -> Option<u32> {
        let n = match self {
            Scalar::Int(n) => *n,
            Scalar::Float(f) if f.is_finite() && f.fract() == 0.0 => *f as i64,
            Scalar::Text(s) => s.trim().parse::<i64>().ok()?,
            _ => return None,
        };
        Some(u32::try_from(n.max(0)).unwrap_or(u32::MAX))
    }

    pub fn as_id(&self) -> Option<String> {
        match self {
            Scalar::Int(n) => Some(n.to_string()),
            Scalar::Float(f) if f.is_finite() && f.fract() == 0.0 => Some((*f as i64).to_string()),
            Scalar::Float(f) if f.is_finite() => Some(f.to_string()),
            Scalar::Text(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
            _ => None,
        }
    }
}

impl RawRankEntry {
    /// Split into the entry-level fields and the team metadata, whichever
    /// shape the entry arrived in.
    pub fn parts(&self) -> Option<(EntryFields<'_>, &RawTeam)> {
        match self {
            RawRankEntry::Nested(e) => Some((
                EntryFields {
                    current: e.current.as_ref(),
                    rank: e.rank.as_ref(),
                    record_summary: e.record_summary.as_deref(),
                },
                &e.team,
            )),
            RawRankEntry::Flat(e) => Some((
                EntryFields {
                    current: e.current.as_ref(),
                    rank: e.rank.as_ref(),
                    record_summary: e.record_summary.as_deref(),
                },
                &e.team,
            )),
            RawRankEntry::Unrecognized(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EntryFields<'a> {
    pub current: Option<&'a Scalar>,
    pub rank: Option<&'a Scalar>,
    pub record_summary: Option<&'a str>,
}
