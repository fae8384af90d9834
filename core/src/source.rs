use crate::admin::{MembershipRequest, RankingEntry};
use crate::bracket::{Bracket, BracketError, Pair, PairId, Round};
use crate::standings::Zone;
use crate::{Association, Tournament};
use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

pub type DataResult<T> = Result<T, DataError>;

const EMBEDDED_SNAPSHOT: &str = include_str!("../fixtures/association.json");

/// Where the association snapshot comes from.
///
/// Fallback chain:
/// 1) an explicit JSON file (`PADELTUI_DATA_JSON`, resolved by the caller).
/// 2) the snapshot compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct DataSource {
    path: Option<PathBuf>,
}

impl DataSource {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn embedded() -> Self {
        Self { path: None }
    }

    pub fn describe(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => "built-in snapshot".to_string(),
        }
    }

    /// Modification time of the snapshot file. `None` for the built-in
    /// snapshot or when the platform does not report one.
    pub async fn modified(&self) -> Option<SystemTime> {
        let path = self.path.as_ref()?;
        tokio::fs::metadata(path).await.ok()?.modified().ok()
    }

    pub async fn load(&self) -> DataResult<Association> {
        match &self.path {
            Some(path) => {
                debug!("reading snapshot from {}", path.display());
                let content = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| DataError::Read { path: path.clone(), source })?;
                parse_association(&content)
            }
            None => parse_association(EMBEDDED_SNAPSHOT),
        }
    }
}

#[derive(Debug)]
pub enum DataError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    UnknownPair { tournament: String, pair: PairId },
    InvalidBracket { tournament: String, source: BracketError },
    InvalidZoneMatch { tournament: String, zone: String, source: BracketError },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Read { path, source } => {
                write!(f, "could not read {}: {source}", path.display())
            }
            DataError::Parse(e) => write!(f, "invalid snapshot json: {e}"),
            DataError::UnknownPair { tournament, pair } => {
                write!(f, "tournament {tournament} references unknown pair {pair}")
            }
            DataError::InvalidBracket { tournament, source } => {
                write!(f, "tournament {tournament} has an invalid bracket: {source}")
            }
            DataError::InvalidZoneMatch { tournament, zone, source } => {
                write!(f, "tournament {tournament}, zone {zone}: {source}")
            }
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Read { source, .. } => Some(source),
            DataError::Parse(e) => Some(e),
            DataError::InvalidBracket { source, .. } | DataError::InvalidZoneMatch { source, .. } => {
                Some(source)
            }
            DataError::UnknownPair { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    name: String,
    #[serde(default)]
    pairs: Vec<Pair>,
    #[serde(default)]
    tournaments: Vec<SnapshotTournament>,
    #[serde(default)]
    membership_requests: Vec<MembershipRequest>,
    #[serde(default)]
    rankings: Vec<RankingEntry>,
}

#[derive(Debug, Deserialize)]
struct SnapshotTournament {
    id: String,
    name: String,
    category: String,
    #[serde(default)]
    venue: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(default = "default_qualifiers")]
    qualifiers_per_zone: usize,
    #[serde(default)]
    zones: Vec<Zone>,
    /// Knockout rounds, earliest first. Empty until the bracket is generated.
    #[serde(default)]
    rounds: Vec<Round>,
}

fn default_qualifiers() -> usize {
    2
}

// ---------------------------------------------------------------------------
// Mapping: snapshot → domain types
// ---------------------------------------------------------------------------

pub fn parse_association(json: &str) -> DataResult<Association> {
    let raw: SnapshotFile = serde_json::from_str(json).map_err(DataError::Parse)?;
    let known: HashSet<&PairId> = raw.pairs.iter().map(|p| &p.id).collect();

    let tournaments = raw
        .tournaments
        .into_iter()
        .map(|t| map_tournament(t, &known))
        .collect::<DataResult<Vec<_>>>()?;

    Ok(Association {
        name: raw.name,
        pairs: raw.pairs.clone(),
        tournaments,
        membership_requests: raw.membership_requests,
        rankings: raw.rankings,
    })
}

fn map_tournament(raw: SnapshotTournament, known: &HashSet<&PairId>) -> DataResult<Tournament> {
    let zone_pairs = raw.zones.iter().flat_map(|z| {
        z.pairs
            .iter()
            .chain(z.matches.iter().flat_map(|m| m.slots.iter().filter_map(|s| s.pair())))
    });
    let bracket_pairs = raw
        .rounds
        .iter()
        .flat_map(|r| r.matches.iter())
        .flat_map(|m| m.slots.iter().filter_map(|s| s.pair()));

    if let Some(unknown) = zone_pairs.chain(bracket_pairs).find(|p| !known.contains(p)) {
        return Err(DataError::UnknownPair {
            tournament: raw.id.clone(),
            pair: unknown.clone(),
        });
    }

    for zone in &raw.zones {
        if let Err(source) = zone.matches.iter().try_for_each(|m| m.validate()) {
            return Err(DataError::InvalidZoneMatch {
                tournament: raw.id.clone(),
                zone: zone.name.clone(),
                source,
            });
        }
    }

    let bracket = Bracket::new(raw.rounds).map_err(|source| DataError::InvalidBracket {
        tournament: raw.id.clone(),
        source,
    })?;

    Ok(Tournament {
        id: raw.id,
        name: raw.name,
        category: raw.category,
        venue: raw.venue,
        start_date: raw.start_date,
        end_date: raw.end_date,
        qualifiers_per_zone: raw.qualifiers_per_zone,
        zones: raw.zones,
        bracket,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::{MatchStatus, Side};
    use crate::standings::{PointsRule, qualifiers};

    const MINIMAL: &str = r#"{
        "name": "Club",
        "pairs": [
            {"id": "a", "players": ["A One", "A Two"]},
            {"id": "b", "players": ["B One", "B Two"]}
        ],
        "tournaments": [{
            "id": "t1",
            "name": "Open",
            "category": "4ta",
            "start_date": "2026-10-01",
            "end_date": "2026-10-03",
            "rounds": [{
                "name": "Final",
                "matches": [{
                    "id": "F",
                    "slots": [{"pair": "a"}, {"pair": "b"}],
                    "scores": [[6, 6], [4, 2]],
                    "status": "finished",
                    "winner": "one"
                }]
            }]
        }]
    }"#;

    #[test]
    fn test_parse_minimal_snapshot() {
        let assoc = parse_association(MINIMAL).unwrap();
        let t = &assoc.tournaments[0];
        assert_eq!(t.qualifiers_per_zone, 2);
        assert_eq!(t.bracket.champion(), Some(&PairId::new("a")));
        assert!(assoc.membership_requests.is_empty());
    }

    #[test]
    fn test_unknown_pair_is_rejected() {
        let json = MINIMAL.replace(r#"{"pair": "b"}"#, r#"{"pair": "zz"}"#);
        let err = parse_association(&json).unwrap_err();
        assert!(matches!(err, DataError::UnknownPair { ref pair, .. } if pair.as_str() == "zz"));
    }

    #[test]
    fn test_inconsistent_winner_is_rejected() {
        let json = MINIMAL.replace(r#""winner": "one""#, r#""winner": "two""#);
        let err = parse_association(&json).unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidBracket { source: BracketError::WinnerContradictsScore { .. }, .. }
        ));
        assert!(err.to_string().contains("t1"));
    }

    const ZONED: &str = r#"{
        "name": "Club",
        "pairs": [
            {"id": "a", "players": ["A One", "A Two"]},
            {"id": "b", "players": ["B One", "B Two"]}
        ],
        "tournaments": [{
            "id": "t2",
            "name": "Zonal",
            "category": "4ta",
            "start_date": "2026-10-01",
            "end_date": "2026-10-03",
            "zones": [{
                "name": "Zone A",
                "pairs": ["a", "b"],
                "matches": [{
                    "id": "ZA-1",
                    "slots": [{"pair": "a"}, {"pair": "b"}],
                    "scores": [[6, 6], [0, 0]],
                    "status": "finished",
                    "winner": "one"
                }]
            }]
        }]
    }"#;

    #[test]
    fn test_zone_matches_are_validated() {
        assert!(parse_association(ZONED).is_ok());

        // 6-0 6-0 to pair a, but recorded as a win for pair b.
        let json = ZONED.replace(r#""winner": "one""#, r#""winner": "two""#);
        let err = parse_association(&json).unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidZoneMatch {
                source: BracketError::WinnerContradictsScore { .. },
                ..
            }
        ));
        let message = err.to_string();
        assert!(message.contains("t2") && message.contains("Zone A"));

        let json = ZONED.replace(r#""status": "finished""#, r#""status": "pending""#);
        assert!(matches!(
            parse_association(&json),
            Err(DataError::InvalidZoneMatch { source: BracketError::WinnerWithoutFinish { .. }, .. })
        ));

        let json = ZONED.replace("[[6, 6], [0, 0]]", "[[6, 6], [0]]");
        assert!(matches!(
            parse_association(&json),
            Err(DataError::InvalidZoneMatch { source: BracketError::ScoreLengthMismatch { .. }, .. })
        ));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        assert!(matches!(parse_association("{"), Err(DataError::Parse(_))));
    }

    #[test]
    fn test_embedded_snapshot_is_consistent() {
        let assoc = parse_association(EMBEDDED_SNAPSHOT).unwrap();
        assert!(!assoc.tournaments.is_empty());
        assert!(assoc.tournaments.iter().any(|t| t.bracket.is_empty()));

        // The seeded bracket agrees with the zone tables it came from.
        let open = assoc.tournament("otono-2026").unwrap();
        let qualified = qualifiers(&open.zones, PointsRule::default(), open.qualifiers_per_zone);
        let seeded = crate::standings::seed_bracket(&qualified).unwrap();
        for (seeded, stored) in seeded.rounds()[0].matches.iter().zip(&open.bracket.rounds()[0].matches) {
            assert_eq!(seeded.slots, stored.slots);
        }
        let first = &open.bracket.rounds()[0].matches[0];
        assert_eq!(first.status, MatchStatus::Finished);
        assert_eq!(first.winner, Some(Side::One));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let source = DataSource::new(Some(PathBuf::from("/definitely/not/here.json")));
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, DataError::Read { .. }));
        assert!(source.describe().ends_with("here.json"));
    }

    #[tokio::test]
    async fn test_embedded_has_no_modification_time() {
        assert!(DataSource::embedded().modified().await.is_none());
    }

    #[tokio::test]
    async fn test_load_embedded() {
        let assoc = DataSource::embedded().load().await.unwrap();
        assert_eq!(assoc.name, "Club de Pádel Los Álamos");
    }
}
