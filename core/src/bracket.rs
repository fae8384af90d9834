use chrono::{NaiveDate, NaiveTime};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type BracketResult<T> = Result<T, BracketError>;

// ---------------------------------------------------------------------------
// Pairs and slots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairId(pub String);

impl PairId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Two players competing as one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub id: PairId,
    pub players: [String; 2],
}

impl Pair {
    pub fn label(&self) -> String {
        format!("{} / {}", self.players[0], self.players[1])
    }

    /// Surnames only, for narrow match cards.
    pub fn short_label(&self) -> String {
        let surname = |name: &str| name.split_whitespace().last().unwrap_or(name).to_string();
        format!("{}/{}", surname(&self.players[0]), surname(&self.players[1]))
    }
}

/// What occupies one side of a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// The feeding match has not produced a winner yet.
    #[default]
    ToBeDecided,
    /// No opponent; the other side advances by walkover.
    Bye,
    Pair(PairId),
}

impl Slot {
    pub fn pair(&self) -> Option<&PairId> {
        match self {
            Slot::Pair(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Slot::Pair(_))
    }
}

/// Pair slot 1 or 2 of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::One, Side::Two];

    pub fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    /// The slot a match at `match_index` feeds in the next round.
    pub fn from_index(match_index: usize) -> Side {
        if match_index % 2 == 0 { Side::One } else { Side::Two }
    }
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    InProgress,
    Finished,
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "PENDING",
            MatchStatus::InProgress => "LIVE",
            MatchStatus::Finished => "FINAL",
        }
    }
}

/// Descriptive scheduling metadata. Never used for layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub court: Option<String>,
}

impl Schedule {
    pub fn summary(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(date) = self.date {
            parts.push(date.format("%d/%m").to_string());
        }
        if let Some(time) = self.time {
            parts.push(time.format("%H:%M").to_string());
        }
        if let Some(court) = &self.court {
            parts.push(court.clone());
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    #[serde(default)]
    pub slots: [Slot; 2],
    /// Games per set for slot 1 and slot 2; index = set number.
    #[serde(default)]
    pub scores: [Vec<u8>; 2],
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default)]
    pub winner: Option<Side>,
    #[serde(default)]
    pub schedule: Schedule,
}

impl Match {
    pub fn new(id: impl Into<String>, one: Slot, two: Slot) -> Self {
        Self {
            id: id.into(),
            slots: [one, two],
            ..Self::default()
        }
    }

    pub fn slot(&self, side: Side) -> &Slot {
        &self.slots[side.index()]
    }

    pub fn pair(&self, side: Side) -> Option<&PairId> {
        self.slot(side).pair()
    }

    pub fn set_count(&self) -> usize {
        self.scores[0].len().min(self.scores[1].len())
    }

    /// Side that took more games in `set`, or `None` if level or unplayed.
    pub fn set_leader(&self, set: usize) -> Option<Side> {
        let one = *self.scores[0].get(set)?;
        let two = *self.scores[1].get(set)?;
        match one.cmp(&two) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn sets_won(&self, side: Side) -> u32 {
        (0..self.set_count())
            .filter(|&set| self.set_leader(set) == Some(side))
            .count() as u32
    }

    pub fn games_won(&self, side: Side) -> u32 {
        self.scores[side.index()].iter().map(|&g| u32::from(g)).sum()
    }

    /// Side with more sets won; `None` on a tie, including no sets at all.
    pub fn leader(&self) -> Option<Side> {
        let one = self.sets_won(Side::One);
        let two = self.sets_won(Side::Two);
        match one.cmp(&two) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn is_walkover(&self) -> bool {
        matches!(
            (&self.slots[0], &self.slots[1]),
            (Slot::Pair(_), Slot::Bye) | (Slot::Bye, Slot::Pair(_))
        )
    }

    /// Winning pair of a finished match.
    pub fn winner_pair(&self) -> Option<&PairId> {
        if self.status != MatchStatus::Finished {
            return None;
        }
        self.pair(self.winner?)
    }

    pub fn validate(&self) -> BracketResult<()> {
        let (one, two) = (self.scores[0].len(), self.scores[1].len());
        if one != two {
            return Err(BracketError::ScoreLengthMismatch {
                match_id: self.id.clone(),
                one,
                two,
            });
        }

        match (self.status, self.winner) {
            (MatchStatus::Finished, Some(winner)) => {
                if !self.slot(winner).is_pair() {
                    return Err(BracketError::UndecidedSlot { match_id: self.id.clone() });
                }
                if *self.slot(winner.opponent()) == Slot::Bye {
                    return Ok(());
                }
                if self.leader() != Some(winner) {
                    return Err(BracketError::WinnerContradictsScore { match_id: self.id.clone() });
                }
                Ok(())
            }
            (_, Some(_)) => Err(BracketError::WinnerWithoutFinish { match_id: self.id.clone() }),
            (_, None) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub name: String,
    pub matches: Vec<Match>,
}

/// Conventional name for a knockout round holding `match_count` matches.
pub fn round_name(match_count: usize) -> String {
    match match_count {
        1 => "Final".to_string(),
        2 => "Semifinals".to_string(),
        4 => "Quarterfinals".to_string(),
        n => format!("Round of {}", n * 2),
    }
}

// ---------------------------------------------------------------------------
// Bracket
// ---------------------------------------------------------------------------

/// Single-elimination bracket, earliest round first.
///
/// Always well formed: every round after the first holds exactly half the
/// matches of the one before it, and every stored result agrees with its
/// scores. Zero rounds is a valid, not yet generated bracket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bracket {
    rounds: Vec<Round>,
}

impl Bracket {
    pub fn new(rounds: Vec<Round>) -> BracketResult<Self> {
        let shape: Vec<usize> = rounds.iter().map(|r| r.matches.len()).collect();
        validate_shape(&shape)?;
        for m in rounds.iter().flat_map(|r| r.matches.iter()) {
            m.validate()?;
        }
        validate_progression(&rounds)?;
        Ok(Self { rounds })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Match count per round.
    pub fn shape(&self) -> Vec<usize> {
        self.rounds.iter().map(|r| r.matches.len()).collect()
    }

    pub fn get(&self, round: usize, index: usize) -> Option<&Match> {
        self.rounds.get(round)?.matches.get(index)
    }

    fn get_mut(&mut self, round: usize, index: usize) -> BracketResult<&mut Match> {
        self.rounds
            .get_mut(round)
            .and_then(|r| r.matches.get_mut(index))
            .ok_or(BracketError::MatchNotFound { round, index })
    }

    /// Where the winner of `(round, index)` goes: next round, match, slot.
    pub fn next_slot(&self, round: usize, index: usize) -> Option<(usize, usize, Side)> {
        (round + 1 < self.rounds.len()).then(|| (round + 1, index / 2, Side::from_index(index)))
    }

    pub fn start_match(&mut self, round: usize, index: usize) -> BracketResult<()> {
        let m = self.get_mut(round, index)?;
        if !m.slots.iter().all(Slot::is_pair) {
            return Err(BracketError::UndecidedSlot { match_id: m.id.clone() });
        }
        if m.status != MatchStatus::Pending {
            return Err(BracketError::MatchAlreadyStarted { match_id: m.id.clone() });
        }
        m.status = MatchStatus::InProgress;
        debug!("match {} started", m.id);
        Ok(())
    }

    /// Store a final score, mark the match finished and move the winner into
    /// the slot it feeds in the next round. Returns the winning side.
    pub fn record_result(
        &mut self,
        round: usize,
        index: usize,
        scores: [Vec<u8>; 2],
    ) -> BracketResult<Side> {
        let next = self.next_slot(round, index);
        let current = self.get(round, index).ok_or(BracketError::MatchNotFound { round, index })?;

        if !current.slots.iter().all(Slot::is_pair) {
            return Err(BracketError::UndecidedSlot { match_id: current.id.clone() });
        }
        if scores.iter().any(Vec::is_empty) {
            return Err(BracketError::MissingScores { match_id: current.id.clone() });
        }

        let mut updated = current.clone();
        updated.scores = scores;
        updated.winner = None;
        updated.validate()?;
        let winner = updated
            .leader()
            .ok_or_else(|| BracketError::TiedScore { match_id: updated.id.clone() })?;
        let winner_pair = updated
            .pair(winner)
            .cloned()
            .ok_or_else(|| BracketError::UndecidedSlot { match_id: updated.id.clone() })?;

        if let Some((next_round, next_index, side)) = next {
            let downstream = &self.rounds[next_round].matches[next_index];
            if downstream.status != MatchStatus::Pending
                && downstream.pair(side) != Some(&winner_pair)
            {
                return Err(BracketError::DownstreamAlreadyPlayed {
                    match_id: downstream.id.clone(),
                });
            }
        }

        updated.status = MatchStatus::Finished;
        updated.winner = Some(winner);
        debug!("match {} won by {winner_pair}", updated.id);
        self.rounds[round].matches[index] = updated;

        if let Some((next_round, next_index, side)) = next {
            self.rounds[next_round].matches[next_index].slots[side.index()] = Slot::Pair(winner_pair);
        }
        Ok(winner)
    }

    /// Finish every first-round match against a bye and advance its pair.
    pub fn advance_walkovers(&mut self) {
        let Some(first) = self.rounds.first() else {
            return;
        };
        let walkovers: Vec<(usize, Side, PairId)> = first
            .matches
            .iter()
            .enumerate()
            .filter(|(_, m)| m.status == MatchStatus::Pending && m.is_walkover())
            .filter_map(|(i, m)| {
                Side::BOTH
                    .into_iter()
                    .find_map(|side| m.pair(side).map(|p| (i, side, p.clone())))
            })
            .collect();

        for (index, side, pair) in walkovers {
            let m = &mut self.rounds[0].matches[index];
            m.status = MatchStatus::Finished;
            m.winner = Some(side);
            if let Some((next_round, next_index, next_side)) = self.next_slot(0, index) {
                self.rounds[next_round].matches[next_index].slots[next_side.index()] =
                    Slot::Pair(pair);
            }
        }
    }

    /// Winner of the last round, once it has been played.
    pub fn champion(&self) -> Option<&PairId> {
        let last = self.rounds.last()?;
        match last.matches.as_slice() {
            [final_match] => final_match.winner_pair(),
            _ => None,
        }
    }
}

/// Check that a bracket with these match counts per round halves cleanly.
pub fn validate_shape(shape: &[usize]) -> BracketResult<()> {
    for (round, &count) in shape.iter().enumerate() {
        if count == 0 {
            return Err(BracketError::EmptyRound { round });
        }
        if count > 1 && count % 2 == 1 {
            return Err(BracketError::OddRound { round, matches: count });
        }
        if round > 0 {
            let expected = shape[round - 1] / 2;
            if count != expected {
                return Err(BracketError::NonHalvingRound { round, expected, found: count });
            }
        }
    }
    Ok(())
}

/// Every pair placed after the first round must be the winner of the match
/// that feeds its slot.
fn validate_progression(rounds: &[Round]) -> BracketResult<()> {
    for window in rounds.windows(2) {
        let [earlier, later] = window else {
            continue;
        };
        for (index, m) in later.matches.iter().enumerate() {
            for side in Side::BOTH {
                let Some(placed) = m.pair(side) else {
                    continue;
                };
                let feeder = &earlier.matches[index * 2 + side.index()];
                if feeder.winner_pair() != Some(placed) {
                    return Err(BracketError::UnearnedSlot {
                        match_id: m.id.clone(),
                        pair: placed.clone(),
                        feeder: feeder.id.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BracketError {
    EmptyRound { round: usize },
    OddRound { round: usize, matches: usize },
    NonHalvingRound { round: usize, expected: usize, found: usize },
    ScoreLengthMismatch { match_id: String, one: usize, two: usize },
    WinnerWithoutFinish { match_id: String },
    WinnerContradictsScore { match_id: String },
    UnearnedSlot { match_id: String, pair: PairId, feeder: String },
    MatchNotFound { round: usize, index: usize },
    UndecidedSlot { match_id: String },
    MissingScores { match_id: String },
    TiedScore { match_id: String },
    MatchAlreadyStarted { match_id: String },
    DownstreamAlreadyPlayed { match_id: String },
    NotEnoughPairs { found: usize },
    AlreadyGenerated,
}

impl fmt::Display for BracketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketError::EmptyRound { round } => write!(f, "round {} has no matches", round + 1),
            BracketError::OddRound { round, matches } => {
                write!(f, "round {} has an odd number of matches ({matches})", round + 1)
            }
            BracketError::NonHalvingRound { round, expected, found } => write!(
                f,
                "round {} should hold {expected} matches, found {found}",
                round + 1
            ),
            BracketError::ScoreLengthMismatch { match_id, one, two } => write!(
                f,
                "match {match_id}: pair 1 has {one} sets but pair 2 has {two}"
            ),
            BracketError::WinnerWithoutFinish { match_id } => {
                write!(f, "match {match_id}: winner set before the match finished")
            }
            BracketError::WinnerContradictsScore { match_id } => {
                write!(f, "match {match_id}: winner did not win more sets")
            }
            BracketError::UnearnedSlot { match_id, pair, feeder } => write!(
                f,
                "match {match_id}: pair {pair} has not won match {feeder}"
            ),
            BracketError::MatchNotFound { round, index } => {
                write!(f, "no match {} in round {}", index + 1, round + 1)
            }
            BracketError::UndecidedSlot { match_id } => {
                write!(f, "match {match_id}: both pairs must be known")
            }
            BracketError::MissingScores { match_id } => {
                write!(f, "match {match_id}: at least one set is required")
            }
            BracketError::TiedScore { match_id } => {
                write!(f, "match {match_id}: sets are tied, no winner")
            }
            BracketError::MatchAlreadyStarted { match_id } => {
                write!(f, "match {match_id} has already started")
            }
            BracketError::DownstreamAlreadyPlayed { match_id } => write!(
                f,
                "match {match_id} is already under way with a different pair"
            ),
            BracketError::NotEnoughPairs { found } => {
                write!(f, "a bracket needs at least 2 pairs, found {found}")
            }
            BracketError::AlreadyGenerated => f.write_str("bracket already generated"),
        }
    }
}

impl std::error::Error for BracketError {}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
