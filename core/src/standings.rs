use crate::bracket::{
    Bracket, BracketError, BracketResult, Match, MatchStatus, PairId, Round, Side, Slot, round_name,
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Round-robin group whose top finishers seed the bracket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub pairs: Vec<PairId>,
    #[serde(default)]
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsRule {
    pub win: u32,
    pub loss: u32,
}

impl Default for PointsRule {
    fn default() -> Self {
        Self { win: 3, loss: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingRow {
    pub pair: PairId,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub points: u32,
}

impl StandingRow {
    fn new(pair: PairId) -> Self {
        Self {
            pair,
            played: 0,
            wins: 0,
            losses: 0,
            sets_won: 0,
            sets_lost: 0,
            games_won: 0,
            games_lost: 0,
            points: 0,
        }
    }

    pub fn set_difference(&self) -> i64 {
        i64::from(self.sets_won) - i64::from(self.sets_lost)
    }

    pub fn game_difference(&self) -> i64 {
        i64::from(self.games_won) - i64::from(self.games_lost)
    }
}

/// Zone table from finished matches, best first.
///
/// Order: points, set difference, game difference, wins, then pair id so the
/// table is total and stable across reloads.
pub fn standings(zone: &Zone, rule: PointsRule) -> Vec<StandingRow> {
    let mut rows: Vec<StandingRow> = zone.pairs.iter().cloned().map(StandingRow::new).collect();

    for m in zone.matches.iter().filter(|m| m.status == MatchStatus::Finished) {
        let Some(winner) = m.winner.or_else(|| m.leader()) else {
            continue;
        };
        for side in Side::BOTH {
            let Some(pair) = m.pair(side) else {
                continue;
            };
            let Some(row) = rows.iter_mut().find(|r| &r.pair == pair) else {
                warn!("zone {}: match {} has pair {pair} outside the zone", zone.name, m.id);
                continue;
            };
            let opponent = side.opponent();
            row.played += 1;
            row.sets_won += m.sets_won(side);
            row.sets_lost += m.sets_won(opponent);
            row.games_won += m.games_won(side);
            row.games_lost += m.games_won(opponent);
            if side == winner {
                row.wins += 1;
                row.points += rule.win;
            } else {
                row.losses += 1;
                row.points += rule.loss;
            }
        }
    }

    rows.sort_by(compare_rows);
    rows
}

fn compare_rows(a: &StandingRow, b: &StandingRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.set_difference().cmp(&a.set_difference()))
        .then_with(|| b.game_difference().cmp(&a.game_difference()))
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| a.pair.cmp(&b.pair))
}

/// Top `per_zone` pairs of every zone, in finishing order.
pub fn qualifiers(zones: &[Zone], rule: PointsRule, per_zone: usize) -> Vec<Vec<PairId>> {
    zones
        .iter()
        .map(|zone| {
            standings(zone, rule)
                .into_iter()
                .take(per_zone)
                .map(|row| row.pair)
                .collect()
        })
        .collect()
}

/// Seed list: every zone winner in zone order, then every runner-up, and so on.
fn seed_list(qualified: &[Vec<PairId>]) -> Vec<PairId> {
    let depth = qualified.iter().map(Vec::len).max().unwrap_or(0);
    (0..depth)
        .flat_map(|position| qualified.iter().filter_map(move |zone| zone.get(position)))
        .cloned()
        .collect()
}

/// Standard bracket order for `size` seeds (a power of two): adjacent entries
/// meet in the first round, and seeds 1 and 2 can only meet in the final.
pub fn seeding_order(size: usize) -> Vec<usize> {
    let mut order = vec![0usize];
    while order.len() < size {
        let span = order.len() * 2;
        order = order.iter().flat_map(|&seed| [seed, span - 1 - seed]).collect();
    }
    order
}

/// Build a fresh bracket from zone qualifiers.
///
/// Missing seeds up to the next power of two become byes; the seeds facing
/// them go straight through to the second round.
pub fn seed_bracket(qualified: &[Vec<PairId>]) -> BracketResult<Bracket> {
    let seeds = seed_list(qualified);
    if seeds.len() < 2 {
        return Err(BracketError::NotEnoughPairs { found: seeds.len() });
    }

    let size = seeds.len().next_power_of_two();
    let slot = |seed: usize| seeds.get(seed).cloned().map(Slot::Pair).unwrap_or(Slot::Bye);

    let first: Vec<Match> = seeding_order(size)
        .chunks(2)
        .enumerate()
        .map(|(i, chunk)| Match::new(format!("R1-M{}", i + 1), slot(chunk[0]), slot(chunk[1])))
        .collect();

    let mut rounds = vec![Round { name: round_name(first.len()), matches: first }];
    let mut count = size / 2;
    while count > 1 {
        count /= 2;
        let number = rounds.len() + 1;
        rounds.push(Round {
            name: round_name(count),
            matches: (0..count)
                .map(|i| {
                    Match::new(format!("R{number}-M{}", i + 1), Slot::ToBeDecided, Slot::ToBeDecided)
                })
                .collect(),
        });
    }

    let mut bracket = Bracket::new(rounds)?;
    bracket.advance_walkovers();
    Ok(bracket)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> PairId {
        PairId::new(s)
    }

    fn played(one: &str, two: &str, scores: [Vec<u8>; 2]) -> Match {
        let mut m = Match::new(
            format!("{one}-{two}"),
            Slot::Pair(id(one)),
            Slot::Pair(id(two)),
        );
        m.scores = scores;
        m.status = MatchStatus::Finished;
        m.winner = m.leader();
        m
    }

    fn zone(name: &str, pairs: &[&str], matches: Vec<Match>) -> Zone {
        Zone {
            name: name.into(),
            pairs: pairs.iter().map(|p| id(p)).collect(),
            matches,
        }
    }

    #[test]
    fn test_standings_sort_by_points() {
        let z = zone(
            "A",
            &["a", "b", "c"],
            vec![
                played("a", "b", [vec![6, 6], vec![3, 4]]),
                played("c", "a", [vec![6, 6], vec![2, 1]]),
                played("b", "c", [vec![6, 6], vec![0, 0]]),
            ],
        );
        // Everyone has one win; b has the best game difference, a the worst.
        let rows = standings(&z, PointsRule::default());
        let order: Vec<&str> = rows.iter().map(|r| r.pair.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert!(rows.iter().all(|r| r.points == 3 && r.played == 2));
    }

    #[test]
    fn test_unfinished_matches_do_not_count() {
        let mut live = played("a", "b", [vec![6], vec![2]]);
        live.status = MatchStatus::InProgress;
        live.winner = None;
        let z = zone("A", &["a", "b"], vec![live]);
        let rows = standings(&z, PointsRule::default());
        assert!(rows.iter().all(|r| r.played == 0));
        // Ties fall back to pair id.
        assert_eq!(rows[0].pair, id("a"));
    }

    #[test]
    fn test_loss_points_and_set_counts() {
        let z = zone("A", &["a", "b"], vec![played("a", "b", [vec![6, 3, 7], vec![4, 6, 5]])]);
        let rows = standings(&z, PointsRule { win: 2, loss: 1 });
        assert_eq!(rows[0].pair, id("a"));
        assert_eq!(rows[0].points, 2);
        assert_eq!((rows[0].sets_won, rows[0].sets_lost), (2, 1));
        assert_eq!(rows[1].points, 1);
        assert_eq!((rows[1].games_won, rows[1].games_lost), (15, 16));
    }

    #[test]
    fn test_qualifiers_take_top_n() {
        let z = zone(
            "A",
            &["a", "b", "c"],
            vec![
                played("a", "b", [vec![6, 6], vec![1, 1]]),
                played("a", "c", [vec![6, 6], vec![1, 1]]),
                played("b", "c", [vec![6, 6], vec![1, 1]]),
            ],
        );
        assert_eq!(qualifiers(&[z], PointsRule::default(), 2), vec![vec![id("a"), id("b")]]);
    }

    #[test]
    fn test_seeding_order() {
        assert_eq!(seeding_order(2), vec![0, 1]);
        assert_eq!(seeding_order(4), vec![0, 3, 1, 2]);
        assert_eq!(seeding_order(8), vec![0, 7, 3, 4, 1, 6, 2, 5]);
    }

    #[test]
    fn test_four_zones_cross_over() {
        let qualified: Vec<Vec<PairId>> = ["a", "b", "c", "d"]
            .iter()
            .map(|z| vec![id(&format!("1{z}")), id(&format!("2{z}"))])
            .collect();
        let bracket = seed_bracket(&qualified).unwrap();
        assert_eq!(bracket.shape(), vec![4, 2, 1]);
        assert_eq!(bracket.rounds()[0].name, "Quarterfinals");

        let first: Vec<(String, String)> = bracket.rounds()[0]
            .matches
            .iter()
            .map(|m| {
                (
                    m.pair(Side::One).unwrap().to_string(),
                    m.pair(Side::Two).unwrap().to_string(),
                )
            })
            .collect();
        let expected = [("1a", "2d"), ("1d", "2a"), ("1b", "2c"), ("1c", "2b")];
        for ((one, two), (e1, e2)) in first.iter().zip(expected) {
            assert_eq!((one.as_str(), two.as_str()), (e1, e2));
        }
        assert!(bracket.rounds()[1].matches.iter().all(|m| m.slots[0] == Slot::ToBeDecided));
    }

    #[test]
    fn test_byes_advance_top_seeds() {
        let qualified = vec![vec![id("a"), id("b"), id("c")]];
        let bracket = seed_bracket(&qualified).unwrap();
        assert_eq!(bracket.shape(), vec![2, 1]);
        let opener = bracket.get(0, 0).unwrap();
        assert_eq!(opener.slots[1], Slot::Bye);
        assert_eq!(opener.status, MatchStatus::Finished);
        assert_eq!(bracket.get(1, 0).unwrap().slots[0], Slot::Pair(id("a")));
    }

    #[test]
    fn test_two_qualifiers_make_a_final() {
        let bracket = seed_bracket(&[vec![id("a"), id("b")]]).unwrap();
        assert_eq!(bracket.shape(), vec![1]);
        assert_eq!(bracket.rounds()[0].name, "Final");
    }

    #[test]
    fn test_single_qualifier_is_rejected() {
        assert_eq!(
            seed_bracket(&[vec![id("a")]]).unwrap_err(),
            BracketError::NotEnoughPairs { found: 1 }
        );
    }
}
