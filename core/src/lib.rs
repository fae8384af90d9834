pub mod admin;
pub mod bracket;
pub mod geometry;
pub mod source;
pub mod standings;

use chrono::NaiveDate;

pub use admin::{MembershipRequest, RankingEntry, RequestStatus, TournamentStatus};
pub use bracket::{
    Bracket, BracketError, BracketResult, Match, MatchStatus, Pair, PairId, Round, Side, Slot,
};
pub use geometry::{BracketLayout, LayoutConstants};
pub use standings::{PointsRule, Zone};

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// Everything the back-office shows, loaded from one snapshot.
#[derive(Debug, Clone, Default)]
pub struct Association {
    pub name: String,
    pub pairs: Vec<Pair>,
    pub tournaments: Vec<Tournament>,
    pub membership_requests: Vec<MembershipRequest>,
    pub rankings: Vec<RankingEntry>,
}

impl Association {
    pub fn pair(&self, id: &PairId) -> Option<&Pair> {
        self.pairs.iter().find(|p| &p.id == id)
    }

    /// Display text for a match slot.
    pub fn slot_label(&self, slot: &Slot, short: bool) -> String {
        match slot {
            Slot::ToBeDecided => "To be decided".to_string(),
            Slot::Bye => "BYE".to_string(),
            Slot::Pair(id) => match self.pair(id) {
                Some(pair) if short => pair.short_label(),
                Some(pair) => pair.label(),
                None => id.to_string(),
            },
        }
    }

    /// Headline figures for the intro screen as of `today`.
    pub fn summary(&self, today: NaiveDate) -> ClubSummary {
        let count = |status: TournamentStatus| {
            self.tournaments.iter().filter(|t| t.status(today) == status).count()
        };
        let next_match = self
            .tournaments
            .iter()
            .filter(|t| t.status(today) != TournamentStatus::Finished)
            .flat_map(|t| {
                t.bracket
                    .rounds()
                    .iter()
                    .flat_map(move |r| r.matches.iter().map(move |m| (t, m)))
            })
            .filter(|(_, m)| m.status == MatchStatus::Pending && m.slots.iter().all(Slot::is_pair))
            .filter_map(|(t, m)| {
                let date = m.schedule.date.filter(|d| *d >= today)?;
                Some(((date, m.schedule.time), t, m))
            })
            .min_by_key(|(when, _, _)| *when)
            .map(|(_, t, m)| NextMatch {
                tournament: t.name.clone(),
                pairs: [self.slot_label(&m.slots[0], true), self.slot_label(&m.slots[1], true)],
                when: m.schedule.summary().unwrap_or_default(),
            });

        ClubSummary {
            name: self.name.clone(),
            in_progress: count(TournamentStatus::InProgress),
            upcoming: count(TournamentStatus::Upcoming),
            pending_requests: self
                .membership_requests
                .iter()
                .filter(|r| r.status == RequestStatus::Pending)
                .count(),
            next_match,
        }
    }

    pub fn tournament(&self, id: &str) -> Option<&Tournament> {
        self.tournaments.iter().find(|t| t.id == id)
    }

    pub fn tournament_mut(&mut self, id: &str) -> Option<&mut Tournament> {
        self.tournaments.iter_mut().find(|t| t.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClubSummary {
    pub name: String,
    pub in_progress: usize,
    pub upcoming: usize,
    pub pending_requests: usize,
    pub next_match: Option<NextMatch>,
}

/// Earliest scheduled knockout match still waiting to be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextMatch {
    pub tournament: String,
    pub pairs: [String; 2],
    pub when: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub category: String,
    pub venue: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub qualifiers_per_zone: usize,
    pub zones: Vec<Zone>,
    pub bracket: Bracket,
}

impl Tournament {
    pub fn status(&self, today: NaiveDate) -> TournamentStatus {
        if self.bracket.champion().is_some() || today > self.end_date {
            TournamentStatus::Finished
        } else if today >= self.start_date {
            TournamentStatus::InProgress
        } else {
            TournamentStatus::Upcoming
        }
    }

    /// Seed the knockout stage from the current zone standings.
    pub fn generate_bracket(&mut self, rule: PointsRule) -> BracketResult<()> {
        if !self.bracket.is_empty() {
            return Err(BracketError::AlreadyGenerated);
        }
        let qualified = standings::qualifiers(&self.zones, rule, self.qualifiers_per_zone);
        self.bracket = standings::seed_bracket(&qualified)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tournament(zones: Vec<Zone>) -> Tournament {
        Tournament {
            id: "t".into(),
            name: "Open".into(),
            category: "4ta".into(),
            venue: "Club".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 10, 25).unwrap(),
            qualifiers_per_zone: 2,
            zones,
            bracket: Bracket::empty(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn test_status_follows_dates() {
        let t = tournament(Vec::new());
        assert_eq!(t.status(day(1)), TournamentStatus::Upcoming);
        assert_eq!(t.status(day(15)), TournamentStatus::InProgress);
        assert_eq!(t.status(day(26)), TournamentStatus::Finished);
    }

    #[test]
    fn test_generate_bracket_once() {
        let zone = Zone {
            name: "A".into(),
            pairs: vec![PairId::new("a"), PairId::new("b"), PairId::new("c")],
            matches: Vec::new(),
        };
        let mut t = tournament(vec![zone]);
        t.generate_bracket(PointsRule::default()).unwrap();
        assert_eq!(t.bracket.shape(), vec![1]);
        assert_eq!(
            t.generate_bracket(PointsRule::default()),
            Err(BracketError::AlreadyGenerated)
        );
    }

    #[test]
    fn test_summary_of_embedded_snapshot() {
        let assoc = source::parse_association(include_str!("../fixtures/association.json")).unwrap();
        let summary = assoc.summary(day(18));
        assert_eq!(summary.name, "Club de Pádel Los Álamos");
        assert_eq!((summary.in_progress, summary.upcoming), (1, 1));
        assert_eq!(summary.pending_requests, 5);

        let next = summary.next_match.unwrap();
        assert_eq!(next.tournament, "Open de Otoño");
        assert_eq!(next.pairs, ["Marín/Rubio".to_string(), "López/Ortega".to_string()]);
        assert_eq!(next.when, "18/10 18:30 Court 2");

        // After the last scheduled date nothing is left to announce.
        assert_eq!(assoc.summary(day(25)).next_match, None);
    }

    #[test]
    fn test_slot_labels() {
        let assoc = Association {
            pairs: vec![Pair {
                id: PairId::new("p1"),
                players: ["Juan Lebrón".into(), "Ale Galán".into()],
            }],
            ..Association::default()
        };
        let slot = Slot::Pair(PairId::new("p1"));
        assert_eq!(assoc.slot_label(&slot, false), "Juan Lebrón / Ale Galán");
        assert_eq!(assoc.slot_label(&slot, true), "Lebrón/Galán");
        assert_eq!(assoc.slot_label(&Slot::Bye, true), "BYE");
        assert_eq!(assoc.slot_label(&Slot::Pair(PairId::new("x")), true), "x");
    }
}
