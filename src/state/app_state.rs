use crate::app::MenuItem;
use chrono::{Local, NaiveDate};
use padel_core::admin::{RequestFilter, TournamentFilter};
use padel_core::Association;
use std::fmt;

// ---------------------------------------------------------------------------
// Banner animation state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AnimationState {
    /// Spin phase of the intro ball, wraps at FRAME_COUNT.
    pub frame: usize,
    /// Monotonic tick counter, drives the rally.
    pub tick: u64,
}

impl AnimationState {
    pub fn advance(&mut self, frame_count: usize) {
        self.tick = self.tick.wrapping_add(1);
        self.frame = (self.frame + 1) % frame_count.max(1);
    }
}

// ---------------------------------------------------------------------------
// Result entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreInputError {
    Empty,
    BadSet(String),
}

impl fmt::Display for ScoreInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreInputError::Empty => f.write_str("type at least one set, e.g. 6-4 3-6 7-5"),
            ScoreInputError::BadSet(set) => {
                write!(f, "can't read set {set:?}; use games like 6-4")
            }
        }
    }
}

impl std::error::Error for ScoreInputError {}

/// Parse "6-4 3-6 7-6(5)" into per-side game counts. Sets are separated by
/// spaces or commas; `-`, `:` or `/` split the two sides; a bracketed
/// tie-break score is ignored.
pub fn parse_scores(input: &str) -> Result<[Vec<u8>; 2], ScoreInputError> {
    let mut one = Vec::new();
    let mut two = Vec::new();
    for set in input.split([' ', ',']).filter(|s| !s.is_empty()) {
        let games = set.split('(').next().unwrap_or(set);
        let parsed = games
            .split_once(['-', ':', '/'])
            .and_then(|(a, b)| Some((a.trim().parse::<u8>().ok()?, b.trim().parse::<u8>().ok()?)));
        let Some((a, b)) = parsed else {
            return Err(ScoreInputError::BadSet(set.to_string()));
        };
        one.push(a);
        two.push(b);
    }
    if one.is_empty() {
        return Err(ScoreInputError::Empty);
    }
    Ok([one, two])
}

#[derive(Debug, Default)]
pub struct ScoreEntry {
    pub input: String,
    pub composing: bool,
}

impl ScoreEntry {
    pub fn begin(&mut self) {
        self.composing = true;
        self.input.clear();
    }

    pub fn cancel(&mut self) {
        self.composing = false;
        self.input.clear();
    }

    /// Leave compose mode and parse what was typed.
    pub fn submit(&mut self) -> Result<[Vec<u8>; 2], ScoreInputError> {
        let parsed = parse_scores(self.input.trim());
        self.cancel();
        parsed
    }
}

// ---------------------------------------------------------------------------
// Bracket view state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct BracketState {
    /// Index into `Association::tournaments`.
    pub tournament: usize,
    pub round: usize,
    pub selected_match: usize,
    /// Vertical scroll offset in rows.
    pub scroll_offset: u16,
    /// Leftmost round column on screen.
    pub first_visible_round: usize,
    pub result_entry: ScoreEntry,
}

impl BracketState {
    pub fn select_tournament(&mut self, index: usize) {
        if index != self.tournament {
            self.tournament = index;
            self.reset_view();
        }
    }

    pub fn next_tournament(&mut self, count: usize) {
        if count > 0 {
            self.select_tournament((self.tournament + 1) % count);
        }
    }

    pub fn prev_tournament(&mut self, count: usize) {
        if count > 0 {
            self.select_tournament((self.tournament + count - 1) % count);
        }
    }

    pub fn reset_view(&mut self) {
        self.round = 0;
        self.selected_match = 0;
        self.scroll_offset = 0;
        self.first_visible_round = 0;
        self.result_entry.cancel();
    }

    /// Pull the selection back inside a (possibly reloaded) bracket shape.
    pub fn clamp(&mut self, tournaments: usize, shape: &[usize]) {
        if self.tournament >= tournaments {
            self.tournament = 0;
            self.reset_view();
        }
        self.round = self.round.min(shape.len().saturating_sub(1));
        let matches = shape.get(self.round).copied().unwrap_or(0);
        self.selected_match = self.selected_match.min(matches.saturating_sub(1));
    }

    /// Follow the selected match into the one it feeds.
    pub fn next_round(&mut self, shape: &[usize]) {
        if self.round + 1 < shape.len() {
            self.round += 1;
            self.selected_match /= 2;
        }
    }

    /// Step back to the upper of the two matches feeding the selection.
    pub fn prev_round(&mut self, shape: &[usize]) {
        if self.round > 0 {
            self.round -= 1;
            let matches = shape.get(self.round).copied().unwrap_or(0);
            self.selected_match = (self.selected_match * 2).min(matches.saturating_sub(1));
        }
    }

    pub fn match_down(&mut self, shape: &[usize]) {
        let max = shape.get(self.round).copied().unwrap_or(0).saturating_sub(1);
        if self.selected_match < max {
            self.selected_match += 1;
        }
    }

    pub fn match_up(&mut self) {
        self.selected_match = self.selected_match.saturating_sub(1);
    }

    /// Scroll so rows `top..bottom` fit in a viewport `height` rows tall.
    pub fn keep_rows_visible(&mut self, top: u16, bottom: u16, height: u16) {
        if height == 0 {
            return;
        }
        if top < self.scroll_offset {
            self.scroll_offset = top;
        } else if bottom > self.scroll_offset.saturating_add(height) {
            self.scroll_offset = bottom.saturating_sub(height).min(top);
        }
    }

    /// Shift columns so the selected round is one of `visible` on screen.
    pub fn keep_round_visible(&mut self, visible: usize) {
        let visible = visible.max(1);
        if self.round < self.first_visible_round {
            self.first_visible_round = self.round;
        } else if self.round >= self.first_visible_round + visible {
            self.first_visible_round = self.round + 1 - visible;
        }
    }
}

// ---------------------------------------------------------------------------
// Back-office list states
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ZonesState {
    pub scroll_offset: u16,
}

#[derive(Debug, Default)]
pub struct TournamentsState {
    pub filter: TournamentFilter,
    pub page: usize,
    /// Row within the current page.
    pub selected: usize,
}

#[derive(Debug, Default)]
pub struct MembershipsState {
    pub filter: RequestFilter,
    pub searching: bool,
    pub page: usize,
    pub selected: usize,
}

impl MembershipsState {
    pub fn filter_changed(&mut self) {
        self.page = 0;
        self.selected = 0;
    }
}

#[derive(Debug, Default)]
pub struct RankingsState {
    /// Index into the sorted category list.
    pub category: usize,
    pub scroll_offset: u16,
}

/// Move a row cursor within a page of `len` rows.
pub fn step_selection(selected: usize, len: usize, down: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if down {
        (selected + 1).min(len - 1)
    } else {
        selected.saturating_sub(1)
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_intro: bool,
    pub show_logs: bool,
    pub last_error: Option<String>,
    /// One-line feedback for the last admin action.
    pub notice: Option<String>,
    pub association: Option<Association>,
    /// Where the association was read from.
    pub source: Option<String>,
    pub today: NaiveDate,
    pub bracket: BracketState,
    pub zones: ZonesState,
    pub tournaments: TournamentsState,
    pub memberships: MembershipsState,
    pub rankings: RankingsState,
    pub animation: AnimationState,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            active_tab: MenuItem::default(),
            previous_tab: MenuItem::default(),
            show_intro: false,
            show_logs: false,
            last_error: None,
            notice: None,
            association: None,
            source: None,
            today: Local::now().date_naive(),
            bracket: BracketState::default(),
            zones: ZonesState::default(),
            tournaments: TournamentsState::default(),
            memberships: MembershipsState::default(),
            rankings: RankingsState::default(),
            animation: AnimationState::default(),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            show_intro: true,
            ..Self::default()
        }
    }

    /// Is any text prompt capturing keystrokes?
    pub fn is_typing(&self) -> bool {
        self.bracket.result_entry.composing || self.memberships.searching
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_sets() {
        assert_eq!(parse_scores("6-4 3-6 7-5"), Ok([vec![6, 3, 7], vec![4, 6, 5]]));
    }

    #[test]
    fn test_parse_alternative_separators_and_tiebreak() {
        assert_eq!(parse_scores("7-6(5), 6:2"), Ok([vec![7, 6], vec![6, 2]]));
        assert_eq!(parse_scores(" 6/0 "), Ok([vec![6], vec![0]]));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_scores(""), Err(ScoreInputError::Empty));
        assert_eq!(parse_scores("6-4 six-2"), Err(ScoreInputError::BadSet("six-2".into())));
        assert_eq!(parse_scores("64"), Err(ScoreInputError::BadSet("64".into())));
    }

    #[test]
    fn test_score_entry_submit_clears_prompt() {
        let mut entry = ScoreEntry::default();
        entry.begin();
        entry.input.push_str("6-1 6-1");
        assert_eq!(entry.submit(), Ok([vec![6, 6], vec![1, 1]]));
        assert!(!entry.composing);
        assert!(entry.input.is_empty());
    }

    #[test]
    fn test_round_navigation_follows_the_path() {
        let shape = [8, 4, 2, 1];
        let mut state = BracketState::default();
        state.selected_match = 5;
        state.next_round(&shape);
        assert_eq!((state.round, state.selected_match), (1, 2));
        state.next_round(&shape);
        state.next_round(&shape);
        state.next_round(&shape);
        assert_eq!((state.round, state.selected_match), (3, 0));
        state.prev_round(&shape);
        assert_eq!((state.round, state.selected_match), (2, 0));
    }

    #[test]
    fn test_match_navigation_is_bounded() {
        let shape = [2, 1];
        let mut state = BracketState::default();
        state.match_down(&shape);
        state.match_down(&shape);
        assert_eq!(state.selected_match, 1);
        state.match_up();
        state.match_up();
        assert_eq!(state.selected_match, 0);
    }

    #[test]
    fn test_clamp_after_reload() {
        let mut state = BracketState { tournament: 1, round: 3, selected_match: 6, ..Default::default() };
        state.clamp(2, &[2, 1]);
        assert_eq!((state.tournament, state.round, state.selected_match), (1, 1, 0));
        state.clamp(1, &[]);
        assert_eq!((state.tournament, state.round, state.selected_match), (0, 0, 0));
    }

    #[test]
    fn test_tournament_cycle_resets_view() {
        let mut state = BracketState { round: 2, scroll_offset: 9, ..Default::default() };
        state.prev_tournament(3);
        assert_eq!(state.tournament, 2);
        assert_eq!((state.round, state.scroll_offset), (0, 0));
        state.next_tournament(3);
        assert_eq!(state.tournament, 0);
    }

    #[test]
    fn test_keep_rows_visible() {
        let mut state = BracketState::default();
        state.keep_rows_visible(20, 23, 10);
        assert_eq!(state.scroll_offset, 13);
        state.keep_rows_visible(4, 7, 10);
        assert_eq!(state.scroll_offset, 4);
        // Taller than the viewport: show its top.
        state.keep_rows_visible(30, 45, 10);
        assert_eq!(state.scroll_offset, 30);
    }

    #[test]
    fn test_keep_round_visible() {
        let mut state = BracketState { round: 4, ..Default::default() };
        state.keep_round_visible(2);
        assert_eq!(state.first_visible_round, 3);
        state.round = 1;
        state.keep_round_visible(2);
        assert_eq!(state.first_visible_round, 1);
    }

    #[test]
    fn test_step_selection() {
        assert_eq!(step_selection(0, 0, true), 0);
        assert_eq!(step_selection(2, 3, true), 2);
        assert_eq!(step_selection(0, 3, false), 0);
        assert_eq!(step_selection(1, 3, true), 2);
    }
}
