use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, step_selection};
use chrono::Local;
use log::{info, warn};
use padel_core::admin::{
    self, Decision, MembershipRequest, RankedEntry, RequestStatus, TournamentStatus,
};
use padel_core::{Association, PairId, PointsRule, Slot, Tournament};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Bracket,
    Zones,
    Tournaments,
    Memberships,
    Rankings,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    pub points: PointsRule,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        if let Some(level) = settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        Self {
            settings,
            state: AppState::new(),
            points: PointsRule::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Loader response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_data_loaded(&mut self, association: Association, source: String) {
        info!(
            "loaded {} tournaments, {} membership requests from {source}",
            association.tournaments.len(),
            association.membership_requests.len()
        );
        self.state.last_error = None;
        self.state.source = Some(source);
        self.state.today = Local::now().date_naive();
        self.state.association = Some(association);
        self.clamp_selection();
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    fn clamp_selection(&mut self) {
        let Some(assoc) = &self.state.association else {
            return;
        };
        let shape = assoc
            .tournaments
            .get(self.state.bracket.tournament)
            .map(|t| t.bracket.shape())
            .unwrap_or_default();
        self.state.bracket.clamp(assoc.tournaments.len(), &shape);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        self.state.notice = None;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn dismiss_intro(&mut self) {
        self.state.show_intro = false;
    }

    pub fn advance_animation(&mut self, frame_count: usize) {
        self.state.animation.advance(frame_count);
    }

    // -----------------------------------------------------------------------
    // Selected tournament, shared by the Bracket and Zones tabs
    // -----------------------------------------------------------------------

    pub fn selected_tournament(&self) -> Option<&Tournament> {
        self.state
            .association
            .as_ref()?
            .tournaments
            .get(self.state.bracket.tournament)
    }

    fn selected_tournament_mut(&mut self) -> Option<&mut Tournament> {
        self.state
            .association
            .as_mut()?
            .tournaments
            .get_mut(self.state.bracket.tournament)
    }

    fn tournament_count(&self) -> usize {
        self.state.association.as_ref().map_or(0, |a| a.tournaments.len())
    }

    fn bracket_shape(&self) -> Vec<usize> {
        self.selected_tournament()
            .map(|t| t.bracket.shape())
            .unwrap_or_default()
    }

    pub fn next_tournament(&mut self) {
        let count = self.tournament_count();
        self.state.bracket.next_tournament(count);
        self.state.zones.scroll_offset = 0;
    }

    pub fn prev_tournament(&mut self) {
        let count = self.tournament_count();
        self.state.bracket.prev_tournament(count);
        self.state.zones.scroll_offset = 0;
    }

    // -----------------------------------------------------------------------
    // Bracket navigation and results
    // -----------------------------------------------------------------------

    pub fn bracket_next_round(&mut self) {
        let shape = self.bracket_shape();
        self.state.bracket.next_round(&shape);
    }

    pub fn bracket_prev_round(&mut self) {
        let shape = self.bracket_shape();
        self.state.bracket.prev_round(&shape);
    }

    pub fn bracket_match_down(&mut self) {
        let shape = self.bracket_shape();
        self.state.bracket.match_down(&shape);
    }

    pub fn bracket_match_up(&mut self) {
        self.state.bracket.match_up();
    }

    pub fn start_selected_match(&mut self) {
        let (round, index) = (self.state.bracket.round, self.state.bracket.selected_match);
        let Some(tournament) = self.selected_tournament_mut() else {
            return;
        };
        let outcome = tournament.bracket.start_match(round, index);
        match outcome {
            Ok(()) => self.notify("Match under way"),
            Err(e) => self.reject(e.to_string()),
        }
    }

    /// Open the result prompt for the selected match.
    pub fn begin_result_entry(&mut self) {
        let ready = self
            .selected_tournament()
            .and_then(|t| t.bracket.get(self.state.bracket.round, self.state.bracket.selected_match))
            .is_some_and(|m| m.slots.iter().all(|s| s.is_pair()));
        if ready {
            self.state.notice = None;
            self.state.bracket.result_entry.begin();
        } else {
            self.reject("Both pairs must be known before entering a result".to_string());
        }
    }

    pub fn submit_result(&mut self) {
        let scores = match self.state.bracket.result_entry.submit() {
            Ok(scores) => scores,
            Err(e) => return self.reject(e.to_string()),
        };
        let (round, index) = (self.state.bracket.round, self.state.bracket.selected_match);
        let Some(tournament) = self.selected_tournament_mut() else {
            return;
        };
        match tournament.bracket.record_result(round, index, scores) {
            Ok(side) => {
                let champion = tournament.bracket.champion().cloned();
                let name = tournament.name.clone();
                match champion {
                    Some(pair) => {
                        let label = self.pair_label(&pair);
                        self.notify(format!("{name} champion: {label}"));
                    }
                    None => self.notify(format!("Result saved, pair {} advances", side.index() + 1)),
                }
            }
            Err(e) => self.reject(e.to_string()),
        }
    }

    pub fn generate_bracket(&mut self) {
        let rule = self.points;
        let Some(tournament) = self.selected_tournament_mut() else {
            return;
        };
        match tournament.generate_bracket(rule) {
            Ok(()) => {
                let rounds = tournament.bracket.round_count();
                self.state.bracket.reset_view();
                self.notify(format!("Bracket generated with {rounds} rounds"));
            }
            Err(e) => self.reject(e.to_string()),
        }
    }

    fn pair_label(&self, pair: &PairId) -> String {
        self.state
            .association
            .as_ref()
            .map(|a| a.slot_label(&Slot::Pair(pair.clone()), false))
            .unwrap_or_else(|| pair.to_string())
    }

    fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.state.notice = Some(message);
    }

    fn reject(&mut self, message: String) {
        warn!("{message}");
        self.state.notice = Some(message);
    }

    // -----------------------------------------------------------------------
    // Zones
    // -----------------------------------------------------------------------

    pub fn zones_scroll_down(&mut self) {
        let zones = self.selected_tournament().map_or(0, |t| t.zones.len());
        let last = u16::try_from(zones.saturating_sub(1)).unwrap_or(u16::MAX);
        let offset = &mut self.state.zones.scroll_offset;
        *offset = offset.saturating_add(1).min(last);
    }

    pub fn zones_scroll_up(&mut self) {
        self.state.zones.scroll_offset = self.state.zones.scroll_offset.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Tournament listing
    // -----------------------------------------------------------------------

    pub fn visible_tournaments(&self) -> Vec<&Tournament> {
        let Some(assoc) = &self.state.association else {
            return Vec::new();
        };
        admin::filter_tournaments(&assoc.tournaments, &self.state.tournaments.filter, self.state.today)
    }

    pub fn tournament_categories(&self) -> Vec<String> {
        self.state.association.as_ref().map_or_else(Vec::new, |a| {
            admin::categories(a.tournaments.iter().map(|t| t.category.as_str()))
        })
    }

    pub fn cycle_tournament_status(&mut self) {
        let filter = &mut self.state.tournaments.filter;
        filter.status = TournamentStatus::cycle(filter.status);
        self.state.tournaments.page = 0;
        self.state.tournaments.selected = 0;
    }

    pub fn cycle_tournament_category(&mut self) {
        let categories = self.tournament_categories();
        let filter = &mut self.state.tournaments.filter;
        filter.category = next_category(&categories, filter.category.as_deref());
        self.state.tournaments.page = 0;
        self.state.tournaments.selected = 0;
    }

    pub fn tournaments_page(&mut self, forward: bool) {
        let total = self.visible_tournaments().len();
        let state = &mut self.state.tournaments;
        state.page = turn_page(state.page, total, self.settings.page_size, forward);
        state.selected = 0;
    }

    pub fn tournaments_select(&mut self, down: bool) {
        let len = admin::paginate(
            &self.visible_tournaments(),
            self.state.tournaments.page,
            self.settings.page_size,
        )
        .items
        .len();
        let state = &mut self.state.tournaments;
        state.selected = step_selection(state.selected, len, down);
    }

    /// Open the highlighted tournament on the Bracket tab.
    pub fn open_selected_tournament(&mut self) {
        let id = {
            let visible = self.visible_tournaments();
            let page = admin::paginate(&visible, self.state.tournaments.page, self.settings.page_size);
            page.items.get(self.state.tournaments.selected).map(|t| t.id.clone())
        };
        let Some(id) = id else {
            return;
        };
        let index = self
            .state
            .association
            .as_ref()
            .and_then(|a| a.tournaments.iter().position(|t| t.id == id));
        if let Some(index) = index {
            self.state.bracket.select_tournament(index);
            self.update_tab(MenuItem::Bracket);
        }
    }

    // -----------------------------------------------------------------------
    // Membership requests
    // -----------------------------------------------------------------------

    pub fn visible_requests(&self) -> Vec<&MembershipRequest> {
        let Some(assoc) = &self.state.association else {
            return Vec::new();
        };
        admin::filter_requests(&assoc.membership_requests, &self.state.memberships.filter)
    }

    pub fn cycle_request_status(&mut self) {
        let state = &mut self.state.memberships;
        state.filter.status = RequestStatus::cycle(state.filter.status);
        state.filter_changed();
    }

    pub fn begin_search(&mut self) {
        self.state.memberships.searching = true;
    }

    pub fn end_search(&mut self) {
        self.state.memberships.searching = false;
    }

    pub fn clear_search(&mut self) {
        let state = &mut self.state.memberships;
        state.searching = false;
        state.filter.query.clear();
        state.filter_changed();
    }

    pub fn push_search_char(&mut self, c: char) {
        let state = &mut self.state.memberships;
        state.filter.query.push(c);
        state.filter_changed();
    }

    pub fn pop_search_char(&mut self) {
        let state = &mut self.state.memberships;
        state.filter.query.pop();
        state.filter_changed();
    }

    pub fn requests_page(&mut self, forward: bool) {
        let total = self.visible_requests().len();
        let state = &mut self.state.memberships;
        state.page = turn_page(state.page, total, self.settings.page_size, forward);
        state.selected = 0;
    }

    pub fn requests_select(&mut self, down: bool) {
        let visible = self.visible_requests();
        let len = admin::paginate(&visible, self.state.memberships.page, self.settings.page_size)
            .items
            .len();
        let state = &mut self.state.memberships;
        state.selected = step_selection(state.selected, len, down);
    }

    pub fn review_selected_request(&mut self, decision: Decision) {
        let id = {
            let visible = self.visible_requests();
            let page = admin::paginate(&visible, self.state.memberships.page, self.settings.page_size);
            page.items.get(self.state.memberships.selected).map(|r| r.id.clone())
        };
        let (Some(id), Some(assoc)) = (id, self.state.association.as_mut()) else {
            return;
        };
        match admin::review(&mut assoc.membership_requests, &id, decision) {
            Ok(status) => self.notify(format!("Request {id} {}", status.label().to_lowercase())),
            Err(e) => self.reject(e.to_string()),
        }
        // The reviewed row may have left the filtered list.
        let visible = self.visible_requests();
        let page = admin::paginate(&visible, self.state.memberships.page, self.settings.page_size);
        let (page_index, on_page) = (page.page, page.items.len());
        let state = &mut self.state.memberships;
        state.page = page_index;
        state.selected = state.selected.min(on_page.saturating_sub(1));
    }

    // -----------------------------------------------------------------------
    // Rankings
    // -----------------------------------------------------------------------

    pub fn ranking_categories(&self) -> Vec<String> {
        self.state.association.as_ref().map_or_else(Vec::new, |a| {
            admin::categories(a.rankings.iter().map(|r| r.category.as_str()))
        })
    }

    pub fn ranking_rows(&self) -> (Option<String>, Vec<RankedEntry<'_>>) {
        let categories = self.ranking_categories();
        let Some(category) = categories.get(self.state.rankings.category).cloned() else {
            return (None, Vec::new());
        };
        let rows = self
            .state
            .association
            .as_ref()
            .map(|a| admin::ranking_table(&a.rankings, &category))
            .unwrap_or_default();
        (Some(category), rows)
    }

    pub fn cycle_ranking_category(&mut self) {
        let count = self.ranking_categories().len().max(1);
        self.state.rankings.category = (self.state.rankings.category + 1) % count;
        self.state.rankings.scroll_offset = 0;
    }

    pub fn rankings_scroll(&mut self, down: bool) {
        let rows = self.ranking_rows().1.len();
        let last = u16::try_from(rows.saturating_sub(1)).unwrap_or(u16::MAX);
        let offset = &mut self.state.rankings.scroll_offset;
        *offset = if down { offset.saturating_add(1).min(last) } else { offset.saturating_sub(1) };
    }
}

/// All categories, then each one in turn, then all again.
fn next_category(categories: &[String], current: Option<&str>) -> Option<String> {
    match current {
        None => categories.first().cloned(),
        Some(c) => {
            let pos = categories.iter().position(|x| x == c)?;
            categories.get(pos + 1).cloned()
        }
    }
}

fn turn_page(page: usize, total: usize, per_page: usize, forward: bool) -> usize {
    let pages = total.div_ceil(per_page.max(1)).max(1);
    if forward {
        (page + 1).min(pages - 1)
    } else {
        page.saturating_sub(1).min(pages - 1)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
