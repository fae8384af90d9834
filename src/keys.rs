use crate::app::{App, MenuItem};
use crate::state::messages::DataRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use padel_core::admin::Decision;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    data_requests: &mpsc::Sender<DataRequest>,
) {
    let mut guard = app.lock().await;

    if guard.state.show_intro {
        match (key_event.code, key_event.modifiers) {
            (KeyCode::Enter, _) => guard.dismiss_intro(),
            (Char('q'), _) | (Char('c'), KeyModifiers::CONTROL) => {
                crate::cleanup_terminal();
                std::process::exit(0);
            }
            _ => {}
        }
        return;
    }

    if (key_event.code, key_event.modifiers) == (Char('c'), KeyModifiers::CONTROL) {
        crate::cleanup_terminal();
        std::process::exit(0);
    }

    // Prompts swallow everything else while open.
    if guard.state.bracket.result_entry.composing {
        match key_event.code {
            KeyCode::Enter => guard.submit_result(),
            KeyCode::Esc => guard.state.bracket.result_entry.cancel(),
            KeyCode::Backspace => {
                guard.state.bracket.result_entry.input.pop();
            }
            Char(c) => guard.state.bracket.result_entry.input.push(c),
            _ => {}
        }
        return;
    }
    if guard.state.memberships.searching {
        match key_event.code {
            KeyCode::Enter => guard.end_search(),
            KeyCode::Esc => guard.clear_search(),
            KeyCode::Backspace => guard.pop_search_char(),
            Char(c) => guard.push_search_char(c),
            _ => {}
        }
        return;
    }

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Bracket),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Zones),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Tournaments),
        (_, Char('4'), _) => guard.update_tab(MenuItem::Memberships),
        (_, Char('5'), _) => guard.update_tab(MenuItem::Rankings),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Tournament switching, shared by bracket and zones
        (MenuItem::Bracket | MenuItem::Zones, Char(']'), _) => guard.next_tournament(),
        (MenuItem::Bracket | MenuItem::Zones, Char('['), _) => guard.prev_tournament(),

        // Bracket
        (MenuItem::Bracket, Char('l') | KeyCode::Right, _) => guard.bracket_next_round(),
        (MenuItem::Bracket, Char('h') | KeyCode::Left, _) => guard.bracket_prev_round(),
        (MenuItem::Bracket, Char('j') | KeyCode::Down, _) => guard.bracket_match_down(),
        (MenuItem::Bracket, Char('k') | KeyCode::Up, _) => guard.bracket_match_up(),
        (MenuItem::Bracket, Char('s'), _) => guard.start_selected_match(),
        (MenuItem::Bracket, Char('e') | KeyCode::Enter, _) => guard.begin_result_entry(),
        (MenuItem::Bracket, Char('g'), _) => guard.generate_bracket(),

        // Zones
        (MenuItem::Zones, Char('j') | KeyCode::Down, _) => guard.zones_scroll_down(),
        (MenuItem::Zones, Char('k') | KeyCode::Up, _) => guard.zones_scroll_up(),

        // Tournaments
        (MenuItem::Tournaments, Char('j') | KeyCode::Down, _) => guard.tournaments_select(true),
        (MenuItem::Tournaments, Char('k') | KeyCode::Up, _) => guard.tournaments_select(false),
        (MenuItem::Tournaments, Char('s'), _) => guard.cycle_tournament_status(),
        (MenuItem::Tournaments, Char('c'), _) => guard.cycle_tournament_category(),
        (MenuItem::Tournaments, Char('n'), _) => guard.tournaments_page(true),
        (MenuItem::Tournaments, Char('p'), _) => guard.tournaments_page(false),
        (MenuItem::Tournaments, KeyCode::Enter, _) => guard.open_selected_tournament(),

        // Memberships
        (MenuItem::Memberships, Char('j') | KeyCode::Down, _) => guard.requests_select(true),
        (MenuItem::Memberships, Char('k') | KeyCode::Up, _) => guard.requests_select(false),
        (MenuItem::Memberships, Char('s'), _) => guard.cycle_request_status(),
        (MenuItem::Memberships, Char('/'), _) => guard.begin_search(),
        (MenuItem::Memberships, Char('a'), _) => guard.review_selected_request(Decision::Approve),
        (MenuItem::Memberships, Char('x'), _) => guard.review_selected_request(Decision::Reject),
        (MenuItem::Memberships, Char('n'), _) => guard.requests_page(true),
        (MenuItem::Memberships, Char('p'), _) => guard.requests_page(false),

        // Rankings
        (MenuItem::Rankings, Char('c'), _) => guard.cycle_ranking_category(),
        (MenuItem::Rankings, Char('j') | KeyCode::Down, _) => guard.rankings_scroll(true),
        (MenuItem::Rankings, Char('k') | KeyCode::Up, _) => guard.rankings_scroll(false),

        // Global
        (_, Char('r'), _) => {
            drop(guard);
            let _ = data_requests.send(DataRequest::Load).await;
        }
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }
}
