use log::error;
use padel_core::admin::{self, RequestStatus, TournamentStatus};
use padel_core::geometry::BracketLayout;
use padel_core::standings::{self, StandingRow};
use padel_core::bracket::round_name;
use padel_core::{Association, Side, Slot, Tournament, Zone};
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table, TableState, Tabs};
use tui::{Frame, Terminal};
use tui_logger::{TuiLoggerLevelOutput, TuiLoggerWidget};

use crate::app::{App, MenuItem};
use crate::components::banner_frames::BannerTheme;
use crate::components::bracket::{BracketView, card_rows, visible_rounds};
use crate::components::splash::ClubSplash;
use crate::state::loader::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;

static TABS: &[&str; 5] = &["Bracket", "Zones", "Tournaments", "Memberships", "Rankings"];

const HELP_TEXT: &str = "\
Global
  1-5      switch tab            ?    help (Esc to leave)
  [ / ]    previous / next tournament (Bracket, Zones)
  r        reload snapshot       f    full screen
  \"        toggle log pane       q    quit

Bracket
  h/l      previous / next round j/k  previous / next match
  s        start match           e    enter result, e.g. 6-4 3-6 7-5
  g        generate bracket from zone standings

Tournaments
  s        cycle status filter   c    cycle category filter
  n/p      next / previous page  Enter  open bracket

Memberships
  s        cycle status filter   /    search name or email
  a / x    approve / reject      n/p  next / previous page

Rankings
  c        cycle category        j/k  scroll";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        if app.state.show_intro {
            draw_intro(f, f.area(), app);
            return;
        }

        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Bracket => draw_bracket(f, layout.main, app),
            MenuItem::Zones => draw_zones(f, layout.main, app),
            MenuItem::Tournaments => draw_tournaments(f, layout.main, app),
            MenuItem::Memberships => draw_memberships(f, layout.main, app),
            MenuItem::Rankings => draw_rankings(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if app.state.show_logs {
            draw_logs(f, layout.logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_intro(f: &mut Frame, area: Rect, app: &App) {
    let [_top_pad, splash_area, prompt_area, _bottom_pad] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(14),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [splash_area] = Layout::horizontal([Constraint::Max(90)])
        .flex(Flex::Center)
        .areas(splash_area);

    let summary = app.state.association.as_ref().map(|a| a.summary(app.state.today));
    let status = match &app.state.last_error {
        Some(_) => "Snapshot failed to load, see the log pane",
        None => "Loading association...",
    };
    f.render_widget(
        ClubSplash {
            summary: summary.as_ref(),
            status,
            frame: app.state.animation.frame,
            tick: app.state.animation.tick,
            theme: BannerTheme::Dark,
        },
        splash_area,
    );
    f.render_widget(
        Paragraph::new("Press Enter to open the back-office")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        prompt_area,
    );
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Bracket => 0,
        MenuItem::Zones => 1,
        MenuItem::Tournaments => 2,
        MenuItem::Memberships => 3,
        MenuItem::Rankings => 4,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Shown in place of a tab body until the snapshot has loaded.
fn draw_not_loaded(f: &mut Frame, area: Rect, app: &App) {
    let msg = match app.state.last_error.as_deref() {
        Some(err) => format!("Snapshot load failed:\n{err}"),
        None => "Loading association data...".to_string(),
    };
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn highlight() -> Style {
    Style::default()
        .bg(Color::Rgb(30, 60, 110))
        .add_modifier(Modifier::BOLD)
}

// ---------------------------------------------------------------------------
// Bracket tab
// ---------------------------------------------------------------------------

fn draw_bracket(f: &mut Frame, area: Rect, app: &mut App) {
    let block = default_border(Color::White).title(" Bracket ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [header, content, footer] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let constants = app.settings.layout_constants();
    let Some(tournament) = app.selected_tournament() else {
        draw_not_loaded(f, inner, app);
        return;
    };
    let shape = tournament.bracket.shape();

    // Keep the selection on screen before borrowing the bracket for drawing.
    if !shape.is_empty() {
        let layout = BracketLayout::new(constants, &shape);
        let bracket_state = &mut app.state.bracket;
        if let Some(placement) = layout.placement(bracket_state.round, bracket_state.selected_match) {
            let (top, bottom) = card_rows(placement);
            bracket_state.keep_rows_visible(top, bottom, content.height);
        }
        bracket_state.keep_round_visible(visible_rounds(content.width, shape.len()));
    }

    let (Some(assoc), Some(tournament)) = (app.state.association.as_ref(), app.selected_tournament())
    else {
        return;
    };
    let state = &app.state.bracket;

    f.render_widget(Paragraph::new(bracket_header(assoc, tournament, app)), header);
    f.render_widget(
        BracketView {
            bracket: &tournament.bracket,
            association: assoc,
            constants,
            selected: (state.round, state.selected_match),
            scroll_offset: state.scroll_offset,
            first_visible_round: state.first_visible_round,
            theme: BannerTheme::Dark,
        },
        content,
    );

    let footer_line = if state.result_entry.composing {
        Line::from(vec![
            Span::styled("Result: ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("{}_", state.result_entry.input)),
            Span::styled("  (Enter save, Esc cancel)", dim()),
        ])
    } else if let Some(notice) = &app.state.notice {
        Line::from(Span::styled(notice.as_str(), Style::default().fg(Color::Yellow)))
    } else if tournament.bracket.is_empty() {
        Line::from(Span::styled("g=generate from zone standings  [ ]=tournament  ?=help", dim()))
    } else {
        Line::from(Span::styled(
            "h/l=round  j/k=match  s=start  e=result  [ ]=tournament  ?=help",
            dim(),
        ))
    };
    f.render_widget(Paragraph::new(footer_line), footer);
}

fn bracket_header<'a>(assoc: &Association, tournament: &'a Tournament, app: &App) -> Vec<Line<'a>> {
    let status = tournament.status(app.state.today);
    let mut first = vec![
        Span::styled(tournament.name.as_str(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            "  {} · {} · {} to {}  ",
            tournament.category,
            tournament.venue,
            tournament.start_date.format("%d/%m"),
            tournament.end_date.format("%d/%m/%Y"),
        )),
        Span::styled(status.label(), tournament_status_style(status)),
    ];
    if let Some(champion) = tournament.bracket.champion() {
        let label = assoc.slot_label(&Slot::Pair(champion.clone()), false);
        first.push(Span::styled(
            format!("  Champion: {label}"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    }

    let state = &app.state.bracket;
    let second = match tournament.bracket.get(state.round, state.selected_match) {
        Some(m) => {
            let round = tournament
                .bracket
                .rounds()
                .get(state.round)
                .map_or("", |r| r.name.as_str());
            let mut text = format!(
                "{round} {}: {} vs {}",
                m.id,
                assoc.slot_label(m.slot(Side::One), false),
                assoc.slot_label(m.slot(Side::Two), false),
            );
            if let Some(when) = m.schedule.summary() {
                text.push_str(&format!("  ({when})"));
            }
            Line::from(Span::styled(text, dim()))
        }
        None => Line::default(),
    };
    vec![Line::from(first), second]
}

fn tournament_status_style(status: TournamentStatus) -> Style {
    match status {
        TournamentStatus::Upcoming => Style::default().fg(Color::Cyan),
        TournamentStatus::InProgress => Style::default().fg(Color::Yellow),
        TournamentStatus::Finished => Style::default().fg(Color::Green),
    }
}

// ---------------------------------------------------------------------------
// Zones tab
// ---------------------------------------------------------------------------

fn draw_zones(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Zones ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let (Some(assoc), Some(tournament)) = (app.state.association.as_ref(), app.selected_tournament())
    else {
        draw_not_loaded(f, inner, app);
        return;
    };

    let [header, content] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(tournament.name.as_str(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(
                    "  top {} of each zone qualify (Q)  [ ]=tournament  j/k=scroll",
                    tournament.qualifiers_per_zone
                ),
                dim(),
            ),
        ])),
        header,
    );

    if tournament.zones.is_empty() {
        f.render_widget(
            Paragraph::new("This tournament has no zone stage")
                .style(dim())
                .alignment(Alignment::Center),
            content,
        );
        return;
    }

    let columns = if content.width >= 110 { 2 } else { 1 };
    let skip = usize::from(app.state.zones.scroll_offset).min(tournament.zones.len().saturating_sub(1));
    let zones = &tournament.zones[skip..];
    let mut y = content.y;
    for chunk in zones.chunks(columns) {
        let height = chunk.iter().map(|z| z.pairs.len() as u16 + 3).max().unwrap_or(3);
        if y >= content.y + content.height {
            break;
        }
        let row = Rect::new(content.x, y, content.width, height.min(content.y + content.height - y));
        let cells: Vec<Rect> = Layout::horizontal(vec![Constraint::Fill(1); columns]).split(row).to_vec();
        for (zone, cell) in chunk.iter().zip(cells) {
            draw_zone_table(f, cell, assoc, zone, app.points, tournament.qualifiers_per_zone);
        }
        y = y.saturating_add(height);
    }
}

fn draw_zone_table(
    f: &mut Frame,
    area: Rect,
    assoc: &Association,
    zone: &Zone,
    rule: standings::PointsRule,
    per_zone: usize,
) {
    let rows: Vec<Row> = standings::standings(zone, rule)
        .iter()
        .enumerate()
        .map(|(i, row)| standing_row(assoc, i, row, i < per_zone))
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(4),
        ],
    )
    .header(
        Row::new(vec!["#", "Pair", "PJ", "W", "L", "Sets", "Games", "Pts"])
            .style(Style::default().fg(Color::Yellow)),
    )
    .block(default_border(Color::DarkGray).title(format!(" {} ", zone.name)));
    f.render_widget(table, area);
}

fn standing_row<'a>(assoc: &Association, index: usize, row: &StandingRow, qualified: bool) -> Row<'a> {
    let mark = if qualified { "Q" } else { " " };
    let style = if qualified {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Gray)
    };
    Row::new(vec![
        format!("{}{mark}", index + 1),
        assoc.slot_label(&Slot::Pair(row.pair.clone()), true),
        row.played.to_string(),
        row.wins.to_string(),
        row.losses.to_string(),
        format!("{:+}", row.set_difference()),
        format!("{:+}", row.game_difference()),
        row.points.to_string(),
    ])
    .style(style)
}

// ---------------------------------------------------------------------------
// Tournaments tab
// ---------------------------------------------------------------------------

fn draw_tournaments(f: &mut Frame, area: Rect, app: &App) {
    let filter = &app.state.tournaments.filter;
    let visible = app.visible_tournaments();
    let page = admin::paginate(&visible, app.state.tournaments.page, app.settings.page_size);

    let title = format!(
        " Tournaments | status: {} | category: {} | page {}/{} ({}) ",
        filter.status.map_or("all", |s| s.label()),
        filter.category.as_deref().unwrap_or("all"),
        page.page + 1,
        page.total_pages,
        page.total,
    );
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if app.state.association.is_none() {
        draw_not_loaded(f, inner, app);
        return;
    }

    let [content, footer] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);
    let rows: Vec<Row> = page
        .items
        .iter()
        .map(|t| {
            let status = t.status(app.state.today);
            let bracket = t
                .bracket
                .shape()
                .first()
                .map_or_else(|| "not generated".to_string(), |&first| round_name(first));
            Row::new(vec![
                Span::raw(t.name.clone()),
                Span::raw(t.category.clone()),
                Span::raw(t.venue.clone()),
                Span::raw(format!(
                    "{} - {}",
                    t.start_date.format("%d/%m/%Y"),
                    t.end_date.format("%d/%m/%Y")
                )),
                Span::styled(status.label(), tournament_status_style(status)),
                Span::raw(bracket),
            ])
        })
        .collect();

    if rows.is_empty() {
        f.render_widget(
            Paragraph::new("No tournaments match the filters").style(dim()).alignment(Alignment::Center),
            content,
        );
    } else {
        let table = Table::new(
            rows,
            [
                Constraint::Fill(2),
                Constraint::Length(9),
                Constraint::Fill(2),
                Constraint::Length(24),
                Constraint::Length(12),
                Constraint::Length(16),
            ],
        )
        .header(
            Row::new(vec!["Name", "Category", "Venue", "Dates", "Status", "Bracket"])
                .style(Style::default().fg(Color::Yellow)),
        )
        .row_highlight_style(highlight())
        .highlight_symbol("> ");
        let mut state = TableState::default().with_selected(Some(app.state.tournaments.selected));
        f.render_stateful_widget(table, content, &mut state);
    }

    f.render_widget(
        Paragraph::new("s=status  c=category  n/p=page  j/k=move  Enter=open bracket").style(dim()),
        footer,
    );
}

// ---------------------------------------------------------------------------
// Memberships tab
// ---------------------------------------------------------------------------

fn draw_memberships(f: &mut Frame, area: Rect, app: &App) {
    let memberships = &app.state.memberships;
    let visible = app.visible_requests();
    let page = admin::paginate(&visible, memberships.page, app.settings.page_size);

    let title = format!(
        " Membership requests | status: {} | page {}/{} ({}) ",
        memberships.filter.status.map_or("all", |s| s.label()),
        page.page + 1,
        page.total_pages,
        page.total,
    );
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if app.state.association.is_none() {
        draw_not_loaded(f, inner, app);
        return;
    }

    let [search, content, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let cursor = if memberships.searching { "_" } else { "" };
    let search_style = if memberships.searching {
        Style::default().fg(Color::Yellow)
    } else {
        dim()
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Search: ", search_style),
            Span::raw(format!("{}{cursor}", memberships.filter.query)),
        ])),
        search,
    );

    let rows: Vec<Row> = page
        .items
        .iter()
        .map(|r| {
            Row::new(vec![
                Span::raw(r.applicant.clone()),
                Span::raw(r.email.clone()),
                Span::raw(r.plan.label()),
                Span::raw(r.submitted_on.format("%d/%m/%Y").to_string()),
                Span::styled(r.status.label(), request_status_style(r.status)),
            ])
        })
        .collect();

    if rows.is_empty() {
        f.render_widget(
            Paragraph::new("No membership requests match").style(dim()).alignment(Alignment::Center),
            content,
        );
    } else {
        let table = Table::new(
            rows,
            [
                Constraint::Fill(2),
                Constraint::Fill(3),
                Constraint::Length(8),
                Constraint::Length(11),
                Constraint::Length(9),
            ],
        )
        .header(
            Row::new(vec!["Applicant", "Email", "Plan", "Submitted", "Status"])
                .style(Style::default().fg(Color::Yellow)),
        )
        .row_highlight_style(highlight())
        .highlight_symbol("> ");
        let mut state = TableState::default().with_selected(Some(memberships.selected));
        f.render_stateful_widget(table, content, &mut state);
    }

    let footer_line = match &app.state.notice {
        Some(notice) => Line::from(Span::styled(notice.as_str(), Style::default().fg(Color::Yellow))),
        None => Line::from(Span::styled(
            "s=status  /=search  a=approve  x=reject  n/p=page  j/k=move",
            dim(),
        )),
    };
    f.render_widget(Paragraph::new(footer_line), footer);
}

fn request_status_style(status: RequestStatus) -> Style {
    match status {
        RequestStatus::Pending => Style::default().fg(Color::Yellow),
        RequestStatus::Approved => Style::default().fg(Color::Green),
        RequestStatus::Rejected => Style::default().fg(Color::Red),
    }
}

// ---------------------------------------------------------------------------
// Rankings tab
// ---------------------------------------------------------------------------

fn draw_rankings(f: &mut Frame, area: Rect, app: &App) {
    let (category, rows) = app.ranking_rows();
    let title = format!(" Rankings | category: {} ", category.as_deref().unwrap_or("-"));
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if app.state.association.is_none() {
        draw_not_loaded(f, inner, app);
        return;
    }

    let [content, footer] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);
    let skip = usize::from(app.state.rankings.scroll_offset).min(rows.len().saturating_sub(1));
    let table_rows: Vec<Row> = rows
        .iter()
        .skip(skip)
        .map(|r| {
            let style = if r.position <= 3 {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Row::new(vec![
                r.position.to_string(),
                r.entry.player.clone(),
                r.entry.points.to_string(),
                r.entry.tournaments_played.to_string(),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        table_rows,
        [
            Constraint::Length(4),
            Constraint::Fill(1),
            Constraint::Length(8),
            Constraint::Length(12),
        ],
    )
    .header(
        Row::new(vec!["Pos", "Player", "Points", "Tournaments"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    );
    f.render_widget(table, content);
    f.render_widget(Paragraph::new("c=category  j/k=scroll").style(dim()), footer);
}

// ---------------------------------------------------------------------------
// Help, logs, spinner
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(HELP_TEXT), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let widget = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Gray))
        .output_separator(' ')
        .output_timestamp(Some("%H:%M:%S".to_string()))
        .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
        .output_target(false)
        .output_file(false)
        .output_line(false);
    f.render_widget(widget, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;
    use padel_core::source::parse_association;
    use tui::backend::TestBackend;

    const FIXTURE: &str = include_str!("../core/fixtures/association.json");

    fn loaded_app() -> App {
        let mut app = App::new(AppSettings::default());
        app.dismiss_intro();
        app.on_data_loaded(parse_association(FIXTURE).unwrap(), "test".into());
        app
    }

    fn screen(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        draw(&mut terminal, app, LoadingState::default());
        let buf = terminal.backend().buffer();
        (0..height)
            .map(|y| (0..width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_bracket_tab_renders_rounds() {
        let mut app = loaded_app();
        let out = screen(&mut app, 120, 30);
        assert!(out.contains("Open de Otoño"));
        assert!(out.contains("LIVE"));
        assert!(out.contains("To be decided"));
    }

    #[test]
    fn test_empty_bracket_message() {
        let mut app = loaded_app();
        app.next_tournament();
        let out = screen(&mut app, 100, 24);
        assert!(out.contains("Brackets not yet generated"));
        assert!(out.contains("g=generate"));
    }

    #[test]
    fn test_zones_mark_qualifiers() {
        let mut app = loaded_app();
        app.update_tab(MenuItem::Zones);
        let out = screen(&mut app, 120, 40);
        assert!(out.contains("Zone A"));
        assert!(out.contains("1Q"));
    }

    #[test]
    fn test_selection_scrolls_into_view() {
        let mut app = loaded_app();
        for _ in 0..3 {
            app.bracket_match_down();
        }
        screen(&mut app, 60, 14);
        assert!(app.state.bracket.scroll_offset > 0);
    }

    #[test]
    fn test_intro_shows_club_at_a_glance() {
        let mut app = App::new(AppSettings::default());
        let out = screen(&mut app, 100, 24);
        assert!(out.contains("Loading association..."));

        app.on_data_loaded(parse_association(FIXTURE).unwrap(), "test".into());
        let out = screen(&mut app, 100, 24);
        assert!(out.contains("Club de Pádel Los Álamos"));
        assert!(out.contains("membership requests pending"));
        assert!(out.contains("Press Enter"));
    }

    #[test]
    fn test_tiny_terminal_is_skipped() {
        let mut app = loaded_app();
        let out = screen(&mut app, 10, 10);
        assert!(out.trim().is_empty());
    }
}
