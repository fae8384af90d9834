use padel_core::geometry::{ConnectorDirection, MatchPlacement};
use padel_core::{Association, Bracket, BracketLayout, LayoutConstants, Match, MatchStatus, Side};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

use crate::components::banner_frames::{BannerColor, BannerTheme, resolve};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Width of the connector zone drawn between adjacent round columns.
pub const CONNECTOR_WIDTH: u16 = 3;

/// Card width in wide terminals.
const CELL_W_FULL: u16 = 30;

/// Narrowest card that still fits a surname pair and three set badges.
const CELL_W_MIN: u16 = 20;

/// Columns taken by one set badge, e.g. `" 6"`.
const BADGE_W: usize = 2;

pub const EMPTY_MESSAGE: &str = "Brackets not yet generated";

/// How many round columns fit side by side in `width`.
pub fn visible_rounds(width: u16, round_count: usize) -> usize {
    let fit = usize::from((width + CONNECTOR_WIDTH) / (CELL_W_MIN + CONNECTOR_WIDTH));
    fit.clamp(1, round_count.max(1))
}

/// Card width when `visible` columns share `width`.
fn cell_width(width: u16, visible: usize) -> u16 {
    let visible = u16::try_from(visible.max(1)).unwrap_or(u16::MAX);
    let connectors = CONNECTOR_WIDTH.saturating_mul(visible - 1);
    (width.saturating_sub(connectors) / visible).min(CELL_W_FULL)
}

/// Floor a continuous layout coordinate to a terminal row.
///
/// Equal inputs always land on the same row, so the two sibling connectors
/// meet the parent's stub exactly.
pub fn to_row(y: f64) -> u16 {
    y.floor().clamp(0.0, f64::from(u16::MAX)) as u16
}

/// First and one-past-last row of a match card.
pub fn card_rows(placement: &MatchPlacement) -> (u16, u16) {
    let top = to_row(placement.top);
    (top, top.saturating_add(to_row(placement.height)))
}

// ---------------------------------------------------------------------------
// BracketView widget
// ---------------------------------------------------------------------------

/// Renders every round of a bracket as columns of match cards joined by
/// box-drawing connectors. Positions come from [`BracketLayout`].
pub struct BracketView<'a> {
    pub bracket: &'a Bracket,
    /// Resolves pair ids to player names.
    pub association: &'a Association,
    pub constants: LayoutConstants,
    /// `(round, index)` of the highlighted match.
    pub selected: (usize, usize),
    /// Vertical scroll offset in terminal rows.
    pub scroll_offset: u16,
    /// Leftmost round column drawn.
    pub first_visible_round: usize,
    pub theme: BannerTheme,
}

impl<'a> Widget for BracketView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let Some(layout) = BracketLayout::for_bracket(self.bracket, self.constants) else {
            let style = resolve(BannerColor::Dim, self.theme);
            let x = area.x + area.width.saturating_sub(EMPTY_MESSAGE.len() as u16) / 2;
            let y = area.y + area.height / 2;
            buf.set_stringn(x, y, EMPTY_MESSAGE, usize::from(area.width), style);
            return;
        };

        let rounds = self.bracket.round_count();
        let visible = visible_rounds(area.width, rounds);
        let first = self.first_visible_round.min(rounds.saturating_sub(1));
        let cell_w = cell_width(area.width, visible);
        let stride = cell_w + CONNECTOR_WIDTH;

        let canvas = Canvas { area, scroll: self.scroll_offset };
        for (column, round) in (first..rounds).enumerate() {
            let Some(offset) = u16::try_from(column)
                .ok()
                .and_then(|c| c.checked_mul(stride))
                .filter(|&o| o < area.width)
            else {
                break;
            };
            let x = area.x + offset;

            for placement in layout.placements(round) {
                let Some(m) = self.bracket.get(round, placement.index) else {
                    continue;
                };
                let selected = self.selected == (round, placement.index);
                let card = Card {
                    m,
                    association: self.association,
                    selected,
                    theme: self.theme,
                };
                card.draw(&canvas, placement, x, cell_w, buf);
                draw_connectors(&canvas, placement, x, cell_w, column == 0, self.theme, buf);
            }
        }
    }
}

/// Scroll and clip state shared by everything drawn in one frame.
struct Canvas {
    area: Rect,
    scroll: u16,
}

impl Canvas {
    /// Absolute screen y for a bracket-relative row, if it is on screen.
    fn screen_y(&self, row: u16) -> Option<u16> {
        let rel = row.checked_sub(self.scroll)?;
        (rel < self.area.height).then(|| self.area.y + rel)
    }

    fn limit_x(&self) -> u16 {
        self.area.x + self.area.width
    }

    fn put(&self, buf: &mut Buffer, x: u16, row: u16, ch: char, style: Style) {
        if x >= self.limit_x() {
            return;
        }
        if let Some(y) = self.screen_y(row) {
            put_char(buf, x, y, ch, style);
        }
    }

    fn text(&self, buf: &mut Buffer, x: u16, row: u16, text: &str, style: Style) {
        if x >= self.limit_x() {
            return;
        }
        if let Some(y) = self.screen_y(row) {
            let avail = usize::from(self.limit_x() - x);
            buf.set_stringn(x, y, text, avail, style);
        }
    }
}

// ---------------------------------------------------------------------------
// Match card
// ---------------------------------------------------------------------------

struct Card<'a> {
    m: &'a Match,
    association: &'a Association,
    selected: bool,
    theme: BannerTheme,
}

impl Card<'_> {
    /// Pair 1 on the top row, status on the centre row, pair 2 on the bottom
    /// row. A coloured bar down the left edge shows the status.
    fn draw(&self, canvas: &Canvas, placement: &MatchPlacement, x: u16, width: u16, buf: &mut Buffer) {
        let (top, end) = card_rows(placement);
        let bottom = end.saturating_sub(1);
        let centre = to_row(placement.center);
        let edge = status_accent(self.m.status);
        for row in top..end {
            canvas.put(buf, x, row, '▌', edge);
        }

        let text_w = usize::from(width.saturating_sub(1));
        self.draw_pair_row(canvas, Side::One, x + 1, top, text_w, buf);
        self.draw_pair_row(canvas, Side::Two, x + 1, bottom, text_w, buf);
        if centre > top && centre < bottom {
            let status = format_status_line(self.m, text_w);
            canvas.text(buf, x + 1, centre, &status, status_text_style(self.m.status, self.theme));
        }
    }

    fn draw_pair_row(&self, canvas: &Canvas, side: Side, x: u16, row: u16, width: usize, buf: &mut Buffer) {
        let won = self.m.status == MatchStatus::Finished && self.m.winner == Some(side);
        let name = self.association.slot_label(self.m.slot(side), true);
        let sets = &self.m.scores[side.index()];
        let name_w = width.saturating_sub(sets.len() * BADGE_W + 1);

        let mut base = if self.selected {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        if won {
            base = base.bg(Color::Rgb(24, 64, 32)).fg(Color::White);
        }
        if !self.m.slot(side).is_pair() {
            base = base.add_modifier(Modifier::ITALIC);
        }

        let line = format_name(won, &name, name_w);
        canvas.text(buf, x, row, &line, base);

        let mut bx = x.saturating_add(u16::try_from(line.chars().count()).unwrap_or(u16::MAX));
        for (set, games) in sets.iter().enumerate() {
            let badge = format!("{games:>BADGE_W$}");
            let style = if self.m.set_leader(set) == Some(side) {
                base.patch(resolve(BannerColor::Accent, self.theme))
            } else {
                base.patch(resolve(BannerColor::Dim, self.theme))
            };
            canvas.text(buf, bx, row, &badge, style);
            bx = bx.saturating_add(BADGE_W as u16);
        }
    }
}

/// `"✓ Name        "` or `"  Name        "`, padded to `width` columns.
fn format_name(won: bool, name: &str, width: usize) -> String {
    let mark = if won { '✓' } else { ' ' };
    let name_w = width.saturating_sub(2);
    let name: String = name.chars().take(name_w).collect();
    format!("{mark} {name:<name_w$}")
}

/// `"  FINAL"`, `"  LIVE"` or `"  PENDING 16/10 18:30 Pista 1"`.
fn format_status_line(m: &Match, width: usize) -> String {
    let mut raw = format!("  {}", m.status.label());
    if m.status != MatchStatus::Finished
        && let Some(summary) = m.schedule.summary()
    {
        raw.push(' ');
        raw.push_str(&summary);
    }
    let raw: String = raw.chars().take(width).collect();
    format!("{raw:<width$}")
}

fn status_accent(status: MatchStatus) -> Style {
    let color = match status {
        MatchStatus::Pending => Color::Indexed(240),
        MatchStatus::InProgress => Color::Rgb(255, 193, 7),
        MatchStatus::Finished => Color::Green,
    };
    Style::default().fg(color)
}

fn status_text_style(status: MatchStatus, theme: BannerTheme) -> Style {
    match status {
        MatchStatus::InProgress => resolve(BannerColor::Secondary, theme),
        _ => resolve(BannerColor::Dim, theme),
    }
}

// ---------------------------------------------------------------------------
// Connectors
// ---------------------------------------------------------------------------

/// Right stub and vertical run for one match, plus its left stub when it is
/// fed by a visible column.
///
/// ```text
///  upper  ─┐
///          │
///          ├─  parent
///          │
///  lower  ─┘
/// ```
fn draw_connectors(
    canvas: &Canvas,
    placement: &MatchPlacement,
    x: u16,
    width: u16,
    leftmost: bool,
    theme: BannerTheme,
    buf: &mut Buffer,
) {
    let style = resolve(BannerColor::Dim, theme);
    let centre = to_row(placement.center);

    if placement.incoming && !leftmost && x > canvas.area.x {
        canvas.put(buf, x - 1, centre, '─', style);
    }

    let Some(connector) = placement.outgoing else {
        return;
    };
    let col_a = x.saturating_add(width);
    let col_b = col_a.saturating_add(1);
    let merge = to_row(connector.merge_y);

    canvas.put(buf, col_a, centre, '─', style);
    match connector.direction {
        ConnectorDirection::Down => {
            canvas.put(buf, col_b, centre, '┐', style);
            for row in centre.saturating_add(1)..merge {
                canvas.put(buf, col_b, row, '│', style);
            }
        }
        ConnectorDirection::Up => {
            canvas.put(buf, col_b, centre, '┘', style);
            for row in merge.saturating_add(1)..centre {
                canvas.put(buf, col_b, row, '│', style);
            }
        }
    }
    canvas.put(buf, col_b, merge, '├', style);
}

fn put_char(buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use padel_core::{Pair, PairId, Round, Slot};

    fn pair(id: &str, a: &str, b: &str) -> Pair {
        Pair { id: PairId::new(id), players: [a.into(), b.into()] }
    }

    fn association() -> Association {
        Association {
            pairs: vec![
                pair("a", "Ana Soto", "Bea Ruiz"),
                pair("b", "Carla Paz", "Dora Gil"),
                pair("c", "Eva Luna", "Fe Mora"),
                pair("d", "Gala Rey", "Iris Vega"),
            ],
            ..Association::default()
        }
    }

    fn slot(id: &str) -> Slot {
        Slot::Pair(PairId::new(id))
    }

    fn semis_and_final() -> Bracket {
        let mut sf1 = Match::new("SF1", slot("a"), slot("b"));
        sf1.scores = [vec![6, 6], vec![3, 4]];
        sf1.status = MatchStatus::Finished;
        sf1.winner = Some(Side::One);
        let sf2 = Match::new("SF2", slot("c"), slot("d"));
        let fin = Match::new("F", slot("a"), Slot::ToBeDecided);
        Bracket::new(vec![
            Round { name: "Semifinals".into(), matches: vec![sf1, sf2] },
            Round { name: "Final".into(), matches: vec![fin] },
        ])
        .unwrap()
    }

    fn render(bracket: &Bracket, area: Rect, scroll: u16) -> Buffer {
        let assoc = association();
        let mut buf = Buffer::empty(area);
        BracketView {
            bracket,
            association: &assoc,
            constants: LayoutConstants::TERMINAL,
            selected: (0, 0),
            scroll_offset: scroll,
            first_visible_round: 0,
            theme: BannerTheme::Dark,
        }
        .render(area, &mut buf);
        buf
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    fn symbol(buf: &Buffer, x: u16, y: u16) -> &str {
        buf[(x, y)].symbol()
    }

    #[test]
    fn test_rows_floor_consistently() {
        assert_eq!(to_row(1.5), 1);
        assert_eq!(to_row(3.5), 3);
        assert_eq!(to_row(-2.0), 0);
    }

    #[test]
    fn test_visible_rounds_and_width() {
        assert_eq!(visible_rounds(200, 3), 3);
        assert_eq!(visible_rounds(42, 3), 1);
        assert_eq!(visible_rounds(43, 3), 2);
        assert_eq!(visible_rounds(10, 0), 1);
        assert_eq!(cell_width(200, 3), CELL_W_FULL);
        assert_eq!(cell_width(47, 2), 22);
    }

    #[test]
    fn test_empty_bracket_message() {
        let area = Rect::new(0, 0, 40, 5);
        let buf = render(&Bracket::empty(), area, 0);
        assert!(row_text(&buf, 2).contains(EMPTY_MESSAGE));
    }

    #[test]
    fn test_cards_and_winner_mark() {
        let area = Rect::new(0, 0, 80, 8);
        let buf = render(&semis_and_final(), area, 0);
        let top = row_text(&buf, 0);
        assert!(top.starts_with("▌✓ Soto/Ruiz"), "row: {top:?}");
        assert!(row_text(&buf, 1).contains("FINAL"));
        assert!(row_text(&buf, 2).contains("Paz/Gil"));
        // Final column: pair from the semi on top, undecided slot below.
        assert!(row_text(&buf, 2).contains("Soto/Ruiz"));
        assert!(row_text(&buf, 4).contains("To be decided"));
    }

    #[test]
    fn test_set_badges_highlight_leader() {
        let area = Rect::new(0, 0, 80, 8);
        let buf = render(&semis_and_final(), area, 0);
        let width = cell_width(80, 2);
        // Last badge sits one column inside the card's right edge.
        let x = width - 2;
        assert_eq!(symbol(&buf, x, 0), "6");
        assert_eq!(symbol(&buf, x, 2), "4");
        let accent = resolve(BannerColor::Accent, BannerTheme::Dark).fg;
        assert_eq!(buf[(x, 0)].fg, accent.unwrap_or(Color::Reset));
        assert_ne!(buf[(x, 2)].fg, accent.unwrap_or(Color::Reset));
    }

    #[test]
    fn test_connectors_meet_parent_centre() {
        let area = Rect::new(0, 0, 80, 8);
        let buf = render(&semis_and_final(), area, 0);
        let col_a = cell_width(80, 2);
        let col_b = col_a + 1;
        // Semis centred on rows 1 and 5, final on row 3.
        assert_eq!(symbol(&buf, col_a, 1), "─");
        assert_eq!(symbol(&buf, col_b, 1), "┐");
        assert_eq!(symbol(&buf, col_b, 2), "│");
        assert_eq!(symbol(&buf, col_b, 3), "├");
        assert_eq!(symbol(&buf, col_b, 4), "│");
        assert_eq!(symbol(&buf, col_b, 5), "┘");
        assert_eq!(symbol(&buf, col_b + 1, 3), "─");
    }

    #[test]
    fn test_vertical_scroll_shifts_rows() {
        let area = Rect::new(0, 0, 80, 4);
        let buf = render(&semis_and_final(), area, 4);
        // Row 4 (pair 1 of the second semi) is now the first screen row.
        assert!(row_text(&buf, 0).contains("Luna/Mora"));
    }

    #[test]
    fn test_horizontal_scroll_hides_early_rounds() {
        let assoc = association();
        let bracket = semis_and_final();
        let area = Rect::new(0, 0, 30, 8);
        let mut buf = Buffer::empty(area);
        BracketView {
            bracket: &bracket,
            association: &assoc,
            constants: LayoutConstants::TERMINAL,
            selected: (1, 0),
            scroll_offset: 0,
            first_visible_round: 1,
            theme: BannerTheme::Dark,
        }
        .render(area, &mut buf);
        // Only the final is on screen, starting in the first column, no left stub.
        assert!(row_text(&buf, 2).starts_with("▌  Soto/Ruiz"));
        assert!(row_text(&buf, 3).contains("PENDING"));
    }

    #[test]
    fn test_status_line_includes_schedule_until_finished() {
        let mut m = Match::new("M", slot("a"), slot("b"));
        m.schedule.court = Some("Pista 2".into());
        assert_eq!(format_status_line(&m, 20), "  PENDING Pista 2   ");
        m.status = MatchStatus::Finished;
        assert_eq!(format_status_line(&m, 10), "  FINAL   ");
    }

    #[test]
    fn test_format_name_width() {
        assert_eq!(format_name(true, "Soto/Ruiz", 12), "✓ Soto/Ruiz ");
        assert_eq!(format_name(false, "A very long pair name", 8).chars().count(), 8);
    }
}
