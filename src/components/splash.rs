use crate::components::banner_frames::{
    BannerColor, BannerTheme, ball_glyph, net_column, rally_position, resolve, title_rows,
};
use padel_core::ClubSummary;
use tui::buffer::Buffer;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Widget};

const COURT_HEIGHT: u16 = 3;

/// Intro screen: the club at a glance over a rally that never ends.
pub struct ClubSplash<'a> {
    /// `None` until a snapshot has loaded.
    pub summary: Option<&'a ClubSummary>,
    /// Shown in place of the figures while there is no summary.
    pub status: &'a str,
    pub frame: usize,
    pub tick: u64,
    pub theme: BannerTheme,
}

impl Widget for ClubSplash<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let name = self.summary.map_or("padeltui", |s| s.name.as_str());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(resolve(BannerColor::Primary, self.theme))
            .title(Line::from(format!(" {name} ")).centered());
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.is_empty() {
            return;
        }

        let big_title = inner.width as usize > title_rows()[0].len() && inner.height >= 9;
        let [title_area, court_area, facts_area] = Layout::vertical([
            Constraint::Length(if big_title { 4 } else { 1 }),
            Constraint::Length(COURT_HEIGHT),
            Constraint::Fill(1),
        ])
        .areas(inner);

        let title: Vec<Line> = if big_title {
            title_rows().iter().map(|row| Line::from(*row)).collect()
        } else {
            vec![Line::from("PADEL TUI")]
        };
        Paragraph::new(title)
            .style(resolve(BannerColor::Accent, self.theme))
            .alignment(Alignment::Center)
            .render(title_area, buf);

        draw_court(&self, court_area, buf);

        Paragraph::new(self.facts())
            .alignment(Alignment::Center)
            .render(facts_area, buf);
    }
}

impl ClubSplash<'_> {
    fn facts(&self) -> Vec<Line<'static>> {
        let Some(summary) = self.summary else {
            return vec![Line::from(self.status.to_string())];
        };
        let figure = |n: usize| Span::styled(n.to_string(), resolve(BannerColor::Secondary, self.theme));
        let mut lines = vec![Line::from(vec![
            figure(summary.in_progress),
            Span::raw(" in progress · "),
            figure(summary.upcoming),
            Span::raw(" upcoming · "),
            figure(summary.pending_requests),
            Span::raw(" membership requests pending"),
        ])];
        lines.push(match &summary.next_match {
            Some(next) => Line::from(format!(
                "Next: {}, {} vs {}, {}",
                next.tournament, next.pairs[0], next.pairs[1], next.when
            )),
            None => Line::styled(
                "No knockout matches scheduled",
                resolve(BannerColor::Dim, self.theme),
            ),
        });
        lines
    }
}

/// Ground line with the net in the middle and the ball in flight.
fn draw_court(splash: &ClubSplash, area: Rect, buf: &mut Buffer) {
    if area.height < COURT_HEIGHT || area.width < 3 {
        return;
    }
    let ground = area.y + COURT_HEIGHT - 1;
    let line = resolve(BannerColor::Primary, splash.theme);
    buf.set_string(area.x, ground, "─".repeat(area.width as usize), line);

    let net = area.x + net_column(area.width);
    buf.set_string(net, ground - 1, "┃", resolve(BannerColor::Shadow, splash.theme));
    buf.set_string(net, ground, "┻", line);

    let (x, lift) = rally_position(splash.tick, area.width);
    buf.set_string(
        area.x + x,
        ground - lift,
        ball_glyph(splash.frame),
        resolve(BannerColor::Secondary, splash.theme),
    );
}
