use tui::style::{Color, Modifier, Style};

/// Spin phases of the rally ball.
pub const FRAME_COUNT: usize = 4;
const BALL_GLYPHS: [&str; FRAME_COUNT] = ["●", "◐", "●", "◑"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BannerColor {
    Primary,
    Secondary,
    Accent,
    Shadow,
    Dim,
    Winner,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum BannerTheme {
    #[default]
    Dark,
}

pub fn resolve(color: BannerColor, _theme: BannerTheme) -> Style {
    match color {
        // Court blue and ball yellow.
        BannerColor::Primary => Style::default().fg(Color::Rgb(30, 110, 190)),
        BannerColor::Secondary => Style::default().fg(Color::Rgb(214, 232, 40)),
        BannerColor::Accent => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        BannerColor::Shadow | BannerColor::Dim => Style::default().fg(Color::Indexed(240)),
        BannerColor::Winner => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    }
}

pub fn ball_glyph(frame: usize) -> &'static str {
    BALL_GLYPHS[frame % FRAME_COUNT]
}

/// Column of the net on a court `width` cells wide.
pub fn net_column(width: u16) -> u16 {
    width.saturating_sub(1) / 2
}

/// Ball position in a rally across a court `width` cells wide: the column,
/// and its lift above the ground (0 at the baselines, 2 over the net).
pub fn rally_position(tick: u64, width: u16) -> (u16, u16) {
    let span = u64::from(width.saturating_sub(1));
    if span == 0 {
        return (0, 0);
    }
    let t = tick % (2 * span);
    let x = if t <= span { t } else { 2 * span - t };

    let half = span as f64 / 2.0;
    let reach = (x as f64 - half).abs() / half;
    let lift = (2.0 * (1.0 - reach * reach)).round().clamp(0.0, 2.0);
    (x as u16, lift as u16)
}

pub fn title_rows() -> [&'static str; 4] {
    [
        " ___  _   ___  ___ _      _____ _   _ ___ ",
        "| _ \\/_\\ |   \\| __| |    |_   _| | | |_ _|",
        "|  _/ _ \\| |) | _|| |__    | | | |_| || | ",
        "|_|/_/ \\_\\___/|___|____|   |_|  \\___/|___|",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rally_crosses_the_net_and_back() {
        // 21 columns, net at 10.
        assert_eq!(net_column(21), 10);
        assert_eq!(rally_position(0, 21), (0, 0));
        assert_eq!(rally_position(10, 21), (10, 2));
        assert_eq!(rally_position(20, 21), (20, 0));
        assert_eq!(rally_position(25, 21), (15, 2));
        assert_eq!(rally_position(30, 21), (10, 2));
        assert_eq!(rally_position(40, 21), (0, 0));
        assert_eq!(rally_position(5, 1), (0, 0));
    }

    #[test]
    fn test_title_rows_share_width() {
        let width = title_rows()[0].chars().count();
        assert!(title_rows().iter().all(|row| row.chars().count() == width));
        assert_eq!(ball_glyph(FRAME_COUNT + 1), ball_glyph(1));
    }
}
