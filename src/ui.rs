pub mod overlay;
pub mod screen;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
    Frame,
};

use crate::{ui::screen::current_screen, App};

pub mod palette {
    use ratatui::style::Color;

    pub const BACKGROUND: Color = Color::Rgb(0x53, 0x9f, 0xa2);
    pub const INK: Color = Color::Rgb(0xd4, 0xe2, 0xb6);
    pub const PANEL: Color = Color::Rgb(0x3f, 0x7f, 0x82);
    pub const ACCENT: Color = Color::Rgb(0xc4, 0xdb, 0xb4);
    pub const TIMER: Color = Color::Rgb(0xe2, 0xb6, 0xb6);
    pub const GAIN: Color = Color::Rgb(0x86, 0xef, 0xac);
    pub const BADGE: Color = Color::Rgb(0xfe, 0xf0, 0x8a);
}

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Block::default()
            .style(Style::default().bg(palette::BACKGROUND).fg(palette::INK))
            .render(area, buf);

        let session = self.game.session();
        current_screen(&session.phase()).render(session, area, buf);

        if let Some(overlay) = self.overlay {
            overlay.render(session.phase(), session.audio_enabled(), area, buf);
        }
    }
}

/// Spaced, bold digits. Used for the countdown, the timer and the problem.
pub fn digits(text: &str, style: Style) -> Line<'static> {
    Line::from(Span::styled(
        text.chars().join(" "),
        style.add_modifier(Modifier::BOLD),
    ))
}

/// A `width` x `height` box centred in `area`, shrunk to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height - height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width - width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);
    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_spaced() {
        let line = digits("128", Style::default());
        assert_eq!(line.spans[0].content, "1 2 8");
    }

    #[test]
    fn centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 80, 24);
        let r = centered_rect(40, 10, area);
        assert_eq!(r, Rect::new(20, 7, 40, 10));

        let tiny = Rect::new(0, 0, 10, 4);
        let r = centered_rect(40, 10, tiny);
        assert!(r.width <= 10 && r.height <= 4);
    }
}
