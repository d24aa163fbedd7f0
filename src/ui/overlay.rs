use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use somas::session::Phase;

use super::{centered_rect, palette};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsItem {
    Sound,
    BackToStart,
    Restart,
    Close,
}

const ALL_ITEMS: [SettingsItem; 4] = [
    SettingsItem::Sound,
    SettingsItem::BackToStart,
    SettingsItem::Restart,
    SettingsItem::Close,
];

impl SettingsItem {
    /// Reset and restart only make sense once a game has been started
    fn visible(&self, phase: Phase) -> bool {
        match self {
            SettingsItem::BackToStart | SettingsItem::Restart => phase != Phase::Idle,
            SettingsItem::Sound | SettingsItem::Close => true,
        }
    }

    pub fn items(phase: Phase) -> Vec<SettingsItem> {
        ALL_ITEMS.into_iter().filter(|i| i.visible(phase)).collect()
    }

    pub fn next(&self, phase: Phase) -> SettingsItem {
        let items = Self::items(phase);
        let idx = items.iter().position(|i| i == self).unwrap_or(0);
        items[(idx + 1).min(items.len() - 1)]
    }

    pub fn previous(&self, phase: Phase) -> SettingsItem {
        let items = Self::items(phase);
        let idx = items.iter().position(|i| i == self).unwrap_or(0);
        items[idx.saturating_sub(1)]
    }

    fn label(&self, audio_enabled: bool) -> String {
        match self {
            SettingsItem::Sound => format!("Sound: {}", if audio_enabled { "ON" } else { "OFF" }),
            SettingsItem::BackToStart => "Back to start".to_string(),
            SettingsItem::Restart => "Restart match".to_string(),
            SettingsItem::Close => "Close".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Help,
    Settings { selected: SettingsItem },
}

impl Overlay {
    pub fn settings() -> Self {
        Overlay::Settings {
            selected: SettingsItem::Sound,
        }
    }

    pub fn render(&self, phase: Phase, audio_enabled: bool, area: Rect, buf: &mut Buffer) {
        let boxed = centered_rect(44, 11, area);
        Clear.render(boxed, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette::ACCENT))
            .style(Style::default().bg(palette::PANEL).fg(palette::INK));

        match self {
            Overlay::Help => {
                let text = vec![
                    Line::from("Solve each sum to move on. Every answer"),
                    Line::from("becomes the next number to double."),
                    Line::from(""),
                    Line::from("The faster you answer, the more you score,"),
                    Line::from("and every hit adds time to the clock."),
                    Line::from(""),
                    Line::from(Span::styled(
                        "(esc) close",
                        Style::default().add_modifier(Modifier::ITALIC),
                    )),
                ];
                Paragraph::new(text)
                    .block(block.title(" How to play "))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(boxed, buf);
            }
            Overlay::Settings { selected } => {
                let mut lines: Vec<Line> = SettingsItem::items(phase)
                    .into_iter()
                    .map(|item| {
                        let label = item.label(audio_enabled);
                        if item == *selected {
                            Line::from(Span::styled(
                                format!("> {label} <"),
                                Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED),
                            ))
                        } else {
                            Line::from(label)
                        }
                    })
                    .collect();
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "↑/↓ select  (enter) choose  (esc) close",
                    Style::default().add_modifier(Modifier::ITALIC),
                )));
                Paragraph::new(lines)
                    .block(block.title(" Settings "))
                    .alignment(Alignment::Center)
                    .render(boxed, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_menu_hides_session_actions() {
        assert_eq!(
            SettingsItem::items(Phase::Idle),
            vec![SettingsItem::Sound, SettingsItem::Close]
        );
        assert_eq!(SettingsItem::items(Phase::Playing).len(), 4);
    }

    #[test]
    fn navigation_clamps_at_ends() {
        assert_eq!(
            SettingsItem::Sound.previous(Phase::Playing),
            SettingsItem::Sound
        );
        assert_eq!(SettingsItem::Close.next(Phase::Playing), SettingsItem::Close);
        assert_eq!(
            SettingsItem::Sound.next(Phase::GameOver),
            SettingsItem::BackToStart
        );
    }
}
