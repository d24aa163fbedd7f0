use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use somas::session::{Phase, Session, TIME_BONUS_SECONDS};
use unicode_width::UnicodeWidthStr;

use super::{centered_rect, digits, palette};

const LEGEND_STYLE: Style = Style::new().add_modifier(Modifier::ITALIC);
const ANSWER_MIN_WIDTH: u16 = 12;

/// One full-screen view per session phase
pub trait Screen {
    fn render(&self, session: &Session, area: Rect, buf: &mut Buffer);
}

pub struct TitleScreen;

impl Screen for TitleScreen {
    fn render(&self, _session: &Session, area: Rect, buf: &mut Buffer) {
        let text = vec![
            Line::from(Span::styled(
                "Doubling Sums",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("(enter) start"),
            Line::from(""),
            Line::from(Span::styled(
                "(?) help / (s)ettings / (m)ute / (esc)ape",
                LEGEND_STYLE,
            )),
        ];
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .render(centered_rect(area.width, 5, area), buf);
    }
}

pub struct CountdownScreen;

impl Screen for CountdownScreen {
    fn render(&self, session: &Session, area: Rect, buf: &mut Buffer) {
        if let Some(n) = session.countdown() {
            Paragraph::new(digits(&n.to_string(), Style::default()))
                .alignment(Alignment::Center)
                .render(centered_rect(area.width, 1, area), buf);
        }
    }
}

pub struct AnnounceScreen {
    closing: bool,
}

impl Screen for AnnounceScreen {
    fn render(&self, _session: &Session, area: Rect, buf: &mut Buffer) {
        let style = if self.closing {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Paragraph::new(Span::styled("Started!", style))
            .alignment(Alignment::Center)
            .render(centered_rect(area.width, 1, area), buf);
    }
}

pub struct PlayScreen;

impl PlayScreen {
    fn score_line(session: &Session) -> Line<'static> {
        let mut spans = vec![
            Span::raw("Score: "),
            Span::styled(
                session.displayed_score().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ];
        if let Some((points, leaving)) = session.scoreboard().badge() {
            let mut style = Style::default().fg(palette::BADGE);
            if leaving {
                style = style.add_modifier(Modifier::DIM);
            }
            spans.push(Span::styled(format!("  +{points}"), style));
        }
        Line::from(spans)
    }

    fn timer_line(session: &Session) -> Line<'static> {
        if session.is_pending() {
            Line::from(Span::styled(
                format!("+{TIME_BONUS_SECONDS}s"),
                Style::default()
                    .fg(palette::GAIN)
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            digits(
                &session.time_remaining().to_string(),
                Style::default().fg(palette::TIMER),
            )
        }
    }
}

impl Screen for PlayScreen {
    fn render(&self, session: &Session, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1), // score
                Constraint::Min(0),
                Constraint::Length(1), // problem
                Constraint::Length(3), // answer box
                Constraint::Length(1),
                Constraint::Length(1), // "time left"
                Constraint::Length(1), // timer
                Constraint::Min(0),
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(Self::score_line(session)).render(chunks[0], buf);

        let value = session.current_value().to_string();
        Paragraph::new(Line::from(Span::styled(
            format!("{value} + {value}"),
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

        let answer = session.input();
        let box_width = (answer.width() as u16 + 4).max(ANSWER_MIN_WIDTH);
        let answer_area = centered_rect(box_width, 3, chunks[3]);
        let box_style = if session.is_pending() {
            Style::default()
                .fg(palette::GAIN)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette::INK)
        };
        Paragraph::new(Span::styled(answer.to_string(), box_style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(box_style))
            .render(answer_area, buf);

        Paragraph::new("Time left:")
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
        Paragraph::new(Self::timer_line(session))
            .alignment(Alignment::Center)
            .render(chunks[6], buf);

        Paragraph::new(Span::styled(
            "0-9 answer / (backspace) delete / (c)lear / (s)ettings / (esc)ape",
            LEGEND_STYLE,
        ))
        .alignment(Alignment::Center)
        .render(chunks[8], buf);
    }
}

pub struct GameOverScreen;

impl Screen for GameOverScreen {
    fn render(&self, session: &Session, area: Rect, buf: &mut Buffer) {
        let card = centered_rect(40, 12, area);
        Clear.render(card, buf);

        let bold = Style::default().add_modifier(Modifier::BOLD);
        let level = session.level();
        let text = vec![
            Line::from(Span::styled("Game over!", bold)),
            Line::from(""),
            Line::from("Final score"),
            Line::from(Span::styled(session.displayed_score().to_string(), bold)),
            Line::from(""),
            Line::from(format!("Correct answers: {}", session.correct_count())),
            Line::from(format!("Level {}: {level}", level.number())),
            Line::from(format!("Highest doubling: {}", session.current_value())),
            Line::from(""),
            Line::from(Span::styled("(r)eset / (p)lay again / (esc)ape", LEGEND_STYLE)),
        ];
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette::ACCENT))
                    .style(Style::default().bg(palette::PANEL)),
            )
            .render(card, buf);
    }
}

/// Helper to construct the appropriate screen for the current phase
pub fn current_screen(phase: &Phase) -> Box<dyn Screen> {
    match phase {
        Phase::Idle => Box::new(TitleScreen),
        Phase::Countdown => Box::new(CountdownScreen),
        Phase::Announcing { closing } => Box::new(AnnounceScreen { closing: *closing }),
        Phase::Playing | Phase::Pending(_) => Box::new(PlayScreen),
        Phase::GameOver => Box::new(GameOverScreen),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use somas::{problem::Problem, schedule::TimerId, session::Event};

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    fn render(session: &Session) -> String {
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        current_screen(&session.phase()).render(session, area, &mut buf);
        buffer_text(&buf)
    }

    fn fire(s: &mut Session, id: TimerId) {
        let epoch = s.epoch();
        s.handle(Event::Timer { id, epoch });
    }

    #[test]
    fn title_screen_offers_start() {
        assert!(render(&Session::default()).contains("(enter) start"));
    }

    #[test]
    fn play_screen_shows_problem_and_timer() {
        let mut s = Session::default();
        s.handle(Event::Start(Problem::new(6).unwrap()));
        assert!(render(&s).contains('3'));
        for _ in 0..3 {
            fire(&mut s, TimerId::PreGameCountdown);
        }
        assert!(render(&s).contains("Started!"));
        fire(&mut s, TimerId::AnnounceHold);
        fire(&mut s, TimerId::AnnounceExit);

        let text = render(&s);
        assert!(text.contains("6 + 6"));
        assert!(text.contains("1 0"));

        s.handle(Event::Digit(1));
        s.handle(Event::Digit(2));
        let text = render(&s);
        assert!(text.contains("+8s"));
        assert!(text.contains("+1280"));
    }

    #[test]
    fn game_over_card_shows_level() {
        let mut s = Session::default();
        s.handle(Event::Start(Problem::new(2).unwrap()));
        for _ in 0..3 {
            fire(&mut s, TimerId::PreGameCountdown);
        }
        fire(&mut s, TimerId::AnnounceHold);
        fire(&mut s, TimerId::AnnounceExit);
        for _ in 0..10 {
            fire(&mut s, TimerId::GameClock);
        }
        let text = render(&s);
        assert!(text.contains("Game over!"));
        assert!(text.contains("Level 1: Beginner"));
        assert!(text.contains("Highest doubling: 2"));
    }
}
