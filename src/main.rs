pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{debug, info};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use somas::{
    app_dirs::AppDirs,
    audio::{AudioSink, TerminalBell},
    config::{Config, ConfigStore, FileConfigStore},
    engine::Game,
    error::Error as SomasError,
    runtime::{CrosstermEventSource, InputEvent, Runner, Stopwatch},
    session::{Event, Phase},
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    time::Duration,
};

use crate::ui::overlay::{Overlay, SettingsItem};

/// double the number before the clock runs out
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed arithmetic game: every answer is the next question doubled. Correct answers buy time and score more the faster you give them."
)]
pub struct Cli {
    /// start with sound effects turned off
    #[clap(short = 'm', long)]
    mute: bool,

    /// milliseconds between screen refreshes
    #[clap(short = 't', long)]
    tick_rate_ms: Option<u64>,

    /// seed the starting numbers for a repeatable game
    #[clap(long)]
    seed: Option<u64>,

    /// write the effective settings to the config file before starting
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line flags win over the config file
    fn apply(&self, mut cfg: Config) -> Config {
        if self.mute {
            cfg.audio_enabled = false;
        }
        if let Some(ms) = self.tick_rate_ms {
            cfg.tick_rate_ms = ms;
        }
        cfg.tick_rate_ms = cfg.tick_rate_ms.max(1);
        cfg
    }
}

pub struct App {
    pub game: Game<Box<dyn AudioSink>>,
    pub overlay: Option<Overlay>,
}

impl App {
    pub fn new(config: &Config, seed: Option<u64>, audio: Box<dyn AudioSink>) -> Self {
        Self {
            game: Game::new(audio, config.audio_enabled, seed),
            overlay: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.game.session().phase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(e) = init_logging() {
        eprintln!("logging disabled: {e}");
    }

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save_config {
        store.save(&config)?;
        info!("saved config to {}", store.path().display());
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config, cli.seed, Box::new(TerminalBell::stdout()));
    let result = start_tui(
        &mut terminal,
        &mut app,
        Duration::from_millis(config.tick_rate_ms),
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn init_logging() -> Result<(), SomasError> {
    let Some(path) = AppDirs::log_path() else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| SomasError::LogFile {
            path: path.clone(),
            source,
        })?;

    // logs go to a file while the TUI owns the terminal
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick: Duration,
) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), Stopwatch::start(), tick);

    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        let step = runner.step();
        app.game.advance(step.elapsed);

        if let InputEvent::Key(key) = step.event {
            if handle_key(app, key) == Flow::Quit {
                break;
            }
        }

        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> Flow {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Flow::Quit;
    }

    if let Some(overlay) = app.overlay {
        handle_overlay_key(app, overlay, key);
        return Flow::Continue;
    }

    match key.code {
        KeyCode::Esc => return Flow::Quit,
        KeyCode::Char('?') => app.overlay = Some(Overlay::Help),
        KeyCode::Char('s') => app.overlay = Some(Overlay::settings()),
        KeyCode::Char('m') => app.game.dispatch(Event::ToggleAudio),
        _ => match app.phase() {
            Phase::Idle => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    app.game.start();
                }
            }
            Phase::Playing | Phase::Pending(_) => match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    app.game.dispatch(Event::Digit(c as u8 - b'0'))
                }
                KeyCode::Backspace => app.game.dispatch(Event::Backspace),
                KeyCode::Delete | KeyCode::Char('c') => app.game.dispatch(Event::Clear),
                _ => {}
            },
            Phase::GameOver => match key.code {
                KeyCode::Char('r') => app.game.dispatch(Event::Reset),
                KeyCode::Char('p') | KeyCode::Enter => app.game.play_again(),
                _ => {}
            },
            Phase::Countdown | Phase::Announcing { .. } => {}
        },
    }

    Flow::Continue
}

fn handle_overlay_key(app: &mut App, overlay: Overlay, key: KeyEvent) {
    match (overlay, key.code) {
        (_, KeyCode::Esc) | (Overlay::Help, KeyCode::Char('?')) => app.overlay = None,
        (Overlay::Settings { .. }, KeyCode::Char('s')) => app.overlay = None,
        (Overlay::Settings { selected }, KeyCode::Up) => {
            app.overlay = Some(Overlay::Settings {
                selected: selected.previous(app.phase()),
            })
        }
        (Overlay::Settings { selected }, KeyCode::Down) => {
            app.overlay = Some(Overlay::Settings {
                selected: selected.next(app.phase()),
            })
        }
        (Overlay::Settings { .. }, KeyCode::Char('m')) => app.game.dispatch(Event::ToggleAudio),
        (Overlay::Settings { selected }, KeyCode::Enter | KeyCode::Char(' ')) => match selected {
            SettingsItem::Sound => app.game.dispatch(Event::ToggleAudio),
            SettingsItem::BackToStart => {
                app.overlay = None;
                app.game.dispatch(Event::Reset);
            }
            SettingsItem::Restart => {
                app.overlay = None;
                app.game.play_again();
            }
            SettingsItem::Close => app.overlay = None,
        },
        _ => debug!("unhandled key {:?} in {overlay:?}", key.code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use somas::{
        audio::{Cue, Silent},
        error::AudioError,
        session::PendingStage,
    };
    use std::{cell::RefCell, rc::Rc};

    /// Keeps what reached the device where the test can still see it
    #[derive(Clone, Default)]
    struct SharedRecorder(Rc<RefCell<Vec<Cue>>>);

    impl AudioSink for SharedRecorder {
        fn play(&mut self, cue: Cue) -> Result<(), AudioError> {
            self.0.borrow_mut().push(cue);
            Ok(())
        }

        fn set_music(&mut self, _on: bool) -> Result<(), AudioError> {
            Ok(())
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        App::new(&Config::default(), Some(9), Box::new(Silent))
    }

    fn play(app: &mut App) {
        handle_key(app, key(KeyCode::Enter));
        app.game.advance(Duration::from_millis(4400));
        assert_eq!(app.phase(), Phase::Playing);
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["somas"]);
        assert!(!cli.mute);
        assert_eq!(cli.tick_rate_ms, None);
        assert_eq!(cli.seed, None);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["somas", "-m", "-t", "50", "--seed", "7", "--save-config"]);
        assert!(cli.mute);
        assert_eq!(cli.tick_rate_ms, Some(50));
        assert_eq!(cli.seed, Some(7));
        assert!(cli.save_config);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["somas", "--mute", "--tick-rate-ms", "0"]);
        let cfg = cli.apply(Config::default());
        assert!(!cfg.audio_enabled);
        assert_eq!(cfg.tick_rate_ms, 1);

        let cli = Cli::parse_from(["somas"]);
        assert_eq!(cli.apply(Config::default()), Config::default());
    }

    #[test]
    fn test_enter_starts_from_idle() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.phase(), Phase::Countdown);
    }

    #[test]
    fn test_typing_answer() {
        let mut app = test_app();
        play(&mut app);
        let answer = app.game.session().current_sum().to_string();
        for c in answer.chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.phase(), Phase::Pending(PendingStage::Feedback));
        assert_eq!(app.game.session().correct_count(), 1);
    }

    #[test]
    fn test_clear_and_backspace_keys() {
        let mut app = test_app();
        play(&mut app);
        handle_key(&mut app, key(KeyCode::Char('1')));
        handle_key(&mut app, key(KeyCode::Char('1')));
        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.game.session().input(), "1");
        handle_key(&mut app, key(KeyCode::Char('c')));
        assert_eq!(app.game.session().input(), "");
    }

    #[test]
    fn test_game_over_keys() {
        let mut app = test_app();
        play(&mut app);
        app.game.advance(Duration::from_secs(10));
        assert_eq!(app.phase(), Phase::GameOver);

        handle_key(&mut app, key(KeyCode::Char('p')));
        assert_eq!(app.phase(), Phase::Countdown);

        app.game.advance(Duration::from_secs(20));
        assert_eq!(app.phase(), Phase::GameOver);
        handle_key(&mut app, key(KeyCode::Char('r')));
        assert_eq!(app.phase(), Phase::Idle);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        assert_eq!(handle_key(&mut app, key(KeyCode::Esc)), Flow::Quit);
        assert_eq!(
            handle_key(
                &mut app,
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
            ),
            Flow::Quit
        );
    }

    #[test]
    fn test_overlay_swallows_game_keys() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.overlay, Some(Overlay::Help));
        assert_eq!(handle_key(&mut app, key(KeyCode::Enter)), Flow::Continue);
        assert_eq!(app.phase(), Phase::Idle);
        assert_eq!(handle_key(&mut app, key(KeyCode::Esc)), Flow::Continue);
        assert_eq!(app.overlay, None);
    }

    #[test]
    fn test_settings_toggle_sound_and_restart() {
        let mut app = test_app();
        play(&mut app);

        handle_key(&mut app, key(KeyCode::Char('s')));
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(!app.game.session().audio_enabled());

        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, key(KeyCode::Down));
        assert_eq!(
            app.overlay,
            Some(Overlay::Settings {
                selected: SettingsItem::Restart
            })
        );
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.overlay, None);
        assert_eq!(app.phase(), Phase::Countdown);
    }

    #[test]
    fn test_unmuting_a_muted_start_plays_sound() {
        let cli = Cli::parse_from(["somas", "--mute"]);
        let config = cli.apply(Config::default());
        let device = SharedRecorder::default();
        let mut app = App::new(&config, Some(9), Box::new(device.clone()));
        assert!(!app.game.session().audio_enabled());

        play(&mut app);
        handle_key(&mut app, key(KeyCode::Char('1')));
        handle_key(&mut app, key(KeyCode::Backspace));
        assert!(device.0.borrow().is_empty());

        handle_key(&mut app, key(KeyCode::Char('m')));
        assert!(app.game.session().audio_enabled());
        let answer = app.game.session().current_sum().to_string();
        for c in answer.chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(device.0.borrow().last(), Some(&Cue::Correct));
    }

    #[test]
    fn test_settings_hides_session_items_when_idle() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Char('s')));
        handle_key(&mut app, key(KeyCode::Down));
        assert_eq!(
            app.overlay,
            Some(Overlay::Settings {
                selected: SettingsItem::Close
            })
        );
    }
}
