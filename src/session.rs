//! Game session state machine.
//!
//! All mutation goes through [`Session::handle`]. Delayed work is never run
//! directly; the session returns [`Effect`]s asking the caller to arm or
//! cancel named timers, and the caller feeds them back as
//! [`Event::Timer`]. Each start or reset bumps the session epoch, so timer
//! events left over from an earlier run are dropped.

use std::time::Duration;

use log::{debug, info};

use crate::audio::Cue;
use crate::level::Level;
use crate::problem::Problem;
use crate::schedule::TimerId;
use crate::score::{self, ScoreTick, Scoreboard};

pub const START_SECONDS: u32 = 10;
pub const TIME_BONUS_SECONDS: u32 = 8;
pub const COUNTDOWN_FROM: u8 = 3;

pub const SECOND: Duration = Duration::from_millis(1000);
pub const ANNOUNCE_HOLD: Duration = Duration::from_millis(600);
pub const ANNOUNCE_EXIT: Duration = Duration::from_millis(800);
pub const FEEDBACK_WINDOW: Duration = Duration::from_millis(1000);
pub const SETTLE_WINDOW: Duration = Duration::from_millis(360);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingStage {
    /// answer accepted, clock paused, old problem still shown
    Feedback,
    /// next problem shown, clock running, input still locked
    Settling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Countdown,
    Announcing { closing: bool },
    Playing,
    Pending(PendingStage),
    GameOver,
}

impl Phase {
    /// Playing or between rounds
    pub fn in_round(&self) -> bool {
        matches!(self, Phase::Playing | Phase::Pending(_))
    }

    fn clock_running(&self) -> bool {
        matches!(self, Phase::Playing | Phase::Pending(PendingStage::Settling))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Start(Problem),
    Digit(u8),
    Clear,
    Backspace,
    ToggleAudio,
    Reset,
    PlayAgain(Problem),
    Timer { id: TimerId, epoch: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Schedule(TimerId, Duration),
    Cancel(TimerId),
    CancelAll,
    Sound(Cue),
    Music(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    phase: Phase,
    time_remaining: u32,
    score: Scoreboard,
    correct_count: u32,
    problem: Problem,
    input: String,
    countdown: Option<u8>,
    audio_enabled: bool,
    epoch: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Pure form of [`Session::handle`]
pub fn reduce(mut session: Session, event: Event) -> (Session, Vec<Effect>) {
    let effects = session.handle(event);
    (session, effects)
}

impl Session {
    pub fn new(audio_enabled: bool) -> Self {
        Self {
            phase: Phase::Idle,
            time_remaining: START_SECONDS,
            score: Scoreboard::default(),
            correct_count: 0,
            problem: Problem::default(),
            input: String::new(),
            countdown: None,
            audio_enabled,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn score(&self) -> u64 {
        self.score.total()
    }

    pub fn displayed_score(&self) -> u64 {
        self.score.displayed()
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.score
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn problem(&self) -> Problem {
        self.problem
    }

    pub fn current_value(&self) -> u64 {
        self.problem.value()
    }

    pub fn current_sum(&self) -> u64 {
        self.problem.sum()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Pending(_))
    }

    pub fn countdown(&self) -> Option<u8> {
        self.countdown
    }

    pub fn level(&self) -> Level {
        Level::from_correct(self.correct_count)
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        let mut fx = vec![];
        match event {
            Event::Start(problem) => {
                if self.phase == Phase::Idle {
                    self.begin(problem, &mut fx);
                } else {
                    debug!("start ignored in {:?}", self.phase);
                }
            }
            Event::PlayAgain(problem) => {
                self.clear(&mut fx);
                self.begin(problem, &mut fx);
            }
            Event::Reset => {
                self.clear(&mut fx);
                info!("session reset");
            }
            Event::Digit(d) => {
                if d <= 9 && self.accepts_input() {
                    self.input.push(char::from(b'0' + d));
                    self.on_input_changed(&mut fx);
                }
            }
            Event::Clear => {
                if self.accepts_input() {
                    self.input.clear();
                    self.on_input_changed(&mut fx);
                }
            }
            Event::Backspace => {
                if self.accepts_input() {
                    self.input.pop();
                    self.on_input_changed(&mut fx);
                }
            }
            Event::ToggleAudio => {
                self.audio_enabled = !self.audio_enabled;
                if !self.audio_enabled {
                    fx.push(Effect::Music(false));
                } else if self.phase.in_round() {
                    fx.push(Effect::Music(true));
                }
            }
            Event::Timer { id, epoch } => {
                if epoch == self.epoch {
                    self.on_timer(id, &mut fx);
                } else {
                    debug!("dropping stale {id} from epoch {epoch}");
                }
            }
        }
        fx
    }

    fn accepts_input(&self) -> bool {
        self.phase == Phase::Playing
    }

    fn sound(&self, cue: Cue, fx: &mut Vec<Effect>) {
        if self.audio_enabled {
            fx.push(Effect::Sound(cue));
        }
    }

    fn clear(&mut self, fx: &mut Vec<Effect>) {
        let epoch = self.epoch + 1;
        *self = Self {
            epoch,
            ..Self::new(self.audio_enabled)
        };
        fx.push(Effect::CancelAll);
        fx.push(Effect::Music(false));
    }

    fn begin(&mut self, problem: Problem, fx: &mut Vec<Effect>) {
        let epoch = self.epoch + 1;
        *self = Self {
            epoch,
            phase: Phase::Countdown,
            problem,
            countdown: Some(COUNTDOWN_FROM),
            ..Self::new(self.audio_enabled)
        };
        info!("session {} starting at {}", self.epoch, problem.value());
        fx.push(Effect::CancelAll);
        fx.push(Effect::Schedule(TimerId::PreGameCountdown, SECOND));
    }

    fn on_input_changed(&mut self, fx: &mut Vec<Effect>) {
        self.sound(Cue::Click, fx);
        if !self.problem.is_answered_by(&self.input) {
            return;
        }

        let points = score::points_for(self.time_remaining);
        debug!(
            "correct {} with {}s left, +{points}",
            self.problem.sum(),
            self.time_remaining
        );
        self.phase = Phase::Pending(PendingStage::Feedback);
        self.correct_count += 1;
        if self.score.award(points) {
            fx.push(Effect::Schedule(TimerId::ScoreTick, score::ANIMATION_TICK));
        }
        self.sound(Cue::Correct, fx);
        fx.push(Effect::Cancel(TimerId::GameClock));
        fx.push(Effect::Schedule(TimerId::AdvanceRound, FEEDBACK_WINDOW));
    }

    fn on_timer(&mut self, id: TimerId, fx: &mut Vec<Effect>) {
        match (id, self.phase) {
            (TimerId::PreGameCountdown, Phase::Countdown) => {
                let left = self.countdown.unwrap_or(0).saturating_sub(1);
                if left == 0 {
                    self.countdown = None;
                    self.phase = Phase::Announcing { closing: false };
                    fx.push(Effect::Schedule(TimerId::AnnounceHold, ANNOUNCE_HOLD));
                } else {
                    self.countdown = Some(left);
                    fx.push(Effect::Schedule(TimerId::PreGameCountdown, SECOND));
                }
            }
            (TimerId::AnnounceHold, Phase::Announcing { closing: false }) => {
                self.phase = Phase::Announcing { closing: true };
                fx.push(Effect::Schedule(TimerId::AnnounceExit, ANNOUNCE_EXIT));
            }
            (TimerId::AnnounceExit, Phase::Announcing { closing: true }) => {
                self.phase = Phase::Playing;
                self.time_remaining = START_SECONDS;
                fx.push(Effect::Schedule(TimerId::GameClock, SECOND));
                if self.audio_enabled {
                    fx.push(Effect::Music(true));
                }
            }
            (TimerId::GameClock, phase) if phase.clock_running() => {
                self.time_remaining = self.time_remaining.saturating_sub(1);
                if self.time_remaining == 0 {
                    self.game_over(fx);
                } else {
                    fx.push(Effect::Schedule(TimerId::GameClock, SECOND));
                }
            }
            (TimerId::AdvanceRound, Phase::Pending(PendingStage::Feedback)) => {
                self.input.clear();
                match self.problem.next() {
                    Some(next) => {
                        self.problem = next;
                        self.time_remaining += TIME_BONUS_SECONDS;
                        self.phase = Phase::Pending(PendingStage::Settling);
                        fx.push(Effect::Schedule(TimerId::GameClock, SECOND));
                        fx.push(Effect::Schedule(TimerId::ClearPending, SETTLE_WINDOW));
                    }
                    None => {
                        info!("doubling sequence exhausted at {}", self.problem.value());
                        self.game_over(fx);
                    }
                }
            }
            (TimerId::ClearPending, Phase::Pending(PendingStage::Settling)) => {
                self.phase = Phase::Playing;
            }
            (TimerId::ScoreTick, _) => match self.score.tick() {
                ScoreTick::Continue => {
                    fx.push(Effect::Schedule(TimerId::ScoreTick, score::ANIMATION_TICK))
                }
                ScoreTick::Finished => fx.push(Effect::Schedule(
                    TimerId::ScoreBadgeExit,
                    score::BADGE_EXIT_DELAY,
                )),
                ScoreTick::Ignored => {}
            },
            (TimerId::ScoreBadgeExit, _) => {
                self.score.badge_exit();
                fx.push(Effect::Schedule(
                    TimerId::ScoreBadgeHide,
                    score::BADGE_HIDE_DELAY,
                ));
            }
            (TimerId::ScoreBadgeHide, _) => self.score.badge_hide(),
            (id, phase) => debug!("{id} ignored in {phase:?}"),
        }
    }

    fn game_over(&mut self, fx: &mut Vec<Effect>) {
        self.phase = Phase::GameOver;
        info!(
            "game over: score {} correct {} level {}",
            self.score.total(),
            self.correct_count,
            self.level()
        );
        fx.push(Effect::Cancel(TimerId::GameClock));
        fx.push(Effect::Cancel(TimerId::AdvanceRound));
        fx.push(Effect::Cancel(TimerId::ClearPending));
        self.sound(Cue::GameOver, fx);
        fx.push(Effect::Music(false));
    }
}
