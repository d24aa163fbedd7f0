use std::time::Duration;

pub const SCORE_BASE: u64 = 1000;
pub const SCORE_MULTIPLIER: u64 = 28;

pub const ANIMATION_MS: u32 = 520;
pub const ANIMATION_TICK_MS: u32 = 40;
pub const ANIMATION_STEPS: u32 = ANIMATION_MS.div_ceil(ANIMATION_TICK_MS);

pub const ANIMATION_TICK: Duration = Duration::from_millis(ANIMATION_TICK_MS as u64);
pub const BADGE_EXIT_DELAY: Duration = Duration::from_millis(220);
pub const BADGE_HIDE_DELAY: Duration = Duration::from_millis(260);

/// Points for a correct answer given with `time_remaining` seconds left
pub fn points_for(time_remaining: u32) -> u64 {
    SCORE_BASE + time_remaining as u64 * SCORE_MULTIPLIER
}

pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Animation {
    Idle,
    Running { start: u64, end: u64, step: u32 },
    /// interpolation done, the "+N" badge is still on screen
    Settling { leaving: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTick {
    Continue,
    Finished,
    Ignored,
}

/// Running score plus the eased value shown to the player.
///
/// Only one interpolation is ever in flight. Points awarded while one is
/// running land immediately instead of queueing a second animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoreboard {
    total: u64,
    displayed: u64,
    badge_points: u64,
    animation: Animation,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self {
            total: 0,
            displayed: 0,
            badge_points: 0,
            animation: Animation::Idle,
        }
    }
}

impl Scoreboard {
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn displayed(&self) -> u64 {
        self.displayed
    }

    pub fn is_animating(&self) -> bool {
        self.animation != Animation::Idle
    }

    /// `Some((points, leaving))` while the gain badge is visible
    pub fn badge(&self) -> Option<(u64, bool)> {
        match self.animation {
            Animation::Idle => None,
            Animation::Running { .. } => Some((self.badge_points, false)),
            Animation::Settling { leaving } => Some((self.badge_points, leaving)),
        }
    }

    /// Adds `points` to the total. Returns true when a new interpolation
    /// started and the caller must drive it with [`Scoreboard::tick`].
    pub fn award(&mut self, points: u64) -> bool {
        self.total += points;
        match self.animation {
            Animation::Idle => {
                self.badge_points = points;
                self.animation = Animation::Running {
                    start: self.displayed,
                    end: self.total,
                    step: 0,
                };
                true
            }
            Animation::Running { start, end, step } => {
                self.displayed += points;
                self.animation = Animation::Running {
                    start: start + points,
                    end: end + points,
                    step,
                };
                false
            }
            Animation::Settling { .. } => {
                self.displayed = self.total;
                false
            }
        }
    }

    pub fn tick(&mut self) -> ScoreTick {
        let Animation::Running { start, end, step } = self.animation else {
            return ScoreTick::Ignored;
        };

        let step = step + 1;
        if step >= ANIMATION_STEPS {
            self.displayed = end;
            self.animation = Animation::Settling { leaving: false };
            return ScoreTick::Finished;
        }

        let eased = ease_out_cubic(step as f64 / ANIMATION_STEPS as f64);
        self.displayed = (start as f64 + (end - start) as f64 * eased).round() as u64;
        self.animation = Animation::Running { start, end, step };
        ScoreTick::Continue
    }

    pub fn badge_exit(&mut self) {
        if let Animation::Settling { .. } = self.animation {
            self.animation = Animation::Settling { leaving: true };
        }
    }

    pub fn badge_hide(&mut self) {
        if let Animation::Settling { .. } = self.animation {
            self.animation = Animation::Idle;
            self.displayed = self.total;
        }
    }
}
