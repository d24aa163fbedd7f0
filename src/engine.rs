use std::time::Duration;

use log::warn;
use rand::{rngs::StdRng, SeedableRng};

use crate::audio::AudioSink;
use crate::problem::Problem;
use crate::schedule::Scheduler;
use crate::session::{Effect, Event, Session};

/// Session plus the timers and audio it asks for.
///
/// Time only moves through [`Game::advance`].
pub struct Game<A: AudioSink> {
    session: Session,
    scheduler: Scheduler,
    audio: A,
    rng: StdRng,
    elapsed: Duration,
}

impl<A: AudioSink> Game<A> {
    pub fn new(audio: A, audio_enabled: bool, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            session: Session::new(audio_enabled),
            scheduler: Scheduler::new(),
            audio,
            rng,
            elapsed: Duration::ZERO,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn start(&mut self) {
        let problem = Problem::starting(&mut self.rng);
        self.dispatch(Event::Start(problem));
    }

    pub fn play_again(&mut self) {
        let problem = Problem::starting(&mut self.rng);
        self.dispatch(Event::PlayAgain(problem));
    }

    pub fn dispatch(&mut self, event: Event) {
        let effects = self.session.handle(event);
        self.apply(effects);
    }

    /// Fires every timer that falls inside the next `step`, in deadline order.
    pub fn advance(&mut self, step: Duration) {
        self.elapsed += step;
        while let Some(fired) = self.scheduler.pop_due(self.elapsed) {
            self.dispatch(Event::Timer {
                id: fired.id,
                epoch: fired.epoch,
            });
        }
        self.scheduler.settle(self.elapsed);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Schedule(id, delay) => {
                    self.scheduler.schedule(id, delay, self.session.epoch())
                }
                Effect::Cancel(id) => self.scheduler.cancel(id),
                Effect::CancelAll => self.scheduler.cancel_all(),
                Effect::Sound(cue) => {
                    if let Err(e) = self.audio.play(cue) {
                        warn!("sound cue {cue} dropped: {e}");
                    }
                }
                Effect::Music(on) => {
                    if let Err(e) = self.audio.set_music(on) {
                        warn!("background music request ({on}) dropped: {e}");
                    }
                }
            }
        }
    }
}
