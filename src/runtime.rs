use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use log::error;

/// Terminal-side events consumed by the app loop
#[derive(Clone, Debug)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Where the app loop waits for terminal input
pub trait EventSource {
    /// Waits up to `timeout`; `None` when nothing arrived.
    fn poll(&self, timeout: Duration) -> Option<InputEvent>;
}

/// Reads crossterm on a helper thread
pub struct CrosstermEventSource {
    rx: Receiver<InputEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                // presses only; some terminals also report release and repeat
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => InputEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => InputEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    error!("terminal event stream closed: {e}");
                    break;
                }
            };
            if tx.send(ev).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn poll(&self, timeout: Duration) -> Option<InputEvent> {
        EventSource::poll(&self.rx, timeout)
    }
}

/// Scripted input: whatever was sent on the other end of the channel
impl EventSource for Receiver<InputEvent> {
    fn poll(&self, timeout: Duration) -> Option<InputEvent> {
        match self.recv_timeout(timeout) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// How much game time passes between two loop iterations
pub trait Clock {
    fn lap(&mut self) -> Duration;
}

/// Wall time between laps
#[derive(Debug)]
pub struct Stopwatch {
    last: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Clock for Stopwatch {
    fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        elapsed
    }
}

/// The same amount every lap, so headless games replay identically
#[derive(Debug, Clone, Copy)]
pub struct FixedStep(pub Duration);

impl Clock for FixedStep {
    fn lap(&mut self) -> Duration {
        self.0
    }
}

/// One loop iteration: the input (or [`InputEvent::Tick`]) and the game
/// time to feed [`crate::engine::Game::advance`]
#[derive(Debug, Clone)]
pub struct Step {
    pub event: InputEvent,
    pub elapsed: Duration,
}

pub struct Runner<E: EventSource, C: Clock> {
    source: E,
    clock: C,
    tick: Duration,
}

impl<E: EventSource, C: Clock> Runner<E, C> {
    pub fn new(source: E, clock: C, tick: Duration) -> Self {
        Self {
            source,
            clock,
            tick,
        }
    }

    /// Waits at most one tick for input, then laps the clock
    pub fn step(&mut self) -> Step {
        let event = self.source.poll(self.tick).unwrap_or(InputEvent::Tick);
        Step {
            event,
            elapsed: self.clock.lap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn step_is_tick_when_idle() {
        let (_tx, rx) = mpsc::channel();
        let mut runner = Runner::new(rx, FixedStep(ms(20)), ms(1));

        let step = runner.step();
        assert!(matches!(step.event, InputEvent::Tick));
        assert_eq!(step.elapsed, ms(20));
    }

    #[test]
    fn step_passes_input_through_in_order() {
        let (tx, rx) = mpsc::channel();
        tx.send(InputEvent::Resize).unwrap();
        tx.send(InputEvent::Tick).unwrap();
        let mut runner = Runner::new(rx, FixedStep(ms(20)), ms(10));

        assert!(matches!(runner.step().event, InputEvent::Resize));
        assert!(matches!(runner.step().event, InputEvent::Tick));
    }

    #[test]
    fn hung_up_source_still_ticks() {
        let (tx, rx) = mpsc::channel::<InputEvent>();
        drop(tx);
        let mut runner = Runner::new(rx, FixedStep(ms(5)), ms(1));
        assert!(matches!(runner.step().event, InputEvent::Tick));
    }

    #[test]
    fn stopwatch_measures_wall_time() {
        let mut sw = Stopwatch::start();
        std::thread::sleep(ms(5));
        assert!(sw.lap() >= ms(5));
        assert!(sw.lap() < Duration::from_secs(5));
    }
}
