use std::time::Duration;

/// Every delayed callback a session can arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum TimerId {
    /// one-second gameplay countdown
    GameClock,
    /// 3-2-1 before play
    PreGameCountdown,
    /// "Started!" banner stays up
    AnnounceHold,
    /// "Started!" banner exit animation
    AnnounceExit,
    /// feedback window after a correct answer
    AdvanceRound,
    /// input stays suppressed while the time badge leaves
    ClearPending,
    ScoreTick,
    ScoreBadgeExit,
    ScoreBadgeHide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub epoch: u64,
}

#[derive(Debug, Clone)]
struct Entry {
    id: TimerId,
    epoch: u64,
    due_ms: u64,
    seq: u64,
}

/// Timer queue on a logical millisecond clock.
///
/// Only one entry per [`TimerId`] is kept. Deadlines are relative to the
/// clock at the moment of scheduling, and [`Scheduler::pop_due`] moves the
/// clock to each deadline it hands out, so chained timers stay exact no
/// matter how coarse the caller's ticks are.
#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    seq: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms)
    }

    pub fn schedule(&mut self, id: TimerId, delay: Duration, epoch: u64) {
        self.cancel(id);
        self.seq += 1;
        self.entries.push(Entry {
            id,
            epoch,
            due_ms: self.now_ms + delay.as_millis() as u64,
            seq: self.seq,
        });
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.entries.retain(|e| e.id != id);
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time left until `id` fires, if armed
    #[cfg(test)]
    fn remaining(&self, id: TimerId) -> Option<Duration> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| Duration::from_millis(e.due_ms.saturating_sub(self.now_ms)))
    }

    /// Removes and returns the earliest timer due at or before `until`
    /// (measured from the clock origin), advancing the clock to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired> {
        let until_ms = until.as_millis() as u64;
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= until_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.seq))
            .map(|(i, _)| i)?;

        let entry = self.entries.swap_remove(idx);
        self.now_ms = self.now_ms.max(entry.due_ms);
        Some(Fired {
            id: entry.id,
            epoch: entry.epoch,
        })
    }

    /// Moves the clock forward once nothing else is due
    pub fn settle(&mut self, until: Duration) {
        self.now_ms = self.now_ms.max(until.as_millis() as u64);
    }
}
