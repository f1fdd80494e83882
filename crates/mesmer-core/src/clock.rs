//! Monotonic clocks and the delayed-task queue used by the run-loops.
//!
//! Run-loops never sleep. They submit a task with a delay to their
//! [`Timers`] queue and the driver calls `tick()` once the clock has moved
//! past the deadline. Tests substitute [`ManualClock`] and advance it by hand.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic time source.
pub trait Clock: Send + Sync {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time, measured from construction.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms.load(Ordering::Relaxed))
    }
}

#[derive(Debug)]
struct Pending<T> {
    due: Duration,
    seq: u64,
    task: T,
}

/// Tasks waiting for their deadline, fired in deadline order.
///
/// Tasks with equal deadlines fire in submission order.
#[derive(Debug)]
pub struct Timers<T> {
    pending: Vec<Pending<T>>,
    next_seq: u64,
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }

    /// Submit `task` to fire `delay` after `now`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, task: T) {
        self.pending.push(Pending {
            due: now + delay,
            seq: self.next_seq,
            task,
        });
        self.next_seq += 1;
    }

    /// Remove and return the earliest task whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<T> {
        let position = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= now)
            .min_by_key(|(_, p)| (p.due, p.seq))
            .map(|(i, _)| i)?;
        Some(self.pending.remove(position).task)
    }

    /// Deadline of the earliest pending task.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|p| p.due).min()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
        clock.advance_ms(250);
        clock.advance(ms(50));
        assert_eq!(clock.now(), ms(300));
    }

    #[test]
    fn tasks_fire_in_deadline_order() {
        let mut timers = Timers::new();
        timers.schedule(ms(0), ms(500), "late");
        timers.schedule(ms(0), ms(100), "early");
        timers.schedule(ms(0), ms(100), "early-second");

        assert_eq!(timers.next_due(), Some(ms(100)));
        assert_eq!(timers.pop_due(ms(50)), None);
        assert_eq!(timers.pop_due(ms(100)), Some("early"));
        assert_eq!(timers.pop_due(ms(100)), Some("early-second"));
        assert_eq!(timers.pop_due(ms(499)), None);
        assert_eq!(timers.pop_due(ms(1000)), Some("late"));
        assert!(timers.is_empty());
    }

    #[test]
    fn zero_delay_is_due_immediately() {
        let mut timers = Timers::new();
        timers.schedule(ms(40), Duration::ZERO, 1);
        assert_eq!(timers.pop_due(ms(40)), Some(1));
    }

    #[test]
    fn clear_drops_pending() {
        let mut timers = Timers::new();
        timers.schedule(ms(0), ms(10), ());
        timers.clear();
        assert_eq!(timers.len(), 0);
        assert_eq!(timers.next_due(), None);
    }
}
