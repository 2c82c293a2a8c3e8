//! Timer Queue - the engine's private event loop
//!
//! Models `setInterval`/`setTimeout` style scheduling on a virtual clock.
//! Nothing here sleeps: the owner moves time forward explicitly and
//! receives due timers one at a time, in deadline order.
//!
//! # Ordering
//!
//! Timers with the same deadline fire in the order they were armed.
//! Repeating timers re-arm at `deadline + period`, so a slow host never
//! accumulates drift.

use std::time::Duration;

/// Handle to an armed timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Purpose of an armed timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Repeating character reveal
    Type,
    /// Repeating character removal
    Erase,
    /// One-shot pause between typing and erasing
    PhaseDelay,
}

/// A timer that has come due
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiredTimer {
    /// Handle of the timer that fired
    pub id: TimerId,
    /// What the timer was armed for
    pub kind: TimerKind,
    /// Liveness token captured when the timer was armed
    pub epoch: u64,
    /// Virtual time at which it fired
    pub at: Duration,
}

#[derive(Clone, Debug)]
struct ArmedTimer {
    id: TimerId,
    kind: TimerKind,
    epoch: u64,
    deadline: Duration,
    period: Option<Duration>,
}

/// Virtual-clock timer queue
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    timers: Vec<ArmedTimer>,
}

impl TimerQueue {
    /// Create an empty queue at virtual time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Arm a repeating timer; the first fire is one `period` from now
    pub fn arm_interval(&mut self, kind: TimerKind, period: Duration, epoch: u64) -> TimerId {
        // A zero period would fire forever without time moving
        let period = period.max(Duration::from_nanos(1));
        self.arm(kind, period, Some(period), epoch)
    }

    /// Arm a one-shot timer
    pub fn arm_timeout(&mut self, kind: TimerKind, delay: Duration, epoch: u64) -> TimerId {
        self.arm(kind, delay, None, epoch)
    }

    fn arm(
        &mut self,
        kind: TimerKind,
        delay: Duration,
        period: Option<Duration>,
        epoch: u64,
    ) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(ArmedTimer {
            id,
            kind,
            epoch,
            deadline: self.now + delay,
            period,
        });
        id
    }

    /// Disarm a timer. Unknown or already-fired ids are ignored.
    pub fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }

    /// Disarm everything
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Number of armed timers
    #[must_use]
    pub fn armed(&self) -> usize {
        self.timers.len()
    }

    /// Whether a timer is still armed
    #[must_use]
    pub fn is_armed(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Earliest armed deadline, if any
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.deadline).min()
    }

    /// Take the earliest timer due at or before `until`
    ///
    /// Moves the clock to that timer's deadline. Repeating timers stay
    /// armed with their next deadline; one-shot timers are removed.
    pub fn pop_due(&mut self, until: Duration) -> Option<FiredTimer> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= until)
            .min_by_key(|(_, t)| (t.deadline, t.id))
            .map(|(i, _)| i)?;

        let timer = &self.timers[index];
        let fired = FiredTimer {
            id: timer.id,
            kind: timer.kind,
            epoch: timer.epoch,
            at: timer.deadline,
        };
        let period = timer.period;
        self.now = self.now.max(fired.at);

        if let Some(period) = period {
            self.timers[index].deadline += period;
        } else {
            self.timers.swap_remove(index);
        }

        Some(fired)
    }

    /// Move the clock forward without firing anything
    ///
    /// Callers drain `pop_due` first; the clock never moves backwards.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
