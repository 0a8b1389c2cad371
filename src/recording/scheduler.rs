//! Cancellable timers for the recording session.
//!
//! Both the countdown interval and the hard deadline live here, so every
//! timed path into the stop transition goes through one poll.

use std::time::{Duration, Instant};

/// Identifies a scheduled timer for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// What a timer means to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Periodic update of the remaining-time display
    CountdownTick,
    /// Session duration reached
    Deadline,
}

#[derive(Debug)]
struct Timer {
    id: TimerId,
    kind: TimerKind,
    due: Instant,
    period: Option<Duration>,
}

/// A timer that came due during [`Scheduler::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub kind: TimerKind,
}

/// One-shot and periodic timers polled against an externally supplied instant.
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a timer that fires once at `due`.
    pub fn schedule_once(&mut self, kind: TimerKind, due: Instant) -> TimerId {
        self.insert(kind, due, None)
    }

    /// Schedules a timer that first fires at `first_due` and then every `period`.
    pub fn schedule_every(&mut self, kind: TimerKind, first_due: Instant, period: Duration) -> TimerId {
        self.insert(kind, first_due, Some(period.max(Duration::from_millis(1))))
    }

    fn insert(&mut self, kind: TimerKind, due: Instant, period: Option<Duration>) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.push(Timer { id, kind, due, period });
        id
    }

    /// Cancels a timer. Unknown or already fired ids are ignored.
    pub fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }

    /// Cancels every pending timer.
    pub fn cancel_all(&mut self) {
        if !self.timers.is_empty() {
            tracing::debug!("Cancelling {} pending timer(s)", self.timers.len());
        }
        self.timers.clear();
    }

    /// Number of pending timers.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Returns the timers due at `now`, earliest first.
    ///
    /// One-shot timers are removed. A periodic timer fires at most once per
    /// poll; missed periods are coalesced and it is rescheduled after `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<FiredTimer> {
        let mut due: Vec<(Instant, FiredTimer)> = self
            .timers
            .iter()
            .filter(|t| t.due <= now)
            .map(|t| (t.due, FiredTimer { id: t.id, kind: t.kind }))
            .collect();
        due.sort_by_key(|(at, fired)| (*at, fired.id.0));

        self.timers.retain_mut(|t| {
            if t.due > now {
                return true;
            }
            match t.period {
                Some(period) => {
                    while t.due <= now {
                        t.due += period;
                    }
                    true
                }
                None => false,
            }
        });

        due.into_iter().map(|(_, fired)| fired).collect()
    }
}
