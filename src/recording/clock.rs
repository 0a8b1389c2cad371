//! Time sources for the recorder.
//!
//! The controller never reads the system time directly so that countdowns and
//! deadlines can be driven deterministically.

use chrono::{DateTime, Local};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic and wall-clock time as seen by the controller.
pub trait Clock {
    /// Monotonic instant used for countdowns and deadlines.
    fn now(&self) -> Instant;
    /// Local wall-clock time used for clip names and timestamps.
    fn local_now(&self) -> DateTime<Local>;
}

/// Clock backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn local_now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Manually advanced clock.
///
/// Clones share the same elapsed time, so a test can keep one clone while the
/// controller owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    wall_origin: DateTime<Local>,
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Creates a clock whose wall time starts at `wall_origin`.
    pub fn starting_at(wall_origin: DateTime<Local>) -> Self {
        Self {
            origin: Instant::now(),
            wall_origin,
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    /// Moves time forward.
    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    /// Total time advanced so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }

    fn local_now(&self) -> DateTime<Local> {
        let elapsed = chrono::Duration::from_std(self.elapsed.get()).unwrap_or(chrono::Duration::zero());
        self.wall_origin + elapsed
    }
}
