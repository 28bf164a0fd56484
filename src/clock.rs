//! Fixed-interval tick scheduling.
//!
//! The clock never fires on its own: the application loop asks it how long it
//! may wait for input and whether a tick is due. Every method takes the
//! current instant explicitly so that the schedule can be driven by tests
//! without any real time passing.

use std::time::{Duration, Instant};

use thiserror::Error;

pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 10;

const SLOWEST_PERIOD_MS: f64 = 220.0;
const FASTEST_PERIOD_MS: f64 = 70.0;

#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("speed must be between 1 and 10, got {0}")]
pub struct InvalidSpeed(pub u8);

/// Player facing speed setting, from 1 (slowest) to 10 (fastest).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Speed(u8);

impl Speed {
    pub fn new(value: u8) -> Result<Self, InvalidSpeed> {
        if (MIN_SPEED..=MAX_SPEED).contains(&value) {
            Ok(Speed(value))
        } else {
            Err(InvalidSpeed(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn faster(self) -> Self {
        Speed((self.0 + 1).min(MAX_SPEED))
    }

    pub fn slower(self) -> Self {
        Speed((self.0 - 1).max(MIN_SPEED))
    }

    /// Linear mapping from 1..=10 onto 220ms..=70ms, rounded to the millisecond.
    pub fn period(self) -> Duration {
        let t = (self.0 - MIN_SPEED) as f64 / (MAX_SPEED - MIN_SPEED) as f64;
        let ms = SLOWEST_PERIOD_MS + (FASTEST_PERIOD_MS - SLOWEST_PERIOD_MS) * t;
        Duration::from_millis(ms.round() as u64)
    }
}

impl Default for Speed {
    fn default() -> Self {
        Speed(5)
    }
}

/// Single-shot, rescheduled-on-fire timer.
///
/// Only one deadline exists at any time, so a tick can never overlap or be
/// queued behind another one.
#[derive(Debug)]
pub struct Clock {
    period: Duration,
    next_due: Option<Instant>,
}

impl Clock {
    pub fn new(period: Duration) -> Self {
        Clock { period, next_due: None }
    }

    #[cfg(test)]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Arms the timer one full period from `now`. Does nothing if already armed.
    pub fn start(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now + self.period);
        }
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Replaces the period. A running timer is cancelled and rescheduled from
    /// `now` with the new period; a stopped one stays stopped.
    pub fn set_period(&mut self, period: Duration, now: Instant) {
        self.period = period;
        if self.next_due.is_some() {
            self.next_due = Some(now + period);
        }
    }

    /// How long the caller may block before the next tick is due.
    /// `None` while stopped.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// Returns true at most once per deadline and schedules the next one.
    /// Deadlines missed while the caller was busy are skipped rather than
    /// fired in a burst.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                let next = due + self.period;
                self.next_due = Some(if next > now { next } else { now + self.period });
                true
            }
            _ => false,
        }
    }
}
