//! One-second tick source for a [`BrewTimer`](super::BrewTimer).
//!
//! Holds at most one interval at a time. Arming replaces whatever was
//! there, disarming drops it on the spot, and a disarmed source never
//! fires, so it can sit in a `tokio::select!` next to user input.

use std::future;
use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct TickSource {
    period: Duration,
    interval: Option<Interval>,
}

impl TickSource {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Start a fresh interval; the first tick lands one period from now.
    pub fn arm(&mut self) {
        let mut interval = time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    pub fn disarm(&mut self) {
        self.interval = None;
    }

    /// Arm if `running` and not yet armed, disarm otherwise.
    pub fn sync(&mut self, running: bool) {
        match (running, self.is_armed()) {
            (true, false) => self.arm(),
            (false, true) => self.disarm(),
            _ => {}
        }
    }

    /// Resolves on the next tick. Pending forever while disarmed.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => future::pending::<()>().await,
        }
    }
}

impl Default for TickSource {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}
