//! Fixed-interval loop pacing

use super::conditions::Condition;
use super::ControlError;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

/// Interval used by [`LoopControl::default`].
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Ensures a loop runs at a fixed interval and stops on shutdown.
///
/// [`wait`](Self::wait) sleeps until the next interval slot. Slots that were
/// missed because an iteration took too long are skipped rather than run in a
/// burst.
pub struct LoopControl {
    running: bool,
    interval: Duration,
    next_point: Instant,
    shutdown_conditions: Vec<Box<dyn Condition>>,
}

impl Default for LoopControl {
    fn default() -> Self {
        Self {
            running: true,
            interval: DEFAULT_INTERVAL,
            next_point: Instant::now(),
            shutdown_conditions: Vec::new(),
        }
    }
}

impl fmt::Debug for LoopControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conditions: Vec<&str> = self.shutdown_conditions.iter().map(|c| c.name()).collect();
        f.debug_struct("LoopControl")
            .field("running", &self.running)
            .field("interval", &self.interval)
            .field("shutdown_conditions", &conditions)
            .finish()
    }
}

impl LoopControl {
    /// Creates a loop control with the given interval.
    pub fn new(interval: Duration) -> Result<Self, ControlError> {
        let mut control = Self::default();
        control.update_interval(interval)?;
        Ok(control)
    }

    /// Waits until the start of the next iteration.
    ///
    /// Returns false once the loop was shut down or a shutdown condition is
    /// met; it then returns immediately.
    pub fn wait(&mut self) -> bool {
        if self.running {
            if let Some(condition) = self.shutdown_conditions.iter_mut().find_map(|c| {
                if c.check() {
                    Some(c.name())
                } else {
                    None
                }
            }) {
                info!(condition, "Shutdown condition met");
                self.running = false;
            }
        }

        if self.running {
            let now = Instant::now();
            while self.next_point <= now {
                self.next_point += self.interval;
            }
            thread::sleep(self.next_point - now);
        }
        self.running
    }

    /// Changes the interval, effective after the next slot.
    pub fn update_interval(&mut self, interval: Duration) -> Result<(), ControlError> {
        if interval.is_zero() {
            return Err(ControlError::ZeroInterval);
        }
        self.interval = interval;
        Ok(())
    }

    pub fn current_interval(&self) -> Duration {
        self.interval
    }

    /// Stops the loop, the next [`wait`](Self::wait) returns false.
    pub fn shutdown(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Adds a condition that stops the loop once met.
    pub fn add_shutdown_condition(&mut self, condition: impl Condition + 'static) {
        self.shutdown_conditions.push(Box::new(condition));
    }
}
