//! Deviation strategies decide how human each emulated input looks
//!
//! The emulator asks its strategy for every duration, target, speed and wheel
//! chunk at the moment an action is enqueued. [`NormalDeviationStrategy`] is the
//! default implementation and draws everything from [`Parameters`].

use super::geometry::{Point, Rectangle};
use super::parameters::{ParameterError, Parameters};
use super::timing;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// Source of randomized, human-plausible timing and targets.
pub trait DeviationStrategy: Send {
    /// Time a key stays down before the next keyboard action.
    fn calculate_key_down_time(&mut self) -> Duration;

    /// Time between releasing a key and the next keyboard action.
    fn calculate_key_up_time(&mut self) -> Duration;

    /// Time a mouse button stays down before the next mouse action.
    fn calculate_button_down_time(&mut self) -> Duration;

    /// Time between releasing a mouse button and the next mouse action.
    fn calculate_button_up_time(&mut self) -> Duration;

    /// Picks the cursor target inside `area`.
    fn calculate_target_in(&mut self, area: &Rectangle) -> Point;

    /// Cursor speed [px/s].
    fn calculate_speed(&mut self) -> u32;

    /// Skew applied to the cursor speed depending on the vertical share of the movement.
    fn calculate_horizontal_speed_factor(&mut self) -> f64;

    /// Steps of the next wheel push, given the steps still to do.
    ///
    /// The sign of the result follows `remaining_steps`.
    fn calculate_wheel_steps(&mut self, remaining_steps: i16) -> i16;

    /// Wheel speed [steps/s].
    fn calculate_wheel_speed(&mut self) -> u16;

    /// Pause needed to reposition the finger after a wheel push.
    fn calculate_wheel_reset_time(&mut self) -> Duration;
}

/// Implements [`DeviationStrategy`] with truncated normal distributions.
#[derive(Debug)]
pub struct NormalDeviationStrategy {
    parameters: Parameters,
    rng: StdRng,
}

impl NormalDeviationStrategy {
    /// Creates a strategy seeded from the operating system.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are out of range.
    pub fn new(parameters: Parameters) -> Result<Self, ParameterError> {
        Ok(Self {
            parameters: parameters.validated()?,
            rng: StdRng::from_entropy(),
        })
    }

    /// Creates a reproducible strategy.
    pub fn with_seed(parameters: Parameters, seed: u64) -> Result<Self, ParameterError> {
        Ok(Self {
            parameters: parameters.validated()?,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Returns the parameters used by this strategy.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn axis_target(&mut self, start: u32, extent: u32) -> u32 {
        let center = start as f64 + (extent / 2) as f64;
        let spread = self.parameters.cursor_accuracy * extent as f64 / 2.0;
        let value = center + timing::sample_offset(&mut self.rng, spread);
        let last = start.saturating_add(extent.saturating_sub(1));
        (value.round().max(0.0) as u32).clamp(start, last)
    }
}

impl DeviationStrategy for NormalDeviationStrategy {
    fn calculate_key_down_time(&mut self) -> Duration {
        timing::sample_duration(&mut self.rng, &self.parameters.key_down_time)
    }

    fn calculate_key_up_time(&mut self) -> Duration {
        timing::sample_duration(&mut self.rng, &self.parameters.key_up_time)
    }

    fn calculate_button_down_time(&mut self) -> Duration {
        timing::sample_duration(&mut self.rng, &self.parameters.button_down_time)
    }

    fn calculate_button_up_time(&mut self) -> Duration {
        timing::sample_duration(&mut self.rng, &self.parameters.button_up_time)
    }

    fn calculate_target_in(&mut self, area: &Rectangle) -> Point {
        let x = self.axis_target(area.x, area.width);
        let y = self.axis_target(area.y, area.height);
        Point::new(x, y)
    }

    fn calculate_speed(&mut self) -> u32 {
        let speed = timing::sample_truncated(&mut self.rng, &self.parameters.cursor_speed);
        (speed as u32).max(1)
    }

    fn calculate_horizontal_speed_factor(&mut self) -> f64 {
        self.parameters.horizontal_speed_factor
    }

    fn calculate_wheel_steps(&mut self, remaining_steps: i16) -> i16 {
        let limit = self.parameters.wheel_steps_per_push;
        remaining_steps.clamp(-limit, limit)
    }

    fn calculate_wheel_speed(&mut self) -> u16 {
        self.parameters.wheel_speed
    }

    fn calculate_wheel_reset_time(&mut self) -> Duration {
        timing::sample_duration(&mut self.rng, &self.parameters.wheel_reset_time)
    }
}
