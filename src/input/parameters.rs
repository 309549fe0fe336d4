//! Parameters of the default deviation strategy
//!
//! Every randomized quantity is described by a mean and a standard deviation.
//! Times are given in milliseconds, speeds in pixels or wheel steps per second.
//!
//! The `human` preset is derived from recorded sessions of a single user and
//! the `fast` preset removes all deviation for quick, deterministic runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported when a set of parameters is out of range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    /// A time mean or standard deviation is negative or not finite.
    #[error("Invalid {name}: mean {mean}ms / stddev {stddev}ms must be finite and non-negative")]
    InvalidTime {
        name: &'static str,
        mean: f64,
        stddev: f64,
    },

    /// Cursor accuracy is outside of [0, 1].
    #[error("Invalid cursor accuracy {0}: must be within [0, 1]")]
    InvalidAccuracy(f64),

    /// Cursor speed mean is not positive or its deviation is negative.
    #[error("Invalid cursor speed: mean {mean} must be positive, stddev {stddev} non-negative")]
    InvalidSpeed { mean: f64, stddev: f64 },

    /// The horizontal speed factor would stop or reverse the cursor.
    #[error("Invalid horizontal speed factor {0}: must be finite and greater than -1")]
    InvalidSpeedFactor(f64),

    /// Wheel settings that could never finish a turn.
    #[error("Invalid wheel setting: {0}")]
    InvalidWheel(String),
}

/// Mean and standard deviation of a normally distributed value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    pub mean: f64,
    #[serde(default)]
    pub stddev: f64,
}

impl Deviation {
    pub const fn new(mean: f64, stddev: f64) -> Self {
        Self { mean, stddev }
    }

    /// A value without any deviation
    pub const fn fixed(mean: f64) -> Self {
        Self { mean, stddev: 0.0 }
    }

    /// Upper bound used when sampling (three standard deviations).
    pub fn upper_bound(&self) -> f64 {
        self.mean + 3.0 * self.stddev
    }

    fn is_valid_time(&self) -> bool {
        self.mean.is_finite() && self.stddev.is_finite() && self.mean >= 0.0 && self.stddev >= 0.0
    }

    fn is_valid_speed(&self) -> bool {
        self.mean.is_finite() && self.stddev.is_finite() && self.mean > 0.0 && self.stddev >= 0.0
    }
}

/// The parameters for the input emulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// How long a key is held down [ms].
    pub key_down_time: Deviation,
    /// Pause between releasing a key and pressing the next [ms].
    pub key_up_time: Deviation,
    /// How long a mouse button is held down [ms].
    pub button_down_time: Deviation,
    /// Pause between releasing a button and pressing the next [ms].
    pub button_up_time: Deviation,
    /// Spread of click targets around the center of the target area.
    ///
    /// 0.0 always hits the center, 1.0 uses half of the area as one standard deviation.
    pub cursor_accuracy: f64,
    /// Cursor speed along the horizontal axis [px/s].
    pub cursor_speed: Deviation,
    /// Relative speed change for vertical movement, `-0.5` halves it.
    pub horizontal_speed_factor: f64,
    /// Maximum wheel steps done in one push of the finger.
    pub wheel_steps_per_push: i16,
    /// Speed the wheel is turned at [steps/s].
    pub wheel_speed: u16,
    /// Time to reposition the finger between two pushes [ms].
    pub wheel_reset_time: Deviation,
}

impl Default for Parameters {
    fn default() -> Self {
        Self::human()
    }
}

impl Parameters {
    /// Parameters for a more human like behavior.
    pub fn human() -> Self {
        Self {
            key_down_time: Deviation::new(55.0, 24.0),
            key_up_time: Deviation::new(108.0, 130.0),
            button_down_time: Deviation::new(77.0, 14.0),
            button_up_time: Deviation::new(76.0, 21.0),
            cursor_accuracy: 0.2821,
            cursor_speed: Deviation::new(492.65, 335.93),
            horizontal_speed_factor: -0.4459,
            wheel_steps_per_push: 6,
            wheel_speed: 40,
            wheel_reset_time: Deviation::new(180.0, 60.0),
        }
    }

    /// Parameters for fast input without deviation.
    pub fn fast() -> Self {
        Self {
            key_down_time: Deviation::fixed(50.0),
            key_up_time: Deviation::fixed(50.0),
            button_down_time: Deviation::fixed(50.0),
            button_up_time: Deviation::fixed(50.0),
            cursor_accuracy: 0.0,
            cursor_speed: Deviation::fixed(3840.0),
            horizontal_speed_factor: 0.0,
            wheel_steps_per_push: 20,
            wheel_speed: 100,
            wheel_reset_time: Deviation::fixed(50.0),
        }
    }

    /// Checks every value and reports the first one out of range.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let times = [
            ("key down time", &self.key_down_time),
            ("key up time", &self.key_up_time),
            ("button down time", &self.button_down_time),
            ("button up time", &self.button_up_time),
            ("wheel reset time", &self.wheel_reset_time),
        ];
        for (name, time) in times {
            if !time.is_valid_time() {
                return Err(ParameterError::InvalidTime {
                    name,
                    mean: time.mean,
                    stddev: time.stddev,
                });
            }
        }

        if !self.cursor_accuracy.is_finite() || !(0.0..=1.0).contains(&self.cursor_accuracy) {
            return Err(ParameterError::InvalidAccuracy(self.cursor_accuracy));
        }

        if !self.cursor_speed.is_valid_speed() {
            return Err(ParameterError::InvalidSpeed {
                mean: self.cursor_speed.mean,
                stddev: self.cursor_speed.stddev,
            });
        }

        if !self.horizontal_speed_factor.is_finite() || self.horizontal_speed_factor <= -1.0 {
            return Err(ParameterError::InvalidSpeedFactor(self.horizontal_speed_factor));
        }

        if self.wheel_steps_per_push <= 0 {
            return Err(ParameterError::InvalidWheel(format!(
                "steps per push must be positive, got {}",
                self.wheel_steps_per_push
            )));
        }
        if self.wheel_speed == 0 {
            return Err(ParameterError::InvalidWheel(
                "wheel speed must be at least one step per second".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the parameters if they are valid.
    pub fn validated(self) -> Result<Self, ParameterError> {
        self.validate()?;
        Ok(self)
    }
}
