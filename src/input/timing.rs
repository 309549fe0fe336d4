//! Sampling helpers for human-like timing values
//!
//! Human input timing is roughly normally distributed around a personal mean.
//! Values are drawn with the Box-Muller transform and truncated to the open
//! interval `(0, mean + 3σ)`, so a sample is never zero, negative or an
//! extreme outlier.
//!
//! # Example
//!
//! ```rust
//! use ki_input_emulator::input::{timing, Deviation};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let delay = timing::sample_duration(&mut rng, &Deviation::new(55.0, 24.0));
//! assert!(delay.as_millis() < 55 + 3 * 24);
//! ```

use super::parameters::Deviation;
use rand::Rng;
use std::time::Duration;

/// Samples before falling back to clamping the last value.
const MAX_ATTEMPTS: usize = 64;

/// Generates a normally distributed random number
///
/// Uses the Box-Muller transform to convert uniform random numbers
/// to normal distribution.
pub fn normal_random<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-10); // Avoid log(0)
    let u2: f64 = rng.gen();

    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();

    mean + z * std_dev
}

/// Draws a value from `deviation` truncated to `(0, mean + 3σ)`.
///
/// Without deviation the mean is returned unchanged.
pub fn sample_truncated<R: Rng>(rng: &mut R, deviation: &Deviation) -> f64 {
    if deviation.stddev <= 0.0 {
        return deviation.mean.max(0.0);
    }

    let upper = deviation.upper_bound();
    let mut value = deviation.mean;
    for _ in 0..MAX_ATTEMPTS {
        value = normal_random(rng, deviation.mean, deviation.stddev);
        if value > 0.0 && value < upper {
            return value;
        }
    }

    value.clamp(f64::MIN_POSITIVE, upper)
}

/// Draws a duration in milliseconds from `deviation`
pub fn sample_duration<R: Rng>(rng: &mut R, deviation: &Deviation) -> Duration {
    Duration::from_millis(sample_truncated(rng, deviation) as u64)
}

/// Draws a zero-centered offset with the given standard deviation
pub fn sample_offset<R: Rng>(rng: &mut R, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    normal_random(rng, 0.0, std_dev)
}
