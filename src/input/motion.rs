//! Cursor interpolation and wheel pacing
//!
//! Both algorithms are pure: the scheduler feeds them the current state and
//! applies the result through the system interface.
//!
//! # Cursor movement
//!
//! A move is polled every [`MOVE_INTERVAL`]. Each tick the cursor advances
//! along the straight line to the target by
//!
//! ```text
//! speed = base × (1 + factor × |cos(direction)|)
//! ```
//!
//! where `direction` is measured from the vertical axis, so `factor` skews
//! vertical movement relative to horizontal movement. A tick always moves at
//! least one pixel and never overshoots; once the remaining distance is below
//! one tick the cursor snaps onto the target.
//!
//! # Wheel pacing
//!
//! A wheel turn issues one step per `1000 / speed` ms. Below
//! [`MIN_WHEEL_INTERVAL`] the interval saturates and several steps are issued
//! per tick instead.

use super::geometry::Point;
use std::time::Duration;

/// Polling interval of cursor movement.
pub const MOVE_INTERVAL: Duration = Duration::from_millis(40);

/// Shortest interval between two wheel turns.
pub const MIN_WHEEL_INTERVAL: Duration = Duration::from_millis(20);

/// Smallest distance a cursor tick travels [px].
const MIN_STEP: f64 = 1.0;

/// Result of one interpolation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStep {
    /// The target is within one tick, the cursor lands on it.
    Arrived(Point),
    /// The cursor moves to an intermediate position.
    Advance(Point),
}

impl MoveStep {
    /// Position the cursor is set to
    pub fn position(&self) -> Point {
        match self {
            MoveStep::Arrived(p) | MoveStep::Advance(p) => *p,
        }
    }
}

/// Converts a cursor speed [px/s] into pixels per [`MOVE_INTERVAL`] tick.
pub fn speed_per_tick(speed: u32) -> f64 {
    speed as f64 * MOVE_INTERVAL.as_millis() as f64 / 1000.0
}

/// Computes the next cursor position on the way from `current` to `target`.
///
/// `speed` is the base distance per tick, `factor` the vertical skew.
pub fn interpolate(current: Point, target: Point, speed: f64, factor: f64) -> MoveStep {
    let distance = current.distance_to(&target);
    let direction = current.direction_to(&target);

    let step = (speed * (1.0 + factor * direction.cos().abs())).max(MIN_STEP);
    if distance <= step {
        return MoveStep::Arrived(target);
    }

    // |dx| <= |target.x - current.x| because step <= distance, so rounding
    // never passes the target on either axis.
    let dx = (step * direction.sin()).round();
    let dy = (step * direction.cos()).round();
    let x = (current.x as f64 + dx).max(0.0) as u32;
    let y = (current.y as f64 + dy).max(0.0) as u32;

    let next = Point::new(x, y);
    if next == target {
        MoveStep::Arrived(target)
    } else {
        MoveStep::Advance(next)
    }
}

/// Timing of a wheel turn derived from the strategy's speed and reset time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelPace {
    /// Delay between two ticks
    pub cooldown: Duration,
    /// Steps issued per tick (always positive)
    pub steps_per_tick: i16,
    /// Extra pause after the last tick of a push
    pub push_cooldown: Duration,
}

impl WheelPace {
    /// Derives the pacing for `speed` [steps/s] and the finger `reset_time`.
    pub fn new(speed: u16, reset_time: Duration) -> Self {
        let speed = u64::from(speed.max(1));
        let interval = Duration::from_millis(1000 / speed);

        let (cooldown, steps_per_tick) = if interval < MIN_WHEEL_INTERVAL {
            let ticks_per_second = 1000 / MIN_WHEEL_INTERVAL.as_millis() as u64;
            let steps = (speed / ticks_per_second).clamp(1, i16::MAX as u64) as i16;
            (MIN_WHEEL_INTERVAL, steps)
        } else {
            (interval, 1)
        };

        Self {
            cooldown,
            steps_per_tick,
            push_cooldown: reset_time.saturating_sub(cooldown),
        }
    }
}
