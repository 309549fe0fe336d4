//! Actions waiting in the mouse and keyboard queues
//!
//! Each action carries the cooldown that is added to its queue's next-due
//! instant once it was executed. `Move` and `Turn` are multi-tick actions that
//! stay at the front of the queue until they complete.

use super::common::{Key, MouseButton};
use super::geometry::Point;
use super::motion::{WheelPace, MOVE_INTERVAL};
use std::time::Duration;

/// Common behavior of queued actions.
pub trait QueuedAction: Copy {
    /// Whether the action is a sync marker.
    fn is_sync(&self) -> bool;
}

/// A cursor movement in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveAction {
    /// Final cursor position
    pub target: Point,
    /// Base distance per tick [px]
    pub speed: f64,
    /// Vertical skew of the speed
    pub factor: f64,
    /// Polling interval
    pub cooldown: Duration,
    /// Distance to the target at the start of the last successful tick
    pub last_distance: Option<f64>,
}

impl MoveAction {
    pub fn new(target: Point, speed: f64, factor: f64) -> Self {
        Self {
            target,
            speed,
            factor,
            cooldown: MOVE_INTERVAL,
            last_distance: None,
        }
    }

    /// Whether the cursor got no closer since the last successful tick.
    pub fn is_stalled(&self, distance: f64) -> bool {
        self.last_distance.map_or(false, |last| distance >= last)
    }
}

/// One push of the mouse wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnAction {
    /// Signed steps still to turn
    pub steps_left: i16,
    /// Steps turned per tick (positive)
    pub steps_per_tick: i16,
    /// Delay between two ticks
    pub cooldown: Duration,
    /// Added once after the last tick
    pub push_cooldown: Duration,
}

impl TurnAction {
    /// Creates a push of `steps` paced by `pace`.
    pub fn new(steps: i16, pace: WheelPace) -> Self {
        Self {
            steps_left: steps,
            steps_per_tick: pace.steps_per_tick,
            cooldown: pace.cooldown,
            push_cooldown: pace.push_cooldown,
        }
    }

    /// Removes the pause after the push.
    pub fn without_push_cooldown(mut self) -> Self {
        self.push_cooldown = Duration::ZERO;
        self
    }

    /// Signed steps to turn on the next tick.
    pub fn next_steps(&self) -> i16 {
        self.steps_left.signum() * self.steps_per_tick.min(self.steps_left.saturating_abs())
    }
}

/// Actions of the mouse queue
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseAction {
    Wait { cooldown: Duration },
    Down { button: MouseButton, cooldown: Duration },
    Up { button: MouseButton, cooldown: Duration },
    Move(MoveAction),
    Turn(TurnAction),
    Sync,
}

impl QueuedAction for MouseAction {
    fn is_sync(&self) -> bool {
        matches!(self, MouseAction::Sync)
    }
}

/// Actions of the keyboard queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardAction {
    Wait { cooldown: Duration },
    Down { key: Key, cooldown: Duration },
    Up { key: Key, cooldown: Duration },
    Sync,
}

impl QueuedAction for KeyboardAction {
    fn is_sync(&self) -> bool {
        matches!(self, KeyboardAction::Sync)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(steps_left: i16, steps_per_tick: i16) -> TurnAction {
        TurnAction {
            steps_left,
            steps_per_tick,
            cooldown: Duration::from_millis(20),
            push_cooldown: Duration::from_millis(30),
        }
    }

    #[test]
    fn test_next_steps_follow_sign() {
        assert_eq!(turn(5, 2).next_steps(), 2);
        assert_eq!(turn(-5, 2).next_steps(), -2);
        assert_eq!(turn(1, 2).next_steps(), 1);
        assert_eq!(turn(-1, 2).next_steps(), -1);
        assert_eq!(turn(0, 2).next_steps(), 0);
    }

    #[test]
    fn test_next_steps_extreme_values() {
        assert_eq!(turn(i16::MIN, 3).next_steps(), -3);
        assert_eq!(turn(i16::MAX, i16::MAX).next_steps(), i16::MAX);
    }

    #[test]
    fn test_last_push_has_no_cooldown() {
        let action = turn(4, 1).without_push_cooldown();
        assert_eq!(action.push_cooldown, Duration::ZERO);
        assert_eq!(action.cooldown, Duration::from_millis(20));
    }

    #[test]
    fn test_move_stalls_without_progress() {
        let mut action = MoveAction::new(Point::new(10, 10), 5.0, 0.0);
        assert!(!action.is_stalled(100.0));

        action.last_distance = Some(20.0);
        assert!(!action.is_stalled(19.5));
        assert!(action.is_stalled(20.0));
        assert!(action.is_stalled(21.0));
    }

    #[test]
    fn test_sync_markers() {
        assert!(MouseAction::Sync.is_sync());
        assert!(KeyboardAction::Sync.is_sync());
        assert!(!MouseAction::Wait { cooldown: Duration::ZERO }.is_sync());
        assert!(!KeyboardAction::Down {
            key: Key::A,
            cooldown: Duration::ZERO
        }
        .is_sync());
    }
}
