//! System interfaces perform the literal input injection
//!
//! The emulator only ever talks to a [`SystemInterface`]. Every call is
//! non-blocking and reports failure through [`InputError`]; the emulator never
//! aborts on such failures, it only counts them.
//!
//! [`VirtualInterface`] is an in-memory backend that keeps a virtual cursor,
//! the pressed buttons and keys, the lock states and a timestamped log of the
//! most recent calls. It backs the `ki-input` binary and the test-suite.

use super::common::{Key, KeyboardLock, MouseButton};
use super::geometry::{Point, Rectangle};
use super::{InputError, InputResult};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;
use tracing::trace;

/// Default number of events kept by a [`VirtualInterface`]
pub const DEFAULT_EVENT_CAPACITY: usize = 4096;

/// Platform backend performing presses, releases, cursor moves and wheel turns.
pub trait SystemInterface: Send + Sync + 'static {
    /// Checks whether the mouse button is currently down.
    fn is_button_down(&self, button: MouseButton) -> bool;

    /// Checks whether the key is currently down.
    fn is_key_down(&self, key: Key) -> bool;

    /// Checks whether the keyboard lock is active.
    fn is_lock_active(&self, lock: KeyboardLock) -> bool;

    /// Reads the current cursor position.
    fn cursor_position(&self) -> InputResult<Point>;

    /// Places the cursor.
    fn set_cursor_position(&self, position: Point) -> InputResult<()>;

    /// Turns the mouse wheel, positive is up or forward.
    fn turn_mouse_wheel(&self, steps: i16) -> InputResult<()>;

    /// Presses the mouse button.
    fn button_down(&self, button: MouseButton) -> InputResult<()>;

    /// Releases the mouse button.
    fn button_up(&self, button: MouseButton) -> InputResult<()>;

    /// Presses the key.
    fn key_down(&self, key: Key) -> InputResult<()>;

    /// Releases the key.
    fn key_up(&self, key: Key) -> InputResult<()>;
}

/// Operations of the [`VirtualInterface`] that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetCursorPosition,
    SetCursorPosition,
    TurnMouseWheel,
    ButtonDown,
    ButtonUp,
    KeyDown,
    KeyUp,
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::GetCursorPosition => "get cursor position",
            Operation::SetCursorPosition => "set cursor position",
            Operation::TurnMouseWheel => "turn mouse wheel",
            Operation::ButtonDown => "button down",
            Operation::ButtonUp => "button up",
            Operation::KeyDown => "key down",
            Operation::KeyUp => "key up",
        }
    }
}

/// A call performed on the [`VirtualInterface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    CursorQueried,
    CursorMoved(Point),
    WheelTurned(i16),
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    KeyDown(Key),
    KeyUp(Key),
}

/// One entry of the [`VirtualInterface`] log.
#[derive(Debug, Clone, Copy)]
pub struct RecordedEvent {
    /// When the call happened
    pub at: Instant,
    /// What was requested
    pub event: InputEvent,
    /// Whether the call succeeded
    pub succeeded: bool,
}

#[derive(Debug)]
struct VirtualState {
    cursor: Point,
    buttons: HashSet<MouseButton>,
    keys: HashSet<Key>,
    locks: HashSet<KeyboardLock>,
    wheel_position: i64,
    failures: HashMap<Operation, u32>,
    events: VecDeque<RecordedEvent>,
    event_capacity: usize,
    event_total: u64,
}

impl Default for VirtualState {
    fn default() -> Self {
        Self {
            cursor: Point::default(),
            buttons: HashSet::new(),
            keys: HashSet::new(),
            locks: HashSet::new(),
            wheel_position: 0,
            failures: HashMap::new(),
            events: VecDeque::new(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            event_total: 0,
        }
    }
}

impl VirtualState {
    /// Consumes one planned failure for the operation, if any.
    fn should_fail(&mut self, operation: Operation) -> bool {
        match self.failures.get_mut(&operation) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }

    fn record(&mut self, operation: Operation, event: InputEvent) -> InputResult<()> {
        let failed = self.should_fail(operation);
        trace!(?event, failed, "virtual input");
        if self.events.len() >= self.event_capacity {
            self.events.pop_front();
        }
        self.events.push_back(RecordedEvent {
            at: Instant::now(),
            event,
            succeeded: !failed,
        });
        self.event_total += 1;
        if failed {
            Err(InputError::Rejected {
                operation: operation.name(),
            })
        } else {
            Ok(())
        }
    }
}

/// In-memory input backend with a virtual screen.
#[derive(Debug)]
pub struct VirtualInterface {
    screen: Rectangle,
    state: Mutex<VirtualState>,
}

impl Default for VirtualInterface {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

impl VirtualInterface {
    /// Creates a backend for a screen of the given size with the cursor at the origin.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            screen: Rectangle::new(0, 0, width, height),
            state: Mutex::new(VirtualState::default()),
        }
    }

    /// Places the cursor without recording an event.
    pub fn with_cursor(self, position: Point) -> Self {
        self.state.lock().cursor = self.screen.clamp(position);
        self
    }

    /// Activates a lock without recording an event.
    pub fn with_lock(self, lock: KeyboardLock) -> Self {
        self.state.lock().locks.insert(lock);
        self
    }

    /// Keeps at most `capacity` events, dropping the oldest first.
    pub fn with_event_capacity(self, capacity: usize) -> Self {
        {
            let mut state = self.state.lock();
            state.event_capacity = capacity.max(1);
            while state.events.len() > state.event_capacity {
                state.events.pop_front();
            }
        }
        self
    }

    /// Makes the next `times` calls of `operation` fail.
    pub fn fail_next(&self, operation: Operation, times: u32) {
        *self.state.lock().failures.entry(operation).or_insert(0) += times;
    }

    /// Returns the current cursor position.
    pub fn cursor(&self) -> Point {
        self.state.lock().cursor
    }

    /// Returns the accumulated wheel steps.
    pub fn wheel_position(&self) -> i64 {
        self.state.lock().wheel_position
    }

    /// Returns a copy of the retained events, oldest first.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.state.lock().events.iter().copied().collect()
    }

    /// Returns the number of retained events.
    pub fn event_count(&self) -> usize {
        self.state.lock().events.len()
    }

    /// Returns the number of calls recorded since creation.
    pub fn event_total(&self) -> u64 {
        self.state.lock().event_total
    }

    /// Returns the screen area.
    pub fn screen(&self) -> Rectangle {
        self.screen
    }
}

impl SystemInterface for VirtualInterface {
    fn is_button_down(&self, button: MouseButton) -> bool {
        self.state.lock().buttons.contains(&button)
    }

    fn is_key_down(&self, key: Key) -> bool {
        self.state.lock().keys.contains(&key)
    }

    fn is_lock_active(&self, lock: KeyboardLock) -> bool {
        self.state.lock().locks.contains(&lock)
    }

    fn cursor_position(&self) -> InputResult<Point> {
        let mut state = self.state.lock();
        state
            .record(Operation::GetCursorPosition, InputEvent::CursorQueried)
            .map_err(|_| InputError::CursorUnavailable)?;
        Ok(state.cursor)
    }

    fn set_cursor_position(&self, position: Point) -> InputResult<()> {
        let mut state = self.state.lock();
        let position = self.screen.clamp(position);
        state.record(Operation::SetCursorPosition, InputEvent::CursorMoved(position))?;
        state.cursor = position;
        Ok(())
    }

    fn turn_mouse_wheel(&self, steps: i16) -> InputResult<()> {
        let mut state = self.state.lock();
        state.record(Operation::TurnMouseWheel, InputEvent::WheelTurned(steps))?;
        state.wheel_position += i64::from(steps);
        Ok(())
    }

    fn button_down(&self, button: MouseButton) -> InputResult<()> {
        let mut state = self.state.lock();
        state.record(Operation::ButtonDown, InputEvent::ButtonDown(button))?;
        state.buttons.insert(button);
        Ok(())
    }

    fn button_up(&self, button: MouseButton) -> InputResult<()> {
        let mut state = self.state.lock();
        state.record(Operation::ButtonUp, InputEvent::ButtonUp(button))?;
        state.buttons.remove(&button);
        Ok(())
    }

    fn key_down(&self, key: Key) -> InputResult<()> {
        let mut state = self.state.lock();
        state.record(Operation::KeyDown, InputEvent::KeyDown(key))?;
        if state.keys.insert(key) {
            if let Some(lock) = key.toggles() {
                if !state.locks.remove(&lock) {
                    state.locks.insert(lock);
                }
            }
        }
        Ok(())
    }

    fn key_up(&self, key: Key) -> InputResult<()> {
        let mut state = self.state.lock();
        state.record(Operation::KeyUp, InputEvent::KeyUp(key))?;
        state.keys.remove(&key);
        Ok(())
    }
}
