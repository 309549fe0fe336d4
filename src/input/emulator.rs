//! The emulator facade
//!
//! Every operation asks the [`DeviationStrategy`] for its timing and targets,
//! appends the resulting actions to the mouse or keyboard queue and returns
//! immediately. Execution happens on the scheduler thread; failures there are
//! only visible through [`Emulator::error_counter`].
//!
//! Actions produced by a single call are enqueued under one lock, so calls from
//! several threads never interleave within a click or a drag.

use super::action::{KeyboardAction, MouseAction, MoveAction, TurnAction};
use super::common::{Device, Key, KeyboardLock, MouseButton};
use super::geometry::{Point, Rectangle};
use super::motion::{self, WheelPace};
use super::parameters::Parameters;
use super::scheduler::{self, SchedulerState, Shared};
use super::strategy::{DeviationStrategy, NormalDeviationStrategy};
use super::system::SystemInterface;
use super::{EmulatorError, InputResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Human-like input emulator over a [`SystemInterface`].
///
/// Dropping the emulator stops and joins its scheduler thread. Pending
/// actions are discarded.
pub struct Emulator<S: SystemInterface> {
    shared: Arc<Shared<S>>,
    strategy: Mutex<Box<dyn DeviationStrategy>>,
    worker: Option<JoinHandle<()>>,
}

impl<S: SystemInterface> Emulator<S> {
    /// Creates an emulator using a [`NormalDeviationStrategy`] with `parameters`.
    ///
    /// # Errors
    ///
    /// Fails if the parameters are out of range or the scheduler thread
    /// cannot be spawned.
    pub fn new(parameters: Parameters, interface: S) -> Result<Self, EmulatorError> {
        let strategy = NormalDeviationStrategy::new(parameters)?;
        Self::with_strategy(strategy, interface)
    }

    /// Creates an emulator with a custom deviation strategy.
    pub fn with_strategy(
        strategy: impl DeviationStrategy + 'static,
        interface: S,
    ) -> Result<Self, EmulatorError> {
        let shared = Arc::new(Shared::new(interface));
        let worker = scheduler::spawn_worker(Arc::clone(&shared))?;
        info!("Input emulator started");

        Ok(Self {
            shared,
            strategy: Mutex::new(Box::new(strategy)),
            worker: Some(worker),
        })
    }

    /// Returns the system interface the emulator drives.
    pub fn interface(&self) -> &S {
        &self.shared.interface
    }

    fn enqueue(&self, push: impl FnOnce(&mut SchedulerState, Instant)) {
        {
            let mut state = self.shared.state.lock();
            push(&mut state, Instant::now());
        }
        self.shared.notify();
    }

    fn move_action(strategy: &mut dyn DeviationStrategy, area: &Rectangle) -> MouseAction {
        let target = strategy.calculate_target_in(area);
        let speed = motion::speed_per_tick(strategy.calculate_speed());
        let factor = strategy.calculate_horizontal_speed_factor();
        MouseAction::Move(MoveAction::new(target, speed, factor))
    }

    fn button_down_action(strategy: &mut dyn DeviationStrategy, button: MouseButton) -> MouseAction {
        MouseAction::Down {
            button,
            cooldown: strategy.calculate_button_down_time(),
        }
    }

    fn button_up_action(strategy: &mut dyn DeviationStrategy, button: MouseButton) -> MouseAction {
        MouseAction::Up {
            button,
            cooldown: strategy.calculate_button_up_time(),
        }
    }

    fn push_mouse_all(&self, actions: Vec<MouseAction>) {
        self.enqueue(|state, now| {
            for action in actions {
                state.push_mouse(action, now);
            }
        });
    }

    // ------------------------------------------------------------------
    // Mouse
    // ------------------------------------------------------------------

    /// Moves the cursor to a point inside `area`.
    pub fn move_to(&self, area: &Rectangle) {
        let action = Self::move_action(&mut **self.strategy.lock(), area);
        debug!(%area, "Enqueue move");
        self.enqueue(|state, now| state.push_mouse(action, now));
    }

    /// Clicks `button` at the current cursor position.
    pub fn click(&self, button: MouseButton) {
        let actions = {
            let mut strategy = self.strategy.lock();
            vec![
                Self::button_down_action(&mut **strategy, button),
                Self::button_up_action(&mut **strategy, button),
            ]
        };
        debug!(%button, "Enqueue click");
        self.push_mouse_all(actions);
    }

    /// Moves into `area` and clicks `button` there.
    pub fn click_at(&self, button: MouseButton, area: &Rectangle) {
        let actions = {
            let mut strategy = self.strategy.lock();
            vec![
                Self::move_action(&mut **strategy, area),
                Self::button_down_action(&mut **strategy, button),
                Self::button_up_action(&mut **strategy, button),
            ]
        };
        debug!(%button, %area, "Enqueue click");
        self.push_mouse_all(actions);
    }

    /// Presses `button` inside `start`, moves into `stop` and releases it there.
    pub fn drag_and_drop(&self, button: MouseButton, start: &Rectangle, stop: &Rectangle) {
        let actions = {
            let mut strategy = self.strategy.lock();
            vec![
                Self::move_action(&mut **strategy, start),
                Self::button_down_action(&mut **strategy, button),
                Self::move_action(&mut **strategy, stop),
                Self::button_up_action(&mut **strategy, button),
            ]
        };
        debug!(%button, from = %start, to = %stop, "Enqueue drag and drop");
        self.push_mouse_all(actions);
    }

    /// Presses `button`.
    pub fn button_down(&self, button: MouseButton) {
        let action = Self::button_down_action(&mut **self.strategy.lock(), button);
        self.enqueue(|state, now| state.push_mouse(action, now));
    }

    /// Releases `button`.
    pub fn button_up(&self, button: MouseButton) {
        let action = Self::button_up_action(&mut **self.strategy.lock(), button);
        self.enqueue(|state, now| state.push_mouse(action, now));
    }

    /// Turns the wheel by `steps`, positive is up.
    ///
    /// The turn is split into pushes of the strategy's choosing. Each push
    /// is followed by the finger reset time, except the last one.
    pub fn turn_mouse_wheel(&self, steps: i16) {
        if steps == 0 {
            return;
        }

        let mut pushes = Vec::new();
        {
            let mut strategy = self.strategy.lock();
            let mut remaining = steps;
            while remaining != 0 {
                let speed = strategy.calculate_wheel_speed();
                let reset_time = strategy.calculate_wheel_reset_time();
                let chunk = clamp_chunk(strategy.calculate_wheel_steps(remaining), remaining);
                pushes.push(TurnAction::new(chunk, WheelPace::new(speed, reset_time)));
                remaining -= chunk;
            }
        }
        if let Some(last) = pushes.pop() {
            pushes.push(last.without_push_cooldown());
        }

        debug!(steps, pushes = pushes.len(), "Enqueue wheel turn");
        self.push_mouse_all(pushes.into_iter().map(MouseAction::Turn).collect());
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    /// Presses `key`.
    pub fn key_down(&self, key: Key) {
        let cooldown = self.strategy.lock().calculate_key_down_time();
        self.enqueue(|state, now| state.push_keyboard(KeyboardAction::Down { key, cooldown }, now));
    }

    /// Releases `key`.
    pub fn key_up(&self, key: Key) {
        let cooldown = self.strategy.lock().calculate_key_up_time();
        self.enqueue(|state, now| state.push_keyboard(KeyboardAction::Up { key, cooldown }, now));
    }

    /// Presses and releases `key`.
    pub fn press(&self, key: Key) {
        let (down, up) = {
            let mut strategy = self.strategy.lock();
            (strategy.calculate_key_down_time(), strategy.calculate_key_up_time())
        };
        debug!(%key, "Enqueue key press");
        self.enqueue(|state, now| {
            state.push_keyboard(KeyboardAction::Down { key, cooldown: down }, now);
            state.push_keyboard(KeyboardAction::Up { key, cooldown: up }, now);
        });
    }

    // ------------------------------------------------------------------
    // Queue control
    // ------------------------------------------------------------------

    /// Delays the next action of `device` by `duration`.
    pub fn wait(&self, device: Device, duration: Duration) {
        self.enqueue(|state, now| match device {
            Device::Mouse => state.push_mouse(MouseAction::Wait { cooldown: duration }, now),
            Device::Keyboard => {
                state.push_keyboard(KeyboardAction::Wait { cooldown: duration }, now)
            }
        });
    }

    /// Actions enqueued after this call run only once everything enqueued
    /// before it has run on both devices.
    pub fn sync(&self) {
        self.enqueue(|state, now| state.push_sync(now));
    }

    /// Drops every pending action. An action already executing completes.
    pub fn clear(&self) {
        self.enqueue(|state, _| state.clear());
        debug!("Action queues cleared");
    }

    /// Deactivates every active lock and releases every pressed button and key.
    pub fn reset(&self) {
        let interface = self.interface();
        let locks: Vec<KeyboardLock> = KeyboardLock::ALL
            .into_iter()
            .filter(|lock| interface.is_lock_active(*lock))
            .collect();
        let buttons: Vec<MouseButton> = MouseButton::ALL
            .into_iter()
            .filter(|button| interface.is_button_down(*button))
            .collect();
        let keys: Vec<Key> = Key::ALL
            .iter()
            .copied()
            .filter(|key| interface.is_key_down(*key))
            .collect();

        if !locks.is_empty() || !buttons.is_empty() || !keys.is_empty() {
            warn!(?locks, ?buttons, ?keys, "Resetting input state");
        }

        for lock in locks {
            self.press(lock.key());
        }
        for button in buttons {
            self.button_up(button);
        }
        for key in keys {
            self.key_up(key);
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Failed system interface calls since creation.
    pub fn error_counter(&self) -> u32 {
        self.shared.state.lock().error_counter()
    }

    /// Number of pending actions of `device`.
    pub fn action_count(&self, device: Device) -> usize {
        self.shared.state.lock().action_count(device)
    }

    pub fn action_count_mouse(&self) -> usize {
        self.action_count(Device::Mouse)
    }

    pub fn action_count_keyboard(&self) -> usize {
        self.action_count(Device::Keyboard)
    }

    /// Whether both queues are empty.
    pub fn is_idle(&self) -> bool {
        let state = self.shared.state.lock();
        state.action_count(Device::Mouse) == 0 && state.action_count(Device::Keyboard) == 0
    }

    /// Reads the cursor position from the system interface.
    pub fn cursor_position(&self) -> InputResult<Point> {
        self.interface().cursor_position()
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.interface().is_button_down(button)
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.interface().is_key_down(key)
    }

    pub fn is_lock_active(&self, lock: KeyboardLock) -> bool {
        self.interface().is_lock_active(lock)
    }
}

impl<S: SystemInterface> Drop for Emulator<S> {
    fn drop(&mut self) {
        self.shared.shutdown();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Input scheduler thread panicked");
            }
        }
        info!(errors = self.error_counter(), "Input emulator stopped");
    }
}

impl<S: SystemInterface + std::fmt::Debug> std::fmt::Debug for Emulator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emulator")
            .field("interface", &self.shared.interface)
            .field("errors", &self.error_counter())
            .finish_non_exhaustive()
    }
}

/// Limits a push to `[1, |remaining|]` steps in the direction of `remaining`.
fn clamp_chunk(chunk: i16, remaining: i16) -> i16 {
    let magnitude = chunk.saturating_abs().clamp(1, remaining.saturating_abs());
    remaining.signum() * magnitude
}
