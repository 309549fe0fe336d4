//! The dual-queue scheduler driving all emulated input
//!
//! Mouse and keyboard actions wait in two FIFO queues. Each queue owns an
//! absolute next-due instant that is advanced by the cooldown of whatever it
//! just executed; it is never recomputed from the wall clock, so a delayed
//! worker fires overdue actions immediately without compounding the delay.
//!
//! A single worker thread sleeps until the earliest next-due instant, executes
//! exactly one due action and re-checks. All state is guarded by one lock,
//! including the calls into the [`SystemInterface`].
//!
//! [`SchedulerState::poll`] holds the whole decision logic and takes the
//! current instant as an argument, so it can be driven with synthetic time.

use super::action::{KeyboardAction, MouseAction, MoveAction, QueuedAction, TurnAction};
use super::common::Device;
use super::motion::{self, MoveStep};
use super::system::SystemInterface;
use super::InputError;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Wake-up interval of an idle worker, bounds how long a shutdown can go unnoticed
pub const IDLE_INTERVAL: Duration = Duration::from_millis(1000);

/// FIFO of pending actions for one device.
#[derive(Debug)]
pub struct ActionQueue<A> {
    actions: VecDeque<A>,
    next_due: Instant,
}

impl<A: QueuedAction> ActionQueue<A> {
    fn new(now: Instant) -> Self {
        Self {
            actions: VecDeque::new(),
            next_due: now,
        }
    }

    /// Appends an action.
    ///
    /// An empty queue first catches its next-due instant up to `now`, so
    /// time spent idle is not treated as overdue work.
    pub fn push(&mut self, action: A, now: Instant) {
        if self.actions.is_empty() && self.next_due < now {
            self.next_due = now;
        }
        self.actions.push_back(action);
    }

    pub fn front(&self) -> Option<&A> {
        self.actions.front()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Instant the front action becomes eligible.
    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    fn front_is_sync(&self) -> bool {
        self.front().map_or(false, QueuedAction::is_sync)
    }

    /// Next-due instant if the front action takes part in the comparison.
    fn due(&self) -> Option<Instant> {
        match self.front() {
            Some(action) if !action.is_sync() => Some(self.next_due),
            _ => None,
        }
    }

    fn pop(&mut self) {
        self.actions.pop_front();
    }

    fn advance(&mut self, cooldown: Duration) {
        self.next_due += cooldown;
    }

    fn clear(&mut self) {
        self.actions.clear();
    }
}

/// Outcome of one [`SchedulerState::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// One action of the device was executed.
    Executed(Device),
    /// Both queues passed a sync point.
    Aligned,
    /// The earliest action is due at the given instant.
    SleepUntil(Instant),
    /// Both queues are empty.
    Idle,
}

/// Everything the worker and the emulator share.
#[derive(Debug)]
pub struct SchedulerState {
    mouse: ActionQueue<MouseAction>,
    keyboard: ActionQueue<KeyboardAction>,
    error_counter: u32,
    shutdown: bool,
}

impl SchedulerState {
    pub fn new(now: Instant) -> Self {
        Self {
            mouse: ActionQueue::new(now),
            keyboard: ActionQueue::new(now),
            error_counter: 0,
            shutdown: false,
        }
    }

    pub fn mouse(&self) -> &ActionQueue<MouseAction> {
        &self.mouse
    }

    pub fn keyboard(&self) -> &ActionQueue<KeyboardAction> {
        &self.keyboard
    }

    pub fn push_mouse(&mut self, action: MouseAction, now: Instant) {
        self.mouse.push(action, now);
    }

    pub fn push_keyboard(&mut self, action: KeyboardAction, now: Instant) {
        self.keyboard.push(action, now);
    }

    /// Appends a sync marker to both queues.
    pub fn push_sync(&mut self, now: Instant) {
        self.mouse.push(MouseAction::Sync, now);
        self.keyboard.push(KeyboardAction::Sync, now);
    }

    /// Number of pending actions of `device`.
    pub fn action_count(&self, device: Device) -> usize {
        match device {
            Device::Mouse => self.mouse.len(),
            Device::Keyboard => self.keyboard.len(),
        }
    }

    /// Failed system interface calls so far.
    pub fn error_counter(&self) -> u32 {
        self.error_counter
    }

    /// Drops every pending action of both queues.
    pub fn clear(&mut self) {
        self.mouse.clear();
        self.keyboard.clear();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    fn record_error(&mut self, error: &InputError) {
        self.error_counter = self.error_counter.saturating_add(1);
        debug!(%error, errors = self.error_counter, "System interface call failed");
    }

    /// Executes at most one due action.
    ///
    /// Sync points are released first. Otherwise the queue with the earlier
    /// next-due instant is picked, the keyboard winning ties, and its front
    /// action is executed if it is due at `now`.
    pub fn poll<S: SystemInterface + ?Sized>(&mut self, now: Instant, interface: &S) -> Poll {
        if self.release_sync() {
            return Poll::Aligned;
        }

        let (device, due) = match (self.mouse.due(), self.keyboard.due()) {
            (None, None) => return Poll::Idle,
            (Some(mouse), Some(keyboard)) if mouse < keyboard => (Device::Mouse, mouse),
            (_, Some(keyboard)) => (Device::Keyboard, keyboard),
            (Some(mouse), None) => (Device::Mouse, mouse),
        };

        if due > now {
            return Poll::SleepUntil(due);
        }

        match device {
            Device::Mouse => self.execute_mouse(interface),
            Device::Keyboard => self.execute_keyboard(interface),
        }
        Poll::Executed(device)
    }

    /// Pops sync markers once both queues reached them.
    ///
    /// Markers are only ever pushed and cleared in pairs, so a marker at the
    /// front of one queue always has its partner queued in the other.
    fn release_sync(&mut self) -> bool {
        if !(self.mouse.front_is_sync() && self.keyboard.front_is_sync()) {
            return false;
        }

        let aligned = self.mouse.next_due.max(self.keyboard.next_due);
        self.mouse.pop();
        self.keyboard.pop();
        self.mouse.next_due = aligned;
        self.keyboard.next_due = aligned;
        trace!("Queues aligned at sync point");
        true
    }

    fn execute_mouse<S: SystemInterface + ?Sized>(&mut self, interface: &S) {
        let Some(&action) = self.mouse.front() else {
            return;
        };
        trace!(?action, "Executing mouse action");

        match action {
            MouseAction::Wait { cooldown } => {
                self.mouse.pop();
                self.mouse.advance(cooldown);
            }
            MouseAction::Down { button, cooldown } => {
                if let Err(e) = interface.button_down(button) {
                    self.record_error(&e);
                }
                self.mouse.pop();
                self.mouse.advance(cooldown);
            }
            MouseAction::Up { button, cooldown } => {
                if let Err(e) = interface.button_up(button) {
                    self.record_error(&e);
                }
                self.mouse.pop();
                self.mouse.advance(cooldown);
            }
            MouseAction::Move(movement) => self.step_move(movement, interface),
            MouseAction::Turn(turn) => self.step_turn(turn, interface),
            // never due, released by release_sync
            MouseAction::Sync => {}
        }
    }

    /// Advances a move by one tick.
    ///
    /// A move that made no progress since its last successful tick is
    /// dropped as unreachable, which happens when the backend clamps the
    /// cursor short of the target.
    fn step_move<S: SystemInterface + ?Sized>(&mut self, movement: MoveAction, interface: &S) {
        match interface.cursor_position() {
            Ok(current) => {
                let distance = current.distance_to(&movement.target);
                if movement.is_stalled(distance) {
                    self.record_error(&InputError::TargetUnreachable {
                        target: movement.target,
                    });
                    self.mouse.pop();
                } else {
                    let step = motion::interpolate(
                        current,
                        movement.target,
                        movement.speed,
                        movement.factor,
                    );
                    match (step, interface.set_cursor_position(step.position())) {
                        (MoveStep::Arrived(_), Ok(())) => self.mouse.pop(),
                        (MoveStep::Advance(_), Ok(())) => {
                            if let Some(MouseAction::Move(front)) = self.mouse.actions.front_mut() {
                                front.last_distance = Some(distance);
                            }
                        }
                        (_, Err(e)) => self.record_error(&e),
                    }
                }
            }
            Err(e) => self.record_error(&e),
        }
        self.mouse.advance(movement.cooldown);
    }

    fn step_turn<S: SystemInterface + ?Sized>(&mut self, turn: TurnAction, interface: &S) {
        let steps = turn.next_steps();
        if steps == 0 {
            self.mouse.pop();
            return;
        }

        match interface.turn_mouse_wheel(steps) {
            Ok(()) => {
                let steps_left = turn.steps_left - steps;
                if steps_left == 0 {
                    self.mouse.pop();
                    self.mouse.advance(turn.cooldown + turn.push_cooldown);
                    return;
                }
                if let Some(MouseAction::Turn(front)) = self.mouse.actions.front_mut() {
                    front.steps_left = steps_left;
                }
            }
            Err(e) => self.record_error(&e),
        }
        self.mouse.advance(turn.cooldown);
    }

    fn execute_keyboard<S: SystemInterface + ?Sized>(&mut self, interface: &S) {
        let Some(&action) = self.keyboard.front() else {
            return;
        };
        trace!(?action, "Executing keyboard action");

        let cooldown = match action {
            // never due, released by release_sync
            KeyboardAction::Sync => return,
            KeyboardAction::Wait { cooldown } => cooldown,
            KeyboardAction::Down { key, cooldown } => {
                if let Err(e) = interface.key_down(key) {
                    self.record_error(&e);
                }
                cooldown
            }
            KeyboardAction::Up { key, cooldown } => {
                if let Err(e) = interface.key_up(key) {
                    self.record_error(&e);
                }
                cooldown
            }
        };
        self.keyboard.pop();
        self.keyboard.advance(cooldown);
    }
}

/// State shared between the emulator and its worker thread.
#[derive(Debug)]
pub(crate) struct Shared<S> {
    pub(crate) state: Mutex<SchedulerState>,
    wake: Condvar,
    pub(crate) interface: S,
}

impl<S: SystemInterface> Shared<S> {
    pub(crate) fn new(interface: S) -> Self {
        Self {
            state: Mutex::new(SchedulerState::new(Instant::now())),
            wake: Condvar::new(),
            interface,
        }
    }

    /// Wakes the worker so it re-evaluates the queues.
    pub(crate) fn notify(&self) {
        self.wake.notify_all();
    }

    /// Asks the worker to stop.
    pub(crate) fn shutdown(&self) {
        self.state.lock().shutdown = true;
        self.notify();
    }

    fn run(&self) {
        debug!("Input scheduler started");
        let mut state = self.state.lock();
        while !state.shutdown {
            match state.poll(Instant::now(), &self.interface) {
                Poll::Executed(_) | Poll::Aligned => {}
                Poll::SleepUntil(due) => {
                    self.wake.wait_until(&mut state, due);
                }
                Poll::Idle => {
                    self.wake.wait_for(&mut state, IDLE_INTERVAL);
                }
            }
        }
        debug!(errors = state.error_counter, "Input scheduler stopped");
    }
}

/// Starts the worker thread for `shared`.
pub(crate) fn spawn_worker<S: SystemInterface>(shared: Arc<Shared<S>>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("ki-input-scheduler".to_string())
        .spawn(move || shared.run())
}
