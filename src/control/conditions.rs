//! Conditions checked by [`LoopControl`](super::LoopControl) before each iteration

use crate::input::{Emulator, KeyboardLock, SystemInterface};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A condition that may become true while a loop runs.
pub trait Condition: Send {
    /// Checks whether the condition is met.
    fn check(&mut self) -> bool;

    /// Short description used in logs.
    fn name(&self) -> &'static str;
}

/// Met while Caps-Lock is active.
#[derive(Debug)]
pub struct CapsLockActive<S: SystemInterface> {
    emulator: Arc<Emulator<S>>,
}

impl<S: SystemInterface> CapsLockActive<S> {
    pub fn new(emulator: Arc<Emulator<S>>) -> Self {
        Self { emulator }
    }
}

impl<S: SystemInterface> Condition for CapsLockActive<S> {
    fn check(&mut self) -> bool {
        self.emulator.is_lock_active(KeyboardLock::Caps)
    }

    fn name(&self) -> &'static str {
        "caps lock active"
    }
}

/// Met while Num-Lock is active.
#[derive(Debug)]
pub struct NumLockActive<S: SystemInterface> {
    emulator: Arc<Emulator<S>>,
}

impl<S: SystemInterface> NumLockActive<S> {
    pub fn new(emulator: Arc<Emulator<S>>) -> Self {
        Self { emulator }
    }
}

impl<S: SystemInterface> Condition for NumLockActive<S> {
    fn check(&mut self) -> bool {
        self.emulator.is_lock_active(KeyboardLock::Num)
    }

    fn name(&self) -> &'static str {
        "num lock active"
    }
}

/// Met once the emulator has no pending actions.
#[derive(Debug)]
pub struct QueuesDrained<S: SystemInterface> {
    emulator: Arc<Emulator<S>>,
}

impl<S: SystemInterface> QueuesDrained<S> {
    pub fn new(emulator: Arc<Emulator<S>>) -> Self {
        Self { emulator }
    }
}

impl<S: SystemInterface> Condition for QueuesDrained<S> {
    fn check(&mut self) -> bool {
        self.emulator.is_idle()
    }

    fn name(&self) -> &'static str {
        "queues drained"
    }
}

/// Met once a point in time has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn new(at: Instant) -> Self {
        Self { at }
    }

    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self::new(Instant::now() + timeout)
    }

    pub fn at(&self) -> Instant {
        self.at
    }
}

impl Condition for Deadline {
    fn check(&mut self) -> bool {
        Instant::now() >= self.at
    }

    fn name(&self) -> &'static str {
        "deadline passed"
    }
}
