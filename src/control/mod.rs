//! Loop pacing and shutdown conditions for programs driving an emulator
//!
//! A typical bot runs a main loop at a fixed interval and stops once some
//! external condition holds, such as the user toggling Caps-Lock.
//!
//! ```rust,no_run
//! use ki_input_emulator::control::{CapsLockActive, LoopControl};
//! use ki_input_emulator::input::{Emulator, Parameters, VirtualInterface};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # fn main() -> anyhow::Result<()> {
//! let emulator = Arc::new(Emulator::new(Parameters::human(), VirtualInterface::default())?);
//! let mut control = LoopControl::new(Duration::from_millis(250))?;
//! control.add_shutdown_condition(CapsLockActive::new(Arc::clone(&emulator)));
//!
//! while control.wait() {
//!     // inspect the screen and enqueue input
//! }
//! # Ok(())
//! # }
//! ```

pub mod conditions;
pub mod loop_control;

pub use conditions::{CapsLockActive, Condition, Deadline, NumLockActive, QueuesDrained};
pub use loop_control::LoopControl;

use thiserror::Error;

/// Errors of the loop control
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    /// A loop interval must be at least one millisecond
    #[error("Loop interval must not be zero")]
    ZeroInterval,
}
