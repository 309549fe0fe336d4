//! Human-like keyboard and mouse input emulation
//!
//! This module provides the [`Emulator`], which accepts high-level input
//! intents and executes them on a background worker with randomized,
//! human-plausible timing.
//!
//! # Submodules
//!
//! - [`emulator`] - The non-blocking facade
//! - [`scheduler`] - Dual-queue scheduler and its worker loop
//! - [`action`] - Pending mouse and keyboard actions
//! - [`motion`] - Cursor interpolation and wheel pacing
//! - [`strategy`] - Deviation strategies for timing and targets
//! - [`parameters`] - Parameters of the default strategy
//! - [`system`] - System interfaces performing the literal input
//! - [`timing`] - Normal distribution sampling
//!
//! # Example
//!
//! ```rust,no_run
//! use ki_input_emulator::input::{Emulator, Key, MouseButton, Parameters, Rectangle, VirtualInterface};
//!
//! let emulator = Emulator::new(Parameters::human(), VirtualInterface::default())?;
//!
//! // Move into the button area and click it, then type
//! emulator.click_at(MouseButton::Left, &Rectangle::new(100, 200, 80, 24));
//! emulator.sync();
//! emulator.press(Key::H);
//! emulator.press(Key::I);
//! # Ok::<(), ki_input_emulator::input::EmulatorError>(())
//! ```

pub mod action;
pub mod common;
pub mod emulator;
pub mod geometry;
pub mod motion;
pub mod parameters;
pub mod scheduler;
pub mod strategy;
pub mod system;
pub mod timing;

use thiserror::Error;

// Re-export commonly used types for convenience
pub use common::{Device, Key, KeyboardLock, MouseButton};
pub use emulator::Emulator;
pub use geometry::{Point, Rectangle};
pub use motion::{MoveStep, WheelPace};
pub use parameters::{Deviation, ParameterError, Parameters};
pub use strategy::{DeviationStrategy, NormalDeviationStrategy};
pub use system::{InputEvent, Operation, RecordedEvent, SystemInterface, VirtualInterface};

/// Result type for system interface calls
pub type InputResult<T> = Result<T, InputError>;

/// Errors reported by a system interface
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// The platform refused to perform the operation
    #[error("Input operation '{operation}' was rejected")]
    Rejected { operation: &'static str },

    /// The cursor position could not be read
    #[error("Cursor position is unavailable")]
    CursorUnavailable,

    /// The cursor stopped approaching a move target, e.g. at the screen edge
    #[error("Cursor cannot reach {target}")]
    TargetUnreachable { target: Point },

    /// A platform-specific error occurred
    #[error("Platform error: {message}")]
    Platform { message: String },
}

/// Errors that prevent an emulator from being created
#[derive(Debug, Error)]
pub enum EmulatorError {
    /// The deviation strategy rejected its parameters
    #[error("Invalid emulator parameters: {0}")]
    Parameters(#[from] ParameterError),

    /// The scheduler thread could not be started
    #[error("Failed to start the input scheduler: {0}")]
    Spawn(#[from] std::io::Error),
}
