//! # KI-Input Emulator
//!
//! Human-like keyboard and mouse input emulation written in Rust.
//!
//! Callers enqueue high-level intents (move, click, press, scroll) and a
//! background scheduler executes them with randomized, human-plausible timing
//! without ever blocking the caller.
//!
//! ## Features
//!
//! - **Non-blocking facade**: every operation only enqueues actions
//! - **Dual-queue scheduling**: mouse and keyboard are paced independently and
//!   can be aligned with sync points
//! - **Human-like motion**: straight-line cursor movement with direction
//!   dependent speed, wheel turns split into finger pushes
//! - **Pluggable backends**: deviation strategies and system interfaces are traits
//! - **Flexible Configuration**: TOML/JSON files, environment variables, CLI arguments
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ki_input_emulator::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let emulator = Emulator::new(Parameters::human(), VirtualInterface::default())?;
//!
//!     emulator.click_at(MouseButton::Left, &Rectangle::new(400, 300, 120, 30));
//!     emulator.sync();
//!     emulator.press(Key::Return);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`input`]: Emulator, scheduler, strategies and system interfaces
//! - [`control`]: Loop pacing and shutdown conditions
//! - [`script`]: Declarative input scripts
//! - [`config`]: Configuration loading and management
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  enqueue   ┌──────────────────────────┐
//! │   Emulator   │ ─────────▶ │ mouse queue │ kbd queue  │
//! │   (facade)   │            └────────────┬─────────────┘
//! └──────┬───────┘                         │ earliest due
//!        │ timing, targets                 ▼
//! ┌──────┴───────┐            ┌──────────────────────────┐
//! │  Deviation   │            │    Scheduler thread      │
//! │  Strategy    │            └────────────┬─────────────┘
//! └──────────────┘                         ▼
//!                             ┌──────────────────────────┐
//!                             │    System Interface      │
//!                             └──────────────────────────┘
//! ```
//!
//! ## Configuration
//!
//! Configuration follows a precedence chain:
//! 1. Default values
//! 2. Configuration file (TOML/JSON)
//! 3. Environment variables (`KI_INPUT_*`)
//! 4. CLI arguments
//!
//! See [`config::EmulatorSettings`] for all available options.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Full version string with name
pub const FULL_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Module Exports
// ============================================================================

/// Human-like input emulation: emulator, scheduler, strategies and backends.
pub mod input;

/// Loop pacing and shutdown conditions.
pub mod control;

/// Input scripts applied to an emulator.
pub mod script;

/// Configuration management for loading settings from files, env, and CLI.
pub mod config;

// ============================================================================
// Re-exports for Convenience
// ============================================================================

// Input types
pub use input::{
    Device, DeviationStrategy, Emulator, EmulatorError, InputError, InputResult, Key,
    KeyboardLock, MouseButton, NormalDeviationStrategy, ParameterError, Parameters, Point,
    Rectangle, SystemInterface, VirtualInterface,
};

// Control types
pub use control::{Condition, ControlError, LoopControl};

// Script types
pub use script::{Script, Step};

// Config types
pub use config::{CliArgs, ConfigError, EmulatorSettings, Profile};

// ============================================================================
// Prelude Module
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust
/// use ki_input_emulator::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::EmulatorSettings;
    pub use crate::control::{Condition, LoopControl};
    pub use crate::input::{
        Device, Emulator, Key, KeyboardLock, MouseButton, Parameters, Rectangle,
        SystemInterface, VirtualInterface,
    };
    pub use crate::{FULL_VERSION, NAME, VERSION};
}
