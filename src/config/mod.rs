//! Configuration module for the input emulator runner.
//!
//! This module provides configuration management, including:
//! - Loading settings from files (TOML/JSON)
//! - Environment variable overrides
//! - CLI argument merging
//! - Validation and defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use ki_input_emulator::config::EmulatorSettings;
//!
//! // Load from a specific file
//! let settings = EmulatorSettings::from_file("emulator.toml").unwrap();
//!
//! // Override with environment variables
//! let settings = settings.merge_with_env();
//! ```

mod settings;

pub use settings::{CliArgs, ConfigError, EmulatorSettings, Profile};
