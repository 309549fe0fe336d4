//! Emulator settings and configuration management.
//!
//! This module provides the configuration options of the `ki-input` runner,
//! supporting multiple configuration sources with proper precedence.

use crate::input::{NormalDeviationStrategy, ParameterError, Parameters};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// Failed to serialize TOML configuration.
    #[error("Failed to serialize TOML configuration: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// Failed to parse JSON configuration.
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Strategy parameters out of range.
    #[error("Invalid strategy parameters: {0}")]
    ParameterError(#[from] ParameterError),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Unsupported file format.
    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

/// Selects the parameters of the deviation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Timing recorded from a human user.
    Human,
    /// Quick input without any deviation.
    Fast,
    /// The `parameters` section of the configuration.
    Custom,
}

impl Default for Profile {
    fn default() -> Self {
        Self::Human
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profile::Human => write!(f, "human"),
            Profile::Fast => write!(f, "fast"),
            Profile::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Profile::Human),
            "fast" => Ok(Profile::Fast),
            "custom" => Ok(Profile::Custom),
            _ => Err(ConfigError::ValidationError(format!(
                "Unknown profile: {}. Valid profiles are: human, fast, custom",
                s
            ))),
        }
    }
}

/// Main emulator settings.
///
/// # Configuration Precedence
///
/// Settings are applied in the following order (later sources override earlier):
/// 1. Default values
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
/// 4. CLI arguments
///
/// # Example
///
/// ```rust
/// use ki_input_emulator::config::{EmulatorSettings, Profile};
///
/// let settings = EmulatorSettings::default()
///     .with_profile(Profile::Fast)
///     .with_screen_size(2560, 1440)
///     .with_seed(7);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmulatorSettings {
    /// Parameter preset of the deviation strategy.
    #[serde(default)]
    pub profile: Profile,

    /// Seed for reproducible runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Width of the virtual screen in pixels.
    #[serde(default = "default_screen_width")]
    pub screen_width: u32,

    /// Height of the virtual screen in pixels.
    #[serde(default = "default_screen_height")]
    pub screen_height: u32,

    /// Maximum time to wait for the queues to drain in milliseconds.
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,

    /// Interval of the drain check loop in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Stop once Caps-Lock becomes active.
    #[serde(default)]
    pub abort_on_caps_lock: bool,

    /// Strategy parameters, required by the custom profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
}

// Default value functions for serde
fn default_screen_width() -> u32 {
    1920
}

fn default_screen_height() -> u32 {
    1080
}

fn default_drain_timeout_ms() -> u64 {
    60000
}

fn default_poll_interval_ms() -> u64 {
    10
}

impl Default for EmulatorSettings {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            parameters: None,
            seed: None,
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            drain_timeout_ms: default_drain_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            abort_on_caps_lock: false,
        }
    }
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn parse_flag(value: &str) -> bool {
    value.to_lowercase() == "true" || value == "1"
}

impl EmulatorSettings {
    /// Creates new settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a configuration file.
    ///
    /// Supports both TOML and JSON formats, detected by file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match file_extension(path).as_str() {
            "toml" => Ok(toml::from_str(&content)?),
            "json" => Ok(serde_json::from_str(&content)?),
            ext => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Saves settings to a configuration file.
    ///
    /// The format is determined by the file extension.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = match file_extension(path).as_str() {
            "toml" => toml::to_string_pretty(self)?,
            "json" => serde_json::to_string_pretty(self)?,
            ext => return Err(ConfigError::UnsupportedFormat(ext.to_string())),
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Loads settings from environment variables.
    ///
    /// Environment variables are prefixed with `KI_INPUT_`, for example:
    /// - `KI_INPUT_PROFILE`
    /// - `KI_INPUT_SEED`
    /// - `KI_INPUT_SCREEN_WIDTH`
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env_overrides();
        settings
    }

    /// Applies environment variable overrides to current settings.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("KI_INPUT_PROFILE") {
            if let Ok(profile) = val.parse() {
                self.profile = profile;
            }
        }

        if let Ok(val) = env::var("KI_INPUT_SEED") {
            if let Ok(seed) = val.parse() {
                self.seed = Some(seed);
            }
        }

        if let Ok(val) = env::var("KI_INPUT_SCREEN_WIDTH") {
            if let Ok(width) = val.parse() {
                self.screen_width = width;
            }
        }

        if let Ok(val) = env::var("KI_INPUT_SCREEN_HEIGHT") {
            if let Ok(height) = val.parse() {
                self.screen_height = height;
            }
        }

        if let Ok(val) = env::var("KI_INPUT_DRAIN_TIMEOUT_MS") {
            if let Ok(timeout) = val.parse() {
                self.drain_timeout_ms = timeout;
            }
        }

        if let Ok(val) = env::var("KI_INPUT_POLL_INTERVAL_MS") {
            if let Ok(interval) = val.parse() {
                self.poll_interval_ms = interval;
            }
        }

        if let Ok(val) = env::var("KI_INPUT_ABORT_ON_CAPS_LOCK") {
            self.abort_on_caps_lock = parse_flag(&val);
        }
    }

    /// Merges current settings with environment variable overrides.
    pub fn merge_with_env(mut self) -> Self {
        self.apply_env_overrides();
        self
    }

    /// Merges settings with CLI arguments.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ki_input_emulator::config::{CliArgs, EmulatorSettings};
    ///
    /// let args = CliArgs {
    ///     width: Some(1280),
    ///     seed: Some(3),
    ///     ..Default::default()
    /// };
    ///
    /// let settings = EmulatorSettings::default().merge_with_args(&args);
    /// assert_eq!(settings.screen_width, 1280);
    /// assert_eq!(settings.seed, Some(3));
    /// ```
    pub fn merge_with_args(mut self, args: &CliArgs) -> Self {
        if let Some(profile) = args.profile {
            self.profile = profile;
        }
        if let Some(seed) = args.seed {
            self.seed = Some(seed);
        }
        if let Some(width) = args.width {
            self.screen_width = width;
        }
        if let Some(height) = args.height {
            self.screen_height = height;
        }
        if let Some(timeout) = args.timeout_ms {
            self.drain_timeout_ms = timeout;
        }
        if let Some(abort) = args.abort_on_caps_lock {
            self.abort_on_caps_lock = abort;
        }
        self
    }

    /// Validates all settings.
    ///
    /// # Errors
    ///
    /// Returns an error if any setting is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate screen dimensions
        if self.screen_width < 100 || self.screen_width > 7680 {
            return Err(ConfigError::ValidationError(
                "Screen width must be between 100 and 7680 pixels".to_string(),
            ));
        }
        if self.screen_height < 100 || self.screen_height > 4320 {
            return Err(ConfigError::ValidationError(
                "Screen height must be between 100 and 4320 pixels".to_string(),
            ));
        }

        // Validate timing
        if self.drain_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "Drain timeout must be at least 1ms".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms > 1000 {
            return Err(ConfigError::ValidationError(
                "Poll interval must be between 1 and 1000ms".to_string(),
            ));
        }

        // Validate strategy parameters
        self.parameters()?;

        Ok(())
    }

    /// Resolves the profile into validated strategy parameters.
    pub fn parameters(&self) -> Result<Parameters, ConfigError> {
        let parameters = match self.profile {
            Profile::Human => Parameters::human(),
            Profile::Fast => Parameters::fast(),
            Profile::Custom => self.parameters.clone().ok_or_else(|| {
                ConfigError::ValidationError(
                    "The custom profile requires a [parameters] section".to_string(),
                )
            })?,
        };
        Ok(parameters.validated()?)
    }

    /// Builds the deviation strategy, seeded if a seed is configured.
    pub fn strategy(&self) -> Result<NormalDeviationStrategy, ConfigError> {
        let parameters = self.parameters()?;
        let strategy = match self.seed {
            Some(seed) => NormalDeviationStrategy::with_seed(parameters, seed)?,
            None => NormalDeviationStrategy::new(parameters)?,
        };
        Ok(strategy)
    }

    // Builder-style methods for convenient configuration

    /// Sets the profile.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Selects the custom profile with the given parameters.
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.profile = Profile::Custom;
        self.parameters = Some(parameters);
        self
    }

    /// Sets the seed of the strategy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the virtual screen size.
    pub fn with_screen_size(mut self, width: u32, height: u32) -> Self {
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    /// Sets the drain timeout in milliseconds.
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.drain_timeout_ms = timeout_ms;
        self
    }
}

/// CLI argument structure for parsing command line options.
///
/// All fields are optional to allow partial overrides.
#[derive(Debug, Default, Clone)]
pub struct CliArgs {
    /// Parameter profile.
    pub profile: Option<Profile>,
    /// Strategy seed.
    pub seed: Option<u64>,
    /// Virtual screen width.
    pub width: Option<u32>,
    /// Virtual screen height.
    pub height: Option<u32>,
    /// Drain timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Stop once Caps-Lock becomes active.
    pub abort_on_caps_lock: Option<bool>,
    /// Configuration file path.
    pub config_file: Option<PathBuf>,
}

impl CliArgs {
    /// Creates an empty CliArgs instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the final settings by applying the full configuration chain.
    ///
    /// 1. Default values
    /// 2. Configuration file (if specified)
    /// 3. Environment variables
    /// 4. CLI arguments (self)
    pub fn load_settings(&self) -> Result<EmulatorSettings, ConfigError> {
        // Start with defaults or file
        let mut settings = if let Some(ref config_file) = self.config_file {
            EmulatorSettings::from_file(config_file)?
        } else {
            EmulatorSettings::default()
        };

        // Apply environment overrides
        settings = settings.merge_with_env();

        // Apply CLI overrides
        settings = settings.merge_with_args(self);

        // Validate final settings
        settings.validate()?;

        Ok(settings)
    }
}
