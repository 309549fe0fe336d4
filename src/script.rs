//! Input scripts
//!
//! A script is a list of steps, each mapping to one emulator operation. Scripts
//! are written in TOML or JSON:
//!
//! ```toml
//! [[steps]]
//! action = "click"
//! button = "left"
//! area = { x = 100, y = 200, width = 80, height = 24 }
//!
//! [[steps]]
//! action = "sync"
//!
//! [[steps]]
//! action = "press"
//! key = "return"
//! ```

use crate::config::ConfigError;
use crate::input::{Device, Emulator, Key, MouseButton, Rectangle, SystemInterface};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

fn default_button() -> MouseButton {
    MouseButton::Left
}

/// One emulator operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    MoveTo {
        area: Rectangle,
    },
    Click {
        #[serde(default = "default_button")]
        button: MouseButton,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        area: Option<Rectangle>,
    },
    DragAndDrop {
        #[serde(default = "default_button")]
        button: MouseButton,
        from: Rectangle,
        to: Rectangle,
    },
    ButtonDown {
        #[serde(default = "default_button")]
        button: MouseButton,
    },
    ButtonUp {
        #[serde(default = "default_button")]
        button: MouseButton,
    },
    KeyDown {
        key: Key,
    },
    KeyUp {
        key: Key,
    },
    Press {
        key: Key,
    },
    TurnWheel {
        steps: i16,
    },
    Wait {
        device: Device,
        ms: u64,
    },
    Sync,
    Reset,
    Clear,
}

impl Step {
    /// Enqueues the step on `emulator`.
    pub fn apply<S: SystemInterface>(&self, emulator: &Emulator<S>) {
        match self {
            Step::MoveTo { area } => emulator.move_to(area),
            Step::Click { button, area: None } => emulator.click(*button),
            Step::Click {
                button,
                area: Some(area),
            } => emulator.click_at(*button, area),
            Step::DragAndDrop { button, from, to } => emulator.drag_and_drop(*button, from, to),
            Step::ButtonDown { button } => emulator.button_down(*button),
            Step::ButtonUp { button } => emulator.button_up(*button),
            Step::KeyDown { key } => emulator.key_down(*key),
            Step::KeyUp { key } => emulator.key_up(*key),
            Step::Press { key } => emulator.press(*key),
            Step::TurnWheel { steps } => emulator.turn_mouse_wheel(*steps),
            Step::Wait { device, ms } => emulator.wait(*device, Duration::from_millis(*ms)),
            Step::Sync => emulator.sync(),
            Step::Reset => emulator.reset(),
            Step::Clear => emulator.clear(),
        }
    }
}

/// An ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Loads a script, the format is detected by file extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "toml" => Ok(toml::from_str(&content)?),
            "json" => Ok(serde_json::from_str(&content)?),
            ext => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Enqueues every step on `emulator`, in order.
    pub fn apply<S: SystemInterface>(&self, emulator: &Emulator<S>) {
        for step in &self.steps {
            debug!(?step, "Applying script step");
            step.apply(emulator);
        }
    }
}
