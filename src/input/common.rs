//! Identifiers shared by the emulator, its backends and the deviation strategy
//!
//! Mouse buttons, keyboard keys and keyboard locks carry the virtual key code
//! used by common desktop input APIs, so a backend can forward them without a
//! lookup table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two independently paced input devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Mouse queue (buttons, cursor movement, wheel)
    Mouse,
    /// Keyboard queue
    Keyboard,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Mouse => write!(f, "mouse"),
            Device::Keyboard => write!(f, "keyboard"),
        }
    }
}

/// Represents the different mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    /// Left mouse button (primary)
    Left,
    /// Right mouse button (secondary/context menu)
    Right,
    /// Middle mouse button (scroll wheel click)
    Middle,
    /// First extra button (usually "back")
    XButton1,
    /// Second extra button (usually "forward")
    XButton2,
}

impl MouseButton {
    /// Every mouse button, in code order
    pub const ALL: [MouseButton; 5] = [
        MouseButton::Left,
        MouseButton::Right,
        MouseButton::Middle,
        MouseButton::XButton1,
        MouseButton::XButton2,
    ];

    /// Returns the virtual key code of the button
    pub fn code(&self) -> u8 {
        match self {
            MouseButton::Left => 0x01,
            MouseButton::Right => 0x02,
            MouseButton::Middle => 0x04,
            MouseButton::XButton1 => 0x05,
            MouseButton::XButton2 => 0x06,
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MouseButton::Left => write!(f, "left"),
            MouseButton::Right => write!(f, "right"),
            MouseButton::Middle => write!(f, "middle"),
            MouseButton::XButton1 => write!(f, "x_button1"),
            MouseButton::XButton2 => write!(f, "x_button2"),
        }
    }
}

impl FromStr for MouseButton {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(MouseButton::Left),
            "right" => Ok(MouseButton::Right),
            "middle" => Ok(MouseButton::Middle),
            "x_button1" | "xbutton1" | "back" => Ok(MouseButton::XButton1),
            "x_button2" | "xbutton2" | "forward" => Ok(MouseButton::XButton2),
            other => Err(format!("Unknown mouse button: {}", other)),
        }
    }
}

/// Keyboard locks whose state can be queried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardLock {
    Scroll,
    Num,
    Caps,
}

impl KeyboardLock {
    /// Every lock, in the order `reset` releases them
    pub const ALL: [KeyboardLock; 3] = [KeyboardLock::Scroll, KeyboardLock::Num, KeyboardLock::Caps];

    /// The key toggling this lock
    pub fn key(&self) -> Key {
        match self {
            KeyboardLock::Scroll => Key::ScrollLock,
            KeyboardLock::Num => Key::NumLock,
            KeyboardLock::Caps => Key::CapsLock,
        }
    }
}

impl fmt::Display for KeyboardLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyboardLock::Scroll => write!(f, "scroll"),
            KeyboardLock::Num => write!(f, "num"),
            KeyboardLock::Caps => write!(f, "caps"),
        }
    }
}

macro_rules! keys {
    ($($(#[$meta:meta])* $name:ident = $code:expr),+ $(,)?) => {
        /// Keys on the keyboard, identified by their virtual key code
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum Key {
            $($(#[$meta])* $name,)+
        }

        impl Key {
            /// Every key, in code order
            pub const ALL: &'static [Key] = &[$(Key::$name,)+];

            /// Returns the virtual key code
            pub fn code(&self) -> u8 {
                match self {
                    $(Key::$name => $code,)+
                }
            }

            /// Returns the key name as used in scripts and configuration
            pub fn name(&self) -> &'static str {
                match self {
                    $(Key::$name => stringify!($name),)+
                }
            }
        }
    };
}

keys! {
    Backspace = 0x08,
    Tab = 0x09,
    Return = 0x0D,
    ShiftKey = 0x10,
    ControlKey = 0x11,
    AltKey = 0x12,
    Pause = 0x13,
    CapsLock = 0x14,
    Escape = 0x1B,
    Space = 0x20,
    PageUp = 0x21,
    PageDown = 0x22,
    End = 0x23,
    /// Home key
    Pos1 = 0x24,
    LeftArrow = 0x25,
    UpArrow = 0x26,
    RightArrow = 0x27,
    DownArrow = 0x28,
    Print = 0x2A,
    PrintScreen = 0x2C,
    Insert = 0x2D,
    Delete = 0x2E,
    Number0 = 0x30,
    Number1 = 0x31,
    Number2 = 0x32,
    Number3 = 0x33,
    Number4 = 0x34,
    Number5 = 0x35,
    Number6 = 0x36,
    Number7 = 0x37,
    Number8 = 0x38,
    Number9 = 0x39,
    A = 0x41,
    B = 0x42,
    C = 0x43,
    D = 0x44,
    E = 0x45,
    F = 0x46,
    G = 0x47,
    H = 0x48,
    I = 0x49,
    J = 0x4A,
    K = 0x4B,
    L = 0x4C,
    M = 0x4D,
    N = 0x4E,
    O = 0x4F,
    P = 0x50,
    Q = 0x51,
    R = 0x52,
    S = 0x53,
    T = 0x54,
    U = 0x55,
    V = 0x56,
    W = 0x57,
    X = 0x58,
    Y = 0x59,
    Z = 0x5A,
    LWin = 0x5B,
    RWin = 0x5C,
    NumPad0 = 0x60,
    NumPad1 = 0x61,
    NumPad2 = 0x62,
    NumPad3 = 0x63,
    NumPad4 = 0x64,
    NumPad5 = 0x65,
    NumPad6 = 0x66,
    NumPad7 = 0x67,
    NumPad8 = 0x68,
    NumPad9 = 0x69,
    Multiply = 0x6A,
    Add = 0x6B,
    NumPadSeparator = 0x6C,
    Subtract = 0x6D,
    Decimal = 0x6E,
    Divide = 0x6F,
    F1 = 0x70,
    F2 = 0x71,
    F3 = 0x72,
    F4 = 0x73,
    F5 = 0x74,
    F6 = 0x75,
    F7 = 0x76,
    F8 = 0x77,
    F9 = 0x78,
    F10 = 0x79,
    F11 = 0x7A,
    F12 = 0x7B,
    F13 = 0x7C,
    F14 = 0x7D,
    F15 = 0x7E,
    F16 = 0x7F,
    F17 = 0x80,
    F18 = 0x81,
    F19 = 0x82,
    F20 = 0x83,
    F21 = 0x84,
    F22 = 0x85,
    F23 = 0x86,
    F24 = 0x87,
    NumLock = 0x90,
    ScrollLock = 0x91,
    LShiftKey = 0xA0,
    RShiftKey = 0xA1,
    LControlKey = 0xA2,
    RControlKey = 0xA3,
    LAlt = 0xA4,
    RAlt = 0xA5,
}

impl Key {
    /// Returns the lock toggled by this key, if any
    pub fn toggles(&self) -> Option<KeyboardLock> {
        match self {
            Key::CapsLock => Some(KeyboardLock::Caps),
            Key::NumLock => Some(KeyboardLock::Num),
            Key::ScrollLock => Some(KeyboardLock::Scroll),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| *c != '_').collect::<String>().to_lowercase();
        Key::ALL
            .iter()
            .copied()
            .find(|key| key.name().to_lowercase() == wanted)
            .ok_or_else(|| format!("Unknown key: {}", s))
    }
}
