//! Polling capability consumed by bindings.
//!
//! Bindings never read hardware themselves. Every query is answered by an
//! [`InputPoller`] supplied by the host, which owns per-frame edge detection
//! for digital controls and sampling for named analog axes.

pub mod frame;

use crate::error::{BindError, Result};
use ratatui::crossterm::event::{KeyCode, MouseButton};
use std::str::FromStr;

pub use frame::FrameInput;

/// A physical digital control a binding can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalControl {
    /// Keyboard key
    Key(KeyCode),
    /// Mouse button
    Mouse(MouseButton),
    /// Host-defined button (gamepad, pedal, MIDI pad...)
    Button(u16),
}

impl From<KeyCode> for PhysicalControl {
    fn from(code: KeyCode) -> Self {
        PhysicalControl::Key(code)
    }
}

impl From<MouseButton> for PhysicalControl {
    fn from(button: MouseButton) -> Self {
        PhysicalControl::Mouse(button)
    }
}

impl std::fmt::Display for PhysicalControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhysicalControl::Key(KeyCode::Char(' ')) => write!(f, "Space"),
            PhysicalControl::Key(KeyCode::Char(ch)) => write!(f, "{ch}"),
            PhysicalControl::Key(KeyCode::F(n)) => write!(f, "F{n}"),
            PhysicalControl::Key(code) => write!(f, "{code:?}"),
            PhysicalControl::Mouse(button) => write!(f, "Mouse{button:?}"),
            PhysicalControl::Button(id) => write!(f, "Button{id}"),
        }
    }
}

/// Parses the names produced by `Display`: `Space`, `Left`, `F5`, `j`,
/// `MouseLeft`, `Button3`. Named keys are matched case-insensitively.
impl FromStr for PhysicalControl {
    type Err = BindError;

    fn from_str(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        let mut chars = trimmed.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Ok(PhysicalControl::Key(KeyCode::Char(ch)));
        }

        let lower = trimmed.to_ascii_lowercase();
        let code = match lower.as_str() {
            "space" => KeyCode::Char(' '),
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "backspace" => KeyCode::Backspace,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            "insert" => KeyCode::Insert,
            "delete" => KeyCode::Delete,
            "mouseleft" => return Ok(PhysicalControl::Mouse(MouseButton::Left)),
            "mouseright" => return Ok(PhysicalControl::Mouse(MouseButton::Right)),
            "mousemiddle" => return Ok(PhysicalControl::Mouse(MouseButton::Middle)),
            other => {
                if let Some(n) = other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                    KeyCode::F(n)
                } else if let Some(id) = other
                    .strip_prefix("button")
                    .and_then(|id| id.parse::<u16>().ok())
                {
                    return Ok(PhysicalControl::Button(id));
                } else {
                    return Err(BindError::unknown_key(trimmed));
                }
            }
        };
        Ok(PhysicalControl::Key(code))
    }
}

/// Frame-accurate state of one digital control.
///
/// `just_pressed` and `just_released` are edges relative to the previous
/// frame; `pressed` is the level at the end of this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DigitalState {
    pub pressed: bool,
    pub just_pressed: bool,
    pub just_released: bool,
}

impl DigitalState {
    pub const IDLE: Self = Self {
        pressed: false,
        just_pressed: false,
        just_released: false,
    };
    pub const HELD: Self = Self {
        pressed: true,
        just_pressed: false,
        just_released: false,
    };
    pub const JUST_PRESSED: Self = Self {
        pressed: true,
        just_pressed: true,
        just_released: false,
    };
    pub const JUST_RELEASED: Self = Self {
        pressed: false,
        just_pressed: false,
        just_released: true,
    };

    /// Held at any point this frame, including a press that began this frame.
    pub fn is_held(&self) -> bool {
        self.pressed || self.just_pressed
    }
}

/// Whether an analog read should be smoothed or raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisSampling {
    Smoothed,
    Raw,
}

/// Capability interface implemented by the host environment.
pub trait InputPoller {
    /// Current edge/level state of a digital control.
    fn poll_digital(&self, control: PhysicalControl) -> DigitalState;

    /// Current value of a named analog axis.
    ///
    /// Fails with [`BindError::AxisNotRegistered`](crate::BindError::AxisNotRegistered)
    /// when the host has no axis under that name.
    fn poll_analog(&self, axis: &str, sampling: AxisSampling) -> Result<f32>;
}
