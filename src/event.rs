//! Input event model delivered to a surface.
//!
//! The C ABI hands us primitive descriptors (button ids, kind strings, raw
//! key codes); this module translates them into the typed events the engine
//! side consumes.

use std::collections::HashMap;

use crate::errors::{Result, SurfaceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    None,
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// Button id as it arrives over the C ABI: 0=none, 1=left, 2=middle,
    /// 3=right. Anything out of range maps to `None`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => MouseButton::Left,
            2 => MouseButton::Middle,
            3 => MouseButton::Right,
            _ => MouseButton::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Down,
    Up,
    Move,
}

impl MouseEventKind {
    /// Unrecognized kinds fall back to `Up`. Quirk kept for compatibility
    /// with existing hosts that rely on it to release stuck buttons.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "down" => MouseEventKind::Down,
            "up" => MouseEventKind::Up,
            "move" => MouseEventKind::Move,
            other => {
                log::debug!("unknown mouse event kind {other:?}, treating as up");
                MouseEventKind::Up
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
}

impl KeyEventKind {
    pub fn parse(kind: &str) -> Result<Self> {
        match kind {
            "down" => Ok(KeyEventKind::Down),
            "up" => Ok(KeyEventKind::Up),
            other => Err(SurfaceError::InvalidArgument(format!(
                "unknown key event kind {other:?}"
            ))),
        }
    }
}

bitflags::bitflags! {
    /// Keyboard modifier bitmask, layout shared with the C ABI.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u32 {
        const ALT   = 1 << 0;
        const CTRL  = 1 << 1;
        const META  = 1 << 2;
        const SHIFT = 1 << 3;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseDown { button: MouseButton, x: i32, y: i32 },
    MouseUp { button: MouseButton, x: i32, y: i32 },
    MouseMove { button: MouseButton, x: i32, y: i32 },
    Scroll { dx: i32, dy: i32 },
    KeyDown { key_code: i32, modifiers: Modifiers, key_identifier: String },
    KeyUp { key_code: i32, modifiers: Modifiers, key_identifier: String },
    Char { text: String },
}

lazy_static::lazy_static! {
    /// Virtual-key-code to key-identifier table for the editing keys hosts
    /// actually send. Everything else gets the generic `U+XXXX` form.
    static ref KEY_IDENTIFIERS: HashMap<i32, &'static str> = {
        let mut m = HashMap::new();
        m.insert(0x08, "Backspace");
        m.insert(0x09, "Tab");
        m.insert(0x0D, "Enter");
        m.insert(0x10, "Shift");
        m.insert(0x11, "Control");
        m.insert(0x12, "Alt");
        m.insert(0x1B, "Escape");
        m.insert(0x20, "Spacebar");
        m.insert(0x21, "PageUp");
        m.insert(0x22, "PageDown");
        m.insert(0x23, "End");
        m.insert(0x24, "Home");
        m.insert(0x25, "Left");
        m.insert(0x26, "Up");
        m.insert(0x27, "Right");
        m.insert(0x28, "Down");
        m.insert(0x2E, "Delete");
        m
    };
}

/// Map a virtual key code to its key identifier.
pub fn key_identifier(key_code: i32) -> String {
    match KEY_IDENTIFIERS.get(&key_code) {
        Some(name) => (*name).to_string(),
        None => format!("U+{:04X}", key_code.max(0)),
    }
}
