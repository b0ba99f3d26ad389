// SPDX-License-Identifier: GPL-3.0-only

use smithay::backend::input::KeyState;

use crate::utils::coordinates::GlobalPointF64;

/// A complete key event as delivered by the host platform
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub state: KeyState,
    /// Platform-native scan code, forwarded as-is on the baseline keyboard path
    pub native_scan_code: u32,
    /// Keysym resolved by the host, only meaningful to extensions
    pub keysym: u32,
    /// Text produced by the key, if any
    pub text: String,
}

impl KeyEvent {
    pub fn new(state: KeyState, native_scan_code: u32) -> Self {
        Self {
            state,
            native_scan_code,
            keysym: 0,
            text: String::new(),
        }
    }

    /// Attach the host's keysym and text translation
    pub fn with_keysym(mut self, keysym: u32, text: impl Into<String>) -> Self {
        self.keysym = keysym;
        self.text = text.into();
        self
    }
}

/// Lifecycle state of a single touch point within one input sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPointState {
    Pressed,
    Moved,
    Released,
    /// Unchanged since the previous sample
    Stationary,
}

/// One contact of a multi-point touch event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: i32,
    pub state: TouchPointState,
    /// Position in global compositor coordinates
    pub position: GlobalPointF64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEventKind {
    Begin,
    Update,
    End,
    Cancel,
}

/// A full multi-point touch sample from the host's gesture abstraction
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub kind: TouchEventKind,
    pub points: Vec<TouchPoint>,
}

impl TouchEvent {
    pub fn new(kind: TouchEventKind, points: Vec<TouchPoint>) -> Self {
        Self { kind, points }
    }

    pub fn cancel() -> Self {
        Self::new(TouchEventKind::Cancel, Vec::new())
    }
}
