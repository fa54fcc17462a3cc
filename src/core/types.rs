// Copyright 2025 bakri (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/types.rs
//!
//! Core type definitions for keyboard event dispatch
//!
//! This module defines the fundamental types used throughout the crate:
//! - `KeyCode`: A physical/logical key, including modifier pseudo-keys
//! - `KeyEvent`: A raw key event as delivered by the event source
//! - `Platform` / `PlatformInfo`: The "current OS" fact used to normalise
//!   the platform-specific meta modifier
//! - `Trigger` / `Binding`: A named action bound to a stroke or combination
//! - `ScriptStep`: One entry of a recorded event script
//!
//! The event source itself (windowing toolkit, terminal, etc.) lives outside
//! this crate; it only has to produce `KeyEvent` values.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::combination::KeyCombination;
use crate::core::keystroke::KeyStroke;

/// Key identifier
///
/// Modifier pseudo-keys are declared first so that ordered collections of
/// key codes (and therefore `KeyStroke` display) list modifiers before the
/// base key, e.g. `CONTROL+SHIFT+K`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum KeyCode {
    /// Alt / Option key
    Alt,
    /// Control key
    Control,
    /// Shift key
    Shift,
    /// macOS Command key (tracked meta state on macOS)
    Command,
    /// Windows key (tracked meta state on Windows)
    Windows,
    /// Platform-canonical primary modifier (Command on macOS, Control elsewhere)
    Shortcut,
    /// Printable key, always stored upper case (`a` and `A` are the same key)
    Char(char),
    /// Function key F1..F24
    F(u8),
    Enter,
    Escape,
    Tab,
    Space,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
}

impl KeyCode {
    /// Printable key with case normalisation.
    pub fn char(c: char) -> Self {
        match c {
            ' ' => KeyCode::Space,
            c => KeyCode::Char(c.to_ascii_uppercase()),
        }
    }

    /// Returns true for the modifier pseudo-keys.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            KeyCode::Alt
                | KeyCode::Control
                | KeyCode::Shift
                | KeyCode::Command
                | KeyCode::Windows
                | KeyCode::Shortcut
        )
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Alt => write!(f, "ALT"),
            KeyCode::Control => write!(f, "CONTROL"),
            KeyCode::Shift => write!(f, "SHIFT"),
            KeyCode::Command => write!(f, "COMMAND"),
            KeyCode::Windows => write!(f, "WINDOWS"),
            KeyCode::Shortcut => write!(f, "SHORTCUT"),
            KeyCode::Char('+') => write!(f, "PLUS"),
            KeyCode::Char(',') => write!(f, "COMMA"),
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::F(n) => write!(f, "F{}", n),
            KeyCode::Enter => write!(f, "ENTER"),
            KeyCode::Escape => write!(f, "ESCAPE"),
            KeyCode::Tab => write!(f, "TAB"),
            KeyCode::Space => write!(f, "SPACE"),
            KeyCode::Backspace => write!(f, "BACKSPACE"),
            KeyCode::Delete => write!(f, "DELETE"),
            KeyCode::Insert => write!(f, "INSERT"),
            KeyCode::Home => write!(f, "HOME"),
            KeyCode::End => write!(f, "END"),
            KeyCode::PageUp => write!(f, "PAGEUP"),
            KeyCode::PageDown => write!(f, "PAGEDOWN"),
            KeyCode::Up => write!(f, "UP"),
            KeyCode::Down => write!(f, "DOWN"),
            KeyCode::Left => write!(f, "LEFT"),
            KeyCode::Right => write!(f, "RIGHT"),
        }
    }
}

/// A raw key event
///
/// Carries the primary key code plus the modifier flags the event source
/// reported at the time of the event. `shortcut` is the toolkit's
/// platform-canonical "primary modifier" flag, reported separately from
/// `control`/`meta`.
///
/// # Example
/// ```
/// use keystroke_dispatch::core::{KeyCode, KeyEvent};
///
/// let event = KeyEvent::new(KeyCode::char('s')).with_control();
/// assert!(event.control);
/// assert_eq!(event.code, KeyCode::Char('S'));
/// ```
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct KeyEvent {
    /// The key that went down or up
    pub code: KeyCode,
    pub alt: bool,
    pub control: bool,
    pub shift: bool,
    /// Command on macOS, Windows key on Windows
    pub meta: bool,
    pub shortcut: bool,
}

impl KeyEvent {
    /// Event for `code` with no modifiers held.
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            alt: false,
            control: false,
            shift: false,
            meta: false,
            shortcut: false,
        }
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_control(mut self) -> Self {
        self.control = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_shortcut(mut self) -> Self {
        self.shortcut = true;
        self
    }

    /// Raises the shortcut flag when the platform's shortcut key is held, the
    /// way GUI toolkits report it: meta on macOS, control everywhere else.
    pub fn resolve_shortcut(mut self, platform: &dyn PlatformInfo) -> Self {
        self.shortcut |= if platform.is_macos() {
            self.meta
        } else {
            self.control
        };
        self
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (self.control, "Ctrl"),
            (self.alt, "Alt"),
            (self.shift, "Shift"),
            (self.meta, "Meta"),
            (self.shortcut, "Shortcut"),
        ];
        for (_, name) in flags.iter().filter(|(held, _)| *held) {
            write!(f, "{}+", name)?;
        }
        write!(f, "{}", self.code)
    }
}

/// Platform fact provider
///
/// Queried on every key-down to decide which key the meta modifier maps to.
/// Implementations must be cheap and side-effect free; `is_macos` and
/// `is_windows` are mutually exclusive.
pub trait PlatformInfo: Send + Sync {
    fn is_macos(&self) -> bool;
    fn is_windows(&self) -> bool;
}

/// Stock platform provider
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Platform {
    MacOS,
    Windows,
    Other,
}

impl Platform {
    /// Platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Other
        }
    }
}

impl PlatformInfo for Platform {
    fn is_macos(&self) -> bool {
        *self == Platform::MacOS
    }

    fn is_windows(&self) -> bool {
        *self == Platform::Windows
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::MacOS => write!(f, "macos"),
            Platform::Windows => write!(f, "windows"),
            Platform::Other => write!(f, "other"),
        }
    }
}

/// What a named binding reacts to
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Trigger {
    /// Exact set of held keys
    Stroke(KeyStroke),
    /// Pattern evaluated against each key-down event
    Combination(KeyCombination),
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Stroke(stroke) => write!(f, "stroke {}", stroke),
            Trigger::Combination(combination) => write!(f, "combo {}", combination),
        }
    }
}

/// A named action bound to a trigger
///
/// # Example
/// ```ignore
/// let binding = Binding {
///     trigger: Trigger::Combination("Shortcut+S".parse()?),
///     action: "save".to_string(),
///     line: 3,
/// };
/// // Represents: combo = Shortcut+S, save
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Binding {
    pub trigger: Trigger,

    /// Action name (e.g., "save", "open-palette")
    pub action: String,

    /// Source line (1-based) in the bindings file, 0 if built in code
    pub line: usize,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.trigger, self.action)
    }
}

/// One step of a recorded event script
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ScriptStep {
    Down(KeyEvent),
    Up(KeyEvent),
    /// Drop all pressed keys (focus loss)
    Reset,
}

impl fmt::Display for ScriptStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptStep::Down(event) => write!(f, "down {}", event),
            ScriptStep::Up(event) => write!(f, "up {}", event),
            ScriptStep::Reset => write!(f, "reset"),
        }
    }
}
