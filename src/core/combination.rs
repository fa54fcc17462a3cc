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

//! src/core/combination.rs
//!
//! Pattern-based key combinations
//!
//! Unlike a `KeyStroke`, which is compared against the accumulated set of
//! pressed keys, a combination is evaluated against a single raw event.
//! The dispatcher treats matchers as opaque: anything implementing
//! `CombinationMatcher` can be bound. `KeyCombination` is the stock
//! implementation covering "key code plus modifier state" patterns such as
//! `Ctrl+S` or `Shortcut+Shift+P`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::core::parser::{self, ParseError};
use crate::core::types::{KeyCode, KeyEvent};

/// Decides whether a raw event matches a declared pattern.
///
/// Matchers are used as HashMap keys while registered, so equality and hash
/// must stay stable for as long as the matcher is bound.
pub trait CombinationMatcher: Clone + fmt::Debug + Eq + Hash + Send + Sync + 'static {
    fn matches(&self, event: &KeyEvent) -> bool;
}

/// Required state of one modifier in a `KeyCombination`
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ModifierValue {
    /// Modifier must be held
    Down,
    /// Modifier must not be held
    #[default]
    Up,
    /// Modifier state is ignored
    Any,
}

impl ModifierValue {
    fn accepts(self, held: bool) -> bool {
        match self {
            ModifierValue::Down => held,
            ModifierValue::Up => !held,
            ModifierValue::Any => true,
        }
    }
}

/// Key code plus required modifier states
///
/// # Shortcut handling
/// `shortcut: Down` requires the event's shortcut flag. Because the shortcut
/// key is physically either Control or Meta, an `Up` requirement on those
/// two is relaxed in that case. With `shortcut` at `Up` or `Any` the
/// shortcut flag is not inspected; Control and Meta are checked directly.
///
/// # Example
/// ```
/// use keystroke_dispatch::core::{CombinationMatcher, KeyCode, KeyCombination, KeyEvent};
///
/// let save: KeyCombination = "Ctrl+S".parse()?;
/// assert!(save.matches(&KeyEvent::new(KeyCode::char('s')).with_control()));
/// assert!(!save.matches(&KeyEvent::new(KeyCode::char('s'))));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct KeyCombination {
    pub code: KeyCode,
    pub shift: ModifierValue,
    pub control: ModifierValue,
    pub alt: ModifierValue,
    pub meta: ModifierValue,
    pub shortcut: ModifierValue,
}

impl KeyCombination {
    /// Combination for `code` with every modifier required `Up`.
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            shift: ModifierValue::Up,
            control: ModifierValue::Up,
            alt: ModifierValue::Up,
            meta: ModifierValue::Up,
            shortcut: ModifierValue::Up,
        }
    }

    pub fn shift(mut self, value: ModifierValue) -> Self {
        self.shift = value;
        self
    }

    pub fn control(mut self, value: ModifierValue) -> Self {
        self.control = value;
        self
    }

    pub fn alt(mut self, value: ModifierValue) -> Self {
        self.alt = value;
        self
    }

    pub fn meta(mut self, value: ModifierValue) -> Self {
        self.meta = value;
        self
    }

    pub fn shortcut(mut self, value: ModifierValue) -> Self {
        self.shortcut = value;
        self
    }
}

impl CombinationMatcher for KeyCombination {
    fn matches(&self, event: &KeyEvent) -> bool {
        if event.code != self.code {
            return false;
        }

        let (control, meta) = if self.shortcut == ModifierValue::Down {
            if !event.shortcut {
                return false;
            }
            (relax_up(self.control), relax_up(self.meta))
        } else {
            (self.control, self.meta)
        };

        self.shift.accepts(event.shift)
            && self.alt.accepts(event.alt)
            && control.accepts(event.control)
            && meta.accepts(event.meta)
    }
}

fn relax_up(value: ModifierValue) -> ModifierValue {
    match value {
        ModifierValue::Up => ModifierValue::Any,
        other => other,
    }
}

impl FromStr for KeyCombination {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse_combination(s)
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = [
            (self.shortcut, "Shortcut"),
            (self.control, "Ctrl"),
            (self.alt, "Alt"),
            (self.shift, "Shift"),
            (self.meta, "Meta"),
        ];
        for (value, name) in modifiers {
            match value {
                ModifierValue::Down => write!(f, "{}+", name)?,
                ModifierValue::Any => write!(f, "{}?+", name)?,
                ModifierValue::Up => {}
            }
        }
        write!(f, "{}", self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::char(c))
    }

    #[test]
    fn test_ctrl_s_requires_control() {
        let combo = KeyCombination::new(KeyCode::char('s')).control(ModifierValue::Down);

        assert!(combo.matches(&key('s').with_control()));
        assert!(!combo.matches(&key('s')));
        assert!(!combo.matches(&key('d').with_control()));
    }

    #[test]
    fn test_unlisted_modifiers_must_be_up() {
        let combo = KeyCombination::new(KeyCode::char('s')).control(ModifierValue::Down);
        assert!(!combo.matches(&key('s').with_control().with_shift()));
    }

    #[test]
    fn test_any_ignores_modifier() {
        let combo = KeyCombination::new(KeyCode::char('x'))
            .control(ModifierValue::Down)
            .shift(ModifierValue::Any);

        assert!(combo.matches(&key('x').with_control()));
        assert!(combo.matches(&key('x').with_control().with_shift()));
    }

    #[test]
    fn test_shortcut_down_relaxes_control_and_meta() {
        let combo = KeyCombination::new(KeyCode::char('s')).shortcut(ModifierValue::Down);

        // Windows/Linux style: shortcut is control
        assert!(combo.matches(&key('s').with_control().with_shortcut()));
        // macOS style: shortcut is meta
        assert!(combo.matches(&key('s').with_meta().with_shortcut()));
        assert!(!combo.matches(&key('s').with_control()));
    }

    #[test]
    fn test_ctrl_combination_ignores_shortcut_flag() {
        let combo = KeyCombination::new(KeyCode::char('s')).control(ModifierValue::Down);
        assert!(combo.matches(&key('s').with_control().with_shortcut()));
    }

    #[test]
    fn test_display() {
        let combo = KeyCombination::new(KeyCode::char('p'))
            .shortcut(ModifierValue::Down)
            .shift(ModifierValue::Down)
            .alt(ModifierValue::Any);
        assert_eq!(combo.to_string(), "Shortcut+Alt?+Shift+P");
    }
}
