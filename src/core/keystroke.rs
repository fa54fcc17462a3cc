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

//! src/core/keystroke.rs
//!
//! The set of currently pressed keys
//!
//! A `KeyStroke` is an unordered set of `KeyCode`s. Equality and hashing are
//! by content, so two strokes built through different add/remove orders are
//! the same HashMap key.
//!
//! # Hash Implementation
//! Keys are stored in a `BTreeSet`, which keeps them in `KeyCode` order.
//! The derived `Hash` therefore sees the same sequence for equal sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::core::parser::{self, ParseError};
use crate::core::types::KeyCode;

/// An unordered set of key codes
///
/// # Example
/// ```
/// use keystroke_dispatch::core::{KeyCode, KeyStroke};
///
/// let mut stroke = KeyStroke::new();
/// stroke.add_key(KeyCode::char('k'));
/// stroke.add_key(KeyCode::Control);
///
/// let parsed: KeyStroke = "ctrl+k".parse()?;
/// assert_eq!(stroke, parsed);
/// assert_eq!(stroke.to_string(), "CONTROL+K");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct KeyStroke {
    keys: BTreeSet<KeyCode>,
}

impl KeyStroke {
    /// Creates an empty keystroke.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `code`; no-op if already present.
    pub fn add_key(&mut self, code: KeyCode) {
        self.keys.insert(code);
    }

    /// Removes `code`; no-op if absent.
    pub fn remove_key(&mut self, code: KeyCode) {
        self.keys.remove(&code);
    }

    pub fn contains(&self, code: KeyCode) -> bool {
        self.keys.contains(&code)
    }

    /// Adds `code` when `held`, removes it otherwise.
    pub fn set_key(&mut self, code: KeyCode, held: bool) {
        if held {
            self.add_key(code);
        } else {
            self.remove_key(code);
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates keys in `KeyCode` order (modifiers first).
    pub fn iter(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys.iter().copied()
    }
}

impl FromIterator<KeyCode> for KeyStroke {
    fn from_iter<I: IntoIterator<Item = KeyCode>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[KeyCode; N]> for KeyStroke {
    fn from(keys: [KeyCode; N]) -> Self {
        keys.into_iter().collect()
    }
}

impl FromStr for KeyStroke {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse_key_stroke(s)
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = self
            .keys
            .iter()
            .map(|k| format!("{}", k))
            .collect::<Vec<_>>()
            .join("+");
        write!(f, "{}", keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(stroke: &KeyStroke) -> u64 {
        let mut hasher = DefaultHasher::new();
        stroke.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut stroke = KeyStroke::new();
        stroke.add_key(KeyCode::char('a'));
        stroke.add_key(KeyCode::char('a'));

        assert_eq!(stroke.len(), 1);
        assert!(stroke.contains(KeyCode::Char('A')));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut stroke = KeyStroke::from([KeyCode::Shift]);
        stroke.remove_key(KeyCode::Alt);

        assert_eq!(stroke, KeyStroke::from([KeyCode::Shift]));
    }

    #[test]
    fn test_order_independent_equality_and_hash() {
        let mut first = KeyStroke::new();
        first.add_key(KeyCode::Control);
        first.add_key(KeyCode::char('k'));
        first.add_key(KeyCode::Alt);
        first.remove_key(KeyCode::Alt);

        let mut second = KeyStroke::new();
        second.add_key(KeyCode::char('k'));
        second.add_key(KeyCode::Control);

        assert_eq!(first, second);
        assert_eq!(hash_of(&first), hash_of(&second));
    }

    #[test]
    fn test_display_lists_modifiers_first() {
        let stroke = KeyStroke::from([KeyCode::char('k'), KeyCode::Shift, KeyCode::Control]);
        assert_eq!(stroke.to_string(), "CONTROL+SHIFT+K");
        assert_eq!(KeyStroke::new().to_string(), "");
    }

    #[test]
    fn test_set_key() {
        let mut stroke = KeyStroke::new();
        stroke.set_key(KeyCode::Shift, true);
        assert!(stroke.contains(KeyCode::Shift));
        stroke.set_key(KeyCode::Shift, false);
        assert!(stroke.is_empty());
    }
}
