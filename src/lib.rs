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

//! Keystroke Dispatch
//!
//! Tracks which keys are currently held and fires registered callbacks when
//! the held set, or a single key event, matches a binding.
//!
//! # Features
//!
//! - **Stroke bindings:** Fire when the exact set of held keys is seen
//! - **Combination bindings:** Fire when one key event matches a pattern
//! - **Platform meta keys:** META becomes COMMAND on macOS, WINDOWS on Windows
//! - **Thread safe:** Bind, unbind and dispatch from any thread
//! - **Panic isolation:** A failing callback is logged and skipped
//! - **Bindings files:** Load named actions with conflict detection
//!
//! # Architecture
//!
//! - **`core`:** Keys, strokes, matchers, the callback registry and the dispatcher
//! - **`config`:** Bindings files and event scripts on disk
//!
//! # Examples
//!
//! ## Binding a stroke
//!
//! ```
//! use keystroke_dispatch::{
//!     KeyCode, KeyEvent, KeyStroke, KeyboardDispatcher, Platform, StrokeCallback,
//! };
//!
//! let keyboard = KeyboardDispatcher::new(Platform::Other);
//! let save: KeyStroke = "CTRL+S".parse()?;
//! keyboard.bind_stroke(save, StrokeCallback::new(|stroke, _| println!("save {}", stroke)));
//!
//! let report = keyboard.on_key_down(&KeyEvent::new(KeyCode::char('s')).with_control());
//! assert_eq!(report.stroke_callbacks, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Binding a combination
//!
//! ```
//! use keystroke_dispatch::{
//!     CombinationCallback, KeyCode, KeyEvent, KeyboardDispatcher, Platform,
//! };
//!
//! let keyboard = KeyboardDispatcher::new(Platform::Other);
//! let undo = CombinationCallback::new(|_, _| println!("undo"));
//! keyboard.bind_combination("Ctrl+Shift?+Z".parse()?, undo);
//!
//! let event = KeyEvent::new(KeyCode::char('z')).with_control().with_shift();
//! let report = keyboard.on_key_down(&event);
//! assert_eq!(report.combination_callbacks, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod config;
pub mod core;

// Re-export commonly used types for convenience
pub use core::{
    CombinationCallback, CombinationMatcher, KeyCode, KeyCombination, KeyEvent, KeyStroke,
    KeyboardDispatcher, ModifierValue, Platform, PlatformInfo, StrokeCallback,
};
