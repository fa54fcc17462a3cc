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

//! src/core/mod.rs
//!
//! Core dispatch logic
//!
//! This module contains the data structures and algorithms for tracking
//! pressed keys and dispatching key events, including:
//! - Type definitions for key codes, events and platforms
//! - The `KeyStroke` set and `KeyCombination` matcher
//! - The two-tier locked callback registry
//! - The `KeyboardDispatcher` itself
//! - Notation parsing and binding conflict detection
//!
//! Nothing in here touches a window system or the file system, so all of it
//! can be unit tested without an event source.

pub mod callback;
pub mod combination;
pub mod conflict;
pub mod dispatcher;
pub mod keystroke;
pub mod parser;
pub mod registry;
pub mod types;

pub use callback::{CombinationCallback, StrokeCallback};
pub use combination::{CombinationMatcher, KeyCombination, ModifierValue};
pub use conflict::{Conflict, ConflictDetector};
pub use dispatcher::{DispatchReport, KeyboardDispatcher};
pub use keystroke::KeyStroke;
pub use parser::ParseError;
pub use registry::CallbackRegistry;
pub use types::*;

#[cfg(test)]
mod tests;
