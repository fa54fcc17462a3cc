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

//! Bindings files and event scripts on disk.
//!
//! Two read-only file kinds feed the dispatcher from outside code:
//!
//! - **Bindings files** name actions and the triggers that fire them
//! - **Event scripts** record a sequence of key-down/key-up events to replay
//!
//! Both are parsed by `core::parser`; this module adds file handling and
//! wiring into a `KeyboardDispatcher`.
//!
//! # Example
//!
//! ```no_run
//! use keystroke_dispatch::config::{BindingsFile, EventScript};
//! use keystroke_dispatch::core::{KeyboardDispatcher, Platform};
//!
//! let keyboard = KeyboardDispatcher::new(Platform::current());
//! let bindings = BindingsFile::load("/home/user/.config/keys.conf".into())?;
//! bindings.apply(&keyboard, |action, event| println!("{} ({})", action, event));
//!
//! let script = EventScript::load("/tmp/session.keys".into())?;
//! script.replay(&keyboard);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;

pub use error::ConfigError;

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::parser::{parse_bindings, parse_script};
use crate::core::{
    Binding, CombinationCallback, ConflictDetector, Conflict, DispatchReport, KeyEvent,
    KeyboardDispatcher, ScriptStep, StrokeCallback, Trigger,
};

/// A parsed bindings file.
#[derive(Debug)]
pub struct BindingsFile {
    path: PathBuf,
    bindings: Vec<Binding>,
}

impl BindingsFile {
    /// Reads and parses the bindings file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file doesn't exist,
    /// `ConfigError::Parse` (with the offending line) if it is malformed.
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = read_existing(&path)?;
        let bindings = parse_bindings(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        debug!("Loaded {} binding(s) from {}", bindings.len(), path.display());
        Ok(Self { path, bindings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Triggers bound to more than one action.
    pub fn conflicts(&self) -> Vec<Conflict> {
        let mut detector = ConflictDetector::new();
        for binding in &self.bindings {
            detector.add_binding(binding.clone());
        }
        detector.find_conflicts()
    }

    /// Binds every action to `keyboard`, reporting fired actions to `on_action`.
    ///
    /// Returns how many new registrations were made (a repeated
    /// trigger/action pair is only registered once).
    pub fn apply<F>(&self, keyboard: &KeyboardDispatcher, on_action: F) -> usize
    where
        F: Fn(&str, &KeyEvent) + Send + Sync + 'static,
    {
        let on_action = Arc::new(on_action);
        let mut registered = Vec::new();

        for binding in &self.bindings {
            if registered.contains(&(&binding.trigger, binding.action.as_str())) {
                continue;
            }
            registered.push((&binding.trigger, binding.action.as_str()));

            let action = binding.action.clone();
            let on_action = Arc::clone(&on_action);
            match &binding.trigger {
                Trigger::Stroke(stroke) => {
                    keyboard.bind_stroke(
                        stroke.clone(),
                        StrokeCallback::new(move |_, event| on_action(&action, event)),
                    );
                }
                Trigger::Combination(combination) => {
                    keyboard.bind_combination(
                        combination.clone(),
                        CombinationCallback::new(move |_, event| on_action(&action, event)),
                    );
                }
            }
        }

        registered.len()
    }
}

/// A parsed event script.
#[derive(Debug)]
pub struct EventScript {
    path: PathBuf,
    steps: Vec<ScriptStep>,
}

impl EventScript {
    /// Reads and parses the event script at `path`.
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = read_existing(&path)?;
        let steps = parse_script(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        Ok(Self { path, steps })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    /// Feeds every step to `keyboard` in order.
    ///
    /// Shortcut flags are derived from the dispatcher's platform before each
    /// event is delivered. Returns one entry per step; only key-down steps
    /// carry a `DispatchReport`.
    pub fn replay(
        &self,
        keyboard: &KeyboardDispatcher,
    ) -> Vec<(ScriptStep, Option<DispatchReport>)> {
        self.steps
            .iter()
            .map(|step| match *step {
                ScriptStep::Down(event) => {
                    let event = event.resolve_shortcut(keyboard.platform());
                    (ScriptStep::Down(event), Some(keyboard.on_key_down(&event)))
                }
                ScriptStep::Up(event) => {
                    let event = event.resolve_shortcut(keyboard.platform());
                    keyboard.on_key_up(&event);
                    (ScriptStep::Up(event), None)
                }
                ScriptStep::Reset => {
                    keyboard.reset_key_stroke();
                    (ScriptStep::Reset, None)
                }
            })
            .collect()
    }
}

fn read_existing(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests;
