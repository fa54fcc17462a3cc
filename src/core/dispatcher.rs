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

//! src/core/dispatcher.rs
//!
//! Keyboard event dispatcher
//!
//! Tracks the set of currently pressed keys and fans key-down events out to
//! the callbacks bound to them. Two binding kinds are supported:
//! - **Strokes:** fire when the tracked keystroke *exactly* equals the bound
//!   `KeyStroke` (no subset/superset matching)
//! - **Combinations:** fire when a matcher accepts the raw event, regardless
//!   of accumulated state
//!
//! # Concurrency
//! Key events may arrive from several threads. The whole
//! update-then-dispatch sequence of a key-down runs under one exclusive lock
//! on the current keystroke, so no event observes a half-updated state. The
//! lock is re-entrant: a callback may read, reset or replace the current
//! keystroke, or deliver another event, from the dispatching thread.
//! Binding management goes through `CallbackRegistry`, which never holds
//! its locks while callbacks run.
//!
//! # Failures
//! Every operation is total. A panicking callback is caught and logged, and
//! the remaining callbacks of the same pass still run.

use log::{debug, error, trace};
use parking_lot::ReentrantMutex;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::core::callback::{CombinationCallback, StrokeCallback};
use crate::core::combination::{CombinationMatcher, KeyCombination};
use crate::core::keystroke::KeyStroke;
use crate::core::registry::CallbackRegistry;
use crate::core::types::{KeyCode, KeyEvent, Platform, PlatformInfo};

/// What a single key-down dispatch did.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DispatchReport {
    /// Stroke callbacks invoked (including ones that panicked)
    pub stroke_callbacks: usize,
    /// Combination callbacks invoked (including ones that panicked)
    pub combination_callbacks: usize,
    /// Callbacks that panicked
    pub failed: usize,
}

impl DispatchReport {
    /// Total callbacks invoked.
    pub fn invoked(&self) -> usize {
        self.stroke_callbacks + self.combination_callbacks
    }
}

/// Dispatches key events to stroke and combination callbacks.
///
/// # Example
/// ```
/// use keystroke_dispatch::core::{
///     KeyCode, KeyEvent, KeyStroke, KeyboardDispatcher, Platform, StrokeCallback,
/// };
///
/// let keyboard = KeyboardDispatcher::new(Platform::Other);
/// keyboard.bind_stroke("ctrl+k".parse()?, StrokeCallback::new(|stroke, _| {
///     println!("pressed {}", stroke);
/// }));
///
/// let report = keyboard.on_key_down(&KeyEvent::new(KeyCode::char('k')).with_control());
/// assert_eq!(report.stroke_callbacks, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct KeyboardDispatcher<M = KeyCombination> {
    current: ReentrantMutex<RefCell<KeyStroke>>,
    strokes: CallbackRegistry<KeyStroke, StrokeCallback>,
    combinations: CallbackRegistry<M, CombinationCallback<M>>,
    platform: Arc<dyn PlatformInfo>,
}

impl KeyboardDispatcher<KeyCombination> {
    /// Dispatcher using the stock `KeyCombination` matcher.
    pub fn new<P>(platform: P) -> Self
    where
        P: PlatformInfo + 'static,
    {
        Self::for_platform(Arc::new(platform))
    }
}

impl Default for KeyboardDispatcher<KeyCombination> {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

impl<M: CombinationMatcher> KeyboardDispatcher<M> {
    /// Dispatcher for any matcher type, sharing a platform provider.
    pub fn for_platform(platform: Arc<dyn PlatformInfo>) -> Self {
        Self {
            current: ReentrantMutex::new(RefCell::new(KeyStroke::new())),
            strokes: CallbackRegistry::new(),
            combinations: CallbackRegistry::new(),
            platform,
        }
    }

    /// Key-down handler.
    ///
    /// Adds the event's key, re-synchronises the modifier pseudo-keys with the
    /// event's flags, then fires exact stroke matches followed by every
    /// matching combination.
    pub fn on_key_down(&self, event: &KeyEvent) -> DispatchReport {
        let guard = self.current.lock();

        let snapshot = {
            let mut stroke = guard.borrow_mut();
            stroke.add_key(event.code);
            stroke.set_key(KeyCode::Alt, event.alt);
            stroke.set_key(KeyCode::Control, event.control);
            stroke.set_key(KeyCode::Shift, event.shift);

            if event.meta {
                if self.platform.is_macos() {
                    stroke.add_key(KeyCode::Command);
                } else if self.platform.is_windows() {
                    stroke.add_key(KeyCode::Windows);
                }
            } else {
                stroke.remove_key(KeyCode::Command);
                stroke.remove_key(KeyCode::Windows);
            }

            stroke.clone()
        };
        trace!("Key down {} -> [{}]", event, snapshot);

        let mut report = DispatchReport::default();
        self.dispatch_stroke(&snapshot, event, &mut report);
        self.dispatch_combinations(event, &mut report);

        drop(guard);
        report
    }

    /// Key-up handler. Trims state only; nothing is dispatched.
    ///
    /// A modifier pseudo-key is removed when the up-event still reports that
    /// modifier as held. The event's own key is always removed.
    pub fn on_key_up(&self, event: &KeyEvent) {
        let guard = self.current.lock();
        let mut stroke = guard.borrow_mut();

        if event.alt {
            stroke.remove_key(KeyCode::Alt);
        }
        if event.control {
            stroke.remove_key(KeyCode::Control);
        }
        if event.shift {
            stroke.remove_key(KeyCode::Shift);
        }
        if event.shortcut {
            stroke.remove_key(KeyCode::Shortcut);
        }
        stroke.remove_key(event.code);

        trace!("Key up {} -> [{}]", event, stroke);
    }

    /// Snapshot of the currently pressed keys.
    ///
    /// The returned value is a copy: later events and resets do not change it.
    pub fn current_key_stroke(&self) -> KeyStroke {
        self.current.lock().borrow().clone()
    }

    /// Installs `stroke` as the current state, returning the previous one.
    pub fn set_current_key_stroke(&self, stroke: KeyStroke) -> KeyStroke {
        self.current.lock().replace(stroke)
    }

    /// Forgets every pressed key (e.g. when the window loses focus).
    ///
    /// Installs a fresh empty keystroke; earlier snapshots keep their content.
    pub fn reset_key_stroke(&self) {
        debug!("Resetting current keystroke");
        self.set_current_key_stroke(KeyStroke::new());
    }

    /// Binds `callback` to fire when exactly `stroke` is held.
    ///
    /// Returns false if the same callback was already bound to this stroke.
    pub fn bind_stroke(&self, stroke: KeyStroke, callback: StrokeCallback) -> bool {
        debug!("Binding stroke [{}]", stroke);
        self.strokes.bind(stroke, callback)
    }

    /// Binds `callback` to fire whenever `matcher` accepts a key-down event.
    pub fn bind_combination(&self, matcher: M, callback: CombinationCallback<M>) -> bool {
        debug!("Binding combination {:?}", matcher);
        self.combinations.bind(matcher, callback)
    }

    /// Removes one stroke callback. Unknown strokes/callbacks are ignored.
    pub fn unbind_stroke(&self, stroke: &KeyStroke, callback: &StrokeCallback) -> bool {
        let removed = self.strokes.unbind(stroke, callback);
        if removed {
            debug!("Unbound stroke [{}]", stroke);
        }
        removed
    }

    pub fn unbind_combination(&self, matcher: &M, callback: &CombinationCallback<M>) -> bool {
        let removed = self.combinations.unbind(matcher, callback);
        if removed {
            debug!("Unbound combination {:?}", matcher);
        }
        removed
    }

    /// Removes every callback bound to `stroke`. Returns how many were removed.
    pub fn clear_stroke(&self, stroke: &KeyStroke) -> usize {
        let removed = self.strokes.clear(stroke);
        debug!("Cleared {} callback(s) from stroke [{}]", removed, stroke);
        removed
    }

    pub fn clear_combination(&self, matcher: &M) -> usize {
        let removed = self.combinations.clear(matcher);
        debug!("Cleared {} callback(s) from combination {:?}", removed, matcher);
        removed
    }

    /// Platform provider consulted for the meta modifier.
    pub fn platform(&self) -> &dyn PlatformInfo {
        self.platform.as_ref()
    }

    /// Stroke binding registry (read access for inspection).
    pub fn strokes(&self) -> &CallbackRegistry<KeyStroke, StrokeCallback> {
        &self.strokes
    }

    /// Combination binding registry (read access for inspection).
    pub fn combinations(&self) -> &CallbackRegistry<M, CombinationCallback<M>> {
        &self.combinations
    }

    fn dispatch_stroke(&self, stroke: &KeyStroke, event: &KeyEvent, report: &mut DispatchReport) {
        for callback in self.strokes.callbacks(stroke) {
            report.stroke_callbacks += 1;
            if !invoke(|| callback.call(stroke, event), "stroke", stroke) {
                report.failed += 1;
            }
        }
    }

    fn dispatch_combinations(&self, event: &KeyEvent, report: &mut DispatchReport) {
        for (matcher, callbacks) in self.combinations.matching(|matcher| matcher.matches(event)) {
            let label = format!("{:?}", matcher);
            for callback in callbacks {
                report.combination_callbacks += 1;
                if !invoke(|| callback.call(&matcher, event), "combination", &label) {
                    report.failed += 1;
                }
            }
        }
    }
}

/// Runs one callback, containing any panic. Returns false if it panicked.
fn invoke<F: FnOnce()>(callback: F, kind: &str, binding: &dyn fmt::Display) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(callback)) {
        Ok(()) => true,
        Err(payload) => {
            error!(
                "{} callback for {} panicked: {}",
                kind,
                binding,
                panic_message(payload.as_ref())
            );
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}
