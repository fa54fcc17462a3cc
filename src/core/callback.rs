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

//! Callback handles
//!
//! Closures have no equality of their own, so each callback is wrapped in an
//! `Arc` and compared by pointer. Cloning a handle yields the same callback:
//! keep a clone around to unbind it later.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::core::keystroke::KeyStroke;
use crate::core::types::KeyEvent;

type StrokeFn = dyn Fn(&KeyStroke, &KeyEvent) + Send + Sync;
type CombinationFn<M> = dyn Fn(&M, &KeyEvent) + Send + Sync;

/// Callback fired when the current keystroke exactly equals a bound stroke.
///
/// Receives a snapshot of the current keystroke and the raw event.
pub struct StrokeCallback(Arc<StrokeFn>);

impl StrokeCallback {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&KeyStroke, &KeyEvent) + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    pub(crate) fn call(&self, stroke: &KeyStroke, event: &KeyEvent) {
        (self.0)(stroke, event)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

/// Callback fired when a bound matcher accepts the raw event.
///
/// Receives the matcher that fired and the raw event.
pub struct CombinationCallback<M>(Arc<CombinationFn<M>>);

impl<M> CombinationCallback<M> {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&M, &KeyEvent) + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    pub(crate) fn call(&self, matcher: &M, event: &KeyEvent) {
        (self.0)(matcher, event)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl Clone for StrokeCallback {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl PartialEq for StrokeCallback {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for StrokeCallback {}

impl Hash for StrokeCallback {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for StrokeCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StrokeCallback({:#x})", self.addr())
    }
}

impl<M> Clone for CombinationCallback<M> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<M> PartialEq for CombinationCallback<M> {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl<M> Eq for CombinationCallback<M> {}

impl<M> Hash for CombinationCallback<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<M> fmt::Debug for CombinationCallback<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CombinationCallback({:#x})", self.addr())
    }
}
