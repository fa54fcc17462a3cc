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

//! src/core/registry.rs
//!
//! Concurrent multi-map from binding keys to callback sets
//!
//! The registry indexes callbacks with a HashMap keyed by whatever the
//! binding is (a `KeyStroke` or a matcher), so looking up the callbacks for
//! a key is O(1) average case.
//!
//! # Locking
//! Two tiers:
//! - An outer `RwLock` guards the map structure (inserting a new key,
//!   pruning an empty one). Lookups take it shared and only long enough to
//!   clone an `Arc` to the bucket.
//! - Each bucket is an `Arc<Mutex<HashSet<C>>>` with its own lock, so adding
//!   a callback to key A never waits on dispatch to key B.
//!
//! Buckets are only pruned while the outer lock is held exclusively, so a
//! bucket reached under the shared lock is never detached mid-insert.
//!
//! Callers never run callbacks while holding any registry lock: `callbacks`
//! and `matching` return snapshots, and callbacks are free to bind or
//! unbind (themselves included) while being invoked.

use log::debug;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

type Bucket<C> = Arc<Mutex<HashSet<C>>>;

/// Maps each key to the set of callbacks bound to it.
pub struct CallbackRegistry<K, C> {
    entries: RwLock<HashMap<K, Bucket<C>>>,
}

impl<K, C> CallbackRegistry<K, C>
where
    K: Clone + Eq + Hash + fmt::Debug,
    C: Clone + Eq + Hash,
{
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Binds `callback` under `key`.
    ///
    /// Returns false if this exact callback was already bound to `key`
    /// (set semantics: it will still fire only once).
    pub fn bind(&self, key: K, callback: C) -> bool {
        if let Some(bucket) = self.entries.read().get(&key) {
            return bucket.lock().insert(callback);
        }

        let mut entries = self.entries.write();
        debug!("Creating callback bucket for {:?}", key);
        let bucket = entries.entry(key).or_default();
        let mut callbacks = bucket.lock();
        callbacks.insert(callback)
    }

    /// Removes a single callback. The key is pruned when its last callback goes.
    ///
    /// Returns false (and does nothing) when the key or callback is unknown.
    pub fn unbind(&self, key: &K, callback: &C) -> bool {
        let mut entries = self.entries.write();
        let Some(bucket) = entries.get(key) else {
            return false;
        };

        let (removed, now_empty) = {
            let mut set = bucket.lock();
            let removed = set.remove(callback);
            (removed, set.is_empty())
        };

        if now_empty {
            debug!("Pruning empty callback bucket for {:?}", key);
            entries.remove(key);
        }

        removed
    }

    /// Removes every callback bound to `key`. Returns how many were removed.
    pub fn clear(&self, key: &K) -> usize {
        self.entries
            .write()
            .remove(key)
            .map(|bucket| bucket.lock().len())
            .unwrap_or(0)
    }

    /// Snapshot of the callbacks bound to `key` (empty if none).
    pub fn callbacks(&self, key: &K) -> Vec<C> {
        let bucket = self.entries.read().get(key).cloned();
        bucket
            .map(|bucket| bucket.lock().iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of every key accepted by `predicate`, with its callbacks.
    ///
    /// Each key is offered to `predicate` exactly once. The predicate runs
    /// after the structural lock is released.
    pub fn matching<P>(&self, mut predicate: P) -> Vec<(K, Vec<C>)>
    where
        P: FnMut(&K) -> bool,
    {
        let buckets: Vec<(K, Bucket<C>)> = self
            .entries
            .read()
            .iter()
            .map(|(key, bucket)| (key.clone(), Arc::clone(bucket)))
            .collect();

        buckets
            .into_iter()
            .filter(|(key, _)| predicate(key))
            .map(|(key, bucket)| {
                let callbacks = bucket.lock().iter().cloned().collect();
                (key, callbacks)
            })
            .collect()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Number of keys with at least one callback.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Total callbacks across all keys.
    pub fn callback_count(&self) -> usize {
        self.entries
            .read()
            .values()
            .map(|bucket| bucket.lock().len())
            .sum()
    }
}

impl<K, C> Default for CallbackRegistry<K, C>
where
    K: Clone + Eq + Hash + fmt::Debug,
    C: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_creates_bucket_lazily() {
        let registry: CallbackRegistry<String, u32> = CallbackRegistry::new();
        assert!(registry.is_empty());

        assert!(registry.bind("a".to_string(), 1));
        assert!(registry.contains_key(&"a".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_bind_is_idempotent() {
        let registry: CallbackRegistry<String, u32> = CallbackRegistry::new();
        assert!(registry.bind("a".to_string(), 1));
        assert!(!registry.bind("a".to_string(), 1));

        assert_eq!(registry.callbacks(&"a".to_string()), vec![1]);
    }

    #[test]
    fn test_unbind_last_callback_prunes_key() {
        let registry: CallbackRegistry<String, u32> = CallbackRegistry::new();
        registry.bind("a".to_string(), 1);
        registry.bind("a".to_string(), 2);

        assert!(registry.unbind(&"a".to_string(), &1));
        assert!(registry.contains_key(&"a".to_string()));

        assert!(registry.unbind(&"a".to_string(), &2));
        assert!(!registry.contains_key(&"a".to_string()));
    }

    #[test]
    fn test_unbind_unknown_is_noop() {
        let registry: CallbackRegistry<String, u32> = CallbackRegistry::new();
        assert!(!registry.unbind(&"missing".to_string(), &1));

        registry.bind("a".to_string(), 1);
        assert!(!registry.unbind(&"a".to_string(), &2));
        assert_eq!(registry.callback_count(), 1);
    }

    #[test]
    fn test_clear_removes_whole_bucket() {
        let registry: CallbackRegistry<String, u32> = CallbackRegistry::new();
        registry.bind("a".to_string(), 1);
        registry.bind("a".to_string(), 2);
        registry.bind("b".to_string(), 3);

        assert_eq!(registry.clear(&"a".to_string()), 2);
        assert_eq!(registry.clear(&"a".to_string()), 0);
        assert_eq!(registry.callback_count(), 1);
    }

    #[test]
    fn test_matching_filters_keys() {
        let registry: CallbackRegistry<String, u32> = CallbackRegistry::new();
        registry.bind("apple".to_string(), 1);
        registry.bind("avocado".to_string(), 2);
        registry.bind("banana".to_string(), 3);

        let mut matched = registry.matching(|key| key.starts_with('a'));
        matched.sort();

        assert_eq!(
            matched,
            vec![("apple".to_string(), vec![1]), ("avocado".to_string(), vec![2])]
        );
    }
}
