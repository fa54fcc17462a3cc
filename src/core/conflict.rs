//! Binding conflict detection
//!
//! When several named actions are bound to the same trigger they all fire
//! on the same key-down, which is rarely what the author of a bindings
//! file meant. This module flags such triggers in O(1) per binding using
//! HashMap-based indexing.
//!
//! Triggers compare by content: `CTRL+K` and `K+CTRL` are the same stroke.
//! A stroke and a combination are never considered in conflict with each
//! other even if both would fire for the same event.

use std::collections::HashMap;
use crate::core::types::{Binding, Trigger};

/// Detects triggers bound to more than one action.
pub struct ConflictDetector {
    /// Maps each trigger to all bindings using it, in insertion order.
    bindings: HashMap<Trigger, Vec<Binding>>,
}

/// Represents a detected conflict between bindings.
#[derive(Clone, Debug, PartialEq)]
pub struct Conflict {
    /// The trigger that has conflicts
    pub trigger: Trigger,

    /// All bindings using this trigger (always 2 or more)
    pub conflicting_bindings: Vec<Binding>,
}

impl ConflictDetector {
    /// Creates a new empty conflict detector.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Adds a binding to the detector.
    ///
    /// Time complexity: O(1) average case
    pub fn add_binding(&mut self, binding: Binding) {
        self.bindings
            .entry(binding.trigger.clone())
            .or_default()
            .push(binding);
    }

    /// Finds all conflicts, ordered by the first line that uses the trigger.
    ///
    /// Binding the *same* action twice to one trigger is not a conflict: the
    /// dispatcher's set semantics make it fire once anyway.
    pub fn find_conflicts(&self) -> Vec<Conflict> {
        let mut conflicts: Vec<Conflict> = self
            .bindings
            .iter()
            .filter(|(_, bindings)| distinct_actions(bindings) > 1)
            .map(|(trigger, bindings)| Conflict {
                trigger: trigger.clone(),
                conflicting_bindings: bindings.clone(),
            })
            .collect();

        conflicts.sort_by_key(|c| c.conflicting_bindings.first().map(|b| b.line).unwrap_or(0));
        conflicts
    }

    /// Checks if a specific trigger has conflicts.
    pub fn has_conflict(&self, trigger: &Trigger) -> bool {
        self.bindings
            .get(trigger)
            .map(|bindings| distinct_actions(bindings) > 1)
            .unwrap_or(false)
    }

    /// Returns the total number of bindings tracked.
    pub fn total_bindings(&self) -> usize {
        self.bindings.values().map(|v| v.len()).sum()
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn distinct_actions(bindings: &[Binding]) -> usize {
    let mut actions: Vec<&str> = bindings.iter().map(|b| b.action.as_str()).collect();
    actions.sort_unstable();
    actions.dedup();
    actions.len()
}
