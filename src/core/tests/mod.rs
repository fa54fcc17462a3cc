//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Conflict detection tests
//! - Notation and file parser tests
//! - Type tests (KeyStroke, KeyCombination, etc.)
//! - Dispatcher behaviour and concurrency tests

#[cfg(test)]
mod types_tests;
