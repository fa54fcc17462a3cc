//! Config module tests
//!
//! Contains test suites for file loading:
//! - Bindings file loading, conflicts and dispatcher wiring
//! - Event script loading and replay

#[cfg(test)]
mod bindings_file_tests;
