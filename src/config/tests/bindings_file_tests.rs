// Copyright 2025 Eric Jingryd (tidynest@proton.me)
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

use crate::config::{BindingsFile, ConfigError};
use crate::core::parser::ParseError;
use crate::core::{KeyCode, KeyEvent, KeyboardDispatcher, Platform, Trigger};
use parking_lot::Mutex;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Helper: Writes `content` to a temporary bindings file.
fn write_bindings(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("keys.conf");
    fs::write(&path, content).unwrap();
    (temp_dir, path)
}

const SAMPLE: &str = "\
# Editor bindings
$mod = CTRL+SHIFT

stroke = $mod+P, palette
stroke = CTRL+K, kill-line
combo = Shortcut+S, save
";

#[test]
fn test_load_valid_file() {
    let (_temp_dir, path) = write_bindings(SAMPLE);

    let file = BindingsFile::load(path.clone()).unwrap();

    assert_eq!(file.path(), path.as_path());
    assert_eq!(file.bindings().len(), 3);
    assert_eq!(file.bindings()[0].action, "palette");
    assert_eq!(file.bindings()[0].line, 4);
    assert_eq!(
        file.bindings()[0].trigger,
        Trigger::Stroke("SHIFT+CTRL+P".parse().unwrap())
    );
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nonexistent.conf");

    match BindingsFile::load(path.clone()).unwrap_err() {
        ConfigError::NotFound(missing) => assert_eq!(missing, path),
        other => panic!("Expected NotFound error, got: {:?}", other),
    }
}

#[test]
fn test_load_reports_bad_line() {
    let (_temp_dir, path) = write_bindings("stroke = CTRL+K, ok\nstroke = CTRL+NOPE, broken\n");

    match BindingsFile::load(path).unwrap_err() {
        ConfigError::Parse { source: ParseError::InvalidSyntax { line, message }, .. } => {
            assert_eq!(line, 2);
            assert!(message.contains("NOPE"), "Message should name the key: {}", message);
        }
        other => panic!("Expected Parse error, got: {:?}", other),
    }
}

#[test]
fn test_conflicts_found_in_file() {
    let (_temp_dir, path) = write_bindings("stroke = CTRL+K, kill-line\nstroke = K+CTRL, cut\n");

    let file = BindingsFile::load(path).unwrap();
    let conflicts = file.conflicts();

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflicting_bindings.len(), 2);
}

#[test]
fn test_apply_wires_actions_into_dispatcher() {
    let (_temp_dir, path) = write_bindings(SAMPLE);
    let file = BindingsFile::load(path).unwrap();
    let keyboard = KeyboardDispatcher::new(Platform::Other);

    let fired = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fired);
    let registered = file.apply(&keyboard, move |action, _| sink.lock().push(action.to_string()));
    assert_eq!(registered, 3);

    keyboard.on_key_down(&KeyEvent::new(KeyCode::Control).with_control());
    keyboard.on_key_down(&KeyEvent::new(KeyCode::char('k')).with_control());
    keyboard.on_key_up(&KeyEvent::new(KeyCode::char('k')).with_control());
    keyboard.on_key_down(
        &KeyEvent::new(KeyCode::char('s'))
            .with_control()
            .with_shortcut(),
    );

    assert_eq!(*fired.lock(), vec!["kill-line".to_string(), "save".to_string()]);
}

#[test]
fn test_apply_skips_repeated_pairs() {
    let (_temp_dir, path) = write_bindings("stroke = CTRL+K, cut\nstroke = K+CTRL, cut\n");
    let file = BindingsFile::load(path).unwrap();
    let keyboard = KeyboardDispatcher::new(Platform::Other);

    assert_eq!(file.apply(&keyboard, |_, _| {}), 1);
    assert!(file.conflicts().is_empty());
    assert_eq!(keyboard.strokes().callback_count(), 1);
}
