use crate::core::{
    CombinationMatcher, KeyCode, KeyCombination, KeyEvent, KeyStroke, ModifierValue, Platform,
    PlatformInfo,
};
use proptest::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Small key universe so random operations collide often
fn key_code() -> impl Strategy<Value = KeyCode> {
    prop_oneof![
        Just(KeyCode::Alt),
        Just(KeyCode::Control),
        Just(KeyCode::Shift),
        Just(KeyCode::Command),
        (b'A'..=b'E').prop_map(|b| KeyCode::Char(b as char)),
        (1u8..=3).prop_map(KeyCode::F),
    ]
}

/// (true, key) = add, (false, key) = remove
fn operations() -> impl Strategy<Value = Vec<(bool, KeyCode)>> {
    prop::collection::vec((any::<bool>(), key_code()), 0..40)
}

proptest! {
    #[test]
    fn prop_contains_reflects_net_effect(ops in operations()) {
        let mut stroke = KeyStroke::new();
        let mut model = HashSet::new();

        for (add, code) in &ops {
            if *add {
                stroke.add_key(*code);
                model.insert(*code);
            } else {
                stroke.remove_key(*code);
                model.remove(code);
            }
        }

        prop_assert_eq!(stroke.len(), model.len());
        for (_, code) in &ops {
            prop_assert_eq!(stroke.contains(*code), model.contains(code));
        }
    }

    #[test]
    fn prop_equal_sets_are_equal_strokes(keys in prop::collection::vec(key_code(), 0..10)) {
        let forward: KeyStroke = keys.iter().copied().collect();

        let mut backward = KeyStroke::new();
        for code in keys.iter().rev() {
            backward.add_key(*code);
            backward.add_key(*code);
        }

        prop_assert_eq!(&forward, &backward);
        prop_assert_eq!(hash_of(&forward), hash_of(&backward));
    }
}

#[test]
fn test_stroke_from_str_round_trips_display() {
    let stroke: KeyStroke = "shift+f5+ctrl".parse().unwrap();

    assert_eq!(stroke.to_string(), "CONTROL+SHIFT+F5");
    assert_eq!(stroke.to_string().parse::<KeyStroke>().unwrap(), stroke);
}

#[test]
fn test_punctuation_keys_round_trip_display() {
    let stroke = KeyStroke::from([KeyCode::Control, KeyCode::char(','), KeyCode::char('+')]);
    assert_eq!(stroke.to_string().parse::<KeyStroke>().unwrap(), stroke);

    let combination = KeyCombination::new(KeyCode::char(',')).control(ModifierValue::Down);
    assert_eq!(combination.to_string(), "Ctrl+COMMA");
    assert_eq!(combination.to_string().parse::<KeyCombination>().unwrap(), combination);
}

#[test]
fn test_stroke_iterates_in_key_order() {
    let stroke = KeyStroke::from([KeyCode::char('z'), KeyCode::Alt, KeyCode::Enter]);
    let keys: Vec<KeyCode> = stroke.iter().collect();

    assert_eq!(keys, vec![KeyCode::Alt, KeyCode::Char('Z'), KeyCode::Enter]);
}

#[test]
fn test_ctrl_s_combination() {
    let save: KeyCombination = "Ctrl+S".parse().unwrap();

    assert!(save.matches(&KeyEvent::new(KeyCode::char('s')).with_control()));
    assert!(!save.matches(&KeyEvent::new(KeyCode::char('s'))));
}

#[test]
fn test_combination_display_parses_back() {
    let combination = KeyCombination::new(KeyCode::F(4))
        .alt(ModifierValue::Down)
        .shift(ModifierValue::Any);

    let text = combination.to_string();
    assert_eq!(text, "Alt+Shift?+F4");
    assert_eq!(text.parse::<KeyCombination>().unwrap(), combination);
}

#[test]
fn test_combinations_hash_by_content() {
    let first: KeyCombination = "Ctrl+Shift+K".parse().unwrap();
    let second: KeyCombination = "Shift+Ctrl+K".parse().unwrap();

    assert_eq!(first, second);
    assert_eq!(hash_of(&first), hash_of(&second));
}

#[test]
fn test_platform_current_is_consistent() {
    let platform = Platform::current();
    assert_eq!(platform.is_macos(), cfg!(target_os = "macos"));
    assert_eq!(platform.is_windows(), cfg!(target_os = "windows"));
}
