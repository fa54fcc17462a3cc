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

//! src/core/parser.rs
//!
//! Key notation and bindings file parser
//!
//! This module turns text into keyboard types. It handles:
//! - Key names (`K`, `F5`, `PageUp`, `Ctrl`, ...), case-insensitive
//! - Keystroke notation: `CTRL+SHIFT+K` (a plain set of keys)
//! - Combination notation: `Shortcut+Alt?+S` (modifiers, `?` = don't care)
//! - Event notation: `Ctrl+S` (modifiers become event flags)
//! - Bindings files: `stroke = ...` / `combo = ...` lines with `$variables`
//! - Event scripts: `down ...` / `up ...` / `reset` lines
//!
//! # Architecture
//! The parser uses nom combinators for composable, type-safe parsing.
//! Bindings files are parsed in two passes:
//! 1. First pass: Collect variable definitions
//! 2. Second pass: Parse bindings with variable substitution
//!
//! Every line-level error carries its 1-based line number.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
};
use nom::{
    character::complete::{char, space0, space1},
    combinator::{all_consuming, rest},
};
use nom::{multi::separated_list1, sequence::delimited, IResult, Parser};
use std::collections::HashMap;
use thiserror::Error;

use crate::core::combination::{KeyCombination, ModifierValue};
use crate::core::keystroke::KeyStroke;
use crate::core::types::{Binding, KeyCode, KeyEvent, ScriptStep, Trigger};

/// Parse errors with line number context
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Unknown key name '{0}'")]
    UnknownKey(String),

    #[error("'{0}' is not a modifier (only the last key may be a regular key)")]
    NotAModifier(String),

    #[error("Invalid key notation '{0}'")]
    InvalidNotation(String),

    #[error("Parse error on line {line}: {message}")]
    InvalidSyntax { line: usize, message: String },

    #[error("Undefined variable '${variable}' on line {line}")]
    UndefinedVariable { variable: String, line: usize },
}

/// Modifier named in combination or event notation
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ModifierName {
    Shift,
    Control,
    Alt,
    Meta,
    Shortcut,
}

/// Parse a single key name
///
/// Single characters map to `KeyCode::Char` (upper-cased). Function keys
/// are `F1` to `F24`. Modifier pseudo-keys accept common aliases
/// (`CTRL`, `CMD`, `WIN`, `SUPER`, ...).
pub fn parse_key_code(name: &str) -> Result<KeyCode, ParseError> {
    let name = name.trim();

    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::char(c));
    }

    let code = match name.to_ascii_uppercase().as_str() {
        "ALT" | "OPTION" => KeyCode::Alt,
        "CTRL" | "CONTROL" => KeyCode::Control,
        "SHIFT" => KeyCode::Shift,
        "CMD" | "COMMAND" => KeyCode::Command,
        "WIN" | "WINDOWS" | "SUPER" => KeyCode::Windows,
        "SHORTCUT" => KeyCode::Shortcut,
        "ENTER" | "RETURN" => KeyCode::Enter,
        "ESC" | "ESCAPE" => KeyCode::Escape,
        "TAB" => KeyCode::Tab,
        "SPACE" => KeyCode::Space,
        "BACKSPACE" => KeyCode::Backspace,
        "DEL" | "DELETE" => KeyCode::Delete,
        "INS" | "INSERT" => KeyCode::Insert,
        "HOME" => KeyCode::Home,
        "END" => KeyCode::End,
        "PGUP" | "PAGEUP" => KeyCode::PageUp,
        "PGDN" | "PAGEDOWN" => KeyCode::PageDown,
        "UP" => KeyCode::Up,
        "DOWN" => KeyCode::Down,
        "LEFT" => KeyCode::Left,
        "RIGHT" => KeyCode::Right,
        "PLUS" => KeyCode::Char('+'),
        "COMMA" => KeyCode::Char(','),
        other => match other.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
            Some(n) if (1..=24).contains(&n) => KeyCode::F(n),
            _ => return Err(ParseError::UnknownKey(name.to_string())),
        },
    };

    Ok(code)
}

/// Parse keystroke notation such as `CTRL+SHIFT+K`
///
/// Order is irrelevant and repeated keys collapse (set semantics).
pub fn parse_key_stroke(input: &str) -> Result<KeyStroke, ParseError> {
    notation_tokens(input)?
        .into_iter()
        .map(parse_key_code)
        .collect()
}

/// Parse combination notation such as `Ctrl+S` or `Shortcut+Alt?+P`
///
/// The last token is the key; every earlier token must be a modifier,
/// optionally suffixed with `?` to accept either state. Modifiers not
/// mentioned must be up.
pub fn parse_combination(input: &str) -> Result<KeyCombination, ParseError> {
    let tokens = notation_tokens(input)?;
    let (key, modifiers) = split_key(&tokens, input)?;

    let mut combination = KeyCombination::new(parse_key_code(key)?);
    for token in modifiers {
        let (name, value) = match token.strip_suffix('?') {
            Some(name) => (name, ModifierValue::Any),
            None => (*token, ModifierValue::Down),
        };

        combination = match parse_modifier_name(name)? {
            ModifierName::Shift => combination.shift(value),
            ModifierName::Control => combination.control(value),
            ModifierName::Alt => combination.alt(value),
            ModifierName::Meta => combination.meta(value),
            ModifierName::Shortcut => combination.shortcut(value),
        };
    }

    Ok(combination)
}

/// Parse event notation such as `Ctrl+S`
///
/// Modifiers set the corresponding event flags; the last token is the
/// event's key. A modifier key on its own (`Shift`) reports its own flag as
/// held, as toolkits do for modifier key-down events.
pub fn parse_event(input: &str) -> Result<KeyEvent, ParseError> {
    let tokens = notation_tokens(input)?;
    let (key, modifiers) = split_key(&tokens, input)?;

    let code = parse_key_code(key)?;
    let mut event = KeyEvent::new(code);
    match code {
        KeyCode::Alt => event.alt = true,
        KeyCode::Control => event.control = true,
        KeyCode::Shift => event.shift = true,
        KeyCode::Command | KeyCode::Windows => event.meta = true,
        KeyCode::Shortcut => event.shortcut = true,
        _ => {}
    }

    for token in modifiers {
        match parse_modifier_name(token)? {
            ModifierName::Shift => event.shift = true,
            ModifierName::Control => event.control = true,
            ModifierName::Alt => event.alt = true,
            ModifierName::Meta => event.meta = true,
            ModifierName::Shortcut => event.shortcut = true,
        }
    }

    Ok(event)
}

/// Parse a complete bindings file
///
/// # Arguments
/// * `content` - The full bindings file content as a string
///
/// # Returns
/// All bindings in file order, or the first ParseError
///
/// # Example
/// ```
/// use keystroke_dispatch::core::parser::parse_bindings;
///
/// let content = "$mod = CTRL\nstroke = $mod+K, palette\ncombo = Shortcut+S, save\n";
/// let bindings = parse_bindings(content)?;
/// assert_eq!(bindings.len(), 2);
/// assert_eq!(bindings[0].action, "palette");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_bindings(content: &str) -> Result<Vec<Binding>, ParseError> {
    // First pass: Collect variable definitions
    let variables = collect_variables(content);

    // Second pass: Parse bindings with variable substitution
    let mut bindings = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;

        let line_trimmed = line.trim();
        if line_trimmed.is_empty()
            || line_trimmed.starts_with('#')
            || line_trimmed.starts_with('$')
        {
            continue;
        }

        let substituted = substitute_variables(line_trimmed, &variables);
        if let Some(variable) = undefined_variable(&substituted) {
            return Err(ParseError::UndefinedVariable {
                variable,
                line: line_num,
            });
        }

        let parsed = all_consuming(parse_binding_line).parse(substituted.as_str());
        let (kind, notation, action) = match parsed {
            Ok((_, parts)) => parts,
            Err(e) => {
                return Err(ParseError::InvalidSyntax {
                    line: line_num,
                    message: format!("{:?}", e),
                });
            }
        };

        let trigger = match kind {
            "stroke" => parse_key_stroke(notation).map(Trigger::Stroke),
            _ => parse_combination(notation).map(Trigger::Combination),
        }
        .map_err(|e| ParseError::InvalidSyntax {
            line: line_num,
            message: e.to_string(),
        })?;

        bindings.push(Binding {
            trigger,
            action: action.to_string(),
            line: line_num,
        });
    }

    Ok(bindings)
}

/// Parse a complete event script
///
/// Blank lines and `#` comments are skipped.
pub fn parse_script(content: &str) -> Result<Vec<ScriptStep>, ParseError> {
    let mut steps = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;

        let line_trimmed = line.trim();
        if line_trimmed.is_empty() || line_trimmed.starts_with('#') {
            continue;
        }

        let step = match all_consuming(parse_script_line).parse(line_trimmed) {
            Ok((_, (verb, notation))) => match verb {
                "down" => parse_event(notation).map(ScriptStep::Down),
                "up" => parse_event(notation).map(ScriptStep::Up),
                _ => Ok(ScriptStep::Reset),
            },
            Err(e) => {
                return Err(ParseError::InvalidSyntax {
                    line: line_num,
                    message: format!("{:?}", e),
                });
            }
        };

        steps.push(step.map_err(|e| ParseError::InvalidSyntax {
            line: line_num,
            message: e.to_string(),
        })?);
    }

    Ok(steps)
}

/// Collect variable definitions
///
/// Bindings files use variables like:
/// ```text
/// $mod = CTRL+SHIFT
/// ```
///
/// Returns a HashMap mapping variable names to their values
pub fn collect_variables(contents: &str) -> HashMap<String, String> {
    let mut variables = HashMap::new();

    for line in contents.lines() {
        let line_trimmed = line.trim();

        // Variable definition format: $name = value
        if let Some(definition) = line_trimmed.strip_prefix('$') {
            if let Some((name, value)) = definition.split_once('=') {
                variables.insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }

    variables
}

/// Substitute variables in a line
///
/// Replaces $name with its value. Longer names are substituted first so
/// `$mod` never clobbers the prefix of `$modShift`; names of equal length
/// go in name order.
///
/// Values may themselves reference variables (`$cd = $ab+SHIFT`), so passes
/// repeat until the line stops changing. A self-referencing definition
/// stops after one pass per variable.
pub fn substitute_variables(line: &str, variables: &HashMap<String, String>) -> String {
    let mut names: Vec<&String> = variables.keys().collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut result = line.to_string();
    for _ in 0..=variables.len() {
        let before = result.clone();
        for name in &names {
            let pattern = format!("${}", name);
            result = result.replace(&pattern, &variables[*name]);
        }
        if result == before {
            break;
        }
    }

    result
}

/// Parse a single binding line
///
/// Format: KIND = NOTATION, ACTION
/// Example: combo = Shortcut+S, save
///
/// Returns (kind, notation, action) or nom error
pub fn parse_binding_line(input: &str) -> IResult<&str, (&str, &str, &str)> {
    let (input, kind) = alt((tag("stroke"), tag("combo"))).parse(input)?;
    let (input, _) = (space0, char('='), space0).parse(input)?;
    let (input, notation) = take_until(",")(input)?;
    let (input, _) = (char(','), space0).parse(input)?;
    let (input, action) = parse_action_name(input)?;
    let (input, _) = space0(input)?;

    Ok((input, (kind, notation.trim(), action)))
}

/// Parse action name: letters, digits, `-`, `_`, `.`
pub fn parse_action_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')(input)
}

/// Parse a single script line
///
/// Formats: `down NOTATION`, `up NOTATION`, `reset`
pub fn parse_script_line(input: &str) -> IResult<&str, (&str, &str)> {
    alt((
        (alt((tag("down"), tag("up"))), space1, rest)
            .map(|(verb, _, notation): (&str, &str, &str)| (verb, notation.trim())),
        (tag("reset"), space0).map(|(verb, _): (&str, &str)| (verb, "")),
    ))
    .parse(input)
}

/// Split `A+B+C` into trimmed tokens
fn notation_tokens(input: &str) -> Result<Vec<&str>, ParseError> {
    let result: IResult<&str, Vec<&str>> = all_consuming(delimited(
        space0,
        separated_list1(
            char('+'),
            delimited(
                space0,
                take_while1(|c: char| c != '+' && c != ',' && !c.is_whitespace()),
                space0,
            ),
        ),
        space0,
    ))
    .parse(input);

    result
        .map(|(_, tokens)| tokens)
        .map_err(|_| ParseError::InvalidNotation(input.to_string()))
}

/// Last token is the key, the rest are modifiers
fn split_key<'a, 'b>(
    tokens: &'b [&'a str],
    input: &str,
) -> Result<(&'a str, &'b [&'a str]), ParseError> {
    tokens
        .split_last()
        .map(|(key, modifiers)| (*key, modifiers))
        .ok_or_else(|| ParseError::InvalidNotation(input.to_string()))
}

fn parse_modifier_name(name: &str) -> Result<ModifierName, ParseError> {
    match name.to_ascii_uppercase().as_str() {
        "SHIFT" => Ok(ModifierName::Shift),
        "CTRL" | "CONTROL" => Ok(ModifierName::Control),
        "ALT" | "OPTION" => Ok(ModifierName::Alt),
        "META" | "CMD" | "COMMAND" | "WIN" | "WINDOWS" | "SUPER" => Ok(ModifierName::Meta),
        "SHORTCUT" => Ok(ModifierName::Shortcut),
        _ => Err(ParseError::NotAModifier(name.to_string())),
    }
}

/// First `$name` reference left in `line`. A bare `$` is the dollar key.
fn undefined_variable(line: &str) -> Option<String> {
    line.match_indices('$')
        .map(|(start, _)| {
            line[start + 1..]
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>()
        })
        .find(|name| !name.is_empty())
}
