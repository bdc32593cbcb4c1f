/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Argument values and scopes.
//!
//! A [`Scope`] is the argument mapping visible to `arg`, `fileif` and
//! `generate_recursive` inside one expansion frame. Scopes never chain: a
//! nested inclusion sees only the dictionary passed at its call site.

use crate::error::ArgsError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt;

/// Largest level `generate_recursive` will build.
pub const MAX_PATTERN_LEVEL: u64 = 1000;

/// A value bound in an argument scope.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ArgValue {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    List(Vec<ArgValue>),
    Map(Vec<(String, ArgValue)>),
    #[default]
    None,
}

impl ArgValue {
    /// Whether this value passes a `fileif` gate.
    ///
    /// Zero, empty and `None` values are falsy. Any non-empty string is
    /// truthy, including `"false"`.
    pub fn is_truthy(&self) -> bool {
        match self {
            ArgValue::String(s) => !s.is_empty(),
            ArgValue::Bool(b) => *b,
            ArgValue::Int(i) => *i != 0,
            ArgValue::Float(f) => *f != 0.0,
            ArgValue::List(items) => !items.is_empty(),
            ArgValue::Map(entries) => !entries.is_empty(),
            ArgValue::None => false,
        }
    }

    /// Render the value as substitution text.
    ///
    /// Strings come out verbatim; everything else uses its repr form.
    pub fn render(&self) -> String {
        match self {
            ArgValue::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Interpret the value as a non-negative pattern level.
    pub fn as_level(&self) -> Result<u64, String> {
        let level = match self {
            ArgValue::Int(i) => *i,
            ArgValue::Bool(b) => i64::from(*b),
            ArgValue::Float(f) if f.is_finite() => f.trunc() as i64,
            ArgValue::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("invalid literal for level: '{}'", s))?,
            other => return Err(format!("cannot use {} as a level", other)),
        };
        if level < 0 {
            return Err(format!("level must be non-negative, got {}", level));
        }
        let level = level as u64;
        if level > MAX_PATTERN_LEVEL {
            return Err(format!(
                "level {} exceeds maximum of {}",
                level, MAX_PATTERN_LEVEL
            ));
        }
        Ok(level)
    }
}

/// Repr form, used for nested values and for non-string scalars.
impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::String(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
            ArgValue::Bool(true) => f.write_str("True"),
            ArgValue::Bool(false) => f.write_str("False"),
            ArgValue::Int(i) => write!(f, "{}", i),
            ArgValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            ArgValue::Float(x) => write!(f, "{}", x),
            ArgValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            ArgValue::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{}': {}", key, value)?;
                }
                f.write_str("}")
            }
            ArgValue::None => f.write_str("None"),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::String(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::String(s)
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

impl From<i64> for ArgValue {
    fn from(i: i64) -> Self {
        ArgValue::Int(i)
    }
}

impl From<serde_yaml::Value> for ArgValue {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => ArgValue::None,
            Value::Bool(b) => ArgValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ArgValue::Int(i),
                None => ArgValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ArgValue::String(s),
            Value::Sequence(items) => ArgValue::List(items.into_iter().map(Into::into).collect()),
            Value::Mapping(map) => ArgValue::Map(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), v.into()))
                    .collect(),
            ),
            Value::Tagged(tagged) => tagged.value.into(),
        }
    }
}

/// Mapping keys are always strings in a scope; scalar keys use their text.
fn yaml_key(key: serde_yaml::Value) -> String {
    match ArgValue::from(key) {
        ArgValue::String(s) => s,
        other => other.to_string(),
    }
}

/// The argument mapping of one expansion frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    values: HashMap<String, ArgValue>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ArgValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a binding in this scope only.
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.values.get(key)
    }

    /// Whether `key` is bound to a truthy value. Unbound keys are false.
    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(ArgValue::is_truthy)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all bindings, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ArgValue)> {
        self.values.iter()
    }

    /// Copy every binding of `other` into this scope, overriding on conflict.
    pub fn extend(&mut self, other: Scope) {
        self.values.extend(other.values);
    }

    /// Parse a YAML document whose top level is a mapping into a scope.
    ///
    /// `target` names the thing the arguments are for, for error messages.
    pub fn from_yaml(source: &str, target: &str) -> Result<Self, ArgsError> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(source).map_err(|e| ArgsError::Parse {
                target: target.to_string(),
                message: e.to_string(),
            })?;

        match ArgValue::from(value) {
            ArgValue::Map(entries) => Ok(entries.into_iter().collect()),
            _ => Err(ArgsError::NotAMapping {
                target: target.to_string(),
            }),
        }
    }
}

impl<K: Into<String>, V: Into<ArgValue>> FromIterator<(K, V)> for Scope {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut scope = Scope::new();
        for (key, value) in iter {
            scope.insert(key, value);
        }
        scope
    }
}

/// Quoted strings, or a bare `None` outside of them.
static NONE_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|\bNone\b"#).unwrap()
});

/// Parse the structured-argument literal of a `file`/`fileif` directive.
///
/// The literal is read as a YAML flow mapping, which covers dictionary
/// literals such as `{'name': 'x', "n": 2, flag: True}`. A bare `None`
/// becomes [`ArgValue::None`]; a quoted `'None'` stays a string.
pub fn parse_arg_dict(literal: &str, target: &str) -> Result<Scope, ArgsError> {
    let literal = NONE_TOKEN_RE.replace_all(literal, |caps: &Captures<'_>| {
        if &caps[0] == "None" {
            "null".to_string()
        } else {
            caps[0].to_string()
        }
    });
    Scope::from_yaml(&literal, target)
}
