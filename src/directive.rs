//! Directive micro-grammar
//!
//! A directive is a cleaned comment line of the form
//! `@command key="value" key2='value' key3=bare flag`. Parsing is lenient:
//! malformed quoting never fails, the stray quote simply stays in the value.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// `@` + command token, then optional whitespace-separated arguments.
static DIRECTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@([\w:-]+)(?:\s+(.*))?$").expect("DIRECTIVE_PATTERN regex is invalid")
});

/// `key`, `key="v"`, `key='v'` or `key=bare`.
static ARG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w-]+)(?:=(?:"([^"]*)"|'([^']*)'|(\S+)))?"#)
        .expect("ARG_PATTERN regex is invalid")
});

/// A coerced argument value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    String(String),
    Bool(bool),
    Number(f64),
}

impl ArgValue {
    /// Apply the coercion rules to a raw value (`None` for a bare flag).
    pub fn coerce(raw: Option<&str>) -> Self {
        match raw {
            None => ArgValue::Bool(true),
            Some("true") => ArgValue::Bool(true),
            Some("false") => ArgValue::Bool(false),
            Some(value) => match parse_number(value) {
                Some(n) => ArgValue::Number(n),
                None => ArgValue::String(value.to_string()),
            },
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// JSON form used when decoding into a handler's argument shape.
    ///
    /// Integral numbers become JSON integers so they decode into integer
    /// fields.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ArgValue::String(s) => serde_json::Value::String(s.clone()),
            ArgValue::Bool(b) => serde_json::Value::Bool(*b),
            ArgValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    serde_json::Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::String(s) => f.write_str(s),
            ArgValue::Bool(b) => write!(f, "{}", b),
            ArgValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::String(s.to_string())
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

impl From<f64> for ArgValue {
    fn from(n: f64) -> Self {
        ArgValue::Number(n)
    }
}

/// Parsed arguments keyed by name. Later duplicates overwrite earlier ones.
pub type ArgMap = BTreeMap<String, ArgValue>;

/// Convert an argument map into a JSON object.
pub fn args_to_json(args: &ArgMap) -> serde_json::Value {
    serde_json::Value::Object(
        args.iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

/// One parsed directive line.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveLine {
    pub command: String,
    pub raw_arguments: String,
    pub arguments: ArgMap,
}

/// Parse a comment-stripped line into a directive.
///
/// Returns `None` when the line does not start with `@` or the command
/// token is malformed (e.g. `@#command`).
pub fn parse_directive_line(line: &str) -> Option<DirectiveLine> {
    let trimmed = line.trim();
    if !trimmed.starts_with('@') {
        return None;
    }

    let caps = DIRECTIVE_PATTERN.captures(trimmed)?;
    let command = caps.get(1)?.as_str();
    let raw_arguments = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    Some(DirectiveLine {
        command: command.to_string(),
        raw_arguments: raw_arguments.to_string(),
        arguments: parse_args(raw_arguments),
    })
}

/// Parse a raw argument string into coerced key/value pairs.
pub fn parse_args(input: &str) -> ArgMap {
    let mut args = ArgMap::new();
    for caps in ARG_PATTERN.captures_iter(input) {
        let Some(key) = caps.get(1) else { continue };
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str());
        args.insert(key.as_str().to_string(), ArgValue::coerce(value));
    }
    args
}

/// Parse a value that is entirely a finite number.
///
/// Accepts decimal integers and floats with optional sign and exponent, and
/// `0x`/`0o`/`0b` integer literals. Infinity and NaN spellings are rejected.
fn parse_number(value: &str) -> Option<f64> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }

    let radix = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .iter()
        .find_map(|(prefix, radix)| s.strip_prefix(prefix).map(|digits| (digits, *radix)));
    if let Some((digits, radix)) = radix {
        return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
    }

    let looks_numeric = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !looks_numeric {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}
