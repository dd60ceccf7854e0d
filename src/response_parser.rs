//! Recovers structured payloads from free-form completion text.
//!
//! Three phases, always in this order: extract the outermost JSON span from
//! the text, parse it, then coerce it field by field into the target entity.
//! Coercion never fails; missing or mistyped fields fall back to defaults.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use tracing::debug;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json|JSON)?\s*").expect("Valid regex pattern"));

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Object,
    Array,
}

impl Shape {
    fn delimiters(self) -> (char, char) {
        match self {
            Shape::Object => ('{', '}'),
            Shape::Array => ('[', ']'),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Object => write!(f, "object"),
            Shape::Array => write!(f, "array"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON {shape} found in generated text")]
    NoStructuredPayload { shape: Shape },

    #[error("generated text holds invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// An entity that can be built from any JSON value, defaulting what is missing.
pub trait Coerce: Sized {
    /// Request-scoped defaults (e.g. the requested serving count).
    type Context;

    fn coerce(value: &Value, ctx: &Self::Context) -> Self;
}

pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw, "").trim().to_string()
}

/// Greedy outermost match: first opening delimiter to the last closing one.
pub fn extract_span(text: &str, shape: Shape) -> Option<&str> {
    let (open, close) = shape.delimiters();
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

pub fn parse_payload(raw: &str, shape: Shape) -> Result<Value, ParseError> {
    let clean = strip_code_fences(raw);
    let span = extract_span(&clean, shape).ok_or(ParseError::NoStructuredPayload { shape })?;
    let value: Value = serde_json::from_str(span)?;
    Ok(value)
}

pub fn parse_object<T: Coerce>(raw: &str, ctx: &T::Context) -> Result<T, ParseError> {
    let value = parse_payload(raw, Shape::Object)?;
    Ok(T::coerce(&value, ctx))
}

/// Non-object elements are dropped; every object element is coerced.
pub fn parse_array<T: Coerce>(raw: &str, ctx: &T::Context) -> Result<Vec<T>, ParseError> {
    let value = parse_payload(raw, Shape::Array)?;
    let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
    Ok(items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| T::coerce(item, ctx))
        .collect())
}

/// parseInt-style: numbers truncate, strings use their leading integer ("25 min" is 25).
pub fn lenient_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            let digits_end = s
                .char_indices()
                .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
                .map(|(i, _)| i)
                .unwrap_or(s.len());
            s[..digits_end].parse().ok()
        }
        _ => None,
    }
}

/// Leading decimal of a number or string ("45mg" is 45.0).
pub fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => {
            let s = s.trim();
            let end = s
                .char_indices()
                .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
                .map(|(i, _)| i)
                .unwrap_or(s.len());
            s[..end].parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Read-only view over one JSON object, logging every default it substitutes.
#[derive(Clone, Copy)]
pub struct Fields<'a> {
    entity: &'static str,
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Fields<'a> {
    pub fn new(entity: &'static str, value: &'a Value) -> Self {
        Self {
            entity,
            map: value.as_object(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.and_then(|m| m.get(key))
    }

    fn defaulted(&self, key: &str) {
        debug!(entity = self.entity, field = key, "field defaulted");
    }

    /// Non-blank string, else `default`.
    pub fn string(&self, key: &str, default: &str) -> String {
        match self.opt_string(key) {
            Some(s) => s,
            None => {
                self.defaulted(key);
                default.to_string()
            }
        }
    }

    pub fn opt_string(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Strictly positive integer, else `default`.
    pub fn positive_int(&self, key: &str, default: u32) -> u32 {
        match self.get(key).and_then(lenient_int) {
            Some(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
            _ => {
                self.defaulted(key);
                default
            }
        }
    }

    /// Non-negative integer, else `default`.
    pub fn count(&self, key: &str, default: u32) -> u32 {
        match self.get(key).and_then(lenient_int) {
            Some(n) if n >= 0 => u32::try_from(n).unwrap_or(u32::MAX),
            _ => {
                self.defaulted(key);
                default
            }
        }
    }

    pub fn number(&self, key: &str, default: f64) -> f64 {
        match self.get(key).and_then(lenient_number) {
            Some(n) => n,
            None => {
                self.defaulted(key);
                default
            }
        }
    }

    pub fn boolean(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
            _ => {
                self.defaulted(key);
                default
            }
        }
    }

    /// String elements of an array; anything else becomes an empty list.
    pub fn strings(&self, key: &str) -> Vec<String> {
        match self.get(key).and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => {
                self.defaulted(key);
                Vec::new()
            }
        }
    }

    /// Object elements of an array.
    pub fn objects(&self, key: &str) -> Vec<&'a Value> {
        match self.get(key).and_then(Value::as_array) {
            Some(items) => items.iter().filter(|v| v.is_object()).collect(),
            None => {
                self.defaulted(key);
                Vec::new()
            }
        }
    }

    /// Nested object view; a missing or non-object field yields an empty view.
    pub fn nested(&self, key: &str, entity: &'static str) -> Fields<'a> {
        let value = self.get(key).unwrap_or(&NULL);
        if !value.is_object() {
            self.defaulted(key);
        }
        Fields::new(entity, value)
    }
}
