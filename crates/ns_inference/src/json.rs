//! Recovery of JSON payloads from free-form model replies.
//!
//! Models wrap their JSON in prose, code fences or reasoning blocks. The reply is parsed
//! directly first; failing that, the span between the first opening and the last closing
//! delimiter of the expected shape is parsed instead.

use std::fmt;
use serde_json::Value;
use ns_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Array,
    Object,
}

impl JsonShape {
    fn delimiters(self) -> (char, char) {
        match self {
            JsonShape::Array => ('[', ']'),
            JsonShape::Object => ('{', '}'),
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            JsonShape::Array => value.is_array(),
            JsonShape::Object => value.is_object(),
        }
    }
}

impl fmt::Display for JsonShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonShape::Array => write!(f, "array"),
            JsonShape::Object => write!(f, "object"),
        }
    }
}

/// Removes `<think>...</think>` blocks emitted by reasoning models.
pub fn strip_reasoning(text: &str) -> String {
    let mut clean = text.to_string();
    while let Some(start) = clean.find("<think>") {
        match clean[start..].find("</think>") {
            Some(offset) => clean.replace_range(start..start + offset + "</think>".len(), ""),
            None => break,
        }
    }
    clean
}

pub fn extract_json(text: &str, shape: JsonShape) -> Result<Value> {
    let cleaned = strip_reasoning(text);
    let trimmed = cleaned.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if shape.matches(&value) {
            return Ok(value);
        }
    }

    let (open, close) = shape.delimiters();
    if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
        if end > start {
            match serde_json::from_str::<Value>(&trimmed[start..=end]) {
                Ok(value) if shape.matches(&value) => return Ok(value),
                Ok(_) => {}
                Err(e) => {
                    return Err(Error::parse(format!("Invalid JSON {} in response: {}", shape, e), text))
                }
            }
        }
    }

    Err(Error::parse(format!("Could not extract a JSON {} from response", shape), text))
}

/// Reads a whole-number score, tolerating `8`, `8.0` and `"8"`.
pub fn integer_score(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a fractional score that may arrive as `4.2` or `"4.2"`.
pub fn decimal_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|f: &f64| f.is_finite())
}
