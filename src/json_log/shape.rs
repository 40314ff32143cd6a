//! Recognized JSON document shapes and the log records extracted from them.

use super::level::LogLevel;
use serde_json::{Map, Value};

/// A JSON document classified by the keys and structure it carries.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonShape<'a> {
    /// Falsy document: `null`, `false`, `0`, `""`, `[]` or `{}`.
    Empty,
    /// `{"messages": [{"message": ..., "level": ...}, ...]}`
    Messages(&'a [Value]),
    /// `{"logs": [{"text": ..., "severity": ...}, ...]}`
    Logs(&'a [Value]),
    /// `{"message": ..., "level": ..., <context>...}`
    Single(&'a Map<String, Value>),
    /// `[{"message": ...}, ...]`
    List(&'a [Value]),
    /// Any other object; every key is logged.
    Opaque(&'a Map<String, Value>),
    /// Non-empty string, number or `true` at the top level.
    Scalar(&'a Value),
}

/// One line to log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub message: String,
    pub level: LogLevel,
    pub context: Vec<(String, String)>,
}

impl LogRecord {
    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            message: message.into(),
            level,
            context: Vec::new(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, LogLevel::Info)
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// Message followed by a ` [k=v, ...]` context suffix when present.
    pub fn render(&self) -> String {
        if self.context.is_empty() {
            return self.message.clone();
        }
        let parts: Vec<String> = self
            .context
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("{} [{}]", self.message, parts.join(", "))
    }
}

pub fn classify(value: &Value) -> JsonShape<'_> {
    if !is_truthy(value) {
        return JsonShape::Empty;
    }

    match value {
        Value::Object(map) => {
            if let Some(messages) = map.get("messages") {
                match messages.as_array() {
                    Some(entries) => JsonShape::Messages(entries),
                    None => JsonShape::Opaque(map),
                }
            } else if let Some(logs) = map.get("logs") {
                match logs.as_array() {
                    Some(entries) => JsonShape::Logs(entries),
                    None => JsonShape::Opaque(map),
                }
            } else if map.contains_key("message") {
                JsonShape::Single(map)
            } else {
                JsonShape::Opaque(map)
            }
        }
        Value::Array(items) => JsonShape::List(items),
        other => JsonShape::Scalar(other),
    }
}

pub fn extract(shape: &JsonShape<'_>) -> Vec<LogRecord> {
    match shape {
        JsonShape::Empty => vec![LogRecord::new(
            "Empty JSON data provided",
            LogLevel::Warning,
        )],
        JsonShape::Messages(entries) => entries
            .iter()
            .enumerate()
            .map(|(i, entry)| match entry.as_object() {
                Some(obj) => entry_record(obj, ["message", "text"], ["level", "severity"], || {
                    format!("Message {}", i + 1)
                }),
                None => LogRecord::info(format!("Message {}: {}", i + 1, render_value(entry))),
            })
            .collect(),
        JsonShape::Logs(entries) => entries
            .iter()
            .enumerate()
            .map(|(i, entry)| match entry.as_object() {
                Some(obj) => entry_record(obj, ["text", "message"], ["severity", "level"], || {
                    format!("Log {}", i + 1)
                }),
                None => LogRecord::info(format!("Log {}: {}", i + 1, render_value(entry))),
            })
            .collect(),
        JsonShape::Single(obj) => vec![single_record(obj)],
        JsonShape::List(items) => items
            .iter()
            .map(|item| match item.as_object() {
                Some(obj) => single_record(obj),
                None => LogRecord::info(format!("Array item: {}", render_value(item))),
            })
            .collect(),
        JsonShape::Opaque(map) => map
            .iter()
            .map(|(key, value)| {
                let rendered = match value {
                    Value::Object(_) | Value::Array(_) => serde_json::to_string_pretty(value)
                        .unwrap_or_else(|_| value.to_string()),
                    other => render_value(other),
                };
                LogRecord::info(format!("{}: {}", key, rendered))
            })
            .collect(),
        JsonShape::Scalar(value) => {
            vec![LogRecord::info(format!("JSON content: {}", render_value(value)))]
        }
    }
}

/// Classify a document and extract its records in one step.
pub fn records_from_value(value: &Value) -> Vec<LogRecord> {
    extract(&classify(value))
}

/// Record for an entry of a `messages` or `logs` wrapper.
fn entry_record<F>(
    obj: &Map<String, Value>,
    message_keys: [&str; 2],
    level_keys: [&str; 2],
    fallback: F,
) -> LogRecord
where
    F: FnOnce() -> String,
{
    let message = first_present(obj, message_keys)
        .map(render_value)
        .unwrap_or_else(fallback);
    let level = LogLevel::from_value(first_present(obj, level_keys));

    let record = LogRecord::new(message, level);
    match first_present(obj, ["timestamp", "time"]).filter(|ts| is_truthy(ts)) {
        Some(ts) => record.with_context("timestamp", render_value(ts)),
        None => record,
    }
}

fn single_record(obj: &Map<String, Value>) -> LogRecord {
    let message = first_present(obj, ["message", "text"])
        .map(render_value)
        .unwrap_or_else(|| "No message content".to_string());
    let level = LogLevel::from_value(first_present(obj, ["level", "severity"]));

    obj.iter()
        .filter(|(key, _)| !matches!(key.as_str(), "message" | "text" | "level" | "severity"))
        .fold(LogRecord::new(message, level), |record, (key, value)| {
            record.with_context(key.as_str(), render_value(value))
        })
}

/// Value of the first key that is present, even if it is `null`.
fn first_present<'a>(obj: &'a Map<String, Value>, keys: [&str; 2]) -> Option<&'a Value> {
    keys.iter().find_map(|key| obj.get(*key))
}

/// Strings print bare; everything else as compact JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
