//! Field-level error collection
//!
//! Validation failures come from two places: `validator` checks run on the
//! client before a request, and 4xx bodies returned by the backend. Both are
//! normalized into [`FieldErrors`] so callers can show a message next to the
//! offending field or fall back to a single summary line.
//!
//! # Backend body shapes
//!
//! ```json
//! {"error": "Username already exists"}
//! {"detail": "You don't have permission to edit this task."}
//! {"assignee_email": ["User with this email does not exist."]}
//! "plain string body"
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// Keys whose value is a message about the whole request
const NON_FIELD_KEYS: [&str; 4] = ["error", "detail", "message", "non_field_errors"];

/// Validation errors keyed by field name, plus an optional general message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    /// Message not tied to a field
    pub message: Option<String>,

    /// Messages per field
    pub fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection holding only a general message
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            fields: BTreeMap::new(),
        }
    }

    /// Adds a message for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }

    /// Returns true when there is neither a general message nor a field message
    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.fields.values().all(Vec::is_empty)
    }

    /// Messages recorded for a field
    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parses a backend error body
    ///
    /// The first `error`/`detail`/`message`/`non_field_errors` entry becomes
    /// the general message. Every other key is treated as a field whose value
    /// is a string or a list of strings.
    pub fn from_body(body: &JsonValue) -> Self {
        let mut errors = FieldErrors::new();

        match body {
            JsonValue::String(s) if !s.trim().is_empty() => {
                errors.message = Some(s.clone());
            }
            JsonValue::Object(map) => {
                for key in NON_FIELD_KEYS {
                    if errors.message.is_some() {
                        break;
                    }
                    if let Some(value) = map.get(key) {
                        errors.message = messages_of(value).into_iter().next();
                    }
                }

                for (key, value) in map {
                    if NON_FIELD_KEYS.contains(&key.as_str()) {
                        continue;
                    }
                    for message in messages_of(value) {
                        errors.add(key.clone(), message);
                    }
                }
            }
            JsonValue::Array(items) => {
                errors.message = items.iter().flat_map(messages_of).next();
            }
            _ => {}
        }

        errors
    }

    /// General message, else the first field message, without the field name
    pub fn first_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or_else(|| self.fields.values().flatten().next().map(String::as_str))
    }

    /// Single-line summary suitable for a notification
    ///
    /// Prefers the general message, then the first field message formatted
    /// as `field: message`.
    pub fn summary(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }

        self.fields
            .iter()
            .find_map(|(field, messages)| {
                messages.first().map(|m| format!("{}: {}", field, m))
            })
            .unwrap_or_else(|| "Request failed".to_string())
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut result = FieldErrors::new();

        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string());
                result.add(field.to_string(), message);
            }
        }

        result
    }
}

fn messages_of(value: &JsonValue) -> Vec<String> {
    match value {
        JsonValue::String(s) => vec![s.clone()],
        JsonValue::Array(items) => items.iter().flat_map(messages_of).collect(),
        JsonValue::Null => Vec::new(),
        JsonValue::Object(map) => map.values().flat_map(messages_of).collect(),
        other => vec![other.to_string()],
    }
}
