//! Stateless checks comparing an observed response to expectations.
//!
//! Every check produces a [`Verdict`] with a message on both success and
//! failure so the result log doubles as an audit trail.

use crate::client::ApiResponse;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    pub message: String,
}

impl Verdict {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Evaluate `next` only if this verdict passed
    pub fn and_then(self, next: impl FnOnce() -> Verdict) -> Verdict {
        if self.passed {
            next()
        } else {
            self
        }
    }
}

pub fn assert_status(response: &ApiResponse, expected: u16) -> Verdict {
    let actual = response.status;
    let message = format!("Expected status {}, got {}", expected, actual);
    if actual == expected {
        Verdict::pass(message)
    } else {
        Verdict::fail(message)
    }
}

/// Check that `json` has `key`, optionally with `expected` as value.
/// A missing body or a non-object counts as key not found.
pub fn assert_json_key(json: Option<&Value>, key: &str, expected: Option<&Value>) -> Verdict {
    let Some(actual) = json.and_then(|j| j.as_object()).and_then(|o| o.get(key)) else {
        return Verdict::fail(format!("Expected key '{}' not found in response", key));
    };

    match expected {
        Some(expected) if actual != expected => Verdict::fail(format!(
            "Expected '{}' to be '{}', got '{}'",
            key,
            display_value(expected),
            display_value(actual)
        )),
        Some(expected) => Verdict::pass(format!(
            "Found key '{}' with value '{}'",
            key,
            display_value(expected)
        )),
        None => Verdict::pass(format!("Found key '{}'", key)),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
