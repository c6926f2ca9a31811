//! The uniform result value returned by every adapter operation.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Key under which an error-shaped result carries its description.
pub const ERROR_KEY: &str = "error";

/// Outcome of a single adapter operation: exactly one of a success payload or
/// an error payload.
///
/// A success payload is the remote service's response object. An error
/// payload is always an object whose only key is [`ERROR_KEY`], so callers can
/// branch on [`TaxResult::is_success`] instead of handling errors.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxResult {
    outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Success(Map<String, Value>),
    Error(Map<String, Value>),
}

impl TaxResult {
    /// Classifies a raw remote response.
    ///
    /// An object containing an `error` key is error-shaped (reduced to that
    /// key alone); any other object is a success. A response that is not an
    /// object at all is reported as an error.
    pub fn from_response(raw: Value) -> Self {
        match raw {
            Value::Object(mut map) => match map.remove(ERROR_KEY) {
                Some(error) => Self::error(error),
                None => Self::success(map),
            },
            other => Self::error(format!("unexpected response shape: {other}")),
        }
    }

    /// A success result carrying `payload`.
    pub fn success(payload: Map<String, Value>) -> Self {
        Self {
            outcome: Outcome::Success(payload),
        }
    }

    /// An error result whose payload is `{"error": description}`.
    pub fn error(description: impl Into<Value>) -> Self {
        let mut payload = Map::with_capacity(1);
        payload.insert(ERROR_KEY.to_owned(), description.into());
        Self {
            outcome: Outcome::Error(payload),
        }
    }

    /// Whether this result carries a success payload.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// Whether this result carries an `{"error": ...}` payload.
    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// The payload, success- or error-shaped.
    pub fn tax_result(&self) -> &Map<String, Value> {
        match &self.outcome {
            Outcome::Success(map) | Outcome::Error(map) => map,
        }
    }

    /// Consumes the result, returning its payload.
    pub fn into_payload(self) -> Map<String, Value> {
        match self.outcome {
            Outcome::Success(map) | Outcome::Error(map) => map,
        }
    }

    /// `totalTax` of a successful transaction response.
    pub fn total_tax(&self) -> Option<f64> {
        self.success_field("totalTax").and_then(Value::as_f64)
    }

    /// `status` of a successful response (e.g. `"Committed"`, `"Cancelled"`).
    pub fn status(&self) -> Option<&str> {
        self.success_field("status").and_then(Value::as_str)
    }

    /// Human-readable error description, if this result is error-shaped.
    ///
    /// Prefers the remote's `error.message`; falls back to the error value
    /// itself when it is a plain string, or its JSON text otherwise.
    pub fn error_message(&self) -> Option<String> {
        let Outcome::Error(map) = &self.outcome else {
            return None;
        };
        let error = map.get(ERROR_KEY)?;
        Some(match error {
            Value::String(s) => s.clone(),
            Value::Object(obj) => match obj.get("message").and_then(Value::as_str) {
                Some(message) => message.to_owned(),
                None => error.to_string(),
            },
            other => other.to_string(),
        })
    }

    fn success_field(&self, key: &str) -> Option<&Value> {
        match &self.outcome {
            Outcome::Success(map) => map.get(key),
            Outcome::Error(_) => None,
        }
    }
}

impl Serialize for TaxResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.tax_result().serialize(serializer)
    }
}
