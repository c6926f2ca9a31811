//! Error and retry-policy types for the tax service adapter.
//!
//! [`TaxError`] is the one error type that crosses the [`crate::RemoteTaxService`]
//! port. Transport crates map their own failures onto it; the adapter then
//! decides, per variant and per configuration, whether the failure is raised or
//! folded into an error-shaped [`crate::TaxResult`].
//!
//! [`RetryPolicy`] lets a caller that does receive an error decide whether to
//! try again without inspecting transport details.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// - `Retryable` errors: connection failures, timeouts, remote 429 and 503.
/// - `NonRetryable` errors: contract violations, local validation failures,
///   business-rule rejections by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt, taken from the remote's
        /// `Retry-After` header when present. `None` means apply the caller's
        /// own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried without changing its input.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Adapter errors
// ---------------------------------------------------------------------------

/// Every failure the adapter can observe.
///
/// Only [`TaxError::ContractViolation`] is unconditionally returned to the
/// caller. The remaining variants go through the error translator and become
/// `{"error": ...}` results unless `raise_exceptions` is enabled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaxError {
    /// The caller passed an argument the operation cannot work with.
    ///
    /// Signals misuse of the API, not a remote failure; never swallowed.
    #[error("{argument} is required: {message}")]
    ContractViolation {
        /// Name of the offending argument (e.g. `"transaction_code"`).
        argument: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// The request failed local structural checks; nothing was sent.
    #[error("{message}")]
    Validation {
        /// Human-readable reason (e.g. `"lines required"`).
        message: String,
    },

    /// The remote service processed the call and rejected it.
    ///
    /// `body` is the response body exactly as the remote returned it,
    /// normally `{"error": {"code": ..., "message": ..., ...}}`.
    #[error("remote service rejected the request with status {status}")]
    RemoteRejection {
        /// HTTP status code of the rejection.
        status: u16,
        /// Parsed response body.
        body: Value,
        /// Back-off requested by the remote via `Retry-After`.
        retry_after: Option<Duration>,
    },

    /// Any other failure during a remote call: transport errors, unexpected
    /// response shapes, a client that could not be constructed.
    #[error("{message}")]
    Unexpected {
        /// Description of the failure.
        message: String,
        /// `true` when the failure is likely to clear on its own (timeouts,
        /// refused connections).
        transient: bool,
    },
}

impl TaxError {
    /// Shorthand for a [`TaxError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a non-transient [`TaxError::Unexpected`].
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
            transient: false,
        }
    }

    /// Returns `true` for errors that are always raised regardless of
    /// configuration.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }

    /// Whether the failed operation may be retried unchanged.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Unexpected {
                transient: true, ..
            } => RetryPolicy::Retryable { after: None },
            Self::RemoteRejection {
                status: 429 | 503,
                retry_after,
                ..
            } => RetryPolicy::Retryable {
                after: *retry_after,
            },
            _ => RetryPolicy::NonRetryable,
        }
    }

    /// The value placed under the `error` key of an error-shaped result.
    ///
    /// Remote rejections contribute the remote's own `error` object so callers
    /// see the vendor's code and message; everything else is the display text.
    pub fn to_error_value(&self) -> Value {
        match self {
            Self::RemoteRejection { body, .. } => match body.get("error") {
                Some(inner) => inner.clone(),
                None => body.clone(),
            },
            other => Value::String(other.to_string()),
        }
    }
}
