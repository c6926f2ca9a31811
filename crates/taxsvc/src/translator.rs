//! The single place where failures become results (or stay errors).

use crate::{TaxError, TaxResult};

/// Turns a failed operation into its reported outcome.
///
/// - Contract violations are always returned as `Err`.
/// - With `raise_exceptions` set, every other error is returned as `Err` too.
/// - Otherwise the error is folded into `{"error": ...}`.
///
/// `operation` names the caller in the emitted log event.
pub fn translate(
    operation: &'static str,
    error: TaxError,
    raise_exceptions: bool,
) -> Result<TaxResult, TaxError> {
    match &error {
        TaxError::ContractViolation { argument, .. } => {
            tracing::error!(operation, argument, "contract violation: {error}");
            return Err(error);
        }
        TaxError::Validation { message } => {
            tracing::warn!(operation, %message, "request failed validation");
        }
        TaxError::RemoteRejection { status, body, .. } => {
            tracing::error!(operation, status, %body, "remote service rejected request");
        }
        TaxError::Unexpected { message, transient } => {
            tracing::error!(operation, transient, %message, "remote call failed");
        }
    }

    if raise_exceptions {
        Err(error)
    } else {
        Ok(TaxResult::error(error.to_error_value()))
    }
}
