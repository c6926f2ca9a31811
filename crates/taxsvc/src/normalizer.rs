//! Structural validation of transaction requests before any remote call.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::{CreateTransactionModel, TransactionRequest};
use crate::TaxError;

/// Message of the validation error for a request without line items.
pub const LINES_REQUIRED: &str = "lines required";

/// A [`TransactionRequest`] known to have a model with at least one line.
///
/// Only [`normalize`] constructs one. Serializes to the same JSON as the
/// request it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRequest {
    #[serde(rename = "createTransactionModel")]
    model: CreateTransactionModel,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl NormalizedRequest {
    /// The validated transaction model.
    pub fn model(&self) -> &CreateTransactionModel {
        &self.model
    }

    /// Converts back into the permissive request type.
    pub fn into_request(self) -> TransactionRequest {
        TransactionRequest {
            create_transaction_model: Some(self.model),
            extra: self.extra,
        }
    }
}

/// Checks that `raw` carries a transaction model with at least one line.
///
/// Only presence is checked. Content limits such as the maximum `taxCode`
/// length are the remote service's to enforce.
///
/// # Errors
///
/// [`TaxError::Validation`] with [`LINES_REQUIRED`] when the model is absent
/// or its `lines` are absent or empty.
pub fn normalize(raw: &TransactionRequest) -> Result<NormalizedRequest, TaxError> {
    match &raw.create_transaction_model {
        Some(model) if !model.lines.is_empty() => Ok(NormalizedRequest {
            model: model.clone(),
            extra: raw.extra.clone(),
        }),
        _ => Err(TaxError::validation(LINES_REQUIRED)),
    }
}
