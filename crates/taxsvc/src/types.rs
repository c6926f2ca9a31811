//! Request value types handed to the adapter by the host application.
//!
//! Field names follow the remote service's camelCase wire format. Only the
//! fields the adapter or its callers reason about are typed; everything else a
//! host supplies is kept in an `extra` map and passed through unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::TaxError;

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// A host-supplied transaction description.
///
/// Deliberately permissive: every field is optional so that an empty `{}`
/// deserializes and is rejected by [`crate::normalize`] with a validation
/// error rather than by the JSON layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// The document to create or adjust.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_transaction_model: Option<CreateTransactionModel>,

    /// Any additional top-level keys (e.g. `adjustmentReason`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransactionRequest {
    /// Interprets an arbitrary JSON value as a transaction request.
    ///
    /// # Errors
    ///
    /// [`TaxError::Validation`] if `value` is not an object or a known field
    /// has the wrong shape (e.g. `lines` that is not an array).
    pub fn from_value(value: Value) -> Result<Self, TaxError> {
        if !value.is_object() {
            return Err(TaxError::validation("request must be a JSON object"));
        }
        serde_json::from_value(value)
            .map_err(|e| TaxError::validation(format!("malformed request: {e}")))
    }
}

/// The remote service's `CreateTransactionModel`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionModel {
    /// Unique document code. The remote service generates one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Document type, e.g. `"SalesOrder"` (estimate) or `"SalesInvoice"`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,

    /// Document date as the host wrote it: `YYYY-MM-DD` or a full
    /// timestamp. Parsed by the remote service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Whether the document is committed (finalized) when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<bool>,

    /// Ordered line items. Must be non-empty for tax to be computed; an
    /// explicit `null` reads as no lines.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub lines: Vec<LineItem>,

    /// Fields the adapter does not interpret (addresses, discount, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One line of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Line number, string or integer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<Value>,

    /// Product tax code. Its maximum length is enforced by the remote service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_code: Option<String>,

    /// Fields the adapter does not interpret (amount, quantity, itemCode, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<LineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<LineItem>>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// A postal address to be resolved by the remote service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State, province or region code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// ISO 3166 country code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}
