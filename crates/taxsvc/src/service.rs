//! Port trait for the remote tax service.
//!
//! Infrastructure crates implement [`RemoteTaxService`]; the adapter in
//! [`crate::adapter`] sees nothing else. Tests substitute an in-memory double.

use async_trait::async_trait;
use serde_json::Value;

use crate::{Address, NormalizedRequest, TaxError, TransactionCode};

/// The four remote operations the adapter depends on.
///
/// Every method returns the remote's response body as JSON on success.
/// Implementations map their failures onto [`TaxError`]:
///
/// - the remote processed and rejected the call → [`TaxError::RemoteRejection`]
/// - anything else (transport, unparseable response) → [`TaxError::Unexpected`]
#[async_trait]
pub trait RemoteTaxService: Send + Sync {
    /// Creates a transaction, or adjusts it if one with the same code exists.
    async fn create_or_adjust_transaction(
        &self,
        request: &NormalizedRequest,
    ) -> Result<Value, TaxError>;

    /// Voids (cancels) the transaction `code` recorded under the company the
    /// implementation is configured for.
    async fn void_transaction(&self, code: &TransactionCode) -> Result<Value, TaxError>;

    /// Resolves and validates a postal address.
    async fn resolve_address(&self, address: &Address) -> Result<Value, TaxError>;

    /// Liveness and credential check.
    async fn ping(&self) -> Result<Value, TaxError>;
}
