//! The four public operations of the tax service adapter.

use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;

use crate::normalizer::normalize;
use crate::provider::ClientProvider;
use crate::translator::translate;
use crate::{
    Address, RemoteTaxService, TaxError, TaxResult, TaxSvcConfig, TransactionCode,
    TransactionRequest,
};

/// Shared handle to a remote tax service implementation.
pub type SharedTaxService = Arc<dyn RemoteTaxService>;

/// Adapter between a host application and a remote tax service.
///
/// Every operation follows the same path: check input, call the remote
/// service through the lazily built client, then report the outcome as a
/// [`TaxResult`]. Failures become error-shaped results unless
/// [`TaxSvcConfig::raise_exceptions`] is set; contract violations are always
/// returned as `Err`.
#[derive(Debug)]
pub struct TaxSvc {
    config: Arc<TaxSvcConfig>,
    provider: ClientProvider<SharedTaxService>,
}

impl TaxSvc {
    /// Creates an adapter whose remote client is built by `factory` on first
    /// use.
    pub fn new<F>(config: Arc<TaxSvcConfig>, factory: F) -> Self
    where
        F: Fn() -> Result<SharedTaxService, TaxError> + Send + Sync + 'static,
    {
        Self {
            config,
            provider: ClientProvider::new(factory),
        }
    }

    /// Creates an adapter around an already constructed service.
    pub fn with_service(config: Arc<TaxSvcConfig>, service: SharedTaxService) -> Self {
        Self {
            config,
            provider: ClientProvider::ready(service),
        }
    }

    /// The switches this adapter reads on every call.
    pub fn config(&self) -> &Arc<TaxSvcConfig> {
        &self.config
    }

    /// Computes (and, if the request says so, commits) tax for a transaction.
    ///
    /// A request without line items is answered with
    /// `{"error": "lines required"}` and never reaches the remote service.
    ///
    /// # Errors
    ///
    /// Only when `raise_exceptions` is set.
    pub async fn get_tax(&self, request: &TransactionRequest) -> Result<TaxResult, TaxError> {
        const OP: &str = "get_tax";
        let code = request
            .create_transaction_model
            .as_ref()
            .and_then(|m| m.code.clone())
            .unwrap_or_default();
        let span = tracing::info_span!("tax.get_tax", code = %code);

        async {
            let normalized = match normalize(request) {
                Ok(normalized) => normalized,
                Err(e) => return translate(OP, e, self.config.raise_exceptions()),
            };
            self.log_payload(OP, "request", || serde_json::to_value(&normalized));

            let outcome = match self.provider.client() {
                Ok(client) => client.create_or_adjust_transaction(&normalized).await,
                Err(e) => Err(e),
            };
            self.finish(OP, outcome)
        }
        .instrument(span)
        .await
    }

    /// Like [`TaxSvc::get_tax`], for a request still in its raw JSON form.
    ///
    /// A value that is not a well-shaped request is reported the same way as
    /// a request without lines: `{"error": ...}` unless `raise_exceptions`
    /// is set.
    ///
    /// # Errors
    ///
    /// Only when `raise_exceptions` is set.
    pub async fn get_tax_value(&self, request: Value) -> Result<TaxResult, TaxError> {
        match TransactionRequest::from_value(request) {
            Ok(request) => self.get_tax(&request).await,
            Err(e) => translate("get_tax", e, self.config.raise_exceptions()),
        }
    }

    /// Voids a previously recorded transaction.
    ///
    /// # Errors
    ///
    /// [`TaxError::ContractViolation`] when `transaction_code` is `None` or
    /// blank, regardless of configuration. Other errors only when
    /// `raise_exceptions` is set.
    pub async fn cancel_tax(&self, transaction_code: Option<&str>) -> Result<TaxResult, TaxError> {
        const OP: &str = "cancel_tax";
        let Some(code) = transaction_code.and_then(TransactionCode::new) else {
            tracing::error!(operation = OP, "cancel_tax called without a transaction code");
            return Err(TaxError::ContractViolation {
                argument: "transaction_code",
                message: "a non-empty transaction code must be supplied".to_owned(),
            });
        };
        let span = tracing::info_span!("tax.cancel_tax", code = %code);

        async {
            let outcome = match self.provider.client() {
                Ok(client) => client.void_transaction(&code).await,
                Err(e) => Err(e),
            };
            self.finish(OP, outcome)
        }
        .instrument(span)
        .await
    }

    /// Checks that the remote service is reachable and accepts our
    /// credentials.
    ///
    /// # Errors
    ///
    /// Only when `raise_exceptions` is set.
    pub async fn ping(&self) -> Result<TaxResult, TaxError> {
        const OP: &str = "ping";

        async {
            let outcome = match self.provider.client() {
                Ok(client) => client.ping().await,
                Err(e) => Err(e),
            };
            let outcome = outcome.and_then(|body| {
                if body.get("authenticated") == Some(&Value::Bool(false)) {
                    Err(TaxError::unexpected("credentials were not accepted"))
                } else {
                    Ok(body)
                }
            });
            self.finish(OP, outcome)
        }
        .instrument(tracing::info_span!("tax.ping"))
        .await
    }

    /// Resolves an address with the remote service.
    ///
    /// Any failure of the remote call is reported as an error-shaped result
    /// unless `raise_exceptions` is set.
    ///
    /// # Errors
    ///
    /// Only when `raise_exceptions` is set.
    pub async fn validate_address(&self, address: &Address) -> Result<TaxResult, TaxError> {
        const OP: &str = "validate_address";

        async {
            self.log_payload(OP, "request", || serde_json::to_value(address));
            let outcome = match self.provider.client() {
                Ok(client) => client.resolve_address(address).await,
                Err(e) => Err(e),
            };
            self.finish(OP, outcome)
        }
        .instrument(tracing::info_span!("tax.validate_address"))
        .await
    }

    fn finish(
        &self,
        operation: &'static str,
        outcome: Result<Value, TaxError>,
    ) -> Result<TaxResult, TaxError> {
        match outcome {
            Ok(body) => {
                self.log_payload(operation, "response", || Ok(body.clone()));
                let result = TaxResult::from_response(body);
                if result.is_success() {
                    tracing::debug!(operation, "remote call succeeded");
                } else {
                    tracing::error!(
                        operation,
                        error = %result.error_message().unwrap_or_default(),
                        "remote call returned an error payload"
                    );
                }
                Ok(result)
            }
            Err(e) => translate(operation, e, self.config.raise_exceptions()),
        }
    }

    fn log_payload<F>(&self, operation: &'static str, direction: &'static str, payload: F)
    where
        F: FnOnce() -> serde_json::Result<Value>,
    {
        if !self.config.log_payloads() {
            return;
        }
        match payload() {
            Ok(value) => tracing::debug!(operation, direction, payload = %value, "payload"),
            Err(e) => tracing::debug!(operation, direction, "payload not serialisable: {e}"),
        }
    }
}
