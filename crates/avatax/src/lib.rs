//! AvaTax REST transport for the tax service adapter.
//!
//! Implements the [`taxsvc::RemoteTaxService`] trait over Avalara's AvaTax
//! REST v2 API: create-or-adjust transaction, void transaction, address
//! resolution, and ping.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, authentication, endpoint selection and
//! the mapping of HTTP outcomes onto [`taxsvc::TaxError`] live here. The
//! [`taxsvc`] crate sees only [`taxsvc::RemoteTaxService`].
//!
//! ## Error mapping
//!
//! | Outcome | Error |
//! |---------|-------|
//! | connection failure, timeout | `Unexpected { transient: true }` |
//! | non-2xx with a JSON object body | `RemoteRejection { status, body }` |
//! | non-2xx with any other body | `Unexpected` (transient for 5xx) |
//! | 2xx that is not a JSON object | `Unexpected` |

pub mod client;
pub mod config;

use std::sync::Arc;

use taxsvc::{SharedTaxService, TaxError, TaxSvc, TaxSvcConfig};

pub use client::{AvaTaxClient, CLIENT_HEADER};
pub use config::{AvaTaxConfig, ConfigError, Environment};

/// A factory suitable for [`TaxSvc::new`] that builds an [`AvaTaxClient`].
pub fn service_factory(
    config: Arc<AvaTaxConfig>,
) -> impl Fn() -> Result<SharedTaxService, TaxError> + Send + Sync + 'static {
    move || {
        let client = AvaTaxClient::new(Arc::clone(&config))?;
        Ok(Arc::new(client) as SharedTaxService)
    }
}

/// A [`TaxSvc`] that talks to AvaTax with `config`, building the HTTP client
/// on first use.
pub fn tax_svc(config: AvaTaxConfig, svc_config: Arc<TaxSvcConfig>) -> TaxSvc {
    TaxSvc::new(svc_config, service_factory(Arc::new(config)))
}
