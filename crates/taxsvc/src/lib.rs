//! Result-normalizing adapter for a remote tax-calculation service.
//!
//! A host application (an e-commerce checkout, typically) calls four
//! operations on [`TaxSvc`]: compute tax, cancel a committed transaction,
//! validate an address, and ping. Each returns a [`TaxResult`] that is either
//! the remote service's response or an `{"error": ...}` payload, so the common
//! path needs no error handling.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies. It
//! defines the [`RemoteTaxService`] port; the `avatax` crate implements it
//! over HTTP.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype codes (`TransactionCode`, `CompanyCode`) |
//! | [`types`] | Host-supplied request types (`TransactionRequest`, `Address`) |
//! | [`errors`] | `TaxError` taxonomy and `RetryPolicy` |
//! | [`result`] | `TaxResult`, the uniform success/error value |
//! | [`normalizer`] | Structural request validation |
//! | [`translator`] | Error → result translation honouring `raise_exceptions` |
//! | [`provider`] | Lazy, at-most-once client construction |
//! | [`service`] | The `RemoteTaxService` port |
//! | [`adapter`] | `TaxSvc`, the four public operations |
//! | [`config`] | `TaxSvcConfig` runtime switches |

pub mod adapter;
pub mod config;
pub mod errors;
pub mod identifiers;
pub mod normalizer;
pub mod provider;
pub mod result;
pub mod service;
pub mod translator;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use adapter::{SharedTaxService, TaxSvc};
pub use config::TaxSvcConfig;
pub use errors::{RetryPolicy, TaxError};
pub use identifiers::{CompanyCode, TransactionCode};
pub use normalizer::{normalize, NormalizedRequest, LINES_REQUIRED};
pub use provider::ClientProvider;
pub use result::{TaxResult, ERROR_KEY};
pub use service::RemoteTaxService;
pub use types::{Address, CreateTransactionModel, LineItem, TransactionRequest};
