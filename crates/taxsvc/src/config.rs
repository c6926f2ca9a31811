//! Adapter behaviour switches.

use std::sync::atomic::{AtomicBool, Ordering};

/// Switches that change how [`crate::TaxSvc`] reports failures.
///
/// Shared by `Arc` between the host and the adapter. Every operation reads the
/// flags when it runs, so a host may flip them at runtime.
#[derive(Debug, Default)]
pub struct TaxSvcConfig {
    raise_exceptions: AtomicBool,
    log_payloads: AtomicBool,
}

impl TaxSvcConfig {
    /// Switches with the given initial values.
    pub fn new(raise_exceptions: bool, log_payloads: bool) -> Self {
        Self {
            raise_exceptions: AtomicBool::new(raise_exceptions),
            log_payloads: AtomicBool::new(log_payloads),
        }
    }

    /// When `true`, failures are returned as `Err` instead of error-shaped
    /// results. Contract violations are returned as `Err` either way.
    pub fn raise_exceptions(&self) -> bool {
        self.raise_exceptions.load(Ordering::Relaxed)
    }

    /// Changes [`TaxSvcConfig::raise_exceptions`] for subsequent calls.
    pub fn set_raise_exceptions(&self, value: bool) {
        self.raise_exceptions.store(value, Ordering::Relaxed);
    }

    /// When `true`, request and response bodies are logged at `debug`.
    pub fn log_payloads(&self) -> bool {
        self.log_payloads.load(Ordering::Relaxed)
    }

    /// Changes [`TaxSvcConfig::log_payloads`] for subsequent calls.
    pub fn set_log_payloads(&self, value: bool) {
        self.log_payloads.store(value, Ordering::Relaxed);
    }
}
