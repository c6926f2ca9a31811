//! Lazily constructed, shared handle to the remote service.

use std::fmt;
use std::sync::OnceLock;

use crate::TaxError;

type Factory<C> = Box<dyn Fn() -> Result<C, TaxError> + Send + Sync>;

/// Get-or-create accessor for a client handle.
///
/// The factory runs at most once, on the first call to [`ClientProvider::client`],
/// even when several tasks make that first call concurrently. Its outcome is
/// kept: a handle that could not be built reports the same
/// [`TaxError::Unexpected`] on every later use instead of retrying setup.
pub struct ClientProvider<C> {
    cell: OnceLock<Result<C, TaxError>>,
    factory: Option<Factory<C>>,
}

impl<C> ClientProvider<C> {
    /// A provider that will build its handle with `factory` on first use.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<C, TaxError> + Send + Sync + 'static,
    {
        Self {
            cell: OnceLock::new(),
            factory: Some(Box::new(factory)),
        }
    }

    /// A provider whose handle already exists.
    pub fn ready(client: C) -> Self {
        Self {
            cell: OnceLock::from(Ok(client)),
            factory: None,
        }
    }

    /// Returns the shared handle, building it if this is the first use.
    ///
    /// # Errors
    ///
    /// The factory's error, converted to [`TaxError::Unexpected`] if it was
    /// anything else.
    pub fn client(&self) -> Result<&C, TaxError> {
        let slot = self.cell.get_or_init(|| {
            tracing::debug!("initialising remote tax service client");
            let Some(factory) = &self.factory else {
                return Err(TaxError::unexpected("no client factory configured"));
            };
            factory().map_err(|e| match e {
                TaxError::Unexpected { .. } => e,
                other => TaxError::unexpected(format!("client construction failed: {other}")),
            })
        });
        slot.as_ref().map_err(Clone::clone)
    }

    /// Whether the handle has been built (successfully or not).
    pub fn is_initialised(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<C> fmt::Debug for ClientProvider<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientProvider")
            .field("initialised", &self.is_initialised())
            .finish_non_exhaustive()
    }
}
