//! Newtype identifiers for the tax service domain.
//!
//! The remote service keys documents by a pair of strings (company code and
//! transaction code). Wrapping each in its own type keeps a [`CompanyCode`]
//! from being passed where a [`TransactionCode`] is expected, and guarantees
//! neither is empty.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty
            /// or whitespace only.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.trim().is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or_else(|| {
                    format!("{} must not be empty", stringify!($name))
                })
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id! {
    /// Unique code of a document (transaction) at the remote tax service.
    ///
    /// Chosen by the host when the transaction is created and used later to
    /// void it.
    TransactionCode
}

string_id! {
    /// Code of the company profile a transaction is recorded under.
    ///
    /// Configured per deployment; the remote service uses `"DEFAULT"` for the
    /// account's default company.
    CompanyCode
}

impl CompanyCode {
    /// The remote service's code for an account's default company.
    pub const DEFAULT: &'static str = "DEFAULT";
}

impl Default for CompanyCode {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}
