//! Scope value objects with the NewType pattern.
//!
//! Tenant ids, package names and channel names are all plain strings on the
//! wire. Wrapping each one keeps them from being swapped when a scope is
//! assembled by hand:
//!
//! ```rust,ignore
//! let tenant = TenantId::new("acme".to_string())?;
//! let package = PackageName::new("core".to_string())?;
//! // TenantScope::new(package, tenant, ..) ✗ Compile error!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised while constructing a scope component.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{field} exceeds maximum length of {max} (got {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

macro_rules! scope_component {
    ($(#[$meta:meta])* $name:ident, $label:literal, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            const MAX_LENGTH: usize = $max;

            /// Creates the value, rejecting blank or oversized input.
            pub fn new(value: String) -> Result<Self, ValueError> {
                if value.trim().is_empty() {
                    return Err(ValueError::Empty($label));
                }
                if value.len() > Self::MAX_LENGTH {
                    return Err(ValueError::TooLong {
                        field: $label,
                        max: Self::MAX_LENGTH,
                        actual: value.len(),
                    });
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValueError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

scope_component!(
    /// Identifier of the tenant that owns an ontology.
    TenantId,
    "TenantId",
    256
);

scope_component!(
    /// Name of an ontology package within a tenant.
    PackageName,
    "PackageName",
    256
);

scope_component!(
    /// Release channel of a package (e.g. `draft`, `stable`).
    ChannelName,
    "ChannelName",
    128
);
