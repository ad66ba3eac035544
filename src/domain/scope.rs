//! Tenant scope: the (tenant, package, channel) triple that partitions every
//! ontology artifact and every graph query.

use super::value_objects::{ChannelName, PackageName, TenantId, ValueError};
use crate::error::OntologyError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable ownership scope of an ontology artifact.
///
/// Created once per request and passed by value. Equality is strict over all
/// three components.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TenantScope {
    tenant: TenantId,
    package: PackageName,
    channel: ChannelName,
}

impl TenantScope {
    pub fn new(tenant: TenantId, package: PackageName, channel: ChannelName) -> Self {
        Self {
            tenant,
            package,
            channel,
        }
    }

    /// Builds a scope from raw strings, rejecting any blank component.
    pub fn parse(
        tenant: impl Into<String>,
        package: impl Into<String>,
        channel: impl Into<String>,
    ) -> Result<Self, OntologyError> {
        let invalid = |err: ValueError| OntologyError::InvalidScope(err.to_string());
        Ok(Self {
            tenant: TenantId::new(tenant.into()).map_err(invalid)?,
            package: PackageName::new(package.into()).map_err(invalid)?,
            channel: ChannelName::new(channel.into()).map_err(invalid)?,
        })
    }

    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    pub fn package(&self) -> &PackageName {
        &self.package
    }

    pub fn channel(&self) -> &ChannelName {
        &self.channel
    }

    /// Fails with [`OntologyError::ScopeMismatch`] unless `other` is this scope.
    ///
    /// Call this before trusting the scope embedded in any artifact handed in
    /// from outside.
    pub fn ensure_same(&self, other: &TenantScope) -> Result<(), OntologyError> {
        if self == other {
            Ok(())
        } else {
            Err(OntologyError::ScopeMismatch {
                expected: self.to_string(),
                actual: other.to_string(),
            })
        }
    }
}

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.tenant, self.package, self.channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_ensure_same_accepts_equal_scope() {
        let a = TenantScope::parse("acme", "core", "stable").unwrap();
        let b = TenantScope::parse("acme", "core", "stable").unwrap();
        assert!(a.ensure_same(&b).is_ok());
    }

    #[test]
    fn test_ensure_same_rejects_any_differing_component() {
        let base = TenantScope::parse("acme", "core", "stable").unwrap();
        for other in [
            TenantScope::parse("globex", "core", "stable").unwrap(),
            TenantScope::parse("acme", "billing", "stable").unwrap(),
            TenantScope::parse("acme", "core", "draft").unwrap(),
        ] {
            assert_matches!(
                base.ensure_same(&other),
                Err(OntologyError::ScopeMismatch { .. })
            );
        }
    }

    #[test]
    fn test_parse_rejects_blank_component() {
        assert_matches!(
            TenantScope::parse("acme", "", "stable"),
            Err(OntologyError::InvalidScope(_))
        );
    }

    #[test]
    fn test_display_is_stable() {
        let scope = TenantScope::parse("acme", "core", "stable").unwrap();
        assert_eq!(scope.to_string(), "acme/core@stable");
    }
}
