//! Ontology persistence boundary.
//!
//! The store is populated from, and written back to, an
//! [`OntologyRepository`]. Every method takes an explicit scope; no
//! implementation may read or write across scopes.

use super::store::OntologyStore;
use crate::domain::{Artifact, ArtifactKey, ArtifactKind, TenantScope};
use crate::error::OntologyError;
use async_trait::async_trait;
use parking_lot::RwLock;
use strum::IntoEnumIterator;

/// Persistence collaborator for ontology artifacts.
#[async_trait]
pub trait OntologyRepository: Send + Sync {
    /// Creates or replaces artifacts. Fails with `ScopeMismatch` if any
    /// artifact belongs to another scope.
    async fn upsert(
        &self,
        scope: &TenantScope,
        artifacts: Vec<Artifact>,
    ) -> Result<usize, OntologyError>;

    async fn get(
        &self,
        scope: &TenantScope,
        key: &ArtifactKey,
    ) -> Result<Option<Artifact>, OntologyError>;

    async fn list(
        &self,
        scope: &TenantScope,
        kind: ArtifactKind,
    ) -> Result<Vec<Artifact>, OntologyError>;

    async fn delete(&self, scope: &TenantScope, key: &ArtifactKey) -> Result<bool, OntologyError>;

    /// Repository name for logging
    fn name(&self) -> &str;
}

/// Repository backed by an in-process store.
#[derive(Debug, Default)]
pub struct InMemoryOntologyRepository {
    inner: RwLock<OntologyStore>,
}

impl InMemoryOntologyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_store(store: OntologyStore) -> Self {
        Self {
            inner: RwLock::new(store),
        }
    }
}

#[async_trait]
impl OntologyRepository for InMemoryOntologyRepository {
    async fn upsert(
        &self,
        scope: &TenantScope,
        artifacts: Vec<Artifact>,
    ) -> Result<usize, OntologyError> {
        self.inner.write().upsert(scope, artifacts)
    }

    async fn get(
        &self,
        scope: &TenantScope,
        key: &ArtifactKey,
    ) -> Result<Option<Artifact>, OntologyError> {
        Ok(self.inner.read().get(scope, key))
    }

    async fn list(
        &self,
        scope: &TenantScope,
        kind: ArtifactKind,
    ) -> Result<Vec<Artifact>, OntologyError> {
        Ok(self.inner.read().list(scope, kind))
    }

    async fn delete(&self, scope: &TenantScope, key: &ArtifactKey) -> Result<bool, OntologyError> {
        Ok(self.inner.write().delete(scope, key))
    }

    fn name(&self) -> &str {
        "in_memory"
    }
}

impl OntologyStore {
    /// Rebuilds a snapshot of one scope from the repository.
    ///
    /// Artifacts returned for a foreign scope are rejected with
    /// `ScopeMismatch` rather than indexed.
    pub async fn load(
        repository: &dyn OntologyRepository,
        scope: &TenantScope,
    ) -> Result<Self, OntologyError> {
        let mut store = OntologyStore::new();
        for kind in ArtifactKind::iter() {
            let artifacts = repository.list(scope, kind).await?;
            store.upsert(scope, artifacts)?;
        }
        tracing::debug!(
            scope = %scope,
            repository = repository.name(),
            artifacts = store.artifact_count(scope),
            "loaded ontology snapshot"
        );
        Ok(store)
    }

    /// Writes every artifact of `scope` to the repository.
    pub async fn persist(
        &self,
        repository: &dyn OntologyRepository,
        scope: &TenantScope,
    ) -> Result<usize, OntologyError> {
        let mut written = 0;
        for kind in ArtifactKind::iter() {
            let artifacts = self.list(scope, kind);
            if !artifacts.is_empty() {
                written += repository.upsert(scope, artifacts).await?;
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntityDef, EnumDef, PropertyDef};
    use assert_matches::assert_matches;

    fn scope(tenant: &str) -> TenantScope {
        TenantScope::parse(tenant, "core", "stable").unwrap()
    }

    #[tokio::test]
    async fn test_load_rebuilds_only_the_requested_scope() {
        let repo = InMemoryOntologyRepository::new();
        let acme = scope("acme");
        let globex = scope("globex");
        repo.upsert(
            &acme,
            vec![
                Artifact::Entity(EntityDef::new(acme.clone(), "Order")),
                Artifact::Property(PropertyDef::new(acme.clone(), "Order", "total")),
            ],
        )
        .await
        .unwrap();
        repo.upsert(
            &globex,
            vec![Artifact::Entity(EntityDef::new(globex.clone(), "Widget"))],
        )
        .await
        .unwrap();

        let store = OntologyStore::load(&repo, &acme).await.unwrap();
        assert_eq!(store.artifact_count(&acme), 2);
        assert_eq!(store.artifact_count(&globex), 0);
    }

    #[tokio::test]
    async fn test_repository_rejects_cross_scope_writes() {
        let repo = InMemoryOntologyRepository::new();
        let result = repo
            .upsert(
                &scope("acme"),
                vec![Artifact::Entity(EntityDef::new(scope("globex"), "Widget"))],
            )
            .await;
        assert_matches!(result, Err(OntologyError::ScopeMismatch { .. }));
    }

    #[tokio::test]
    async fn test_persist_then_load_preserves_artifacts() {
        let acme = scope("acme");
        let mut store = OntologyStore::new();
        store
            .upsert_enums(&acme, [EnumDef::new(acme.clone(), "Status", ["open", "closed"])])
            .unwrap();

        let repo = InMemoryOntologyRepository::new();
        assert_eq!(store.persist(&repo, &acme).await.unwrap(), 1);

        let reloaded = OntologyStore::load(&repo, &acme).await.unwrap();
        assert_eq!(
            reloaded.get_enum(&acme, "Status").map(|e| e.values.len()),
            Some(2)
        );
        assert!(
            repo.delete(&acme, &ArtifactKey::Enum { name: "Status".into() })
                .await
                .unwrap()
        );
        assert!(
            repo.get(&acme, &ArtifactKey::Enum { name: "Status".into() })
                .await
                .unwrap()
                .is_none()
        );
    }
}
