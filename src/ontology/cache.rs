//! Validated ontology snapshots per scope.
//!
//! LRU cache of frozen stores, each paired with the validation report it was
//! published with. Entries are rebuilt from the repository on miss or on
//! explicit refresh; they are never mutated in place. Thread-safe with
//! parking_lot RwLock, atomic counters for metrics.

use super::repository::OntologyRepository;
use super::store::OntologyStore;
use super::validator::{OntologyValidator, ValidationReport};
use crate::domain::TenantScope;
use crate::error::OntologyError;
use lru::LruCache;
use parking_lot::RwLock;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A frozen store and its validation outcome.
#[derive(Debug, Clone)]
pub struct OntologySnapshot {
    pub store: Arc<OntologyStore>,
    pub report: Arc<ValidationReport>,
}

impl OntologySnapshot {
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }
}

/// Scope-keyed snapshot cache backed by an [`OntologyRepository`].
pub struct OntologyCatalog {
    repository: Arc<dyn OntologyRepository>,
    validator: OntologyValidator,
    cache: RwLock<LruCache<TenantScope, OntologySnapshot>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl OntologyCatalog {
    pub fn new(repository: Arc<dyn OntologyRepository>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            repository,
            validator: OntologyValidator::new(),
            cache: RwLock::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cached snapshot for `scope`, loading and validating it on miss.
    pub async fn snapshot(&self, scope: &TenantScope) -> Result<OntologySnapshot, OntologyError> {
        if let Some(snapshot) = self.cache.write().get(scope).cloned() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(snapshot);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.refresh(scope).await
    }

    /// Rebuilds the snapshot for `scope` from the repository.
    pub async fn refresh(&self, scope: &TenantScope) -> Result<OntologySnapshot, OntologyError> {
        let store = OntologyStore::load(self.repository.as_ref(), scope).await?;
        let report = self.validator.validate(&store, scope);
        let snapshot = OntologySnapshot {
            store: store.freeze(),
            report: Arc::new(report),
        };
        self.cache.write().put(scope.clone(), snapshot.clone());
        tracing::debug!(scope = %scope, valid = snapshot.is_valid(), "ontology snapshot refreshed");
        Ok(snapshot)
    }

    pub fn invalidate(&self, scope: &TenantScope) -> bool {
        self.cache.write().pop(scope).is_some()
    }

    pub fn stats(&self) -> CacheStats {
        let cache = self.cache.read();
        CacheStats {
            size: cache.len(),
            capacity: cache.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
