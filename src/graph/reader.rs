//! Read-side graph collaborator.
//!
//! The evaluator only ever needs one thing from the property graph: the
//! current value of a named property on a vertex. Implementations enforce
//! tenant isolation themselves; callers pass a vertex id that is already
//! scoped.

use crate::error::ErrorCode;
use crate::format::load_file;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Infrastructure failure while reading the graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("graph backend unavailable: {0}")]
    Unavailable(String),

    #[error("graph read cancelled")]
    Cancelled,

    #[error("graph read timed out after {0:?}")]
    Timeout(Duration),
}

impl GraphError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GraphError::Unavailable(_) => ErrorCode::GraphUnavailable,
            GraphError::Cancelled => ErrorCode::Cancelled,
            GraphError::Timeout(_) => ErrorCode::GraphTimeout,
        }
    }
}

/// Trait for graph backends
#[async_trait]
pub trait GraphReader: Send + Sync {
    /// Current value of `property_key` on vertex `subject_id`, or `None` when
    /// the vertex or the property does not exist.
    ///
    /// Must abort promptly with [`GraphError::Cancelled`] once `cancel` fires.
    async fn get_vertex_property(
        &self,
        subject_id: &str,
        property_key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, GraphError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

type VertexProperties = HashMap<String, String>;

/// Graph held in process memory, keyed by vertex id.
///
/// Used for fixtures and local checks. Counts every read so callers can
/// assert how many lookups an evaluation issued.
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    vertices: RwLock<HashMap<String, VertexProperties>>,
    reads: AtomicU64,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a fixture mapping vertex id to its properties (YAML or JSON).
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let vertices: HashMap<String, VertexProperties> =
            load_file(path.as_ref(), "graph fixture")?;
        Ok(Self {
            vertices: RwLock::new(vertices),
            reads: AtomicU64::new(0),
        })
    }

    pub fn set_property(
        &self,
        subject_id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.vertices
            .write()
            .entry(subject_id.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn with_property(self, subject_id: &str, key: &str, value: &str) -> Self {
        self.set_property(subject_id, key, value);
        self
    }

    /// Number of property reads served so far.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl GraphReader for InMemoryGraph {
    async fn get_vertex_property(
        &self,
        subject_id: &str,
        property_key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, GraphError> {
        if cancel.is_cancelled() {
            return Err(GraphError::Cancelled);
        }
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .vertices
            .read()
            .get(subject_id)
            .and_then(|props| props.get(property_key))
            .cloned())
    }

    fn name(&self) -> &str {
        "in_memory"
    }
}
