//! Precondition evaluation against the property graph.
//!
//! A precondition is a boolean check expressed in ontology terms that must
//! hold before a dependent action runs. Logical outcomes and infrastructure
//! faults travel in separate channels: a check that does not hold is an
//! `Ok(PreconditionOutcome { passed: false, .. })`, a check that could not be
//! made is an `Err(PreconditionError)`.

use super::mapper::{KeySource, PropertyKeyMapper};
use super::reader::{GraphError, GraphReader};
use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Placeholder for an absent value in diagnostics.
pub const NULL_SENTINEL: &str = "<null>";

/// A single check against one subject vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Precondition {
    /// The subject vertex exists (its label property is present)
    Exists,
    /// The mapped property equals `expected`, ignoring case
    Equals { predicate: String, expected: String },
    /// The mapped property is present and not blank
    NonEmpty { predicate: String },
}

impl Precondition {
    pub fn exists() -> Self {
        Precondition::Exists
    }

    pub fn equals(predicate: impl Into<String>, expected: impl Into<String>) -> Self {
        Precondition::Equals {
            predicate: predicate.into(),
            expected: expected.into(),
        }
    }

    pub fn non_empty(predicate: impl Into<String>) -> Self {
        Precondition::NonEmpty {
            predicate: predicate.into(),
        }
    }
}

/// Loose wire shape of a precondition: optional predicate, optional
/// expected value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreconditionSpec {
    #[serde(default)]
    pub predicate: Option<String>,
    #[serde(default)]
    pub expected: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<PreconditionSpec> for Precondition {
    fn from(spec: PreconditionSpec) -> Self {
        match (non_blank(spec.predicate), non_blank(spec.expected)) {
            (None, None) => Precondition::Exists,
            (predicate, Some(expected)) => Precondition::Equals {
                predicate: predicate.unwrap_or_default(),
                expected,
            },
            (Some(predicate), None) => Precondition::NonEmpty { predicate },
        }
    }
}

/// Logical answer of an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreconditionOutcome {
    pub passed: bool,
    /// Why the check failed; `None` on pass
    pub reason: Option<String>,
}

impl PreconditionOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            reason: None,
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: Some(reason.into()),
        }
    }
}

impl fmt::Display for PreconditionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            None => f.write_str("passed"),
            Some(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// The check could not be made. Never a logical "no".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    #[error("precondition evaluation failed: {0}")]
    Infrastructure(GraphError),

    #[error("precondition evaluation cancelled")]
    Cancelled,

    #[error("precondition evaluation timed out after {0:?}")]
    Timeout(Duration),
}

impl PreconditionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PreconditionError::Infrastructure(err) => err.code(),
            PreconditionError::Cancelled => ErrorCode::Cancelled,
            PreconditionError::Timeout(_) => ErrorCode::GraphTimeout,
        }
    }
}

impl From<GraphError> for PreconditionError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Cancelled => PreconditionError::Cancelled,
            GraphError::Timeout(limit) => PreconditionError::Timeout(limit),
            other => PreconditionError::Infrastructure(other),
        }
    }
}

/// Evaluates preconditions for subjects already scoped to the right tenant.
///
/// Stateless between calls; each evaluation issues exactly one property read.
pub struct GraphPreconditionsService {
    graph: Arc<dyn GraphReader>,
    mapper: Arc<PropertyKeyMapper>,
    read_timeout: Option<Duration>,
}

impl GraphPreconditionsService {
    pub fn new(graph: Arc<dyn GraphReader>, mapper: Arc<PropertyKeyMapper>) -> Self {
        Self {
            graph,
            mapper,
            read_timeout: None,
        }
    }

    /// Bounds every graph read; an overrun surfaces as
    /// [`PreconditionError::Timeout`].
    pub fn with_read_timeout(mut self, limit: Duration) -> Self {
        self.read_timeout = Some(limit);
        self
    }

    pub fn mapper(&self) -> &PropertyKeyMapper {
        &self.mapper
    }

    #[tracing::instrument(level = "debug", skip(self, cancel), fields(graph = self.graph.name()))]
    pub async fn evaluate(
        &self,
        subject_label: &str,
        subject_id: &str,
        precondition: &Precondition,
        cancel: &CancellationToken,
    ) -> Result<PreconditionOutcome, PreconditionError> {
        let outcome = match precondition {
            Precondition::Exists => {
                let key = self.mapper.label_key();
                match self.read(subject_id, key, cancel).await? {
                    Some(_) => PreconditionOutcome::pass(),
                    None => PreconditionOutcome::fail(format!(
                        "{subject_label}/{subject_id} not found"
                    )),
                }
            }
            Precondition::Equals {
                predicate,
                expected,
            } => {
                let key = self.property_key(predicate);
                let actual = self.read(subject_id, &key, cancel).await?;
                let matches = actual
                    .as_deref()
                    .is_some_and(|actual| actual.to_lowercase() == expected.to_lowercase());
                if matches {
                    PreconditionOutcome::pass()
                } else {
                    PreconditionOutcome::fail(format!(
                        "{key} expected '{expected}' but was '{}'",
                        actual.as_deref().unwrap_or(NULL_SENTINEL)
                    ))
                }
            }
            Precondition::NonEmpty { predicate } => {
                let key = self.property_key(predicate);
                match self.read(subject_id, &key, cancel).await? {
                    Some(_) => PreconditionOutcome::pass(),
                    None => PreconditionOutcome::fail(format!(
                        "{key} is empty on {subject_label}/{subject_id}"
                    )),
                }
            }
        };

        if let Some(reason) = &outcome.reason {
            tracing::info!(subject_label, subject_id, reason = %reason, "precondition failed");
        }
        Ok(outcome)
    }

    /// Evaluates in order and stops at the first failure, which is returned.
    /// Later preconditions are never read.
    #[tracing::instrument(
        level = "debug",
        skip(self, preconditions, cancel),
        fields(graph = self.graph.name(), count = preconditions.len())
    )]
    pub async fn evaluate_all(
        &self,
        subject_label: &str,
        subject_id: &str,
        preconditions: &[Precondition],
        cancel: &CancellationToken,
    ) -> Result<PreconditionOutcome, PreconditionError> {
        for precondition in preconditions {
            let outcome = self
                .evaluate(subject_label, subject_id, precondition, cancel)
                .await?;
            if !outcome.passed {
                return Ok(outcome);
            }
        }
        Ok(PreconditionOutcome::pass())
    }

    fn property_key(&self, predicate: &str) -> String {
        let mapped = self.mapper.map_property_key(predicate);
        if mapped.source == KeySource::Fallback {
            tracing::debug!(predicate, key = %mapped.key, source = %mapped.source, "unmapped predicate");
        }
        mapped.key
    }

    /// One graph read; blank values count as absent.
    async fn read(
        &self,
        subject_id: &str,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, PreconditionError> {
        if cancel.is_cancelled() {
            return Err(PreconditionError::Cancelled);
        }
        let value = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PreconditionError::Cancelled),
            result = self.bounded_read(subject_id, key, cancel) => result,
        };
        match value {
            Ok(value) => Ok(non_blank(value)),
            Err(err) => {
                let err = PreconditionError::from(err);
                tracing::warn!(subject_id, key, error = %err, code = %err.code(), "graph read failed");
                Err(err)
            }
        }
    }

    async fn bounded_read(
        &self,
        subject_id: &str,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, GraphError> {
        let read = self.graph.get_vertex_property(subject_id, key, cancel);
        match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, read)
                .await
                .map_err(|_| GraphError::Timeout(limit))?,
            None => read.await,
        }
    }
}
