//! Error handling for the ontology gate.
//!
//! Two channels are kept apart:
//! - data-quality problems in an ontology are *diagnostics*
//!   ([`crate::ontology::ValidationIssue`]) and never surface here
//! - caller bugs (scope mismatch), configuration problems and
//!   infrastructure faults are errors, each mapped to an [`ErrorCode`]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// =============================================================================
// ERROR CODES
// =============================================================================

/// Stable numeric codes, in the JSON-RPC application range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    /// Artifact or operand belongs to another (tenant, package, channel)
    ScopeMismatch = -32030,
    /// Scope component blank or malformed
    InvalidScope = -32031,
    /// Ontology document could not be read or parsed
    DocumentError = -32032,
    /// Persistence collaborator failed
    RepositoryError = -32033,
    /// Graph backend failed or was unreachable
    GraphUnavailable = -32034,
    /// Graph read exceeded its deadline
    GraphTimeout = -32035,
    /// Caller cancelled the operation
    Cancelled = -32036,
}

impl ErrorCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Infrastructure faults may succeed on retry; logic errors never do.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::RepositoryError | ErrorCode::GraphUnavailable | ErrorCode::GraphTimeout
        )
    }

    pub fn category(&self) -> &'static str {
        match self {
            ErrorCode::ScopeMismatch | ErrorCode::InvalidScope => "scope_error",
            ErrorCode::DocumentError => "client_error",
            ErrorCode::RepositoryError | ErrorCode::GraphUnavailable => "infrastructure",
            ErrorCode::GraphTimeout => "timeout",
            ErrorCode::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

// =============================================================================
// ONTOLOGY ERRORS
// =============================================================================

/// Errors raised by the ontology model, store and loaders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OntologyError {
    #[error("scope mismatch: expected {expected}, got {actual}")]
    ScopeMismatch { expected: String, actual: String },

    #[error("invalid scope: {0}")]
    InvalidScope(String),

    #[error("ontology repository failure: {0}")]
    Repository(String),

    #[error("invalid ontology document {}: {reason}", path.display())]
    Document { path: PathBuf, reason: String },
}

impl OntologyError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OntologyError::ScopeMismatch { .. } => ErrorCode::ScopeMismatch,
            OntologyError::InvalidScope(_) => ErrorCode::InvalidScope,
            OntologyError::Repository(_) => ErrorCode::RepositoryError,
            OntologyError::Document { .. } => ErrorCode::DocumentError,
        }
    }
}
