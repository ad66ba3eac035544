//! Ontology storage and validation.
//!
//! - **Store** - scope-partitioned index of artifacts ([`OntologyStore`])
//! - **Validators** - per-artifact referential and cardinality checks
//! - **Validator** - collect-all driver producing a [`ValidationReport`]
//! - **Repository** - async persistence boundary ([`OntologyRepository`])
//! - **Catalog** - LRU of validated, frozen snapshots per scope
//! - **Documents** - YAML/JSON ontology files
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use ontology_gate::ontology::{OntologyDocument, OntologyValidator};
//!
//! let doc = OntologyDocument::from_path("ontology.yaml")?;
//! let scope = doc.scope.clone();
//! let store = doc.into_store()?;
//!
//! let report = OntologyValidator::new().validate(&store, &scope);
//! if !report.is_valid() {
//!     eprintln!("{report}");
//! }
//! ```

pub mod cache;
pub mod document;
pub mod repository;
pub mod store;
pub mod validator;
pub mod validators;

pub use cache::{CacheStats, OntologyCatalog, OntologySnapshot};
pub use document::{DocumentFormat, OntologyDocument};
pub use repository::{InMemoryOntologyRepository, OntologyRepository};
pub use store::OntologyStore;
pub use validator::{OntologyValidator, ValidationReport, ValidationStats};
pub use validators::{
    IssueKind, ValidationIssue, validate_entity, validate_enum, validate_property,
    validate_relation, validate_shape,
};
