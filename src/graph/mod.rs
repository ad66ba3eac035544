//! Runtime side of the ontology: predicate to storage-key mapping and
//! precondition evaluation against a tenant-scoped property graph.
//!
//! ```text
//! Precondition (ontology terms)
//!     └── PropertyKeyMapper     (predicate -> vertex property key)
//!         └── GraphReader       (one remote property read)
//!             └── PreconditionOutcome / PreconditionError
//! ```

pub mod mapper;
pub mod preconditions;
pub mod reader;

pub use mapper::{DEFAULT_LABEL_KEY, KeySource, MappedKey, PropertyKeyMapper, local_name};
pub use preconditions::{
    GraphPreconditionsService, NULL_SENTINEL, Precondition, PreconditionError,
    PreconditionOutcome, PreconditionSpec,
};
pub use reader::{GraphError, GraphReader, InMemoryGraph};
