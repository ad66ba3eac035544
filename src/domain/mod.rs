//! Ontology domain model.
//!
//! - [`value_objects`]: validated newtypes for the scope components
//! - [`scope`]: the [`TenantScope`] partition key
//! - [`artifacts`]: entity, property, relation, enum, alias and shape definitions

pub mod artifacts;
pub mod scope;
pub mod value_objects;

pub use artifacts::{
    AliasDef, Artifact, ArtifactKey, ArtifactKind, Cardinality, EntityDef, EnumDef, Governance,
    PropertyConstraint, PropertyDef, PropertyRange, PublicationStatus, RangeKind, RelationDef,
    ShapeDef,
};
pub use scope::TenantScope;
pub use value_objects::{ChannelName, PackageName, TenantId, ValueError};
