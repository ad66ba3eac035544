//! Ontology artifacts: entities, properties, relations, enumerations, aliases
//! and shapes.
//!
//! The data structures carry no invariants of their own. Referential
//! integrity and cardinality rules are enforced by
//! [`crate::ontology::validators`], uniqueness per (scope, kind, name) by the
//! store's keying.

use super::scope::TenantScope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

// ============================================================================
// Governance facet
// ============================================================================

/// Review state of an artifact. Descriptive only, never gates validation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PublicationStatus {
    #[default]
    Proposed,
    Published,
    Deprecated,
    Rejected,
}

/// Governance metadata shared by every artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Governance {
    /// Author confidence in the definition, 0.0 to 1.0
    pub confidence: f64,
    pub complexity: u32,
    pub depth: u32,
    pub status: PublicationStatus,
    pub version: String,
    /// Reference to whatever the artifact was derived from
    pub provenance: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Governance {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            confidence: 1.0,
            complexity: 1,
            depth: 1,
            status: PublicationStatus::Proposed,
            version: "1".to_string(),
            provenance: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Shared pieces
// ============================================================================

/// Permitted number of values. `max == None` means unbounded.
///
/// Signed on purpose: persisted ontologies can carry negative bounds and the
/// validators must be able to report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cardinality {
    #[serde(rename = "min_cardinality", default)]
    pub min: i64,
    #[serde(rename = "max_cardinality", default)]
    pub max: Option<i64>,
}

impl Cardinality {
    pub fn new(min: i64, max: Option<i64>) -> Self {
        Self { min, max }
    }

    pub fn unbounded(min: i64) -> Self {
        Self { min, max: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RangeKind {
    String,
    Integer,
    Decimal,
    Boolean,
    DateTime,
    EntityRef,
}

/// Value range of a property: a primitive, or a reference to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRange {
    pub kind: RangeKind,
    /// Target entity when `kind` is [`RangeKind::EntityRef`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl PropertyRange {
    pub fn primitive(kind: RangeKind) -> Self {
        Self { kind, entity: None }
    }

    pub fn entity_ref(entity: impl Into<String>) -> Self {
        Self {
            kind: RangeKind::EntityRef,
            entity: Some(entity.into()),
        }
    }
}

impl Default for PropertyRange {
    fn default() -> Self {
        Self::primitive(RangeKind::String)
    }
}

// ============================================================================
// Artifacts
// ============================================================================

/// A named class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    pub scope: TenantScope,
    pub local_name: String,
    /// Local names of parent entities in the same scope
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub governance: Governance,
}

impl EntityDef {
    pub fn new(scope: TenantScope, local_name: impl Into<String>) -> Self {
        Self {
            scope,
            local_name: local_name.into(),
            parents: Vec::new(),
            description: None,
            governance: Governance::default(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }
}

/// A value-carrying attribute owned by exactly one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub scope: TenantScope,
    pub owner_entity: String,
    pub local_name: String,
    #[serde(flatten)]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub range: PropertyRange,
    #[serde(default)]
    pub governance: Governance,
}

impl PropertyDef {
    pub fn new(
        scope: TenantScope,
        owner_entity: impl Into<String>,
        local_name: impl Into<String>,
    ) -> Self {
        Self {
            scope,
            owner_entity: owner_entity.into(),
            local_name: local_name.into(),
            cardinality: Cardinality::unbounded(0),
            range: PropertyRange::default(),
            governance: Governance::default(),
        }
    }

    pub fn with_cardinality(mut self, min: i64, max: Option<i64>) -> Self {
        self.cardinality = Cardinality::new(min, max);
        self
    }

    pub fn with_range(mut self, range: PropertyRange) -> Self {
        self.range = range;
        self
    }
}

/// A named edge type between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDef {
    pub scope: TenantScope,
    pub local_name: String,
    pub from_entity: String,
    pub to_entity: String,
    #[serde(flatten)]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub governance: Governance,
}

impl RelationDef {
    pub fn new(
        scope: TenantScope,
        local_name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
    ) -> Self {
        Self {
            scope,
            local_name: local_name.into(),
            from_entity: from_entity.into(),
            to_entity: to_entity.into(),
            cardinality: Cardinality::unbounded(0),
            governance: Governance::default(),
        }
    }

    pub fn with_cardinality(mut self, min: i64, max: Option<i64>) -> Self {
        self.cardinality = Cardinality::new(min, max);
        self
    }
}

/// A closed set of string values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    pub scope: TenantScope,
    pub local_name: String,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub governance: Governance,
}

impl EnumDef {
    pub fn new<I, S>(scope: TenantScope, local_name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scope,
            local_name: local_name.into(),
            values: values.into_iter().map(Into::into).collect(),
            governance: Governance::default(),
        }
    }
}

/// Alternate spelling of a canonical name, optionally tied to a locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasDef {
    pub scope: TenantScope,
    pub local_name: String,
    pub canonical: String,
    pub alternate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default)]
    pub governance: Governance,
}

impl AliasDef {
    pub fn new(
        scope: TenantScope,
        local_name: impl Into<String>,
        canonical: impl Into<String>,
        alternate: impl Into<String>,
    ) -> Self {
        Self {
            scope,
            local_name: local_name.into(),
            canonical: canonical.into(),
            alternate: alternate.into(),
            locale: None,
            governance: Governance::default(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// Cardinality restriction on one property of the shaped entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyConstraint {
    pub property: String,
    #[serde(flatten)]
    pub cardinality: Cardinality,
}

impl PropertyConstraint {
    pub fn new(property: impl Into<String>, min: i64, max: Option<i64>) -> Self {
        Self {
            property: property.into(),
            cardinality: Cardinality::new(min, max),
        }
    }
}

/// Constraint bundle applied to a single entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDef {
    pub scope: TenantScope,
    pub local_name: String,
    pub applies_to_entity: String,
    #[serde(default)]
    pub constraints: Vec<PropertyConstraint>,
    #[serde(default)]
    pub governance: Governance,
}

impl ShapeDef {
    pub fn new(
        scope: TenantScope,
        local_name: impl Into<String>,
        applies_to_entity: impl Into<String>,
    ) -> Self {
        Self {
            scope,
            local_name: local_name.into(),
            applies_to_entity: applies_to_entity.into(),
            constraints: Vec::new(),
            governance: Governance::default(),
        }
    }

    pub fn with_constraint(mut self, constraint: PropertyConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

// ============================================================================
// Kind-erased artifact
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ArtifactKind {
    Entity,
    Property,
    Relation,
    Enum,
    Alias,
    Shape,
}

/// Any artifact, used at the persistence boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact {
    Entity(EntityDef),
    Property(PropertyDef),
    Relation(RelationDef),
    Enum(EnumDef),
    Alias(AliasDef),
    Shape(ShapeDef),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Entity(_) => ArtifactKind::Entity,
            Artifact::Property(_) => ArtifactKind::Property,
            Artifact::Relation(_) => ArtifactKind::Relation,
            Artifact::Enum(_) => ArtifactKind::Enum,
            Artifact::Alias(_) => ArtifactKind::Alias,
            Artifact::Shape(_) => ArtifactKind::Shape,
        }
    }

    pub fn scope(&self) -> &TenantScope {
        match self {
            Artifact::Entity(a) => &a.scope,
            Artifact::Property(a) => &a.scope,
            Artifact::Relation(a) => &a.scope,
            Artifact::Enum(a) => &a.scope,
            Artifact::Alias(a) => &a.scope,
            Artifact::Shape(a) => &a.scope,
        }
    }

    pub fn local_name(&self) -> &str {
        match self {
            Artifact::Entity(a) => &a.local_name,
            Artifact::Property(a) => &a.local_name,
            Artifact::Relation(a) => &a.local_name,
            Artifact::Enum(a) => &a.local_name,
            Artifact::Alias(a) => &a.local_name,
            Artifact::Shape(a) => &a.local_name,
        }
    }
}

/// Key of one artifact inside a scope.
///
/// Properties are keyed by owner entity and name, shapes by the entity they
/// apply to; every other kind by its local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactKey {
    Entity { name: String },
    Property { owner: String, name: String },
    Relation { name: String },
    Enum { name: String },
    Alias { name: String },
    Shape { applies_to: String },
}

impl ArtifactKey {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactKey::Entity { .. } => ArtifactKind::Entity,
            ArtifactKey::Property { .. } => ArtifactKind::Property,
            ArtifactKey::Relation { .. } => ArtifactKind::Relation,
            ArtifactKey::Enum { .. } => ArtifactKind::Enum,
            ArtifactKey::Alias { .. } => ArtifactKind::Alias,
            ArtifactKey::Shape { .. } => ArtifactKind::Shape,
        }
    }

    pub fn of(artifact: &Artifact) -> Self {
        match artifact {
            Artifact::Entity(a) => ArtifactKey::Entity {
                name: a.local_name.clone(),
            },
            Artifact::Property(a) => ArtifactKey::Property {
                owner: a.owner_entity.clone(),
                name: a.local_name.clone(),
            },
            Artifact::Relation(a) => ArtifactKey::Relation {
                name: a.local_name.clone(),
            },
            Artifact::Enum(a) => ArtifactKey::Enum {
                name: a.local_name.clone(),
            },
            Artifact::Alias(a) => ArtifactKey::Alias {
                name: a.local_name.clone(),
            },
            Artifact::Shape(a) => ArtifactKey::Shape {
                applies_to: a.applies_to_entity.clone(),
            },
        }
    }
}
