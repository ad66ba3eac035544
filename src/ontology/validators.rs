//! Per-artifact consistency checks.
//!
//! Every validator is a pure, total function over one artifact and a store
//! snapshot. Problems come back as [`ValidationIssue`]s; nothing here fails.
//! Checks run in field declaration order (scope, name, references,
//! cardinality, range) so unchanged input always yields identical output.
//!
//! Resolution is always scope-qualified: a reference only resolves against
//! artifacts of the scope being validated, even if another scope holds an
//! artifact of the same name.

use super::store::OntologyStore;
use crate::domain::{
    ArtifactKind, Cardinality, EntityDef, EnumDef, PropertyDef, RangeKind, RelationDef, ShapeDef,
    TenantScope,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use strum::Display;

/// Category tag for a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IssueKind {
    /// Artifact embeds a different scope than the one being validated
    ScopeMismatch,
    MissingName,
    /// Referenced artifact does not exist in scope
    ReferentialIntegrity,
    /// Negative bound, or min above max
    Cardinality,
    EmptyEnum,
    DuplicateEnumValue,
}

/// One diagnostic produced by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub artifact_kind: ArtifactKind,
    /// Display name of the offending artifact
    pub artifact: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Accumulates issues for a single artifact.
struct IssueSink {
    artifact_kind: ArtifactKind,
    artifact: String,
    label: String,
    issues: Vec<ValidationIssue>,
}

impl IssueSink {
    fn new(artifact_kind: ArtifactKind, title: &str, artifact: String) -> Self {
        let label = format!("{title} '{artifact}'");
        Self {
            artifact_kind,
            artifact,
            label,
            issues: Vec::new(),
        }
    }

    fn push(&mut self, kind: IssueKind, detail: impl fmt::Display) {
        self.issues.push(ValidationIssue {
            kind,
            artifact_kind: self.artifact_kind,
            artifact: self.artifact.clone(),
            message: format!("{}: {}", self.label, detail),
        });
    }

    /// Records a scope mismatch; returns `false` when further checks must be
    /// skipped because references cannot be trusted.
    fn scope_matches(&mut self, scope: &TenantScope, embedded: &TenantScope) -> bool {
        if scope.ensure_same(embedded).is_ok() {
            return true;
        }
        self.push(
            IssueKind::ScopeMismatch,
            format_args!("belongs to scope {embedded}, expected {scope}"),
        );
        false
    }

    fn require_entity(
        &mut self,
        store: &OntologyStore,
        scope: &TenantScope,
        role: &str,
        name: &str,
    ) {
        if store.get_entity(scope, name).is_none() {
            self.push(
                IssueKind::ReferentialIntegrity,
                format_args!("{role} '{name}' not found in scope {scope}"),
            );
        }
    }

    fn check_cardinality(&mut self, prefix: &str, cardinality: &Cardinality) {
        let Cardinality { min, max } = *cardinality;
        if min < 0 {
            self.push(
                IssueKind::Cardinality,
                format_args!("{prefix}MinCardinality must be >= 0 (got {min})"),
            );
        }
        if let Some(max) = max {
            if max < 0 {
                self.push(
                    IssueKind::Cardinality,
                    format_args!("{prefix}MaxCardinality must be >= 0 (got {max})"),
                );
            } else if min >= 0 && min > max {
                self.push(
                    IssueKind::Cardinality,
                    format_args!(
                        "{prefix}MinCardinality ({min}) cannot exceed MaxCardinality ({max})"
                    ),
                );
            }
        }
    }

    fn finish(self) -> Vec<ValidationIssue> {
        self.issues
    }
}

/// Checks name presence and that every parent resolves in `scope`.
///
/// An entity embedding a different scope yields a single
/// [`IssueKind::ScopeMismatch`] issue rather than an `Err`, and its other
/// checks are skipped. The same holds for every `validate_*` function.
pub fn validate_entity(
    scope: &TenantScope,
    entity: &EntityDef,
    store: &OntologyStore,
) -> Vec<ValidationIssue> {
    let mut sink = IssueSink::new(ArtifactKind::Entity, "Entity", entity.local_name.clone());
    if !sink.scope_matches(scope, &entity.scope) {
        return sink.finish();
    }
    if entity.local_name.trim().is_empty() {
        sink.push(IssueKind::MissingName, "local name is empty");
    }
    for parent in &entity.parents {
        sink.require_entity(store, scope, "parent entity", parent);
    }
    sink.finish()
}

/// Owner, cardinality, then range. A foreign scope is a
/// [`IssueKind::ScopeMismatch`] issue, not an `Err`.
pub fn validate_property(
    scope: &TenantScope,
    property: &PropertyDef,
    store: &OntologyStore,
) -> Vec<ValidationIssue> {
    let mut sink = IssueSink::new(
        ArtifactKind::Property,
        "Property",
        format!("{}.{}", property.owner_entity, property.local_name),
    );
    if !sink.scope_matches(scope, &property.scope) {
        return sink.finish();
    }
    sink.require_entity(store, scope, "owner entity", &property.owner_entity);
    sink.check_cardinality("", &property.cardinality);
    if property.range.kind == RangeKind::EntityRef {
        match property.range.entity.as_deref() {
            Some(target) if !target.trim().is_empty() => {
                sink.require_entity(store, scope, "range entity", target)
            }
            _ => sink.push(
                IssueKind::ReferentialIntegrity,
                "range is entity_ref but names no entity",
            ),
        }
    }
    sink.finish()
}

/// Both ends must resolve; cardinality as for properties. A foreign scope is
/// a [`IssueKind::ScopeMismatch`] issue, not an `Err`.
pub fn validate_relation(
    scope: &TenantScope,
    relation: &RelationDef,
    store: &OntologyStore,
) -> Vec<ValidationIssue> {
    let mut sink = IssueSink::new(
        ArtifactKind::Relation,
        "Relation",
        relation.local_name.clone(),
    );
    if !sink.scope_matches(scope, &relation.scope) {
        return sink.finish();
    }
    sink.require_entity(store, scope, "from entity", &relation.from_entity);
    sink.require_entity(store, scope, "to entity", &relation.to_entity);
    sink.check_cardinality("", &relation.cardinality);
    sink.finish()
}

/// A foreign scope is a [`IssueKind::ScopeMismatch`] issue, not an `Err`.
pub fn validate_enum(
    scope: &TenantScope,
    def: &EnumDef,
    _store: &OntologyStore,
) -> Vec<ValidationIssue> {
    let mut sink = IssueSink::new(ArtifactKind::Enum, "Enum", def.local_name.clone());
    if !sink.scope_matches(scope, &def.scope) {
        return sink.finish();
    }
    if def.local_name.trim().is_empty() {
        sink.push(IssueKind::MissingName, "local name is empty");
    }
    if def.values.is_empty() {
        sink.push(IssueKind::EmptyEnum, "has no values");
    }

    // ordinal comparison; each duplicated value is reported once
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for value in &def.values {
        if !seen.insert(value.as_str()) && reported.insert(value.as_str()) {
            sink.push(
                IssueKind::DuplicateEnumValue,
                format_args!("duplicate value '{value}'"),
            );
        }
    }
    sink.finish()
}

/// Target entity, then each constraint's property (owned by the target) and
/// bounds. A foreign scope is a [`IssueKind::ScopeMismatch`] issue, not an
/// `Err`.
pub fn validate_shape(
    scope: &TenantScope,
    shape: &ShapeDef,
    store: &OntologyStore,
) -> Vec<ValidationIssue> {
    let mut sink = IssueSink::new(ArtifactKind::Shape, "Shape", shape.local_name.clone());
    if !sink.scope_matches(scope, &shape.scope) {
        return sink.finish();
    }
    let target = shape.applies_to_entity.as_str();
    sink.require_entity(store, scope, "target entity", target);

    for constraint in &shape.constraints {
        // a same-named property on another entity does not count
        if store.get_property(scope, target, &constraint.property).is_none() {
            sink.push(
                IssueKind::ReferentialIntegrity,
                format_args!(
                    "constrained property '{}' not found on entity '{target}'",
                    constraint.property
                ),
            );
        }
        let prefix = format!("constraint '{}' ", constraint.property);
        sink.check_cardinality(&prefix, &constraint.cardinality);
    }
    sink.finish()
}
