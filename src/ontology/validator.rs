//! Aggregate validation over every artifact of a scope.

use super::store::OntologyStore;
use super::validators::{
    IssueKind, ValidationIssue, validate_entity, validate_enum, validate_property,
    validate_relation, validate_shape,
};
use crate::domain::TenantScope;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of artifacts checked per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStats {
    pub entities: usize,
    pub properties: usize,
    pub relations: usize,
    pub enums: usize,
    pub shapes: usize,
}

impl ValidationStats {
    pub fn total(&self) -> usize {
        self.entities + self.properties + self.relations + self.enums + self.shapes
    }
}

/// Result of validating one scope: every issue, in a deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub scope: Option<TenantScope>,
    pub issues: Vec<ValidationIssue>,
    pub stats: ValidationStats,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Plain-text messages in report order.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(|issue| issue.message.clone()).collect()
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|issue| issue.kind == kind).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "Validation Report: {} artifacts checked, {} issues",
            self.stats.total(),
            self.issues.len()
        )
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  [{}] {}", issue.kind, issue.message)?;
        }
        Ok(())
    }
}

/// Runs every per-kind validator over a store snapshot.
///
/// Collect-all: one bad artifact never stops the others from being checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct OntologyValidator;

impl OntologyValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, store: &OntologyStore, scope: &TenantScope) -> ValidationReport {
        let mut report = ValidationReport {
            scope: Some(scope.clone()),
            ..ValidationReport::default()
        };

        for entity in store.list_entities(scope) {
            report.stats.entities += 1;
            report.issues.extend(validate_entity(scope, entity, store));
        }
        for property in store.list_properties(scope) {
            report.stats.properties += 1;
            report.issues.extend(validate_property(scope, property, store));
        }
        for relation in store.list_relations(scope) {
            report.stats.relations += 1;
            report.issues.extend(validate_relation(scope, relation, store));
        }
        for def in store.list_enums(scope) {
            report.stats.enums += 1;
            report.issues.extend(validate_enum(scope, def, store));
        }
        for shape in store.list_shapes(scope) {
            report.stats.shapes += 1;
            report.issues.extend(validate_shape(scope, shape, store));
        }

        if report.is_valid() {
            tracing::info!(scope = %scope, artifacts = report.stats.total(), "ontology valid");
        } else {
            tracing::info!(
                scope = %scope,
                artifacts = report.stats.total(),
                issues = report.issues.len(),
                referential = report.count(IssueKind::ReferentialIntegrity),
                cardinality = report.count(IssueKind::Cardinality),
                "ontology has validation issues"
            );
        }
        report
    }
}
