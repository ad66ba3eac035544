//! Ontology validation across scopes
//!
//! Exercises the store and the collect-all validator together: every issue in
//! a scope is reported in one pass, scopes never see each other's artifacts,
//! and repeated validation of the same content is deterministic.

use assert_matches::assert_matches;
use ontology_gate::domain::{
    AliasDef, Artifact, ArtifactKey, ArtifactKind, EntityDef, EnumDef, PropertyConstraint,
    PropertyDef, PropertyRange, RelationDef, ShapeDef,
};
use ontology_gate::ontology::{
    InMemoryOntologyRepository, IssueKind, OntologyCatalog, OntologyRepository,
};
use ontology_gate::{OntologyError, OntologyStore, OntologyValidator, TenantScope};
use proptest::prelude::*;
use std::sync::Arc;

fn scope(tenant: &str) -> TenantScope {
    TenantScope::parse(tenant, "core", "stable").unwrap()
}

/// A small, valid order model.
fn order_model(scope: &TenantScope) -> OntologyStore {
    let mut store = OntologyStore::new();
    store
        .upsert_entities(
            scope,
            [
                EntityDef::new(scope.clone(), "Document"),
                EntityDef::new(scope.clone(), "Customer"),
                EntityDef::new(scope.clone(), "Order").with_parent("Document"),
            ],
        )
        .unwrap();
    store
        .upsert_properties(
            scope,
            [
                PropertyDef::new(scope.clone(), "Order", "total").with_cardinality(1, Some(1)),
                PropertyDef::new(scope.clone(), "Order", "customer")
                    .with_range(PropertyRange::entity_ref("Customer")),
            ],
        )
        .unwrap();
    store
        .upsert_relations(
            scope,
            [RelationDef::new(scope.clone(), "places", "Customer", "Order")],
        )
        .unwrap();
    store
        .upsert_enums(
            scope,
            [EnumDef::new(scope.clone(), "OrderStatus", ["open", "shipped"])],
        )
        .unwrap();
    store
        .upsert_shapes(
            scope,
            [ShapeDef::new(scope.clone(), "OrderShape", "Order")
                .with_constraint(PropertyConstraint::new("total", 1, Some(1)))],
        )
        .unwrap();
    store
}

#[test]
fn test_valid_model_has_no_issues() {
    let acme = scope("acme");
    let store = order_model(&acme);

    let report = OntologyValidator::new().validate(&store, &acme);

    assert!(report.is_valid(), "unexpected issues:\n{report}");
    assert_eq!(report.stats.entities, 3);
    assert_eq!(report.stats.total(), 8);
}

#[test]
fn test_every_broken_artifact_is_reported() {
    let acme = scope("acme");
    let mut store = order_model(&acme);
    store
        .upsert_properties(
            &acme,
            [
                PropertyDef::new(acme.clone(), "Invoice", "number"),
                PropertyDef::new(acme.clone(), "Order", "lines").with_cardinality(3, Some(1)),
            ],
        )
        .unwrap();
    store
        .upsert_relations(&acme, [RelationDef::new(acme.clone(), "ships", "Order", "Parcel")])
        .unwrap();
    store
        .upsert_enums(&acme, [EnumDef::new(acme.clone(), "Empty", Vec::<String>::new())])
        .unwrap();

    let report = OntologyValidator::new().validate(&store, &acme);

    assert_eq!(report.issues.len(), 4, "{report}");
    assert_eq!(report.count(IssueKind::ReferentialIntegrity), 2);
    assert_eq!(report.count(IssueKind::Cardinality), 1);
    assert_eq!(report.count(IssueKind::EmptyEnum), 1);

    let messages = report.messages();
    assert!(messages.iter().any(|m| m.contains("Invoice")));
    assert!(messages.iter().any(|m| m.contains("Parcel")));
    assert!(
        messages
            .iter()
            .any(|m| m.contains("MinCardinality (3) cannot exceed MaxCardinality (1)"))
    );
}

#[test]
fn test_min_above_max_yields_exactly_one_issue() {
    let acme = scope("acme");
    let mut store = OntologyStore::new();
    store
        .upsert_entities(&acme, [EntityDef::new(acme.clone(), "Order")])
        .unwrap();
    store
        .upsert_properties(
            &acme,
            [PropertyDef::new(acme.clone(), "Order", "lines").with_cardinality(3, Some(1))],
        )
        .unwrap();

    let report = OntologyValidator::new().validate(&store, &acme);

    assert_eq!(report.issues.len(), 1);
    let issue = &report.issues[0];
    assert_eq!(issue.kind, IssueKind::Cardinality);
    assert_eq!(issue.artifact_kind, ArtifactKind::Property);
    assert!(issue.message.contains("MinCardinality"));
    assert!(issue.message.contains("MaxCardinality"));
}

#[test]
fn test_scopes_do_not_see_each_other() {
    let acme = scope("acme");
    let globex = scope("globex");
    let mut store = OntologyStore::new();
    store
        .upsert_entities(&acme, [EntityDef::new(acme.clone(), "Widget")])
        .unwrap();
    store
        .upsert_entities(
            &globex,
            [EntityDef::new(globex.clone(), "Gadget").with_parent("Widget")],
        )
        .unwrap();

    assert!(store.get_entity(&globex, "Widget").is_none());
    assert_eq!(store.list_entities(&globex).count(), 1);

    let report = OntologyValidator::new().validate(&store, &globex);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, IssueKind::ReferentialIntegrity);
    assert!(report.issues[0].message.contains("Widget"));

    assert!(OntologyValidator::new().validate(&store, &acme).is_valid());
}

#[test]
fn test_cross_scope_upsert_is_rejected_whole() {
    let acme = scope("acme");
    let globex = scope("globex");
    let mut store = OntologyStore::new();

    let result = store.upsert_entities(
        &acme,
        [
            EntityDef::new(acme.clone(), "Widget"),
            EntityDef::new(globex.clone(), "Gadget"),
        ],
    );

    assert_matches!(result, Err(OntologyError::ScopeMismatch { .. }));
    assert!(store.is_empty());
}

#[test]
fn test_enum_rules() {
    let acme = scope("acme");
    let mut store = OntologyStore::new();
    store
        .upsert_enums(
            &acme,
            [
                EnumDef::new(acme.clone(), "Empty", Vec::<String>::new()),
                EnumDef::new(acme.clone(), "Dupes", ["a", "b", "a", "a", "B"]),
                EnumDef::new(acme.clone(), "Fine", ["x", "y"]),
            ],
        )
        .unwrap();

    let report = OntologyValidator::new().validate(&store, &acme);

    assert_eq!(report.count(IssueKind::EmptyEnum), 1);
    // "a" appears three times and is reported once; "b" and "B" differ
    assert_eq!(report.count(IssueKind::DuplicateEnumValue), 1);
    assert_eq!(report.issues.len(), 2);
}

#[test]
fn test_shape_checks_entity_and_properties() {
    let acme = scope("acme");
    let mut store = order_model(&acme);
    store
        .upsert_shapes(
            &acme,
            [
                ShapeDef::new(acme.clone(), "GhostShape", "Ghost"),
                ShapeDef::new(acme.clone(), "OrderShape", "Order")
                    .with_constraint(PropertyConstraint::new("dueDate", 0, None))
                    .with_constraint(PropertyConstraint::new("total", 5, Some(2))),
            ],
        )
        .unwrap();

    let report = OntologyValidator::new().validate(&store, &acme);

    assert_eq!(report.count(IssueKind::ReferentialIntegrity), 2, "{report}");
    assert_eq!(report.count(IssueKind::Cardinality), 1, "{report}");
    assert!(report.messages().iter().any(|m| m.contains("dueDate")));
}

#[test]
fn test_kind_erased_operations() {
    let acme = scope("acme");
    let mut store = order_model(&acme);

    let key = ArtifactKey::Property {
        owner: "Order".into(),
        name: "total".into(),
    };
    assert_matches!(store.get(&acme, &key), Some(Artifact::Property(p)) if p.local_name == "total");
    assert_eq!(store.list(&acme, ArtifactKind::Entity).len(), 3);

    assert!(store.delete(&acme, &key));
    assert!(!store.delete(&acme, &key));
    assert!(store.get(&acme, &key).is_none());
}

#[test]
fn test_alias_resolution_prefers_locale() {
    let acme = scope("acme");
    let mut store = order_model(&acme);
    store
        .upsert_aliases(
            &acme,
            [
                AliasDef::new(acme.clone(), "purchase", "Order", "Purchase"),
                AliasDef::new(acme.clone(), "purchase_gb", "Customer", "Purchase").with_locale("en-GB"),
            ],
        )
        .unwrap();

    assert_eq!(store.resolve_alias(&acme, "purchase", None), Some("Order"));
    assert_eq!(store.resolve_alias(&acme, "Purchase", Some("en-gb")), Some("Customer"));
    assert_eq!(store.resolve_alias(&acme, "Purchase", Some("fr")), Some("Order"));
    assert_eq!(store.resolve_alias(&scope("globex"), "Purchase", None), None);
}

#[tokio::test]
async fn test_catalog_serves_validated_snapshots() {
    let acme = scope("acme");
    let repository: Arc<dyn OntologyRepository> =
        Arc::new(InMemoryOntologyRepository::from_store(order_model(&acme)));
    let catalog = OntologyCatalog::new(repository.clone(), 4);

    let first = catalog.snapshot(&acme).await.unwrap();
    assert!(first.is_valid());
    let second = catalog.snapshot(&acme).await.unwrap();
    assert!(Arc::ptr_eq(&first.store, &second.store));
    assert_eq!(catalog.stats().hits, 1);

    repository
        .upsert(
            &acme,
            vec![Artifact::Property(PropertyDef::new(acme.clone(), "Ghost", "x"))],
        )
        .await
        .unwrap();
    let refreshed = catalog.refresh(&acme).await.unwrap();
    assert!(!refreshed.is_valid());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Invariant: one issue per dangling parent, however many there are
    #[test]
    fn invariant_validation_collects_all(count in 1usize..25) {
        let acme = scope("acme");
        let mut store = OntologyStore::new();
        store
            .upsert_entities(
                &acme,
                (0..count).map(|i| {
                    EntityDef::new(acme.clone(), format!("Child{i}")).with_parent(format!("Missing{i}"))
                }),
            )
            .unwrap();

        let report = OntologyValidator::new().validate(&store, &acme);
        prop_assert_eq!(report.issues.len(), count);
        prop_assert_eq!(report.count(IssueKind::ReferentialIntegrity), count);
    }

    /// Invariant: insertion order never changes the report
    #[test]
    fn invariant_report_is_order_independent(
        names in prop::collection::btree_set("[A-Z][a-z]{1,6}", 1..12),
        seed in any::<u64>(),
    ) {
        let acme = scope("acme");
        let forward: Vec<String> = names.iter().cloned().collect();
        let mut shuffled = forward.clone();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        shuffled.reverse();

        let build = |order: &[String]| {
            let mut store = OntologyStore::new();
            store
                .upsert_relations(
                    &acme,
                    order
                        .iter()
                        .map(|n| RelationDef::new(acme.clone(), n.clone(), n.clone(), "Nowhere")),
                )
                .unwrap();
            OntologyValidator::new().validate(&store, &acme).messages()
        };

        prop_assert_eq!(build(&forward), build(&shuffled));
    }
}
