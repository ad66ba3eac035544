//! End-to-end runs of the `validate` and `check` commands against fixture
//! files.

use ontology_gate::{Command, GateConfig, TenantScope, run};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const ONTOLOGY: &str = r#"
scope: { tenant: acme, package: core, channel: stable }
entities:
  - local_name: Order
properties:
  - owner_entity: Order
    local_name: status
    min_cardinality: 1
    max_cardinality: 1
enums:
  - local_name: OrderStatus
    values: [open, shipped]
"#;

const BROKEN_ONTOLOGY: &str = r#"
scope: { tenant: acme, package: core, channel: stable }
properties:
  - owner_entity: Ghost
    local_name: status
"#;

const GRAPH: &str = r#"
v1:
  label: Order
  status: open
"#;

const PRECONDITIONS: &str = r#"
- {}
- predicate: ldm:status
  expected: OPEN
"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn check(dir: &TempDir, ontology: &str, id: &str) -> Command {
    Command::Check {
        ontology: write(dir.path(), "ontology.yaml", ontology),
        graph: write(dir.path(), "graph.yaml", GRAPH),
        label: "Order".into(),
        id: id.into(),
        preconditions: write(dir.path(), "preconditions.yaml", PRECONDITIONS),
    }
}

#[tokio::test]
async fn test_validate_reports_validity() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "good.yaml", ONTOLOGY);
    let bad = write(dir.path(), "bad.yaml", BROKEN_ONTOLOGY);

    let passed = run(
        GateConfig::default(),
        Command::Validate { ontology: good },
        CancellationToken::new(),
    )
    .await
    .unwrap();
    assert!(passed);

    let passed = run(
        GateConfig::default(),
        Command::Validate { ontology: bad },
        CancellationToken::new(),
    )
    .await
    .unwrap();
    assert!(!passed);
}

#[tokio::test]
async fn test_validate_rejects_foreign_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "ontology.yaml", ONTOLOGY);
    let config = GateConfig {
        scope: Some(TenantScope::parse("globex", "core", "stable").unwrap()),
        ..GateConfig::default()
    };

    let err = run(config, Command::Validate { ontology: path }, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("scope"));
}

#[tokio::test]
async fn test_check_passes_and_fails() {
    let dir = tempfile::tempdir().unwrap();

    let passed = run(GateConfig::default(), check(&dir, ONTOLOGY, "v1"), CancellationToken::new())
        .await
        .unwrap();
    assert!(passed);

    let passed = run(GateConfig::default(), check(&dir, ONTOLOGY, "v2"), CancellationToken::new())
        .await
        .unwrap();
    assert!(!passed);
}

#[tokio::test]
async fn test_check_refuses_invalid_ontology() {
    let dir = tempfile::tempdir().unwrap();

    let passed = run(
        GateConfig::default(),
        check(&dir, BROKEN_ONTOLOGY, "v1"),
        CancellationToken::new(),
    )
    .await
    .unwrap();
    assert!(!passed);
}

#[tokio::test]
async fn test_check_surfaces_cancellation_as_error() {
    let dir = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = run(GateConfig::default(), check(&dir, ONTOLOGY, "v1"), cancel).await;
    assert!(result.is_err());
}
