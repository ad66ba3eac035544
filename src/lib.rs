pub mod config;
pub mod domain;
pub mod error;
pub mod format;
pub mod graph;
pub mod logging;
pub mod ontology;

pub use config::{CliArgs, Command, GateConfig};
pub use domain::TenantScope;
pub use error::{ErrorCode, OntologyError};
pub use graph::{
    GraphPreconditionsService, GraphReader, Precondition, PreconditionError, PreconditionOutcome,
    PropertyKeyMapper,
};
pub use logging::{LoggingConfig, init_logging};
pub use ontology::{OntologyStore, OntologyValidator, ValidationReport};

use anyhow::{Context, Result};
use graph::{InMemoryGraph, PreconditionSpec};
use ontology::{InMemoryOntologyRepository, OntologyCatalog, OntologyDocument, OntologyRepository};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs one CLI command. Returns `Ok(false)` when the ontology is invalid or
/// a precondition does not hold.
pub async fn run(config: GateConfig, command: Command, cancel: CancellationToken) -> Result<bool> {
    match command {
        Command::Validate { ontology } => {
            let (scope, store) = load_document(&config, &ontology)?;
            let report = OntologyValidator::new().validate(&store, &scope);
            print!("{report}");
            Ok(report.is_valid())
        }
        Command::Check {
            ontology,
            graph,
            label,
            id,
            preconditions,
        } => {
            let (scope, store) = load_document(&config, &ontology)?;

            let repository: Arc<dyn OntologyRepository> =
                Arc::new(InMemoryOntologyRepository::from_store(store));
            let catalog = OntologyCatalog::new(repository, config.catalog_capacity);
            let snapshot = catalog.snapshot(&scope).await?;
            if !snapshot.is_valid() {
                print!("{}", snapshot.report);
                tracing::warn!(scope = %scope, "refusing to evaluate against an invalid ontology");
                return Ok(false);
            }

            let preconditions = load_preconditions(&preconditions)?;
            let graph = Arc::new(InMemoryGraph::from_path(&graph)?);
            let mut service = GraphPreconditionsService::new(graph, Arc::new(config.mapper()));
            if let Some(limit) = config.read_timeout {
                service = service.with_read_timeout(limit);
            }

            let outcome = service
                .evaluate_all(&label, &id, &preconditions, &cancel)
                .await
                .with_context(|| format!("could not evaluate preconditions for {label}/{id}"))?;
            println!("{label}/{id}: {outcome}");
            Ok(outcome.passed)
        }
    }
}

/// Loads a document and checks it against the configured scope, if any.
fn load_document(config: &GateConfig, path: &Path) -> Result<(TenantScope, OntologyStore)> {
    let document = OntologyDocument::from_path(path)?;
    let scope = document.scope.clone();
    if let Some(expected) = &config.scope {
        expected.ensure_same(&scope)?;
    }
    let store = document.into_store()?;
    Ok((scope, store))
}

fn load_preconditions(path: &Path) -> Result<Vec<Precondition>> {
    let specs: Vec<PreconditionSpec> = format::load_file(path, "preconditions")?;
    Ok(specs.into_iter().map(Precondition::from).collect())
}
