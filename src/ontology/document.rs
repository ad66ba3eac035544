//! Ontology documents: one scope's artifacts in a YAML or JSON file.
//!
//! ```yaml
//! scope: { tenant: acme, package: core, channel: stable }
//! entities:
//!   - local_name: Order
//!     parents: [Document]
//! properties:
//!   - owner_entity: Order
//!     local_name: total
//!     min_cardinality: 1
//!     max_cardinality: 1
//! ```
//!
//! Artifacts may omit `scope`; the document header is stamped onto them. An
//! artifact that names a different scope is rejected when the document is
//! indexed.

use super::store::OntologyStore;
use crate::domain::{Artifact, TenantScope};
use crate::error::OntologyError;
pub use crate::format::DocumentFormat;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct RawDocument {
    scope: TenantScope,
    #[serde(default)]
    entities: Vec<Value>,
    #[serde(default)]
    properties: Vec<Value>,
    #[serde(default)]
    relations: Vec<Value>,
    #[serde(default)]
    enums: Vec<Value>,
    #[serde(default)]
    aliases: Vec<Value>,
    #[serde(default)]
    shapes: Vec<Value>,
}

/// Parsed document: a scope header and its artifacts.
#[derive(Debug, Clone)]
pub struct OntologyDocument {
    pub scope: TenantScope,
    pub artifacts: Vec<Artifact>,
}

impl OntologyDocument {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, OntologyError> {
        let path = path.as_ref();
        let fail = |reason: String| OntologyError::Document {
            path: path.to_path_buf(),
            reason,
        };
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| fail("unsupported extension, expected .yaml, .yml or .json".into()))?;
        let contents = fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        Self::parse_at(&contents, format, path)
    }

    pub fn parse(contents: &str, format: DocumentFormat) -> Result<Self, OntologyError> {
        Self::parse_at(contents, format, Path::new("<inline>"))
    }

    fn parse_at(contents: &str, format: DocumentFormat, path: &Path) -> Result<Self, OntologyError> {
        let fail = |reason: String| OntologyError::Document {
            path: PathBuf::from(path),
            reason,
        };
        let raw: RawDocument = format.decode(contents).map_err(fail)?;

        let scope_value = serde_json::to_value(&raw.scope).map_err(|e| fail(e.to_string()))?;
        let mut artifacts = Vec::new();
        let sections = Sections {
            scope: &scope_value,
            path,
        };
        sections.decode("entities", raw.entities, Artifact::Entity, &mut artifacts)?;
        sections.decode("properties", raw.properties, Artifact::Property, &mut artifacts)?;
        sections.decode("relations", raw.relations, Artifact::Relation, &mut artifacts)?;
        sections.decode("enums", raw.enums, Artifact::Enum, &mut artifacts)?;
        sections.decode("aliases", raw.aliases, Artifact::Alias, &mut artifacts)?;
        sections.decode("shapes", raw.shapes, Artifact::Shape, &mut artifacts)?;

        tracing::debug!(
            path = %path.display(),
            scope = %raw.scope,
            artifacts = artifacts.len(),
            "parsed ontology document"
        );
        Ok(Self {
            scope: raw.scope,
            artifacts,
        })
    }

    /// Indexes the document into a fresh store.
    pub fn into_store(self) -> Result<OntologyStore, OntologyError> {
        let mut store = OntologyStore::new();
        store.upsert(&self.scope, self.artifacts)?;
        Ok(store)
    }
}

/// Decodes document sections, stamping the header scope on each entry.
struct Sections<'a> {
    scope: &'a Value,
    path: &'a Path,
}

impl Sections<'_> {
    fn decode<T: DeserializeOwned>(
        &self,
        section: &str,
        values: Vec<Value>,
        wrap: fn(T) -> Artifact,
        out: &mut Vec<Artifact>,
    ) -> Result<(), OntologyError> {
        for (position, mut value) in values.into_iter().enumerate() {
            if let Value::Object(map) = &mut value {
                map.entry("scope").or_insert_with(|| self.scope.clone());
            }
            let artifact: T =
                serde_json::from_value(value).map_err(|e| OntologyError::Document {
                    path: self.path.to_path_buf(),
                    reason: format!("{section}[{position}]: {e}"),
                })?;
            out.push(wrap(artifact));
        }
        Ok(())
    }
}
