//! Ontology predicate to storage key mapping.
//!
//! Predicates are CURIEs (`prefix:localName`) or full IRIs. Explicit
//! mappings are case-insensitive. Anything unmapped falls back to the text
//! after the last `:`, `/` or `#`, so every well-formed predicate maps to
//! some non-empty key. Fallback keys are best effort and are tagged as such.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::Display;

/// Generic vertex property holding the vertex label.
pub const DEFAULT_LABEL_KEY: &str = "label";

/// How a key was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum KeySource {
    /// Configured mapping
    Explicit,
    /// Local-name extraction from the predicate text
    Fallback,
    /// Empty predicate, generic label key
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedKey {
    pub key: String,
    pub source: KeySource,
}

impl MappedKey {
    pub fn is_explicit(&self) -> bool {
        self.source == KeySource::Explicit
    }
}

/// Maps predicates to vertex-property keys and edge labels.
#[derive(Debug, Clone)]
pub struct PropertyKeyMapper {
    property_keys: HashMap<String, String>,
    edge_labels: HashMap<String, String>,
    label_key: String,
}

impl Default for PropertyKeyMapper {
    fn default() -> Self {
        Self::new(HashMap::new(), HashMap::new())
    }
}

fn normalize(predicate: &str) -> String {
    predicate.trim().to_lowercase()
}

/// Case-folds configured predicates. Entries are visited in sorted order and
/// the first spelling of a folded predicate wins.
fn fold_keys(map: HashMap<String, String>) -> HashMap<String, String> {
    let mut entries: Vec<_> = map.into_iter().collect();
    entries.sort();
    let mut folded = HashMap::with_capacity(entries.len());
    for (predicate, target) in entries {
        let key = normalize(&predicate);
        if let Some(kept) = folded.get(&key) {
            tracing::warn!(predicate = %predicate, ignored = %target, kept = %kept, "predicate mapped twice ignoring case");
            continue;
        }
        folded.insert(key, target);
    }
    folded
}

impl PropertyKeyMapper {
    pub fn new(property_keys: HashMap<String, String>, edge_labels: HashMap<String, String>) -> Self {
        Self {
            property_keys: fold_keys(property_keys),
            edge_labels: fold_keys(edge_labels),
            label_key: DEFAULT_LABEL_KEY.to_string(),
        }
    }

    /// Overrides the key used for existence checks and empty predicates.
    pub fn with_label_key(mut self, label_key: impl Into<String>) -> Self {
        self.label_key = label_key.into();
        self
    }

    pub fn label_key(&self) -> &str {
        &self.label_key
    }

    /// Explicitly mapped vertex-property key, if any.
    pub fn try_map_property_key(&self, predicate: &str) -> Option<&str> {
        self.property_keys
            .get(&normalize(predicate))
            .map(String::as_str)
    }

    /// Explicitly mapped edge label, if any.
    pub fn try_map_edge_label(&self, predicate: &str) -> Option<&str> {
        self.edge_labels
            .get(&normalize(predicate))
            .map(String::as_str)
    }

    /// Property key for `predicate`: explicit mapping, else local name, else
    /// the label key for an empty predicate.
    pub fn map_property_key(&self, predicate: &str) -> MappedKey {
        self.resolve(predicate, self.try_map_property_key(predicate))
    }

    /// Edge label for `predicate`, with the same fallback rules.
    pub fn map_edge_label(&self, predicate: &str) -> MappedKey {
        self.resolve(predicate, self.try_map_edge_label(predicate))
    }

    fn resolve(&self, predicate: &str, explicit: Option<&str>) -> MappedKey {
        let predicate = predicate.trim();
        if predicate.is_empty() {
            return MappedKey {
                key: self.label_key.clone(),
                source: KeySource::Default,
            };
        }
        match explicit {
            Some(key) => MappedKey {
                key: key.to_string(),
                source: KeySource::Explicit,
            },
            None => MappedKey {
                key: local_name(predicate).to_string(),
                source: KeySource::Fallback,
            },
        }
    }
}

/// Text after the last `:`, `/` or `#`; the whole predicate when there is no
/// separator or nothing follows the last one.
pub fn local_name(predicate: &str) -> &str {
    match predicate.rfind([':', '/', '#']) {
        Some(idx) if idx + 1 < predicate.len() => &predicate[idx + 1..],
        _ => predicate,
    }
}
