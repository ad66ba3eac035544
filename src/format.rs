//! YAML/JSON file handling shared by config, ontology documents, graph
//! fixtures and precondition lists. The format is chosen by extension.

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Deserializes `contents`; the error is the parser's message.
    pub fn decode<T: DeserializeOwned>(self, contents: &str) -> Result<T, String> {
        match self {
            Self::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
        }
    }
}

/// Reads and deserializes `path`. `what` names the file in error messages.
pub fn load_file<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let format = DocumentFormat::from_path(path).with_context(|| {
        format!("unsupported {what} extension {:?}, expected .yaml, .yml or .json", path)
    })?;
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {what} {:?}", path))?;
    format
        .decode(&contents)
        .map_err(|reason| anyhow!("failed to parse {what} {:?}: {reason}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_format_follows_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.YML")), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), Some(DocumentFormat::Json));
        assert_eq!(DocumentFormat::from_path(Path::new("a.toml")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_load_file_reads_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("map.yaml");
        let json = dir.path().join("map.json");
        fs::write(&yaml, "a: b\n").unwrap();
        fs::write(&json, r#"{"a": "b"}"#).unwrap();

        let from_yaml: HashMap<String, String> = load_file(&yaml, "map").unwrap();
        let from_json: HashMap<String, String> = load_file(&json, "map").unwrap();
        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn test_load_file_names_the_file_kind() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("gate.toml");
        fs::write(&bad, "").unwrap();
        let err = load_file::<HashMap<String, String>>(&bad, "config").unwrap_err();
        assert!(err.to_string().contains("unsupported config extension"));

        let broken = dir.path().join("gate.json");
        fs::write(&broken, "{").unwrap();
        let err = load_file::<HashMap<String, String>>(&broken, "config").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse config"));
    }
}
