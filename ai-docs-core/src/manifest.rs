//! Reads the project's `package.json` into a list of [`DependencyEntry`].
//!
//! `dependencies` and `devDependencies` are merged in that order; a name that
//! appears in both keeps its first position and takes the later version.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::contract::DependencyEntry;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found at {0}")]
    Missing(PathBuf),
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
    #[serde(default)]
    dependencies: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    dev_dependencies: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Loads the dependency set declared by the manifest at `path`.
pub fn load_dependencies(path: &Path) -> Result<Vec<DependencyEntry>, ManifestError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!(manifest = %path.display(), "[LEDGER] package.json not found");
            return Err(ManifestError::Missing(path.to_path_buf()));
        }
        Err(e) => {
            error!(error = ?e, manifest = %path.display(), "[LEDGER] Failed to read manifest");
            return Err(ManifestError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    parse_dependencies(&content).map_err(|e| {
        error!(error = %e, manifest = %path.display(), "[LEDGER] Failed to parse manifest");
        ManifestError::Invalid {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// Parses manifest JSON text into its merged dependency list.
pub fn parse_dependencies(content: &str) -> Result<Vec<DependencyEntry>, serde_json::Error> {
    let manifest: PackageManifest = serde_json::from_str(content)?;

    let mut entries: Vec<DependencyEntry> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    let sections = [manifest.dependencies, manifest.dev_dependencies];
    for section in sections.into_iter().flatten() {
        for (name, version) in section {
            let version: String = serde_json::from_value(version)?;
            match positions.get(&name) {
                Some(&idx) => {
                    debug!(name = %name, old = %entries[idx].version, new = %version, "[LEDGER] Duplicate dependency, later section wins");
                    entries[idx].version = version;
                }
                None => {
                    positions.insert(name.clone(), entries.len());
                    entries.push(DependencyEntry { name, version });
                }
            }
        }
    }

    info!(count = entries.len(), "[LEDGER] Loaded dependencies from manifest");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_sections_with_dev_dependencies_winning() {
        let entries = parse_dependencies(
            r#"{
                "name": "app",
                "dependencies": {"a": "1.0.0", "shared": "1.0.0"},
                "devDependencies": {"shared": "2.0.0", "b": "3.0.0"}
            }"#,
        )
        .unwrap();
        assert_eq!(
            entries,
            vec![
                DependencyEntry::new("a", "1.0.0"),
                DependencyEntry::new("shared", "2.0.0"),
                DependencyEntry::new("b", "3.0.0"),
            ]
        );
    }

    #[test]
    fn missing_sections_yield_empty_set() {
        assert!(parse_dependencies(r#"{"name": "app"}"#).unwrap().is_empty());
        assert!(parse_dependencies(r#"{"dependencies": null}"#).unwrap().is_empty());
    }

    #[test]
    fn non_string_versions_are_rejected() {
        assert!(parse_dependencies(r#"{"dependencies": {"a": 1}}"#).is_err());
        assert!(parse_dependencies("not json").is_err());
    }
}
