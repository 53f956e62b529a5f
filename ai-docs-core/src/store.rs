//! # store: the on-disk documentation directory
//!
//! Every processed library owns two files in the docs directory:
//!
//! - `<key>_summary.json`: the [`SummaryView`], whose `version` is the cached
//!   version the ledger compares against.
//! - `<key>_index.json`: the [`IndexView`].
//!
//! `<key>` is the library name with `/` replaced by `+`, so scoped packages
//! (`@scope/pkg`) stay in a single flat directory. The library `consolidated`
//! is keyed `_consolidated` so its index view never lands on
//! [`CONSOLIDATED_FILE`].
//!
//! All writes go through a temporary file in the docs directory followed by a
//! rename, so a reader never observes a half-written document. Reads validate
//! against the view schema and report anything else as [`StoreError::Corrupt`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::contract::{CachedArtifactRecord, IndexView, SummaryView};

const SUMMARY_SUFFIX: &str = "_summary.json";
const INDEX_SUFFIX: &str = "_index.json";
pub const CONSOLIDATED_FILE: &str = "consolidated_index.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialise {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("corrupt document {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Library whose plain key would make its index view `consolidated_index.json`.
const RESERVED_LIBRARY: &str = "consolidated";
/// Prefix for escaped keys. npm names never start with `_`, so no real key does.
const ESCAPE_PREFIX: char = '_';

/// File-name key for a library name.
pub fn key_for(library: &str) -> String {
    let key = library.replace('/', "+");
    if key == RESERVED_LIBRARY || key.starts_with(ESCAPE_PREFIX) {
        format!("{ESCAPE_PREFIX}{key}")
    } else {
        key
    }
}

/// Library name for a file-name key; inverse of [`key_for`].
pub fn library_for_key(key: &str) -> String {
    let key = key.strip_prefix(ESCAPE_PREFIX).unwrap_or(key);
    key.replace('+', "/")
}

#[derive(Debug, Clone)]
pub struct DocsStore {
    docs_dir: PathBuf,
}

impl DocsStore {
    pub fn new(docs_dir: impl Into<PathBuf>) -> Self {
        Self {
            docs_dir: docs_dir.into(),
        }
    }

    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    pub fn summary_path(&self, library: &str) -> PathBuf {
        self.docs_dir
            .join(format!("{}{SUMMARY_SUFFIX}", key_for(library)))
    }

    pub fn index_path(&self, library: &str) -> PathBuf {
        self.docs_dir.join(format!("{}{INDEX_SUFFIX}", key_for(library)))
    }

    pub fn consolidated_path(&self) -> PathBuf {
        self.docs_dir.join(CONSOLIDATED_FILE)
    }

    /// Persists both views of `record`.
    ///
    /// The index view goes first: the summary view carries the cached version,
    /// so a failure between the two writes leaves the library stale.
    pub fn write_record(&self, record: &CachedArtifactRecord) -> Result<(), StoreError> {
        self.write_index(&record.library_name, &IndexView::from(record))?;
        self.write_summary(&SummaryView::from(record))?;
        info!(
            library = %record.library_name,
            version = %record.cached_version,
            functions = record.functions.len(),
            "[STORE] Saved summary and index"
        );
        Ok(())
    }

    pub fn write_summary(&self, view: &SummaryView) -> Result<(), StoreError> {
        self.write_json_atomic(&self.summary_path(&view.name), view)
    }

    pub fn write_index(&self, library: &str, view: &IndexView) -> Result<(), StoreError> {
        self.write_json_atomic(&self.index_path(library), view)
    }

    /// Reads a library's summary view. `Ok(None)` when none has been written.
    pub fn read_summary(&self, library: &str) -> Result<Option<SummaryView>, StoreError> {
        let path = self.summary_path(library);
        let Some(view) = read_json::<SummaryView>(&path)? else {
            return Ok(None);
        };
        if view.name != library {
            return Err(StoreError::Corrupt {
                path,
                reason: format!("records library '{}', expected '{library}'", view.name),
            });
        }
        Ok(Some(view))
    }

    /// Reads a library's index view. `Ok(None)` when none has been written.
    pub fn read_index(&self, library: &str) -> Result<Option<IndexView>, StoreError> {
        read_json(&self.index_path(library))
    }

    /// Names of all libraries with a summary view on disk, sorted.
    ///
    /// A docs directory that does not exist yet holds no libraries.
    pub fn list_libraries(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.docs_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.docs_dir, e)),
        };
        let mut libraries = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.docs_dir, e))?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(key) = file_name.strip_suffix(SUMMARY_SUFFIX) {
                if !key.is_empty() {
                    libraries.push(library_for_key(key));
                }
            }
        }
        libraries.sort();
        Ok(libraries)
    }

    /// Serialises `value` as pretty JSON and swaps it into place at `path`.
    pub fn write_json_atomic<T: Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
    ) -> Result<(), StoreError> {
        fs::create_dir_all(&self.docs_dir).map_err(|e| {
            error!(error = ?e, path = %self.docs_dir.display(), "[STORE] Failed to create docs directory");
            StoreError::io(&self.docs_dir, e)
        })?;

        let json = serde_json::to_string_pretty(value).map_err(|e| StoreError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut tmp = NamedTempFile::new_in(&self.docs_dir).map_err(|e| StoreError::io(path, e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.flush())
            .map_err(|e| StoreError::io(path, e))?;
        tmp.persist(path).map_err(|e| {
            error!(error = ?e.error, path = %path.display(), "[STORE] Failed to commit document");
            StoreError::io(path, e.error)
        })?;

        debug!(path = %path.display(), bytes = json.len(), "[STORE] Wrote document");
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_scoped_names() {
        assert_eq!(key_for("@types/node"), "@types+node");
        assert_eq!(library_for_key("@types+node"), "@types/node");
        assert_eq!(key_for("lodash"), "lodash");
    }

    #[test]
    fn reserved_name_is_escaped() {
        assert_eq!(key_for("consolidated"), "_consolidated");
        assert_eq!(library_for_key("_consolidated"), "consolidated");
        assert_eq!(key_for("consolidated-utils"), "consolidated-utils");
        let store = DocsStore::new("/docs");
        assert_ne!(store.index_path("consolidated"), store.consolidated_path());
    }

    #[test]
    fn paths_are_flat_in_docs_dir() {
        let store = DocsStore::new("/docs");
        assert_eq!(
            store.summary_path("@scope/pkg"),
            PathBuf::from("/docs/@scope+pkg_summary.json")
        );
        assert_eq!(store.index_path("pkg"), PathBuf::from("/docs/pkg_index.json"));
        assert_eq!(
            store.consolidated_path(),
            PathBuf::from("/docs/consolidated_index.json")
        );
    }
}
