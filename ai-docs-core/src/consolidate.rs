//! Consolidator: merges every library's summary and index views into one
//! lookup document, `consolidated_index.json`.
//!
//! The index view is shallow-merged over the summary view, so its `functions`
//! replace the summary's. The document is rebuilt from scratch on every run.

use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use tracing::{info, warn};

use crate::store::{DocsStore, StoreError};

/// Library name → merged summary/index fields, ordered by name.
pub type ConsolidatedIndex = Map<String, Value>;

/// Builds the consolidated index from the views currently in `store`.
///
/// Corrupt summary views are left out; a corrupt index view counts as absent.
pub fn build_consolidated_index(store: &DocsStore) -> Result<ConsolidatedIndex, StoreError> {
    let mut consolidated = ConsolidatedIndex::new();

    for library in store.list_libraries()? {
        let summary = match store.read_summary(&library) {
            Ok(Some(view)) => view,
            Ok(None) => continue,
            Err(e) => {
                warn!(library = %library, error = %e, "[CONSOLIDATE] Skipping corrupt summary");
                continue;
            }
        };
        let mut entry = as_object(serde_json::to_value(&summary));

        match store.read_index(&library) {
            Ok(Some(index)) => {
                for (key, value) in as_object(serde_json::to_value(&index)) {
                    entry.insert(key, value);
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(library = %library, error = %e, "[CONSOLIDATE] Ignoring corrupt index");
            }
        }

        consolidated.insert(library, Value::Object(entry));
    }

    Ok(consolidated)
}

/// Rebuilds the consolidated index and writes it to the docs directory.
pub fn consolidate(store: &DocsStore) -> Result<ConsolidatedIndex, StoreError> {
    let consolidated = build_consolidated_index(store)?;
    let path = store.consolidated_path();
    store.write_json_atomic(&path, &consolidated)?;
    info!(
        libraries = consolidated.len(),
        path = %path.display(),
        "[CONSOLIDATE] Consolidated index built and saved"
    );
    Ok(consolidated)
}

/// Reads a previously written consolidated index. `Ok(None)` if none exists.
pub fn read_consolidated_index(store: &DocsStore) -> Result<Option<ConsolidatedIndex>, StoreError> {
    let path = store.consolidated_path();
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::Io { path, source: e }),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| StoreError::Corrupt {
            path,
            reason: e.to_string(),
        })
}

fn as_object(value: Result<Value, serde_json::Error>) -> Map<String, Value> {
    match value {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}
