//! # contract: data model and capability seams for the documentation pipeline
//!
//! This module defines the plain data passed between pipeline stages and the
//! two capabilities the pipeline depends on but does not implement itself:
//!
//! - [`Summariser`]: turns a package's README text into a short summary via a
//!   remote service. Implemented by the CLI crate's HTTP client and by mocks.
//! - [`SignatureExtractor`]: lists the top-level function declarations of a
//!   source text. One implementation per source dialect.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`; the mocks are exported under the
//!   `test-export-mocks` feature so integration tests in other crates can use them.
//!
//! ## Persisted views
//! - [`SummaryView`] and [`IndexView`] are the two JSON documents written per
//!   library. Field names match the on-disk schema (`params`, `codeExample`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mockall::automock;

/// One `name → version` pair declared by the project manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub name: String,
    pub version: String,
}

impl DependencyEntry {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// A top-level function declaration found in a source text.
///
/// `start` and `end` are byte offsets into the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<String>,
    pub start: usize,
    pub end: usize,
    /// Text of a `/** ... */` comment directly above the declaration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Raw documentation pulled from an installed package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDocs {
    /// README text, empty when the package ships none.
    pub readme: String,
    /// Entry-point source text, empty when the file is missing.
    pub code: String,
}

/// Everything known about one processed library, before projection into views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedArtifactRecord {
    pub library_name: String,
    pub cached_version: String,
    pub summary: String,
    pub functions: Vec<FunctionSignature>,
    /// Per-function usage snippets keyed by function name, taken from the README.
    pub code_examples: Vec<(String, String)>,
}

/// Function entry of a [`SummaryView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SummaryFunction {
    pub name: String,
    pub params: Vec<String>,
    pub start: usize,
    pub end: usize,
}

/// Lightweight lookup projection persisted as `<key>_summary.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SummaryView {
    pub name: String,
    pub version: String,
    pub summary: String,
    pub functions: Vec<SummaryFunction>,
}

/// Function entry of an [`IndexView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexFunction {
    pub name: String,
    pub params: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_example: Option<String>,
}

/// Richer projection persisted as `<key>_index.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexView {
    pub functions: Vec<IndexFunction>,
}

impl From<&CachedArtifactRecord> for SummaryView {
    fn from(record: &CachedArtifactRecord) -> Self {
        SummaryView {
            name: record.library_name.clone(),
            version: record.cached_version.clone(),
            summary: record.summary.clone(),
            functions: record
                .functions
                .iter()
                .map(|f| SummaryFunction {
                    name: f.name.clone(),
                    params: f.params.clone(),
                    start: f.start,
                    end: f.end,
                })
                .collect(),
        }
    }
}

impl From<&CachedArtifactRecord> for IndexView {
    fn from(record: &CachedArtifactRecord) -> Self {
        IndexView {
            functions: record
                .functions
                .iter()
                .map(|f| IndexFunction {
                    name: f.name.clone(),
                    params: f.params.clone(),
                    description: f.description.clone(),
                    code_example: record
                        .code_examples
                        .iter()
                        .find(|(name, _)| name == &f.name)
                        .map(|(_, example)| example.clone()),
                })
                .collect(),
        }
    }
}

/// Failure of the remote summarisation call for one library.
#[derive(Debug, Error)]
pub enum SummariseError {
    #[error("no API key configured for the summarisation service")]
    MissingCredential,
    #[error("summarisation request failed: {0}")]
    Transport(String),
    #[error("summarisation request timed out after {0}s")]
    Timeout(u64),
    #[error("summarisation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed summarisation response: {0}")]
    Malformed(String),
}

/// The source text could not be parsed as a single compilation unit.
#[derive(Debug, Error)]
#[error("failed to parse source: {0}")]
pub struct ParseError(pub String);

/// Produces a short natural-language summary of a library's README.
///
/// Implemented by real HTTP clients and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Summariser: Send + Sync {
    /// Summarise `readme` (possibly empty) for the library named `library`.
    async fn summarise(&self, library: &str, readme: &str) -> Result<String, SummariseError>;
}

/// Lists top-level function declarations of one source dialect.
///
/// Implementations must be pure: identical text yields identical output.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait SignatureExtractor: Send + Sync {
    fn extract(&self, source: &str) -> Result<Vec<FunctionSignature>, ParseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CachedArtifactRecord {
        CachedArtifactRecord {
            library_name: "left-pad".into(),
            cached_version: "1.3.0".into(),
            summary: "Pads strings.".into(),
            functions: vec![FunctionSignature {
                name: "leftPad".into(),
                params: vec!["str".into(), "len".into(), "ch".into()],
                start: 10,
                end: 80,
                description: Some("Pad the left side.".into()),
            }],
            code_examples: vec![("leftPad".into(), "leftPad('a', 3)".into())],
        }
    }

    #[test]
    fn summary_view_drops_enrichments() {
        let view = SummaryView::from(&record());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "left-pad");
        assert_eq!(json["version"], "1.3.0");
        assert_eq!(json["functions"][0]["start"], 10);
        assert!(json["functions"][0].get("description").is_none());
    }

    #[test]
    fn index_view_uses_camel_case_and_omits_missing_fields() {
        let mut rec = record();
        rec.functions.push(FunctionSignature {
            name: "other".into(),
            params: vec![],
            start: 90,
            end: 100,
            description: None,
        });
        let json = serde_json::to_value(IndexView::from(&rec)).unwrap();
        assert_eq!(json["functions"][0]["codeExample"], "leftPad('a', 3)");
        assert_eq!(json["functions"][0]["description"], "Pad the left side.");
        assert!(json["functions"][1].get("codeExample").is_none());
        assert!(json["functions"][1].get("description").is_none());
    }
}
