use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::contract::DependencyEntry;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Tool configuration after credential resolution.
///
/// Deserialises from the camelCase keys of `ai-docs_config.json`. A missing
/// file is equivalent to `ToolConfig::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub additional_libraries: Vec<DependencyEntry>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ToolConfig {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn trace_loaded(&self) {
        info!(
            api_key_set = self.api_key.is_some(),
            additional_libraries = self.additional_libraries.len(),
            model = self.model(),
            endpoint = self.endpoint(),
            "Loaded ToolConfig"
        );
    }
}

/// Filesystem locations the pipeline reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsPaths {
    /// Project manifest (`package.json`).
    pub manifest_path: PathBuf,
    /// Tool configuration (`ai-docs_config.json`).
    pub config_path: PathBuf,
    /// Where summary, index and consolidated files live.
    pub docs_dir: PathBuf,
    /// Installed-package store (`node_modules`).
    pub modules_dir: PathBuf,
}

impl DocsPaths {
    /// Default layout rooted at a project directory.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        DocsPaths {
            manifest_path: root.join("package.json"),
            config_path: root.join("ai-docs_config.json"),
            docs_dir: root.join("ai_docs"),
            modules_dir: root.join("node_modules"),
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            manifest = %self.manifest_path.display(),
            docs_dir = %self.docs_dir.display(),
            modules_dir = %self.modules_dir.display(),
            "Resolved DocsPaths"
        );
        debug!(?self, "DocsPaths (full debug)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_fields_absent() {
        let config: ToolConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ToolConfig::default());
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn parses_camel_case_keys() {
        let config: ToolConfig = serde_json::from_str(
            r#"{"apiKey":"k","additionalLibraries":[{"name":"x","version":"1"}],"timeoutSecs":5}"#,
        )
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.additional_libraries, vec![DependencyEntry::new("x", "1")]);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn rooted_layout() {
        let paths = DocsPaths::rooted_at("/proj");
        assert_eq!(paths.manifest_path, PathBuf::from("/proj/package.json"));
        assert_eq!(paths.config_path, PathBuf::from("/proj/ai-docs_config.json"));
        assert_eq!(paths.docs_dir, PathBuf::from("/proj/ai_docs"));
        assert_eq!(paths.modules_dir, PathBuf::from("/proj/node_modules"));
    }
}
