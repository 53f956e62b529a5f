/// `load_config` module: loads `ai-docs_config.json` into a fully resolved [`ToolConfig`].
///
/// This is the only place where the tool configuration file is parsed and where
/// the `process.env.<VAR>` credential indirection is resolved. Everything
/// downstream receives the resolved key as plain data.
///
/// # Responsibilities
/// - A missing file is not an error: it yields `ToolConfig::default()`
/// - A file that is not valid JSON for the schema is an error with context
/// - `apiKey: "process.env.NAME"` is replaced by the value of `$NAME` (or no key
///   when unset); without any `apiKey`, `$OPENAI_API_KEY` is used if present
///
/// # Errors
/// All errors in this module use `anyhow::Error` and are surfaced at the CLI boundary.
use ai_docs_core::config::ToolConfig;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{error, info, warn};

pub const ENV_PREFIX: &str = "process.env.";
pub const FALLBACK_API_KEY_VAR: &str = "OPENAI_API_KEY";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ToolConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            Some(content)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(config_path = ?path_ref, "No config file, using defaults");
            None
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(e).with_context(|| format!("Failed to read config file {path_ref:?}"));
        }
    };

    let mut config = match config_content {
        Some(content) => serde_json::from_str::<ToolConfig>(&content).map_err(|e| {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config JSON");
            anyhow::anyhow!("Failed to parse config JSON {path_ref:?}: {e}")
        })?,
        None => ToolConfig::default(),
    };

    config.api_key = resolve_api_key(config.api_key, |var| env::var(var).ok());
    config.trace_loaded();
    Ok(config)
}

/// Resolves the configured key against `lookup`, falling back to
/// [`FALLBACK_API_KEY_VAR`] when none is configured.
pub fn resolve_api_key<F>(raw: Option<String>, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let resolved = match raw {
        Some(value) => match value.strip_prefix(ENV_PREFIX) {
            Some(var) => {
                let found = lookup(var);
                if found.is_none() {
                    warn!(var, "apiKey refers to an unset environment variable");
                }
                found
            }
            None => Some(value),
        },
        None => lookup(FALLBACK_API_KEY_VAR),
    };
    resolved.filter(|key| !key.trim().is_empty())
}
