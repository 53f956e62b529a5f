//! Raw extractor: reads a package's README and entry-point source from the
//! installed-package store. Missing files yield empty text; only unexpected
//! I/O failures are errors.

use regex::Regex;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::contract::RawDocs;

/// Case variants probed for the README, in order.
pub const README_CANDIDATES: [&str; 3] = ["README.md", "readme.md", "Readme.md"];
pub const DEFAULT_MAIN: &str = "index.js";

#[derive(Debug, Error)]
#[error("failed to read {path}: {source}")]
pub struct ExtractError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Deserialize)]
struct LibraryManifest {
    #[serde(default)]
    main: Option<String>,
}

/// Locates installed packages under a `node_modules`-style directory.
#[derive(Debug, Clone)]
pub struct PackageStore {
    modules_dir: PathBuf,
}

impl PackageStore {
    pub fn new(modules_dir: impl Into<PathBuf>) -> Self {
        Self {
            modules_dir: modules_dir.into(),
        }
    }

    /// Directory of `library`. Names that would leave the modules directory
    /// (absolute paths, `..` segments) are rejected.
    pub fn package_dir(&self, library: &str) -> Result<PathBuf, ExtractError> {
        if library.is_empty() || !stays_inside(Path::new(library)) {
            warn!(library, "[EXTRACT] Package name escapes the modules directory");
            return Err(ExtractError {
                path: PathBuf::from(library),
                source: std::io::Error::new(
                    ErrorKind::InvalidInput,
                    "package name escapes the modules directory",
                ),
            });
        }
        Ok(self.modules_dir.join(library))
    }

    /// Reads the README and entry-point source of `library`.
    pub async fn extract_docs(&self, library: &str) -> Result<RawDocs, ExtractError> {
        let dir = self.package_dir(library)?;
        debug!(library, dir = %dir.display(), "[EXTRACT] Reading installed package");

        let mut readme = String::new();
        for candidate in README_CANDIDATES {
            if let Some(text) = read_optional(&dir.join(candidate)).await? {
                debug!(library, file = candidate, "[EXTRACT] Found README");
                readme = text;
                break;
            }
        }

        let entry = self.resolve_entry(library).await?;
        let code = match entry {
            Some(path) => read_optional(&path).await?.unwrap_or_default(),
            None => String::new(),
        };

        if readme.is_empty() {
            info!(library, "[EXTRACT] No README found");
        }
        if code.is_empty() {
            info!(library, "[EXTRACT] No entry-point source found");
        }
        Ok(RawDocs { readme, code })
    }

    /// Path of the entry-point file named by the package's `main` field.
    ///
    /// Falls back to `index.js`, and follows Node's habit of appending `.js` or
    /// `/index.js` when `main` names no file directly. `None` if nothing exists.
    pub async fn resolve_entry(&self, library: &str) -> Result<Option<PathBuf>, ExtractError> {
        let dir = self.package_dir(library)?;
        let manifest_path = dir.join("package.json");

        let main = match read_optional(&manifest_path).await? {
            Some(text) => match serde_json::from_str::<LibraryManifest>(&text) {
                Ok(manifest) => manifest.main.filter(|m| {
                    let usable = !m.trim().is_empty() && stays_inside(Path::new(m));
                    if !usable {
                        warn!(library, main = %m, "[EXTRACT] Ignoring unusable main, assuming index.js");
                    }
                    usable
                }),
                Err(e) => {
                    warn!(library, error = %e, "[EXTRACT] Unparsable package.json, assuming index.js");
                    None
                }
            },
            None => None,
        };
        let base = dir.join(main.as_deref().unwrap_or(DEFAULT_MAIN));

        let mut candidates = vec![base.clone()];
        if base.extension().is_none() {
            let mut with_ext = base.clone().into_os_string();
            with_ext.push(".js");
            candidates.push(PathBuf::from(with_ext));
        }
        candidates.push(base.join(DEFAULT_MAIN));

        for candidate in candidates {
            if is_file(&candidate).await {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}

/// True when `relative` has no root, prefix or `..` component.
fn stays_inside(relative: &Path) -> bool {
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

async fn read_optional(path: &Path) -> Result<Option<String>, ExtractError> {
    if !is_file(path).await {
        return Ok(None);
    }
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ExtractError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn fenced_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?ms)^[ \t]*```[^\n]*\n(.*?)^[ \t]*```").expect("static regex is valid")
    })
}

/// Pairs each function name with the first README code block that calls it.
pub fn code_examples<'a, I>(readme: &str, function_names: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = &'a str>,
{
    let blocks: Vec<&str> = fenced_block_regex()
        .captures_iter(readme)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    function_names
        .into_iter()
        .filter_map(|name| {
            let call = format!("{name}(");
            blocks
                .iter()
                .find(|block| block.contains(&call))
                .map(|block| (name.to_string(), block.trim_end().to_string()))
        })
        .collect()
}
