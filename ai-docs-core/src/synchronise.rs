//! High-level pipeline: orchestrates ledger → extract → summarise → write for
//! every library whose docs are missing or out of date.
//!
//! # Responsibilities
//! - Loads the project manifest; a missing manifest ends the run with
//!   [`SyncError::Manifest`] before anything is processed
//! - Computes the stale set and appends forced `additionalLibraries`
//! - Processes pending libraries one at a time; a failure in one library is
//!   logged, recorded in the report, and never stops the next
//! - Optionally rebuilds the consolidated index afterwards
//!
//! # Per-library states
//! `Pending → Extracting → Summarising → Writing → Done`, with `Failed` reachable
//! from the three working states. Nothing is retried: a failed library keeps
//! its old (or no) summary view and is selected again on the next run.
//!
//! # Navigation
//! - Main entrypoint: [`synchronise`]
//! - Dry run: [`status`]
//! - Supporting types: [`SynchroniseConfig`], [`SynchroniseReport`].

use std::fmt;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::DocsPaths;
use crate::consolidate;
use crate::contract::{CachedArtifactRecord, DependencyEntry, SignatureExtractor, Summariser};
use crate::extract::{self, PackageStore};
use crate::ledger::{self, LedgerOutcome};
use crate::manifest::{self, ManifestError};
use crate::store::DocsStore;

/// The top-level synchronise configuration.
#[derive(Debug, Clone)]
pub struct SynchroniseConfig {
    pub paths: DocsPaths,
    /// Libraries processed on every run, whatever their cache state.
    pub additional_libraries: Vec<DependencyEntry>,
    /// Rebuild `consolidated_index.json` once all libraries are processed.
    pub consolidate: bool,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

impl SyncError {
    pub fn is_manifest_missing(&self) -> bool {
        matches!(self, SyncError::Manifest(ManifestError::Missing(_)))
    }
}

/// Why a library's pipeline stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Extraction(String),
    Summarisation(String),
    Persist(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Extraction(e) => write!(f, "extraction failed: {e}"),
            FailureReason::Summarisation(e) => write!(f, "summarisation failed: {e}"),
            FailureReason::Persist(e) => write!(f, "writing docs failed: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState {
    Pending,
    Extracting,
    Summarising,
    Writing,
    Done,
    Failed(FailureReason),
}

#[derive(Debug, Clone)]
pub struct EntryReport {
    pub name: String,
    pub version: String,
    pub state: EntryState,
    pub functions: usize,
    /// Set when the entry-point source did not parse; the library still
    /// completes with an empty function list.
    pub parse_error: Option<String>,
}

/// Entrypoint output: what happened to every pending library.
#[derive(Debug, Clone, Default)]
pub struct SynchroniseReport {
    pub entries: Vec<EntryReport>,
    /// Libraries whose cached summary could not be read and were skipped.
    pub unreadable: Vec<String>,
    /// Number of libraries in the rebuilt consolidated index, if one was built.
    pub consolidated: Option<usize>,
}

impl SynchroniseReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|e| e.state == EntryState::Done)
    }

    pub fn failed(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries
            .iter()
            .filter(|e| matches!(e.state, EntryState::Failed(_)))
    }
}

/// Loads the manifest and reports stale and unreadable libraries without
/// processing anything.
pub fn status(paths: &DocsPaths) -> Result<LedgerOutcome, SyncError> {
    let dependencies = manifest::load_dependencies(&paths.manifest_path)?;
    let store = DocsStore::new(&paths.docs_dir);
    Ok(ledger::stale_entries(&dependencies, &store))
}

pub async fn synchronise<S, E>(
    config: &SynchroniseConfig,
    summariser: &S,
    extractor: &E,
) -> Result<SynchroniseReport, SyncError>
where
    S: Summariser + ?Sized,
    E: SignatureExtractor + ?Sized,
{
    info!("[SYNC] Starting documentation synchronisation");
    config.paths.trace_loaded();

    let outcome = status(&config.paths)?;
    let pending = ledger::merge_forced(outcome.stale, &config.additional_libraries);
    info!(pending = pending.len(), "[SYNC] Libraries selected for processing");

    let packages = PackageStore::new(&config.paths.modules_dir);
    let store = DocsStore::new(&config.paths.docs_dir);

    let mut entries = Vec::with_capacity(pending.len());
    for entry in &pending {
        entries.push(process_library(entry, &packages, &store, summariser, extractor).await);
    }

    let consolidated = if config.consolidate {
        match consolidate::consolidate(&store) {
            Ok(index) => Some(index.len()),
            Err(e) => {
                error!(error = %e, "[SYNC][ERROR] Failed to rebuild consolidated index");
                None
            }
        }
    } else {
        None
    };

    let report = SynchroniseReport {
        entries,
        unreadable: outcome.unreadable,
        consolidated,
    };
    info!(
        done = report.succeeded().count(),
        failed = report.failed().count(),
        skipped_unreadable = report.unreadable.len(),
        "[SYNC] Documentation processing completed"
    );
    Ok(report)
}

/// Runs one library through extract → summarise → write.
pub async fn process_library<S, E>(
    entry: &DependencyEntry,
    packages: &PackageStore,
    store: &DocsStore,
    summariser: &S,
    extractor: &E,
) -> EntryReport
where
    S: Summariser + ?Sized,
    E: SignatureExtractor + ?Sized,
{
    let mut report = EntryReport {
        name: entry.name.clone(),
        version: entry.version.clone(),
        state: EntryState::Pending,
        functions: 0,
        parse_error: None,
    };
    info!(library = %entry.name, version = %entry.version, "[SYNC] Processing documentation");

    advance(&mut report, EntryState::Extracting);
    let raw = match packages.extract_docs(&entry.name).await {
        Ok(raw) => raw,
        Err(e) => return fail(report, FailureReason::Extraction(e.to_string())),
    };

    advance(&mut report, EntryState::Summarising);
    let summary = match summariser.summarise(&entry.name, &raw.readme).await {
        Ok(summary) => summary,
        Err(e) => return fail(report, FailureReason::Summarisation(e.to_string())),
    };
    let functions = match extractor.extract(&raw.code) {
        Ok(functions) => functions,
        Err(e) => {
            warn!(library = %entry.name, error = %e, "[SYNC] Could not parse entry point, recording no functions");
            report.parse_error = Some(e.to_string());
            Vec::new()
        }
    };
    let code_examples = extract::code_examples(&raw.readme, functions.iter().map(|f| f.name.as_str()));

    advance(&mut report, EntryState::Writing);
    let record = CachedArtifactRecord {
        library_name: entry.name.clone(),
        cached_version: entry.version.clone(),
        summary,
        functions,
        code_examples,
    };
    if let Err(e) = store.write_record(&record) {
        return fail(report, FailureReason::Persist(e.to_string()));
    }

    report.functions = record.functions.len();
    advance(&mut report, EntryState::Done);
    report
}

fn advance(report: &mut EntryReport, next: EntryState) {
    debug!(library = %report.name, from = ?report.state, to = ?next, "[SYNC] State transition");
    report.state = next;
}

fn fail(mut report: EntryReport, reason: FailureReason) -> EntryReport {
    error!(
        library = %report.name,
        version = %report.version,
        stage = ?report.state,
        reason = %reason,
        "[SYNC][ERROR] Library failed, it stays stale for the next run"
    );
    report.state = EntryState::Failed(reason);
    report
}
