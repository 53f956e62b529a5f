//! Version ledger: decides which declared dependencies need their docs regenerated.
//!
//! An entry is stale when the store holds no summary view for it, or holds one
//! whose `version` differs from the declared version. A summary view that
//! cannot be read or validated is neither stale nor fresh; the entry is left
//! out of the stale set and reported as unreadable.

use tracing::{debug, info, warn};

use crate::contract::DependencyEntry;
use crate::store::DocsStore;

/// Result of comparing declared versions against the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerOutcome {
    /// Entries needing regeneration, in declaration order.
    pub stale: Vec<DependencyEntry>,
    /// Names whose cached summary could not be read; skipped this run.
    pub unreadable: Vec<String>,
}

/// Computes `Stale(D)` for `dependencies` against the summary views in `store`.
pub fn stale_entries(dependencies: &[DependencyEntry], store: &DocsStore) -> LedgerOutcome {
    let mut outcome = LedgerOutcome::default();

    for entry in dependencies {
        match store.read_summary(&entry.name) {
            Ok(None) => {
                debug!(library = %entry.name, "[LEDGER] No cached docs");
                outcome.stale.push(entry.clone());
            }
            Ok(Some(view)) if view.version != entry.version => {
                debug!(
                    library = %entry.name,
                    cached = %view.version,
                    declared = %entry.version,
                    "[LEDGER] Cached docs are for another version"
                );
                outcome.stale.push(entry.clone());
            }
            Ok(Some(_)) => {
                debug!(library = %entry.name, version = %entry.version, "[LEDGER] Cached docs up to date");
            }
            Err(e) => {
                warn!(library = %entry.name, error = %e, "[LEDGER] Cached summary unreadable, skipping");
                outcome.unreadable.push(entry.name.clone());
            }
        }
    }

    info!(
        declared = dependencies.len(),
        stale = outcome.stale.len(),
        unreadable = outcome.unreadable.len(),
        "[LEDGER] Computed stale libraries"
    );
    outcome
}

/// Appends forced inclusions to the pending set.
///
/// A forced entry whose name is already pending replaces that entry in place.
pub fn merge_forced(
    mut pending: Vec<DependencyEntry>,
    forced: &[DependencyEntry],
) -> Vec<DependencyEntry> {
    for entry in forced {
        match pending.iter_mut().find(|p| p.name == entry.name) {
            Some(existing) => *existing = entry.clone(),
            None => pending.push(entry.clone()),
        }
    }
    pending
}
