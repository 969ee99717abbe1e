//! Sync state - process-lifetime record of which repositories have been mirrored.
//!
//! The store is keyed by the immutable full name only. Mutable attributes
//! (clone URL, archived flag) live in the entry value, so an archived-flag
//! change updates the existing entry instead of orphaning its history.

use crate::github::RemoteRepo;
use std::collections::HashMap;

/// One tracked repository: last observed remote attributes plus the
/// sticky synced flag.
#[derive(Debug, Clone)]
pub struct RepoEntry {
    pub repo: RemoteRepo,
    pub synced: bool,
}

/// Mapping from repository full name to sync state.
///
/// Grows monotonically within a run; nothing is ever evicted, and the
/// synced flag is never cleared by observation alone.
#[derive(Debug, Default)]
pub struct SyncState {
    entries: HashMap<String, RepoEntry>,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a freshly fetched inventory into the store.
    ///
    /// Unseen identities are inserted with `synced = false`. Known
    /// identities get their remote attributes refreshed while the synced
    /// flag is left untouched.
    pub fn merge(&mut self, inventory: Vec<RemoteRepo>) {
        for repo in inventory {
            match self.entries.get_mut(&repo.full_name) {
                Some(entry) => entry.repo = repo,
                None => {
                    self.entries
                        .insert(repo.full_name.clone(), RepoEntry { repo, synced: false });
                }
            }
        }
    }

    /// Record a successful sync. Idempotent.
    pub fn mark_synced(&mut self, full_name: &str) {
        if let Some(entry) = self.entries.get_mut(full_name) {
            entry.synced = true;
        }
    }

    pub fn get(&self, full_name: &str) -> Option<&RepoEntry> {
        self.entries.get(full_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of tracked full names in sorted order, so a pass can
    /// iterate while marking entries synced.
    pub fn full_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }
}
