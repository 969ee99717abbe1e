//! Reconciliation engine - drives every tracked repository through one
//! sync pass and records the outcomes back into the sync state.

use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::git::{repo_path, GitBackend};
use crate::github::{fetch_inventory, RemoteRepo, RepoSource};
use crate::state::SyncState;

/// Aggregate counts for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub total: usize,
    pub errors: usize,
    pub skipped: usize,
}

/// Decided action for one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Clone,
    Update,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Clone => write!(f, "clone"),
            Action::Update => write!(f, "update"),
        }
    }
}

/// Owns the sync state and applies the skip/clone/update policy to it,
/// one repository at a time.
pub struct MirrorEngine {
    checkout_root: PathBuf,
    skip_archived: bool,
    dry_run: bool,
    git: Arc<dyn GitBackend>,
    state: SyncState,
}

impl MirrorEngine {
    pub fn new(
        checkout_root: PathBuf,
        skip_archived: bool,
        dry_run: bool,
        git: Arc<dyn GitBackend>,
    ) -> Self {
        Self {
            checkout_root,
            skip_archived,
            dry_run,
            git,
            state: SyncState::new(),
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Fold a fetched inventory into the sync state.
    pub fn merge_inventory(&mut self, inventory: Vec<RemoteRepo>) {
        self.state.merge(inventory);
    }

    /// One full pass: fetch the remote inventory, fold it into the sync
    /// state, then reconcile every tracked repository.
    ///
    /// An inventory failure abandons the pass with the state untouched;
    /// the next scheduled pass starts from where this one left off.
    pub async fn run_cycle(
        &mut self,
        source: &dyn RepoSource,
        login: &str,
        include_starred: bool,
    ) -> Result<CycleSummary> {
        info!("Fetching repository inventory");
        let inventory = fetch_inventory(source, login, include_starred)
            .await
            .context("Inventory fetch failed, keeping previous sync state")?;

        info!("Inventory lists {} repositories", inventory.len());
        self.merge_inventory(inventory);

        Ok(self.reconcile().await)
    }

    /// Apply the per-repository decision policy to every entry currently
    /// in the store. A single repository's failure never aborts the rest
    /// of the batch.
    pub async fn reconcile(&mut self) -> CycleSummary {
        let mut summary = CycleSummary::default();

        for full_name in self.state.full_names() {
            let Some(entry) = self.state.get(&full_name) else {
                continue;
            };
            summary.total += 1;

            // Once mirrored, an archived upstream is immutable and needs
            // no further traffic.
            if self.skip_archived && entry.synced && entry.repo.archived {
                debug!("Skipping archived repository {}", full_name);
                summary.skipped += 1;
                continue;
            }

            let repo = entry.repo.clone();
            let dest = repo_path(&self.checkout_root, &full_name);
            let action = if dest.exists() {
                Action::Update
            } else {
                Action::Clone
            };

            if self.dry_run {
                info!("Would {} {}", action, full_name);
                self.state.mark_synced(&full_name);
                continue;
            }

            info!("{}: {}", action, full_name);
            let result = match action {
                Action::Clone => self.git.clone_repo(&repo, &dest).await,
                Action::Update => self.git.update_repo(&repo, &dest).await,
            };

            match result {
                Ok(outcome) => {
                    debug!("{}: {:?}", full_name, outcome);
                    self.state.mark_synced(&full_name);
                }
                Err(error) => {
                    warn!("Failed to sync {}: {:#}", full_name, error);
                    summary.errors += 1;
                }
            }
        }

        info!(
            "Cycle finished: {} processed, {} skipped, {} failed",
            summary.total, summary.skipped, summary.errors
        );
        summary
    }
}
