//! repomirror - keeps a local filesystem mirror of a GitHub account's
//! repositories (owned and, optionally, starred) synchronized over time.
//!
//! ## Modules
//!
//! - [`config`]: CLI and environment configuration
//! - [`github`]: identity resolution and paginated inventory fetching
//! - [`state`]: process-lifetime sync state store
//! - [`git`]: clone/fetch/pull/reset state machine
//! - [`sync`]: the reconciliation engine tying the above together
//! - [`daemon`]: fixed-delay scheduler loop

pub mod config;
pub mod daemon;
pub mod git;
pub mod github;
pub mod state;
pub mod sync;

pub use config::Config;
pub use git::{GitBackend, GitCli, SyncOutcome};
pub use github::{GitHubClient, RemoteRepo, RepoSource};
pub use state::SyncState;
pub use sync::{CycleSummary, MirrorEngine};
