//! Scheduler - repeats full mirror passes with a fixed delay.
//!
//! Deliberately no backoff or jitter: the configured interval is the
//! whole retry policy, and a failed pass simply waits for the next one.

use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn};

use crate::github::RepoSource;
use crate::sync::MirrorEngine;

/// Intervals below this run a single pass instead of looping.
pub const MIN_LOOP_INTERVAL: Duration = Duration::from_secs(60);

pub fn should_loop(interval: Duration) -> bool {
    interval >= MIN_LOOP_INTERVAL
}

/// Run mirror passes forever, sleeping `delay` between them.
///
/// A cycle-level failure (inventory fetch) is logged and retried on the
/// next pass with the previous sync state intact. Ctrl-C during the
/// sleep exits cleanly.
pub async fn run_loop(
    engine: &mut MirrorEngine,
    source: &dyn RepoSource,
    login: &str,
    include_starred: bool,
    delay: Duration,
) -> Result<()> {
    info!("Running every {}s", delay.as_secs());

    loop {
        match engine.run_cycle(source, login, include_starred).await {
            Ok(summary) => info!(
                "Pass complete: {} processed, {} skipped, {} failed",
                summary.total, summary.skipped, summary.errors
            ),
            Err(error) => warn!("Pass abandoned: {:#}", error),
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, exiting");
                return Ok(());
            }
        }
    }
}
