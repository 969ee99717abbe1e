use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repomirror::git::GitBackend;
use repomirror::{daemon, Config, GitCli, GitHubClient, MirrorEngine, RepoSource};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(config.debug);
    info!("Starting repomirror v{}", env!("CARGO_PKG_VERSION"));

    let checkout_root = config.checkout_root()?;
    let interval = config.interval()?;
    let timeout = config.git_timeout()?;

    let client = GitHubClient::new(&config.auth_token)?;

    // Without an identity there is nothing to scope queries to, so this
    // is the one fatal API failure. No retry.
    let login = match client.viewer_login().await {
        Ok(login) => login,
        Err(e) => {
            error!("Identity resolution failed: {:#}", e);
            std::process::exit(1);
        }
    };

    let git: Arc<dyn GitBackend> = Arc::new(GitCli::new(config.auth_token.clone(), timeout));
    let mut engine = MirrorEngine::new(checkout_root, config.skip_archived, config.dry_run, git);

    if daemon::should_loop(interval) {
        daemon::run_loop(&mut engine, &client, &login, config.starred, interval).await
    } else {
        let summary = engine.run_cycle(&client, &login, config.starred).await?;
        info!(
            "Done: {} processed, {} skipped, {} failed",
            summary.total, summary.skipped, summary.errors
        );
        Ok(())
    }
}

/// Initialize logging based on verbosity level
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
