use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, taken from flags with env-var overrides.
#[derive(Debug, Clone, Parser)]
#[command(name = "repomirror")]
#[command(about = "Mirrors a GitHub account's repositories to local disk")]
#[command(version)]
pub struct Config {
    /// Root directory under which owner/name checkouts are created
    #[arg(long, env = "CHECKOUT_PATH", default_value = "/data")]
    pub checkout_path: String,

    /// Personal access token, used for both the API and git transport
    #[arg(long, env = "AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: String,

    /// Delay between passes ("30m", "1h"); below one minute runs a single pass
    #[arg(long, env = "DURATION", default_value = "0")]
    pub duration: String,

    /// Mirror starred repositories in addition to owned ones
    #[arg(long, env = "STARRED")]
    pub starred: bool,

    /// Stop syncing archived repositories once they have been mirrored
    #[arg(long, env = "SKIP_ARCHIVED")]
    pub skip_archived: bool,

    /// Verbose logging
    #[arg(long, env = "DEBUG")]
    pub debug: bool,

    /// Log every decision without cloning or updating anything
    #[arg(long = "test", visible_alias = "dry-run", env = "TEST")]
    pub dry_run: bool,

    /// Upper bound for a single git operation ("10m"); 0 disables it
    #[arg(long, env = "GIT_TIMEOUT", default_value = "10m")]
    pub git_timeout: String,
}

impl Config {
    /// Checkout root with environment variables and `~` expanded.
    pub fn checkout_root(&self) -> Result<PathBuf> {
        let expanded = shellexpand::full(&self.checkout_path)
            .context("Failed to expand checkout path")?;
        Ok(PathBuf::from(expanded.as_ref()))
    }

    /// Delay between full passes. Zero means run once and exit.
    pub fn interval(&self) -> Result<Duration> {
        parse_duration(&self.duration)
            .with_context(|| format!("Invalid duration: {}", self.duration))
    }

    /// Per-git-operation timeout, `None` when disabled.
    pub fn git_timeout(&self) -> Result<Option<Duration>> {
        let limit = parse_duration(&self.git_timeout)
            .with_context(|| format!("Invalid git timeout: {}", self.git_timeout))?;
        if limit.is_zero() {
            Ok(None)
        } else {
            Ok(Some(limit))
        }
    }
}

/// Parse duration strings like "90s", "30m", "1h" or raw seconds.
fn parse_duration(duration_str: &str) -> Result<Duration> {
    let duration_str = duration_str.trim().to_lowercase();

    let seconds = if let Some(value) = duration_str.strip_suffix('s') {
        value.parse::<u64>().context("Invalid seconds value")?
    } else if let Some(value) = duration_str.strip_suffix('m') {
        value.parse::<u64>().map(|v| v * 60).context("Invalid minutes value")?
    } else if let Some(value) = duration_str.strip_suffix('h') {
        value.parse::<u64>().map(|v| v * 3600).context("Invalid hours value")?
    } else if let Some(value) = duration_str.strip_suffix('d') {
        value.parse::<u64>().map(|v| v * 86400).context("Invalid days value")?
    } else {
        duration_str
            .parse::<u64>()
            .map_err(|_| anyhow!("Invalid duration format. Use format like '30m', '1h', '2d'"))?
    };

    Ok(Duration::from_secs(seconds))
}
