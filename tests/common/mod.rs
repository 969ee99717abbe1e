//! Shared git fixture helpers: local repositories that stand in for the
//! remote hosting side, driven through the real git binary.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Run git in `dir`, panicking with stderr on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");

    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Create a repository with one commit that acts as the upstream remote.
pub fn init_remote(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).expect("failed to create remote dir");

    git(&dir, &["init", "--initial-branch=main"]);
    git(&dir, &["config", "user.email", "mirror@example.com"]);
    git(&dir, &["config", "user.name", "Mirror Test"]);
    commit(&dir, "initial");

    dir
}

/// Add a commit changing the tracked file.
pub fn commit(dir: &Path, marker: &str) {
    std::fs::write(dir.join("file.txt"), marker).expect("failed to write file");
    git(dir, &["add", "."]);
    git(dir, &["commit", "-m", marker]);
}

/// Rewrite the tip commit, diverging from anything that already fetched it.
pub fn rewrite_history(dir: &Path, marker: &str) {
    std::fs::write(dir.join("file.txt"), marker).expect("failed to write file");
    git(dir, &["add", "."]);
    git(dir, &["commit", "--amend", "-m", marker]);
}

pub fn head(dir: &Path) -> String {
    git(dir, &["rev-parse", "HEAD"])
}
