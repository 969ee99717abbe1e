//! Git sync state machine tests against real local repositories.
//! These exercise the clone, fast-forward and hard-reset recovery paths
//! with the system git binary; no network involved.

mod common;

use assert_matches::assert_matches;
use repomirror::git::{repo_path, GitBackend, GitCli, SyncOutcome};
use repomirror::RemoteRepo;
use std::path::Path;
use tempfile::TempDir;

fn local_repo(full_name: &str, remote: &Path) -> RemoteRepo {
    RemoteRepo {
        full_name: full_name.to_string(),
        clone_url: remote.to_string_lossy().to_string(),
        archived: false,
    }
}

#[tokio::test]
async fn test_clone_then_fast_forward_update() {
    let temp = TempDir::new().unwrap();
    let remote = common::init_remote(temp.path(), "remote");
    let root = temp.path().join("checkout");

    let git = GitCli::new("unused-token", None);
    let repo = local_repo("tester/mirror", &remote);
    let dest = repo_path(&root, "tester/mirror");

    let outcome = git.clone_repo(&repo, &dest).await.unwrap();
    assert_matches!(outcome, SyncOutcome::Cloned);
    assert_eq!(common::head(&dest), common::head(&remote));

    common::commit(&remote, "second");

    let outcome = git.update_repo(&repo, &dest).await.unwrap();
    assert_matches!(outcome, SyncOutcome::Updated);
    assert_eq!(common::head(&dest), common::head(&remote));
}

#[tokio::test]
async fn test_update_with_nothing_new_succeeds() {
    let temp = TempDir::new().unwrap();
    let remote = common::init_remote(temp.path(), "remote");
    let root = temp.path().join("checkout");

    let git = GitCli::new("unused-token", None);
    let repo = local_repo("tester/quiet", &remote);
    let dest = repo_path(&root, "tester/quiet");

    git.clone_repo(&repo, &dest).await.unwrap();

    // "Already up to date" is success, not failure.
    let outcome = git.update_repo(&repo, &dest).await.unwrap();
    assert_matches!(outcome, SyncOutcome::Updated);
}

#[tokio::test]
async fn test_rewritten_upstream_recovered_by_reset() {
    let temp = TempDir::new().unwrap();
    let remote = common::init_remote(temp.path(), "remote");
    let root = temp.path().join("checkout");

    let git = GitCli::new("unused-token", None);
    let repo = local_repo("tester/rewritten", &remote);
    let dest = repo_path(&root, "tester/rewritten");

    git.clone_repo(&repo, &dest).await.unwrap();
    let before = common::head(&dest);

    // Force-push equivalent: the upstream tip is replaced outright.
    common::rewrite_history(&remote, "rewritten");
    assert_ne!(common::head(&remote), before);

    let outcome = git.update_repo(&repo, &dest).await.unwrap();
    assert_matches!(outcome, SyncOutcome::Reset);
    assert_eq!(common::head(&dest), common::head(&remote));
    assert_eq!(
        std::fs::read_to_string(dest.join("file.txt")).unwrap(),
        "rewritten"
    );
}

#[tokio::test]
async fn test_stalled_operation_fails_with_timeout() {
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;

    let temp = TempDir::new().unwrap();
    let remote = common::init_remote(temp.path(), "remote");
    let root = temp.path().join("checkout");

    let repo = local_repo("tester/stalled", &remote);
    let dest = repo_path(&root, "tester/stalled");

    GitCli::new("unused-token", None)
        .clone_repo(&repo, &dest)
        .await
        .unwrap();

    // Stand in for a hung server: upload-pack sleeps far past the limit.
    let stall = temp.path().join("stall-upload-pack");
    std::fs::write(&stall, "#!/bin/sh\nsleep 30\n").unwrap();
    std::fs::set_permissions(&stall, std::fs::Permissions::from_mode(0o755)).unwrap();
    let stall_path = stall.to_string_lossy();
    common::git(
        &dest,
        &["config", "remote.origin.uploadpack", stall_path.as_ref()],
    );

    let git = GitCli::new("unused-token", Some(Duration::from_millis(200)));
    let started = std::time::Instant::now();
    let error = git.update_repo(&repo, &dest).await.unwrap_err();

    assert!(
        error.to_string().contains("timed out"),
        "unexpected error: {:#}",
        error
    );
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_update_refuses_plain_directory() {
    let temp = TempDir::new().unwrap();
    let remote = common::init_remote(temp.path(), "remote");

    let dest = temp.path().join("checkout/tester/empty");
    std::fs::create_dir_all(&dest).unwrap();

    let git = GitCli::new("unused-token", None);
    let repo = local_repo("tester/empty", &remote);

    let error = git.update_repo(&repo, &dest).await.unwrap_err();
    assert!(error.to_string().contains("not a git checkout"));
}

#[tokio::test]
async fn test_clone_failure_is_reported() {
    let temp = TempDir::new().unwrap();

    let git = GitCli::new("unused-token", None);
    let repo = RemoteRepo {
        full_name: "tester/missing".to_string(),
        clone_url: temp.path().join("no-such-remote").to_string_lossy().to_string(),
        archived: false,
    };
    let dest = repo_path(&temp.path().join("checkout"), "tester/missing");

    let result = git.clone_repo(&repo, &dest).await;
    assert!(result.is_err());
}
