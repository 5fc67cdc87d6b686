use std::path::Path;

use log::{info, warn};
use tokio::process::Command;

// @module: Optional git publishing of the curated outputs

/// Commit message used for the automated output commit.
const COMMIT_MESSAGE: &str = "chore: update playlist and logs";

/// Whether the working directory is a git repository.
pub fn in_git_repo() -> bool {
    Path::new(".git").is_dir()
}

/// Stage, commit and push the given output files. Best-effort: every git
/// failure is logged and swallowed, publishing must never fail a run.
pub async fn commit_and_push(paths: &[&str]) {
    if !in_git_repo() {
        warn!("Not in a git repository, skipping commit/push.");
        return;
    }

    let mut add_args = vec!["add"];
    add_args.extend_from_slice(paths);
    git(&add_args).await;
    git(&["commit", "-m", COMMIT_MESSAGE]).await;
    git(&["push"]).await;
}

async fn git(args: &[&str]) {
    match Command::new("git").args(args).output().await {
        Ok(output) => {
            let combined = format!(
                "{}{}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
            let combined = combined.trim();
            if !combined.is_empty() {
                info!("git {}: {}", args.first().unwrap_or(&""), combined);
            }
        }
        Err(err) => warn!("git {:?} failed: {}", args, err),
    }
}
