//! Commit history reading since a cutoff instant.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use git2::{Commit, Repository, Sort};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::GitError;

use super::diff::shortstat;

/// Substituted when a commit's change summary cannot be computed.
pub const DIFF_UNAVAILABLE: &str = "Diff not available.";

/// Snapshot of one commit, enriched with a change-size summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    pub author: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub diff_summary: String,
}

impl CommitRecord {
    /// Build a record from a git2 commit, computing its shortstat.
    pub fn from_git2_commit(repo: &Repository, commit: &Commit) -> Self {
        let hash = commit.id().to_string();
        let diff_summary = match shortstat(repo, commit) {
            Ok(stat) => stat,
            Err(e) => {
                warn!("Could not get diff for commit {}: {}", &hash[..7], e);
                DIFF_UNAVAILABLE.to_string()
            }
        };

        Self {
            author: commit.author().name().unwrap_or("unknown").to_string(),
            message: commit.message().unwrap_or("").to_string(),
            timestamp: commit_timestamp(commit),
            diff_summary,
            hash,
        }
    }

    /// Abbreviated 7-character hash.
    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.hash.len());
        &self.hash[..end]
    }

    /// First line of the commit message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

fn commit_timestamp(commit: &Commit) -> DateTime<Utc> {
    Utc.timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Fetch commits reachable from `branch` whose commit time is at or after `cutoff`.
///
/// Commits are returned newest first.
pub fn fetch_commits_since(
    repo: &Repository,
    branch: &str,
    cutoff: DateTime<Utc>,
) -> Result<Vec<CommitRecord>, GitError> {
    let tip = repo
        .revparse_single(branch)
        .and_then(|obj| obj.peel_to_commit())
        .map_err(|e| GitError::BranchNotFound(branch.to_string(), e))?;

    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk
        .set_sorting(Sort::TIME)
        .map_err(GitError::RevwalkError)?;
    revwalk.push(tip.id()).map_err(GitError::RevwalkError)?;

    let mut commits = Vec::new();

    for oid_result in revwalk {
        let oid = oid_result.map_err(GitError::RevwalkError)?;
        let commit = repo.find_commit(oid).map_err(GitError::ParseCommit)?;
        if commit_timestamp(&commit) < cutoff {
            continue;
        }
        commits.push(CommitRecord::from_git2_commit(repo, &commit));
    }

    Ok(commits)
}

/// Best-effort history read for a summary run.
///
/// Any failure to open or walk the repository is logged and yields an empty
/// batch, so callers cannot tell "unreadable" from "no commits".
pub fn read_history(repo_path: &Path, branch: &str, cutoff: DateTime<Utc>) -> Vec<CommitRecord> {
    let repo = match Repository::open(repo_path).map_err(GitError::OpenRepository) {
        Ok(repo) => repo,
        Err(e) => {
            error!("Error accessing Git repository at {}: {}", repo_path.display(), e);
            return Vec::new();
        }
    };

    match fetch_commits_since(&repo, branch, cutoff) {
        Ok(commits) => {
            info!(
                "Found {} commits since {}",
                commits.len(),
                cutoff.format("%Y-%m-%d")
            );
            commits
        }
        Err(e) => {
            error!("Error reading history of {}: {}", repo_path.display(), e);
            Vec::new()
        }
    }
}
