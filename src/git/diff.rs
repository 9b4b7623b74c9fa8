//! Per-commit change-size summaries using git2 diff stats.

use git2::{Commit, DiffStatsFormat, Repository};

use crate::error::GitError;

/// Width hint for the stats buffer; irrelevant for the short format.
const STATS_WIDTH: usize = 80;

/// Summarize a commit's changes in `git diff --shortstat` form.
///
/// Diffs against the first parent; a root commit is diffed against the
/// empty tree. Returns e.g. `"2 files changed, 10 insertions(+), 1 deletion(-)"`.
pub fn shortstat(repo: &Repository, commit: &Commit) -> Result<String, GitError> {
    let tree = commit.tree().map_err(GitError::DiffFailed)?;
    let parent_tree = match commit.parent_count() {
        0 => None,
        _ => Some(
            commit
                .parent(0)
                .and_then(|p| p.tree())
                .map_err(GitError::DiffFailed)?,
        ),
    };

    let diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
        .map_err(GitError::DiffFailed)?;
    let stats = diff.stats().map_err(GitError::DiffFailed)?;
    let buf = stats
        .to_buf(DiffStatsFormat::SHORT, STATS_WIDTH)
        .map_err(GitError::DiffFailed)?;

    Ok(String::from_utf8_lossy(&buf).trim().to_string())
}
