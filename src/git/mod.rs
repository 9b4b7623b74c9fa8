//! Git history reading using git2-rs.

pub mod commits;
pub mod diff;

pub use commits::{CommitRecord, DIFF_UNAVAILABLE, fetch_commits_since, read_history};
pub use diff::shortstat;
