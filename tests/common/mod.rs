//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use git2::{Oid, Repository, RepositoryInitOptions, Signature, Time};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository whose first branch is `main`.
    pub fn new() -> Self {
        Self::with_initial_branch("main")
    }

    pub fn with_initial_branch(branch: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head(branch);
        let repo = Repository::init_opts(dir.path(), &opts).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file into the working tree without committing it.
    pub fn write_file(&self, name: &str, content: &str) {
        std::fs::write(self.dir.path().join(name), content).expect("Failed to write file");
    }

    /// Create a commit dated now. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        self.commit_at(message, Utc::now())
    }

    /// Create a commit dated `days` days ago.
    pub fn commit_days_ago(&self, message: &str, days: i64) -> Oid {
        self.commit_at(message, Utc::now() - Duration::days(days))
    }

    /// Create a commit with author and committer time `when`.
    ///
    /// Each commit appends a line to `changes.txt` so its diff is never empty.
    pub fn commit_at(&self, message: &str, when: DateTime<Utc>) -> Oid {
        let time = Time::new(when.timestamp(), 0);
        let sig = Signature::new("Test User", "test@example.com", &time)
            .expect("Failed to create signature");

        let file_path = self.dir.path().join("changes.txt");
        let mut content = std::fs::read_to_string(&file_path).unwrap_or_default();
        content.push_str(message);
        content.push('\n');
        std::fs::write(&file_path, content).expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .expect("Failed to add files");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a branch pointing to the given OID.
    pub fn branch(&self, name: &str, oid: Oid) {
        let commit = self.repo.find_commit(oid).expect("Failed to find commit");
        self.repo
            .branch(name, &commit, false)
            .expect("Failed to create branch");
    }
}
