//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use changelog_generator::PullRequest;
use git2::{Oid, Repository, Signature, Time};

/// Build an in-memory PR record the way the fetch layer would.
pub fn pr(number: u64, title: &str, body: &str, labels: &[&str]) -> PullRequest {
    PullRequest {
        number,
        title: title.to_string(),
        body: Some(body.to_string()),
        labels: labels.iter().map(|l| l.to_string()).collect(),
        merged_at: None,
        merge_commit_sha: None,
    }
}

/// Wrap text in a `release-note` fence.
pub fn release_note(text: &str) -> String {
    format!("```release-note\n{}\n```", text)
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
    counter: std::cell::Cell<u32>,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self {
            dir,
            repo,
            counter: std::cell::Cell::new(0),
        }
    }

    /// Create a commit with the current time. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        self.commit_with(message, &sig)
    }

    /// Create a commit with a fixed committer time (seconds since the epoch).
    pub fn commit_at(&self, message: &str, seconds: i64) -> Oid {
        let sig = Signature::new("Test User", "test@example.com", &Time::new(seconds, 0))
            .expect("Failed to create signature");
        self.commit_with(message, &sig)
    }

    fn commit_with(&self, message: &str, sig: &Signature<'_>) -> Oid {
        // Change a file so every commit has a distinct tree
        let n = self.counter.get() + 1;
        self.counter.set(n);
        let file_path = self.dir.path().join("test.txt");
        std::fs::write(&file_path, format!("{}\n{}", message, n)).expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(std::path::Path::new("test.txt")).expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), sig, sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo.tag_lightweight(name, &obj, false).expect("Failed to create lightweight tag");
    }

    /// Create an annotated tag pointing to the given OID.
    pub fn tag_annotated(&self, name: &str, oid: Oid, message: &str) {
        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo.tag(name, &obj, &sig, message, false).expect("Failed to create annotated tag");
    }
}
