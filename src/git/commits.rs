//! Commit enumeration for a resolved range.

use std::collections::HashSet;

use git2::Repository;

use crate::error::GitError;

use super::range::CommitRange;

/// Hashes of all commits in the range, both endpoints included.
///
/// Walks everything reachable from `range.to` that is not reachable from
/// `range.from`, then adds `range.from` itself.
pub fn commits_in_range(repo: &Repository, range: &CommitRange) -> Result<HashSet<String>, GitError> {
    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;

    revwalk.push(range.to).map_err(GitError::RevwalkError)?;
    revwalk.hide(range.from).map_err(GitError::RevwalkError)?;

    let mut commits = HashSet::new();
    commits.insert(range.from.to_string());

    for oid_result in revwalk {
        let oid = oid_result.map_err(GitError::RevwalkError)?;
        commits.insert(oid.to_string());
    }

    Ok(commits)
}
