//! Commit range resolution.

use chrono::{DateTime, TimeZone, Utc};
use git2::{Commit, Oid, Repository};
use tracing::{debug, warn};

use crate::error::GitError;

use super::tags::get_previous_release_tag;

/// Resolved commit range with start and end OIDs and committer times.
#[derive(Debug, Clone)]
pub struct CommitRange {
    pub from: Oid,
    pub to: Oid,
    pub from_ref: String,
    pub to_ref: String,
    pub from_time: DateTime<Utc>,
    pub to_time: DateTime<Utc>,
}

/// Resolve a commit range from user-provided references.
///
/// If `from` is None, uses the previous release tag or the root commit.
/// If `to` is None, uses HEAD.
pub fn resolve_range(
    repo: &Repository,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<CommitRange, GitError> {
    let to_ref = to.unwrap_or("HEAD");
    let to_oid = resolve_reference(repo, to_ref)?;

    let (from_oid, from_ref) = if let Some(from_str) = from {
        (resolve_reference(repo, from_str)?, from_str.to_string())
    } else if let Some(tag) = get_previous_release_tag(repo, to_oid)? {
        (tag.oid, tag.name)
    } else {
        (find_root_commit(repo, to_oid)?, "root".to_string())
    };

    let from_time = commit_time(&repo.find_commit(from_oid).map_err(GitError::ParseCommit)?)?;
    let to_time = commit_time(&repo.find_commit(to_oid).map_err(GitError::ParseCommit)?)?;

    debug!(%from_ref, %to_ref, %from_time, %to_time, "Resolved commit range");

    Ok(CommitRange {
        from: from_oid,
        to: to_oid,
        from_ref,
        to_ref: to_ref.to_string(),
        from_time,
        to_time,
    })
}

/// Resolve a reference (tag, branch, commit hash) to an OID.
fn resolve_reference(repo: &Repository, reference: &str) -> Result<Oid, GitError> {
    // Try as a direct OID first
    if let Ok(oid) = Oid::from_str(reference) {
        if repo.find_commit(oid).is_ok() {
            return Ok(oid);
        }
    }

    // Try as a reference (branch or tag)
    if let Ok(obj) = repo.revparse_single(reference) {
        return Ok(obj.peel_to_commit().map_err(GitError::ParseCommit)?.id());
    }

    Err(GitError::ReferenceNotFound(
        reference.to_string(),
        git2::Error::from_str("Reference not found"),
    ))
}

/// Find the root commit reachable from `start`.
fn find_root_commit(repo: &Repository, start: Oid) -> Result<Oid, GitError> {
    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk.push(start).map_err(GitError::RevwalkError)?;

    let mut root_oid = start;

    for oid_result in revwalk {
        match oid_result {
            Ok(oid) => root_oid = oid,
            Err(e) => {
                warn!(
                    "Error during revwalk traversal: {}. Continuing with last valid commit.",
                    e
                );
            }
        }
    }

    Ok(root_oid)
}

/// Committer time of a commit as UTC.
fn commit_time(commit: &Commit) -> Result<DateTime<Utc>, GitError> {
    let seconds = commit.time().seconds();
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| GitError::InvalidTimestamp {
            hash: commit.id().to_string(),
            seconds,
        })
}
