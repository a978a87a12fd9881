//! Release tag lookup for the default start of a range.

use std::collections::HashMap;

use git2::{Oid, Repository};
use semver::Version;
use tracing::debug;

use crate::error::GitError;

/// A git tag resolved to the commit it points at.
#[derive(Debug, Clone)]
pub struct TagInfo {
    pub name: String,
    pub oid: Oid,
    pub version: Version,
}

/// Find the previous release tag for a range ending at `end`.
///
/// Walks history from `end` (newest first) and returns the highest stable
/// semver tag on the first tagged commit found. Tags on `end` itself are
/// skipped so that running at a freshly tagged release still diffs against
/// the release before it.
pub fn get_previous_release_tag(repo: &Repository, end: Oid) -> Result<Option<TagInfo>, GitError> {
    let mut tags_by_commit: HashMap<Oid, Vec<TagInfo>> = HashMap::new();
    for tag in get_release_tags(repo)? {
        tags_by_commit.entry(tag.oid).or_default().push(tag);
    }

    if tags_by_commit.is_empty() {
        debug!("No release tags found in repository");
        return Ok(None);
    }

    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk.push(end).map_err(GitError::RevwalkError)?;
    revwalk
        .set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)
        .map_err(GitError::RevwalkError)?;

    for oid in revwalk {
        let oid = oid.map_err(GitError::RevwalkError)?;
        if oid == end {
            continue;
        }
        if let Some(candidates) = tags_by_commit.get(&oid) {
            let latest = candidates.iter().max_by(|a, b| a.version.cmp(&b.version)).cloned();
            if let Some(tag) = latest {
                debug!(tag = %tag.name, "Found previous release tag");
                return Ok(Some(tag));
            }
        }
    }

    Ok(None)
}

/// All stable semver tags (`vX.Y.Z` or `X.Y.Z`), peeled to commits.
fn get_release_tags(repo: &Repository) -> Result<Vec<TagInfo>, GitError> {
    let names = repo.tag_names(None).map_err(GitError::TagListFailed)?;
    let mut tags = Vec::new();

    for name in names.iter().flatten() {
        let Some(version) = get_version_from_tag(name) else {
            continue;
        };
        if !version.pre.is_empty() {
            continue;
        }

        let commit = repo
            .revparse_single(&format!("refs/tags/{}", name))
            .and_then(|obj| obj.peel_to_commit());

        match commit {
            Ok(commit) => tags.push(TagInfo {
                name: name.to_string(),
                oid: commit.id(),
                version,
            }),
            Err(e) => debug!(tag = %name, error = %e, "Tag does not point at a commit"),
        }
    }

    Ok(tags)
}

/// Extract a semver version from a tag name like `v1.2.3` or `1.2.3`.
pub fn get_version_from_tag(tag_name: &str) -> Option<Version> {
    let version_str = tag_name.strip_prefix('v').unwrap_or(tag_name);
    Version::parse(version_str).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_tag_with_v() {
        assert_eq!(get_version_from_tag("v1.2.3"), Some(Version::new(1, 2, 3)));
    }

    #[test]
    fn test_version_from_tag_without_v() {
        assert_eq!(get_version_from_tag("1.2.3"), Some(Version::new(1, 2, 3)));
    }

    #[test]
    fn test_version_from_tag_invalid() {
        assert_eq!(get_version_from_tag("release-candidate"), None);
        assert_eq!(get_version_from_tag("v1foo.0.0"), None);
    }
}
