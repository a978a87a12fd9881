//! PR fetching via octocrab.

use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GitHubError;

use super::retry::{RetryPolicy, retry_with_backoff};

/// A merged GitHub PR, as consumed by the classifier and renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub labels: Vec<String>,
    pub merged_at: Option<DateTime<Utc>>,
    pub merge_commit_sha: Option<String>,
}

/// Default cap on the number of merged PRs returned.
pub const DEFAULT_PR_LIMIT: usize = 500;

/// Page safety limit to prevent runaway pagination.
const MAX_PAGES: u32 = 50;

/// Filters and limits for a merged-PR fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Keep PRs merged at or after this time.
    pub since: Option<DateTime<Utc>>,
    /// Keep PRs merged at or before this time.
    pub until: Option<DateTime<Utc>>,
    /// Stop after this many PRs (defaults to [`DEFAULT_PR_LIMIT`]).
    pub limit: Option<usize>,
    pub retry: RetryPolicy,
}

/// Build an authenticated octocrab client.
pub fn build_client(token: &str) -> Result<Octocrab, GitHubError> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(|e| GitHubError::FetchPRs(Box::new(e)))
}

/// Fetch merged PRs using a pre-configured octocrab client.
///
/// Pages through closed PRs, keeps the merged ones inside the date window and
/// returns them oldest merge first. Bodies are kept whole so a
/// `release-note` fence at the end of a long description is not lost.
pub async fn fetch_merged_prs_with_client(
    octocrab: &Octocrab,
    owner: &str,
    repo: &str,
    options: &FetchOptions,
) -> Result<Vec<PullRequest>, GitHubError> {
    let limit = options.limit.unwrap_or(DEFAULT_PR_LIMIT);
    let mut all_prs = Vec::new();
    let mut page = 1u32;

    'pages: loop {
        let prs_page = retry_with_backoff(&options.retry, || async move {
            octocrab
                .pulls(owner, repo)
                .list()
                .state(octocrab::params::State::Closed)
                .sort(octocrab::params::pulls::Sort::Updated)
                .direction(octocrab::params::Direction::Descending)
                .per_page(100)
                .page(page)
                .send()
                .await
                .map_err(|e| classify_error(e, owner, repo))
        })
        .await?;

        let has_next = prs_page.next.is_some();
        let items = prs_page.items;
        if items.is_empty() {
            break;
        }

        for pr in items {
            // Only include merged PRs
            let Some(merged_at) = pr.merged_at else {
                continue;
            };

            if pr.number == 0 {
                warn!("Skipping PR with invalid number 0");
                continue;
            }

            if options.since.is_some_and(|since| merged_at < since) {
                continue;
            }
            if options.until.is_some_and(|until| merged_at > until) {
                continue;
            }

            let labels = pr
                .labels
                .unwrap_or_default()
                .into_iter()
                .map(|l| l.name)
                .collect();

            all_prs.push(PullRequest {
                number: pr.number,
                title: pr.title.unwrap_or_default(),
                body: pr.body,
                labels,
                merged_at: Some(merged_at),
                merge_commit_sha: pr.merge_commit_sha,
            });

            if all_prs.len() >= limit {
                debug!(limit, "Reached PR limit for {}/{}", owner, repo);
                break 'pages;
            }
        }

        if !has_next {
            break;
        }

        page += 1;

        if page > MAX_PAGES {
            warn!(
                "Reached {}-page safety limit while fetching PRs for {}/{}",
                MAX_PAGES, owner, repo
            );
            break;
        }
    }

    all_prs.sort_by_key(|pr| (pr.merged_at, pr.number));

    debug!(count = all_prs.len(), "Fetched merged PRs for {}/{}", owner, repo);
    Ok(all_prs)
}

/// Map an octocrab error onto the GitHub error taxonomy.
///
/// Checks both Display and Debug output to handle different octocrab error formats.
fn classify_error(e: octocrab::Error, owner: &str, repo: &str) -> GitHubError {
    let err_display = e.to_string();
    let err_debug = format!("{:?}", e);

    // GitHub returns 403 with a rate limit message
    if err_display.to_lowercase().contains("rate limit")
        || err_debug.to_lowercase().contains("rate limit")
    {
        return GitHubError::RateLimited {
            reset_time: "unknown".to_string(),
        };
    }

    if err_display.contains("Not Found") || err_debug.contains("Not Found") {
        return GitHubError::RepositoryNotFound {
            owner: owner.to_string(),
            repo: repo.to_string(),
        };
    }

    GitHubError::FetchPRs(Box::new(e))
}

/// Extract owner and repo from a git remote URL.
pub fn parse_github_remote(url: &str) -> Result<(String, String), GitHubError> {
    // Handle SSH format: git@github.com:owner/repo.git
    if let Some(path) = url.strip_prefix("git@github.com:") {
        return parse_owner_repo_path(path);
    }

    // Handle HTTPS format: https://github.com/owner/repo.git
    if url.contains("github.com/") {
        let path = url
            .split("github.com/")
            .nth(1)
            .ok_or(GitHubError::InvalidRepositoryUrl)?;
        return parse_owner_repo_path(path);
    }

    Err(GitHubError::InvalidRepositoryUrl)
}

fn parse_owner_repo_path(path: &str) -> Result<(String, String), GitHubError> {
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let parts: Vec<&str> = path.split('/').collect();

    match parts.as_slice() {
        [owner, repo, ..] if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(GitHubError::InvalidRepositoryUrl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ssh_url() {
        let (owner, repo) = parse_github_remote("git@github.com:owner/repo.git").unwrap();
        assert_eq!(owner, "owner");
        assert_eq!(repo, "repo");
    }

    #[test]
    fn test_parse_https_url() {
        let (owner, repo) = parse_github_remote("https://github.com/owner/repo.git").unwrap();
        assert_eq!(owner, "owner");
        assert_eq!(repo, "repo");
    }

    #[test]
    fn test_parse_https_url_no_git_suffix() {
        let (owner, repo) = parse_github_remote("https://github.com/owner/repo/").unwrap();
        assert_eq!(owner, "owner");
        assert_eq!(repo, "repo");
    }

    #[test]
    fn test_parse_invalid_url() {
        assert!(parse_github_remote("https://gitlab.com/owner/repo").is_err());
        assert!(parse_github_remote("https://github.com/owner").is_err());
    }
}
