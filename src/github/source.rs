//! Where merged PRs come from.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;

use crate::error::GitHubError;

use super::prs::{FetchOptions, PullRequest, build_client, fetch_merged_prs_with_client};
use super::retry::RetryPolicy;

/// Supplies merged PRs for a time window.
///
/// This abstraction allows mocking the GitHub API in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Merged PRs with a merge time inside `[since, until]` (either bound optional).
    async fn merged_pull_requests(
        &self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<PullRequest>, GitHubError>;
}

/// Source backed by the GitHub REST API.
pub struct GitHubSource {
    client: Octocrab,
    owner: String,
    repo: String,
    limit: Option<usize>,
    retry: RetryPolicy,
}

impl GitHubSource {
    pub fn new(client: Octocrab, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            client,
            owner: owner.into(),
            repo: repo.into(),
            limit: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Build a source with a personal access token.
    pub fn with_token(
        token: &str,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Result<Self, GitHubError> {
        Ok(Self::new(build_client(token)?, owner, repo))
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl PullRequestSource for GitHubSource {
    async fn merged_pull_requests(
        &self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<PullRequest>, GitHubError> {
        let options = FetchOptions {
            since,
            until,
            limit: self.limit,
            retry: self.retry.clone(),
        };
        fetch_merged_prs_with_client(&self.client, &self.owner, &self.repo, &options).await
    }
}
