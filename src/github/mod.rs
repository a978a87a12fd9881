//! GitHub API operations using octocrab.

pub mod auth;
pub mod prs;
pub mod retry;
pub mod source;

pub use auth::get_github_token;
pub use prs::{FetchOptions, PullRequest, fetch_merged_prs_with_client, parse_github_remote};
pub use retry::RetryPolicy;
pub use source::{GitHubSource, PullRequestSource};
