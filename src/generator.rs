//! End-to-end changelog generation: fetch, narrow to the commit range, render.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::changelog::{Bucket, Renderer, format_buckets};
use crate::error::GenerateError;
use crate::git::CommitRange;
use crate::github::{PullRequest, PullRequestSource};

/// Which merged PRs belong to a release.
#[derive(Debug, Clone, Default)]
pub struct MergeWindow {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    /// Commits in the range. When set, a PR whose merge commit is known but
    /// not in this set is dropped.
    ///
    /// The set built by [`MergeWindow::from_range`] includes the start commit,
    /// so a PR merged as the previous release's tagged commit appears in both
    /// that release's changelog and this one.
    pub commits: Option<HashSet<String>>,
}

impl MergeWindow {
    /// Window spanning a resolved range, inclusive of both endpoints.
    pub fn from_range(range: &CommitRange, commits: HashSet<String>) -> Self {
        Self {
            since: Some(range.from_time),
            until: Some(range.to_time),
            commits: Some(commits),
        }
    }

    fn contains(&self, pr: &PullRequest) -> bool {
        match (&self.commits, &pr.merge_commit_sha) {
            (Some(commits), Some(sha)) => commits.contains(sha),
            _ => true,
        }
    }
}

/// A rendered changelog and the buckets it was built from.
#[derive(Debug, Clone)]
pub struct Changelog {
    pub markdown: String,
    pub buckets: Vec<Bucket>,
}

impl Changelog {
    /// No changelog-worthy changes. Not an error.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| b.entries.is_empty())
    }
}

/// Produces a changelog from a PR source.
pub struct Generator<S: PullRequestSource> {
    source: S,
    renderer: Renderer,
}

impl<S: PullRequestSource> Generator<S> {
    pub fn new(source: S, renderer: Renderer) -> Self {
        Self { source, renderer }
    }

    /// Fetch merged PRs for the window and render them.
    ///
    /// Fetch failures surface as [`GenerateError::Fetch`]; nothing is rendered.
    #[instrument(skip_all)]
    pub async fn generate(&self, window: &MergeWindow) -> Result<Changelog, GenerateError> {
        let fetched = self
            .source
            .merged_pull_requests(window.since, window.until)
            .await
            .map_err(GenerateError::Fetch)?;

        let total = fetched.len();
        let prs: Vec<PullRequest> = fetched.into_iter().filter(|pr| window.contains(pr)).collect();
        debug!(total, in_range = prs.len(), "Filtered PRs to commit range");

        let buckets = self.renderer.buckets(&prs);
        let markdown = format_buckets(&buckets);

        info!(sections = buckets.len(), "Rendered changelog");
        Ok(Changelog { markdown, buckets })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use mockall::predicate::eq;

    use super::*;
    use crate::changelog::{Kind, RenderStrategy};
    use crate::error::GitHubError;
    use crate::github::source::MockPullRequestSource;

    fn pr(number: u64, body: &str, labels: &[&str], sha: Option<&str>) -> PullRequest {
        PullRequest {
            number,
            title: format!("PR {}", number),
            body: Some(body.to_string()),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            merged_at: None,
            merge_commit_sha: sha.map(str::to_string),
        }
    }

    fn note(text: &str) -> String {
        format!("```release-note\n{}\n```", text)
    }

    #[tokio::test]
    async fn test_generate_renders_fetched_prs() {
        let mut source = MockPullRequestSource::new();
        source.expect_merged_pull_requests().times(1).returning(|_, _| {
            Ok(vec![pr(42, &note("My note for PR42"), &["kind/feature"], None)])
        });

        let generator = Generator::new(source, Renderer::default());
        let changelog = generator.generate(&MergeWindow::default()).await.unwrap();

        assert_eq!(changelog.markdown.trim(), "## 🚀 Features\n\n- My note for PR42 (#42)");
        assert_eq!(changelog.buckets[0].kind, Kind::NewFeature);
        assert!(!changelog.is_empty());
    }

    #[tokio::test]
    async fn test_generate_passes_window_bounds() {
        let since = Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();

        let mut source = MockPullRequestSource::new();
        source
            .expect_merged_pull_requests()
            .with(eq(Some(since)), eq(Some(until)))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let window = MergeWindow {
            since: Some(since),
            until: Some(until),
            commits: None,
        };
        let generator = Generator::new(source, Renderer::default());
        let changelog = generator.generate(&window).await.unwrap();

        assert!(changelog.is_empty());
        assert_eq!(changelog.markdown, "");
    }

    #[tokio::test]
    async fn test_window_from_range_keeps_start_commit() {
        let from = git2::Oid::from_str("1111111111111111111111111111111111111111").unwrap();
        let to = git2::Oid::from_str("2222222222222222222222222222222222222222").unwrap();
        let range = CommitRange {
            from,
            to,
            from_ref: "v1.0.0".to_string(),
            to_ref: "HEAD".to_string(),
            from_time: Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap(),
            to_time: Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap(),
        };
        let window =
            MergeWindow::from_range(&range, HashSet::from([from.to_string(), to.to_string()]));

        let mut source = MockPullRequestSource::new();
        let (start_sha, end_sha) = (from.to_string(), to.to_string());
        source.expect_merged_pull_requests().returning(move |_, _| {
            Ok(vec![
                pr(1, "", &["kind/fix"], Some(start_sha.as_str())),
                pr(2, "", &["kind/fix"], Some(end_sha.as_str())),
            ])
        });

        let renderer = Renderer::new(
            crate::changelog::Classifier::default(),
            crate::changelog::KindHeaders::default(),
            RenderStrategy::Title,
        );
        let changelog = Generator::new(source, renderer).generate(&window).await.unwrap();

        assert_eq!(
            changelog.markdown.trim(),
            "## 🐛 Bug Fixes\n\n- PR 1 (#1)\n- PR 2 (#2)"
        );
    }

    #[tokio::test]
    async fn test_generate_drops_prs_outside_commit_range() {
        let mut source = MockPullRequestSource::new();
        source.expect_merged_pull_requests().returning(|_, _| {
            Ok(vec![
                pr(1, "", &["kind/fix"], Some("aaa")),
                pr(2, "", &["kind/fix"], Some("bbb")),
                pr(3, "", &["kind/fix"], None),
            ])
        });

        let window = MergeWindow {
            commits: Some(HashSet::from(["aaa".to_string()])),
            ..MergeWindow::default()
        };
        let renderer = Renderer::new(
            crate::changelog::Classifier::default(),
            crate::changelog::KindHeaders::default(),
            RenderStrategy::Title,
        );
        let generator = Generator::new(source, renderer);
        let changelog = generator.generate(&window).await.unwrap();

        assert_eq!(
            changelog.markdown.trim(),
            "## 🐛 Bug Fixes\n\n- PR 1 (#1)\n- PR 3 (#3)"
        );
    }

    #[tokio::test]
    async fn test_generate_surfaces_fetch_failure() {
        let mut source = MockPullRequestSource::new();
        source.expect_merged_pull_requests().returning(|_, _| {
            Err(GitHubError::RepositoryNotFound {
                owner: "foo".to_string(),
                repo: "bar".to_string(),
            })
        });

        let generator = Generator::new(source, Renderer::default());
        let result = generator.generate(&MergeWindow::default()).await;

        assert!(matches!(
            result,
            Err(GenerateError::Fetch(GitHubError::RepositoryNotFound { .. }))
        ));
    }
}
