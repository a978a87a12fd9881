//! Grouping classified pull requests into markdown sections.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::github::PullRequest;

use super::classify::Classifier;
use super::kind::{Kind, KindHeaders};
use super::note::extract_note;

/// What text each bullet carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderStrategy {
    /// Every classified pull request, bulleted by its title.
    Title,
    /// Only pull requests with a non-empty `release-note` fence, bulleted by the note.
    #[default]
    ReleaseNote,
}

impl std::str::FromStr for RenderStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "release-note" | "release_note" | "note" => Ok(Self::ReleaseNote),
            _ => Err(format!("Unknown render mode: {}", s)),
        }
    }
}

/// One bullet line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub text: String,
    pub number: u64,
}

/// All entries of one kind, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub kind: Kind,
    pub header: String,
    pub entries: Vec<Entry>,
}

/// Classifies pull requests and formats them as a grouped markdown changelog.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    classifier: Classifier,
    headers: KindHeaders,
    strategy: RenderStrategy,
}

impl Renderer {
    pub fn new(classifier: Classifier, headers: KindHeaders, strategy: RenderStrategy) -> Self {
        Self {
            classifier,
            headers,
            strategy,
        }
    }

    pub fn strategy(&self) -> RenderStrategy {
        self.strategy
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Render the changelog. An empty string means nothing qualified.
    pub fn render(&self, prs: &[PullRequest]) -> String {
        format_buckets(&self.buckets(prs))
    }

    /// Group pull requests into non-empty buckets in canonical kind order.
    #[instrument(skip_all, fields(pr_count = prs.len(), strategy = ?self.strategy))]
    pub fn buckets(&self, prs: &[PullRequest]) -> Vec<Bucket> {
        let mut grouped: HashMap<Kind, Vec<Entry>> = HashMap::new();

        for pr in prs {
            let kind = self.classifier.classify(pr);
            if !kind.is_renderable() {
                debug!(number = pr.number, "Skipping unclassified PR");
                continue;
            }

            let Some(text) = self.entry_text(pr) else {
                debug!(number = pr.number, %kind, "Skipping PR without entry text");
                continue;
            };

            grouped.entry(kind).or_default().push(Entry {
                text,
                number: pr.number,
            });
        }

        Kind::RENDER_ORDER
            .iter()
            .filter_map(|kind| {
                let entries = grouped.remove(kind)?;
                let header = self.headers.get(*kind)?;
                Some(Bucket {
                    kind: *kind,
                    header: header.to_string(),
                    entries,
                })
            })
            .collect()
    }

    fn entry_text(&self, pr: &PullRequest) -> Option<String> {
        match self.strategy {
            RenderStrategy::Title => {
                let title = pr.title.as_str();
                if title.trim().is_empty() {
                    None
                } else {
                    Some(title.to_string())
                }
            }
            RenderStrategy::ReleaseNote => pr.body.as_deref().and_then(extract_note),
        }
    }
}

/// Format buckets as markdown sections.
///
/// Each section is a blank line, a `## ` heading, a blank line, then one
/// `- text (#number)` bullet per entry. Continuation lines of a multi-line
/// note are indented two spaces so they stay inside the bullet.
pub fn format_buckets(buckets: &[Bucket]) -> String {
    let mut changelog = String::new();

    for bucket in buckets.iter().filter(|b| !b.entries.is_empty()) {
        changelog.push_str(&format!("\n## {}\n\n", bucket.header));
        for entry in &bucket.entries {
            let text = indent_continuation(&entry.text);
            changelog.push_str(&format!("- {} (#{})\n", text, entry.number));
        }
    }

    changelog
}

fn indent_continuation(text: &str) -> String {
    let mut lines = text.lines().map(str::trim_end);
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        if !line.is_empty() {
            out.push_str("  ");
            out.push_str(line);
        }
    }
    out
}

/// One-line summary of rendered buckets for the user.
pub fn summarize(buckets: &[Bucket]) -> String {
    let total: usize = buckets.iter().map(|b| b.entries.len()).sum();

    if total == 0 {
        return "No changelog entries.".to_string();
    }

    let details: Vec<String> = buckets
        .iter()
        .filter(|b| !b.entries.is_empty())
        .map(|b| format!("{}: {}", b.header, b.entries.len()))
        .collect();

    let entry_word = if total == 1 { "entry" } else { "entries" };

    format!("{} {} ({})", total, entry_word, details.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::classify::ClassificationPolicy;

    fn pr(number: u64, title: &str, body: Option<&str>, labels: &[&str]) -> PullRequest {
        PullRequest {
            number,
            title: title.to_string(),
            body: body.map(str::to_string),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            merged_at: None,
            merge_commit_sha: None,
        }
    }

    fn title_renderer() -> Renderer {
        Renderer::new(
            Classifier::default(),
            KindHeaders::default(),
            RenderStrategy::Title,
        )
    }

    #[test]
    fn test_release_note_mode_single_pr() {
        let prs = vec![pr(
            42,
            "Add new feature",
            Some("```release-note\nMy note for PR42\n```"),
            &["kind/feature"],
        )];

        let out = Renderer::default().render(&prs);
        assert_eq!(out.trim(), "## 🚀 Features\n\n- My note for PR42 (#42)");
    }

    #[test]
    fn test_exact_section_layout() {
        let prs = vec![pr(1, "Fix crash", None, &["kind/fix"])];
        let out = title_renderer().render(&prs);
        assert_eq!(out, "\n## 🐛 Bug Fixes\n\n- Fix crash (#1)\n");
    }

    #[test]
    fn test_release_note_mode_skips_missing_notes() {
        let prs = vec![
            pr(1, "Fix crash", Some("no fence"), &["kind/fix"]),
            pr(2, "Fix leak", Some("```release-note\nFixed a leak\n```"), &["kind/fix"]),
            pr(3, "Fix typo", None, &["kind/fix"]),
            pr(4, "Fix spacing", Some("```release-note\n \n```"), &["kind/fix"]),
        ];

        let out = Renderer::default().render(&prs);
        assert_eq!(out.trim(), "## 🐛 Bug Fixes\n\n- Fixed a leak (#2)");
    }

    #[test]
    fn test_title_mode_ignores_body() {
        let prs = vec![pr(
            7,
            "Speed up parser",
            Some("```release-note\nFaster parsing\n```"),
            &["kind/perf"],
        )];

        let out = title_renderer().render(&prs);
        assert_eq!(out.trim(), "## ⚡ Performance Improvements\n\n- Speed up parser (#7)");
    }

    #[test]
    fn test_title_mode_skips_blank_titles() {
        let prs = vec![pr(1, "   ", None, &["kind/docs"])];
        assert_eq!(title_renderer().render(&prs), "");
    }

    #[test]
    fn test_unclassifiable_renders_empty() {
        let prs = vec![pr(43, "Refactor code", Some("No release note here."), &["irrelevant-label"])];
        assert_eq!(Renderer::default().render(&prs), "");
        assert_eq!(title_renderer().render(&prs), "");
    }

    #[test]
    fn test_other_never_rendered_even_with_note() {
        let prs = vec![pr(5, "Refactor code", Some("```release-note\nInternal\n```"), &[])];
        assert_eq!(Renderer::default().render(&prs), "");
    }

    #[test]
    fn test_bucket_preserves_input_order() {
        let prs = vec![
            pr(1, "Fix one", None, &["kind/fix"]),
            pr(2, "Add two", None, &["kind/feature"]),
            pr(3, "Fix three", None, &["kind/fix"]),
        ];

        let buckets = title_renderer().buckets(&prs);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[1].kind, Kind::BugFix);
        let numbers: Vec<u64> = buckets[1].entries.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn test_sections_follow_canonical_order() {
        let prs = vec![
            pr(3, "c", Some("```release-note\nBreaks API\n```"), &["kind/breaking"]),
            pr(2, "b", Some("```release-note\nFixes bug\n```"), &["kind/fix"]),
            pr(1, "a", Some("```release-note\nAdds thing\n```"), &["kind/feature"]),
        ];

        let out = Renderer::default().render(&prs);
        let features = out.find("## 🚀 Features").unwrap();
        let fixes = out.find("## 🐛 Bug Fixes").unwrap();
        let breaking = out.find("## 💥 Breaking Changes").unwrap();
        assert!(features < fixes && fixes < breaking);
        assert_eq!(out.matches("## ").count(), 3);
    }

    #[test]
    fn test_no_heading_for_empty_bucket() {
        let prs = vec![pr(1, "Add docs page", None, &["kind/docs"])];
        let out = title_renderer().render(&prs);
        assert!(out.contains("## 📝 Documentation"));
        assert!(!out.contains("Features"));
        assert!(!out.contains("Bug Fixes"));
    }

    #[test]
    fn test_label_only_policy_drops_title_matches() {
        let renderer = Renderer::new(
            Classifier::default().with_policy(ClassificationPolicy::LabelOnly),
            KindHeaders::default(),
            RenderStrategy::Title,
        );
        let prs = vec![pr(1, "Fix crash", None, &[])];
        assert_eq!(renderer.render(&prs), "");
    }

    #[test]
    fn test_custom_headers() {
        let renderer = Renderer::new(
            Classifier::default(),
            KindHeaders::default().with_header(Kind::NewFeature, "New"),
            RenderStrategy::Title,
        );
        let out = renderer.render(&[pr(9, "Add x", None, &["kind/feature"])]);
        assert_eq!(out.trim(), "## New\n\n- Add x (#9)");
    }

    #[test]
    fn test_multi_line_note_stays_inside_bullet() {
        let body = "```release-note\nAdded streaming export.\nUse --stream to enable it.\n```";
        let out = Renderer::default().render(&[pr(7, "Stream", Some(body), &["kind/feature"])]);
        assert_eq!(
            out.trim(),
            "## 🚀 Features\n\n- Added streaming export.\n  Use --stream to enable it. (#7)"
        );
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("title".parse::<RenderStrategy>().unwrap(), RenderStrategy::Title);
        assert_eq!(
            "release-note".parse::<RenderStrategy>().unwrap(),
            RenderStrategy::ReleaseNote
        );
        assert!("html".parse::<RenderStrategy>().is_err());
    }

    #[test]
    fn test_summarize() {
        let prs = vec![
            pr(1, "Add a", None, &["kind/feature"]),
            pr(2, "Add b", None, &["kind/feature"]),
            pr(3, "Fix c", None, &["kind/fix"]),
        ];
        let summary = summarize(&title_renderer().buckets(&prs));
        assert_eq!(summary, "3 entries (🚀 Features: 2, 🐛 Bug Fixes: 1)");
        assert_eq!(summarize(&[]), "No changelog entries.");
    }
}
