//! Label and title based classification of pull requests.

use serde::{Deserialize, Serialize};

use crate::github::PullRequest;

use super::kind::Kind;

/// Whether titles are consulted when no label matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationPolicy {
    /// Only labels decide; unlabeled pull requests are `Other`.
    LabelOnly,
    /// Labels first, then keyword matching on the lower-cased title.
    #[default]
    LabelWithTitleFallback,
}

/// Maps one exact, case-sensitive label to a kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRule {
    pub label: String,
    pub kind: Kind,
}

impl LabelRule {
    pub fn new(label: impl Into<String>, kind: Kind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }
}

/// Title keywords for one kind. Keywords are matched as lower-case substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub kind: Kind,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(kind: Kind, keywords: &[&str]) -> Self {
        Self {
            kind,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Default label aliases, short and long spellings per kind.
pub fn default_label_rules() -> Vec<LabelRule> {
    vec![
        LabelRule::new("kind/feature", Kind::NewFeature),
        LabelRule::new("kind/new-feature", Kind::NewFeature),
        LabelRule::new("kind/new_feature", Kind::NewFeature),
        LabelRule::new("kind/fix", Kind::BugFix),
        LabelRule::new("kind/bug", Kind::BugFix),
        LabelRule::new("kind/bug_fix", Kind::BugFix),
        LabelRule::new("kind/breaking", Kind::BreakingChange),
        LabelRule::new("kind/breaking-change", Kind::BreakingChange),
        LabelRule::new("kind/breaking_change", Kind::BreakingChange),
        LabelRule::new("kind/docs", Kind::Documentation),
        LabelRule::new("kind/documentation", Kind::Documentation),
        LabelRule::new("kind/perf", Kind::Performance),
        LabelRule::new("kind/performance", Kind::Performance),
    ]
}

/// Default title keywords, in priority order.
pub fn default_keyword_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(Kind::NewFeature, &["feat", "feature"]),
        KeywordRule::new(Kind::BugFix, &["fix", "bug"]),
        KeywordRule::new(Kind::BreakingChange, &["break", "breaking"]),
        KeywordRule::new(Kind::Documentation, &["doc", "docs"]),
        KeywordRule::new(Kind::Performance, &["perf", "performance"]),
    ]
}

/// Assigns every pull request exactly one [`Kind`].
#[derive(Debug, Clone)]
pub struct Classifier {
    labels: Vec<LabelRule>,
    keywords: Vec<KeywordRule>,
    policy: ClassificationPolicy,
}

impl Classifier {
    /// Create a classifier from explicit rule tables.
    ///
    /// Keywords are lower-cased here so the title check is case-insensitive.
    /// Empty keywords and keyword rules for `Other` are dropped since they
    /// would match everything or nothing useful.
    pub fn new(
        labels: Vec<LabelRule>,
        keywords: Vec<KeywordRule>,
        policy: ClassificationPolicy,
    ) -> Self {
        let keywords = keywords
            .into_iter()
            .filter(|rule| rule.kind.is_renderable())
            .map(|rule| KeywordRule {
                kind: rule.kind,
                keywords: rule
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();

        Self {
            labels,
            keywords,
            policy,
        }
    }

    /// Same rule tables, different policy.
    pub fn with_policy(mut self, policy: ClassificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ClassificationPolicy {
        self.policy
    }

    /// Classify a pull request. Never fails: unknown input is `Other`.
    pub fn classify(&self, pr: &PullRequest) -> Kind {
        if let Some(kind) = self.classify_by_labels(&pr.labels) {
            return kind;
        }

        match self.policy {
            ClassificationPolicy::LabelOnly => Kind::Other,
            ClassificationPolicy::LabelWithTitleFallback => self.classify_by_title(&pr.title),
        }
    }

    /// First label, in the pull request's order, that has a rule wins.
    fn classify_by_labels(&self, labels: &[String]) -> Option<Kind> {
        labels
            .iter()
            .filter(|label| !label.is_empty())
            .find_map(|label| {
                self.labels
                    .iter()
                    .find(|rule| rule.label == *label)
                    .map(|rule| rule.kind)
            })
    }

    fn classify_by_title(&self, title: &str) -> Kind {
        let title = title.to_lowercase();

        self.keywords
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| title.contains(k.as_str())))
            .map(|rule| rule.kind)
            .unwrap_or(Kind::Other)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            default_label_rules(),
            default_keyword_rules(),
            ClassificationPolicy::default(),
        )
    }
}
