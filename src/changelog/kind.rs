//! Change kinds and their section headings.

use serde::{Deserialize, Deserializer, Serialize};

/// The category a merged pull request falls into.
///
/// Serializes to the snake-case key (e.g., `"bug_fix"`). Deserialization
/// also accepts hyphenated spellings such as `"bug-fix"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    NewFeature,
    BugFix,
    BreakingChange,
    Documentation,
    Performance,
    Other,
}

impl Kind {
    /// Renderable kinds in the order their sections appear in a changelog.
    ///
    /// `Other` is deliberately absent: it is never rendered.
    pub const RENDER_ORDER: [Kind; 5] = [
        Kind::NewFeature,
        Kind::BugFix,
        Kind::BreakingChange,
        Kind::Documentation,
        Kind::Performance,
    ];

    /// Configuration key for the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewFeature => "new_feature",
            Self::BugFix => "bug_fix",
            Self::BreakingChange => "breaking_change",
            Self::Documentation => "documentation",
            Self::Performance => "performance",
            Self::Other => "other",
        }
    }

    /// Whether pull requests of this kind ever appear in output.
    pub fn is_renderable(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "new_feature" | "feature" => Ok(Self::NewFeature),
            "bug_fix" | "fix" => Ok(Self::BugFix),
            "breaking_change" | "breaking" => Ok(Self::BreakingChange),
            "documentation" | "docs" => Ok(Self::Documentation),
            "performance" | "perf" => Ok(Self::Performance),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown kind: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for Kind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Kind>().map_err(serde::de::Error::custom)
    }
}

/// Section headings for each renderable kind.
///
/// Lookup is by kind; section order always comes from [`Kind::RENDER_ORDER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindHeaders {
    new_feature: String,
    bug_fix: String,
    breaking_change: String,
    documentation: String,
    performance: String,
}

impl KindHeaders {
    /// Heading for `kind`, or `None` for `Other`.
    pub fn get(&self, kind: Kind) -> Option<&str> {
        match kind {
            Kind::NewFeature => Some(&self.new_feature),
            Kind::BugFix => Some(&self.bug_fix),
            Kind::BreakingChange => Some(&self.breaking_change),
            Kind::Documentation => Some(&self.documentation),
            Kind::Performance => Some(&self.performance),
            Kind::Other => None,
        }
    }

    /// Replace the heading for a renderable kind. `Other` is ignored.
    pub fn with_header(mut self, kind: Kind, header: impl Into<String>) -> Self {
        let header = header.into();
        match kind {
            Kind::NewFeature => self.new_feature = header,
            Kind::BugFix => self.bug_fix = header,
            Kind::BreakingChange => self.breaking_change = header,
            Kind::Documentation => self.documentation = header,
            Kind::Performance => self.performance = header,
            Kind::Other => {}
        }
        self
    }
}

impl Default for KindHeaders {
    fn default() -> Self {
        Self {
            new_feature: "🚀 Features".to_string(),
            bug_fix: "🐛 Bug Fixes".to_string(),
            breaking_change: "💥 Breaking Changes".to_string(),
            documentation: "📝 Documentation".to_string(),
            performance: "⚡ Performance Improvements".to_string(),
        }
    }
}
