//! Configuration file loading.
//!
//! Discovery order:
//! 1. `--config <path>` (must exist)
//! 2. `$CHANGELOG_GENERATOR_CONFIG` (must exist)
//! 3. `.changelog.toml` in the working directory
//! 4. Built-in defaults
//!
//! Example:
//!
//! ```toml
//! mode = "title"
//! classification = "label-only"
//!
//! [[labels]]
//! label = "type: feature"
//! kind = "new_feature"
//!
//! [keywords]
//! documentation = ["doc", "readme"]
//!
//! [headers]
//! bug_fix = "Fixes"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::changelog::classify::{default_keyword_rules, default_label_rules};
use crate::changelog::{
    ClassificationPolicy, Classifier, KeywordRule, Kind, KindHeaders, LabelRule, RenderStrategy,
    Renderer,
};
use crate::error::ConfigError;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "CHANGELOG_GENERATOR_CONFIG";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".changelog.toml";

/// Rendering and classification settings.
///
/// Omitted keys keep their defaults. `labels` replaces the whole default
/// label table; each `keywords.<kind>` replaces that kind's defaults only.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub mode: RenderStrategy,
    pub classification: ClassificationPolicy,
    pub labels: Option<Vec<LabelRule>>,
    pub keywords: PerKind<Vec<String>>,
    pub headers: PerKind<String>,
}

/// Optional per-kind overrides, keyed by the kind's config name.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerKind<T> {
    pub new_feature: Option<T>,
    pub bug_fix: Option<T>,
    pub breaking_change: Option<T>,
    pub documentation: Option<T>,
    pub performance: Option<T>,
}

impl<T> Default for PerKind<T> {
    fn default() -> Self {
        Self {
            new_feature: None,
            bug_fix: None,
            breaking_change: None,
            documentation: None,
            performance: None,
        }
    }
}

impl<T> PerKind<T> {
    pub fn get(&self, kind: Kind) -> Option<&T> {
        match kind {
            Kind::NewFeature => self.new_feature.as_ref(),
            Kind::BugFix => self.bug_fix.as_ref(),
            Kind::BreakingChange => self.breaking_change.as_ref(),
            Kind::Documentation => self.documentation.as_ref(),
            Kind::Performance => self.performance.as_ref(),
            Kind::Other => None,
        }
    }
}

impl Config {
    /// Parse a config from TOML text. `path` is only used for error messages.
    pub fn from_toml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Classifier built from the label and keyword tables.
    ///
    /// Keyword priority always follows [`Kind::RENDER_ORDER`].
    pub fn classifier(&self) -> Classifier {
        let labels = self.labels.clone().unwrap_or_else(default_label_rules);

        let defaults = default_keyword_rules();
        let keywords = Kind::RENDER_ORDER
            .iter()
            .map(|kind| match self.keywords.get(*kind) {
                Some(words) => KeywordRule {
                    kind: *kind,
                    keywords: words.clone(),
                },
                None => defaults
                    .iter()
                    .find(|rule| rule.kind == *kind)
                    .cloned()
                    .unwrap_or(KeywordRule {
                        kind: *kind,
                        keywords: Vec::new(),
                    }),
            })
            .collect();

        Classifier::new(labels, keywords, self.classification)
    }

    pub fn headers(&self) -> KindHeaders {
        Kind::RENDER_ORDER
            .iter()
            .fold(KindHeaders::default(), |headers, kind| match self.headers.get(*kind) {
                Some(header) => headers.with_header(*kind, header.clone()),
                None => headers,
            })
    }

    pub fn renderer(&self) -> Renderer {
        Renderer::new(self.classifier(), self.headers(), self.mode)
    }
}

/// Load the config using the discovery order, relative to the current directory.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config, ConfigError> {
    load_config_in(explicit_path, Path::new("."))
}

/// Load the config using the discovery order, looking for the default file in `dir`.
pub fn load_config_in(explicit_path: Option<&Path>, dir: &Path) -> Result<Config, ConfigError> {
    if let Some(path) = explicit_path {
        return read_config(path);
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return read_config(Path::new(&path));
        }
    }

    let local = dir.join(DEFAULT_CONFIG_FILE);
    if local.is_file() {
        return read_config(&local);
    }

    debug!("No config file found, using defaults");
    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(PathBuf::from(path)));
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), "Loaded config");
    Config::from_toml(&contents, path)
}
