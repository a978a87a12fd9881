//! changelog-generator - groups merged PRs by kind and renders a markdown changelog.
//!
//! # Overview
//!
//! Merged PRs between two commits are fetched from GitHub, classified by label
//! (optionally falling back to title keywords), and rendered as one `##`
//! section per kind. Bullets carry either the PR title or the contents of a
//! `release-note` fence from the PR body.
//!
//! The classification and rendering core in [`changelog`] is pure: it never
//! performs I/O and never fails.

pub mod changelog;
pub mod config;
pub mod error;
pub mod generator;
pub mod git;
pub mod github;
pub mod output;

// Re-export commonly used types
pub use changelog::{
    ClassificationPolicy, Classifier, Kind, KindHeaders, RenderStrategy, Renderer, extract_note,
};
pub use config::{Config, load_config};
pub use error::{ConfigError, GenerateError, GitError, GitHubError, OutputError};
pub use generator::{Changelog, Generator, MergeWindow};
pub use github::PullRequest;
