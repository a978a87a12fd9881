//! Git operations using git2-rs.

pub mod commits;
pub mod range;
pub mod tags;

pub use commits::commits_in_range;
pub use range::{CommitRange, resolve_range};
pub use tags::{TagInfo, get_previous_release_tag, get_version_from_tag};
