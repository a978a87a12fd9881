//! Classification, release-note extraction and markdown rendering.

pub mod classify;
pub mod kind;
pub mod note;
pub mod render;

pub use classify::{ClassificationPolicy, Classifier, KeywordRule, LabelRule};
pub use kind::{Kind, KindHeaders};
pub use note::extract_note;
pub use render::{Bucket, Entry, RenderStrategy, Renderer, format_buckets, summarize};
