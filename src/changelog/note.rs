//! Release-note extraction from pull request bodies.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Fenced block tagged `release-note`. Non-greedy, so only the first block
/// counts and the match stops at the nearest closing fence.
static RELEASE_NOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```release-note\s*(.*?)\s*```").expect("release-note pattern is valid")
});

/// Extract the trimmed contents of the first `release-note` fence in `body`.
///
/// Returns `None` when there is no such fence or when it holds only whitespace.
pub fn extract_note(body: &str) -> Option<String> {
    let caps = RELEASE_NOTE_RE.captures(body)?;
    let note = caps.get(1)?.as_str().trim();

    if note.is_empty() {
        return None;
    }

    Some(note.to_string())
}
