//! Writing the rendered changelog to disk.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::OutputError;

/// Atomically write `markdown` to `path`, ending with exactly one newline.
///
/// The content goes to a temp file in the destination directory first, so a
/// failed write never leaves a half-written changelog behind.
pub fn write_changelog(path: &Path, markdown: &str) -> Result<(), OutputError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut content = markdown.trim().to_string();
    content.push('\n');

    let mut file = NamedTempFile::new_in(dir).map_err(OutputError::WriteFailed)?;
    file.write_all(content.as_bytes())
        .map_err(OutputError::WriteFailed)?;
    file.flush().map_err(OutputError::WriteFailed)?;
    file.persist(path)
        .map_err(|e| OutputError::PersistFailed(e.error))?;

    Ok(())
}
