//! Project description lookup.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// File read from the repository root for prompt context.
pub const README_NAME: &str = "README.md";

/// Characters of the README read for context.
pub const README_PREFIX_CHARS: usize = 1000;

/// Read the first [`README_PREFIX_CHARS`] characters of the repository README.
///
/// Returns `Ok(None)` when the file does not exist. Invalid UTF-8 is replaced.
pub fn read_project_context(repo_path: &Path) -> io::Result<Option<String>> {
    let path = repo_path.join(README_NAME);
    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    // Four bytes per char is the UTF-8 worst case.
    let mut bytes = Vec::new();
    file.take((README_PREFIX_CHARS * 4) as u64)
        .read_to_end(&mut bytes)?;

    let text: String = String::from_utf8_lossy(&bytes)
        .chars()
        .take(README_PREFIX_CHARS)
        .collect();
    Ok(Some(text))
}
