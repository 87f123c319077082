use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{PatchError, PatchResult};

/// A file's content as an ordered sequence of lines
///
/// Whether the source text ended with a newline is remembered so that an
/// untouched sequence round-trips byte-identically through a read/write
/// cycle.
#[derive(Debug, Clone)]
pub struct LineSequence {
    pub lines: Vec<String>,
    trailing_newline: bool,
}

impl LineSequence {
    pub fn from_content(content: &str) -> Self {
        Self {
            lines: content.lines().map(str::to_string).collect(),
            trailing_newline: content.ends_with('\n'),
        }
    }

    pub fn to_content(&self) -> String {
        let mut content = self.lines.join("\n");
        if self.trailing_newline && !self.lines.is_empty() {
            content.push('\n');
        }
        content
    }
}

/// Read a file into a line sequence
pub fn read_lines(path: impl AsRef<Path>) -> PatchResult<LineSequence> {
    let path = path.as_ref();
    debug!("Reading file: {}", path.display());

    let content =
        fs::read_to_string(path).map_err(|e| PatchError::io_error(e, path))?;

    Ok(LineSequence::from_content(&content))
}

/// Write a line sequence back to a file, overwriting it in place
pub fn write_lines(path: impl AsRef<Path>, seq: &LineSequence) -> PatchResult<()> {
    let path = path.as_ref();
    debug!("Writing {} lines to file: {}", seq.lines.len(), path.display());

    fs::write(path, seq.to_content()).map_err(|e| PatchError::io_error(e, path))
}
