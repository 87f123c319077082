use std::path::PathBuf;
use thiserror::Error;

/// Main error type for goalpatch
///
/// The taxonomy is deliberately small: every failure that stops a run is an
/// I/O problem on the target file. Marker misses and drifted indices are not
/// errors, they surface as skipped steps in the outcome report.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("IO error: {source} (path: {})", .path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

impl PatchError {
    /// Create a new IO error with path context
    pub fn io_error(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source: err,
            path: path.into(),
        }
    }
}

/// Result type alias using PatchError
pub type PatchResult<T> = Result<T, PatchError>;
