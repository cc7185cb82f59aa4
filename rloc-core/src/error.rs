//! Error types for rloc-core

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using rloc Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a resolver or resolving a runfile
///
/// Lookup misses are not errors: `rlocation` reports them as `Ok(None)`.
#[derive(Debug, Error)]
pub enum Error {
    /// The runfile path was rejected before any lookup took place
    #[error("path {path:?} {reason}")]
    InvalidPath {
        path: String,
        reason: InvalidPathReason,
    },

    /// A manifest or repository-mapping file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A repository-mapping line did not have three comma-separated fields
    #[error("malformed repository mapping line in {}: {line:?}", path.display())]
    MalformedRepoMapping { path: PathBuf, line: String },
}

/// Why a runfile path failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPathReason {
    /// The path was the empty string
    Empty,
    /// The path contains a `.` or `..` segment, or a `//`
    NotNormalized,
    /// The path starts with a separator that does not form an absolute path
    AbsoluteWithoutDriveLetter,
}

impl fmt::Display for InvalidPathReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "must not be empty",
            Self::NotNormalized => "is not normalized",
            Self::AbsoluteWithoutDriveLetter => "is absolute without a drive letter",
        })
    }
}

impl Error {
    pub(crate) fn invalid_path(path: &str, reason: InvalidPathReason) -> Self {
        Error::InvalidPath {
            path: path.to_string(),
            reason,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// The validation failure behind this error, if it is one
    pub fn invalid_path_reason(&self) -> Option<InvalidPathReason> {
        match self {
            Error::InvalidPath { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_message() {
        let err = Error::invalid_path("foo/../bar", InvalidPathReason::NotNormalized);
        assert_eq!(err.to_string(), "path \"foo/../bar\" is not normalized");
        assert_eq!(
            err.invalid_path_reason(),
            Some(InvalidPathReason::NotNormalized)
        );
    }

    #[test]
    fn test_io_message_names_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = Error::io("non-existing path", source);
        assert!(err.to_string().contains("non-existing path"));
        assert_eq!(err.invalid_path_reason(), None);
    }
}
