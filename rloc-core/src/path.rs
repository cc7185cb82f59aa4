//! Runfile path validation
//!
//! Every `rlocation` call passes through [`validate`] before repository
//! mapping or any strategy lookup runs.

use crate::config::Platform;
use crate::error::{Error, InvalidPathReason, Result};

/// A runfile path that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunfilePath<'a> {
    /// Already absolute for the platform; returned to the caller unchanged
    Absolute(&'a str),
    /// Repository-qualified path to resolve
    Relative(&'a str),
}

/// Check `path` and classify it as absolute or relative
pub fn validate(path: &str, platform: Platform) -> Result<RunfilePath<'_>> {
    if path.is_empty() {
        return Err(Error::invalid_path(path, InvalidPathReason::Empty));
    }
    if path.contains("//") || path.split('/').any(|seg| seg == "." || seg == "..") {
        return Err(Error::invalid_path(path, InvalidPathReason::NotNormalized));
    }
    if path.starts_with('\\') {
        return Err(Error::invalid_path(
            path,
            InvalidPathReason::AbsoluteWithoutDriveLetter,
        ));
    }

    match platform {
        Platform::Unix if path.starts_with('/') => Ok(RunfilePath::Absolute(path)),
        Platform::Windows if path.starts_with('/') => Err(Error::invalid_path(
            path,
            InvalidPathReason::AbsoluteWithoutDriveLetter,
        )),
        Platform::Windows if has_drive_prefix(path) => Ok(RunfilePath::Absolute(path)),
        _ => Ok(RunfilePath::Relative(path)),
    }
}

/// `X:/` or `X:\` with an ASCII drive letter
fn has_drive_prefix(path: &str) -> bool {
    matches!(
        path.as_bytes(),
        [drive, b':', b'/' | b'\\', ..] if drive.is_ascii_alphabetic()
    )
}

/// Split off the leading repository segment
///
/// Returns `None` for single-segment paths; those name root symlinks and are
/// never remapped.
pub(crate) fn split_repo(path: &str) -> Option<(&str, &str)> {
    path.split_once('/').filter(|(_, rest)| !rest.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(path: &str, platform: Platform) -> Option<InvalidPathReason> {
        validate(path, platform).err().and_then(|e| e.invalid_path_reason())
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(reason("", Platform::Unix), Some(InvalidPathReason::Empty));
    }

    #[test]
    fn test_rejects_unnormalized() {
        for path in [
            "../foo", "foo/..", "foo/../bar", "./foo", "foo/.", "foo/./bar", "//foobar",
            "foo//", "foo//bar", ".", "..",
        ] {
            for platform in [Platform::Unix, Platform::Windows] {
                assert_eq!(
                    reason(path, platform),
                    Some(InvalidPathReason::NotNormalized),
                    "{path}"
                );
            }
        }
    }

    #[test]
    fn test_dots_inside_segments_are_fine() {
        assert_eq!(
            validate("foo/..bar/.baz", Platform::Unix).unwrap(),
            RunfilePath::Relative("foo/..bar/.baz")
        );
    }

    #[test]
    fn test_rejects_backslash_root() {
        for platform in [Platform::Unix, Platform::Windows] {
            assert_eq!(
                reason("\\foo", platform),
                Some(InvalidPathReason::AbsoluteWithoutDriveLetter)
            );
        }
    }

    #[test]
    fn test_unix_absolute() {
        assert_eq!(
            validate("/foo", Platform::Unix).unwrap(),
            RunfilePath::Absolute("/foo")
        );
        assert_eq!(
            validate("c:/foo", Platform::Unix).unwrap(),
            RunfilePath::Relative("c:/foo")
        );
    }

    #[test]
    fn test_windows_absolute() {
        assert_eq!(
            validate("c:/foo", Platform::Windows).unwrap(),
            RunfilePath::Absolute("c:/foo")
        );
        assert_eq!(
            validate("C:\\foo", Platform::Windows).unwrap(),
            RunfilePath::Absolute("C:\\foo")
        );
        assert_eq!(
            reason("/foo", Platform::Windows),
            Some(InvalidPathReason::AbsoluteWithoutDriveLetter)
        );
    }

    #[test]
    fn test_split_repo() {
        assert_eq!(split_repo("repo/a/b"), Some(("repo", "a/b")));
        assert_eq!(split_repo("config.json"), None);
        assert_eq!(split_repo("repo/"), None);
    }
}
