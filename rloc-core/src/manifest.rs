//! Runfiles manifest parsing and lookup
//!
//! A manifest maps each runfile path to its real location, one
//! `<runfile-path> <target-path>` entry per line, split at the first space.
//! An empty target means the runfile maps to itself.
//!
//! Lines that start with a space carry escaped fields: `\s`, `\n` and `\b`
//! stand for space, newline and backslash in the runfile path, and `\n` and
//! `\b` for newline and backslash in the target.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Manifest key that names the repository-mapping file
pub const REPO_MAPPING_KEY: &str = "_repo_mapping";

/// Immutable runfile path → target index built from a manifest
#[derive(Debug, Clone, Default)]
pub struct ManifestIndex {
    entries: HashMap<String, String>,
    repo_mapping: Option<String>,
}

impl ManifestIndex {
    /// Read and parse the manifest at `path`
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let index = Self::parse(&contents);
        log::info!("Loaded manifest {} ({} entries)", path, index.len());
        Ok(index)
    }

    /// Parse manifest contents
    pub fn parse(contents: &str) -> Self {
        let mut index = Self::default();

        for line in contents.split('\n').filter(|l| !l.is_empty()) {
            let (link, target) = match line.strip_prefix(' ') {
                Some(escaped) => {
                    let (link, target) = escaped.split_once(' ').unwrap_or((escaped, ""));
                    (unescape(link, true), unescape(target, false))
                }
                None => {
                    let (link, target) = line.split_once(' ').unwrap_or((line, ""));
                    (link.to_string(), target.to_string())
                }
            };

            if link == REPO_MAPPING_KEY {
                if let Some(previous) = index.repo_mapping.replace(target) {
                    log::warn!(
                        "Manifest names more than one repository mapping, ignoring {}",
                        previous
                    );
                }
                continue;
            }

            let target = if target.is_empty() { link.clone() } else { target };
            index.entries.insert(link, target);
        }

        index
    }

    /// Target recorded for exactly `path`
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Resolve `path`, falling back to the closest enclosing directory entry
    ///
    /// Only directories are listed for runfiles that live inside a directory
    /// runfile, so `dir/sub/file` resolves to `<target of dir>/sub/file`.
    pub fn lookup(&self, path: &str) -> Option<String> {
        if let Some(target) = self.get(path) {
            return Some(target.to_string());
        }

        path.rmatch_indices('/')
            .filter(|&(idx, _)| idx + 1 < path.len())
            .find_map(|(idx, _)| {
                self.get(&path[..idx])
                    .map(|dir| format!("{dir}/{}", &path[idx + 1..]))
            })
    }

    /// Repository-mapping file named by the manifest, if any
    pub fn repo_mapping_path(&self) -> Option<&str> {
        self.repo_mapping.as_deref().filter(|p| !p.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Copy)]
enum Unescape {
    Text,
    Escape,
}

/// Single pass over `field`; unknown escapes are kept as written
fn unescape(field: &str, spaces: bool) -> String {
    let mut out = String::with_capacity(field.len());
    let mut state = Unescape::Text;

    for c in field.chars() {
        state = match (state, c) {
            (Unescape::Text, '\\') => Unescape::Escape,
            (Unescape::Text, c) => {
                out.push(c);
                Unescape::Text
            }
            (Unescape::Escape, 's') if spaces => {
                out.push(' ');
                Unescape::Text
            }
            (Unescape::Escape, 'n') => {
                out.push('\n');
                Unescape::Text
            }
            (Unescape::Escape, 'b') => {
                out.push('\\');
                Unescape::Text
            }
            (Unescape::Escape, '\\') => {
                out.push('\\');
                Unescape::Escape
            }
            (Unescape::Escape, c) => {
                out.push('\\');
                out.push(c);
                Unescape::Text
            }
        };
    }

    if let Unescape::Escape = state {
        out.push('\\');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_entries() {
        let index = ManifestIndex::parse("a/b c/d\nFoo/runfile2 C:/Actual Path\\runfile2\n");
        assert_eq!(index.get("a/b"), Some("c/d"));
        assert_eq!(index.get("Foo/runfile2"), Some("C:/Actual Path\\runfile2"));
        assert_eq!(index.get("foo"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_self_mapped_entries() {
        let index = ManifestIndex::parse("Foo/runfile1 \nbare\n");
        assert_eq!(index.get("Foo/runfile1"), Some("Foo/runfile1"));
        assert_eq!(index.get("bare"), Some("bare"));
    }

    #[test]
    fn test_escaped_entry() {
        let index = ManifestIndex::parse(
            " Foo\\sBar\\bDir\\nNewline/runfile5 F:\\bActual Path\\bwith\\nnewline/runfile5\n",
        );
        assert_eq!(
            index.get("Foo Bar\\Dir\nNewline/runfile5"),
            Some("F:\\Actual Path\\with\nnewline/runfile5")
        );
    }

    #[test]
    fn test_unescape_adjacent_sequences() {
        assert_eq!(unescape("\\b\\s\\n", true), "\\ \n");
        assert_eq!(unescape("a\\s", false), "a\\s");
        assert_eq!(unescape("\\\\b", true), "\\\\");
        assert_eq!(unescape("tail\\", true), "tail\\");
        assert_eq!(unescape("\\x", true), "\\x");
    }

    #[test]
    fn test_repo_mapping_entry_is_not_a_runfile() {
        let index = ManifestIndex::parse("_repo_mapping /tmp/_repo_mapping\na b\n");
        assert_eq!(index.repo_mapping_path(), Some("/tmp/_repo_mapping"));
        assert_eq!(index.get("_repo_mapping"), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_directory_entry_lookup() {
        let index = ManifestIndex::parse("Foo/Bar/Dir E:\\Actual Path\\Directory\n");
        assert_eq!(
            index.lookup("Foo/Bar/Dir/runfile4").as_deref(),
            Some("E:\\Actual Path\\Directory/runfile4")
        );
        assert_eq!(
            index.lookup("Foo/Bar/Dir/Deeply/Nested/runfile4").as_deref(),
            Some("E:\\Actual Path\\Directory/Deeply/Nested/runfile4")
        );
        assert_eq!(index.lookup("Foo/Bar"), None);
        assert_eq!(index.lookup("unknown"), None);
    }

    #[test]
    fn test_closest_directory_wins() {
        let index = ManifestIndex::parse("a /outer\na/b /inner\n");
        assert_eq!(index.lookup("a/b/c").as_deref(), Some("/inner/c"));
        assert_eq!(index.lookup("a/x/c").as_deref(), Some("/outer/x/c"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ManifestIndex::from_file("non-existing path").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("non-existing path"));
    }
}
