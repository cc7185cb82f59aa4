//! Repository mapping
//!
//! Translates an apparent repository name, as written by the code asking for
//! a runfile, into the canonical name used as the on-disk/manifest prefix.
//! The translation depends on which repository is asking.
//!
//! The mapping file has one `<source>,<apparent>,<target>` entry per line.
//! A `<source>` ending in `*` is a prefix entry that applies to every
//! source repository starting with the text before the `*`.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

/// A prefix-based mapping entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixEntry {
    /// Source repositories starting with this prefix match
    pub source_prefix: String,
    /// Apparent repository name
    pub apparent: String,
    /// Canonical target repository name
    pub target: String,
}

/// Immutable (source repo, apparent repo) → canonical repo table
#[derive(Debug, Clone, Default)]
pub struct RepositoryMapping {
    /// source repo → apparent repo → target
    exact: HashMap<String, HashMap<String, String>>,
    /// Scanned in order; first match wins
    prefixed: Vec<PrefixEntry>,
}

impl RepositoryMapping {
    /// Build a mapping from explicit exact and prefix entries
    ///
    /// Prefix entries keep the order they are given in.
    pub fn new<E, P, S>(exact: E, prefixed: P) -> Self
    where
        E: IntoIterator<Item = ((S, S), S)>,
        P: IntoIterator<Item = ((S, S), S)>,
        S: Into<String>,
    {
        let mut mapping = Self::default();
        for ((source, apparent), target) in exact {
            mapping.insert_exact(source.into(), apparent.into(), target.into());
        }
        mapping.prefixed = prefixed
            .into_iter()
            .map(|((source_prefix, apparent), target)| PrefixEntry {
                source_prefix: source_prefix.into(),
                apparent: apparent.into(),
                target: target.into(),
            })
            .collect();
        mapping
    }

    /// Load a mapping file; a missing file yields the empty mapping
    pub fn from_file(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let mapping = Self::parse(&contents, path)?;
                log::info!(
                    "Loaded repository mapping {} ({} exact, {} prefixed)",
                    path.display(),
                    mapping.exact.values().map(HashMap::len).sum::<usize>(),
                    mapping.prefixed.len()
                );
                Ok(mapping)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("No repository mapping at {}", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(Error::io(path, err)),
        }
    }

    /// Parse mapping file contents; `path` is only used for error messages
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        let mut mapping = Self::default();
        for line in contents.lines().filter(|l| !l.is_empty()) {
            let mut fields = line.split(',');
            let (Some(source), Some(apparent), Some(target), None) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                return Err(Error::MalformedRepoMapping {
                    path: path.to_path_buf(),
                    line: line.to_string(),
                });
            };

            match source.strip_suffix('*') {
                Some(prefix) => mapping.prefixed.push(PrefixEntry {
                    source_prefix: prefix.to_string(),
                    apparent: apparent.to_string(),
                    target: target.to_string(),
                }),
                None => mapping.insert_exact(
                    source.to_string(),
                    apparent.to_string(),
                    target.to_string(),
                ),
            }
        }
        Ok(mapping)
    }

    fn insert_exact(&mut self, source: String, apparent: String, target: String) {
        self.exact.entry(source).or_default().insert(apparent, target);
    }

    /// Canonical name of `apparent_repo` as seen from `source_repo`
    ///
    /// Exact entries win over prefix entries; among prefix entries the first
    /// one registered wins.
    pub fn lookup(&self, source_repo: &str, apparent_repo: &str) -> Option<&str> {
        if let Some(target) = self
            .exact
            .get(source_repo)
            .and_then(|by_apparent| by_apparent.get(apparent_repo))
        {
            return Some(target.as_str());
        }

        self.prefixed
            .iter()
            .find(|e| e.apparent == apparent_repo && source_repo.starts_with(&e.source_prefix))
            .map(|e| e.target.as_str())
    }

    /// True when the mapping has no entries at all
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.prefixed.is_empty()
    }

    /// Prefix entries in lookup order
    pub fn prefixed(&self) -> &[PrefixEntry] {
        &self.prefixed
    }
}
