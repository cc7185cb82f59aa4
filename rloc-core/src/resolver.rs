//! Resolution strategies
//!
//! A runfiles tree is either described by a manifest file or laid out as a
//! directory. Both strategies remap the leading repository segment through
//! their [`RepositoryMapping`] and then apply their own lookup.

use crate::config::{JAVA_RUNFILES, RUNFILES_DIR, RUNFILES_MANIFEST_FILE};
use crate::error::Result;
use crate::manifest::ManifestIndex;
use crate::path::split_repo;
use crate::repo_mapping::RepositoryMapping;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the repository mapping inside a runfiles directory
pub const REPO_MAPPING_FILE: &str = "_repo_mapping";

/// Rewrite the leading apparent repository name to its canonical name
///
/// A miss leaves the path untouched; the strategy then looks up the literal
/// path.
fn remap<'a>(
    mapping: &RepositoryMapping,
    path: &'a str,
    source_repo: Option<&str>,
) -> Cow<'a, str> {
    let Some(source_repo) = source_repo else {
        return Cow::Borrowed(path);
    };
    if mapping.is_empty() {
        return Cow::Borrowed(path);
    }
    let Some((apparent, suffix)) = split_repo(path) else {
        return Cow::Borrowed(path);
    };

    match mapping.lookup(source_repo, apparent) {
        Some(canonical) => Cow::Owned(format!("{canonical}/{suffix}")),
        None => Cow::Borrowed(path),
    }
}

/// Resolves runfiles through a manifest index
#[derive(Debug, Clone)]
pub struct ManifestResolver {
    manifest_path: String,
    index: ManifestIndex,
    repo_mapping: RepositoryMapping,
}

impl ManifestResolver {
    /// Load the manifest at `manifest_path` and the mapping it names
    pub fn load(manifest_path: &str) -> Result<Self> {
        let index = ManifestIndex::from_file(manifest_path)?;
        let repo_mapping = match index.repo_mapping_path() {
            Some(path) => RepositoryMapping::from_file(Path::new(path))?,
            None => RepositoryMapping::default(),
        };
        Ok(Self::new(manifest_path, index, repo_mapping))
    }

    pub fn new(
        manifest_path: impl Into<String>,
        index: ManifestIndex,
        repo_mapping: RepositoryMapping,
    ) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            index,
            repo_mapping,
        }
    }

    /// Resolve a validated relative runfile path
    ///
    /// Manifest keys use canonical repository names, so an apparent name the
    /// mapping does not know resolves to nothing unless it is itself listed.
    pub fn rlocation(&self, path: &str, source_repo: Option<&str>) -> Option<String> {
        let key = remap(&self.repo_mapping, path, source_repo);
        self.index.lookup(&key)
    }

    /// Runfiles directory that sits next to the manifest, or `""`
    pub fn runfiles_dir(&self) -> String {
        let path = self.manifest_path.as_str();
        if let Some(dir) = path
            .strip_suffix("/MANIFEST")
            .or_else(|| path.strip_suffix("\\MANIFEST"))
        {
            dir.to_string()
        } else if let Some(stem) = path.strip_suffix(".runfiles_manifest") {
            format!("{stem}.runfiles")
        } else {
            String::new()
        }
    }

    pub fn env_vars(&self) -> BTreeMap<String, String> {
        let dir = self.runfiles_dir();
        BTreeMap::from([
            (RUNFILES_MANIFEST_FILE.to_string(), self.manifest_path.clone()),
            (RUNFILES_DIR.to_string(), dir.clone()),
            (JAVA_RUNFILES.to_string(), dir),
        ])
    }

    pub fn manifest_path(&self) -> &str {
        &self.manifest_path
    }

    pub fn index(&self) -> &ManifestIndex {
        &self.index
    }

    pub fn repo_mapping(&self) -> &RepositoryMapping {
        &self.repo_mapping
    }
}

/// Resolves runfiles by joining onto a runfiles directory
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    runfiles_dir: String,
    repo_mapping: RepositoryMapping,
}

impl DirectoryResolver {
    /// Use `runfiles_dir`, loading `<runfiles_dir>/_repo_mapping` if present
    pub fn load(runfiles_dir: &str) -> Result<Self> {
        let mapping_file = Path::new(runfiles_dir).join(REPO_MAPPING_FILE);
        let repo_mapping = RepositoryMapping::from_file(&mapping_file)?;
        Ok(Self::new(runfiles_dir, repo_mapping))
    }

    pub fn new(runfiles_dir: impl Into<String>, repo_mapping: RepositoryMapping) -> Self {
        Self {
            runfiles_dir: runfiles_dir.into(),
            repo_mapping,
        }
    }

    /// Resolve a validated relative runfile path
    ///
    /// Never checks the filesystem; an unmapped repository name is joined
    /// as written.
    pub fn rlocation(&self, path: &str, source_repo: Option<&str>) -> String {
        let path = remap(&self.repo_mapping, path, source_repo);
        if self.runfiles_dir.is_empty() || self.runfiles_dir.ends_with('/') {
            format!("{}{}", self.runfiles_dir, path)
        } else {
            format!("{}/{}", self.runfiles_dir, path)
        }
    }

    pub fn env_vars(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (RUNFILES_DIR.to_string(), self.runfiles_dir.clone()),
            (JAVA_RUNFILES.to_string(), self.runfiles_dir.clone()),
        ])
    }

    pub fn runfiles_dir(&self) -> &str {
        &self.runfiles_dir
    }

    pub fn repo_mapping(&self) -> &RepositoryMapping {
        &self.repo_mapping
    }
}

/// The resolution strategy, chosen once at construction
#[derive(Debug, Clone)]
pub enum Resolver {
    Manifest(ManifestResolver),
    Directory(DirectoryResolver),
}

impl Resolver {
    /// Resolve a validated relative runfile path
    pub fn rlocation(&self, path: &str, source_repo: Option<&str>) -> Option<String> {
        match self {
            Resolver::Manifest(m) => m.rlocation(path, source_repo),
            Resolver::Directory(d) => Some(d.rlocation(path, source_repo)),
        }
    }

    /// Variables a child process needs to rebuild an equivalent resolver
    pub fn env_vars(&self) -> BTreeMap<String, String> {
        match self {
            Resolver::Manifest(m) => m.env_vars(),
            Resolver::Directory(d) => d.env_vars(),
        }
    }

    pub fn repo_mapping(&self) -> &RepositoryMapping {
        match self {
            Resolver::Manifest(m) => m.repo_mapping(),
            Resolver::Directory(d) => d.repo_mapping(),
        }
    }
}
