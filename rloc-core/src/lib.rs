//! # rloc Core
//!
//! Runfiles resolution for multi-repository builds.
//!
//! A runfile path such as `my_repo/data/config.json` names a runtime
//! dependency independently of where it ends up on disk. This library turns
//! such a path into a concrete location, using one of two layouts:
//!
//! - **Manifest**: a single file lists every runfile and its real path
//! - **Directory**: runfiles are laid out under one directory tree
//!
//! In both cases the leading repository segment may be an apparent name
//! that is translated to a canonical name through the repository mapping.
//!
//! ## Pipeline
//!
//! ```text
//! path → validate → repository mapping → manifest lookup / directory join
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use rloc_core::{Runfiles, RunfilesConfig};
//!
//! let config = RunfilesConfig::from_env();
//! if let Some(runfiles) = Runfiles::create(&config)? {
//!     let data = runfiles.rlocation("my_module/data/input.txt", Some(""))?;
//!     println!("{data:?}");
//! }
//! # Ok::<(), rloc_core::Error>(())
//! ```

mod error;
pub mod config;
pub mod manifest;
pub mod path;
pub mod repo_mapping;
pub mod resolver;

pub use config::{Platform, RunfilesConfig};
pub use error::{Error, InvalidPathReason, Result};
pub use manifest::ManifestIndex;
pub use path::RunfilePath;
pub use repo_mapping::{PrefixEntry, RepositoryMapping};
pub use resolver::{DirectoryResolver, ManifestResolver, Resolver};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Runfiles resolver with its strategy, mapping and caller identity
///
/// Immutable after construction; share it freely between threads.
#[derive(Debug, Clone)]
pub struct Runfiles {
    resolver: Resolver,
    current_repository: String,
    platform: Platform,
}

impl Runfiles {
    /// Discover runfiles from `config`
    ///
    /// Tries, in order: the manifest file, the runfiles directory, and the
    /// `<exe>.runfiles/MANIFEST`, `<exe>.runfiles_manifest` and
    /// `<exe>.runfiles` siblings of the executable. Returns `Ok(None)` when
    /// none of them applies.
    pub fn create(config: &RunfilesConfig) -> Result<Option<Self>> {
        let resolver = if let Some(manifest) = config.manifest_file() {
            log::debug!("Using runfiles manifest {}", manifest);
            Resolver::Manifest(ManifestResolver::load(manifest)?)
        } else if let Some(dir) = config.runfiles_dir() {
            log::debug!("Using runfiles directory {}", dir);
            Resolver::Directory(DirectoryResolver::load(dir)?)
        } else if let Some(resolver) = config
            .executable
            .as_deref()
            .map(Self::discover_from_executable)
            .transpose()?
            .flatten()
        {
            resolver
        } else {
            log::debug!("No runfiles found");
            return Ok(None);
        };

        Ok(Some(Self::with_resolver(resolver, config)))
    }

    /// Manifest-based runfiles for the manifest at `manifest_path`
    pub fn manifest_based(manifest_path: &str) -> Result<Self> {
        let config = RunfilesConfig::default().with_manifest_file(manifest_path);
        let resolver = Resolver::Manifest(ManifestResolver::load(manifest_path)?);
        Ok(Self::with_resolver(resolver, &config))
    }

    /// Directory-based runfiles rooted at `runfiles_dir`
    pub fn directory_based(runfiles_dir: &str) -> Result<Self> {
        let config = RunfilesConfig::default().with_runfiles_dir(runfiles_dir);
        let resolver = Resolver::Directory(DirectoryResolver::load(runfiles_dir)?);
        Ok(Self::with_resolver(resolver, &config))
    }

    /// Wrap an already built strategy
    pub fn with_resolver(resolver: Resolver, config: &RunfilesConfig) -> Self {
        Self {
            resolver,
            current_repository: config.current_repository.clone(),
            platform: config.platform,
        }
    }

    fn discover_from_executable(exe: &Path) -> Result<Option<Resolver>> {
        let sibling = |suffix: &str| {
            let mut name = exe.as_os_str().to_os_string();
            name.push(suffix);
            PathBuf::from(name)
        };

        for manifest in [sibling(".runfiles/MANIFEST"), sibling(".runfiles_manifest")] {
            if manifest.is_file() {
                if let Some(manifest) = manifest.to_str() {
                    log::debug!("Using runfiles manifest {} next to executable", manifest);
                    return Ok(Some(Resolver::Manifest(ManifestResolver::load(manifest)?)));
                }
            }
        }

        let dir = sibling(".runfiles");
        match dir.to_str() {
            Some(dir) if Path::new(dir).is_dir() => {
                log::debug!("Using runfiles directory {} next to executable", dir);
                Ok(Some(Resolver::Directory(DirectoryResolver::load(dir)?)))
            }
            _ => Ok(None),
        }
    }

    /// Resolve `path` to a filesystem path
    ///
    /// `source_repo` is the canonical name of the repository asking; when
    /// given, the leading segment of `path` is remapped from its apparent
    /// name. Absolute paths are returned unchanged. `Ok(None)` means the
    /// runfile is unknown.
    pub fn rlocation(&self, path: &str, source_repo: Option<&str>) -> Result<Option<String>> {
        match crate::path::validate(path, self.platform)? {
            RunfilePath::Absolute(abs) => Ok(Some(abs.to_string())),
            RunfilePath::Relative(rel) => Ok(self.resolver.rlocation(rel, source_repo)),
        }
    }

    /// Resolve `path` as seen from [`Runfiles::current_repository`]
    pub fn rlocation_from_current(&self, path: &str) -> Result<Option<String>> {
        self.rlocation(path, Some(&self.current_repository))
    }

    /// Variables a child process needs to find the same runfiles
    pub fn env_vars(&self) -> BTreeMap<String, String> {
        self.resolver.env_vars()
    }

    /// Canonical name of the calling repository (`""` for the main one)
    pub fn current_repository(&self) -> &str {
        &self.current_repository
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
}
