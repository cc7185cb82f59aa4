//! Resolver configuration
//!
//! The resolver never reads the process environment itself. Everything it
//! needs arrives through [`RunfilesConfig`]; [`RunfilesConfig::from_env`] is
//! the single place that touches `std::env`.

use std::path::PathBuf;

/// Path of the runfiles manifest file
pub const RUNFILES_MANIFEST_FILE: &str = "RUNFILES_MANIFEST_FILE";
/// Root of the runfiles directory tree
pub const RUNFILES_DIR: &str = "RUNFILES_DIR";
/// Test source root set by test runners; informational only
pub const TEST_SRCDIR: &str = "TEST_SRCDIR";
/// Legacy alias of `RUNFILES_DIR`, only ever emitted
pub const JAVA_RUNFILES: &str = "JAVA_RUNFILES";

/// Path rules used when validating runfile paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `/`-rooted paths are absolute
    Unix,
    /// Drive-letter paths (`C:/`, `C:\`) are absolute; a bare leading
    /// separator is not
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::host()
    }
}

/// Configuration for runfiles discovery and resolution
#[derive(Debug, Clone, Default)]
pub struct RunfilesConfig {
    /// Value of `RUNFILES_MANIFEST_FILE`
    pub manifest_file: Option<String>,

    /// Value of `RUNFILES_DIR`
    pub runfiles_dir: Option<String>,

    /// Value of `TEST_SRCDIR`. Recorded but never used for resolution.
    pub test_srcdir: Option<String>,

    /// Path of the running executable, used to find `<exe>.runfiles` and
    /// `<exe>.runfiles_manifest` when no variable is set
    pub executable: Option<PathBuf>,

    /// Canonical name of the repository the caller belongs to (`""` is the
    /// main repository)
    pub current_repository: String,

    /// Path rules for validation
    pub platform: Platform,
}

impl RunfilesConfig {
    /// Build a config from key/value pairs, ignoring unrelated keys
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            match key.as_ref() {
                RUNFILES_MANIFEST_FILE => config.manifest_file = Some(value.into()),
                RUNFILES_DIR => config.runfiles_dir = Some(value.into()),
                TEST_SRCDIR => config.test_srcdir = Some(value.into()),
                _ => {}
            }
        }
        config
    }

    /// Build a config from the process environment and the current executable
    pub fn from_env() -> Self {
        let vars = [RUNFILES_MANIFEST_FILE, RUNFILES_DIR, TEST_SRCDIR]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key, value)));
        let mut config = Self::from_vars(vars);
        config.executable = std::env::current_exe().ok();
        config
    }

    pub fn with_manifest_file(mut self, path: impl Into<String>) -> Self {
        self.manifest_file = Some(path.into());
        self
    }

    pub fn with_runfiles_dir(mut self, dir: impl Into<String>) -> Self {
        self.runfiles_dir = Some(dir.into());
        self
    }

    pub fn with_executable(mut self, exe: impl Into<PathBuf>) -> Self {
        self.executable = Some(exe.into());
        self
    }

    pub fn with_current_repository(mut self, repo: impl Into<String>) -> Self {
        self.current_repository = repo.into();
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// `manifest_file`, treating the empty string as unset
    pub(crate) fn manifest_file(&self) -> Option<&str> {
        self.manifest_file.as_deref().filter(|s| !s.is_empty())
    }

    /// `runfiles_dir`, treating the empty string as unset
    pub(crate) fn runfiles_dir(&self) -> Option<&str> {
        self.runfiles_dir.as_deref().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_picks_known_keys() {
        let config = RunfilesConfig::from_vars([
            ("RUNFILES_MANIFEST_FILE", "a/MANIFEST"),
            ("RUNFILES_DIR", "a"),
            ("TEST_SRCDIR", "always ignored"),
            ("FOO", "bar"),
        ]);
        assert_eq!(config.manifest_file.as_deref(), Some("a/MANIFEST"));
        assert_eq!(config.runfiles_dir.as_deref(), Some("a"));
        assert_eq!(config.test_srcdir.as_deref(), Some("always ignored"));
        assert!(config.executable.is_none());
        assert_eq!(config.current_repository, "");
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config =
            RunfilesConfig::from_vars([("RUNFILES_MANIFEST_FILE", ""), ("RUNFILES_DIR", "")]);
        assert_eq!(config.manifest_file(), None);
        assert_eq!(config.runfiles_dir(), None);
    }

    #[test]
    fn test_builder_setters() {
        let config = RunfilesConfig::default()
            .with_runfiles_dir("runfiles/dir")
            .with_current_repository("protobuf~3.19.2")
            .with_platform(Platform::Windows);
        assert_eq!(config.runfiles_dir(), Some("runfiles/dir"));
        assert_eq!(config.current_repository, "protobuf~3.19.2");
        assert_eq!(config.platform, Platform::Windows);
    }
}
