//! Repository configuration (`.unlfs.toml`).
//!
//! Optional file at the working-tree root (or inside the git directory of a
//! bare repository). Missing file → all defaults.
//!
//! ```toml
//! [lfs]
//! storage = "lfs"      # relative to the git dir, or absolute
//!
//! [migrate]
//! remote = "origin"
//! verbose = false
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use unlfs_git::{GitError, GitRepo};
use unlfs_lfs::LfsConfig;

/// File name looked up at the repository root.
pub const CONFIG_FILE: &str = ".unlfs.toml";

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnlfsConfig {
    #[serde(default)]
    pub lfs: LfsSection,

    #[serde(default)]
    pub migrate: MigrateSection,
}

/// `[lfs]`
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LfsSection {
    /// Override for the LFS storage directory.
    #[serde(default)]
    pub storage: Option<PathBuf>,
}

/// `[migrate]`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrateSection {
    /// Remote whose refs are left alone when no refs are given.
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default)]
    pub verbose: bool,
}

impl Default for MigrateSection {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            verbose: false,
        }
    }
}

fn default_remote() -> String {
    "origin".to_owned()
}

/// Error loading [`UnlfsConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message, with a line number when the TOML was invalid.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl UnlfsConfig {
    /// Load the config for `repo`: `.unlfs.toml` in the working tree, or in
    /// the git directory when the repository is bare.
    ///
    /// # Errors
    /// See [`load`](Self::load).
    pub fn for_repo(repo: &dyn GitRepo) -> Result<Self, ConfigError> {
        let root = repo.workdir().unwrap_or_else(|| repo.git_dir());
        Self::load(&root.join(CONFIG_FILE))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse
    /// errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })
    }

    /// Where LFS objects live for `repo`.
    ///
    /// `[lfs] storage`, then git config `lfs.storage`, then `<git-dir>/lfs`.
    /// Relative paths are taken relative to the git directory.
    ///
    /// # Errors
    /// Propagates failures reading git config.
    pub fn lfs_config(&self, repo: &dyn GitRepo) -> Result<LfsConfig, GitError> {
        let configured = match &self.lfs.storage {
            Some(path) => Some(path.clone()),
            None => repo.read_config("lfs.storage")?.map(PathBuf::from),
        };
        Ok(match configured {
            Some(path) => LfsConfig {
                storage_dir: repo.git_dir().join(path),
            },
            None => LfsConfig::for_git_dir(repo.git_dir()),
        })
    }
}
