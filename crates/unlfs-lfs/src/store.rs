//! The local LFS object store.
//!
//! Objects live under `<storage>/objects/<oid[0..2]>/<oid[2..4]>/<oid>`, the
//! layout git-lfs uses for `.git/lfs`.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use sha2::{Digest as _, Sha256};
use tracing::debug;

use crate::error::{LfsError, LfsResult};
use crate::pointer::Pointer;

/// Where LFS objects are stored.
///
/// Built once by the caller (from git config or a config file) and passed
/// explicitly; nothing in this crate reads process-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LfsConfig {
    /// The LFS storage root, usually `<git-dir>/lfs`.
    pub storage_dir: PathBuf,
}

impl LfsConfig {
    /// Default layout for a repository whose git directory is `git_dir`.
    #[must_use]
    pub fn for_git_dir(git_dir: &Path) -> Self {
        Self {
            storage_dir: git_dir.join("lfs"),
        }
    }
}

/// Read/write access to the local object directory.
#[derive(Debug, Clone)]
pub struct LfsStore {
    objects_dir: PathBuf,
}

impl LfsStore {
    #[must_use]
    pub fn new(config: &LfsConfig) -> Self {
        Self {
            objects_dir: config.storage_dir.join("objects"),
        }
    }

    /// Path an object with the given hex oid is stored at.
    #[must_use]
    pub fn object_path(&self, oid: &str) -> PathBuf {
        let fanout = |range: std::ops::Range<usize>| oid.get(range).unwrap_or_default();
        self.objects_dir
            .join(fanout(0..2))
            .join(fanout(2..4))
            .join(oid)
    }

    /// Read the content a pointer refers to, verifying size and hash.
    ///
    /// # Errors
    ///
    /// [`LfsError::ObjectMissing`] if the object is absent and
    /// [`LfsError::Corrupt`] if it does not match the pointer.
    pub fn read(&self, pointer: &Pointer) -> LfsResult<Vec<u8>> {
        let path = self.object_path(&pointer.oid);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LfsError::ObjectMissing {
                    oid: pointer.oid.clone(),
                    path,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if data.len() as u64 != pointer.size {
            return Err(LfsError::Corrupt {
                oid: pointer.oid.clone(),
                reason: format!("expected {} bytes, found {}", pointer.size, data.len()),
            });
        }
        let actual = sha256_hex(&data);
        if actual != pointer.oid {
            return Err(LfsError::Corrupt {
                oid: pointer.oid.clone(),
                reason: format!("content hashes to {actual}"),
            });
        }
        Ok(data)
    }

    /// Store `data` and return the pointer that refers to it.
    ///
    /// Writes go through a temporary file in the objects directory and are
    /// renamed into place, so readers never observe a partial object.
    pub fn insert(&self, data: &[u8]) -> LfsResult<Pointer> {
        let pointer = Pointer::new(sha256_hex(data), data.len() as u64);
        let path = self.object_path(&pointer.oid);
        if path.exists() {
            return Ok(pointer);
        }
        let dir = path
            .parent()
            .ok_or_else(|| LfsError::malformed("object path has no parent"))?;
        fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.objects_dir)?;
        tmp.write_all(data)?;
        tmp.persist(&path).map_err(|e| LfsError::Io(e.error))?;
        debug!(oid = %pointer.oid, size = pointer.size, "stored LFS object");
        Ok(pointer)
    }
}

/// Lowercase hex SHA-256 of `data`.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}
