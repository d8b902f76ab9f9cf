//! Error types for pointer decoding and object resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout this crate.
pub type LfsResult<T> = Result<T, LfsError>;

/// Errors raised while decoding a pointer or resolving it to content.
#[derive(Debug, Error)]
pub enum LfsError {
    /// The content announced itself as a pointer but is not a valid one.
    #[error("malformed LFS pointer: {reason}")]
    MalformedPointer { reason: String },

    /// The pointer uses pointer extensions, which this tool cannot reverse.
    #[error("LFS pointer uses unsupported extension `{name}`")]
    UnsupportedExtension { name: String },

    /// The object the pointer refers to is not in the local store.
    #[error("LFS object {oid} is not available locally (expected at {})", path.display())]
    ObjectMissing { oid: String, path: PathBuf },

    /// The stored object does not match the pointer's size or hash.
    #[error("LFS object {oid} is corrupt: {reason}")]
    Corrupt { oid: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LfsError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPointer {
            reason: reason.into(),
        }
    }
}
