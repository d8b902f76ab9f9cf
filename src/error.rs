//! Error types for the export command and the history rewriter.
//!
//! Library code returns these enums; the binary adds `anyhow` context and
//! prints them as `fatal: ...`.

use std::path::PathBuf;
use std::str::Utf8Error;

use thiserror::Error;
use unlfs_git::{GitError, GitOid};
use unlfs_lfs::LfsError;

/// An include or exclude pattern that is not a valid glob.
#[derive(Debug, Error)]
#[error("invalid path pattern `{pattern}`")]
pub struct FilterError {
    pub pattern: String,
    #[source]
    pub source: glob::PatternError,
}

/// Failures of the history rewrite engine itself.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Git(#[from] GitError),

    /// A commit or tag body could not be decoded far enough to relink it.
    #[error("malformed {kind} {oid}: {reason}")]
    MalformedObject {
        kind: &'static str,
        oid: GitOid,
        reason: String,
    },

    #[error("could not write object map {}", path.display())]
    ObjectMap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything `unlfs export` can fail with.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing was selected for export. Raised before any object is touched.
    #[error("one or more files must be specified with --include")]
    NoIncludePatterns,

    /// A blob could not be smudged back to its real content.
    #[error("could not export `{path}`")]
    Content {
        path: String,
        #[source]
        source: LfsError,
    },

    /// A root `.gitattributes` blob is not valid UTF-8.
    #[error("root .gitattributes blob {oid} is not valid UTF-8")]
    Attributes {
        oid: GitOid,
        #[source]
        source: Utf8Error,
    },

    /// Refs already point at the rewritten history but the working tree
    /// could not be refreshed.
    #[error(
        "history was rewritten (HEAD {old_head} -> {new_head}) but the working tree is stale; \
         run `git checkout -f` to refresh it or `git reset --hard {old_head}` to return to \
         the old history. Checkout failed"
    )]
    Checkout {
        old_head: GitOid,
        new_head: GitOid,
        #[source]
        source: GitError,
    },

    /// A ref argument could not be resolved or the selection is invalid.
    #[error("{message}")]
    Refs { message: String },

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Git(#[from] GitError),
}

impl ExportError {
    pub(crate) fn refs(message: impl Into<String>) -> Self {
        Self::Refs {
            message: message.into(),
        }
    }
}
