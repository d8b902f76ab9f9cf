//! The smudge direction of the LFS filter: pointer text in, real content out.

use tracing::{debug, instrument};

use crate::error::LfsResult;
use crate::pointer::Pointer;
use crate::store::{LfsConfig, LfsStore};

/// Replaces LFS pointers with the content they refer to.
///
/// Holds no mutable state, so one instance can be shared by every blob
/// transform of a rewrite.
#[derive(Debug, Clone)]
pub struct Smudger {
    store: LfsStore,
}

impl Smudger {
    #[must_use]
    pub fn new(config: &LfsConfig) -> Self {
        Self {
            store: LfsStore::new(config),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &LfsStore {
        &self.store
    }

    /// Smudge the content stored at `path`.
    ///
    /// Content that is not a pointer candidate is returned as is. A candidate
    /// is parsed and resolved against the local store.
    ///
    /// # Errors
    ///
    /// Any pointer or store error; see [`LfsError`](crate::LfsError).
    #[instrument(skip(self, content), fields(len = content.len()))]
    pub fn smudge(&self, path: &str, content: Vec<u8>) -> LfsResult<Vec<u8>> {
        if !Pointer::looks_like_pointer(&content) {
            return Ok(content);
        }
        let pointer = Pointer::parse(&content)?;
        let data = self.store.read(&pointer)?;
        debug!(oid = %pointer.oid, size = pointer.size, "smudged pointer");
        Ok(data)
    }
}
