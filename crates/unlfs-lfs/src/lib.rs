//! Git LFS support for unlfs.
//!
//! Decodes LFS pointer records, resolves them against the local object
//! store and verifies the content. Remote transfer is not implemented: an
//! object that is not present locally is an error.

pub mod error;
pub mod pointer;
pub mod smudge;
pub mod store;

pub use error::{LfsError, LfsResult};
pub use pointer::{LEGACY_POINTER_VERSION, MAX_POINTER_SIZE, POINTER_VERSION, Pointer};
pub use smudge::Smudger;
pub use store::{LfsConfig, LfsStore, sha256_hex};
