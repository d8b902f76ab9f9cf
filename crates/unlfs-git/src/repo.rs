//! The [`GitRepo`] trait: the abstraction boundary between unlfs and git.
//!
//! The history rewriter, the export transforms and the CLI talk to git
//! exclusively through this trait. It is object-safe so callers can hold a
//! `&dyn GitRepo`.
//!
//! | Group        | Methods                                              |
//! |--------------|------------------------------------------------------|
//! | Refs         | `read_ref`, `read_ref_target`, `list_refs`, `head_ref`, `atomic_ref_update` |
//! | Rev-parse    | `rev_parse`, `rev_parse_opt`                         |
//! | Object read  | `read_blob`, `read_tree`, `read_commit`, `read_raw`  |
//! | Object write | `write_blob`, `write_tree`, `write_raw`              |
//! | Checkout     | `checkout_tree`                                      |
//! | Config       | `read_config`                                        |
//! | Layout       | `git_dir`, `workdir`                                 |

use std::path::Path;

use crate::error::GitError;
use crate::types::{CommitInfo, GitOid, ObjectKind, RawObject, RefEdit, RefName, TreeEntry};

/// The git abstraction trait used by all unlfs crates.
///
/// Implementations may be backed by gix ([`GixRepo`](crate::GixRepo)) or a
/// test double.
pub trait GitRepo {
    // -----------------------------------------------------------------------
    // Refs
    // -----------------------------------------------------------------------

    /// Resolve a ref to the commit (or other non-tag object) it ultimately
    /// points at, returning `None` if the ref does not exist.
    ///
    /// Symbolic refs are followed and annotated tags are peeled.
    fn read_ref(&self, name: &RefName) -> Result<Option<GitOid>, GitError>;

    /// Resolve a ref to the object it names directly, without peeling
    /// annotated tags. Symbolic refs are still followed.
    fn read_ref_target(&self, name: &RefName) -> Result<Option<GitOid>, GitError>;

    /// List refs matching a prefix (e.g. `"refs/heads/"`).
    ///
    /// Returns `(ref_name, peeled_oid)` pairs sorted by ref name. The prefix
    /// is matched literally.
    fn list_refs(&self, prefix: &str) -> Result<Vec<(RefName, GitOid)>, GitError>;

    /// The ref `HEAD` points to symbolically, or `None` when `HEAD` is
    /// detached.
    fn head_ref(&self) -> Result<Option<RefName>, GitError>;

    /// Atomically apply a batch of ref updates with compare-and-swap semantics.
    ///
    /// All updates succeed or all fail. If any ref's current value differs
    /// from its edit's expected old OID, nothing is written and
    /// [`GitError::RefConflict`] is returned.
    fn atomic_ref_update(&self, edits: &[RefEdit]) -> Result<(), GitError>;

    // -----------------------------------------------------------------------
    // Rev-parse
    // -----------------------------------------------------------------------

    /// Resolve a revision specification (`HEAD~3`, `main`, a hex OID, ...).
    ///
    /// Returns [`GitError::NotFound`] if the spec cannot be resolved.
    fn rev_parse(&self, spec: &str) -> Result<GitOid, GitError>;

    /// Like [`rev_parse`](Self::rev_parse) but returns `None` instead of an
    /// error when the spec cannot be resolved.
    fn rev_parse_opt(&self, spec: &str) -> Result<Option<GitOid>, GitError>;

    // -----------------------------------------------------------------------
    // Object read
    // -----------------------------------------------------------------------

    /// Read the contents of a blob object.
    fn read_blob(&self, oid: GitOid) -> Result<Vec<u8>, GitError>;

    /// Read the entries of a tree object (one level, not recursive).
    fn read_tree(&self, oid: GitOid) -> Result<Vec<TreeEntry>, GitError>;

    /// Read a commit object's tree, parents and message.
    fn read_commit(&self, oid: GitOid) -> Result<CommitInfo, GitError>;

    /// Read any object undecoded.
    fn read_raw(&self, oid: GitOid) -> Result<RawObject, GitError>;

    // -----------------------------------------------------------------------
    // Object write
    // -----------------------------------------------------------------------

    /// Write a blob to the object store and return its OID.
    fn write_blob(&self, data: &[u8]) -> Result<GitOid, GitError>;

    /// Write a tree object from a list of entries and return its OID.
    ///
    /// Entries must already be in git order (see
    /// [`TreeEntry::git_cmp`](crate::TreeEntry::git_cmp)).
    fn write_tree(&self, entries: &[TreeEntry]) -> Result<GitOid, GitError>;

    /// Write an already-encoded object body of the given kind.
    fn write_raw(&self, kind: ObjectKind, data: &[u8]) -> Result<GitOid, GitError>;

    // -----------------------------------------------------------------------
    // Checkout
    // -----------------------------------------------------------------------

    /// Force-checkout a commit or tree into `workdir`.
    ///
    /// Overwrites tracked files, removes working-tree files that are not in
    /// the tree, and rewrites the index to match.
    fn checkout_tree(&self, oid: GitOid, workdir: &Path) -> Result<(), GitError>;

    // -----------------------------------------------------------------------
    // Config
    // -----------------------------------------------------------------------

    /// Read a git config value. Returns `None` if the key is not set.
    fn read_config(&self, key: &str) -> Result<Option<String>, GitError>;

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    /// The repository's git directory (`.git` or the bare repo itself).
    fn git_dir(&self) -> &Path;

    /// The working tree root, or `None` for a bare repository.
    fn workdir(&self) -> Option<&Path>;
}
