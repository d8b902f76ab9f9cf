//! History rewriting.
//!
//! [`Rewriter`] walks a set of commits parents-first and rebuilds every root
//! tree through an [`ObjectTransform`]. Blobs and trees are memoized by
//! `(path, oid)`, so a transform sees each distinct object at a given path
//! once per rewrite, not once per commit.
//!
//! Paths handed to transforms are repository-relative without a leading
//! slash (`dir/file.bin`), except the root tree, whose path is [`ROOT`].
//! Name bytes that are not UTF-8 show up as U+FFFD in those paths; the
//! entries themselves keep their stored names.

mod engine;
mod relink;
mod walk;

use std::path::PathBuf;

use unlfs_git::{EntryMode, GitError, GitOid, RefName, TreeEntry};

use crate::error::RewriteError;
use crate::filter::PathFilter;

pub use engine::Rewriter;
pub use walk::commits_parents_first;

/// Path of the root tree as seen by [`ObjectTransform::tree`].
pub const ROOT: &str = "/";

/// Blob content handed to and returned from a transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    data: Vec<u8>,
}

impl Blob {
    #[must_use]
    pub const fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Entries of one tree, kept in git order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Build a tree, sorting `entries` into git order.
    #[must_use]
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by(TreeEntry::git_cmp);
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// The entry called `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name.as_bytes())
    }

    /// A copy of this tree where `entry` replaces the entry of the same name,
    /// or is inserted in order if there is none.
    #[must_use]
    pub fn merge(&self, entry: TreeEntry) -> Self {
        let mut entries: Vec<TreeEntry> = self
            .entries
            .iter()
            .filter(|e| e.name != entry.name)
            .cloned()
            .collect();
        entries.push(entry);
        Self::new(entries)
    }
}

/// Per-object callbacks applied during a rewrite.
///
/// Implementations must be deterministic: the engine may skip calls for
/// objects it has already seen at the same path.
pub trait ObjectTransform {
    type Error: From<RewriteError> + From<GitError>;

    /// Rewrite the content of the file at `path`.
    fn blob(&self, path: &str, blob: Blob) -> Result<Blob, Self::Error>;

    /// Rewrite a tree after its children have been rewritten.
    fn tree(&self, path: &str, tree: Tree) -> Result<Tree, Self::Error>;
}

/// A starting point of the rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteTip {
    /// The ref to move when the rewrite finishes, or `None` for a bare
    /// revision whose rewritten history is computed but not published.
    pub name: Option<RefName>,
    /// The commit the tip resolves to.
    pub commit: GitOid,
}

#[derive(Debug, Clone, Default)]
pub struct RewriteOptions {
    /// Commits reachable from these are rewritten...
    pub include: Vec<RewriteTip>,
    /// ...unless they are also reachable from one of these.
    pub exclude: Vec<GitOid>,
    /// Only blobs whose path passes the filter reach [`ObjectTransform::blob`].
    pub filter: PathFilter,
    /// Print every rewritten path, grouped by commit.
    pub verbose: bool,
    /// Write `<old>,<new>` for every visited commit to this file.
    pub object_map: Option<PathBuf>,
    /// Move the named tips to their rewritten commits.
    pub update_refs: bool,
}

/// A ref moved by a rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedRef {
    pub name: RefName,
    pub old: GitOid,
    pub new: GitOid,
}

#[derive(Debug, Clone, Default)]
pub struct RewriteOutcome {
    /// `(old, new)` for every visited commit, parents first.
    pub commits: Vec<(GitOid, GitOid)>,
    pub updated_refs: Vec<UpdatedRef>,
}

impl RewriteOutcome {
    /// The rewritten id of `commit`, or `None` if it was not visited.
    #[must_use]
    pub fn mapped(&self, commit: GitOid) -> Option<GitOid> {
        self.commits
            .iter()
            .find(|(old, _)| *old == commit)
            .map(|(_, new)| *new)
    }

    /// How many visited commits got a new id.
    #[must_use]
    pub fn changed(&self) -> usize {
        self.commits.iter().filter(|(old, new)| old != new).count()
    }
}

pub(crate) fn child_path(parent: &str, name: &str) -> String {
    if parent == ROOT {
        name.to_owned()
    } else {
        format!("{parent}/{name}")
    }
}
