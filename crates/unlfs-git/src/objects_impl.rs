//! gix-backed object read/write operations.

use gix::prelude::Write as _;

use crate::error::GitError;
use crate::gix_repo::{GixRepo, from_gix_kind, from_gix_oid, to_gix_kind, to_gix_oid};
use crate::types::{CommitInfo, EntryMode, GitOid, ObjectKind, RawObject, TreeEntry};

/// Convert a gix `EntryMode` to our `EntryMode`.
fn from_gix_entry_mode(mode: gix::objs::tree::EntryMode) -> EntryMode {
    match mode.kind() {
        gix::objs::tree::EntryKind::Tree => EntryMode::Tree,
        gix::objs::tree::EntryKind::Blob => EntryMode::Blob,
        gix::objs::tree::EntryKind::BlobExecutable => EntryMode::BlobExecutable,
        gix::objs::tree::EntryKind::Link => EntryMode::Link,
        gix::objs::tree::EntryKind::Commit => EntryMode::Commit,
    }
}

/// Convert our `EntryMode` to a gix `EntryKind`.
const fn to_gix_entry_kind(mode: EntryMode) -> gix::objs::tree::EntryKind {
    match mode {
        EntryMode::Blob => gix::objs::tree::EntryKind::Blob,
        EntryMode::BlobExecutable => gix::objs::tree::EntryKind::BlobExecutable,
        EntryMode::Tree => gix::objs::tree::EntryKind::Tree,
        EntryMode::Link => gix::objs::tree::EntryKind::Link,
        EntryMode::Commit => gix::objs::tree::EntryKind::Commit,
    }
}

pub fn read_blob(repo: &GixRepo, oid: GitOid) -> Result<Vec<u8>, GitError> {
    let mut blob = repo
        .repo
        .find_blob(to_gix_oid(oid))
        .map_err(|e| GitError::NotFound {
            message: format!("blob {oid}: {e}"),
        })?;
    Ok(blob.take_data())
}

pub fn read_tree(repo: &GixRepo, oid: GitOid) -> Result<Vec<TreeEntry>, GitError> {
    let tree = repo
        .repo
        .find_tree(to_gix_oid(oid))
        .map_err(|e| GitError::NotFound {
            message: format!("tree {oid}: {e}"),
        })?;

    let mut entries = Vec::new();
    for result in tree.iter() {
        let entry = result
            .map_err(|e| GitError::backend(format!("failed to decode entry of tree {oid}: {e}")))?;
        entries.push(TreeEntry {
            name: entry.inner.filename.to_vec(),
            mode: from_gix_entry_mode(entry.inner.mode),
            oid: from_gix_oid(entry.inner.oid)?,
        });
    }
    Ok(entries)
}

pub fn read_commit(repo: &GixRepo, oid: GitOid) -> Result<CommitInfo, GitError> {
    let commit = repo
        .repo
        .find_commit(to_gix_oid(oid))
        .map_err(|e| GitError::NotFound {
            message: format!("commit {oid}: {e}"),
        })?;

    let decoded = commit
        .decode()
        .map_err(|e| GitError::backend(format!("failed to decode commit {oid}: {e}")))?;

    let tree_oid = from_gix_oid(&decoded.tree())?;
    let parents = decoded
        .parents()
        .map(|p| from_gix_oid(&p))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CommitInfo {
        tree_oid,
        parents,
    })
}

pub fn read_raw(repo: &GixRepo, oid: GitOid) -> Result<RawObject, GitError> {
    let object = repo
        .repo
        .find_object(to_gix_oid(oid))
        .map_err(|e| GitError::NotFound {
            message: format!("object {oid}: {e}"),
        })?;
    let kind = from_gix_kind(object.kind);
    Ok(RawObject {
        kind,
        data: object.detach().data,
    })
}

pub fn write_blob(repo: &GixRepo, data: &[u8]) -> Result<GitOid, GitError> {
    let id = repo
        .repo
        .write_blob(data)
        .map_err(|e| GitError::backend(format!("failed to write blob: {e}")))?;
    from_gix_oid(&id.detach())
}

pub fn write_tree(repo: &GixRepo, entries: &[TreeEntry]) -> Result<GitOid, GitError> {
    let tree = gix::objs::Tree {
        entries: entries
            .iter()
            .map(|e| gix::objs::tree::Entry {
                mode: to_gix_entry_kind(e.mode).into(),
                filename: e.name.clone().into(),
                oid: to_gix_oid(e.oid),
            })
            .collect(),
    };
    let id = repo
        .repo
        .write_object(&tree)
        .map_err(|e| GitError::backend(format!("failed to write tree: {e}")))?;
    from_gix_oid(&id.detach())
}

pub fn write_raw(repo: &GixRepo, kind: ObjectKind, data: &[u8]) -> Result<GitOid, GitError> {
    let id = repo
        .repo
        .write_buf(to_gix_kind(kind), data)
        .map_err(|e| GitError::backend(format!("failed to write {kind}: {e}")))?;
    from_gix_oid(&id)
}
