//! gix-backed forced checkout.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use gix::bstr::{BString, ByteSlice};

use crate::error::GitError;
use crate::gix_repo::{GixRepo, to_gix_oid};
use crate::types::GitOid;

pub fn checkout_tree(repo: &GixRepo, oid: GitOid, workdir: &Path) -> Result<(), GitError> {
    let gix_oid = to_gix_oid(oid);

    // Commits are checked out through their root tree.
    let tree_oid = {
        let obj = repo
            .repo
            .find_object(gix_oid)
            .map_err(|e| GitError::NotFound {
                message: format!("object {oid}: {e}"),
            })?;
        match obj.kind {
            gix::object::Kind::Commit => obj
                .into_commit()
                .tree_id()
                .map_err(|e| {
                    GitError::backend(format!("failed to get tree from commit {oid}: {e}"))
                })?
                .detach(),
            gix::object::Kind::Tree => gix_oid,
            other => {
                return Err(GitError::backend(format!(
                    "expected commit or tree, got {other}"
                )));
            }
        }
    };

    let previously_tracked = tracked_paths(repo);

    let mut index_file = repo
        .repo
        .index_from_tree(&tree_oid)
        .map_err(|e| {
            GitError::backend(format!("failed to create index from tree {tree_oid}: {e}"))
        })?;

    let tree_paths: HashSet<BString> = index_file
        .entries()
        .iter()
        .map(|entry| entry.path(&index_file).to_owned())
        .collect();

    let mut opts = repo
        .repo
        .checkout_options(gix::worktree::stack::state::attributes::Source::IdMapping)
        .map_err(|e| GitError::backend(format!("failed to get checkout options: {e}")))?;
    opts.overwrite_existing = true;
    opts.destination_is_initially_empty = false;

    let objects = repo
        .repo
        .objects
        .clone()
        .into_arc()
        .map_err(|e| GitError::backend(format!("failed to convert object store to Arc: {e}")))?;

    let outcome = gix::worktree::state::checkout(
        &mut index_file,
        workdir,
        objects,
        &gix::progress::Discard,
        &gix::progress::Discard,
        &AtomicBool::new(false),
        opts,
    )
    .map_err(|e| GitError::backend(format!("checkout failed: {e}")))?;

    if let Some(first) = outcome.errors.first() {
        return Err(GitError::backend(format!(
            "checkout had {} error(s), first: {}: {}",
            outcome.errors.len(),
            first.path,
            first.error,
        )));
    }

    remove_dropped_files(workdir, &previously_tracked, &tree_paths)?;

    // The checkout populated stat data for every entry; persisting it keeps
    // `git status` clean afterwards.
    index_file
        .write(gix::index::write::Options::default())
        .map_err(|e| GitError::backend(format!("failed to write index: {e}")))?;

    tracing::debug!(tree = %tree_oid, files = tree_paths.len(), "checked out tree");
    Ok(())
}

/// Paths recorded in the current on-disk index. A missing or unreadable index
/// means nothing is tracked yet.
fn tracked_paths(repo: &GixRepo) -> HashSet<BString> {
    let Ok(index) = repo.repo.open_index() else {
        return HashSet::new();
    };
    index
        .entries()
        .iter()
        .map(|entry| entry.path(&index).to_owned())
        .collect()
}

/// Remove files that were tracked before the checkout but are absent from the
/// new tree, pruning directories left empty. Untracked files are kept, as
/// `git checkout --force` keeps them.
fn remove_dropped_files(
    workdir: &Path,
    previously_tracked: &HashSet<BString>,
    tree_paths: &HashSet<BString>,
) -> Result<(), GitError> {
    for rel in previously_tracked.difference(tree_paths) {
        let path = workdir.join(gix::path::from_bstr(rel.as_bstr()));
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(GitError::backend(format!(
                    "failed to remove stale file '{rel}': {e}"
                )));
            }
        }
        let mut dir = path.parent();
        while let Some(d) = dir {
            if d == workdir || std::fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
    }
    Ok(())
}
