use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use tracing::{debug, info, instrument, warn};
use unlfs_git::{GitOid, GitRepo, ObjectKind, RefEdit, RefName, TreeEntry};

use super::relink::{relink_commit, relink_tag, tagged_commit};
use super::walk::commits_parents_first;
use super::{
    Blob, ObjectTransform, ROOT, RewriteOptions, RewriteOutcome, Tree, UpdatedRef, child_path,
};
use crate::error::RewriteError;

const REFLOG_MESSAGE: &str = "unlfs: export";

/// Rewrites history in one repository.
pub struct Rewriter<'r> {
    repo: &'r dyn GitRepo,
}

/// Memo tables for one rewrite.
#[derive(Default)]
struct Memo {
    blobs: HashMap<(String, GitOid), GitOid>,
    trees: HashMap<(String, GitOid), GitOid>,
    commits: HashMap<GitOid, GitOid>,
    /// Paths first rewritten while visiting the current commit.
    changed_paths: BTreeSet<String>,
}

impl<'r> Rewriter<'r> {
    #[must_use]
    pub const fn new(repo: &'r dyn GitRepo) -> Self {
        Self { repo }
    }

    /// Rewrite every selected commit through `transform`.
    ///
    /// Refs are only touched after every commit has been rewritten and the
    /// object map written, so a transform error leaves them as they were.
    ///
    /// # Errors
    /// The first transform, object-database or ref error.
    #[instrument(skip_all, fields(tips = opts.include.len(), excludes = opts.exclude.len()))]
    pub fn rewrite<T: ObjectTransform>(
        &self,
        opts: &RewriteOptions,
        transform: &T,
    ) -> Result<RewriteOutcome, T::Error> {
        eprint!("migrate: Sorting commits: ...");
        let tips: Vec<GitOid> = opts.include.iter().map(|t| t.commit).collect();
        let commits = commits_parents_first(self.repo, &tips, &opts.exclude)?;
        eprintln!(", done.");
        info!(commits = commits.len(), "sorted commits");

        let mut memo = Memo::default();
        let mut outcome = RewriteOutcome::default();
        let total = commits.len();
        for (i, oid) in commits.iter().enumerate() {
            let new = self.rewrite_commit(*oid, opts, transform, &mut memo)?;
            memo.commits.insert(*oid, new);
            outcome.commits.push((*oid, new));

            if opts.verbose {
                for path in &memo.changed_paths {
                    eprintln!("  commit {oid}: {path}");
                }
            }
            memo.changed_paths.clear();
            eprint!(
                "\rmigrate: Rewriting commits: {}% ({}/{total})",
                (i + 1) * 100 / total,
                i + 1
            );
        }
        if total == 0 {
            eprint!("migrate: Rewriting commits: 100% (0/0)");
        }
        eprintln!(", done.");
        info!(
            commits = total,
            changed = outcome.changed(),
            "rewrote commits"
        );

        if let Some(path) = &opts.object_map {
            write_object_map(path, &outcome.commits)?;
        }

        if opts.update_refs {
            eprint!("migrate: Updating refs: ...");
            outcome.updated_refs = self.update_refs(opts, &memo)?;
            eprintln!(", done.");
        }
        Ok(outcome)
    }

    fn rewrite_commit<T: ObjectTransform>(
        &self,
        oid: GitOid,
        opts: &RewriteOptions,
        transform: &T,
        memo: &mut Memo,
    ) -> Result<GitOid, T::Error> {
        let info = self.repo.read_commit(oid)?;
        let tree = self.rewrite_tree(ROOT, info.tree_oid, opts, transform, memo)?;
        let parents: Vec<GitOid> = info
            .parents
            .iter()
            .map(|p| memo.commits.get(p).copied().unwrap_or(*p))
            .collect();

        if tree == info.tree_oid && parents == info.parents {
            return Ok(oid);
        }
        let raw = self.repo.read_raw(oid)?;
        let body = relink_commit(oid, &raw.data, tree, &parents)?;
        let new = self.repo.write_raw(ObjectKind::Commit, &body)?;
        debug!(%oid, %new, "rewrote commit");
        Ok(new)
    }

    fn rewrite_tree<T: ObjectTransform>(
        &self,
        path: &str,
        oid: GitOid,
        opts: &RewriteOptions,
        transform: &T,
        memo: &mut Memo,
    ) -> Result<GitOid, T::Error> {
        let key = (path.to_owned(), oid);
        if let Some(&new) = memo.trees.get(&key) {
            return Ok(new);
        }

        let original = self.repo.read_tree(oid)?;
        let mut entries = Vec::with_capacity(original.len());
        for entry in &original {
            let child = child_path(path, &entry.name_lossy());
            let new_oid = if entry.mode.is_tree() {
                self.rewrite_tree(&child, entry.oid, opts, transform, memo)?
            } else if entry.mode.is_file() && opts.filter.allows(&child) {
                self.rewrite_blob(&child, entry.oid, transform, memo)?
            } else {
                entry.oid
            };
            entries.push(TreeEntry {
                oid: new_oid,
                ..entry.clone()
            });
        }

        let tree = transform.tree(path, Tree::new(entries))?;
        let new = if tree.entries() == original.as_slice() {
            oid
        } else {
            self.repo.write_tree(tree.entries())?
        };
        memo.trees.insert(key, new);
        Ok(new)
    }

    fn rewrite_blob<T: ObjectTransform>(
        &self,
        path: &str,
        oid: GitOid,
        transform: &T,
        memo: &mut Memo,
    ) -> Result<GitOid, T::Error> {
        let key = (path.to_owned(), oid);
        if let Some(&new) = memo.blobs.get(&key) {
            return Ok(new);
        }

        let data = self.repo.read_blob(oid)?;
        let blob = transform.blob(path, Blob::new(data.clone()))?;
        let new = if blob.as_bytes() == data.as_slice() {
            oid
        } else {
            let new = self.repo.write_blob(blob.as_bytes())?;
            debug!(path, %oid, %new, size = blob.size(), "rewrote blob");
            memo.changed_paths.insert(path.to_owned());
            new
        };
        memo.blobs.insert(key, new);
        Ok(new)
    }

    /// Move every named tip whose commit changed, in one transaction.
    fn update_refs(
        &self,
        opts: &RewriteOptions,
        memo: &Memo,
    ) -> Result<Vec<UpdatedRef>, RewriteError> {
        let mut edits = Vec::new();
        let mut updated = Vec::new();
        let mut done: BTreeSet<&RefName> = BTreeSet::new();

        for tip in &opts.include {
            let Some(name) = &tip.name else {
                continue;
            };
            if !done.insert(name) {
                continue;
            }
            let Some(new_commit) = memo.commits.get(&tip.commit).copied() else {
                continue;
            };
            if new_commit == tip.commit {
                continue;
            }
            let Some(old) = self.repo.read_ref_target(name)? else {
                warn!(%name, "ref disappeared during rewrite; leaving it alone");
                continue;
            };
            let Some(new) = self.retarget(old, tip.commit, new_commit)? else {
                warn!(%name, "ref target is not the rewritten commit or its tag; leaving it alone");
                continue;
            };
            edits.push(RefEdit {
                name: name.clone(),
                new_oid: new,
                expected_old_oid: old,
                log_message: REFLOG_MESSAGE.to_owned(),
            });
            updated.push(UpdatedRef {
                name: name.clone(),
                old,
                new,
            });
        }

        if !edits.is_empty() {
            self.repo.atomic_ref_update(&edits)?;
        }
        for r in &updated {
            info!(name = %r.name, old = %r.old, new = %r.new, "updated ref");
        }
        Ok(updated)
    }

    /// The new value for a ref currently at `target`, whose peeled commit
    /// moved from `old_commit` to `new_commit`. Annotated tags get a new tag
    /// object.
    fn retarget(
        &self,
        target: GitOid,
        old_commit: GitOid,
        new_commit: GitOid,
    ) -> Result<Option<GitOid>, RewriteError> {
        if target == old_commit {
            return Ok(Some(new_commit));
        }
        let raw = self.repo.read_raw(target)?;
        if raw.kind != ObjectKind::Tag || tagged_commit(target, &raw.data)? != Some(old_commit) {
            return Ok(None);
        }
        let body = relink_tag(target, &raw.data, new_commit)?;
        Ok(Some(self.repo.write_raw(ObjectKind::Tag, &body)?))
    }
}

fn write_object_map(path: &Path, commits: &[(GitOid, GitOid)]) -> Result<(), RewriteError> {
    let wrap = |source| RewriteError::ObjectMap {
        path: path.to_owned(),
        source,
    };
    let mut out = BufWriter::new(fs::File::create(path).map_err(wrap)?);
    for (old, new) in commits {
        writeln!(out, "{old},{new}").map_err(wrap)?;
    }
    out.flush().map_err(wrap)?;
    debug!(path = %path.display(), entries = commits.len(), "wrote object map");
    Ok(())
}
