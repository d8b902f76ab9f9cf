use std::collections::HashSet;

use unlfs_git::{GitError, GitOid, GitRepo};

/// Commits reachable from `include` but not from `exclude`, ordered so that
/// every commit comes after all of its (included) parents.
///
/// Iterative post-order DFS: tips are visited in the given order and
/// parents in commit order, so the result is deterministic.
///
/// # Errors
/// Propagates failures to read a commit.
pub fn commits_parents_first(
    repo: &dyn GitRepo,
    include: &[GitOid],
    exclude: &[GitOid],
) -> Result<Vec<GitOid>, GitError> {
    let excluded = reachable(repo, exclude)?;

    let mut order = Vec::new();
    let mut seen = HashSet::new();
    let mut stack: Vec<(GitOid, bool)> = include.iter().rev().map(|oid| (*oid, false)).collect();

    while let Some((oid, expanded)) = stack.pop() {
        if expanded {
            order.push(oid);
            continue;
        }
        if excluded.contains(&oid) || !seen.insert(oid) {
            continue;
        }
        stack.push((oid, true));
        let commit = repo.read_commit(oid)?;
        for parent in commit.parents.iter().rev() {
            if !seen.contains(parent) && !excluded.contains(parent) {
                stack.push((*parent, false));
            }
        }
    }
    Ok(order)
}

fn reachable(repo: &dyn GitRepo, tips: &[GitOid]) -> Result<HashSet<GitOid>, GitError> {
    let mut seen = HashSet::new();
    let mut queue = tips.to_vec();
    while let Some(oid) = queue.pop() {
        if seen.insert(oid) {
            queue.extend(repo.read_commit(oid)?.parents);
        }
    }
    Ok(seen)
}
