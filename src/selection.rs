//! Which history an export rewrites.
//!
//! Mirrors `git lfs migrate`: explicit refs, `--everything`, or by default
//! the current branch minus whatever the remote already has.

use tracing::debug;
use unlfs_git::{GitOid, GitRepo, ObjectKind, RefName};

use crate::error::ExportError;
use crate::rewrite::RewriteTip;

/// Ref arguments as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefSelection {
    /// Refs or revisions to rewrite (positional and `--include-ref`).
    pub include: Vec<String>,
    /// Refs or revisions whose history is left alone.
    pub exclude: Vec<String>,
    /// Rewrite every local branch and tag.
    pub everything: bool,
    /// Remote whose tracking refs are excluded by default.
    pub remote: String,
}

/// A [`RefSelection`] resolved against a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRefs {
    pub include: Vec<RewriteTip>,
    pub exclude: Vec<GitOid>,
}

impl RefSelection {
    /// Resolve names to commits.
    ///
    /// # Errors
    /// [`ExportError::Refs`] for unknown names, for `--everything` combined
    /// with explicit refs, and when `HEAD` has no commit to start from.
    pub fn resolve(&self, repo: &dyn GitRepo) -> Result<ResolvedRefs, ExportError> {
        if self.everything && !self.include.is_empty() {
            return Err(ExportError::refs(
                "cannot use --everything with explicit reference arguments",
            ));
        }

        let include = if self.everything {
            let mut tips = Vec::new();
            for prefix in ["refs/heads/", "refs/tags/"] {
                for (name, commit) in repo.list_refs(prefix)? {
                    if repo.read_raw(commit)?.kind != ObjectKind::Commit {
                        debug!(%name, "skipping ref that does not point at a commit");
                        continue;
                    }
                    tips.push(RewriteTip {
                        name: Some(name),
                        commit,
                    });
                }
            }
            tips
        } else if self.include.is_empty() {
            vec![current_tip(repo)?]
        } else {
            self.include
                .iter()
                .map(|spec| resolve_tip(repo, spec))
                .collect::<Result<_, _>>()?
        };

        let mut exclude: Vec<GitOid> = self
            .exclude
            .iter()
            .map(|spec| resolve_tip(repo, spec).map(|tip| tip.commit))
            .collect::<Result<_, _>>()?;
        if !self.everything && self.include.is_empty() && self.exclude.is_empty() {
            let prefix = format!("refs/remotes/{}/", self.remote);
            exclude.extend(repo.list_refs(&prefix)?.into_iter().map(|(_, oid)| oid));
        }

        debug!(include = include.len(), exclude = exclude.len(), "resolved refs");
        Ok(ResolvedRefs { include, exclude })
    }
}

/// The branch `HEAD` is on, or a detached `HEAD` itself, which then moves
/// to the rewritten commit like any branch.
fn current_tip(repo: &dyn GitRepo) -> Result<RewriteTip, ExportError> {
    let no_commit = || ExportError::refs("HEAD does not point at a commit; nothing to export");
    match repo.head_ref()? {
        Some(name) => {
            let commit = repo.read_ref(&name)?.ok_or_else(no_commit)?;
            Ok(RewriteTip {
                name: Some(name),
                commit,
            })
        }
        None => Ok(RewriteTip {
            name: Some(RefName::head()),
            commit: repo.rev_parse_opt("HEAD")?.ok_or_else(no_commit)?,
        }),
    }
}

/// Resolve a user-supplied name: a full ref, a short branch, tag or remote
/// ref name, `HEAD`, or any other revision.
fn resolve_tip(repo: &dyn GitRepo, spec: &str) -> Result<RewriteTip, ExportError> {
    if spec == "HEAD" {
        return current_tip(repo);
    }

    let candidates: Vec<String> = if spec.starts_with("refs/") {
        vec![spec.to_owned()]
    } else {
        ["refs/heads/", "refs/tags/", "refs/remotes/"]
            .iter()
            .map(|prefix| format!("{prefix}{spec}"))
            .collect()
    };
    for candidate in candidates {
        let Ok(name) = RefName::new(&candidate) else {
            continue;
        };
        if let Some(commit) = repo.read_ref(&name)? {
            return Ok(RewriteTip {
                name: Some(name),
                commit,
            });
        }
    }

    match repo.rev_parse_opt(&format!("{spec}^{{commit}}"))? {
        Some(commit) => Ok(RewriteTip { name: None, commit }),
        None => Err(ExportError::refs(format!(
            "unknown ref or revision `{spec}`"
        ))),
    }
}
