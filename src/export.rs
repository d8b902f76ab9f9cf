//! `unlfs export`: move files out of Git LFS and back into history.
//!
//! [`ExportTransform`] is the pair of callbacks the rewrite engine runs:
//! blobs are smudged back to their real content and every root tree gets a
//! `.gitattributes` that is the union of its existing lines and the
//! [canonical set](crate::attributes::canonical_set) for the filter.
//! [`run_export`] validates the request, drives the engine and refreshes the
//! working tree.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};
use unlfs_git::{EntryMode, GitOid, GitRepo, TreeEntry};
use unlfs_lfs::{LfsConfig, Smudger};

use crate::attributes::{OrderedAttributeSet, canonical_set};
use crate::error::ExportError;
use crate::filter::PathFilter;
use crate::rewrite::{Blob, ObjectTransform, ROOT, RewriteOptions, RewriteOutcome, Rewriter, Tree};
use crate::selection::RefSelection;

/// Name of the attribute file kept in every root tree.
pub const GITATTRIBUTES: &str = ".gitattributes";

/// Read-only context shared by every transform call of one export.
pub struct ExportTransform<'a> {
    repo: &'a dyn GitRepo,
    smudger: &'a Smudger,
    canonical: &'a OrderedAttributeSet,
}

impl<'a> ExportTransform<'a> {
    #[must_use]
    pub const fn new(
        repo: &'a dyn GitRepo,
        smudger: &'a Smudger,
        canonical: &'a OrderedAttributeSet,
    ) -> Self {
        Self {
            repo,
            smudger,
            canonical,
        }
    }

    /// Lines of the `.gitattributes` blob in `tree`, or an empty set.
    fn existing_attributes(&self, tree: &Tree) -> Result<OrderedAttributeSet, ExportError> {
        let Some(entry) = tree.get(GITATTRIBUTES).filter(|e| e.mode.is_file()) else {
            return Ok(OrderedAttributeSet::new());
        };
        let data = self.repo.read_blob(entry.oid)?;
        OrderedAttributeSet::parse(&data).map_err(|source| ExportError::Attributes {
            oid: entry.oid,
            source,
        })
    }
}

impl ObjectTransform for ExportTransform<'_> {
    type Error = ExportError;

    fn blob(&self, path: &str, blob: Blob) -> Result<Blob, ExportError> {
        if Path::new(path).file_name().is_some_and(|name| name == GITATTRIBUTES) {
            return Ok(blob);
        }
        let data = self
            .smudger
            .smudge(path, blob.into_bytes())
            .map_err(|source| ExportError::Content {
                path: path.to_owned(),
                source,
            })?;
        Ok(Blob::new(data))
    }

    fn tree(&self, path: &str, tree: Tree) -> Result<Tree, ExportError> {
        if path != ROOT {
            return Ok(tree);
        }
        let merged = self.existing_attributes(&tree)?.union(self.canonical);
        let oid = self.repo.write_blob(&merged.to_bytes())?;
        Ok(tree.merge(TreeEntry {
            name: GITATTRIBUTES.as_bytes().to_vec(),
            mode: EntryMode::Blob,
            oid,
        }))
    }
}

/// Everything `run_export` needs, already merged from flags and config.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub refs: RefSelection,
    pub lfs: LfsConfig,
    pub object_map: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub rewrite: RewriteOutcome,
    /// The commit checked out afterwards, if the repository has a working
    /// tree.
    pub checked_out: Option<GitOid>,
}

/// Run an export against `repo`.
///
/// Refs move in one transaction after the whole range is rewritten; any
/// earlier failure leaves the repository's refs as they were.
///
/// # Errors
/// [`ExportError::NoIncludePatterns`] before anything is read, then any
/// selection, content, attribute, rewrite or checkout failure.
#[instrument(skip_all, fields(include = ?request.include, exclude = ?request.exclude))]
pub fn run_export(
    repo: &dyn GitRepo,
    request: &ExportRequest,
) -> Result<ExportOutcome, ExportError> {
    if request.include.is_empty() {
        return Err(ExportError::NoIncludePatterns);
    }
    let filter = PathFilter::new(&request.include, &request.exclude)?;
    let canonical = canonical_set(&filter);
    debug!(lines = canonical.len(), "canonical attributes");

    let refs = request.refs.resolve(repo)?;
    let old_head = repo.rev_parse_opt("HEAD")?;

    let smudger = Smudger::new(&request.lfs);
    let transform = ExportTransform::new(repo, &smudger, &canonical);
    let options = RewriteOptions {
        include: refs.include,
        exclude: refs.exclude,
        filter,
        verbose: request.verbose,
        object_map: request.object_map.clone(),
        update_refs: true,
    };
    let rewrite = Rewriter::new(repo).rewrite(&options, &transform)?;

    let checked_out = match (repo.workdir(), old_head) {
        (Some(workdir), Some(old_head)) => Some(checkout_head(repo, workdir, old_head)?),
        _ => None,
    };

    info!(
        commits = rewrite.commits.len(),
        changed = rewrite.changed(),
        refs = rewrite.updated_refs.len(),
        "export finished"
    );
    Ok(ExportOutcome {
        rewrite,
        checked_out,
    })
}

/// Force-checkout the (possibly rewritten) `HEAD` into `workdir`.
fn checkout_head(
    repo: &dyn GitRepo,
    workdir: &Path,
    old_head: GitOid,
) -> Result<GitOid, ExportError> {
    eprint!("migrate: checkout ...");
    let new_head = repo.rev_parse("HEAD")?;
    repo.checkout_tree(new_head, workdir)
        .map_err(|source| ExportError::Checkout {
            old_head,
            new_head,
            source,
        })?;
    eprintln!(", done.");
    debug!(%new_head, "checked out HEAD");
    Ok(new_head)
}
