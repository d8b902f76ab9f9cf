//! gix-backed ref and rev-parse operations.

use gix::refs::transaction::{Change, LogChange, PreviousValue, RefLog};
use gix::refs::{FullName, Target};

use crate::error::GitError;
use crate::gix_repo::{GixRepo, from_gix_oid, to_gix_oid};
use crate::types::{GitOid, RefEdit, RefName};

/// Symbolic refs deeper than this are treated as a loop.
const MAX_SYMREF_DEPTH: usize = 5;

pub fn read_ref(repo: &GixRepo, name: &RefName) -> Result<Option<GitOid>, GitError> {
    match repo.repo.try_find_reference(name.as_str()) {
        Ok(Some(mut r)) => {
            let id = r
                .peel_to_id_in_place()
                .map_err(|e| GitError::backend(e.to_string()))?;
            Ok(Some(from_gix_oid(id.as_ref())?))
        }
        Ok(None) => Ok(None),
        Err(e) => Err(GitError::backend(e.to_string())),
    }
}

pub fn read_ref_target(repo: &GixRepo, name: &RefName) -> Result<Option<GitOid>, GitError> {
    let Some(mut r) = repo
        .repo
        .try_find_reference(name.as_str())
        .map_err(|e| GitError::backend(e.to_string()))?
    else {
        return Ok(None);
    };

    for _ in 0..MAX_SYMREF_DEPTH {
        if let Some(id) = r.target().try_id() {
            return Ok(Some(from_gix_oid(id)?));
        }
        match r.follow() {
            Some(next) => r = next.map_err(|e| GitError::backend(e.to_string()))?,
            // Dangling symbolic ref (e.g. unborn branch).
            None => return Ok(None),
        }
    }
    Err(GitError::backend(format!(
        "symbolic ref chain from `{name}` is too deep"
    )))
}

pub fn list_refs(repo: &GixRepo, prefix: &str) -> Result<Vec<(RefName, GitOid)>, GitError> {
    let platform = repo
        .repo
        .references()
        .map_err(|e| GitError::backend(e.to_string()))?;
    let refs_iter = platform
        .prefixed(prefix)
        .map_err(|e| GitError::backend(e.to_string()))?;

    let mut result = Vec::new();
    for r in refs_iter {
        let mut r = r.map_err(|e| GitError::backend(e.to_string()))?;
        let name_str = r.name().as_bstr().to_string();
        let id = r
            .peel_to_id_in_place()
            .map_err(|e| GitError::backend(e.to_string()))?;
        let oid = from_gix_oid(id.as_ref())?;
        if let Ok(ref_name) = RefName::new(&name_str) {
            result.push((ref_name, oid));
        }
    }
    result.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(result)
}

pub fn head_ref(repo: &GixRepo) -> Result<Option<RefName>, GitError> {
    let name = repo
        .repo
        .head_name()
        .map_err(|e| GitError::backend(e.to_string()))?;
    Ok(name.and_then(|n| RefName::new(&n.as_bstr().to_string()).ok()))
}

pub fn atomic_ref_update(repo: &GixRepo, edits: &[RefEdit]) -> Result<(), GitError> {
    let gix_edits: Vec<gix::refs::transaction::RefEdit> = edits
        .iter()
        .map(|edit| {
            let name: FullName = edit
                .name
                .as_str()
                .try_into()
                .map_err(|e: gix::validate::reference::name::Error| {
                    GitError::backend(e.to_string())
                })?;

            let expected = if edit.expected_old_oid.is_zero() {
                PreviousValue::MustNotExist
            } else {
                PreviousValue::MustExistAndMatch(Target::Object(to_gix_oid(
                    edit.expected_old_oid,
                )))
            };

            Ok(gix::refs::transaction::RefEdit {
                change: Change::Update {
                    log: LogChange {
                        mode: RefLog::AndReference,
                        force_create_reflog: false,
                        message: edit.log_message.as_str().into(),
                    },
                    expected,
                    new: Target::Object(to_gix_oid(edit.new_oid)),
                },
                name,
                deref: false,
            })
        })
        .collect::<Result<Vec<_>, GitError>>()?;

    tracing::debug!(count = gix_edits.len(), "applying ref transaction");
    repo.repo.edit_references(gix_edits).map_err(|e| {
        let msg = e.to_string();
        // gix reports CAS failures only through the message text.
        if msg.contains("existing object id")
            || msg.contains("MustExistAndMatch")
            || msg.contains("did not match")
            || msg.contains("MustNotExist")
            || msg.contains("mustNotExist")
        {
            let ref_name = edits
                .first()
                .map(|e| e.name.as_str().to_owned())
                .unwrap_or_default();
            GitError::RefConflict {
                ref_name,
                message: msg,
            }
        } else {
            GitError::BackendError { message: msg }
        }
    })?;
    Ok(())
}

pub fn rev_parse(repo: &GixRepo, spec: &str) -> Result<GitOid, GitError> {
    let id = repo
        .repo
        .rev_parse_single(spec)
        .map_err(|e| GitError::NotFound {
            message: format!("rev-parse '{spec}': {e}"),
        })?;
    from_gix_oid(id.as_ref())
}

pub fn rev_parse_opt(repo: &GixRepo, spec: &str) -> Result<Option<GitOid>, GitError> {
    // Every gix rev-parse error is a resolution failure (malformed spec,
    // missing ref, unborn HEAD), so all of them map to `None`.
    match repo.repo.rev_parse_single(spec) {
        Ok(id) => Ok(Some(from_gix_oid(id.as_ref())?)),
        Err(_) => Ok(None),
    }
}
