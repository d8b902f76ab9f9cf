//! Relinking commit and tag bodies.
//!
//! Only the headers that point at other objects are replaced. Everything
//! else, including author and committer lines, extra headers and the
//! message, is copied byte for byte.

use unlfs_git::GitOid;

use crate::error::RewriteError;

/// Split off the first line of `data`, keeping its `\n`.
fn split_line(data: &[u8]) -> (&[u8], &[u8]) {
    match data.iter().position(|b| *b == b'\n') {
        Some(i) => data.split_at(i + 1),
        None => (data, &[]),
    }
}

fn malformed(kind: &'static str, oid: GitOid, reason: impl Into<String>) -> RewriteError {
    RewriteError::MalformedObject {
        kind,
        oid,
        reason: reason.into(),
    }
}

/// Return commit `oid`'s body with its `tree` header set to `tree` and its
/// `parent` headers set to `parents`, in order.
pub(crate) fn relink_commit(
    oid: GitOid,
    data: &[u8],
    tree: GitOid,
    parents: &[GitOid],
) -> Result<Vec<u8>, RewriteError> {
    let mut out = Vec::with_capacity(data.len());
    let mut parents = parents.iter();
    let mut saw_tree = false;
    let mut rest = data;

    loop {
        let (line, tail) = split_line(rest);
        if line.is_empty() || line == b"\n" {
            out.extend_from_slice(rest);
            break;
        }
        if line.starts_with(b"tree ") {
            if saw_tree {
                return Err(malformed("commit", oid, "more than one tree header"));
            }
            saw_tree = true;
            out.extend_from_slice(format!("tree {tree}\n").as_bytes());
        } else if line.starts_with(b"parent ") {
            let parent = parents
                .next()
                .ok_or_else(|| malformed("commit", oid, "more parent headers than parents"))?;
            out.extend_from_slice(format!("parent {parent}\n").as_bytes());
        } else {
            out.extend_from_slice(line);
        }
        rest = tail;
    }

    if !saw_tree {
        return Err(malformed("commit", oid, "missing tree header"));
    }
    if parents.next().is_some() {
        return Err(malformed("commit", oid, "fewer parent headers than parents"));
    }
    Ok(out)
}

/// The object a tag body points at, if its `type` is `commit`.
pub(crate) fn tagged_commit(
    oid: GitOid,
    data: &[u8],
) -> Result<Option<GitOid>, RewriteError> {
    let mut object = None;
    let mut is_commit = false;
    let mut rest = data;
    loop {
        let (line, tail) = split_line(rest);
        if line.is_empty() || line == b"\n" {
            break;
        }
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        if let Some(hex) = line.strip_prefix(b"object ") {
            let hex = std::str::from_utf8(hex)
                .map_err(|_| malformed("tag", oid, "bad object header"))?;
            object = Some(
                hex.parse::<GitOid>()
                    .map_err(|e| malformed("tag", oid, e.to_string()))?,
            );
        } else if line == b"type commit" {
            is_commit = true;
        }
        rest = tail;
    }
    let object = object.ok_or_else(|| malformed("tag", oid, "missing object header"))?;
    Ok(is_commit.then_some(object))
}

/// Return tag `oid`'s body with its `object` header set to `target`.
pub(crate) fn relink_tag(
    oid: GitOid,
    data: &[u8],
    target: GitOid,
) -> Result<Vec<u8>, RewriteError> {
    let mut out = Vec::with_capacity(data.len());
    let mut replaced = false;
    let mut rest = data;
    loop {
        let (line, tail) = split_line(rest);
        if line.is_empty() || line == b"\n" {
            out.extend_from_slice(rest);
            break;
        }
        if !replaced && line.starts_with(b"object ") {
            out.extend_from_slice(format!("object {target}\n").as_bytes());
            replaced = true;
        } else {
            out.extend_from_slice(line);
        }
        rest = tail;
    }
    if replaced {
        Ok(out)
    } else {
        Err(malformed("tag", oid, "missing object header"))
    }
}
