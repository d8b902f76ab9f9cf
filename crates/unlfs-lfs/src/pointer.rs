//! Git LFS pointer codec.
//!
//! A pointer is the small text record committed in place of a large file:
//!
//! ```text
//! version https://git-lfs.github.com/spec/v1
//! oid sha256:4d7a214614ab2935c943f9e0ff69d22eadbb8f32b1258daaa5e2ca24d17e2393
//! size 12345
//! ```
//!
//! Detection and parsing are split. [`Pointer::looks_like_pointer`] is a cheap
//! check on size and the version line; anything failing it is ordinary
//! content. Content that passes it but then fails [`Pointer::parse`] is a
//! malformed pointer and an error.

use std::fmt;

use crate::error::{LfsError, LfsResult};

/// Current pointer spec version URL.
pub const POINTER_VERSION: &str = "https://git-lfs.github.com/spec/v1";

/// Pre-release version URL still found in old histories.
pub const LEGACY_POINTER_VERSION: &str = "https://hawser.github.com/spec/v1";

/// Pointers are never larger than this; bigger blobs are real content.
pub const MAX_POINTER_SIZE: usize = 1024;

/// A decoded LFS pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointer {
    /// Lowercase hex SHA-256 of the real content.
    pub oid: String,
    /// Size of the real content in bytes.
    pub size: u64,
}

impl Pointer {
    #[must_use]
    pub const fn new(oid: String, size: u64) -> Self {
        Self { oid, size }
    }

    /// Fast pre-check: small enough and opens with a known version line.
    #[must_use]
    pub fn looks_like_pointer(content: &[u8]) -> bool {
        if content.len() > MAX_POINTER_SIZE {
            return false;
        }
        [POINTER_VERSION, LEGACY_POINTER_VERSION].iter().any(|v| {
            content
                .strip_prefix(b"version ")
                .and_then(|rest| rest.strip_prefix(v.as_bytes()))
                .is_some_and(|rest| rest.first().is_none_or(|b| *b == b'\n' || *b == b'\r'))
        })
    }

    /// Parse a pointer from its text form.
    ///
    /// # Errors
    ///
    /// [`LfsError::MalformedPointer`] for missing, duplicate, unknown or
    /// invalid fields, and [`LfsError::UnsupportedExtension`] for `ext-*`
    /// lines.
    pub fn parse(content: &[u8]) -> LfsResult<Self> {
        if content.len() > MAX_POINTER_SIZE {
            return Err(LfsError::malformed(format!(
                "{} bytes exceeds the {MAX_POINTER_SIZE} byte pointer limit",
                content.len()
            )));
        }
        let text = std::str::from_utf8(content)
            .map_err(|_| LfsError::malformed("pointer is not valid UTF-8"))?;

        let mut lines = text.lines().map(|l| l.trim_end_matches('\r'));

        match lines.next().and_then(|l| l.strip_prefix("version ")) {
            Some(v) if v == POINTER_VERSION || v == LEGACY_POINTER_VERSION => {}
            Some(v) => return Err(LfsError::malformed(format!("unknown version `{v}`"))),
            None => return Err(LfsError::malformed("first line must be `version`")),
        }

        let mut oid = None;
        let mut size = None;
        for line in lines {
            if line.is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once(' ')
                .ok_or_else(|| LfsError::malformed(format!("invalid line `{line}`")))?;
            match key {
                "oid" => {
                    if oid.is_some() {
                        return Err(LfsError::malformed("duplicate `oid` line"));
                    }
                    oid = Some(parse_oid(value)?);
                }
                "size" => {
                    if size.is_some() {
                        return Err(LfsError::malformed("duplicate `size` line"));
                    }
                    size = Some(value.parse::<u64>().map_err(|e| {
                        LfsError::malformed(format!("invalid size `{value}`: {e}"))
                    })?);
                }
                k if k.starts_with("ext-") => {
                    return Err(LfsError::UnsupportedExtension { name: k.to_owned() });
                }
                other => return Err(LfsError::malformed(format!("unknown key `{other}`"))),
            }
        }

        let oid = oid.ok_or_else(|| LfsError::malformed("missing `oid` line"))?;
        let size = size.ok_or_else(|| LfsError::malformed("missing `size` line"))?;
        Ok(Self { oid, size })
    }

    /// Encode the pointer in canonical form.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

fn parse_oid(value: &str) -> LfsResult<String> {
    let hash = value
        .strip_prefix("sha256:")
        .ok_or_else(|| LfsError::malformed(format!("oid `{value}` is not sha256")))?;
    if hash.len() != 64 || !hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(LfsError::malformed(format!("invalid sha256 `{hash}`")));
    }
    Ok(hash.to_owned())
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version {POINTER_VERSION}\noid sha256:{}\nsize {}\n",
            self.oid, self.size
        )
    }
}
