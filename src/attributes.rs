//! `.gitattributes` lines produced and merged by `unlfs export`.
//!
//! Exported paths get a line that turns the LFS filter off:
//!
//! ```text
//! *.bin text -filter -merge -diff
//! ```
//!
//! Paths excluded from the export keep the usual LFS tracking line. Lines
//! are compared as whole strings, so two lines for the same pattern with
//! different attributes are both kept.

use std::collections::HashSet;
use std::str::Utf8Error;

use crate::filter::PathFilter;

/// Attributes written for exported patterns.
pub const EXPORT_DIRECTIVE: &str = "text -filter -merge -diff";

/// Attributes written for patterns that stay in LFS.
pub const TRACK_DIRECTIVE: &str = "filter=lfs diff=lfs merge=lfs -text";

/// Characters that must be backslash-escaped in an attribute pattern.
const ESCAPED: [char; 4] = [' ', '#', '!', '\\'];

/// Escape a path pattern for use as the first field of an attribute line.
///
/// Single pass: every escapable character gets one backslash, nothing else
/// changes.
#[must_use]
pub fn escape_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if ESCAPED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Format one attribute line (no terminator).
#[must_use]
pub fn attribute_line(pattern: &str, directive: &str) -> String {
    format!("{} {directive}", escape_pattern(pattern))
}

/// An insertion-ordered set of attribute lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedAttributeSet {
    lines: Vec<String>,
    index: HashSet<String>,
}

impl OrderedAttributeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `line` unless an identical line is present. Returns whether it
    /// was inserted.
    pub fn add(&mut self, line: impl Into<String>) -> bool {
        let line = line.into();
        if self.index.contains(&line) {
            return false;
        }
        self.index.insert(line.clone());
        self.lines.push(line);
        true
    }

    #[must_use]
    pub fn contains(&self, line: &str) -> bool {
        self.index.contains(line)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Lines of `self` in order, followed by the lines of `other` that
    /// `self` lacks, in `other`'s order.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for line in other.iter() {
            merged.add(line);
        }
        merged
    }

    /// Parse the content of an attribute file, one element per line.
    ///
    /// `\r\n` endings are accepted. Blank lines and comments are kept as
    /// lines so that re-serialising preserves the file.
    ///
    /// # Errors
    /// Returns the UTF-8 error if `content` is not valid UTF-8.
    pub fn parse(content: &[u8]) -> Result<Self, Utf8Error> {
        let text = std::str::from_utf8(content)?;
        Ok(text
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect())
    }

    /// Serialise as an attribute file: every line followed by `\n`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            out.extend_from_slice(line.as_bytes());
            out.push(b'\n');
        }
        out
    }
}

impl<S: Into<String>> FromIterator<S> for OrderedAttributeSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = Self::new();
        for line in iter {
            set.add(line);
        }
        set
    }
}

/// The attribute lines an export with `filter` must guarantee: an export
/// line per include pattern, then a tracking line per exclude pattern.
#[must_use]
pub fn canonical_set(filter: &PathFilter) -> OrderedAttributeSet {
    filter
        .include()
        .map(|p| attribute_line(p, EXPORT_DIRECTIVE))
        .chain(filter.exclude().map(|p| attribute_line(p, TRACK_DIRECTIVE)))
        .collect()
}
