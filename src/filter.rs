//! Include/exclude path filtering for `--include` and `--exclude`.
//!
//! Patterns follow the gitattributes/gitignore flavour git-lfs uses:
//!
//! - a pattern without `/` matches the basename or any directory component,
//!   so `*.bin` matches `a.bin` and `assets/a.bin`, and `vendor` matches
//!   `vendor/x/y`;
//! - a pattern containing `/` is anchored at the repository root, and a
//!   leading `/` is dropped;
//! - a pattern that names a directory matches everything beneath it;
//! - `**` crosses directory separators, `*` and `?` do not.

use glob::{MatchOptions, Pattern};

use crate::error::FilterError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct PathPattern {
    source: String,
    glob: Pattern,
    anchored: bool,
}

impl PathPattern {
    fn new(source: &str) -> Result<Self, FilterError> {
        let trimmed = source.trim_end_matches('/');
        let anchored = trimmed.contains('/');
        let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let glob = Pattern::new(body).map_err(|e| FilterError {
            pattern: source.to_owned(),
            source: e,
        })?;
        Ok(Self {
            source: source.to_owned(),
            glob,
            anchored,
        })
    }

    fn matches(&self, path: &str) -> bool {
        if self.anchored {
            // The path itself or any directory above it.
            let mut end = path.len();
            loop {
                if self.glob.matches_with(&path[..end], MATCH_OPTIONS) {
                    return true;
                }
                match path[..end].rfind('/') {
                    Some(i) => end = i,
                    None => return false,
                }
            }
        } else {
            path.split('/')
                .any(|component| self.glob.matches_with(component, MATCH_OPTIONS))
        }
    }
}

/// An immutable include/exclude filter over repository-relative paths.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: Vec<PathPattern>,
    exclude: Vec<PathPattern>,
}

impl PathFilter {
    /// Compile a filter. Order is preserved; it decides the order of the
    /// generated attribute lines.
    ///
    /// # Errors
    /// Returns [`FilterError`] for the first pattern that is not a valid glob.
    pub fn new<I, E>(include: I, exclude: E) -> Result<Self, FilterError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Ok(Self {
            include: include
                .into_iter()
                .map(|p| PathPattern::new(p.as_ref()))
                .collect::<Result<_, _>>()?,
            exclude: exclude
                .into_iter()
                .map(|p| PathPattern::new(p.as_ref()))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Include patterns as the user wrote them.
    pub fn include(&self) -> impl Iterator<Item = &str> {
        self.include.iter().map(|p| p.source.as_str())
    }

    /// Exclude patterns as the user wrote them.
    pub fn exclude(&self) -> impl Iterator<Item = &str> {
        self.exclude.iter().map(|p| p.source.as_str())
    }

    /// `true` when `path` is selected: no includes or some include matches,
    /// and no exclude matches. A leading `/` on `path` is ignored.
    #[must_use]
    pub fn allows(&self, path: &str) -> bool {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return false;
        }
        let included = self.include.is_empty() || self.include.iter().any(|p| p.matches(path));
        included && !self.exclude.iter().any(|p| p.matches(path))
    }
}
