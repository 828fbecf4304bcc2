// src/watch/patterns.rs

use std::fmt;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::{Result, RetrigError};

/// Compiled glob pattern for a single watch subscription.
///
/// Patterns are relative to the workspace root; the event source passes
/// relative paths (e.g. `"src/main.rs"`) into `matches`.
#[derive(Clone)]
pub struct PatternFilter {
    pattern: String,
    set: GlobSet,
}

impl fmt::Debug for PatternFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternFilter")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

impl PatternFilter {
    /// Compile a single glob string.
    pub fn compile(pattern: &str) -> Result<Self> {
        let glob = Glob::new(pattern).map_err(|source| RetrigError::PatternError {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut builder = GlobSetBuilder::new();
        builder.add(glob);
        let set = builder.build().map_err(|source| RetrigError::PatternError {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            set,
        })
    }

    /// The source glob string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true if the subscription is interested in the given path
    /// (relative to the workspace root), e.g. `"src/foo/bar.rs"`.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }
}
