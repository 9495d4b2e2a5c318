//! Relative base path from the current page up to the site root.
//!
//! The site is plain files, so every shared link in a fragment must be
//! prefixed with enough `../` segments to climb from the page's directory
//! back to the root. Depth is inferred from the URL path alone, which works
//! both on a domain root and under a hosting prefix such as `/project/`.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::location::{Location, Origin};

/// Zero or more `../` segments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BasePath(String);

impl BasePath {
    /// The site root: no prefix.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// `depth` levels up.
    pub fn from_depth(depth: usize) -> Self {
        Self("../".repeat(depth))
    }

    /// Number of `../` segments.
    pub fn depth(&self) -> usize {
        self.0.len() / 3
    }

    /// Whether this is the root (empty) base path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The prefix string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `self` followed by `reference`.
    pub fn join(&self, reference: &str) -> String {
        format!("{}{reference}", self.0)
    }
}

impl fmt::Display for BasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("(root)")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Computes [`BasePath`] values for a site whose directories use
/// `root_document` as their index file.
#[derive(Clone, Debug)]
pub struct BasePathResolver {
    root_document: String,
}

impl Default for BasePathResolver {
    fn default() -> Self {
        Self::new("index.html")
    }
}

impl BasePathResolver {
    /// Resolver for a site whose index file is `root_document`.
    pub fn new(root_document: impl Into<String>) -> Self {
        Self {
            root_document: root_document.into(),
        }
    }

    /// Base path for `location`.
    ///
    /// - `file:` pages: empty when the path ends with the root document,
    ///   otherwise exactly one level up. Pages opened from disk are assumed
    ///   to sit at most one directory below the root.
    /// - Network pages: the path is split on `/`, dropping empty segments and
    ///   `*.html` file names. With no segments the page is at the root. With
    ///   one segment it is at the root when the path ends with `/` or the
    ///   root document (a hosting prefix such as `/project/`), and one level
    ///   down otherwise. With more, depth is the segment count minus one.
    pub fn resolve(&self, location: &Location) -> BasePath {
        let path = location.path();
        let base = match location.origin() {
            Origin::LocalFile => {
                if path.ends_with(&self.root_document) {
                    BasePath::root()
                } else {
                    BasePath::from_depth(1)
                }
            }
            Origin::Network => {
                let segments: Vec<&str> = path
                    .split('/')
                    .filter(|s| !s.is_empty() && !s.ends_with(".html"))
                    .collect();
                let depth = match segments.len() {
                    0 => 0,
                    1 if path.ends_with('/') || path.ends_with(&self.root_document) => 0,
                    1 => 1,
                    n => n - 1,
                };
                debug!(path, ?segments, depth, "segments for base path");
                BasePath::from_depth(depth)
            }
        };
        debug!(base_path = %base, path, origin = ?location.origin(), "calculated base path");
        base
    }
}

/// [`BasePathResolver::resolve`] with the default `index.html` root document.
pub fn resolve_base_path(location: &Location) -> BasePath {
    BasePathResolver::default().resolve(location)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
