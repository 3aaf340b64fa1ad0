//! Common types and definitions.

use std::fmt::{self, Display};
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// A source position within a build file: a file plus a 1-based line number.
///
/// Used both for breakpoints configured by the controller and for positions
/// reported by executing tasks and targets. Equality is based on resolved
/// file *identity* rather than on the spelling of the path: the path is
/// canonicalized on construction, so `./build.xml` and `sub/../build.xml`
/// compare equal, and symlink (or, on case-insensitive filesystems, case)
/// aliases of the same file match the same breakpoints.
///
/// A position that could not be determined is represented as a `None`
/// [`Option<SourceLocation>`] (see [`Task::location`]) and never matches any
/// breakpoint.
///
/// [`Task::location`]: crate::build::Task::location
#[derive(Debug, Clone, Eq)]
pub struct SourceLocation {
    path: PathBuf,
    canonical: PathBuf,
    line: u32,
}

impl SourceLocation {
    /// Create a location, resolving `path` to its canonical form.
    ///
    /// Canonicalization requires the file to exist on disk; for paths that
    /// do not resolve (e.g: in-memory build definitions), the literal path
    /// is used as the identity instead.
    pub fn new(path: impl Into<PathBuf>, line: u32) -> SourceLocation {
        let path = path.into();
        let canonical = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        SourceLocation {
            path,
            canonical,
            line,
        }
    }

    /// The path as originally reported (not canonicalized).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The 1-based line number.
    pub fn line(&self) -> u32 {
        self.line
    }
}

impl PartialEq for SourceLocation {
    fn eq(&self, other: &SourceLocation) -> bool {
        self.line == other.line && self.canonical == other.canonical
    }
}

impl Hash for SourceLocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
        self.line.hash(state);
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}
