//! Qualified names and the path convention that locates owning modules.
//!
//! A name like `repo::catalog::sync` is case-folded, split on `::`, and the
//! leading segments become the module path `repo/catalog`. This mapping is
//! the whole discovery convention: there is no manifest, only namespaces.

use std::fmt;

use mortar_common::{Error, Result};

/// Separator between segments of a qualified name.
pub const SEPARATOR: &str = "::";

/// A case-folded, `::`-separated function or command name.
///
/// `Repo::Catalog::sync` and `repo::catalog::SYNC` parse to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    segments: Vec<String>,
}

impl QualifiedName {
    /// Parse and case-fold a qualified name.
    ///
    /// Surrounding separator noise is tolerated (`::a::b` parses as `a::b`);
    /// empty input, empty segments, and segment characters outside
    /// `[a-z0-9_-]` are rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(Self {
            segments: parse_segments(raw)?,
        })
    }

    /// The final segment: the plain function or command name.
    pub fn short_name(&self) -> &str {
        // parse_segments guarantees at least one segment.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// The module path derived from every segment but the last.
    ///
    /// Two names sharing all but their final segment resolve to the same
    /// module path. A single-segment name has no namespace and is rejected.
    pub fn module_path(&self) -> Result<ModulePath> {
        if self.segments.len() < 2 {
            return Err(Error::InvalidName {
                input: self.to_string(),
            });
        }
        Ok(ModulePath(self.segments[..self.segments.len() - 1].join("/")))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(SEPARATOR))
    }
}

/// Lowercase `/`-joined namespace key locating one module in a set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModulePath(String);

impl ModulePath {
    /// Derive the path for a module's declared `::` namespace.
    pub fn from_namespace(namespace: &str) -> Result<Self> {
        Ok(Self(parse_segments(namespace)?.join("/")))
    }

    /// Parse a stored `/`-joined path, e.g. one read back from the index.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.split('/').any(|s| !is_valid_segment(s)) {
            return Err(Error::InvalidName { input: raw.into() });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully qualify a short name under this module's namespace.
    pub fn qualify(&self, short_name: &str) -> String {
        format!("{}{SEPARATOR}{short_name}", self.0.replace('/', SEPARATOR))
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_segments(raw: &str) -> Result<Vec<String>> {
    let trimmed = raw.trim().trim_start_matches(SEPARATOR).trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        return Err(Error::InvalidName { input: raw.into() });
    }
    let segments: Vec<String> = trimmed
        .split(SEPARATOR)
        .map(|s| s.to_ascii_lowercase())
        .collect();
    if segments.iter().any(|s| !is_valid_segment(s)) {
        return Err(Error::InvalidName { input: raw.into() });
    }
    Ok(segments)
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
