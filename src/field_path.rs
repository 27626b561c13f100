//! Field paths into a parameter document, rendered as `a.b[1].c`.
//! Used to attribute errors and to label placeholder expansions.

use std::fmt;

/// A single step into a document: a mapping key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Ordered list of segments leading to a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Path with a single key segment.
    pub fn root<S: Into<PathSegment>>(segment: S) -> Self {
        Self(vec![segment.into()])
    }

    /// Returns a new path extended by `segment`; `self` is left untouched.
    pub fn join<S: Into<PathSegment>>(&self, segment: S) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments = self.0.iter();

        // The head never gets a separator, even when it is an index.
        match segments.next() {
            Some(PathSegment::Key(key)) => write!(f, "{key}")?,
            Some(PathSegment::Index(index)) => write!(f, "{index}")?,
            None => return Ok(()),
        }

        for segment in segments {
            match segment {
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }

        Ok(())
    }
}
