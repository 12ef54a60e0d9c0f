//! Fully-qualified dotted names.

use std::fmt;
use std::sync::Arc;

use super::intern::{Interner, Name};

/// A fully-qualified name such as `kotlin.collections.List`.
///
/// The root package is the empty name. Segments are shared, so cloning is
/// a reference-count bump.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct FqName {
    segments: Arc<[Name]>,
}

impl FqName {
    /// The root name (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a name from interned segments.
    pub fn from_segments(segments: impl IntoIterator<Item = Name>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
        }
    }

    /// Intern and build a name from dotted text.
    pub fn parse(interner: &Interner, dotted: &str) -> Self {
        Self::from_segments(interner.intern_path(dotted))
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Name] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last segment, or `None` for the root.
    pub fn short_name(&self) -> Option<Name> {
        self.segments.last().copied()
    }

    /// `self` extended by one segment.
    pub fn child(&self, name: Name) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(name);
        Self::from_segments(segments)
    }

    /// `self` without its last segment; the root is its own parent.
    pub fn parent(&self) -> Self {
        match self.segments.split_last() {
            Some((_, rest)) => Self::from_segments(rest.iter().copied()),
            None => Self::root(),
        }
    }

    /// Render with `.` separators.
    pub fn render(&self, interner: &Interner) -> String {
        interner.render_path(&self.segments)
    }
}

impl fmt::Debug for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FqName{:?}", &*self.segments)
    }
}
