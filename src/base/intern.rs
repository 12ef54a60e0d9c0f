//! Identifier interning.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::fmt;

/// An interned identifier.
///
/// `Name` is a u32 handle into an [`Interner`]; two names are equal exactly
/// when their text is equal, so namespace tables can hash and compare them
/// without touching strings.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Name(u32);

impl Name {
    #[inline]
    pub(crate) const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// Returns `true` if `text` is a plain identifier (`_` or XID start, then XID continue).
///
/// Syntax nodes produced by error recovery carry text that fails this check.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first == '_' || unicode_ident::is_xid_start(first) => {
            chars.all(unicode_ident::is_xid_continue)
        }
        _ => false,
    }
}

/// Thread-safe identifier interner shared by the syntax tree and the namespace.
#[derive(Default)]
pub struct Interner {
    inner: RwLock<InternerInner>,
}

#[derive(Default)]
struct InternerInner {
    ids: FxHashMap<SmolStr, Name>,
    strings: Vec<SmolStr>,
}

impl Interner {
    /// Create a new empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning the existing `Name` if it was seen before.
    pub fn intern(&self, text: &str) -> Name {
        if let Some(&name) = self.inner.read().ids.get(text) {
            return name;
        }

        let mut inner = self.inner.write();
        // Another writer may have won the race between the two locks.
        if let Some(&name) = inner.ids.get(text) {
            return name;
        }

        let name = Name::from_raw(inner.strings.len() as u32);
        let text = SmolStr::new(text);
        inner.strings.push(text.clone());
        inner.ids.insert(text, name);
        name
    }

    /// Intern every segment of a dotted path such as `a.b.C`.
    pub fn intern_path(&self, dotted: &str) -> Vec<Name> {
        dotted
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(|segment| self.intern(segment))
            .collect()
    }

    /// The text of `name`, or `None` if it came from another interner.
    pub fn lookup(&self, name: Name) -> Option<SmolStr> {
        self.inner.read().strings.get(name.0 as usize).cloned()
    }

    /// The text of `name`, rendering foreign names as `<?>`.
    pub fn text(&self, name: Name) -> SmolStr {
        self.lookup(name).unwrap_or_else(|| SmolStr::new_static("<?>"))
    }

    /// Render a sequence of names joined with `.`.
    pub fn render_path(&self, names: &[Name]) -> String {
        let mut out = String::new();
        for (i, &name) in names.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&self.text(name));
        }
        out
    }

    /// Get the number of interned strings.
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Check if the interner is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner").field("count", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_stable() {
        let interner = Interner::new();
        let a = interner.intern("kotlin");
        let b = interner.intern("kotlin");
        let c = interner.intern("io");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_intern_path() {
        let interner = Interner::new();
        let path = interner.intern_path("a.b.C");

        assert_eq!(path.len(), 3);
        assert_eq!(interner.render_path(&path), "a.b.C");
    }

    #[test]
    fn test_foreign_name_renders_placeholder() {
        let interner = Interner::new();
        assert_eq!(interner.text(Name::from_raw(42)).as_str(), "<?>");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("foo"));
        assert!(is_identifier("_bar1"));
        assert!(is_identifier("Ärger"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("a-b"));
    }
}
