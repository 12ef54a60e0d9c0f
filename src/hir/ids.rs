//! Semantic identifiers for declarations and modules.

use std::fmt;

/// Index of a declaration in a namespace's declaration table.
///
/// Declarations never own each other: a child stores its container's
/// `DeclId`, and the table is the only place declarations live.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DeclId(pub u32);

impl DeclId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclId({})", self.0)
    }
}

/// A module: the unit of `internal` visibility.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct ModuleId(pub u32);

impl ModuleId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decl_id_index() {
        assert_eq!(DeclId::new(5).index(), 5);
        assert_ne!(DeclId::new(1), DeclId::new(2));
    }

    #[test]
    fn test_ids_are_small() {
        assert_eq!(std::mem::size_of::<DeclId>(), 4);
        assert_eq!(std::mem::size_of::<ModuleId>(), 4);
    }
}
