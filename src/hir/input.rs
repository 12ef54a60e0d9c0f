//! Compilation units handed to scope construction.

use std::sync::Arc;

use crate::base::FileId;
use crate::syntax::SyntaxTree;

use super::decl::Requester;
use super::ids::DeclId;

/// One compilation unit: its syntax and the declaration its top level
/// belongs to (a package, or the script class of a REPL line).
#[derive(Clone, Debug)]
pub struct SourceUnit {
    tree: Arc<SyntaxTree>,
    requester: Requester,
}

impl SourceUnit {
    /// A unit whose top level is owned by `requester`. The requester's file
    /// is set to this unit's file.
    pub fn new(tree: SyntaxTree, requester: Requester) -> Self {
        let requester = requester.in_file(tree.file());
        Self {
            tree: Arc::new(tree),
            requester,
        }
    }

    pub fn file(&self) -> FileId {
        self.tree.file()
    }

    pub fn tree(&self) -> &Arc<SyntaxTree> {
        &self.tree
    }

    pub fn requester(&self) -> &Requester {
        &self.requester
    }

    pub fn owner(&self) -> DeclId {
        self.requester.owner
    }
}
