//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use qualres::base::{FileId, Interner, Name};
use qualres::hir::{
    ClassKind, DeclId, FileScopeFactory, FileScopeProvider, ModuleId, ModuleNamespace, QualifiedExpressionResolver,
    Requester, SourceUnit, Trace,
};
use qualres::syntax::SyntaxTree;

/// A namespace under construction plus the interner shared with trees.
pub struct World {
    pub interner: Arc<Interner>,
    pub ns: ModuleNamespace,
}

impl World {
    pub fn new() -> Self {
        let interner = Arc::new(Interner::new());
        let ns = ModuleNamespace::new(Arc::clone(&interner));
        Self { interner, ns }
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    pub fn package(&mut self, dotted: &str) -> DeclId {
        self.ns.add_package(dotted)
    }

    pub fn class(&mut self, container: DeclId, name: &str, kind: ClassKind) -> DeclId {
        self.ns.add_class(container, name, kind)
    }

    pub fn tree(&self, file: u32) -> SyntaxTree {
        SyntaxTree::new(FileId::new(file), Arc::clone(&self.interner))
    }

    /// Freeze the namespace into a resolver.
    pub fn resolver(self) -> (Arc<Interner>, QualifiedExpressionResolver) {
        let resolver = QualifiedExpressionResolver::new(Arc::new(self.ns));
        (self.interner, resolver)
    }

    pub fn provider(self) -> (Arc<Interner>, FileScopeProvider) {
        let (interner, resolver) = self.resolver();
        (interner, FileScopeProvider::new(FileScopeFactory::new(resolver)))
    }
}

pub fn requester(owner: DeclId) -> Requester {
    Requester::new(owner, ModuleId::new(0))
}

pub fn unit(tree: SyntaxTree, owner: DeclId) -> SourceUnit {
    SourceUnit::new(tree, requester(owner))
}

pub fn trace() -> Trace {
    Trace::new(FileId::new(0))
}

pub fn codes_of(trace: &Trace) -> Vec<&'static str> {
    trace.diagnostics().diagnostics().iter().map(|d| d.code()).collect()
}
