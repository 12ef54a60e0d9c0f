//! Binding table and the trace the resolver writes into.

use rustc_hash::FxHashMap;

use crate::base::{FileId, TextRange};
use crate::syntax::NodeId;

use super::decl::{Qualifier, ResolutionOutcome};
use super::diagnostics::{Diagnostic, DiagnosticCollector, DiagnosticKind};

/// Reference node → resolved target, plus qualifier nodes → the package or
/// class they denote. Re-resolving a node overwrites its entry.
#[derive(Clone, Debug, Default)]
pub struct BindingTable {
    targets: FxHashMap<NodeId, ResolutionOutcome>,
    qualifiers: FxHashMap<NodeId, Qualifier>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, node: NodeId, outcome: ResolutionOutcome) {
        self.targets.insert(node, outcome);
    }

    pub fn record_qualifier(&mut self, node: NodeId, qualifier: Qualifier) {
        self.qualifiers.insert(node, qualifier);
    }

    pub fn get(&self, node: NodeId) -> Option<&ResolutionOutcome> {
        self.targets.get(&node)
    }

    pub fn qualifier(&self, node: NodeId) -> Option<Qualifier> {
        self.qualifiers.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Sink for everything one resolution pass produces.
pub trait BindingTrace {
    fn record(&mut self, node: NodeId, outcome: ResolutionOutcome);

    fn record_qualifier(&mut self, node: NodeId, qualifier: Qualifier);

    fn report(&mut self, range: TextRange, kind: DiagnosticKind);
}

/// The default trace: one binding table and one diagnostic list per unit.
#[derive(Clone, Debug)]
pub struct Trace {
    file: FileId,
    bindings: BindingTable,
    diagnostics: DiagnosticCollector,
}

impl Trace {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            bindings: BindingTable::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn diagnostics(&self) -> &DiagnosticCollector {
        &self.diagnostics
    }

    /// Diagnostic kinds in report order.
    pub fn kinds(&self) -> Vec<&DiagnosticKind> {
        self.diagnostics.diagnostics().iter().map(|d| &d.kind).collect()
    }
}

impl BindingTrace for Trace {
    fn record(&mut self, node: NodeId, outcome: ResolutionOutcome) {
        self.bindings.record(node, outcome);
    }

    fn record_qualifier(&mut self, node: NodeId, qualifier: Qualifier) {
        self.bindings.record_qualifier(node, qualifier);
    }

    fn report(&mut self, range: TextRange, kind: DiagnosticKind) {
        tracing::trace!(file = ?self.file, ?range, code = kind.code(), "diagnostic");
        self.diagnostics.add(Diagnostic::error(self.file, range, kind));
    }
}

/// A trace that drops everything; used for implicit default imports.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardTrace;

impl BindingTrace for DiscardTrace {
    fn record(&mut self, _node: NodeId, _outcome: ResolutionOutcome) {}

    fn record_qualifier(&mut self, _node: NodeId, _qualifier: Qualifier) {}

    fn report(&mut self, _range: TextRange, _kind: DiagnosticKind) {}
}
