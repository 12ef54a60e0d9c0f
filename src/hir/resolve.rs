//! Qualified-name resolution: walking dotted chains through packages and
//! classes.
//!
//! # Walk
//!
//! A qualifier path is resolved segment by segment:
//!
//! 1. **First segment** - a classifier visible in the lexical scope, or the
//!    longest existing package prefix of the path (searched from the right,
//!    stopping before the first segment with type arguments)
//! 2. **Next segments** - a child package of a package (unless the segment
//!    carries type arguments), else a classifier of the package or class
//! 3. **Stop** - on the first segment that resolves to nothing; in type and
//!    import position that segment is reported unresolved
//!
//! Every consumed segment is bound as it is walked, so a partial failure
//! still leaves bindings for the resolved prefix.

use std::sync::Arc;

use crate::base::{FqName, Name};
use crate::syntax::{NodeId, SyntaxNode, SyntaxTree};

use super::binding::BindingTrace;
use super::decl::{Declaration, Qualifier, Requester, ResolutionOutcome, Target};
use super::diagnostics::DiagnosticKind;
use super::ids::DeclId;
use super::namespace::{MemberScope, NamespaceProvider};
use super::qualifier::{
    QualifierPath, QualifierSegment, max_possible_qualifier_prefix, starts_with_root, unroll_to_leftmost,
};
use super::scope::{LexicalScope, ScopeLookup};
use super::visibility::{Narrowed, ResolveEnv, VisibilityOracle};

/// Where a qualifier occurs. Only the first-segment policy and the
/// handling of a failed segment depend on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum QualifierPosition {
    Import,
    Type,
    Expression,
}

/// How far a walk got.
///
/// `stopped_at_index == len` means the whole path was consumed; otherwise
/// segment `stopped_at_index` was not found under `descriptor`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PrefixResolution {
    pub descriptor: Option<DeclId>,
    pub stopped_at_index: usize,
}

impl PrefixResolution {
    /// "No qualifier": ordinary value resolution handles the chain.
    pub const NONE: PrefixResolution = PrefixResolution {
        descriptor: None,
        stopped_at_index: 0,
    };

    pub fn is_complete(&self, path_len: usize) -> bool {
        self.stopped_at_index == path_len
    }
}

/// Result of resolving a user type.
#[derive(Clone, Debug)]
pub struct TypeQualifierResolution {
    pub path: QualifierPath,
    pub classifier: Option<DeclId>,
}

impl TypeQualifierResolution {
    /// Type argument lists of every segment, outermost first.
    pub fn all_type_arguments(&self) -> Vec<NodeId> {
        self.path.segments.iter().filter_map(|s| s.type_arguments).collect()
    }
}

/// Result of resolving the qualifier part of an expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpressionQualifier {
    /// The package or class the consumed prefix denotes.
    pub qualifier: Option<Qualifier>,
    /// Qualified-expression nodes left for ordinary resolution, leftmost first.
    pub remaining: Vec<NodeId>,
}

/// Resolves qualifiers in package headers, types, imports and expressions.
#[derive(Clone, Debug)]
pub struct QualifiedExpressionResolver {
    env: ResolveEnv,
}

impl QualifiedExpressionResolver {
    pub fn new(namespace: Arc<dyn NamespaceProvider>) -> Self {
        Self {
            env: ResolveEnv::new(namespace),
        }
    }

    pub fn with_visibility(mut self, oracle: Arc<dyn VisibilityOracle>) -> Self {
        self.env.visibility = oracle;
        self
    }

    pub fn env(&self) -> &ResolveEnv {
        &self.env
    }

    pub fn namespace(&self) -> &dyn NamespaceProvider {
        self.env.namespace.as_ref()
    }

    pub(crate) fn text(&self, name: Name) -> smol_str::SmolStr {
        self.namespace().interner().text(name)
    }

    // ========================================================================
    // PACKAGE HEADER
    // ========================================================================

    /// Bind every name of `package a.b.c` to the package of its prefix.
    /// Returns the declared package.
    pub fn resolve_package_header(
        &self,
        tree: &SyntaxTree,
        directive: NodeId,
        trace: &mut dyn BindingTrace,
    ) -> Option<DeclId> {
        let SyntaxNode::PackageDirective { names, .. } = tree.node(directive) else {
            return None;
        };
        let mut fq_name = FqName::root();
        let mut package = Some(self.namespace().root_package());
        for (i, &node) in names.iter().enumerate() {
            let Some(name) = tree.name_of(node) else {
                package = None;
                continue;
            };
            fq_name = fq_name.child(name);
            package = self.namespace().package(&fq_name).id;
            match package {
                Some(id) => {
                    trace.record(node, ResolutionOutcome::Package(id));
                    if i + 1 < names.len() {
                        trace.record_qualifier(node, Qualifier::Package(id));
                    }
                }
                None => {
                    trace.record(node, ResolutionOutcome::Unresolved);
                    trace.report(
                        tree.range(node),
                        DiagnosticKind::UnresolvedReference { name: self.text(name) },
                    );
                }
            }
        }
        package
    }

    // ========================================================================
    // TYPES
    // ========================================================================

    /// Resolve a user type to its classifier.
    pub fn resolve_qualifier_for_type(
        &self,
        tree: &SyntaxTree,
        user_type: NodeId,
        requester: Option<&Requester>,
        scope: &LexicalScope,
        trace: &mut dyn BindingTrace,
    ) -> TypeQualifierResolution {
        let path = QualifierPath::from_user_type(tree, user_type);
        let rooted = starts_with_root(tree, user_type);
        if path.has_error {
            // A broken link: bind what the surviving names denote, no member lookup.
            let scope = (!rooted).then_some(scope);
            let classifier = match self.resolve_to_package_or_class(
                &path.segments,
                requester,
                scope,
                QualifierPosition::Type,
                trace,
            ) {
                Some(Qualifier::Class(class)) => Some(class),
                _ => None,
            };
            return TypeQualifierResolution { path, classifier };
        }
        let Some((last, qualifier)) = path.split_last() else {
            return TypeQualifierResolution { path, classifier: None };
        };

        let classifier = if qualifier.is_empty() && !rooted {
            self.resolve_simple_type(last, requester, scope, trace)
        } else {
            let scope = (!rooted).then_some(scope);
            let prefix = self.resolve_prefix(qualifier, requester, scope, QualifierPosition::Type, trace);
            match prefix.descriptor {
                Some(container) if prefix.is_complete(qualifier.len()) => {
                    self.resolve_member_classifier(container, last, requester, trace)
                }
                _ => None,
            }
        };
        TypeQualifierResolution { path, classifier }
    }

    /// A non-qualified type: lexical scope only.
    fn resolve_simple_type(
        &self,
        segment: &QualifierSegment,
        requester: Option<&Requester>,
        scope: &LexicalScope,
        trace: &mut dyn BindingTrace,
    ) -> Option<DeclId> {
        match scope.find_classifier(&self.env, segment.name) {
            ScopeLookup::Found(target) => {
                self.store_result(segment, &[target], requester, false, trace)
                    .map(Target::decl)
            }
            ScopeLookup::Ambiguous(targets) => self
                .store_result(segment, &targets, requester, false, trace)
                .map(Target::decl),
            ScopeLookup::NotFound => {
                self.store_result(segment, &[], requester, false, trace);
                None
            }
        }
    }

    fn resolve_member_classifier(
        &self,
        container: DeclId,
        segment: &QualifierSegment,
        requester: Option<&Requester>,
        trace: &mut dyn BindingTrace,
    ) -> Option<DeclId> {
        let scope = self.classifier_scope(container);
        let found: Vec<Target> = self
            .namespace()
            .classifier(container, scope, segment.name)
            .map(Target::from)
            .into_iter()
            .collect();
        self.store_result(segment, &found, requester, false, trace)
            .map(Target::decl)
    }

    fn classifier_scope(&self, container: DeclId) -> MemberScope {
        match self.namespace().declaration(container) {
            Declaration::Package(_) => MemberScope::Package,
            Declaration::Class(_) => MemberScope::InnerClasses,
            other => unreachable!("qualifier resolved to a non-container declaration: {other:?}"),
        }
    }

    // ========================================================================
    // EXPRESSIONS
    // ========================================================================

    /// Resolve the package/class prefix of a receiver chain such as
    /// `a.b.C.foo()`. Values in scope win over packages and classes for the
    /// leftmost name.
    pub fn resolve_qualifier_in_expression(
        &self,
        tree: &SyntaxTree,
        expression: NodeId,
        requester: Option<&Requester>,
        scope: &LexicalScope,
        trace: &mut dyn BindingTrace,
    ) -> ExpressionQualifier {
        let unrolled = unroll_to_leftmost(tree, expression);
        let path = max_possible_qualifier_prefix(tree, &unrolled);
        if path.is_empty() {
            return ExpressionQualifier {
                qualifier: None,
                remaining: unrolled,
            };
        }

        let prefix = self.resolve_prefix(
            &path.segments,
            requester,
            Some(scope),
            QualifierPosition::Expression,
            trace,
        );
        let consumed = prefix.stopped_at_index;
        let qualifier = match prefix.descriptor {
            Some(descriptor) if consumed > 0 => Some(self.qualifier_of(descriptor)),
            _ => None,
        };
        let Some(qualifier) = qualifier else {
            return ExpressionQualifier {
                qualifier: None,
                remaining: unrolled,
            };
        };

        // `a.b` itself denotes the qualifier when at least two names were consumed.
        if consumed >= 2 {
            trace.record_qualifier(unrolled[consumed - 2], qualifier);
        }
        let remaining = unrolled[consumed - 1..].to_vec();
        tracing::trace!(consumed, remaining = remaining.len(), "expression qualifier");
        ExpressionQualifier {
            qualifier: Some(qualifier),
            remaining,
        }
    }

    // ========================================================================
    // NAMESPACE WALK
    // ========================================================================

    /// Walk `path` as far as it names packages and classes.
    pub fn resolve_prefix(
        &self,
        path: &[QualifierSegment],
        requester: Option<&Requester>,
        scope: Option<&LexicalScope>,
        position: QualifierPosition,
        trace: &mut dyn BindingTrace,
    ) -> PrefixResolution {
        let Some(first) = path.first() else {
            return PrefixResolution {
                descriptor: Some(self.namespace().root_package()),
                stopped_at_index: 0,
            };
        };

        if position == QualifierPosition::Expression
            && scope.is_some_and(|s| s.contains_function_or_variable(&self.env, first.name))
        {
            tracing::trace!(name = %self.text(first.name), "value in scope shadows qualifier");
            return PrefixResolution::NONE;
        }

        let in_import = position == QualifierPosition::Import;
        let local = scope.map_or(ScopeLookup::NotFound, |s| s.find_classifier(&self.env, first.name));
        let (mut current, mut index) = match local {
            ScopeLookup::Found(target) => {
                let class = target.decl();
                self.store_result(first, &[target], requester, in_import, trace);
                trace.record_qualifier(first.node, Qualifier::Class(class));
                (class, 1)
            }
            ScopeLookup::Ambiguous(targets) => {
                self.store_result(first, &targets, requester, in_import, trace);
                return PrefixResolution::NONE;
            }
            ScopeLookup::NotFound => self.quick_resolve_to_package(path, trace),
        };

        while let Some(segment) = path.get(index) {
            let Some(next) = self.resolve_segment(current, segment) else {
                if position != QualifierPosition::Expression {
                    self.store_result(segment, &[], requester, in_import, trace);
                }
                tracing::debug!(
                    name = %self.text(segment.name),
                    index,
                    ?position,
                    "qualifier walk stopped"
                );
                break;
            };
            let outcome = ResolutionOutcome::of(self.namespace().declaration(next), next.into());
            if outcome == ResolutionOutcome::Class(next) {
                // Invisible classes are reported but the walk goes on through them.
                self.store_result(segment, &[next.into()], requester, in_import, trace);
            } else {
                trace.record(segment.node, outcome);
            }
            trace.record_qualifier(segment.node, self.qualifier_of(next));
            current = next;
            index += 1;
        }

        PrefixResolution {
            descriptor: Some(current),
            stopped_at_index: index,
        }
    }

    /// One step down from a package or class.
    fn resolve_segment(&self, current: DeclId, segment: &QualifierSegment) -> Option<DeclId> {
        let ns = self.namespace();
        match ns.declaration(current) {
            Declaration::Package(package) => {
                let child = (!segment.has_type_arguments())
                    .then(|| ns.package(&package.fq_name.child(segment.name)).id)
                    .flatten();
                child.or_else(|| ns.classifier(current, MemberScope::Package, segment.name))
            }
            Declaration::Class(_) => ns.classifier(current, MemberScope::InnerClasses, segment.name),
            other => unreachable!("qualifier prefix is neither package nor class: {other:?}"),
        }
    }

    /// Longest existing package among the leading segments. The root
    /// package (index 0) when none exists.
    pub fn quick_resolve_to_package(
        &self,
        path: &[QualifierSegment],
        trace: &mut dyn BindingTrace,
    ) -> (DeclId, usize) {
        let ns = self.namespace();
        let limit = path
            .iter()
            .position(QualifierSegment::has_type_arguments)
            .unwrap_or(path.len());
        let mut fq_name = FqName::from_segments(path[..limit].iter().map(|s| s.name));
        loop {
            if fq_name.is_root() {
                return (ns.root_package(), 0);
            }
            if let Some(package) = ns.package(&fq_name).id {
                let len = fq_name.len();
                tracing::trace!(package = %fq_name.render(ns.interner()), len, "package prefix");
                self.record_package_views(&path[..len], package, trace);
                return (package, len);
            }
            fq_name = fq_name.parent();
        }
    }

    /// Bind each segment of a package prefix to its own package, walking
    /// container links from the deepest package upward.
    fn record_package_views(&self, segments: &[QualifierSegment], package: DeclId, trace: &mut dyn BindingTrace) {
        let mut current = Some(package);
        for segment in segments.iter().rev() {
            let Some(id) = current else { break };
            trace.record(segment.node, ResolutionOutcome::Package(id));
            trace.record_qualifier(segment.node, Qualifier::Package(id));
            current = self.namespace().declaration(id).container();
        }
    }

    /// Resolve a whole path to a package or class, or nothing.
    pub fn resolve_to_package_or_class(
        &self,
        path: &[QualifierSegment],
        requester: Option<&Requester>,
        scope: Option<&LexicalScope>,
        position: QualifierPosition,
        trace: &mut dyn BindingTrace,
    ) -> Option<Qualifier> {
        let prefix = self.resolve_prefix(path, requester, scope, position, trace);
        match prefix.descriptor {
            Some(descriptor) if prefix.is_complete(path.len()) => Some(self.qualifier_of(descriptor)),
            _ => None,
        }
    }

    pub(crate) fn qualifier_of(&self, descriptor: DeclId) -> Qualifier {
        match self.namespace().declaration(descriptor) {
            Declaration::Package(_) => Qualifier::Package(descriptor),
            Declaration::Class(_) => Qualifier::Class(descriptor),
            other => unreachable!("qualifier prefix is neither package nor class: {other:?}"),
        }
    }

    // ========================================================================
    // RECORDING
    // ========================================================================

    /// Narrow `candidates` for `segment`, bind the result and report any
    /// problem. Returns the target the segment resolves to, if unique.
    /// An invisible target is still bound and returned.
    pub(crate) fn store_result(
        &self,
        segment: &QualifierSegment,
        candidates: &[Target],
        requester: Option<&Requester>,
        in_import: bool,
        trace: &mut dyn BindingTrace,
    ) -> Option<Target> {
        let ns = self.namespace();
        match self.env.narrow(candidates, requester, in_import) {
            Narrowed::Unique(target) => {
                trace.record(segment.node, ResolutionOutcome::of(ns.declaration(target.decl()), target));
                Some(target)
            }
            Narrowed::Invisible(target) => {
                let declaration = ns.declaration(target.decl());
                trace.record(segment.node, ResolutionOutcome::of(declaration, target));
                let visibility = declaration.visibility().map_or("hidden", |v| v.display());
                trace.report(
                    segment.range,
                    DiagnosticKind::InvisibleReference {
                        name: self.text(segment.name),
                        visibility,
                    },
                );
                Some(target)
            }
            Narrowed::Ambiguous(targets) => {
                let candidates = targets.len();
                trace.record(segment.node, ResolutionOutcome::Ambiguous(targets));
                trace.report(
                    segment.range,
                    DiagnosticKind::AmbiguousReferenceTarget {
                        name: self.text(segment.name),
                        candidates,
                    },
                );
                None
            }
            Narrowed::Unresolved => {
                trace.record(segment.node, ResolutionOutcome::Unresolved);
                trace.report(
                    segment.range,
                    DiagnosticKind::UnresolvedReference {
                        name: self.text(segment.name),
                    },
                );
                None
            }
        }
    }

    /// Bind a set of import candidates without narrowing them further.
    pub(crate) fn store_results(&self, segment: &QualifierSegment, targets: &[Target], trace: &mut dyn BindingTrace) {
        let outcome = match targets {
            [] => ResolutionOutcome::Unresolved,
            [single] => ResolutionOutcome::of(self.namespace().declaration(single.decl()), *single),
            many => ResolutionOutcome::Ambiguous(many.to_vec()),
        };
        trace.record(segment.node, outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, Interner};
    use crate::hir::binding::Trace;
    use crate::hir::decl::ClassKind;
    use crate::hir::ids::ModuleId;
    use crate::hir::namespace::ModuleNamespace;

    struct Fixture {
        resolver: QualifiedExpressionResolver,
        tree: SyntaxTree,
        scope: LexicalScope,
        ab: DeclId,
        class: DeclId,
    }

    /// Packages `a.b`, class `a.b.C` with nested class `N`.
    fn make_fixture() -> Fixture {
        let interner = Arc::new(Interner::new());
        let mut ns = ModuleNamespace::new(Arc::clone(&interner));
        let ab = ns.add_package("a.b");
        let class = ns.add_class(ab, "C", ClassKind::Class);
        ns.add_class(class, "N", ClassKind::Class);
        let root = ns.root_package();
        Fixture {
            resolver: QualifiedExpressionResolver::new(Arc::new(ns)),
            tree: SyntaxTree::new(FileId::new(0), interner),
            scope: LexicalScope::file(Requester::new(root, ModuleId::new(0)), None),
            ab,
            class,
        }
    }

    fn path_of(tree: &mut SyntaxTree, dotted: &str) -> QualifierPath {
        let ty = tree.dotted_type(dotted);
        QualifierPath::from_user_type(tree, ty)
    }

    #[test]
    fn test_walk_through_package_into_nested_class() {
        let mut f = make_fixture();
        let path = path_of(&mut f.tree, "a.b.C.N");
        let mut trace = Trace::new(FileId::new(0));

        let prefix = f.resolver.resolve_prefix(&path.segments, None, None, QualifierPosition::Import, &mut trace);
        assert_eq!(prefix.stopped_at_index, 4);
        assert!(trace.diagnostics().is_empty());
        assert_eq!(
            trace.bindings().get(path.segments[2].node),
            Some(&ResolutionOutcome::Class(f.class))
        );
        assert_eq!(
            trace.bindings().qualifier(path.segments[1].node),
            Some(Qualifier::Package(f.ab))
        );
    }

    #[test]
    fn test_package_views_bound_per_segment() {
        let mut f = make_fixture();
        let path = path_of(&mut f.tree, "a.b");
        let mut trace = Trace::new(FileId::new(0));

        let (package, len) = f.resolver.quick_resolve_to_package(&path.segments, &mut trace);
        assert_eq!((package, len), (f.ab, 2));
        let a = f.resolver.namespace().declaration(f.ab).container().unwrap();
        assert_eq!(trace.bindings().get(path.segments[0].node), Some(&ResolutionOutcome::Package(a)));
    }

    #[test]
    fn test_type_arguments_cut_package_shortcut() {
        let mut f = make_fixture();
        let a = f.tree.name_ref("a");
        let arg = f.tree.dotted_type("T");
        let args = f.tree.type_arguments(vec![arg]);
        let ta = f.tree.user_type(None, Some(a), None);
        let b = f.tree.name_ref("b");
        let tb = f.tree.user_type(Some(ta), Some(b), Some(args));
        let path = QualifierPath::from_user_type(&f.tree, tb);
        let mut trace = Trace::new(FileId::new(0));

        let (_, len) = f.resolver.quick_resolve_to_package(&path.segments, &mut trace);
        assert_eq!(len, 1);

        // `b<T>` cannot be a package, and `a` has no classifier `b`.
        let prefix = f.resolver.resolve_prefix(&path.segments, None, None, QualifierPosition::Type, &mut trace);
        assert_eq!(prefix.stopped_at_index, 1);
        assert_eq!(trace.diagnostics().len(), 1);
    }

    #[test]
    fn test_package_header_binds_prefixes() {
        let mut f = make_fixture();
        let header = f.tree.package("a.b");
        let mut trace = Trace::new(FileId::new(0));

        assert_eq!(f.resolver.resolve_package_header(&f.tree, header, &mut trace), Some(f.ab));
        assert!(trace.diagnostics().is_empty());

        let unknown = f.tree.package("a.zzz");
        assert_eq!(f.resolver.resolve_package_header(&f.tree, unknown, &mut trace), None);
        assert_eq!(trace.diagnostics().len(), 1);
    }

    #[test]
    fn test_simple_type_uses_scope_only() {
        let mut f = make_fixture();
        let ty = f.tree.dotted_type("C");
        let mut trace = Trace::new(FileId::new(0));

        let resolved = f.resolver.resolve_qualifier_for_type(&f.tree, ty, None, &f.scope, &mut trace);
        assert_eq!(resolved.classifier, None);
        assert_eq!(trace.diagnostics().len(), 1);

        let c = f.resolver.namespace().interner().intern("C");
        let scope = LexicalScope::file(*f.scope.requester(), None).with_local(c, f.class);
        let mut trace = Trace::new(FileId::new(0));
        let resolved = f.resolver.resolve_qualifier_for_type(&f.tree, ty, None, &scope, &mut trace);
        assert_eq!(resolved.classifier, Some(f.class));
    }

    #[test]
    fn test_qualified_type_with_arguments() {
        let mut f = make_fixture();
        let qualifier = f.tree.dotted_type("a.b");
        let c = f.tree.name_ref("C");
        let arg = f.tree.dotted_type("T");
        let args = f.tree.type_arguments(vec![arg]);
        let ty = f.tree.user_type(Some(qualifier), Some(c), Some(args));
        let mut trace = Trace::new(FileId::new(0));

        let resolved = f.resolver.resolve_qualifier_for_type(&f.tree, ty, None, &f.scope, &mut trace);
        assert_eq!(resolved.classifier, Some(f.class));
        assert_eq!(resolved.all_type_arguments(), vec![args]);
    }
}
