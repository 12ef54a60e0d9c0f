//! Import directives → importing-scope layers.

use crate::base::Name;
use crate::syntax::{NodeId, SyntaxNode, SyntaxTree};

use super::binding::BindingTrace;
use super::decl::{Declaration, Requester, ResolutionOutcome, Target};
use super::diagnostics::DiagnosticKind;
use super::ids::DeclId;
use super::namespace::MemberScope;
use super::qualifier::{QualifierPath, QualifierSegment};
use super::resolve::{QualifiedExpressionResolver, QualifierPosition};
use super::scope::ImportLayer;

/// What one directive resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ImportOutcome {
    Layer(ImportLayer),
    /// `import a.b.C`: the last name and the declarations it imports.
    Plain { name: Name, targets: Vec<Target> },
    Skipped,
}

impl QualifiedExpressionResolver {
    /// Interpret one import directive.
    ///
    /// Aliased and all-under imports produce a layer. A plain `import a.b.C`
    /// is bound and checked but produces none.
    pub fn process_import_directive(
        &self,
        tree: &SyntaxTree,
        directive: NodeId,
        requester: Option<&Requester>,
        trace: &mut dyn BindingTrace,
    ) -> Option<ImportLayer> {
        match self.resolve_import(tree, directive, requester, trace) {
            ImportOutcome::Layer(layer) => Some(layer),
            ImportOutcome::Plain { .. } | ImportOutcome::Skipped => None,
        }
    }

    pub(crate) fn resolve_import(
        &self,
        tree: &SyntaxTree,
        directive: NodeId,
        requester: Option<&Requester>,
        trace: &mut dyn BindingTrace,
    ) -> ImportOutcome {
        let SyntaxNode::ImportDirective {
            path: Some(path),
            all_under,
            alias,
            ..
        } = tree.node(directive)
        else {
            return ImportOutcome::Skipped;
        };
        let path = QualifierPath::from_receiver_chain(tree, *path, trace);
        let Some((last, qualifier)) = path.split_last() else {
            return ImportOutcome::Skipped;
        };

        if *all_under {
            return self.process_all_under(&path.segments, last, requester, trace);
        }
        match alias {
            Some(alias) => self
                .process_aliased(*alias, last, qualifier, requester, trace)
                .map_or(ImportOutcome::Skipped, ImportOutcome::Layer),
            None => ImportOutcome::Plain {
                name: last.name,
                targets: self.resolve_importable(last, qualifier, requester, trace),
            },
        }
    }

    fn process_all_under(
        &self,
        segments: &[QualifierSegment],
        last: &QualifierSegment,
        requester: Option<&Requester>,
        trace: &mut dyn BindingTrace,
    ) -> ImportOutcome {
        let Some(qualifier) =
            self.resolve_to_package_or_class(segments, requester, None, QualifierPosition::Import, trace)
        else {
            return ImportOutcome::Skipped;
        };
        let container = qualifier.decl();
        if let Some(class) = self.namespace().declaration(container).as_class() {
            if class.kind.is_singleton() {
                trace.report(
                    last.range,
                    DiagnosticKind::CannotImportFromSingletonWildcard {
                        name: self.text(last.name),
                    },
                );
            }
        }
        ImportOutcome::Layer(ImportLayer::AllUnder {
            container,
            requester: requester.copied(),
        })
    }

    fn process_aliased(
        &self,
        alias: Name,
        last: &QualifierSegment,
        qualifier: &[QualifierSegment],
        requester: Option<&Requester>,
        trace: &mut dyn BindingTrace,
    ) -> Option<ImportLayer> {
        let targets = self.resolve_importable(last, qualifier, requester, trace);
        if targets.is_empty() {
            return None;
        }
        Some(ImportLayer::Single { alias, targets })
    }

    /// What the last name of a single import brings in, bound and checked.
    /// Empty when nothing importable exists under the qualifier.
    fn resolve_importable(
        &self,
        last: &QualifierSegment,
        qualifier: &[QualifierSegment],
        requester: Option<&Requester>,
        trace: &mut dyn BindingTrace,
    ) -> Vec<Target> {
        let container = if qualifier.is_empty() {
            self.namespace().root_package()
        } else {
            match self.resolve_to_package_or_class(qualifier, requester, None, QualifierPosition::Import, trace) {
                Some(resolved) => resolved.decl(),
                None => return Vec::new(),
            }
        };

        let candidates = self.collect_candidates(container, last.name);
        if candidates.is_empty() {
            if !self.try_resolve_non_importable(container, last, trace) {
                self.store_result(last, &[], requester, true, trace);
            }
            return Vec::new();
        }
        self.importable_targets(last, candidates, requester, trace)
    }

    /// Keep the visible candidates. When none is visible the reference is
    /// reported invisible and the whole set is kept anyway.
    fn importable_targets(
        &self,
        last: &QualifierSegment,
        candidates: Vec<Target>,
        requester: Option<&Requester>,
        trace: &mut dyn BindingTrace,
    ) -> Vec<Target> {
        let visible: Vec<Target> = candidates
            .iter()
            .copied()
            .filter(|&t| self.env().is_visible(t, requester, true))
            .collect();
        if visible.is_empty() {
            self.store_result(last, &candidates, requester, true, trace);
            return candidates;
        }
        self.store_results(last, &visible, trace);
        visible
    }

    /// Everything importable named `name` directly under `container`.
    fn collect_candidates(&self, container: DeclId, name: Name) -> Vec<Target> {
        let ns = self.namespace();
        let mut candidates = Vec::new();
        match ns.declaration(container) {
            Declaration::Package(_) => {
                candidates.extend(ns.classifier(container, MemberScope::Package, name).map(Target::from));
                candidates.extend(ns.properties(container, MemberScope::Package, name).into_iter().map(Target::from));
                candidates.extend(ns.functions(container, MemberScope::Package, name).into_iter().map(Target::from));
            }
            Declaration::Class(class) => {
                candidates.extend(ns.classifier(container, MemberScope::InnerClasses, name).map(Target::from));
                candidates.extend(ns.properties(container, MemberScope::Static, name).into_iter().map(Target::from));
                candidates.extend(ns.functions(container, MemberScope::Static, name).into_iter().map(Target::from));
                if class.kind.exposes_members_for_import() {
                    let adapt = |member| Target::ImportedFromObject {
                        member,
                        object: container,
                    };
                    candidates.extend(ns.properties(container, MemberScope::Instance, name).into_iter().map(adapt));
                    candidates.extend(ns.functions(container, MemberScope::Instance, name).into_iter().map(adapt));
                }
            }
            other => unreachable!("import container is neither package nor class: {other:?}"),
        }
        candidates
    }

    /// Diagnose a name that exists under `container` but cannot be imported.
    fn try_resolve_non_importable(
        &self,
        container: DeclId,
        segment: &QualifierSegment,
        trace: &mut dyn BindingTrace,
    ) -> bool {
        let ns = self.namespace();
        match ns.declaration(container) {
            Declaration::Package(package) => {
                let Some(child) = ns.package(&package.fq_name.child(segment.name)).id else {
                    return false;
                };
                trace.record(segment.node, ResolutionOutcome::Package(child));
                trace.report(segment.range, DiagnosticKind::PackageCannotBeImported);
                true
            }
            Declaration::Class(_) => {
                let members: Vec<Target> = ns
                    .properties(container, MemberScope::Instance, segment.name)
                    .into_iter()
                    .chain(ns.functions(container, MemberScope::Instance, segment.name))
                    .map(Target::from)
                    .collect();
                if members.is_empty() {
                    return false;
                }
                self.store_results(segment, &members, trace);
                trace.report(
                    segment.range,
                    DiagnosticKind::CannotBeImported {
                        name: self.text(segment.name),
                    },
                );
                true
            }
            _ => false,
        }
    }
}
