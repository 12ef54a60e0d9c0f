//! Importing scopes and lexical scope chains.
//!
//! Both are immutable once built and shared through `Arc`. A unit's
//! importing scope is a linked stack of groups (its own directives on top of
//! the default imports); a lexical scope is a parent-linked chain whose
//! innermost importing scope is consulted after every local declaration.

use std::iter;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::base::Name;

use super::decl::{Declaration, Requester, Target};
use super::ids::DeclId;
use super::namespace::MemberScope;
use super::visibility::ResolveEnv;

// ============================================================================
// IMPORT LAYERS
// ============================================================================

/// One import directive's contribution to an importing scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportLayer {
    /// `import a.b.c as d`: one name, one or more targets.
    Single { alias: Name, targets: Vec<Target> },
    /// `import a.b.*`: every member of `container` visible to `requester`.
    AllUnder {
        container: DeclId,
        requester: Option<Requester>,
    },
}

impl ImportLayer {
    fn is_all_under(&self) -> bool {
        matches!(self, ImportLayer::AllUnder { .. })
    }

    fn classifiers(&self, env: &ResolveEnv, name: Name, out: &mut Vec<Target>) {
        match self {
            ImportLayer::Single { alias, targets } => {
                if *alias == name {
                    out.extend(targets.iter().filter(|t| env.declaration(t.decl()).is_class()));
                }
            }
            ImportLayer::AllUnder { container, requester } => {
                let scope = member_scope(env.declaration(*container), false);
                if let Some(id) = env.namespace.classifier(*container, scope, name) {
                    if env.is_visible(id.into(), requester.as_ref(), true) {
                        out.push(id.into());
                    }
                }
            }
        }
    }

    fn values(&self, env: &ResolveEnv, name: Name, out: &mut Vec<Target>) {
        match self {
            ImportLayer::Single { alias, targets } => {
                if *alias == name {
                    out.extend(targets.iter().filter(|t| env.declaration(t.decl()).is_value()));
                }
            }
            ImportLayer::AllUnder { container, requester } => {
                let scope = member_scope(env.declaration(*container), true);
                let ns = env.namespace.as_ref();
                let found = ns
                    .functions(*container, scope, name)
                    .into_iter()
                    .chain(ns.properties(*container, scope, name))
                    .map(Target::from)
                    .filter(|&t| env.is_visible(t, requester.as_ref(), true));
                out.extend(found);
            }
        }
    }
}

/// Member table an all-under import reads from its container.
fn member_scope(container: &Declaration, values: bool) -> MemberScope {
    match (container.is_package(), values) {
        (true, _) => MemberScope::Package,
        (false, false) => MemberScope::InnerClasses,
        (false, true) => MemberScope::Static,
    }
}

/// Result of a classifier lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScopeLookup {
    Found(Target),
    /// Distinct matches at the same precedence.
    Ambiguous(Vec<Target>),
    NotFound,
}

impl ScopeLookup {
    pub fn found(&self) -> Option<Target> {
        match self {
            ScopeLookup::Found(target) => Some(*target),
            _ => None,
        }
    }
}

fn dedup(targets: &mut Vec<Target>) {
    let mut seen = Vec::with_capacity(targets.len());
    targets.retain(|t| {
        if seen.contains(t) {
            false
        } else {
            seen.push(*t);
            true
        }
    });
}

// ============================================================================
// IMPORTING SCOPE
// ============================================================================

/// One group of import layers linked to the group below it.
#[derive(Clone, Debug, Default)]
pub struct ImportingScope {
    layers: Vec<ImportLayer>,
    is_default: bool,
    parent: Option<Arc<ImportingScope>>,
}

/// Precedence classes, strongest first: (default group, all-under layer).
const PRECEDENCE: [(bool, bool); 4] = [(false, false), (false, true), (true, false), (true, true)];

impl ImportingScope {
    /// A group of a unit's explicit directives.
    pub fn explicit(layers: Vec<ImportLayer>, parent: Option<Arc<ImportingScope>>) -> Self {
        Self {
            layers,
            is_default: false,
            parent,
        }
    }

    /// A group of implicit default imports.
    pub fn default_imports(layers: Vec<ImportLayer>, parent: Option<Arc<ImportingScope>>) -> Self {
        Self {
            layers,
            is_default: true,
            parent,
        }
    }

    pub fn layers(&self) -> &[ImportLayer] {
        &self.layers
    }

    pub fn parent(&self) -> Option<&Arc<ImportingScope>> {
        self.parent.as_ref()
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// This group and every group below it, top first.
    pub fn groups(&self) -> impl Iterator<Item = &ImportingScope> {
        iter::successors(Some(self), |group| group.parent.as_deref())
    }

    /// Run `collect` over each precedence class in order and return the
    /// matches of the first group that has any.
    fn first_match(&self, mut collect: impl FnMut(&ImportLayer, &mut Vec<Target>)) -> Vec<Target> {
        for (is_default, all_under) in PRECEDENCE {
            for group in self.groups().filter(|g| g.is_default == is_default) {
                let mut found = Vec::new();
                for layer in group.layers.iter().filter(|l| l.is_all_under() == all_under) {
                    collect(layer, &mut found);
                }
                if !found.is_empty() {
                    dedup(&mut found);
                    return found;
                }
            }
        }
        Vec::new()
    }

    pub fn find_classifier(&self, env: &ResolveEnv, name: Name) -> ScopeLookup {
        let mut found = self.first_match(|layer, out| layer.classifiers(env, name, out));
        match found.len() {
            0 => ScopeLookup::NotFound,
            1 => ScopeLookup::Found(found.remove(0)),
            _ => ScopeLookup::Ambiguous(found),
        }
    }

    /// Functions and properties; overloads come back together.
    pub fn find_values(&self, env: &ResolveEnv, name: Name) -> Vec<Target> {
        self.first_match(|layer, out| layer.values(env, name, out))
    }
}

// ============================================================================
// LEXICAL SCOPE
// ============================================================================

/// A node of a lexical scope chain.
#[derive(Clone, Debug)]
pub struct LexicalScope {
    requester: Requester,
    parent: Option<Arc<LexicalScope>>,
    importing: Option<Arc<ImportingScope>>,
    locals: FxHashMap<Name, Vec<DeclId>>,
}

impl LexicalScope {
    /// The root scope of a unit.
    pub fn file(requester: Requester, importing: Option<Arc<ImportingScope>>) -> Self {
        Self {
            requester,
            parent: None,
            importing,
            locals: FxHashMap::default(),
        }
    }

    /// A nested scope owned by `requester`.
    pub fn child(parent: &Arc<LexicalScope>, requester: Requester) -> Self {
        Self {
            requester,
            parent: Some(Arc::clone(parent)),
            importing: None,
            locals: FxHashMap::default(),
        }
    }

    pub fn with_local(mut self, name: Name, decl: DeclId) -> Self {
        self.locals.entry(name).or_default().push(decl);
        self
    }

    /// Put `importing` on top of `previous`, sharing the whole previous chain.
    /// The previous importing scope stays reachable as `importing`'s parent.
    pub fn graft_importing(previous: &Arc<LexicalScope>, importing: Arc<ImportingScope>) -> Arc<LexicalScope> {
        Arc::new(Self {
            requester: previous.requester,
            parent: Some(Arc::clone(previous)),
            importing: Some(importing),
            locals: FxHashMap::default(),
        })
    }

    pub fn requester(&self) -> &Requester {
        &self.requester
    }

    pub fn parent(&self) -> Option<&Arc<LexicalScope>> {
        self.parent.as_ref()
    }

    /// This node and its ancestors, innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = &LexicalScope> {
        iter::successors(Some(self), |scope| scope.parent.as_deref())
    }

    /// The innermost importing scope on the chain.
    pub fn importing_scope(&self) -> Option<&Arc<ImportingScope>> {
        self.ancestors().find_map(|scope| scope.importing.as_ref())
    }

    fn local(&self, env: &ResolveEnv, name: Name, keep: fn(&Declaration) -> bool) -> Vec<Target> {
        self.locals
            .get(&name)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&id| keep(env.declaration(id)))
            .map(Target::from)
            .collect()
    }

    pub fn find_classifier(&self, env: &ResolveEnv, name: Name) -> ScopeLookup {
        for scope in self.ancestors() {
            if let Some(&first) = scope.local(env, name, Declaration::is_class).first() {
                return ScopeLookup::Found(first);
            }
        }
        match self.importing_scope() {
            Some(importing) => importing.find_classifier(env, name),
            None => ScopeLookup::NotFound,
        }
    }

    pub fn find_values(&self, env: &ResolveEnv, name: Name) -> Vec<Target> {
        for scope in self.ancestors() {
            let found = scope.local(env, name, Declaration::is_value);
            if !found.is_empty() {
                return found;
            }
        }
        self.importing_scope()
            .map(|importing| importing.find_values(env, name))
            .unwrap_or_default()
    }

    pub fn contains_function_or_variable(&self, env: &ResolveEnv, name: Name) -> bool {
        !self.find_values(env, name).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Interner;
    use crate::hir::decl::{ClassKind, Visibility};
    use crate::hir::ids::ModuleId;
    use crate::hir::namespace::ModuleNamespace;

    struct Fixture {
        env: ResolveEnv,
        pkg: DeclId,
        lib: DeclId,
        other: DeclId,
        a: Name,
    }

    fn make_fixture() -> Fixture {
        let mut ns = ModuleNamespace::new(Arc::new(Interner::new()));
        let pkg = ns.add_package("app");
        let lib = ns.add_package("lib");
        let other = ns.add_package("other");
        ns.add_class(lib, "A", ClassKind::Class);
        ns.add_class(other, "A", ClassKind::Class);
        ns.add_function(lib, "a");
        let a = ns.intern("A");
        Fixture {
            env: ResolveEnv::new(Arc::new(ns)),
            pkg,
            lib,
            other,
            a,
        }
    }

    fn classifier(f: &Fixture, pkg: DeclId) -> Target {
        Target::from(f.env.namespace.classifier(pkg, MemberScope::Package, f.a).unwrap())
    }

    fn all_under(container: DeclId) -> ImportLayer {
        ImportLayer::AllUnder {
            container,
            requester: None,
        }
    }

    #[test]
    fn test_single_beats_all_under_regardless_of_stack_order() {
        let f = make_fixture();
        let from_other = classifier(&f, f.other);
        let bottom = Arc::new(ImportingScope::explicit(
            vec![ImportLayer::Single {
                alias: f.a,
                targets: vec![from_other],
            }],
            None,
        ));
        let top = ImportingScope::explicit(vec![all_under(f.lib)], Some(bottom));

        assert_eq!(top.find_classifier(&f.env, f.a), ScopeLookup::Found(from_other));
    }

    #[test]
    fn test_same_precedence_is_ambiguous() {
        let f = make_fixture();
        let scope = ImportingScope::explicit(vec![all_under(f.lib), all_under(f.other)], None);

        assert_eq!(
            scope.find_classifier(&f.env, f.a),
            ScopeLookup::Ambiguous(vec![classifier(&f, f.lib), classifier(&f, f.other)])
        );
    }

    #[test]
    fn test_explicit_beats_default() {
        let f = make_fixture();
        let defaults = Arc::new(ImportingScope::default_imports(vec![all_under(f.lib)], None));
        let scope = ImportingScope::explicit(vec![all_under(f.other)], Some(defaults));

        assert_eq!(scope.find_classifier(&f.env, f.a), ScopeLookup::Found(classifier(&f, f.other)));
    }

    #[test]
    fn test_all_under_hides_invisible_members() {
        let mut ns = ModuleNamespace::new(Arc::new(Interner::new()));
        let lib = ns.add_package("lib");
        let hidden = ns.add_class(lib, "H", ClassKind::Class);
        ns.set_visibility(hidden, Visibility::Private);
        let h = ns.intern("H");
        let env = ResolveEnv::new(Arc::new(ns));

        let requester = Requester::new(lib, ModuleId::new(0));
        let scope = ImportingScope::explicit(
            vec![ImportLayer::AllUnder {
                container: lib,
                requester: Some(requester),
            }],
            None,
        );
        assert_eq!(scope.find_classifier(&env, h), ScopeLookup::NotFound);
    }

    #[test]
    fn test_locals_walk_before_imports() {
        let f = make_fixture();
        let name = f.env.namespace.interner().intern("a");
        let imported = f.env.namespace.functions(f.lib, MemberScope::Package, name);
        let importing = Arc::new(ImportingScope::explicit(vec![all_under(f.lib)], None));
        let requester = Requester::new(f.pkg, ModuleId::new(0));

        let root = Arc::new(LexicalScope::file(requester, Some(importing)));
        assert_eq!(root.find_values(&f.env, name), vec![Target::from(imported[0])]);

        let local = f.env.namespace.classifier(f.other, MemberScope::Package, f.a).unwrap();
        let inner = LexicalScope::child(&root, requester).with_local(f.a, local);
        assert_eq!(inner.find_classifier(&f.env, f.a), ScopeLookup::Found(local.into()));
        assert!(inner.contains_function_or_variable(&f.env, name));
        assert!(inner.importing_scope().is_some());
    }

    #[test]
    fn test_graft_keeps_previous_chain() {
        let f = make_fixture();
        let requester = Requester::new(f.pkg, ModuleId::new(0));
        let old = Arc::new(ImportingScope::explicit(vec![all_under(f.lib)], None));
        let previous = Arc::new(LexicalScope::file(requester, Some(Arc::clone(&old))));

        let fresh = Arc::new(ImportingScope::explicit(vec![all_under(f.other)], Some(old)));
        let grafted = LexicalScope::graft_importing(&previous, Arc::clone(&fresh));

        assert!(Arc::ptr_eq(grafted.importing_scope().unwrap(), &fresh));
        assert!(Arc::ptr_eq(grafted.parent().unwrap(), &previous));
        assert_eq!(grafted.find_classifier(&f.env, f.a), ScopeLookup::Found(classifier(&f, f.other)));
    }
}
