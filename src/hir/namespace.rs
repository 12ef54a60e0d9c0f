//! Namespace provider: packages, classes and their members.
//!
//! The resolver only sees the namespace through [`NamespaceProvider`].
//! [`ModuleNamespace`] is the in-memory implementation hosts populate from
//! their declaration collection pass (and tests populate by hand).

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::base::{FileId, FqName, Interner, Name};

use super::decl::{ClassDecl, ClassKind, Declaration, MemberDecl, PackageDecl, Visibility};
use super::ids::{DeclId, ModuleId};

/// Which member table of a declaration a lookup reads.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberScope {
    /// Top-level classifiers, functions and properties of a package.
    Package,
    /// Nested and inner classifiers of a class.
    InnerClasses,
    /// Static functions and properties of a class.
    Static,
    /// Instance functions and properties of a class.
    Instance,
}

/// Result of a package lookup. Never absent: unknown packages are empty views.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageView {
    pub fq_name: FqName,
    pub id: Option<DeclId>,
}

impl PackageView {
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
    }
}

/// Read access to a lazily or eagerly computed namespace.
pub trait NamespaceProvider: Send + Sync {
    fn interner(&self) -> &Interner;

    fn root_package(&self) -> DeclId;

    fn package(&self, fq_name: &FqName) -> PackageView;

    fn declaration(&self, id: DeclId) -> &Declaration;

    /// The first classifier named `name` in `owner`'s `scope` table.
    fn classifier(&self, owner: DeclId, scope: MemberScope, name: Name) -> Option<DeclId>;

    fn functions(&self, owner: DeclId, scope: MemberScope, name: Name) -> Vec<DeclId>;

    fn properties(&self, owner: DeclId, scope: MemberScope, name: Name) -> Vec<DeclId>;
}

// ============================================================================
// IN-MEMORY NAMESPACE
// ============================================================================

/// An in-memory namespace for one module plus whatever it depends on.
///
/// Member tables are insertion-ordered, so "the first candidate" of a name
/// is the first one added.
#[derive(Debug)]
pub struct ModuleNamespace {
    interner: Arc<Interner>,
    default_module: ModuleId,
    decls: Vec<Declaration>,
    packages: FxHashMap<FqName, DeclId>,
    members: FxHashMap<(DeclId, MemberScope), IndexMap<Name, Vec<DeclId>>>,
}

impl ModuleNamespace {
    /// Create a namespace containing only the root package.
    pub fn new(interner: Arc<Interner>) -> Self {
        let mut namespace = Self {
            interner,
            default_module: ModuleId::default(),
            decls: Vec::new(),
            packages: FxHashMap::default(),
            members: FxHashMap::default(),
        };
        let root = namespace.push(Declaration::Package(PackageDecl {
            fq_name: FqName::root(),
            parent: None,
        }));
        namespace.packages.insert(FqName::root(), root);
        namespace
    }

    /// Module assigned to declarations added from now on.
    pub fn with_default_module(mut self, module: ModuleId) -> Self {
        self.default_module = module;
        self
    }

    pub fn interner_arc(&self) -> &Arc<Interner> {
        &self.interner
    }

    pub fn intern(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    fn push(&mut self, declaration: Declaration) -> DeclId {
        let id = DeclId::new(self.decls.len() as u32);
        self.decls.push(declaration);
        id
    }

    fn register(&mut self, owner: DeclId, scope: MemberScope, name: Name, id: DeclId) {
        self.members
            .entry((owner, scope))
            .or_default()
            .entry(name)
            .or_default()
            .push(id);
    }

    /// Add a package and every missing ancestor; returns the package.
    pub fn add_package(&mut self, dotted: &str) -> DeclId {
        let fq_name = FqName::parse(&self.interner, dotted);
        let mut parent = self.root_package();
        let mut current = FqName::root();
        for &segment in fq_name.segments() {
            current = current.child(segment);
            parent = match self.packages.get(&current) {
                Some(&existing) => existing,
                None => {
                    let id = self.push(Declaration::Package(PackageDecl {
                        fq_name: current.clone(),
                        parent: Some(parent),
                    }));
                    self.packages.insert(current.clone(), id);
                    id
                }
            };
        }
        parent
    }

    /// The declared scope for a classifier or member under `container`.
    fn scope_for(&self, container: DeclId, is_static: bool, is_classifier: bool) -> MemberScope {
        match &self.decls[container.index()] {
            Declaration::Package(_) => MemberScope::Package,
            _ if is_classifier => MemberScope::InnerClasses,
            _ if is_static => MemberScope::Static,
            _ => MemberScope::Instance,
        }
    }

    /// Add a public classifier to a package or class.
    pub fn add_class(&mut self, container: DeclId, name: &str, kind: ClassKind) -> DeclId {
        let name = self.interner.intern(name);
        let id = self.push(Declaration::Class(ClassDecl {
            name,
            kind,
            visibility: Visibility::Public,
            container,
            module: self.default_module,
            source: None,
        }));
        let scope = self.scope_for(container, false, true);
        self.register(container, scope, name, id);
        id
    }

    fn add_member(&mut self, container: DeclId, name: &str, is_function: bool, is_static: bool) -> DeclId {
        let name = self.interner.intern(name);
        let member = MemberDecl {
            name,
            visibility: Visibility::Public,
            container,
            module: self.default_module,
            source: None,
            is_static,
        };
        let id = self.push(if is_function {
            Declaration::Function(member)
        } else {
            Declaration::Property(member)
        });
        let scope = self.scope_for(container, is_static, false);
        self.register(container, scope, name, id);
        id
    }

    /// Add a public top-level function (package) or instance function (class).
    pub fn add_function(&mut self, container: DeclId, name: &str) -> DeclId {
        self.add_member(container, name, true, false)
    }

    /// Add a public top-level or instance property.
    pub fn add_property(&mut self, container: DeclId, name: &str) -> DeclId {
        self.add_member(container, name, false, false)
    }

    /// Add a public static function to a class.
    pub fn add_static_function(&mut self, class: DeclId, name: &str) -> DeclId {
        self.add_member(class, name, true, true)
    }

    /// Add a public static property to a class.
    pub fn add_static_property(&mut self, class: DeclId, name: &str) -> DeclId {
        self.add_member(class, name, false, true)
    }

    pub fn set_visibility(&mut self, id: DeclId, visibility: Visibility) {
        self.decls[id.index()].set_visibility(visibility);
    }

    pub fn set_module(&mut self, id: DeclId, module: ModuleId) {
        self.decls[id.index()].set_module(module);
    }

    pub fn set_source(&mut self, id: DeclId, file: FileId) {
        self.decls[id.index()].set_source(file);
    }

    fn named(&self, owner: DeclId, scope: MemberScope, name: Name) -> &[DeclId] {
        self.members
            .get(&(owner, scope))
            .and_then(|table| table.get(&name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn named_where(
        &self,
        owner: DeclId,
        scope: MemberScope,
        name: Name,
        keep: fn(&Declaration) -> bool,
    ) -> Vec<DeclId> {
        self.named(owner, scope, name)
            .iter()
            .copied()
            .filter(|&id| keep(&self.decls[id.index()]))
            .collect()
    }
}

impl NamespaceProvider for ModuleNamespace {
    fn interner(&self) -> &Interner {
        &self.interner
    }

    fn root_package(&self) -> DeclId {
        DeclId::new(0)
    }

    fn package(&self, fq_name: &FqName) -> PackageView {
        PackageView {
            fq_name: fq_name.clone(),
            id: self.packages.get(fq_name).copied(),
        }
    }

    fn declaration(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }

    fn classifier(&self, owner: DeclId, scope: MemberScope, name: Name) -> Option<DeclId> {
        self.named(owner, scope, name)
            .iter()
            .copied()
            .find(|&id| self.decls[id.index()].is_class())
    }

    fn functions(&self, owner: DeclId, scope: MemberScope, name: Name) -> Vec<DeclId> {
        self.named_where(owner, scope, name, |d| matches!(d, Declaration::Function(_)))
    }

    fn properties(&self, owner: DeclId, scope: MemberScope, name: Name) -> Vec<DeclId> {
        self.named_where(owner, scope, name, |d| matches!(d, Declaration::Property(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_namespace() -> ModuleNamespace {
        ModuleNamespace::new(Arc::new(Interner::new()))
    }

    #[test]
    fn test_add_package_creates_ancestors() {
        let mut ns = make_namespace();
        let abc = ns.add_package("a.b.c");

        let ab = ns.package(&FqName::parse(ns.interner(), "a.b"));
        assert!(!ab.is_empty());
        assert_eq!(ns.declaration(abc).container(), ab.id);

        let again = ns.add_package("a.b.c");
        assert_eq!(abc, again);
    }

    #[test]
    fn test_unknown_package_is_empty_view() {
        let ns = make_namespace();
        let view = ns.package(&FqName::parse(ns.interner(), "nowhere"));
        assert!(view.is_empty());
        assert!(!ns.package(&FqName::root()).is_empty());
    }

    #[test]
    fn test_member_scopes_are_separate() {
        let mut ns = make_namespace();
        let pkg = ns.add_package("p");
        let class = ns.add_class(pkg, "C", ClassKind::Class);
        let nested = ns.add_class(class, "N", ClassKind::Class);
        let stat = ns.add_static_function(class, "f");
        let inst = ns.add_function(class, "f");
        let top = ns.add_property(pkg, "x");

        let f = ns.intern("f");
        assert_eq!(ns.classifier(pkg, MemberScope::Package, ns.intern("C")), Some(class));
        assert_eq!(ns.classifier(class, MemberScope::InnerClasses, ns.intern("N")), Some(nested));
        assert_eq!(ns.functions(class, MemberScope::Static, f), vec![stat]);
        assert_eq!(ns.functions(class, MemberScope::Instance, f), vec![inst]);
        assert_eq!(ns.properties(pkg, MemberScope::Package, ns.intern("x")), vec![top]);
        assert!(ns.functions(pkg, MemberScope::Package, f).is_empty());
    }

    #[test]
    fn test_overloads_keep_insertion_order() {
        let mut ns = make_namespace();
        let pkg = ns.add_package("p");
        let first = ns.add_function(pkg, "g");
        let second = ns.add_function(pkg, "g");

        assert_eq!(ns.functions(pkg, MemberScope::Package, ns.intern("g")), vec![first, second]);
    }

    #[test]
    fn test_setters_update_declaration() {
        let mut ns = make_namespace().with_default_module(ModuleId::new(2));
        let pkg = ns.add_package("p");
        let class = ns.add_class(pkg, "C", ClassKind::Class);
        ns.set_visibility(class, Visibility::Internal);
        ns.set_source(class, FileId::new(9));

        let decl = ns.declaration(class);
        assert_eq!(decl.visibility(), Some(Visibility::Internal));
        assert_eq!(decl.module(), Some(ModuleId::new(2)));
        assert_eq!(decl.source(), Some(FileId::new(9)));
    }
}
