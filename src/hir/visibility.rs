//! Visibility checks and same-name candidate narrowing.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::decl::{Declaration, Requester, Target, Visibility};
use super::ids::{DeclId, ModuleId};
use super::namespace::NamespaceProvider;

/// Decides whether a declaration can be seen from a requester.
///
/// Swapping the oracle changes access policy (friend modules, package
/// access) without touching [`narrow`].
pub trait VisibilityOracle: Send + Sync {
    fn is_visible_from(&self, ns: &dyn NamespaceProvider, decl: DeclId, requester: &Requester) -> bool;
}

/// The default visibility lattice.
///
/// - `internal`: same module, or a module declared friend of it
/// - `private` top-level: same source file
/// - `private`, `protected` and local members: the requester sits inside the
///   declaring container
#[derive(Clone, Debug, Default)]
pub struct LatticeVisibility {
    friends: FxHashSet<(ModuleId, ModuleId)>,
}

impl LatticeVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `internal` declarations of `module` be seen from `friend`.
    pub fn with_friend_modules(mut self, module: ModuleId, friend: ModuleId) -> Self {
        self.friends.insert((module, friend));
        self
    }

    fn same_or_friend(&self, declared: ModuleId, from: ModuleId) -> bool {
        declared == from || self.friends.contains(&(declared, from))
    }
}

/// Whether `container` is `start` or one of its containers.
fn encloses(ns: &dyn NamespaceProvider, container: DeclId, start: DeclId) -> bool {
    let mut current = Some(start);
    while let Some(id) = current {
        if id == container {
            return true;
        }
        current = ns.declaration(id).container();
    }
    false
}

impl VisibilityOracle for LatticeVisibility {
    fn is_visible_from(&self, ns: &dyn NamespaceProvider, decl: DeclId, requester: &Requester) -> bool {
        let declaration = ns.declaration(decl);
        let Some(visibility) = declaration.visibility() else {
            return true;
        };
        let container = declaration.container();
        match visibility {
            Visibility::Public => true,
            Visibility::Internal => declaration
                .module()
                .is_none_or(|module| self.same_or_friend(module, requester.module)),
            Visibility::Private => match container {
                Some(container) if ns.declaration(container).is_package() => {
                    declaration.source().is_some() && declaration.source() == requester.file
                }
                Some(container) => encloses(ns, container, requester.owner),
                None => false,
            },
            Visibility::Protected | Visibility::Local => {
                container.is_some_and(|container| encloses(ns, container, requester.owner))
            }
        }
    }
}

/// Everything the resolver needs to look at declarations.
#[derive(Clone)]
pub struct ResolveEnv {
    pub namespace: Arc<dyn NamespaceProvider>,
    pub visibility: Arc<dyn VisibilityOracle>,
}

impl ResolveEnv {
    pub fn new(namespace: Arc<dyn NamespaceProvider>) -> Self {
        Self {
            namespace,
            visibility: Arc::new(LatticeVisibility::new()),
        }
    }

    pub fn declaration(&self, id: DeclId) -> &Declaration {
        self.namespace.declaration(id)
    }

    pub fn is_visible(&self, target: Target, requester: Option<&Requester>, in_import: bool) -> bool {
        is_visible(
            self.visibility.as_ref(),
            self.namespace.as_ref(),
            target,
            requester,
            in_import,
        )
    }

    pub fn narrow(&self, candidates: &[Target], requester: Option<&Requester>, in_import: bool) -> Narrowed {
        narrow(
            self.visibility.as_ref(),
            self.namespace.as_ref(),
            candidates,
            requester,
            in_import,
        )
    }
}

impl std::fmt::Debug for ResolveEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveEnv").finish_non_exhaustive()
    }
}

/// Visibility predicate shared by narrowing and all-under import layers.
pub fn is_visible(
    oracle: &dyn VisibilityOracle,
    ns: &dyn NamespaceProvider,
    target: Target,
    requester: Option<&Requester>,
    in_import: bool,
) -> bool {
    let Some(requester) = requester else {
        return true;
    };
    let Some(visibility) = ns.declaration(target.decl()).visibility() else {
        return true;
    };
    if in_import {
        if visibility.is_private_like() {
            return false;
        }
        if !visibility.must_check_in_imports() {
            return true;
        }
    }
    oracle.is_visible_from(ns, target.decl(), requester)
}

/// Result of narrowing a set of same-named candidates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Narrowed {
    Unique(Target),
    /// The visible survivors, two or more.
    Ambiguous(Vec<Target>),
    /// Nothing visible; carries the first candidate.
    Invisible(Target),
    /// No candidates at all.
    Unresolved,
}

pub fn narrow(
    oracle: &dyn VisibilityOracle,
    ns: &dyn NamespaceProvider,
    candidates: &[Target],
    requester: Option<&Requester>,
    in_import: bool,
) -> Narrowed {
    let Some(&first) = candidates.first() else {
        return Narrowed::Unresolved;
    };
    let mut visible: Vec<Target> = candidates
        .iter()
        .copied()
        .filter(|&target| is_visible(oracle, ns, target, requester, in_import))
        .collect();
    match visible.len() {
        0 => Narrowed::Invisible(first),
        1 => Narrowed::Unique(visible.remove(0)),
        _ => Narrowed::Ambiguous(visible),
    }
}
