//! Declarations, scopes and qualified-name resolution.
//!
//! Layering, bottom-up:
//!
//! - [`NamespaceProvider`] exposes packages, classes and members
//! - [`narrow`] and [`VisibilityOracle`] filter same-named candidates
//! - [`QualifiedExpressionResolver`] walks qualifier paths and imports
//! - [`FileScopeProvider`] builds and caches each unit's scopes
//! - [`Session`] chains units submitted one at a time

mod binding;
mod decl;
mod diagnostics;
mod file_scope;
mod ids;
mod imports;
mod input;
mod namespace;
mod qualifier;
mod resolve;
mod scope;
mod session;
mod visibility;

pub use binding::{BindingTable, BindingTrace, DiscardTrace, Trace};
pub use decl::{
    ClassDecl, ClassKind, Declaration, MemberDecl, PackageDecl, Qualifier, Requester, ResolutionOutcome, Target,
    Visibility,
};
pub use diagnostics::{Diagnostic, DiagnosticCollector, DiagnosticKind, Severity, codes};
pub use file_scope::{FileScopeFactory, FileScopeProvider, FileScopes, ImportResolver};
pub use ids::{DeclId, ModuleId};
pub use input::SourceUnit;
pub use namespace::{MemberScope, ModuleNamespace, NamespaceProvider, PackageView};
pub use qualifier::{
    QualifierPath, QualifierSegment, max_possible_qualifier_prefix, starts_with_root, unroll_to_leftmost,
};
pub use resolve::{
    ExpressionQualifier, PrefixResolution, QualifiedExpressionResolver, QualifierPosition, TypeQualifierResolution,
};
pub use scope::{ImportLayer, ImportingScope, LexicalScope, ScopeLookup};
pub use session::{LineId, LineState, Session, SessionError, SessionLine};
pub use visibility::{LatticeVisibility, Narrowed, ResolveEnv, VisibilityOracle, is_visible, narrow};
