//! # qualres-base
//!
//! Qualified-name resolution for a language front end: dotted identifier
//! chains in imports, type references and receiver-chained expressions are
//! turned into packages, classes and members.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! hir     → declarations, namespace walks, scopes, REPL sessions
//!   ↓
//! syntax  → arena syntax tree for qualifier chains and directives
//!   ↓
//! base    → primitives (FileId, TextRange, Name interning, FqName)
//! ```

/// Foundation types: FileId, spans, Name interning, FqName
pub mod base;

/// Syntax tree consumed by the resolver
pub mod syntax;

/// Declarations, scopes and the qualified-name resolver
pub mod hir;

pub use base::{FileId, FqName, Interner, LineCol, LineIndex, Name, TextRange, TextSize};
