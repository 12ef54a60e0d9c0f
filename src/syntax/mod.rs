//! Syntax consumed by the resolver.
//!
//! Lexing and parsing live outside this crate; hosts (and tests) build a
//! [`SyntaxTree`] directly with its builder methods.

mod tree;

pub use tree::{CallOp, NodeId, SyntaxNode, SyntaxTree};
