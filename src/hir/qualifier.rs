//! Qualifier paths: a syntax chain flattened into outermost-first segments.
//!
//! Builders never fail. A link without a usable identifier sets
//! [`QualifierPath::has_error`] and collection carries on with the rest of
//! the chain.

use crate::base::{Name, TextRange};
use crate::syntax::{CallOp, NodeId, SyntaxNode, SyntaxTree};

use super::binding::BindingTrace;
use super::diagnostics::DiagnosticKind;

/// One dotted segment of a qualifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualifierSegment {
    pub name: Name,
    /// The name node this segment was read from; bindings are recorded here.
    pub node: NodeId,
    pub range: TextRange,
    pub type_arguments: Option<NodeId>,
}

impl QualifierSegment {
    pub fn has_type_arguments(&self) -> bool {
        self.type_arguments.is_some()
    }
}

/// Segments ordered outermost-first, e.g. `a`, `b`, `C` for `a.b.C`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QualifierPath {
    pub segments: Vec<QualifierSegment>,
    pub has_error: bool,
}

impl QualifierPath {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn names(&self) -> Vec<Name> {
        self.segments.iter().map(|s| s.name).collect()
    }

    /// All segments but the last, and the last.
    pub fn split_last(&self) -> Option<(&QualifierSegment, &[QualifierSegment])> {
        self.segments.split_last()
    }

    fn segment(tree: &SyntaxTree, node: NodeId, type_arguments: Option<NodeId>) -> Option<QualifierSegment> {
        tree.name_of(node).map(|name| QualifierSegment {
            name,
            node,
            range: tree.range(node),
            type_arguments,
        })
    }

    fn push_or_flag(&mut self, segment: Option<QualifierSegment>) {
        match segment {
            Some(segment) => self.segments.push(segment),
            None => self.has_error = true,
        }
    }

    /// Flatten a dotted user type `a.b.C<T>`.
    pub fn from_user_type(tree: &SyntaxTree, user_type: NodeId) -> Self {
        let mut path = Self::default();
        let mut current = Some(user_type);
        while let Some(id) = current {
            match tree.node(id) {
                SyntaxNode::UserType {
                    qualifier,
                    reference,
                    type_arguments,
                    ..
                } => {
                    let segment = reference.and_then(|r| Self::segment(tree, r, *type_arguments));
                    path.push_or_flag(segment);
                    current = *qualifier;
                }
                _ => {
                    path.has_error = true;
                    current = None;
                }
            }
        }
        path.segments.reverse();
        path
    }

    /// Flatten a receiver chain `a.b.c` (an import path, or an expression
    /// prefix). A `?.` link is reported but its segments are still collected.
    pub fn from_receiver_chain(tree: &SyntaxTree, expression: NodeId, trace: &mut dyn BindingTrace) -> Self {
        let mut path = Self::default();
        let mut current = Some(expression);
        while let Some(id) = current {
            match tree.node(id) {
                SyntaxNode::Qualified {
                    receiver,
                    selector,
                    op,
                    op_range,
                    ..
                } => {
                    if *op == CallOp::SafeDot {
                        trace.report(*op_range, DiagnosticKind::SafeCallInQualifier);
                    }
                    let segment = selector.and_then(|s| Self::segment(tree, s, None));
                    path.push_or_flag(segment);
                    current = Some(*receiver);
                }
                SyntaxNode::NameRef { .. } => {
                    path.push_or_flag(Self::segment(tree, id, None));
                    current = None;
                }
                _ => {
                    path.has_error = true;
                    current = None;
                }
            }
        }
        path.segments.reverse();
        path
    }
}

/// Whether the leftmost link of a user type carries the root-package marker.
pub fn starts_with_root(tree: &SyntaxTree, user_type: NodeId) -> bool {
    let mut current = user_type;
    loop {
        match tree.node(current) {
            SyntaxNode::UserType {
                qualifier: Some(next),
                ..
            } => current = *next,
            SyntaxNode::UserType { root_marker, .. } => return *root_marker,
            _ => return false,
        }
    }
}

/// The qualified-expression nodes of a chain, innermost (leftmost) first.
/// `a.b.c` yields `[a.b, a.b.c]`; a non-qualified node yields nothing.
pub fn unroll_to_leftmost(tree: &SyntaxTree, expression: NodeId) -> Vec<NodeId> {
    let mut unrolled = Vec::new();
    let mut current = expression;
    while let SyntaxNode::Qualified { receiver, .. } = tree.node(current) {
        unrolled.push(current);
        current = *receiver;
    }
    unrolled.reverse();
    unrolled
}

/// The longest prefix of an unrolled chain that could be a qualifier:
/// the leftmost receiver, then selectors up to the first `?.` link or
/// first selector that is not a simple name. The outermost selector is
/// never part of it; it is what the expression itself resolves to.
pub fn max_possible_qualifier_prefix(tree: &SyntaxTree, unrolled: &[NodeId]) -> QualifierPath {
    let mut path = QualifierPath::default();
    let Some((&leftmost, _)) = unrolled.split_first() else {
        return path;
    };
    let SyntaxNode::Qualified { receiver, .. } = tree.node(leftmost) else {
        return path;
    };
    let Some(first) = QualifierPath::segment(tree, *receiver, None) else {
        return path;
    };
    path.segments.push(first);

    for &qualified in &unrolled[..unrolled.len() - 1] {
        let SyntaxNode::Qualified { selector, op, .. } = tree.node(qualified) else {
            break;
        };
        if *op != CallOp::Dot {
            break;
        }
        match selector.and_then(|s| QualifierPath::segment(tree, s, None)) {
            Some(segment) => path.segments.push(segment),
            None => break,
        }
    }
    path
}
