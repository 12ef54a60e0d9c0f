//! Arena syntax tree for qualifier chains, user types and file directives.
//!
//! Only the node shapes the resolver inspects are modelled. Nodes are
//! immutable once pushed and identified by [`NodeId`]; ranges are synthetic
//! offsets assigned by the builder methods so every node has a distinct,
//! ordered location.

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::{FileId, Interner, Name, TextRange, TextSize, is_identifier};

/// Identity of a node within one [`SyntaxTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// The link operator of a qualified expression.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CallOp {
    /// `a.b`
    Dot,
    /// `a?.b`
    SafeDot,
}

/// A syntax node.
#[derive(Clone, Debug)]
pub enum SyntaxNode {
    /// A simple name. `name` is `None` when the text is not an identifier
    /// (error recovery left a placeholder).
    NameRef {
        name: Option<Name>,
        text: SmolStr,
        range: TextRange,
    },
    /// `receiver.selector` or `receiver?.selector`.
    Qualified {
        receiver: NodeId,
        selector: Option<NodeId>,
        op: CallOp,
        op_range: TextRange,
        range: TextRange,
    },
    /// `callee(...)`: a selector that is not a simple name.
    Call { callee: NodeId, range: TextRange },
    /// A user type: `qualifier.reference<type_arguments>`.
    UserType {
        qualifier: Option<NodeId>,
        reference: Option<NodeId>,
        type_arguments: Option<NodeId>,
        /// Leading root-package marker on the leftmost link.
        root_marker: bool,
        range: TextRange,
    },
    /// `<A, B>`
    TypeArguments { arguments: Vec<NodeId>, range: TextRange },
    /// `import path[.*] [as alias]`
    ImportDirective {
        path: Option<NodeId>,
        all_under: bool,
        alias: Option<Name>,
        range: TextRange,
    },
    /// `package a.b.c`
    PackageDirective { names: Vec<NodeId>, range: TextRange },
}

impl SyntaxNode {
    pub fn range(&self) -> TextRange {
        match self {
            SyntaxNode::NameRef { range, .. }
            | SyntaxNode::Qualified { range, .. }
            | SyntaxNode::Call { range, .. }
            | SyntaxNode::UserType { range, .. }
            | SyntaxNode::TypeArguments { range, .. }
            | SyntaxNode::ImportDirective { range, .. }
            | SyntaxNode::PackageDirective { range, .. } => *range,
        }
    }
}

/// The syntax of one compilation unit.
pub struct SyntaxTree {
    file: FileId,
    interner: Arc<Interner>,
    nodes: Vec<SyntaxNode>,
    package_directive: Option<NodeId>,
    imports: Vec<NodeId>,
    cursor: TextSize,
}

impl SyntaxTree {
    pub fn new(file: FileId, interner: Arc<Interner>) -> Self {
        Self {
            file,
            interner,
            nodes: Vec::new(),
            package_directive: None,
            imports: Vec::new(),
            cursor: TextSize::from(0),
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn interner(&self) -> &Arc<Interner> {
        &self.interner
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.0 as usize]
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.node(id).range()
    }

    pub fn package_directive(&self) -> Option<NodeId> {
        self.package_directive
    }

    pub fn import_directives(&self) -> &[NodeId] {
        &self.imports
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The referenced name of a `NameRef` node.
    pub fn name_of(&self, id: NodeId) -> Option<Name> {
        match self.node(id) {
            SyntaxNode::NameRef { name, .. } => *name,
            _ => None,
        }
    }

    pub fn is_name_ref(&self, id: NodeId) -> bool {
        matches!(self.node(id), SyntaxNode::NameRef { .. })
    }

    // ========================================================================
    // BUILDERS
    // ========================================================================

    fn push(&mut self, node: SyntaxNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Reserve `len` bytes of synthetic text plus one separator.
    fn take_range(&mut self, len: usize) -> TextRange {
        let start = self.cursor;
        let end = start + TextSize::from(len as u32);
        self.cursor = end + TextSize::from(1);
        TextRange::new(start, end)
    }

    fn span(&self, first: NodeId, last: NodeId) -> TextRange {
        self.range(first).cover(self.range(last))
    }

    pub fn name_ref(&mut self, text: &str) -> NodeId {
        let name = is_identifier(text).then(|| self.interner.intern(text));
        let range = self.take_range(text.len());
        self.push(SyntaxNode::NameRef {
            name,
            text: SmolStr::new(text),
            range,
        })
    }

    pub fn qualified(&mut self, receiver: NodeId, selector: Option<NodeId>, op: CallOp) -> NodeId {
        let op_range = TextRange::at(self.range(receiver).end(), TextSize::from(1));
        let range = match selector {
            Some(selector) => self.span(receiver, selector),
            None => self.range(receiver).cover(op_range),
        };
        self.push(SyntaxNode::Qualified {
            receiver,
            selector,
            op,
            op_range,
            range,
        })
    }

    pub fn call(&mut self, callee: NodeId) -> NodeId {
        let range = self.range(callee);
        self.push(SyntaxNode::Call { callee, range })
    }

    /// A dotted expression `a.b.c`, left-associative: `((a).b).c`.
    pub fn dotted(&mut self, path: &str) -> NodeId {
        self.chain(path, &[])
    }

    /// A dotted expression where the links after the listed segment
    /// indices use `?.`. `chain("a.b.c", &[0])` is `a?.b.c`.
    pub fn chain(&mut self, path: &str, safe_after: &[usize]) -> NodeId {
        let mut parts = path.split('.');
        let first = parts.next().unwrap_or_default();
        let mut expr = self.name_ref(first);
        for (i, part) in parts.enumerate() {
            let selector = self.name_ref(part);
            let op = if safe_after.contains(&i) {
                CallOp::SafeDot
            } else {
                CallOp::Dot
            };
            expr = self.qualified(expr, Some(selector), op);
        }
        expr
    }

    pub fn type_arguments(&mut self, arguments: Vec<NodeId>) -> NodeId {
        let range = self.take_range(2);
        self.push(SyntaxNode::TypeArguments { arguments, range })
    }

    pub fn user_type(
        &mut self,
        qualifier: Option<NodeId>,
        reference: Option<NodeId>,
        type_arguments: Option<NodeId>,
    ) -> NodeId {
        let anchor = reference.or(qualifier);
        let range = match (qualifier, reference.or(type_arguments)) {
            (Some(q), Some(r)) => self.span(q, r),
            _ => anchor
                .map(|a| self.range(a))
                .unwrap_or_else(|| self.take_range(0)),
        };
        self.push(SyntaxNode::UserType {
            qualifier,
            reference,
            type_arguments,
            root_marker: false,
            range,
        })
    }

    /// A dotted user type `a.b.C` without type arguments.
    pub fn dotted_type(&mut self, path: &str) -> NodeId {
        let mut current = None;
        for part in path.split('.') {
            let reference = self.name_ref(part);
            current = Some(self.user_type(current, Some(reference), None));
        }
        current.unwrap_or_else(|| self.user_type(None, None, None))
    }

    /// Mark the leftmost link of a user type as rooted at the root package.
    pub fn mark_root(&mut self, user_type: NodeId) {
        let mut current = user_type;
        loop {
            match &mut self.nodes[current.0 as usize] {
                SyntaxNode::UserType {
                    qualifier: Some(next),
                    ..
                } => current = *next,
                SyntaxNode::UserType { root_marker, .. } => {
                    *root_marker = true;
                    return;
                }
                _ => return,
            }
        }
    }

    /// `import path[.*] [as alias]`; registered as a directive of this unit.
    pub fn import(&mut self, path: &str, all_under: bool, alias: Option<&str>) -> NodeId {
        let path = (!path.is_empty()).then(|| self.dotted(path));
        let alias = alias.map(|alias| self.interner.intern(alias));
        let range = match path {
            Some(path) => self.range(path),
            None => self.take_range(0),
        };
        let id = self.push(SyntaxNode::ImportDirective {
            path,
            all_under,
            alias,
            range,
        });
        self.imports.push(id);
        id
    }

    /// `package a.b.c`; becomes this unit's package directive.
    pub fn package(&mut self, path: &str) -> NodeId {
        let names: Vec<NodeId> = path
            .split('.')
            .filter(|part| !part.is_empty())
            .map(|part| self.name_ref(part))
            .collect();
        let range = match (names.first(), names.last()) {
            (Some(&first), Some(&last)) => self.span(first, last),
            _ => self.take_range(0),
        };
        let id = self.push(SyntaxNode::PackageDirective { names, range });
        self.package_directive = Some(id);
        id
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("file", &self.file)
            .field("nodes", &self.nodes.len())
            .field("imports", &self.imports.len())
            .finish()
    }
}
