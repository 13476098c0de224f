// ==============================================================================
// Syntax Tree Arena
// ==============================================================================
//
// Nodes live in one `Vec` owned by the tree and refer to their children by
// index. There are no parent pointers; a `Node` handle is just the tree plus an
// index, so it is `Copy` and cheap to pass around.

use std::fmt::{self, Write as _};

use super::{ErrorKind, FieldName, NodeKind, Span, SyntaxError};
use crate::error::{Error, ParseDiagnostic};
use crate::model::Program;

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        // The input length limit keeps node counts far below u32::MAX.
        NodeId(u32::try_from(index).unwrap_or(u32::MAX))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) span: Span,
    pub(crate) field: Option<FieldName>,
    pub(crate) children: Vec<NodeId>,
}

/// The result of one parse: an immutable, rooted tree plus the error regions
/// recorded while building it.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    name: String,
    source: String,
    nodes: Vec<NodeData>,
    root: NodeId,
    errors: Vec<SyntaxError>,
}

impl SyntaxTree {
    pub(crate) fn new(
        name: String,
        source: String,
        nodes: Vec<NodeData>,
        root: NodeId,
        errors: Vec<SyntaxError>,
    ) -> Self {
        SyntaxTree {
            name,
            source,
            nodes,
            root,
            errors,
        }
    }

    /// The `program` node.
    pub fn root(&self) -> Node<'_> {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { tree: self, id }
    }

    /// Name used for the source in diagnostics (a path, or `<input>`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every error region, ordered by position.
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// One rich diagnostic per recorded error, ready for `miette` rendering.
    pub fn diagnostics(&self) -> Vec<ParseDiagnostic> {
        self.errors
            .iter()
            .map(|e| ParseDiagnostic::from_syntax_error(&self.name, &self.source, e))
            .collect()
    }

    /// Lower the tree into the typed model. Fails with the first recorded error
    /// if the tree contains any.
    pub fn program(&self) -> Result<Program, Error> {
        crate::reader::read_program(self)
    }

    /// The S-expression form of the whole tree.
    pub fn to_sexp(&self) -> String {
        self.root().to_sexp()
    }

    /// The JSON form of the whole tree, including its error list.
    pub fn to_json(&self) -> serde_json::Value {
        super::json::tree_to_json(self)
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

// ==============================================================================
// Node Handles
// ==============================================================================

/// A borrowed view of one node.
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.kind_name(), self.span())
    }
}

impl<'t> Node<'t> {
    fn data(&self) -> &'t NodeData {
        self.tree.data(self.id)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    /// The query name of this node: the kind name for named nodes, the source
    /// text for anonymous keyword and punctuation leaves.
    pub fn kind_name(&self) -> &'t str {
        match self.kind() {
            NodeKind::Anonymous => self.text(),
            kind => kind.as_str(),
        }
    }

    pub fn is_named(&self) -> bool {
        self.kind().is_named()
    }

    pub fn is_error(&self) -> bool {
        self.kind() == NodeKind::Error
    }

    pub fn span(&self) -> Span {
        self.data().span
    }

    pub fn text(&self) -> &'t str {
        let span = self.span();
        &self.tree.source[span.start..span.end]
    }

    /// The field label on the edge from this node's parent, if any.
    pub fn field_name(&self) -> Option<FieldName> {
        self.data().field
    }

    pub fn children(&self) -> impl ExactSizeIterator<Item = Node<'t>> + use<'t> {
        let tree = self.tree;
        self.data().children.iter().map(move |&id| tree.node(id))
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn named_children(&self) -> impl Iterator<Item = Node<'t>> + use<'t> {
        self.children().filter(Node::is_named)
    }

    /// The first child whose edge carries `field`.
    pub fn child_by_field(&self, field: FieldName) -> Option<Node<'t>> {
        self.children().find(|c| c.field_name() == Some(field))
    }

    pub fn children_by_field(&self, field: FieldName) -> impl Iterator<Item = Node<'t>> + use<'t> {
        self.children().filter(move |c| c.field_name() == Some(field))
    }

    /// The first child of the given kind.
    pub fn child_of_kind(&self, kind: NodeKind) -> Option<Node<'t>> {
        self.children().find(|c| c.kind() == kind)
    }

    /// Pre-order traversal of this node and everything below it.
    pub fn descendants(&self) -> Descendants<'t> {
        Descendants {
            tree: self.tree,
            stack: vec![self.id],
        }
    }

    /// Whether this node is, or contains, an `ERROR` node.
    pub fn has_error(&self) -> bool {
        self.descendants().any(|n| n.is_error())
    }

    /// Errors recorded for `ERROR` nodes at or below this one.
    pub fn errors(&self) -> impl Iterator<Item = &'t SyntaxError> + use<'t> {
        let span = self.span();
        let ids: Vec<NodeId> = self
            .descendants()
            .filter(Node::is_error)
            .map(|n| n.id)
            .collect();
        self.tree
            .errors
            .iter()
            .filter(move |e| span.contains(e.span) && ids.contains(&e.node))
    }

    /// The error kind recorded for this node, if it is an `ERROR` node.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        if !self.is_error() {
            return None;
        }
        self.tree
            .errors
            .iter()
            .find(|e| e.node == self.id)
            .map(|e| e.kind)
    }

    /// Render this node in the tree-sitter S-expression style: named nodes only,
    /// each prefixed by its field label.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        write_sexp(*self, &mut out);
        out
    }
}

fn write_sexp(node: Node<'_>, out: &mut String) {
    out.push('(');
    out.push_str(node.kind().as_str());
    for child in node.children() {
        if !child.is_named() {
            if node.is_error() {
                // Keep skipped punctuation visible inside error regions.
                let _ = write!(out, " {:?}", child.text());
            }
            continue;
        }
        out.push(' ');
        if let Some(field) = child.field_name() {
            out.push_str(field.as_str());
            out.push_str(": ");
        }
        write_sexp(child, out);
    }
    out.push(')');
}

/// Iterator returned by [`Node::descendants`].
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        let id = self.stack.pop()?;
        let data = self.tree.data(id);
        self.stack.extend(data.children.iter().rev());
        Some(self.tree.node(id))
    }
}
