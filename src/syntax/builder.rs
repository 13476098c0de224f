// ==============================================================================
// Tree Builder
// ==============================================================================
//
// The grammar engine never constructs nodes directly. It emits events
// (`start_node`, `leaf`, `finish_node`) and the builder turns them into the
// arena. `checkpoint` / `start_node_at` let the engine wrap children that were
// already emitted, which is how leading annotations end up inside the
// declaration that follows them, and how `nullable` wraps a type that was
// parsed before the `?` was seen.

use super::tree::{NodeData, NodeId};
use super::{ErrorKind, FieldName, NodeKind, Span, SyntaxError};

/// A position in the pending-children list that a later node may start at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Checkpoint(usize);

#[derive(Debug)]
struct OpenNode {
    kind: NodeKind,
    first_child: usize,
}

#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    nodes: Vec<NodeData>,
    /// Children of all currently open nodes, flattened. Each open node owns
    /// the suffix starting at its `first_child`.
    pending: Vec<NodeId>,
    open: Vec<OpenNode>,
    errors: Vec<SyntaxError>,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        TreeBuilder::default()
    }

    pub(crate) fn start_node(&mut self, kind: NodeKind) {
        self.open.push(OpenNode {
            kind,
            first_child: self.pending.len(),
        });
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.pending.len())
    }

    /// Start a node whose first child is the one emitted right after `checkpoint`.
    ///
    /// Calling this twice with the same checkpoint nests the second node inside
    /// the first.
    pub(crate) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: NodeKind) {
        debug_assert!(checkpoint.0 <= self.pending.len());
        debug_assert!(
            self.open
                .last()
                .is_none_or(|parent| parent.first_child <= checkpoint.0),
            "checkpoint lies outside the innermost open node"
        );
        self.open.push(OpenNode {
            kind,
            first_child: checkpoint.0,
        });
    }

    /// Close the innermost open node. A node without children gets a zero-width
    /// span at `empty_at`.
    pub(crate) fn finish_node(&mut self, empty_at: usize) -> NodeId {
        let open = self
            .open
            .pop()
            .expect("finish_node called without a matching start_node");
        let children = self.pending.split_off(open.first_child);
        let span = match (children.first(), children.last()) {
            (Some(first), Some(last)) => {
                Span::new(self.node(*first).span.start, self.node(*last).span.end)
            }
            _ => Span::empty(empty_at),
        };
        self.push(NodeData {
            kind: open.kind,
            span,
            field: None,
            children,
        })
    }

    pub(crate) fn leaf(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.push(NodeData {
            kind,
            span,
            field: None,
            children: Vec::new(),
        })
    }

    /// Label the most recently emitted child of the innermost open node.
    pub(crate) fn label_last(&mut self, field: FieldName) {
        let first = self.open.last().map_or(0, |n| n.first_child);
        if self.pending.len() > first
            && let Some(&id) = self.pending.last()
        {
            self.nodes[id.index()].field = Some(field);
        }
    }

    /// Kind of the most recently emitted child of the innermost open node.
    pub(crate) fn last_kind(&self) -> Option<NodeKind> {
        let first = self.open.last().map_or(0, |n| n.first_child);
        if self.pending.len() > first {
            self.pending.last().map(|id| self.node(*id).kind)
        } else {
            None
        }
    }

    pub(crate) fn record_error(
        &mut self,
        node: NodeId,
        kind: ErrorKind,
        message: String,
        help: Option<String>,
    ) {
        let span = self.node(node).span;
        self.errors.push(SyntaxError {
            kind,
            span,
            message,
            help,
            node,
        });
    }

    /// Consume the builder. All nodes must be closed except the root, which is
    /// closed here with `root_span`.
    pub(crate) fn finish(mut self, root_span: Span) -> (Vec<NodeData>, NodeId, Vec<SyntaxError>) {
        debug_assert_eq!(self.open.len(), 1, "unbalanced start_node/finish_node");
        let root = self.finish_node(root_span.start);
        self.nodes[root.index()].span = root_span;
        self.errors.sort_by_key(|e| (e.span.start, e.span.end));
        (self.nodes, root, self.errors)
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(data);
        self.pending.push(id);
        id
    }
}
