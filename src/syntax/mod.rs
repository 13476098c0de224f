// ==============================================================================
// Syntax Tree Vocabulary
// ==============================================================================
//
// Node kinds, field names, and byte spans shared by the lexer, the grammar
// engine, and every consumer of the tree. The `as_str` names are the public
// query vocabulary (what a highlighter or outliner pattern-matches on), so
// they must stay stable.

mod builder;
pub mod json;
mod tree;

pub(crate) use builder::{Checkpoint, TreeBuilder};
pub use tree::{Descendants, Node, NodeId, SyntaxTree};

use std::fmt;
use std::ops::Range;

/// A half-open byte range `start..end` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} is after end {end}");
        Span { start, end }
    }

    /// A zero-width span at `offset`.
    pub fn empty(offset: usize) -> Self {
        Span {
            start: offset,
            end: offset,
        }
    }

    pub fn len(self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// The smallest span covering both `self` and `other`.
    #[must_use]
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn contains(self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ==============================================================================
// Node Kinds
// ==============================================================================

/// The kind of a syntax tree node.
///
/// Every variant except [`NodeKind::Anonymous`] is a *named* node. Anonymous
/// nodes are keyword and punctuation leaves (`"record"`, `"{"`, `";"`); their
/// kind name is their source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,

    // Declarations
    SchemaDeclaration,
    ProtocolDeclaration,
    ProtocolBlock,
    ImportDeclaration,
    FixedDeclaration,
    RecordDeclaration,
    ErrorDeclaration,
    EnumDeclaration,
    EnumBlock,
    StatementBlock,
    DefaultEnumeral,
    Enumeral,
    FieldDeclaration,
    RpcMessageDeclaration,
    ReturnValue,
    ParameterList,
    Parameter,
    ThrowStatement,
    Oneway,
    NamespaceStatement,
    AnnotationStatement,
    AnnotationArguments,

    // Types
    PrimitiveType,
    LogicalType,
    KnownLogicalType,
    Decimal,
    Array,
    Map,
    TypeBlock,
    Union,
    UnionBlock,
    Nullable,
    Void,

    // Expressions
    CallExpression,
    ArgumentList,
    AssignmentExpression,
    DefaultValueExpression,
    Value,
    LiteralType,

    // Leaves
    Identifier,
    NamespaceIdentifier,
    AnnotationIdentifier,
    String,
    Number,
    True,
    False,
    Null,
    Comment,

    Error,
    Anonymous,
}

impl NodeKind {
    /// Every named node kind, in a fixed order.
    pub const NAMED: &'static [NodeKind] = &[
        NodeKind::Program,
        NodeKind::SchemaDeclaration,
        NodeKind::ProtocolDeclaration,
        NodeKind::ProtocolBlock,
        NodeKind::ImportDeclaration,
        NodeKind::FixedDeclaration,
        NodeKind::RecordDeclaration,
        NodeKind::ErrorDeclaration,
        NodeKind::EnumDeclaration,
        NodeKind::EnumBlock,
        NodeKind::StatementBlock,
        NodeKind::DefaultEnumeral,
        NodeKind::Enumeral,
        NodeKind::FieldDeclaration,
        NodeKind::RpcMessageDeclaration,
        NodeKind::ReturnValue,
        NodeKind::ParameterList,
        NodeKind::Parameter,
        NodeKind::ThrowStatement,
        NodeKind::Oneway,
        NodeKind::NamespaceStatement,
        NodeKind::AnnotationStatement,
        NodeKind::AnnotationArguments,
        NodeKind::PrimitiveType,
        NodeKind::LogicalType,
        NodeKind::KnownLogicalType,
        NodeKind::Decimal,
        NodeKind::Array,
        NodeKind::Map,
        NodeKind::TypeBlock,
        NodeKind::Union,
        NodeKind::UnionBlock,
        NodeKind::Nullable,
        NodeKind::Void,
        NodeKind::CallExpression,
        NodeKind::ArgumentList,
        NodeKind::AssignmentExpression,
        NodeKind::DefaultValueExpression,
        NodeKind::Value,
        NodeKind::LiteralType,
        NodeKind::Identifier,
        NodeKind::NamespaceIdentifier,
        NodeKind::AnnotationIdentifier,
        NodeKind::String,
        NodeKind::Number,
        NodeKind::True,
        NodeKind::False,
        NodeKind::Null,
        NodeKind::Comment,
        NodeKind::Error,
    ];

    /// The stable query name of this kind. Anonymous leaves have no fixed
    /// name; use [`Node::kind_name`] to get their text.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Program => "program",
            NodeKind::SchemaDeclaration => "schema_declaration",
            NodeKind::ProtocolDeclaration => "protocol_declaration",
            NodeKind::ProtocolBlock => "protocol_block",
            NodeKind::ImportDeclaration => "import_declaration",
            NodeKind::FixedDeclaration => "fixed_declaration",
            NodeKind::RecordDeclaration => "record_declaration",
            NodeKind::ErrorDeclaration => "error_declaration",
            NodeKind::EnumDeclaration => "enum_declaration",
            NodeKind::EnumBlock => "enum_block",
            NodeKind::StatementBlock => "statement_block",
            NodeKind::DefaultEnumeral => "default_enumeral",
            NodeKind::Enumeral => "enumeral",
            NodeKind::FieldDeclaration => "field_declaration",
            NodeKind::RpcMessageDeclaration => "rpc_message_declaration",
            NodeKind::ReturnValue => "return_value",
            NodeKind::ParameterList => "parameter_list",
            NodeKind::Parameter => "parameter",
            NodeKind::ThrowStatement => "throw_statement",
            NodeKind::Oneway => "oneway",
            NodeKind::NamespaceStatement => "namespace_statement",
            NodeKind::AnnotationStatement => "annotation_statement",
            NodeKind::AnnotationArguments => "annotation_arguments",
            NodeKind::PrimitiveType => "primitive_type",
            NodeKind::LogicalType => "logical_type",
            NodeKind::KnownLogicalType => "known_logical_type",
            NodeKind::Decimal => "decimal",
            NodeKind::Array => "array",
            NodeKind::Map => "map",
            NodeKind::TypeBlock => "type_block",
            NodeKind::Union => "union",
            NodeKind::UnionBlock => "union_block",
            NodeKind::Nullable => "nullable",
            NodeKind::Void => "void",
            NodeKind::CallExpression => "call_expression",
            NodeKind::ArgumentList => "argument_list",
            NodeKind::AssignmentExpression => "assignment_expression",
            NodeKind::DefaultValueExpression => "default_value_expression",
            NodeKind::Value => "value",
            NodeKind::LiteralType => "literal_type",
            NodeKind::Identifier => "identifier",
            NodeKind::NamespaceIdentifier => "namespace_identifier",
            NodeKind::AnnotationIdentifier => "annotation_identifier",
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::True => "true",
            NodeKind::False => "false",
            NodeKind::Null => "null",
            NodeKind::Comment => "comment",
            NodeKind::Error => "ERROR",
            NodeKind::Anonymous => "",
        }
    }

    /// Look up a named kind by its query name.
    pub fn from_name(name: &str) -> Option<NodeKind> {
        NodeKind::NAMED.iter().copied().find(|k| k.as_str() == name)
    }

    pub fn is_named(self) -> bool {
        self != NodeKind::Anonymous
    }

    /// Declarations that can appear directly in a `program` or `protocol_block`.
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::SchemaDeclaration
                | NodeKind::ProtocolDeclaration
                | NodeKind::ImportDeclaration
                | NodeKind::EnumDeclaration
                | NodeKind::FixedDeclaration
                | NodeKind::RecordDeclaration
                | NodeKind::ErrorDeclaration
                | NodeKind::RpcMessageDeclaration
        )
    }

    /// Node kinds that stand for a complete type expression.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            NodeKind::PrimitiveType
                | NodeKind::LogicalType
                | NodeKind::Array
                | NodeKind::Map
                | NodeKind::Union
                | NodeKind::Nullable
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// Field Names
// ==============================================================================

/// A label on the edge between a node and one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    Name,
    Type,
    Left,
    Right,
}

impl FieldName {
    pub const ALL: &'static [FieldName] = &[
        FieldName::Name,
        FieldName::Type,
        FieldName::Left,
        FieldName::Right,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::Name => "name",
            FieldName::Type => "type",
            FieldName::Left => "left",
            FieldName::Right => "right",
        }
    }

    pub fn from_name(name: &str) -> Option<FieldName> {
        FieldName::ALL.iter().copied().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// Error Records
// ==============================================================================

/// Which layer produced an error region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No token class matched at the cursor.
    Lexical,
    /// A required token was missing, a single token was unexpected, or a
    /// construct appeared where the grammar forbids it.
    Syntax,
    /// Recovery skipped past the offending token to a statement boundary.
    Recovered,
}

impl ErrorKind {
    /// Diagnostic code used when reporting this error.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Lexical => "avdl::lexical",
            ErrorKind::Syntax => "avdl::syntax",
            ErrorKind::Recovered => "avdl::recovered",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Lexical => "lexical error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Recovered => "recovered error",
        })
    }
}

/// One error region embedded in a [`SyntaxTree`].
///
/// `node` is the `ERROR` node covering the region; it is a lookup key, not an
/// ownership edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub kind: ErrorKind,
    pub span: Span,
    pub message: String,
    pub help: Option<String>,
    pub node: NodeId,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.span, self.message)
    }
}
