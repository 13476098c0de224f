//! Error-tolerant Avro IDL parser: turn `.avdl` source into a queryable
//! syntax tree.
//!
//! Parsing never gives up on malformed input. Whatever cannot be matched ends
//! up in `ERROR` nodes inside an otherwise complete tree, with one
//! [`SyntaxError`] record per region, so editors, highlighters, and linters
//! can keep working on files that are half-typed.
//!
//! # Parsing
//!
//! ```
//! let tree = avdl_syntax::parse("record Point { double x; double y; }")?;
//! assert!(!tree.has_errors());
//! assert_eq!(
//!     tree.to_sexp(),
//!     "(program (record_declaration name: (identifier) (statement_block \
//!      (field_declaration type: (primitive_type) name: (identifier)) \
//!      (field_declaration type: (primitive_type) name: (identifier)))))"
//! );
//! # Ok::<(), avdl_syntax::Error>(())
//! ```
//!
//! # Errors stay in the tree
//!
//! ```
//! use avdl_syntax::{ErrorKind, FieldName};
//!
//! let tree = avdl_syntax::parse("record { int x; }")?;
//! let record = tree.root().named_children().next().unwrap();
//! assert!(record.has_error());
//! assert!(record.child_by_field(FieldName::Name).is_none());
//! assert_eq!(tree.errors()[0].kind, ErrorKind::Syntax);
//! # Ok::<(), avdl_syntax::Error>(())
//! ```
//!
//! # Typed model
//!
//! An error-free tree lowers into plain Rust values with
//! [`SyntaxTree::program`], and [`render_program`] prints them back in
//! canonical layout:
//!
//! ```
//! let tree = avdl_syntax::parse("protocol P{enum E{A,B}}")?;
//! let program = tree.program()?;
//! assert_eq!(
//!     avdl_syntax::render_program(&program),
//!     "protocol P {\n    enum E { A, B }\n}\n"
//! );
//! # Ok::<(), avdl_syntax::Error>(())
//! ```
//!
//! # Limits
//!
//! [`Parser`] bounds the input length and the nesting depth. Going over the
//! input limit is the only way a parse fails; going over the depth limit
//! becomes an `ERROR` node like any other malformed construct.

pub mod doc_comments;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod reader;
pub mod render;
pub(crate) mod suggest;
pub mod syntax;

pub use error::{Error, ParseDiagnostic};
pub use grammar::{Keyword, Language, Prec, language};
pub use parser::Parser;
pub use render::render_program;
pub use syntax::{ErrorKind, FieldName, Node, NodeKind, Span, SyntaxError, SyntaxTree};

/// Parse `source` with the default [`Parser`] limits.
///
/// Only fails if `source` is over the default input length limit; malformed
/// input still yields a tree.
pub fn parse(source: &str) -> Result<SyntaxTree, Error> {
    Parser::new().parse(source)
}
