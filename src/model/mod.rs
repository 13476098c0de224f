// ==============================================================================
// Typed Model
// ==============================================================================
//
// The declarations of an error-free tree as plain Rust values. The model holds
// no spans or node ids, so two parses of equivalent source compare equal.

mod decl;
mod expr;
mod types;

pub use decl::{
    Declaration, EnumDeclaration, ErrorDeclaration, Field, FixedDeclaration, FixedSpec, ImportDeclaration, Parameter,
    Program, ProtocolDeclaration, RecordDeclaration, RpcMessageDeclaration, SchemaDeclaration,
    SchemaTarget,
};
pub use expr::{Binding, CallExpression, DefaultValue, Expression, Identifier, Literal, Value};
pub use types::{Annotation, AnnotationArguments, LogicalType, Primitive, ReturnType, TypeExpr};
