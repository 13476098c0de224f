use super::expr::{Binding, CallExpression, Identifier, Literal};
use super::types::{Annotation, Primitive, ReturnType, TypeExpr};

/// A whole source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Schema(SchemaDeclaration),
    Protocol(ProtocolDeclaration),
    Import(ImportDeclaration),
    Enum(EnumDeclaration),
    Fixed(FixedDeclaration),
    Record(RecordDeclaration),
    Error(ErrorDeclaration),
    RpcMessage(RpcMessageDeclaration),
}

impl Declaration {
    /// The declared name, for declarations that have one.
    pub fn name(&self) -> Option<&Identifier> {
        match self {
            Declaration::Protocol(p) => Some(&p.name),
            Declaration::Enum(e) => Some(&e.name),
            Declaration::Fixed(f) => Some(f.name()),
            Declaration::Record(r) => Some(&r.name),
            Declaration::Error(e) => Some(&e.name),
            Declaration::RpcMessage(m) => Some(&m.name),
            Declaration::Schema(_) | Declaration::Import(_) => None,
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            Declaration::Protocol(p) => p.doc.as_deref(),
            Declaration::Enum(e) => e.doc.as_deref(),
            Declaration::Fixed(f) => f.doc.as_deref(),
            Declaration::Record(r) => r.doc.as_deref(),
            Declaration::Error(e) => e.doc.as_deref(),
            Declaration::RpcMessage(m) => m.doc.as_deref(),
            Declaration::Schema(_) | Declaration::Import(_) => None,
        }
    }
}

/// `[namespace ns;] schema T;`
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDeclaration {
    pub namespace: Option<String>,
    pub target: SchemaTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaTarget {
    Primitive(Primitive),
    Named(Identifier),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolDeclaration {
    pub doc: Option<String>,
    pub annotations: Vec<Annotation>,
    pub name: Identifier,
    pub declarations: Vec<Declaration>,
}

/// `import kind "path";`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDeclaration {
    /// `idl`, `protocol`, or `schema`, as written.
    pub kind: Identifier,
    pub path: Literal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDeclaration {
    pub doc: Option<String>,
    pub annotations: Vec<Annotation>,
    pub name: Identifier,
    pub symbols: Vec<Identifier>,
    pub default: Option<Identifier>,
}

/// `fixed Name(size);` or `fixed Name;`
#[derive(Debug, Clone, PartialEq)]
pub struct FixedDeclaration {
    pub doc: Option<String>,
    pub spec: FixedSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FixedSpec {
    Call(CallExpression),
    Name(Identifier),
}

impl FixedDeclaration {
    pub fn name(&self) -> &Identifier {
        match &self.spec {
            FixedSpec::Call(call) => &call.callee,
            FixedSpec::Name(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordDeclaration {
    pub doc: Option<String>,
    pub annotations: Vec<Annotation>,
    pub name: Identifier,
    pub fields: Vec<Field>,
}

/// An `error` type: a record body without leading annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDeclaration {
    pub doc: Option<String>,
    pub name: Identifier,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub doc: Option<String>,
    pub ty: TypeExpr,
    /// The annotation between the type and the name.
    pub annotation: Option<Annotation>,
    pub binding: Binding,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub ty: TypeExpr,
    pub binding: Binding,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RpcMessageDeclaration {
    pub doc: Option<String>,
    pub return_type: ReturnType,
    pub name: Identifier,
    /// Empty parameter slots are dropped.
    pub parameters: Vec<Parameter>,
    pub throws: Option<Identifier>,
    pub oneway: bool,
}
