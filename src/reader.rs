// ==============================================================================
// Reader: Syntax Tree to Typed Model
// ==============================================================================
//
// Lowers an error-free `SyntaxTree` into `model::Program` with one plain
// recursive `walk_*` function per node kind. Trees with error regions are
// rejected up front with their diagnostics, so the walkers can treat a missing
// child as an internal inconsistency rather than a user error.
//
// Annotations in type position are siblings of the type node they precede
// (`@a T?` is `annotation_statement`, then `nullable`); the walkers fold them
// back into `TypeExpr::Annotated` wrappers, outermost first.

use miette::NamedSource;

use crate::doc_comments::PendingDoc;
use crate::error::{Error, ParseDiagnostic};
use crate::model::{
    Annotation, AnnotationArguments, Binding, CallExpression, Declaration, DefaultValue,
    EnumDeclaration, ErrorDeclaration, Expression, Field, FixedDeclaration, FixedSpec, Identifier,
    ImportDeclaration, Literal, LogicalType, Parameter, Primitive, Program, ProtocolDeclaration,
    RecordDeclaration, ReturnType, RpcMessageDeclaration, SchemaDeclaration, SchemaTarget,
    TypeExpr, Value,
};
use crate::syntax::{FieldName, Node, NodeKind, SyntaxTree};

type Result<T> = std::result::Result<T, Error>;

/// Lower `tree` into the typed model.
///
/// Fails with [`Error::Syntax`] carrying every recorded error if the tree has
/// any error regions.
#[tracing::instrument(skip_all, fields(name = tree.name()))]
pub fn read_program(tree: &SyntaxTree) -> Result<Program> {
    if let Some(err) = Error::from_diagnostics(tree.diagnostics()) {
        return Err(err);
    }
    Ok(Program {
        declarations: walk_declarations(tree.root())?,
    })
}

// ==========================================================================
// Helpers
// ==========================================================================

fn malformed(node: Node<'_>, what: &str) -> Error {
    let tree = node.tree();
    Error::Syntax(Box::new(ParseDiagnostic {
        src: NamedSource::new(tree.name(), tree.source().to_string()),
        span: node.span().into(),
        message: format!("malformed {}: {what}", node.kind_name()),
        code: "avdl::syntax",
        help: None,
        related: Vec::new(),
    }))
}

/// Named children, minus comments.
fn content<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    node.named_children().filter(|c| c.kind() != NodeKind::Comment)
}

fn child<'t>(node: Node<'t>, kind: NodeKind) -> Result<Node<'t>> {
    node.child_of_kind(kind)
        .ok_or_else(|| malformed(node, &format!("missing {kind}")))
}

fn field<'t>(node: Node<'t>, field: FieldName) -> Result<Node<'t>> {
    node.child_by_field(field)
        .ok_or_else(|| malformed(node, &format!("missing `{field}` field")))
}

fn identifier(node: Node<'_>) -> Identifier {
    Identifier::new(node.text())
}

fn annotations(node: Node<'_>) -> Result<Vec<Annotation>> {
    content(node)
        .filter(|c| c.kind() == NodeKind::AnnotationStatement)
        .map(walk_annotation)
        .collect()
}

/// Wrap `ty` in `leading` annotations, the first one outermost.
fn annotate(leading: Vec<Annotation>, ty: TypeExpr) -> TypeExpr {
    leading
        .into_iter()
        .rev()
        .fold(ty, |ty, annotation| TypeExpr::Annotated(annotation, Box::new(ty)))
}

// ==========================================================================
// Declarations
// ==========================================================================

fn walk_declarations(parent: Node<'_>) -> Result<Vec<Declaration>> {
    let mut docs = PendingDoc::default();
    let mut declarations = Vec::new();
    for child in parent.children() {
        let doc = docs.observe(child);
        if child.kind().is_declaration() {
            declarations.push(walk_declaration(child, doc)?);
        }
    }
    Ok(declarations)
}

fn walk_declaration(node: Node<'_>, doc: Option<String>) -> Result<Declaration> {
    Ok(match node.kind() {
        NodeKind::SchemaDeclaration => Declaration::Schema(walk_schema(node)?),
        NodeKind::ProtocolDeclaration => Declaration::Protocol(ProtocolDeclaration {
            doc,
            annotations: annotations(node)?,
            name: identifier(field(node, FieldName::Name)?),
            declarations: walk_declarations(child(node, NodeKind::ProtocolBlock)?)?,
        }),
        NodeKind::ImportDeclaration => Declaration::Import(ImportDeclaration {
            kind: identifier(child(node, NodeKind::Identifier)?),
            path: walk_literal(child(node, NodeKind::LiteralType)?)?,
        }),
        NodeKind::EnumDeclaration => Declaration::Enum(walk_enum(node, doc)?),
        NodeKind::FixedDeclaration => Declaration::Fixed(walk_fixed(node, doc)?),
        NodeKind::RecordDeclaration => Declaration::Record(walk_record(node, doc)?),
        NodeKind::ErrorDeclaration => Declaration::Error(ErrorDeclaration {
            doc,
            name: identifier(field(node, FieldName::Name)?),
            fields: walk_fields(node)?,
        }),
        NodeKind::RpcMessageDeclaration => Declaration::RpcMessage(walk_message(node, doc)?),
        _ => return Err(malformed(node, "not a declaration")),
    })
}

fn walk_schema(node: Node<'_>) -> Result<SchemaDeclaration> {
    let namespace = match node.child_of_kind(NodeKind::NamespaceStatement) {
        Some(statement) => Some(
            child(statement, NodeKind::NamespaceIdentifier)?
                .text()
                .to_string(),
        ),
        None => None,
    };
    let target = if let Some(primitive) = node.child_of_kind(NodeKind::PrimitiveType) {
        SchemaTarget::Primitive(walk_primitive(primitive)?)
    } else {
        SchemaTarget::Named(identifier(child(node, NodeKind::Identifier)?))
    };
    Ok(SchemaDeclaration { namespace, target })
}

fn walk_enum(node: Node<'_>, doc: Option<String>) -> Result<EnumDeclaration> {
    let block = child(node, NodeKind::EnumBlock)?;
    let symbols = content(block)
        .filter(|c| c.kind() == NodeKind::Enumeral)
        .map(|e| child(e, NodeKind::Identifier).map(identifier))
        .collect::<Result<_>>()?;
    let default = match node.child_of_kind(NodeKind::DefaultEnumeral) {
        Some(default) => Some(identifier(child(default, NodeKind::Identifier)?)),
        None => None,
    };
    Ok(EnumDeclaration {
        doc,
        annotations: annotations(node)?,
        name: identifier(field(node, FieldName::Name)?),
        symbols,
        default,
    })
}

fn walk_fixed(node: Node<'_>, doc: Option<String>) -> Result<FixedDeclaration> {
    let spec = if let Some(call) = node.child_of_kind(NodeKind::CallExpression) {
        FixedSpec::Call(walk_call(call)?)
    } else {
        FixedSpec::Name(identifier(child(node, NodeKind::Identifier)?))
    };
    Ok(FixedDeclaration { doc, spec })
}

fn walk_record(node: Node<'_>, doc: Option<String>) -> Result<RecordDeclaration> {
    Ok(RecordDeclaration {
        doc,
        annotations: annotations(node)?,
        name: identifier(field(node, FieldName::Name)?),
        fields: walk_fields(node)?,
    })
}

/// The fields of a record or error body.
fn walk_fields(node: Node<'_>) -> Result<Vec<Field>> {
    let block = child(node, NodeKind::StatementBlock)?;
    let mut docs = PendingDoc::default();
    let mut fields = Vec::new();
    for child in block.children() {
        let doc = docs.observe(child);
        if child.kind() == NodeKind::FieldDeclaration {
            fields.push(walk_field(child, doc)?);
        }
    }
    Ok(fields)
}

fn walk_field(node: Node<'_>, doc: Option<String>) -> Result<Field> {
    let mut leading = Vec::new();
    let mut ty = None;
    let mut annotation = None;
    let mut binding = None;
    for child in content(node) {
        match child.kind() {
            NodeKind::AnnotationStatement if ty.is_none() => leading.push(walk_annotation(child)?),
            NodeKind::AnnotationStatement => annotation = Some(walk_annotation(child)?),
            NodeKind::Identifier => binding = Some(Binding::Name(identifier(child))),
            NodeKind::DefaultValueExpression => {
                binding = Some(Binding::Default(walk_default_value(child)?));
            }
            _ if child.field_name() == Some(FieldName::Type) => ty = Some(walk_type(child)?),
            _ => {}
        }
    }
    let ty = ty.ok_or_else(|| malformed(node, "missing type"))?;
    Ok(Field {
        doc,
        ty: annotate(leading, ty),
        annotation,
        binding: binding.ok_or_else(|| malformed(node, "missing name"))?,
    })
}

fn walk_default_value(node: Node<'_>) -> Result<DefaultValue> {
    let value = field(node, FieldName::Right)?;
    let inner = content(value)
        .next()
        .ok_or_else(|| malformed(value, "empty value"))?;
    let value = match inner.kind() {
        NodeKind::LiteralType => Value::Literal(walk_literal(inner)?),
        NodeKind::Identifier => Value::Identifier(identifier(inner)),
        _ => return Err(malformed(inner, "expected a literal or identifier")),
    };
    Ok(DefaultValue {
        name: identifier(field(node, FieldName::Left)?),
        value,
    })
}

// ==========================================================================
// Messages
// ==========================================================================

fn walk_message(node: Node<'_>, doc: Option<String>) -> Result<RpcMessageDeclaration> {
    let return_value = child(node, NodeKind::ReturnValue)?;
    let return_type = if return_value.child_of_kind(NodeKind::Void).is_some() {
        ReturnType::Void
    } else {
        ReturnType::Type(single_type(return_value)?)
    };

    let parameters = match node.child_of_kind(NodeKind::ParameterList) {
        Some(list) => content(list)
            .filter(|c| c.kind() == NodeKind::Parameter)
            .map(walk_parameter)
            .collect::<Result<_>>()?,
        None => Vec::new(),
    };

    let throws = match node.child_of_kind(NodeKind::ThrowStatement) {
        Some(throws) => Some(identifier(child(throws, NodeKind::Identifier)?)),
        None => None,
    };

    Ok(RpcMessageDeclaration {
        doc,
        return_type,
        name: identifier(field(node, FieldName::Name)?),
        parameters,
        throws,
        oneway: node.child_of_kind(NodeKind::Oneway).is_some(),
    })
}

fn walk_parameter(node: Node<'_>) -> Result<Parameter> {
    let mut leading = Vec::new();
    let mut ty = None;
    let mut binding = None;
    for child in content(node) {
        match (child.kind(), child.field_name()) {
            (NodeKind::AnnotationStatement, _) => leading.push(walk_annotation(child)?),
            (NodeKind::Identifier, Some(FieldName::Name)) => {
                binding = Some(Binding::Name(identifier(child)));
            }
            (NodeKind::DefaultValueExpression, _) => {
                binding = Some(Binding::Default(walk_default_value(child)?));
            }
            (_, Some(FieldName::Type)) => ty = Some(walk_type(child)?),
            _ => {}
        }
    }
    let ty = ty.ok_or_else(|| malformed(node, "missing type"))?;
    Ok(Parameter {
        ty: annotate(leading, ty),
        binding: binding.ok_or_else(|| malformed(node, "missing name"))?,
    })
}

// ==========================================================================
// Types
// ==========================================================================

/// The type expressions among `parent`'s children, each wrapped in the
/// annotations that precede it.
fn type_sequence(parent: Node<'_>) -> Result<Vec<TypeExpr>> {
    let mut leading = Vec::new();
    let mut types = Vec::new();
    for child in content(parent) {
        if child.kind() == NodeKind::AnnotationStatement {
            leading.push(walk_annotation(child)?);
        } else if child.kind().is_type() {
            types.push(annotate(std::mem::take(&mut leading), walk_type(child)?));
        }
    }
    Ok(types)
}

fn single_type(parent: Node<'_>) -> Result<TypeExpr> {
    let mut types = type_sequence(parent)?;
    if types.len() != 1 {
        return Err(malformed(parent, "expected exactly one type"));
    }
    Ok(types.remove(0))
}

fn walk_type(node: Node<'_>) -> Result<TypeExpr> {
    Ok(match node.kind() {
        NodeKind::PrimitiveType => TypeExpr::Primitive(walk_primitive(node)?),
        NodeKind::LogicalType => TypeExpr::Logical(walk_logical(node)?),
        NodeKind::Array => {
            TypeExpr::Array(Box::new(single_type(child(node, NodeKind::TypeBlock)?)?))
        }
        NodeKind::Map => TypeExpr::Map(Box::new(single_type(child(node, NodeKind::TypeBlock)?)?)),
        NodeKind::Union => TypeExpr::Union(type_sequence(child(node, NodeKind::UnionBlock)?)?),
        NodeKind::Nullable => TypeExpr::Nullable(Box::new(single_type(node)?)),
        _ => return Err(malformed(node, "not a type")),
    })
}

fn walk_primitive(node: Node<'_>) -> Result<Primitive> {
    Primitive::from_name(node.text()).ok_or_else(|| malformed(node, "unknown primitive type"))
}

fn walk_logical(node: Node<'_>) -> Result<LogicalType> {
    let inner = content(node)
        .next()
        .ok_or_else(|| malformed(node, "empty logical type"))?;
    Ok(match inner.kind() {
        NodeKind::Identifier => LogicalType::Named(identifier(inner)),
        NodeKind::CallExpression => LogicalType::Call(walk_call(inner)?),
        NodeKind::KnownLogicalType => {
            if let Some(decimal) = inner.child_of_kind(NodeKind::Decimal) {
                let arguments = match decimal.child_of_kind(NodeKind::ArgumentList) {
                    Some(list) => Some(walk_arguments(list)?),
                    None => None,
                };
                LogicalType::Decimal { arguments }
            } else {
                match inner.text() {
                    "date" => LogicalType::Date,
                    "time_ms" => LogicalType::TimeMs,
                    "timestamp_ms" => LogicalType::TimestampMs,
                    "local_timestamp_ms" => LogicalType::LocalTimestampMs,
                    "uuid" => LogicalType::Uuid,
                    _ => return Err(malformed(inner, "unknown logical type")),
                }
            }
        }
        _ => return Err(malformed(inner, "unexpected logical type")),
    })
}

// ==========================================================================
// Annotations and Expressions
// ==========================================================================

fn walk_annotation(node: Node<'_>) -> Result<Annotation> {
    let name = field(node, FieldName::Name)?.text();
    let arguments = child(node, NodeKind::AnnotationArguments)?;
    let literals = content(arguments)
        .filter(|c| c.kind() == NodeKind::LiteralType)
        .map(walk_literal)
        .collect::<Result<Vec<_>>>()?;
    let is_list = arguments.children().any(|c| c.kind_name() == "[");
    let arguments = if is_list {
        AnnotationArguments::List(literals)
    } else {
        let literal = literals
            .into_iter()
            .next()
            .ok_or_else(|| malformed(arguments, "missing value"))?;
        AnnotationArguments::Single(literal)
    };
    Ok(Annotation {
        name: name.trim_start_matches('@').to_string(),
        arguments,
    })
}

fn walk_literal(node: Node<'_>) -> Result<Literal> {
    let inner = content(node)
        .next()
        .ok_or_else(|| malformed(node, "empty literal"))?;
    Ok(match inner.kind() {
        NodeKind::Number => Literal::Number(inner.text().to_string()),
        NodeKind::String => Literal::String(inner.text().to_string()),
        NodeKind::True => Literal::True,
        NodeKind::False => Literal::False,
        NodeKind::Null => Literal::Null,
        _ => return Err(malformed(inner, "not a literal")),
    })
}

fn walk_expression(node: Node<'_>) -> Result<Expression> {
    Ok(match node.kind() {
        NodeKind::LiteralType => Expression::Literal(walk_literal(node)?),
        NodeKind::Identifier => Expression::Identifier(identifier(node)),
        NodeKind::CallExpression => Expression::Call(walk_call(node)?),
        NodeKind::AssignmentExpression => Expression::Assignment {
            right: identifier(field(node, FieldName::Right)?),
            left: Box::new(walk_expression(field(node, FieldName::Left)?)?),
        },
        _ => return Err(malformed(node, "not an expression")),
    })
}

fn walk_call(node: Node<'_>) -> Result<CallExpression> {
    Ok(CallExpression {
        callee: identifier(child(node, NodeKind::Identifier)?),
        arguments: walk_arguments(child(node, NodeKind::ArgumentList)?)?,
    })
}

/// Argument slots. `()` has none; otherwise there is one slot per comma plus
/// one, and a slot with nothing in it is `None`.
fn walk_arguments(list: Node<'_>) -> Result<Vec<Option<Expression>>> {
    let mut slots = Vec::new();
    let mut current = None;
    let mut any = false;
    for child in list.children() {
        if child.kind() == NodeKind::Comment {
            continue;
        }
        match child.kind_name() {
            "(" | ")" => {}
            "," => {
                slots.push(current.take());
                any = true;
            }
            _ => {
                current = Some(walk_expression(child)?);
                any = true;
            }
        }
    }
    if any {
        slots.push(current);
    }
    Ok(slots)
}
