use super::expr::{CallExpression, Expression, Identifier, Literal};

/// The primitive Avro type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Long,
    String,
    Boolean,
    Float,
    Double,
    Null,
    Bytes,
}

impl Primitive {
    pub const ALL: [Primitive; 8] = [
        Primitive::Int,
        Primitive::Long,
        Primitive::String,
        Primitive::Boolean,
        Primitive::Float,
        Primitive::Double,
        Primitive::Null,
        Primitive::Bytes,
    ];

    /// Return the Avro type name string for this primitive.
    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::String => "string",
            Primitive::Boolean => "boolean",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Null => "null",
            Primitive::Bytes => "bytes",
        }
    }

    pub fn from_name(name: &str) -> Option<Primitive> {
        Primitive::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

/// Logical types: the known ones by keyword, or a custom one spelled as a
/// name or a call.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalType {
    /// `decimal`, optionally with `(precision, scale)` style arguments.
    Decimal {
        arguments: Option<Vec<Option<Expression>>>,
    },
    Date,
    TimeMs,
    TimestampMs,
    LocalTimestampMs,
    Uuid,
    /// A reference to a named type, or a custom logical type name.
    Named(Identifier),
    Call(CallExpression),
}

impl LogicalType {
    /// `(precision, scale)` of `decimal(p, s)` when both are integer literals.
    pub fn decimal_precision_scale(&self) -> Option<(i64, i64)> {
        let LogicalType::Decimal {
            arguments: Some(arguments),
        } = self
        else {
            return None;
        };
        let int = |arg: Option<&Option<Expression>>| match arg {
            Some(Some(Expression::Literal(literal @ Literal::Number(_)))) => literal.as_i64(),
            _ => None,
        };
        Some((int(arguments.first())?, int(arguments.get(1))?))
    }
}

/// `@name(value)` or `@name([value, ...])`.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// The name without its leading `@`.
    pub name: String,
    pub arguments: AnnotationArguments,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationArguments {
    Single(Literal),
    /// Bracketed list. Empty slots are dropped.
    List(Vec<Literal>),
}

/// A type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Primitive(Primitive),
    Logical(LogicalType),
    Array(Box<TypeExpr>),
    Map(Box<TypeExpr>),
    Union(Vec<TypeExpr>),
    Nullable(Box<TypeExpr>),
    Annotated(Annotation, Box<TypeExpr>),
}

impl TypeExpr {
    /// The type with any annotation and nullable wrappers removed.
    pub fn base(&self) -> &TypeExpr {
        match self {
            TypeExpr::Nullable(inner) | TypeExpr::Annotated(_, inner) => inner.base(),
            other => other,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            TypeExpr::Nullable(_) => true,
            TypeExpr::Annotated(_, inner) => inner.is_nullable(),
            _ => false,
        }
    }

    /// The name this type refers to, if it is a plain named type.
    pub fn referenced_name(&self) -> Option<&Identifier> {
        match self.base() {
            TypeExpr::Logical(LogicalType::Named(name)) => Some(name),
            _ => None,
        }
    }
}

/// The result type of a message.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnType {
    Void,
    Type(TypeExpr),
}
