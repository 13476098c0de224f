// ==============================================================================
// Canonical Rendering
// ==============================================================================
//
// Prints a `Program` back as Avro IDL in one fixed layout: four-space
// indentation, one member per line, a blank line between declarations, and
// doc comments reflowed into `/** ... */` blocks. Ordinary comments are not
// part of the model and are dropped.
//
// Parsing the output yields an equal `Program`, with two exceptions the reader
// never produces: `Nullable(Annotated(..))` prints as `@a T?`, which reads
// back as `Annotated(Nullable(..))`, and a call whose only argument slot is
// empty prints as `f()`, which reads back with no slots.

use std::fmt::Write as _;

use crate::model::{
    Annotation, AnnotationArguments, Binding, CallExpression, Declaration, EnumDeclaration,
    ErrorDeclaration, Expression, Field, FixedSpec, LogicalType, Parameter, Program, RecordDeclaration, ReturnType,
    RpcMessageDeclaration, SchemaTarget, TypeExpr, Value,
};

const INDENT: &str = "    ";

/// Render `program` in canonical layout.
pub fn render_program(program: &Program) -> String {
    let mut renderer = Renderer::default();
    renderer.declarations(&program.declarations);
    renderer.out
}

/// Render a single type expression, e.g. `array<@a(1) Foo?>`.
pub fn render_type(ty: &TypeExpr) -> String {
    let mut out = String::new();
    write_type(&mut out, ty);
    out
}

#[derive(Default)]
struct Renderer {
    out: String,
    depth: usize,
}

impl Renderer {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn doc(&mut self, doc: Option<&str>) {
        let Some(doc) = doc else {
            return;
        };
        if !doc.contains('\n') && !doc.starts_with('*') {
            self.line(&format!("/** {doc} */"));
            return;
        }
        self.line("/**");
        for line in doc.lines() {
            if line.is_empty() {
                self.line(" *");
            } else {
                self.line(&format!(" * {line}"));
            }
        }
        self.line(" */");
    }

    fn annotations(&mut self, annotations: &[Annotation]) {
        for annotation in annotations {
            let mut text = String::new();
            write_annotation(&mut text, annotation);
            self.line(&text);
        }
    }

    fn declarations(&mut self, declarations: &[Declaration]) {
        for (i, declaration) in declarations.iter().enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            self.declaration(declaration);
        }
    }

    fn declaration(&mut self, declaration: &Declaration) {
        match declaration {
            Declaration::Schema(schema) => {
                if let Some(namespace) = &schema.namespace {
                    self.line(&format!("namespace {namespace};"));
                }
                let target = match &schema.target {
                    SchemaTarget::Primitive(p) => p.as_str().to_string(),
                    SchemaTarget::Named(name) => name.to_string(),
                };
                self.line(&format!("schema {target};"));
            }
            Declaration::Protocol(protocol) => {
                self.doc(protocol.doc.as_deref());
                self.annotations(&protocol.annotations);
                if protocol.declarations.is_empty() {
                    self.line(&format!("protocol {} {{}}", protocol.name));
                    return;
                }
                self.line(&format!("protocol {} {{", protocol.name));
                self.depth += 1;
                self.declarations(&protocol.declarations);
                self.depth -= 1;
                self.line("}");
            }
            Declaration::Import(import) => {
                self.line(&format!("import {} {};", import.kind, import.path));
            }
            Declaration::Enum(e) => self.enumeration(e),
            Declaration::Fixed(fixed) => {
                self.doc(fixed.doc.as_deref());
                match &fixed.spec {
                    FixedSpec::Call(call) => {
                        let mut text = String::from("fixed ");
                        write_call(&mut text, call);
                        text.push(';');
                        self.line(&text);
                    }
                    FixedSpec::Name(name) => self.line(&format!("fixed {name};")),
                }
            }
            Declaration::Record(record) => self.record(record),
            Declaration::Error(error) => self.error(error),
            Declaration::RpcMessage(message) => self.message(message),
        }
    }

    fn enumeration(&mut self, e: &EnumDeclaration) {
        self.doc(e.doc.as_deref());
        self.annotations(&e.annotations);
        let symbols: Vec<&str> = e.symbols.iter().map(|s| s.as_str()).collect();
        let mut text = if symbols.is_empty() {
            format!("enum {} {{}}", e.name)
        } else {
            format!("enum {} {{ {} }}", e.name, symbols.join(", "))
        };
        if let Some(default) = &e.default {
            let _ = write!(text, " = {default};");
        }
        self.line(&text);
    }

    fn record(&mut self, record: &RecordDeclaration) {
        self.doc(record.doc.as_deref());
        self.annotations(&record.annotations);
        self.body(&format!("record {}", record.name), &record.fields);
    }

    fn error(&mut self, error: &ErrorDeclaration) {
        self.doc(error.doc.as_deref());
        self.body(&format!("error {}", error.name), &error.fields);
    }

    fn body(&mut self, head: &str, fields: &[Field]) {
        if fields.is_empty() {
            self.line(&format!("{head} {{}}"));
            return;
        }
        self.line(&format!("{head} {{"));
        self.depth += 1;
        for field in fields {
            self.field(field);
        }
        self.depth -= 1;
        self.line("}");
    }

    fn field(&mut self, field: &Field) {
        self.doc(field.doc.as_deref());
        let mut text = render_type(&field.ty);
        if let Some(annotation) = &field.annotation {
            text.push(' ');
            write_annotation(&mut text, annotation);
        }
        text.push(' ');
        write_binding(&mut text, &field.binding);
        text.push(';');
        self.line(&text);
    }

    fn message(&mut self, message: &RpcMessageDeclaration) {
        self.doc(message.doc.as_deref());
        let mut text = match &message.return_type {
            ReturnType::Void => "void".to_string(),
            ReturnType::Type(ty) => render_type(ty),
        };
        let _ = write!(text, " {}(", message.name);
        for (i, parameter) in message.parameters.iter().enumerate() {
            if i > 0 {
                text.push_str(", ");
            }
            write_parameter(&mut text, parameter);
        }
        text.push(')');
        if let Some(throws) = &message.throws {
            let _ = write!(text, " throws {throws}");
        } else if message.oneway {
            text.push_str(" oneway");
        }
        text.push(';');
        self.line(&text);
    }
}

// ==========================================================================
// Inline Pieces
// ==========================================================================

fn write_parameter(out: &mut String, parameter: &Parameter) {
    write_type(out, &parameter.ty);
    out.push(' ');
    write_binding(out, &parameter.binding);
}

fn write_binding(out: &mut String, binding: &Binding) {
    match binding {
        Binding::Name(name) => out.push_str(name.as_str()),
        Binding::Default(default) => {
            let _ = write!(out, "{} = ", default.name);
            match &default.value {
                Value::Literal(literal) => {
                    let _ = write!(out, "{literal}");
                }
                Value::Identifier(name) => out.push_str(name.as_str()),
            }
        }
    }
}

fn write_type(out: &mut String, ty: &TypeExpr) {
    match ty {
        TypeExpr::Primitive(p) => out.push_str(p.as_str()),
        TypeExpr::Logical(logical) => write_logical(out, logical),
        TypeExpr::Array(item) => {
            out.push_str("array<");
            write_type(out, item);
            out.push('>');
        }
        TypeExpr::Map(value) => {
            out.push_str("map<");
            write_type(out, value);
            out.push('>');
        }
        TypeExpr::Union(members) if members.is_empty() => out.push_str("union {}"),
        TypeExpr::Union(members) => {
            out.push_str("union { ");
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_type(out, member);
            }
            out.push_str(" }");
        }
        TypeExpr::Nullable(inner) => {
            write_type(out, inner);
            out.push('?');
        }
        TypeExpr::Annotated(annotation, inner) => {
            write_annotation(out, annotation);
            out.push(' ');
            write_type(out, inner);
        }
    }
}

fn write_logical(out: &mut String, logical: &LogicalType) {
    match logical {
        LogicalType::Decimal { arguments } => {
            out.push_str("decimal");
            if let Some(arguments) = arguments {
                write_arguments(out, arguments);
            }
        }
        LogicalType::Date => out.push_str("date"),
        LogicalType::TimeMs => out.push_str("time_ms"),
        LogicalType::TimestampMs => out.push_str("timestamp_ms"),
        LogicalType::LocalTimestampMs => out.push_str("local_timestamp_ms"),
        LogicalType::Uuid => out.push_str("uuid"),
        LogicalType::Named(name) => out.push_str(name.as_str()),
        LogicalType::Call(call) => write_call(out, call),
    }
}

fn write_annotation(out: &mut String, annotation: &Annotation) {
    let _ = write!(out, "@{}(", annotation.name);
    match &annotation.arguments {
        AnnotationArguments::Single(literal) => {
            let _ = write!(out, "{literal}");
        }
        AnnotationArguments::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{item}");
            }
            out.push(']');
        }
    }
    out.push(')');
}

fn write_call(out: &mut String, call: &CallExpression) {
    out.push_str(call.callee.as_str());
    write_arguments(out, &call.arguments);
}

fn write_arguments(out: &mut String, arguments: &[Option<Expression>]) {
    out.push('(');
    for (i, argument) in arguments.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if let Some(expression) = argument {
            write_expression(out, expression);
        }
    }
    out.push(')');
}

fn write_expression(out: &mut String, expression: &Expression) {
    match expression {
        Expression::Literal(literal) => {
            let _ = write!(out, "{literal}");
        }
        Expression::Identifier(name) => out.push_str(name.as_str()),
        Expression::Assignment { right, left } => {
            let _ = write!(out, "{right} = ");
            write_expression(out, left);
        }
        Expression::Call(call) => write_call(out, call),
    }
}
