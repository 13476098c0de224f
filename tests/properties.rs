// ==============================================================================
// Property Tests
// ==============================================================================
//
// Totality: every input, however broken, yields a well-formed tree. Round trip:
// rendering a generated model and parsing the text gives the same model back.

mod common;

use avdl_syntax::lexer::tokenize;
use avdl_syntax::model::{
    Annotation, AnnotationArguments, Binding, CallExpression, Declaration, DefaultValue,
    EnumDeclaration, ErrorDeclaration, Expression, Field, FixedDeclaration, FixedSpec, Identifier,
    ImportDeclaration, Literal, LogicalType, Parameter, Primitive, Program, ProtocolDeclaration,
    RecordDeclaration, ReturnType, RpcMessageDeclaration, SchemaDeclaration, SchemaTarget,
    TypeExpr, Value,
};
use avdl_syntax::{NodeKind, Parser, parse, render_program};
use common::assert_well_formed;
use proptest::prelude::*;

// ==============================================================================
// Source Strategies
// ==============================================================================

/// Space-separated IDL fragments, mostly meaningful, in random order.
fn token_soup() -> impl Strategy<Value = String> {
    let pieces = vec![
        "protocol", "record", "error", "enum", "fixed", "import", "schema", "namespace", "union",
        "array", "map", "decimal", "void", "throws", "oneway", "int", "string", "null", "Foo",
        "bar", "a.b", "@a", "@b.c", "{", "}", "(", ")", "[", "]", "<", ">", ";", ",", "=", "?",
        "\"s\"", "'t'", "1", "-2.5e3", "007", "/** doc */", "/* c */", "// line\n", "/*", "\"",
        "#", "@",
    ];
    prop::collection::vec(prop::sample::select(pieces), 0..48).prop_map(|v| v.join(" "))
}

// ==============================================================================
// Model Strategies
// ==============================================================================

fn ident() -> impl Strategy<Value = Identifier> {
    prop::sample::select(vec!["Foo", "Bar", "baz", "qux_1", "Point", "value"])
        .prop_map(Identifier::new)
}

fn number(n: impl ToString) -> Literal {
    Literal::Number(n.to_string())
}

fn literal() -> impl Strategy<Value = Literal> {
    prop_oneof![
        (-100i64..1000).prop_map(number),
        "[a-z ]{0,8}".prop_map(|s| Literal::String(format!("\"{s}\""))),
        Just(Literal::True),
        Just(Literal::False),
        Just(Literal::Null),
    ]
}

fn doc() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[A-Z][a-z]{0,6}( [a-z]{1,6}){0,3}")
}

fn annotation() -> impl Strategy<Value = Annotation> {
    (
        prop::sample::select(vec!["a", "java-class", "order", "foo.bar"]),
        prop_oneof![
            literal().prop_map(AnnotationArguments::Single),
            prop::collection::vec(literal(), 0..3).prop_map(AnnotationArguments::List),
        ],
    )
        .prop_map(|(name, arguments)| Annotation {
            name: name.to_string(),
            arguments,
        })
}

fn type_expr() -> impl Strategy<Value = TypeExpr> {
    let leaf = prop_oneof![
        prop::sample::select(Primitive::ALL.to_vec()).prop_map(TypeExpr::Primitive),
        ident().prop_map(|name| TypeExpr::Logical(LogicalType::Named(name))),
        prop::sample::select(vec![
            LogicalType::Date,
            LogicalType::TimeMs,
            LogicalType::TimestampMs,
            LogicalType::LocalTimestampMs,
            LogicalType::Uuid,
            LogicalType::Decimal { arguments: None },
        ])
        .prop_map(TypeExpr::Logical),
        (1u32..40, 0u32..10).prop_map(|(precision, scale)| {
            TypeExpr::Logical(LogicalType::Decimal {
                arguments: Some(vec![
                    Some(Expression::Literal(number(precision))),
                    Some(Expression::Literal(number(scale))),
                ]),
            })
        }),
    ];
    leaf.prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|t| TypeExpr::Array(Box::new(t))),
            inner.clone().prop_map(|t| TypeExpr::Map(Box::new(t))),
            prop::collection::vec(inner.clone(), 0..3).prop_map(TypeExpr::Union),
            // `@a T?` reads back as an annotated nullable, never the reverse.
            inner.clone().prop_map(|t| match t {
                TypeExpr::Annotated(..) => t,
                other => TypeExpr::Nullable(Box::new(other)),
            }),
            (annotation(), inner).prop_map(|(a, t)| TypeExpr::Annotated(a, Box::new(t))),
        ]
    })
}

fn binding() -> impl Strategy<Value = Binding> {
    let value = prop_oneof![
        literal().prop_map(Value::Literal),
        ident().prop_map(Value::Identifier),
    ];
    prop_oneof![
        ident().prop_map(Binding::Name),
        (ident(), value).prop_map(|(name, value)| Binding::Default(DefaultValue { name, value })),
    ]
}

fn field() -> impl Strategy<Value = Field> {
    (doc(), type_expr(), prop::option::of(annotation()), binding()).prop_map(
        |(doc, ty, annotation, binding)| Field {
            doc,
            ty,
            annotation,
            binding,
        },
    )
}

fn record() -> impl Strategy<Value = RecordDeclaration> {
    (
        doc(),
        prop::collection::vec(annotation(), 0..2),
        ident(),
        prop::collection::vec(field(), 0..4),
    )
        .prop_map(|(doc, annotations, name, fields)| RecordDeclaration {
            doc,
            annotations,
            name,
            fields,
        })
}

/// Errors take no leading annotations.
fn error() -> impl Strategy<Value = Declaration> {
    (doc(), ident(), prop::collection::vec(field(), 0..4)).prop_map(|(doc, name, fields)| {
        Declaration::Error(ErrorDeclaration { doc, name, fields })
    })
}

fn enumeration() -> impl Strategy<Value = Declaration> {
    (
        doc(),
        prop::collection::vec(annotation(), 0..2),
        ident(),
        prop::collection::vec(ident(), 0..4),
        prop::option::of(ident()),
    )
        .prop_map(|(doc, annotations, name, symbols, default)| {
            Declaration::Enum(EnumDeclaration {
                doc,
                annotations,
                name,
                symbols,
                default,
            })
        })
}

fn fixed() -> impl Strategy<Value = Declaration> {
    (doc(), ident(), 1u32..64).prop_map(|(doc, callee, size)| {
        Declaration::Fixed(FixedDeclaration {
            doc,
            spec: FixedSpec::Call(CallExpression {
                callee,
                arguments: vec![Some(Expression::Literal(number(size)))],
            }),
        })
    })
}

fn import() -> impl Strategy<Value = Declaration> {
    (
        prop::sample::select(vec!["idl", "protocol", "schema"]),
        "[a-z]{1,8}",
    )
        .prop_map(|(kind, file)| {
            Declaration::Import(ImportDeclaration {
                kind: Identifier::new(kind),
                path: Literal::String(format!("\"{file}.avdl\"")),
            })
        })
}

fn message() -> impl Strategy<Value = Declaration> {
    let return_type = prop_oneof![
        Just(ReturnType::Void),
        type_expr().prop_map(ReturnType::Type),
    ];
    let parameter = (type_expr(), binding()).prop_map(|(ty, binding)| Parameter { ty, binding });
    (
        doc(),
        return_type,
        ident(),
        prop::collection::vec(parameter, 0..3),
        prop::option::of(ident()),
        any::<bool>(),
    )
        .prop_map(|(doc, return_type, name, parameters, throws, oneway)| {
            Declaration::RpcMessage(RpcMessageDeclaration {
                doc,
                return_type,
                name,
                parameters,
                oneway: oneway && throws.is_none(),
                throws,
            })
        })
}

fn protocol() -> impl Strategy<Value = Declaration> {
    let member = prop_oneof![
        record().prop_map(Declaration::Record),
        error(),
        enumeration(),
        fixed(),
        message(),
        import(),
    ];
    (
        doc(),
        prop::collection::vec(annotation(), 0..2),
        ident(),
        prop::collection::vec(member, 0..4),
    )
        .prop_map(|(doc, annotations, name, declarations)| {
            Declaration::Protocol(ProtocolDeclaration {
                doc,
                annotations,
                name,
                declarations,
            })
        })
}

fn schema() -> impl Strategy<Value = Declaration> {
    let target = prop_oneof![
        prop::sample::select(Primitive::ALL.to_vec()).prop_map(SchemaTarget::Primitive),
        ident().prop_map(SchemaTarget::Named),
    ];
    (prop::option::of("[a-z]{1,5}(\\.[a-z]{1,5}){0,2}"), target).prop_map(|(namespace, target)| {
        Declaration::Schema(SchemaDeclaration { namespace, target })
    })
}

fn program() -> impl Strategy<Value = Program> {
    let declaration = prop_oneof![
        protocol(),
        record().prop_map(Declaration::Record),
        error(),
        enumeration(),
        fixed(),
        import(),
        schema(),
    ];
    prop::collection::vec(declaration, 0..4).prop_map(|declarations| Program { declarations })
}

// ==============================================================================
// Properties
// ==============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn tokens_tile_any_input(source in any::<String>()) {
        let tokens = tokenize(&source);
        let mut offset = 0;
        for token in &tokens {
            prop_assert_eq!(token.span.start, offset);
            prop_assert!(token.span.end > token.span.start);
            offset = token.span.end;
        }
        prop_assert_eq!(offset, source.len());
    }

    #[test]
    fn parsing_any_string_yields_a_well_formed_tree(source in any::<String>()) {
        let tree = parse(&source).unwrap();
        assert_well_formed(&tree);
        prop_assert_eq!(tree.root().kind(), NodeKind::Program);
    }

    #[test]
    fn parsing_token_soup_yields_a_well_formed_tree(source in token_soup()) {
        let tree = parse(&source).unwrap();
        assert_well_formed(&tree);
        for error in tree.errors() {
            prop_assert_eq!(tree.node(error.node).kind(), NodeKind::Error);
        }
        // A tree with no error regions always lowers.
        if !tree.has_errors() {
            prop_assert!(tree.program().is_ok());
        }
    }

    #[test]
    fn tiny_depth_limits_still_terminate(source in token_soup(), depth in 1usize..4) {
        let mut parser = Parser::new();
        parser.max_depth(depth);
        let tree = parser.parse(&source).unwrap();
        assert_well_formed(&tree);
    }

    #[test]
    fn rendered_models_parse_back_unchanged(program in program()) {
        let rendered = render_program(&program);
        let tree = parse(&rendered).unwrap();
        prop_assert!(!tree.has_errors(), "{}\n{:?}", rendered, tree.errors());
        let reparsed = tree.program().unwrap();
        prop_assert_eq!(&reparsed, &program, "{}", rendered);
        prop_assert_eq!(render_program(&reparsed), rendered);
    }
}
