// ==============================================================================
// Declarations
// ==============================================================================
//
// program, protocol_block, and every declaration they can hold. Leading
// annotations are parsed first and then attached to whatever follows by
// starting the declaration node at a checkpoint taken before them.

use super::Engine;
use crate::grammar::Keyword;
use crate::lexer::TokenKind;
use crate::suggest;
use crate::syntax::{Checkpoint, ErrorKind, FieldName, NodeKind};

/// Which declarations are legal at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Scope {
    Program,
    Protocol,
}

impl Engine<'_> {
    /// Parse one declaration, if the cursor is at the start of one. Makes no
    /// progress otherwise; the caller decides how to recover.
    pub(super) fn declaration(&mut self, scope: Scope) {
        if !self.enter() {
            return;
        }
        let cp = self.checkpoint();
        let annotated = self.annotations() > 0;

        match self.current_keyword() {
            Some(Keyword::Protocol) => {
                if scope == Scope::Protocol {
                    self.start_node_at(cp, NodeKind::Error);
                    self.protocol_declaration(cp);
                    self.finish_illegal("protocols cannot be nested".to_string());
                } else {
                    self.protocol_declaration(cp);
                }
            }
            Some(Keyword::Record) => self.record_declaration(cp),
            Some(Keyword::Enum) => self.enum_declaration(cp),
            Some(
                keyword @ (Keyword::Error
                | Keyword::Fixed
                | Keyword::Import
                | Keyword::Schema
                | Keyword::Namespace),
            ) => {
                if annotated {
                    self.start_node_at(cp, NodeKind::Error);
                    self.finish_illegal(format!(
                        "annotations are not allowed on `{keyword}` declarations"
                    ));
                }
                let top_level_only =
                    matches!(keyword, Keyword::Schema | Keyword::Namespace) && scope == Scope::Protocol;
                let inner = self.checkpoint();
                if top_level_only {
                    self.start_node_at(inner, NodeKind::Error);
                }
                match keyword {
                    Keyword::Error => self.error_declaration(),
                    Keyword::Fixed => self.fixed_declaration(),
                    Keyword::Import => self.import_declaration(),
                    _ => self.schema_declaration(),
                }
                if top_level_only {
                    self.finish_illegal(format!(
                        "`{keyword}` is only allowed at the top level, outside any protocol"
                    ));
                }
            }
            _ if self.at(TokenKind::Identifier) => self.rpc_message_declaration(cp, annotated),
            _ if annotated => {
                self.start_node_at(cp, NodeKind::Error);
                self.finish_illegal(format!(
                    "expected a declaration after the annotation, found {}",
                    self.found()
                ));
            }
            _ => {}
        }
        self.leave();
    }

    /// Close an `ERROR` node wrapping a construct that parsed but is not
    /// allowed where it appears.
    fn finish_illegal(&mut self, message: String) {
        let id = self.finish_node();
        self.builder.record_error(id, ErrorKind::Syntax, message, None);
    }

    pub(super) fn expect_semicolon(&mut self) {
        if self.at(TokenKind::Semicolon) {
            self.bump_anon();
            return;
        }
        self.recover_to(&[], format!("expected `;`, found {}", self.found()), None);
        if self.at(TokenKind::Semicolon) {
            self.bump_anon();
        }
    }

    /// Consume the closing delimiter `close`, skipping junk in front of it.
    pub(super) fn expect_closing(&mut self, close: TokenKind) -> bool {
        if self.at(close) {
            self.bump_anon();
            return true;
        }
        self.recover_to(
            &[close],
            format!("expected {}, found {}", close.describe(), self.found()),
            None,
        );
        if self.at(close) {
            self.bump_anon();
            true
        } else {
            false
        }
    }

    /// A comma-separated list whose slots may be empty: `(a, , b,)`. `item`
    /// returns `false` without consuming anything when the cursor is not at an
    /// item.
    pub(super) fn comma_slots(&mut self, close: TokenKind, mut item: impl FnMut(&mut Self) -> bool) {
        loop {
            if self.at(close) || self.at_eof() {
                break;
            }
            if self.at(TokenKind::Comma) {
                self.bump_anon();
                continue;
            }
            if !item(self) {
                break;
            }
            if self.at(TokenKind::Comma) {
                self.bump_anon();
            } else {
                break;
            }
        }
    }

    // ==========================================================================
    // protocol
    // ==========================================================================

    fn protocol_declaration(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, NodeKind::ProtocolDeclaration);
        self.bump_anon();
        self.expect_identifier(Some(FieldName::Name), "a protocol name");
        self.protocol_block();
        self.finish_node();
    }

    fn protocol_block(&mut self) {
        self.start_node(NodeKind::ProtocolBlock);
        if self.expect(TokenKind::LBrace) {
            loop {
                if self.at(TokenKind::RBrace) {
                    self.bump_anon();
                    break;
                }
                if self.at_eof() {
                    self.missing(
                        "expected `}` to close the protocol body, found end of input".to_string(),
                        None,
                    );
                    break;
                }
                let before = self.pos;
                self.declaration(Scope::Protocol);
                if self.pos == before {
                    self.force_recover(format!(
                        "expected a declaration, found {}",
                        self.found()
                    ));
                }
            }
        }
        self.finish_node();
    }

    // ==========================================================================
    // record / error
    // ==========================================================================

    fn record_declaration(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, NodeKind::RecordDeclaration);
        self.bump_anon();
        self.expect_identifier(Some(FieldName::Name), "a record name");
        self.statement_block();
        self.finish_node();
    }

    fn error_declaration(&mut self) {
        self.start_node(NodeKind::ErrorDeclaration);
        self.bump_anon();
        self.expect_identifier(Some(FieldName::Name), "an error name");
        self.statement_block();
        self.finish_node();
    }

    fn statement_block(&mut self) {
        self.start_node(NodeKind::StatementBlock);
        if self.expect(TokenKind::LBrace) {
            loop {
                if self.at(TokenKind::RBrace) {
                    self.bump_anon();
                    break;
                }
                if self.at_eof() || self.at_declaration_keyword() {
                    self.missing(
                        format!("expected `}}` to close the record body, found {}", self.found()),
                        None,
                    );
                    break;
                }
                if self.at(TokenKind::Identifier) || self.at(TokenKind::AnnotationIdentifier) {
                    self.field_declaration();
                } else {
                    self.force_recover(format!(
                        "expected a field declaration, found {}",
                        self.found()
                    ));
                }
            }
        }
        self.finish_node();
    }

    fn field_declaration(&mut self) {
        self.start_node(NodeKind::FieldDeclaration);
        self.possible_type(Some(FieldName::Type));
        if self.at(TokenKind::AnnotationIdentifier) {
            self.annotation_statement();
        }
        if self.at(TokenKind::Identifier) {
            if self.nth_at(1, TokenKind::Equals) {
                self.default_value_expression();
            } else {
                self.bump_identifier(Some(FieldName::Name));
            }
        } else {
            self.missing(format!("expected a field name, found {}", self.found()), None);
        }
        self.expect_semicolon();
        self.finish_node();
    }

    // ==========================================================================
    // enum
    // ==========================================================================

    fn enum_declaration(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, NodeKind::EnumDeclaration);
        self.bump_anon();
        self.expect_identifier(Some(FieldName::Name), "an enum name");
        self.enum_block();
        if self.at(TokenKind::Equals) {
            self.default_enumeral();
        }
        self.finish_node();
    }

    fn enum_block(&mut self) {
        self.start_node(NodeKind::EnumBlock);
        if self.expect(TokenKind::LBrace) {
            loop {
                if self.at(TokenKind::RBrace) {
                    self.bump_anon();
                    break;
                }
                // A keyword followed by `,` or `}` is just a symbol spelled like one.
                let keyword_symbol =
                    self.nth_at(1, TokenKind::Comma) || self.nth_at(1, TokenKind::RBrace);
                if self.at_eof() || (self.at_declaration_keyword() && !keyword_symbol) {
                    self.missing(
                        format!("expected `}}` to close the enum body, found {}", self.found()),
                        None,
                    );
                    break;
                }
                if self.at(TokenKind::Identifier) {
                    self.start_node(NodeKind::Enumeral);
                    self.bump_identifier(None);
                    self.finish_node();
                    if self.at(TokenKind::Comma) {
                        self.bump_anon();
                    }
                } else {
                    self.unexpected(format!("expected an enum symbol, found {}", self.found()));
                }
            }
        }
        self.finish_node();
    }

    fn default_enumeral(&mut self) {
        self.start_node(NodeKind::DefaultEnumeral);
        self.bump_anon();
        self.expect_identifier(None, "a default enum symbol");
        self.expect_semicolon();
        self.finish_node();
    }

    // ==========================================================================
    // fixed / import
    // ==========================================================================

    fn fixed_declaration(&mut self) {
        self.start_node(NodeKind::FixedDeclaration);
        self.bump_anon();
        if self.at(TokenKind::Identifier) {
            if self.nth_at(1, TokenKind::LParen) {
                self.call_expression();
            } else {
                self.bump_identifier(None);
            }
        } else {
            self.missing(
                format!("expected a fixed type name, found {}", self.found()),
                None,
            );
        }
        self.expect_semicolon();
        self.finish_node();
    }

    fn import_declaration(&mut self) {
        self.start_node(NodeKind::ImportDeclaration);
        self.bump_anon();
        self.expect_identifier(None, "an import kind such as `idl`");
        if self.at_literal() {
            self.literal_type();
        } else {
            self.missing(
                format!("expected the imported file name, found {}", self.found()),
                None,
            );
        }
        self.expect_semicolon();
        self.finish_node();
    }

    // ==========================================================================
    // schema / namespace
    // ==========================================================================

    fn schema_declaration(&mut self) {
        self.start_node(NodeKind::SchemaDeclaration);
        if self.at_keyword(Keyword::Namespace) {
            self.namespace_statement();
        }
        if !self.at_keyword(Keyword::Schema) {
            self.missing(format!("expected `schema`, found {}", self.found()), None);
            self.finish_node();
            return;
        }
        self.bump_anon();
        if self.current_keyword().is_some_and(Keyword::is_primitive) {
            self.primitive_type();
        } else {
            self.expect_identifier(None, "a schema type");
        }
        self.expect_semicolon();
        self.finish_node();
    }

    fn namespace_statement(&mut self) {
        self.start_node(NodeKind::NamespaceStatement);
        self.bump_anon();
        if self.at(TokenKind::NamespaceIdentifier) {
            self.bump(NodeKind::NamespaceIdentifier);
        } else {
            self.missing(format!("expected a namespace, found {}", self.found()), None);
        }
        self.expect_semicolon();
        self.finish_node();
    }

    // ==========================================================================
    // rpc messages
    // ==========================================================================

    fn rpc_message_declaration(&mut self, cp: Checkpoint, annotated: bool) {
        // A mistyped declaration keyword (`recrod Foo {}`) reads as a message
        // returning `recrod`; remember the word so the failure can say so.
        let typo = if annotated {
            None
        } else {
            self.current()
                .map(|t| self.text(t))
                .filter(|text| Keyword::from_text(text).is_none())
                .and_then(|text| suggest::closest(text, Keyword::declarations().map(Keyword::as_str)))
        };

        self.start_node_at(cp, NodeKind::RpcMessageDeclaration);
        self.start_node_at(cp, NodeKind::ReturnValue);
        if self.at_keyword(Keyword::Void) {
            if annotated {
                self.start_node_at(cp, NodeKind::Error);
                self.bump(NodeKind::Void);
                self.finish_illegal("a `void` return type cannot be annotated".to_string());
            } else {
                self.bump(NodeKind::Void);
            }
        } else {
            self.unannotated_type();
        }
        self.finish_node();

        self.expect_identifier(Some(FieldName::Name), "a message name");
        if self.at(TokenKind::LParen) {
            self.parameter_list();
        } else {
            self.recover_to(
                &[],
                format!("expected `(` to start the parameter list, found {}", self.found()),
                typo.map(|kw| format!("did you mean `{kw}`?")),
            );
        }

        if self.at_keyword(Keyword::Throws) {
            self.start_node(NodeKind::ThrowStatement);
            self.bump_anon();
            self.expect_identifier(None, "an error type name");
            self.finish_node();
        } else if self.at_keyword(Keyword::Oneway) {
            self.bump(NodeKind::Oneway);
        }
        self.expect_semicolon();
        self.finish_node();
    }

    fn parameter_list(&mut self) {
        self.start_node(NodeKind::ParameterList);
        self.bump_anon();
        self.comma_slots(TokenKind::RParen, |engine| {
            if engine.at(TokenKind::Identifier) || engine.at(TokenKind::AnnotationIdentifier) {
                engine.parameter();
                true
            } else {
                false
            }
        });
        self.expect_closing(TokenKind::RParen);
        self.finish_node();
    }

    fn parameter(&mut self) {
        self.start_node(NodeKind::Parameter);
        self.possible_type(Some(FieldName::Type));
        if self.at(TokenKind::Identifier) {
            if self.nth_at(1, TokenKind::Equals) {
                self.default_value_expression();
                self.builder.label_last(FieldName::Name);
            } else {
                self.bump_identifier(Some(FieldName::Name));
            }
        } else {
            self.missing(
                format!("expected a parameter name, found {}", self.found()),
                None,
            );
        }
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use crate::syntax::{ErrorKind, FieldName, NodeKind, SyntaxTree};
    use insta::assert_snapshot;

    fn parse(src: &str) -> SyntaxTree {
        Parser::new().parse(src).unwrap()
    }

    fn sexp(src: &str) -> String {
        let tree = parse(src);
        assert!(!tree.has_errors(), "{:?}", tree.errors());
        tree.to_sexp()
    }

    #[test]
    fn annotated_protocol_with_messages() {
        assert_snapshot!(
            sexp(r#"@namespace("org.example") protocol Svc { void ping(); string echo(string msg, int times = 1) throws Oops; void fire(int x) oneway; }"#),
            @r#"(program (protocol_declaration (annotation_statement name: (annotation_identifier) (annotation_arguments (literal_type (string)))) name: (identifier) (protocol_block (rpc_message_declaration (return_value (void)) name: (identifier) (parameter_list)) (rpc_message_declaration (return_value (primitive_type)) name: (identifier) (parameter_list (parameter type: (primitive_type) name: (identifier)) (parameter type: (primitive_type) name: (default_value_expression left: (identifier) right: (value (literal_type (number)))))) (throw_statement (identifier))) (rpc_message_declaration (return_value (void)) name: (identifier) (parameter_list (parameter type: (primitive_type) name: (identifier))) (oneway)))))"#
        );
    }

    #[test]
    fn schema_mode() {
        assert_snapshot!(
            sexp("namespace org.example.v1; schema Envelope; record Envelope { string id; }"),
            @"(program (schema_declaration (namespace_statement (namespace_identifier)) (identifier)) (record_declaration name: (identifier) (statement_block (field_declaration type: (primitive_type) name: (identifier)))))"
        );
        assert_snapshot!(sexp("schema int;"), @"(program (schema_declaration (primitive_type)))");
    }

    #[test]
    fn enum_with_default() {
        assert_snapshot!(
            sexp("enum Suit { SPADES, HEARTS, } = SPADES;"),
            @"(program (enum_declaration name: (identifier) (enum_block (enumeral (identifier)) (enumeral (identifier))) (default_enumeral (identifier))))"
        );
    }

    #[test]
    fn enum_symbols_spelled_like_keywords() {
        let tree = parse("enum Kind { record, error }");
        assert!(!tree.has_errors(), "{:?}", tree.errors());
        let count = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == NodeKind::Enumeral)
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn fixed_and_error() {
        assert_snapshot!(
            sexp("fixed MD5(16); fixed Hash; error Oops { string why; }"),
            @"(program (fixed_declaration (call_expression (identifier) (argument_list (literal_type (number))))) (fixed_declaration (identifier)) (error_declaration name: (identifier) (statement_block (field_declaration type: (primitive_type) name: (identifier)))))"
        );
    }

    #[test]
    fn annotated_rpc_return_type() {
        let tree = parse(r#"@deprecated(true) int count();"#);
        assert!(!tree.has_errors());
        let rpc = tree.root().named_children().next().unwrap();
        assert_eq!(rpc.kind(), NodeKind::RpcMessageDeclaration);
        let ret = rpc.child_of_kind(NodeKind::ReturnValue).unwrap();
        let kinds: Vec<_> = ret.named_children().map(|n| n.kind()).collect();
        assert_eq!(kinds, [NodeKind::AnnotationStatement, NodeKind::PrimitiveType]);
        assert_eq!(rpc.child_by_field(FieldName::Name).unwrap().text(), "count");
    }

    #[test]
    fn multiple_leading_annotations() {
        let tree = parse(r#"@a(1) @b("x") record R {}"#);
        assert!(!tree.has_errors());
        let record = tree.root().named_children().next().unwrap();
        assert_eq!(record.kind(), NodeKind::RecordDeclaration);
        assert_eq!(
            record
                .named_children()
                .filter(|n| n.kind() == NodeKind::AnnotationStatement)
                .count(),
            2
        );
    }

    #[test]
    fn nested_protocol_is_an_error() {
        let tree = parse("protocol A { protocol B { record R {} } record S {} }");
        assert_eq!(tree.errors().len(), 1);
        assert_eq!(tree.errors()[0].message, "protocols cannot be nested");
        let err = tree.node(tree.errors()[0].node);
        assert_eq!(err.text(), "protocol B { record R {} }");
        let inner = err.named_children().next().unwrap();
        assert_eq!(inner.kind(), NodeKind::ProtocolDeclaration);
        let records = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == NodeKind::RecordDeclaration)
            .count();
        assert_eq!(records, 2);
    }

    #[test]
    fn schema_inside_protocol_is_an_error() {
        let tree = parse("protocol A { schema int; }");
        assert_eq!(tree.errors().len(), 1);
        assert!(tree.errors()[0].message.contains("only allowed at the top level"));
    }

    #[test]
    fn annotations_on_imports_are_rejected_but_the_import_parses() {
        let tree = parse(r#"@x(1) import idl "a.avdl";"#);
        assert_eq!(tree.errors().len(), 1);
        assert_eq!(tree.errors()[0].kind, ErrorKind::Syntax);
        let kinds: Vec<_> = tree.root().named_children().map(|n| n.kind()).collect();
        assert_eq!(kinds, [NodeKind::Error, NodeKind::ImportDeclaration]);
    }

    #[test]
    fn keyword_typo_gets_a_hint() {
        let tree = parse("recrod Foo { }");
        assert!(tree.has_errors());
        let hinted = tree.errors().iter().find(|e| e.help.is_some()).unwrap();
        assert_eq!(hinted.help.as_deref(), Some("did you mean `record`?"));
    }

    #[test]
    fn empty_parameter_slots() {
        let tree = parse("void f(, int a, , string b,);");
        assert!(!tree.has_errors(), "{:?}", tree.errors());
        let params = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == NodeKind::Parameter)
            .count();
        assert_eq!(params, 2);
    }

    #[test]
    fn junk_in_parameter_list_is_recovered_up_to_the_paren() {
        let tree = parse("void f(int a 1 2) ; record R {}");
        assert_eq!(tree.errors().len(), 1);
        assert_eq!(tree.errors()[0].kind, ErrorKind::Recovered);
        assert!(
            tree.root()
                .named_children()
                .any(|n| n.kind() == NodeKind::RecordDeclaration)
        );
    }
}
