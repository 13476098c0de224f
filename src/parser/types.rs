// ==============================================================================
// Type Expressions
// ==============================================================================
//
// `_possible_types` in the grammar is ambiguous: `@a T?` could be an annotated
// nullable or a nullable annotated type. We resolve it by parse order: leading
// annotations first (emitted as siblings), then the base type, then every
// trailing `?` wraps what came before in one more `nullable`. So annotations
// always sit outside the nullable wrappers.

use super::Engine;
use crate::grammar::Keyword;
use crate::lexer::TokenKind;
use crate::syntax::{FieldName, NodeKind};

impl Engine<'_> {
    /// Zero or more annotation statements. Returns how many were parsed.
    pub(super) fn annotations(&mut self) -> usize {
        let mut count = 0;
        while self.at(TokenKind::AnnotationIdentifier) {
            self.annotation_statement();
            count += 1;
        }
        count
    }

    pub(super) fn annotation_statement(&mut self) {
        self.start_node(NodeKind::AnnotationStatement);
        self.bump(NodeKind::AnnotationIdentifier);
        self.builder.label_last(FieldName::Name);
        self.annotation_arguments();
        self.finish_node();
    }

    fn annotation_arguments(&mut self) {
        self.start_node(NodeKind::AnnotationArguments);
        if self.expect(TokenKind::LParen) {
            if self.at(TokenKind::LBracket) {
                self.bump_anon();
                self.comma_slots(TokenKind::RBracket, |engine| {
                    if engine.at_literal() {
                        engine.literal_type();
                        true
                    } else {
                        false
                    }
                });
                self.expect_closing(TokenKind::RBracket);
            } else if self.at_literal() {
                self.literal_type();
            } else {
                self.missing(
                    format!("expected an annotation value, found {}", self.found()),
                    None,
                );
            }
            self.expect_closing(TokenKind::RParen);
        }
        self.finish_node();
    }

    /// A full type expression: annotations, a base type, then `?` suffixes.
    /// The outermost type node is labelled `label`.
    pub(super) fn possible_type(&mut self, label: Option<FieldName>) {
        if !self.enter() {
            return;
        }
        self.annotations();
        self.nullable_type(label);
        self.leave();
    }

    /// A type expression whose leading annotations were already consumed.
    pub(super) fn unannotated_type(&mut self) {
        if !self.enter() {
            return;
        }
        self.nullable_type(None);
        self.leave();
    }

    fn nullable_type(&mut self, label: Option<FieldName>) {
        let cp = self.checkpoint();
        if !self.base_type() {
            self.missing(format!("expected a type, found {}", self.found()), None);
            return;
        }
        while self.at(TokenKind::Question) {
            self.start_node_at(cp, NodeKind::Nullable);
            self.bump_anon();
            self.finish_node();
        }
        if let Some(label) = label {
            self.builder.label_last(label);
        }
    }

    fn base_type(&mut self) -> bool {
        if !self.at(TokenKind::Identifier) {
            return false;
        }
        match self.current_keyword() {
            Some(keyword) if keyword.is_primitive() => self.primitive_type(),
            Some(Keyword::Array) => self.collection(NodeKind::Array),
            Some(Keyword::Map) => self.collection(NodeKind::Map),
            Some(Keyword::Union) => {
                self.start_node(NodeKind::Union);
                self.bump_anon();
                self.union_block();
                self.finish_node();
            }
            Some(Keyword::Decimal) => {
                self.start_node(NodeKind::LogicalType);
                self.start_node(NodeKind::KnownLogicalType);
                self.start_node(NodeKind::Decimal);
                self.bump_anon();
                if self.at(TokenKind::LParen) {
                    self.argument_list();
                }
                self.finish_node();
                self.finish_node();
                self.finish_node();
            }
            Some(keyword) if keyword.is_known_logical() => {
                self.start_node(NodeKind::LogicalType);
                self.start_node(NodeKind::KnownLogicalType);
                self.bump_anon();
                self.finish_node();
                self.finish_node();
            }
            _ => {
                self.start_node(NodeKind::LogicalType);
                if self.nth_at(1, TokenKind::LParen) {
                    self.call_expression();
                } else {
                    self.bump_identifier(None);
                }
                self.finish_node();
            }
        }
        true
    }

    pub(super) fn primitive_type(&mut self) {
        self.start_node(NodeKind::PrimitiveType);
        self.bump_anon();
        self.finish_node();
    }

    /// `array<T>` or `map<T>`.
    fn collection(&mut self, kind: NodeKind) {
        self.start_node(kind);
        self.bump_anon();
        self.start_node(NodeKind::TypeBlock);
        if self.expect(TokenKind::LAngle) {
            self.possible_type(None);
            self.expect_closing(TokenKind::RAngle);
        }
        self.finish_node();
        self.finish_node();
    }

    fn union_block(&mut self) {
        self.start_node(NodeKind::UnionBlock);
        if self.expect(TokenKind::LBrace) {
            if !self.at(TokenKind::RBrace) {
                loop {
                    self.possible_type(None);
                    if self.at(TokenKind::Comma) {
                        self.bump_anon();
                    } else {
                        break;
                    }
                }
            }
            self.expect_closing(TokenKind::RBrace);
        }
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use crate::syntax::{FieldName, NodeKind};
    use insta::assert_snapshot;

    /// The S-expression of the `type` field of the single field in `ty name;`.
    fn field_type(ty: &str) -> String {
        let src = format!("record R {{ {ty} f; }}");
        let tree = Parser::new().parse(&src).unwrap();
        assert!(!tree.has_errors(), "{ty}: {:?}", tree.errors());
        let field = tree
            .root()
            .descendants()
            .find(|n| n.kind() == NodeKind::FieldDeclaration)
            .unwrap();
        field.child_by_field(FieldName::Type).unwrap().to_sexp()
    }

    #[test]
    fn primitives() {
        for p in ["int", "long", "string", "boolean", "float", "double", "null", "bytes"] {
            assert_eq!(field_type(p), "(primitive_type)");
        }
    }

    #[test]
    fn known_logical_types() {
        assert_eq!(
            field_type("date"),
            "(logical_type (known_logical_type))"
        );
        assert_snapshot!(
            field_type("decimal(9, 2)"),
            @"(logical_type (known_logical_type (decimal (argument_list (literal_type (number)) (literal_type (number))))))"
        );
        assert_snapshot!(
            field_type("decimal"),
            @"(logical_type (known_logical_type (decimal)))"
        );
    }

    #[test]
    fn named_and_custom_logical_types() {
        assert_eq!(field_type("Address"), "(logical_type (identifier))");
        assert_snapshot!(
            field_type("geo(precision = 7)"),
            @"(logical_type (call_expression (identifier) (argument_list (assignment_expression right: (identifier) left: (literal_type (number))))))"
        );
    }

    #[test]
    fn collections() {
        assert_snapshot!(
            field_type("map<array<long>>"),
            @"(map (type_block (array (type_block (primitive_type)))))"
        );
        assert_snapshot!(field_type("union {}"), @"(union (union_block))");
    }

    #[test]
    fn nullable_wraps_once_per_question_mark() {
        assert_eq!(field_type("Foo?"), "(nullable (logical_type (identifier)))");
        assert_eq!(
            field_type("array<int?>?"),
            "(nullable (array (type_block (nullable (primitive_type)))))"
        );
    }

    #[test]
    fn annotations_stay_outside_the_nullable() {
        let tree = Parser::new()
            .parse(r#"record R { @java-class("x.Y") string? name; }"#)
            .unwrap();
        assert!(!tree.has_errors());
        let field = tree
            .root()
            .descendants()
            .find(|n| n.kind() == NodeKind::FieldDeclaration)
            .unwrap();
        let kinds: Vec<_> = field.named_children().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            [
                NodeKind::AnnotationStatement,
                NodeKind::Nullable,
                NodeKind::Identifier
            ]
        );
    }

    #[test]
    fn annotation_array_arguments_allow_empty_slots() {
        let tree = Parser::new()
            .parse(r#"record R { string @aliases(["a", , "b",]) name; }"#)
            .unwrap();
        assert!(!tree.has_errors(), "{:?}", tree.errors());
        let args = tree
            .root()
            .descendants()
            .find(|n| n.kind() == NodeKind::AnnotationArguments)
            .unwrap();
        assert_eq!(args.named_children().count(), 2);
    }

    #[test]
    fn union_rejects_empty_member_slots() {
        let tree = Parser::new().parse("record R { union { int, , string } u; }").unwrap();
        assert!(tree.has_errors());
        assert!(tree.errors()[0].message.starts_with("expected a type"));
    }
}
