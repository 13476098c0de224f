// ==============================================================================
// Expressions
// ==============================================================================
//
// Literals, identifiers, calls, and assignments, as they appear in argument
// lists (`decimal(9, 2)`, `fixed MD5(16)`, custom logical types) and default
// values. Binding strength comes from the grammar's precedence table: a call
// binds at `CALL`, an assignment at `ASSIGN` and associates to the right, so
// `a = b = 1` nests as `a = (b = 1)`.

use super::Engine;
use crate::grammar::{Assoc, Prec};
use crate::lexer::TokenKind;
use crate::syntax::{FieldName, NodeKind};

impl Engine<'_> {
    pub(super) fn literal_type(&mut self) {
        let Some(token) = self.current() else {
            return;
        };
        let kind = match token.kind {
            TokenKind::Number => NodeKind::Number,
            TokenKind::String => NodeKind::String,
            _ => match self.text(token) {
                "true" => NodeKind::True,
                "false" => NodeKind::False,
                _ => NodeKind::Null,
            },
        };
        self.start_node(NodeKind::LiteralType);
        self.bump(kind);
        self.finish_node();
    }

    pub(super) fn call_expression(&mut self) {
        self.start_node(NodeKind::CallExpression);
        self.bump_identifier(None);
        self.argument_list();
        self.finish_node();
    }

    pub(super) fn argument_list(&mut self) {
        self.start_node(NodeKind::ArgumentList);
        self.bump_anon();
        self.comma_slots(TokenKind::RParen, |engine| {
            if engine.at_literal() || engine.at(TokenKind::Identifier) {
                engine.expression(Prec::Assign);
                true
            } else {
                false
            }
        });
        self.expect_closing(TokenKind::RParen);
        self.finish_node();
    }

    /// An expression binding at least as tightly as `min`.
    fn expression(&mut self, min: Prec) {
        if !self.enter() {
            return;
        }
        if self.at_literal() {
            self.literal_type();
        } else if self.at(TokenKind::Identifier) {
            if self.nth_at(1, TokenKind::LParen) && Prec::Call >= min {
                self.call_expression();
            } else if self.nth_at(1, TokenKind::Equals) && Prec::Assign >= min {
                self.assignment_expression();
            } else {
                self.bump_identifier(None);
            }
        } else {
            self.missing(
                format!("expected an expression, found {}", self.found()),
                None,
            );
        }
        self.leave();
    }

    fn assignment_expression(&mut self) {
        self.start_node(NodeKind::AssignmentExpression);
        self.bump_identifier(Some(FieldName::Right));
        self.bump_anon();
        let rhs = match Prec::Assign.assoc() {
            Assoc::Right => Prec::Assign,
            Assoc::Left | Assoc::None => Prec::Comment,
        };
        self.expression(rhs);
        if self.builder.last_kind() != Some(NodeKind::Error) {
            self.builder.label_last(FieldName::Left);
        }
        self.finish_node();
    }

    /// `name = value`, where the value is a literal or an identifier.
    pub(super) fn default_value_expression(&mut self) {
        self.start_node(NodeKind::DefaultValueExpression);
        self.bump_identifier(Some(FieldName::Left));
        self.bump_anon();
        self.start_node(NodeKind::Value);
        if self.at_literal() {
            self.literal_type();
        } else if self.at(TokenKind::Identifier) {
            self.bump_identifier(None);
        } else {
            self.missing(
                format!("expected a default value, found {}", self.found()),
                None,
            );
        }
        self.finish_node();
        self.builder.label_last(FieldName::Right);
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use insta::assert_snapshot;

    fn fixed_size(args: &str) -> String {
        let tree = Parser::new().parse(&format!("fixed F({args});")).unwrap();
        assert!(!tree.has_errors(), "{args}: {:?}", tree.errors());
        let call = tree
            .root()
            .descendants()
            .find(|n| n.kind() == crate::syntax::NodeKind::ArgumentList)
            .unwrap();
        call.to_sexp()
    }

    #[test]
    fn literals() {
        assert_snapshot!(
            fixed_size(r#"1, -2.5e3, "s", 'c', true, false, null"#),
            @"(argument_list (literal_type (number)) (literal_type (number)) (literal_type (string)) (literal_type (string)) (literal_type (true)) (literal_type (false)) (literal_type (null)))"
        );
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_snapshot!(
            fixed_size("a = b = 1"),
            @"(argument_list (assignment_expression right: (identifier) left: (assignment_expression right: (identifier) left: (literal_type (number)))))"
        );
    }

    #[test]
    fn nested_calls_and_empty_slots() {
        assert_snapshot!(
            fixed_size("outer(inner(1), , x)"),
            @"(argument_list (call_expression (identifier) (argument_list (call_expression (identifier) (argument_list (literal_type (number)))) (identifier))))"
        );
        assert_eq!(fixed_size(""), "(argument_list)");
    }

    #[test]
    fn default_value_expression_wraps_a_value() {
        let tree = Parser::new()
            .parse("record R { string s = \"x\"; Kind k = FIRST; }")
            .unwrap();
        assert!(!tree.has_errors());
        let defaults: Vec<_> = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == crate::syntax::NodeKind::DefaultValueExpression)
            .map(|n| n.to_sexp())
            .collect();
        assert_eq!(
            defaults,
            [
                "(default_value_expression left: (identifier) right: (value (literal_type (string))))",
                "(default_value_expression left: (identifier) right: (value (identifier)))",
            ]
        );
    }

    #[test]
    fn missing_assignment_value() {
        let tree = Parser::new().parse("fixed F(a = );").unwrap();
        assert_eq!(tree.errors().len(), 1);
        assert!(tree.errors()[0].message.starts_with("expected an expression"));
    }
}
