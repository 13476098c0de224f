// ==============================================================================
// Error Recovery
// ==============================================================================
//
// Three ways out of a failed match:
//
// - `missing`: a required token is absent. Emit a zero-width `ERROR` right
//   after the last emitted token and carry on as if it had been there.
// - `recover_to`: the current token is wrong. Wrap it, and everything up to the
//   next statement boundary or production-specific stop token, in an `ERROR`.
//   If the cursor already sits on a boundary, this degrades to `missing`.
// - `force_recover`: like `recover_to`, but always consumes at least one token.
//   Loops that made no progress call this, which is what guarantees every
//   parse terminates.
//
// Statement boundaries are `;`, `}`, and declaration keywords.

use super::Engine;
use crate::lexer::TokenKind;
use crate::syntax::{ErrorKind, NodeKind, Span};

impl Engine<'_> {
    /// Whether the cursor sits on a statement boundary.
    pub(super) fn at_sync_point(&self) -> bool {
        self.at(TokenKind::Semicolon) || self.at(TokenKind::RBrace) || self.at_declaration_keyword()
    }

    fn at_any(&self, stops: &[TokenKind]) -> bool {
        stops.iter().any(|&k| self.at(k))
    }

    /// Record a zero-width `ERROR` at the end of the last emitted token.
    pub(super) fn missing(&mut self, message: String, help: Option<String>) {
        tracing::trace!(at = self.last_end, %message, "missing token");
        let id = self.builder.leaf(NodeKind::Error, Span::empty(self.last_end));
        self.builder.record_error(id, ErrorKind::Syntax, message, help);
    }

    /// Skip unexpected tokens up to a statement boundary or one of `stops`,
    /// wrapping them in an `ERROR`. Boundaries and stop tokens are not consumed.
    pub(super) fn recover_to(&mut self, stops: &[TokenKind], message: String, help: Option<String>) {
        if self.at_eof() || self.at_sync_point() || self.at_any(stops) {
            self.missing(message, help);
            return;
        }
        self.start_node(NodeKind::Error);
        let mut skipped = 0;
        while !self.at_eof() && !self.at_sync_point() && !self.at_any(stops) {
            self.bump_skipped();
            skipped += 1;
        }
        self.finish_error(skipped, message, help);
    }

    /// Skip at least one token, then up to the next statement boundary. A `;`
    /// that ends the skipped region is consumed with it.
    pub(super) fn force_recover(&mut self, message: String) {
        if self.at_eof() {
            self.missing(message, None);
            return;
        }
        self.start_node(NodeKind::Error);
        let first_was_semicolon = self.at(TokenKind::Semicolon);
        self.bump_skipped();
        let mut skipped = 1;
        if !first_was_semicolon {
            while !self.at_eof() && !self.at_sync_point() {
                self.bump_skipped();
                skipped += 1;
            }
            if self.at(TokenKind::Semicolon) {
                self.bump_anon();
            }
        }
        self.finish_error(skipped, message, None);
    }

    /// Wrap exactly the current token in an `ERROR`.
    pub(super) fn unexpected(&mut self, message: String) {
        if self.at_eof() {
            self.missing(message, None);
            return;
        }
        self.start_node(NodeKind::Error);
        self.bump_skipped();
        self.finish_error(1, message, None);
    }

    fn finish_error(&mut self, skipped: usize, message: String, help: Option<String>) {
        let id = self.finish_node();
        let kind = if skipped > 1 {
            ErrorKind::Recovered
        } else {
            ErrorKind::Syntax
        };
        tracing::debug!(skipped, ?kind, %message, "recovered from syntax error");
        self.builder.record_error(id, kind, message, help);
    }

    /// Consume the current token inside an error region, keeping its leaf kind.
    fn bump_skipped(&mut self) {
        let kind = match self.current().map(|t| t.kind) {
            Some(TokenKind::Identifier) => NodeKind::Identifier,
            Some(TokenKind::NamespaceIdentifier) => NodeKind::NamespaceIdentifier,
            Some(TokenKind::AnnotationIdentifier) => NodeKind::AnnotationIdentifier,
            Some(TokenKind::String) => NodeKind::String,
            Some(TokenKind::Number) => NodeKind::Number,
            _ => NodeKind::Anonymous,
        };
        self.bump(kind);
    }
}
