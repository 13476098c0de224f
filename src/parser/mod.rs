// ==============================================================================
// Grammar Engine
// ==============================================================================
//
// A hand-written recursive-descent parser over the token stream produced by
// `lexer`. Each nonterminal of the grammar is one method on `Engine`, split by
// area:
//
// - `decl`: program, protocol, record/error/enum/fixed/import/schema and RPC
//   message declarations, plus the blocks they own.
// - `types`: type expressions, annotations, and the annotated-vs-nullable
//   resolution.
// - `expr`: literals, call/assignment expressions, default values.
// - `recovery`: missing-token and skip-to-boundary error handling.
//
// The engine never builds nodes itself. It emits events into a `TreeBuilder`.
// Whitespace is dropped; comments and lexical-error tokens are flushed into the
// tree lazily, right before the next node or significant token, so they land
// between the siblings they appear between in the source.

mod decl;
mod expr;
mod recovery;
mod types;

use crate::error::Error;
use crate::grammar::Keyword;
use crate::lexer::{self, Token, TokenKind};
use crate::syntax::{Checkpoint, ErrorKind, FieldName, NodeKind, Span, SyntaxTree, TreeBuilder};

/// Default cap on input size in bytes.
pub const DEFAULT_MAX_INPUT_LEN: usize = 64 * 1024 * 1024;

/// Default cap on syntactic nesting (types inside types, calls inside calls).
pub const DEFAULT_MAX_DEPTH: usize = 256;

const DEFAULT_SOURCE_NAME: &str = "<input>";

// ==============================================================================
// Public API
// ==============================================================================

/// Parse Avro IDL source into a [`SyntaxTree`].
///
/// This is a non-consuming builder: configure it once and call
/// [`parse`](Parser::parse) as often as needed.
///
/// ```
/// use avdl_syntax::Parser;
///
/// let tree = Parser::new()
///     .max_depth(64)
///     .parse("record Point { double x; double y; }")?;
/// assert!(!tree.has_errors());
/// # Ok::<(), avdl_syntax::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    max_input_len: usize,
    max_depth: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            max_input_len: DEFAULT_MAX_INPUT_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Reject inputs longer than `len` bytes with [`Error::InputTooLarge`].
    pub fn max_input_len(&mut self, len: usize) -> &mut Self {
        self.max_input_len = len;
        self
    }

    /// Bound how deeply constructs may nest before the rest of the construct is
    /// turned into an error region.
    pub fn max_depth(&mut self, depth: usize) -> &mut Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Parse `source`. Malformed input still produces a tree; the only failure
    /// is an input over the configured size limit.
    pub fn parse(&self, source: &str) -> Result<SyntaxTree, Error> {
        self.parse_named(DEFAULT_SOURCE_NAME, source)
    }

    /// Like [`parse`](Parser::parse), with a source name (usually a file path)
    /// used in diagnostics.
    #[tracing::instrument(skip_all, fields(name = %name.as_ref(), source_len = source.len()))]
    pub fn parse_named(&self, name: impl AsRef<str>, source: &str) -> Result<SyntaxTree, Error> {
        if source.len() > self.max_input_len {
            return Err(Error::InputTooLarge {
                len: source.len(),
                limit: self.max_input_len,
            });
        }

        let tokens = lexer::tokenize(source);
        let mut engine = Engine::new(source, tokens, self.max_depth);
        engine.program();
        let (nodes, root, errors) = engine.builder.finish(Span::new(0, source.len()));
        tracing::debug!(nodes = nodes.len(), errors = errors.len(), "parsed");
        Ok(SyntaxTree::new(
            name.as_ref().to_string(),
            source.to_string(),
            nodes,
            root,
            errors,
        ))
    }
}

// ==============================================================================
// Engine
// ==============================================================================

pub(crate) struct Engine<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    /// Indices into `tokens` of everything the grammar looks at: not trivia,
    /// not lexical errors.
    significant: Vec<usize>,
    /// Cursor into `significant`.
    pos: usize,
    /// First raw token not yet emitted into the tree.
    next_raw: usize,
    /// End offset of the last leaf emitted into the tree.
    last_end: usize,
    depth: usize,
    max_depth: usize,
    builder: TreeBuilder,
}

impl<'s> Engine<'s> {
    fn new(source: &'s str, tokens: Vec<Token>, max_depth: usize) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_trivia() && t.kind != TokenKind::Error)
            .map(|(i, _)| i)
            .collect();
        Engine {
            source,
            tokens,
            significant,
            pos: 0,
            next_raw: 0,
            last_end: 0,
            depth: 0,
            max_depth,
            builder: TreeBuilder::new(),
        }
    }

    // ==========================================================================
    // Lookahead
    // ==========================================================================

    fn nth(&self, n: usize) -> Option<Token> {
        self.significant
            .get(self.pos + n)
            .map(|&raw| self.tokens[raw])
    }

    fn current(&self) -> Option<Token> {
        self.nth(0)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.significant.len()
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.nth_at(0, kind)
    }

    fn nth_at(&self, n: usize, kind: TokenKind) -> bool {
        self.nth(n).is_some_and(|t| t.kind == kind)
    }

    fn text(&self, token: Token) -> &'s str {
        token.text(self.source)
    }

    /// The keyword the current identifier spells, if any.
    fn current_keyword(&self) -> Option<Keyword> {
        self.current()
            .filter(|t| t.kind == TokenKind::Identifier)
            .and_then(|t| Keyword::from_text(self.text(t)))
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        self.current_keyword() == Some(keyword)
    }

    fn at_declaration_keyword(&self) -> bool {
        self.current_keyword().is_some_and(Keyword::is_declaration)
    }

    /// `true`, `false`, `null`, a number, or a string.
    fn at_literal(&self) -> bool {
        match self.current() {
            Some(t) => match t.kind {
                TokenKind::Number | TokenKind::String => true,
                TokenKind::Identifier => matches!(self.text(t), "true" | "false" | "null"),
                _ => false,
            },
            None => false,
        }
    }

    /// A short description of the current token for error messages.
    fn found(&self) -> String {
        match self.current() {
            Some(t) if t.kind == TokenKind::Identifier => format!("`{}`", self.text(t)),
            Some(t) => t.kind.describe().to_string(),
            None => "end of input".to_string(),
        }
    }

    // ==========================================================================
    // Tree events
    // ==========================================================================

    /// Emit comments and lexical errors that precede raw token `until`.
    fn flush_trivia(&mut self, until: usize) {
        while self.next_raw < until {
            let token = self.tokens[self.next_raw];
            self.next_raw += 1;
            match token.kind {
                TokenKind::Comment => {
                    self.builder.leaf(NodeKind::Comment, token.span);
                    self.last_end = token.span.end;
                }
                TokenKind::Error => {
                    let id = self.builder.leaf(NodeKind::Error, token.span);
                    self.last_end = token.span.end;
                    let kind = token.error.unwrap_or(lexer::LexErrorKind::UnexpectedCharacter);
                    let message = match kind {
                        lexer::LexErrorKind::UnexpectedCharacter => {
                            format!("unexpected character `{}`", token.text(self.source))
                        }
                        _ => kind.message().to_string(),
                    };
                    self.builder.record_error(
                        id,
                        ErrorKind::Lexical,
                        message,
                        kind.help().map(str::to_string),
                    );
                }
                _ => {}
            }
        }
    }

    /// Flush trivia that precedes the current token.
    fn flush_leading(&mut self) {
        let until = self
            .significant
            .get(self.pos)
            .copied()
            .unwrap_or(self.tokens.len());
        self.flush_trivia(until);
    }

    fn start_node(&mut self, kind: NodeKind) {
        self.flush_leading();
        self.builder.start_node(kind);
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.flush_leading();
        self.builder.checkpoint()
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: NodeKind) {
        self.builder.start_node_at(checkpoint, kind);
    }

    fn finish_node(&mut self) -> crate::syntax::NodeId {
        self.builder.finish_node(self.last_end)
    }

    /// Consume the current token as a leaf of `kind`.
    fn bump(&mut self, kind: NodeKind) {
        let Some(&raw) = self.significant.get(self.pos) else {
            return;
        };
        self.flush_trivia(raw);
        let token = self.tokens[raw];
        self.builder.leaf(kind, token.span);
        self.next_raw = raw + 1;
        self.last_end = token.span.end;
        self.pos += 1;
    }

    /// Consume a keyword or punctuation token.
    fn bump_anon(&mut self) {
        self.bump(NodeKind::Anonymous);
    }

    /// Consume the current identifier as `identifier`, labelled with `field`.
    fn bump_identifier(&mut self, field: Option<FieldName>) {
        self.bump(NodeKind::Identifier);
        if let Some(field) = field {
            self.builder.label_last(field);
        }
    }

    /// Consume `kind` if present, otherwise record it as missing.
    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump_anon();
            true
        } else {
            self.missing(format!("expected {}, found {}", kind.describe(), self.found()), None);
            false
        }
    }

    /// Consume an identifier labelled `field`, or record it as missing.
    fn expect_identifier(&mut self, field: Option<FieldName>, what: &str) -> bool {
        if self.at(TokenKind::Identifier) {
            self.bump_identifier(field);
            true
        } else {
            self.missing(format!("expected {what}, found {}", self.found()), None);
            false
        }
    }

    /// Enter one level of nesting. Past the limit, the construct is skipped to
    /// the next boundary and `false` is returned.
    fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            tracing::debug!(depth = self.depth, "nesting limit reached");
            self.force_recover(format!(
                "nesting exceeds the maximum depth of {}",
                self.max_depth
            ));
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // ==========================================================================
    // program
    // ==========================================================================

    fn program(&mut self) {
        self.builder.start_node(NodeKind::Program);
        while !self.at_eof() {
            let before = self.pos;
            self.declaration(decl::Scope::Program);
            if self.pos == before {
                self.force_recover(format!("expected a declaration, found {}", self.found()));
            }
        }
        self.flush_trivia(self.tokens.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxTree;
    use insta::assert_snapshot;

    fn sexp(src: &str) -> String {
        Parser::new().parse(src).unwrap().to_sexp()
    }

    fn parse(src: &str) -> SyntaxTree {
        Parser::new().parse(src).unwrap()
    }

    #[test]
    fn empty_input_is_an_empty_program() {
        let tree = parse("");
        assert_eq!(tree.to_sexp(), "(program)");
        assert!(!tree.has_errors());
        let tree = parse("  \n// only a comment\n");
        assert_eq!(tree.to_sexp(), "(program (comment))");
        assert!(!tree.has_errors());
    }

    #[test]
    fn enum_in_protocol() {
        assert_snapshot!(
            sexp("protocol Foo { enum Color { RED, GREEN, BLUE } }"),
            @"(program (protocol_declaration name: (identifier) (protocol_block (enum_declaration name: (identifier) (enum_block (enumeral (identifier)) (enumeral (identifier)) (enumeral (identifier)))))))"
        );
    }

    #[test]
    fn record_with_fields() {
        assert_snapshot!(
            sexp("record Point { double x; double y; }"),
            @"(program (record_declaration name: (identifier) (statement_block (field_declaration type: (primitive_type) name: (identifier)) (field_declaration type: (primitive_type) name: (identifier)))))"
        );
    }

    #[test]
    fn nested_collection_types() {
        assert_snapshot!(
            sexp("record R { array<union{int, string}> values; }"),
            @"(program (record_declaration name: (identifier) (statement_block (field_declaration type: (array (type_block (union (union_block (primitive_type) (primitive_type))))) name: (identifier)))))"
        );
    }

    #[test]
    fn nullable_field() {
        assert_snapshot!(
            sexp("record R { int? maybeCount; }"),
            @"(program (record_declaration name: (identifier) (statement_block (field_declaration type: (nullable (primitive_type)) name: (identifier)))))"
        );
    }

    #[test]
    fn import() {
        assert_snapshot!(
            sexp(r#"import idl "other.avdl";"#),
            @"(program (import_declaration (identifier) (literal_type (string))))"
        );
    }

    #[test]
    fn missing_record_name() {
        let tree = parse("record { }");
        assert_eq!(
            tree.to_sexp(),
            "(program (record_declaration (ERROR) (statement_block)))"
        );
        assert_eq!(tree.errors().len(), 1);
        assert_eq!(tree.errors()[0].span, Span::new(6, 6));
        assert_eq!(tree.errors()[0].kind, ErrorKind::Syntax);
    }

    #[test]
    fn input_over_the_limit_is_rejected() {
        let err = Parser::new().max_input_len(4).parse("record R {}").unwrap_err();
        assert!(matches!(err, Error::InputTooLarge { len: 11, limit: 4 }));
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let depth = 50;
        let src = format!(
            "record R {{ {}int{} x; }}",
            "array<".repeat(depth),
            ">".repeat(depth)
        );
        let tree = Parser::new().max_depth(10).parse(&src).unwrap();
        assert!(tree.has_errors());
        assert!(
            tree.errors()
                .iter()
                .any(|e| e.message.contains("maximum depth of 10"))
        );

        let tree = Parser::new().parse(&src).unwrap();
        assert!(!tree.has_errors());
    }

    #[test]
    fn comments_are_kept_between_siblings() {
        assert_snapshot!(
            sexp("/** doc */ record R { // trailing\n int a; }"),
            @"(program (comment) (record_declaration name: (identifier) (statement_block (comment) (field_declaration type: (primitive_type) name: (identifier)))))"
        );
    }

    #[test]
    fn dollar_is_an_identifier_character() {
        let tree = parse("record $R { int $a; }");
        assert!(!tree.has_errors(), "{}", tree.to_sexp());
    }

    #[test]
    fn lexical_errors_become_error_nodes() {
        let tree = parse("record R { int a; } #");
        assert_eq!(
            tree.to_sexp(),
            "(program (record_declaration name: (identifier) (statement_block (field_declaration type: (primitive_type) name: (identifier)))) (ERROR))"
        );
        assert_eq!(tree.errors()[0].kind, ErrorKind::Lexical);
        assert_eq!(tree.errors()[0].message, "unexpected character `#`");
    }
}
