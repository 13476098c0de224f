// ==============================================================================
// Lexer
// ==============================================================================
//
// Splits IDL source into classified tokens. Every byte of the input belongs to
// exactly one token (whitespace and comments included), so the token spans
// tile the input and the grammar engine can decide for itself what to skip.
//
// Keywords are not a separate token class. `record`, `int`, `true` and friends
// lex as `Identifier` and the grammar engine looks at the text where a keyword
// is valid. The one context-sensitive rule lives here: right after the word
// `namespace`, a dotted `namespace_identifier` is lexed instead.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::syntax::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    NamespaceIdentifier,
    AnnotationIdentifier,
    String,
    Number,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LAngle,
    RAngle,
    Comma,
    Semicolon,
    Question,
    Equals,
    Comment,
    Whitespace,
    Error,
}

impl TokenKind {
    /// Whitespace and comments: skippable between any two significant tokens.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::NamespaceIdentifier => "namespace identifier",
            TokenKind::AnnotationIdentifier => "annotation",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LAngle => "`<`",
            TokenKind::RAngle => "`>`",
            TokenKind::Comma => "`,`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Question => "`?`",
            TokenKind::Equals => "`=`",
            TokenKind::Comment => "comment",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Error => "invalid token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Why an `Error` token was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexErrorKind {
    UnexpectedCharacter,
    UnterminatedString,
    UnterminatedComment,
    LeadingZero,
    BareAt,
}

impl LexErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            LexErrorKind::UnexpectedCharacter => "unexpected character",
            LexErrorKind::UnterminatedString => "unterminated string literal",
            LexErrorKind::UnterminatedComment => "unterminated block comment",
            LexErrorKind::LeadingZero => "number literal has a leading zero",
            LexErrorKind::BareAt => "`@` must be followed by an annotation name",
        }
    }

    pub fn help(self) -> Option<&'static str> {
        match self {
            LexErrorKind::UnterminatedString => {
                Some("strings cannot span lines; escape the newline with `\\`")
            }
            LexErrorKind::UnterminatedComment => Some("close the comment with `*/`"),
            LexErrorKind::LeadingZero => Some("write the number without leading zeros"),
            LexErrorKind::UnexpectedCharacter | LexErrorKind::BareAt => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Set only for `TokenKind::Error`.
    pub error: Option<LexErrorKind>,
}

impl Token {
    fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Token {
            kind,
            span: Span::new(start, end),
            error: None,
        }
    }

    fn error(kind: LexErrorKind, start: usize, end: usize) -> Self {
        Token {
            kind: TokenKind::Error,
            span: Span::new(start, end),
            error: Some(kind),
        }
    }

    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.span.start..self.span.end]
    }
}

/// Tokenize the whole input, trivia included.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn tokenize(source: &str) -> Vec<Token> {
    let tokens: Vec<Token> = Lexer::new(source).collect();
    tracing::trace!(count = tokens.len(), "tokenized");
    tokens
}

// ==============================================================================
// Character Classes
// ==============================================================================

/// Structural and operator punctuation excluded from every identifier class.
const STRUCTURAL: &[char] = &[
    ':', ';', '"', '\'', '@', '#', ',', '|', '^', '&', '<', '=', '>', '+', '*', '/', '\\', '%',
    '?', '!', '~', '(', ')', '[', ']', '{', '}',
];

/// Insignificant spacing: JavaScript `\s`, Unicode space separators, BOM, and
/// the zero-width joiners U+2060 / U+200B.
pub(crate) fn is_space(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200B}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{2060}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

fn is_excluded(c: char) -> bool {
    c <= '\u{1F}' || is_space(c) || STRUCTURAL.contains(&c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdentClass {
    /// `identifier`: also excludes `.` and `-`.
    Plain,
    /// `namespace_identifier` and the part of `annotation_identifier` after `@`.
    Dotted,
}

impl IdentClass {
    fn accepts(self, c: char, first: bool) -> bool {
        if is_excluded(c) || (first && c.is_ascii_digit()) {
            return false;
        }
        match self {
            IdentClass::Plain => c != '.' && c != '-',
            IdentClass::Dotted => true,
        }
    }
}

/// Length of a `\uXXXX` or `\u{X+}` escape at the start of `rest`.
fn unicode_escape_len(rest: &str) -> Option<usize> {
    let after = rest.strip_prefix("\\u")?;
    if let Some(braced) = after.strip_prefix('{') {
        let digits = braced.bytes().take_while(u8::is_ascii_hexdigit).count();
        if digits > 0 && braced[digits..].starts_with('}') {
            return Some(2 + 1 + digits + 1);
        }
        return None;
    }
    let hex = after.as_bytes().get(..4)?;
    hex.iter().all(u8::is_ascii_hexdigit).then_some(6)
}

/// Length of one identifier unit (a character or a Unicode escape) at the start
/// of `rest`, if `class` accepts it.
fn ident_unit_len(rest: &str, class: IdentClass, first: bool) -> Option<usize> {
    if let Some(len) = unicode_escape_len(rest) {
        return Some(len);
    }
    let c = rest.chars().next()?;
    class.accepts(c, first).then(|| c.len_utf8())
}

fn ident_len(rest: &str, class: IdentClass) -> usize {
    let Some(mut len) = ident_unit_len(rest, class, true) else {
        return 0;
    };
    while let Some(unit) = ident_unit_len(&rest[len..], class, false) {
        len += unit;
    }
    len
}

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[+-]?(?:(?:0|[1-9](?:_?[0-9])*)(?:\.(?:[0-9](?:_?[0-9])*)?)?(?:[eE][+-]?[0-9](?:_?[0-9])*)?|\.[0-9](?:_?[0-9])*(?:[eE][+-]?[0-9](?:_?[0-9])*)?)",
    )
    .expect("number pattern is valid")
});

fn starts_number(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    let digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
    match bytes.first() {
        Some(b'0'..=b'9') => true,
        Some(b'.') => digit_at(1),
        Some(b'+' | b'-') => digit_at(1) || (bytes.get(1) == Some(&b'.') && digit_at(2)),
        _ => false,
    }
}

// ==============================================================================
// Lexer
// ==============================================================================

/// Streaming tokenizer. Yields tokens until the input is exhausted; never
/// fails and always advances.
pub struct Lexer<'s> {
    source: &'s str,
    pos: usize,
    /// The last significant token was the word `namespace`.
    namespace_pending: bool,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Lexer {
            source,
            pos: 0,
            namespace_pending: false,
        }
    }

    fn rest(&self) -> &'s str {
        &self.source[self.pos..]
    }

    fn lex_token(&mut self) -> Option<Token> {
        let rest = self.rest();
        let c = rest.chars().next()?;
        let start = self.pos;

        if is_space(c) {
            let len = rest
                .char_indices()
                .find(|&(_, c)| !is_space(c))
                .map_or(rest.len(), |(i, _)| i);
            return Some(Token::new(TokenKind::Whitespace, start, start + len));
        }

        if rest.starts_with("//") {
            let len = rest
                .find(['\r', '\n', '\u{2028}', '\u{2029}'])
                .unwrap_or(rest.len());
            return Some(Token::new(TokenKind::Comment, start, start + len));
        }
        if let Some(body) = rest.strip_prefix("/*") {
            return Some(match body.find("*/") {
                Some(end) => Token::new(TokenKind::Comment, start, start + 2 + end + 2),
                None => Token::error(LexErrorKind::UnterminatedComment, start, self.source.len()),
            });
        }

        if c == '"' || c == '\'' {
            return Some(self.lex_string(c));
        }

        if let Some(after) = rest.strip_prefix('@') {
            let len = ident_len(after, IdentClass::Dotted);
            return Some(if len == 0 {
                Token::error(LexErrorKind::BareAt, start, start + 1)
            } else {
                Token::new(TokenKind::AnnotationIdentifier, start, start + 1 + len)
            });
        }

        if self.namespace_pending {
            let len = ident_len(rest, IdentClass::Dotted);
            if len > 0 {
                return Some(Token::new(TokenKind::NamespaceIdentifier, start, start + len));
            }
        }

        if starts_number(rest) {
            return Some(self.lex_number());
        }

        let punct = match c {
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            '<' => Some(TokenKind::LAngle),
            '>' => Some(TokenKind::RAngle),
            ',' => Some(TokenKind::Comma),
            ';' => Some(TokenKind::Semicolon),
            '?' => Some(TokenKind::Question),
            '=' => Some(TokenKind::Equals),
            _ => None,
        };
        if let Some(kind) = punct {
            return Some(Token::new(kind, start, start + 1));
        }

        let len = ident_len(rest, IdentClass::Plain);
        if len > 0 {
            return Some(Token::new(TokenKind::Identifier, start, start + len));
        }

        Some(Token::error(
            LexErrorKind::UnexpectedCharacter,
            start,
            start + c.len_utf8(),
        ))
    }

    fn lex_string(&self, quote: char) -> Token {
        let start = self.pos;
        let mut chars = self.rest().char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    if chars.next().is_none() {
                        break;
                    }
                }
                '\n' => return Token::error(LexErrorKind::UnterminatedString, start, start + i),
                c if c == quote => return Token::new(TokenKind::String, start, start + i + 1),
                _ => {}
            }
        }
        Token::error(LexErrorKind::UnterminatedString, start, self.source.len())
    }

    fn lex_number(&self) -> Token {
        let start = self.pos;
        let rest = self.rest();
        let len = NUMBER.find(rest).map_or(0, |m| m.end());
        if rest[len..].starts_with(|c: char| c.is_ascii_digit()) {
            // `007`, `01.5`: report the whole digit run as one error.
            let run = rest[len..]
                .find(|c: char| !c.is_ascii_digit() && c != '_')
                .map_or(rest.len(), |i| len + i);
            return Token::error(LexErrorKind::LeadingZero, start, start + run);
        }
        if len == 0 {
            return Token::error(LexErrorKind::UnexpectedCharacter, start, start + 1);
        }
        Token::new(TokenKind::Number, start, start + len)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.lex_token()?;
        debug_assert!(token.span.end > self.pos, "lexer failed to advance");
        self.pos = token.span.end;
        if !token.kind.is_trivia() {
            self.namespace_pending =
                token.kind == TokenKind::Identifier && token.text(self.source) == "namespace";
        }
        Some(token)
    }
}
