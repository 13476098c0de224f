// ==============================================================================
// Grammar Metadata
// ==============================================================================
//
// The static description of the `apache_avro` language: its keywords, the
// node-kind and field vocabularies, and the precedence table the expression
// parser is driven by. `language()` is the "load grammar" entry point that
// host tooling uses to check the vocabulary it queries against.

use std::fmt;

use crate::syntax::{FieldName, NodeKind};

// ==============================================================================
// Keywords
// ==============================================================================

/// A contextual keyword. Keywords lex as identifiers; the grammar engine
/// classifies them by text wherever a keyword is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Protocol,
    Schema,
    Namespace,
    Import,
    Enum,
    Fixed,
    Record,
    Error,
    Throws,
    Oneway,
    Void,
    Int,
    Long,
    String,
    Boolean,
    Float,
    Double,
    Null,
    Bytes,
    Array,
    Map,
    Union,
    Decimal,
    Date,
    TimeMs,
    TimestampMs,
    LocalTimestampMs,
    Uuid,
    True,
    False,
}

impl Keyword {
    pub const ALL: &'static [Keyword] = &[
        Keyword::Protocol,
        Keyword::Schema,
        Keyword::Namespace,
        Keyword::Import,
        Keyword::Enum,
        Keyword::Fixed,
        Keyword::Record,
        Keyword::Error,
        Keyword::Throws,
        Keyword::Oneway,
        Keyword::Void,
        Keyword::Int,
        Keyword::Long,
        Keyword::String,
        Keyword::Boolean,
        Keyword::Float,
        Keyword::Double,
        Keyword::Null,
        Keyword::Bytes,
        Keyword::Array,
        Keyword::Map,
        Keyword::Union,
        Keyword::Decimal,
        Keyword::Date,
        Keyword::TimeMs,
        Keyword::TimestampMs,
        Keyword::LocalTimestampMs,
        Keyword::Uuid,
        Keyword::True,
        Keyword::False,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Protocol => "protocol",
            Keyword::Schema => "schema",
            Keyword::Namespace => "namespace",
            Keyword::Import => "import",
            Keyword::Enum => "enum",
            Keyword::Fixed => "fixed",
            Keyword::Record => "record",
            Keyword::Error => "error",
            Keyword::Throws => "throws",
            Keyword::Oneway => "oneway",
            Keyword::Void => "void",
            Keyword::Int => "int",
            Keyword::Long => "long",
            Keyword::String => "string",
            Keyword::Boolean => "boolean",
            Keyword::Float => "float",
            Keyword::Double => "double",
            Keyword::Null => "null",
            Keyword::Bytes => "bytes",
            Keyword::Array => "array",
            Keyword::Map => "map",
            Keyword::Union => "union",
            Keyword::Decimal => "decimal",
            Keyword::Date => "date",
            Keyword::TimeMs => "time_ms",
            Keyword::TimestampMs => "timestamp_ms",
            Keyword::LocalTimestampMs => "local_timestamp_ms",
            Keyword::Uuid => "uuid",
            Keyword::True => "true",
            Keyword::False => "false",
        }
    }

    pub fn from_text(text: &str) -> Option<Keyword> {
        Keyword::ALL.iter().copied().find(|k| k.as_str() == text)
    }

    /// Keywords that begin a declaration. These double as recovery sync points.
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            Keyword::Protocol
                | Keyword::Schema
                | Keyword::Namespace
                | Keyword::Import
                | Keyword::Enum
                | Keyword::Fixed
                | Keyword::Record
                | Keyword::Error
        )
    }

    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            Keyword::Int
                | Keyword::Long
                | Keyword::String
                | Keyword::Boolean
                | Keyword::Float
                | Keyword::Double
                | Keyword::Null
                | Keyword::Bytes
        )
    }

    pub fn is_known_logical(self) -> bool {
        matches!(
            self,
            Keyword::Decimal
                | Keyword::Date
                | Keyword::TimeMs
                | Keyword::TimestampMs
                | Keyword::LocalTimestampMs
                | Keyword::Uuid
        )
    }

    /// The declaration keywords, in the order typo suggestions consider them.
    pub fn declarations() -> impl Iterator<Item = Keyword> {
        Keyword::ALL.iter().copied().filter(|k| k.is_declaration())
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// Precedence
// ==============================================================================

/// Binding strength of grammar constructs, lowest first. Higher binds tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Prec {
    Assign = 0,
    Comment = 1,
    String = 2,
    Call = 5,
    Field = 6,
    Union = 7,
    Statement = 8,
    Member = 9,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assoc {
    Left,
    Right,
    None,
}

impl Prec {
    pub const ALL: &'static [Prec] = &[
        Prec::Assign,
        Prec::Comment,
        Prec::String,
        Prec::Call,
        Prec::Field,
        Prec::Union,
        Prec::Statement,
        Prec::Member,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Prec::Assign => "ASSIGN",
            Prec::Comment => "COMMENT",
            Prec::String => "STRING",
            Prec::Call => "CALL",
            Prec::Field => "FIELD",
            Prec::Union => "UNION",
            Prec::Statement => "STATEMENT",
            Prec::Member => "MEMBER",
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn assoc(self) -> Assoc {
        match self {
            Prec::Assign => Assoc::Right,
            Prec::Call => Assoc::Left,
            _ => Assoc::None,
        }
    }
}

// ==============================================================================
// Language
// ==============================================================================

/// Static description of the grammar.
#[derive(Debug)]
pub struct Language {
    pub name: &'static str,
    pub node_kinds: &'static [NodeKind],
    pub fields: &'static [FieldName],
    pub keywords: &'static [Keyword],
    pub precedences: &'static [Prec],
    /// Pairs of rules whose derivations overlap, resolved by the engine's
    /// parse order rather than by precedence.
    pub conflicts: &'static [(&'static str, &'static str)],
}

static LANGUAGE: Language = Language {
    name: "apache_avro",
    node_kinds: NodeKind::NAMED,
    fields: FieldName::ALL,
    keywords: Keyword::ALL,
    precedences: Prec::ALL,
    conflicts: &[("_anotated_type", "nullable")],
};

/// Load the grammar description.
pub fn language() -> &'static Language {
    &LANGUAGE
}

impl Language {
    pub fn node_kind_for_name(&self, name: &str) -> Option<NodeKind> {
        self.node_kinds.iter().copied().find(|k| k.as_str() == name)
    }

    pub fn field_for_name(&self, name: &str) -> Option<FieldName> {
        self.fields.iter().copied().find(|f| f.as_str() == name)
    }

    pub fn keyword(&self, text: &str) -> Option<Keyword> {
        self.keywords.iter().copied().find(|k| k.as_str() == text)
    }

    pub fn precedence(&self, name: &str) -> Option<Prec> {
        self.precedences.iter().copied().find(|p| p.name() == name)
    }
}
