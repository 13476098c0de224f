// ==============================================================================
// Errors and Diagnostics
// ==============================================================================
//
// Malformed input never fails a parse: it becomes `ERROR` nodes plus
// `SyntaxError` records inside the tree. `ParseDiagnostic` is the rich,
// source-annotated rendering of one such record. `Error` is for everything that
// does fail: oversized input, I/O in the CLI, asking for the typed model of a
// tree that has errors, and bad command-line usage.

use std::fmt;

use miette::{LabeledSpan, NamedSource, SourceSpan};

use crate::syntax::SyntaxError;

/// A parse error with source location information for rich diagnostics.
#[derive(Debug)]
pub struct ParseDiagnostic {
    pub src: NamedSource<String>,
    pub span: SourceSpan,
    pub message: String,
    pub code: &'static str,
    pub help: Option<String>,
    /// Further errors from the same source, reported alongside this one.
    pub related: Vec<ParseDiagnostic>,
}

impl ParseDiagnostic {
    pub(crate) fn from_syntax_error(name: &str, source: &str, error: &SyntaxError) -> Self {
        ParseDiagnostic {
            src: NamedSource::new(name, source.to_string()),
            span: error.span.into(),
            message: error.message.clone(),
            code: error.kind.code(),
            help: error.help.clone(),
            related: Vec::new(),
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseDiagnostic {}

impl miette::Diagnostic for ParseDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = if self.span.len() == 0 {
            "expected here"
        } else {
            "here"
        };
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(label.to_string()),
            self.span,
        ))))
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn miette::Diagnostic> + 'a>> {
        if self.related.is_empty() {
            return None;
        }
        Some(Box::new(
            self.related.iter().map(|d| d as &dyn miette::Diagnostic),
        ))
    }
}

// ==============================================================================
// Crate Error
// ==============================================================================

#[derive(Debug)]
pub enum Error {
    /// The input is longer than the parser's configured limit.
    InputTooLarge { len: usize, limit: usize },
    Io { source: std::io::Error },
    /// The tree has error regions, so it cannot be lowered to the typed model.
    /// Holds the first error, with any others as related diagnostics.
    Syntax(Box<ParseDiagnostic>),
    Usage(String),
}

impl Error {
    /// Bundle a tree's diagnostics into one error, or `None` if there are none.
    pub(crate) fn from_diagnostics(diagnostics: Vec<ParseDiagnostic>) -> Option<Error> {
        let mut diagnostics = diagnostics.into_iter();
        let mut first = diagnostics.next()?;
        first.related = diagnostics.collect();
        Some(Error::Syntax(Box::new(first)))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InputTooLarge { len, limit } => {
                write!(f, "input is {len} bytes, over the limit of {limit} bytes")
            }
            Error::Io { source } => write!(f, "IO error: {source}"),
            Error::Syntax(diagnostic) => write!(f, "{diagnostic}"),
            Error::Usage(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source } => Some(source),
            // `Syntax` displays its diagnostic itself.
            Error::Syntax(_) | Error::InputTooLarge { .. } | Error::Usage(_) => None,
        }
    }
}

impl miette::Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            Error::InputTooLarge { .. } => "avdl::input_too_large",
            Error::Io { .. } => "avdl::io",
            Error::Syntax(diagnostic) => diagnostic.code,
            Error::Usage(_) => "avdl::usage",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Error::Syntax(diagnostic) => miette::Diagnostic::help(diagnostic.as_ref()),
            Error::InputTooLarge { .. } => Some(Box::new("raise the limit with `--max-input-len`")),
            Error::Usage(_) => Some(Box::new("run with `--help` for usage")),
            Error::Io { .. } => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Error::Syntax(diagnostic) => Some(&diagnostic.src),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Error::Syntax(diagnostic) => miette::Diagnostic::labels(diagnostic.as_ref()),
            _ => None,
        }
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn miette::Diagnostic> + 'a>> {
        match self {
            Error::Syntax(diagnostic) => miette::Diagnostic::related(diagnostic.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn diagnostics_carry_code_and_span() {
        let tree = parse("record { }").unwrap();
        let diagnostics = tree.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "avdl::syntax");
        assert_eq!(diagnostics[0].span, SourceSpan::from((6, 0)));
    }

    #[test]
    fn from_diagnostics_nests_the_rest_as_related() {
        let tree = parse("record { } record { }").unwrap();
        let Some(Error::Syntax(first)) = Error::from_diagnostics(tree.diagnostics()) else {
            panic!("expected a syntax error");
        };
        assert_eq!(first.related.len(), 1);
        assert!(Error::from_diagnostics(Vec::new()).is_none());
    }

    #[test]
    fn input_too_large_message() {
        let err = Error::InputTooLarge { len: 10, limit: 4 };
        assert_eq!(err.to_string(), "input is 10 bytes, over the limit of 4 bytes");
    }
}
