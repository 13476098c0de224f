use std::fmt;

/// A name as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Identifier(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A literal value. Numbers and strings keep their exact source text (strings
/// including their quotes), so nothing is lost to re-formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Number(String),
    String(String),
    True,
    False,
    Null,
}

impl Literal {
    /// The numeric value of a number literal, ignoring `_` separators.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Number(raw) => raw.replace('_', "").parse().ok(),
            _ => None,
        }
    }

    /// The value of a number literal that is a whole number.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Literal::Number(raw) => raw.replace('_', "").parse().ok(),
            _ => None,
        }
    }

    /// The contents of a string literal with the quotes removed and escape
    /// pairs resolved (`\n`, `\t`, `\r`, `\\`, quotes, `\uXXXX`; any other
    /// escaped character stands for itself).
    pub fn string_value(&self) -> Option<String> {
        let Literal::String(raw) = self else {
            return None;
        };
        let inner = raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default();
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('u') => {
                    let hex: String = chars.clone().take(4).collect();
                    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                        Some(decoded) if hex.len() == 4 => {
                            out.push(decoded);
                            chars.nth(3);
                        }
                        _ => out.push('u'),
                    }
                }
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        }
        Some(out)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(raw) | Literal::String(raw) => f.write_str(raw),
            Literal::True => f.write_str("true"),
            Literal::False => f.write_str("false"),
            Literal::Null => f.write_str("null"),
        }
    }
}

/// `callee(arg, , arg)`. Empty argument slots are kept as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Identifier,
    pub arguments: Vec<Option<Expression>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Identifier(Identifier),
    /// `right = left`. The field names follow the tree's field labels.
    Assignment {
        right: Identifier,
        left: Box<Expression>,
    },
    Call(CallExpression),
}

/// The right-hand side of a default value: a literal or a symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Literal(Literal),
    Identifier(Identifier),
}

/// `name = value` as a field or parameter binding.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultValue {
    pub name: Identifier,
    pub value: Value,
}

/// How a field or parameter is named: plainly, or with a default value.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Name(Identifier),
    Default(DefaultValue),
}

impl Binding {
    pub fn name(&self) -> &Identifier {
        match self {
            Binding::Name(name) => name,
            Binding::Default(default) => &default.name,
        }
    }

    pub fn default_value(&self) -> Option<&Value> {
        match self {
            Binding::Name(_) => None,
            Binding::Default(default) => Some(&default.value),
        }
    }
}
