// ==============================================================================
// Doc Comments
// ==============================================================================
//
// A `/** ... */` comment documents the declaration that immediately follows it
// among its siblings. Empty `/**/` comments are transparent; any other comment
// or token in between breaks the association.

use crate::syntax::{Node, NodeKind};

/// Whether `text` is a doc comment (`/** ... */`, but not the empty `/**/`).
pub fn is_doc_comment(text: &str) -> bool {
    text.starts_with("/**") && text != "/**/" && text.ends_with("*/")
}

/// The documentation carried by a doc comment, with delimiters and indentation
/// stripped. `None` for non-doc comments and for doc comments with no text.
pub fn doc_text(comment: &str) -> Option<String> {
    if !is_doc_comment(comment) {
        return None;
    }
    let inner = comment
        .strip_prefix("/**")
        .and_then(|s| s.strip_suffix("*/"))
        .unwrap_or_default()
        .trim();
    if inner.is_empty() {
        return None;
    }
    Some(strip_indents(inner))
}

/// Tracks the doc comment waiting for the next declaration while walking a
/// node's children in order.
#[derive(Debug, Default)]
pub(crate) struct PendingDoc(Option<String>);

impl PendingDoc {
    /// Feed the next sibling. Returns the doc comment for `node` if it should
    /// receive one (the caller decides whether it is documentable).
    pub(crate) fn observe(&mut self, node: Node<'_>) -> Option<String> {
        if node.kind() == NodeKind::Comment {
            let text = node.text();
            if text == "/**/" {
                return None;
            }
            self.0 = doc_text(text);
            return None;
        }
        self.0.take()
    }
}

/// Strip common indentation from a doc comment body.
///
/// Two layouts are recognized: every line after the first starts with the
/// same `*` or `**` prefix (the usual Javadoc block), or every line after the
/// first shares a run of leading whitespace.
pub fn strip_indents(body: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    if lines.len() >= 2 {
        if let Some(stripped) = strip_star_prefix(&lines) {
            return stripped;
        }
        if let Some(stripped) = strip_common_whitespace(&lines) {
            return stripped;
        }
        return body.to_string();
    }
    // `/** * text */` leaves a lone star prefix on a single line.
    let rest = body
        .strip_prefix("**")
        .or_else(|| body.strip_prefix('*'))
        .unwrap_or(body);
    rest.strip_prefix(' ').unwrap_or(rest).to_string()
}

fn strip_star_prefix(lines: &[&str]) -> Option<String> {
    let prefix = if lines[0].starts_with("**") {
        "**"
    } else if lines[0].starts_with('*') {
        "*"
    } else {
        return None;
    };
    let consistent = lines[1..].iter().all(|line| {
        let line = line.trim_start();
        line.is_empty() || line.starts_with(prefix)
    });
    if !consistent {
        return None;
    }
    let stripped: Vec<&str> = lines
        .iter()
        .map(|line| {
            let line = line.trim_start();
            let rest = line.strip_prefix(prefix).unwrap_or(line);
            rest.strip_prefix(' ').unwrap_or(rest)
        })
        .collect();
    Some(stripped.join("\n"))
}

fn strip_common_whitespace(lines: &[&str]) -> Option<String> {
    let indent = lines[1..]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start().len()])
        .reduce(common_prefix)
        .unwrap_or_default();
    if indent.is_empty() {
        return None;
    }
    let mut out = vec![lines[0]];
    out.extend(
        lines[1..]
            .iter()
            .map(|line| line.strip_prefix(indent).unwrap_or(line)),
    );
    Some(out.join("\n"))
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len: usize = a
        .chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.len_utf8())
        .sum();
    &a[..len]
}
