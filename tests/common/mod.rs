// ==============================================================================
// Shared Test Helpers
// ==============================================================================
//
// Each test file that imports this module compiles its own copy, so not every
// function is used in every binary.
#![allow(dead_code)]

use std::fmt::Write;
use std::fs;
use std::path::PathBuf;

use avdl_syntax::{Node, SyntaxTree};
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};

pub const FIXTURES: &str = "tests/fixtures";

/// Read a fixture file relative to `tests/fixtures`, with `\r\n` normalized so
/// spans match on every platform.
pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(FIXTURES).join(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
        .replace("\r\n", "\n")
}

/// Render a single diagnostic to a deterministic string for snapshot tests.
/// Uses the non-unicode theme at 80 columns.
pub fn render_diagnostic(diagnostic: &dyn Diagnostic) -> String {
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::none()).with_width(80);
    let mut buf = String::new();
    handler
        .render_report(&mut buf, diagnostic)
        .expect("render to String is infallible");
    buf
}

/// Render every diagnostic of `tree`, separated by blank lines.
pub fn render_errors(tree: &SyntaxTree) -> String {
    let mut buf = String::new();
    for (i, diagnostic) in tree.diagnostics().iter().enumerate() {
        if i > 0 {
            writeln!(buf).expect("write to String is infallible");
        }
        buf.push_str(&render_diagnostic(diagnostic));
    }
    buf
}

/// Check the structural span properties: the root covers the whole input,
/// children are ordered and lie within their parent, and the recorded errors
/// are sorted.
pub fn assert_well_formed(tree: &SyntaxTree) {
    let root = tree.root();
    assert_eq!(root.span().start, 0, "root must start at 0");
    assert_eq!(root.span().end, tree.source().len(), "root must cover the input");
    for node in root.descendants() {
        assert_children_nested(node);
    }
    let starts: Vec<usize> = tree.errors().iter().map(|e| e.span.start).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted, "errors must be ordered by position");
}

fn assert_children_nested(node: Node<'_>) {
    let mut previous_end = node.span().start;
    for child in node.children() {
        assert!(
            node.span().contains(child.span()),
            "{child:?} is not inside its parent {node:?}"
        );
        assert!(
            child.span().start >= previous_end,
            "{child:?} overlaps its previous sibling in {node:?}"
        );
        previous_end = child.span().end;
    }
}
