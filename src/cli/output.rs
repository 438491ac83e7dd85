//! Handles all user-facing output for the CLI.
//!
//! Errors go to stderr as miette reports; diffs and listings go to stdout,
//! colored when stdout is a terminal.

use std::fmt::Write as _;
use std::path::Path;

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ast::{Expr, Node};
use crate::format::Registry;
use crate::FormatError;

// ============================================================================
// CORE OUTPUT FUNCTIONS: User-facing CLI output utilities
// ============================================================================

/// Prints an error with its source snippet, if it has one.
pub fn print_error(error: FormatError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}

/// Prints a line diff between the original and formatted text of `path`.
pub fn print_diff(path: &Path, original: &str, formatted: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    println!("--- {}", path.display());
    let _ = stdout.reset();

    let changeset = Changeset::new(original, formatted, "\n");
    print_changes(&mut stdout, &changeset.diffs);
    let _ = stdout.reset();
}

/// Prints the reader's tree for a file.
pub fn print_tree(nodes: &[Node]) {
    if nodes.is_empty() {
        println!("(empty)");
        return;
    }
    print!("{}", render_tree(nodes));
}

/// Prints every rule in `registry` with its tier.
pub fn print_rules(registry: &Registry) {
    if registry.is_empty() {
        println!("  No rules registered.");
        return;
    }
    for rule in registry.rules() {
        println!("  {:<22} {}", rule.name(), rule.tier());
    }
}

/// One line per node: shape, value and byte span, children indented below
/// their list.
pub fn render_tree(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_tree(&mut out, node, 0);
    }
    out
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn write_tree(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    let span = node.span;
    match node.expr() {
        Expr::List(items) => {
            let _ = writeln!(out, "{indent}list {}..{}", span.start, span.end);
            for item in items {
                write_tree(out, item, depth + 1);
            }
        }
        atom => {
            let text = atom.atom_text().unwrap_or_default();
            let _ = writeln!(out, "{indent}{} {text} {}..{}", atom.kind_name(), span.start, span.end);
        }
    }
}

fn print_changes(stdout: &mut StandardStream, diffs: &[Difference]) {
    for diff in diffs {
        match diff {
            Difference::Same(ref x) => {
                let _ = stdout.reset();
                for line in x.lines() {
                    println!(" {}", line);
                }
            }
            Difference::Add(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                for line in x.lines() {
                    println!("+{}", line);
                }
            }
            Difference::Rem(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                for line in x.lines() {
                    println!("-{}", line);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    #[test]
    fn tree_shows_nesting_and_spans() {
        let nodes = parse("(f \"s\" #:k)").unwrap();
        assert_eq!(
            render_tree(&nodes),
            "list 0..11\n  symbol f 1..2\n  string \"s\" 3..6\n  keyword #:k 7..10\n"
        );
    }
}
