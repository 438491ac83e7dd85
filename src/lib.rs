//! # sutra-fmt
//!
//! A rule-based pretty printer for s-expressions.
//!
//! Source is read into a tree of [`ast::Node`]s. For each node an ordered
//! registry of formatting [`format::Rule`]s proposes candidate layouts, each a
//! [`format::PartialFormat`] that leaves the children to be formatted later.
//! The [`format::Resolver`] fills those in recursively and combines the
//! candidates into one [`doc::Doc`], and [`doc::render`] picks the first
//! candidate that fits the page width at every alternation.
//!
//! ```rust
//! use sutra_fmt::{format_str, config::FormatConfig};
//! let out = format_str("(define (square x)   (* x x))", &FormatConfig::default()).unwrap();
//! assert_eq!(out, "(define (square x)\n  (* x x))\n");
//! ```

pub use crate::diagnostics::{to_error_source, ErrorContext, FormatError};

pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod doc;
pub mod format;
pub mod logging;
pub mod rules;
pub mod syntax;

use crate::ast::Node;
use crate::config::FormatConfig;
use crate::format::{resolve, Registry};

/// Page width used when none is configured.
pub const DEFAULT_WIDTH: usize = 80;

/// Formats one node at `width` columns. The result has no trailing newline.
///
/// # Examples
///
/// ```rust
/// use sutra_fmt::{format_node, rules::default_registry, syntax::parse};
/// let nodes = parse("(+ 1 (+ 2 3 4) 5)").unwrap();
/// let out = format_node(&nodes[0], default_registry(), 10).unwrap();
/// assert_eq!(out, "(+ 1\n   (+ 2\n      3\n      4)\n   5)");
/// ```
pub fn format_node(node: &Node, registry: &Registry, width: usize) -> Result<String, FormatError> {
    let doc = resolve(node, registry)?;
    Ok(doc::render(&doc, width))
}

/// Formats a sequence of top-level forms, separated by a line break plus
/// `config.blank_lines` empty lines.
pub fn format_nodes(
    nodes: &[Node],
    registry: &Registry,
    config: &FormatConfig,
) -> Result<String, FormatError> {
    let separator = "\n".repeat(config.blank_lines + 1);
    let forms = nodes
        .iter()
        .map(|node| format_node(node, registry, config.width))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(forms.join(&separator))
}

/// Reads and formats `source`, attaching it under `name` to any error so
/// diagnostics can point into it. Non-empty output ends with a newline.
pub fn format_named(
    name: &str,
    source: &str,
    registry: &Registry,
    config: &FormatConfig,
) -> Result<String, FormatError> {
    let nodes = syntax::parse_named(name, source)?;
    let mut out = format_nodes(&nodes, registry, config)
        .map_err(|e| e.with_source(to_error_source(name, source)))?;
    if !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

/// Formats `source` with the default rules.
pub fn format_str(source: &str, config: &FormatConfig) -> Result<String, FormatError> {
    format_named("<input>", source, rules::default_registry(), config)
}
