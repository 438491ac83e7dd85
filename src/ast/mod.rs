//! AST module for sutra-fmt
//!
//! This module provides the tree the formatter consumes: spans, the `Expr`
//! node shapes, and the read-only shape queries that formatting rules match on.
//! Nodes are shared through `Arc` and only ever borrowed by the formatter.

// ============================================================================
// IMPORTS
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Represents a byte span in the source code.
///
/// # Examples
///
/// ```rust
/// use sutra_fmt::ast::Span;
/// let span = Span { start: 0, end: 5 };
/// assert_eq!(span.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Wrapper for carrying source span information with any value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithSpan<T> {
    pub value: T,
    pub span: Span,
}

/// Canonical tree node: an expression behind shared ownership plus its span.
pub type Node = WithSpan<Arc<Expr>>;

/// The shapes a node can take.
///
/// Atoms keep the information needed to print them back canonically; lists
/// keep their children in source order. Bracket style is not recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    List(Vec<Node>),
    Symbol(String),
    /// Numeric literal, kept as its source lexeme.
    Number(String),
    /// String literal, unescaped.
    String(String),
    Bool(bool),
    /// `#:name`, stored without the `#:` prefix.
    Keyword(String),
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Expr {
    /// Returns true for every shape except `List`.
    pub fn is_atom(&self) -> bool {
        !matches!(self, Expr::List(_))
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Expr::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expr::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the shape, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::List(_) => "list",
            Expr::Symbol(_) => "symbol",
            Expr::Number(_) => "number",
            Expr::String(_) => "string",
            Expr::Bool(_) => "boolean",
            Expr::Keyword(_) => "keyword",
        }
    }

    /// Canonical source text of an atom, or `None` for lists.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sutra_fmt::ast::Expr;
    /// assert_eq!(Expr::String("hi \"you\"".into()).atom_text().as_deref(), Some(r#""hi \"you\"""#));
    /// assert_eq!(Expr::Keyword("hello".into()).atom_text().as_deref(), Some("#:hello"));
    /// assert_eq!(Expr::List(vec![]).atom_text(), None);
    /// ```
    pub fn atom_text(&self) -> Option<String> {
        match self {
            Expr::List(_) => None,
            Expr::Symbol(s) | Expr::Number(s) => Some(s.clone()),
            Expr::String(s) => Some(quote_string(s)),
            Expr::Bool(true) => Some("#t".to_string()),
            Expr::Bool(false) => Some("#f".to_string()),
            Expr::Keyword(k) => Some(format!("#:{}", k)),
        }
    }

    /// Flat one-line rendering used for debugging and diagnostics.
    pub fn pretty(&self) -> String {
        match self {
            Expr::List(items) => {
                let inner = items
                    .iter()
                    .map(|e| e.value.pretty())
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("({})", inner)
            }
            atom => atom.atom_text().unwrap_or_default(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}

// ============================================================================
// SHAPE QUERIES
// ============================================================================

/// Read-only shape queries on a spanned node, used by formatting rules.
impl WithSpan<Arc<Expr>> {
    pub fn expr(&self) -> &Expr {
        &self.value
    }

    pub fn is_atom(&self) -> bool {
        self.value.is_atom()
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        self.value.as_list()
    }

    pub fn as_symbol(&self) -> Option<&str> {
        self.value.as_symbol()
    }

    /// Number of children; zero for atoms.
    pub fn len(&self) -> usize {
        self.as_list().map_or(0, <[Node]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.as_list().and_then(|items| items.get(index))
    }

    /// The symbol in head position of a list, if there is one.
    pub fn head_symbol(&self) -> Option<&str> {
        self.child(0).and_then(|head| head.as_symbol())
    }

    /// Is this a list whose head is exactly the symbol `name`?
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sutra_fmt::syntax::parse;
    /// let nodes = parse("(define x 1)").unwrap();
    /// assert!(nodes[0].is_form_headed_by("define"));
    /// assert!(!nodes[0].is_form_headed_by("lambda"));
    /// ```
    pub fn is_form_headed_by(&self, name: &str) -> bool {
        self.head_symbol() == Some(name)
    }
}

// ============================================================================
// CONSTRUCTION HELPERS
// ============================================================================

/// Wraps an expression into a node with the given span.
pub fn make_node(expr: Expr, span: Span) -> Node {
    WithSpan {
        value: Arc::new(expr),
        span,
    }
}

pub fn make_symbol(name: &str, span: Span) -> Node {
    make_node(Expr::Symbol(name.to_string()), span)
}

pub fn make_list(items: Vec<Node>, span: Span) -> Node {
    make_node(Expr::List(items), span)
}

/// Re-quotes string contents, escaping what the reader unescapes.
fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: Vec<Node>) -> Node {
        make_list(items, Span::default())
    }

    #[test]
    fn atom_text_is_canonical() {
        assert_eq!(Expr::Symbol("hello".into()).atom_text().unwrap(), "hello");
        assert_eq!(Expr::Number("42".into()).atom_text().unwrap(), "42");
        assert_eq!(Expr::String("hello".into()).atom_text().unwrap(), "\"hello\"");
        assert_eq!(Expr::Bool(false).atom_text().unwrap(), "#f");
        assert_eq!(Expr::String("a\nb\\".into()).atom_text().unwrap(), r#""a\nb\\""#);
    }

    #[test]
    fn shape_queries_on_lists() {
        let node = list(vec![
            make_symbol("define", Span::default()),
            make_symbol("x", Span::default()),
        ]);
        assert_eq!(node.len(), 2);
        assert_eq!(node.head_symbol(), Some("define"));
        assert_eq!(node.child(1).and_then(|c| c.as_symbol()), Some("x"));
        assert!(node.child(2).is_none());
        assert!(!node.is_atom());
    }

    #[test]
    fn atoms_have_no_children() {
        let node = make_symbol("x", Span::default());
        assert!(node.is_atom());
        assert!(node.is_empty());
        assert_eq!(node.head_symbol(), None);
    }

    #[test]
    fn pretty_prints_flat() {
        let node = list(vec![
            make_symbol("+", Span::default()),
            make_node(Expr::Number("1".into()), Span::default()),
            list(vec![]),
        ]);
        assert_eq!(node.value.pretty(), "(+ 1 ())");
    }
}
