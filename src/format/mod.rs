//! # Partial formats
//!
//! A formatting rule does not recurse into a node's children itself. It
//! describes one candidate layout as a [`PartialFormat`]: literal text pieces
//! interleaved with [`DeferredSubform`]s, each of which says "format this child
//! later, here, with this decoration". The [`resolver`] turns those
//! descriptions into documents by running the same rule registry on every
//! deferred child.
//!
//! ## Module Structure
//!
//! - **`rule`**: named pure functions from a node to an optional partial format
//! - **`registry`**: ordered two-tier rule collection and `dispatch`
//! - **`resolver`**: recursive resolution into a [`Doc`](crate::doc::Doc)
//!
//! Partial formats compare structurally, so rules can be tested by comparing
//! their output directly instead of rendering it.

use std::fmt;

use crate::ast::Node;
use crate::doc::Doc;
use crate::{err_msg, FormatError};

pub mod registry;
pub mod resolver;
pub mod rule;

pub use registry::{dispatch, Registry};
pub use resolver::{resolve, Resolver, MAX_RESOLVE_DEPTH};
pub use rule::{Rule, RuleFn, RuleTier};

// ============================================================================
// INDENTATION
// ============================================================================

/// How continuation lines of a deferred subform are indented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indent {
    /// Continuation lines start at the column where the subform starts.
    Align,
    /// Continuation lines are indented this many columns past the enclosing
    /// indentation level, whatever the current column.
    Nest(usize),
}

impl Indent {
    /// Leaves the enclosing indentation unchanged.
    pub const NONE: Indent = Indent::Nest(0);

    /// Checked constructor for nest amounts computed at runtime.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sutra_fmt::format::Indent;
    /// assert_eq!(Indent::nest(2).unwrap(), Indent::Nest(2));
    /// assert!(Indent::nest(-1).is_err());
    /// ```
    pub fn nest(amount: isize) -> Result<Indent, FormatError> {
        usize::try_from(amount)
            .map(Indent::Nest)
            .map_err(|_| err_msg!(MalformedRuleOutput, "nest amount must not be negative, got {}", amount))
    }
}

impl Default for Indent {
    fn default() -> Self {
        Indent::NONE
    }
}

// ============================================================================
// DEFERRED SUBFORMS
// ============================================================================

/// One child awaiting recursive formatting.
///
/// The node is borrowed from the tree being formatted; `prefix` and `suffix`
/// are plain text placed immediately around the child's rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredSubform<'n> {
    node: &'n Node,
    prefix: String,
    suffix: String,
    indent: Indent,
    flatten: bool,
}

impl<'n> DeferredSubform<'n> {
    pub fn new(node: &'n Node) -> Self {
        Self {
            node,
            prefix: String::new(),
            suffix: String::new(),
            indent: Indent::NONE,
            flatten: false,
        }
    }

    pub fn prefix(mut self, text: impl Into<String>) -> Self {
        self.prefix = text.into();
        self
    }

    pub fn suffix(mut self, text: impl Into<String>) -> Self {
        self.suffix = text.into();
        self
    }

    pub fn indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn align(self) -> Self {
        self.indent(Indent::Align)
    }

    pub fn nest(self, columns: usize) -> Self {
        self.indent(Indent::Nest(columns))
    }

    /// Requires the child to be laid out without forced line breaks.
    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    pub fn node(&self) -> &'n Node {
        self.node
    }

    pub fn prefix_text(&self) -> &str {
        &self.prefix
    }

    pub fn suffix_text(&self) -> &str {
        &self.suffix
    }

    pub fn indentation(&self) -> Indent {
        self.indent
    }

    pub fn is_flattened(&self) -> bool {
        self.flatten
    }

    /// Surrounds a resolved child with prefix and suffix, then applies the
    /// indentation mode to the whole.
    pub fn wrap(&self, inner: Doc) -> Doc {
        let mut parts = Vec::with_capacity(3);
        if !self.prefix.is_empty() {
            parts.push(Doc::literal(&self.prefix));
        }
        parts.push(inner);
        if !self.suffix.is_empty() {
            parts.push(Doc::literal(&self.suffix));
        }
        let doc = Doc::concat(parts);
        match self.indent {
            Indent::Align => Doc::align(doc),
            Indent::Nest(0) => doc,
            Indent::Nest(columns) => Doc::nest(columns, doc),
        }
    }
}

// ============================================================================
// PIECES AND PARTIAL FORMATS
// ============================================================================

/// One element of a partial format.
#[derive(Debug, Clone, PartialEq)]
pub enum Piece<'n> {
    /// Text emitted as is; embedded newlines are hard breaks.
    Literal(String),
    Deferred(DeferredSubform<'n>),
}

impl From<&str> for Piece<'_> {
    fn from(text: &str) -> Self {
        Piece::Literal(text.to_string())
    }
}

impl From<String> for Piece<'_> {
    fn from(text: String) -> Self {
        Piece::Literal(text)
    }
}

impl<'n> From<DeferredSubform<'n>> for Piece<'n> {
    fn from(subform: DeferredSubform<'n>) -> Self {
        Piece::Deferred(subform)
    }
}

/// One candidate layout of a node, with its children not yet resolved.
///
/// Pieces are kept in output order. Adjacent literals are merged and empty
/// literals dropped on construction, which preserves the text.
///
/// # Examples
///
/// ```rust
/// use sutra_fmt::format::{DeferredSubform, PartialFormat, Piece};
/// use sutra_fmt::syntax::parse;
/// let nodes = parse("x").unwrap();
/// let format = PartialFormat::new(vec![
///     Piece::from("("),
///     Piece::from(""),
///     Piece::from("'"),
///     Piece::from(DeferredSubform::new(&nodes[0])),
/// ]);
/// assert_eq!(format.pieces().len(), 2);
/// assert_eq!(format.pieces()[0], Piece::from("('"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartialFormat<'n> {
    pieces: Vec<Piece<'n>>,
}

impl<'n> PartialFormat<'n> {
    pub fn new(pieces: impl IntoIterator<Item = Piece<'n>>) -> Self {
        let mut normalized: Vec<Piece<'n>> = Vec::new();
        for piece in pieces {
            match piece {
                Piece::Literal(text) if text.is_empty() => {}
                Piece::Literal(text) => match normalized.last_mut() {
                    Some(Piece::Literal(previous)) => previous.push_str(&text),
                    _ => normalized.push(Piece::Literal(text)),
                },
                deferred => normalized.push(deferred),
            }
        }
        Self { pieces: normalized }
    }

    /// A format consisting of a single literal.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(std::iter::once(Piece::Literal(text.into())))
    }

    pub fn builder() -> PartialFormatBuilder<'n> {
        PartialFormatBuilder::default()
    }

    pub fn pieces(&self) -> &[Piece<'n>] {
        &self.pieces
    }

    pub fn into_pieces(self) -> Vec<Piece<'n>> {
        self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Deferred children in output order.
    pub fn subforms(&self) -> impl Iterator<Item = &DeferredSubform<'n>> {
        self.pieces.iter().filter_map(|piece| match piece {
            Piece::Deferred(subform) => Some(subform),
            Piece::Literal(_) => None,
        })
    }
}

impl<'n> FromIterator<Piece<'n>> for PartialFormat<'n> {
    fn from_iter<I: IntoIterator<Item = Piece<'n>>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Shows the format with children as `{...}` placeholders.
impl fmt::Display for PartialFormat<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => f.write_str(text)?,
                Piece::Deferred(sub) => {
                    write!(f, "{}{{{}}}{}", sub.prefix, sub.node.value.pretty(), sub.suffix)?
                }
            }
        }
        Ok(())
    }
}

/// Incremental construction of a [`PartialFormat`].
#[derive(Debug, Default)]
pub struct PartialFormatBuilder<'n> {
    pieces: Vec<Piece<'n>>,
}

impl<'n> PartialFormatBuilder<'n> {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.pieces.push(Piece::Literal(text.into()));
        self
    }

    /// Defers `node` with no decoration.
    pub fn child(self, node: &'n Node) -> Self {
        self.subform(DeferredSubform::new(node))
    }

    pub fn subform(mut self, subform: DeferredSubform<'n>) -> Self {
        self.pieces.push(Piece::Deferred(subform));
        self
    }

    pub fn build(self) -> PartialFormat<'n> {
        PartialFormat::new(self.pieces)
    }
}
