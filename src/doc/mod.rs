//! Document algebra
//!
//! Layout-independent descriptions of text. A [`Doc`] is built from a handful
//! of primitives (text, horizontal and vertical concatenation, alignment,
//! nesting and ordered alternation) and turned into a string for a given page
//! width by [`render`].
//!
//! Documents are immutable and share their children through `Arc`, so the
//! same resolved subtree can sit inside several alternatives without being
//! copied.
//!
//! # Example
//!
//! ```rust
//! use sutra_fmt::doc::{render, Alternatives, Doc};
//! let flat = Doc::text("(a b)");
//! let tall = Doc::literal("(a\n b)");
//! let doc = Doc::alt(Alternatives::from(vec![flat, tall]));
//! assert_eq!(render(&doc, 80), "(a b)");
//! assert_eq!(render(&doc, 3), "(a\n b)");
//! ```

use std::collections::HashMap;
use std::sync::Arc;

pub mod render;

pub use render::render;

// ============================================================================
// ORDERED ALTERNATIVES
// ============================================================================

/// An ordered set of interchangeable choices, most preferred first.
///
/// Used for the candidates a rule registry produces for one node and for the
/// branches of a `Doc::alt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternatives<T>(Vec<T>);

impl<T> Alternatives<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, choice: T) {
        self.0.push(choice);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.0.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T: PartialEq> Alternatives<T> {
    pub fn contains(&self, choice: &T) -> bool {
        self.0.contains(choice)
    }
}

impl<T> Default for Alternatives<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for Alternatives<T> {
    fn from(choices: Vec<T>) -> Self {
        Self(choices)
    }
}

impl<T> FromIterator<T> for Alternatives<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for Alternatives<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Alternatives<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// DOCUMENTS
// ============================================================================

/// A shared, immutable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doc(Arc<DocKind>);

/// The primitive document shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocKind {
    /// One line of text; never contains a newline.
    Text(String),
    /// Horizontal concatenation, no breaks inserted.
    Concat(Vec<Doc>),
    /// Vertical concatenation: a hard line break between adjacent documents.
    VConcat(Vec<Doc>),
    /// Continuation lines of the inner document start at the current column.
    Align(Doc),
    /// Continuation lines are indented by extra columns relative to the
    /// enclosing indentation, whatever the current column.
    Nest(usize, Doc),
    /// Interchangeable layouts, most preferred first.
    Alt(Alternatives<Doc>),
}

impl Doc {
    fn from_kind(kind: DocKind) -> Self {
        Doc(Arc::new(kind))
    }

    pub fn kind(&self) -> &DocKind {
        &self.0
    }

    pub fn empty() -> Self {
        Self::from_kind(DocKind::Text(String::new()))
    }

    /// Single-line text. Text containing newlines is routed through
    /// [`Doc::literal`] so that `Text` never holds a line break.
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.contains('\n') {
            return Self::literal(&s);
        }
        Self::from_kind(DocKind::Text(s))
    }

    /// Literal, possibly multi-line text: every embedded newline becomes a
    /// hard break.
    ///
    /// ```rust
    /// use sutra_fmt::doc::{Doc, DocKind};
    /// let doc = Doc::literal("a\nb");
    /// assert!(matches!(doc.kind(), DocKind::VConcat(lines) if lines.len() == 2));
    /// ```
    pub fn literal(s: &str) -> Self {
        let mut lines: Vec<Doc> = s
            .split('\n')
            .map(|line| Self::from_kind(DocKind::Text(line.to_string())))
            .collect();
        if lines.len() == 1 {
            return lines.remove(0);
        }
        Self::from_kind(DocKind::VConcat(lines))
    }

    pub fn concat(docs: impl IntoIterator<Item = Doc>) -> Self {
        let mut docs: Vec<Doc> = docs.into_iter().collect();
        match docs.len() {
            0 => Self::empty(),
            1 => docs.remove(0),
            _ => Self::from_kind(DocKind::Concat(docs)),
        }
    }

    pub fn vconcat(docs: impl IntoIterator<Item = Doc>) -> Self {
        let mut docs: Vec<Doc> = docs.into_iter().collect();
        match docs.len() {
            0 => Self::empty(),
            1 => docs.remove(0),
            _ => Self::from_kind(DocKind::VConcat(docs)),
        }
    }

    pub fn align(doc: Doc) -> Self {
        Self::from_kind(DocKind::Align(doc))
    }

    pub fn nest(columns: usize, doc: Doc) -> Self {
        Self::from_kind(DocKind::Nest(columns, doc))
    }

    /// Ordered alternation. A single alternative is returned as is; an empty
    /// alternation renders as nothing.
    pub fn alt(choices: Alternatives<Doc>) -> Self {
        let mut choices = choices.into_vec();
        if choices.len() == 1 {
            return choices.remove(0);
        }
        Self::from_kind(DocKind::Alt(Alternatives::from(choices)))
    }

    /// Restricts the document to layouts without forced line breaks.
    ///
    /// Returns `None` when no such layout exists. See [`Flattener`] for
    /// flattening many documents that share subdocuments.
    ///
    /// ```rust
    /// use sutra_fmt::doc::{Alternatives, Doc};
    /// let doc = Doc::alt(Alternatives::from(vec![Doc::text("a b"), Doc::literal("a\nb")]));
    /// assert_eq!(doc.flatten(), Some(Doc::text("a b")));
    /// assert_eq!(Doc::literal("a\nb").flatten(), None);
    /// ```
    pub fn flatten(&self) -> Option<Doc> {
        Flattener::new().flatten(self)
    }

    fn same(&self, other: &Doc) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// True when some layout of this document has no forced line break.
    pub fn has_flat_layout(&self) -> bool {
        match self.kind() {
            DocKind::Text(_) => true,
            DocKind::Concat(docs) => docs.iter().all(Doc::has_flat_layout),
            DocKind::VConcat(docs) => docs.len() <= 1 && docs.iter().all(Doc::has_flat_layout),
            DocKind::Align(inner) | DocKind::Nest(_, inner) => inner.has_flat_layout(),
            DocKind::Alt(choices) => choices.iter().any(Doc::has_flat_layout),
        }
    }
}

// ============================================================================
// FLATTENING
// ============================================================================

/// Flattens documents while keeping shared subdocuments shared.
///
/// Every document is flattened at most once per `Flattener`, and a document
/// whose parts are already flat is returned as is. Indentation wrappers are
/// dropped from flat results since they only affect continuation lines, and
/// alternatives that flatten to the same document are merged.
#[derive(Debug, Default)]
pub struct Flattener {
    // The key document is kept alive so its address is not reused.
    seen: HashMap<*const DocKind, (Doc, Option<Doc>)>,
}

impl Flattener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flatten(&mut self, doc: &Doc) -> Option<Doc> {
        let key: *const DocKind = doc.kind();
        if let Some((_, flat)) = self.seen.get(&key) {
            return flat.clone();
        }
        let flat = self.flatten_uncached(doc);
        if let Some(result) = &flat {
            let result_key: *const DocKind = result.kind();
            self.seen
                .entry(result_key)
                .or_insert_with(|| (result.clone(), Some(result.clone())));
        }
        self.seen.insert(key, (doc.clone(), flat.clone()));
        flat
    }

    fn flatten_uncached(&mut self, doc: &Doc) -> Option<Doc> {
        match doc.kind() {
            DocKind::Text(_) => Some(doc.clone()),
            DocKind::Concat(docs) => {
                let flat = docs
                    .iter()
                    .map(|d| self.flatten(d))
                    .collect::<Option<Vec<_>>>()?;
                if docs.iter().zip(&flat).all(|(a, b)| a.same(b)) {
                    Some(doc.clone())
                } else {
                    Some(Doc::concat(flat))
                }
            }
            DocKind::VConcat(docs) => match docs.as_slice() {
                [] => Some(Doc::empty()),
                [only] => self.flatten(only),
                _ => None,
            },
            DocKind::Align(inner) | DocKind::Nest(_, inner) => self.flatten(inner),
            DocKind::Alt(choices) => {
                let mut flat = Alternatives::new();
                for choice in choices {
                    if let Some(f) = self.flatten(choice) {
                        if !flat.contains(&f) {
                            flat.push(f);
                        }
                    }
                }
                if flat.is_empty() {
                    None
                } else if flat.len() == choices.len()
                    && choices.iter().zip(&flat).all(|(a, b)| a.same(b))
                {
                    Some(doc.clone())
                } else {
                    Some(Doc::alt(flat))
                }
            }
        }
    }
}

impl From<&str> for Doc {
    fn from(s: &str) -> Self {
        Doc::literal(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_splits_lines() {
        let doc = Doc::literal("a\n\nb");
        match doc.kind() {
            DocKind::VConcat(lines) => {
                assert_eq!(lines, &vec![Doc::text("a"), Doc::text(""), Doc::text("b")]);
            }
            other => panic!("expected VConcat, got {:?}", other),
        }
    }

    #[test]
    fn text_with_newline_becomes_literal() {
        assert_eq!(Doc::text("a\nb"), Doc::literal("a\nb"));
    }

    #[test]
    fn single_element_combinators_collapse() {
        let a = Doc::text("a");
        assert_eq!(Doc::concat(vec![a.clone()]), a);
        assert_eq!(Doc::vconcat(vec![a.clone()]), a);
        assert_eq!(Doc::alt(Alternatives::from(vec![a.clone()])), a);
    }

    #[test]
    fn flatten_drops_breaking_alternatives() {
        let doc = Doc::concat(vec![
            Doc::text("("),
            Doc::alt(Alternatives::from(vec![
                Doc::text("x y"),
                Doc::vconcat(vec![Doc::text("x"), Doc::text("y")]),
            ])),
            Doc::text(")"),
        ]);
        let flat = doc.flatten().expect("has a flat layout");
        assert_eq!(render(&flat, 1), "(x y)");
        assert!(flat.has_flat_layout());
    }

    #[test]
    fn flatten_fails_on_forced_break() {
        let doc = Doc::nest(2, Doc::concat(vec![Doc::text("a"), Doc::literal("\nb")]));
        assert!(doc.flatten().is_none());
        assert!(!doc.has_flat_layout());
    }

    #[test]
    fn flat_documents_are_returned_unchanged() {
        let doc = Doc::concat(vec![Doc::text("("), Doc::text("x"), Doc::text(")")]);
        let flat = doc.flatten().unwrap();
        assert!(flat.same(&doc));
    }

    #[test]
    fn flattening_merges_equivalent_alternatives() {
        let shared = Doc::text("x");
        let doc = Doc::alt(Alternatives::from(vec![
            Doc::concat(vec![Doc::text("("), shared.clone(), Doc::text(")")]),
            Doc::concat(vec![Doc::text("("), Doc::align(shared.clone()), Doc::text(")")]),
        ]));
        let flat = doc.flatten().unwrap();
        assert!(matches!(flat.kind(), DocKind::Concat(_)), "got {:?}", flat);
        assert_eq!(render(&flat, 80), "(x)");
    }

    #[test]
    fn shared_subdocuments_are_flattened_once() {
        // Each level offers two layouts around the same child.
        let mut doc = Doc::text("x");
        for _ in 0..64 {
            doc = Doc::alt(Alternatives::from(vec![
                Doc::concat(vec![Doc::text("("), doc.clone(), Doc::text(")")]),
                Doc::concat(vec![Doc::text("["), doc.clone(), Doc::text("]")]),
            ]));
        }
        let mut flattener = Flattener::new();
        let flat = flattener.flatten(&doc).unwrap();
        assert!(flat.same(&doc));
        assert!(flattener.seen.len() <= 8 * 64 + 1);
    }

    #[test]
    fn alternatives_preserve_order() {
        let alts: Alternatives<i32> = vec![3, 1, 2].into_iter().collect();
        assert_eq!(alts.as_slice(), &[3, 1, 2]);
        assert_eq!(alts.first(), Some(&3));
        assert_eq!(alts.into_vec(), vec![3, 1, 2]);
    }
}
