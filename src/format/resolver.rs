//! Recursive resolution of partial formats into documents.
//!
//! For one node the resolver asks the registry for candidates, resolves every
//! deferred child of every candidate with the same registry, splices the
//! pieces into one document per candidate, and offers the candidates as an
//! ordered alternation.
//!
//! A candidate is dropped when one of its children cannot be formatted, or
//! when it needs a child on one line (`flatten`) and every layout of that
//! child breaks; its siblings may still succeed. A node left with no
//! candidates fails with the first child error it saw, or with
//! `FlattenUnsatisfiable` if only flattening went wrong. Hitting the depth
//! limit aborts the whole pass. There is no partial output.

use std::collections::HashMap;
use std::marker::PhantomData;

use tracing::{debug, trace};

use super::{PartialFormat, Piece, Registry};
use crate::ast::Node;
use crate::diagnostics::ErrorType;
use crate::doc::{Alternatives, Doc, Flattener};
use crate::{err_at, FormatError};

/// Deepest node nesting the resolver accepts.
pub const MAX_RESOLVE_DEPTH: usize = 512;

/// Resolves `node` to a document using `registry`.
///
/// # Examples
///
/// ```rust
/// use sutra_fmt::doc::render;
/// use sutra_fmt::format::resolve;
/// use sutra_fmt::rules::default_registry;
/// use sutra_fmt::syntax::parse;
///
/// let nodes = parse("(+ 1 (+ 2 3 4) 5)").unwrap();
/// let doc = resolve(&nodes[0], default_registry()).unwrap();
/// assert_eq!(render(&doc, 80), "(+ 1 (+ 2 3 4) 5)");
/// assert_eq!(render(&doc, 15), "(+ 1\n   (+ 2 3 4)\n   5)");
/// ```
pub fn resolve(node: &Node, registry: &Registry) -> Result<Doc, FormatError> {
    Resolver::new(registry).resolve(node)
}

/// One resolution pass over a tree.
///
/// Within a pass each node is resolved once, however many candidates defer
/// it; the resulting document, or the failure, is shared. Nodes are
/// identified by address, which stays valid because they are borrowed for
/// the whole pass.
pub struct Resolver<'r, 'n> {
    registry: &'r Registry,
    resolved: HashMap<*const Node, Doc>,
    failed: HashMap<*const Node, FormatError>,
    flattener: Flattener,
    _tree: PhantomData<&'n Node>,
}

impl<'r, 'n> Resolver<'r, 'n> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            resolved: HashMap::new(),
            failed: HashMap::new(),
            flattener: Flattener::new(),
            _tree: PhantomData,
        }
    }

    pub fn resolve(&mut self, node: &'n Node) -> Result<Doc, FormatError> {
        self.resolve_at(node, 0)
    }

    fn resolve_at(&mut self, node: &'n Node, depth: usize) -> Result<Doc, FormatError> {
        let key: *const Node = node;
        if let Some(doc) = self.resolved.get(&key) {
            return Ok(doc.clone());
        }
        if let Some(err) = self.failed.get(&key) {
            return Err(err.replay());
        }
        if depth > MAX_RESOLVE_DEPTH {
            return Err(err_at!(
                RecursionLimit,
                node.span,
                "nesting deeper than {} levels",
                MAX_RESOLVE_DEPTH
            ));
        }

        let candidates = self.registry.dispatch(node);
        if candidates.is_empty() {
            let err = err_at!(
                NoApplicableRule,
                node.span,
                "no formatting rule matches {} `{}`",
                node.value.kind_name(),
                summarize(node)
            )
            .with_help("register a rule for this shape, or a fallback rule that accepts it");
            return Err(self.fail(key, err));
        }
        trace!(depth, candidates = candidates.len(), "resolving node");

        let mut layouts = Alternatives::new();
        let mut first_error = None;
        for candidate in candidates {
            match self.resolve_candidate(candidate, depth) {
                Ok(Some(doc)) => layouts.push(doc),
                Ok(None) => debug!(
                    node = %summarize(node),
                    "dropped candidate: a flattened child has no single-line layout"
                ),
                Err(err) if err.error_type() == ErrorType::RecursionLimit => return Err(err),
                Err(err) => {
                    debug!(node = %summarize(node), error = %err, "dropped candidate");
                    first_error.get_or_insert(err);
                }
            }
        }
        if layouts.is_empty() {
            let err = first_error.unwrap_or_else(|| {
                err_at!(
                    FlattenUnsatisfiable,
                    node.span,
                    "every layout of `{}` needs a line break inside a subform that must stay on one line",
                    summarize(node)
                )
            });
            return Err(self.fail(key, err));
        }

        let doc = Doc::alt(layouts);
        self.resolved.insert(key, doc.clone());
        Ok(doc)
    }

    fn fail(&mut self, key: *const Node, err: FormatError) -> FormatError {
        self.failed.insert(key, err.replay());
        err
    }

    /// Builds the document for one candidate, or `None` if a flattened child
    /// cannot be laid out on one line.
    fn resolve_candidate(
        &mut self,
        format: PartialFormat<'n>,
        depth: usize,
    ) -> Result<Option<Doc>, FormatError> {
        let mut parts = Vec::with_capacity(format.len());
        for piece in format.into_pieces() {
            match piece {
                Piece::Literal(text) => parts.push(Doc::literal(&text)),
                Piece::Deferred(subform) => {
                    let inner = self.resolve_at(subform.node(), depth + 1)?;
                    let inner = if subform.is_flattened() {
                        match self.flattener.flatten(&inner) {
                            Some(flat) => flat,
                            None => return Ok(None),
                        }
                    } else {
                        inner
                    };
                    parts.push(subform.wrap(inner));
                }
            }
        }
        Ok(Some(Doc::concat(parts)))
    }
}

/// Short one-line rendering of a node for diagnostics.
fn summarize(node: &Node) -> String {
    const LIMIT: usize = 40;
    let text = node.value.pretty();
    if text.chars().count() <= LIMIT {
        return text;
    }
    let mut short: String = text.chars().take(LIMIT).collect();
    short.push_str("...");
    short
}
