//! Definitions.
//!
//! A binding `(define name expr)` gets two candidates: all on one line, or the
//! expression on its own line two columns in. A function definition
//! `(define (name params...) body...)` always puts each body form on its own
//! line, two columns past the definition.
//!
//! ```text
//! (define answer          (define (area w h)
//!   (* 6 7))                (check w h)
//!                           (* w h))
//! ```

use super::is_define_like;
use crate::ast::Node;
use crate::format::{DeferredSubform, PartialFormat, Registry, Rule};

/// Columns a definition's body is indented past the definition itself.
pub const BODY_INDENT: usize = 2;

pub fn register_define_rules(registry: &mut Registry) {
    registry.register(Rule::when("binding-compact", is_binding, format_binding_compact));
    registry.register(Rule::when("binding-expanded", is_binding, format_binding_expanded));
    registry.register(Rule::when(
        "function-definition",
        is_function_definition,
        format_function_definition,
    ));
}

/// `(define-like name expr)` with `name` a symbol.
pub fn is_binding(node: &Node) -> bool {
    match node.as_list() {
        Some([keyword, name, _]) => is_define_like(keyword) && name.as_symbol().is_some(),
        _ => false,
    }
}

/// `(define-like (name params...) body...)`.
pub fn is_function_definition(node: &Node) -> bool {
    match node.as_list() {
        Some([keyword, header, ..]) => {
            is_define_like(keyword) && header.as_list().map_or(false, |h| !h.is_empty())
        }
        _ => false,
    }
}

fn format_binding_compact(node: &Node) -> PartialFormat<'_> {
    let mut format = PartialFormat::builder().text("(");
    for (i, item) in node.as_list().unwrap_or_default().iter().enumerate() {
        if i > 0 {
            format = format.text(" ");
        }
        format = format.subform(DeferredSubform::new(item).flatten());
    }
    format.text(")").build()
}

fn format_binding_expanded(node: &Node) -> PartialFormat<'_> {
    let items = node.as_list().unwrap_or_default();
    let mut format = PartialFormat::builder().text("(");
    if let [keyword, name, expr] = items {
        format = format
            .child(keyword)
            .text(" ")
            .child(name)
            .subform(DeferredSubform::new(expr).prefix("\n").nest(BODY_INDENT));
    }
    format.text(")").build()
}

fn format_function_definition(node: &Node) -> PartialFormat<'_> {
    let items = node.as_list().unwrap_or_default();
    let mut format = PartialFormat::builder().text("(");
    if let [keyword, header, body @ ..] = items {
        format = format
            .child(keyword)
            .text(" ")
            .subform(DeferredSubform::new(header).align());
        for form in body {
            format = format.subform(DeferredSubform::new(form).prefix("\n").nest(BODY_INDENT));
        }
    }
    format.text(")").build()
}
