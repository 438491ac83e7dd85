//! Fallback layouts for lists no other rule claims.
//!
//! Every list gets two candidates: everything on one line, or the head on the
//! first line with each remaining child aligned under the first argument.
//!
//! ```text
//! (+ 1 (+ 2 3 4) 5)      (+ 1
//!                           (+ 2 3 4)
//!                           5)
//! ```

use crate::ast::Node;
use crate::format::{DeferredSubform, PartialFormat, Registry, Rule};

pub fn register_form_rules(registry: &mut Registry) {
    registry.register(Rule::fallback("form-compact", format_compact));
    registry.register(Rule::fallback("form-expanded", format_expanded));
}

/// `(a b c)` with every child flattened.
pub fn format_compact(node: &Node) -> Option<PartialFormat<'_>> {
    let items = node.as_list()?;
    let mut format = PartialFormat::builder().text("(");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            format = format.text(" ");
        }
        format = format.subform(DeferredSubform::new(item).flatten());
    }
    Some(format.text(")").build())
}

/// Head inline, then one aligned child per line.
pub fn format_expanded(node: &Node) -> Option<PartialFormat<'_>> {
    let items = node.as_list()?;
    let Some((head, rest)) = items.split_first() else {
        return Some(PartialFormat::text("()"));
    };

    let mut format = PartialFormat::builder().text("(").child(head);
    if let Some((last, middle)) = rest.split_last() {
        format = format.text(" ");
        for item in middle {
            format = format.subform(DeferredSubform::new(item).align().suffix("\n"));
        }
        format = format.subform(DeferredSubform::new(last).align());
    }
    Some(format.text(")").build())
}
