//! Reader shorthand: `(quote x)` prints as `'x`, and likewise for
//! `quasiquote`, `unquote` and `unquote-splicing`.

use crate::ast::Node;
use crate::format::{DeferredSubform, PartialFormat, Registry, Rule};

pub fn register_abbreviation_rules(registry: &mut Registry) {
    registry.register(Rule::normal("abbreviation", format_abbreviation));
}

/// The shorthand prefix for a quoting form name.
pub fn abbreviation_prefix(form: &str) -> Option<&'static str> {
    match form {
        "quote" => Some("'"),
        "quasiquote" => Some("`"),
        "unquote" => Some(","),
        "unquote-splicing" => Some(",@"),
        _ => None,
    }
}

pub fn format_abbreviation(node: &Node) -> Option<PartialFormat<'_>> {
    let [head, operand] = node.as_list()? else {
        return None;
    };
    let prefix = abbreviation_prefix(head.as_symbol()?)?;
    Some(
        PartialFormat::builder()
            .text(prefix)
            .subform(DeferredSubform::new(operand).align())
            .build(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{abbreviation_form, parse};

    #[test]
    fn prefixes_invert_the_reader() {
        for prefix in ["'", "`", ",", ",@"] {
            let form = abbreviation_form(prefix).unwrap();
            assert_eq!(abbreviation_prefix(form), Some(prefix));
        }
    }

    #[test]
    fn quoted_forms_use_shorthand() {
        let nodes = parse("'(a b) (quasiquote x) ,@xs").unwrap();
        let shown: Vec<String> = nodes
            .iter()
            .map(|n| format_abbreviation(n).unwrap().to_string())
            .collect();
        assert_eq!(shown, vec!["'{(a b)}", "`{x}", ",@{xs}"]);
    }

    #[test]
    fn other_shapes_do_not_match() {
        let nodes = parse("(quote a b) (quote) (f x) quote").unwrap();
        assert!(nodes.iter().all(|n| format_abbreviation(n).is_none()));
    }
}
