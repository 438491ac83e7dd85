//! Leaf values print as their canonical text.

use crate::ast::Node;
use crate::format::{PartialFormat, Registry, Rule};

pub fn register_atom_rules(registry: &mut Registry) {
    registry.register(Rule::normal("atom", format_atom));
}

/// A single literal piece with the atom's canonical text; strings come back
/// re-quoted with their escapes.
pub fn format_atom(node: &Node) -> Option<PartialFormat<'_>> {
    node.value.atom_text().map(PartialFormat::text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn atom_text(src: &str) -> Option<String> {
        let nodes = parse(src).unwrap();
        format_atom(&nodes[0]).map(|f| f.to_string())
    }

    #[test]
    fn atoms_print_canonically() {
        assert_eq!(atom_text("hello"), Some("hello".to_string()));
        assert_eq!(atom_text("42"), Some("42".to_string()));
        assert_eq!(atom_text("\"a\\nb\""), Some("\"a\\nb\"".to_string()));
        assert_eq!(atom_text("#:hello"), Some("#:hello".to_string()));
        assert_eq!(atom_text("#true"), Some("#t".to_string()));
    }

    #[test]
    fn lists_are_not_atoms() {
        assert_eq!(atom_text("(a)"), None);
    }
}
