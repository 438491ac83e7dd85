//! # Default Rule Set
//!
//! The rules the formatter uses when the caller brings none of its own.
//!
//! ## Module Structure
//!
//! - **`atoms`**: leaves print as their canonical text
//! - **`abbrev`**: `(quote x)` and friends print with reader shorthand
//! - **`define`**: bindings and function definitions
//! - **`forms`**: fallback compact and expanded layouts for any list
//!
//! Registration order is dispatch order, which is also layout preference.
//! Callers that want different layouts for some shapes put their own rules in
//! front with [`Registry::with_override`] instead of editing these.

use once_cell::sync::Lazy;

use crate::ast::Node;
use crate::format::Registry;

pub mod abbrev;
pub mod atoms;
pub mod define;
pub mod forms;

static DEFAULT_REGISTRY: Lazy<Registry> = Lazy::new(build_default_registry);

/// The shared default registry, built on first use.
///
/// # Examples
///
/// ```rust
/// use sutra_fmt::rules::default_registry;
/// let names = default_registry().names();
/// assert_eq!(names.first().map(String::as_str), Some("atom"));
/// ```
pub fn default_registry() -> &'static Registry {
    &DEFAULT_REGISTRY
}

/// A fresh registry holding the default rules, for callers that want to
/// modify it in place.
pub fn build_default_registry() -> Registry {
    let mut registry = Registry::new();
    register_default_rules(&mut registry);
    registry
}

/// Appends the default rules to `registry`.
pub fn register_default_rules(registry: &mut Registry) {
    atoms::register_atom_rules(registry);
    abbrev::register_abbreviation_rules(registry);
    define::register_define_rules(registry);
    forms::register_form_rules(registry);
}

/// `define` itself, or any `define-...` keyword.
pub fn is_define_like(node: &Node) -> bool {
    node.as_symbol()
        .map_or(false, |name| name == "define" || name.starts_with("define-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::RuleTier;
    use crate::syntax::parse;

    #[test]
    fn default_order_puts_fallbacks_last() {
        let registry = build_default_registry();
        assert_eq!(
            registry.names(),
            vec![
                "atom",
                "abbreviation",
                "binding-compact",
                "binding-expanded",
                "function-definition",
                "form-compact",
                "form-expanded",
            ]
        );
        let tiers: Vec<RuleTier> = registry.rules().map(|rule| rule.tier()).collect();
        assert_eq!(tiers[..5], [RuleTier::Normal; 5]);
        assert_eq!(tiers[5..], [RuleTier::Fallback; 2]);
    }

    #[test]
    fn define_like_keywords() {
        let nodes = parse("define define-syntax defined (define) \"define\"").unwrap();
        let flags: Vec<bool> = nodes.iter().map(is_define_like).collect();
        assert_eq!(flags, vec![true, true, false, false, false]);
    }

    #[test]
    fn shared_registry_is_built_once() {
        assert!(std::ptr::eq(default_registry(), default_registry()));
    }
}
