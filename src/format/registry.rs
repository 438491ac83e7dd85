//! Rule registry and dispatch.
//!
//! The registry is an ordered, persistent collection of rules. Order matters
//! twice over: normal rules are tried in registration order and each match
//! becomes a candidate in that order, which is also the order of preference
//! when the renderer picks a layout. Fallback rules are consulted only when no
//! normal rule matches.
//!
//! Registries are cheap to clone (`im::Vector`), so a caller can start from the
//! shared default registry and layer its own rules on top for a single call.
//!
//! | Method              | Position  | Error on Duplicate | Notes                          |
//! |---------------------|-----------|--------------------|--------------------------------|
//! | register            | back      | No                 | In-place                       |
//! | register_or_error   | back      | Yes                | In-place                       |
//! | with_override       | front     | No                 | Returns a new registry         |
//! | remove              | N/A       | N/A                | Removes the first rule by name |

use std::fmt;

use im::Vector;
use tracing::trace;

use super::{PartialFormat, Rule, RuleTier};
use crate::ast::Node;
use crate::doc::Alternatives;
use crate::{err_msg, FormatError};

/// Ordered collection of formatting rules.
#[derive(Clone, Default)]
pub struct Registry {
    rules: Vector<Rule>,
}

impl Registry {
    /// Creates an empty registry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sutra_fmt::format::Registry;
    /// let registry = Registry::new();
    /// assert!(registry.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule; it is tried after every rule already registered.
    pub fn register(&mut self, rule: Rule) {
        self.rules.push_back(rule);
    }

    /// Appends a rule, refusing names that are already taken.
    ///
    /// # Errors
    /// Returns a `Registry` error if a rule with the same name exists.
    pub fn register_or_error(&mut self, rule: Rule) -> Result<(), FormatError> {
        if self.contains(rule.name()) {
            return Err(err_msg!(Registry, "rule '{}' is already registered", rule.name()));
        }
        self.register(rule);
        Ok(())
    }

    /// A copy of this registry with `rule` tried before all others.
    ///
    /// This is how a caller overrides the layout of specific shapes without
    /// touching the defaults.
    pub fn with_override(&self, rule: Rule) -> Self {
        let mut rules = self.rules.clone();
        rules.push_front(rule);
        Self { rules }
    }

    /// Removes the first rule called `name`.
    pub fn remove(&mut self, name: &str) -> Option<Rule> {
        let index = self.rules.iter().position(|rule| rule.name() == name)?;
        Some(self.rules.remove(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name() == name)
    }

    /// Rule names in dispatch order.
    pub fn names(&self) -> Vec<String> {
        self.rules.iter().map(|rule| rule.name().to_string()).collect()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Candidate layouts for `node`, most preferred first.
    ///
    /// Every matching normal rule contributes, in registration order. Only if
    /// none match are the fallback rules applied, the same way. An empty
    /// result means the node cannot be formatted with this registry.
    pub fn dispatch<'n>(&self, node: &'n Node) -> Alternatives<PartialFormat<'n>> {
        let normal = self.apply_tier(RuleTier::Normal, node);
        if !normal.is_empty() {
            trace!(candidates = normal.len(), tier = "normal", "dispatch");
            return normal;
        }
        let fallback = self.apply_tier(RuleTier::Fallback, node);
        trace!(candidates = fallback.len(), tier = "fallback", "dispatch");
        fallback
    }

    fn apply_tier<'n>(&self, tier: RuleTier, node: &'n Node) -> Alternatives<PartialFormat<'n>> {
        self.rules
            .iter()
            .filter(|rule| rule.tier() == tier)
            .filter_map(|rule| rule.apply(node))
            .collect()
    }
}

/// Free-function form of [`Registry::dispatch`].
pub fn dispatch<'n>(node: &'n Node, registry: &Registry) -> Alternatives<PartialFormat<'n>> {
    registry.dispatch(node)
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rules.iter()).finish()
    }
}

impl FromIterator<Rule> for Registry {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl Extend<Rule> for Registry {
    fn extend<I: IntoIterator<Item = Rule>>(&mut self, iter: I) {
        for rule in iter {
            self.register(rule);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{make_symbol, Span};

    fn literal_rule(name: &str, text: &'static str, tier: RuleTier) -> Rule {
        Rule::new(name, tier, move |_node| Some(PartialFormat::text(text)))
    }

    #[test]
    fn register_or_error_rejects_duplicates() {
        let mut registry = Registry::new();
        registry
            .register_or_error(literal_rule("a", "a", RuleTier::Normal))
            .unwrap();
        let err = registry
            .register_or_error(literal_rule("a", "b", RuleTier::Normal))
            .unwrap_err();
        assert!(err.message().contains("'a'"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn override_goes_first_and_leaves_original_untouched() {
        let mut base = Registry::new();
        base.register(literal_rule("base", "base", RuleTier::Normal));
        let layered = base.with_override(literal_rule("mine", "mine", RuleTier::Normal));
        assert_eq!(layered.names(), vec!["mine", "base"]);
        assert_eq!(base.names(), vec!["base"]);

        let x = make_symbol("x", Span::default());
        let candidates = layered.dispatch(&x);
        assert_eq!(candidates.first(), Some(&PartialFormat::text("mine")));
    }

    #[test]
    fn remove_drops_first_match() {
        let mut registry: Registry = vec![
            literal_rule("a", "1", RuleTier::Normal),
            literal_rule("b", "2", RuleTier::Fallback),
        ]
        .into_iter()
        .collect();
        assert!(registry.remove("a").is_some());
        assert!(registry.remove("a").is_none());
        assert_eq!(registry.names(), vec!["b"]);
        assert!(registry.get("b").map_or(false, Rule::is_fallback));
    }

    #[test]
    fn fallback_only_when_no_normal_rule_matches() {
        let x = make_symbol("x", Span::default());
        let mut registry = Registry::new();
        registry.register(literal_rule("fb", "fallback", RuleTier::Fallback));
        assert_eq!(
            dispatch(&x, &registry).into_vec(),
            vec![PartialFormat::text("fallback")]
        );

        registry.register(literal_rule("n", "normal", RuleTier::Normal));
        assert_eq!(
            dispatch(&x, &registry).into_vec(),
            vec![PartialFormat::text("normal")]
        );
    }

    #[test]
    fn empty_registry_yields_no_candidates() {
        let x = make_symbol("x", Span::default());
        assert!(Registry::new().dispatch(&x).is_empty());
    }
}
