//! Formatting rules.
//!
//! A rule is a named, pure function from a node to at most one candidate
//! layout. Rules carry no state and do no I/O, so the resolver may apply them
//! as often as it likes and share the results.

use std::fmt;
use std::sync::Arc;

use super::PartialFormat;
use crate::ast::Node;

/// Signature shared by every rule body.
pub type RuleFn = dyn for<'n> Fn(&'n Node) -> Option<PartialFormat<'n>> + Send + Sync;

/// Which dispatch tier a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleTier {
    /// Tried first; every match contributes a candidate.
    Normal,
    /// Consulted only when no normal rule matches.
    Fallback,
}

impl fmt::Display for RuleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleTier::Normal => f.write_str("normal"),
            RuleTier::Fallback => f.write_str("fallback"),
        }
    }
}

/// A named formatting rule.
///
/// # Examples
///
/// ```rust
/// use sutra_fmt::format::{PartialFormat, Rule};
/// use sutra_fmt::syntax::parse;
///
/// let nil = Rule::when(
///     "empty-list-as-nil",
///     |node| node.as_list().map_or(false, |items| items.is_empty()),
///     |_| PartialFormat::text("'()"),
/// );
/// let nodes = parse("() x").unwrap();
/// assert_eq!(nil.apply(&nodes[0]), Some(PartialFormat::text("'()")));
/// assert_eq!(nil.apply(&nodes[1]), None);
/// ```
#[derive(Clone)]
pub struct Rule {
    name: Arc<str>,
    tier: RuleTier,
    func: Arc<RuleFn>,
}

impl Rule {
    pub fn new<F>(name: &str, tier: RuleTier, func: F) -> Self
    where
        F: for<'n> Fn(&'n Node) -> Option<PartialFormat<'n>> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            tier,
            func: Arc::new(func),
        }
    }

    pub fn normal<F>(name: &str, func: F) -> Self
    where
        F: for<'n> Fn(&'n Node) -> Option<PartialFormat<'n>> + Send + Sync + 'static,
    {
        Self::new(name, RuleTier::Normal, func)
    }

    pub fn fallback<F>(name: &str, func: F) -> Self
    where
        F: for<'n> Fn(&'n Node) -> Option<PartialFormat<'n>> + Send + Sync + 'static,
    {
        Self::new(name, RuleTier::Fallback, func)
    }

    /// Builds a normal-tier rule from a shape predicate and a body that runs
    /// only on matching nodes.
    pub fn when<P, B>(name: &str, predicate: P, body: B) -> Self
    where
        P: Fn(&Node) -> bool + Send + Sync + 'static,
        B: for<'n> Fn(&'n Node) -> PartialFormat<'n> + Send + Sync + 'static,
    {
        Self::normal(name, move |node| {
            if predicate(node) {
                Some(body(node))
            } else {
                None
            }
        })
    }

    /// Moves the rule to another tier.
    pub fn in_tier(mut self, tier: RuleTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tier(&self) -> RuleTier {
        self.tier
    }

    pub fn is_fallback(&self) -> bool {
        self.tier == RuleTier::Fallback
    }

    pub fn apply<'n>(&self, node: &'n Node) -> Option<PartialFormat<'n>> {
        (self.func)(node)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("tier", &self.tier)
            .finish_non_exhaustive()
    }
}
