//! # Rule System
//!
//! A rewrite rule is a pattern plus two behaviors: `check` decides whether a bound
//! match is applicable, and `transform` produces zero or more equivalent expressions
//! for it. Producing nothing is not a failure -- the rule simply adds no alternative.
//!
//! Rules are collected into named sets ([`RuleSetName`]); each rewrite pass applies
//! exactly one set. Registration assigns every rule a dense [`RuleId`], and firing
//! order within a task is promise descending, then id ascending, which together with
//! the binding iterator's fixed enumeration order makes the whole engine
//! deterministic.

use crate::expr::ScalarExpr;
use crate::memo::Memo;
use crate::pattern::Pattern;
use std::collections::HashMap;

/// Rule priority: within one task, higher-promise rules fire first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RulePromise {
    Low = 1,
    Medium = 2,
    High = 3,
}

/// Dense rule identifier assigned at registration; breaks promise ties.
pub type RuleId = u32;

/// The named rewrite rule sets, applied one per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleSetName {
    ComparatorElimination,
    EquivalentTransform,
    TransitiveTransform,
    BooleanShortCircuit,
    NullLookup,
}

/// A rewrite rule.
///
/// `transform` receives the binding (a concrete tree whose wildcard positions are
/// group markers) together with the memo, so rules that need to reason about a bound
/// group's other members can inspect it.
pub trait RewriteRule: Send + Sync {
    /// Unique name of this rule.
    fn name(&self) -> &str;

    /// Firing priority within the rule set.
    fn promise(&self) -> RulePromise;

    /// Pattern that this rule matches against.
    fn pattern(&self) -> &Pattern;

    /// Whether the rule applies to this binding. The binding already has the
    /// pattern's shape; `check` carries conditions the pattern cannot express.
    fn check(&self, _binding: &ScalarExpr, _memo: &Memo) -> bool {
        true
    }

    /// Produce equivalent expressions for the binding. An empty result means the
    /// rule chose not to rewrite.
    fn transform(&self, binding: &ScalarExpr, memo: &Memo) -> Vec<ScalarExpr>;
}

/// A rule together with its registration id.
pub struct RegisteredRule {
    pub id: RuleId,
    pub rule: Box<dyn RewriteRule>,
}

/// Named collections of rewrite rules.
///
/// Transformation and implementation rules of the plan optimizer live in registries
/// of their own; the rewrite engine only populates the per-name rewrite lists.
#[derive(Default)]
pub struct RuleSet {
    rewrite_rules: HashMap<RuleSetName, Vec<RegisteredRule>>,
    next_id: RuleId,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet::default()
    }

    pub fn add_rewrite_rule(&mut self, set: RuleSetName, rule: Box<dyn RewriteRule>) {
        let id = self.next_id;
        self.next_id += 1;
        self.rewrite_rules
            .entry(set)
            .or_default()
            .push(RegisteredRule { id, rule });
    }

    /// The rules of a set in registration order; empty for an unpopulated set.
    pub fn rewrite_rules(&self, set: RuleSetName) -> &[RegisteredRule] {
        self.rewrite_rules.get(&set).map_or(&[], Vec::as_slice)
    }

    /// The rules of a set in firing order: promise descending, then id ascending.
    pub fn rules_by_promise(&self, set: RuleSetName) -> Vec<&RegisteredRule> {
        let mut rules: Vec<&RegisteredRule> = self.rewrite_rules(set).iter().collect();
        rules.sort_by(|a, b| {
            b.rule
                .promise()
                .cmp(&a.rule.promise())
                .then(a.id.cmp(&b.id))
        });
        rules
    }
}
