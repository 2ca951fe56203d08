//! # Built-in Rewrite Rules
//!
//! This crate provides the default rewrite rule families for the expression rewrite
//! engine, grouped into the named sets the rewriter's passes apply:
//!
//! - **Comparator elimination**: constant-fold comparisons between two constants,
//!   one rule per comparison operator.
//! - **Equivalent transform**: generate the flipped child ordering of `AND`, `OR`,
//!   and `=` as equivalent group members, so later rules match either orientation.
//! - **Transitive transform**: simplify conjunctions of equalities over the same
//!   column -- contradiction detection and constant propagation.
//! - **Boolean short-circuit**: collapse conjunctions with a known boolean constant
//!   operand.
//! - **NULL lookup**: collapse comparisons and conjunctions that three-valued logic
//!   determines once a NULL constant operand is present.

pub mod boolean_short_circuit;
pub mod comparator_elimination;
pub mod equivalent_transform;
pub mod null_lookup;
pub mod transitive_transform;

use rwx_core::expr::CompareOp;
use rwx_core::rewriter::Rewriter;
use rwx_core::rule::{RuleSet, RuleSetName};
use std::sync::Arc;

/// Create the default rule set with all built-in rewrite rules.
pub fn default_rule_set() -> RuleSet {
    let mut rules = RuleSet::new();

    for op in [
        CompareOp::Eq,
        CompareOp::NotEq,
        CompareOp::Lt,
        CompareOp::Gt,
        CompareOp::LtEq,
        CompareOp::GtEq,
    ] {
        rules.add_rewrite_rule(
            RuleSetName::ComparatorElimination,
            Box::new(comparator_elimination::ComparatorElimination::new(op)),
        );
    }

    rules.add_rewrite_rule(
        RuleSetName::EquivalentTransform,
        Box::new(equivalent_transform::EquivalentTransform::and()),
    );
    rules.add_rewrite_rule(
        RuleSetName::EquivalentTransform,
        Box::new(equivalent_transform::EquivalentTransform::or()),
    );
    rules.add_rewrite_rule(
        RuleSetName::EquivalentTransform,
        Box::new(equivalent_transform::EquivalentTransform::equal()),
    );

    rules.add_rewrite_rule(
        RuleSetName::TransitiveTransform,
        Box::new(transitive_transform::TvEqualityWithTwoCv::new()),
    );
    rules.add_rewrite_rule(
        RuleSetName::TransitiveTransform,
        Box::new(transitive_transform::TransitiveClosureConstant::new()),
    );

    rules.add_rewrite_rule(
        RuleSetName::BooleanShortCircuit,
        Box::new(boolean_short_circuit::AndShortCircuit::new()),
    );
    rules.add_rewrite_rule(
        RuleSetName::BooleanShortCircuit,
        Box::new(boolean_short_circuit::OrShortCircuit::new()),
    );

    rules.add_rewrite_rule(
        RuleSetName::NullLookup,
        Box::new(null_lookup::NullComparisonLookup::new()),
    );
    rules.add_rewrite_rule(
        RuleSetName::NullLookup,
        Box::new(null_lookup::AndNullLookup::new()),
    );
    rules.add_rewrite_rule(
        RuleSetName::NullLookup,
        Box::new(null_lookup::OrNullLookup::new()),
    );

    rules
}

/// A rewriter configured with the default rule set.
pub fn default_rewriter() -> Rewriter {
    Rewriter::new(Arc::new(default_rule_set()))
}
