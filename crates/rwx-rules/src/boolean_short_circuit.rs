//! # Boolean Short-Circuit
//!
//! Collapses a conjunction with a known boolean constant operand:
//!
//! - `TRUE AND x` → `x`, `FALSE AND x` → `FALSE`
//! - `TRUE OR x` → `TRUE`, `FALSE OR x` → `x`
//!
//! The pattern matches the constant on the left only; the equivalent-transform pass
//! has already populated the flipped ordering of every conjunction, so a constant on
//! either side binds. Applied with replace-on-transform: the group collapses to the
//! result, and when the result is the other operand the group becomes an alias of
//! that operand's group.
//!
//! The boolean NULL is out of scope here; NULL operands belong to the null-lookup
//! pass.

use rwx_core::expr::{ConjunctionOp, ScalarExpr, ScalarOp};
use rwx_core::memo::Memo;
use rwx_core::pattern::Pattern;
use rwx_core::rule::{RewriteRule, RulePromise};
use rwx_core::value::ScalarValue;

fn bound_boolean(binding: &ScalarExpr) -> Option<bool> {
    match &binding.children[0].op {
        ScalarOp::Constant(ScalarValue::Boolean(value)) => *value,
        _ => None,
    }
}

/// `AND` with a non-NULL boolean constant operand.
pub struct AndShortCircuit {
    pattern: Pattern,
}

impl AndShortCircuit {
    pub fn new() -> Self {
        AndShortCircuit {
            pattern: Pattern::conjunction(
                ConjunctionOp::And,
                Pattern::constant(),
                Pattern::GroupMarker,
            ),
        }
    }
}

impl Default for AndShortCircuit {
    fn default() -> Self {
        Self::new()
    }
}

impl RewriteRule for AndShortCircuit {
    fn name(&self) -> &str {
        "AndShortCircuit"
    }

    fn promise(&self) -> RulePromise {
        RulePromise::High
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn check(&self, binding: &ScalarExpr, _memo: &Memo) -> bool {
        bound_boolean(binding).is_some()
    }

    fn transform(&self, binding: &ScalarExpr, _memo: &Memo) -> Vec<ScalarExpr> {
        assert_eq!(binding.children.len(), 2, "conjunction binding must be binary");
        match bound_boolean(binding) {
            Some(true) => vec![binding.children[1].clone()],
            Some(false) => vec![ScalarExpr::constant(ScalarValue::boolean(false))],
            None => Vec::new(),
        }
    }
}

/// `OR` with a non-NULL boolean constant operand.
pub struct OrShortCircuit {
    pattern: Pattern,
}

impl OrShortCircuit {
    pub fn new() -> Self {
        OrShortCircuit {
            pattern: Pattern::conjunction(
                ConjunctionOp::Or,
                Pattern::constant(),
                Pattern::GroupMarker,
            ),
        }
    }
}

impl Default for OrShortCircuit {
    fn default() -> Self {
        Self::new()
    }
}

impl RewriteRule for OrShortCircuit {
    fn name(&self) -> &str {
        "OrShortCircuit"
    }

    fn promise(&self) -> RulePromise {
        RulePromise::High
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn check(&self, binding: &ScalarExpr, _memo: &Memo) -> bool {
        bound_boolean(binding).is_some()
    }

    fn transform(&self, binding: &ScalarExpr, _memo: &Memo) -> Vec<ScalarExpr> {
        assert_eq!(binding.children.len(), 2, "conjunction binding must be binary");
        match bound_boolean(binding) {
            Some(true) => vec![ScalarExpr::constant(ScalarValue::boolean(true))],
            Some(false) => vec![binding.children[1].clone()],
            None => Vec::new(),
        }
    }
}
