//! # Transitive Transform
//!
//! Simplifies conjunctions of equalities over the same column. Both rules run
//! bottom-up at low promise, after the child comparison groups are stable, and rely
//! on the equivalent-transform pass for the column-on-the-left orientation: an input
//! written `(1 = A.B) AND (2 = A.B)` binds through the flipped members of the
//! conjunct groups and rewrites exactly like the canonical form.

use rwx_core::expr::{ColumnRef, CompareOp, ConjunctionOp, ScalarExpr, ScalarOp};
use rwx_core::memo::Memo;
use rwx_core::pattern::Pattern;
use rwx_core::rule::{RewriteRule, RulePromise};
use rwx_core::value::ScalarValue;

fn column_of(expr: &ScalarExpr) -> &ColumnRef {
    match &expr.op {
        ScalarOp::ColumnRef(col) => col,
        other => panic!("transitive transform bound a non-column operand: {other:?}"),
    }
}

fn constant_of(expr: &ScalarExpr) -> &ScalarValue {
    match &expr.op {
        ScalarOp::Constant(value) => value,
        other => panic!("transitive transform bound a non-constant operand: {other:?}"),
    }
}

/// `(A.B = x) AND (A.B = y)` → `(A.B = x)` when `x = y`, `FALSE` otherwise.
///
/// Fires only when both conjuncts name exactly the same column and the constants
/// are comparable; an incomparable pair is left for execution to reject.
pub struct TvEqualityWithTwoCv {
    pattern: Pattern,
}

impl TvEqualityWithTwoCv {
    pub fn new() -> Self {
        let conjunct = || Pattern::compare(CompareOp::Eq, Pattern::column(), Pattern::constant());
        TvEqualityWithTwoCv {
            pattern: Pattern::conjunction(ConjunctionOp::And, conjunct(), conjunct()),
        }
    }
}

impl Default for TvEqualityWithTwoCv {
    fn default() -> Self {
        Self::new()
    }
}

impl RewriteRule for TvEqualityWithTwoCv {
    fn name(&self) -> &str {
        "TvEqualityWithTwoCv"
    }

    fn promise(&self) -> RulePromise {
        RulePromise::Low
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn transform(&self, binding: &ScalarExpr, _memo: &Memo) -> Vec<ScalarExpr> {
        assert_eq!(binding.children.len(), 2, "conjunction binding must be binary");
        let left_eq = &binding.children[0];
        let right_eq = &binding.children[1];

        if column_of(&left_eq.children[0]) != column_of(&right_eq.children[0]) {
            return Vec::new();
        }
        let left_value = constant_of(&left_eq.children[1]);
        let right_value = constant_of(&right_eq.children[1]);
        if !left_value.check_comparable(right_value) {
            return Vec::new();
        }

        if left_value.compare_equals(right_value) == Some(true) {
            // Both conjuncts pin the column to the same constant; one copy suffices.
            vec![left_eq.clone()]
        } else {
            // Contradictory constants (a NULL constant also never satisfies both).
            vec![ScalarExpr::constant(ScalarValue::boolean(false))]
        }
    }
}

/// `(K = x) AND (L = R)` with column-column equality on the right: propagate the
/// constant through the equality chain.
///
/// - `L = R` exactly: the second conjunct is vacuous, keep `(K = x)`.
/// - `K = L`: rewrite to `(K = x) AND (x = R)`.
/// - `K = R`: rewrite to `(K = x) AND (L = x)`.
/// - disjoint columns: nothing to propagate.
pub struct TransitiveClosureConstant {
    pattern: Pattern,
}

impl TransitiveClosureConstant {
    pub fn new() -> Self {
        TransitiveClosureConstant {
            pattern: Pattern::conjunction(
                ConjunctionOp::And,
                Pattern::compare(CompareOp::Eq, Pattern::column(), Pattern::constant()),
                Pattern::compare(CompareOp::Eq, Pattern::column(), Pattern::column()),
            ),
        }
    }
}

impl Default for TransitiveClosureConstant {
    fn default() -> Self {
        Self::new()
    }
}

impl RewriteRule for TransitiveClosureConstant {
    fn name(&self) -> &str {
        "TransitiveClosureConstant"
    }

    fn promise(&self) -> RulePromise {
        RulePromise::Low
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn transform(&self, binding: &ScalarExpr, _memo: &Memo) -> Vec<ScalarExpr> {
        assert_eq!(binding.children.len(), 2, "conjunction binding must be binary");
        let left_eq = &binding.children[0];
        let right_eq = &binding.children[1];

        let key = column_of(&left_eq.children[0]);
        let constant = &left_eq.children[1];
        let left_col = &right_eq.children[0];
        let right_col = &right_eq.children[1];

        if column_of(left_col) == column_of(right_col) {
            // L = R is vacuously true; the first conjunct carries all information.
            return vec![left_eq.clone()];
        }
        if key != column_of(left_col) && key != column_of(right_col) {
            return Vec::new();
        }

        let new_right = if key == column_of(left_col) {
            // K = L: substitute the constant for L.
            ScalarExpr::new(
                right_eq.op.clone(),
                vec![constant.clone(), right_col.clone()],
            )
        } else {
            // K = R: substitute the constant for R.
            ScalarExpr::new(right_eq.op.clone(), vec![left_col.clone(), constant.clone()])
        };

        vec![ScalarExpr::new(
            binding.op.clone(),
            vec![left_eq.clone(), new_right],
        )]
    }
}
