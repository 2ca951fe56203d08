//! # Comparator Elimination
//!
//! Folds a comparison between two constants into a boolean constant. One rule
//! instance is registered per comparison operator, so the pattern alone constrains
//! applicability and `check` stays trivially true.
//!
//! NULL operands follow SQL semantics: comparing with NULL yields the boolean NULL.
//! `<=` has no predefined comparison on values, so it is computed as `>` with the
//! truth value flipped unless it is NULL.
//!
//! Incomparable constant types produce no rewrite. The branch is left as is rather
//! than reported: it may be collapsed away by a later pass, and a genuine type error
//! surfaces during execution.

use rwx_core::expr::{CompareOp, ScalarExpr, ScalarOp};
use rwx_core::memo::Memo;
use rwx_core::pattern::Pattern;
use rwx_core::rule::{RewriteRule, RulePromise};
use rwx_core::value::ScalarValue;

/// Constant-fold one comparison operator over two constant operands.
pub struct ComparatorElimination {
    compare: CompareOp,
    name: &'static str,
    pattern: Pattern,
}

impl ComparatorElimination {
    pub fn new(compare: CompareOp) -> Self {
        let name = match compare {
            CompareOp::Eq => "ConstantCompareEqual",
            CompareOp::NotEq => "ConstantCompareNotEqual",
            CompareOp::Lt => "ConstantCompareLessThan",
            CompareOp::LtEq => "ConstantCompareLessThanOrEqualTo",
            CompareOp::Gt => "ConstantCompareGreaterThan",
            CompareOp::GtEq => "ConstantCompareGreaterThanOrEqualTo",
        };
        ComparatorElimination {
            compare,
            name,
            pattern: Pattern::compare(compare, Pattern::constant(), Pattern::constant()),
        }
    }
}

impl RewriteRule for ComparatorElimination {
    fn name(&self) -> &str {
        self.name
    }

    fn promise(&self) -> RulePromise {
        RulePromise::Medium
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn transform(&self, binding: &ScalarExpr, _memo: &Memo) -> Vec<ScalarExpr> {
        // The binding succeeded, so there are exactly two constant children.
        assert_eq!(binding.children.len(), 2, "comparison binding must be binary");
        let (ScalarOp::Constant(left), ScalarOp::Constant(right)) =
            (&binding.children[0].op, &binding.children[1].op)
        else {
            panic!("comparator elimination bound non-constant operands");
        };

        if !left.check_comparable(right) {
            return Vec::new();
        }

        let result = match self.compare {
            CompareOp::Eq => left.compare_equals(right),
            CompareOp::NotEq => left.compare_not_equals(right),
            CompareOp::Lt => left.compare_less_than(right),
            CompareOp::Gt => left.compare_greater_than(right),
            CompareOp::GtEq => left.compare_greater_than_equals(right),
            // No predefined <= on values: compute >, then flip unless NULL.
            CompareOp::LtEq => left.compare_greater_than(right).map(|gt| !gt),
        };

        vec![ScalarExpr::constant(ScalarValue::Boolean(result))]
    }
}
