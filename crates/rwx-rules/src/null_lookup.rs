//! # NULL Lookup
//!
//! Collapses compound expressions that three-valued logic determines outright once a
//! NULL constant operand is present:
//!
//! - `x = NULL` is the boolean NULL for every `x` (flipped equality orderings cover
//!   `NULL = x`).
//! - `x AND NULL` / `x OR NULL` collapse only when the truth value of `x` is
//!   provable from its group -- it already holds a boolean constant member. An
//!   unprovable operand produces no rewrite: collapsing `c OR NULL` for an arbitrary
//!   column `c` would change the result on rows where `c` is true.
//!
//! These rules inspect the bound operand's group through the memo, which is why
//! `transform` takes the memo at all.

use rwx_core::expr::{CompareOp, ConjunctionOp, ScalarExpr, ScalarOp};
use rwx_core::memo::{GroupId, Memo};
use rwx_core::pattern::Pattern;
use rwx_core::rule::{RewriteRule, RulePromise};
use rwx_core::value::ScalarValue;

fn null_constant(binding: &ScalarExpr) -> bool {
    matches!(&binding.children[1].op, ScalarOp::Constant(value) if value.is_null())
}

/// The truth value of a group, when one of its members is a boolean constant.
/// `Some(None)` is the boolean NULL; `None` means the group's value is unknown.
fn provable_boolean(memo: &Memo, group: GroupId) -> Option<Option<bool>> {
    memo.group(group)
        .logical_exprs
        .iter()
        .find_map(|&expr_id| match &memo.expr(expr_id).op {
            ScalarOp::Constant(ScalarValue::Boolean(value)) => Some(*value),
            _ => None,
        })
}

/// `x = NULL` → boolean NULL.
pub struct NullComparisonLookup {
    pattern: Pattern,
}

impl NullComparisonLookup {
    pub fn new() -> Self {
        NullComparisonLookup {
            pattern: Pattern::compare(CompareOp::Eq, Pattern::Leaf, Pattern::constant()),
        }
    }
}

impl Default for NullComparisonLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl RewriteRule for NullComparisonLookup {
    fn name(&self) -> &str {
        "NullComparisonLookup"
    }

    fn promise(&self) -> RulePromise {
        RulePromise::Medium
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn check(&self, binding: &ScalarExpr, _memo: &Memo) -> bool {
        null_constant(binding)
    }

    fn transform(&self, binding: &ScalarExpr, _memo: &Memo) -> Vec<ScalarExpr> {
        assert_eq!(binding.children.len(), 2, "comparison binding must be binary");
        vec![ScalarExpr::constant(ScalarValue::Boolean(None))]
    }
}

/// `x AND NULL` with a provable `x`.
pub struct AndNullLookup {
    pattern: Pattern,
}

impl AndNullLookup {
    pub fn new() -> Self {
        AndNullLookup {
            pattern: Pattern::conjunction(
                ConjunctionOp::And,
                Pattern::GroupMarker,
                Pattern::constant(),
            ),
        }
    }
}

impl Default for AndNullLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl RewriteRule for AndNullLookup {
    fn name(&self) -> &str {
        "AndNullLookup"
    }

    fn promise(&self) -> RulePromise {
        RulePromise::Medium
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn check(&self, binding: &ScalarExpr, _memo: &Memo) -> bool {
        null_constant(binding)
    }

    fn transform(&self, binding: &ScalarExpr, memo: &Memo) -> Vec<ScalarExpr> {
        assert_eq!(binding.children.len(), 2, "conjunction binding must be binary");
        let ScalarOp::GroupMarker(group) = binding.children[0].op else {
            panic!("null lookup bound a concrete operand where a group was expected");
        };
        match provable_boolean(memo, group) {
            // TRUE AND NULL and NULL AND NULL are both NULL.
            Some(Some(true)) | Some(None) => {
                vec![ScalarExpr::constant(ScalarValue::Boolean(None))]
            }
            Some(Some(false)) => vec![ScalarExpr::constant(ScalarValue::boolean(false))],
            None => Vec::new(),
        }
    }
}

/// `x OR NULL` with a provable `x`.
pub struct OrNullLookup {
    pattern: Pattern,
}

impl OrNullLookup {
    pub fn new() -> Self {
        OrNullLookup {
            pattern: Pattern::conjunction(
                ConjunctionOp::Or,
                Pattern::GroupMarker,
                Pattern::constant(),
            ),
        }
    }
}

impl Default for OrNullLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl RewriteRule for OrNullLookup {
    fn name(&self) -> &str {
        "OrNullLookup"
    }

    fn promise(&self) -> RulePromise {
        RulePromise::Medium
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn check(&self, binding: &ScalarExpr, _memo: &Memo) -> bool {
        null_constant(binding)
    }

    fn transform(&self, binding: &ScalarExpr, memo: &Memo) -> Vec<ScalarExpr> {
        assert_eq!(binding.children.len(), 2, "conjunction binding must be binary");
        let ScalarOp::GroupMarker(group) = binding.children[0].op else {
            panic!("null lookup bound a concrete operand where a group was expected");
        };
        match provable_boolean(memo, group) {
            // x is true-or-null: x OR NULL is x itself.
            Some(Some(true)) => vec![binding.children[0].clone()],
            // FALSE OR NULL and NULL OR NULL are both NULL.
            Some(Some(false)) | Some(None) => {
                vec![ScalarExpr::constant(ScalarValue::Boolean(None))]
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rwx_core::value::TypeId;

    #[test]
    fn test_comparison_with_null_collapses() {
        let rule = NullComparisonLookup::new();
        let binding = ScalarExpr::new(
            ScalarOp::Compare(CompareOp::Eq),
            vec![
                ScalarExpr::group_marker(0),
                ScalarExpr::constant(ScalarValue::null(TypeId::Integer)),
            ],
        );
        assert!(rule.check(&binding, &Memo::new()));
        assert_eq!(
            rule.transform(&binding, &Memo::new()),
            vec![ScalarExpr::constant(ScalarValue::Boolean(None))]
        );
    }

    #[test]
    fn test_comparison_with_non_null_is_skipped() {
        let rule = NullComparisonLookup::new();
        let binding = ScalarExpr::new(
            ScalarOp::Compare(CompareOp::Eq),
            vec![
                ScalarExpr::group_marker(0),
                ScalarExpr::constant(ScalarValue::integer(1)),
            ],
        );
        assert!(!rule.check(&binding, &Memo::new()));
    }

    #[test]
    fn test_or_null_with_provable_operand() {
        let mut memo = Memo::new();
        let truth = ScalarExpr::constant(ScalarValue::boolean(true));
        let group = memo.record_expression(&truth);

        let rule = OrNullLookup::new();
        let binding = ScalarExpr::new(
            ScalarOp::Conjunction(ConjunctionOp::Or),
            vec![
                ScalarExpr::group_marker(group),
                ScalarExpr::constant(ScalarValue::Boolean(None)),
            ],
        );
        assert_eq!(
            rule.transform(&binding, &memo),
            vec![ScalarExpr::group_marker(group)]
        );
    }

    #[test]
    fn test_and_null_with_unprovable_operand_does_not_fire() {
        let mut memo = Memo::new();
        let column = ScalarExpr::column("a", "b");
        let group = memo.record_expression(&column);

        let rule = AndNullLookup::new();
        let binding = ScalarExpr::new(
            ScalarOp::Conjunction(ConjunctionOp::And),
            vec![
                ScalarExpr::group_marker(group),
                ScalarExpr::constant(ScalarValue::Boolean(None)),
            ],
        );
        assert!(rule.transform(&binding, &memo).is_empty());
    }
}
