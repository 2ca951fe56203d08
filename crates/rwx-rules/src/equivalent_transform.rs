//! # Equivalent Transform
//!
//! Generates the flipped child ordering of commutative binary operators (`AND`,
//! `OR`, `=`) as an additional member of the same group. Children bind as group
//! markers, so the flip is a pure reordering of group references -- no subtree is
//! duplicated.
//!
//! Applied additively (no replacement): both orderings stay in the group, which is
//! what lets later rules match a single orientation and still fire on either input
//! form.

use rwx_core::expr::{CompareOp, ConjunctionOp, ExprKind, ScalarExpr};
use rwx_core::memo::Memo;
use rwx_core::pattern::Pattern;
use rwx_core::rule::{RewriteRule, RulePromise};

/// Flip the child ordering of one commutative operator.
pub struct EquivalentTransform {
    name: &'static str,
    pattern: Pattern,
}

impl EquivalentTransform {
    pub fn and() -> Self {
        EquivalentTransform {
            name: "EquivalentTransformAnd",
            pattern: Pattern::conjunction(
                ConjunctionOp::And,
                Pattern::GroupMarker,
                Pattern::GroupMarker,
            ),
        }
    }

    pub fn or() -> Self {
        EquivalentTransform {
            name: "EquivalentTransformOr",
            pattern: Pattern::conjunction(
                ConjunctionOp::Or,
                Pattern::GroupMarker,
                Pattern::GroupMarker,
            ),
        }
    }

    pub fn equal() -> Self {
        EquivalentTransform {
            name: "EquivalentTransformEqual",
            pattern: Pattern::compare(CompareOp::Eq, Pattern::GroupMarker, Pattern::GroupMarker),
        }
    }
}

impl RewriteRule for EquivalentTransform {
    fn name(&self) -> &str {
        self.name
    }

    fn promise(&self) -> RulePromise {
        RulePromise::High
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn transform(&self, binding: &ScalarExpr, _memo: &Memo) -> Vec<ScalarExpr> {
        assert_eq!(
            binding.children.len(),
            2,
            "commutative operator binding must be binary"
        );
        debug_assert!(matches!(
            binding.kind(),
            ExprKind::Conjunction(_) | ExprKind::Compare(CompareOp::Eq)
        ));
        vec![ScalarExpr::new(
            binding.op.clone(),
            vec![binding.children[1].clone(), binding.children[0].clone()],
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rwx_core::expr::ScalarOp;
    use rwx_core::memo::GroupId;

    #[test]
    fn test_flips_bound_group_order() {
        let rule = EquivalentTransform::and();
        let binding = ScalarExpr::new(
            ScalarOp::Conjunction(ConjunctionOp::And),
            vec![ScalarExpr::group_marker(3), ScalarExpr::group_marker(8)],
        );
        let out = rule.transform(&binding, &Memo::new());
        assert_eq!(out.len(), 1);
        let groups: Vec<GroupId> = out[0]
            .children
            .iter()
            .map(|c| match c.op {
                ScalarOp::GroupMarker(g) => g,
                _ => panic!("expected group markers"),
            })
            .collect();
        assert_eq!(groups, vec![8, 3]);
        assert_eq!(out[0].op, binding.op);
    }
}
