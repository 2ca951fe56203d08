//! # Binding Iterator
//!
//! Enumerates the concrete sub-expressions in the memo that match a pattern rooted
//! at a given group-expression. A binding is an ordinary [`ScalarExpr`] tree:
//! positions the pattern constrains carry the matched operator, wildcard positions
//! carry a [`GroupMarker`](crate::expr::ScalarOp::GroupMarker) node naming the bound
//! child group.
//!
//! For each constrained child position, *every* expression of the child group whose
//! tag matches is a candidate, and the iterator yields the cartesian product across
//! sibling positions. Enumeration order is fixed -- children left to right, group
//! members in insertion order, rightmost position advancing fastest -- so rule firing
//! is deterministic.
//!
//! The iterator is lazy over the product and finite: candidate lists per position are
//! materialized up front, combinations are built on demand.

use crate::expr::ScalarExpr;
use crate::memo::{ExprId, GroupId, Memo};
use crate::pattern::Pattern;
use itertools::structs::MultiProduct;
use itertools::Itertools;

/// Lazy stream of bindings of one pattern against one group-expression.
pub struct Bindings {
    inner: BindingsInner,
}

enum BindingsInner {
    Empty,
    Single(Option<ScalarExpr>),
    Product {
        op: crate::expr::ScalarOp,
        product: MultiProduct<std::vec::IntoIter<ScalarExpr>>,
    },
}

impl Bindings {
    fn empty() -> Self {
        Bindings {
            inner: BindingsInner::Empty,
        }
    }

    fn single(expr: ScalarExpr) -> Self {
        Bindings {
            inner: BindingsInner::Single(Some(expr)),
        }
    }

    fn product(op: crate::expr::ScalarOp, positions: Vec<Vec<ScalarExpr>>) -> Self {
        if positions.is_empty() {
            // A leaf pattern over a leaf expression has exactly one binding.
            return Bindings::single(ScalarExpr::leaf(op));
        }
        Bindings {
            inner: BindingsInner::Product {
                op,
                product: positions.into_iter().multi_cartesian_product(),
            },
        }
    }
}

impl Iterator for Bindings {
    type Item = ScalarExpr;

    fn next(&mut self) -> Option<ScalarExpr> {
        match &mut self.inner {
            BindingsInner::Empty => None,
            BindingsInner::Single(slot) => slot.take(),
            BindingsInner::Product { op, product } => product
                .next()
                .map(|children| ScalarExpr::new(op.clone(), children)),
        }
    }
}

/// All bindings of `pattern` rooted at the group-expression `expr_id`.
pub fn bindings(memo: &Memo, expr_id: ExprId, pattern: &Pattern) -> Bindings {
    let expr = memo.expr(expr_id);
    match pattern {
        Pattern::Leaf | Pattern::GroupMarker => {
            Bindings::single(ScalarExpr::group_marker(expr.group))
        }
        Pattern::Operator(kind, child_patterns) => {
            if expr.op.kind() != *kind || expr.children.len() != child_patterns.len() {
                return Bindings::empty();
            }
            let positions: Vec<Vec<ScalarExpr>> = expr
                .children
                .iter()
                .zip(child_patterns.iter())
                .map(|(&child_group, child_pattern)| {
                    group_bindings(memo, child_group, child_pattern)
                })
                .collect();
            if positions.iter().any(|candidates| candidates.is_empty()) {
                return Bindings::empty();
            }
            Bindings::product(expr.op.clone(), positions)
        }
    }
}

/// Candidate bindings of `pattern` against any member of `group`, insertion order.
fn group_bindings(memo: &Memo, group: GroupId, pattern: &Pattern) -> Vec<ScalarExpr> {
    if pattern.binds_any_group() {
        return vec![ScalarExpr::group_marker(group)];
    }
    memo.group(group)
        .logical_exprs
        .iter()
        .flat_map(|&expr_id| bindings(memo, expr_id, pattern))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{CompareOp, ConjunctionOp, ScalarOp};
    use crate::value::ScalarValue;

    fn eq_expr(left: ScalarExpr, right: ScalarExpr) -> ScalarExpr {
        ScalarExpr::compare(CompareOp::Eq, left, right)
    }

    #[test]
    fn test_exact_pattern_binds_concrete_tree() {
        let mut memo = Memo::new();
        let tree = eq_expr(
            ScalarExpr::constant(ScalarValue::integer(1)),
            ScalarExpr::constant(ScalarValue::integer(2)),
        );
        let group = memo.record_expression(&tree);
        let root = memo.group(group).logical_exprs[0];

        let pattern = Pattern::compare(CompareOp::Eq, Pattern::constant(), Pattern::constant());
        let binds: Vec<_> = bindings(&memo, root, &pattern).collect();
        assert_eq!(binds, vec![tree]);
    }

    #[test]
    fn test_mismatched_tag_yields_nothing() {
        let mut memo = Memo::new();
        let tree = eq_expr(
            ScalarExpr::constant(ScalarValue::integer(1)),
            ScalarExpr::constant(ScalarValue::integer(2)),
        );
        let group = memo.record_expression(&tree);
        let root = memo.group(group).logical_exprs[0];

        let pattern = Pattern::compare(CompareOp::Lt, Pattern::constant(), Pattern::constant());
        assert_eq!(bindings(&memo, root, &pattern).count(), 0);
    }

    #[test]
    fn test_wildcard_positions_bind_group_markers() {
        let mut memo = Memo::new();
        let tree = ScalarExpr::conjunction(
            ConjunctionOp::And,
            ScalarExpr::column("a", "b"),
            ScalarExpr::constant(ScalarValue::boolean(true)),
        );
        let group = memo.record_expression(&tree);
        let root_id = memo.group(group).logical_exprs[0];
        let child_groups = memo.expr(root_id).children.clone();

        let pattern = Pattern::conjunction(ConjunctionOp::And, Pattern::GroupMarker, Pattern::Leaf);
        let binds: Vec<_> = bindings(&memo, root_id, &pattern).collect();
        assert_eq!(binds.len(), 1);
        assert_eq!(
            binds[0].children[0].op,
            ScalarOp::GroupMarker(child_groups[0])
        );
        assert_eq!(
            binds[0].children[1].op,
            ScalarOp::GroupMarker(child_groups[1])
        );
    }

    #[test]
    fn test_cartesian_product_over_group_members() {
        let mut memo = Memo::new();
        let col = ScalarExpr::column("a", "b");
        let one = ScalarExpr::constant(ScalarValue::integer(1));
        let tree = ScalarExpr::conjunction(
            ConjunctionOp::And,
            eq_expr(col.clone(), one.clone()),
            ScalarExpr::column("t", "c"),
        );
        let group = memo.record_expression(&tree);
        let root_id = memo.group(group).logical_exprs[0];
        let eq_group = memo.expr(root_id).children[0];

        // Add the flipped ordering as an equivalent member of the comparison group.
        let flipped = eq_expr(one.clone(), col.clone());
        memo.record_into_group(&flipped, eq_group);

        // A wildcard-children comparison pattern now has two candidates at that
        // position; the conjunction pattern yields both combinations in member order.
        let pattern = Pattern::conjunction(
            ConjunctionOp::And,
            Pattern::compare(CompareOp::Eq, Pattern::Leaf, Pattern::Leaf),
            Pattern::Leaf,
        );
        let binds: Vec<_> = bindings(&memo, root_id, &pattern).collect();
        assert_eq!(binds.len(), 2);
        // First binding uses the first-registered member of the comparison group.
        let first = &binds[0].children[0];
        let second = &binds[1].children[0];
        assert_eq!(first.kind(), second.kind());
        assert_ne!(first.children, second.children);
    }

    #[test]
    fn test_constrained_child_filters_group_members() {
        let mut memo = Memo::new();
        let col = ScalarExpr::column("a", "b");
        let one = ScalarExpr::constant(ScalarValue::integer(1));
        let tree = eq_expr(col.clone(), one.clone());
        let group = memo.record_expression(&tree);
        memo.record_into_group(&eq_expr(one, col), group);

        let and = ScalarExpr::new(
            ScalarOp::Conjunction(ConjunctionOp::And),
            vec![ScalarExpr::group_marker(group), ScalarExpr::group_marker(group)],
        );
        let and_group = memo.record_expression(&and);
        let and_id = memo.group(and_group).logical_exprs[0];

        // Column-left orientation exists exactly once per conjunct position.
        let pattern = Pattern::conjunction(
            ConjunctionOp::And,
            Pattern::compare(CompareOp::Eq, Pattern::column(), Pattern::constant()),
            Pattern::compare(CompareOp::Eq, Pattern::column(), Pattern::constant()),
        );
        let binds: Vec<_> = bindings(&memo, and_id, &pattern).collect();
        assert_eq!(binds.len(), 1);
        assert_eq!(binds[0].children[0].children[0].kind(), crate::expr::ExprKind::ColumnRef);
    }
}
