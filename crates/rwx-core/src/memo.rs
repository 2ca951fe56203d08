//! # Memo Table
//!
//! The memo is the central data structure of the rewrite engine. It partitions every
//! subtree of the input expression into *groups* of logically equivalent
//! alternatives, each stored as a [`GroupExpr`]: an operator whose children are group
//! ids rather than concrete subtrees. Because a child is a group reference, a rule's
//! output can combine with *any* member of a child group without duplicating trees.
//!
//! ## Deduplication
//!
//! Group-expressions are deduplicated on exactly `(operator, child group ids)`. Two
//! structurally identical group-expressions never coexist: recording a duplicate
//! returns the group that already holds it. The one exception is the alias
//! expression created by [`Memo::replace_with_alias`], which is bookkeeping for "this
//! group collapsed into that one" and stays out of the dedup index.
//!
//! ## Mutation during rewriting
//!
//! Rules mutate the memo in two ways, mirroring the two rewrite modes:
//!
//! - [`Memo::record_into_group`] + [`Memo::replace_group_expression`]: destructive
//!   replacement; afterwards the group holds exactly one expression.
//! - [`Memo::record_into_group`] alone: append an equivalent alternative.
//!
//! Replacement never changes a group's id, so parent expressions that reference the
//! group stay valid; only the group's contents change.

use crate::expr::{ScalarExpr, ScalarOp};
use itertools::Itertools;
use std::collections::HashMap;

/// Dense identifier of a memo group, assigned monotonically at insertion time.
pub type GroupId = u32;

/// Identifier of a group-expression in the memo's arena.
pub type ExprId = u32;

/// One member of a group: an operator over child groups.
#[derive(Debug, Clone)]
pub struct GroupExpr {
    pub op: ScalarOp,
    pub children: Vec<GroupId>,
    /// The group this expression belongs to.
    pub group: GroupId,
}

/// An equivalence class of expressions.
#[derive(Debug)]
pub struct Group {
    pub id: GroupId,
    /// Members in insertion order. Binding enumeration and rebuild both rely on
    /// this order being stable.
    pub logical_exprs: Vec<ExprId>,
    /// Set once a rule-saturation pass has visited the group.
    pub explored: bool,
    /// Reserved for the physical-planning side of the memo; the rewrite passes
    /// never read or set it.
    pub implemented: bool,
}

/// Outcome of recording an expression tree into the memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// The root was newly inserted into `group`.
    New { group: GroupId, expr: ExprId },
    /// A structurally identical expression already exists in `group`. `expr` is
    /// `None` when the recorded root was a bare group marker (the "expression" is
    /// the referenced group itself).
    Existing {
        group: GroupId,
        expr: Option<ExprId>,
    },
}

impl Recorded {
    pub fn group(&self) -> GroupId {
        match self {
            Recorded::New { group, .. } | Recorded::Existing { group, .. } => *group,
        }
    }
}

/// The memo table.
#[derive(Debug, Default)]
pub struct Memo {
    exprs: Vec<GroupExpr>,
    groups: Vec<Group>,
    dedup: HashMap<(ScalarOp, Vec<GroupId>), ExprId>,
}

impl Memo {
    pub fn new() -> Self {
        Memo::default()
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn num_exprs(&self) -> usize {
        self.exprs.len()
    }

    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id as usize]
    }

    pub fn group_mut(&mut self, id: GroupId) -> &mut Group {
        &mut self.groups[id as usize]
    }

    pub fn expr(&self, id: ExprId) -> &GroupExpr {
        &self.exprs[id as usize]
    }

    /// Record a whole expression tree, children first, and return the group holding
    /// the root. Structurally duplicate subtrees collapse into existing groups.
    pub fn record_expression(&mut self, expr: &ScalarExpr) -> GroupId {
        self.record_node(expr, None).group()
    }

    /// Record a rule's output so that the root lands in `target` when it is new.
    /// Children are recorded normally. The caller inspects the outcome to decide
    /// between append, retain, and alias semantics.
    pub fn record_into_group(&mut self, expr: &ScalarExpr, target: GroupId) -> Recorded {
        self.record_node(expr, Some(target))
    }

    fn record_node(&mut self, expr: &ScalarExpr, target: Option<GroupId>) -> Recorded {
        // A group marker *is* its group; nothing to insert.
        if let ScalarOp::GroupMarker(group) = expr.op {
            return Recorded::Existing { group, expr: None };
        }

        let children: Vec<GroupId> = expr
            .children
            .iter()
            .map(|child| self.record_node(child, None).group())
            .collect();

        let key = (expr.op.clone(), children);
        if let Some(&expr_id) = self.dedup.get(&key) {
            return Recorded::Existing {
                group: self.exprs[expr_id as usize].group,
                expr: Some(expr_id),
            };
        }

        let group = match target {
            Some(g) => g,
            None => self.new_group(),
        };
        let expr_id = self.insert_expr(group, expr.op.clone(), key.1.clone());
        self.dedup.insert(key, expr_id);
        Recorded::New {
            group,
            expr: expr_id,
        }
    }

    fn new_group(&mut self) -> GroupId {
        let id = self.groups.len() as GroupId;
        self.groups.push(Group {
            id,
            logical_exprs: Vec::new(),
            explored: false,
            implemented: false,
        });
        id
    }

    fn insert_expr(&mut self, group: GroupId, op: ScalarOp, children: Vec<GroupId>) -> ExprId {
        let expr_id = self.exprs.len() as ExprId;
        self.exprs.push(GroupExpr {
            op,
            children,
            group,
        });
        self.groups[group as usize].logical_exprs.push(expr_id);
        expr_id
    }

    /// Collapse `group` to the single member `keep`, unregistering the dropped
    /// members from the dedup index. `keep` must already belong to the group.
    pub fn replace_group_expression(&mut self, group: GroupId, keep: ExprId) {
        assert_eq!(
            self.exprs[keep as usize].group, group,
            "kept expression does not belong to group {group}"
        );
        let members = std::mem::take(&mut self.groups[group as usize].logical_exprs);
        for expr_id in members {
            if expr_id == keep {
                continue;
            }
            let dropped = &self.exprs[expr_id as usize];
            // Alias expressions are not in the dedup index; remove is a no-op there.
            self.dedup
                .remove(&(dropped.op.clone(), dropped.children.clone()));
        }
        self.groups[group as usize].logical_exprs = vec![keep];
    }

    /// Collapse `group` to a single alias expression referencing `target`: the group
    /// rewrote into something that already lives elsewhere in the memo. Rebuild and
    /// child-task enumeration both see `target` through the alias's child list.
    pub fn replace_with_alias(&mut self, group: GroupId, target: GroupId) {
        assert_ne!(group, target, "group cannot alias itself");
        let members = std::mem::take(&mut self.groups[group as usize].logical_exprs);
        for expr_id in members {
            let dropped = &self.exprs[expr_id as usize];
            self.dedup
                .remove(&(dropped.op.clone(), dropped.children.clone()));
        }
        // Deliberately not registered in the dedup index: several groups may alias
        // the same target, and each needs its own marker.
        self.insert_expr(group, ScalarOp::GroupMarker(target), vec![target]);
    }

    /// Distinct child group ids referenced by the group's members, first-seen order.
    pub fn distinct_child_groups(&self, group: GroupId) -> Vec<GroupId> {
        self.group(group)
            .logical_exprs
            .iter()
            .flat_map(|&expr_id| self.expr(expr_id).children.iter().copied())
            .unique()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{CompareOp, ConjunctionOp};
    use crate::value::ScalarValue;

    fn eq_expr(left: ScalarExpr, right: ScalarExpr) -> ScalarExpr {
        ScalarExpr::compare(CompareOp::Eq, left, right)
    }

    #[test]
    fn test_duplicate_subtrees_share_a_group() {
        let mut memo = Memo::new();
        let conjunct = eq_expr(
            ScalarExpr::column("a", "b"),
            ScalarExpr::constant(ScalarValue::integer(1)),
        );
        let root = ScalarExpr::conjunction(ConjunctionOp::And, conjunct.clone(), conjunct);
        let root_group = memo.record_expression(&root);

        // column, constant, comparison (shared), conjunction
        assert_eq!(memo.num_groups(), 4);
        let root_children = memo
            .expr(memo.group(root_group).logical_exprs[0])
            .children
            .clone();
        assert_eq!(root_children[0], root_children[1]);
        assert_eq!(memo.distinct_child_groups(root_group).len(), 1);
    }

    #[test]
    fn test_record_into_group_appends_and_dedups() {
        let mut memo = Memo::new();
        let one = ScalarExpr::constant(ScalarValue::integer(1));
        let group = memo.record_expression(&one);

        let truth = ScalarExpr::constant(ScalarValue::boolean(true));
        let recorded = memo.record_into_group(&truth, group);
        assert!(matches!(recorded, Recorded::New { group: g, .. } if g == group));
        assert_eq!(memo.group(group).logical_exprs.len(), 2);

        // Recording the same expression again is a dedup hit, not a new member.
        let again = memo.record_into_group(&truth, group);
        assert!(matches!(again, Recorded::Existing { group: g, .. } if g == group));
        assert_eq!(memo.group(group).logical_exprs.len(), 2);
    }

    #[test]
    fn test_duplicate_of_foreign_group_is_reported() {
        let mut memo = Memo::new();
        let one = ScalarExpr::constant(ScalarValue::integer(1));
        let two = ScalarExpr::constant(ScalarValue::integer(2));
        let g_one = memo.record_expression(&one);
        let g_two = memo.record_expression(&two);

        let recorded = memo.record_into_group(&one, g_two);
        assert_eq!(
            recorded,
            Recorded::Existing {
                group: g_one,
                expr: Some(memo.group(g_one).logical_exprs[0]),
            }
        );
    }

    #[test]
    fn test_replace_group_expression_collapses_group() {
        let mut memo = Memo::new();
        let one = ScalarExpr::constant(ScalarValue::integer(1));
        let group = memo.record_expression(&one);
        let truth = ScalarExpr::constant(ScalarValue::boolean(true));
        let Recorded::New { expr, .. } = memo.record_into_group(&truth, group) else {
            panic!("expected a fresh insert");
        };

        memo.replace_group_expression(group, expr);
        assert_eq!(memo.group(group).logical_exprs, vec![expr]);

        // The dropped member was unregistered: re-recording it creates a new group.
        let re_recorded = memo.record_expression(&one);
        assert_ne!(re_recorded, group);
    }

    #[test]
    fn test_replace_with_alias() {
        let mut memo = Memo::new();
        let one = ScalarExpr::constant(ScalarValue::integer(1));
        let two = ScalarExpr::constant(ScalarValue::integer(2));
        let g_one = memo.record_expression(&one);
        let g_two = memo.record_expression(&two);

        memo.replace_with_alias(g_two, g_one);
        let members = &memo.group(g_two).logical_exprs;
        assert_eq!(members.len(), 1);
        let alias = memo.expr(members[0]);
        assert_eq!(alias.op, ScalarOp::GroupMarker(g_one));
        assert_eq!(alias.children, vec![g_one]);
        assert_eq!(memo.distinct_child_groups(g_two), vec![g_one]);
    }

    #[test]
    fn test_group_marker_records_as_its_group() {
        let mut memo = Memo::new();
        let one = ScalarExpr::constant(ScalarValue::integer(1));
        let g_one = memo.record_expression(&one);

        let flipped = ScalarExpr::new(
            crate::expr::ScalarOp::Conjunction(ConjunctionOp::And),
            vec![ScalarExpr::group_marker(g_one), ScalarExpr::group_marker(g_one)],
        );
        let g_and = memo.record_expression(&flipped);
        let and_expr = memo.expr(memo.group(g_and).logical_exprs[0]);
        assert_eq!(and_expr.children, vec![g_one, g_one]);
    }
}
