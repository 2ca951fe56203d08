//! # Rewriter Facade
//!
//! [`Rewriter`] ties the engine together: ingest an expression tree into the memo,
//! run the ordered rewrite passes over the task stack, rebuild a tree from the root
//! group, and reset. One call owns its memo and task stack exclusively; the rewriter
//! holds no state between calls and is reusable.

use crate::expr::{ScalarExpr, ScalarOp};
use crate::memo::{GroupId, Memo};
use crate::rule::{RuleSet, RuleSetName};
use crate::task::{self, Task, TaskStack};
use std::sync::Arc;
use tracing::debug;

/// The expression rewriting engine.
pub struct Rewriter {
    memo: Memo,
    rule_set: Arc<RuleSet>,
}

impl Rewriter {
    pub fn new(rule_set: Arc<RuleSet>) -> Self {
        Rewriter {
            memo: Memo::new(),
            rule_set,
        }
    }

    /// Discard all groups and group-expressions of the previous call.
    pub fn reset(&mut self) {
        self.memo = Memo::new();
    }

    /// Rewrite an expression tree into a simplified, semantically equivalent tree.
    ///
    /// The input is borrowed; the returned tree is freshly owned by the caller.
    /// A `None` input is returned unchanged.
    pub fn rewrite_expression(&mut self, expr: Option<&ScalarExpr>) -> Option<ScalarExpr> {
        let expr = expr?;

        let root = self.memo.record_expression(expr);
        debug!(
            groups = self.memo.num_groups(),
            exprs = self.memo.num_exprs(),
            "converted tree into memo groups"
        );

        self.rewrite_loop(root);
        debug!("performed rewrite loop pass");

        let rebuilt = self.rebuild_expression(root);
        debug!("rebuilt expression tree from memo");

        self.reset();
        Some(rebuilt)
    }

    /// Seed the task stack with the rewrite passes and drain it.
    ///
    /// Pushes are the reverse of execution order: the equivalent-transform pass must
    /// pop first so that later passes see both orderings of commutative operators,
    /// and boolean short-circuiting runs last over the fully simplified children.
    fn rewrite_loop(&mut self, root: GroupId) {
        let mut stack = TaskStack::new();
        stack.push(Task::TopDownRewrite {
            group_id: root,
            rule_set: RuleSetName::BooleanShortCircuit,
            replace_on_transform: true,
        });
        stack.push(Task::BottomUpRewrite {
            group_id: root,
            rule_set: RuleSetName::TransitiveTransform,
            has_optimized_child: false,
        });
        stack.push(Task::BottomUpRewrite {
            group_id: root,
            rule_set: RuleSetName::ComparatorElimination,
            has_optimized_child: false,
        });
        stack.push(Task::BottomUpRewrite {
            group_id: root,
            rule_set: RuleSetName::NullLookup,
            has_optimized_child: false,
        });
        stack.push(Task::TopDownRewrite {
            group_id: root,
            rule_set: RuleSetName::EquivalentTransform,
            replace_on_transform: false,
        });
        task::run(&mut self.memo, &self.rule_set, &mut stack);
    }

    /// Materialize a tree from the memo, taking each group's first logical
    /// expression. A group that optimized successfully holds exactly one; in a group
    /// of untouched equivalents any member is correct, and the first is the
    /// originally recorded form.
    fn rebuild_expression(&self, group_id: GroupId) -> ScalarExpr {
        let group = self.memo.group(group_id);
        assert!(
            !group.logical_exprs.is_empty(),
            "group {group_id} has no expression to rebuild"
        );
        let expr = self.memo.expr(group.logical_exprs[0]);

        // An alias group collapsed into another: rebuild the target directly.
        if let ScalarOp::GroupMarker(target) = expr.op {
            return self.rebuild_expression(target);
        }

        let children: Vec<ScalarExpr> = expr
            .children
            .iter()
            .map(|&child| self.rebuild_expression(child))
            .collect();
        ScalarExpr::new(expr.op.clone(), children)
    }
}
