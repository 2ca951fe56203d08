//! # Task Scheduler
//!
//! Rule firing is driven by a LIFO stack of typed tasks; the stack is the only
//! control structure, there is no recursion through the task interface. Each task
//! may push more tasks, and the driver loops until the stack drains. Everything is
//! single-threaded.
//!
//! ## Task contracts
//!
//! - [`Task::TopDownRewrite`]: apply the named rule set to a group, then visit each
//!   distinct child group. With `replace_on_transform` the group collapses to the
//!   rule's output; without it the pass is additive and is routed through the
//!   per-expression [`Task::OptimizeExpression`] / [`Task::ApplyRule`] path.
//! - [`Task::BottomUpRewrite`]: first execution re-pushes itself with
//!   `has_optimized_child` set and then pushes its children, so LIFO order runs the
//!   children first; the second execution applies the rule set (replacing) without
//!   further descent.
//! - [`Task::OptimizeExpression`]: push one [`Task::ApplyRule`] per rule of the set,
//!   arranged so higher-promise rules pop first.
//! - [`Task::ApplyRule`]: bind, check, transform, record the results as equivalents.
//!
//! ## Replacement mechanics
//!
//! A replacing pass applies rules over a per-rule snapshot of the group's members.
//! When a transform fires, the group collapses: to the newly recorded expression, to
//! the surviving member it duplicated, or -- when the output already lives in another
//! group (including outputs that *are* a bound child marker) -- to an alias of that
//! group. Remaining bindings of the clobbered members are skipped and the next rule
//! sees the new content.

use crate::binding::bindings;
use crate::expr::ScalarExpr;
use crate::memo::{ExprId, GroupId, Memo, Recorded};
use crate::rule::{RuleId, RuleSet, RuleSetName};
use tracing::trace;

/// A unit of rewrite work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    TopDownRewrite {
        group_id: GroupId,
        rule_set: RuleSetName,
        replace_on_transform: bool,
    },
    BottomUpRewrite {
        group_id: GroupId,
        rule_set: RuleSetName,
        has_optimized_child: bool,
    },
    OptimizeExpression {
        expr_id: ExprId,
        rule_set: RuleSetName,
    },
    ApplyRule {
        expr_id: ExprId,
        rule_set: RuleSetName,
        rule_id: RuleId,
    },
}

/// LIFO stack of pending tasks.
#[derive(Debug, Default)]
pub struct TaskStack {
    tasks: Vec<Task>,
}

impl TaskStack {
    pub fn new() -> Self {
        TaskStack::default()
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn pop(&mut self) -> Option<Task> {
        self.tasks.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Drain the stack, executing tasks until none remain.
pub fn run(memo: &mut Memo, rules: &RuleSet, stack: &mut TaskStack) {
    while let Some(task) = stack.pop() {
        trace!(?task, "executing task");
        match task {
            Task::TopDownRewrite {
                group_id,
                rule_set,
                replace_on_transform,
            } => top_down_rewrite(memo, rules, stack, group_id, rule_set, replace_on_transform),
            Task::BottomUpRewrite {
                group_id,
                rule_set,
                has_optimized_child,
            } => bottom_up_rewrite(memo, rules, stack, group_id, rule_set, has_optimized_child),
            Task::OptimizeExpression { expr_id, rule_set } => {
                optimize_expression(rules, stack, expr_id, rule_set)
            }
            Task::ApplyRule {
                expr_id,
                rule_set,
                rule_id,
            } => apply_rule(memo, rules, expr_id, rule_set, rule_id),
        }
    }
}

fn top_down_rewrite(
    memo: &mut Memo,
    rules: &RuleSet,
    stack: &mut TaskStack,
    group_id: GroupId,
    rule_set: RuleSetName,
    replace_on_transform: bool,
) {
    if replace_on_transform {
        apply_rule_set(memo, rules, group_id, rule_set);
    } else {
        // Additive passes saturate each group once; shared subtrees are reached
        // through several parents.
        if memo.group(group_id).explored {
            return;
        }
        memo.group_mut(group_id).explored = true;
    }

    // Children are visited after this group: their tasks sit below the
    // per-expression work pushed next.
    for child in memo.distinct_child_groups(group_id) {
        stack.push(Task::TopDownRewrite {
            group_id: child,
            rule_set,
            replace_on_transform,
        });
    }

    if !replace_on_transform {
        // Reverse push so the first-registered member pops first.
        let members = memo.group(group_id).logical_exprs.clone();
        for &expr_id in members.iter().rev() {
            stack.push(Task::OptimizeExpression { expr_id, rule_set });
        }
    }
}

fn bottom_up_rewrite(
    memo: &mut Memo,
    rules: &RuleSet,
    stack: &mut TaskStack,
    group_id: GroupId,
    rule_set: RuleSetName,
    has_optimized_child: bool,
) {
    if has_optimized_child {
        apply_rule_set(memo, rules, group_id, rule_set);
        return;
    }
    stack.push(Task::BottomUpRewrite {
        group_id,
        rule_set,
        has_optimized_child: true,
    });
    for child in memo.distinct_child_groups(group_id) {
        stack.push(Task::BottomUpRewrite {
            group_id: child,
            rule_set,
            has_optimized_child: false,
        });
    }
}

fn optimize_expression(
    rules: &RuleSet,
    stack: &mut TaskStack,
    expr_id: ExprId,
    rule_set: RuleSetName,
) {
    // Reverse push so the highest-promise rule is on top of the stack.
    for reg in rules.rules_by_promise(rule_set).iter().rev() {
        stack.push(Task::ApplyRule {
            expr_id,
            rule_set,
            rule_id: reg.id,
        });
    }
}

fn apply_rule(
    memo: &mut Memo,
    rules: &RuleSet,
    expr_id: ExprId,
    rule_set: RuleSetName,
    rule_id: RuleId,
) {
    let Some(reg) = rules
        .rewrite_rules(rule_set)
        .iter()
        .find(|reg| reg.id == rule_id)
    else {
        return;
    };
    let group_id = memo.expr(expr_id).group;
    // The expression may have been clobbered by an earlier replacement.
    if !memo.group(group_id).logical_exprs.contains(&expr_id) {
        return;
    }

    let binds: Vec<ScalarExpr> = bindings(memo, expr_id, reg.rule.pattern()).collect();
    for binding in &binds {
        if !reg.rule.check(binding, memo) {
            continue;
        }
        for output in reg.rule.transform(binding, memo) {
            trace!(rule = reg.rule.name(), group = group_id, "recording equivalent expression");
            memo.record_into_group(&output, group_id);
        }
    }
}

/// Apply every rule of the set to the group with replace-on-transform semantics,
/// in promise order.
fn apply_rule_set(memo: &mut Memo, rules: &RuleSet, group_id: GroupId, rule_set: RuleSetName) {
    for reg in rules.rules_by_promise(rule_set) {
        let members = memo.group(group_id).logical_exprs.clone();
        'members: for expr_id in members {
            if !memo.group(group_id).logical_exprs.contains(&expr_id) {
                continue;
            }
            let binds: Vec<ScalarExpr> = bindings(memo, expr_id, reg.rule.pattern()).collect();
            for binding in &binds {
                if !reg.rule.check(binding, memo) {
                    continue;
                }
                let outputs = reg.rule.transform(binding, memo);
                let Some(output) = outputs.first() else {
                    continue;
                };
                debug_assert!(
                    outputs.len() == 1,
                    "replace-on-transform rules emit a single expression"
                );
                trace!(rule = reg.rule.name(), group = group_id, "replacing group content");
                replace_group_with(memo, group_id, output);
                // The member snapshot is stale; the next rule re-reads the group.
                break 'members;
            }
        }
    }
}

/// Collapse `group_id` to `output`, wherever recording placed it.
fn replace_group_with(memo: &mut Memo, group_id: GroupId, output: &ScalarExpr) {
    match memo.record_into_group(output, group_id) {
        Recorded::New { expr, .. } => memo.replace_group_expression(group_id, expr),
        Recorded::Existing {
            group,
            expr: Some(expr),
        } if group == group_id => memo.replace_group_expression(group_id, expr),
        // The output was a bound child marker, or a duplicate of an expression in
        // another group: the whole group is that other group now.
        Recorded::Existing { group, .. } if group != group_id => {
            memo.replace_with_alias(group_id, group)
        }
        Recorded::Existing { .. } => {}
    }
}
