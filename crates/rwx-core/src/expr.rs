//! # Scalar Expression Model
//!
//! The expression tree is split into two layers, the same way the planner splits
//! operators from their children:
//!
//! - [`ScalarOp`] is the payload-only operator: a closed enum with one variant per
//!   operator kind, carrying the operator's data (a constant's value, a comparison's
//!   operator, a function's name) but no children.
//! - [`ScalarExpr`] is the tree node: an operator plus an ordered list of child
//!   expressions.
//!
//! The split lets the memo store an operator next to child *group ids* while the
//! engine's inputs, outputs, and rule bindings stay ordinary owned trees.
//!
//! Structural hashing and deep equality are derived from the tree shape and are
//! order-sensitive in the children; commutativity is explored by rewrite rules that
//! generate flipped orderings, never by hashing both orders as equal.
//!
//! [`ScalarOp::GroupMarker`] is special: it stands for "an entire memo group" and
//! appears in two places only -- rule bindings (wildcard pattern positions bind to a
//! marker of the child group) and memo-internal alias expressions. It never appears
//! in a tree handed to or returned from the rewriter.

use crate::memo::GroupId;
use crate::value::{ScalarValue, TypeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// Equality comparison (`=`).
    Eq,
    /// Inequality comparison (`<>` or `!=`).
    NotEq,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    LtEq,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    GtEq,
}

/// Boolean connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConjunctionOp {
    And,
    Or,
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

/// Reference to a column.
///
/// Equality and hashing consider `(table, column)` only; the resolved binder ids are
/// carried along but never participate in structural comparison, so a bound and an
/// unbound reference to the same column land in the same memo group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
    /// Resolved (table oid, column oid) filled in by the binder, if any.
    pub bound: Option<(u32, u32)>,
}

impl PartialEq for ColumnRef {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table && self.column == other.column
    }
}

impl Eq for ColumnRef {}

impl Hash for ColumnRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.table.hash(state);
        self.column.hash(state);
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Payload-only scalar operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarOp {
    /// Constant literal value.
    Constant(ScalarValue),
    /// Reference to a column by (table, column) name.
    ColumnRef(ColumnRef),
    /// Binary comparison (`a = b`, `x < 10`). Two children.
    Compare(CompareOp),
    /// Boolean connective (`a AND b`, `a OR b`). Two children.
    Conjunction(ConjunctionOp),
    /// Binary arithmetic with a resolved result type. Two children.
    Arithmetic {
        op: ArithmeticOp,
        result_type: TypeId,
    },
    /// Arithmetic negation. One child.
    UnaryMinus,
    /// `*` in projection or `COUNT(*)` position. Leaf.
    Star,
    /// Aggregate invocation; children are the argument expressions.
    Aggregate { func: AggFunc, distinct: bool },
    /// Named function call; children are the argument expressions.
    Function { name: String },
    /// CASE expression; children are the WHEN/THEN/ELSE arms in order.
    Case,
    /// Scalar subquery placeholder. Leaf; opaque to the rewrite rules.
    Subquery,
    /// Stand-in for an entire memo group. Only appears in rule bindings and in
    /// memo-internal alias expressions.
    GroupMarker(GroupId),
}

/// Kind discriminant for pattern matching (without data).
///
/// Comparison and conjunction operators are part of the kind because rules are
/// registered per operator: the rule folding `1 = 2` is a different registration
/// from the one folding `1 < 2`, and AND rules must not fire on OR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Constant,
    ColumnRef,
    Compare(CompareOp),
    Conjunction(ConjunctionOp),
    Arithmetic(ArithmeticOp),
    UnaryMinus,
    Star,
    Aggregate,
    Function,
    Case,
    Subquery,
    GroupMarker,
}

impl ScalarOp {
    pub fn kind(&self) -> ExprKind {
        match self {
            ScalarOp::Constant(_) => ExprKind::Constant,
            ScalarOp::ColumnRef(_) => ExprKind::ColumnRef,
            ScalarOp::Compare(op) => ExprKind::Compare(*op),
            ScalarOp::Conjunction(op) => ExprKind::Conjunction(*op),
            ScalarOp::Arithmetic { op, .. } => ExprKind::Arithmetic(*op),
            ScalarOp::UnaryMinus => ExprKind::UnaryMinus,
            ScalarOp::Star => ExprKind::Star,
            ScalarOp::Aggregate { .. } => ExprKind::Aggregate,
            ScalarOp::Function { .. } => ExprKind::Function,
            ScalarOp::Case => ExprKind::Case,
            ScalarOp::Subquery => ExprKind::Subquery,
            ScalarOp::GroupMarker(_) => ExprKind::GroupMarker,
        }
    }

    /// Fixed child count for operators that have one, `None` for variadic operators.
    pub fn arity(&self) -> Option<usize> {
        match self {
            ScalarOp::Constant(_)
            | ScalarOp::ColumnRef(_)
            | ScalarOp::Star
            | ScalarOp::Subquery
            | ScalarOp::GroupMarker(_) => Some(0),
            ScalarOp::UnaryMinus => Some(1),
            ScalarOp::Compare(_) | ScalarOp::Conjunction(_) | ScalarOp::Arithmetic { .. } => {
                Some(2)
            }
            ScalarOp::Aggregate { .. } | ScalarOp::Function { .. } | ScalarOp::Case => None,
        }
    }
}

/// A scalar expression tree: an operator plus ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScalarExpr {
    pub op: ScalarOp,
    pub children: Vec<ScalarExpr>,
}

impl ScalarExpr {
    pub fn new(op: ScalarOp, children: Vec<ScalarExpr>) -> Self {
        debug_assert!(
            op.arity().map_or(true, |n| n == children.len()),
            "operator {:?} built with {} children",
            op.kind(),
            children.len()
        );
        ScalarExpr { op, children }
    }

    pub fn leaf(op: ScalarOp) -> Self {
        ScalarExpr::new(op, Vec::new())
    }

    pub fn constant(value: ScalarValue) -> Self {
        ScalarExpr::leaf(ScalarOp::Constant(value))
    }

    pub fn column(table: impl Into<String>, column: impl Into<String>) -> Self {
        ScalarExpr::leaf(ScalarOp::ColumnRef(ColumnRef {
            table: table.into(),
            column: column.into(),
            bound: None,
        }))
    }

    pub fn compare(op: CompareOp, left: ScalarExpr, right: ScalarExpr) -> Self {
        ScalarExpr::new(ScalarOp::Compare(op), vec![left, right])
    }

    pub fn conjunction(op: ConjunctionOp, left: ScalarExpr, right: ScalarExpr) -> Self {
        ScalarExpr::new(ScalarOp::Conjunction(op), vec![left, right])
    }

    pub fn unary_minus(child: ScalarExpr) -> Self {
        ScalarExpr::new(ScalarOp::UnaryMinus, vec![child])
    }

    pub fn function(name: impl Into<String>, args: Vec<ScalarExpr>) -> Self {
        ScalarExpr::new(ScalarOp::Function { name: name.into() }, args)
    }

    pub fn aggregate(func: AggFunc, distinct: bool, args: Vec<ScalarExpr>) -> Self {
        ScalarExpr::new(ScalarOp::Aggregate { func, distinct }, args)
    }

    pub fn group_marker(group: GroupId) -> Self {
        ScalarExpr::leaf(ScalarOp::GroupMarker(group))
    }

    pub fn kind(&self) -> ExprKind {
        self.op.kind()
    }

    /// Rebuild this node with the supplied children. Exhaustive operator coverage is
    /// a compile-time obligation of the closed [`ScalarOp`] enum; the only runtime
    /// concern is arity, checked in [`ScalarExpr::new`].
    pub fn copy_with_children(&self, children: Vec<ScalarExpr>) -> ScalarExpr {
        ScalarExpr::new(self.op.clone(), children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(expr: &ScalarExpr) -> u64 {
        let mut h = DefaultHasher::new();
        expr.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_column_equality_ignores_binder_ids() {
        let unbound = ScalarExpr::column("a", "b");
        let bound = ScalarExpr::leaf(ScalarOp::ColumnRef(ColumnRef {
            table: "a".into(),
            column: "b".into(),
            bound: Some((42, 7)),
        }));
        assert_eq!(unbound, bound);
        assert_eq!(hash_of(&unbound), hash_of(&bound));
        assert_ne!(unbound, ScalarExpr::column("a", "c"));
    }

    #[test]
    fn test_structural_hash_is_order_sensitive() {
        let one = ScalarExpr::constant(ScalarValue::integer(1));
        let two = ScalarExpr::constant(ScalarValue::integer(2));
        let lt = ScalarExpr::compare(CompareOp::Lt, one.clone(), two.clone());
        let flipped = ScalarExpr::compare(CompareOp::Lt, two, one);
        assert_ne!(lt, flipped);
        assert_ne!(hash_of(&lt), hash_of(&flipped));
    }

    #[test]
    fn test_copy_with_children_swaps_children() {
        let orig = ScalarExpr::conjunction(
            ConjunctionOp::And,
            ScalarExpr::column("t", "a"),
            ScalarExpr::column("t", "b"),
        );
        let swapped = orig.copy_with_children(vec![orig.children[1].clone(), orig.children[0].clone()]);
        assert_eq!(swapped.op, orig.op);
        assert_eq!(swapped.children[0], orig.children[1]);
    }

    #[test]
    fn test_kind_distinguishes_operators() {
        assert_ne!(
            ExprKind::Compare(CompareOp::Eq),
            ExprKind::Compare(CompareOp::Lt)
        );
        assert_ne!(
            ExprKind::Conjunction(ConjunctionOp::And),
            ExprKind::Conjunction(ConjunctionOp::Or)
        );
    }
}
