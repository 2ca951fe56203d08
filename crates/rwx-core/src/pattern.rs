//! # Patterns
//!
//! A pattern is the tree template a rewrite rule matches against. Interior nodes name
//! an operator kind and its expected children; the two leaf forms bind an entire
//! child group without constraining its operator:
//!
//! - [`Pattern::Leaf`]: wildcard for a child the rule does not inspect.
//! - [`Pattern::GroupMarker`]: wildcard for a child the rule keeps as a group
//!   reference (the binding carries a marker node for it).
//!
//! Both leaf forms bind identically; the distinction is documentation of intent in
//! the rule definitions. Arity is implicit in the child count: an `Operator` pattern
//! only matches expressions with exactly as many children.

use crate::expr::{CompareOp, ConjunctionOp, ExprKind};

/// Tree template matched by the binding iterator.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Match an operator of the given kind with matching child patterns.
    Operator(ExprKind, Vec<Pattern>),
    /// Match any single subtree.
    Leaf,
    /// Match any single subtree, binding it as a group reference.
    GroupMarker,
}

impl Pattern {
    /// Whether this pattern binds a whole child group unconditionally.
    pub fn binds_any_group(&self) -> bool {
        matches!(self, Pattern::Leaf | Pattern::GroupMarker)
    }

    /// Match a constant literal.
    pub fn constant() -> Self {
        Pattern::Operator(ExprKind::Constant, vec![])
    }

    /// Match a column reference.
    pub fn column() -> Self {
        Pattern::Operator(ExprKind::ColumnRef, vec![])
    }

    /// Match a binary comparison with the given operand patterns.
    pub fn compare(op: CompareOp, left: Pattern, right: Pattern) -> Self {
        Pattern::Operator(ExprKind::Compare(op), vec![left, right])
    }

    /// Match a binary conjunction with the given operand patterns.
    pub fn conjunction(op: ConjunctionOp, left: Pattern, right: Pattern) -> Self {
        Pattern::Operator(ExprKind::Conjunction(op), vec![left, right])
    }
}
