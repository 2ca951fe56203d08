//! # Scalar Values and Three-Valued Comparison Logic
//!
//! Constants in the expression tree carry a [`ScalarValue`]. Every variant wraps an
//! `Option` of its payload; `None` is the SQL NULL of that type, so a NULL keeps its
//! type (an integer NULL and a boolean NULL are different values but both `is_null`).
//!
//! Comparisons follow SQL three-valued logic and return `Option<bool>`, where `None`
//! is the unknown truth value: any comparison with a NULL operand yields `None`.
//! There is deliberately no `compare_less_than_equals` -- rules that need `<=` compute
//! `compare_greater_than` and flip the truth value unless it is NULL.
//!
//! Uses `OrderedFloat` for `f64` so that floating-point constants can participate in
//! `Eq`/`Hash` (needed for memo deduplication).

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Type of a scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeId {
    Boolean,
    Integer,
    Float,
    Varchar,
}

/// A typed scalar constant. `None` payloads are typed NULLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarValue {
    /// Boolean true/false, or the boolean NULL (the SQL unknown truth value).
    Boolean(Option<bool>),
    /// 64-bit signed integer.
    Integer(Option<i64>),
    /// 64-bit floating point, wrapped in OrderedFloat for Eq/Hash support.
    Float(Option<OrderedFloat<f64>>),
    /// UTF-8 string.
    Varchar(Option<String>),
}

impl ScalarValue {
    pub fn boolean(v: bool) -> Self {
        ScalarValue::Boolean(Some(v))
    }

    pub fn integer(v: i64) -> Self {
        ScalarValue::Integer(Some(v))
    }

    pub fn float(v: f64) -> Self {
        ScalarValue::Float(Some(OrderedFloat(v)))
    }

    pub fn varchar(v: impl Into<String>) -> Self {
        ScalarValue::Varchar(Some(v.into()))
    }

    /// The NULL of the given type.
    pub fn null(ty: TypeId) -> Self {
        match ty {
            TypeId::Boolean => ScalarValue::Boolean(None),
            TypeId::Integer => ScalarValue::Integer(None),
            TypeId::Float => ScalarValue::Float(None),
            TypeId::Varchar => ScalarValue::Varchar(None),
        }
    }

    pub fn type_id(&self) -> TypeId {
        match self {
            ScalarValue::Boolean(_) => TypeId::Boolean,
            ScalarValue::Integer(_) => TypeId::Integer,
            ScalarValue::Float(_) => TypeId::Float,
            ScalarValue::Varchar(_) => TypeId::Varchar,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            ScalarValue::Boolean(v) => v.is_none(),
            ScalarValue::Integer(v) => v.is_none(),
            ScalarValue::Float(v) => v.is_none(),
            ScalarValue::Varchar(v) => v.is_none(),
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self.type_id(), TypeId::Integer | TypeId::Float)
    }

    /// Whether two values can be compared at all: same type, or both numeric.
    /// NULLs are comparable by type (the comparison then yields NULL).
    pub fn check_comparable(&self, other: &ScalarValue) -> bool {
        self.type_id() == other.type_id() || (self.is_numeric() && other.is_numeric())
    }

    fn to_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Integer(Some(v)) => Some(*v as f64),
            ScalarValue::Float(Some(v)) => Some(v.into_inner()),
            _ => None,
        }
    }

    /// Total order between two comparable non-NULL values; `None` when either side
    /// is NULL or the values are not comparable.
    fn order(&self, other: &ScalarValue) -> Option<Ordering> {
        use ScalarValue::*;
        match (self, other) {
            (Integer(Some(a)), Integer(Some(b))) => Some(a.cmp(b)),
            (Boolean(Some(a)), Boolean(Some(b))) => Some(a.cmp(b)),
            (Varchar(Some(a)), Varchar(Some(b))) => Some(a.cmp(b)),
            // Mixed numeric comparison promotes to f64.
            (Integer(_) | Float(_), Integer(_) | Float(_)) => {
                self.to_f64()?.partial_cmp(&other.to_f64()?)
            }
            _ => None,
        }
    }

    pub fn compare_equals(&self, other: &ScalarValue) -> Option<bool> {
        self.order(other).map(|o| o == Ordering::Equal)
    }

    pub fn compare_not_equals(&self, other: &ScalarValue) -> Option<bool> {
        self.order(other).map(|o| o != Ordering::Equal)
    }

    pub fn compare_less_than(&self, other: &ScalarValue) -> Option<bool> {
        self.order(other).map(|o| o == Ordering::Less)
    }

    pub fn compare_greater_than(&self, other: &ScalarValue) -> Option<bool> {
        self.order(other).map(|o| o == Ordering::Greater)
    }

    pub fn compare_greater_than_equals(&self, other: &ScalarValue) -> Option<bool> {
        self.order(other).map(|o| o != Ordering::Less)
    }
}
