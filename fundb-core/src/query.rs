//! Filter expressions, index ranges and the accumulated options of a query.
//!
//! # Filter Expression API
//!
//! The [`Filter`] struct builds immutable expression trees:
//!
//! - Comparison: `eq`, `neq`, `lt`, `lte`, `gt`, `gte`
//! - Logical: `and`, `or`, `not`
//!
//! ```ignore
//! use fundb::query::Filter;
//!
//! let expr = Filter::and([
//!     Filter::eq("status", "active"),
//!     Filter::or([Filter::gt("age", 18), Filter::eq("guardian", true)]),
//! ]);
//! ```
//!
//! # Index Ranges
//!
//! An [`IndexRange`] accumulates `{field, op, value}` conditions intended to narrow an index
//! scan. By convention every condition but the last is an equality; this is not enforced.

use crate::value::Value;

/// Sort order of query results by `_creationTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest first.
    #[default]
    Asc,
    /// Newest first.
    Desc,
}

/// Field comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    /// Equal to, kind-exact.
    Eq,
    /// Not equal to.
    Neq,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
}

/// A filter expression tree.
///
/// Leaves compare one field against a value; `And`, `Or` and `Not` combine subtrees.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// All children must match. An empty list matches every document.
    And(Vec<Expr>),
    /// Any child must match. An empty list matches no document.
    Or(Vec<Expr>),
    /// Inverts the child.
    Not(Box<Expr>),
    /// Field comparison.
    Field {
        /// Field name or dotted path.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The value to compare against.
        value: Value,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Value) -> Self {
        Expr::Field { field, op, value }
    }

    /// Returns a new expression that is the conjunction of this one and `other`.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }

    /// Returns a new expression that is the disjunction of this one and `other`.
    pub fn or(self, other: Expr) -> Self {
        match self {
            Expr::Or(mut list) => {
                list.push(other);
                Expr::Or(list)
            }
            _ => Expr::Or(vec![self, other]),
        }
    }

    /// Negates this expression.
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }
}

/// Constructors for filter expressions.
///
/// Every call returns a new node; previously built nodes are never modified.
pub struct Filter;

impl Filter {
    /// Matches documents where `field` equals `value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    /// Matches documents where `field` does not equal `value`.
    pub fn neq(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Neq, value.into())
    }

    /// Matches documents where `field` is less than `value`.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Lt, value.into())
    }

    /// Matches documents where `field` is less than or equal to `value`.
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Lte, value.into())
    }

    /// Matches documents where `field` is greater than `value`.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Gt, value.into())
    }

    /// Matches documents where `field` is greater than or equal to `value`.
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    /// Matches documents matching every expression.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }

    /// Matches documents matching at least one expression.
    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(exprs.into_iter().collect())
    }

    /// Matches documents not matching `expr`.
    pub fn not(expr: Expr) -> Expr {
        Expr::Not(Box::new(expr))
    }
}

/// One condition of an index range.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexCondition {
    /// Indexed field name or dotted path.
    pub field: String,
    /// The comparison operator. Never [`FieldOp::Neq`].
    pub op: FieldOp,
    /// The value to compare against.
    pub value: Value,
}

impl IndexCondition {
    /// Views this condition as an equivalent filter leaf.
    pub fn to_expr(&self) -> Expr {
        Expr::field(self.field.clone(), self.op, self.value.clone())
    }
}

/// Fluent builder accumulating index range conditions in call order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexRange {
    conditions: Vec<IndexCondition>,
}

impl IndexRange {
    /// Creates an empty index range.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, field: impl Into<String>, op: FieldOp, value: impl Into<Value>) -> Self {
        self.conditions.push(IndexCondition {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Appends an equality condition.
    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(field, FieldOp::Eq, value)
    }

    /// Appends a less-than condition.
    pub fn lt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(field, FieldOp::Lt, value)
    }

    /// Appends a less-than-or-equal condition.
    pub fn lte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(field, FieldOp::Lte, value)
    }

    /// Appends a greater-than condition.
    pub fn gt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(field, FieldOp::Gt, value)
    }

    /// Appends a greater-than-or-equal condition.
    pub fn gte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(field, FieldOp::Gte, value)
    }

    /// Returns the accumulated conditions.
    pub fn conditions(&self) -> &[IndexCondition] {
        &self.conditions
    }

    /// Consumes the builder, returning the accumulated conditions.
    pub fn into_conditions(self) -> Vec<IndexCondition> {
        self.conditions
    }
}

/// Everything a storage backend needs to answer a table-scoped query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Selected index, if any.
    pub index_name: Option<String>,
    /// Index range conditions, in builder order.
    pub index_range: Vec<IndexCondition>,
    /// Filter expressions, implicitly ANDed.
    pub filters: Vec<Expr>,
    /// Sort order by `_creationTime`.
    pub order: SortOrder,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
    /// Opaque pagination cursor to resume after.
    pub cursor: Option<String>,
}

/// Visitor over filter expression trees.
///
/// Implementors handle each node kind; [`QueryVisitor::visit_expr`] dispatches.
pub trait QueryVisitor {
    type Output;
    type Error;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: FieldOp,
        value: &Value,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Not(expr) => self.visit_not(expr),
            Expr::Field { field, op, value } => self.visit_field(field, *op, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_produce_independent_nodes() {
        let base = Filter::eq("a", 1);
        let combined = base.clone().and(Filter::gt("b", 2));

        assert_eq!(base, Filter::eq("a", 1));
        assert_eq!(
            combined,
            Expr::And(vec![Filter::eq("a", 1), Filter::gt("b", 2)])
        );
    }

    #[test]
    fn and_flattens_into_existing_conjunction() {
        let expr = Filter::and([Filter::eq("a", 1)]).and(Filter::eq("b", 2));
        assert!(matches!(expr, Expr::And(ref list) if list.len() == 2));
    }

    #[test]
    fn not_wraps_child() {
        assert_eq!(
            Filter::not(Filter::lt("x", 3)),
            Expr::Not(Box::new(Filter::lt("x", 3)))
        );
    }

    #[test]
    fn index_range_keeps_call_order_without_validation() {
        let range = IndexRange::new()
            .gt("age", 18)
            .eq("team", "blue")
            .lte("age", 65);

        let ops: Vec<_> = range.conditions().iter().map(|c| (c.field.as_str(), c.op)).collect();
        assert_eq!(
            ops,
            vec![("age", FieldOp::Gt), ("team", FieldOp::Eq), ("age", FieldOp::Lte)]
        );
    }
}
