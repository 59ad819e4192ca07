//! Evaluation of filter expressions against documents.
//!
//! Equality is kind-exact. Ordering operators use [`Value::compare`]; when the operands are of
//! incompatible kinds the comparison is undefined and this implementation answers `false`.
//! A field that does not resolve is absent: `eq` is false, `neq` is true, ordering is false.

use std::{cmp::Ordering, convert::Infallible};

use crate::{
    document::Document,
    query::{Expr, FieldOp, IndexCondition, QueryVisitor},
    value::Value,
};

/// Evaluates filter expressions against one document.
pub struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> bool {
        match self.visit_expr(expr) {
            Ok(matched) => matched,
            Err(never) => match never {},
        }
    }
}

impl QueryVisitor for DocumentEvaluator<'_> {
    type Output = bool;
    type Error = Infallible;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<bool, Infallible> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<bool, Infallible> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<bool, Infallible> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_field(&mut self, field: &str, op: FieldOp, value: &Value) -> Result<bool, Infallible> {
        Ok(compare_field(self.document.lookup(field).as_deref(), op, value))
    }
}

fn compare_field(field_value: Option<&Value>, op: FieldOp, value: &Value) -> bool {
    let Some(field_value) = field_value else {
        return op == FieldOp::Neq;
    };

    match op {
        FieldOp::Eq => field_value == value,
        FieldOp::Neq => field_value != value,
        FieldOp::Lt | FieldOp::Lte | FieldOp::Gt | FieldOp::Gte => {
            match field_value.compare(value) {
                Some(ordering) => match op {
                    FieldOp::Lt => ordering == Ordering::Less,
                    FieldOp::Lte => ordering != Ordering::Greater,
                    FieldOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                },
                None => false,
            }
        }
    }
}

/// True if `document` matches `expr`.
pub fn matches(document: &Document, expr: &Expr) -> bool {
    DocumentEvaluator::new(document).evaluate(expr)
}

/// True if `document` matches every expression in `filters`.
pub fn matches_all(document: &Document, filters: &[Expr]) -> bool {
    let mut evaluator = DocumentEvaluator::new(document);
    filters.iter().all(|expr| evaluator.evaluate(expr))
}

/// True if `document` satisfies every index range condition.
pub fn matches_index_range(document: &Document, conditions: &[IndexCondition]) -> bool {
    conditions.iter().all(|condition| {
        compare_field(
            document.lookup(&condition.field).as_deref(),
            condition.op,
            &condition.value,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        id::{SeededRandom, create_id},
        query::{Filter, IndexRange},
    };
    use serde_json::json;

    fn doc(json: serde_json::Value) -> Document {
        let Value::Map(fields) = Value::from(json) else {
            unreachable!()
        };
        Document::new(create_id("items", &SeededRandom::new(9)).unwrap(), 1000, fields)
    }

    #[test]
    fn empty_combinators_are_vacuous() {
        let d = doc(json!({ "x": 1 }));

        assert!(matches(&d, &Filter::and(Vec::<Expr>::new())));
        assert!(!matches(&d, &Filter::or(Vec::<Expr>::new())));
        assert!(matches(&doc(json!({})), &Filter::and(Vec::<Expr>::new())));
    }

    #[test]
    fn literal_dotted_keys_match_before_nested_paths() {
        let d = doc(json!({ "a.b": 1, "a": { "b": 2 }, "c": { "d": 3 } }));

        assert!(matches(&d, &Filter::eq("a.b", 1)));
        assert!(!matches(&d, &Filter::eq("a.b", 2)));
        assert!(matches(&d, &Filter::eq("c.d", 3)));
        assert!(matches_index_range(&d, IndexRange::new().eq("a.b", 1).conditions()));
    }

    #[test]
    fn integers_beyond_float_precision_compare_exactly() {
        let d = doc(json!({ "n": (1_i64 << 53) + 1 }));

        assert!(matches(&d, &Filter::gt("n", (1_i64 << 53) as f64)));
        assert!(!matches(&d, &Filter::lte("n", (1_i64 << 53) as f64)));
    }

    #[test]
    fn negated_self_equality_is_false() {
        let d = doc(json!({ "x": "hello" }));
        let x = d.get("x").unwrap().into_owned();

        assert!(!matches(&d, &Filter::not(Filter::eq("x", x))));
    }

    #[test]
    fn equality_is_kind_exact() {
        let d = doc(json!({ "n": null, "i": 1 }));

        assert!(matches(&d, &Filter::eq("n", Value::Null)));
        assert!(!matches(&d, &Filter::eq("n", false)));
        assert!(!matches(&d, &Filter::eq("i", 1.0)));
        assert!(matches(&d, &Filter::neq("i", "1")));
    }

    #[test]
    fn ordering_operators() {
        let d = doc(json!({ "age": 30, "name": "bob" }));

        assert!(matches(&d, &Filter::gt("age", 29)));
        assert!(matches(&d, &Filter::gte("age", 30)));
        assert!(matches(&d, &Filter::lt("age", 30.5)));
        assert!(matches(&d, &Filter::lte("age", 30)));
        assert!(!matches(&d, &Filter::lt("age", 30)));
        assert!(matches(&d, &Filter::gt("name", "alice")));
        assert!(!matches(&d, &Filter::gt("name", 1)));
        assert!(!matches(&d, &Filter::lt("name", 1)));
    }

    #[test]
    fn absent_field_semantics() {
        let d = doc(json!({}));

        assert!(!matches(&d, &Filter::eq("missing", Value::Null)));
        assert!(matches(&d, &Filter::neq("missing", 1)));
        assert!(!matches(&d, &Filter::gte("missing", 0)));
    }

    #[test]
    fn nested_trees_and_paths() {
        let d = doc(json!({ "profile": { "age": 40, "city": "Oslo" }, "active": true }));
        let expr = Filter::and([
            Filter::eq("active", true),
            Filter::or([Filter::eq("profile.city", "Paris"), Filter::gt("profile.age", 35)]),
            Filter::not(Filter::eq("profile.city", "Rome")),
        ]);

        assert!(matches(&d, &expr));
    }

    #[test]
    fn system_fields_are_filterable() {
        let d = doc(json!({}));

        assert!(matches(&d, &Filter::eq("_creationTime", 1000)));
        assert!(matches(&d, &Filter::eq("_id", d.id())));
    }

    #[test]
    fn multiple_filters_are_anded() {
        let d = doc(json!({ "a": 1, "b": 2 }));

        assert!(matches_all(&d, &[Filter::eq("a", 1), Filter::eq("b", 2)]));
        assert!(!matches_all(&d, &[Filter::eq("a", 1), Filter::eq("b", 3)]));
        assert!(matches_all(&d, &[]));
    }

    #[test]
    fn index_range_conditions() {
        let d = doc(json!({ "team": "blue", "score": 7 }));
        let range = IndexRange::new().eq("team", "blue").gte("score", 5);

        assert!(matches_index_range(&d, range.conditions()));
        assert!(!matches_index_range(
            &d,
            IndexRange::new().eq("team", "red").conditions()
        ));
        assert!(matches_index_range(&d, &[]));
    }
}
