//! Filter queries over stored documents.
//!
//! A [`Query`] is a conjunction of field conditions; [`OrQuery`] is a
//! disjunction of independent queries. Disjunctions deliberately have no
//! AND combinator: once branches exist there is no sound place to attach
//! further conjuncts, so the type system simply does not offer one.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::error::QueryError;

/// A single field condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    field: String,
    test: Test,
}

#[derive(Debug, Clone, PartialEq)]
enum Test {
    Eq(Value),
    Ne(Value),
    Lt(Value),
    Lte(Value),
    Gt(Value),
    Gte(Value),
    Prefix(String),
    /// Half-open integer range `[start, stop)`.
    Range {
        start: i64,
        stop: i64,
    },
    Contains(Value),
    NotContains(Value),
}

impl Test {
    const fn operator(&self) -> &'static str {
        match self {
            Self::Eq(_) => "eq",
            Self::Ne(_) => "ne",
            Self::Lt(_) => "lt",
            Self::Lte(_) => "lte",
            Self::Gt(_) => "gt",
            Self::Gte(_) => "gte",
            Self::Prefix(_) => "pfx",
            Self::Range { .. } => "r",
            Self::Contains(_) => "contains",
            Self::NotContains(_) => "not_contains",
        }
    }
}

/// Builder proxy for conditions on a named field.
///
/// ```
/// use store::{Field, Query};
///
/// let query = Query::new([Field::new("key").starts_with("bob$")]).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Field(String);

impl Field {
    /// Names a field.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    fn condition(self, test: Test) -> Condition {
        Condition {
            field: self.0,
            test,
        }
    }

    /// Field equals the value. This is the default operator.
    #[must_use]
    pub fn eq(self, value: impl Into<Value>) -> Condition {
        self.condition(Test::Eq(value.into()))
    }

    /// Field does not equal the value.
    #[must_use]
    pub fn ne(self, value: impl Into<Value>) -> Condition {
        self.condition(Test::Ne(value.into()))
    }

    /// Field is less than the value.
    #[must_use]
    pub fn lt(self, value: impl Into<Value>) -> Condition {
        self.condition(Test::Lt(value.into()))
    }

    /// Field is less than or equal to the value.
    #[must_use]
    pub fn lte(self, value: impl Into<Value>) -> Condition {
        self.condition(Test::Lte(value.into()))
    }

    /// Field is greater than the value.
    #[must_use]
    pub fn gt(self, value: impl Into<Value>) -> Condition {
        self.condition(Test::Gt(value.into()))
    }

    /// Field is greater than or equal to the value.
    #[must_use]
    pub fn gte(self, value: impl Into<Value>) -> Condition {
        self.condition(Test::Gte(value.into()))
    }

    /// Field is a string starting with the prefix.
    #[must_use]
    pub fn starts_with(self, prefix: impl Into<String>) -> Condition {
        self.condition(Test::Prefix(prefix.into()))
    }

    /// Field is an integer in the half-open range `[start, stop)`.
    #[must_use]
    pub fn in_range(self, start: i64, stop: i64) -> Condition {
        self.condition(Test::Range { start, stop })
    }

    /// Field is a list containing the value, or a string containing it.
    #[must_use]
    pub fn contains(self, value: impl Into<Value>) -> Condition {
        self.condition(Test::Contains(value.into()))
    }

    /// Negation of [`contains`](Self::contains).
    #[must_use]
    pub fn not_contains(self, value: impl Into<Value>) -> Condition {
        self.condition(Test::NotContains(value.into()))
    }
}

/// A conjunction of field conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    conditions: Vec<Condition>,
}

impl Query {
    /// Builds a query from conditions.
    ///
    /// Two conditions on the same field with the same operator would
    /// silently shadow each other, so they are rejected at construction.
    pub fn new(conditions: impl IntoIterator<Item = Condition>) -> Result<Self, QueryError> {
        let mut query = Self {
            conditions: Vec::new(),
        };
        for condition in conditions {
            query.push(condition)?;
        }
        Ok(query)
    }

    fn push(&mut self, condition: Condition) -> Result<(), QueryError> {
        let duplicate = self.conditions.iter().any(|existing| {
            existing.field == condition.field
                && existing.test.operator() == condition.test.operator()
        });
        if duplicate {
            return Err(QueryError::DuplicateCondition {
                field: condition.field,
                operator: condition.test.operator(),
            });
        }
        self.conditions.push(condition);
        Ok(())
    }

    /// Conjoins two queries, with the same duplicate check.
    pub fn and(mut self, other: Self) -> Result<Self, QueryError> {
        for condition in other.conditions {
            self.push(condition)?;
        }
        Ok(self)
    }

    /// Disjoins two queries into an [`OrQuery`].
    #[must_use]
    pub fn or(self, other: Self) -> OrQuery {
        OrQuery {
            branches: vec![self, other],
        }
    }

    /// Evaluates the query against a record (all conditions must hold).
    #[must_use]
    pub fn matches(&self, record: &Map<String, Value>) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.matches(record))
    }
}

/// A disjunction of independent queries.
#[derive(Debug, Clone, PartialEq)]
pub struct OrQuery {
    branches: Vec<Query>,
}

impl OrQuery {
    /// Adds another branch.
    #[must_use]
    pub fn or(mut self, other: Query) -> Self {
        self.branches.push(other);
        self
    }

    /// Returns the branches.
    #[must_use]
    pub fn branches(&self) -> &[Query] {
        &self.branches
    }

    /// Evaluates the disjunction (any branch must hold).
    #[must_use]
    pub fn matches(&self, record: &Map<String, Value>) -> bool {
        self.branches.iter().any(|branch| branch.matches(record))
    }
}

impl From<Query> for OrQuery {
    fn from(query: Query) -> Self {
        Self {
            branches: vec![query],
        }
    }
}

impl Condition {
    fn matches(&self, record: &Map<String, Value>) -> bool {
        let field = record.get(self.field.as_str()).unwrap_or(&Value::Null);
        match &self.test {
            Test::Eq(value) => field == value,
            Test::Ne(value) => field != value,
            Test::Lt(value) => compare(field, value) == Some(Ordering::Less),
            Test::Lte(value) => {
                matches!(compare(field, value), Some(Ordering::Less | Ordering::Equal))
            }
            Test::Gt(value) => compare(field, value) == Some(Ordering::Greater),
            Test::Gte(value) => matches!(
                compare(field, value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Test::Prefix(prefix) => field
                .as_str()
                .is_some_and(|s| s.starts_with(prefix.as_str())),
            Test::Range { start, stop } => field
                .as_i64()
                .is_some_and(|v| (*start..*stop).contains(&v)),
            Test::Contains(value) => contains(field, value),
            Test::NotContains(value) => {
                !matches!(field, Value::Null) && !contains(field, value)
            }
        }
    }
}

fn contains(field: &Value, value: &Value) -> bool {
    match field {
        Value::Array(elements) => elements.contains(value),
        Value::String(s) => value.as_str().is_some_and(|needle| s.contains(needle)),
        _ => false,
    }
}

/// Orders two JSON scalars when they are comparable: numbers against
/// numbers, strings against strings. Everything else is unordered and
/// fails the ordered operators.
fn compare(field: &Value, value: &Value) -> Option<Ordering> {
    match (field, value) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                Some(a.cmp(&b))
            } else {
                a.as_f64()?.partial_cmp(&b.as_f64()?)
            }
        }
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn eq_is_the_default_operator() {
        let query = Query::new([Field::new("name").eq("bob")]).unwrap();
        assert!(query.matches(&record(json!({"name": "bob"}))));
        assert!(!query.matches(&record(json!({"name": "alice"}))));
    }

    #[test]
    fn missing_field_reads_as_null() {
        let query = Query::new([Field::new("name").ne("bob")]).unwrap();
        assert!(query.matches(&record(json!({"age": 3}))));

        let ordered = Query::new([Field::new("age").lt(10)]).unwrap();
        assert!(!ordered.matches(&record(json!({"name": "bob"}))));
    }

    #[test]
    fn ordered_operators() {
        let rec = record(json!({"age": 12}));
        assert!(Query::new([Field::new("age").lt(18)]).unwrap().matches(&rec));
        assert!(Query::new([Field::new("age").lte(12)]).unwrap().matches(&rec));
        assert!(Query::new([Field::new("age").gt(10)]).unwrap().matches(&rec));
        assert!(Query::new([Field::new("age").gte(12)]).unwrap().matches(&rec));
        assert!(!Query::new([Field::new("age").gt(12)]).unwrap().matches(&rec));
    }

    #[test]
    fn prefix_operator() {
        let query = Query::new([Field::new("key").starts_with("bob$")]).unwrap();
        assert!(query.matches(&record(json!({"key": "bob$1"}))));
        assert!(!query.matches(&record(json!({"key": "alice$1"}))));
        assert!(!query.matches(&record(json!({"key": 7}))));
    }

    #[test]
    fn range_operator_is_half_open() {
        let query = Query::new([Field::new("age").in_range(10, 18)]).unwrap();
        assert!(query.matches(&record(json!({"age": 10}))));
        assert!(query.matches(&record(json!({"age": 17}))));
        assert!(!query.matches(&record(json!({"age": 18}))));
    }

    #[test]
    fn contains_on_lists_and_strings() {
        let query = Query::new([Field::new("hobbies").contains("gaming")]).unwrap();
        assert!(query.matches(&record(json!({"hobbies": ["gaming", "chess"]}))));
        assert!(!query.matches(&record(json!({"hobbies": ["chess"]}))));

        let substring = Query::new([Field::new("bio").contains("trainer")]).unwrap();
        assert!(substring.matches(&record(json!({"bio": "pokemon trainer"}))));
    }

    #[test]
    fn not_contains_fails_on_missing_field() {
        let query = Query::new([Field::new("hobbies").not_contains("gaming")]).unwrap();
        assert!(query.matches(&record(json!({"hobbies": ["chess"]}))));
        assert!(!query.matches(&record(json!({"other": 1}))));
    }

    #[test]
    fn conjunction_requires_all_conditions() {
        let query = Query::new([
            Field::new("species").eq("cat"),
            Field::new("age").lt(5),
        ])
        .unwrap();
        assert!(query.matches(&record(json!({"species": "cat", "age": 3}))));
        assert!(!query.matches(&record(json!({"species": "cat", "age": 7}))));
    }

    #[test]
    fn duplicate_field_operator_is_rejected() {
        let err = Query::new([Field::new("age").lt(5), Field::new("age").lt(10)]).unwrap_err();
        assert_eq!(
            err,
            QueryError::DuplicateCondition {
                field: "age".to_owned(),
                operator: "lt"
            }
        );
    }

    #[test]
    fn same_field_different_operators_is_fine() {
        let query = Query::new([Field::new("age").gte(10), Field::new("age").lt(18)]).unwrap();
        assert!(query.matches(&record(json!({"age": 12}))));
    }

    #[test]
    fn and_merges_with_duplicate_check() {
        let a = Query::new([Field::new("name").eq("bob")]).unwrap();
        let b = Query::new([Field::new("age").gt(10)]).unwrap();
        let both = a.clone().and(b).unwrap();
        assert!(both.matches(&record(json!({"name": "bob", "age": 12}))));

        let clash = Query::new([Field::new("name").eq("alice")]).unwrap();
        assert!(a.and(clash).is_err());
    }

    #[test]
    fn or_unions_branches() {
        let cats = Query::new([Field::new("species").eq("cat")]).unwrap();
        let dogs = Query::new([Field::new("species").eq("dog")]).unwrap();
        let either = cats.or(dogs);
        assert!(either.matches(&record(json!({"species": "cat"}))));
        assert!(either.matches(&record(json!({"species": "dog"}))));
        assert!(!either.matches(&record(json!({"species": "bird"}))));
    }

    #[test]
    fn or_query_grows_by_branch() {
        let q = Query::new([Field::new("a").eq(1)])
            .unwrap()
            .or(Query::new([Field::new("b").eq(2)]).unwrap())
            .or(Query::new([Field::new("c").eq(3)]).unwrap());
        assert_eq!(q.branches().len(), 3);
        assert!(q.matches(&record(json!({"c": 3}))));
    }
}
