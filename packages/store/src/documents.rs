//! # Document store boundary
//!
//! The hosted document database is reached through the [`DocumentStore`] trait.
//! Documents are schemaless JSON maps; the listing service maps them into
//! [`crate::Listing`] values after every read.
//!
//! Queries support what the marketplace needs and nothing more: conjunctions of
//! equality and inclusive range filters on (possibly nested, dot-separated)
//! field paths, plus a single ordering.

use std::cmp::Ordering as CmpOrdering;
use std::future::Future;

use serde_json::{Map, Value};

use crate::error::StoreError;

/// A stored document: its id plus its fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    /// Look up a dot-separated field path (`"owner.uid"`).
    pub fn field(&self, path: &str) -> Option<&Value> {
        field_at(&self.fields, path)
    }
}

/// A document to insert. Fields named in `server_timestamps` are filled in by
/// the store at write time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    pub fields: Map<String, Value>,
    pub server_timestamps: Vec<String>,
}

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            server_timestamps: Vec::new(),
        }
    }

    /// Serialize any value whose JSON form is an object into a record.
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> Result<Self, StoreError> {
        match serde_json::to_value(value)? {
            Value::Object(fields) => Ok(Self::new(fields)),
            other => Err(StoreError::Malformed(format!(
                "record must be an object, got {other}"
            ))),
        }
    }

    /// Builder method to request a server-assigned timestamp in `field`.
    pub fn with_server_timestamp(mut self, field: &str) -> Self {
        self.server_timestamps.push(field.to_string());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOp {
    Equal,
    GreaterOrEqual,
    LessOrEqual,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Equal, value)
    }

    pub fn ge(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::GreaterOrEqual, value)
    }

    pub fn le(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::LessOrEqual, value)
    }

    fn new(field: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op,
            value: value.into(),
        }
    }

    /// Whether a document satisfies this filter. Values of different kinds
    /// never match, and a missing field never matches.
    pub fn matches(&self, doc: &Document) -> bool {
        let Some(actual) = doc.field(&self.field) else {
            return false;
        };
        let Some(order) = compare_values(actual, &self.value) else {
            return false;
        };
        match self.op {
            FilterOp::Equal => order == CmpOrdering::Equal,
            FilterOp::GreaterOrEqual => order != CmpOrdering::Less,
            FilterOp::LessOrEqual => order != CmpOrdering::Greater,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Filters (all must hold) plus an optional ordering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    /// The ordering the query resolves to: the explicit one, or ascending on the
    /// first range-filtered field (how the hosted store orders range queries).
    pub fn effective_order(&self) -> Option<OrderBy> {
        self.order_by.clone().or_else(|| {
            self.filters
                .iter()
                .find(|f| f.op != FilterOp::Equal)
                .map(|f| OrderBy {
                    field: f.field.clone(),
                    direction: Direction::Ascending,
                })
        })
    }
}

/// Async interface to the hosted document database.
pub trait DocumentStore {
    /// Insert a record under a store-assigned id and return that id.
    fn insert(
        &self,
        collection: &str,
        record: Record,
    ) -> impl Future<Output = Result<String, StoreError>>;
    fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<Document>, StoreError>>;
    fn query(
        &self,
        collection: &str,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>>;
    fn delete(&self, collection: &str, id: &str) -> impl Future<Output = Result<(), StoreError>>;
}

/// Resolve a dot-separated path inside a JSON map.
pub fn field_at<'a>(fields: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Compare two JSON values of the same kind. Strings compare by code point,
/// which matches the byte order the hosted store uses for UTF-8 text.
pub fn compare_values(a: &Value, b: &Value) -> Option<CmpOrdering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(CmpOrdering::Equal),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(fields: Value) -> Document {
        Document {
            id: "d".into(),
            fields: fields.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn test_nested_field_filter() {
        let d = doc(json!({ "owner": { "uid": "u1" } }));
        assert!(Filter::eq("owner.uid", "u1").matches(&d));
        assert!(!Filter::eq("owner.uid", "u2").matches(&d));
        assert!(!Filter::eq("owner.name", "u1").matches(&d));
    }

    #[test]
    fn test_range_filters_are_inclusive() {
        let d = doc(json!({ "name": "GOL" }));
        assert!(Filter::ge("name", "GOL").matches(&d));
        assert!(Filter::le("name", "GOL").matches(&d));
        assert!(!Filter::ge("name", "GOLF").matches(&d));
    }

    #[test]
    fn test_mixed_kinds_never_match() {
        let d = doc(json!({ "year": "2019" }));
        assert!(!Filter::eq("year", 2019).matches(&d));
    }

    #[test]
    fn test_effective_order_falls_back_to_range_field() {
        let q = Query::new()
            .filter(Filter::eq("owner.uid", "u1"))
            .filter(Filter::ge("name", "A"));
        assert_eq!(
            q.effective_order(),
            Some(OrderBy {
                field: "name".into(),
                direction: Direction::Ascending
            })
        );
        assert_eq!(Query::new().effective_order(), None);
    }
}
