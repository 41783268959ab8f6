//! # Firestore REST value codec
//!
//! Firestore's REST API wraps every value in a typed envelope:
//!
//! | JSON | Firestore |
//! |------|-----------|
//! | `"text"` | `{"stringValue": "text"}` |
//! | `42` | `{"integerValue": "42"}` (64-bit integers travel as strings) |
//! | `4.5` | `{"doubleValue": 4.5}` |
//! | `true` | `{"booleanValue": true}` |
//! | `null` | `{"nullValue": null}` |
//! | `{..}` | `{"mapValue": {"fields": {..}}}` |
//! | `[..]` | `{"arrayValue": {"values": [..]}}` |
//!
//! Timestamps, references and bytes decode to their string form; geo points
//! decode to `{latitude, longitude}`. This module also builds the bodies of the
//! `commit` and `runQuery` calls.

use serde_json::{json, Map, Number, Value};
use store::{Direction, Document, FilterOp, Query, Record, StoreError};

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or(0.0) }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

pub fn encode_fields(fields: &Map<String, Value>) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}

pub fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let envelope = value
        .as_object()
        .filter(|o| o.len() == 1)
        .ok_or_else(|| StoreError::Malformed(format!("not a Firestore value: {value}")))?;
    let Some((kind, inner)) = envelope.iter().next() else {
        return Err(StoreError::Malformed("empty Firestore value".to_string()));
    };

    let decoded = match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => Value::Bool(inner.as_bool().unwrap_or(false)),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            let i = parsed
                .ok_or_else(|| StoreError::Malformed(format!("bad integerValue {inner}")))?;
            Value::Number(i.into())
        }
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => inner.clone(),
        "mapValue" => match inner.get("fields").and_then(Value::as_object) {
            Some(fields) => Value::Object(decode_fields(fields)?),
            None => Value::Object(Map::new()),
        },
        "arrayValue" => match inner.get("values").and_then(Value::as_array) {
            Some(values) => Value::Array(
                values
                    .iter()
                    .map(decode_value)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => Value::Array(Vec::new()),
        },
        other => {
            return Err(StoreError::Malformed(format!(
                "unsupported Firestore value type {other}"
            )))
        }
    };
    Ok(decoded)
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, StoreError> {
    fields
        .iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
        .collect()
}

/// Decode a Firestore document resource. The id is the last segment of its
/// `name`.
pub fn decode_document(raw: &Value) -> Result<Document, StoreError> {
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Malformed("document without name".to_string()))?;
    let id = name.rsplit('/').next().unwrap_or(name).to_string();
    let fields = match raw.get("fields").and_then(Value::as_object) {
        Some(fields) => decode_fields(fields)?,
        None => Map::new(),
    };
    Ok(Document { id, fields })
}

/// Body of a `documents:commit` call creating `name` from `record`, with its
/// server timestamp fields set to the request time.
pub fn commit_body(name: &str, record: &Record) -> Value {
    let transforms: Vec<Value> = record
        .server_timestamps
        .iter()
        .map(|field| json!({ "fieldPath": field, "setToServerValue": "REQUEST_TIME" }))
        .collect();
    json!({
        "writes": [{
            "update": { "name": name, "fields": encode_fields(&record.fields) },
            "updateTransforms": transforms,
            "currentDocument": { "exists": false }
        }]
    })
}

fn operator(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Equal => "EQUAL",
        FilterOp::GreaterOrEqual => "GREATER_THAN_OR_EQUAL",
        FilterOp::LessOrEqual => "LESS_THAN_OR_EQUAL",
    }
}

/// Body of a `documents:runQuery` call.
pub fn structured_query(collection: &str, query: &Query) -> Value {
    let mut structured = Map::new();
    structured.insert("from".into(), json!([{ "collectionId": collection }]));

    let filters: Vec<Value> = query
        .filters
        .iter()
        .map(|f| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": f.field },
                    "op": operator(f.op),
                    "value": encode_value(&f.value)
                }
            })
        })
        .collect();
    match filters.len() {
        0 => {}
        1 => {
            structured.insert("where".into(), filters[0].clone());
        }
        _ => {
            structured.insert(
                "where".into(),
                json!({ "compositeFilter": { "op": "AND", "filters": filters } }),
            );
        }
    }

    if let Some(order) = &query.order_by {
        let direction = match order.direction {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        };
        structured.insert(
            "orderBy".into(),
            json!([{ "field": { "fieldPath": order.field }, "direction": direction }]),
        );
    }

    json!({ "structuredQuery": Value::Object(structured) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::Filter;

    #[test]
    fn test_decode_typed_document() {
        let raw = json!({
            "name": "projects/p/databases/(default)/documents/cars/abc123",
            "fields": {
                "name": { "stringValue": "ONIX" },
                "year": { "integerValue": "2019" },
                "price": { "doubleValue": 45000.5 },
                "owner": { "mapValue": { "fields": { "uid": { "stringValue": "u1" } } } },
                "photos": { "arrayValue": { "values": [
                    { "mapValue": { "fields": { "name": { "stringValue": "p1" } } } }
                ] } },
                "created": { "timestampValue": "2024-01-01T00:00:00.123456Z" },
                "sold": { "booleanValue": false },
                "notes": { "nullValue": null },
                "tags": { "arrayValue": {} }
            }
        });
        let doc = decode_document(&raw).unwrap();
        assert_eq!(doc.id, "abc123");
        assert_eq!(doc.fields["year"], json!(2019));
        assert_eq!(doc.fields["price"], json!(45000.5));
        assert_eq!(doc.field("owner.uid"), Some(&json!("u1")));
        assert_eq!(doc.fields["photos"][0]["name"], json!("p1"));
        assert_eq!(doc.fields["created"], json!("2024-01-01T00:00:00.123456Z"));
        assert_eq!(doc.fields["sold"], json!(false));
        assert_eq!(doc.fields["notes"], Value::Null);
        assert_eq!(doc.fields["tags"], json!([]));
    }

    #[test]
    fn test_unknown_value_type_is_malformed() {
        assert!(matches!(
            decode_value(&json!({ "mysteryValue": 1 })),
            Err(StoreError::Malformed(_))
        ));
        assert!(decode_value(&json!("bare")).is_err());
    }

    #[test]
    fn test_encode_numbers() {
        assert_eq!(encode_value(&json!(32000)), json!({ "integerValue": "32000" }));
        assert_eq!(encode_value(&json!(1.5)), json!({ "doubleValue": 1.5 }));
    }

    #[test]
    fn test_commit_body_requests_server_timestamp() {
        let record = Record::new(json!({ "name": "ONIX" }).as_object().cloned().unwrap())
            .with_server_timestamp("created");
        let body = commit_body("projects/p/databases/(default)/documents/cars/x", &record);
        let write = &body["writes"][0];
        assert_eq!(write["update"]["fields"]["name"], json!({ "stringValue": "ONIX" }));
        assert_eq!(
            write["updateTransforms"][0],
            json!({ "fieldPath": "created", "setToServerValue": "REQUEST_TIME" })
        );
    }

    #[test]
    fn test_single_filter_query() {
        let query = Query::new().filter(Filter::eq("owner.uid", "u1"));
        let body = structured_query("cars", &query);
        let filter = &body["structuredQuery"]["where"]["fieldFilter"];
        assert_eq!(filter["field"]["fieldPath"], "owner.uid");
        assert_eq!(filter["op"], "EQUAL");
        assert_eq!(filter["value"], json!({ "stringValue": "u1" }));
        assert!(body["structuredQuery"].get("orderBy").is_none());
    }

    #[test]
    fn test_range_query_is_composite_and_ordered() {
        let query = Query::new()
            .filter(Filter::ge("name", "GOL"))
            .filter(Filter::le("name", "GOL\u{f8ff}"))
            .order_by("name", Direction::Ascending);
        let body = structured_query("cars", &query);
        let sq = &body["structuredQuery"];
        assert_eq!(sq["from"][0]["collectionId"], "cars");
        assert_eq!(sq["where"]["compositeFilter"]["op"], "AND");
        assert_eq!(
            sq["where"]["compositeFilter"]["filters"][1]["fieldFilter"]["op"],
            "LESS_THAN_OR_EQUAL"
        );
        assert_eq!(sq["orderBy"][0]["direction"], "ASCENDING");
    }
}
