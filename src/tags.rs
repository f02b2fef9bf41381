//! Span tag construction from notification payloads.
//!
//! Exactly one payload shape contributes tags, chosen by fixed priority:
//! database call first, then HTTP call, then function/RPC call. A payload
//! carrying none of the three produces no tags at all.

use opentelemetry::{Array, KeyValue, StringValue, Value};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::notification::Info;

/// Raw statement text of a database call.
pub const DB_STATEMENT: &str = "db.statement";
/// Serialized parameter mapping of a database call.
pub const DB_PARAMS: &str = "db.params";
/// Request path of an HTTP call.
pub const HTTP_PATH: &str = "http.path";
/// Raw query string of an HTTP call.
pub const HTTP_QUERY: &str = "http.query";
/// Request method of an HTTP call.
pub const HTTP_METHOD: &str = "http.method";
/// URL scheme of an HTTP call.
pub const HTTP_SCHEME: &str = "http.scheme";
/// Qualified name of a function/RPC call.
pub const FUNCTION_NAME: &str = "name";
/// Positional arguments of a function/RPC call.
pub const FUNCTION_ARGS: &str = "args";
/// Keyword arguments of a function/RPC call.
pub const FUNCTION_KWARGS: &str = "kwargs";
/// Result recorded when the profiled call returned.
pub const RESULT: &str = "result";
/// Marker set when the profiled call failed.
pub const ERROR: &str = "error";
/// Exception type name on the error event.
pub const ERROR_KIND: &str = "error.kind";
/// Exception message on the error event.
pub const ERROR_MESSAGE: &str = "message";

/// Error type for tag construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    /// The chosen payload shape lacks a field it requires.
    #[error("{branch} payload is missing required field {field:?}")]
    MissingField {
        /// Payload shape that was selected
        branch: &'static str,
        /// Field the shape requires
        field: &'static str,
    },
}

/// Build the tag set for a span from a notification's `info` payload.
///
/// Missing required fields within the chosen shape abort tag construction;
/// the caller treats this as a malformed payload and does not open a span.
pub fn span_tags(info: &Info) -> Result<Vec<KeyValue>, TagError> {
    if let Some(db) = &info.db {
        let statement = db.statement.as_ref().ok_or(TagError::MissingField {
            branch: "db",
            field: "statement",
        })?;
        let params = db.params.as_ref().ok_or(TagError::MissingField {
            branch: "db",
            field: "params",
        })?;
        return Ok(vec![
            KeyValue::new(DB_STATEMENT, statement.clone()),
            KeyValue::new(DB_PARAMS, params.to_string()),
        ]);
    }

    if let Some(request) = &info.request {
        let field = |value: &Option<String>, field| {
            value.clone().ok_or(TagError::MissingField {
                branch: "request",
                field,
            })
        };
        return Ok(vec![
            KeyValue::new(HTTP_PATH, field(&request.path, "path")?),
            KeyValue::new(HTTP_QUERY, field(&request.query, "query")?),
            KeyValue::new(HTTP_METHOD, field(&request.method, "method")?),
            KeyValue::new(HTTP_SCHEME, field(&request.scheme, "scheme")?),
        ]);
    }

    if let Some(function) = &info.function {
        let name = function.name.as_ref().ok_or(TagError::MissingField {
            branch: "function",
            field: "name",
        })?;
        let mut tags = vec![KeyValue::new(FUNCTION_NAME, name.clone())];
        if let Some(args) = &function.args {
            tags.push(KeyValue::new(FUNCTION_ARGS, otel_value(args)));
        }
        if let Some(kwargs) = &function.kwargs {
            tags.push(KeyValue::new(FUNCTION_KWARGS, otel_value(kwargs)));
        }
        return Ok(tags);
    }

    Ok(Vec::new())
}

/// Convert a JSON value into an OpenTelemetry attribute value.
///
/// Primitives map directly and homogeneous primitive arrays become typed
/// arrays. Everything else (objects, mixed arrays, null) is carried as its
/// compact JSON serialization, so no payload data is lost.
pub fn otel_value(value: &JsonValue) -> Value {
    match value {
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::I64(i)
            } else {
                Value::F64(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(s) => Value::String(s.clone().into()),
        JsonValue::Array(items) => array_value(items),
        other => Value::String(other.to_string().into()),
    }
}

fn array_value(items: &[JsonValue]) -> Value {
    if items.iter().all(|v| matches!(v, JsonValue::Bool(_))) && !items.is_empty() {
        let bools: Vec<bool> = items.iter().filter_map(JsonValue::as_bool).collect();
        return Value::Array(Array::Bool(bools));
    }
    if items.iter().all(|v| v.as_i64().is_some()) && !items.is_empty() {
        let ints: Vec<i64> = items.iter().filter_map(JsonValue::as_i64).collect();
        return Value::Array(Array::I64(ints));
    }
    if items.iter().all(|v| v.as_f64().is_some()) && !items.is_empty() {
        let floats: Vec<f64> = items.iter().filter_map(JsonValue::as_f64).collect();
        return Value::Array(Array::F64(floats));
    }
    if items.iter().all(|v| matches!(v, JsonValue::String(_))) && !items.is_empty() {
        let strings: Vec<StringValue> = items
            .iter()
            .filter_map(JsonValue::as_str)
            .map(|s| StringValue::from(s.to_string()))
            .collect();
        return Value::Array(Array::String(strings));
    }
    Value::String(JsonValue::Array(items.to_vec()).to_string().into())
}
