//! Notification payload model and parsing.
//!
//! The profiling source emits one notification per start and one per
//! matching stop. Event names are suffixed `-start`/`-stop`; the unsuffixed
//! prefix is the logical operation name. Identifiers are opaque strings;
//! `parent_id` is absent for the trace root.

use std::time::SystemTime;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Timestamp format used by the profiling source (UTC, microsecond
/// precision, no zone designator).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Error type for notification timestamp parsing.
#[derive(Debug, Error)]
#[error("malformed timestamp {value:?}: {source}")]
pub struct TimestampError {
    /// The raw timestamp string that failed to parse
    pub value: String,
    source: chrono::ParseError,
}

/// Whether a notification opens or closes a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A `-start` notification (opens a span)
    Start,
    /// A `-stop` notification (closes a span)
    Stop,
}

/// One profiling notification, as received from the instrumentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Event name, suffixed `-start` or `-stop`
    pub name: String,

    /// Wall-clock event time, `%Y-%m-%dT%H:%M:%S%.f` in UTC
    pub timestamp: String,

    /// Identifier of the overall trace, shared by every notification of one
    /// logical request
    pub base_id: String,

    /// Identifier of the logical parent operation; `None` for the trace root
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Operation-specific payload
    #[serde(default)]
    pub info: Info,
}

impl Notification {
    /// Split the event name into the logical operation name and event kind.
    ///
    /// Returns `None` when the name carries neither recognized suffix.
    #[must_use]
    pub fn event(&self) -> Option<(&str, EventKind)> {
        if let Some(operation) = self.name.strip_suffix("-start") {
            return Some((operation, EventKind::Start));
        }
        self.name
            .strip_suffix("-stop")
            .map(|operation| (operation, EventKind::Stop))
    }

    /// Parse the timestamp into an absolute instant.
    ///
    /// The source stamps events in UTC without a zone designator, so the
    /// naive time is interpreted as UTC. Malformed timestamps are an error,
    /// never coerced.
    pub fn start_time(&self) -> Result<SystemTime, TimestampError> {
        let naive = NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).map_err(
            |source| TimestampError {
                value: self.timestamp.clone(),
                source,
            },
        )?;
        Ok(SystemTime::from(DateTime::<Utc>::from_naive_utc_and_offset(
            naive, Utc,
        )))
    }
}

/// Operation-specific payload of a notification.
///
/// Exactly one of `db`/`request`/`function` is expected on a start; `etype`
/// and `message` appear on stops that recorded a failure. Fields the bridge
/// does not interpret are preserved in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    /// Database call metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<DbCall>,

    /// HTTP/WSGI call metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<HttpCall>,

    /// RPC/function call metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionCall>,

    /// Exception type name, present when the profiled call failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etype: Option<String>,

    /// Exception message accompanying `etype`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Uninterpreted payload fields, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Database call payload (`info.db`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DbCall {
    /// Raw statement text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,

    /// Statement parameter mapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    /// Call result, present on stop notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// HTTP/WSGI call payload (`info.request`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpCall {
    /// Request path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Raw query string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Request method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// URL scheme
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

/// RPC/function call payload (`info.function`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Qualified function name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Positional arguments, shape unspecified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,

    /// Keyword arguments, shape unspecified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kwargs: Option<Value>,

    /// Call result, present on stop notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}
