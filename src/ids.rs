//! Mapping opaque profile identifiers onto OpenTelemetry trace/span ids.
//!
//! The profiling source hands out UUID-shaped identifiers. A trace id keeps
//! the full 128 bits; a span id keeps the low 64 bits, so both sides of a
//! process boundary derive the same mapping from the same identifier. Raw
//! hex ids of the exact trace/span width are accepted too, which makes the
//! identifiers returned from a start event re-ingestible.

use opentelemetry::trace::{SpanId, TraceId};
use thiserror::Error;
use uuid::Uuid;

/// Error type for identifier mapping.
#[derive(Debug, Error)]
#[error("identifier {value:?} is not a UUID or {width}-digit hex id")]
pub struct IdError {
    /// The identifier that failed to parse
    pub value: String,
    width: usize,
}

/// Map a trace identifier onto a 128-bit trace id.
pub fn trace_id_from(id: &str) -> Result<TraceId, IdError> {
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(TraceId::from_bytes(uuid.into_bytes()));
    }
    if id.len() == 32 {
        if let Ok(trace_id) = TraceId::from_hex(id) {
            return Ok(trace_id);
        }
    }
    Err(IdError {
        value: id.to_string(),
        width: 32,
    })
}

/// Map a span identifier onto a 64-bit span id.
///
/// UUID-shaped identifiers are shortened to their low 64 bits.
pub fn span_id_from(id: &str) -> Result<SpanId, IdError> {
    if let Ok(uuid) = Uuid::parse_str(id) {
        let bytes = uuid.into_bytes();
        let mut low = [0u8; 8];
        low.copy_from_slice(&bytes[8..16]);
        return Ok(SpanId::from_bytes(low));
    }
    if id.len() == 16 {
        if let Ok(span_id) = SpanId::from_hex(id) {
            return Ok(span_id);
        }
    }
    Err(IdError {
        value: id.to_string(),
        width: 16,
    })
}
