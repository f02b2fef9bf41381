//! Span lifecycle management for profiling notifications.
//!
//! [`SpanBridge`] receives the start/stop notification stream and maintains
//! the activation stack: every start opens a span (linked to a remote parent
//! when `parent_id` names one) and pushes it; every stop pops the innermost
//! open span, annotates result/error detail, and closes it.

mod activation;

use std::fmt;

use opentelemetry::trace::{
    Span as _, SpanContext, SpanId, SpanKind, Status, TraceContextExt, TraceError, TraceFlags,
    TraceId, TraceState, Tracer as _, TracerProvider as _,
};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::{Span, Tracer, TracerProvider};
use thiserror::Error;

use crate::config::BridgeConfig;
use crate::ids::{self, IdError};
use crate::notification::{EventKind, Info, Notification, TimestampError};
use crate::observability;
use crate::tags::{self, TagError};
use activation::{Activation, ActivationStack};

/// Error type for notification handling.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Start notification carried an unparseable timestamp.
    #[error(transparent)]
    MalformedTimestamp(#[from] TimestampError),

    /// `base_id` or `parent_id` could not be mapped to a trace/span id.
    #[error(transparent)]
    MalformedIdentifier(#[from] IdError),

    /// The payload shape selected for tagging lacks a required field.
    #[error(transparent)]
    MalformedTags(#[from] TagError),

    /// Event name carries neither `-start` nor `-stop`.
    #[error("event name {name:?} carries no -start/-stop suffix")]
    UnrecognizedEvent {
        /// The offending event name
        name: String,
    },

    /// A stop notification arrived while no span was open.
    #[error("stop notification {name:?} arrived with no span open")]
    UnbalancedStop {
        /// Name of the stop notification
        name: String,
    },

    /// The tracing backend pipeline could not be built or shut down.
    #[error("tracing backend unavailable: {0}")]
    BackendUnavailable(#[from] TraceError),
}

/// Identifiers returned from a start notification.
///
/// The instrumentation threads these back into the `base_id`/`parent_id`
/// of subsequent child notifications; there is no other channel for
/// distributed context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanIds {
    /// The start opened a trace root; both ids are needed downstream.
    Root {
        /// Trace id of the new trace
        trace_id: TraceId,
        /// Span id of the root span
        span_id: SpanId,
    },
    /// The start opened a child of an existing (possibly remote) span.
    Child {
        /// Span id of the new span
        span_id: SpanId,
    },
}

impl SpanIds {
    /// Trace id, present only for a trace root.
    #[must_use]
    pub fn trace_id(&self) -> Option<TraceId> {
        match self {
            SpanIds::Root { trace_id, .. } => Some(*trace_id),
            SpanIds::Child { .. } => None,
        }
    }

    /// Span id of the newly opened span.
    #[must_use]
    pub fn span_id(&self) -> SpanId {
        match self {
            SpanIds::Root { span_id, .. } | SpanIds::Child { span_id } => *span_id,
        }
    }

    /// Hex-string form: `[trace_id, span_id]` for a root, `[span_id]` for a
    /// child. Both forms are accepted back by the identifier parser.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        match self {
            SpanIds::Root { trace_id, span_id } => {
                vec![trace_id.to_string(), span_id.to_string()]
            }
            SpanIds::Child { span_id } => vec![span_id.to_string()],
        }
    }
}

/// Pointer to where a trace can actually be inspected.
///
/// The bridge does not reconstruct trace data locally; retrieval and
/// visualization are served by the collector's own UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHandle {
    /// Trace the handle refers to
    pub base_id: String,
    /// Collector endpoint the trace was exported to
    pub collector: String,
}

impl fmt::Display for ReportHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "trace {} is served by the collector at {}",
            self.base_id, self.collector
        )
    }
}

/// Bridges one profiling session's notification stream into spans.
///
/// One bridge per profiling session: the activation stack assumes a single
/// coherent LIFO nesting. Push/pop is mutex-serialized, so a bridge may be
/// driven from worker threads as long as they form one logical nesting.
#[derive(Debug)]
pub struct SpanBridge {
    config: BridgeConfig,
    provider: TracerProvider,
    tracer: Tracer,
    stack: ActivationStack,
}

impl SpanBridge {
    /// Connect to the collector named in `config` and build the bridge.
    ///
    /// Builds the OTLP exporter and batch pipeline once; span delivery is
    /// batched and best-effort from then on. A pipeline that cannot be built
    /// is fatal to the bridge's usability.
    ///
    /// Must be called within a Tokio runtime (the batch exporter runs there).
    pub fn connect(config: BridgeConfig) -> Result<Self, BridgeError> {
        let provider = observability::tracer::build_provider(&config)?;
        Ok(Self::with_provider(config, provider))
    }

    /// Build the bridge on a caller-supplied tracer provider.
    ///
    /// Used by tests and by embedders that already own a span pipeline. The
    /// provider is not installed globally; the bridge owns it.
    #[must_use]
    pub fn with_provider(config: BridgeConfig, provider: TracerProvider) -> Self {
        let tracer = provider.tracer("culvert");
        Self {
            config,
            provider,
            tracer,
            stack: ActivationStack::new(),
        }
    }

    /// Handle one notification.
    ///
    /// Returns `Some(ids)` for a start (the identifiers the instrumentation
    /// propagates to children) and `None` for a stop. Every error leaves the
    /// activation stack exactly as it was.
    pub fn notify(&self, notification: &Notification) -> Result<Option<SpanIds>, BridgeError> {
        let (operation, kind) =
            notification
                .event()
                .ok_or_else(|| BridgeError::UnrecognizedEvent {
                    name: notification.name.clone(),
                })?;

        match kind {
            EventKind::Start => Ok(Some(self.handle_start(notification, operation)?)),
            EventKind::Stop => {
                self.handle_stop(notification, operation)?;
                Ok(None)
            }
        }
    }

    fn handle_start(
        &self,
        notification: &Notification,
        operation: &str,
    ) -> Result<SpanIds, BridgeError> {
        let start_time = notification.start_time()?;

        // A remote parent is referenced, never recorded into: the span it
        // names lives in another process.
        let parent_cx = match &notification.parent_id {
            Some(parent_id) => Context::new().with_remote_span_context(SpanContext::new(
                ids::trace_id_from(&notification.base_id)?,
                ids::span_id_from(parent_id)?,
                TraceFlags::SAMPLED,
                true,
                TraceState::default(),
            )),
            None => Context::new(),
        };

        let tags = tags::span_tags(&notification.info)?;

        let span = self
            .tracer
            .span_builder(operation.to_string())
            .with_kind(SpanKind::Internal)
            .with_attributes(tags)
            .with_start_time(start_time)
            .start_with_context(&self.tracer, &parent_cx);

        let span_context = span.span_context();
        let span_ids = if notification.parent_id.is_none() {
            SpanIds::Root {
                trace_id: span_context.trace_id(),
                span_id: span_context.span_id(),
            }
        } else {
            SpanIds::Child {
                span_id: span_context.span_id(),
            }
        };

        tracing::debug!(
            operation,
            base_id = %notification.base_id,
            span_id = %span_ids.span_id(),
            "opened span"
        );

        self.stack.push(Activation {
            operation: operation.to_string(),
            span,
        });

        Ok(span_ids)
    }

    fn handle_stop(&self, notification: &Notification, operation: &str) -> Result<(), BridgeError> {
        let mut activation = self
            .stack
            .pop()
            .ok_or_else(|| BridgeError::UnbalancedStop {
                name: notification.name.clone(),
            })?;

        if activation.operation != operation {
            tracing::warn!(
                open = %activation.operation,
                stopping = operation,
                "stop notification does not match the innermost open span"
            );
        }

        annotate_close(&mut activation.span, &notification.info);
        activation.span.end();

        tracing::debug!(operation, "closed span");
        Ok(())
    }

    /// Number of currently open spans.
    ///
    /// Returns to zero after the last matching stop of a well-nested
    /// sequence.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Point at the collector serving the given trace.
    #[must_use]
    pub fn get_report(&self, base_id: &str) -> ReportHandle {
        ReportHandle {
            base_id: base_id.to_string(),
            collector: self.config.endpoint.clone(),
        }
    }

    /// Trace listings are served by the collector UI; nothing is kept here.
    #[must_use]
    pub fn list_traces(&self) -> Vec<ReportHandle> {
        Vec::new()
    }

    /// Error-trace listings are served by the collector UI.
    #[must_use]
    pub fn list_error_traces(&self) -> Vec<ReportHandle> {
        Vec::new()
    }

    /// Flush and shut down the owned span pipeline.
    ///
    /// Unmatched starts still on the stack indicate a protocol defect in the
    /// notification stream; they are reported but do not fail the shutdown.
    pub fn shutdown(self) -> Result<(), BridgeError> {
        let open = self.stack.depth();
        if open > 0 {
            tracing::warn!(
                open_spans = open,
                "shutting down with unmatched start notifications"
            );
        }
        self.provider.shutdown()?;
        Ok(())
    }
}

/// Attach result data and error detail from a stop payload to the span
/// being closed.
fn annotate_close(span: &mut Span, info: &Info) {
    let result = info
        .db
        .as_ref()
        .and_then(|db| db.result.as_ref())
        .or_else(|| info.function.as_ref().and_then(|f| f.result.as_ref()));
    if let Some(result) = result {
        span.set_attribute(KeyValue::new(tags::RESULT, tags::otel_value(result)));
    }

    if let Some(etype) = &info.etype {
        span.set_attribute(KeyValue::new(tags::ERROR, true));
        let mut fields = vec![KeyValue::new(tags::ERROR_KIND, etype.clone())];
        if let Some(message) = &info.message {
            fields.push(KeyValue::new(tags::ERROR_MESSAGE, message.clone()));
        }
        span.add_event("error", fields);
        span.set_status(Status::error(
            info.message.clone().unwrap_or_else(|| etype.clone()),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_ids_are_a_pair() {
        let span_ids = SpanIds::Root {
            trace_id: TraceId::from_hex("27d10b5463d64bfabe4384bd9e92ae32").unwrap(),
            span_id: SpanId::from_hex("be4384bd9e92ae32").unwrap(),
        };
        assert_eq!(
            span_ids.ids(),
            vec![
                "27d10b5463d64bfabe4384bd9e92ae32".to_string(),
                "be4384bd9e92ae32".to_string()
            ]
        );
        assert!(span_ids.trace_id().is_some());
    }

    #[test]
    fn test_child_ids_are_a_single_id() {
        let span_ids = SpanIds::Child {
            span_id: SpanId::from_hex("be4384bd9e92ae32").unwrap(),
        };
        assert_eq!(span_ids.ids(), vec!["be4384bd9e92ae32".to_string()]);
        assert!(span_ids.trace_id().is_none());
    }

    #[test]
    fn test_report_handle_points_at_collector() {
        let handle = ReportHandle {
            base_id: "27d10b54-63d6-4bfa-be43-84bd9e92ae32".to_string(),
            collector: "http://127.0.0.1:4317".to_string(),
        };
        assert!(handle.to_string().contains("http://127.0.0.1:4317"));
    }
}
