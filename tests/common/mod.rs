//! Test utilities for driving the notification bridge.
//!
//! Provides:
//! - A bridge wired to an in-memory span exporter
//! - Notification builders in the shape the profiling source emits

use culvert::observability::tracing::init_test_tracing;
use culvert::{BridgeConfig, Notification, SpanBridge};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
use opentelemetry_sdk::trace::TracerProvider;

/// Trace identifier used by most fixtures (UUID-shaped, as emitted by the
/// profiling source).
pub const BASE_ID: &str = "27d10b54-63d6-4bfa-be43-84bd9e92ae32";

/// Parent identifier used by the remote-parent fixtures.
pub const PARENT_ID: &str = "9a2f1b0c-8d3e-4f5a-9b6c-7d8e9f0a1b2c";

/// Timestamp carried by fixture notifications.
pub const TIMESTAMP: &str = "2026-01-15T10:30:00.123456";

/// Bridge under test, exporting into memory for span assertions.
pub struct TestBridge {
    pub bridge: SpanBridge,
    pub exporter: InMemorySpanExporter,
}

impl TestBridge {
    /// Create a bridge whose spans land in an in-memory exporter.
    pub fn new() -> Self {
        init_test_tracing();
        let exporter = InMemorySpanExporter::default();
        let provider = TracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let bridge = SpanBridge::with_provider(
            BridgeConfig::new("identity", "api", "http://127.0.0.1:4317"),
            provider,
        );
        Self { bridge, exporter }
    }

    /// Spans closed so far, in closing order.
    pub fn finished(&self) -> Vec<SpanData> {
        self.exporter
            .get_finished_spans()
            .expect("in-memory exporter never fails")
    }
}

/// Build a `-start` notification.
pub fn start(operation: &str, parent_id: Option<&str>, info: serde_json::Value) -> Notification {
    notification(&format!("{operation}-start"), parent_id, info)
}

/// Build a `-stop` notification.
pub fn stop(operation: &str, info: serde_json::Value) -> Notification {
    notification(&format!("{operation}-stop"), None, info)
}

fn notification(name: &str, parent_id: Option<&str>, info: serde_json::Value) -> Notification {
    Notification {
        name: name.to_string(),
        timestamp: TIMESTAMP.to_string(),
        base_id: BASE_ID.to_string(),
        parent_id: parent_id.map(ToString::to_string),
        info: serde_json::from_value(info).expect("fixture info deserializes"),
    }
}
