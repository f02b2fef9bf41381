//! OTLP span pipeline bootstrap.
//!
//! Built once per bridge and owned by it. The provider is never installed
//! as the process-global tracer provider; embedders that want one can
//! install their own.

use opentelemetry::trace::TraceError;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::trace::{Config, TracerProvider};
use opentelemetry_sdk::Resource;

use crate::config::BridgeConfig;

/// Build a tracer provider exporting to the configured collector.
///
/// Spans flow through a batch processor on the Tokio runtime; delivery is
/// asynchronous and best-effort, never observable as a stall to notifying
/// callers. Failure to build the pipeline is surfaced immediately.
///
/// # Arguments
///
/// * `config` - Collector endpoint and the service identity to report
pub fn build_provider(config: &BridgeConfig) -> Result<TracerProvider, TraceError> {
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(config.endpoint.clone())
        .with_protocol(Protocol::Grpc);

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(Config::default().with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            config.service_identity(),
        )])))
        .install_batch(opentelemetry_sdk::runtime::Tokio)
}
