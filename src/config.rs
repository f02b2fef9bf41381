//! Construction-time configuration for the notification bridge.
//!
//! Everything the bridge needs is supplied here, once, by the embedding
//! application: the profiled project and service names (combined into the
//! service identity reported to the collector) and the OTLP collector
//! endpoint. There is no environment or CLI surface.

use serde::{Deserialize, Serialize};

/// Configuration supplied when constructing a [`SpanBridge`].
///
/// The collector endpoint is a required parameter; the bridge never falls
/// back to a built-in destination.
///
/// [`SpanBridge`]: crate::bridge::SpanBridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Name of the profiled project (e.g. "identity")
    pub project: String,

    /// Name of the profiled service within the project (e.g. "api")
    pub service: String,

    /// OTLP gRPC endpoint of the tracing collector
    /// (e.g. "http://127.0.0.1:4317")
    pub endpoint: String,
}

impl BridgeConfig {
    /// Create a configuration from project, service and collector endpoint.
    pub fn new(
        project: impl Into<String>,
        service: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            service: service.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Service identity reported to the collector as `service.name`.
    ///
    /// Combines project and service the same way the profiling source
    /// scopes its sessions.
    #[must_use]
    pub fn service_identity(&self) -> String {
        format!("{}-{}", self.project, self.service)
    }
}
