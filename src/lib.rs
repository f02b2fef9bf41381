//! Culvert: bridges paired start/stop profiling notifications into
//! OpenTelemetry traces.
//!
//! A profiling source emits one `-start` and one matching `-stop`
//! notification per logical call, in strict LIFO nesting, carrying opaque
//! trace/parent identifiers instead of any call-stack context. Culvert turns
//! that stream into correctly nested spans, linking to remote parents when
//! the parent span was created in another process.
//!
//! # Architecture
//!
//! - **Explicit activation stack**: open spans are tracked by push/pop order,
//!   not by thread-local context
//! - **Remote parent linkage**: `(base_id, parent_id)` become a non-recording
//!   sampled span reference for cross-process nesting
//! - **Owned pipeline**: the OTLP exporter and tracer provider are built once
//!   per bridge, never installed globally
//!
//! # Modules
//!
//! - [`bridge`]: span lifecycle management (start/stop handling)
//! - [`config`]: construction-time configuration
//! - [`ids`]: opaque profile identifier to trace/span id mapping
//! - [`notification`]: notification payload model and parsing
//! - [`observability`]: tracer pipeline bootstrap and log setup
//! - [`tags`]: span tag construction from notification payloads

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions, // bridge::BridgeError is fine
    clippy::must_use_candidate,      // Not all functions need #[must_use]
    clippy::missing_errors_doc,      // Error docs can be verbose
    clippy::missing_panics_doc       // Panic docs can be verbose
)]

pub mod bridge;
pub mod config;
pub mod ids;
pub mod notification;
pub mod observability;
pub mod tags;

pub use bridge::{BridgeError, ReportHandle, SpanBridge, SpanIds};
pub use config::BridgeConfig;
pub use notification::{EventKind, Notification};
