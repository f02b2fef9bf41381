//! Observability plumbing.
//!
//! Provides:
//! - The OTLP span pipeline the bridge exports through
//! - Log subscriber setup for embedding applications and tests

pub mod tracer;
pub mod tracing;
