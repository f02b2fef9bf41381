//! Explicit LIFO stack of open span activations.
//!
//! The profiling source provides no call-stack context, so open spans are
//! tracked by push/pop order instead: one push per start, one pop per the
//! matching stop. The mutex serializes push/pop when genuinely nested calls
//! on one logical thread of execution reach the bridge from worker threads.

use std::sync::Mutex;

use opentelemetry_sdk::trace::Span;

/// One open span together with the operation name it was opened under.
///
/// Owned exclusively by the stack between the start and the matching stop.
#[derive(Debug)]
pub(crate) struct Activation {
    /// Operation name from the start notification, checked against the stop
    pub operation: String,
    /// The open SDK span, ended when the activation is popped
    pub span: Span,
}

/// Per-bridge LIFO sequence of activations.
///
/// Empty at construction; grows by one on every start, shrinks by one on
/// every stop. Non-empty at shutdown means unmatched starts.
#[derive(Debug, Default)]
pub(crate) struct ActivationStack {
    inner: Mutex<Vec<Activation>>,
}

impl ActivationStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
        }
    }

    /// Push the activation of a newly opened span.
    pub fn push(&self, activation: Activation) {
        self.inner.lock().unwrap().push(activation);
    }

    /// Pop the most recently opened activation, if any.
    pub fn pop(&self) -> Option<Activation> {
        self.inner.lock().unwrap().pop()
    }

    /// Number of currently open activations.
    pub fn depth(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}
