//! Thread-safe trace accumulator shared across analysis passes.

use crate::message::{TraceLevel, TraceMessage};
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A thread-safe accumulator for trace messages emitted during analysis.
///
/// Messages above the configured verbosity threshold are dropped at the
/// door; error- and fatal-severity messages are always recorded regardless
/// of level. The error count is tracked atomically for fast `has_errors`
/// checks without locking the message vector.
pub struct TraceSink {
    messages: Mutex<Vec<TraceMessage>>,
    error_count: AtomicUsize,
    threshold: TraceLevel,
}

impl TraceSink {
    /// Creates a sink recording only level-0 results (and all errors).
    pub fn new() -> Self {
        Self::with_threshold(TraceLevel::RESULT)
    }

    /// Creates a sink recording messages at levels `0..=threshold`.
    pub fn with_threshold(threshold: TraceLevel) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
            threshold,
        }
    }

    /// Emits a message into the sink.
    ///
    /// Messages with [`Severity::Error`] or [`Severity::Fatal`] increment
    /// the error count and are recorded even above the threshold.
    pub fn emit(&self, msg: TraceMessage) {
        let is_error = msg.severity.is_error();
        if is_error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        if msg.level <= self.threshold || is_error {
            let mut messages = self.messages.lock().unwrap();
            messages.push(msg);
        }
    }

    /// Returns the configured verbosity threshold.
    pub fn threshold(&self) -> TraceLevel {
        self.threshold
    }

    /// Returns `true` if any error- or fatal-severity messages were emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::Relaxed) > 0
    }

    /// Returns the number of error-severity messages emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Takes all accumulated messages, leaving the sink empty.
    pub fn take_all(&self) -> Vec<TraceMessage> {
        let mut messages = self.messages.lock().unwrap();
        std::mem::take(&mut *messages)
    }

    /// Returns a snapshot of all accumulated messages without draining.
    pub fn messages(&self) -> Vec<TraceMessage> {
        let messages = self.messages.lock().unwrap();
        messages.clone()
    }
}

impl Default for TraceSink {
    fn default() -> Self {
        Self::new()
    }
}
