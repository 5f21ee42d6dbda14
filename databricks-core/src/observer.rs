//! Injected observer capability for connection and statement events.
//!
//! Connection and statement paths report structured events through a sink
//! supplied at construction instead of calling a process-wide logger from
//! deep inside core logic. The default sink forwards to `tracing`; tests use
//! [`NullObserver`] or their own recorder.

use std::sync::Arc;

/// Sink for structured connector events.
///
/// DSNs handed to observers are always pre-redacted; an implementation never
/// sees a raw token.
pub trait Observer: Send + Sync {
    /// A connection attempt is about to be made
    fn connect_attempt(&self, redacted_dsn: &str) {
        let _ = redacted_dsn;
    }

    /// A statement is about to be issued
    fn statement_issued(&self, sql: &str) {
        let _ = sql;
    }

    /// A failure was classified into the error taxonomy
    fn error_classified(&self, kind: &str, detail: &str) {
        let _ = (kind, detail);
    }
}

/// Shared observer handle
pub type ObserverRef = Arc<dyn Observer>;

/// Default observer forwarding events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn connect_attempt(&self, redacted_dsn: &str) {
        tracing::info!(dsn = redacted_dsn, "connecting to Databricks SQL endpoint");
    }

    fn statement_issued(&self, sql: &str) {
        tracing::debug!(sql, "executing statement");
    }

    fn error_classified(&self, kind: &str, detail: &str) {
        tracing::warn!(kind, detail, "connector error");
    }
}

/// Observer that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {}

/// The default observer used when a host does not inject one.
pub fn default_observer() -> ObserverRef {
    Arc::new(TracingObserver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Observer for Recorder {
        fn statement_issued(&self, sql: &str) {
            self.events.lock().unwrap().push(sql.to_string());
        }
    }

    #[test]
    fn test_default_methods_are_no_ops() {
        let recorder = Recorder::default();
        recorder.connect_attempt("odbc:Host=h;PWD=****");
        recorder.error_classified("statement", "boom");
        recorder.statement_issued("SELECT 1");

        assert_eq!(recorder.events.lock().unwrap().as_slice(), ["SELECT 1"]);
    }
}
