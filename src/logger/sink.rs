//! Access log sinks
//!
//! The pipeline hands each finished request to an [`AccessSink`]. Sinks are
//! shared by every connection task, so implementations must be safe for
//! interleaved calls. Recording is best-effort: a sink has no way to fail the
//! request it describes.

use std::sync::{Arc, Mutex, PoisonError};

use super::format::{AccessLogEntry, AccessLogFormat};

/// Receiver of one record per completed request
pub trait AccessSink: Send + Sync + 'static {
    fn record(&self, entry: &AccessLogEntry);

    /// `false` lets the caller skip building entries altogether
    fn enabled(&self) -> bool {
        true
    }
}

/// Emits records as `tracing` events with target `access`
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    format: AccessLogFormat,
}

impl TracingSink {
    pub const fn new(format: AccessLogFormat) -> Self {
        Self { format }
    }

    pub const fn format(&self) -> &AccessLogFormat {
        &self.format
    }
}

impl AccessSink for TracingSink {
    fn record(&self, entry: &AccessLogEntry) {
        match &self.format {
            AccessLogFormat::Structured => tracing::info!(
                target: "access",
                method = %entry.method,
                path = %entry.path,
                user_agent = entry.user_agent.as_deref().unwrap_or("-"),
                status_code = entry.status,
                latency_us = entry.latency_us(),
                body_bytes = entry.body_bytes,
                remote_addr = %entry.remote_addr,
                "request completed"
            ),
            format => tracing::info!(target: "access", "{}", entry.format(format)),
        }
    }
}

/// Keeps every record in memory, for tests and embedding callers
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<AccessLogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records so far, in arrival order
    pub fn records(&self) -> Vec<AccessLogEntry> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AccessSink for MemorySink {
    fn record(&self, entry: &AccessLogEntry) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
    }
}

/// `None` is the disabled access log
impl<S: AccessSink> AccessSink for Option<S> {
    fn record(&self, entry: &AccessLogEntry) {
        if let Some(sink) = self {
            sink.record(entry);
        }
    }

    fn enabled(&self) -> bool {
        self.as_ref().is_some_and(|sink| sink.enabled())
    }
}

impl<S: AccessSink + ?Sized> AccessSink for Arc<S> {
    fn record(&self, entry: &AccessLogEntry) {
        (**self).record(entry);
    }

    fn enabled(&self) -> bool {
        (**self).enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::time::Duration;

    fn entry(status: u16) -> AccessLogEntry {
        AccessLogEntry {
            remote_addr: "-".to_string(),
            time: Local::now(),
            method: "GET".to_string(),
            path: "/".to_string(),
            query: None,
            http_version: "1.1",
            status,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            latency: Duration::ZERO,
        }
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.record(&entry(200));
        sink.record(&entry(404));
        let statuses: Vec<u16> = sink.records().iter().map(|e| e.status).collect();
        assert_eq!(statuses, [200, 404]);
    }

    #[test]
    fn test_disabled_sink() {
        let sink: Option<MemorySink> = None;
        assert!(!sink.enabled());
        sink.record(&entry(200));
    }

    #[test]
    fn test_shared_sink() {
        let sink = Arc::new(MemorySink::new());
        let handle = Arc::clone(&sink);
        assert!(handle.enabled());
        handle.record(&entry(304));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_tracing_sink_does_not_panic_without_subscriber() {
        TracingSink::default().record(&entry(200));
        TracingSink::new(AccessLogFormat::Json).record(&entry(500));
    }
}
