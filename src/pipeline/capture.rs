//! Response capture
//!
//! [`CapturingWriter`] decorates a [`ResponseWriter`]: it records the first
//! status the downstream handler commits, when that happened, and how many
//! body bytes went out, then forwards every call untouched. Each request owns
//! its own capture, so concurrent requests never observe each other.

use std::time::{Duration, Instant};

use bytes::Bytes;
use hyper::header::HeaderMap;
use hyper::StatusCode;

use crate::http::ResponseWriter;

/// Status reported when the handler never wrote one explicitly.
///
/// Matches what [`BufferedResponse`](crate::http::BufferedResponse) puts on
/// the wire in that case: a body write commits an implicit `200 OK`, and an
/// untouched response is an empty `200 OK`.
pub const DEFAULT_STATUS: StatusCode = StatusCode::OK;

/// What the capturing writer observed for one request
#[derive(Debug, Clone, Copy)]
pub struct CaptureState {
    started: Instant,
    status: Option<StatusCode>,
    status_latency: Option<Duration>,
    committed: bool,
    body_bytes: usize,
}

impl CaptureState {
    /// Start the clock for a new request
    pub fn start() -> Self {
        Self::started_at(Instant::now())
    }

    pub const fn started_at(started: Instant) -> Self {
        Self {
            started,
            status: None,
            status_latency: None,
            committed: false,
            body_bytes: 0,
        }
    }

    /// Explicitly written status, if any
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Status for logging, falling back to [`DEFAULT_STATUS`]
    pub fn status_or_default(&self) -> StatusCode {
        self.status.unwrap_or(DEFAULT_STATUS)
    }

    /// Time from request start to the status write
    pub const fn status_latency(&self) -> Option<Duration> {
        self.status_latency
    }

    /// Wall-clock time since the request started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub const fn body_bytes(&self) -> usize {
        self.body_bytes
    }

    fn observe_status(&mut self, status: StatusCode) {
        if !self.committed {
            self.committed = true;
            self.status = Some(status);
            self.status_latency = Some(self.started.elapsed());
        }
    }

    fn observe_body(&mut self, len: usize) {
        // A body write commits the implicit status downstream
        self.committed = true;
        self.body_bytes += len;
    }
}

/// Records-then-forwards decorator around a response writer
#[derive(Debug)]
pub struct CapturingWriter<W> {
    inner: W,
    capture: CaptureState,
}

impl<W: ResponseWriter> CapturingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_capture(inner, CaptureState::start())
    }

    pub const fn with_capture(inner: W, capture: CaptureState) -> Self {
        Self { inner, capture }
    }

    pub const fn capture(&self) -> &CaptureState {
        &self.capture
    }

    pub fn into_parts(self) -> (W, CaptureState) {
        (self.inner, self.capture)
    }
}

impl<W: ResponseWriter> ResponseWriter for CapturingWriter<W> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) {
        self.capture.observe_status(status);
        self.inner.write_status(status);
    }

    fn write_body(&mut self, chunk: Bytes) {
        self.capture.observe_body(chunk.len());
        self.inner.write_body(chunk);
    }
}
