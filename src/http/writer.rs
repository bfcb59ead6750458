//! Response writing capability
//!
//! Handlers write responses through [`ResponseWriter`] instead of returning a
//! finished `Response`. This lets decorators such as the capturing writer
//! observe the status write as it happens, and it gives the same commit
//! semantics as a streaming HTTP writer: the first status write wins and the
//! header block is frozen from that point on.

use bytes::{Bytes, BytesMut};
use http_body_util::Full;
use hyper::header::HeaderMap;
use hyper::{Response, StatusCode};

/// Write side of one HTTP response
pub trait ResponseWriter {
    /// Header block of the response. Edits after the status is committed are ignored.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Commit the status line. Only the first call has any effect.
    fn write_status(&mut self, status: StatusCode);

    /// Append body bytes, committing an implicit `200 OK` if no status was written.
    fn write_body(&mut self, chunk: Bytes);
}

/// The real response channel: buffers one response for hyper
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    /// Receives header edits made after commit, so they never reach the wire
    late_headers: HeaderMap,
    body: Vec<Bytes>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status that will be sent, `None` while nothing has been committed
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Read-only view of the committed (or pending) header block
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Convert into a hyper response
    ///
    /// A response nobody wrote to is an empty `200 OK`.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let body = match self.body.len() {
            0 => Bytes::new(),
            1 => self.body.into_iter().next().unwrap_or_default(),
            _ => {
                let mut joined = BytesMut::with_capacity(self.body.iter().map(Bytes::len).sum());
                for chunk in self.body {
                    joined.extend_from_slice(&chunk);
                }
                joined.freeze()
            }
        };

        let mut response = Response::new(Full::new(body));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        if self.status.is_some() {
            &mut self.late_headers
        } else {
            &mut self.headers
        }
    }

    fn write_status(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(committed) => {
                tracing::debug!(%committed, ignored = %status, "superfluous status write");
            }
        }
    }

    fn write_body(&mut self, chunk: Bytes) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        if !chunk.is_empty() {
            self.body.push(chunk);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::header::{HeaderValue, CONTENT_TYPE};

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_first_status_wins() {
        let mut w = BufferedResponse::new();
        w.write_status(StatusCode::NOT_FOUND);
        w.write_status(StatusCode::OK);
        assert_eq!(w.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(w.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_implicit_ok_on_body() {
        let mut w = BufferedResponse::new();
        w.write_body(Bytes::from_static(b"hello "));
        w.write_body(Bytes::from_static(b"world"));
        w.write_status(StatusCode::INTERNAL_SERVER_ERROR);

        let response = w.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, "hello world");
    }

    #[tokio::test]
    async fn test_headers_frozen_after_commit() {
        let mut w = BufferedResponse::new();
        w.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        w.write_status(StatusCode::OK);
        w.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));

        let response = w.into_response();
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    }

    #[tokio::test]
    async fn test_untouched_response() {
        let response = BufferedResponse::new().into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_bytes(response).await.is_empty());
    }
}
