//! HTTP response writing module
//!
//! Writes the fixed-shape responses (errors, redirects, 304) through a
//! [`ResponseWriter`], decoupled from asset lookup.

use bytes::Bytes;
use hyper::header::{
    HeaderName, HeaderValue, ALLOW, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG,
    LOCATION,
};
use hyper::StatusCode;

use super::writer::ResponseWriter;

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Set a header from a dynamic value, skipping values that are not valid header text
pub fn set_header(w: &mut impl ResponseWriter, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            w.headers_mut().insert(name, v);
        }
        Err(e) => {
            tracing::warn!(header = %name, value, error = %e, "dropping invalid header value");
        }
    }
}

/// Error and redirect responses must never be cached under an asset's directive
fn withdraw_cache_directive(w: &mut impl ResponseWriter) {
    w.headers_mut().remove(CACHE_CONTROL);
}

/// Write a plain-text response with the given status
fn write_text(w: &mut impl ResponseWriter, status: StatusCode, text: &'static str) {
    withdraw_cache_directive(w);
    let headers = w.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(text.len()));
    w.write_status(status);
    w.write_body(Bytes::from_static(text.as_bytes()));
}

/// Write 404 Not Found response
pub fn write_404(w: &mut impl ResponseWriter) {
    write_text(w, StatusCode::NOT_FOUND, "404 Not Found");
}

/// Write 400 Bad Request response
pub fn write_400(w: &mut impl ResponseWriter) {
    write_text(w, StatusCode::BAD_REQUEST, "400 Bad Request");
}

/// Write 405 Method Not Allowed response
pub fn write_405(w: &mut impl ResponseWriter) {
    w.headers_mut()
        .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    write_text(w, StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed");
}

/// Write OPTIONS response
pub fn write_options(w: &mut impl ResponseWriter) {
    w.headers_mut()
        .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    w.write_status(StatusCode::NO_CONTENT);
}

/// Write 304 Not Modified response
pub fn write_304(w: &mut impl ResponseWriter, etag: &str) {
    set_header(w, ETAG, etag);
    w.write_status(StatusCode::NOT_MODIFIED);
}

/// Write 416 Range Not Satisfiable response
pub fn write_416(w: &mut impl ResponseWriter, file_size: usize) {
    set_header(w, CONTENT_RANGE, &format!("bytes */{file_size}"));
    write_text(w, StatusCode::RANGE_NOT_SATISFIABLE, "416 Range Not Satisfiable");
}

/// Write 301 redirect response
pub fn write_redirect(w: &mut impl ResponseWriter, target: &str) {
    withdraw_cache_directive(w);
    set_header(w, LOCATION, target);
    w.write_status(StatusCode::MOVED_PERMANENTLY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::writer::BufferedResponse;

    #[test]
    fn test_404() {
        let mut w = BufferedResponse::new();
        write_404(&mut w);
        let response = w.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_LENGTH], "13");
    }

    #[test]
    fn test_405_lists_methods() {
        let mut w = BufferedResponse::new();
        write_405(&mut w);
        let response = w.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], ALLOWED_METHODS);
    }

    #[test]
    fn test_416_reports_size() {
        let mut w = BufferedResponse::new();
        write_416(&mut w, 42);
        let response = w.into_response();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes */42");
    }

    #[test]
    fn test_errors_and_redirects_drop_cache_control() {
        let writers: [fn(&mut BufferedResponse); 5] = [
            write_404,
            write_400,
            write_405,
            |w| write_416(w, 10),
            |w| write_redirect(w, "/assets/"),
        ];
        for write in writers {
            let mut w = BufferedResponse::new();
            w.headers_mut().insert(
                CACHE_CONTROL,
                HeaderValue::from_static("max-age=5184000, immutable"),
            );
            write(&mut w);
            let response = w.into_response();
            assert!(
                response.headers().get(CACHE_CONTROL).is_none(),
                "{}",
                response.status()
            );
        }
    }

    #[test]
    fn test_304_keeps_cache_control() {
        let mut w = BufferedResponse::new();
        w.headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static("max-age=86400"));
        write_304(&mut w, "\"abc\"");
        let response = w.into_response();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(response.headers()[CACHE_CONTROL], "max-age=86400");
    }

    #[test]
    fn test_invalid_header_value_is_skipped() {
        let mut w = BufferedResponse::new();
        write_redirect(&mut w, "/bad\nvalue");
        let response = w.into_response();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert!(response.headers().get(LOCATION).is_none());
    }
}
