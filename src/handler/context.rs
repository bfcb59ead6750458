//! Request context
//!
//! Everything the file server and the access logger need from a request,
//! extracted once so neither has to touch the hyper request again.

use std::net::SocketAddr;

use hyper::header::{HeaderMap, IF_MODIFIED_SINCE, IF_NONE_MATCH, RANGE, REFERER, USER_AGENT};
use hyper::{Method, Request, Version};

use crate::http::path;

/// Request context encapsulating information needed for request processing
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Raw path as received, still percent-encoded
    pub path: String,
    /// Decoded and cleaned path, `None` when the raw path does not decode
    pub lookup_path: Option<String>,
    pub query: Option<String>,
    pub version: Version,
    pub remote_addr: Option<SocketAddr>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub range: Option<String>,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>, remote_addr: Option<SocketAddr>) -> Self {
        let uri = req.uri();
        let headers = req.headers();
        let raw_path = uri.path();

        Self {
            method: req.method().clone(),
            path: raw_path.to_string(),
            lookup_path: path::decode_path(raw_path).map(|p| path::clean_path(&p)),
            query: uri.query().map(ToString::to_string),
            version: req.version(),
            remote_addr,
            user_agent: header_string(headers, USER_AGENT),
            referer: header_string(headers, REFERER),
            if_none_match: header_string(headers, IF_NONE_MATCH),
            if_modified_since: header_string(headers, IF_MODIFIED_SINCE),
            range: header_string(headers, RANGE),
        }
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }

    /// Path used for policy decisions: the cleaned path when available
    pub fn policy_path(&self) -> &str {
        self.lookup_path.as_deref().unwrap_or(&self.path)
    }
}

fn header_string(headers: &HeaderMap, name: hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_fields() {
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/a%20b/../app.js?v=3")
            .header(USER_AGENT, "curl/8.0")
            .header(RANGE, "bytes=0-9")
            .body(())
            .unwrap();
        let remote: SocketAddr = "10.0.0.1:5555".parse().unwrap();

        let ctx = RequestContext::from_request(&req, Some(remote));
        assert!(ctx.is_head());
        assert_eq!(ctx.path, "/a%20b/../app.js");
        assert_eq!(ctx.lookup_path.as_deref(), Some("/app.js"));
        assert_eq!(ctx.policy_path(), "/app.js");
        assert_eq!(ctx.query.as_deref(), Some("v=3"));
        assert_eq!(ctx.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(ctx.range.as_deref(), Some("bytes=0-9"));
        assert_eq!(ctx.referer, None);
        assert_eq!(ctx.remote_addr, Some(remote));
    }

    #[test]
    fn test_undecodable_path() {
        let req = Request::builder().uri("/%ff.js").body(()).unwrap();
        let ctx = RequestContext::from_request(&req, None);
        assert_eq!(ctx.lookup_path, None);
        assert_eq!(ctx.policy_path(), "/%ff.js");
    }
}
