//! Cross-origin isolation headers
//!
//! COEP `require-corp` plus COOP `same-origin` put the page in a
//! cross-origin isolated context, which browsers require before exposing
//! `SharedArrayBuffer` to threaded WebAssembly.

use hyper::header::{HeaderMap, HeaderName, HeaderValue};

pub const CROSS_ORIGIN_EMBEDDER_POLICY: &str = "cross-origin-embedder-policy";
pub const CROSS_ORIGIN_OPENER_POLICY: &str = "cross-origin-opener-policy";

pub const REQUIRE_CORP: &str = "require-corp";
pub const SAME_ORIGIN: &str = "same-origin";

/// Set both isolation headers, replacing any previous values
pub fn apply_isolation_headers(headers: &mut HeaderMap) {
    headers.insert(
        HeaderName::from_static(CROSS_ORIGIN_EMBEDDER_POLICY),
        HeaderValue::from_static(REQUIRE_CORP),
    );
    headers.insert(
        HeaderName::from_static(CROSS_ORIGIN_OPENER_POLICY),
        HeaderValue::from_static(SAME_ORIGIN),
    );
}
