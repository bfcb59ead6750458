//! HTTP validator module
//!
//! Provides `ETag` generation, HTTP-date handling and conditional request checks.

use chrono::{DateTime, Utc};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate `ETag` using fast hashing
///
/// # Arguments
/// * `content` - File content
///
/// # Returns
/// Quoted `ETag` string, e.g., `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Weak validators: `W/"abc123"` (weak comparison)
/// - Wildcard: `*`
///
/// # Returns
/// Returns true if matched (should return 304), false otherwise
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').any(|e| {
            let e = e.trim();
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// Format a timestamp as an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`)
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an HTTP-date header value
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Check `If-Modified-Since` against the asset's modification time
///
/// HTTP dates have one-second resolution, so sub-second differences never
/// count as a modification.
pub fn check_not_modified_since(
    if_modified_since: Option<&str>,
    last_modified: Option<DateTime<Utc>>,
) -> bool {
    let (Some(header), Some(modified)) = (if_modified_since, last_modified) else {
        return false;
    };
    parse_http_date(header).is_some_and(|since| modified.timestamp() <= since.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_etag() {
        let etag = generate_etag(b"hello world");
        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        assert!(etag.len() > 2);
    }

    #[test]
    fn test_etag_consistency() {
        assert_eq!(generate_etag(b"same content"), generate_etag(b"same content"));
        assert_ne!(generate_etag(b"content a"), generate_etag(b"content b"));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(check_etag_match(Some("W/\"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_http_date() {
        let t = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        let formatted = format_http_date(t);
        assert_eq!(formatted, "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(parse_http_date(&formatted), Some(t));
        assert_eq!(parse_http_date("yesterday"), None);
    }

    #[test]
    fn test_not_modified_since() {
        let modified = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert!(check_not_modified_since(
            Some("Fri, 01 Mar 2024 12:00:00 GMT"),
            Some(modified)
        ));
        assert!(check_not_modified_since(
            Some("Sat, 02 Mar 2024 00:00:00 GMT"),
            Some(modified)
        ));
        assert!(!check_not_modified_since(
            Some("Thu, 29 Feb 2024 00:00:00 GMT"),
            Some(modified)
        ));
        assert!(!check_not_modified_since(Some("garbage"), Some(modified)));
        assert!(!check_not_modified_since(None, Some(modified)));
        assert!(!check_not_modified_since(
            Some("Fri, 01 Mar 2024 12:00:00 GMT"),
            None
        ));
    }
}
