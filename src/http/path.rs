//! Request path normalization
//!
//! Turns the raw request-target path into a clean, rooted, slash-separated
//! path. `..` can never climb above the root, so every result addresses
//! something inside the bundle.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Bytes that cannot appear literally in the path of a `Location` target
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-decode a request path
///
/// Returns `None` for paths that do not decode to UTF-8 or that contain NUL.
pub fn decode_path(raw: &str) -> Option<String> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    if decoded.contains('\0') {
        return None;
    }
    Some(decoded.into_owned())
}

/// Percent-encode a decoded path so it can be sent back in a header
///
/// Non-ASCII characters are encoded as UTF-8 octets; `/` is kept.
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_SEGMENT).to_string()
}

/// Lexically clean a path: collapse `//`, drop `.`, resolve `..` against the root
///
/// The result always starts with `/`. A trailing slash on the input is kept,
/// since it distinguishes a directory request from a file request.
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    for segment in &segments {
        cleaned.push('/');
        cleaned.push_str(segment);
    }
    if path.ends_with('/') {
        cleaned.push('/');
    }
    cleaned
}
