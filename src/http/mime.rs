//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension.

use mime_guess::mime;

/// Get MIME Content-Type for a bundle path
///
/// Textual types carry an explicit UTF-8 charset so browsers never sniff.
///
/// # Examples
/// ```
/// use coi_serve::http::mime::content_type_for;
/// assert_eq!(content_type_for("index.html"), "text/html; charset=utf-8");
/// assert_eq!(content_type_for("engine.wasm"), "application/wasm");
/// assert_eq!(content_type_for("LICENSE"), "application/octet-stream");
/// ```
pub fn content_type_for(path: &str) -> String {
    let guess = mime_guess::from_path(path).first_or_octet_stream();
    if guess.type_() == mime::TEXT {
        format!("{}; charset=utf-8", guess.essence_str())
    } else {
        guess.essence_str().to_string()
    }
}
