use rust_embed::RustEmbed;

/// The frontend build output, embedded at compile time.
///
/// The `dist` directory itself is the bundle root and never appears in
/// request paths: `dist/index.html` is served as `/index.html`.
#[derive(RustEmbed)]
#[folder = "dist/"]
pub struct Bundle;
