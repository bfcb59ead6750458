//! Asset store
//!
//! A read-only, path-addressable tree of the files in the embedded bundle.
//! The tree is built once at startup, validated, and then shared immutably by
//! every request. Per-asset metadata (MIME type, `ETag`) is computed up front
//! so the request path never hashes or guesses anything.

mod bundle;

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use rust_embed::RustEmbed;

use crate::error::StartupError;
use crate::http::{cache, mime};

pub use bundle::Bundle;

/// One file of the bundle
#[derive(Debug, Clone)]
pub struct Asset {
    data: Bytes,
    content_type: String,
    etag: String,
    last_modified: Option<DateTime<Utc>>,
}

impl Asset {
    fn new(path: &str, data: Bytes, last_modified: Option<DateTime<Utc>>) -> Self {
        Self {
            content_type: mime::content_type_for(path),
            etag: cache::generate_etag(&data),
            data,
            last_modified,
        }
    }

    /// File contents; cloning is a reference-count bump
    pub fn data(&self) -> Bytes {
        self.data.clone()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn etag(&self) -> &str {
        &self.etag
    }

    pub const fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }
}

/// Result of resolving a request path against the tree
#[derive(Debug)]
pub enum Lookup<'a> {
    File(&'a Asset),
    /// At least one asset lives below this path
    Directory,
    NotFound,
}

/// Immutable mapping from bundle-relative path to asset
#[derive(Debug)]
pub struct AssetTree {
    files: HashMap<String, Asset>,
    dirs: HashSet<String>,
}

impl AssetTree {
    /// Build a tree from `(relative path, bytes, modification time)` entries
    ///
    /// Paths are slash-separated and relative to the bundle root. Entries that
    /// cannot be rooted (absolute, `.`/`..` segments, backslashes) and an empty
    /// entry set are startup errors.
    pub fn from_entries<I, P, D>(entries: I) -> Result<Self, StartupError>
    where
        I: IntoIterator<Item = (P, D, Option<DateTime<Utc>>)>,
        P: AsRef<str>,
        D: Into<Bytes>,
    {
        let mut files = HashMap::new();
        let mut dirs = HashSet::new();

        for (path, data, last_modified) in entries {
            let path = path.as_ref();
            if !is_rooted(path) {
                return Err(StartupError::UnrootedAsset(path.to_string()));
            }

            // Register every ancestor directory, including the root ("")
            dirs.insert(String::new());
            let mut end = 0;
            while let Some(pos) = path[end..].find('/') {
                end += pos;
                dirs.insert(path[..end].to_string());
                end += 1;
            }

            files.insert(path.to_string(), Asset::new(path, data.into(), last_modified));
        }

        if files.is_empty() {
            return Err(StartupError::EmptyBundle);
        }

        Ok(Self { files, dirs })
    }

    /// Build the tree from a compile-time embedded folder
    pub fn from_embedded<E: RustEmbed>() -> Result<Self, StartupError> {
        let entries = E::iter().filter_map(|name| {
            let file = E::get(&name)?;
            let data = match file.data {
                Cow::Borrowed(bytes) => Bytes::from_static(bytes),
                Cow::Owned(bytes) => Bytes::from(bytes),
            };
            let last_modified = file
                .metadata
                .last_modified()
                .and_then(|secs| i64::try_from(secs).ok())
                .and_then(|secs| DateTime::from_timestamp(secs, 0));
            Some((name.into_owned(), data, last_modified))
        });
        Self::from_entries(entries)
    }

    /// Build the tree from the bundle compiled into this binary
    pub fn from_bundle() -> Result<Self, StartupError> {
        Self::from_embedded::<Bundle>()
    }

    /// Resolve a clean, rooted request path (`/`, `/app.js`, `/assets/`)
    pub fn lookup(&self, path: &str) -> Lookup<'_> {
        let key = path.trim_start_matches('/').trim_end_matches('/');
        if let Some(asset) = self.files.get(key) {
            return Lookup::File(asset);
        }
        if self.dirs.contains(key) {
            return Lookup::Directory;
        }
        Lookup::NotFound
    }

    /// Resolve a path to a file, ignoring directories
    pub fn resolve(&self, path: &str) -> Option<&Asset> {
        match self.lookup(path) {
            Lookup::File(asset) => Some(asset),
            Lookup::Directory | Lookup::NotFound => None,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all assets in bytes
    pub fn total_bytes(&self) -> usize {
        self.files.values().map(Asset::len).sum()
    }
}

/// A bundle path is rooted when it is relative and every segment is a plain name
fn is_rooted(path: &str) -> bool {
    !path.is_empty()
        && !path.contains('\\')
        && path
            .split('/')
            .all(|segment| !matches!(segment, "" | "." | ".."))
}
