//! Static file serving module
//!
//! Serves the embedded bundle: method checks, directory redirects, index
//! files, conditional requests and single byte ranges.

use std::sync::Arc;

use hyper::header::{
    HeaderValue, ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED,
};
use hyper::{Method, StatusCode};

use crate::assets::{Asset, AssetTree, Lookup};
use crate::handler::RequestContext;
use crate::http::range::RangeParseResult;
use crate::http::response::{self, set_header};
use crate::http::{self, cache, path, ResponseWriter};
use crate::pipeline::FileServer;

/// File server over an immutable asset tree
#[derive(Debug, Clone)]
pub struct StaticFiles {
    tree: Arc<AssetTree>,
    index_files: Vec<String>,
}

impl StaticFiles {
    pub const fn new(tree: Arc<AssetTree>, index_files: Vec<String>) -> Self {
        Self { tree, index_files }
    }

    pub fn tree(&self) -> &AssetTree {
        &self.tree
    }

    fn serve_path(&self, ctx: &RequestContext, w: &mut impl ResponseWriter) {
        let Some(clean) = ctx.lookup_path.as_deref() else {
            tracing::debug!(path = %ctx.path, "undecodable request path");
            response::write_400(w);
            return;
        };

        // `/dir/index.html` is always addressed as `/dir/`
        if let Some(dir) = self.strip_index_name(clean) {
            redirect(ctx, w, dir);
            return;
        }

        match self.tree.lookup(clean) {
            Lookup::File(asset) => {
                if clean.ends_with('/') {
                    redirect(ctx, w, clean.trim_end_matches('/'));
                } else {
                    write_asset(ctx, asset, w);
                }
            }
            Lookup::Directory => {
                if clean.ends_with('/') {
                    self.serve_index(ctx, clean, w);
                } else {
                    redirect(ctx, w, &format!("{clean}/"));
                }
            }
            Lookup::NotFound => response::write_404(w),
        }
    }

    /// Serve the first index file present in `dir`; directories are never listed
    fn serve_index(&self, ctx: &RequestContext, dir: &str, w: &mut impl ResponseWriter) {
        let index = self
            .index_files
            .iter()
            .find_map(|name| self.tree.resolve(&format!("{dir}{name}")));

        match index {
            Some(asset) => write_asset(ctx, asset, w),
            None => response::write_404(w),
        }
    }

    /// `/a/index.html` -> `/a/` when the name is one of the index files
    fn strip_index_name<'a>(&self, clean: &'a str) -> Option<&'a str> {
        self.index_files.iter().find_map(|name| {
            clean
                .strip_suffix(name.as_str())
                .filter(|dir| dir.ends_with('/'))
        })
    }
}

impl FileServer for StaticFiles {
    async fn serve<W: ResponseWriter + Send>(&self, ctx: &RequestContext, w: &mut W) {
        match ctx.method {
            Method::GET | Method::HEAD => self.serve_path(ctx, w),
            Method::OPTIONS => response::write_options(w),
            _ => {
                tracing::debug!(method = %ctx.method, path = %ctx.path, "method not allowed");
                response::write_405(w);
            }
        }
    }
}

/// Redirect to `target`, keeping the query string
fn redirect(ctx: &RequestContext, w: &mut impl ResponseWriter, target: &str) {
    let mut location = path::encode_path(target);
    if let Some(query) = ctx.query.as_deref() {
        location.push('?');
        location.push_str(query);
    }
    response::write_redirect(w, &location);
}

/// Write one asset, honouring conditional and range headers
fn write_asset(ctx: &RequestContext, asset: &Asset, w: &mut impl ResponseWriter) {
    set_header(w, ETAG, asset.etag());
    if let Some(modified) = asset.last_modified() {
        set_header(w, LAST_MODIFIED, &cache::format_http_date(modified));
    }
    w.headers_mut()
        .insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));

    // If-Modified-Since is only consulted without If-None-Match
    let not_modified = match ctx.if_none_match.as_deref() {
        Some(_) => cache::check_etag_match(ctx.if_none_match.as_deref(), asset.etag()),
        None => cache::check_not_modified_since(
            ctx.if_modified_since.as_deref(),
            asset.last_modified(),
        ),
    };
    if not_modified {
        response::write_304(w, asset.etag());
        return;
    }

    set_header(w, CONTENT_TYPE, asset.content_type());

    let total = asset.len();
    let body = match http::parse_range_header(ctx.range.as_deref(), total) {
        RangeParseResult::Valid(range) => {
            set_header(w, CONTENT_RANGE, &range.content_range(total));
            w.headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from(range.len()));
            w.write_status(StatusCode::PARTIAL_CONTENT);
            asset.data().slice(range.start..=range.end)
        }
        RangeParseResult::NotSatisfiable => {
            response::write_416(w, total);
            return;
        }
        RangeParseResult::None => {
            w.headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from(total));
            w.write_status(StatusCode::OK);
            asset.data()
        }
    };

    if !ctx.is_head() {
        w.write_body(body);
    }
}
