//! Request pipeline
//!
//! One fixed composition, built once at startup and shared by every
//! connection:
//!
//! 1. wrap a fresh response in a [`CapturingWriter`]
//! 2. set the cross-origin isolation headers and the `Cache-Control` directive
//! 3. hand the request to the [`FileServer`]
//! 4. record one access log entry from what the capture observed
//!
//! Headers are set before the file server can commit a status, and the log
//! entry is only built after it returns, so status and latency are final.

pub mod cache_policy;
pub mod capture;
pub mod isolation;

use std::future::Future;
use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::CACHE_CONTROL;
use hyper::{Request, Response};

use crate::handler::{RequestContext, StaticFiles};
use crate::http::{BufferedResponse, ResponseWriter};
use crate::logger::{AccessLogEntry, AccessSink, TracingSink};

pub use cache_policy::CachePolicy;
pub use capture::{CaptureState, CapturingWriter};
pub use isolation::apply_isolation_headers;

/// The file-serving stage of the pipeline
pub trait FileServer: Send + Sync + 'static {
    /// Write the complete response for `ctx` into `w`
    fn serve<W: ResponseWriter + Send>(
        &self,
        ctx: &RequestContext,
        w: &mut W,
    ) -> impl Future<Output = ()> + Send;
}

/// The composed request handler
#[derive(Debug)]
pub struct Pipeline<S = StaticFiles, L = Option<TracingSink>> {
    server: S,
    cache_policy: CachePolicy,
    access_log: L,
}

impl<S: FileServer, L: AccessSink> Pipeline<S, L> {
    pub const fn new(server: S, cache_policy: CachePolicy, access_log: L) -> Self {
        Self {
            server,
            cache_policy,
            access_log,
        }
    }

    pub const fn server(&self) -> &S {
        &self.server
    }

    pub const fn access_log(&self) -> &L {
        &self.access_log
    }

    /// Handle one request end to end
    ///
    /// The request is only read up front, so the returned future does not
    /// borrow it.
    pub fn handle<B>(
        &self,
        req: &Request<B>,
        remote_addr: Option<SocketAddr>,
    ) -> impl Future<Output = Response<Full<Bytes>>> + Send + '_ {
        self.respond(RequestContext::from_request(req, remote_addr))
    }

    /// Run the pipeline for an already extracted request
    pub async fn respond(&self, ctx: RequestContext) -> Response<Full<Bytes>> {
        let mut w = CapturingWriter::new(BufferedResponse::new());

        let headers = w.headers_mut();
        apply_isolation_headers(headers);
        if let Some(directive) = self.cache_policy.classify(ctx.policy_path()) {
            headers.insert(CACHE_CONTROL, directive.clone());
        }

        self.server.serve(&ctx, &mut w).await;

        let (response, capture) = w.into_parts();
        if self.access_log.enabled() {
            self.access_log
                .record(&AccessLogEntry::from_request(&ctx, &capture));
        }
        response.into_response()
    }
}
