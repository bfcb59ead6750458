//! Access log format module
//!
//! Supports multiple log formats:
//! - `structured` (logfmt-style `key=value` pairs, the default)
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//! - Custom patterns with variables

use std::time::Duration;

use chrono::{DateTime, Local};
use hyper::Version;

use crate::handler::RequestContext;
use crate::pipeline::capture::CaptureState;

/// Access log entry containing all request/response information
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client address, `-` when unknown
    pub remote_addr: String,
    /// Request timestamp
    pub time: DateTime<Local>,
    /// HTTP method (GET, HEAD, etc.)
    pub method: String,
    /// Request URI path, as received
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// HTTP version (1.0, 1.1, 2)
    pub http_version: &'static str,
    /// Response status code
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: usize,
    /// Referer header
    pub referer: Option<String>,
    /// User-Agent header
    pub user_agent: Option<String>,
    /// Wall-clock handling time
    pub latency: Duration,
}

impl AccessLogEntry {
    /// Build the record for a finished request
    pub fn from_request(ctx: &RequestContext, capture: &CaptureState) -> Self {
        Self {
            remote_addr: ctx
                .remote_addr
                .map_or_else(|| "-".to_string(), |addr| addr.ip().to_string()),
            time: Local::now(),
            method: ctx.method.to_string(),
            path: ctx.path.clone(),
            query: ctx.query.clone(),
            http_version: version_str(ctx.version),
            status: capture.status_or_default().as_u16(),
            // hyper discards whatever body a HEAD response was given
            body_bytes: if ctx.is_head() { 0 } else { capture.body_bytes() },
            referer: ctx.referer.clone(),
            user_agent: ctx.user_agent.clone(),
            latency: capture.elapsed(),
        }
    }

    /// Latency in whole microseconds
    pub fn latency_us(&self) -> u64 {
        u64::try_from(self.latency.as_micros()).unwrap_or(u64::MAX)
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &AccessLogFormat) -> String {
        match format {
            AccessLogFormat::Structured => self.format_structured(),
            AccessLogFormat::Combined => self.format_combined(),
            AccessLogFormat::Common => self.format_common(),
            AccessLogFormat::Json => self.format_json(),
            AccessLogFormat::Custom(pattern) => self.format_custom(pattern),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn time_local(&self) -> String {
        self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string()
    }

    /// `key=value` pairs; values containing spaces or quotes are quoted
    fn format_structured(&self) -> String {
        format!(
            "method={} path={} user_agent={} status_code={} latency_us={} body_bytes={} remote_addr={}",
            self.method,
            logfmt_value(&self.request_uri()),
            logfmt_value(self.user_agent.as_deref().unwrap_or("-")),
            self.status,
            self.latency_us(),
            self.body_bytes,
            self.remote_addr,
        )
    }

    /// Apache/Nginx Combined Log Format
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent "$http_referer" "$http_user_agent"`
    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" \"{}\"",
            self.format_common(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    /// Common Log Format (CLF)
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time_local(),
            self.method,
            self.request_uri(),
            self.http_version,
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "latency_us": self.latency_us(),
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables:
    /// - `$remote_addr` - Client IP address
    /// - `$time_local` - Local time in Common Log Format
    /// - `$time_iso8601` - ISO 8601 timestamp
    /// - `$request` - Full request line ("METHOD /path HTTP/version")
    /// - `$request_method` - HTTP method
    /// - `$request_uri` - Request URI with query string
    /// - `$status` - Response status code
    /// - `$body_bytes_sent` - Response body size
    /// - `$http_referer` - Referer header
    /// - `$http_user_agent` - User-Agent header
    /// - `$request_time` - Request processing time in seconds (3 decimal places)
    fn format_custom(&self, pattern: &str) -> String {
        // Single pass: substituted values are never rescanned for variables
        let mut out = String::with_capacity(pattern.len());
        let mut rest = pattern;
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let name_len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            let name = &after[..name_len];
            match self.variable(name) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('$');
                    out.push_str(name);
                }
            }
            rest = &after[name_len..];
        }
        out.push_str(rest);
        out
    }

    /// Value of one custom-format variable, `None` when unknown
    fn variable(&self, name: &str) -> Option<String> {
        let value = match name {
            "remote_addr" => self.remote_addr.clone(),
            "time_local" => self.time_local(),
            "time_iso8601" => self.time.to_rfc3339(),
            "request_time" => format!("{:.3}", self.latency.as_secs_f64()),
            "request_method" => self.method.clone(),
            "request_uri" => self.request_uri(),
            "request" => format!(
                "{} {} HTTP/{}",
                self.method,
                self.request_uri(),
                self.http_version
            ),
            "status" => self.status.to_string(),
            "body_bytes_sent" => self.body_bytes.to_string(),
            "http_referer" => self.referer.as_deref().unwrap_or("-").to_string(),
            "http_user_agent" => self.user_agent.as_deref().unwrap_or("-").to_string(),
            _ => return None,
        };
        Some(value)
    }
}

/// Output format selected by `logging.access_log_format`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccessLogFormat {
    #[default]
    Structured,
    Combined,
    Common,
    Json,
    Custom(String),
}

impl From<&str> for AccessLogFormat {
    fn from(value: &str) -> Self {
        match value {
            "structured" => Self::Structured,
            "combined" => Self::Combined,
            "common" => Self::Common,
            "json" => Self::Json,
            custom => Self::Custom(custom.to_string()),
        }
    }
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

fn logfmt_value(value: &str) -> String {
    if value.is_empty() || value.contains([' ', '"', '=']) {
        format!("{value:?}")
    } else {
        value.to_string()
    }
}
