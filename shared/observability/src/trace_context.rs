//! Trace id propagation for chat requests.
//!
//! Accepts a caller-supplied `x-trace-id` or W3C `traceparent` header and
//! falls back to a fresh uuid.

use actix_web::{http::header::HeaderMap, HttpMessage, HttpRequest};
use std::fmt;
use uuid::Uuid;

pub const TRACE_ID_HEADER: &str = "x-trace-id";
pub const W3C_TRACEPARENT_HEADER: &str = "traceparent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: String,
}

impl TraceContext {
    pub fn new() -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Extract the trace id from request headers, generating one if absent
    pub fn from_headers(headers: &HeaderMap) -> Self {
        if let Some(trace_id) = headers
            .get(W3C_TRACEPARENT_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_traceparent)
        {
            return Self { trace_id };
        }

        headers
            .get(TRACE_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| Self {
                trace_id: id.to_string(),
            })
            .unwrap_or_default()
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trace_id={}", self.trace_id)
    }
}

/// Format: version-trace_id-parent_id-flags (e.g. "00-abc-def-01")
fn parse_traceparent(value: &str) -> Option<String> {
    let parts: Vec<&str> = value.split('-').collect();
    match parts.as_slice() {
        [_, trace_id, _, ..] if !trace_id.is_empty() => Some(trace_id.to_string()),
        _ => None,
    }
}

/// Trace context stored by the middleware, or a fresh one
pub fn get_trace_context(req: &HttpRequest) -> TraceContext {
    req.extensions()
        .get::<TraceContext>()
        .cloned()
        .unwrap_or_else(|| TraceContext::from_headers(req.headers()))
}
