//! HTTP middleware for request/response logging with trace context.
//!
//! For every request not on the exclusion list it:
//! - extracts or generates a [`TraceContext`] and stores it in request extensions
//! - runs the handler inside an `http_request` span
//! - logs status and duration, warning on 4xx and slow requests, erroring on 5xx
//! - echoes the trace id back in the `x-trace-id` response header

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    time::Instant,
};
use tracing::{error, info, span, warn, Instrument, Level};

use crate::trace_context::{TraceContext, TRACE_ID_HEADER};

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub service_name: String,
    /// Path prefixes that bypass logging
    pub exclude_paths: Vec<String>,
    /// Threshold in ms for slow request warnings
    pub slow_request_threshold_ms: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "medisense".to_string(),
            exclude_paths: vec!["/health".to_string(), "/favicon.ico".to_string()],
            // a chat turn waits on several remote calls, so the bar is high
            slow_request_threshold_ms: 10_000,
        }
    }
}

impl ObservabilityConfig {
    pub fn for_service(name: impl Into<String>) -> Self {
        Self {
            service_name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_slow_threshold(mut self, ms: u64) -> Self {
        self.slow_request_threshold_ms = ms;
        self
    }

    pub fn exclude_path(mut self, path: impl Into<String>) -> Self {
        self.exclude_paths.push(path.into());
        self
    }
}

#[derive(Clone)]
pub struct ObservabilityMiddleware {
    config: ObservabilityConfig,
}

impl ObservabilityMiddleware {
    pub fn new(config: ObservabilityConfig) -> Self {
        Self { config }
    }

    pub fn for_service(name: impl Into<String>) -> Self {
        Self::new(ObservabilityConfig::for_service(name))
    }
}

impl<S, B> Transform<S, ServiceRequest> for ObservabilityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ObservabilityMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ObservabilityMiddlewareService {
            service: Rc::new(service),
            config: self.config.clone(),
        }))
    }
}

pub struct ObservabilityMiddlewareService<S> {
    service: Rc<S>,
    config: ObservabilityConfig,
}

impl<S, B> Service<ServiceRequest> for ObservabilityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let config = self.config.clone();
        let service = self.service.clone();

        Box::pin(async move {
            let path = req.path().to_string();
            let method = req.method().to_string();

            if config.exclude_paths.iter().any(|p| path.starts_with(p.as_str())) {
                return service.call(req).await;
            }

            let trace_ctx = TraceContext::from_headers(req.headers());
            req.extensions_mut().insert(trace_ctx.clone());

            let request_span = span!(
                Level::INFO,
                "http_request",
                trace_id = %trace_ctx.trace_id,
                method = %method,
                path = %path,
                service = %config.service_name,
            );

            let start = Instant::now();
            let result = service.call(req).instrument(request_span).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(mut res) => {
                    let status_code = res.status().as_u16();

                    if status_code >= 500 {
                        error!(trace_id = %trace_ctx.trace_id, status = status_code, duration_ms,
                            "← {} {} {} {}ms", method, path, status_code, duration_ms);
                    } else if status_code >= 400 {
                        warn!(trace_id = %trace_ctx.trace_id, status = status_code, duration_ms,
                            "← {} {} {} {}ms", method, path, status_code, duration_ms);
                    } else if duration_ms > config.slow_request_threshold_ms {
                        warn!(trace_id = %trace_ctx.trace_id, status = status_code, duration_ms,
                            "← SLOW {} {} {} {}ms", method, path, status_code, duration_ms);
                    } else {
                        info!(trace_id = %trace_ctx.trace_id, status = status_code, duration_ms,
                            "← {} {} {} {}ms", method, path, status_code, duration_ms);
                    }

                    if let Ok(value) = HeaderValue::from_str(&trace_ctx.trace_id) {
                        res.headers_mut()
                            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                    }

                    Ok(res)
                }
                Err(e) => {
                    error!(
                        trace_id = %trace_ctx.trace_id,
                        duration_ms,
                        error = %e,
                        "← {} {} ERROR {}ms",
                        method, path, duration_ms
                    );
                    Err(e)
                }
            }
        })
    }
}

/// Helper to create observability middleware for a service
pub fn observability(service_name: impl Into<String>) -> ObservabilityMiddleware {
    ObservabilityMiddleware::for_service(service_name)
}
