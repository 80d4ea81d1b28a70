//! Request logging middleware.
//!
//! # Responsibilities
//! - Time each request from arrival to the end of its response body
//! - Observe the final status code and the number of body bytes sent
//! - Emit exactly one Info record per request through the injected logger
//!
//! # Record layout
//! ```text
//! "request completed"
//!     time      start of the request (timestamp)
//!     req_id    only when an upstream layer assigned one
//!     method
//!     uri       path and query, even for absolute-form targets
//!     status    0 when the inner service failed without a response
//!     bytes     data bytes of the response body
//!     duration
//! ```
//!
//! # Design Decisions
//! - Status codes are reported, never interpreted
//! - Per-request state lives in the response future and body; the layer
//!   itself only holds the shared logger

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use http::{Request, Response};
use http_body::Body;
use tower::{Layer, Service};

use crate::field::Field;
use crate::http::body::LoggedBody;
use crate::http::request::request_id;
use crate::logger::Logger;

/// Message of the per-request record.
pub const REQUEST_COMPLETED: &str = "request completed";

/// Layer that logs every completed request.
#[derive(Clone)]
pub struct RequestLogLayer {
    logger: Arc<dyn Logger>,
}

impl RequestLogLayer {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for RequestLogLayer {
    type Service = RequestLog<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLog {
            inner,
            logger: self.logger.clone(),
        }
    }
}

/// Service produced by [`RequestLogLayer`].
#[derive(Clone)]
pub struct RequestLog<S> {
    inner: S,
    logger: Arc<dyn Logger>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestLog<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ResBody: Body + Send + 'static,
{
    type Response = Response<LoggedBody<ResBody>>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let pending = PendingRecord::capture(self.logger.clone(), &req);
        let future = self.inner.call(req);

        Box::pin(async move {
            match future.await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let (parts, body) = response.into_parts();
                    Ok(Response::from_parts(parts, LoggedBody::new(body, status, pending)))
                }
                Err(err) => {
                    pending.emit(0, 0);
                    Err(err)
                }
            }
        })
    }
}

/// Everything known about a request before its response is complete.
pub(crate) struct PendingRecord {
    logger: Arc<dyn Logger>,
    time: DateTime<Utc>,
    started: Instant,
    request_id: Option<String>,
    method: String,
    uri: String,
}

impl PendingRecord {
    pub(crate) fn capture<B>(logger: Arc<dyn Logger>, req: &Request<B>) -> Self {
        Self {
            logger,
            time: Utc::now(),
            started: Instant::now(),
            request_id: request_id(req).map(str::to_owned),
            method: req.method().to_string(),
            uri: req
                .uri()
                .path_and_query()
                .map_or_else(|| req.uri().to_string(), ToString::to_string),
        }
    }

    pub(crate) fn emit(self, status: u16, bytes: u64) {
        let mut fields = Vec::with_capacity(7);
        fields.push(Field::time("time", self.time));
        if let Some(id) = self.request_id {
            fields.push(Field::string("req_id", id));
        }
        fields.push(Field::string("method", self.method));
        fields.push(Field::string("uri", self.uri));
        fields.push(Field::uint("status", u64::from(status)));
        fields.push(Field::uint("bytes", bytes));
        fields.push(Field::duration("duration", self.started.elapsed()));

        self.logger.info(REQUEST_COMPLETED, fields);
    }
}
