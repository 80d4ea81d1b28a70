//! Request inspection.
//!
//! # Responsibilities
//! - Read the request id assigned by an earlier layer
//!
//! # Design Decisions
//! - The request id comes from tower-http's `RequestId` extension, so any
//!   `SetRequestIdLayer` placed before the logging layer is picked up
//! - A missing, empty or non-UTF-8 id means "no id", never an empty field

use http::Request;
use tower_http::request_id::RequestId;

/// Request id set by an upstream `SetRequestIdLayer`, if any.
pub fn request_id<B>(req: &Request<B>) -> Option<&str> {
    req.extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .filter(|id| !id.is_empty())
}
