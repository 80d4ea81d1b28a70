//! HTTP request logging subsystem.
//!
//! # Data Flow
//! ```text
//! Request
//!     → [SetRequestIdLayer assigns an id] (optional)
//!     → request_log.rs (capture start time, method, uri, request id)
//!     → inner service
//!     → body.rs (count bytes as the body streams out)
//!     → end of body / error / drop
//!     → one "request completed" record through the Logger
//! ```

pub mod body;
pub mod request;
pub mod request_log;

pub use body::LoggedBody;
pub use request::request_id;
pub use request_log::{RequestLog, RequestLogLayer, REQUEST_COMPLETED};
