//! Structured logging with typed fields and HTTP request logging.

pub mod adapter;
pub mod backend;
pub mod bridge;
pub mod config;
pub mod field;
pub mod http;
pub mod level;
pub mod logger;
pub mod memory;

pub use adapter::BackendAdapter;
pub use backend::{Backend, Format};
pub use bridge::LoggerLayer;
pub use config::{AppConfig, ConfigError};
pub use field::{Field, Kind, Value};
pub use http::{RequestLog, RequestLogLayer};
pub use level::Level;
pub use logger::{Logger, NopLogger};
pub use memory::MemoryLogger;
