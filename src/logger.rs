//! The logging capability every caller depends on.
//!
//! # Design Decisions
//! - Emission never returns an error: logging must not abort business logic
//! - Fields are passed by value and consumed by the implementation
//! - `flush` is best-effort; a failed flush has no recovery at the call site
//! - Leveled methods are `#[track_caller]` so implementations can report
//!   where the record came from

use std::sync::Arc;

use crate::field::Field;
use crate::level::Level;

/// Leveled, structured logger.
///
/// Implementations must be safe to call concurrently from many tasks.
/// Fields keep their order and duplicate keys are passed through.
pub trait Logger: Send + Sync {
    #[track_caller]
    fn debug(&self, message: &str, fields: Vec<Field>);

    #[track_caller]
    fn info(&self, message: &str, fields: Vec<Field>);

    #[track_caller]
    fn warn(&self, message: &str, fields: Vec<Field>);

    #[track_caller]
    fn error(&self, message: &str, fields: Vec<Field>);

    /// Force buffered output to its sink, discarding any error.
    fn flush(&self);

    /// Dispatch to the leveled method matching `level`.
    #[track_caller]
    fn log(&self, level: Level, message: &str, fields: Vec<Field>) {
        match level {
            Level::Debug => self.debug(message, fields),
            Level::Info => self.info(message, fields),
            Level::Warn => self.warn(message, fields),
            Level::Error => self.error(message, fields),
        }
    }
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    #[track_caller]
    fn debug(&self, message: &str, fields: Vec<Field>) {
        (**self).debug(message, fields)
    }

    #[track_caller]
    fn info(&self, message: &str, fields: Vec<Field>) {
        (**self).info(message, fields)
    }

    #[track_caller]
    fn warn(&self, message: &str, fields: Vec<Field>) {
        (**self).warn(message, fields)
    }

    #[track_caller]
    fn error(&self, message: &str, fields: Vec<Field>) {
        (**self).error(message, fields)
    }

    fn flush(&self) {
        (**self).flush()
    }
}

impl<L: Logger + ?Sized> Logger for &L {
    #[track_caller]
    fn debug(&self, message: &str, fields: Vec<Field>) {
        (**self).debug(message, fields)
    }

    #[track_caller]
    fn info(&self, message: &str, fields: Vec<Field>) {
        (**self).info(message, fields)
    }

    #[track_caller]
    fn warn(&self, message: &str, fields: Vec<Field>) {
        (**self).warn(message, fields)
    }

    #[track_caller]
    fn error(&self, message: &str, fields: Vec<Field>) {
        (**self).error(message, fields)
    }

    fn flush(&self) {
        (**self).flush()
    }
}

/// Logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopLogger;

impl Logger for NopLogger {
    fn debug(&self, _message: &str, _fields: Vec<Field>) {}

    fn info(&self, _message: &str, _fields: Vec<Field>) {}

    fn warn(&self, _message: &str, _fields: Vec<Field>) {}

    fn error(&self, _message: &str, _fields: Vec<Field>) {}

    fn flush(&self) {}
}
