//! Logger implementation on top of [`Backend`].
//!
//! # Responsibilities
//! - Translate each [`Field`] into exactly one backend [`Attr`], in order
//! - Delegate to the backend's leveled call matching the record level
//! - Swallow emission and flush errors
//!
//! # Design Decisions
//! - Translation is an exhaustive `match` on the field payload: adding a kind
//!   without an arm here is a compile error
//! - Width is preserved: `uint8` maps to the backend's 8-bit attribute
//! - Error fields go to the backend's error attribute, which owns its key
//! - Disabled levels are skipped before any translation work
//! - The emission path is `#[track_caller]` end to end, so the backend's
//!   `caller` is the code that called the Logger

use crate::backend::{Attr, Backend, Format};
use crate::config::{ConfigError, LoggingConfig};
use crate::field::{Field, Value};
use crate::level::Level;
use crate::logger::Logger;

/// [`Logger`] that renders records through a [`Backend`].
#[derive(Debug)]
pub struct BackendAdapter {
    backend: Backend,
}

impl BackendAdapter {
    /// Wrap an already configured backend.
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Build an adapter writing to stdout.
    ///
    /// `format` is `console` or `json`; `level` is one of `debug`, `info`,
    /// `warn` or `error`. Console output at `debug` level is colored.
    pub fn from_config(format: &str, level: &str) -> Result<Self, ConfigError> {
        let format: Format = format.parse()?;
        let level: Level = level.parse()?;
        Ok(Self::new(Backend::stdout(format, level)))
    }

    pub fn from_logging_config(config: &LoggingConfig) -> Result<Self, ConfigError> {
        Self::from_config(&config.format, &config.level)
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    #[track_caller]
    fn emit(&self, level: Level, message: &str, fields: &[Field]) {
        if !self.backend.enabled(level) {
            return;
        }

        let attrs = translate(fields);
        let _ = match level {
            Level::Debug => self.backend.debug(message, &attrs),
            Level::Info => self.backend.info(message, &attrs),
            Level::Warn => self.backend.warn(message, &attrs),
            Level::Error => self.backend.error(message, &attrs),
        };
    }
}

impl Logger for BackendAdapter {
    #[track_caller]
    fn debug(&self, message: &str, fields: Vec<Field>) {
        self.emit(Level::Debug, message, &fields);
    }

    #[track_caller]
    fn info(&self, message: &str, fields: Vec<Field>) {
        self.emit(Level::Info, message, &fields);
    }

    #[track_caller]
    fn warn(&self, message: &str, fields: Vec<Field>) {
        self.emit(Level::Warn, message, &fields);
    }

    #[track_caller]
    fn error(&self, message: &str, fields: Vec<Field>) {
        self.emit(Level::Error, message, &fields);
    }

    fn flush(&self) {
        let _ = self.backend.sync();
    }
}

/// Map fields onto backend attributes, one to one and in order.
pub(crate) fn translate(fields: &[Field]) -> Vec<Attr<'_>> {
    fields
        .iter()
        .map(|field| {
            let key = field.key();
            match field.value() {
                Value::Any(value) => Attr::any(key, value),
                Value::Error(err) => Attr::error(&**err),
                Value::String(value) => Attr::string(key, value),
                Value::Uint(value) => Attr::uint64(key, *value),
                Value::Uint8(value) => Attr::uint8(key, *value),
                Value::Int(value) => Attr::int64(key, *value),
                Value::Time(value) => Attr::time(key, *value),
                Value::Duration(value) => Attr::duration(key, *value),
            }
        })
        .collect()
}
