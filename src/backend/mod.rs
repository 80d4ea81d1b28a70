//! Structured logging backend.
//!
//! # Data Flow
//! ```text
//! leveled call (msg, &[Attr])
//!     → level check (records below the minimum are dropped)
//!     → caller location, stack trace at the stack level
//!     → encoder.rs (console or JSON bytes, one line per record)
//!     → sink (single write_all under the sink lock)
//! sync()
//!     → sink flush
//! ```
//!
//! # Design Decisions
//! - Every call returns the sink's I/O result; callers decide whether to
//!   surface it
//! - The sink lock is held for one write only; encoding happens outside it
//! - A poisoned sink lock is recovered, never propagated as a panic
//! - Leveled calls are `#[track_caller]`: the reported caller is the first
//!   frame outside the logging chain, not this module
//! - Nothing in here emits `tracing` events: the tracing bridge may route
//!   those events back into this backend

pub mod attr;
pub mod encoder;

use std::backtrace::Backtrace;
use std::fmt;
use std::io::{self, Write};
use std::panic::Location;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

pub use attr::{Attr, AttrValue, ERROR_KEY};
pub use encoder::Format;

use crate::level::Level;
use encoder::{Encoder, Entry};

/// A leveled, typed-attribute logging engine writing to one sink.
pub struct Backend {
    level: Level,
    encoder: Encoder,
    caller: bool,
    stack_level: Option<Level>,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl Backend {
    /// Create a backend writing to `sink`.
    ///
    /// Console output is colored when the minimum level is `debug`. Records
    /// carry their caller, and error records a stack trace.
    pub fn new(format: Format, level: Level, sink: impl Write + Send + 'static) -> Self {
        let color = format == Format::Console && level == Level::Debug;
        Self {
            level,
            encoder: Encoder::new(format, color),
            caller: true,
            stack_level: Some(Level::Error),
            sink: Mutex::new(Box::new(sink)),
        }
    }

    /// Create a backend writing to standard output.
    pub fn stdout(format: Format, level: Level) -> Self {
        Self::new(format, level, io::stdout())
    }

    /// Override the console coloring decision.
    pub fn with_color(mut self, color: bool) -> Self {
        self.encoder = Encoder::new(self.encoder.format(), color);
        self
    }

    /// Toggle the `caller` key.
    pub fn with_caller(mut self, caller: bool) -> Self {
        self.caller = caller;
        self
    }

    /// Records at or above `level` carry a `stack` trace; `None` disables it.
    pub fn with_stacktrace(mut self, level: Option<Level>) -> Self {
        self.stack_level = level;
        self
    }

    /// Minimum level written by this backend.
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn format(&self) -> Format {
        self.encoder.format()
    }

    /// Whether a record at `level` would be written.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    #[track_caller]
    pub fn debug(&self, msg: &str, attrs: &[Attr<'_>]) -> io::Result<()> {
        self.write(Level::Debug, Location::caller(), msg, attrs)
    }

    #[track_caller]
    pub fn info(&self, msg: &str, attrs: &[Attr<'_>]) -> io::Result<()> {
        self.write(Level::Info, Location::caller(), msg, attrs)
    }

    #[track_caller]
    pub fn warn(&self, msg: &str, attrs: &[Attr<'_>]) -> io::Result<()> {
        self.write(Level::Warn, Location::caller(), msg, attrs)
    }

    #[track_caller]
    pub fn error(&self, msg: &str, attrs: &[Attr<'_>]) -> io::Result<()> {
        self.write(Level::Error, Location::caller(), msg, attrs)
    }

    /// Flush the sink.
    pub fn sync(&self) -> io::Result<()> {
        self.lock().flush()
    }

    fn write(
        &self,
        level: Level,
        caller: &Location<'_>,
        msg: &str,
        attrs: &[Attr<'_>],
    ) -> io::Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }

        let stack = self
            .stack_level
            .filter(|min| level >= *min)
            .map(|_| Backtrace::force_capture().to_string());
        let entry = Entry {
            ts: Utc::now(),
            level,
            caller: self.caller.then_some(caller),
            msg,
            stack: stack.as_deref(),
        };

        let mut buf = Vec::with_capacity(256);
        self.encoder.encode(&mut buf, &entry, attrs);
        self.lock().write_all(&buf)
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("level", &self.level)
            .field("format", &self.encoder.format())
            .field("caller", &self.caller)
            .field("stack_level", &self.stack_level)
            .finish_non_exhaustive()
    }
}
