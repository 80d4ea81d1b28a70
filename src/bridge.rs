//! Bridge from `tracing` events to a [`Logger`].
//!
//! # Responsibilities
//! - Receive events from libraries instrumented with `tracing`
//! - Convert their recorded values into typed Fields
//! - Forward each event as one record to the wrapped Logger
//!
//! # Value mapping
//! ```text
//! u64          → uint
//! i64          → int
//! bool, f64    → any
//! &str, Debug  → string ("message" becomes the record message)
//! dyn Error    → error (source chain kept)
//! ```
//!
//! # Design Decisions
//! - TRACE has no Logger level: it is logged at debug with a
//!   `tracing_level = "trace"` field
//! - The event target is appended as a `target` field
//! - Span fields are not attached; only the event's own fields are logged

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use tracing::field::{Field as TracingField, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::field::Field;
use crate::level::Level;
use crate::logger::Logger;

/// `tracing_subscriber` layer that forwards events to a Logger.
pub struct LoggerLayer {
    logger: Arc<dyn Logger>,
}

impl LoggerLayer {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl<S: Subscriber> Layer<S> for LoggerLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        let level = map_level(*meta.level());
        let mut fields = collector.fields;
        if *meta.level() == tracing::Level::TRACE {
            fields.push(Field::string("tracing_level", "trace"));
        }
        fields.push(Field::string("target", meta.target()));

        self.logger.log(level, &collector.message, fields);
    }
}

fn map_level(level: tracing::Level) -> Level {
    if level == tracing::Level::ERROR {
        Level::Error
    } else if level == tracing::Level::WARN {
        Level::Warn
    } else if level == tracing::Level::INFO {
        Level::Info
    } else {
        Level::Debug
    }
}

#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: Vec<Field>,
}

impl Visit for FieldCollector {
    fn record_u64(&mut self, field: &TracingField, value: u64) {
        self.fields.push(Field::uint(field.name(), value));
    }

    fn record_i64(&mut self, field: &TracingField, value: i64) {
        self.fields.push(Field::int(field.name(), value));
    }

    fn record_bool(&mut self, field: &TracingField, value: bool) {
        self.fields.push(Field::any(field.name(), &value));
    }

    fn record_f64(&mut self, field: &TracingField, value: f64) {
        self.fields.push(Field::any(field.name(), &value));
    }

    fn record_str(&mut self, field: &TracingField, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(Field::string(field.name(), value));
        }
    }

    fn record_error(&mut self, _field: &TracingField, value: &(dyn StdError + 'static)) {
        self.fields.push(Field::error(CapturedError::capture(value)));
    }

    fn record_debug(&mut self, field: &TracingField, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(Field::string(field.name(), format!("{value:?}")));
        }
    }
}

/// Owned copy of a borrowed error and its source chain.
///
/// `tracing` lends errors without `Send + Sync`, so the text of each link
/// is captured up front.
#[derive(Debug)]
struct CapturedError {
    message: String,
    source: Option<Box<CapturedError>>,
}

impl CapturedError {
    fn capture(err: &(dyn StdError + 'static)) -> Self {
        Self {
            message: err.to_string(),
            source: err.source().map(|source| Box::new(Self::capture(source))),
        }
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for CapturedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_deref().map(|s| s as &(dyn StdError + 'static))
    }
}
