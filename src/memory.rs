//! In-memory logger.
//!
//! Captures records instead of writing them anywhere, for tests and for
//! inspecting what a component logs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::field::Field;
use crate::level::Level;
use crate::logger::Logger;

/// A captured log call.
#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    pub message: String,
    pub fields: Vec<Field>,
}

impl Record {
    /// First field with the given key.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key() == key)
    }

    /// Field keys in emission order.
    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(Field::key).collect()
    }
}

/// Logger that keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<Record>>,
    flushes: AtomicUsize,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records captured so far.
    pub fn records(&self) -> Vec<Record> {
        self.lock().clone()
    }

    /// Take all captured records, leaving the logger empty.
    pub fn drain(&self) -> Vec<Record> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of times `flush` was called.
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, level: Level, message: &str, fields: Vec<Field>) {
        self.lock().push(Record {
            level,
            message: message.to_string(),
            fields,
        });
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str, fields: Vec<Field>) {
        self.push(Level::Debug, message, fields);
    }

    fn info(&self, message: &str, fields: Vec<Field>) {
        self.push(Level::Info, message, fields);
    }

    fn warn(&self, message: &str, fields: Vec<Field>) {
        self.push(Level::Warn, message, fields);
    }

    fn error(&self, message: &str, fields: Vec<Field>) {
        self.push(Level::Error, message, fields);
    }

    fn flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }
}
