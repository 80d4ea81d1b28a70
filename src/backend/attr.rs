//! Backend-native typed attributes.
//!
//! Attributes borrow from the record being emitted; they live only for the
//! duration of one emission call.

use std::error::Error as StdError;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Key under which error attributes are written.
pub const ERROR_KEY: &str = "error";

/// Typed payload of an [`Attr`].
#[derive(Debug, Clone, Copy)]
pub enum AttrValue<'a> {
    Any(&'a serde_json::Value),
    Error(&'a (dyn StdError + Send + Sync + 'static)),
    String(&'a str),
    Uint64(u64),
    Uint8(u8),
    Int64(i64),
    Time(DateTime<Utc>),
    Duration(Duration),
}

/// A single typed attribute accepted by [`Backend`](super::Backend).
#[derive(Debug, Clone, Copy)]
pub struct Attr<'a> {
    key: &'a str,
    value: AttrValue<'a>,
}

impl<'a> Attr<'a> {
    /// Arbitrary value, rendered as-is.
    pub fn any(key: &'a str, value: &'a serde_json::Value) -> Self {
        Self { key, value: AttrValue::Any(value) }
    }

    /// Error, always keyed [`ERROR_KEY`]. Its source chain is rendered too.
    pub fn error(err: &'a (dyn StdError + Send + Sync + 'static)) -> Self {
        Self { key: ERROR_KEY, value: AttrValue::Error(err) }
    }

    pub fn string(key: &'a str, value: &'a str) -> Self {
        Self { key, value: AttrValue::String(value) }
    }

    pub fn uint64(key: &'a str, value: u64) -> Self {
        Self { key, value: AttrValue::Uint64(value) }
    }

    pub fn uint8(key: &'a str, value: u8) -> Self {
        Self { key, value: AttrValue::Uint8(value) }
    }

    pub fn int64(key: &'a str, value: i64) -> Self {
        Self { key, value: AttrValue::Int64(value) }
    }

    pub fn time(key: &'a str, value: DateTime<Utc>) -> Self {
        Self { key, value: AttrValue::Time(value) }
    }

    pub fn duration(key: &'a str, value: Duration) -> Self {
        Self { key, value: AttrValue::Duration(value) }
    }

    pub fn key(&self) -> &'a str {
        self.key
    }

    pub fn value(&self) -> &AttrValue<'a> {
        &self.value
    }
}
