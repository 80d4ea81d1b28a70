//! Typed log attributes.
//!
//! # Responsibilities
//! - Represent one key/value attribute of a log record
//! - Keep the payload type tied to its kind
//!
//! # Design Decisions
//! - The payload is a closed enum; the variant *is* the kind, so a field can
//!   never carry a value of the wrong type
//! - Fields are only built through constructors; internals are private
//! - `uint8` keeps its 8-bit width all the way to the backend
//!
//! # Adding a kind
//! A new kind needs three things: a [`Value`] variant with its constructor
//! here, a [`Kind`] entry, and an arm in the adapter's translation
//! (`adapter::translate`). The exhaustive `match` there and the
//! `all_kinds_are_mapped` test fail until the arm exists.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Shared, thread-safe error payload.
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// Discriminator of a [`Field`]'s payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Any,
    Error,
    String,
    Uint,
    Uint8,
    Int,
    Time,
    Duration,
}

impl Kind {
    /// Every kind, in declaration order.
    pub const ALL: [Kind; 8] = [
        Kind::Any,
        Kind::Error,
        Kind::String,
        Kind::Uint,
        Kind::Uint8,
        Kind::Int,
        Kind::Time,
        Kind::Duration,
    ];
}

/// Payload of a [`Field`].
#[derive(Debug, Clone)]
pub enum Value {
    /// Arbitrary serializable value, captured as JSON.
    Any(serde_json::Value),
    Error(SharedError),
    String(String),
    Uint(u64),
    Uint8(u8),
    Int(i64),
    Time(DateTime<Utc>),
    Duration(Duration),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Any(_) => Kind::Any,
            Value::Error(_) => Kind::Error,
            Value::String(_) => Kind::String,
            Value::Uint(_) => Kind::Uint,
            Value::Uint8(_) => Kind::Uint8,
            Value::Int(_) => Kind::Int,
            Value::Time(_) => Kind::Time,
            Value::Duration(_) => Kind::Duration,
        }
    }
}

/// One typed attribute of a log record.
#[derive(Debug, Clone)]
pub struct Field {
    key: Cow<'static, str>,
    value: Value,
}

impl Field {
    /// Attribute of any serializable type.
    ///
    /// The value is captured through serde. A value serde cannot represent
    /// (e.g. a map with non-string keys) is recorded as the serializer's
    /// error message rather than dropped.
    pub fn any<T: Serialize + ?Sized>(key: impl Into<Cow<'static, str>>, value: &T) -> Self {
        let value = serde_json::to_value(value)
            .unwrap_or_else(|err| serde_json::Value::String(format!("<unserializable: {err}>")));
        Self::new(key, Value::Any(value))
    }

    /// Error attribute. The key is implied by the backend.
    pub fn error<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        let err: Box<dyn StdError + Send + Sync + 'static> = err.into();
        Self::new("", Value::Error(Arc::from(err)))
    }

    /// Error attribute from an already shared error.
    pub fn shared_error(err: SharedError) -> Self {
        Self::new("", Value::Error(err))
    }

    pub fn string(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    pub fn uint(key: impl Into<Cow<'static, str>>, value: u64) -> Self {
        Self::new(key, Value::Uint(value))
    }

    pub fn uint8(key: impl Into<Cow<'static, str>>, value: u8) -> Self {
        Self::new(key, Value::Uint8(value))
    }

    pub fn int(key: impl Into<Cow<'static, str>>, value: i64) -> Self {
        Self::new(key, Value::Int(value))
    }

    /// Timestamp attribute. Accepts `DateTime<Utc>` or `SystemTime`.
    pub fn time(key: impl Into<Cow<'static, str>>, value: impl Into<DateTime<Utc>>) -> Self {
        Self::new(key, Value::Time(value.into()))
    }

    pub fn duration(key: impl Into<Cow<'static, str>>, value: Duration) -> Self {
        Self::new(key, Value::Duration(value))
    }

    fn new(key: impl Into<Cow<'static, str>>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> Kind {
        self.value.kind()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fmt;
    use std::time::SystemTime;

    #[derive(Debug)]
    struct CustomError;

    impl fmt::Display for CustomError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("test")
        }
    }

    impl StdError for CustomError {}

    #[derive(Serialize)]
    struct Payload {
        test: i32,
    }

    #[test]
    fn test_any_accepts_every_shape() {
        let cases = vec![
            (Field::any("test", &5), serde_json::json!(5)),
            (Field::any("test", "lax"), serde_json::json!("lax")),
            (Field::any("test", &vec![5]), serde_json::json!([5])),
            (Field::any("test", &vec!["lax"]), serde_json::json!(["lax"])),
            (
                Field::any("test", &HashMap::from([("lax", 5)])),
                serde_json::json!({"lax": 5}),
            ),
            (Field::any("test", &Payload { test: 5 }), serde_json::json!({"test": 5})),
            (Field::any("test", &Option::<u8>::None), serde_json::Value::Null),
        ];

        for (field, want) in cases {
            assert_eq!(field.key(), "test");
            assert_eq!(field.kind(), Kind::Any);
            match field.value() {
                Value::Any(got) => assert_eq!(got, &want),
                other => panic!("unexpected value {other:?}"),
            }
        }
    }

    #[test]
    fn test_any_with_unserializable_value_is_kept() {
        let map = HashMap::from([((1, 2), "pair")]);
        let field = Field::any("map", &map);
        assert_eq!(field.kind(), Kind::Any);
        match field.value() {
            Value::Any(serde_json::Value::String(s)) => assert!(s.starts_with("<unserializable")),
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_error_has_empty_key() {
        let from_io = Field::error(std::io::Error::other("test"));
        let custom = Field::error(CustomError);
        let from_str = Field::error("test");

        for field in [from_io, custom, from_str] {
            assert_eq!(field.key(), "");
            assert_eq!(field.kind(), Kind::Error);
            match field.value() {
                Value::Error(err) => assert_eq!(err.to_string(), "test"),
                other => panic!("unexpected value {other:?}"),
            }
        }
    }

    #[test]
    fn test_shared_error() {
        let err: SharedError = Arc::new(CustomError);
        let field = Field::shared_error(err.clone());
        assert_eq!(field.kind(), Kind::Error);
        assert!(matches!(field.value(), Value::Error(e) if Arc::ptr_eq(e, &err)));
    }

    #[test]
    fn test_string() {
        for input in ["", "lax", "ünïcode"] {
            let field = Field::string("test", input);
            assert_eq!(field.key(), "test");
            assert_eq!(field.kind(), Kind::String);
            assert!(matches!(field.value(), Value::String(s) if s == input));
        }
    }

    #[test]
    fn test_empty_key_is_allowed() {
        let field = Field::string("", "value");
        assert_eq!(field.key(), "");
    }

    #[test]
    fn test_owned_key() {
        let key = format!("attr_{}", 7);
        let field = Field::uint(key, 1);
        assert_eq!(field.key(), "attr_7");
    }

    #[test]
    fn test_uint() {
        for input in [0, 5, u64::MAX] {
            let field = Field::uint("test", input);
            assert_eq!(field.kind(), Kind::Uint);
            assert!(matches!(field.value(), Value::Uint(v) if *v == input));
        }
    }

    #[test]
    fn test_uint8_keeps_width() {
        for input in [0u8, 255] {
            let field = Field::uint8("test", input);
            assert_eq!(field.key(), "test");
            assert_eq!(field.kind(), Kind::Uint8);
            assert!(matches!(field.value(), Value::Uint8(v) if *v == input));
        }
    }

    #[test]
    fn test_int() {
        for input in [0, -5, 5, i64::MIN, i64::MAX] {
            let field = Field::int("test", input);
            assert_eq!(field.kind(), Kind::Int);
            assert!(matches!(field.value(), Value::Int(v) if *v == input));
        }
    }

    #[test]
    fn test_time() {
        let now = Utc::now();
        let field = Field::time("test", now);
        assert_eq!(field.kind(), Kind::Time);
        assert!(matches!(field.value(), Value::Time(t) if *t == now));

        let epoch = Field::time("epoch", SystemTime::UNIX_EPOCH);
        assert!(matches!(epoch.value(), Value::Time(t) if t.timestamp() == 0));
    }

    #[test]
    fn test_duration() {
        for input in [Duration::ZERO, Duration::from_millis(1500)] {
            let field = Field::duration("test", input);
            assert_eq!(field.kind(), Kind::Duration);
            assert!(matches!(field.value(), Value::Duration(d) if *d == input));
        }
    }
}
