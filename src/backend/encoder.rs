//! Record encoding.
//!
//! # Formats
//! ```text
//! json:    {"level":"info","ts":"2024-05-01T10:00:00.000Z","caller":"src/app.rs:7","msg":"hello","k":1}
//! console: 2024-05-01T10:00:00.000Z	INFO	src/app.rs:7	hello	{"k":1}
//! ```
//!
//! # Design Decisions
//! - Attributes are written in call order; duplicate keys are kept
//! - Timestamps are ISO-8601 UTC with millisecond precision
//! - Durations are rendered as strings (`1.5ms`, `1m30s`), never as
//!   bare integers
//! - `caller` follows the timestamp; `stack` closes the record
//! - Errors render their message under `error` and their source chain under
//!   `errorCauses`

use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use colored::Colorize;
use serde::Serialize;

use super::attr::{Attr, AttrValue};
use crate::config::ConfigError;
use crate::level::Level;

/// Output format of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Tab-separated, human-readable.
    Console,
    /// One JSON object per line.
    Json,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Console => "console",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" => Ok(Format::Console),
            "json" => Ok(Format::Json),
            _ => Err(ConfigError::InvalidFormat(s.to_string())),
        }
    }
}

/// Turns one record into bytes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Encoder {
    format: Format,
    color: bool,
}

impl Encoder {
    pub(crate) fn new(format: Format, color: bool) -> Self {
        Self { format, color }
    }

    pub(crate) fn format(&self) -> Format {
        self.format
    }

    pub(crate) fn color(&self) -> bool {
        self.color
    }

    pub(crate) fn encode(&self, buf: &mut Vec<u8>, entry: &Entry<'_>, attrs: &[Attr<'_>]) {
        let ts = entry.ts.to_rfc3339_opts(SecondsFormat::Millis, true);
        match self.format {
            Format::Json => {
                buf.extend_from_slice(b"{\"level\":");
                write_json(buf, entry.level.as_str());
                buf.extend_from_slice(b",\"ts\":");
                write_json(buf, &ts);
                if let Some(caller) = entry.caller {
                    buf.extend_from_slice(b",\"caller\":");
                    write_json(buf, &short_caller(caller));
                }
                buf.extend_from_slice(b",\"msg\":");
                write_json(buf, entry.msg);
                for attr in attrs {
                    buf.push(b',');
                    write_attr(buf, attr);
                }
                if let Some(stack) = entry.stack {
                    buf.extend_from_slice(b",\"stack\":");
                    write_json(buf, stack);
                }
                buf.push(b'}');
            }
            Format::Console => {
                buf.extend_from_slice(ts.as_bytes());
                buf.push(b'\t');
                if self.color {
                    buf.extend_from_slice(colored_level(entry.level).as_bytes());
                } else {
                    buf.extend_from_slice(entry.level.as_capital_str().as_bytes());
                }
                buf.push(b'\t');
                if let Some(caller) = entry.caller {
                    buf.extend_from_slice(short_caller(caller).as_bytes());
                    buf.push(b'\t');
                }
                buf.extend_from_slice(entry.msg.as_bytes());
                if !attrs.is_empty() {
                    buf.extend_from_slice(b"\t{");
                    for (i, attr) in attrs.iter().enumerate() {
                        if i > 0 {
                            buf.push(b',');
                        }
                        write_attr(buf, attr);
                    }
                    buf.push(b'}');
                }
                if let Some(stack) = entry.stack {
                    buf.push(b'\n');
                    buf.extend_from_slice(stack.trim_end().as_bytes());
                }
            }
        }
        buf.push(b'\n');
    }
}

/// Record-level parts of one encoded line.
pub(crate) struct Entry<'a> {
    pub(crate) ts: DateTime<Utc>,
    pub(crate) level: Level,
    pub(crate) caller: Option<&'a Location<'a>>,
    pub(crate) msg: &'a str,
    pub(crate) stack: Option<&'a str>,
}

/// `dir/file.rs:line`, the last two path components of the call site.
fn short_caller(caller: &Location<'_>) -> String {
    let file = caller.file();
    let mut cut = file.len();
    for _ in 0..2 {
        match file[..cut].rfind(['/', '\\']) {
            Some(i) => cut = i,
            None => {
                cut = 0;
                break;
            }
        }
    }
    let short = if cut == 0 { file } else { &file[cut + 1..] };
    format!("{short}:{}", caller.line())
}

/// Duration text: `0s`, `250ns`, `1.5ms`, `1m30s`, `1h0m0s`.
fn duration_string(d: Duration) -> String {
    const SECOND: u128 = 1_000_000_000;

    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}\u{b5}s", decimal(nanos, 1_000));
    }
    if nanos < SECOND {
        return format!("{}ms", decimal(nanos, 1_000_000));
    }

    let secs = d.as_secs();
    let (hours, minutes) = (secs / 3600, secs / 60 % 60);
    let seconds = u128::from(secs % 60) * SECOND + u128::from(d.subsec_nanos());

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&decimal(seconds, SECOND));
    out.push('s');
    out
}

/// `value / unit` with the fraction's trailing zeros removed.
fn decimal(value: u128, unit: u128) -> String {
    let (whole, frac) = (value / unit, value % unit);
    if frac == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let digits = format!("{frac:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

fn colored_level(level: Level) -> String {
    let name = level.as_capital_str();
    match level {
        Level::Debug => name.magenta(),
        Level::Info => name.blue(),
        Level::Warn => name.yellow(),
        Level::Error => name.red(),
    }
    .to_string()
}

/// Writes `"key":value` for one attribute.
fn write_attr(buf: &mut Vec<u8>, attr: &Attr<'_>) {
    write_json(buf, attr.key());
    buf.push(b':');
    match *attr.value() {
        AttrValue::Any(value) => write_json(buf, value),
        AttrValue::Error(err) => {
            write_json(buf, &err.to_string());
            let causes = causes(err);
            if !causes.is_empty() {
                buf.push(b',');
                write_json(buf, &format!("{}Causes", attr.key()));
                buf.push(b':');
                write_json(buf, &causes);
            }
        }
        AttrValue::String(s) => write_json(buf, s),
        AttrValue::Uint64(v) => write_json(buf, &v),
        AttrValue::Uint8(v) => write_json(buf, &v),
        AttrValue::Int64(v) => write_json(buf, &v),
        AttrValue::Time(t) => write_json(buf, &t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        AttrValue::Duration(d) => write_json(buf, &duration_string(d)),
    }
}

fn causes(err: &(dyn StdError + Send + Sync + 'static)) -> Vec<String> {
    let mut out = Vec::new();
    let mut next = err.source();
    while let Some(cause) = next {
        out.push(cause.to_string());
        next = cause.source();
    }
    out
}

fn write_json<T: Serialize + ?Sized>(buf: &mut Vec<u8>, value: &T) {
    if serde_json::to_writer(&mut *buf, value).is_err() {
        buf.extend_from_slice(b"null");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug)]
    struct Wrapped(std::io::Error);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("request failed")
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    fn ts() -> DateTime<Utc> {
        DateTime::from_timestamp(1_714_557_600, 0).unwrap()
    }

    fn entry(level: Level) -> Entry<'static> {
        Entry {
            ts: ts(),
            level,
            caller: None,
            msg: "hello",
            stack: None,
        }
    }

    fn encode_entry(format: Format, entry: &Entry<'_>, attrs: &[Attr<'_>]) -> String {
        let mut buf = Vec::new();
        Encoder::new(format, false).encode(&mut buf, entry, attrs);
        String::from_utf8(buf).unwrap()
    }

    fn encode(format: Format, attrs: &[Attr<'_>]) -> String {
        encode_entry(format, &entry(Level::Info), attrs)
    }

    #[test]
    fn test_json_layout() {
        let line = encode(Format::Json, &[Attr::uint8("small", 255), Attr::int64("neg", -3)]);
        assert_eq!(
            line,
            "{\"level\":\"info\",\"ts\":\"2024-05-01T10:00:00.000Z\",\"msg\":\"hello\",\"small\":255,\"neg\":-3}\n"
        );
    }

    #[test]
    fn test_json_types() {
        let any = serde_json::json!({"nested": [1, 2]});
        let line = encode(
            Format::Json,
            &[
                Attr::any("any", &any),
                Attr::string("s", "text"),
                Attr::uint64("u", u64::MAX),
                Attr::time("t", ts()),
                Attr::duration("d", Duration::from_micros(1500)),
            ],
        );
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["any"], any);
        assert_eq!(value["s"], "text");
        assert_eq!(value["u"], u64::MAX);
        assert_eq!(value["t"], "2024-05-01T10:00:00.000Z");
        assert_eq!(value["d"], "1.5ms");
    }

    #[test]
    fn test_error_renders_message_and_causes() {
        let plain = std::io::Error::other("boom");
        let line = encode(Format::Json, &[Attr::error(&plain)]);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["error"], "boom");
        assert!(value.get("errorCauses").is_none());

        let wrapped = Wrapped(std::io::Error::other("connection reset"));
        let line = encode(Format::Json, &[Attr::error(&wrapped)]);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["error"], "request failed");
        assert_eq!(value["errorCauses"], serde_json::json!(["connection reset"]));
    }

    #[test]
    fn test_duplicate_keys_are_kept() {
        let line = encode(Format::Json, &[Attr::int64("a", 1), Attr::int64("a", 2)]);
        assert!(line.contains("\"a\":1,\"a\":2"));
    }

    #[test]
    fn test_console_layout() {
        let line = encode(Format::Console, &[Attr::string("k", "v"), Attr::uint64("n", 1)]);
        assert_eq!(line, "2024-05-01T10:00:00.000Z\tINFO\thello\t{\"k\":\"v\",\"n\":1}\n");

        let bare = encode(Format::Console, &[]);
        assert_eq!(bare, "2024-05-01T10:00:00.000Z\tINFO\thello\n");
    }

    #[test]
    fn test_json_caller_and_stack_placement() {
        let caller = Location::caller();
        let entry = Entry {
            caller: Some(caller),
            stack: Some("frame 0\nframe 1"),
            ..entry(Level::Error)
        };
        let line = encode_entry(Format::Json, &entry, &[Attr::int64("n", 1)]);

        let expected_caller = format!("backend/encoder.rs:{}", caller.line());
        assert!(line.starts_with(&format!(
            "{{\"level\":\"error\",\"ts\":\"2024-05-01T10:00:00.000Z\",\"caller\":\"{expected_caller}\",\"msg\":\"hello\",\"n\":1,"
        )));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["stack"], "frame 0\nframe 1");
    }

    #[test]
    fn test_console_caller_and_stack_placement() {
        let caller = Location::caller();
        let entry = Entry {
            caller: Some(caller),
            stack: Some("frame 0\n"),
            ..entry(Level::Error)
        };
        let line = encode_entry(Format::Console, &entry, &[]);
        assert_eq!(
            line,
            format!(
                "2024-05-01T10:00:00.000Z\tERROR\tbackend/encoder.rs:{}\thello\nframe 0\n",
                caller.line()
            )
        );
    }

    #[test]
    fn test_short_caller_keeps_two_components() {
        let here = Location::caller();
        assert_eq!(short_caller(here), format!("backend/encoder.rs:{}", here.line()));
    }

    #[test]
    fn test_duration_strings() {
        let cases = [
            (Duration::ZERO, "0s"),
            (Duration::from_nanos(250), "250ns"),
            (Duration::from_nanos(1_500), "1.5\u{b5}s"),
            (Duration::from_micros(1_500), "1.5ms"),
            (Duration::from_millis(20), "20ms"),
            (Duration::from_millis(1_500), "1.5s"),
            (Duration::from_secs(90), "1m30s"),
            (Duration::from_secs(3_600), "1h0m0s"),
            (Duration::new(3_723, 5_000_000), "1h2m3.005s"),
        ];
        for (input, want) in cases {
            assert_eq!(duration_string(input), want, "duration {input:?}");
        }
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("Console".parse::<Format>().unwrap(), Format::Console);
        let err = "xml".parse::<Format>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat(ref s) if s == "xml"));
    }
}
