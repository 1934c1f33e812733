// Counter samples as read from input and as written after dictionary encoding.

use std::fmt;

use chrono::NaiveDateTime;

/// Timestamp layout used by both the input reader and the output writer.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One observed `(timestamp, object, counter, instance, value)` tuple.
/// An absent instance is represented by the empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterSample {
    pub timestamp: NaiveDateTime,
    pub object: String,
    pub counter: String,
    pub instance: String,
    pub value: f64,
}

impl CounterSample {
    pub fn new(
        timestamp: NaiveDateTime,
        object: impl Into<String>,
        counter: impl Into<String>,
        instance: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            timestamp,
            object: object.into(),
            counter: counter.into(),
            instance: instance.into(),
            value,
        }
    }
}

/// A sample whose names have been replaced by dictionary ids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedSample {
    pub timestamp: NaiveDateTime,
    pub object: u32,
    pub counter: u32,
    pub instance: u32,
    pub value: f64,
}

/// Renders the five-field output record, e.g. `2024-01-01 00:00:00;1;2;3;150`.
impl fmt::Display for EncodedSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{};{};{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.object,
            self.counter,
            self.instance,
            self.value
        )
    }
}
