// Input reader: `timestamp; object; counter; instance; value` per line.

use std::path::Path;

use chrono::{NaiveDateTime, Timelike};
use tracing::{info, instrument, warn};

use crate::error::{Error, Result};
use crate::models::{CounterSample, TIMESTAMP_FORMAT};

const FIELD_COUNT: usize = 5;
// `YYYY-MM-DD HH:MM:SS`
const TIMESTAMP_LEN: usize = 19;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Log and skip malformed lines instead of failing the run.
    pub skip_malformed_lines: bool,
}

/// Parses one record. Fields are trimmed; the error is a human-readable reason.
pub fn parse_line(line: &str) -> std::result::Result<CounterSample, String> {
    let fields: Vec<&str> = line.split(';').map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(format!(
            "expected {} fields, found {}",
            FIELD_COUNT,
            fields.len()
        ));
    }

    let timestamp = parse_timestamp(fields[0])?;
    let value: f64 = fields[4]
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| format!("invalid value `{}`", fields[4]))?;

    Ok(CounterSample::new(
        timestamp, fields[1], fields[2], fields[3], value,
    ))
}

/// Zero-padded `YYYY-MM-DD HH:MM:SS` only. chrono alone would also take
/// unpadded fields and leap second 60, which do not render back the same.
fn parse_timestamp(field: &str) -> std::result::Result<NaiveDateTime, String> {
    let invalid = |reason: &str| format!("invalid timestamp `{field}` ({reason})");
    let well_formed = field.len() == TIMESTAMP_LEN
        && field.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            10 => b == b' ',
            13 | 16 => b == b':',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(invalid("expected YYYY-MM-DD HH:MM:SS"));
    }
    let timestamp = NaiveDateTime::parse_from_str(field, TIMESTAMP_FORMAT)
        .map_err(|e| invalid(&e.to_string()))?;
    // chrono encodes second 60 as a nanosecond overflow on second 59.
    if timestamp.nanosecond() >= 1_000_000_000 {
        return Err(invalid("leap seconds are not supported"));
    }
    Ok(timestamp)
}

/// Parses every line of `text`. Without `skip_malformed_lines` the first bad
/// line, blank lines included, aborts with [`Error::Format`]. In lenient mode
/// blank lines are dropped silently and other bad lines with a warning.
pub fn parse_samples(text: &str, options: ReadOptions) -> Result<Vec<CounterSample>> {
    let mut samples = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if options.skip_malformed_lines && line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(sample) => samples.push(sample),
            Err(message) if options.skip_malformed_lines => {
                warn!(line = i + 1, content = %line, reason = %message, "skipping malformed line");
            }
            Err(message) => return Err(Error::format(i + 1, line, message)),
        }
    }
    Ok(samples)
}

#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_samples(path: impl AsRef<Path>, options: ReadOptions) -> Result<Vec<CounterSample>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let samples = parse_samples(&text, options)?;
    info!(samples = samples.len(), "input loaded");
    Ok(samples)
}
