//! Human-readable formatting of dates, byte counts, and measurements.
//!
//! These formatters back the fixed function set exposed to templates.

use chrono::DateTime;
use chrono::format::StrftimeItems;
use chrono_tz::Tz;

use crate::config::FormatOptions;
use crate::error::{RenderError, Result};

const BYTE_UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
const MEASURE_UNITS: [&str; 6] = ["", "k", "M", "G", "T", "P"];

/// Formats RFC 3339 timestamps in a configured time zone and output format.
#[derive(Debug, Clone)]
pub struct MeasureConverter {
    zone: Tz,
    format: String,
}

impl MeasureConverter {
    /// Creates a converter from format options.
    ///
    /// The pattern is parsed eagerly: chrono only reports an unknown
    /// specifier at format time, as a panic inside `ToString`.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::InvalidConfig` if `time_format` is not a valid
    /// strftime pattern.
    pub fn new(opts: &FormatOptions) -> Result<Self> {
        StrftimeItems::new(&opts.time_format)
            .parse()
            .map_err(|_| RenderError::InvalidConfig {
                reason: format!("invalid time format pattern {:?}", opts.time_format),
            })?;
        Ok(Self {
            zone: opts.time_zone,
            format: opts.time_format.clone(),
        })
    }

    /// Parses an RFC 3339 timestamp and formats it in the configured zone.
    pub fn format_date(&self, raw: &str) -> std::result::Result<String, chrono::ParseError> {
        let parsed = DateTime::parse_from_rfc3339(raw)?;
        Ok(parsed.with_timezone(&self.zone).format(&self.format).to_string())
    }
}

/// Formats a byte count with binary suffixes, e.g. `1536.0` → `1.5KiB`.
#[must_use]
pub fn humanize_bytes(value: f64) -> String {
    scaled(value, 1024.0, &BYTE_UNITS)
}

/// Formats a measurement with SI suffixes, e.g. `1_500_000.0` → `1.5M`.
#[must_use]
pub fn format_measure(value: f64) -> String {
    scaled(value, 1000.0, &MEASURE_UNITS)
}

/// Formats a float with at most two decimal places, trimming trailing zeros.
#[must_use]
pub fn format_float(value: f64) -> String {
    trim_decimal(value)
}

fn scaled(value: f64, step: f64, units: &[&str]) -> String {
    let negative = value < 0.0;
    let mut v = value.abs();
    let mut unit = 0;
    while v >= step && unit < units.len() - 1 {
        v /= step;
        unit += 1;
    }
    let body = format!("{}{}", trim_decimal(v), units[unit]);
    if negative { format!("-{body}") } else { body }
}

fn trim_decimal(value: f64) -> String {
    let s = format!("{value:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
