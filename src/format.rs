//! Per-field literal formats for textual missing values.

use std::sync::Arc;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::ValuesSourceError;

/// Resolves the reference instant for `now`-relative date expressions.
///
/// Borrowed from the execution context so that one request evaluates every
/// relative literal against the same instant.
pub type NowResolver = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

/// How a field's textual literals map into its numeric value space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValueFormat {
    /// Plain decimal numbers.
    #[default]
    Decimal,
    /// Date values stored as milliseconds since the unix epoch. Literals are
    /// RFC 3339 timestamps, `now`, or `now` offset by a fixed duration
    /// (`now-1d`, `now+30m`). Supported units: `ms`, `s`, `m`, `h`, `d`.
    Date,
}

impl ValueFormat {
    /// Parses `text` into the field's numeric value space.
    pub fn parse_f64(&self, text: &str, now: &NowResolver) -> crate::Result<f64> {
        let reason = match self {
            ValueFormat::Decimal => match text.parse::<f64>() {
                Ok(val) => return Ok(val),
                Err(err) => err.to_string(),
            },
            ValueFormat::Date => match parse_date_millis(text, now) {
                Ok(val) => return Ok(val),
                Err(reason) => reason,
            },
        };
        Err(ValuesSourceError::InvalidMissingValue {
            literal: text.to_string(),
            reason,
        })
    }
}

fn parse_date_millis(text: &str, now: &NowResolver) -> Result<f64, String> {
    if let Some(expr) = text.strip_prefix("now") {
        let base = now().unix_timestamp_nanos() / 1_000_000;
        if expr.is_empty() {
            return Ok(base as f64);
        }
        let (sign, duration) = if let Some(duration) = expr.strip_prefix('+') {
            (1i128, duration)
        } else if let Some(duration) = expr.strip_prefix('-') {
            (-1i128, duration)
        } else {
            return Err(format!("expected `+` or `-` after `now` in '{text}'"));
        };
        let millis = parse_duration_millis(duration)? as i128;
        return Ok((base + sign * millis) as f64);
    }
    OffsetDateTime::parse(text, &Rfc3339)
        .map(|datetime| (datetime.unix_timestamp_nanos() / 1_000_000) as f64)
        .map_err(|err| format!("not an RFC 3339 date: {err}"))
}

fn parse_duration_millis(input: &str) -> Result<u64, String> {
    let split_boundary = input
        .as_bytes()
        .iter()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    let (number, unit) = input.split_at(split_boundary);
    if number.is_empty() {
        return Err(format!("number missing in duration '{input}'"));
    }
    if unit.is_empty() {
        return Err(format!("unit missing in duration '{input}'"));
    }
    let number: u64 = number
        .parse()
        .map_err(|_| format!("number missing in duration '{input}'"))?;

    let multiplier_from_unit = match unit {
        "ms" => 1,
        "s" => 1000,
        "m" => 60 * 1000,
        "h" => 60 * 60 * 1000,
        "d" => 24 * 60 * 60 * 1000,
        _ => return Err(format!("unit '{unit}' not recognized in duration '{input}'")),
    };

    number
        .checked_mul(multiplier_from_unit)
        .ok_or_else(|| format!("duration '{input}' overflows"))
}
