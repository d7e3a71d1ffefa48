//! ISO-8601 timestamps with millisecond precision, `2024-03-01T10:00:00.000Z`.
//!
//! Values are written in UTC with exactly three fractional digits and read
//! back with any RFC 3339 offset or precision.

use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
use time::{
    format_description::{well_known::Rfc3339, FormatItem},
    macros::format_description,
    OffsetDateTime, UtcOffset,
};

const MILLIS_UTC: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// Format a timestamp the way it is persisted.
pub fn format(ts: OffsetDateTime) -> Result<String, time::error::Format> {
    ts.to_offset(UtcOffset::UTC).format(MILLIS_UTC)
}

/// Parse a persisted timestamp.
pub fn parse(s: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(s, &Rfc3339)
}

/// Drop precision below one millisecond so in-memory values equal their
/// persisted form.
pub fn truncate_to_millis(ts: OffsetDateTime) -> OffsetDateTime {
    let nanos = ts.nanosecond();
    ts.replace_nanosecond(nanos - nanos % 1_000_000).unwrap_or(ts)
}

pub fn serialize<S: Serializer>(ts: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    let s = format(*ts).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&s)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(D::Error::custom)
}
