//! Timestamp parsing shared by the model.
//!
//! Exports carry RFC 3339 strings with offsets. Naive date-times are read as
//! UTC and bare numbers as unix seconds.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Seconds(f64),
}

impl RawTimestamp {
    fn resolve(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Text(text) => parse(text),
            Self::Seconds(secs) => from_unix_seconds(*secs),
        }
    }
}

/// Parse a textual timestamp.
#[must_use]
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Convert fractional unix seconds to a UTC timestamp.
#[must_use]
pub fn from_unix_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
}

/// Deserialize a required timestamp.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = RawTimestamp::deserialize(deserializer)?;
    raw.resolve().ok_or_else(|| match raw {
        RawTimestamp::Text(text) => D::Error::custom(format!("invalid timestamp '{text}'")),
        RawTimestamp::Seconds(secs) => D::Error::custom(format!("timestamp {secs} out of range")),
    })
}

/// Serialize as RFC 3339.
pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    value.to_rfc3339().serialize(serializer)
}

/// Optional timestamps. Unparseable values read as `None`.
pub mod option {
    use super::*;

    /// Deserialize an optional timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<RawTimestamp>::deserialize(deserializer).unwrap_or(None);
        Ok(raw.as_ref().and_then(RawTimestamp::resolve))
    }

    /// Serialize an optional timestamp as RFC 3339.
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.map(|dt| dt.to_rfc3339()).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_offset_converts_to_utc() {
        let dt = parse("2025-01-28T20:00:00.123+08:00").unwrap();
        assert_eq!(
            dt,
            Utc.with_ymd_and_hms(2025, 1, 28, 12, 0, 0).unwrap() + chrono::Duration::milliseconds(123)
        );
    }

    #[test]
    fn test_parse_naive_is_utc() {
        let dt = parse("2025-01-28 08:30:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 28, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse("yesterday").is_none());
    }

    #[test]
    fn test_unix_seconds() {
        let dt = from_unix_seconds(1_700_000_000.0).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
        assert!(from_unix_seconds(f64::NAN).is_none());
    }
}
