//! Canonical instants
//!
//! Every persisted timestamp uses one textual form: RFC 3339, offset `Z`,
//! exactly three fractional digits (`2023-09-15T10:00:00.000Z`). A
//! caller-supplied value is accepted only if re-serializing it reproduces
//! the input byte for byte.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// A UTC instant at millisecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current instant from the server clock
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Wrap a UTC instant, dropping anything finer than a millisecond
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime.trunc_subsecs(3))
    }

    /// Parse a caller-supplied canonical timestamp
    ///
    /// Fails unless `value` is exactly what [`Timestamp::to_canonical`]
    /// would produce for the parsed instant.
    pub fn parse_canonical(value: &str) -> Result<Self, CoreError> {
        let parsed = DateTime::parse_from_rfc3339(value)
            .map_err(|_| CoreError::invalid_timestamp(value))?;
        let timestamp = Self::from_datetime(parsed.with_timezone(&Utc));
        if timestamp.to_canonical() != value {
            return Err(CoreError::invalid_timestamp(value));
        }
        Ok(timestamp)
    }

    /// The canonical text form
    pub fn to_canonical(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// The wrapped instant
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Parse an instant leniently, for range bounds in queries
///
/// Accepts any RFC 3339 instant (any offset, any sub-second precision) or a
/// bare `YYYY-MM-DD` date, which is taken as midnight UTC.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, CoreError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CoreError::invalid_timestamp(value))
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::from_datetime(datetime)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical())
    }
}

impl FromStr for Timestamp {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_canonical(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_canonical(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_round_trip() {
        let raw = "2023-09-15T10:00:00.000Z";
        let ts = Timestamp::parse_canonical(raw).unwrap();
        assert_eq!(ts.to_canonical(), raw);
        assert_eq!(ts.to_string().parse::<Timestamp>().unwrap(), ts);
    }

    #[test]
    fn test_rejects_non_canonical_forms() {
        // Valid RFC 3339, but not the canonical rendering
        assert!(Timestamp::parse_canonical("2023-09-15T10:00:00Z").is_err());
        assert!(Timestamp::parse_canonical("2023-09-15T10:00:00.000000Z").is_err());
        assert!(Timestamp::parse_canonical("2023-09-15T12:00:00.000+02:00").is_err());
        assert!(Timestamp::parse_canonical("2023-09-15 10:00:00.000Z").is_err());
        // Not an instant at all
        assert!(Timestamp::parse_canonical("2023-13-45T10:00:00.000Z").is_err());
        assert!(Timestamp::parse_canonical("not a date").is_err());
        assert!(Timestamp::parse_canonical("").is_err());
    }

    #[test]
    fn test_now_is_round_trippable() {
        let now = Timestamp::now();
        let again = Timestamp::parse_canonical(&now.to_canonical()).unwrap();
        assert_eq!(now, again);
    }

    #[test]
    fn test_ordering_follows_instant() {
        let a = Timestamp::parse_canonical("2023-09-15T09:00:00.000Z").unwrap();
        let b = Timestamp::parse_canonical("2023-09-15T09:00:00.001Z").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let ts = Timestamp::parse_canonical("2024-01-02T03:04:05.678Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2024-01-02T03:04:05.678Z\"");
        assert!(serde_json::from_str::<Timestamp>("\"2024-01-02T03:04:05Z\"").is_err());
    }

    #[test]
    fn test_parse_instant_is_lenient() {
        let with_offset = parse_instant("2023-09-15T12:30:00+02:00").unwrap();
        let canonical = Timestamp::parse_canonical("2023-09-15T10:30:00.000Z").unwrap();
        assert_eq!(with_offset, canonical.as_datetime());

        let date_only = parse_instant("2023-09-15").unwrap();
        assert_eq!(
            Timestamp::from_datetime(date_only).to_canonical(),
            "2023-09-15T00:00:00.000Z"
        );

        assert!(parse_instant("soon").is_err());
    }
}
