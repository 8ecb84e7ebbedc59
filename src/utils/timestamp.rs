//! Serde helpers for stored timestamps. New documents are written as RFC 3339,
//! but files left by the previous bot hold ISO 8601 times without an offset
//! (Python's `isoformat()`); those are read as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer};

/// Parse an RFC 3339 timestamp, or a naive ISO 8601 one taken as UTC
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Some(time.with_timezone(&Utc));
    }
    value
        .parse::<NaiveDateTime>()
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", raw)))
}

/// Same as [`deserialize`] for optional fields; `null` stays `None`.
/// Pair with `#[serde(default)]` so a missing field is `None` too.
pub mod option {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                parse(&raw)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", raw)))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("2024-05-01T08:00:00+00:00" ; "rfc3339 with offset")]
    #[test_case("2024-05-01T08:00:00Z" ; "rfc3339 zulu")]
    #[test_case("2024-05-01T10:00:00+02:00" ; "rfc3339 shifted offset")]
    #[test_case("2024-05-01T08:00:00" ; "naive without fraction")]
    fn test_parse_accepts_stored_formats(raw: &str) {
        assert_eq!(
            parse(raw),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_keeps_microseconds_of_naive_times() {
        let parsed = parse("2024-05-01T08:00:00.123456").unwrap();
        assert_eq!(parsed.timestamp_subsec_micros(), 123456);
    }

    #[test_case("" ; "empty")]
    #[test_case("yesterday" ; "prose")]
    #[test_case("2024-13-01T00:00:00" ; "bad month")]
    fn test_parse_rejects_garbage(raw: &str) {
        assert_eq!(parse(raw), None);
    }
}
