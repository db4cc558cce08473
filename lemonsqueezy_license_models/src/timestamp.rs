//! Codec for the timestamps the license API emits, e.g. `2021-04-06T14:15:07.000000Z`.
//!
//! The format is stricter than RFC 3339: the offset must be `Z` and the
//! fractional seconds must be present. Use with `#[serde(with = "timestamp")]`,
//! or `timestamp::option` for nullable fields.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{de::Error as DeError, Deserialize, Deserializer, Serializer};
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
};

const SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// `YYYY-MM-DDTHH:MM:SS`, `0` marking a digit position.
const SECONDS_SHAPE: &[u8; 19] = b"0000-00-00T00:00:00";
const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimestampError {
    input: String,
}

impl Display for TimestampError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "invalid timestamp `{}`", self.input)
    }
}

impl StdError for TimestampError {}

/// Parse a wire timestamp into a UTC instant.
///
/// # Errors
///
/// Fails when the input is not `YYYY-MM-DDTHH:MM:SS.<1 to 9 digits>Z`.
pub fn parse(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    let invalid = || TimestampError {
        input: input.to_owned(),
    };

    let rest = input.strip_suffix('Z').ok_or_else(invalid)?;
    let (seconds, fraction) = rest.split_once('.').ok_or_else(invalid)?;
    if fraction.is_empty() || fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    if !has_seconds_shape(seconds) {
        return Err(invalid());
    }

    let naive = NaiveDateTime::parse_from_str(seconds, SECONDS_FORMAT).map_err(|_| invalid())?;
    let nanos = format!("{fraction:0<9}")
        .parse::<u32>()
        .map_err(|_| invalid())?;
    let naive = naive.with_nanosecond(nanos).ok_or_else(invalid)?;

    Ok(naive.and_utc())
}

/// chrono accepts variable widths, signs and padding, and folds `:60` into a
/// leap nanosecond, so the fixed layout is checked first.
fn has_seconds_shape(seconds: &str) -> bool {
    let bytes = seconds.as_bytes();
    bytes.len() == SECONDS_SHAPE.len()
        && bytes.iter().zip(SECONDS_SHAPE).all(|(byte, shape)| match shape {
            b'0' => byte.is_ascii_digit(),
            literal => byte == literal,
        })
        && &bytes[17..] != b"60"
}

/// Format an instant the way the API does, with microsecond precision.
#[must_use]
pub fn format(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(WIRE_FORMAT).to_string()
}

pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&timestamp.format(WIRE_FORMAT))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(D::Error::custom)
}

pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{de::Error as DeError, Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(timestamp: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match timestamp {
            Some(timestamp) => super::serialize(timestamp, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse(&raw).map_err(D::Error::custom))
            .transpose()
    }
}
