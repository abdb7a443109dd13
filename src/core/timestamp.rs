use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};
use time::OffsetDateTime;
use time::format_description::well_known::{Iso8601, Rfc3339};

const NANOS_PER_DAY: i128 = 86_400 * 1_000_000_000;

/// Display form of the service's `timestamp` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastActive {
    /// Whole days between the parsed instant and now (floored, may be negative).
    DaysAgo(i64),
    /// The raw value, unchanged, when it could not be parsed.
    Raw(String),
}

impl LastActive {
    pub fn is_parsed(&self) -> bool {
        matches!(self, LastActive::DaysAgo(_))
    }
}

impl fmt::Display for LastActive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastActive::DaysAgo(days) => write!(f, "{days} days ago"),
            LastActive::Raw(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for LastActive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn normalize_timestamp(raw: &str) -> LastActive {
    normalize_timestamp_at(raw, OffsetDateTime::now_utc())
}

/// Never fails: anything that is not an offset-qualified ISO 8601 instant is
/// passed through as [`LastActive::Raw`].
pub fn normalize_timestamp_at(raw: &str, now: OffsetDateTime) -> LastActive {
    match parse_instant(raw) {
        Some(instant) => {
            let elapsed = (now - instant).whole_nanoseconds();
            let days = elapsed.div_euclid(NANOS_PER_DAY);
            LastActive::DaysAgo(i64::try_from(days).unwrap_or(i64::MAX))
        }
        None => LastActive::Raw(raw.to_string()),
    }
}

fn parse_instant(raw: &str) -> Option<OffsetDateTime> {
    if raw.is_empty() {
        return None;
    }
    let s: Cow<'_, str> = match raw.strip_suffix('Z') {
        Some(rest) => Cow::Owned(format!("{rest}+00:00")),
        None => Cow::Borrowed(raw),
    };
    OffsetDateTime::parse(&s, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(&s, &Iso8601::DEFAULT))
        .ok()
}
