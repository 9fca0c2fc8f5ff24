use crate::utils::error::{Result, TrackerError};
use chrono::{
    DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone,
    Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest DST gap we are willing to step over, in minutes.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// The pair of instants the user picked. `begin <= end` is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(begin: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { begin, end }
    }

    /// Whole-day range: `begin_day` 00:00:00.000 through `end_day` 23:59:59.999 in `tz`.
    pub fn from_dates<Tz: TimeZone>(begin_day: NaiveDate, end_day: NaiveDate, tz: &Tz) -> Self {
        Self {
            begin: resolve_local(tz, start_of_day(begin_day)),
            end: resolve_local(tz, end_of_day(end_day)),
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.begin <= self.end
    }

    pub fn payload(&self) -> RangePayload {
        RangePayload {
            date_begin: self.begin,
            date_end: self.end,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            js_timestamp::format(&self.begin),
            js_timestamp::format(&self.end)
        )
    }
}

/// Yesterday 00:00:00.000 through today 23:59:59.999, in the zone of `reference`.
pub fn default_range<Tz: TimeZone>(reference: &DateTime<Tz>) -> DateRange {
    let tz = reference.timezone();
    let today = reference.date_naive();
    let yesterday = today.pred_opt().unwrap_or(today);
    DateRange::from_dates(yesterday, today, &tz)
}

pub fn start_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

pub fn end_of_day(day: NaiveDate) -> NaiveDateTime {
    start_of_day(day) + TimeDelta::milliseconds(86_399_999)
}

/// Maps a wall-clock time in `tz` to an instant. Ambiguous times take the
/// earlier instant; times inside a DST gap move to the first valid minute after it.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    let mut candidate = naive;
    for _ in 0..=MAX_GAP_MINUTES {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => candidate += TimeDelta::minutes(1),
        }
    }

    // No valid wall time within a day: apply the offset in force at that moment.
    let offset = tz.offset_from_utc_datetime(&naive).fix();
    tracing::warn!(
        "{} has no valid local time within {} minutes, assuming offset {}",
        naive,
        MAX_GAP_MINUTES,
        offset
    );
    Utc.from_utc_datetime(&(naive - TimeDelta::seconds(i64::from(offset.local_minus_utc()))))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Begin,
    End,
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` day. A bare day
/// expands to its first millisecond for `Begin` and its last for `End`.
pub fn parse_range_bound<Tz: TimeZone>(
    raw: &str,
    bound: RangeBound,
    tz: &Tz,
) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }

    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        TrackerError::ValidationError {
            message: format!("'{}' is neither YYYY-MM-DD nor an RFC 3339 timestamp", raw),
        }
    })?;

    let naive = match bound {
        RangeBound::Begin => start_of_day(day),
        RangeBound::End => end_of_day(day),
    };
    Ok(resolve_local(tz, naive))
}

/// Request body posted on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangePayload {
    #[serde(with = "js_timestamp")]
    pub date_begin: DateTime<Utc>,
    #[serde(with = "js_timestamp")]
    pub date_end: DateTime<Utc>,
}

/// One row of the matches-per-day answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchesPlayedDay {
    pub match_date: NaiveDate,
    pub matches_played: i64,
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ`, the shape a JavaScript `Date` takes in JSON.
pub mod js_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(instant: &DateTime<Utc>) -> String {
        instant.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(instant))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|instant| instant.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
