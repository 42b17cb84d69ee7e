//! Minute-of-day arithmetic and the time filter driven by the slider.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use std::fmt;

use crate::error::TrafficError;

/// Number of slots in a day when bucketing by minute.
pub const MINUTES_PER_DAY: usize = 1440;

/// Slider value meaning "no filter / all times".
pub const ANY_TIME: i32 = -1;

/// Accepted wall-clock layouts, tried in order before falling back to RFC 3339.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// A minute of the day in `0..1440`, local wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub fn new(minute: u16) -> Option<Self> {
        ((minute as usize) < MINUTES_PER_DAY).then_some(Self(minute))
    }

    /// `hour * 60 + minute`; seconds and the date are ignored.
    pub fn from_time(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }

    pub fn from_datetime(datetime: &NaiveDateTime) -> Self {
        Self::from_time(datetime.time())
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_minute(*self))
    }
}

/// The time-of-day selection applied to the trip log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(tag = "kind", content = "minute", rename_all = "snake_case")]
pub enum TimeFilter {
    #[default]
    Any,
    Around(MinuteOfDay),
}

impl TimeFilter {
    /// Interprets a raw slider position: `-1` is [`TimeFilter::Any`].
    pub fn from_slider(value: i32) -> Result<Self, TrafficError> {
        if value == ANY_TIME {
            return Ok(Self::Any);
        }
        u16::try_from(value)
            .ok()
            .and_then(MinuteOfDay::new)
            .map(Self::Around)
            .ok_or(TrafficError::MinuteOutOfRange(value))
    }

    pub fn to_slider(self) -> i32 {
        match self {
            Self::Any => ANY_TIME,
            Self::Around(minute) => minute.get() as i32,
        }
    }

    pub fn is_any(self) -> bool {
        matches!(self, Self::Any)
    }

    /// Label shown next to the slider.
    pub fn label(self) -> String {
        match self {
            Self::Any => "(any time)".to_string(),
            Self::Around(minute) => format_minute(minute),
        }
    }
}

/// Formats a minute of the day as a short 12-hour clock label, e.g. `8:05 AM`.
pub fn format_minute(minute: MinuteOfDay) -> String {
    let time = NaiveTime::from_hms_opt(minute.get() as u32 / 60, minute.get() as u32 % 60, 0)
        .unwrap_or(NaiveTime::MIN);
    time.format("%-I:%M %p").to_string()
}

/// Parses a trip timestamp, keeping only its local wall-clock reading.
///
/// RFC 3339 inputs keep the time as written; the offset is dropped, not applied.
pub fn parse_timestamp(field: &'static str, raw: &str) -> Result<NaiveDateTime, TrafficError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(TrafficError::MissingField(field));
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .ok_or_else(|| TrafficError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}
