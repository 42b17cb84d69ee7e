//! Station catalog and trip log records.

use chrono::NaiveDateTime;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TrafficError;
use crate::time::{MinuteOfDay, parse_timestamp};

/// A single row of the trip log as it appears in the CSV export.
///
/// Extra columns (`ride_id`, `rideable_type`, `member_casual`, ...) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripRecord {
    #[serde(default)]
    pub start_station_id: Option<String>,
    #[serde(default)]
    pub end_station_id: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
}

/// An ingested trip. Its minute buckets are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub start_station_id: String,
    pub end_station_id: String,
    started_at: NaiveDateTime,
    ended_at: NaiveDateTime,
    start_minute: MinuteOfDay,
    end_minute: MinuteOfDay,
}

impl Trip {
    pub fn new(
        start_station_id: impl Into<String>,
        end_station_id: impl Into<String>,
        started_at: NaiveDateTime,
        ended_at: NaiveDateTime,
    ) -> Self {
        Self {
            start_station_id: start_station_id.into(),
            end_station_id: end_station_id.into(),
            started_at,
            ended_at,
            start_minute: MinuteOfDay::from_datetime(&started_at),
            end_minute: MinuteOfDay::from_datetime(&ended_at),
        }
    }

    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    pub fn ended_at(&self) -> NaiveDateTime {
        self.ended_at
    }

    pub fn start_minute(&self) -> MinuteOfDay {
        self.start_minute
    }

    pub fn end_minute(&self) -> MinuteOfDay {
        self.end_minute
    }
}

impl TryFrom<TripRecord> for Trip {
    type Error = TrafficError;

    fn try_from(record: TripRecord) -> Result<Self, Self::Error> {
        let started_at = parse_timestamp(
            "started_at",
            record.started_at.as_deref().unwrap_or_default(),
        )?;
        let ended_at = parse_timestamp("ended_at", record.ended_at.as_deref().unwrap_or_default())?;

        let start_station_id = non_empty(record.start_station_id, "start_station_id")?;
        let end_station_id = non_empty(record.end_station_id, "end_station_id")?;

        Ok(Trip::new(start_station_id, end_station_id, started_at, ended_at))
    }
}

fn non_empty(value: Option<String>, field: &'static str) -> Result<String, TrafficError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(TrafficError::MissingField(field))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

/// A catalog entry keyed by its `short_name`.
///
/// `coordinates` is `None` when the source lacked a usable lon/lat pair; it is
/// never replaced by `(0, 0)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub id: String,
    pub name: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl Station {
    pub fn new(id: impl Into<String>, coordinates: Option<Coordinates>) -> Self {
        Self {
            id: id.into(),
            name: None,
            coordinates,
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.coordinates.is_some()
    }
}

/// Station entry as published in a GBFS `station_information` feed or a
/// bare station array.
///
/// Every coordinate spelling is its own field so an entry carrying two of
/// them still decodes; [`StationRecord::longitude`] and
/// [`StationRecord::latitude`] pick one by precedence.
#[derive(Debug, Deserialize)]
pub(crate) struct StationRecord {
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    lon: Option<f64>,
    #[serde(default, rename = "Long", deserialize_with = "lenient_coordinate")]
    long_capitalized: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    lat: Option<f64>,
    #[serde(default, rename = "Lat", deserialize_with = "lenient_coordinate")]
    lat_capitalized: Option<f64>,
}

impl StationRecord {
    /// `longitude`, then `lon`, then `Long`.
    pub(crate) fn longitude(&self) -> Option<f64> {
        self.longitude.or(self.lon).or(self.long_capitalized)
    }

    /// `latitude`, then `lat`, then `Lat`.
    pub(crate) fn latitude(&self) -> Option<f64> {
        self.latitude.or(self.lat).or(self.lat_capitalized)
    }
}

impl TryFrom<StationRecord> for Station {
    type Error = TrafficError;

    fn try_from(record: StationRecord) -> Result<Self, Self::Error> {
        let coordinates = match (record.longitude(), record.latitude()) {
            (Some(longitude), Some(latitude)) if longitude.is_finite() && latitude.is_finite() => {
                Some(Coordinates {
                    longitude,
                    latitude,
                })
            }
            _ => None,
        };

        let id = non_empty(record.short_name, "short_name")
            .or_else(|_| non_empty(record.id, "short_name"))?;

        Ok(Station {
            id,
            name: record.name,
            coordinates,
        })
    }
}

/// Accepts a number, a numeric string, or null. Anything unparseable becomes `None`.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        Some(Raw::Other(_)) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: &str, end: &str) -> TripRecord {
        TripRecord {
            start_station_id: Some("A32000".to_string()),
            end_station_id: Some("B32006".to_string()),
            started_at: Some(start.to_string()),
            ended_at: Some(end.to_string()),
        }
    }

    #[test]
    fn test_trip_minutes_computed_at_ingest() {
        let trip = Trip::try_from(record("2024-03-01 23:58:10", "2024-03-02 00:12:44")).unwrap();
        assert_eq!(trip.start_minute().get(), 1438);
        assert_eq!(trip.end_minute().get(), 12);
    }

    #[test]
    fn test_trip_rejects_bad_timestamp() {
        let err = Trip::try_from(record("yesterday", "2024-03-01 00:00:00")).unwrap_err();
        assert!(matches!(
            err,
            TrafficError::InvalidTimestamp {
                field: "started_at",
                ..
            }
        ));
    }

    #[test]
    fn test_trip_rejects_missing_fields() {
        let mut r = record("2024-03-01 10:00:00", "2024-03-01 10:10:00");
        r.ended_at = None;
        assert_eq!(
            Trip::try_from(r).unwrap_err(),
            TrafficError::MissingField("ended_at")
        );

        let mut r = record("2024-03-01 10:00:00", "2024-03-01 10:10:00");
        r.end_station_id = Some("   ".to_string());
        assert_eq!(
            Trip::try_from(r).unwrap_err(),
            TrafficError::MissingField("end_station_id")
        );
    }

    #[test]
    fn test_trip_timestamps_read_only() {
        let trip = Trip::try_from(record("2024-03-01 07:05:00", "2024-03-01 07:40:30")).unwrap();
        assert_eq!(trip.started_at().to_string(), "2024-03-01 07:05:00");
        assert_eq!(trip.ended_at().to_string(), "2024-03-01 07:40:30");
        assert_eq!(
            trip.start_minute(),
            MinuteOfDay::from_datetime(&trip.started_at())
        );
        assert_eq!(trip.end_minute(), MinuteOfDay::from_datetime(&trip.ended_at()));
    }

    fn decode_station(json: &str) -> Result<Station, TrafficError> {
        Station::try_from(serde_json::from_str::<StationRecord>(json).unwrap())
    }

    #[test]
    fn test_station_coordinate_spellings() {
        let station =
            decode_station(r#"{"short_name": "A1", "lon": -71.09, "lat": "42.36"}"#).unwrap();
        assert_eq!(
            station.coordinates,
            Some(Coordinates {
                longitude: -71.09,
                latitude: 42.36
            })
        );

        let station =
            decode_station(r#"{"short_name": "A2", "Long": -71.1, "Lat": -0.5}"#).unwrap();
        assert!(station.has_coordinates());
    }

    #[test]
    fn test_station_coordinate_precedence() {
        let station = decode_station(
            r#"{"short_name": "A1", "Long": -70.0, "lon": -71.5, "longitude": -71.0,
                "lat": 41.0, "Lat": 40.0}"#,
        )
        .unwrap();
        assert_eq!(
            station.coordinates,
            Some(Coordinates {
                longitude: -71.0,
                latitude: 41.0
            })
        );

        // an unusable preferred key falls through to the next spelling
        let station =
            decode_station(r#"{"short_name": "A2", "longitude": "n/a", "lon": -71.5, "lat": 42.0}"#)
                .unwrap();
        assert_eq!(station.coordinates.map(|c| c.longitude), Some(-71.5));
    }

    #[test]
    fn test_station_missing_coordinates_flagged() {
        let station = decode_station(r#"{"short_name": "A3", "lon": "n/a"}"#).unwrap();
        assert_eq!(station.coordinates, None);
        assert!(!station.has_coordinates());

        let station =
            decode_station(r#"{"short_name": "A4", "lon": {"deg": -71}, "lat": 42.0}"#).unwrap();
        assert!(!station.has_coordinates());
    }

    #[test]
    fn test_station_id_fallback_and_missing() {
        assert_eq!(decode_station(r#"{"id": "B7"}"#).unwrap().id, "B7");
        assert_eq!(
            decode_station(r#"{"name": "Nameless", "lat": 42.0}"#).unwrap_err(),
            TrafficError::MissingField("short_name")
        );
        assert_eq!(
            decode_station(r#"{"short_name": " "}"#).unwrap_err(),
            TrafficError::MissingField("short_name")
        );
    }
}
