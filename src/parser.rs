//! Parsers for the station catalog (JSON) and the trip log (CSV).

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;
use tracing::{debug, warn};

use crate::model::{Station, StationRecord, Trip, TripRecord};

/// Trips that survived ingestion plus a count of rejected rows.
#[derive(Debug, Default)]
pub struct TripLog {
    pub trips: Vec<Trip>,
    pub rejected: usize,
}

/// Columns a trip log must carry; any others are ignored.
const REQUIRED_COLUMNS: [&str; 4] = [
    "started_at",
    "ended_at",
    "start_station_id",
    "end_station_id",
];

#[derive(Deserialize)]
#[serde(untagged)]
enum StationFeed {
    Gbfs { data: StationList },
    Bare(Vec<Value>),
}

#[derive(Deserialize)]
struct StationList {
    stations: Vec<Value>,
}

/// Decodes a station catalog, either a GBFS `station_information` document
/// (`{"data": {"stations": [...]}}`) or a bare JSON array of stations.
///
/// Entries are decoded one at a time. An entry without a `short_name` (or
/// `id`) or with a field of the wrong type is logged and skipped.
///
/// # Errors
///
/// Returns an error if the document matches neither shape.
pub fn parse_stations(bytes: &[u8]) -> Result<Vec<Station>> {
    let feed: StationFeed = serde_json::from_slice(bytes)
        .context("Station catalog is neither a GBFS document nor a station array")?;

    let entries = match feed {
        StationFeed::Gbfs { data } => data.stations,
        StationFeed::Bare(stations) => stations,
    };

    let mut stations = Vec::with_capacity(entries.len());
    let mut skipped = 0;

    for (index, entry) in entries.into_iter().enumerate() {
        let outcome = serde_json::from_value::<StationRecord>(entry)
            .map_err(anyhow::Error::from)
            .and_then(|record| Station::try_from(record).map_err(anyhow::Error::from));

        match outcome {
            Ok(station) => {
                if !station.has_coordinates() {
                    warn!(station_id = %station.id, "Station has no usable coordinates");
                }
                stations.push(station);
            }
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed station");
                skipped += 1;
            }
        }
    }

    debug!(accepted = stations.len(), skipped, "Station catalog parsed");
    Ok(stations)
}

/// Reads a trip log CSV with headers. Rows with missing or unparseable
/// timestamps or station ids are logged and skipped; they never reach the
/// minute buckets.
///
/// # Errors
///
/// Returns an error if the CSV cannot be read or its header row lacks any of
/// `started_at`, `ended_at`, `start_station_id`, `end_station_id`.
pub fn parse_trips<R: Read>(reader: R) -> Result<TripLog> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut log = TripLog::default();

    let headers = rdr.headers().context("Trip log has no readable header row")?;
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .into_iter()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        bail!("Trip log is missing required columns: {}", missing.join(", "));
    }

    for (row, result) in rdr.deserialize::<TripRecord>().enumerate() {
        let outcome = result
            .map_err(anyhow::Error::from)
            .and_then(|record| Trip::try_from(record).map_err(anyhow::Error::from));

        match outcome {
            Ok(trip) => log.trips.push(trip),
            Err(e) => {
                // header is line 1
                warn!(line = row + 2, error = %e, "Skipping malformed trip");
                log.rejected += 1;
            }
        }
    }

    debug!(
        accepted = log.trips.len(),
        rejected = log.rejected,
        "Trip log parsed"
    );
    Ok(log)
}
