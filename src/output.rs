//! Output formatting and persistence for traffic snapshots.
//!
//! Supports a log summary, JSON serialization, and CSV export of markers.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use tracing::{debug, info};

use crate::traffic::{StationMarker, TrafficSnapshot};

/// Flat CSV row for a [`StationMarker`]; empty lon/lat means unavailable.
#[derive(Debug, Serialize)]
struct MarkerRow<'a> {
    station_id: &'a str,
    name: Option<&'a str>,
    has_coordinates: bool,
    longitude: Option<f64>,
    latitude: Option<f64>,
    departures: usize,
    arrivals: usize,
    total_traffic: usize,
    radius: f64,
    departure_ratio: f64,
}

impl<'a> From<&'a StationMarker> for MarkerRow<'a> {
    fn from(marker: &'a StationMarker) -> Self {
        MarkerRow {
            station_id: &marker.station_id,
            name: marker.name.as_deref(),
            has_coordinates: marker.coordinates.is_some(),
            longitude: marker.coordinates.map(|c| c.longitude),
            latitude: marker.coordinates.map(|c| c.latitude),
            departures: marker.departures,
            arrivals: marker.arrivals,
            total_traffic: marker.total_traffic,
            radius: marker.radius,
            departure_ratio: marker.departure_ratio,
        }
    }
}

#[derive(Serialize)]
struct SnapshotDocument<'a> {
    label: String,
    snapshot: &'a TrafficSnapshot,
    markers: &'a [StationMarker],
}

/// Logs the overall counts and the `top` busiest stations of a snapshot.
pub fn log_summary(snapshot: &TrafficSnapshot, top: usize) {
    info!(
        filter = %snapshot.filter().label(),
        stations = snapshot.traffic().len(),
        departures = snapshot.total_departures(),
        arrivals = snapshot.total_arrivals(),
        max_traffic = snapshot.radius_scale().max_traffic(),
        "Traffic snapshot"
    );

    for (rank, record) in snapshot.busiest(top).into_iter().enumerate() {
        info!(
            rank = rank + 1,
            station_id = record.station_id(),
            departures = record.departures(),
            arrivals = record.arrivals(),
            total = record.total_traffic(),
            radius = snapshot.radius(record),
            departure_ratio = snapshot.departure_ratio(record),
            "Busy station"
        );
    }
}

/// Serializes a snapshot and its markers as pretty-printed JSON.
pub fn snapshot_json(snapshot: &TrafficSnapshot, markers: &[StationMarker]) -> Result<String> {
    let document = SnapshotDocument {
        label: snapshot.filter().label(),
        snapshot,
        markers,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn write_json(path: &str, snapshot: &TrafficSnapshot, markers: &[StationMarker]) -> Result<()> {
    let json = snapshot_json(snapshot, markers)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {path}"))?;
    debug!(path, markers = markers.len(), "JSON snapshot written");
    Ok(())
}

/// Writes one CSV row per marker, replacing any existing file.
pub fn write_csv(path: &str, markers: &[StationMarker]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {path}"))?;
    let mut writer = csv::Writer::from_writer(file);

    for marker in markers {
        writer.serialize(MarkerRow::from(marker))?;
    }
    writer.flush()?;

    debug!(path, markers = markers.len(), "CSV markers written");
    Ok(())
}
