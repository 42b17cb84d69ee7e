//! Records produced on every recomputation of the pipeline.

use serde::Serialize;

use crate::model::Coordinates;
use crate::time::TimeFilter;
use crate::traffic::scale::{FlowScale, RadiusScale};

/// Departure and arrival counts for one catalog station under the current filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationTraffic {
    pub(crate) station_id: String,
    pub(crate) departures: usize,
    pub(crate) arrivals: usize,
    pub(crate) total_traffic: usize,
}

impl StationTraffic {
    pub fn new(station_id: impl Into<String>, departures: usize, arrivals: usize) -> Self {
        Self {
            station_id: station_id.into(),
            departures,
            arrivals,
            total_traffic: departures + arrivals,
        }
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn departures(&self) -> usize {
        self.departures
    }

    pub fn arrivals(&self) -> usize {
        self.arrivals
    }

    pub fn total_traffic(&self) -> usize {
        self.total_traffic
    }

    /// Hover text for the station marker.
    pub fn tooltip(&self) -> String {
        format!(
            "{} trips ({} departures, {} arrivals)",
            self.total_traffic, self.departures, self.arrivals
        )
    }
}

/// Everything a renderer needs to draw one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMarker {
    pub station_id: String,
    pub name: Option<String>,
    /// `None` means the catalog had no usable coordinates for this station.
    pub coordinates: Option<Coordinates>,
    pub radius: f64,
    pub departure_ratio: f64,
    pub departures: usize,
    pub arrivals: usize,
    pub total_traffic: usize,
    pub tooltip: String,
}

/// Result of one pipeline run for a given filter.
#[derive(Debug, Clone, Serialize)]
pub struct TrafficSnapshot {
    pub(crate) filter: TimeFilter,
    pub(crate) traffic: Vec<StationTraffic>,
    pub(crate) radius: RadiusScale,
    pub(crate) flow: FlowScale,
}

impl TrafficSnapshot {
    pub fn filter(&self) -> TimeFilter {
        self.filter
    }

    /// One record per catalog station, in catalog order.
    pub fn traffic(&self) -> &[StationTraffic] {
        &self.traffic
    }

    pub fn radius_scale(&self) -> &RadiusScale {
        &self.radius
    }

    pub fn flow_scale(&self) -> &FlowScale {
        &self.flow
    }

    pub fn radius(&self, record: &StationTraffic) -> f64 {
        self.radius.radius(record.total_traffic)
    }

    pub fn departure_ratio(&self, record: &StationTraffic) -> f64 {
        self.flow.ratio(record.departures, record.total_traffic)
    }

    /// Sum of departures over all catalog stations.
    pub fn total_departures(&self) -> usize {
        self.traffic.iter().map(|t| t.departures).sum()
    }

    pub fn total_arrivals(&self) -> usize {
        self.traffic.iter().map(|t| t.arrivals).sum()
    }

    /// The `n` stations with the most traffic, busiest first. Ties keep catalog order.
    pub fn busiest(&self, n: usize) -> Vec<&StationTraffic> {
        let mut ranked: Vec<_> = self.traffic.iter().collect();
        ranked.sort_by(|a, b| b.total_traffic.cmp(&a.total_traffic));
        ranked.truncate(n);
        ranked
    }
}
