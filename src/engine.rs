//! The recomputation pipeline: select → aggregate → scale.

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::TrafficError;
use crate::model::{Station, Trip};
use crate::time::TimeFilter;
use crate::traffic::{
    FlowScale, RadiusScale, RingWindow, StationMarker, TrafficSnapshot, TripIndex, aggregate,
};

/// Holds the static catalog and the minute-bucketed trip log.
///
/// Bucketing happens once in [`TrafficModel::new`]; every call to
/// [`TrafficModel::snapshot`] rebuilds the per-station records from scratch
/// and never mutates the model.
#[derive(Debug, Clone)]
pub struct TrafficModel {
    stations: Vec<Station>,
    index: TripIndex,
    window: RingWindow,
    config: EngineConfig,
}

impl TrafficModel {
    #[tracing::instrument(skip_all, fields(stations = stations.len(), trips = trips.len()))]
    pub fn new(
        stations: Vec<Station>,
        trips: Vec<Trip>,
        config: EngineConfig,
    ) -> Result<Self, TrafficError> {
        config.validate()?;
        let window = config.window()?;
        let index = TripIndex::new(trips);

        info!(
            trips = index.len(),
            half_width = window.half_width(),
            "Trip log bucketed by minute of day"
        );

        Ok(Self {
            stations,
            index,
            window,
            config,
        })
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn index(&self) -> &TripIndex {
        &self.index
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self, filter: TimeFilter) -> TrafficSnapshot {
        let traffic = aggregate(
            &self.stations,
            self.index.departures_in(filter, self.window),
            self.index.arrivals_in(filter, self.window),
        );
        let radius = RadiusScale::for_traffic(&traffic, filter, &self.config);

        debug!(
            filter = %filter.label(),
            max_traffic = radius.max_traffic(),
            "Station traffic recomputed"
        );

        TrafficSnapshot {
            filter,
            traffic,
            radius,
            flow: FlowScale,
        }
    }

    /// Render attributes for every catalog station under `snapshot`.
    pub fn markers(&self, snapshot: &TrafficSnapshot) -> Vec<StationMarker> {
        self.stations
            .iter()
            .zip(snapshot.traffic())
            .map(|(station, record)| StationMarker {
                station_id: record.station_id().to_string(),
                name: station.name.clone(),
                coordinates: station.coordinates,
                radius: snapshot.radius(record),
                departure_ratio: snapshot.departure_ratio(record),
                departures: record.departures(),
                arrivals: record.arrivals(),
                total_traffic: record.total_traffic(),
                tooltip: record.tooltip(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;
    use chrono::NaiveDate;

    fn trip(from: &str, to: &str, start: (u32, u32), end: (u32, u32)) -> Trip {
        let day = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        Trip::new(
            from,
            to,
            day.and_hms_opt(start.0, start.1, 0).unwrap(),
            day.and_hms_opt(end.0, end.1, 0).unwrap(),
        )
    }

    fn model() -> TrafficModel {
        let stations = vec![
            Station::new(
                "A",
                Some(Coordinates {
                    longitude: -71.09,
                    latitude: 42.36,
                }),
            ),
            Station::new("B", None),
            Station::new("quiet", None),
        ];
        let trips = vec![
            trip("A", "B", (23, 59), (0, 10)),
            trip("A", "B", (0, 30), (0, 50)),
            trip("B", "A", (1, 40), (2, 0)),
        ];
        TrafficModel::new(stations, trips, EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_any_filter_counts_whole_log() {
        let model = model();
        let snapshot = model.snapshot(TimeFilter::Any);

        assert_eq!(snapshot.traffic()[0].departures(), 2);
        assert_eq!(snapshot.traffic()[0].arrivals(), 1);
        assert_eq!(snapshot.traffic()[1].departures(), 1);
        assert_eq!(snapshot.traffic()[1].arrivals(), 2);
        assert_eq!(snapshot.total_departures(), 3);
        assert_eq!(snapshot.total_arrivals(), 3);
        assert_eq!(snapshot.radius_scale().range(), (0.0, 25.0));
    }

    #[test]
    fn test_midnight_window() {
        let model = model();
        let snapshot = model.snapshot(TimeFilter::from_slider(0).unwrap());

        // departures at 23:59 and 00:30 are in, 01:40 is out
        assert_eq!(snapshot.traffic()[0].departures(), 2);
        assert_eq!(snapshot.traffic()[1].departures(), 0);
        // arrivals at 00:10 and 00:50 are in, 02:00 is out
        assert_eq!(snapshot.traffic()[1].arrivals(), 2);
        assert_eq!(snapshot.traffic()[0].arrivals(), 0);
        assert_eq!(snapshot.radius_scale().range(), (3.0, 50.0));
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let model = model();
        let filter = TimeFilter::from_slider(45).unwrap();

        let first = model.snapshot(filter);
        let second = model.snapshot(filter);

        assert_eq!(first.traffic(), second.traffic());
        assert_eq!(first.radius_scale(), second.radius_scale());
    }

    #[test]
    fn test_markers_for_idle_station() {
        let model = model();
        let snapshot = model.snapshot(TimeFilter::from_slider(720).unwrap());
        let markers = model.markers(&snapshot);

        assert_eq!(markers.len(), 3);
        for marker in &markers {
            assert_eq!(marker.total_traffic, 0);
            assert_eq!(marker.radius, 0.0);
            assert_eq!(marker.departure_ratio, 0.5);
        }
        assert!(markers[0].coordinates.is_some());
        assert!(markers[1].coordinates.is_none());
        assert_eq!(markers[2].tooltip, "0 trips (0 departures, 0 arrivals)");
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            throttle_interval_ms: 0,
            ..Default::default()
        };
        assert!(TrafficModel::new(Vec::new(), Vec::new(), config).is_err());
    }
}
