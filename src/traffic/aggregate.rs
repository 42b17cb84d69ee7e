use std::collections::HashMap;

use tracing::debug;

use crate::model::{Station, Trip};
use crate::traffic::types::StationTraffic;

/// Counts trips per station id using `key` to pick the station.
fn count_by<'a, I, F>(trips: I, key: F) -> HashMap<&'a str, usize>
where
    I: IntoIterator<Item = &'a Trip>,
    F: Fn(&'a Trip) -> &'a str,
{
    let mut counts = HashMap::new();
    for trip in trips {
        *counts.entry(key(trip)).or_insert(0) += 1;
    }
    counts
}

/// Combines departure and arrival counts into one record per catalog station.
///
/// Output follows catalog order and includes stations with no trips. Trips
/// naming a station outside the catalog are counted but not reported.
pub fn aggregate<'a, D, A>(
    stations: &[Station],
    departures: D,
    arrivals: A,
) -> Vec<StationTraffic>
where
    D: IntoIterator<Item = &'a Trip>,
    A: IntoIterator<Item = &'a Trip>,
{
    let departures = count_by(departures, |t| t.start_station_id.as_str());
    let arrivals = count_by(arrivals, |t| t.end_station_id.as_str());

    let records: Vec<_> = stations
        .iter()
        .map(|station| {
            let id = station.id.as_str();
            StationTraffic::new(
                id,
                departures.get(id).copied().unwrap_or(0),
                arrivals.get(id).copied().unwrap_or(0),
            )
        })
        .collect();

    let matched: usize = records.iter().map(StationTraffic::total_traffic).sum();
    let counted: usize = departures.values().sum::<usize>() + arrivals.values().sum::<usize>();
    if counted > matched {
        debug!(
            unmatched = counted - matched,
            "Trip endpoints reference stations outside the catalog"
        );
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn trip(from: &str, to: &str) -> Trip {
        let t = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();
        Trip::new(from, to, t, t)
    }

    fn catalog(ids: &[&str]) -> Vec<Station> {
        ids.iter().map(|id| Station::new(*id, None)).collect()
    }

    #[test]
    fn test_every_station_reported_in_catalog_order() {
        let stations = catalog(&["c", "a", "b", "idle"]);
        let trips = vec![trip("a", "b"), trip("a", "c"), trip("b", "a")];

        let records = aggregate(&stations, &trips, &trips);

        let ids: Vec<_> = records.iter().map(StationTraffic::station_id).collect();
        assert_eq!(ids, vec!["c", "a", "b", "idle"]);

        assert_eq!(records[0], StationTraffic::new("c", 0, 1));
        assert_eq!(records[1], StationTraffic::new("a", 2, 1));
        assert_eq!(records[2], StationTraffic::new("b", 1, 1));
        assert_eq!(records[3], StationTraffic::new("idle", 0, 0));
    }

    #[test]
    fn test_departures_and_arrivals_counted_independently() {
        let stations = catalog(&["a", "b"]);
        let trips = vec![trip("a", "b"), trip("a", "b")];

        // only the departures made it into the window
        let records = aggregate(&stations, &trips, std::iter::empty());

        assert_eq!(records[0], StationTraffic::new("a", 2, 0));
        assert_eq!(records[1], StationTraffic::new("b", 0, 0));
    }

    #[test]
    fn test_unknown_stations_are_ignored() {
        let stations = catalog(&["a"]);
        let trips = vec![trip("a", "ghost"), trip("ghost", "a")];

        let records = aggregate(&stations, &trips, &trips);

        assert_eq!(records, vec![StationTraffic::new("a", 1, 1)]);
    }

    #[test]
    fn test_total_is_always_sum() {
        let stations = catalog(&["a", "b", "c"]);
        let trips = vec![trip("a", "b"), trip("b", "c"), trip("c", "c")];

        for record in aggregate(&stations, &trips, &trips) {
            assert_eq!(
                record.total_traffic(),
                record.departures() + record.arrivals()
            );
        }
    }
}
