use serde::Serialize;

use crate::config::EngineConfig;
use crate::time::TimeFilter;
use crate::traffic::types::StationTraffic;

/// Marker radius range when no time is selected.
pub const UNFILTERED_RADIUS: (f64, f64) = (0.0, 25.0);

/// Marker radius range when a minute is selected; sparser data, larger markers.
pub const FILTERED_RADIUS: (f64, f64) = (3.0, 50.0);

/// Square-root scale from total traffic to marker radius.
///
/// Domain is `[0, max_traffic]`. A zero domain maps everything to radius 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadiusScale {
    max_traffic: usize,
    range: (f64, f64),
}

impl RadiusScale {
    pub fn new(max_traffic: usize, range: (f64, f64)) -> Self {
        Self { max_traffic, range }
    }

    /// Builds the scale for the current records, picking the range from `filter`.
    pub fn for_traffic(
        records: &[StationTraffic],
        filter: TimeFilter,
        config: &EngineConfig,
    ) -> Self {
        let max_traffic = records
            .iter()
            .map(StationTraffic::total_traffic)
            .max()
            .unwrap_or(0);

        let range = if filter.is_any() {
            config.unfiltered_radius
        } else {
            config.filtered_radius
        };

        Self::new(max_traffic, range)
    }

    pub fn max_traffic(&self) -> usize {
        self.max_traffic
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn radius(&self, total_traffic: usize) -> f64 {
        if self.max_traffic == 0 {
            return 0.0;
        }
        let (r0, r1) = self.range;
        let t = (total_traffic as f64).sqrt() / (self.max_traffic as f64).sqrt();
        r0 + (r1 - r0) * t
    }
}

/// Quantizes the departure share of a station into three equal-width levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FlowScale;

impl FlowScale {
    pub const LEVELS: [f64; 3] = [0.0, 0.5, 1.0];

    /// Returned when a station had no trips at all.
    pub const BALANCED: f64 = 0.5;

    /// Maps a value in `[0, 1]` to its level. Out-of-domain values clamp to the ends.
    pub fn quantize(&self, share: f64) -> f64 {
        if share.is_nan() {
            return Self::BALANCED;
        }
        let n = Self::LEVELS.len();
        let bucket = (share * n as f64).floor().clamp(0.0, (n - 1) as f64) as usize;
        Self::LEVELS[bucket]
    }

    pub fn ratio(&self, departures: usize, total_traffic: usize) -> f64 {
        if total_traffic == 0 {
            return Self::BALANCED;
        }
        self.quantize(departures as f64 / total_traffic as f64)
    }
}
