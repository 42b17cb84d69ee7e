//! Time bucketing and windowed per-station aggregation.
//!
//! Trips are indexed once into minute-of-day buckets. Each filter change walks
//! only the buckets of the selected window, counts trips per station, and
//! derives the marker scales from the result.

pub mod aggregate;
pub mod bucket;
pub mod scale;
pub mod types;
pub mod window;

pub use aggregate::aggregate;
pub use bucket::{MinuteBuckets, TripIndex};
pub use scale::{FlowScale, RadiusScale};
pub use types::{StationMarker, StationTraffic, TrafficSnapshot};
pub use window::RingWindow;
