use crate::model::Trip;
use crate::time::{MINUTES_PER_DAY, MinuteOfDay, TimeFilter};
use crate::traffic::window::RingWindow;

/// One growable slot per minute of the day. Never resized after construction.
#[derive(Debug, Clone)]
pub struct MinuteBuckets<T> {
    slots: Vec<Vec<T>>,
}

impl<T> MinuteBuckets<T> {
    pub fn new() -> Self {
        Self {
            slots: (0..MINUTES_PER_DAY).map(|_| Vec::new()).collect(),
        }
    }

    pub fn push(&mut self, minute: MinuteOfDay, item: T) {
        self.slots[minute.index()].push(item);
    }

    pub fn slot(&self, minute: MinuteOfDay) -> &[T] {
        &self.slots[minute.index()]
    }

    pub fn slots(&self) -> &[Vec<T>] {
        &self.slots
    }

    /// Total number of entries across all slots.
    pub fn len(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    /// Flattens the slots selected by `filter`.
    ///
    /// [`TimeFilter::Any`] yields every entry once, in slot order. A centred
    /// filter only walks the slots of its window, so the cost follows the
    /// window size rather than the whole day.
    pub fn select(
        &self,
        filter: TimeFilter,
        window: RingWindow,
    ) -> impl Iterator<Item = &T> + '_ {
        let (head, tail) = match filter {
            TimeFilter::Any => (0..MINUTES_PER_DAY, 0..0),
            TimeFilter::Around(center) => window.spans(center.index()),
        };

        self.slots[head]
            .iter()
            .chain(self.slots[tail].iter())
            .flatten()
    }
}

impl<T> Default for MinuteBuckets<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The trip log plus its departure and arrival minute indexes.
///
/// Buckets hold positions into `trips`, so each trip is stored once.
#[derive(Debug, Clone, Default)]
pub struct TripIndex {
    trips: Vec<Trip>,
    departures: MinuteBuckets<usize>,
    arrivals: MinuteBuckets<usize>,
}

impl TripIndex {
    pub fn new(trips: Vec<Trip>) -> Self {
        let mut departures = MinuteBuckets::new();
        let mut arrivals = MinuteBuckets::new();

        for (position, trip) in trips.iter().enumerate() {
            departures.push(trip.start_minute(), position);
            arrivals.push(trip.end_minute(), position);
        }

        Self {
            trips,
            departures,
            arrivals,
        }
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn departures(&self) -> &MinuteBuckets<usize> {
        &self.departures
    }

    pub fn arrivals(&self) -> &MinuteBuckets<usize> {
        &self.arrivals
    }

    /// Trips whose start minute falls inside `filter`.
    pub fn departures_in<'a>(
        &'a self,
        filter: TimeFilter,
        window: RingWindow,
    ) -> impl Iterator<Item = &'a Trip> + 'a {
        self.departures
            .select(filter, window)
            .map(|&position| &self.trips[position])
    }

    /// Trips whose end minute falls inside `filter`.
    pub fn arrivals_in<'a>(
        &'a self,
        filter: TimeFilter,
        window: RingWindow,
    ) -> impl Iterator<Item = &'a Trip> + 'a {
        self.arrivals
            .select(filter, window)
            .map(|&position| &self.trips[position])
    }
}
