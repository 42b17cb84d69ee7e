use std::ops::Range;

use crate::error::TrafficError;
use crate::time::MINUTES_PER_DAY;

/// A fixed-width window over a ring of `ring_size` slots, centred on a slot.
///
/// The window covers `[center - half_width, center + half_width)` modulo the
/// ring size. When that interval straddles slot 0 it is split in two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingWindow {
    ring_size: usize,
    half_width: usize,
}

impl RingWindow {
    pub const MINUTE_OF_DAY: RingWindow = RingWindow {
        ring_size: MINUTES_PER_DAY,
        half_width: 60,
    };

    pub fn new(ring_size: usize, half_width: usize) -> Result<Self, TrafficError> {
        if ring_size == 0 {
            return Err(TrafficError::InvalidConfig(
                "ring size must be positive".to_string(),
            ));
        }
        if half_width == 0 {
            return Err(TrafficError::InvalidConfig(
                "window half-width must be positive".to_string(),
            ));
        }
        Ok(Self {
            ring_size,
            half_width,
        })
    }

    pub fn ring_size(&self) -> usize {
        self.ring_size
    }

    pub fn half_width(&self) -> usize {
        self.half_width
    }

    /// Number of slots covered by every window, whatever its centre.
    pub fn width(&self) -> usize {
        (2 * self.half_width).min(self.ring_size)
    }

    /// Slot ranges covered by the window centred on `center`, in ring order
    /// starting from the window's lower edge. The second range is empty unless
    /// the window wraps.
    pub fn spans(&self, center: usize) -> (Range<usize>, Range<usize>) {
        let size = self.ring_size;
        if self.width() == size {
            return (0..size, 0..0);
        }

        let center = center % size;
        let min = (center + size - self.half_width) % size;
        let max = (center + self.half_width) % size;

        if min <= max {
            (min..max, 0..0)
        } else {
            (min..size, 0..max)
        }
    }

    pub fn contains(&self, center: usize, slot: usize) -> bool {
        let (head, tail) = self.spans(center);
        head.contains(&slot) || tail.contains(&slot)
    }
}

impl Default for RingWindow {
    fn default() -> Self {
        Self::MINUTE_OF_DAY
    }
}
