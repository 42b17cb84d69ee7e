//! Engine tuning, loaded from an optional JSON file.
//!
//! ```json
//! {
//!   "window_half_width_minutes": 60,
//!   "throttle_interval_ms": 50,
//!   "unfiltered_radius": [0, 25],
//!   "filtered_radius": [3, 50]
//! }
//! ```
//!
//! Missing keys fall back to the defaults above.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::error::TrafficError;
use crate::time::MINUTES_PER_DAY;
use crate::traffic::RingWindow;
use crate::traffic::scale::{FILTERED_RADIUS, UNFILTERED_RADIUS};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub window_half_width_minutes: u16,
    pub throttle_interval_ms: u64,
    pub unfiltered_radius: (f64, f64),
    pub filtered_radius: (f64, f64),
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_half_width_minutes: 60,
            throttle_interval_ms: 50,
            unfiltered_radius: UNFILTERED_RADIUS,
            filtered_radius: FILTERED_RADIUS,
        }
    }
}

impl EngineConfig {
    /// Loads and validates the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config '{path}'"))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse engine config '{path}'"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrafficError> {
        self.window()?;
        if self.throttle_interval_ms == 0 {
            return Err(TrafficError::InvalidConfig(
                "throttle_interval_ms must be positive".to_string(),
            ));
        }
        for (name, (lo, hi)) in [
            ("unfiltered_radius", self.unfiltered_radius),
            ("filtered_radius", self.filtered_radius),
        ] {
            if !(lo.is_finite() && hi.is_finite()) || lo < 0.0 || lo > hi {
                return Err(TrafficError::InvalidConfig(format!(
                    "{name} must be a non-negative [min, max] pair, got [{lo}, {hi}]"
                )));
            }
        }
        Ok(())
    }

    pub fn window(&self) -> Result<RingWindow, TrafficError> {
        RingWindow::new(MINUTES_PER_DAY, self.window_half_width_minutes as usize)
    }

    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_interval_ms)
    }
}
