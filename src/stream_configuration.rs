//! Configuration types for timed decorators

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// What a recurring timer does when the runtime falls behind its schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissedTicks {
    /// Fire every missed tick as fast as possible
    Burst,
    /// Keep `period` spacing from the late tick onwards
    Delay,
    /// Drop missed ticks and stay aligned to the original schedule
    Skip,
}

impl Default for MissedTicks {
    fn default() -> Self {
        MissedTicks::Delay
    }
}

impl From<MissedTicks> for MissedTickBehavior {
    fn from(ticks: MissedTicks) -> Self {
        match ticks {
            MissedTicks::Burst => MissedTickBehavior::Burst,
            MissedTicks::Delay => MissedTickBehavior::Delay,
            MissedTicks::Skip => MissedTickBehavior::Skip,
        }
    }
}

/// Timer configuration for interval, repeatedly, sequentially, later and poll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub missed_ticks: MissedTicks,
    /// Shortest period a recurring timer accepts
    pub min_period: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            missed_ticks: MissedTicks::Delay,
            min_period: Duration::from_millis(1),
        }
    }
}

impl TimerConfig {
    /// Check a recurring period against `min_period`
    pub fn accepts(&self, period: Duration) -> bool {
        period >= self.min_period && !period.is_zero()
    }
}
