//! Scheduler configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the trigger scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between trigger checks.
    /// Custom schedules match on an exact minute, so this should stay at
    /// one minute or below.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,

    /// Local hour of the daily trigger.
    #[serde(default = "default_daily_hour")]
    pub daily_hour: u32,

    /// Local minute of the daily trigger.
    #[serde(default)]
    pub daily_minute: u32,
}

fn default_tick_interval() -> u64 {
    60
}

fn default_daily_hour() -> u32 {
    7
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
            daily_hour: default_daily_hour(),
            daily_minute: 0,
        }
    }
}
