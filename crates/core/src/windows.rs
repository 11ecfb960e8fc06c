use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A bookable time window on the reservation portal.
///
/// The portal exposes a fixed grid of five windows per day. Each window is
/// identified on the wire by its hour-range label (e.g. `"8-11"`), which is
/// also what the fragment request sends as `Shour`/`Thour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeWindow {
    Morning,
    Midday,
    Afternoon,
    Evening,
    Night,
}

impl TimeWindow {
    /// All windows in portal display order.
    pub const ALL: [TimeWindow; 5] = [
        TimeWindow::Morning,
        TimeWindow::Midday,
        TimeWindow::Afternoon,
        TimeWindow::Evening,
        TimeWindow::Night,
    ];

    /// The wire label used by the portal for this window.
    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::Morning => "8-11",
            TimeWindow::Midday => "11-14",
            TimeWindow::Afternoon => "14-17",
            TimeWindow::Evening => "17-20",
            TimeWindow::Night => "20-21",
        }
    }

    /// Start hour sent as `Shour` in the fragment request.
    pub fn start_hour(&self) -> u32 {
        match self {
            TimeWindow::Morning => 8,
            TimeWindow::Midday => 11,
            TimeWindow::Afternoon => 14,
            TimeWindow::Evening => 17,
            TimeWindow::Night => 20,
        }
    }

    /// End hour sent as `Thour` in the fragment request.
    pub fn end_hour(&self) -> u32 {
        match self {
            TimeWindow::Morning => 11,
            TimeWindow::Midday => 14,
            TimeWindow::Afternoon => 17,
            TimeWindow::Evening => 20,
            TimeWindow::Night => 21,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown time window: {0}")]
pub struct UnknownWindow(pub String);

impl FromStr for TimeWindow {
    type Err = UnknownWindow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "8-11" => Ok(TimeWindow::Morning),
            "11-14" => Ok(TimeWindow::Midday),
            "14-17" => Ok(TimeWindow::Afternoon),
            "17-20" => Ok(TimeWindow::Evening),
            "20-21" => Ok(TimeWindow::Night),
            other => Err(UnknownWindow(other.to_string())),
        }
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = UnknownWindow;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(window: TimeWindow) -> Self {
        window.label().to_string()
    }
}
