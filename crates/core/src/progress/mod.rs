//! Step-level progress events for live observers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::windows::TimeWindow;

/// Where one step of a window attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Progress,
    Done,
    Error,
}

/// Per-window outcome carried on a run-completed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSummary {
    pub window: String,
    pub success: bool,
    pub message: String,
}

/// Progress event published to observers, e.g. a live dashboard.
///
/// Every event carries the run id so a consumer can correlate concurrent
/// windows within one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A run began for the given date and windows.
    RunStarted {
        run_id: String,
        date: NaiveDate,
        windows: Vec<String>,
    },
    /// One step of one label ("login" or a window label) advanced.
    Step {
        run_id: String,
        label: String,
        step: u32,
        total_steps: u32,
        message: String,
        status: StepStatus,
    },
    /// The run finished with one summary per requested window.
    RunCompleted {
        run_id: String,
        date: NaiveDate,
        results: Vec<WindowSummary>,
    },
}

/// Broadcaster for progress events using a tokio broadcast channel.
///
/// Zero or more subscribers; publishing never blocks the run.
#[derive(Debug, Clone)]
pub struct ProgressBroadcaster {
    sender: broadcast::Sender<ProgressEvent>,
}

impl ProgressBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast an event to all subscribers.
    pub fn broadcast(&self, event: ProgressEvent) {
        // Ignore send errors - they just mean no one is listening
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }

    /// Convenience method to announce a run start.
    pub fn run_started(&self, run_id: &str, date: NaiveDate, windows: &[TimeWindow]) {
        self.broadcast(ProgressEvent::RunStarted {
            run_id: run_id.to_string(),
            date,
            windows: windows.iter().map(|w| w.label().to_string()).collect(),
        });
    }

    /// Convenience method to publish one step.
    pub fn step(
        &self,
        run_id: &str,
        label: &str,
        step: u32,
        total_steps: u32,
        message: &str,
        status: StepStatus,
    ) {
        self.broadcast(ProgressEvent::Step {
            run_id: run_id.to_string(),
            label: label.to_string(),
            step,
            total_steps,
            message: message.to_string(),
            status,
        });
    }

    /// Convenience method to announce run completion.
    pub fn run_completed(&self, run_id: &str, date: NaiveDate, results: Vec<WindowSummary>) {
        self.broadcast(ProgressEvent::RunCompleted {
            run_id: run_id.to_string(),
            date,
            results,
        });
    }
}

impl Default for ProgressBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}
