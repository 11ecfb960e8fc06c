//! Booking orchestrator for reservation runs.
//!
//! A run is one pass over a set of time windows for one date:
//! - **Login**: once per run, retried once with a fresh session
//! - **Windows**: one task each, executed with bounded parallelism
//! - **Aggregation**: per-window results, audit entries, progress events

mod concurrency;
mod runner;
mod task;
mod types;

pub use concurrency::run_bounded;
pub use runner::BookingOrchestrator;
pub use task::ReservationTask;
pub use types::{AttemptResult, OrchestratorError, ReservationRunner, RunReport, TaskError};
