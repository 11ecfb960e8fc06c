//! Mock reservation runner for testing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::dates::{DateMode, ReservationDate};
use crate::orchestrator::{AttemptResult, OrchestratorError, ReservationRunner, RunReport};
use crate::windows::TimeWindow;

/// A recorded run invocation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRun {
    pub windows: Vec<TimeWindow>,
    pub run_id: String,
    pub date_override: Option<NaiveDate>,
}

/// Mock implementation of the ReservationRunner trait.
///
/// Records every invocation, reports success for all windows by default,
/// and can fail its next run or hold each run for a configurable delay.
pub struct MockRunner {
    runs: Arc<RwLock<Vec<RecordedRun>>>,
    /// If set, the next run fails with an authentication error.
    next_error: Arc<RwLock<Option<String>>>,
    /// Time each run spends before returning.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            runs: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    /// Configure the next run to fail with the given authentication error.
    pub async fn set_next_error(&self, message: &str) {
        *self.next_error.write().await = Some(message.to_string());
    }

    /// Hold every run for `delay` before returning.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Get recorded run invocations in call order.
    pub async fn recorded_runs(&self) -> Vec<RecordedRun> {
        self.runs.read().await.clone()
    }

    /// Get the number of runs performed.
    pub async fn run_count(&self) -> usize {
        self.runs.read().await.len()
    }
}

#[async_trait]
impl ReservationRunner for MockRunner {
    async fn run(
        &self,
        windows: &[TimeWindow],
        run_id: &str,
        date_override: Option<NaiveDate>,
    ) -> Result<RunReport, OrchestratorError> {
        self.runs.write().await.push(RecordedRun {
            windows: windows.to_vec(),
            run_id: run_id.to_string(),
            date_override,
        });

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.next_error.write().await.take() {
            return Err(OrchestratorError::Authentication(message));
        }

        let date = match date_override {
            Some(date) => ReservationDate::from_date(date),
            None => ReservationDate::for_mode(DateMode::Today),
        };

        Ok(RunReport {
            run_id: run_id.to_string(),
            date,
            results: windows
                .iter()
                .map(|&window| AttemptResult {
                    window,
                    success: true,
                    message: "mock reservation".to_string(),
                    raw_response: None,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_runs() {
        let runner = MockRunner::new();
        let windows = [TimeWindow::Morning, TimeWindow::Evening];

        let report = runner.run(&windows, "run-1", None).await.unwrap();
        assert_eq!(report.results.len(), 2);
        assert!(report.all_succeeded());

        let runs = runner.recorded_runs().await;
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].run_id, "run-1");
        assert_eq!(runs[0].windows, windows);
        assert!(runs[0].date_override.is_none());
    }

    #[tokio::test]
    async fn test_error_injection_is_consumed() {
        let runner = MockRunner::new();
        runner.set_next_error("mock auth failure").await;

        let err = runner
            .run(&[TimeWindow::Morning], "run-1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::Authentication(_)));

        // The error is consumed; the failed run was still recorded.
        assert!(runner.run(&[TimeWindow::Morning], "run-2", None).await.is_ok());
        assert_eq!(runner.run_count().await, 2);
    }

    #[tokio::test]
    async fn test_date_override_flows_into_report() {
        let runner = MockRunner::new();
        let date = NaiveDate::from_ymd_opt(2025, 12, 9).unwrap();

        let report = runner
            .run(&[TimeWindow::Morning], "run-1", Some(date))
            .await
            .unwrap();
        assert_eq!(report.date.date, date);
        assert_eq!(
            runner.recorded_runs().await[0].date_override,
            Some(date)
        );
    }
}
