//! Booking orchestrator implementation.
//!
//! Drives one reservation run end to end: login with a single fresh-session
//! retry, one task per requested window with bounded parallelism, then
//! result aggregation, audit writes and progress events. Individual window
//! failures never abort the run; only a failed login does.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::{error, info, warn};

use crate::audit::{AuditEntry, AuditHandle, AuditStatus};
use crate::dates::ReservationDate;
use crate::metrics;
use crate::portal::PortalGateway;
use crate::progress::{ProgressBroadcaster, StepStatus, WindowSummary};
use crate::settings::{Credentials, SettingsStore};
use crate::windows::TimeWindow;

use super::concurrency::run_bounded;
use super::task::ReservationTask;
use super::types::{AttemptResult, OrchestratorError, ReservationRunner, RunReport};

/// Quota notices the portal embeds in successful reservation messages.
static QUOTA_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new("سهم|باقی مانده").unwrap());

const LOGIN_STEPS: u32 = 3;
const TASK_STEPS: u32 = 5;

/// The booking orchestrator.
///
/// Shares one portal gateway (and its cookie-backed session) across all
/// window tasks of a run.
pub struct BookingOrchestrator {
    gateway: Arc<dyn PortalGateway>,
    settings: Arc<dyn SettingsStore>,
    audit: Option<AuditHandle>,
    progress: ProgressBroadcaster,
}

impl BookingOrchestrator {
    pub fn new(
        gateway: Arc<dyn PortalGateway>,
        settings: Arc<dyn SettingsStore>,
        audit: Option<AuditHandle>,
        progress: ProgressBroadcaster,
    ) -> Self {
        Self {
            gateway,
            settings,
            audit,
            progress,
        }
    }

    /// Log in, retrying exactly once with a fresh session on failure.
    async fn ensure_logged_in(
        &self,
        run_id: &str,
        credentials: &Credentials,
    ) -> Result<(), OrchestratorError> {
        self.progress
            .step(run_id, "login", 0, LOGIN_STEPS, "شروع لاگین", StepStatus::Progress);

        match self.gateway.login(credentials).await {
            Ok(()) => {
                self.progress
                    .step(run_id, "login", LOGIN_STEPS, LOGIN_STEPS, "لاگین موفق", StepStatus::Done);
                Ok(())
            }
            Err(first) => {
                warn!(error = %first, "Login failed, retrying with a fresh session");
                metrics::LOGIN_RETRIES.inc();
                self.gateway.reset_session().await;

                match self.gateway.login(credentials).await {
                    Ok(()) => {
                        self.progress.step(
                            run_id,
                            "login",
                            LOGIN_STEPS,
                            LOGIN_STEPS,
                            "لاگین مجدد موفق",
                            StepStatus::Done,
                        );
                        Ok(())
                    }
                    Err(second) => {
                        error!(error = %second, "Login failed again, aborting run");
                        self.progress.step(
                            run_id,
                            "login",
                            LOGIN_STEPS,
                            LOGIN_STEPS,
                            &second.to_string(),
                            StepStatus::Error,
                        );
                        Err(OrchestratorError::Authentication(second.to_string()))
                    }
                }
            }
        }
    }

    /// Write the audit entry and final progress step for one window outcome.
    async fn record_outcome(&self, run_id: &str, date: &ReservationDate, result: &AttemptResult) {
        // A result without a raw response came from a task error, not from
        // a portal answer; audit carries it as error text instead of a
        // portal message.
        let from_error = result.raw_response.is_none() && !result.success;
        let (message, error_text) = if from_error {
            (None, Some(result.message.clone()))
        } else {
            (Some(result.message.clone()), None)
        };

        if let Some(audit) = &self.audit {
            let status = if result.success {
                AuditStatus::Success
            } else {
                AuditStatus::Failed
            };
            audit
                .record(AuditEntry::new(
                    date.date,
                    result.window.label(),
                    status,
                    message,
                    error_text,
                ))
                .await;
        }

        let (fallback, status) = if result.success {
            ("پایان", StepStatus::Done)
        } else if from_error {
            ("خطا", StepStatus::Error)
        } else {
            ("پایان", StepStatus::Error)
        };
        let step_message = if result.message.is_empty() {
            fallback
        } else {
            result.message.as_str()
        };
        self.progress
            .step(run_id, result.window.label(), TASK_STEPS, TASK_STEPS, step_message, status);
    }

    /// Persist the first quota notice found among successful messages.
    fn persist_quota(&self, results: &[AttemptResult]) {
        let Some(message) = results
            .iter()
            .find(|r| r.success && QUOTA_PATTERN.is_match(&r.message))
            .map(|r| r.message.clone())
        else {
            return;
        };

        let mut settings = match self.settings.load() {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to load settings for quota update: {}", e);
                return;
            }
        };
        settings.last_quota = Some(message);
        if let Err(e) = self.settings.save(&settings) {
            error!("Failed to persist quota message: {}", e);
        }
    }
}

#[async_trait]
impl ReservationRunner for BookingOrchestrator {
    async fn run(
        &self,
        windows: &[TimeWindow],
        run_id: &str,
        date_override: Option<NaiveDate>,
    ) -> Result<RunReport, OrchestratorError> {
        let started = Instant::now();
        let settings = self.settings.load()?;

        let date = match date_override {
            Some(date) => ReservationDate::from_date(date),
            None => ReservationDate::for_mode(settings.date_mode),
        };

        info!(
            run_id,
            date = %date.date,
            windows = windows.len(),
            "Starting reservation run"
        );
        self.progress.run_started(run_id, date.date, windows);

        if let Err(e) = self.ensure_logged_in(run_id, &settings.credentials).await {
            metrics::RUNS_TOTAL.with_label_values(&["auth_failed"]).inc();
            return Err(e);
        }

        let tasks: Vec<_> = windows
            .iter()
            .map(|&window| {
                ReservationTask {
                    gateway: Arc::clone(&self.gateway),
                    progress: self.progress.clone(),
                    run_id: run_id.to_string(),
                    window,
                    date: date.clone(),
                    session_code: settings.credentials.session_code.clone(),
                    seat_priority: settings.seat_priority.clone(),
                    jitter_bound_ms: settings.start_jitter_ms,
                }
                .run()
            })
            .collect();

        let outcomes = run_bounded(tasks, settings.concurrency).await;

        let mut results = Vec::with_capacity(outcomes.len());
        for (&window, outcome) in windows.iter().zip(outcomes) {
            let result = match outcome {
                Ok(result) => result,
                Err(e) => AttemptResult::failed(window, &e),
            };
            self.record_outcome(run_id, &date, &result).await;
            results.push(result);
        }

        self.persist_quota(&results);

        let report = RunReport {
            run_id: run_id.to_string(),
            date: date.clone(),
            results,
        };

        let summaries: Vec<WindowSummary> = report
            .results
            .iter()
            .map(|r| WindowSummary {
                window: r.window.label().to_string(),
                success: r.success,
                message: r.message.clone(),
            })
            .collect();
        self.progress.run_completed(run_id, date.date, summaries);

        let outcome_label = if report.all_succeeded() {
            "success"
        } else if report.any_succeeded() {
            "partial"
        } else {
            "failed"
        };
        metrics::RUNS_TOTAL.with_label_values(&[outcome_label]).inc();
        metrics::RUN_DURATION.observe(started.elapsed().as_secs_f64());

        info!(
            run_id,
            succeeded = report.results.iter().filter(|r| r.success).count(),
            failed = report.results.iter().filter(|r| !r.success).count(),
            "Reservation run finished"
        );
        Ok(report)
    }
}
