//! Per-window reservation task.
//!
//! One task owns the full fetch -> parse -> select -> submit sequence for a
//! single time window, including its stagger delay and bounded retry. A
//! portal rejection (success=false with a message) is a final outcome, not
//! a retryable error.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::dates::ReservationDate;
use crate::metrics;
use crate::portal::{parse_reservation_form, PortalGateway, ReservationSubmission};
use crate::progress::{ProgressBroadcaster, StepStatus};
use crate::seats::select_seat;
use crate::windows::TimeWindow;

use super::types::{AttemptResult, TaskError};

const MAX_ATTEMPTS: u32 = 2;
const TASK_STEPS: u32 = 5;

/// A single window's reservation attempt.
///
/// Built by the orchestrator, one per requested window; several tasks may
/// share the same gateway (and therefore the same portal session).
pub struct ReservationTask {
    pub gateway: Arc<dyn PortalGateway>,
    pub progress: ProgressBroadcaster,
    pub run_id: String,
    pub window: TimeWindow,
    pub date: ReservationDate,
    pub session_code: String,
    pub seat_priority: Vec<u32>,
    pub jitter_bound_ms: u64,
}

impl ReservationTask {
    /// Run this task to completion: stagger, then up to two attempts with a
    /// short backoff in between.
    pub async fn run(self) -> Result<AttemptResult, TaskError> {
        self.stagger().await;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt_once().await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < MAX_ATTEMPTS => {
                    warn!(
                        window = %self.window,
                        attempt,
                        error = %e,
                        "Reservation attempt failed, retrying"
                    );
                    self.step(TASK_STEPS, &e.to_string(), StepStatus::Error);
                    metrics::WINDOW_ATTEMPTS.with_label_values(&["failed"]).inc();
                    tokio::time::sleep(backoff_delay(attempt)).await;
                }
                Err(e) => {
                    warn!(
                        window = %self.window,
                        attempt,
                        error = %e,
                        "Reservation attempt failed, giving up"
                    );
                    self.step(TASK_STEPS, &e.to_string(), StepStatus::Error);
                    metrics::WINDOW_ATTEMPTS.with_label_values(&["failed"]).inc();
                    return Err(e);
                }
            }
        }
    }

    /// One full fetch -> parse -> select -> submit pass.
    async fn attempt_once(&self) -> Result<AttemptResult, TaskError> {
        self.step(1, "درخواست صفحه پاپ‌آپ", StepStatus::Progress);
        let markup = self
            .gateway
            .fetch_window_fragment(&self.session_code, &self.date, self.window)
            .await?;

        let form = parse_reservation_form(&markup)?;
        metrics::SEATS_PARSED.observe(form.seats.len() as f64);
        debug!(
            window = %self.window,
            seats = form.seats.len(),
            "Parsed seat fragment"
        );

        self.step(2, "انتخاب صندلی بر اساس اولویت", StepStatus::Progress);
        let seat = select_seat(&form.seats, &self.seat_priority)?;

        self.step(
            3,
            &format!("ارسال درخواست برای صندلی {}", seat.number),
            StepStatus::Progress,
        );
        let submission = ReservationSubmission {
            token: form.token.clone(),
            seat_element_id: seat.element_id.clone(),
            user_id: form.user_id.clone(),
        };
        let response = self
            .gateway
            .submit_reservation(&self.date, self.window, &submission)
            .await?;

        let step_message = if response.message.is_empty() {
            "پاسخ دریافت شد"
        } else {
            response.message.as_str()
        };
        self.step(4, step_message, StepStatus::Progress);

        let result_label = if response.success { "success" } else { "rejected" };
        metrics::WINDOW_ATTEMPTS
            .with_label_values(&[result_label])
            .inc();

        Ok(AttemptResult {
            window: self.window,
            success: response.success,
            message: response.message,
            raw_response: Some(response.raw),
        })
    }

    /// Random start delay so concurrent windows do not hit the portal in a
    /// single burst.
    async fn stagger(&self) {
        if self.jitter_bound_ms == 0 {
            return;
        }
        let delay = rand::thread_rng().gen_range(0..self.jitter_bound_ms);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    fn step(&self, step: u32, message: &str, status: StepStatus) {
        self.progress.step(
            &self.run_id,
            self.window.label(),
            step,
            TASK_STEPS,
            message,
            status,
        );
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let jitter: u64 = rand::thread_rng().gen_range(0..200);
    Duration::from_millis(200 + u64::from(attempt) * 200 + jitter)
}
