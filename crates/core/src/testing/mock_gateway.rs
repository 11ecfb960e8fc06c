//! Mock portal gateway for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::dates::ReservationDate;
use crate::portal::{PortalError, PortalGateway, ReservationSubmission, SubmitResponse};
use crate::settings::Credentials;
use crate::windows::TimeWindow;

/// Mock implementation of the PortalGateway trait.
///
/// Provides controllable behavior for testing:
/// - Script a number of login failures before logins succeed
/// - Configure per-window fragments and submit responses
/// - Track every call for assertions, including peak concurrency
pub struct MockPortalGateway {
    /// Remaining logins that should fail before one succeeds.
    login_failures: AtomicUsize,
    login_calls: AtomicUsize,
    reset_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    /// Configured fragment markup per window.
    fragments: Arc<RwLock<HashMap<TimeWindow, String>>>,
    /// Configured submit responses per window.
    responses: Arc<RwLock<HashMap<TimeWindow, SubmitResponse>>>,
    /// Recorded submissions in call order.
    submissions: Arc<RwLock<Vec<ReservationSubmission>>>,
    /// Recorded (date, window) fragment fetches.
    fetches: Arc<RwLock<Vec<(NaiveDate, TimeWindow)>>>,
    /// Artificial delay inside fetches, for concurrency tests.
    fetch_delay: Arc<RwLock<Option<Duration>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MockPortalGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPortalGateway {
    /// Create a mock gateway where every login succeeds and no windows are
    /// configured.
    pub fn new() -> Self {
        Self {
            login_failures: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
            reset_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            fragments: Arc::new(RwLock::new(HashMap::new())),
            responses: Arc::new(RwLock::new(HashMap::new())),
            submissions: Arc::new(RwLock::new(Vec::new())),
            fetches: Arc::new(RwLock::new(Vec::new())),
            fetch_delay: Arc::new(RwLock::new(None)),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Make the next `count` logins fail.
    pub fn fail_logins(&self, count: usize) {
        self.login_failures.store(count, Ordering::SeqCst);
    }

    /// Configure the fragment returned for a window's fetches.
    pub async fn set_fragment(&self, window: TimeWindow, markup: &str) {
        self.fragments
            .write()
            .await
            .insert(window, markup.to_string());
    }

    /// Configure the response returned for a window's submissions.
    pub async fn set_submit_response(&self, window: TimeWindow, success: bool, message: &str) {
        self.responses.write().await.insert(
            window,
            SubmitResponse {
                success,
                message: message.to_string(),
                raw: serde_json::json!({ "Success": success, "Message": message }),
            },
        );
    }

    /// Delay every fragment fetch, so tests can observe overlap.
    pub async fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.write().await = Some(delay);
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Highest number of fetches observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Get recorded submissions in call order.
    pub async fn submissions(&self) -> Vec<ReservationSubmission> {
        self.submissions.read().await.clone()
    }

    /// Get the most recent recorded submission.
    pub async fn last_submission(&self) -> Option<ReservationSubmission> {
        self.submissions.read().await.last().cloned()
    }

    /// Get recorded (date, window) fetches in call order.
    pub async fn fetches(&self) -> Vec<(NaiveDate, TimeWindow)> {
        self.fetches.read().await.clone()
    }
}

#[async_trait]
impl PortalGateway for MockPortalGateway {
    async fn login(&self, _credentials: &Credentials) -> Result<(), PortalError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);

        let should_fail = self
            .login_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(PortalError::Authentication(
                "mock login failure".to_string(),
            ));
        }
        Ok(())
    }

    async fn fetch_window_fragment(
        &self,
        _session_code: &str,
        date: &ReservationDate,
        window: TimeWindow,
    ) -> Result<String, PortalError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.fetch_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.fetches.write().await.push((date.date, window));

        let result = self
            .fragments
            .read()
            .await
            .get(&window)
            .cloned()
            .ok_or_else(|| PortalError::Network(format!("no fragment configured for {window}")));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn submit_reservation(
        &self,
        _date: &ReservationDate,
        window: TimeWindow,
        submission: &ReservationSubmission,
    ) -> Result<SubmitResponse, PortalError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submissions.write().await.push(submission.clone());

        self.responses
            .read()
            .await
            .get(&window)
            .cloned()
            .ok_or_else(|| {
                PortalError::Network(format!("no submit response configured for {window}"))
            })
    }

    async fn reset_session(&self) {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
    }
}
