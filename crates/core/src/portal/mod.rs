//! Gateway to the booking portal: login handshake, window fragments and
//! reservation submissions over one cookie-backed session.

mod markup;
mod saman;

pub use markup::{parse_reservation_form, MarkupError, ReservationForm};
pub use saman::SamanGateway;

use async_trait::async_trait;
use serde::Serialize;

use crate::dates::ReservationDate;
use crate::settings::Credentials;
use crate::windows::TimeWindow;

/// Errors from portal operations.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Portal request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected portal response: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for PortalError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PortalError::Timeout
        } else if e.is_status() {
            PortalError::UnexpectedResponse(e.to_string())
        } else {
            PortalError::Network(e.to_string())
        }
    }
}

/// The submission endpoint's reply, decoded.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub raw: serde_json::Value,
}

impl SubmitResponse {
    /// The portal replies `{"Success": bool, "Message": string}`. Missing
    /// or oddly-typed fields decode as a failure with an empty message.
    pub fn from_json(raw: serde_json::Value) -> Self {
        let success = raw
            .get("Success")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let message = raw
            .get("Message")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Self {
            success,
            message,
            raw,
        }
    }
}

/// Form fields echoed back when submitting a reservation, all parsed out
/// of the window fragment that preceded the submission.
#[derive(Debug, Clone)]
pub struct ReservationSubmission {
    pub token: String,
    pub seat_element_id: String,
    pub user_id: String,
}

/// The three operations the portal exposes.
///
/// All three read and mutate one shared cookie session. Fetch/submit
/// pairs for different windows may run against that session concurrently;
/// whether the portal's server side tolerates that cannot be verified
/// offline, so callers should treat it as a known risk rather than a
/// guarantee.
#[async_trait]
pub trait PortalGateway: Send + Sync {
    /// Performs the login handshake, priming the session cookies.
    async fn login(&self, credentials: &Credentials) -> Result<(), PortalError>;

    /// Fetches the seat-selection fragment for one window.
    async fn fetch_window_fragment(
        &self,
        session_code: &str,
        date: &ReservationDate,
        window: TimeWindow,
    ) -> Result<String, PortalError>;

    /// Submits a reservation for a seat parsed from a fragment.
    async fn submit_reservation(
        &self,
        date: &ReservationDate,
        window: TimeWindow,
        submission: &ReservationSubmission,
    ) -> Result<SubmitResponse, PortalError>;

    /// Discards the current session, cookies included. The next login
    /// starts from a blank slate.
    async fn reset_session(&self);
}
