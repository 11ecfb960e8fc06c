//! Saman portal gateway implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Datelike;
use reqwest::{header, redirect, Client};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::PortalConfig;
use crate::dates::ReservationDate;
use crate::settings::Credentials;
use crate::windows::TimeWindow;

use super::{PortalError, PortalGateway, ReservationSubmission, SubmitResponse};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_JSON: &str = "application/json,*/*";

/// Gateway against the Saman reservation portal.
///
/// Owns the cookie-backed session; `reset_session` swaps in a fresh
/// client with an empty cookie store. Redirects are never followed
/// automatically because the login handshake must observe the portal's
/// redirect status itself.
pub struct SamanGateway {
    config: PortalConfig,
    client: RwLock<Client>,
}

impl SamanGateway {
    pub fn new(config: PortalConfig) -> Self {
        let client = build_client(&config);
        Self {
            config,
            client: RwLock::new(client),
        }
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Clones the current client out of the lock so requests never hold
    /// it across awaits.
    async fn client(&self) -> Client {
        self.client.read().await.clone()
    }
}

fn build_client(config: &PortalConfig) -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(&config.user_agent)
        .build()
        .expect("Failed to create HTTP client")
}

fn return_url(session_code: &str) -> String {
    format!("/Home/ReserveService?ps={session_code}")
}

/// The portal checks the login referer against this exact pre-encoded
/// shape, lowercase percent escapes included.
fn login_referer(base: &str, session_code: &str) -> String {
    format!(
        "{base}/Account/Login/?returnUrl=%2fHome%2fReserveService%3fps%3d{}",
        urlencoding::encode(session_code)
    )
}

#[async_trait]
impl PortalGateway for SamanGateway {
    async fn login(&self, credentials: &Credentials) -> Result<(), PortalError> {
        let client = self.client().await;
        let base = self.base();
        let login_url = format!("{base}/Account/Login");

        debug!("Priming session cookies from login page");
        client
            .get(&login_url)
            .header(header::ACCEPT, ACCEPT_HTML)
            .send()
            .await?
            .error_for_status()?;

        let return_url = return_url(&credentials.session_code);

        debug!("Posting credentials");
        let response = client
            .post(&login_url)
            .header(header::ORIGIN, base)
            .header(
                header::REFERER,
                login_referer(base, &credentials.session_code),
            )
            .header(header::ACCEPT, ACCEPT_HTML)
            .form(&[
                ("returnUrl", return_url.as_str()),
                ("UserName", credentials.username.as_str()),
                ("Password", credentials.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_redirection() {
            return Err(PortalError::Authentication(format!(
                "Login did not redirect (HTTP {status})"
            )));
        }

        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
            .unwrap_or(return_url);
        let target = if location.starts_with("http") {
            location
        } else {
            format!("{base}{location}")
        };

        debug!(target = %target, "Following login redirect");
        client
            .get(&target)
            .header(header::ACCEPT, ACCEPT_HTML)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn fetch_window_fragment(
        &self,
        session_code: &str,
        date: &ReservationDate,
        window: TimeWindow,
    ) -> Result<String, PortalError> {
        let client = self.client().await;
        let base = self.base();

        let shour = window.start_hour().to_string();
        let thour = window.end_hour().to_string();
        let year = date.date.year().to_string();
        let month = format!("{:02}", date.date.month());

        debug!(window = %window, date = %date.slash, "Fetching window fragment");
        let response = client
            .post(format!("{base}/Home/ReserveDetail"))
            .header(header::ORIGIN, base)
            .header(
                header::REFERER,
                format!("{base}/Home/ReserveService?ps={session_code}"),
            )
            .header(header::ACCEPT, ACCEPT_HTML)
            .form(&[
                ("sc", session_code),
                ("Sdate", date.full_datetime.as_str()),
                ("Shour", shour.as_str()),
                ("Thour", thour.as_str()),
                ("year", year.as_str()),
                ("month", month.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }

    async fn submit_reservation(
        &self,
        date: &ReservationDate,
        window: TimeWindow,
        submission: &ReservationSubmission,
    ) -> Result<SubmitResponse, PortalError> {
        let client = self.client().await;
        let base = self.base();

        let shour = window.start_hour().to_string();
        let thour = window.end_hour().to_string();

        debug!(window = %window, seat = %submission.seat_element_id, "Submitting reservation");
        let response = client
            .post(format!("{base}/Common/Portal/ReservesLibraryNew"))
            .header(header::ORIGIN, base)
            .header(header::REFERER, format!("{base}/Home/ReserveDetail"))
            .header(header::ACCEPT, ACCEPT_JSON)
            .form(&[
                ("__RequestVerificationToken", submission.token.as_str()),
                ("Id", submission.seat_element_id.as_str()),
                ("date", date.full_datetime.as_str()),
                ("SHour", shour.as_str()),
                ("THour", thour.as_str()),
                ("userId", submission.user_id.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let raw: serde_json::Value = response.json().await.map_err(|e| {
            PortalError::UnexpectedResponse(format!("Failed to parse submission reply: {e}"))
        })?;

        Ok(SubmitResponse::from_json(raw))
    }

    async fn reset_session(&self) {
        debug!("Discarding portal session");
        let mut client = self.client.write().await;
        *client = build_client(&self.config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_url() {
        assert_eq!(return_url("abc=="), "/Home/ReserveService?ps=abc==");
    }

    #[test]
    fn test_login_referer_keeps_preencoded_prefix() {
        let referer = login_referer("https://portal.example", "kt+Fz==");
        assert_eq!(
            referer,
            "https://portal.example/Account/Login/?returnUrl=%2fHome%2fReserveService%3fps%3dkt%2BFz%3D%3D"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let gateway = SamanGateway::new(PortalConfig {
            base_url: "https://portal.example/".to_string(),
            ..PortalConfig::default()
        });
        assert_eq!(gateway.base(), "https://portal.example");
    }
}
