//! Testing utilities and mock implementations.
//!
//! This module provides mocks for the portal gateway and the reservation
//! runner, allowing end-to-end testing without the real portal.
//!
//! # Example
//!
//! ```rust,ignore
//! use seatgrab_core::testing::{fixtures, MockPortalGateway};
//! use seatgrab_core::windows::TimeWindow;
//!
//! let gateway = MockPortalGateway::new();
//! gateway
//!     .set_fragment(
//!         TimeWindow::Morning,
//!         &fixtures::seat_fragment("tok", &[(33, true)], "6f9619ff-8b86-d011-b42d-00cf4fc964ff"),
//!     )
//!     .await;
//! gateway.set_submit_response(TimeWindow::Morning, true, "ok").await;
//!
//! // Use behind Arc<dyn PortalGateway>...
//! ```

mod mock_gateway;
mod mock_runner;

pub use mock_gateway::MockPortalGateway;
pub use mock_runner::{MockRunner, RecordedRun};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::fmt::Write;

    /// Build a seat-selection fragment shaped like the portal's.
    ///
    /// Each `(number, available)` pair becomes one seat block; unavailable
    /// seats carry the portal's reserve marker class.
    pub fn seat_fragment(token: &str, seats: &[(u32, bool)], user_id: &str) -> String {
        let mut markup = format!(
            r#"<input name="__RequestVerificationToken" type="hidden" value="{token}" />"#
        );
        for (number, available) in seats {
            let class = if *available { "block" } else { "block reserve" };
            let _ = write!(
                markup,
                r#"<div class="{class}" id="seat-{number}">{number}</div>"#
            );
        }
        let _ = write!(markup, r#"<script>var currentUser = "{user_id}";</script>"#);
        markup
    }
}
