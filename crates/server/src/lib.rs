//! HTTP/WS control surface for the reservation engine.
//!
//! Exposed as a library so integration tests can assemble the router
//! in-process; the `seatgrab` binary wires the same pieces in `main`.

pub mod api;
pub mod metrics;
pub mod state;
