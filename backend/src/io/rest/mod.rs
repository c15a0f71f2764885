//! # REST API Interface Layer
//!
//! HTTP surface of the gym admin backend. This layer:
//! - parses flat request parameters into typed domain commands
//! - dispatches on the `action` parameter
//! - maps domain records and reports to the shared DTOs
//! - translates domain errors into response envelopes and status codes
//!
//! No business rules live here.

pub mod actions;
pub mod mappers;
pub mod params;

pub use actions::{handle_action, LIVENESS_MESSAGE};
pub use params::{Action, ActionParams};
